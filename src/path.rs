//! Path representation for locating offending values in nested structures.
//!
//! This module provides [`JsonPath`] and [`PathSegment`]. Validators build
//! paths innermost-first: each time an error leaves one level of nesting the
//! enclosing container prepends its segment, so by the time the error reaches
//! the caller the path reads root-to-leaf.

use std::collections::VecDeque;
use std::fmt::{self, Display};

/// A segment of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// An object field access (e.g., `user`, `email`)
    Field(String),
    /// A sequence index access (e.g., `[0]`, `[42]`)
    Index(usize),
    /// A mapping key access, always rendered in brackets (e.g., `['k']`)
    Key(String),
}

impl PathSegment {
    /// Creates a new field segment.
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field(name.into())
    }

    /// Creates a new index segment.
    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }

    /// Creates a new mapping key segment.
    pub fn key(name: impl Into<String>) -> Self {
        PathSegment::Key(name.into())
    }
}

/// A path to a value in a nested structure.
///
/// `JsonPath` represents locations like `users[0].email`. Segments can be
/// appended (when walking down) or prepended (when an error propagates up).
///
/// # Example
///
/// ```rust
/// use shapecheck::JsonPath;
///
/// let path = JsonPath::root()
///     .push_field("users")
///     .push_index(0)
///     .push_field("email");
///
/// assert_eq!(path.to_string(), "users[0].email");
///
/// let outer = JsonPath::from_index(1).prepend_field("b").prepend_field("a");
/// assert_eq!(outer.to_string(), "a.b[1]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPath {
    segments: VecDeque<PathSegment>,
}

impl JsonPath {
    /// Creates an empty path representing the root value.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path from a single field segment.
    pub fn from_field(name: impl Into<String>) -> Self {
        Self::root().prepend(PathSegment::Field(name.into()))
    }

    /// Creates a path from a single index segment.
    pub fn from_index(idx: usize) -> Self {
        Self::root().prepend(PathSegment::Index(idx))
    }

    /// Returns a new path with a field segment appended.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push_back(PathSegment::Field(name.into()));
        Self { segments }
    }

    /// Returns a new path with an index segment appended.
    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push_back(PathSegment::Index(index));
        Self { segments }
    }

    /// Prepends a segment, consuming the path.
    ///
    /// This is the propagation step: the segment becomes the outermost one.
    pub fn prepend(mut self, segment: PathSegment) -> Self {
        self.segments.push_front(segment);
        self
    }

    /// Prepends a field segment.
    pub fn prepend_field(self, name: impl Into<String>) -> Self {
        self.prepend(PathSegment::Field(name.into()))
    }

    /// Prepends an index segment.
    pub fn prepend_index(self, index: usize) -> Self {
        self.prepend(PathSegment::Index(index))
    }

    /// Returns true if this is the root path (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments in this path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the path segments, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Returns the outermost segment, or None if this is root.
    pub fn first(&self) -> Option<&PathSegment> {
        self.segments.front()
    }

    /// Returns the innermost segment, or None if this is root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.back()
    }
}

/// True when a field name can be rendered with dot syntax.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn write_quoted(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    write!(f, "['{}']", name.replace('\\', "\\\\").replace('\'', "\\'"))
}

impl Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if is_identifier(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Field(name) | PathSegment::Key(name) => write_quoted(f, name)?,
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}
