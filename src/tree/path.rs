//! Slash-joined tree paths.

use std::fmt;

use thiserror::Error;

/// Errors that can occur when constructing a path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// A segment contained the '/' join delimiter.
    #[error("path segment '{0}' contains '/'")]
    DelimiterInSegment(String),

    /// A segment was empty.
    #[error("path segment is empty")]
    EmptySegment,
}

/// An ordered sequence of path segments within a branch tree.
///
/// The canonical text form joins segments with '/'; the empty path denotes
/// the tree root. Segments never contain the delimiter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TreePath {
    segments: Vec<String>,
}

impl TreePath {
    /// Create the root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a path from its slash-joined text form.
    ///
    /// Leading, trailing, and repeated slashes are ignored, so `""`, `"/"`,
    /// and `"//"` all parse to the root path.
    pub fn parse(s: &str) -> Self {
        Self {
            segments: s
                .split('/')
                .filter(|seg| !seg.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The path of the containing directory.
    ///
    /// The root is its own parent.
    pub fn parent(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.pop();
        Self { segments }
    }

    /// Extend the path with a child name.
    ///
    /// Fails if the name is empty or contains the join delimiter; either
    /// would produce a path that does not round-trip through
    /// [`TreePath::parse`].
    pub fn child(&self, name: &str) -> Result<Self, PathError> {
        if name.is_empty() {
            return Err(PathError::EmptySegment);
        }
        if name.contains('/') {
            return Err(PathError::DelimiterInSegment(name.to_string()));
        }
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self { segments })
    }

    /// The final segment, if any.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Whether this path is a (non-strict) prefix of `other`.
    pub fn is_prefix_of(&self, other: &TreePath) -> bool {
        other.segments.len() >= self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl From<&str> for TreePath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}
