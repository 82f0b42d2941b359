//! Qualified name paths and documentation records

use std::fmt;

/// Access path from a root module to a discovered entity
///
/// Paths only grow: each traversal step produces a new path with one more
/// segment, so a path is never mutated once it has been emitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedPath {
    segments: Vec<String>,
}

impl QualifiedPath {
    /// Path consisting of a single root segment
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// A new path with `segment` appended
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments after the root
    pub fn depth(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }

    /// Dot-joined form, e.g. `os.path.join`
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for QualifiedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

impl<S: Into<String>> FromIterator<S> for QualifiedPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// A discovered entity and its documentation
///
/// `doc` is `None` when the entity exists but carries no documentation text;
/// such entities are still emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRecord {
    pub path: QualifiedPath,
    pub doc: Option<String>,
}

impl DocRecord {
    pub fn new(path: QualifiedPath, doc: Option<String>) -> Self {
        Self { path, doc }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_paths_leave_parent_untouched() {
        let root = QualifiedPath::root("os");
        let path = root.child("path");
        let join = path.child("join");

        assert_eq!(root.dotted(), "os");
        assert_eq!(path.dotted(), "os.path");
        assert_eq!(join.to_string(), "os.path.join");
        assert_eq!(join.depth(), 2);
        assert_eq!(join.segments(), ["os", "path", "join"]);
    }

    #[test]
    fn collect_into_path() {
        let path: QualifiedPath = ["builtins", "range_iterator"].into_iter().collect();
        assert_eq!(path.dotted(), "builtins.range_iterator");
    }
}
