//! The current-location pointer into a branch's cached tree.

use crate::tree::{BranchTrees, Lookup, Node, TreePath};

/// What a child name under the current directory refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The child is a file.
    File,
    /// The child is a directory.
    Directory {
        /// Whether a listing for the child has already been merged.
        cached: bool,
    },
}

/// Tracks the current directory within the active branch's tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    /// The current directory path.
    pub path: TreePath,
    /// The most recently selected file, if any.
    pub selected_file: Option<TreePath>,
    /// Whether the last listing fetch for this cursor failed.
    pub fetch_error: bool,
}

impl Cursor {
    /// Classify a child name relative to the current directory.
    ///
    /// Returns `None` when the current directory has no cached listing or
    /// the name is not among its children. If the current path itself
    /// resolves to a file the cursor is somehow viewing a file, not a
    /// directory; the name is classified as a file.
    pub fn classify(
        &self,
        trees: &BranchTrees,
        branch: &str,
        child: &str,
    ) -> Option<Classification> {
        let dir = match trees.lookup(branch, &self.path) {
            Lookup::File => return Some(Classification::File),
            Lookup::Directory(dir) => dir,
            Lookup::NotCached => return None,
        };

        match dir.get(child)? {
            Node::File => Some(Classification::File),
            Node::Directory(child_dir) => Some(Classification::Directory {
                cached: child_dir.is_fetched(),
            }),
        }
    }

    /// Pop the last segment off the current path. At the root this is a
    /// no-op. Clears the error flag either way.
    pub fn ascend(&mut self) {
        self.path = self.path.parent();
        self.fetch_error = false;
    }

    /// Return to the root with no selection and no error.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::ListingEntry;

    fn trees_with_root() -> BranchTrees {
        let mut trees = BranchTrees::new();
        trees
            .merge(
                "main",
                &TreePath::root(),
                &[ListingEntry::dir("app"), ListingEntry::file("README.md")],
            )
            .unwrap();
        trees
    }

    #[test]
    fn test_classify_from_root_listing() {
        let trees = trees_with_root();
        let cursor = Cursor::default();

        assert_eq!(
            cursor.classify(&trees, "main", "README.md"),
            Some(Classification::File)
        );
        assert_eq!(
            cursor.classify(&trees, "main", "app"),
            Some(Classification::Directory { cached: false })
        );
        assert_eq!(cursor.classify(&trees, "main", "missing"), None);
    }

    #[test]
    fn test_classify_cached_directory() {
        let mut trees = trees_with_root();
        trees
            .merge("main", &TreePath::parse("app"), &[ListingEntry::dir("models")])
            .unwrap();

        let cursor = Cursor::default();
        assert_eq!(
            cursor.classify(&trees, "main", "app"),
            Some(Classification::Directory { cached: true })
        );
    }

    #[test]
    fn test_classify_without_cached_listing() {
        let trees = BranchTrees::new();
        let cursor = Cursor::default();
        assert_eq!(cursor.classify(&trees, "main", "anything"), None);
    }

    #[test]
    fn test_classify_when_viewing_a_file() {
        let trees = trees_with_root();
        let cursor = Cursor {
            path: TreePath::parse("README.md"),
            ..Cursor::default()
        };
        assert_eq!(
            cursor.classify(&trees, "main", "anything"),
            Some(Classification::File)
        );
    }

    #[test]
    fn test_ascend() {
        let mut cursor = Cursor {
            path: TreePath::parse("app/models"),
            selected_file: None,
            fetch_error: true,
        };

        cursor.ascend();
        assert_eq!(cursor.path, TreePath::parse("app"));
        assert!(!cursor.fetch_error);

        cursor.ascend();
        cursor.ascend();
        assert!(cursor.path.is_root());
    }
}
