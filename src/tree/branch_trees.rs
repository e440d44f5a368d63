//! Per-branch cached directory trees with copy-on-write merges.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use thiserror::Error;

use crate::fetch::ListingEntry;

use super::node::{DirectoryNode, Lookup, Node};
use super::path::TreePath;

/// Errors that can occur when merging a listing into a branch tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// A segment of the merge path resolves to a file marker.
    #[error("'{path}' is a file, not a directory")]
    NotADirectory {
        /// The offending path prefix.
        path: String,
    },
}

/// Result type for tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;

/// A table of cached directory trees, one independent root per branch.
///
/// Roots are published as `Arc` snapshots. A merge never mutates a
/// previously published root: it deep-clones the branch tree, applies the
/// listing, and swaps in a fresh `Arc`, so a reader holding an older
/// snapshot keeps observing a consistent tree.
#[derive(Debug, Clone, Default)]
pub struct BranchTrees {
    trees: HashMap<String, Arc<DirectoryNode>>,
}

impl BranchTrees {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any listing has been merged for the branch.
    pub fn contains_branch(&self, branch: &str) -> bool {
        self.trees.contains_key(branch)
    }

    /// The current root snapshot for a branch, if one exists.
    pub fn tree(&self, branch: &str) -> Option<Arc<DirectoryNode>> {
        self.trees.get(branch).cloned()
    }

    /// Merge a fetched listing into the node at `path` within `branch`.
    ///
    /// The target node's children are replaced wholesale by the listing:
    /// files become file markers, subdirectories become unfetched
    /// placeholders. Intermediate directories missing from the tree are
    /// created as placeholders. Siblings and already-fetched subtrees
    /// elsewhere in the branch are left intact.
    ///
    /// Merges targeting the same path are last-write-wins.
    pub fn merge(&mut self, branch: &str, path: &TreePath, listing: &[ListingEntry]) -> Result<()> {
        let children = children_from_listing(listing);

        if path.is_root() {
            self.trees.insert(
                branch.to_string(),
                Arc::new(DirectoryNode::with_children(children)),
            );
            return Ok(());
        }

        // Copy-on-write: clone the branch tree, mutate the clone, republish.
        let mut root = self
            .trees
            .get(branch)
            .map(|tree| (**tree).clone())
            .unwrap_or_default();

        let mut current = &mut root;
        let mut walked: Vec<&str> = Vec::new();
        for segment in path.segments() {
            walked.push(segment);
            current = match current.descend_or_create(segment) {
                Some(dir) => dir,
                None => {
                    return Err(TreeError::NotADirectory {
                        path: walked.join("/"),
                    })
                }
            };
        }
        current.replace_children(children);

        self.trees.insert(branch.to_string(), Arc::new(root));
        Ok(())
    }

    /// Resolve `path` within `branch`.
    ///
    /// Returns [`Lookup::NotCached`] when the branch has never been fetched,
    /// when a segment is missing, when the final node is an unfetched
    /// placeholder, or when the path descends through a file. A fetched but
    /// empty directory is still [`Lookup::Directory`].
    pub fn lookup(&self, branch: &str, path: &TreePath) -> Lookup<'_> {
        let Some(root) = self.trees.get(branch) else {
            return Lookup::NotCached;
        };

        let segments = path.segments();
        let mut current: &DirectoryNode = root;
        for (index, segment) in segments.iter().enumerate() {
            match current.get(segment) {
                Some(Node::Directory(dir)) => current = dir,
                Some(Node::File) => {
                    return if index + 1 == segments.len() {
                        Lookup::File
                    } else {
                        Lookup::NotCached
                    };
                }
                None => return Lookup::NotCached,
            }
        }

        if current.is_fetched() {
            Lookup::Directory(current)
        } else {
            Lookup::NotCached
        }
    }

    /// Discard every branch tree.
    pub fn clear(&mut self) {
        self.trees.clear();
    }
}

/// Convert a flat listing into a child map.
fn children_from_listing(listing: &[ListingEntry]) -> BTreeMap<String, Node> {
    listing
        .iter()
        .map(|entry| {
            let node = if entry.is_dir() {
                Node::placeholder()
            } else {
                Node::File
            };
            (entry.name.clone(), node)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_listing() -> Vec<ListingEntry> {
        vec![ListingEntry::dir("app"), ListingEntry::file("README.md")]
    }

    #[test]
    fn test_lookup_before_any_merge() {
        let trees = BranchTrees::new();
        assert_eq!(trees.lookup("main", &TreePath::root()), Lookup::NotCached);
        assert_eq!(
            trees.lookup("main", &TreePath::parse("app")),
            Lookup::NotCached
        );
    }

    #[test]
    fn test_root_merge_matches_listing() {
        let mut trees = BranchTrees::new();
        trees.merge("main", &TreePath::root(), &root_listing()).unwrap();

        let Lookup::Directory(root) = trees.lookup("main", &TreePath::root()) else {
            panic!("expected fetched root");
        };
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.get("README.md"), Some(&Node::File));
        assert!(matches!(root.get("app"), Some(Node::Directory(_))));

        // The subdirectory learned from the listing has no listing of its own.
        assert_eq!(
            trees.lookup("main", &TreePath::parse("app")),
            Lookup::NotCached
        );
        assert_eq!(
            trees.lookup("main", &TreePath::parse("README.md")),
            Lookup::File
        );
    }

    #[test]
    fn test_deep_merge_preserves_root_siblings() {
        let mut trees = BranchTrees::new();
        trees.merge("main", &TreePath::root(), &root_listing()).unwrap();
        trees
            .merge("main", &TreePath::parse("app"), &[ListingEntry::dir("models")])
            .unwrap();
        trees
            .merge(
                "main",
                &TreePath::parse("app/models"),
                &[ListingEntry::file("user.server.ts")],
            )
            .unwrap();

        let Lookup::Directory(root) = trees.lookup("main", &TreePath::root()) else {
            panic!("expected fetched root");
        };
        assert_eq!(root.get("README.md"), Some(&Node::File));

        let Lookup::Directory(models) = trees.lookup("main", &TreePath::parse("app/models"))
        else {
            panic!("expected fetched app/models");
        };
        assert_eq!(models.get("user.server.ts"), Some(&Node::File));
    }

    #[test]
    fn test_disjoint_merges_do_not_interfere() {
        let mut trees = BranchTrees::new();
        trees
            .merge(
                "main",
                &TreePath::root(),
                &[ListingEntry::dir("app"), ListingEntry::dir("cypress")],
            )
            .unwrap();

        trees
            .merge("main", &TreePath::parse("app"), &[ListingEntry::file("a.ts")])
            .unwrap();
        let after_first = trees.tree("main").unwrap();

        trees
            .merge(
                "main",
                &TreePath::parse("cypress"),
                &[ListingEntry::file("e2e.ts")],
            )
            .unwrap();

        // Subtree at "app" is unchanged by the merge at "cypress".
        let Lookup::Directory(app) = trees.lookup("main", &TreePath::parse("app")) else {
            panic!("expected fetched app");
        };
        assert_eq!(app.get("a.ts"), Some(&Node::File));
        let Lookup::Directory(cypress) = trees.lookup("main", &TreePath::parse("cypress")) else {
            panic!("expected fetched cypress");
        };
        assert_eq!(cypress.get("e2e.ts"), Some(&Node::File));

        // The snapshot taken between the merges was not mutated in place.
        assert!(matches!(
            after_first.get("cypress"),
            Some(Node::Directory(dir)) if !dir.is_fetched()
        ));
    }

    #[test]
    fn test_same_path_merge_is_last_write_wins() {
        let mut trees = BranchTrees::new();
        trees
            .merge("main", &TreePath::root(), &[ListingEntry::file("old.txt")])
            .unwrap();
        trees
            .merge("main", &TreePath::root(), &[ListingEntry::file("new.txt")])
            .unwrap();

        let Lookup::Directory(root) = trees.lookup("main", &TreePath::root()) else {
            panic!("expected fetched root");
        };
        assert_eq!(root.get("old.txt"), None);
        assert_eq!(root.get("new.txt"), Some(&Node::File));
    }

    #[test]
    fn test_branches_are_isolated() {
        let mut trees = BranchTrees::new();
        trees.merge("main", &TreePath::root(), &root_listing()).unwrap();
        trees
            .merge("main", &TreePath::parse("app"), &[ListingEntry::dir("models")])
            .unwrap();

        assert_eq!(
            trees.lookup("feature-x", &TreePath::root()),
            Lookup::NotCached
        );

        trees
            .merge("feature-x", &TreePath::root(), &[ListingEntry::file("only.txt")])
            .unwrap();

        // "main" is untouched by the other branch's merges.
        assert!(trees.lookup("main", &TreePath::parse("app")).is_cached());
        let Lookup::Directory(other) = trees.lookup("feature-x", &TreePath::root()) else {
            panic!("expected fetched feature-x root");
        };
        assert_eq!(other.get("app"), None);
    }

    #[test]
    fn test_merge_creates_intermediate_placeholders() {
        let mut trees = BranchTrees::new();
        trees
            .merge(
                "main",
                &TreePath::parse("a/b"),
                &[ListingEntry::file("c.txt")],
            )
            .unwrap();

        // The intermediates exist but have no fetched listing, and the
        // never-fetched root is still reported as not cached.
        assert_eq!(trees.lookup("main", &TreePath::root()), Lookup::NotCached);
        assert_eq!(
            trees.lookup("main", &TreePath::parse("a")),
            Lookup::NotCached
        );
        assert!(trees.lookup("main", &TreePath::parse("a/b")).is_cached());
    }

    #[test]
    fn test_merge_through_file_fails() {
        let mut trees = BranchTrees::new();
        trees.merge("main", &TreePath::root(), &root_listing()).unwrap();

        let err = trees
            .merge(
                "main",
                &TreePath::parse("README.md/inner"),
                &[ListingEntry::file("x")],
            )
            .unwrap_err();
        assert_eq!(
            err,
            TreeError::NotADirectory {
                path: "README.md".to_string()
            }
        );

        // The failed merge left the branch tree untouched.
        assert_eq!(
            trees.lookup("main", &TreePath::parse("README.md")),
            Lookup::File
        );
    }

    #[test]
    fn test_fetched_empty_directory_is_cached() {
        let mut trees = BranchTrees::new();
        trees
            .merge("main", &TreePath::root(), &[ListingEntry::dir("empty")])
            .unwrap();
        trees.merge("main", &TreePath::parse("empty"), &[]).unwrap();

        let Lookup::Directory(empty) = trees.lookup("main", &TreePath::parse("empty")) else {
            panic!("expected fetched empty directory");
        };
        assert!(empty.is_fetched());
        assert!(empty.children().is_empty());
    }

    #[test]
    fn test_clear() {
        let mut trees = BranchTrees::new();
        trees.merge("main", &TreePath::root(), &root_listing()).unwrap();
        trees.clear();
        assert!(!trees.contains_branch("main"));
    }
}
