//! Branch-scoped lazy directory tree cache.

mod branch_trees;
mod node;
mod path;

pub use branch_trees::{BranchTrees, Result, TreeError};
pub use node::{DirectoryNode, Lookup, Node};
pub use path::{PathError, TreePath};
