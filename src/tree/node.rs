//! Cached directory tree nodes.

use std::collections::BTreeMap;

/// A node in a branch's cached directory tree.
///
/// Files carry no content, only presence and type. A subdirectory learned
/// from its parent's listing starts as an unfetched placeholder and gains
/// children only once its own listing is merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A file marker.
    File,
    /// A directory, possibly not yet fetched.
    Directory(DirectoryNode),
}

impl Node {
    /// Create an unfetched directory placeholder.
    pub fn placeholder() -> Self {
        Node::Directory(DirectoryNode {
            children: BTreeMap::new(),
            fetched: false,
        })
    }

    /// Whether this node is a directory.
    pub fn is_directory(&self) -> bool {
        matches!(self, Node::Directory(_))
    }
}

/// One directory's immediate children, plus whether a listing for the
/// directory itself has been fetched.
///
/// The `fetched` flag distinguishes "no listing fetched yet" from "fetched
/// and genuinely empty"; the child map alone cannot tell the two apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryNode {
    children: BTreeMap<String, Node>,
    fetched: bool,
}

impl DirectoryNode {
    /// Create a fetched directory with the given children.
    pub fn with_children(children: BTreeMap<String, Node>) -> Self {
        Self {
            children,
            fetched: true,
        }
    }

    /// The immediate children, keyed by name in lexical order.
    pub fn children(&self) -> &BTreeMap<String, Node> {
        &self.children
    }

    /// Whether a listing for this directory has been merged.
    pub fn is_fetched(&self) -> bool {
        self.fetched
    }

    /// Look up an immediate child by name.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Descend into a child directory, creating an unfetched placeholder if
    /// the child does not exist yet. Returns `None` if the child is a file.
    pub(crate) fn descend_or_create(&mut self, name: &str) -> Option<&mut DirectoryNode> {
        match self
            .children
            .entry(name.to_string())
            .or_insert_with(Node::placeholder)
        {
            Node::File => None,
            Node::Directory(dir) => Some(dir),
        }
    }

    /// Replace this directory's children wholesale and mark it fetched.
    pub(crate) fn replace_children(&mut self, children: BTreeMap<String, Node>) {
        self.children = children;
        self.fetched = true;
    }
}

/// The result of resolving a path in a branch tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// The path resolves to a file marker.
    File,
    /// The path resolves to a directory whose listing has been fetched.
    Directory(&'a DirectoryNode),
    /// No listing has been fetched for this path.
    ///
    /// Covers a never-fetched branch, a missing segment, an unfetched
    /// placeholder directory, and a path that descends through a file.
    NotCached,
}

impl Lookup<'_> {
    /// Whether the lookup found cached data.
    pub fn is_cached(&self) -> bool {
        !matches!(self, Lookup::NotCached)
    }
}
