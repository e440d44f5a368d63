//! gitnav-rs - A Rust library for browsing git-hosted deployment sources.
//!
//! Implements the state layer of a deployment-source picker: a lazily
//! populated, branch-scoped directory tree cache, a navigation cursor over
//! it, and a selection store tying provider, repository, and branch choices
//! together. Rendering and authentication live elsewhere; the store is
//! reached through snapshots and a watch channel.

pub mod config;
pub mod fetch;
pub mod provider;
pub mod store;
pub mod tree;

pub use config::{read_config, ApiConfig, ConfigSource};
pub use fetch::{
    ContentFetcher, EntryKind, FetchError, HttpSourceApi, ListingEntry, MemorySourceApi,
    ProviderApi, SourceApi,
};
pub use provider::{Provider, ProviderId, RepoKind, Repository};
pub use store::{Classification, Cursor, Selection, SourceStore, StoreError, StoreSnapshot};
pub use tree::{BranchTrees, DirectoryNode, Lookup, Node, TreeError, TreePath};
