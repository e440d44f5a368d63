//! Remote listing APIs: traits, wire types, HTTP and in-memory implementations.

mod error;
mod fetcher;
mod http;
mod memory;
mod types;

pub use error::{FetchError, Result};
pub use fetcher::{ContentFetcher, ProviderApi, SourceApi};
pub use http::HttpSourceApi;
pub use memory::{MemoryEntry, MemorySourceApi, MemorySourceApiBuilder};
pub use types::{EntryKind, ListingEntry};
