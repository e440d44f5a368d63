//! Traits over the platform's listing APIs.

use async_trait::async_trait;

use crate::provider::{Provider, Repository};
use crate::tree::TreePath;

use super::error::Result;
use super::types::ListingEntry;

/// Fetches the immediate children of a directory in a repository branch.
///
/// Listings are flat: one entry per immediate child, each tagged file or
/// directory. Implementations do not cache; the caller owns caching and is
/// responsible for not issuing two concurrent fetches for the same
/// `(branch, path)` pair.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// List the immediate children of `path` on `branch`.
    ///
    /// Returns `FetchError::NotFound` if the branch or path does not exist.
    async fn fetch_listing(
        &self,
        provider: &Provider,
        repo: &Repository,
        branch: &str,
        path: &TreePath,
    ) -> Result<Vec<ListingEntry>>;
}

/// Lists the providers, repositories, and branches available to a project.
#[async_trait]
pub trait ProviderApi: Send + Sync {
    /// List the project's connected git providers.
    async fn list_providers(&self) -> Result<Vec<Provider>>;

    /// List the repositories reachable through a provider.
    ///
    /// Returns `FetchError::AuthorizationRequired` when the provider
    /// integration needs to be re-authorized.
    async fn list_repositories(&self, provider: &Provider) -> Result<Vec<Repository>>;

    /// List the branches of a repository.
    async fn list_branches(&self, provider: &Provider, repo: &Repository) -> Result<Vec<String>>;
}

/// The full API surface the selection store consumes.
pub trait SourceApi: ProviderApi + ContentFetcher {}

impl<T: ProviderApi + ContentFetcher> SourceApi for T {}
