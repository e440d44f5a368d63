//! An in-memory implementation of the listing APIs for testing.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::provider::{Provider, ProviderId, Repository};
use crate::tree::TreePath;

use super::error::{FetchError, Result};
use super::fetcher::{ContentFetcher, ProviderApi};
use super::types::ListingEntry;

/// An entry in an in-memory branch tree.
#[derive(Debug, Clone)]
pub enum MemoryEntry {
    /// A directory containing other entries.
    Directory(BTreeMap<String, MemoryEntry>),
    /// A file.
    File,
}

impl MemoryEntry {
    /// Create an empty directory.
    pub fn dir() -> Self {
        MemoryEntry::Directory(BTreeMap::new())
    }
}

/// Builder for constructing a [`MemorySourceApi`].
#[derive(Default)]
pub struct MemorySourceApiBuilder {
    providers: Vec<Provider>,
    repositories: HashMap<ProviderId, Vec<Repository>>,
    branches: HashMap<String, Vec<String>>,
    trees: HashMap<String, BTreeMap<String, MemoryEntry>>,
    denied: HashSet<ProviderId>,
}

impl MemorySourceApiBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider to the project.
    pub fn provider(mut self, provider: Provider) -> Self {
        self.providers.push(provider);
        self
    }

    /// Add a repository reachable through the provider with the given id.
    pub fn repository(mut self, provider: ProviderId, repo: Repository) -> Self {
        self.repositories.entry(provider).or_default().push(repo);
        self
    }

    /// Add a branch to the repository with the given full name.
    pub fn branch(mut self, repo_name: &str, branch: &str) -> Self {
        self.branches
            .entry(repo_name.to_string())
            .or_default()
            .push(branch.to_string());
        self
    }

    /// Add a file at the given path on a branch.
    ///
    /// Path components are separated by '/'. Parent directories are created
    /// automatically.
    pub fn file(self, branch: &str, path: &str) -> Self {
        self.add(branch, path, MemoryEntry::File)
    }

    /// Add a directory at the given path on a branch.
    pub fn dir(self, branch: &str, path: &str) -> Self {
        self.add(branch, path, MemoryEntry::dir())
    }

    /// Mark a provider as needing re-authorization.
    ///
    /// Repository and branch listings for it will fail with
    /// `FetchError::AuthorizationRequired`.
    pub fn deny(mut self, provider: ProviderId) -> Self {
        self.denied.insert(provider);
        self
    }

    fn add(mut self, branch: &str, path: &str, entry: MemoryEntry) -> Self {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if parts.is_empty() {
            return self;
        }

        let root = self.trees.entry(branch.to_string()).or_default();
        Self::add_at_path(root, &parts, entry);
        self
    }

    fn add_at_path(current: &mut BTreeMap<String, MemoryEntry>, parts: &[&str], entry: MemoryEntry) {
        if parts.len() == 1 {
            current.insert(parts[0].to_string(), entry);
            return;
        }

        let child = current
            .entry(parts[0].to_string())
            .or_insert_with(MemoryEntry::dir);

        if let MemoryEntry::Directory(children) = child {
            Self::add_at_path(children, &parts[1..], entry);
        }
    }

    /// Build the MemorySourceApi.
    pub fn build(self) -> MemorySourceApi {
        MemorySourceApi {
            inner: Arc::new(MemorySourceApiInner {
                providers: self.providers,
                repositories: self.repositories,
                branches: self.branches,
                trees: self.trees,
                denied: self.denied,
                listing_calls: AtomicUsize::new(0),
            }),
        }
    }
}

struct MemorySourceApiInner {
    providers: Vec<Provider>,
    repositories: HashMap<ProviderId, Vec<Repository>>,
    branches: HashMap<String, Vec<String>>,
    trees: HashMap<String, BTreeMap<String, MemoryEntry>>,
    denied: HashSet<ProviderId>,
    listing_calls: AtomicUsize,
}

/// An in-memory implementation of [`ProviderApi`] and [`ContentFetcher`]
/// for testing.
#[derive(Clone)]
pub struct MemorySourceApi {
    inner: Arc<MemorySourceApiInner>,
}

impl MemorySourceApi {
    /// Create a new builder for constructing a MemorySourceApi.
    pub fn builder() -> MemorySourceApiBuilder {
        MemorySourceApiBuilder::new()
    }

    /// How many directory listings have been fetched.
    pub fn listing_calls(&self) -> usize {
        self.inner.listing_calls.load(Ordering::SeqCst)
    }

    fn children_at<'a>(
        &'a self,
        branch: &str,
        path: &TreePath,
    ) -> Option<&'a BTreeMap<String, MemoryEntry>> {
        let mut current = self.inner.trees.get(branch)?;
        for segment in path.segments() {
            match current.get(segment)? {
                MemoryEntry::Directory(children) => current = children,
                MemoryEntry::File => return None,
            }
        }
        Some(current)
    }
}

#[async_trait]
impl ProviderApi for MemorySourceApi {
    async fn list_providers(&self) -> Result<Vec<Provider>> {
        Ok(self.inner.providers.clone())
    }

    async fn list_repositories(&self, provider: &Provider) -> Result<Vec<Repository>> {
        if self.inner.denied.contains(&provider.id()) {
            return Err(FetchError::AuthorizationRequired);
        }
        Ok(self
            .inner
            .repositories
            .get(&provider.id())
            .cloned()
            .unwrap_or_default())
    }

    async fn list_branches(&self, provider: &Provider, repo: &Repository) -> Result<Vec<String>> {
        if self.inner.denied.contains(&provider.id()) {
            return Err(FetchError::AuthorizationRequired);
        }
        Ok(self
            .inner
            .branches
            .get(&repo.name)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ContentFetcher for MemorySourceApi {
    async fn fetch_listing(
        &self,
        _provider: &Provider,
        _repo: &Repository,
        branch: &str,
        path: &TreePath,
    ) -> Result<Vec<ListingEntry>> {
        self.inner.listing_calls.fetch_add(1, Ordering::SeqCst);

        let children = self.children_at(branch, path).ok_or(FetchError::NotFound)?;

        // BTreeMap iteration gives lexical order, like the real API.
        Ok(children
            .iter()
            .map(|(name, entry)| match entry {
                MemoryEntry::Directory(_) => ListingEntry::dir(name.clone()),
                MemoryEntry::File => ListingEntry::file(name.clone()),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::types::EntryKind;
    use crate::provider::RepoKind;

    fn github() -> Provider {
        Provider::GitHub {
            name: "acme".to_string(),
            installation_id: 42,
        }
    }

    fn repo() -> Repository {
        Repository::new("acme/site", RepoKind::GitHub)
    }

    #[tokio::test]
    async fn test_listing_is_lexically_ordered() {
        let api = MemorySourceApi::builder()
            .file("main", "z.txt")
            .file("main", "a.txt")
            .dir("main", "m")
            .build();

        let listing = api
            .fetch_listing(&github(), &repo(), "main", &TreePath::root())
            .await
            .unwrap();
        let names: Vec<&str> = listing.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "m", "z.txt"]);
        assert_eq!(listing[1].kind, EntryKind::Dir);
    }

    #[tokio::test]
    async fn test_nested_listing_and_not_found() {
        let api = MemorySourceApi::builder()
            .file("main", "app/models/user.ts")
            .build();

        let listing = api
            .fetch_listing(&github(), &repo(), "main", &TreePath::parse("app/models"))
            .await
            .unwrap();
        assert_eq!(listing, vec![ListingEntry::file("user.ts")]);

        let err = api
            .fetch_listing(&github(), &repo(), "main", &TreePath::parse("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NotFound));

        let err = api
            .fetch_listing(&github(), &repo(), "other-branch", &TreePath::root())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NotFound));
    }

    #[tokio::test]
    async fn test_denied_provider() {
        let api = MemorySourceApi::builder()
            .provider(github())
            .deny(github().id())
            .build();

        let err = api.list_repositories(&github()).await.unwrap_err();
        assert!(err.is_authorization_required());
    }
}
