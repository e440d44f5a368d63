//! The selection store: one instance per wizard mount.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::watch;

use crate::fetch::{FetchError, SourceApi};
use crate::provider::{Provider, ProviderId, Repository};
use crate::tree::{BranchTrees, DirectoryNode, Lookup, PathError, TreeError, TreePath};

use super::cursor::Classification;
use super::selection::Selection;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A listing fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A merge into the tree cache failed.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// A path could not be constructed.
    #[error(transparent)]
    Path(#[from] PathError),

    /// The operation needs a provider but none is selected.
    #[error("no provider selected")]
    NoProvider,

    /// The operation needs a repository but none is selected.
    #[error("no repository selected")]
    NoRepository,

    /// The operation needs a branch but none is selected.
    #[error("no branch selected")]
    NoBranch,
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

// =============================================================================
// Snapshot
// =============================================================================

/// A read-only view of the store for rendering.
///
/// Cheap to clone and to hold: branch trees are shared via `Arc` and are
/// never mutated in place, so a snapshot stays internally consistent even
/// while the store keeps merging new listings.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    /// The project's connected providers.
    pub providers: Vec<Provider>,
    /// Fetched repository lists, keyed by provider id.
    pub repositories: HashMap<ProviderId, Vec<Repository>>,
    /// Fetched branch lists, keyed by repository full name.
    pub branches: HashMap<String, Vec<String>>,
    /// The current selection and cursor.
    pub selection: Selection,
    /// The cached branch trees.
    pub trees: BranchTrees,
    /// Whether the active provider integration needs re-authorization.
    pub needs_reauth: bool,
}

impl StoreSnapshot {
    /// The repositories fetched for the currently selected provider.
    pub fn current_repositories(&self) -> &[Repository] {
        self.selection
            .provider
            .as_ref()
            .and_then(|provider| self.repositories.get(&provider.id()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The branches fetched for the currently selected repository.
    pub fn current_branches(&self) -> &[String] {
        self.selection
            .repository
            .as_ref()
            .and_then(|repo| self.branches.get(&repo.name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The cached listing of the cursor's current directory, if fetched.
    pub fn current_directory(&self) -> Option<&DirectoryNode> {
        let branch = self.selection.branch.as_deref()?;
        match self.trees.lookup(branch, &self.selection.cursor.path) {
            Lookup::Directory(dir) => Some(dir),
            _ => None,
        }
    }
}

// =============================================================================
// SourceStore
// =============================================================================

struct State {
    providers: Vec<Provider>,
    repositories: HashMap<ProviderId, Vec<Repository>>,
    branches: HashMap<String, Vec<String>>,
    selection: Selection,
    trees: BranchTrees,
    needs_reauth: bool,
}

impl State {
    fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            providers: self.providers.clone(),
            repositories: self.repositories.clone(),
            branches: self.branches.clone(),
            selection: self.selection.clone(),
            trees: self.trees.clone(),
            needs_reauth: self.needs_reauth,
        }
    }
}

/// The deployment-source selection store.
///
/// Owns the selection state, the per-provider repository and per-repository
/// branch caches, and the branch tree table. All mutation goes through the
/// methods below; readers pull [`StoreSnapshot`]s or subscribe to a watch
/// channel that publishes a fresh snapshot after every mutation.
///
/// The lock is never held across a fetch. Every method that awaits
/// re-checks the active branch before applying cursor-visible effects, so
/// a stale fetch completion still lands in the right branch's cache entry
/// without disturbing the user's new position.
pub struct SourceStore<A> {
    api: A,
    state: Mutex<State>,
    watch_tx: watch::Sender<StoreSnapshot>,
}

impl<A: SourceApi> SourceStore<A> {
    /// Create an empty store over the given API.
    pub fn new(api: A) -> Self {
        let state = State {
            providers: Vec::new(),
            repositories: HashMap::new(),
            branches: HashMap::new(),
            selection: Selection::default(),
            trees: BranchTrees::new(),
            needs_reauth: false,
        };
        let (watch_tx, _) = watch::channel(state.snapshot());
        Self {
            api,
            state: Mutex::new(state),
            watch_tx,
        }
    }

    /// The API the store fetches through.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// A read-only snapshot of the current state.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.lock().unwrap().snapshot()
    }

    /// Subscribe to snapshots; one is published after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.watch_tx.subscribe()
    }

    fn publish(&self, state: &State) {
        self.watch_tx.send_replace(state.snapshot());
    }

    // -------------------------------------------------------------------------
    // Provider / repository / branch lists
    // -------------------------------------------------------------------------

    /// Fetch the project's providers.
    ///
    /// When no provider is selected yet, the first listed one becomes the
    /// current provider.
    pub async fn load_providers(&self) -> Result<()> {
        let result = self.api.list_providers().await;

        let mut state = self.state.lock().unwrap();
        match result {
            Ok(providers) => {
                if state.selection.provider.is_none() {
                    if let Some(first) = providers.first() {
                        state.selection.set_provider(first.clone());
                    }
                }
                state.providers = providers;
                self.publish(&state);
                Ok(())
            }
            Err(e) => {
                if e.is_authorization_required() {
                    state.needs_reauth = true;
                }
                self.publish(&state);
                Err(e.into())
            }
        }
    }

    /// Replace the current provider.
    ///
    /// Resets the repository, branch, and cursor. Repository lists fetched
    /// for other providers stay cached under their provider ids.
    pub fn set_provider(&self, provider: Provider) {
        let mut state = self.state.lock().unwrap();
        state.selection.set_provider(provider);
        state.needs_reauth = false;
        self.publish(&state);
    }

    /// Fetch the repository list for the current provider.
    pub async fn load_repositories(&self) -> Result<()> {
        let provider = {
            let state = self.state.lock().unwrap();
            state.selection.provider.clone().ok_or(StoreError::NoProvider)?
        };

        let result = self.api.list_repositories(&provider).await;

        let mut state = self.state.lock().unwrap();
        match result {
            Ok(repositories) => {
                state.repositories.insert(provider.id(), repositories);
                state.needs_reauth = false;
                self.publish(&state);
                Ok(())
            }
            Err(e) => {
                if e.is_authorization_required() {
                    state.needs_reauth = true;
                }
                self.publish(&state);
                Err(e.into())
            }
        }
    }

    /// Replace the current repository, resetting the branch and cursor.
    pub fn set_repository(&self, repository: Repository) {
        let mut state = self.state.lock().unwrap();
        state.selection.set_repository(repository);
        self.publish(&state);
    }

    /// Fetch the branch list for the current repository.
    pub async fn load_branches(&self) -> Result<()> {
        let (provider, repo) = {
            let state = self.state.lock().unwrap();
            let provider = state.selection.provider.clone().ok_or(StoreError::NoProvider)?;
            let repo = state
                .selection
                .repository
                .clone()
                .ok_or(StoreError::NoRepository)?;
            (provider, repo)
        };

        let result = self.api.list_branches(&provider, &repo).await;

        let mut state = self.state.lock().unwrap();
        match result {
            Ok(branches) => {
                state.branches.insert(repo.name, branches);
                state.needs_reauth = false;
                self.publish(&state);
                Ok(())
            }
            Err(e) => {
                if e.is_authorization_required() {
                    state.needs_reauth = true;
                }
                self.publish(&state);
                Err(e.into())
            }
        }
    }

    // -------------------------------------------------------------------------
    // Branch selection and navigation
    // -------------------------------------------------------------------------

    /// Replace the current branch, resetting the cursor to the root.
    ///
    /// Triggers the branch's initial root listing fetch unless its tree is
    /// already cached from an earlier visit.
    pub async fn set_branch(&self, branch: &str) -> Result<()> {
        let fetch = {
            let mut state = self.state.lock().unwrap();
            state.selection.set_branch(branch);
            if state.trees.contains_branch(branch) {
                self.publish(&state);
                None
            } else {
                let provider = state.selection.provider.clone().ok_or(StoreError::NoProvider)?;
                let repo = state
                    .selection
                    .repository
                    .clone()
                    .ok_or(StoreError::NoRepository)?;
                self.publish(&state);
                Some((provider, repo))
            }
        };

        let Some((provider, repo)) = fetch else {
            return Ok(());
        };

        let result = self
            .api
            .fetch_listing(&provider, &repo, branch, &TreePath::root())
            .await;

        let mut state = self.state.lock().unwrap();
        let still_active = state.selection.branch.as_deref() == Some(branch);
        match result {
            Ok(listing) => {
                state.trees.merge(branch, &TreePath::root(), &listing)?;
                self.publish(&state);
                Ok(())
            }
            Err(e) => {
                if e.is_authorization_required() {
                    state.needs_reauth = true;
                }
                if still_active {
                    state.selection.cursor.fetch_error = true;
                }
                self.publish(&state);
                Err(e.into())
            }
        }
    }

    /// Classify a child name under the cursor's current directory.
    pub fn classify(&self, name: &str) -> Option<Classification> {
        let state = self.state.lock().unwrap();
        let branch = state.selection.branch.as_deref()?;
        state.selection.cursor.classify(&state.trees, branch, name)
    }

    /// Enter a child of the current directory.
    ///
    /// A file child becomes the selected file and the current directory is
    /// unchanged. A directory child with a cached listing becomes the
    /// current directory immediately; an uncached one is fetched and merged
    /// first. On fetch failure the error flag is set and the current
    /// directory stays where it was.
    pub async fn descend(&self, name: &str) -> Result<()> {
        let (target, provider, repo, branch) = {
            let mut state = self.state.lock().unwrap();
            let branch = state.selection.branch.clone().ok_or(StoreError::NoBranch)?;
            state.selection.cursor.fetch_error = false;

            match state.selection.cursor.classify(&state.trees, &branch, name) {
                None => {
                    // Nothing cached for the current directory; there is no
                    // child to enter.
                    self.publish(&state);
                    return Ok(());
                }
                Some(Classification::File) => {
                    let file = state.selection.cursor.path.child(name)?;
                    state.selection.cursor.selected_file = Some(file);
                    self.publish(&state);
                    return Ok(());
                }
                Some(Classification::Directory { cached: true }) => {
                    state.selection.cursor.path = state.selection.cursor.path.child(name)?;
                    self.publish(&state);
                    return Ok(());
                }
                Some(Classification::Directory { cached: false }) => {
                    let target = state.selection.cursor.path.child(name)?;
                    let provider = state.selection.provider.clone().ok_or(StoreError::NoProvider)?;
                    let repo = state
                        .selection
                        .repository
                        .clone()
                        .ok_or(StoreError::NoRepository)?;
                    self.publish(&state);
                    (target, provider, repo, branch)
                }
            }
        };

        let result = self
            .api
            .fetch_listing(&provider, &repo, &branch, &target)
            .await;

        let mut state = self.state.lock().unwrap();
        let still_active = state.selection.branch.as_deref() == Some(branch.as_str());
        match result {
            Ok(listing) => {
                // The merge always lands in the fetched branch's entry, even
                // if the user has moved on to another branch meanwhile.
                state.trees.merge(&branch, &target, &listing)?;
                if still_active {
                    state.selection.cursor.path = target;
                }
                self.publish(&state);
                Ok(())
            }
            Err(e) => {
                if e.is_authorization_required() {
                    state.needs_reauth = true;
                }
                if still_active {
                    state.selection.cursor.fetch_error = true;
                }
                self.publish(&state);
                Err(e.into())
            }
        }
    }

    /// Move the cursor to the parent directory. At the root this is a
    /// no-op. Clears the error flag.
    pub fn ascend(&self) {
        let mut state = self.state.lock().unwrap();
        state.selection.cursor.ascend();
        self.publish(&state);
    }

    /// Reset all selection fields and discard every cache.
    ///
    /// Used when the wizard is torn down, so nothing leaks into a later
    /// session.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.providers.clear();
        state.repositories.clear();
        state.branches.clear();
        state.selection.clear();
        state.trees.clear();
        state.needs_reauth = false;
        self.publish(&state);
    }
}

/// A store shared between a driver and its subscribers.
pub type SharedStore<A> = Arc<SourceStore<A>>;
