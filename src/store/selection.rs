//! The current provider/repository/branch selection.

use crate::provider::{Provider, Repository};

use super::cursor::Cursor;

/// The user's current pick of provider, repository, and branch, plus the
/// navigation cursor into the branch tree.
///
/// Changing a higher-level selection cascades: a new provider resets the
/// repository, branch, and cursor; a new repository resets the branch and
/// cursor; a new branch resets the cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// The chosen git provider, if any.
    pub provider: Option<Provider>,
    /// The chosen repository, if any.
    pub repository: Option<Repository>,
    /// The chosen branch, if any.
    pub branch: Option<String>,
    /// The navigation cursor within the chosen branch.
    pub cursor: Cursor,
}

impl Selection {
    /// Replace the current provider, resetting everything below it.
    pub fn set_provider(&mut self, provider: Provider) {
        self.provider = Some(provider);
        self.repository = None;
        self.branch = None;
        self.cursor.reset();
    }

    /// Replace the current repository, resetting the branch and cursor.
    pub fn set_repository(&mut self, repository: Repository) {
        self.repository = Some(repository);
        self.branch = None;
        self.cursor.reset();
    }

    /// Replace the current branch, resetting the cursor to the root.
    pub fn set_branch(&mut self, branch: &str) {
        self.branch = Some(branch.to_string());
        self.cursor.reset();
    }

    /// Reset every field to its initial empty value.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::RepoKind;
    use crate::tree::TreePath;

    fn populated() -> Selection {
        let mut selection = Selection::default();
        selection.set_provider(Provider::GitHub {
            name: "acme".to_string(),
            installation_id: 1,
        });
        selection.set_repository(Repository::new("acme/site", RepoKind::GitHub));
        selection.set_branch("main");
        selection.cursor.path = TreePath::parse("app/models");
        selection.cursor.fetch_error = true;
        selection
    }

    #[test]
    fn test_set_provider_resets_everything_below() {
        let mut selection = populated();
        selection.set_provider(Provider::GitLab {
            instance_url: "https://gitlab.example.com".to_string(),
            integration_id: 2,
        });

        assert!(selection.provider.is_some());
        assert_eq!(selection.repository, None);
        assert_eq!(selection.branch, None);
        assert_eq!(selection.cursor, Cursor::default());
    }

    #[test]
    fn test_set_repository_resets_branch_and_cursor() {
        let mut selection = populated();
        let provider = selection.provider.clone();
        selection.set_repository(Repository::new("acme/other", RepoKind::GitHub));

        assert_eq!(selection.provider, provider);
        assert_eq!(selection.branch, None);
        assert!(selection.cursor.path.is_root());
    }

    #[test]
    fn test_set_branch_resets_cursor_only() {
        let mut selection = populated();
        selection.set_branch("feature-x");

        assert!(selection.repository.is_some());
        assert_eq!(selection.branch.as_deref(), Some("feature-x"));
        assert!(selection.cursor.path.is_root());
        assert!(!selection.cursor.fetch_error);
    }

    #[test]
    fn test_clear() {
        let mut selection = populated();
        selection.clear();
        assert_eq!(selection, Selection::default());
    }
}
