//! Git provider and repository identity types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A connected git hosting integration.
///
/// The wire form is tagged by a `provider` field, matching the platform
/// API's JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider")]
pub enum Provider {
    /// A GitHub app installation.
    #[serde(rename = "github")]
    GitHub {
        /// Organization or account the app is installed on.
        name: String,
        /// The app installation id.
        installation_id: u64,
    },
    /// A GitLab instance integration.
    #[serde(rename = "gitlab")]
    GitLab {
        /// Base URL of the GitLab instance.
        instance_url: String,
        /// The integration id.
        integration_id: u64,
    },
}

impl Provider {
    /// The provider's stable id.
    ///
    /// A GitHub provider is identified by its installation id, a GitLab
    /// provider by its integration id. These double as the cache key for
    /// per-provider repository lists.
    pub fn id(&self) -> ProviderId {
        match self {
            Provider::GitHub {
                installation_id, ..
            } => ProviderId(*installation_id),
            Provider::GitLab { integration_id, .. } => ProviderId(*integration_id),
        }
    }
}

/// Stable identifier for a provider integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderId(pub u64);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The hosting kind of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoKind {
    /// Hosted on GitHub.
    GitHub,
    /// Hosted on GitLab.
    GitLab,
}

/// A repository available through a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Full name in `owner/name` form.
    pub name: String,
    /// The hosting kind.
    pub kind: RepoKind,
}

impl Repository {
    /// Create a repository record.
    pub fn new(name: impl Into<String>, kind: RepoKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Split the full name into owner and bare name.
    ///
    /// Returns `None` if the name is not in `owner/name` form.
    pub fn owner_and_name(&self) -> Option<(&str, &str)> {
        self.name.split_once('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_wire_form() {
        let github: Provider = serde_json::from_str(
            r#"{"provider": "github", "name": "OrganizationName", "installation_id": 12390312}"#,
        )
        .unwrap();
        assert_eq!(github.id(), ProviderId(12390312));

        let gitlab: Provider = serde_json::from_str(
            r#"{"provider": "gitlab", "instance_url": "https://instance.url", "integration_id": 32}"#,
        )
        .unwrap();
        assert_eq!(gitlab.id(), ProviderId(32));
    }

    #[test]
    fn test_owner_and_name() {
        let repo = Repository::new("porter-dev/porter", RepoKind::GitHub);
        assert_eq!(repo.owner_and_name(), Some(("porter-dev", "porter")));

        let bare = Repository::new("porter", RepoKind::GitHub);
        assert_eq!(bare.owner_and_name(), None);
    }
}
