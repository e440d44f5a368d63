//! An HTTP implementation of the listing APIs against the platform server.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use crate::config::ApiConfig;
use crate::provider::{Provider, RepoKind, Repository};
use crate::tree::TreePath;

use super::error::{FetchError, Result};
use super::fetcher::{ContentFetcher, ProviderApi};
use super::types::{EntryKind, ListingEntry};

/// Characters escaped when a value is embedded as a URL path segment.
/// Branch names in particular may contain '/'.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'?')
    .add(b'{')
    .add(b'}');

/// The directory argument the API uses for a branch's root listing.
const ROOT_DIR: &str = "./";

/// An HTTP-based implementation of [`ProviderApi`] and [`ContentFetcher`].
///
/// Operates against the platform API server on behalf of one project.
pub struct HttpSourceApi {
    client: Client,
    base_url: String,
    project_id: u64,
    token: Option<String>,
}

impl HttpSourceApi {
    /// Create a new client from the given configuration.
    pub fn new(config: ApiConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Create a new client with a custom reqwest client.
    pub fn with_client(client: Client, config: ApiConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id,
            token: config.token,
        }
    }

    fn providers_url(&self) -> String {
        format!(
            "{}/api/projects/{}/gitproviders",
            self.base_url, self.project_id
        )
    }

    fn github_repos_url(&self, installation_id: u64) -> String {
        format!(
            "{}/api/projects/{}/gitrepos/{}/repos",
            self.base_url, self.project_id, installation_id
        )
    }

    fn gitlab_repos_url(&self, integration_id: u64) -> String {
        format!(
            "{}/api/projects/{}/integrations/gitlab/{}/repos",
            self.base_url, self.project_id, integration_id
        )
    }

    fn branches_url(&self, provider: &Provider, owner: &str, name: &str) -> String {
        let owner = utf8_percent_encode(owner, PATH_SEGMENT);
        let name = utf8_percent_encode(name, PATH_SEGMENT);
        match provider {
            Provider::GitHub {
                installation_id, ..
            } => format!(
                "{}/api/projects/{}/gitrepos/{}/repos/github/{}/{}/branches",
                self.base_url, self.project_id, installation_id, owner, name
            ),
            Provider::GitLab { integration_id, .. } => format!(
                "{}/api/projects/{}/integrations/gitlab/{}/repos/{}/{}/branches",
                self.base_url, self.project_id, integration_id, owner, name
            ),
        }
    }

    fn contents_url(&self, provider: &Provider, owner: &str, name: &str, branch: &str) -> String {
        format!(
            "{}/{}/contents",
            self.branches_url(provider, owner, name),
            utf8_percent_encode(branch, PATH_SEGMENT)
        )
    }

    fn get(&self, url: String) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(FetchError::AuthorizationRequired)
            }
            StatusCode::NOT_FOUND => Err(FetchError::NotFound),
            status => Err(FetchError::Network(format!(
                "unexpected status code: {}",
                status
            ))),
        }
    }

    /// The owner and bare name of a repository, for URL construction.
    fn split_repo(repo: &Repository) -> Result<(&str, &str)> {
        repo.owner_and_name().ok_or_else(|| {
            FetchError::Malformed(format!("repository name '{}' is not owner/name", repo.name))
        })
    }
}

/// Wire shape of a GitHub repository record.
#[derive(Deserialize)]
struct GithubRepoRecord {
    #[serde(rename = "FullName")]
    full_name: String,
    #[serde(rename = "Kind")]
    kind: RepoKind,
}

/// Wire shape of a directory content entry.
///
/// The server returns each entry's path prefixed with the listed directory
/// (`app/models/user.ts` when listing `app/models`); the prefix is stripped
/// down to the bare child name before the entry is returned.
#[derive(Deserialize)]
struct ContentRecord {
    path: String,
    #[serde(rename = "type")]
    kind: EntryKind,
}

impl ContentRecord {
    fn into_entry(self, dir: &str) -> ListingEntry {
        let name = if dir == ROOT_DIR {
            self.path
        } else {
            let prefix = format!("{}/", dir);
            match self.path.strip_prefix(&prefix) {
                Some(stripped) => stripped.to_string(),
                None => self.path,
            }
        };
        ListingEntry { name, kind: self.kind }
    }
}

#[async_trait]
impl ProviderApi for HttpSourceApi {
    async fn list_providers(&self) -> Result<Vec<Provider>> {
        let response = self.send(self.get(self.providers_url())).await?;
        Ok(response.json().await?)
    }

    async fn list_repositories(&self, provider: &Provider) -> Result<Vec<Repository>> {
        match provider {
            Provider::GitHub {
                installation_id, ..
            } => {
                let response = self
                    .send(self.get(self.github_repos_url(*installation_id)))
                    .await?;
                let records: Vec<GithubRepoRecord> = response.json().await?;
                Ok(records
                    .into_iter()
                    .map(|record| Repository::new(record.full_name, record.kind))
                    .collect())
            }
            Provider::GitLab { integration_id, .. } => {
                let response = self
                    .send(self.get(self.gitlab_repos_url(*integration_id)))
                    .await?;
                // GitLab integrations return bare repository names.
                let names: Vec<String> = response.json().await?;
                Ok(names
                    .into_iter()
                    .map(|name| Repository::new(name, RepoKind::GitLab))
                    .collect())
            }
        }
    }

    async fn list_branches(&self, provider: &Provider, repo: &Repository) -> Result<Vec<String>> {
        let (owner, name) = Self::split_repo(repo)?;
        let response = self
            .send(self.get(self.branches_url(provider, owner, name)))
            .await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ContentFetcher for HttpSourceApi {
    async fn fetch_listing(
        &self,
        provider: &Provider,
        repo: &Repository,
        branch: &str,
        path: &TreePath,
    ) -> Result<Vec<ListingEntry>> {
        let (owner, name) = Self::split_repo(repo)?;
        let dir = if path.is_root() {
            ROOT_DIR.to_string()
        } else {
            path.to_string()
        };

        let request = self
            .get(self.contents_url(provider, owner, name, branch))
            .query(&[("dir", dir.as_str())]);
        let response = self.send(request).await?;

        let records: Vec<ContentRecord> = response.json().await?;
        Ok(records
            .into_iter()
            .map(|record| record.into_entry(&dir))
            .collect())
    }
}
