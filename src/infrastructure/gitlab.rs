use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::Settings;
use crate::domain::{
    ClientError, Commit, CommitId, CommitSummary, Pipeline, PipelineStatus, RepositoryClient,
};

const USER_AGENT: &str = "listkeeper";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors that can occur when talking to the GitLab API
#[derive(Debug, Error)]
pub enum GitlabError {
    #[error("failed to create HTTP client")]
    ClientInit(#[source] reqwest::Error),

    #[error("failed to fetch {operation} from {url}")]
    Request {
        operation: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GitLab API returned status {status} for {url}")]
    ApiStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("GitLab API returned 404 for {url}")]
    NotFound { url: String },

    #[error("failed to parse response from {url}")]
    ParseResponse {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Commit creation request body
#[derive(Serialize)]
struct CommitRequest<'a> {
    branch: &'a str,
    commit_message: &'a str,
    actions: Vec<CommitActionPayload<'a>>,
}

/// A single file create/update action inside a commit request
#[derive(Serialize)]
struct CommitActionPayload<'a> {
    action: &'a str,
    file_path: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct RetryRequest<'a> {
    #[serde(rename = "ref")]
    ref_name: &'a str,
}

#[derive(Deserialize)]
struct CommitResponse {
    id: String,
}

#[derive(Deserialize)]
struct PipelineResponse {
    id: u64,
    status: String,
}

#[derive(Deserialize)]
struct CommitDetailResponse {
    id: String,
    last_pipeline: Option<PipelineResponse>,
}

#[derive(Deserialize)]
struct CommitSearchResponse {
    id: String,
    short_id: String,
    title: String,
    message: String,
}

impl From<PipelineResponse> for Pipeline {
    fn from(p: PipelineResponse) -> Self {
        Self {
            id: p.id,
            status: PipelineStatus::parse(&p.status),
        }
    }
}

/// Blocking client for one GitLab project's repository and pipeline
/// endpoints.
#[derive(Debug)]
pub struct GitlabClient {
    client: reqwest::blocking::Client,
    base_url: String,
    token: String,
    project: String,
    branch: String,
}

impl GitlabClient {
    /// Create a client from settings.
    ///
    /// The project identifier is percent-encoded once here, so a
    /// "group/project" path works the same as a numeric id.
    ///
    /// # Errors
    ///
    /// Returns [`GitlabError::ClientInit`] if the HTTP client cannot be
    /// initialized.
    pub fn new(settings: &Settings) -> Result<Self, GitlabError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(GitlabError::ClientInit)?;

        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_owned(),
            token: settings.token.clone(),
            project: encode_segment(&settings.project_id),
            branch: settings.branch.clone(),
        })
    }

    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn set_branch(&mut self, branch: impl Into<String>) {
        self.branch = branch.into();
    }

    /// Fetch a file's content from the raw endpoint on the configured
    /// branch.
    ///
    /// # Errors
    ///
    /// Returns [`GitlabError::NotFound`] when the file does not exist.
    pub fn file_content(&self, path: &str) -> Result<String, GitlabError> {
        let url = format!(
            "{}/projects/{}/repository/files/{}/raw",
            self.base_url,
            self.project,
            encode_segment(path)
        );
        let response = self.get("file", &url, &[("ref", self.branch.as_str())])?;

        response.text().map_err(|source| GitlabError::ParseResponse {
            url,
            source,
        })
    }

    /// Create a file through a single-action commit.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit request fails.
    pub fn create_file_commit(
        &self,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<String, GitlabError> {
        self.commit_with_action("create", path, content, message)
    }

    /// Replace a file's content through a single-action commit.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit request fails.
    pub fn update_file_commit(
        &self,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<String, GitlabError> {
        self.commit_with_action("update", path, content, message)
    }

    fn commit_with_action(
        &self,
        action: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<String, GitlabError> {
        let url = format!("{}/projects/{}/repository/commits", self.base_url, self.project);
        let body = CommitRequest {
            branch: &self.branch,
            commit_message: message,
            actions: vec![CommitActionPayload {
                action,
                file_path: path,
                content,
            }],
        };

        let response = self.post("commit", &url, &body)?;
        let commit: CommitResponse =
            response
                .json()
                .map_err(|source| GitlabError::ParseResponse { url, source })?;

        Ok(commit.id)
    }

    /// Fetch a commit, embedding its last pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`GitlabError::NotFound`] when the commit does not exist.
    pub fn commit_detail(&self, commit_id: &str) -> Result<Commit, GitlabError> {
        let url = format!(
            "{}/projects/{}/repository/commits/{}",
            self.base_url, self.project, commit_id
        );
        let response = self.get("commit", &url, &[("ref_name", self.branch.as_str())])?;

        let detail: CommitDetailResponse =
            response
                .json()
                .map_err(|source| GitlabError::ParseResponse { url, source })?;

        Ok(Commit {
            id: CommitId::from(detail.id),
            last_pipeline: detail.last_pipeline.map(Pipeline::from),
        })
    }

    /// List the pipelines triggered for a commit hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub fn commit_pipelines(&self, commit_id: &str) -> Result<Vec<Pipeline>, GitlabError> {
        let url = format!("{}/projects/{}/pipelines", self.base_url, self.project);
        let response = self.get("pipelines", &url, &[("sha", commit_id)])?;

        let pipelines: Vec<PipelineResponse> =
            response
                .json()
                .map_err(|source| GitlabError::ParseResponse { url, source })?;

        Ok(pipelines.into_iter().map(Pipeline::from).collect())
    }

    /// Retrigger a pipeline by id. Requires at least the Maintainer role on
    /// the project, otherwise the API answers 403.
    ///
    /// # Errors
    ///
    /// Returns an error if the retry request fails.
    pub fn retry_pipeline_by_id(&self, pipeline_id: u64) -> Result<Pipeline, GitlabError> {
        let url = format!(
            "{}/projects/{}/pipelines/{}/retry",
            self.base_url, self.project, pipeline_id
        );
        let body = RetryRequest {
            ref_name: &self.branch,
        };

        let response = self.post("pipeline retry", &url, &body)?;
        let pipeline: PipelineResponse =
            response
                .json()
                .map_err(|source| GitlabError::ParseResponse { url, source })?;

        Ok(pipeline.into())
    }

    /// Search commits by message fragment, returning the most recent match.
    ///
    /// # Errors
    ///
    /// Returns an error if the search request fails.
    pub fn search_commit(&self, fragment: &str) -> Result<Option<CommitSummary>, GitlabError> {
        let url = format!("{}/projects/{}/search", self.base_url, self.project);
        let response = self.get("commit search", &url, &[("scope", "commits"), ("search", fragment)])?;

        let commits: Vec<CommitSearchResponse> =
            response
                .json()
                .map_err(|source| GitlabError::ParseResponse { url, source })?;

        Ok(commits.into_iter().next().map(|c| CommitSummary {
            id: CommitId::from(c.id),
            short_id: c.short_id,
            title: c.title,
            message: c.message,
        }))
    }

    fn get(
        &self,
        operation: &'static str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::blocking::Response, GitlabError> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .header("PRIVATE-TOKEN", &self.token)
            .query(query)
            .send()
            .map_err(|source| GitlabError::Request {
                operation,
                url: url.to_owned(),
                source,
            })?;

        Self::check_status(response, url)
    }

    fn post<B: Serialize>(
        &self,
        operation: &'static str,
        url: &str,
        body: &B,
    ) -> Result<reqwest::blocking::Response, GitlabError> {
        debug!("POST {url}");
        let response = self
            .client
            .post(url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(body)
            .send()
            .map_err(|source| GitlabError::Request {
                operation,
                url: url.to_owned(),
                source,
            })?;

        Self::check_status(response, url)
    }

    fn check_status(
        response: reqwest::blocking::Response,
        url: &str,
    ) -> Result<reqwest::blocking::Response, GitlabError> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GitlabError::NotFound {
                url: url.to_owned(),
            });
        }
        if !status.is_success() {
            error!("GitLab API returned {status} for {url}");
            return Err(GitlabError::ApiStatus {
                status,
                url: url.to_owned(),
            });
        }
        Ok(response)
    }
}

impl RepositoryClient for GitlabClient {
    fn fetch_file(&self, path: &str) -> Result<String, ClientError> {
        self.file_content(path).map_err(into_client_error)
    }

    fn create_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<CommitId, ClientError> {
        self.create_file_commit(path, content, message)
            .map(CommitId::from)
            .map_err(into_client_error)
    }

    fn update_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<CommitId, ClientError> {
        self.update_file_commit(path, content, message)
            .map(CommitId::from)
            .map_err(into_client_error)
    }

    fn commit(&self, id: &CommitId) -> Result<Commit, ClientError> {
        self.commit_detail(id.as_str()).map_err(into_client_error)
    }

    fn pipelines_for(&self, id: &CommitId) -> Result<Vec<Pipeline>, ClientError> {
        self.commit_pipelines(id.as_str()).map_err(into_client_error)
    }

    fn retry_pipeline(&self, pipeline_id: u64) -> Result<Pipeline, ClientError> {
        self.retry_pipeline_by_id(pipeline_id)
            .map_err(into_client_error)
    }

    fn find_commit_by_message(
        &self,
        fragment: &str,
    ) -> Result<Option<CommitSummary>, ClientError> {
        self.search_commit(fragment).map_err(into_client_error)
    }
}

/// Collapse the rich infrastructure error onto the kinds the domain
/// dispatches on.
fn into_client_error(e: GitlabError) -> ClientError {
    match e {
        GitlabError::NotFound { .. } => ClientError::NotFound,
        other => ClientError::Client {
            reason: other.to_string(),
        },
    }
}

/// Percent-encode a single path segment. Unreserved characters (RFC 3986)
/// pass through, everything else is encoded, including `/` so project paths
/// like "group/project" stay one segment.
fn encode_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(char::from(byte));
            }
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    encoded
}
