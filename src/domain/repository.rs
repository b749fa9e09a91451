use std::fmt;
use thiserror::Error;

/// Errors surfaced by a repository client, collapsed to the kinds callers
/// dispatch on. Concrete clients keep their richer error types internally
/// and map onto these at the trait boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The provider answered 404 for the requested resource.
    #[error("resource not found in repository")]
    NotFound,

    /// Transport failure, unexpected status, or malformed response.
    #[error("repository client error: {reason}")]
    Client { reason: String },
}

/// Opaque commit identifier returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitId(pub String);

impl CommitId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CommitId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CommitId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// CI pipeline status as reported by the provider.
///
/// Only [`PipelineStatus::Success`] is ever acted on; the rest exist so a
/// parsed status stays meaningful in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    Created,
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
    Skipped,
    Manual,
    Unknown,
}

impl PipelineStatus {
    /// Parse a provider status string. Anything unrecognized maps to
    /// [`PipelineStatus::Unknown`], so only the exact wire string
    /// `"success"` can ever count as successful.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "created" => Self::Created,
            "pending" => Self::Pending,
            "running" => Self::Running,
            "success" => Self::Success,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            "skipped" => Self::Skipped,
            "manual" => Self::Manual,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// A CI pipeline run associated with a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub id: u64,
    pub status: PipelineStatus,
}

/// A commit together with its most recent pipeline, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: CommitId,
    pub last_pipeline: Option<Pipeline>,
}

/// A commit as returned by the provider's commit search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub id: CommitId,
    pub short_id: String,
    pub title: String,
    pub message: String,
}

/// Client for one Git-hosting provider's commit and pipeline endpoints.
///
/// Every operation returns [`ClientError::NotFound`] on a 404 and
/// [`ClientError::Client`] on any other failure.
pub trait RepositoryClient: fmt::Debug {
    /// Fetch the content of a file on the configured branch.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] when the file does not exist.
    fn fetch_file(&self, path: &str) -> Result<String, ClientError>;

    /// Create a file through a single-action commit, returning the commit id.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit cannot be created.
    fn create_file(&self, path: &str, content: &str, message: &str)
    -> Result<CommitId, ClientError>;

    /// Replace a file's content through a single-action commit, returning
    /// the commit id.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit cannot be created.
    fn update_file(&self, path: &str, content: &str, message: &str)
    -> Result<CommitId, ClientError>;

    /// Fetch a commit, including its last pipeline when one exists.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] when the commit does not exist.
    fn commit(&self, id: &CommitId) -> Result<Commit, ClientError>;

    /// List the pipelines triggered for a commit hash, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn pipelines_for(&self, id: &CommitId) -> Result<Vec<Pipeline>, ClientError>;

    /// Retrigger a pipeline by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the retry request fails.
    fn retry_pipeline(&self, pipeline_id: u64) -> Result<Pipeline, ClientError>;

    /// Find the most recent commit whose message contains the fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if the search request fails.
    fn find_commit_by_message(&self, fragment: &str)
    -> Result<Option<CommitSummary>, ClientError>;
}

impl<C: RepositoryClient + ?Sized> RepositoryClient for Box<C> {
    fn fetch_file(&self, path: &str) -> Result<String, ClientError> {
        (**self).fetch_file(path)
    }

    fn create_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<CommitId, ClientError> {
        (**self).create_file(path, content, message)
    }

    fn update_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<CommitId, ClientError> {
        (**self).update_file(path, content, message)
    }

    fn commit(&self, id: &CommitId) -> Result<Commit, ClientError> {
        (**self).commit(id)
    }

    fn pipelines_for(&self, id: &CommitId) -> Result<Vec<Pipeline>, ClientError> {
        (**self).pipelines_for(id)
    }

    fn retry_pipeline(&self, pipeline_id: u64) -> Result<Pipeline, ClientError> {
        (**self).retry_pipeline(pipeline_id)
    }

    fn find_commit_by_message(
        &self,
        fragment: &str,
    ) -> Result<Option<CommitSummary>, ClientError> {
        (**self).find_commit_by_message(fragment)
    }
}
