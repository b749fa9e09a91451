use log::{debug, info};
use thiserror::Error;

use crate::domain::{
    ClientError, CommitId, CommitSummary, Domain, ListAction, ListError, RepositoryClient, apply,
};

/// Errors that can occur during list service operations
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The list mutation was rejected.
    #[error(transparent)]
    List(#[from] ListError),

    /// The repository client failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Domain-list operations over any repository client.
///
/// A thin pass-through: the client does the talking, this layer applies the
/// line mutation and decides where a not-found answer is recoverable.
pub struct ListService<C: RepositoryClient> {
    client: C,
}

impl<C: RepositoryClient> ListService<C> {
    #[must_use]
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Access the underlying repository client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Add or remove a domain in its list file and commit the change.
    ///
    /// A missing list file is created with the single domain name as its
    /// entire content.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::List`] when the mutation is rejected
    /// (already added / not listed) and [`ServiceError::Client`] when the
    /// repository calls fail.
    pub fn update_list(
        &self,
        action: ListAction,
        domain: &Domain,
        message: &str,
    ) -> Result<CommitId, ServiceError> {
        let path = domain.list_path();
        debug!("Applying {action:?} of {domain} to {path}");

        let current = match self.client.fetch_file(&path) {
            Ok(content) => content,
            Err(ClientError::NotFound) => {
                info!("List file {path} does not exist yet, creating it");
                return Ok(self.client.create_file(&path, domain.name(), message)?);
            }
            Err(e) => return Err(e.into()),
        };

        let updated = apply(action, &current, domain.name())?;
        let commit = self.client.update_file(&path, &updated, message)?;
        info!("Committed {action:?} of {domain} to {path} as {commit}");

        Ok(commit)
    }

    /// Whether the commit's last pipeline finished successfully.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Client`] when the commit lookup fails,
    /// including when the commit itself does not exist.
    pub fn is_pipeline_success(&self, commit_id: &CommitId) -> Result<bool, ServiceError> {
        let commit = self.client.commit(commit_id)?;
        Ok(commit
            .last_pipeline
            .is_some_and(|p| p.status.is_success()))
    }

    /// Retrigger the latest pipeline of a commit unless it already
    /// succeeded.
    ///
    /// Returns `false` when the commit has no pipelines (or the lookup
    /// answers 404), `true` without retrying when the latest pipeline is
    /// already successful, and otherwise whether the retry request went
    /// through.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Client`] on any failure other than 404.
    pub fn restart_pipeline(&self, commit_id: &CommitId) -> Result<bool, ServiceError> {
        let pipelines = match self.client.pipelines_for(commit_id) {
            Ok(pipelines) => pipelines,
            Err(ClientError::NotFound) => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let Some(latest) = pipelines.first() else {
            return Ok(false);
        };
        if latest.status.is_success() {
            debug!("Pipeline {} of {commit_id} already succeeded", latest.id);
            return Ok(true);
        }

        match self.client.retry_pipeline(latest.id) {
            Ok(pipeline) => {
                info!("Retriggered pipeline {} of {commit_id}", pipeline.id);
                Ok(true)
            }
            Err(ClientError::NotFound) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Find the most recent commit whose message contains the fragment.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Client`] when the search fails.
    pub fn last_commit_matching(
        &self,
        fragment: &str,
    ) -> Result<Option<CommitSummary>, ServiceError> {
        Ok(self.client.find_commit_by_message(fragment)?)
    }
}
