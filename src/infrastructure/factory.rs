use thiserror::Error;

use super::gitlab::{GitlabClient, GitlabError};
use crate::config::Settings;
use crate::domain::RepositoryClient;

/// Errors that can occur when selecting a client implementation
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("unknown repository provider '{0}'")]
    UnknownProvider(String),

    #[error(transparent)]
    Gitlab(#[from] GitlabError),
}

/// Build the repository client selected by the configured provider key.
///
/// # Errors
///
/// Returns [`FactoryError::UnknownProvider`] for an unrecognized key and
/// propagates client construction failures.
pub fn create_client(settings: &Settings) -> Result<Box<dyn RepositoryClient>, FactoryError> {
    match settings.provider.as_str() {
        "gitlab" => Ok(Box::new(GitlabClient::new(settings)?)),
        other => Err(FactoryError::UnknownProvider(other.to_owned())),
    }
}
