pub mod factory;
pub mod gitlab;

pub use factory::{FactoryError, create_client};
pub use gitlab::{GitlabClient, GitlabError};
