pub mod list;
pub mod repository;

pub use list::{Domain, ListAction, ListError, ListKind, apply};
pub use repository::{
    ClientError, Commit, CommitId, CommitSummary, Pipeline, PipelineStatus, RepositoryClient,
};
