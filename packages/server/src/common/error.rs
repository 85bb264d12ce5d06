use std::fmt;

use thiserror::Error;

use crate::kernel::StoreError;

/// Kind of record a uniqueness conflict was raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Team,
    User,
    PullRequest,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Team => write!(f, "team_name"),
            Resource::User => write!(f, "user_id"),
            Resource::PullRequest => write!(f, "PR id"),
        }
    }
}

/// Errors returned by every team, user and pull request operation.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("resource not found")]
    NotFound,

    #[error("{0} already exists")]
    AlreadyExists(Resource),

    #[error("cannot reassign on merged PR")]
    AlreadyMerged,

    #[error("reviewer is not assigned to this PR")]
    NotAssigned,

    #[error("no active replacement candidate in team")]
    NoCandidate,

    #[error("invalid request payload or parameters: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(#[source] StoreError),
}

impl DomainError {
    /// Stable symbolic code exposed to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound => "NOT_FOUND",
            DomainError::AlreadyExists(Resource::Team) => "TEAM_EXISTS",
            DomainError::AlreadyExists(Resource::User) => "USER_EXISTS",
            DomainError::AlreadyExists(Resource::PullRequest) => "PR_EXISTS",
            DomainError::AlreadyMerged => "PR_MERGED",
            DomainError::NotAssigned => "NOT_ASSIGNED",
            DomainError::NoCandidate => "NO_CANDIDATE",
            DomainError::BadRequest(_) => "BAD_REQUEST",
            DomainError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        DomainError::BadRequest(message.into())
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => DomainError::NotFound,
            StoreError::AlreadyExists(resource) => DomainError::AlreadyExists(resource),
            other => DomainError::Internal(other),
        }
    }
}
