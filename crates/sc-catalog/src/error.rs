//! Catalog Error Types

use thiserror::Error;

use crate::repository::StoreError;

/// Closed set of failure kinds surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    PermissionDenied,
    NotFound,
    Conflict,
    Storage,
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    PermissionDenied { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied { message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    pub fn service_not_found() -> Self {
        Self::not_found(messages::SERVICE_NOT_FOUND)
    }

    pub fn team_not_found() -> Self {
        Self::not_found(messages::TEAM_NOT_FOUND)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Storage(_) | Self::Internal { .. } => ErrorKind::Storage,
        }
    }
}

/// User-facing messages, one per rule.
pub mod messages {
    pub const NO_TEAM: &str =
        "In order to create a service, you should be member of at least one team";
    pub const PRODUCTION_ENDPOINT_REQUIRED: &str =
        "You must provide a production endpoint in the manifest file.";
    pub const MANIFEST_ID_REQUIRED: &str = "You must provide an id in the manifest file.";
    pub const SERVICE_NOT_FOUND: &str = "Service not found";
    pub const INSTANCE_NOT_FOUND: &str = "Instance not found";
    pub const TEAM_NOT_FOUND: &str = "Team not found";
    pub const USER_NOT_FOUND: &str = "User not found";
    pub const NO_SERVICE_ACCESS: &str = "This user does not have access to this service";
    pub const NO_INSTANCE_ACCESS: &str = "This user does not have access to this instance";
    pub const NOT_TEAM_MEMBER: &str = "This user is not a member of this team";
    pub const SERVICE_HAS_INSTANCES: &str = "This service cannot be removed because it has instances.\nPlease remove these instances before removing the service.";
    pub const TEAM_ALREADY_HAS_ACCESS: &str = "This team already has access to this service";
    pub const TEAM_HAS_NO_ACCESS: &str = "This team does not have access to this service";
    pub const ORPHANED_SERVICE: &str = "You can not revoke the access from this team, because it is the unique team with access to this service, and a service can not be orphaned";
}

pub type Result<T> = std::result::Result<T, CatalogError>;
