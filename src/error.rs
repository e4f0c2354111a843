//! Typed errors shared by every use-case
//!
//! The kind is preserved end-to-end so an API layer can map it to a status code;
//! each use-case only prefixes its component tag while the error travels up.

use sea_orm::{DbErr, SqlErr};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced entity absent for the given tenant scope
    NotFound,
    AlreadyExists,
    /// Malformed or unresolved caller-supplied reference
    InvalidParameter,
    /// Transition or mutation forbidden by the job state machine
    InvalidState,
    /// Internal precondition violated
    DataError,
    StoreConnection,
    BrokerConnection,
    /// Downstream service failed without a more specific cause
    DependencyFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::AlreadyExists => write!(f, "already exists"),
            ErrorKind::InvalidParameter => write!(f, "invalid parameter"),
            ErrorKind::InvalidState => write!(f, "invalid state"),
            ErrorKind::DataError => write!(f, "data error"),
            ErrorKind::StoreConnection => write!(f, "store connection error"),
            ErrorKind::BrokerConnection => write!(f, "broker connection error"),
            ErrorKind::DependencyFailure => write!(f, "dependency failure"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message} (component: {component})")]
pub struct OrchestrateError {
    pub kind: ErrorKind,
    pub message: String,
    pub component: String,
}

pub type Result<T> = std::result::Result<T, OrchestrateError>;

impl OrchestrateError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            component: String::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParameter, message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    pub fn data_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataError, message)
    }

    pub fn store_connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StoreConnection, message)
    }

    pub fn broker_connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BrokerConnection, message)
    }

    pub fn dependency_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DependencyFailure, message)
    }

    /// Prefix the component path, e.g. `use-cases.start-job.data-agents.job`
    pub fn extend_component(mut self, component: &str) -> Self {
        self.component = if self.component.is_empty() {
            component.to_string()
        } else {
            format!("{}.{}", component, self.component)
        };
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Only transient infrastructure failures are worth retrying with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::StoreConnection | ErrorKind::BrokerConnection | ErrorKind::DependencyFailure
        )
    }
}

impl From<DbErr> for OrchestrateError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(msg)) = err.sql_err() {
            return OrchestrateError::already_exists(msg);
        }

        match err {
            DbErr::RecordNotFound(msg) => OrchestrateError::not_found(msg),
            other => OrchestrateError::store_connection(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_component_prefixes_path() {
        let err = OrchestrateError::not_found("job not found")
            .extend_component("data-agents.job")
            .extend_component("use-cases.start-job");

        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.component, "use-cases.start-job.data-agents.job");
        assert!(err.to_string().contains("job not found"));
    }

    #[test]
    fn test_db_err_mapping() {
        let err: OrchestrateError = DbErr::RecordNotFound("missing".to_string()).into();
        assert!(err.is_not_found());

        let err: OrchestrateError = DbErr::Custom("boom".to_string()).into();
        assert_eq!(err.kind, ErrorKind::StoreConnection);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_logic_errors_are_not_retryable() {
        assert!(!OrchestrateError::invalid_state("x").is_retryable());
        assert!(!OrchestrateError::invalid_parameter("x").is_retryable());
        assert!(!OrchestrateError::data_error("x").is_retryable());
        assert!(OrchestrateError::broker_connection("x").is_retryable());
    }
}
