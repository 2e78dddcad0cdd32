use strum_macros::Display;
use thiserror::Error;

/// Backend operation a failure belongs to. Each one carries the fallback
/// message shown when the server gives no message of its own.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    Login,
    Register,
    CreateEmployee,
    ListEmployees,
    GetEmployee,
    UpdateEmployee(String),
    DeleteEmployee(String),
    MonthlyCutoffs,
    MonthlySalary,
}

impl Operation {
    pub fn default_message(&self) -> String {
        match self {
            Operation::Login => "Failed to login!".to_string(),
            Operation::Register => "Failed to register!".to_string(),
            Operation::CreateEmployee => "Failed to create new employee!".to_string(),
            Operation::ListEmployees => "Failed to fetch employees list!".to_string(),
            Operation::GetEmployee => "Failed to fetch employee data".to_string(),
            Operation::UpdateEmployee(n) => format!("Failed to update employee {}!", n),
            Operation::DeleteEmployee(n) => format!("Failed to delete employee {}!", n),
            Operation::MonthlyCutoffs => "Failed to fetch monthly cut-offs".to_string(),
            Operation::MonthlySalary => "Failed to fetch employee monthly salary".to_string(),
        }
    }
}

/// Client error type
///
/// `Clone` so a failed fetch can be handed to every caller that was waiting
/// on the same cache entry.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// Backend rejected the bearer token; the session is already cleared
    #[error("Session expired or unauthorized. Please log in again.")]
    SessionExpired,

    /// Protected call attempted without a stored token
    #[error("Not logged in")]
    NotAuthenticated,

    /// Generic operation failure with a human-readable message
    #[error("{message}")]
    Request {
        operation: Operation,
        status: Option<u16>,
        message: String,
    },

    /// Client-side form validation failed, nothing was sent
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    /// Session file could not be read or written
    #[error("Session storage error: {0}")]
    Session(String),
}

impl ApiError {
    pub fn request(operation: Operation, status: Option<u16>, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| operation.default_message());
        ApiError::Request {
            operation,
            status,
            message,
        }
    }

    /// Whether a read that failed this way is worth a second attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Request { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request { status, .. } => *status,
            ApiError::SessionExpired => Some(401),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        ApiError::Session(e.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}
