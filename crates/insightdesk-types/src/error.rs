use std::fmt;

/// Result type for insightdesk-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the types layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Filter label is not one of the known directory filters
    UnknownFilterLabel(String),

    /// Sort direction is neither `asc` nor `desc`
    InvalidSortDirection(String),

    /// Credit status string is not recognised
    UnknownCreditStatus(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownFilterLabel(label) => write!(f, "Unknown filter label: {}", label),
            Error::InvalidSortDirection(dir) => write!(f, "Invalid sort direction: {}", dir),
            Error::UnknownCreditStatus(status) => write!(f, "Unknown credit status: {}", status),
        }
    }
}

impl std::error::Error for Error {}
