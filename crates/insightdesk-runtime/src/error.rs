use std::fmt;

use crate::backend::BackendError;
use insightdesk_types::RecordId;

/// Result type for insightdesk-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A backend call failed outside the list/unlock state machines
    Backend(BackendError),

    /// The view was closed; late results are not applied
    Cancelled,

    /// An unlock for this record is already in flight
    UnlockInProgress(RecordId),

    /// The unlock ticket no longer matches the record's current attempt
    StaleUnlock(RecordId),

    /// Invalid operation or state
    InvalidOperation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Backend(err) => write!(f, "Backend error: {}", err),
            Error::Cancelled => write!(f, "Directory view was closed"),
            Error::UnlockInProgress(id) => write!(f, "Unlock already in progress for record {}", id),
            Error::StaleUnlock(id) => write!(f, "Unlock attempt for record {} is no longer current", id),
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Backend(err) => Some(err),
            Error::Cancelled
            | Error::UnlockInProgress(_)
            | Error::StaleUnlock(_)
            | Error::InvalidOperation(_) => None,
        }
    }
}

impl From<BackendError> for Error {
    fn from(err: BackendError) -> Self {
        Error::Backend(err)
    }
}
