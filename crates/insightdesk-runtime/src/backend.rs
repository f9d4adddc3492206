use insightdesk_engine::QueryParams;
use insightdesk_types::{AccessStatus, CreditStatus, Record, RecordId};
use std::fmt;
use std::future::Future;

/// One list request: compiled filters and sort, plus the page window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub params: QueryParams,
    /// 1-based, as the backend counts pages.
    pub page: usize,
    pub per_page: usize,
}

impl ListQuery {
    /// Filters, sort and paging in the order they go on the wire.
    pub fn to_params(&self) -> QueryParams {
        let mut params = self.params.clone();
        params.push("page", self.page.to_string());
        params.push("per_page", self.per_page.to_string());
        params
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub records: Vec<Record>,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Connection failed, timed out, or the body could not be read
    Transport(String),

    /// Non-success status without a recognised access precondition
    Status { code: u16, message: String },

    /// 403 carrying a known precondition code
    AccessDenied(AccessStatus),

    /// Response body did not have the expected shape
    Malformed(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Transport(msg) => write!(f, "Transport error: {}", msg),
            BackendError::Status { code, message } => {
                write!(f, "Backend returned {}: {}", code, message)
            }
            BackendError::AccessDenied(status) => write!(f, "Access restricted: {}", status),
            BackendError::Malformed(msg) => write!(f, "Malformed response: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

/// The remote directory service, as the controller consumes it.
///
/// Implementations carry their own session and tenant scope; nothing here
/// reads ambient state.
pub trait DirectoryBackend {
    fn fetch_list(
        &self,
        query: &ListQuery,
    ) -> impl Future<Output = Result<ListPage, BackendError>> + Send;

    fn fetch_record(&self, id: RecordId)
    -> impl Future<Output = Result<Record, BackendError>> + Send;

    /// Queried fresh on every unlock attempt.
    fn credit_status(&self) -> impl Future<Output = Result<CreditStatus, BackendError>> + Send;

    /// Spend one credit to reveal `id`. Not safe to retry blindly.
    fn charge(&self, id: RecordId) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// CSV of every record matching `params` (filters and sort, no paging).
    fn export_csv(
        &self,
        params: &QueryParams,
    ) -> impl Future<Output = Result<Vec<u8>, BackendError>> + Send;
}
