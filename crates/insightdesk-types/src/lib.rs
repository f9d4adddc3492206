pub mod credit;
pub mod error;
pub mod field;
pub mod filter;
pub mod page;
pub mod record;
pub mod scope;
pub mod sort;

pub use credit::{AccessStatus, CreditStatus};
pub use error::{Error, Result};
pub use field::{Field, Visibility};
pub use filter::{FilterLabel, FilterSelection};
pub use page::{PAGE_SIZE_LADDER, DEFAULT_PAGE_SIZE, PageState};
pub use record::{Record, RecordId};
pub use scope::{SessionContext, TenantScope};
pub use sort::{SortDirection, SortState};
