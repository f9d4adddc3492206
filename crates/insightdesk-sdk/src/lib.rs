//! insightdesk-sdk: browse tenant audience directories over HTTP.
//!
//! # Overview
//!
//! `insightdesk-sdk` connects the directory controller in
//! `insightdesk-runtime` to the insightdesk REST API. A [`Client`] holds one
//! authenticated session scoped to one tenant; each [`Directory`] it opens
//! is an independent browser with its own filters, sort, pagination and
//! unlock flow.
//!
//! # Quickstart
//!
//! ```no_run
//! use insightdesk_sdk::{Client, FilterLabel};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::builder().token("secret").domain("acme.test").build()?;
//! let employees = client.employees(42);
//!
//! employees.load().await?;
//! employees.set_filter(FilterLabel::Department, "Sales, Engineering").await?;
//!
//! let snapshot = employees.snapshot();
//! println!("{} of {} records", snapshot.records.len(), snapshot.page.total_count);
//! # Ok(())
//! # }
//! ```
//!
//! # Unlocking hidden fields
//!
//! ```no_run
//! use insightdesk_sdk::{Client, RecordId, UnlockOutcome};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::connect_default()?;
//! let leads = client.leads();
//! leads.load().await?;
//!
//! match leads.request_unlock(RecordId(7)).await? {
//!     UnlockOutcome::NeedsConfirmation(pending) => {
//!         leads.confirm_unlock(pending).await?;
//!     }
//!     UnlockOutcome::UpgradeRequired => println!("out of credits"),
//!     other => println!("{:?}", other),
//! }
//! for notice in leads.take_notices() {
//!     println!("{}", notice.message());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! This SDK acts as a facade over:
//! - `insightdesk-types`: records, fields, filters, sort and page state
//! - `insightdesk-engine`: filter compilation, pagination planning, field display
//! - `insightdesk-runtime`: the directory controller and its async view

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod wire;

pub use client::{Client, ClientBuilder, Directory};
pub use config::{
    ApiConfig, CONFIG_ENV, Config, DirectoryConfig, DirectoryEndpoints, SessionConfig, TOKEN_ENV,
    resolve_config_path,
};
pub use error::{Error, Result};
pub use http::HttpBackend;

// Re-export the domain model so callers need only this crate
pub use insightdesk_engine::{DisplayValue, EMPTY_MARKER, QueryParams, UnlockPlaceholder, resolve};
pub use insightdesk_runtime::{
    ApplyOutcome, BackendError, DirectoryBackend, DirectorySnapshot, DirectoryView, ListPage,
    ListQuery, LoadState, Notice, PendingUnlock, UnlockOutcome, ViewStatus,
};
pub use insightdesk_types::{
    AccessStatus, CreditStatus, Field, FilterLabel, FilterSelection, PageState, Record, RecordId,
    SessionContext, SortDirection, SortState, TenantScope, Visibility,
};
