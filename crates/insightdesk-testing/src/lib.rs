//! Testing infrastructure for insightdesk integration tests.
//!
//! - `FakeBackend`: in-memory directory service with scripted failures,
//!   response delays and a call log
//! - `fixtures`: sample employee records

pub mod backend;
pub mod fixtures;

pub use backend::{BackendCall, FakeBackend};
