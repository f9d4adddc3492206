pub mod backend;
pub mod controller;
pub mod error;
pub mod notice;
pub mod view;

pub use backend::{BackendError, DirectoryBackend, ListPage, ListQuery};
pub use controller::{
    ApplyOutcome, ChargeStep, DirectoryController, DirectorySnapshot, FetchTicket, GateStep,
    LoadState, MergeStep, UnlockStage, UnlockTicket, ViewStatus,
};
pub use error::{Error, Result};
pub use notice::Notice;
pub use view::{DirectoryView, PendingUnlock, UnlockOutcome};
