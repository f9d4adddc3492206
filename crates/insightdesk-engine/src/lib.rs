// Engine module - pure directory view logic (no I/O, no async)
// This layer sits between domain types and the runtime controller

pub mod credit_gate;
pub mod filter_compiler;
pub mod list_cache;
pub mod pagination;
pub mod visibility;

pub use credit_gate::{GateDecision, decide};
pub use filter_compiler::{QueryParams, compile, is_composition_affecting, param_name, sort_params};
pub use list_cache::{ListCache, MergeOutcome};
pub use pagination::plan;
pub use visibility::{DisplayText, DisplayValue, EMPTY_MARKER, UnlockPlaceholder, resolve};
