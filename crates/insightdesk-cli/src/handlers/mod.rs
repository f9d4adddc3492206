pub mod config;
pub mod credits;
pub mod export;
pub mod list;
pub mod unlock;
