mod commands;
mod common;

pub use commands::*;
pub use common::*;

use crate::types::{LogLevel, OutputFormat};
use clap::Parser;

#[derive(Parser)]
#[command(name = "insightdesk")]
#[command(about = "Browse audience directories and unlock contact fields", long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Config file (default: $INSIGHTDESK_CONFIG or the user config dir)")]
    pub config: Option<String>,

    #[arg(long, global = true, help = "Override api.base_url")]
    pub base_url: Option<String>,

    #[arg(long, global = true, help = "Override session.domain (tenant scope)")]
    pub domain: Option<String>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}
