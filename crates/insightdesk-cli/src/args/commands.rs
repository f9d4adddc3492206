use super::common::{DirectoryArgs, FilterArgs, SortArgs};
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List one page of a directory")]
    List(ListArgs),

    #[command(about = "Spend a credit to reveal a record's hidden fields")]
    Unlock(UnlockArgs),

    #[command(about = "Show the current credit status")]
    Credits,

    #[command(about = "Export every matching record as CSV")]
    Export(ExportArgs),

    #[command(about = "Inspect or create the config file")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub directory: DirectoryArgs,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(flatten)]
    pub sort: SortArgs,

    #[arg(long, default_value = "1", help = "Page number, starting at 1")]
    pub page: usize,

    #[arg(long, help = "Rows per page (default: directory.default_page_size)")]
    pub per_page: Option<usize>,

    #[arg(long, value_delimiter = ',', help = "Columns to show, comma separated")]
    pub columns: Vec<String>,
}

#[derive(Debug, Args)]
pub struct UnlockArgs {
    #[arg(help = "Record id")]
    pub id: u64,

    #[arg(long, short, help = "Spend the credit without asking")]
    pub yes: bool,

    #[command(flatten)]
    pub directory: DirectoryArgs,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub directory: DirectoryArgs,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(flatten)]
    pub sort: SortArgs,

    #[arg(long, short, help = "Write the CSV here instead of stdout")]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Print the resolved config (token redacted)")]
    Show,

    #[command(about = "Write a config file with defaults")]
    Init {
        #[arg(long, help = "Overwrite an existing file")]
        force: bool,
    },
}
