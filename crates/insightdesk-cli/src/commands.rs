use super::args::{Cli, Commands};
use super::context::Context;
use super::handlers;
use super::logging;
use anyhow::Result;

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level);

    let ctx = Context {
        config_path: cli.config,
        base_url: cli.base_url,
        domain: cli.domain,
        format: cli.format,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match cli.command {
            Commands::List(args) => handlers::list::handle(&ctx, args).await,
            Commands::Unlock(args) => handlers::unlock::handle(&ctx, args).await,
            Commands::Credits => handlers::credits::handle(&ctx).await,
            Commands::Export(args) => handlers::export::handle(&ctx, args).await,
            Commands::Config { command } => handlers::config::handle(&ctx, command),
        }
    })
}
