use anyhow::{Result, bail};
use insightdesk_sdk::{Config, resolve_config_path};

use crate::args::ConfigCommand;
use crate::context::Context;
use crate::types::OutputFormat;

const REDACTED: &str = "<redacted>";

pub fn handle(ctx: &Context, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => show(ctx),
        ConfigCommand::Init { force } => init(ctx, force),
    }
}

fn show(ctx: &Context) -> Result<()> {
    let path = resolve_config_path(ctx.config_path.as_deref())?;
    let mut config = ctx.load_config()?;
    if let Some(url) = &ctx.base_url {
        config.api.base_url = url.clone();
    }
    if let Some(domain) = &ctx.domain {
        config.session.domain = Some(domain.clone());
    }
    let token_set = config.token().is_some();
    config.session.token = token_set.then(|| REDACTED.to_string());

    match ctx.format {
        OutputFormat::Plain => {
            println!("# {}{}", path.display(), if path.exists() { "" } else { " (not found, defaults)" });
            print!("{}", toml::to_string_pretty(&config)?);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "path": path.display().to_string(),
                "exists": path.exists(),
                "config": config,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn init(ctx: &Context, force: bool) -> Result<()> {
    let path = resolve_config_path(ctx.config_path.as_deref())?;
    if path.exists() && !force {
        bail!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    let mut config = Config::default();
    if let Some(url) = &ctx.base_url {
        config.api.base_url = url.clone();
    }
    config.session.domain = ctx.domain.clone();
    config.save_to(&path)?;

    println!("Wrote {}", path.display());
    if config.session.domain.is_none() {
        println!("Set session.domain, and session.token or INSIGHTDESK_TOKEN, before listing.");
    }
    Ok(())
}
