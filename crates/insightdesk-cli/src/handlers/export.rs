use anyhow::{Context as _, Result};
use insightdesk_engine::{compile, sort_params};
use insightdesk_sdk::{DirectoryBackend, FilterSelection};
use std::io::Write;
use tracing::info;

use crate::args::ExportArgs;
use crate::context::Context;

pub async fn handle(ctx: &Context, args: ExportArgs) -> Result<()> {
    let client = ctx.client(None)?;
    let directory = client.directory(args.directory.endpoints(client.config()));

    let mut filters = FilterSelection::new();
    for (label, value) in args.filters.entries()? {
        filters.set(label, value);
    }
    let mut params = compile(&filters);
    if let Some(sort) = args.sort.state() {
        params.extend(sort_params(&sort));
    }

    // One request for the whole result set; no page is listed first.
    let csv = directory.backend().export_csv(&params).await?;
    directory.close();

    match &args.output {
        Some(path) => {
            std::fs::write(path, &csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = csv.len(), "export written");
            eprintln!("Wrote {} bytes to {}", csv.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&csv)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
