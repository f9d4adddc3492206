use anyhow::{Result, bail};
use insightdesk_sdk::{ApplyOutcome, ViewStatus};

use crate::args::ListArgs;
use crate::context::Context;
use crate::presentation::{self, ListReport};
use crate::types::OutputFormat;

pub async fn handle(ctx: &Context, args: ListArgs) -> Result<()> {
    anyhow::ensure!(args.page > 0, "--page starts at 1");

    let client = ctx.client(args.per_page)?;
    let directory = client.directory(args.directory.endpoints(client.config()));

    // Filters and sort each fetch at most once; load only if neither did.
    let mut fetched = directory.set_filters(args.filters.entries()?).await? != ApplyOutcome::Unchanged;
    if let Some(sort) = args.sort.state() {
        fetched |= directory.set_sort(sort).await? != ApplyOutcome::Unchanged;
    }
    if !fetched {
        directory.load().await?;
    }
    if args.page > 1 {
        directory.set_page(args.page - 1).await?;
    }

    let snapshot = directory.snapshot();
    let notices = directory.take_notices();
    directory.close();

    let report = ListReport::new(&snapshot, &notices, &args.columns);
    match ctx.format {
        OutputFormat::Plain => print!("{}", report.render_plain(presentation::use_color())),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report.render_json())?),
    }

    if let Some(err) = &snapshot.last_error {
        if snapshot.status == ViewStatus::Unavailable {
            bail!("directory unavailable: {}", err);
        }
        eprintln!("Warning: showing earlier results; the last fetch failed: {}", err);
    }
    Ok(())
}
