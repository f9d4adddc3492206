use std::io::{BufRead, Write};

use anyhow::{Result, bail};
use insightdesk_sdk::{BackendError, Directory, RecordId, UnlockOutcome};
use is_terminal::IsTerminal;

use crate::args::UnlockArgs;
use crate::context::Context;
use crate::presentation::{self, UnlockReport, UnlockResult};
use crate::types::OutputFormat;

fn confirm(id: RecordId) -> Result<bool> {
    eprint!("Spend 1 credit to unlock record {}? [y/N] ", id);
    std::io::stderr().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub async fn handle(ctx: &Context, args: UnlockArgs) -> Result<()> {
    let client = ctx.client(None)?;
    let directory = client.directory(args.directory.endpoints(client.config()));
    let id = RecordId(args.id);

    let outcome = match directory.request_unlock(id).await? {
        UnlockOutcome::NeedsConfirmation(pending) => {
            if !args.yes && !std::io::stdin().is_terminal() {
                directory.cancel_unlock(pending)?;
                directory.close();
                bail!(
                    "unlocking record {} spends a credit; rerun with --yes to confirm",
                    id
                );
            }
            if args.yes || confirm(id)? {
                directory.confirm_unlock(pending).await?
            } else {
                directory.cancel_unlock(pending)?;
                return finish(ctx, &directory, id, UnlockResult::Cancelled, false, None);
            }
        }
        outcome => outcome,
    };

    match outcome {
        UnlockOutcome::Unlocked { auto_charged, .. } => {
            finish(ctx, &directory, id, UnlockResult::Unlocked, auto_charged, None)
        }
        UnlockOutcome::UpgradeRequired => {
            finish(ctx, &directory, id, UnlockResult::UpgradeRequired, false, None)
        }
        UnlockOutcome::Aborted => finish(ctx, &directory, id, UnlockResult::Aborted, false, None),
        UnlockOutcome::Failed(err) => {
            finish(ctx, &directory, id, UnlockResult::Failed, false, Some(&err))
        }
        // Confirmation never asks twice.
        UnlockOutcome::NeedsConfirmation(pending) => {
            directory.cancel_unlock(pending)?;
            finish(ctx, &directory, id, UnlockResult::Cancelled, false, None)
        }
    }
}

fn finish(
    ctx: &Context,
    directory: &Directory,
    id: RecordId,
    result: UnlockResult,
    auto_charged: bool,
    failure: Option<&BackendError>,
) -> Result<()> {
    let snapshot = directory.snapshot();
    let notices = directory.take_notices();
    directory.close();

    let report = UnlockReport {
        id,
        result,
        auto_charged,
        record: snapshot.records.iter().find(|record| record.id == id),
        notices: &notices,
    };
    match ctx.format {
        OutputFormat::Plain => print!("{}", report.render_plain(presentation::use_color())),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report.render_json())?),
    }

    if result.is_success() {
        return Ok(());
    }
    match failure {
        Some(err) => bail!("record {} was not unlocked: {}", id, err),
        None => bail!("record {} was not unlocked", id),
    }
}
