use anyhow::Result;
use insightdesk_engine::{GateDecision, decide};
use serde_json::json;

use crate::context::Context;
use crate::types::OutputFormat;

pub async fn handle(ctx: &Context) -> Result<()> {
    let client = ctx.client(None)?;
    let status = client.credit_status().await?;
    let decision = decide(status);

    let explanation = match decision {
        GateDecision::AutoCharge => "unlocks are charged without asking",
        GateDecision::Confirm => "each unlock asks before spending a credit",
        GateDecision::Blocked => "upgrade your plan to unlock records",
    };

    match ctx.format {
        OutputFormat::Plain => println!("Credits: {} ({})", status.as_str(), explanation),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "status": status,
                "unlock": match decision {
                    GateDecision::AutoCharge => "auto_charge",
                    GateDecision::Confirm => "confirm",
                    GateDecision::Blocked => "blocked",
                },
            }))?
        ),
    }
    Ok(())
}
