use insightdesk_types::{AccessStatus, RecordId};
use serde::Serialize;

/// User-facing notifications queued by the controller and drained by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// The account has no credits; offer an upgrade.
    UpgradeRequired { record: RecordId },
    /// A credit was spent without confirmation (unlimited plan).
    AutoCharged { record: RecordId },
    Unlocked { record: RecordId },
    UnlockFailed { record: RecordId, reason: String },
    AccessRestricted { status: AccessStatus },
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::UpgradeRequired { record } => format!(
                "No credits left to unlock record {}. Upgrade your plan to continue.",
                record
            ),
            Notice::AutoCharged { record } => {
                format!("Record {} unlocked using your unlimited credits.", record)
            }
            Notice::Unlocked { record } => format!("Record {} unlocked.", record),
            Notice::UnlockFailed { record, reason } => {
                format!("Could not unlock record {}: {}", record, reason)
            }
            Notice::AccessRestricted { status } => match status {
                AccessStatus::NeedBookCall => {
                    "Book an onboarding call to access this directory.".to_string()
                }
                AccessStatus::PixelInstallationNeeded => {
                    "Install the tracking pixel on your domain to see this directory.".to_string()
                }
            },
        }
    }
}
