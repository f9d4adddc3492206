use insightdesk_types::CreditStatus;
use serde::Serialize;

/// What an unlock attempt does next, given the account's credit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateDecision {
    /// Charge immediately and tell the user afterwards.
    AutoCharge,
    /// Ask the user before spending a credit.
    Confirm,
    /// Nothing to spend; surface an upgrade prompt.
    Blocked,
}

pub fn decide(status: CreditStatus) -> GateDecision {
    match status {
        CreditStatus::NoCredits => GateDecision::Blocked,
        CreditStatus::UnlimitedCredits => GateDecision::AutoCharge,
        CreditStatus::CreditsAreAvailable => GateDecision::Confirm,
    }
}
