use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Account credit state as reported by the credit-status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditStatus {
    NoCredits,
    UnlimitedCredits,
    CreditsAreAvailable,
}

impl CreditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditStatus::NoCredits => "NO_CREDITS",
            CreditStatus::UnlimitedCredits => "UNLIMITED_CREDITS",
            CreditStatus::CreditsAreAvailable => "CREDITS_ARE_AVAILABLE",
        }
    }
}

impl fmt::Display for CreditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreditStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NO_CREDITS" => Ok(CreditStatus::NoCredits),
            "UNLIMITED_CREDITS" => Ok(CreditStatus::UnlimitedCredits),
            "CREDITS_ARE_AVAILABLE" => Ok(CreditStatus::CreditsAreAvailable),
            other => Err(Error::UnknownCreditStatus(other.to_string())),
        }
    }
}

/// Access preconditions the backend reports with a 403 on list requests.
/// These are view states, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessStatus {
    /// The account must book an onboarding call first.
    NeedBookCall,
    /// The tracking pixel is not installed for this domain.
    PixelInstallationNeeded,
}

impl AccessStatus {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "NEED_BOOK_CALL" => Some(AccessStatus::NeedBookCall),
            "PIXEL_INSTALLATION_NEEDED" => Some(AccessStatus::PixelInstallationNeeded),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessStatus::NeedBookCall => "NEED_BOOK_CALL",
            AccessStatus::PixelInstallationNeeded => "PIXEL_INSTALLATION_NEEDED",
        }
    }
}

impl fmt::Display for AccessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_status_wire_names() {
        let status: CreditStatus = serde_json::from_str("\"UNLIMITED_CREDITS\"").unwrap();
        assert_eq!(status, CreditStatus::UnlimitedCredits);
        assert_eq!(
            "CREDITS_ARE_AVAILABLE".parse::<CreditStatus>(),
            Ok(CreditStatus::CreditsAreAvailable)
        );
        assert!("SOME_CREDITS".parse::<CreditStatus>().is_err());
    }

    #[test]
    fn test_access_status_codes() {
        assert_eq!(
            AccessStatus::from_code("PIXEL_INSTALLATION_NEEDED"),
            Some(AccessStatus::PixelInstallationNeeded)
        );
        assert_eq!(AccessStatus::from_code("FORBIDDEN"), None);
    }
}
