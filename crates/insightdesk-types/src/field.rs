use serde::{Deserialize, Serialize};

/// Disclosure state of a single record attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    /// Redacted until the record is unlocked.
    Hidden,
    /// The backend holds no data. Unlocking does not change this.
    Missing,
}

/// A value paired with its visibility status.
///
/// A `Hidden` field may still carry a value on the wire; it must never be
/// read for display. Use [`Field::displayable`] instead of touching `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field<T = serde_json::Value> {
    #[serde(default)]
    pub value: Option<T>,
    pub visibility_status: Visibility,
}

impl<T> Field<T> {
    pub fn visible(value: T) -> Self {
        Self {
            value: Some(value),
            visibility_status: Visibility::Visible,
        }
    }

    pub fn hidden() -> Self {
        Self {
            value: None,
            visibility_status: Visibility::Hidden,
        }
    }

    pub fn missing() -> Self {
        Self {
            value: None,
            visibility_status: Visibility::Missing,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.visibility_status == Visibility::Hidden
    }

    /// The value, but only when the field is visible.
    pub fn displayable(&self) -> Option<&T> {
        match self.visibility_status {
            Visibility::Visible => self.value.as_ref(),
            Visibility::Hidden | Visibility::Missing => None,
        }
    }
}
