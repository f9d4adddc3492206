use insightdesk_types::{Field, Visibility};
use serde_json::Value;
use std::fmt;

/// Shown for missing and empty values.
pub const EMPTY_MARKER: &str = "—";

/// Values that know how to present themselves as plain text.
///
/// Returns `None` for values that read as empty (null, blank strings,
/// `false`, empty lists); the resolver shows [`EMPTY_MARKER`] for those.
pub trait DisplayText {
    fn display_text(&self) -> Option<String>;
}

impl DisplayText for Value {
    fn display_text(&self) -> Option<String> {
        match self {
            Value::Null | Value::Bool(false) => None,
            Value::Bool(true) => Some("yes".to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => s.display_text(),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().filter_map(|item| item.display_text()).collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(", "))
                }
            }
            Value::Object(_) => Some(self.to_string()),
        }
    }
}

impl DisplayText for String {
    fn display_text(&self) -> Option<String> {
        if self.trim().is_empty() {
            None
        } else {
            Some(self.clone())
        }
    }
}

/// Placeholder rendered in place of a hidden value. Activating it requests
/// an unlock; it never carries the value itself.
pub struct UnlockPlaceholder<'a> {
    on_unlock_requested: Box<dyn FnOnce() + 'a>,
}

impl UnlockPlaceholder<'_> {
    pub const LABEL: &'static str = "Unlock";

    pub fn activate(self) {
        (self.on_unlock_requested)()
    }
}

pub enum DisplayValue<'a> {
    Text(String),
    Empty,
    Locked(UnlockPlaceholder<'a>),
}

impl DisplayValue<'_> {
    pub fn is_locked(&self) -> bool {
        matches!(self, DisplayValue::Locked(_))
    }

    /// Text for a cell: the value, the empty marker, or the placeholder label.
    pub fn as_text(&self) -> &str {
        match self {
            DisplayValue::Text(text) => text,
            DisplayValue::Empty => EMPTY_MARKER,
            DisplayValue::Locked(_) => UnlockPlaceholder::LABEL,
        }
    }
}

impl fmt::Debug for DisplayValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            DisplayValue::Empty => f.write_str("Empty"),
            DisplayValue::Locked(_) => f.write_str("Locked"),
        }
    }
}

/// Decide what to show for a field.
///
/// Hidden wins over everything, including a value the client happens to
/// hold. Missing and empty values collapse to [`EMPTY_MARKER`]. A formatter,
/// when given, replaces the default text for visible non-empty values.
pub fn resolve<'a, T: DisplayText>(
    field: &Field<T>,
    on_unlock_requested: impl FnOnce() + 'a,
    format: Option<&dyn Fn(&T) -> String>,
) -> DisplayValue<'a> {
    match field.visibility_status {
        Visibility::Hidden => DisplayValue::Locked(UnlockPlaceholder {
            on_unlock_requested: Box::new(on_unlock_requested),
        }),
        Visibility::Missing => DisplayValue::Empty,
        Visibility::Visible => {
            let Some(value) = field.value.as_ref() else {
                return DisplayValue::Empty;
            };
            let Some(text) = value.display_text() else {
                return DisplayValue::Empty;
            };
            match format {
                Some(format) => DisplayValue::Text(format(value)),
                None => DisplayValue::Text(text),
            }
        }
    }
}
