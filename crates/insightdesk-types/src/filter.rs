use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Filters offered by the directory browsers.
///
/// Declaration order is the order in which compiled query parameters appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FilterLabel {
    Regions,
    Seniority,
    #[serde(rename = "Job Title")]
    JobTitle,
    Department,
    Search,
}

impl FilterLabel {
    pub const ALL: [FilterLabel; 5] = [
        FilterLabel::Regions,
        FilterLabel::Seniority,
        FilterLabel::JobTitle,
        FilterLabel::Department,
        FilterLabel::Search,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterLabel::Regions => "Regions",
            FilterLabel::Seniority => "Seniority",
            FilterLabel::JobTitle => "Job Title",
            FilterLabel::Department => "Department",
            FilterLabel::Search => "Search",
        }
    }
}

impl fmt::Display for FilterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterLabel {
    type Err = Error;

    /// Accepts the display label case-insensitively, with `-`/`_` standing in
    /// for the space in "Job Title".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        FilterLabel::ALL
            .into_iter()
            .find(|label| label.as_str().to_lowercase() == normalized)
            .ok_or_else(|| Error::UnknownFilterLabel(s.to_string()))
    }
}

/// The active filter values, at most one per label.
///
/// Values are stored exactly as the user materialized them (for multi-select
/// filters a `", "`-joined list). Empty values are never stored: absence is
/// what represents "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    entries: BTreeMap<FilterLabel, String>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, label: FilterLabel, value: impl Into<String>) -> Self {
        self.set(label, value);
        self
    }

    /// Set or clear a filter. Returns true if the selection changed.
    pub fn set(&mut self, label: FilterLabel, value: impl Into<String>) -> bool {
        let value = value.into();
        if value.trim().is_empty() {
            return self.entries.remove(&label).is_some();
        }
        match self.entries.get(&label) {
            Some(existing) if *existing == value => false,
            _ => {
                self.entries.insert(label, value);
                true
            }
        }
    }

    pub fn remove(&mut self, label: FilterLabel) -> bool {
        self.entries.remove(&label).is_some()
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.entries.is_empty();
        self.entries.clear();
        changed
    }

    pub fn get(&self, label: FilterLabel) -> Option<&str> {
        self.entries.get(&label).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterLabel, &str)> {
        self.entries.iter().map(|(label, value)| (*label, value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
