use insightdesk_types::{FilterLabel, FilterSelection, SortState};
use serde::Serialize;

/// Ordered query parameters with raw (unencoded) values.
///
/// Encoding happens once, in [`QueryParams::to_query_string`], so callers
/// that hand pairs to an HTTP client's own query builder are not double
/// encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    pub fn extend(&mut self, other: QueryParams) {
        self.pairs.extend(other.pairs);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `name=value&...` with percent-encoded values, in insertion order.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

pub fn param_name(label: FilterLabel) -> &'static str {
    match label {
        FilterLabel::Regions => "regions",
        FilterLabel::Seniority => "seniority",
        FilterLabel::JobTitle => "job_title",
        FilterLabel::Department => "department",
        FilterLabel::Search => "search_query",
    }
}

/// Whether changing this filter alters which records qualify, and therefore
/// invalidates the current page position. Every directory filter does.
pub fn is_composition_affecting(label: FilterLabel) -> bool {
    match label {
        FilterLabel::Regions
        | FilterLabel::Seniority
        | FilterLabel::JobTitle
        | FilterLabel::Department
        | FilterLabel::Search => true,
    }
}

fn lowercases(label: FilterLabel) -> bool {
    matches!(label, FilterLabel::Regions | FilterLabel::Search)
}

fn normalize(label: FilterLabel, raw: &str) -> Option<String> {
    let joined = raw
        .split(", ")
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(",");

    if joined.is_empty() {
        return None;
    }

    if lowercases(label) {
        Some(joined.to_lowercase())
    } else {
        Some(joined)
    }
}

/// Translate the active filters into query parameters, one per label, in
/// [`FilterLabel::ALL`] order. Labels without a value produce no parameter.
pub fn compile(selections: &FilterSelection) -> QueryParams {
    let mut params = QueryParams::new();
    for label in FilterLabel::ALL {
        let Some(raw) = selections.get(label) else {
            continue;
        };
        if let Some(value) = normalize(label, raw) {
            params.push(param_name(label), value);
        }
    }
    params
}

/// `sort_by`/`sort_order`, or nothing when no column is sorted.
pub fn sort_params(sort: &SortState) -> QueryParams {
    let mut params = QueryParams::new();
    if let (Some(field), Some(direction)) = (sort.field(), sort.direction()) {
        params.push("sort_by", field);
        params.push("sort_order", direction.as_str());
    }
    params
}
