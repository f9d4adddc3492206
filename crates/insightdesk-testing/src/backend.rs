//! In-memory [`DirectoryBackend`] for controller and view tests.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use insightdesk_engine::{DisplayText, QueryParams};
use insightdesk_runtime::{BackendError, DirectoryBackend, ListPage, ListQuery};
use insightdesk_types::{AccessStatus, CreditStatus, Field, Record, RecordId};

use crate::fixtures::GATED_FIELDS;

/// One call the fake received, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    List(ListQuery),
    Record(RecordId),
    CreditStatus,
    Charge(RecordId),
    Export(QueryParams),
}

struct State {
    dataset: Vec<Record>,
    unlocked: HashSet<RecordId>,
    credit_status: Result<CreditStatus, BackendError>,
    access: Option<AccessStatus>,
    list_failures: VecDeque<BackendError>,
    list_delays: VecDeque<Duration>,
    credit_delay: Option<Duration>,
    charge_failure: Option<BackendError>,
    record_failure: Option<BackendError>,
    calls: Vec<BackendCall>,
}

/// Serves a fixed dataset with the gated fields ([`GATED_FIELDS`]) redacted
/// until a record is charged.
///
/// Supports `department`, `seniority` and `search_query` filtering (matched
/// against the `department`, `seniority` and `name` fields) and sorting by any
/// field. Other filters are accepted and ignored.
pub struct FakeBackend {
    state: Mutex<State>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                dataset: Vec::new(),
                unlocked: HashSet::new(),
                credit_status: Ok(CreditStatus::CreditsAreAvailable),
                access: None,
                list_failures: VecDeque::new(),
                list_delays: VecDeque::new(),
                credit_delay: None,
                charge_failure: None,
                record_failure: None,
                calls: Vec::new(),
            }),
        }
    }

    pub fn with_records(self, records: Vec<Record>) -> Self {
        self.lock().dataset = records;
        self
    }

    pub fn with_credit_status(self, status: CreditStatus) -> Self {
        self.set_credit_status(Ok(status));
        self
    }

    /// Every list request answers 403 with this precondition.
    pub fn with_access_restriction(self, status: AccessStatus) -> Self {
        self.lock().access = Some(status);
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_credit_status(&self, status: Result<CreditStatus, BackendError>) {
        self.lock().credit_status = status;
    }

    /// The next list request fails with `err`.
    pub fn fail_next_list(&self, err: BackendError) {
        self.lock().list_failures.push_back(err);
    }

    /// The next list request completes only after `delay`. Queue several to
    /// script out-of-order completions.
    pub fn delay_next_list(&self, delay: Duration) {
        self.lock().list_delays.push_back(delay);
    }

    /// The next credit status query completes only after `delay`.
    pub fn delay_next_credit_status(&self, delay: Duration) {
        self.lock().credit_delay = Some(delay);
    }

    /// The next charge fails with `err`.
    pub fn fail_next_charge(&self, err: BackendError) {
        self.lock().charge_failure = Some(err);
    }

    /// The next single-record fetch fails with `err`.
    pub fn fail_next_record(&self, err: BackendError) {
        self.lock().record_failure = Some(err);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    pub fn list_calls(&self) -> Vec<ListQuery> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::List(query) => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn charge_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, BackendCall::Charge(_)))
            .count()
    }

    pub fn is_unlocked(&self, id: RecordId) -> bool {
        self.lock().unlocked.contains(&id)
    }
}

fn text_of(record: &Record, field: &str) -> String {
    record
        .field(field)
        .and_then(Field::displayable)
        .and_then(|value| value.display_text())
        .unwrap_or_default()
}

fn matches_any(record: &Record, field: &str, wanted: &str) -> bool {
    let actual = text_of(record, field).to_lowercase();
    wanted
        .split(',')
        .any(|option| option.trim().to_lowercase() == actual)
}

fn select(dataset: &[Record], params: &QueryParams) -> Vec<Record> {
    let mut selected: Vec<Record> = dataset
        .iter()
        .filter(|record| {
            params
                .get("department")
                .is_none_or(|wanted| matches_any(record, "department", wanted))
        })
        .filter(|record| {
            params
                .get("seniority")
                .is_none_or(|wanted| matches_any(record, "seniority", wanted))
        })
        .filter(|record| {
            params.get("search_query").is_none_or(|query| {
                text_of(record, "name").to_lowercase().contains(&query.to_lowercase())
            })
        })
        .cloned()
        .collect();

    if let Some(field) = params.get("sort_by") {
        selected.sort_by(|a, b| {
            text_of(a, field)
                .cmp(&text_of(b, field))
                .then(a.id.cmp(&b.id))
        });
        if params.get("sort_order") == Some("desc") {
            selected.reverse();
        }
    }
    selected
}

fn redact(mut record: Record, unlocked: &HashSet<RecordId>) -> Record {
    if unlocked.contains(&record.id) {
        return record;
    }
    for name in GATED_FIELDS {
        if let Some(field) = record.fields.get_mut(name)
            && !matches!(field.visibility_status, insightdesk_types::Visibility::Missing)
        {
            *field = Field::hidden();
        }
    }
    record
}

impl DirectoryBackend for FakeBackend {
    async fn fetch_list(&self, query: &ListQuery) -> Result<ListPage, BackendError> {
        let (delay, result) = {
            let mut state = self.lock();
            state.calls.push(BackendCall::List(query.clone()));
            let delay = state.list_delays.pop_front();

            let result = if let Some(status) = state.access {
                Err(BackendError::AccessDenied(status))
            } else if let Some(err) = state.list_failures.pop_front() {
                Err(err)
            } else {
                let selected = select(&state.dataset, &query.params);
                let total_count = selected.len();
                let start = query.page.saturating_sub(1) * query.per_page;
                let records = selected
                    .into_iter()
                    .skip(start)
                    .take(query.per_page)
                    .map(|record| redact(record, &state.unlocked))
                    .collect();
                Ok(ListPage {
                    records,
                    total_count,
                })
            };
            (delay, result)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn fetch_record(&self, id: RecordId) -> Result<Record, BackendError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::Record(id));
        if let Some(err) = state.record_failure.take() {
            return Err(err);
        }
        let record = state
            .dataset
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or_else(|| BackendError::Status {
                code: 404,
                message: format!("record {} not found", id),
            })?;
        Ok(redact(record, &state.unlocked))
    }

    async fn credit_status(&self) -> Result<CreditStatus, BackendError> {
        let delay = {
            let mut state = self.lock();
            state.calls.push(BackendCall::CreditStatus);
            state.credit_delay.take()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.lock().credit_status.clone()
    }

    async fn charge(&self, id: RecordId) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::Charge(id));
        if let Some(err) = state.charge_failure.take() {
            return Err(err);
        }
        let status = state.credit_status.clone();
        if status == Ok(CreditStatus::NoCredits) {
            return Err(BackendError::Status {
                code: 402,
                message: "no credits".to_string(),
            });
        }
        state.unlocked.insert(id);
        Ok(())
    }

    async fn export_csv(&self, params: &QueryParams) -> Result<Vec<u8>, BackendError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::Export(params.clone()));
        let mut csv = String::from("id,name,department\n");
        for record in select(&state.dataset, params) {
            csv.push_str(&format!(
                "{},{},{}\n",
                record.id,
                text_of(&record, "name"),
                text_of(&record, "department")
            ));
        }
        Ok(csv.into_bytes())
    }
}
