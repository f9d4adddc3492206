use std::collections::{HashMap, VecDeque};

use insightdesk_engine::{
    GateDecision, ListCache, MergeOutcome, QueryParams, compile, decide, is_composition_affecting,
    plan, sort_params,
};
use insightdesk_types::{
    AccessStatus, CreditStatus, DEFAULT_PAGE_SIZE, FilterLabel, FilterSelection, PAGE_SIZE_LADDER,
    PageState, Record, RecordId, SortState,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backend::{BackendError, ListPage, ListQuery};
use crate::error::{Error, Result};
use crate::notice::Notice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
}

/// View-level status the UI switches on, separate from the record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum ViewStatus {
    Normal,
    /// The backend requires a setup or booking step before listing.
    AccessRestricted(AccessStatus),
    /// The last fetch failed and there is no earlier data to show.
    Unavailable,
}

/// A list fetch in flight, keyed to the generation that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub query: ListQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// A newer fetch was issued after this one; the response was dropped.
    Stale,
    /// The triggering change left the query as it was; nothing was fetched.
    Unchanged,
}

/// Where an unlock attempt for one record currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockStage {
    AwaitingCreditDecision,
    AwaitingConfirmation,
    Charging,
    Merging,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockTicket {
    pub record: RecordId,
    attempt: u64,
}

/// Next step after the credit status comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStep {
    Blocked,
    AwaitConfirmation,
    /// Charge now without asking.
    Charge,
    /// Status query failed; nothing was charged.
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeStep {
    Merge,
    Failed(BackendError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeStep {
    Merged(MergeOutcome),
    Failed(BackendError),
}

#[derive(Debug, Clone)]
struct UnlockAttempt {
    attempt: u64,
    stage: UnlockStage,
    auto_charged: bool,
}

/// Read-only copy of the view state for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectorySnapshot {
    pub records: Vec<Record>,
    pub page: PageState,
    pub filters: FilterSelection,
    pub sort: SortState,
    pub load: LoadState,
    pub status: ViewStatus,
    pub last_error: Option<String>,
}

/// State machine behind a directory browser.
///
/// Holds filters, sort, pagination and the current page of records, and
/// decides what each UI event and each backend completion does to them.
/// It performs no I/O: every change that needs a fetch returns a
/// [`FetchTicket`], and completions are fed back through the `apply_*` and
/// `*_resolved` methods. [`crate::DirectoryView`] drives it against a real
/// backend.
#[derive(Debug)]
pub struct DirectoryController {
    filters: FilterSelection,
    sort: SortState,
    page: PageState,
    cache: ListCache,
    load: LoadState,
    status: ViewStatus,
    last_error: Option<BackendError>,
    generation: u64,
    unlocks: HashMap<RecordId, UnlockAttempt>,
    next_attempt: u64,
    notices: VecDeque<Notice>,
    closed: bool,
}

impl Default for DirectoryController {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl DirectoryController {
    /// `page_size` is used for the first request. Sizes off
    /// [`PAGE_SIZE_LADDER`] fall back to [`DEFAULT_PAGE_SIZE`].
    pub fn new(page_size: usize) -> Self {
        let mut page = plan(0, page_size);
        // Before the first response there is no count to plan against, so
        // honour a ladder size for the initial request.
        if PAGE_SIZE_LADDER.contains(&page_size) {
            if !page.size_options.contains(&page_size) {
                page.size_options.push(page_size);
                page.size_options.sort_unstable();
            }
            page.size = page_size;
        } else {
            warn!(page_size, fallback = DEFAULT_PAGE_SIZE, "page size is not on the ladder");
        }
        Self {
            filters: FilterSelection::new(),
            sort: SortState::default(),
            page,
            cache: ListCache::new(),
            load: LoadState::Idle,
            status: ViewStatus::Normal,
            last_error: None,
            generation: 0,
            unlocks: HashMap::new(),
            next_attempt: 0,
            notices: VecDeque::new(),
            closed: false,
        }
    }

    pub fn filters(&self) -> &FilterSelection {
        &self.filters
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    pub fn records(&self) -> &[Record] {
        self.cache.records()
    }

    pub fn load_state(&self) -> LoadState {
        self.load
    }

    pub fn status(&self) -> ViewStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&BackendError> {
        self.last_error.as_ref()
    }

    pub fn unlock_stage(&self, id: RecordId) -> Option<UnlockStage> {
        self.unlocks.get(&id).map(|attempt| attempt.stage)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn snapshot(&self) -> DirectorySnapshot {
        DirectorySnapshot {
            records: self.cache.records().to_vec(),
            page: self.page.clone(),
            filters: self.filters.clone(),
            sort: self.sort.clone(),
            load: self.load,
            status: self.status,
            last_error: self.last_error.as_ref().map(ToString::to_string),
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Unmount. Every later completion is refused with [`Error::Cancelled`].
    pub fn close(&mut self) {
        self.closed = true;
        self.unlocks.clear();
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Filters and sort as they go on the wire, without paging.
    pub fn query_params(&self) -> QueryParams {
        let mut params = compile(&self.filters);
        params.extend(sort_params(&self.sort));
        params
    }

    fn issue_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.load = LoadState::Loading;
        let query = ListQuery {
            params: self.query_params(),
            page: self.page.backend_page(),
            per_page: self.page.size,
        };
        debug!(
            generation = self.generation,
            page = query.page,
            per_page = query.per_page,
            "issuing list fetch"
        );
        FetchTicket {
            generation: self.generation,
            query,
        }
    }

    // ------------------------------------------------------------------
    // List fetch
    // ------------------------------------------------------------------

    /// Initial fetch when the view mounts.
    pub fn mount(&mut self) -> Result<FetchTicket> {
        self.refresh()
    }

    /// Refetch the current page with unchanged filters, sort and position.
    pub fn refresh(&mut self) -> Result<FetchTicket> {
        self.ensure_open()?;
        Ok(self.issue_fetch())
    }

    /// Set or clear one filter. Returns `None` when the selection did not
    /// change; otherwise the page is reset and a fetch is issued.
    pub fn set_filter(
        &mut self,
        label: FilterLabel,
        value: impl Into<String>,
    ) -> Result<Option<FetchTicket>> {
        self.ensure_open()?;
        if !self.filters.set(label, value) {
            return Ok(None);
        }
        if is_composition_affecting(label) {
            self.page.index = 0;
        }
        Ok(Some(self.issue_fetch()))
    }

    /// Apply several filter edits at once, issuing at most one fetch.
    pub fn set_filters<V: Into<String>>(
        &mut self,
        entries: impl IntoIterator<Item = (FilterLabel, V)>,
    ) -> Result<Option<FetchTicket>> {
        self.ensure_open()?;
        let mut reset = false;
        let mut changed = false;
        for (label, value) in entries {
            if self.filters.set(label, value) {
                changed = true;
                reset |= is_composition_affecting(label);
            }
        }
        if !changed {
            return Ok(None);
        }
        if reset {
            self.page.index = 0;
        }
        Ok(Some(self.issue_fetch()))
    }

    pub fn clear_filters(&mut self) -> Result<Option<FetchTicket>> {
        self.ensure_open()?;
        if !self.filters.clear() {
            return Ok(None);
        }
        self.page.index = 0;
        Ok(Some(self.issue_fetch()))
    }

    /// Column header click. Always a composition change.
    pub fn toggle_sort(&mut self, field: &str) -> Result<FetchTicket> {
        self.ensure_open()?;
        self.sort.toggle(field);
        self.page.index = 0;
        Ok(self.issue_fetch())
    }

    pub fn set_sort(&mut self, sort: SortState) -> Result<Option<FetchTicket>> {
        self.ensure_open()?;
        if self.sort == sort {
            return Ok(None);
        }
        self.sort = sort;
        self.page.index = 0;
        Ok(Some(self.issue_fetch()))
    }

    /// Pick a page size from the menu. Sizes not on the menu are refused.
    pub fn set_page_size(&mut self, size: usize) -> Result<Option<FetchTicket>> {
        self.ensure_open()?;
        if !self.page.size_options.contains(&size) {
            return Err(Error::InvalidOperation(format!(
                "page size {} is not one of {:?}",
                size, self.page.size_options
            )));
        }
        if self.page.size == size {
            return Ok(None);
        }
        self.page.size = size;
        self.page.index = 0;
        Ok(Some(self.issue_fetch()))
    }

    /// Move to another page. The index is clamped to the last page.
    pub fn set_page(&mut self, index: usize) -> Result<Option<FetchTicket>> {
        self.ensure_open()?;
        let index = index.min(self.page.last_index());
        if self.page.index == index {
            return Ok(None);
        }
        self.page.index = index;
        Ok(Some(self.issue_fetch()))
    }

    /// Feed a list response back in.
    ///
    /// Responses for anything but the most recently issued ticket are
    /// discarded. A failed fetch leaves the previous page in place; an access
    /// precondition empties the list and switches the view status.
    pub fn apply_list(
        &mut self,
        ticket: &FetchTicket,
        result: std::result::Result<ListPage, BackendError>,
    ) -> Result<ApplyOutcome> {
        self.ensure_open()?;
        if ticket.generation != self.generation {
            warn!(
                generation = ticket.generation,
                current = self.generation,
                "discarding stale list response"
            );
            return Ok(ApplyOutcome::Stale);
        }

        match result {
            Ok(page) => {
                let index = ticket.query.page.saturating_sub(1);
                self.cache.replace(page.records);
                self.page = plan(page.total_count, ticket.query.per_page);
                self.page.index = index.min(self.page.last_index());
                self.status = ViewStatus::Normal;
                self.last_error = None;
                debug!(
                    total = self.page.total_count,
                    rows = self.cache.len(),
                    "list fetch applied"
                );
            }
            Err(BackendError::AccessDenied(status)) => {
                info!(%status, "directory access restricted");
                self.cache.clear();
                self.page = plan(0, self.page.size);
                self.status = ViewStatus::AccessRestricted(status);
                self.last_error = None;
                self.notices.push_back(Notice::AccessRestricted { status });
            }
            Err(err) => {
                warn!(error = %err, "list fetch failed");
                if self.cache.is_empty() {
                    self.status = ViewStatus::Unavailable;
                }
                self.last_error = Some(err);
            }
        }

        self.load = LoadState::Ready;
        Ok(ApplyOutcome::Applied)
    }

    // ------------------------------------------------------------------
    // Unlock
    // ------------------------------------------------------------------

    /// A hidden field was activated. Starts an attempt awaiting the credit
    /// status; a second request for the same record while one is in flight
    /// is refused.
    pub fn begin_unlock(&mut self, id: RecordId) -> Result<UnlockTicket> {
        self.ensure_open()?;
        if self.unlocks.contains_key(&id) {
            return Err(Error::UnlockInProgress(id));
        }
        self.next_attempt += 1;
        self.unlocks.insert(
            id,
            UnlockAttempt {
                attempt: self.next_attempt,
                stage: UnlockStage::AwaitingCreditDecision,
                auto_charged: false,
            },
        );
        debug!(record = %id, "unlock requested");
        Ok(UnlockTicket {
            record: id,
            attempt: self.next_attempt,
        })
    }

    fn attempt_at(&mut self, ticket: &UnlockTicket, stage: UnlockStage) -> Result<&mut UnlockAttempt> {
        self.ensure_open()?;
        match self.unlocks.get_mut(&ticket.record) {
            Some(attempt) if attempt.attempt == ticket.attempt && attempt.stage == stage => {
                Ok(attempt)
            }
            _ => Err(Error::StaleUnlock(ticket.record)),
        }
    }

    fn finish(&mut self, ticket: &UnlockTicket) {
        self.unlocks.remove(&ticket.record);
    }

    /// The driver of an attempt went away before it settled. Frees the
    /// record so the user can start over; tickets for an attempt that already
    /// finished or was superseded are ignored.
    pub fn abandon_unlock(&mut self, ticket: &UnlockTicket) {
        let current = self
            .unlocks
            .get(&ticket.record)
            .is_some_and(|attempt| attempt.attempt == ticket.attempt);
        if current {
            debug!(record = %ticket.record, "unlock abandoned");
            self.finish(ticket);
        }
    }

    pub fn credit_status_resolved(
        &mut self,
        ticket: &UnlockTicket,
        status: std::result::Result<CreditStatus, BackendError>,
    ) -> Result<GateStep> {
        let attempt = self.attempt_at(ticket, UnlockStage::AwaitingCreditDecision)?;

        let status = match status {
            Ok(status) => status,
            Err(err) => {
                warn!(record = %ticket.record, error = %err, "credit status unavailable, unlock aborted");
                self.finish(ticket);
                return Ok(GateStep::Aborted);
            }
        };

        match decide(status) {
            GateDecision::Blocked => {
                self.finish(ticket);
                self.notices.push_back(Notice::UpgradeRequired {
                    record: ticket.record,
                });
                Ok(GateStep::Blocked)
            }
            GateDecision::Confirm => {
                attempt.stage = UnlockStage::AwaitingConfirmation;
                Ok(GateStep::AwaitConfirmation)
            }
            GateDecision::AutoCharge => {
                attempt.stage = UnlockStage::Charging;
                attempt.auto_charged = true;
                Ok(GateStep::Charge)
            }
        }
    }

    /// The user accepted the confirmation step.
    pub fn confirm_unlock(&mut self, ticket: &UnlockTicket) -> Result<()> {
        let attempt = self.attempt_at(ticket, UnlockStage::AwaitingConfirmation)?;
        attempt.stage = UnlockStage::Charging;
        Ok(())
    }

    /// The user dismissed the confirmation step. Nothing is charged.
    pub fn cancel_unlock(&mut self, ticket: &UnlockTicket) -> Result<()> {
        self.attempt_at(ticket, UnlockStage::AwaitingConfirmation)?;
        self.finish(ticket);
        Ok(())
    }

    pub fn charge_resolved(
        &mut self,
        ticket: &UnlockTicket,
        result: std::result::Result<(), BackendError>,
    ) -> Result<ChargeStep> {
        let attempt = self.attempt_at(ticket, UnlockStage::Charging)?;
        match result {
            Ok(()) => {
                attempt.stage = UnlockStage::Merging;
                let auto_charged = attempt.auto_charged;
                info!(record = %ticket.record, auto_charged, "credit charged");
                if auto_charged {
                    self.notices.push_back(Notice::AutoCharged {
                        record: ticket.record,
                    });
                }
                Ok(ChargeStep::Merge)
            }
            Err(err) => {
                warn!(record = %ticket.record, error = %err, "charge failed");
                self.finish(ticket);
                self.notices.push_back(Notice::UnlockFailed {
                    record: ticket.record,
                    reason: err.to_string(),
                });
                Ok(ChargeStep::Failed(err))
            }
        }
    }

    /// The single-record refetch after a charge. Merges into the current page
    /// in place; never touches pagination or issues a list fetch.
    pub fn record_resolved(
        &mut self,
        ticket: &UnlockTicket,
        result: std::result::Result<Record, BackendError>,
    ) -> Result<MergeStep> {
        self.attempt_at(ticket, UnlockStage::Merging)?;
        self.finish(ticket);

        let result = result.and_then(|record| {
            if record.id == ticket.record {
                Ok(record)
            } else {
                Err(BackendError::Malformed(format!(
                    "asked for record {}, got {}",
                    ticket.record, record.id
                )))
            }
        });

        match result {
            Ok(record) => {
                let outcome = self.cache.merge_by_id(record);
                self.notices.push_back(Notice::Unlocked {
                    record: ticket.record,
                });
                Ok(MergeStep::Merged(outcome))
            }
            Err(err) => {
                // Charged but not refetched: the field stays hidden locally
                // until the next list fetch reconciles with the backend.
                warn!(record = %ticket.record, error = %err, "unlocked record refetch failed");
                self.notices.push_back(Notice::UnlockFailed {
                    record: ticket.record,
                    reason: err.to_string(),
                });
                Ok(MergeStep::Failed(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insightdesk_types::{Field, SortDirection, Visibility};
    use serde_json::json;

    fn record(id: u64) -> Record {
        Record::new(id)
            .with_field("name", Field::visible(json!(format!("p{}", id))))
            .with_field("email", Field::hidden())
    }

    fn page_of(ids: std::ops::RangeInclusive<u64>, total: usize) -> ListPage {
        ListPage {
            records: ids.map(record).collect(),
            total_count: total,
        }
    }

    fn ready(total: usize) -> DirectoryController {
        let mut controller = DirectoryController::new(15);
        let ticket = controller.mount().unwrap();
        controller
            .apply_list(&ticket, Ok(page_of(1..=15, total)))
            .unwrap();
        controller
    }

    #[test]
    fn test_mount_requests_first_page() {
        let mut controller = DirectoryController::new(15);
        assert_eq!(controller.load_state(), LoadState::Idle);

        let ticket = controller.mount().unwrap();
        assert_eq!(controller.load_state(), LoadState::Loading);
        assert_eq!(ticket.query.page, 1);
        assert_eq!(ticket.query.per_page, 15);
        assert!(ticket.query.params.is_empty());
    }

    #[test]
    fn test_off_ladder_page_size_falls_back() {
        let mut controller = DirectoryController::new(25);
        assert_eq!(controller.page().size_options, vec![15]);

        let ticket = controller.mount().unwrap();
        assert_eq!(ticket.query.per_page, 15);
        controller
            .apply_list(&ticket, Ok(page_of(1..=15, 100)))
            .unwrap();

        let ticket = controller.set_page(1).unwrap().unwrap();
        assert_eq!((ticket.query.page, ticket.query.per_page), (2, 15));
    }

    #[test]
    fn test_ladder_page_size_holds_across_pages() {
        let mut controller = DirectoryController::new(30);
        let ticket = controller.mount().unwrap();
        assert_eq!(ticket.query.per_page, 30);
        controller
            .apply_list(&ticket, Ok(page_of(1..=30, 100)))
            .unwrap();
        assert_eq!(controller.page().size, 30);

        let ticket = controller.set_page(1).unwrap().unwrap();
        assert_eq!((ticket.query.page, ticket.query.per_page), (2, 30));
    }

    #[test]
    fn test_apply_replans_pagination() {
        let mut controller = DirectoryController::new(15);
        let ticket = controller
            .set_filter(FilterLabel::Department, "Sales, Engineering")
            .unwrap()
            .unwrap();
        assert_eq!(
            ticket.query.params.to_query_string(),
            "department=Sales%2CEngineering"
        );

        controller
            .apply_list(&ticket, Ok(page_of(1..=15, 45)))
            .unwrap();
        assert_eq!(controller.page().size_options, vec![15, 30, 50]);
        assert_eq!(controller.page().size, 15);
        assert_eq!(controller.page().total_count, 45);
        assert_eq!(controller.load_state(), LoadState::Ready);
        assert_eq!(controller.records().len(), 15);
    }

    #[test]
    fn test_composition_changes_reset_page_index() {
        for label in FilterLabel::ALL {
            let mut controller = ready(300);
            controller.set_page(4).unwrap();
            assert_eq!(controller.page().index, 4);

            let ticket = controller.set_filter(label, "Value").unwrap().unwrap();
            assert_eq!(controller.page().index, 0, "{}", label);
            assert_eq!(ticket.query.page, 1);
        }

        let mut controller = ready(300);
        controller.set_page(3).unwrap();
        controller.toggle_sort("last_name").unwrap();
        assert_eq!(controller.page().index, 0);

        controller.set_page(2).unwrap();
        let ticket = controller.toggle_sort("last_name").unwrap();
        assert_eq!(controller.page().index, 0);
        assert_eq!(controller.sort().direction(), Some(SortDirection::Desc));
        assert_eq!(ticket.query.params.get("sort_order"), Some("desc"));

        controller.set_page(2).unwrap();
        controller
            .set_sort(SortState::by("company", SortDirection::Asc))
            .unwrap();
        assert_eq!(controller.page().index, 0);
    }

    #[test]
    fn test_unchanged_filter_issues_nothing() {
        let mut controller = ready(30);
        controller.set_filter(FilterLabel::Search, "acme").unwrap();
        assert!(controller.set_filter(FilterLabel::Search, "acme").unwrap().is_none());
        assert!(controller.set_filter(FilterLabel::Seniority, "").unwrap().is_none());
    }

    #[test]
    fn test_batch_filter_edit_issues_one_fetch() {
        let mut controller = ready(300);
        controller.set_page(5).unwrap();
        let before = controller.generation;

        let ticket = controller
            .set_filters([
                (FilterLabel::Department, "Sales"),
                (FilterLabel::Seniority, "Senior, Director"),
            ])
            .unwrap()
            .unwrap();
        assert_eq!(ticket.generation, before + 1);
        assert_eq!(controller.page().index, 0);
        assert_eq!(
            ticket.query.params.to_query_string(),
            "seniority=Senior%2CDirector&department=Sales"
        );

        assert!(
            controller
                .set_filters([(FilterLabel::Department, "Sales")])
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_page_navigation_keeps_filters_and_clamps() {
        let mut controller = ready(100);
        controller.set_filter(FilterLabel::Regions, "West").unwrap();
        let ticket = controller.set_page(99).unwrap().unwrap();
        // 100 results at 15 per page: last index is 6
        assert_eq!(controller.page().index, 6);
        assert_eq!(ticket.query.page, 7);
        assert_eq!(ticket.query.params.get("regions"), Some("west"));
    }

    #[test]
    fn test_page_size_must_be_on_menu() {
        let mut controller = ready(45);
        assert!(controller.set_page_size(100).is_err());
        let ticket = controller.set_page_size(50).unwrap().unwrap();
        assert_eq!(ticket.query.per_page, 50);
        assert_eq!(controller.page().index, 0);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut controller = DirectoryController::new(15);
        let older = controller.set_filter(FilterLabel::Search, "old").unwrap().unwrap();
        let newer = controller.set_filter(FilterLabel::Search, "new").unwrap().unwrap();

        assert_eq!(
            controller.apply_list(&newer, Ok(page_of(1..=2, 2))).unwrap(),
            ApplyOutcome::Applied
        );
        assert_eq!(
            controller.apply_list(&older, Ok(page_of(50..=60, 500))).unwrap(),
            ApplyOutcome::Stale
        );
        assert_eq!(controller.records().len(), 2);
        assert_eq!(controller.page().total_count, 2);
    }

    #[test]
    fn test_failed_fetch_keeps_previous_page() {
        let mut controller = ready(40);
        let ticket = controller.refresh().unwrap();
        controller
            .apply_list(&ticket, Err(BackendError::Transport("timeout".into())))
            .unwrap();

        assert_eq!(controller.records().len(), 15);
        assert_eq!(controller.status(), ViewStatus::Normal);
        assert_eq!(controller.load_state(), LoadState::Ready);
        assert!(controller.last_error().is_some());
    }

    #[test]
    fn test_failed_first_fetch_shows_unavailable() {
        let mut controller = DirectoryController::new(15);
        let ticket = controller.mount().unwrap();
        controller
            .apply_list(&ticket, Err(BackendError::Malformed("not a tuple".into())))
            .unwrap();
        assert!(controller.records().is_empty());
        assert_eq!(controller.status(), ViewStatus::Unavailable);
    }

    #[test]
    fn test_access_precondition_is_a_view_status() {
        let mut controller = ready(40);
        let ticket = controller.refresh().unwrap();
        controller
            .apply_list(
                &ticket,
                Err(BackendError::AccessDenied(AccessStatus::PixelInstallationNeeded)),
            )
            .unwrap();

        assert_eq!(
            controller.status(),
            ViewStatus::AccessRestricted(AccessStatus::PixelInstallationNeeded)
        );
        assert!(controller.records().is_empty());
        assert_eq!(controller.load_state(), LoadState::Ready);
        assert!(controller.last_error().is_none());
        assert_eq!(
            controller.take_notices(),
            vec![Notice::AccessRestricted {
                status: AccessStatus::PixelInstallationNeeded
            }]
        );
    }

    #[test]
    fn test_confirmed_unlock_merges_in_place() {
        let mut controller = ready(40);
        let before = controller.page().clone();
        let generation = controller.generation;

        let ticket = controller.begin_unlock(RecordId(4)).unwrap();
        let step = controller
            .credit_status_resolved(&ticket, Ok(CreditStatus::CreditsAreAvailable))
            .unwrap();
        assert_eq!(step, GateStep::AwaitConfirmation);
        assert_eq!(
            controller.unlock_stage(RecordId(4)),
            Some(UnlockStage::AwaitingConfirmation)
        );

        controller.confirm_unlock(&ticket).unwrap();
        assert_eq!(controller.charge_resolved(&ticket, Ok(())).unwrap(), ChargeStep::Merge);

        let fetched = Record::new(4).with_field("email", Field::visible(json!("p4@acme.test")));
        let step = controller.record_resolved(&ticket, Ok(fetched)).unwrap();
        assert_eq!(step, MergeStep::Merged(MergeOutcome::Merged(3)));

        let merged = &controller.records()[3];
        assert_eq!(
            merged.field("email").map(|f| f.visibility_status),
            Some(Visibility::Visible)
        );
        assert_eq!(merged.field("name"), Some(&Field::visible(json!("p4"))));
        assert_eq!(controller.records().len(), 15);
        assert_eq!(controller.page(), &before);
        assert_eq!(controller.generation, generation);
        assert_eq!(controller.unlock_stage(RecordId(4)), None);
    }

    #[test]
    fn test_unlimited_credits_auto_charge_with_notice() {
        let mut controller = ready(20);
        let ticket = controller.begin_unlock(RecordId(2)).unwrap();
        let step = controller
            .credit_status_resolved(&ticket, Ok(CreditStatus::UnlimitedCredits))
            .unwrap();
        assert_eq!(step, GateStep::Charge);
        controller.charge_resolved(&ticket, Ok(())).unwrap();
        controller
            .record_resolved(&ticket, Ok(record(2)))
            .unwrap();

        let notices = controller.take_notices();
        assert_eq!(
            notices,
            vec![
                Notice::AutoCharged { record: RecordId(2) },
                Notice::Unlocked { record: RecordId(2) }
            ]
        );
    }

    #[test]
    fn test_no_credits_blocks() {
        let mut controller = ready(20);
        let ticket = controller.begin_unlock(RecordId(2)).unwrap();
        let step = controller
            .credit_status_resolved(&ticket, Ok(CreditStatus::NoCredits))
            .unwrap();
        assert_eq!(step, GateStep::Blocked);
        assert_eq!(controller.unlock_stage(RecordId(2)), None);
        assert!(controller.confirm_unlock(&ticket).is_err());
        assert_eq!(
            controller.take_notices(),
            vec![Notice::UpgradeRequired { record: RecordId(2) }]
        );
    }

    #[test]
    fn test_status_failure_aborts_without_charge() {
        let mut controller = ready(20);
        let ticket = controller.begin_unlock(RecordId(2)).unwrap();
        let step = controller
            .credit_status_resolved(&ticket, Err(BackendError::Transport("refused".into())))
            .unwrap();
        assert_eq!(step, GateStep::Aborted);
        assert!(controller.charge_resolved(&ticket, Ok(())).is_err());
        assert!(controller.records()[1].field("email").unwrap().is_hidden());
        assert!(controller.take_notices().is_empty());
    }

    #[test]
    fn test_charge_cannot_skip_confirmation() {
        let mut controller = ready(20);
        let ticket = controller.begin_unlock(RecordId(2)).unwrap();
        controller
            .credit_status_resolved(&ticket, Ok(CreditStatus::CreditsAreAvailable))
            .unwrap();
        assert_eq!(
            controller.charge_resolved(&ticket, Ok(())),
            Err(Error::StaleUnlock(RecordId(2)))
        );
        controller.cancel_unlock(&ticket).unwrap();
        assert_eq!(controller.unlock_stage(RecordId(2)), None);
    }

    #[test]
    fn test_charge_failure_leaves_field_hidden() {
        let mut controller = ready(20);
        let ticket = controller.begin_unlock(RecordId(5)).unwrap();
        controller
            .credit_status_resolved(&ticket, Ok(CreditStatus::UnlimitedCredits))
            .unwrap();
        let step = controller
            .charge_resolved(
                &ticket,
                Err(BackendError::Status {
                    code: 500,
                    message: "ledger down".into(),
                }),
            )
            .unwrap();
        assert!(matches!(step, ChargeStep::Failed(_)));
        assert!(controller.records()[4].field("email").unwrap().is_hidden());
        assert!(controller.record_resolved(&ticket, Ok(record(5))).is_err());
    }

    #[test]
    fn test_duplicate_unlock_is_refused() {
        let mut controller = ready(20);
        controller.begin_unlock(RecordId(1)).unwrap();
        assert_eq!(
            controller.begin_unlock(RecordId(1)),
            Err(Error::UnlockInProgress(RecordId(1)))
        );
    }

    #[test]
    fn test_abandoned_unlock_frees_the_record() {
        let mut controller = ready(20);
        let first = controller.begin_unlock(RecordId(1)).unwrap();
        controller.abandon_unlock(&first);
        assert_eq!(controller.unlock_stage(RecordId(1)), None);

        let second = controller.begin_unlock(RecordId(1)).unwrap();
        // A late abandon of the earlier attempt leaves the new one alone
        controller.abandon_unlock(&first);
        assert_eq!(
            controller.unlock_stage(RecordId(1)),
            Some(UnlockStage::AwaitingCreditDecision)
        );
        assert_eq!(
            controller.credit_status_resolved(&first, Ok(CreditStatus::UnlimitedCredits)),
            Err(Error::StaleUnlock(RecordId(1)))
        );
        assert_eq!(
            controller.credit_status_resolved(&second, Ok(CreditStatus::UnlimitedCredits)),
            Ok(GateStep::Charge)
        );
    }

    #[test]
    fn test_mismatched_record_is_not_merged() {
        let mut controller = ready(20);
        let ticket = controller.begin_unlock(RecordId(1)).unwrap();
        controller
            .credit_status_resolved(&ticket, Ok(CreditStatus::UnlimitedCredits))
            .unwrap();
        controller.charge_resolved(&ticket, Ok(())).unwrap();
        let step = controller.record_resolved(&ticket, Ok(record(99))).unwrap();
        assert!(matches!(step, MergeStep::Failed(BackendError::Malformed(_))));
        assert_eq!(controller.records().len(), 15);
    }

    #[test]
    fn test_closed_controller_refuses_everything() {
        let mut controller = DirectoryController::new(15);
        let ticket = controller.mount().unwrap();
        let unlock = controller.begin_unlock(RecordId(1)).unwrap();
        controller.close();

        assert_eq!(
            controller.apply_list(&ticket, Ok(page_of(1..=3, 3))),
            Err(Error::Cancelled)
        );
        assert_eq!(
            controller.credit_status_resolved(&unlock, Ok(CreditStatus::UnlimitedCredits)),
            Err(Error::Cancelled)
        );
        assert!(controller.records().is_empty());
        assert!(controller.refresh().is_err());
    }
}
