use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use insightdesk_engine::MergeOutcome;
use insightdesk_types::{FilterLabel, RecordId, SortState};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::backend::{BackendError, DirectoryBackend};
use crate::controller::{
    ApplyOutcome, ChargeStep, DirectoryController, DirectorySnapshot, FetchTicket, GateStep,
    MergeStep, UnlockTicket,
};
use crate::error::{Error, Result};
use crate::notice::Notice;

/// An unlock waiting for the user to confirm spending a credit.
///
/// Hand it back to [`DirectoryView::confirm_unlock`] or
/// [`DirectoryView::cancel_unlock`]; dropping it leaves the record's attempt
/// open until the view closes. An unlock future dropped before it settles
/// frees the record instead.
#[derive(Debug)]
#[must_use = "a pending unlock must be confirmed or cancelled"]
pub struct PendingUnlock {
    ticket: UnlockTicket,
}

impl PendingUnlock {
    pub fn record(&self) -> RecordId {
        self.ticket.record
    }
}

/// Abandons an unlock attempt if the future driving it is dropped before
/// the attempt settles.
struct AttemptGuard<'a> {
    controller: &'a Mutex<DirectoryController>,
    ticket: UnlockTicket,
    armed: bool,
}

impl<'a> AttemptGuard<'a> {
    fn new(controller: &'a Mutex<DirectoryController>, ticket: UnlockTicket) -> Self {
        Self {
            controller,
            ticket,
            armed: true,
        }
    }

    /// Hand the attempt over to a [`PendingUnlock`].
    fn disarm(mut self) -> UnlockTicket {
        self.armed = false;
        self.ticket.clone()
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.controller
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .abandon_unlock(&self.ticket);
        }
    }
}

#[derive(Debug)]
pub enum UnlockOutcome {
    /// No credits; the UI should offer an upgrade.
    UpgradeRequired,
    NeedsConfirmation(PendingUnlock),
    Unlocked {
        auto_charged: bool,
        merge: MergeOutcome,
    },
    /// Credit status could not be determined; nothing was charged.
    Aborted,
    /// The charge or the refetch that follows it failed.
    Failed(BackendError),
}

/// A mounted directory browser: a [`DirectoryController`] driven against a
/// backend.
///
/// Methods take `&self` so several operations can be in flight at once (for
/// example a filter change issued while the previous fetch is still
/// running); the controller decides which completions still apply.
/// [`close`](Self::close), or dropping the view, cancels everything pending.
pub struct DirectoryView<B> {
    backend: B,
    controller: Mutex<DirectoryController>,
    cancel: CancellationToken,
}

impl<B: DirectoryBackend> DirectoryView<B> {
    pub fn new(backend: B, page_size: usize) -> Self {
        Self {
            backend,
            controller: Mutex::new(DirectoryController::new(page_size)),
            cancel: CancellationToken::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn controller(&self) -> MutexGuard<'_, DirectoryController> {
        self.controller.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a backend call unless the view is closed first.
    async fn cancellable<T>(
        &self,
        call: impl Future<Output = std::result::Result<T, BackendError>>,
    ) -> Result<std::result::Result<T, BackendError>> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            result = call => Ok(result),
        }
    }

    async fn run_fetch(&self, ticket: FetchTicket) -> Result<ApplyOutcome> {
        let result = self.cancellable(self.backend.fetch_list(&ticket.query)).await?;
        self.controller().apply_list(&ticket, result)
    }

    async fn run_optional(&self, ticket: Option<FetchTicket>) -> Result<ApplyOutcome> {
        match ticket {
            Some(ticket) => self.run_fetch(ticket).await,
            None => Ok(ApplyOutcome::Unchanged),
        }
    }

    /// First fetch after the view mounts.
    pub async fn load(&self) -> Result<ApplyOutcome> {
        let ticket = self.controller().mount()?;
        self.run_fetch(ticket).await
    }

    pub async fn refresh(&self) -> Result<ApplyOutcome> {
        let ticket = self.controller().refresh()?;
        self.run_fetch(ticket).await
    }

    pub async fn set_filter(
        &self,
        label: FilterLabel,
        value: impl Into<String>,
    ) -> Result<ApplyOutcome> {
        let ticket = self.controller().set_filter(label, value)?;
        self.run_optional(ticket).await
    }

    pub async fn set_filters<V: Into<String>>(
        &self,
        entries: impl IntoIterator<Item = (FilterLabel, V)>,
    ) -> Result<ApplyOutcome> {
        let ticket = self.controller().set_filters(entries)?;
        self.run_optional(ticket).await
    }

    pub async fn clear_filters(&self) -> Result<ApplyOutcome> {
        let ticket = self.controller().clear_filters()?;
        self.run_optional(ticket).await
    }

    pub async fn toggle_sort(&self, field: &str) -> Result<ApplyOutcome> {
        let ticket = self.controller().toggle_sort(field)?;
        self.run_fetch(ticket).await
    }

    pub async fn set_sort(&self, sort: SortState) -> Result<ApplyOutcome> {
        let ticket = self.controller().set_sort(sort)?;
        self.run_optional(ticket).await
    }

    pub async fn set_page_size(&self, size: usize) -> Result<ApplyOutcome> {
        let ticket = self.controller().set_page_size(size)?;
        self.run_optional(ticket).await
    }

    pub async fn set_page(&self, index: usize) -> Result<ApplyOutcome> {
        let ticket = self.controller().set_page(index)?;
        self.run_optional(ticket).await
    }

    /// Entry point for every "unlock" affordance in the UI.
    ///
    /// Queries the credit status fresh, then either stops (no credits, or the
    /// status query failed), hands back a [`PendingUnlock`] for confirmation,
    /// or charges straight away on an unlimited plan.
    pub async fn request_unlock(&self, id: RecordId) -> Result<UnlockOutcome> {
        let ticket = self.controller().begin_unlock(id)?;
        let guard = AttemptGuard::new(&self.controller, ticket);
        let status = self.cancellable(self.backend.credit_status()).await?;
        let step = self.controller().credit_status_resolved(&guard.ticket, status);

        match step? {
            GateStep::Blocked => Ok(UnlockOutcome::UpgradeRequired),
            GateStep::Aborted => Ok(UnlockOutcome::Aborted),
            GateStep::AwaitConfirmation => Ok(UnlockOutcome::NeedsConfirmation(PendingUnlock {
                ticket: guard.disarm(),
            })),
            GateStep::Charge => self.charge_and_merge(guard, true).await,
        }
    }

    pub async fn confirm_unlock(&self, pending: PendingUnlock) -> Result<UnlockOutcome> {
        self.controller().confirm_unlock(&pending.ticket)?;
        let guard = AttemptGuard::new(&self.controller, pending.ticket);
        self.charge_and_merge(guard, false).await
    }

    pub fn cancel_unlock(&self, pending: PendingUnlock) -> Result<()> {
        debug!(record = %pending.ticket.record, "unlock dismissed");
        self.controller().cancel_unlock(&pending.ticket)
    }

    async fn charge_and_merge(
        &self,
        guard: AttemptGuard<'_>,
        auto_charged: bool,
    ) -> Result<UnlockOutcome> {
        let record = guard.ticket.record;
        let charged = self.cancellable(self.backend.charge(record)).await?;
        let step = self.controller().charge_resolved(&guard.ticket, charged);
        match step? {
            ChargeStep::Merge => {}
            ChargeStep::Failed(err) => return Ok(UnlockOutcome::Failed(err)),
        }

        let fetched = self.cancellable(self.backend.fetch_record(record)).await?;
        let step = self.controller().record_resolved(&guard.ticket, fetched);
        match step? {
            MergeStep::Merged(merge) => Ok(UnlockOutcome::Unlocked {
                auto_charged,
                merge,
            }),
            MergeStep::Failed(err) => Ok(UnlockOutcome::Failed(err)),
        }
    }

    /// CSV of everything matching the current filters and sort.
    pub async fn export_csv(&self) -> Result<Vec<u8>> {
        let params = {
            let controller = self.controller();
            if controller.is_closed() {
                return Err(Error::Cancelled);
            }
            controller.query_params()
        };
        let bytes = self.cancellable(self.backend.export_csv(&params)).await??;
        Ok(bytes)
    }

    pub fn snapshot(&self) -> DirectorySnapshot {
        self.controller().snapshot()
    }

    pub fn take_notices(&self) -> Vec<Notice> {
        self.controller().take_notices()
    }

    /// Unmount: pending fetches and unlock sequences stop and cannot change
    /// state afterwards.
    pub fn close(&self) {
        self.cancel.cancel();
        self.controller().close();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl<B> Drop for DirectoryView<B> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
