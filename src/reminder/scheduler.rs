//! The periodic scan-and-dispatch loop.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::{
    fire_time, in_window, DisplayZone, ReminderKey, ReminderLedger, ReminderMessage,
    TICK_INTERVAL, TICK_TIMEOUT,
};
use crate::notify::NotifierRef;
use crate::store::{StoreError, TodoStore};
use crate::todo::Todo;

/// Counters for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Todos returned by the store scan
    pub candidates: usize,
    /// Reminders handed to the notifier successfully
    pub sent: usize,
    /// Reminders the notifier failed to deliver (not retried)
    pub failed: usize,
    /// Reminders that came due on a todo without a destination
    pub no_target: usize,
    /// In-window reminders skipped because their key was already recorded
    pub already_fired: usize,
}

impl TickReport {
    /// Number of reminders that transitioned to fired this tick.
    pub fn fired(&self) -> usize {
        self.sent + self.failed + self.no_target
    }
}

pub struct ReminderScheduler {
    store: Arc<dyn TodoStore>,
    notifier: NotifierRef,
    zone: DisplayZone,
    ledger: ReminderLedger,
}

impl ReminderScheduler {
    pub fn new(store: Arc<dyn TodoStore>, notifier: NotifierRef, zone: DisplayZone) -> Self {
        Self {
            store,
            notifier,
            zone,
            ledger: ReminderLedger::new(),
        }
    }

    #[cfg(test)]
    fn ledger(&self) -> &ReminderLedger {
        &self.ledger
    }

    /// Scan the store once and fire everything due at `now`.
    ///
    /// `now` is fixed for the whole tick. A store failure aborts the tick
    /// before any dispatch; per-reminder failures never do.
    pub async fn run_tick(&self, now: DateTime<Utc>) -> Result<TickReport, StoreError> {
        let todos = self.store.reminder_candidates().await?;
        let mut report = TickReport {
            candidates: todos.len(),
            ..Default::default()
        };

        for todo in &todos {
            self.process_todo(todo, now, &mut report).await;
        }

        Ok(report)
    }

    async fn process_todo(&self, todo: &Todo, now: DateTime<Utc>, report: &mut TickReport) {
        // Offsets without a due time have nothing to count back from.
        let Some(due_at) = todo.due_at else {
            return;
        };

        let offsets: BTreeSet<u32> = todo.notify_plan_minutes.iter().copied().collect();
        for offset in offsets {
            let Some(fire_at) = fire_time(due_at, offset) else {
                tracing::debug!(
                    todo_id = todo.id,
                    offset,
                    "Skipping reminder with unrepresentable fire time"
                );
                continue;
            };
            if !in_window(fire_at, now) {
                continue;
            }

            // Claimed before dispatch: a failed or abandoned send still counts as fired.
            let key = ReminderKey::new(todo.id, offset, fire_at);
            if !self.ledger.try_record(key, now).await {
                report.already_fired += 1;
                continue;
            }

            let Some(to) = todo.notify_email.as_deref() else {
                tracing::info!(
                    todo_id = todo.id,
                    offset,
                    %fire_at,
                    "Reminder due for '{}' but no destination is set",
                    todo.title
                );
                report.no_target += 1;
                continue;
            };

            let message = ReminderMessage::compose(&todo.title, offset, due_at, &self.zone);
            match self.notifier.send(to, &message.subject, &message.body).await {
                Ok(()) => {
                    tracing::info!(
                        todo_id = todo.id,
                        offset,
                        %fire_at,
                        transport = self.notifier.name(),
                        "Reminder sent to {}",
                        to
                    );
                    report.sent += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        todo_id = todo.id,
                        offset,
                        %fire_at,
                        transport = self.notifier.name(),
                        "Failed to send reminder to {}: {}",
                        to,
                        e
                    );
                    report.failed += 1;
                }
            }
        }
    }

    /// Tick every [`TICK_INTERVAL`] until `cancel` fires.
    ///
    /// Ticks never overlap. Each runs on its own task so a panic is logged
    /// instead of ending the loop; cancellation aborts an in-flight tick.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Reminder scheduler started: every {}s via {} transport",
            TICK_INTERVAL.as_secs(),
            self.notifier.name()
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            let now = Utc::now();
            let this = Arc::clone(&self);
            let mut tick = tokio::spawn(async move {
                tokio::time::timeout(TICK_TIMEOUT, this.run_tick(now)).await
            });

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tick.abort();
                    tracing::info!("Reminder tick abandoned on shutdown");
                    break;
                }
                outcome = &mut tick => outcome,
            };

            match outcome {
                Ok(Ok(Ok(report))) => {
                    if report.fired() > 0 || report.already_fired > 0 {
                        let ledger_size = self.ledger.len().await;
                        tracing::info!(
                            candidates = report.candidates,
                            ledger_size,
                            sent = report.sent,
                            failed = report.failed,
                            no_target = report.no_target,
                            already_fired = report.already_fired,
                            "Reminder tick complete"
                        );
                    } else {
                        tracing::debug!(candidates = report.candidates, "Reminder tick: nothing due");
                    }
                }
                Ok(Ok(Err(e))) => {
                    tracing::error!("Reminder scan failed: {}", e);
                }
                Ok(Err(_elapsed)) => {
                    tracing::warn!(
                        "Reminder tick exceeded {}s and was cut short",
                        TICK_TIMEOUT.as_secs()
                    );
                }
                Err(e) => {
                    tracing::error!("Reminder tick task failed: {}", e);
                }
            }
        }

        tracing::info!("Reminder scheduler stopped");
    }

    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
