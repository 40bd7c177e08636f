//! Expiration sweep: one pass over the inventory that hands expired and
//! soon-to-expire items to a notifier.
//!
//! A sweep never fails. Store and notifier errors are logged and recorded in
//! the [`SweepReport`]; the next scheduled run is unaffected.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::expiry;
use crate::food::FoodItemView;
use crate::notify::Notifier;
use crate::store::InventoryStore;

/// Horizon used by the sweep's "expiring soon" alert.
pub const SWEEP_SOON_DAYS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepState {
    Idle,
    Running,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub today: NaiveDate,
    pub expired_count: usize,
    pub expiring_soon_count: usize,
    /// Contained failures, in the order they happened.
    pub failures: Vec<String>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run one sweep against `today`.
pub fn run_sweep<S, N>(inventory: &S, notifier: &N, today: NaiveDate) -> SweepReport
where
    S: InventoryStore + ?Sized,
    N: Notifier + ?Sized,
{
    tracing::info!(%today, "running expiration sweep");

    let mut report = SweepReport {
        today,
        expired_count: 0,
        expiring_soon_count: 0,
        failures: Vec::new(),
    };

    let items = match inventory.all_items() {
        Ok(items) => items,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "sweep could not read inventory");
            report.failures.push(format!("inventory: {e:#}"));
            return report;
        }
    };

    let expired = FoodItemView::all_at(expiry::expired_items(&items, today), today);
    report.expired_count = expired.len();
    if expired.is_empty() {
        tracing::info!("no expired items found");
    } else {
        tracing::warn!(count = expired.len(), "found expired items");
        if let Err(e) = notifier.notify_expired(&expired) {
            tracing::error!(error = %format!("{e:#}"), "expired-items notification failed");
            report.failures.push(format!("notify expired: {e:#}"));
        }
    }

    let soon = FoodItemView::all_at(
        expiry::expiring_within(&items, today, SWEEP_SOON_DAYS),
        today,
    );
    report.expiring_soon_count = soon.len();
    if !soon.is_empty() {
        tracing::info!(count = soon.len(), "found items expiring soon");
        if let Err(e) = notifier.notify_expiring_soon(&soon) {
            tracing::error!(error = %format!("{e:#}"), "expiring-soon notification failed");
            report.failures.push(format!("notify expiring soon: {e:#}"));
        }
    }

    tracing::info!(
        expired = report.expired_count,
        expiring_soon = report.expiring_soon_count,
        failures = report.failures.len(),
        "expiration sweep finished"
    );
    report
}
