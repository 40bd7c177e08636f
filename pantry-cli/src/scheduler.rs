use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use pantry_core::time::next_fire_after;
use pantry_core::{Clock, InventoryStore, Notifier, SweepReport, SweepState, run_sweep};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// When the sweep fires.
#[derive(Debug, Clone, Copy)]
pub enum Trigger {
    /// Once a day at this local wall-clock time in the clock's zone.
    DailyAt(NaiveTime),
    /// Fixed period from start. Used for tests and ad-hoc runs.
    Every(std::time::Duration),
}

impl Trigger {
    pub fn next_after(&self, from: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
        match self {
            Trigger::DailyAt(at) => next_fire_after(from, *at, tz),
            Trigger::Every(period) => {
                from + chrono::Duration::from_std(*period).unwrap_or(chrono::Duration::days(1))
            }
        }
    }
}

/// Owns the timer task that runs the expiration sweep.
///
/// Each fire is independent: a sweep that reports failures does not stop the
/// loop, and the next fire is computed from the wall clock again.
pub struct SweepScheduler {
    handle: JoinHandle<()>,
    state: watch::Receiver<SweepState>,
    reports: watch::Receiver<Option<SweepReport>>,
}

impl SweepScheduler {
    pub fn start<S, N, C>(trigger: Trigger, store: Arc<S>, notifier: Arc<N>, clock: C) -> Self
    where
        S: InventoryStore + Send + Sync + ?Sized + 'static,
        N: Notifier + Send + Sync + ?Sized + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let (state_tx, state_rx) = watch::channel(SweepState::Idle);
        let (report_tx, report_rx) = watch::channel(None);

        let handle = tokio::spawn(async move {
            let mut last_fire: Option<DateTime<Utc>> = None;
            loop {
                let now = clock.now_utc();
                // Never re-fire the same slot if the wall clock lags the timer.
                let from = last_fire.map_or(now, |prev| prev.max(now));
                let fire = trigger.next_after(from, clock.timezone());
                let delay = (fire - now).to_std().unwrap_or_default();
                debug!(next = %fire, delay_secs = delay.as_secs(), "sweep scheduled");

                tokio::time::sleep(delay).await;
                last_fire = Some(fire);

                let today = clock.today();
                state_tx.send_replace(SweepState::Running);
                let (s, n) = (Arc::clone(&store), Arc::clone(&notifier));
                let res = tokio::task::spawn_blocking(move || run_sweep(&*s, &*n, today)).await;
                state_tx.send_replace(SweepState::Idle);

                match res {
                    Ok(report) => {
                        info!(
                            %today,
                            expired = report.expired_count,
                            expiring_soon = report.expiring_soon_count,
                            failures = report.failures.len(),
                            "scheduled sweep finished"
                        );
                        report_tx.send_replace(Some(report));
                    }
                    Err(e) => error!(error = %e, "sweep task aborted"),
                }
            }
        });

        Self {
            handle,
            state: state_rx,
            reports: report_rx,
        }
    }

    pub fn state(&self) -> SweepState {
        *self.state.borrow()
    }

    /// Latest finished sweep; `changed()` wakes on every run.
    pub fn reports(&self) -> watch::Receiver<Option<SweepReport>> {
        self.reports.clone()
    }

    /// Cancel the timer. A sweep already on the blocking pool runs to completion.
    pub async fn stop(self) {
        self.handle.abort();
        let _ = self.handle.await;
        info!("sweep scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use chrono::{NaiveDate, TimeZone};
    use pantry_core::{FixedClock, FoodItemView, MemoryStore, NewFoodItem};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Failing {
        calls: AtomicUsize,
    }

    impl Notifier for Failing {
        fn notify_expired(&self, _: &[FoodItemView]) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            bail!("channel down")
        }

        fn notify_expiring_soon(&self, _: &[FoodItemView]) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            bail!("channel down")
        }
    }

    #[test]
    fn daily_trigger_uses_local_time() {
        // 08:00 Tbilisi is 04:00 UTC.
        let at = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 5, 0, 0).unwrap();
        let next = Trigger::DailyAt(at).next_after(now, chrono_tz::Asia::Tbilisi);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 19, 4, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn keeps_firing_after_failed_sweeps() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let mut store = MemoryStore::new();
        store
            .add_item(
                NewFoodItem::new("Fish", "Fridge", 1.0, "pcs", today.pred_opt().unwrap()),
                Utc::now(),
            )
            .unwrap();

        let notifier = Arc::new(Failing {
            calls: AtomicUsize::new(0),
        });
        let sched = SweepScheduler::start(
            Trigger::Every(Duration::from_millis(10)),
            Arc::new(store),
            Arc::clone(&notifier),
            FixedClock::on_date(today),
        );

        let mut reports = sched.reports();
        for _ in 0..2 {
            tokio::time::timeout(Duration::from_secs(5), reports.changed())
                .await
                .expect("sweep did not fire")
                .unwrap();
            let report = reports.borrow_and_update().clone().unwrap();
            assert_eq!(report.today, today);
            assert_eq!(report.expired_count, 1);
            assert_eq!(report.failures.len(), 1);
        }
        assert!(notifier.calls.load(Ordering::SeqCst) >= 2);

        sched.stop().await;
    }

    #[tokio::test]
    async fn starts_idle() {
        let sched = SweepScheduler::start(
            Trigger::Every(Duration::from_secs(3600)),
            Arc::new(MemoryStore::new()),
            Arc::new(pantry_core::LogNotifier),
            FixedClock::on_date(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()),
        );
        assert_eq!(sched.state(), SweepState::Idle);
        assert!(sched.reports().borrow().is_none());
        sched.stop().await;
    }
}
