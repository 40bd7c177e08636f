//! Hands sweep alerts to a background worker so the sweep never waits on a
//! slow channel (SMTP in particular).

use anyhow::{Result, anyhow};
use pantry_core::{FoodItemView, Notifier};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub enum DispatchJob {
    Expired(Vec<FoodItemView>),
    ExpiringSoon(Vec<FoodItemView>),
}

impl DispatchJob {
    fn label(&self) -> &'static str {
        match self {
            DispatchJob::Expired(_) => "expired",
            DispatchJob::ExpiringSoon(_) => "expiring-soon",
        }
    }

    fn deliver<N: Notifier + ?Sized>(&self, notifier: &N) -> Result<()> {
        match self {
            DispatchJob::Expired(items) => notifier.notify_expired(items),
            DispatchJob::ExpiringSoon(items) => notifier.notify_expiring_soon(items),
        }
    }
}

/// Notifier that only enqueues. Sending fails once the worker has shut down.
#[derive(Debug, Clone)]
pub struct QueueNotifier {
    tx: mpsc::UnboundedSender<DispatchJob>,
}

impl QueueNotifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DispatchJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn push(&self, job: DispatchJob) -> Result<()> {
        self.tx
            .send(job)
            .map_err(|_| anyhow!("dispatch worker has stopped"))
    }
}

impl Notifier for QueueNotifier {
    fn notify_expired(&self, items: &[FoodItemView]) -> Result<()> {
        self.push(DispatchJob::Expired(items.to_vec()))
    }

    fn notify_expiring_soon(&self, items: &[FoodItemView]) -> Result<()> {
        self.push(DispatchJob::ExpiringSoon(items.to_vec()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub delivered: usize,
    pub failed: usize,
}

/// Drain jobs until every sender is dropped.
///
/// Delivery runs on the blocking pool; a failed or panicking delivery is
/// logged and counted, and the worker moves on to the next job.
pub async fn run_worker<N>(
    mut rx: mpsc::UnboundedReceiver<DispatchJob>,
    notifier: Arc<N>,
) -> DispatchStats
where
    N: Notifier + Send + Sync + ?Sized + 'static,
{
    let mut stats = DispatchStats::default();

    while let Some(job) = rx.recv().await {
        let label = job.label();
        let n = Arc::clone(&notifier);
        let res = tokio::task::spawn_blocking(move || job.deliver(&*n)).await;

        match res {
            Ok(Ok(())) => {
                stats.delivered += 1;
                info!(kind = label, "alert delivered");
            }
            Ok(Err(e)) => {
                stats.failed += 1;
                error!(kind = label, error = %format!("{e:#}"), "alert delivery failed");
            }
            Err(e) => {
                stats.failed += 1;
                error!(kind = label, error = %e, "alert delivery task aborted");
            }
        }
    }

    info!(
        delivered = stats.delivered,
        failed = stats.failed,
        "dispatch worker stopped"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use chrono::{NaiveDate, Utc};
    use pantry_core::NewFoodItem;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        kinds: Mutex<Vec<&'static str>>,
    }

    impl Notifier for Recording {
        fn notify_expired(&self, _: &[FoodItemView]) -> Result<()> {
            self.kinds.lock().unwrap().push("expired");
            Ok(())
        }

        fn notify_expiring_soon(&self, _: &[FoodItemView]) -> Result<()> {
            self.kinds.lock().unwrap().push("soon");
            bail!("smtp timeout")
        }
    }

    fn views() -> Vec<FoodItemView> {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let item = NewFoodItem::new("Milk", "Dairy", 1.0, "l", today).into_item(1, Utc::now());
        vec![FoodItemView::at(item, today)]
    }

    #[tokio::test]
    async fn worker_delivers_in_order_and_counts_failures() {
        let (queue, rx) = QueueNotifier::channel();
        let sink = Arc::new(Recording::default());
        let worker = tokio::spawn(run_worker(rx, Arc::clone(&sink)));

        queue.notify_expired(&views()).unwrap();
        queue.notify_expiring_soon(&views()).unwrap();
        queue.notify_expired(&views()).unwrap();
        drop(queue);

        let stats = worker.await.unwrap();
        assert_eq!(stats, DispatchStats { delivered: 2, failed: 1 });
        assert_eq!(*sink.kinds.lock().unwrap(), vec!["expired", "soon", "expired"]);
    }

    #[tokio::test]
    async fn enqueue_fails_after_worker_is_gone() {
        let (queue, rx) = QueueNotifier::channel();
        drop(rx);
        assert!(queue.notify_expired(&views()).is_err());
    }
}
