use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use pantry_core::time::parse_daily_time;
use pantry_core::{Clock, Notifier, SweepReport, run_sweep};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::app::App;
use crate::dispatch::{QueueNotifier, run_worker};
use crate::notifiers::{QueuedAlert, build_notifier, read_outbox};
use crate::scheduler::{SweepScheduler, Trigger};
use crate::state::{FileStore, load_store, outbox_path, store_path};

#[derive(Subcommand, Debug)]
pub enum SweepCommand {
    /// Run one expiration sweep now and deliver alerts on the configured channel
    Run {
        /// Classify against this date instead of today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Stay in the foreground and sweep daily at [sweep] at (Ctrl-C to stop)
    Daemon {
        /// Sweep every N seconds instead of once a day
        #[arg(long)]
        every_secs: Option<u64>,
    },

    /// Show the most recent alerts queued by the outbox channel
    Outbox {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

pub async fn run(app: &App, cmd: SweepCommand) -> Result<()> {
    match cmd {
        SweepCommand::Run { date } => run_once(app, date),
        SweepCommand::Daemon { every_secs } => daemon(app, every_secs).await,
        SweepCommand::Outbox { limit } => outbox(app, limit),
    }
}

fn run_once(app: &App, date: Option<NaiveDate>) -> Result<()> {
    let store = load_store()?;
    let notifier = build_notifier(&app.cfg)?;
    let today = match date {
        Some(d) => d,
        None => app.today()?,
    };

    let report = run_sweep(&store, &*notifier, today);
    app.emit(&report, print_report)
}

fn print_report(r: &SweepReport) {
    println!(
        "Sweep for {}: {} expired, {} expiring soon",
        r.today, r.expired_count, r.expiring_soon_count
    );
    for f in &r.failures {
        println!("  failed: {f}");
    }
}

/// Newest `limit` entries, oldest first.
pub(crate) fn latest(mut rows: Vec<QueuedAlert>, limit: usize) -> Vec<QueuedAlert> {
    let skip = rows.len().saturating_sub(limit);
    rows.drain(..skip);
    rows
}

fn outbox(app: &App, limit: usize) -> Result<()> {
    let path = outbox_path()?;
    let rows = latest(read_outbox(&path)?, limit);
    app.emit(&rows, |rows| {
        if rows.is_empty() {
            println!("No queued alerts in {}", path.display());
            return;
        }
        println!("Outbox: {}\n", path.display());
        for r in rows {
            println!(
                "{} [{}] {} ({} items)",
                r.queued_at.format("%Y-%m-%d %H:%M"),
                r.alert.kind.as_str(),
                r.alert.subject,
                r.alert.item_ids.len()
            );
        }
    })
}

async fn daemon(app: &App, every_secs: Option<u64>) -> Result<()> {
    let clock = app.clock()?;
    let trigger = match every_secs {
        Some(secs) => Trigger::Every(Duration::from_secs(secs.max(1))),
        None => Trigger::DailyAt(
            parse_daily_time(&app.cfg.sweep.at).context("[sweep] at in config.toml")?,
        ),
    };

    let sink: Arc<dyn Notifier + Send + Sync> = Arc::from(build_notifier(&app.cfg)?);
    let (queue, rx) = QueueNotifier::channel();
    let worker = tokio::spawn(run_worker(rx, sink));

    let store = Arc::new(FileStore::new(store_path()?));
    info!(
        ?trigger,
        timezone = %clock.timezone(),
        channel = %app.cfg.notify.channel,
        "sweep daemon started"
    );
    let scheduler = SweepScheduler::start(trigger, store, Arc::new(queue), clock);

    tokio::signal::ctrl_c().await.context("wait for Ctrl-C")?;
    info!("shutting down sweep daemon");

    // Dropping the scheduler's queue handle lets the worker drain and exit.
    scheduler.stop().await;
    let stats = worker.await.context("dispatch worker")?;
    println!(
        "Stopped. {} alerts delivered, {} failed.",
        stats.delivered, stats.failed
    );
    Ok(())
}
