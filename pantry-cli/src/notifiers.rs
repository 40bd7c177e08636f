//! Delivery channels for sweep alerts.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use lettre::{
    Message, SmtpTransport, Transport, message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use pantry_core::notify::{as_of_from, render_expired_alert, render_expiring_soon_alert};
use pantry_core::{Alert, FoodItemView, LogNotifier, Notifier};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::{Config, EmailSection};
use crate::state::outbox_path;

/// One line of the outbox file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedAlert {
    pub queued_at: DateTime<Utc>,
    pub alert: Alert,
}

/// Appends rendered alerts to a JSONL file for another process to pick up.
#[derive(Debug, Clone)]
pub struct OutboxNotifier {
    path: PathBuf,
}

impl OutboxNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append(&self, alert: Alert) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        let line = serde_json::to_string(&QueuedAlert {
            queued_at: Utc::now(),
            alert,
        })?;
        writeln!(f, "{}", line)?;
        info!(path = %self.path.display(), "queued alert in outbox");
        Ok(())
    }
}

impl Notifier for OutboxNotifier {
    fn notify_expired(&self, items: &[FoodItemView]) -> Result<()> {
        self.append(render_expired_alert(items, as_of_from(items)))
    }

    fn notify_expiring_soon(&self, items: &[FoodItemView]) -> Result<()> {
        self.append(render_expiring_soon_alert(items, as_of_from(items)))
    }
}

/// Read back the outbox; malformed lines are skipped.
pub fn read_outbox(path: &Path) -> Result<Vec<QueuedAlert>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let f = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut rows = Vec::new();
    for line in BufReader::new(f).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Ok(v) = serde_json::from_str::<QueuedAlert>(&line) {
            rows.push(v);
        }
    }
    Ok(rows)
}

/// Sends each alert as a plain-text email over SMTP.
#[derive(Clone)]
pub struct EmailNotifier {
    mailer: SmtpTransport,
    from: String,
    to: String,
}

impl EmailNotifier {
    pub fn new(cfg: &EmailSection) -> Result<Self> {
        let Some(to) = cfg.to_address.clone() else {
            bail!("[email] to_address is required when notify.channel = \"email\"");
        };

        let mailer = if cfg.smtp_username.is_empty() || cfg.smtp_password.is_empty() {
            info!(
                smtp_host = %cfg.smtp_host,
                smtp_port = cfg.smtp_port,
                "SMTP credentials not configured, using unauthenticated connection"
            );
            SmtpTransport::builder_dangerous(&cfg.smtp_host)
                .port(cfg.smtp_port)
                .build()
        } else {
            info!(
                smtp_host = %cfg.smtp_host,
                smtp_port = cfg.smtp_port,
                from = %cfg.from_address,
                "email notifier initialized with authentication and TLS"
            );
            let creds = Credentials::new(cfg.smtp_username.clone(), cfg.smtp_password.clone());
            SmtpTransport::relay(&cfg.smtp_host)
                .with_context(|| format!("smtp relay {}", cfg.smtp_host))?
                .port(cfg.smtp_port)
                .credentials(creds)
                .build()
        };

        Ok(Self {
            mailer,
            from: cfg.from_address.clone(),
            to,
        })
    }

    fn send(&self, alert: &Alert) -> Result<()> {
        let email = Message::builder()
            .from(self.from.parse().context("parse from address")?)
            .to(self.to.parse().context("parse to address")?)
            .subject(alert.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(alert.body.clone())
            .context("build alert email")?;

        match self.mailer.send(&email) {
            Ok(_) => {
                info!(to = %self.to, kind = alert.kind.as_str(), "alert email sent");
                Ok(())
            }
            Err(e) => {
                error!(to = %self.to, error = %e, "failed to send alert email");
                Err(e).context("smtp send")
            }
        }
    }
}

impl Notifier for EmailNotifier {
    fn notify_expired(&self, items: &[FoodItemView]) -> Result<()> {
        self.send(&render_expired_alert(items, as_of_from(items)))
    }

    fn notify_expiring_soon(&self, items: &[FoodItemView]) -> Result<()> {
        self.send(&render_expiring_soon_alert(items, as_of_from(items)))
    }
}

pub type SharedNotifier = Box<dyn Notifier + Send + Sync>;

/// Pick the channel named by `[notify] channel`.
pub fn build_notifier(cfg: &Config) -> Result<SharedNotifier> {
    match cfg.notify.channel.trim().to_ascii_lowercase().as_str() {
        "log" | "" => Ok(Box::new(LogNotifier)),
        "outbox" => Ok(Box::new(OutboxNotifier::new(outbox_path()?))),
        "email" => Ok(Box::new(EmailNotifier::new(&cfg.email)?)),
        other => bail!("unknown notify channel {other:?} (expected log, outbox or email)"),
    }
}
