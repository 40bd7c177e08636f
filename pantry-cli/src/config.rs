use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_pantry_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub clock: ClockSection,
    pub sweep: SweepSection,
    pub expiration: ExpirationSection,
    pub notify: NotifySection,
    pub email: EmailSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockSection {
    /// IANA zone every "today" is computed in.
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepSection {
    /// Local trigger time, "HH:MM".
    pub at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpirationSection {
    /// Horizon of the "expiring soon" bucket in summaries.
    pub soon_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySection {
    /// "log", "outbox" or "email".
    pub channel: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSection {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
    /// Where alerts go. Required when channel = "email".
    pub to_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Used when RUST_LOG is unset.
    pub level: String,
    pub json: bool,
}

impl Default for ClockSection {
    fn default() -> Self {
        Self {
            timezone: pantry_core::time::DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl Default for SweepSection {
    fn default() -> Self {
        Self {
            at: "08:00".to_string(),
        }
    }
}

impl Default for ExpirationSection {
    fn default() -> Self {
        Self {
            soon_days: pantry_core::DEFAULT_SOON_DAYS,
        }
    }
}

impl Default for NotifySection {
    fn default() -> Self {
        Self {
            channel: "log".to_string(),
        }
    }
}

impl Default for EmailSection {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: "pantry@localhost".to_string(),
            to_address: None,
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_pantry_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
