use anyhow::Result;
use chrono::NaiveDate;
use pantry_core::{Clock, FoodItemView, MemoryStore, PantryService, ZonedClock};
use serde::Serialize;

use crate::config::Config;

/// Per-invocation context shared by every subcommand.
pub struct App {
    pub cfg: Config,
    pub json: bool,
}

impl App {
    pub fn clock(&self) -> Result<ZonedClock> {
        ZonedClock::from_name(&self.cfg.clock.timezone)
    }

    pub fn today(&self) -> Result<NaiveDate> {
        Ok(self.clock()?.today())
    }

    pub fn service<'a>(
        &self,
        store: &'a MemoryStore,
    ) -> Result<PantryService<&'a MemoryStore, &'a MemoryStore, ZonedClock>> {
        Ok(PantryService::new(store, store, self.clock()?)
            .with_soon_days(self.cfg.expiration.soon_days))
    }

    /// JSON when `--json` is set, otherwise the human rendering.
    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text(value);
        }
        Ok(())
    }
}

pub fn item_line(v: &FoodItemView) -> String {
    let status = if v.is_expired {
        format!("expired {}d ago", -v.days_until_expiration)
    } else {
        match v.days_until_expiration {
            0 => "expires today".to_string(),
            1 => "expires tomorrow".to_string(),
            n => format!("expires in {n}d"),
        }
    };
    format!(
        "#{:<4} {} ({} {}) [{}] {} | {}",
        v.item.id,
        v.item.name,
        v.item.quantity,
        v.item.unit,
        v.item.category,
        v.item.expiration_date,
        status
    )
}

pub fn print_items(items: &[FoodItemView]) {
    if items.is_empty() {
        println!("No items.");
        return;
    }
    for v in items {
        println!("{}", item_line(v));
    }
}
