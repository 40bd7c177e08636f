use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use pantry_core::{FoodItemView, NewFoodItem};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::app::{App, item_line, print_items};
use crate::state::{load_store, save_store};

#[derive(Args, Debug)]
pub struct ItemFields {
    #[arg(long)]
    name: String,

    #[arg(long)]
    category: String,

    #[arg(long)]
    quantity: f64,

    #[arg(long)]
    unit: String,

    /// Expiration date, YYYY-MM-DD
    #[arg(long)]
    expires: NaiveDate,
}

impl ItemFields {
    fn into_new(self) -> NewFoodItem {
        NewFoodItem::new(self.name, self.category, self.quantity, self.unit, self.expires)
    }
}

#[derive(Subcommand, Debug)]
pub enum ItemCommand {
    /// Add an item to the fridge
    Add(ItemFields),

    /// List items, optionally filtered
    List {
        /// Exact category, case-insensitive
        #[arg(long)]
        category: Option<String>,

        /// Substring of the name, case-insensitive
        #[arg(long)]
        search: Option<String>,
    },

    Get { id: u64 },

    /// Replace every field of an item (added_at is kept)
    Update {
        id: u64,

        #[command(flatten)]
        fields: ItemFields,
    },

    Delete { id: u64 },

    /// Bulk-add items from a CSV (name,category,quantity,unit,expiration_date)
    Import { path: PathBuf },

    /// Items whose expiration date has passed
    Expired,

    /// Items expiring within N days (1-30)
    Expiring {
        #[arg(long, default_value_t = pantry_core::DEFAULT_SOON_DAYS)]
        days: i64,
    },
}

pub fn run(app: &App, cmd: ItemCommand) -> Result<()> {
    match cmd {
        ItemCommand::Add(fields) => {
            let mut store = load_store()?;
            let item = store.add_item(fields.into_new(), Utc::now())?;
            save_store(&store)?;
            let view = FoodItemView::at(item, app.today()?);
            app.emit(&view, |v| println!("Added {}", item_line(v)))
        }
        ItemCommand::List { category, search } => {
            let store = load_store()?;
            let items = app
                .service(&store)?
                .items(category.as_deref(), search.as_deref())?;
            app.emit(&items, |v| print_items(v))
        }
        ItemCommand::Get { id } => {
            let store = load_store()?;
            let item = store.get_item(id)?.clone();
            let view = FoodItemView::at(item, app.today()?);
            app.emit(&view, |v| println!("{}", item_line(v)))
        }
        ItemCommand::Update { id, fields } => {
            let mut store = load_store()?;
            let item = store.update_item(id, fields.into_new())?;
            save_store(&store)?;
            let view = FoodItemView::at(item, app.today()?);
            app.emit(&view, |v| println!("Updated {}", item_line(v)))
        }
        ItemCommand::Delete { id } => {
            let mut store = load_store()?;
            let item = store.delete_item(id)?;
            save_store(&store)?;
            app.emit(&item, |i| println!("Deleted #{} {}", i.id, i.name))
        }
        ItemCommand::Import { path } => import(app, &path),
        ItemCommand::Expired => {
            let store = load_store()?;
            let items = app.service(&store)?.expired_items()?;
            app.emit(&items, |v| print_items(v))
        }
        ItemCommand::Expiring { days } => {
            let store = load_store()?;
            let items = app.service(&store)?.expiring_within(days)?;
            app.emit(&items, |v| print_items(v))
        }
    }
}

fn import(app: &App, path: &Path) -> Result<()> {
    let parsed = pantry_ingest::parse_inventory_csv_path(path)
        .with_context(|| format!("import {}", path.display()))?;

    let mut store = load_store()?;
    let now = Utc::now();
    let mut added = Vec::with_capacity(parsed.records.len());
    for new in parsed.records {
        added.push(store.add_item(new, now)?);
    }
    save_store(&store)?;
    info!(added = added.len(), skipped = parsed.skipped.len(), "inventory import finished");

    let report = serde_json::json!({
        "added": added,
        "skipped": parsed.skipped,
    });
    app.emit(&report, |_| {
        println!("Imported {} items from {}", added.len(), path.display());
        for s in &parsed.skipped {
            println!("  skipped line {}: {}", s.line, s.reason);
        }
    })
}
