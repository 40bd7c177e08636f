//! Inventory CSV import.
//!
//! Expected header (any column order, extra columns ignored):
//!   name,category,quantity,unit,expiration_date
//!
//! Dates are ISO `YYYY-MM-DD`; `MM/DD/YYYY` is accepted too.

use anyhow::Result;
use chrono::NaiveDate;
use pantry_core::NewFoodItem;
use std::io::Read;
use std::path::Path;

use super::{Columns, open, reader};
use crate::types::Parsed;

const REQUIRED: [&str; 5] = ["name", "category", "quantity", "unit", "expiration_date"];

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .ok()
}

/// Parse inventory rows. Rows failing to parse or validate are skipped, not fatal.
pub fn parse_inventory_csv<R: Read>(input: R) -> Result<Parsed<NewFoodItem>> {
    let mut rdr = reader(input);
    let cols = Columns::from_header(rdr.headers()?, &REQUIRED)?;
    let mut out = Parsed::default();

    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.iter().all(|f| f.is_empty()) {
            continue;
        }

        let date_str = cols.get(&record, "expiration_date");
        let Some(expiration_date) = parse_date(date_str) else {
            out.skip(line, format!("invalid expiration date '{date_str}'"));
            continue;
        };

        let qty_str = cols.get(&record, "quantity");
        let Ok(quantity) = qty_str.parse::<f64>() else {
            out.skip(line, format!("invalid quantity '{qty_str}'"));
            continue;
        };

        let item = NewFoodItem::new(
            cols.get(&record, "name"),
            cols.get(&record, "category"),
            quantity,
            cols.get(&record, "unit"),
            expiration_date,
        );
        if let Err(e) = item.validate() {
            out.skip(line, e.to_string());
            continue;
        }
        out.records.push(item);
    }

    Ok(out)
}

pub fn parse_inventory_csv_path(path: impl AsRef<Path>) -> Result<Parsed<NewFoodItem>> {
    parse_inventory_csv(open(path.as_ref())?)
}
