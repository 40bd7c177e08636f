//! pantry-ingest: bulk import of inventory items and recipes from CSV exports.

pub mod parsers;
pub mod types;

pub use parsers::inventory::{parse_inventory_csv, parse_inventory_csv_path};
pub use parsers::recipes::{parse_recipes_csv, parse_recipes_csv_path};
pub use types::{Parsed, SkippedRow};
