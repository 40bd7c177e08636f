use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use clap::{Args, Subcommand};
use pantry_core::{NewRecipe, NewRecipeIngredient, Recipe};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::app::App;
use crate::state::{load_store, save_store};

#[derive(Args, Debug)]
pub struct RecipeFields {
    #[arg(long)]
    name: String,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    instructions: String,

    /// Preparation time in minutes
    #[arg(long = "prep")]
    prep_time_minutes: u32,

    #[arg(long)]
    servings: u32,

    /// Repeatable: NAME:QUANTITY:UNIT, e.g. --ingredient "egg:2:pcs"
    #[arg(long = "ingredient", required = true, value_parser = parse_ingredient)]
    ingredients: Vec<NewRecipeIngredient>,
}

impl RecipeFields {
    fn into_new(self) -> NewRecipe {
        NewRecipe {
            name: self.name,
            description: self.description,
            instructions: self.instructions,
            prep_time_minutes: self.prep_time_minutes,
            servings: self.servings,
            ingredients: self.ingredients,
        }
    }
}

/// `NAME:QUANTITY:UNIT`. The name may itself contain colons; quantity and
/// unit are taken from the right.
fn parse_ingredient(s: &str) -> Result<NewRecipeIngredient> {
    let mut parts = s.rsplitn(3, ':');
    let unit = parts.next().map(str::trim).unwrap_or_default();
    let qty = parts.next().map(str::trim);
    let name = parts.next().map(str::trim);

    match (name, qty) {
        (Some(name), Some(qty)) if !name.is_empty() && !unit.is_empty() => {
            let quantity: f64 = qty
                .parse()
                .with_context(|| format!("invalid quantity '{qty}' in '{s}'"))?;
            Ok(NewRecipeIngredient::new(name, quantity, unit))
        }
        _ => Err(anyhow!("expected NAME:QUANTITY:UNIT, got '{s}'")),
    }
}

#[derive(Subcommand, Debug)]
pub enum RecipeCommand {
    /// Add a recipe
    Add(RecipeFields),

    /// List recipes with optional name and prep-time filters
    List {
        /// Substring of the name, case-insensitive
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        min_prep: Option<u32>,

        #[arg(long)]
        max_prep: Option<u32>,
    },

    Get { id: u64 },

    /// Replace a recipe, ingredients included
    Update {
        id: u64,

        #[command(flatten)]
        fields: RecipeFields,
    },

    Delete { id: u64 },

    /// Bulk-add recipes from a CSV, one row per ingredient
    Import { path: PathBuf },
}

pub fn run(app: &App, cmd: RecipeCommand) -> Result<()> {
    match cmd {
        RecipeCommand::Add(fields) => {
            let mut store = load_store()?;
            let recipe = store.add_recipe(fields.into_new(), Utc::now())?;
            save_store(&store)?;
            app.emit(&recipe, |r| println!("Added recipe #{} {}", r.id, r.name))
        }
        RecipeCommand::List {
            name,
            min_prep,
            max_prep,
        } => {
            let store = load_store()?;
            let rows = store.search_recipes(name.as_deref(), min_prep, max_prep);
            app.emit(&rows, |rows| {
                if rows.is_empty() {
                    println!("No recipes.");
                }
                for r in rows {
                    println!(
                        "#{:<4} {} | {} min | serves {} | {} ingredients",
                        r.id, r.name, r.prep_time_minutes, r.servings, r.ingredient_count
                    );
                }
            })
        }
        RecipeCommand::Get { id } => {
            let store = load_store()?;
            let recipe = store.get_recipe(id)?;
            app.emit(recipe, print_recipe)
        }
        RecipeCommand::Update { id, fields } => {
            let mut store = load_store()?;
            let recipe = store.update_recipe(id, fields.into_new())?;
            save_store(&store)?;
            app.emit(&recipe, |r| println!("Updated recipe #{} {}", r.id, r.name))
        }
        RecipeCommand::Delete { id } => {
            let mut store = load_store()?;
            let recipe = store.delete_recipe(id)?;
            save_store(&store)?;
            app.emit(&recipe, |r| println!("Deleted recipe #{} {}", r.id, r.name))
        }
        RecipeCommand::Import { path } => import(app, &path),
    }
}

fn print_recipe(r: &Recipe) {
    println!("#{} {}", r.id, r.name);
    if let Some(d) = &r.description {
        println!("{d}");
    }
    println!(
        "Prep: {} min | Serves: {}\n",
        r.prep_time_minutes, r.servings
    );
    println!("Ingredients:");
    for i in &r.ingredients {
        println!("  - {} ({} {})", i.ingredient_name, i.required_quantity, i.unit);
    }
    println!("\n{}", r.instructions);
}

fn import(app: &App, path: &Path) -> Result<()> {
    let parsed = pantry_ingest::parse_recipes_csv_path(path)
        .with_context(|| format!("import {}", path.display()))?;

    let mut store = load_store()?;
    let now = Utc::now();
    let mut added = Vec::with_capacity(parsed.records.len());
    for new in parsed.records {
        added.push(store.add_recipe(new, now)?.summary());
    }
    save_store(&store)?;
    info!(added = added.len(), skipped = parsed.skipped.len(), "recipe import finished");

    let report = serde_json::json!({
        "added": added,
        "skipped": parsed.skipped,
    });
    app.emit(&report, |_| {
        println!("Imported {} recipes from {}", added.len(), path.display());
        for s in &parsed.skipped {
            println!("  skipped line {}: {}", s.line, s.reason);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingredient_arg_splits_from_the_right() {
        let i = parse_ingredient("salt: sea:0.5:tsp").unwrap();
        assert_eq!(i.ingredient_name, "salt: sea");
        assert_eq!(i.required_quantity, 0.5);
        assert_eq!(i.unit, "tsp");
    }

    #[test]
    fn ingredient_arg_rejects_malformed_input() {
        assert!(parse_ingredient("egg").is_err());
        assert!(parse_ingredient("egg:two:pcs").is_err());
        assert!(parse_ingredient(":2:pcs").is_err());
        assert!(parse_ingredient("egg:2:").is_err());
    }
}
