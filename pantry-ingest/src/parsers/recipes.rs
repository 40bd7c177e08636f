//! Recipe CSV import: one row per ingredient.
//!
//! Expected header:
//!   recipe,prep_time_minutes,servings,instructions,ingredient,quantity,unit
//! plus an optional `description` column.
//!
//! Consecutive rows with the same recipe name form one recipe, ingredients in
//! row order. Header fields are read from the first row of each group.

use anyhow::Result;
use pantry_core::{NewRecipe, NewRecipeIngredient};
use std::io::Read;
use std::path::Path;

use super::{Columns, open, reader};
use crate::types::Parsed;

const REQUIRED: [&str; 7] = [
    "recipe",
    "prep_time_minutes",
    "servings",
    "instructions",
    "ingredient",
    "quantity",
    "unit",
];

struct Pending {
    first_line: u64,
    recipe: NewRecipe,
    broken: Option<String>,
}

pub fn parse_recipes_csv<R: Read>(input: R) -> Result<Parsed<NewRecipe>> {
    let mut rdr = reader(input);
    let cols = Columns::from_header(rdr.headers()?, &REQUIRED)?;
    let mut out = Parsed::default();
    let mut current: Option<Pending> = None;

    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let name = cols.get(&record, "recipe");
        if name.is_empty() {
            continue;
        }

        let same_group = current.as_ref().is_some_and(|p| p.recipe.name == name);
        if !same_group {
            if let Some(done) = current.take() {
                finish(done, &mut out);
            }

            let prep = cols.get(&record, "prep_time_minutes");
            let servings = cols.get(&record, "servings");
            let description = Some(cols.get(&record, "description"))
                .filter(|d| !d.is_empty())
                .map(str::to_string);

            let mut broken = None;
            let prep_time_minutes = prep.parse::<u32>().unwrap_or_else(|_| {
                broken = Some(format!("invalid prep_time_minutes '{prep}'"));
                0
            });
            let servings = servings.parse::<u32>().unwrap_or_else(|_| {
                if broken.is_none() {
                    broken = Some(format!("invalid servings '{servings}'"));
                }
                0
            });

            current = Some(Pending {
                first_line: line,
                recipe: NewRecipe {
                    name: name.to_string(),
                    description,
                    instructions: cols.get(&record, "instructions").to_string(),
                    prep_time_minutes,
                    servings,
                    ingredients: Vec::new(),
                },
                broken,
            });
        }

        let Some(pending) = current.as_mut() else {
            continue;
        };
        let qty = cols.get(&record, "quantity");
        match qty.parse::<f64>() {
            Ok(quantity) => pending.recipe.ingredients.push(NewRecipeIngredient::new(
                cols.get(&record, "ingredient"),
                quantity,
                cols.get(&record, "unit"),
            )),
            Err(_) if pending.broken.is_none() => {
                pending.broken = Some(format!("invalid quantity '{qty}' on line {line}"));
            }
            Err(_) => {}
        }
    }

    if let Some(done) = current.take() {
        finish(done, &mut out);
    }

    Ok(out)
}

fn finish(pending: Pending, out: &mut Parsed<NewRecipe>) {
    if let Some(reason) = pending.broken {
        out.skip(pending.first_line, format!("{}: {reason}", pending.recipe.name));
        return;
    }
    match pending.recipe.validate() {
        Ok(()) => out.records.push(pending.recipe),
        Err(e) => out.skip(pending.first_line, format!("{}: {e}", pending.recipe.name)),
    }
}

pub fn parse_recipes_csv_path(path: impl AsRef<Path>) -> Result<Parsed<NewRecipe>> {
    parse_recipes_csv(open(path.as_ref())?)
}
