//! Recipe records and the ingredient lists they own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PantryError, PantryResult};
use crate::food::require_text;

pub const MAX_RECIPE_NAME_LEN: usize = 150;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_INGREDIENT_UNIT_LEN: usize = 20;

/// One required ingredient. Only exists inside its owning [`Recipe`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub id: u64,
    /// Matched case-insensitively against inventory item names.
    pub ingredient_name: String,
    /// Stored for display; matching ignores quantity and unit.
    pub required_quantity: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub instructions: String,
    pub prep_time_minutes: u32,
    pub servings: u32,
    pub created_at: DateTime<Utc>,
    pub ingredients: Vec<RecipeIngredient>,
}

impl Recipe {
    /// Drop every existing ingredient and build the new list from scratch.
    ///
    /// Ids are drawn from `next_id`, so even an unchanged name gets a fresh entry.
    pub fn replace_ingredients(
        &mut self,
        ingredients: Vec<NewRecipeIngredient>,
        next_id: &mut impl FnMut() -> u64,
    ) {
        self.ingredients.clear();
        for ing in ingredients {
            self.ingredients.push(RecipeIngredient {
                id: next_id(),
                ingredient_name: ing.ingredient_name,
                required_quantity: ing.required_quantity,
                unit: ing.unit,
            });
        }
    }

    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary::from(self)
    }
}

/// Recipe header without instructions or ingredient details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub prep_time_minutes: u32,
    pub servings: u32,
    pub created_at: DateTime<Utc>,
    pub ingredient_count: usize,
}

impl From<&Recipe> for RecipeSummary {
    fn from(r: &Recipe) -> Self {
        Self {
            id: r.id,
            name: r.name.clone(),
            description: r.description.clone(),
            prep_time_minutes: r.prep_time_minutes,
            servings: r.servings,
            created_at: r.created_at,
            ingredient_count: r.ingredients.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecipeIngredient {
    pub ingredient_name: String,
    pub required_quantity: f64,
    pub unit: String,
}

impl NewRecipeIngredient {
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            ingredient_name: name.into(),
            required_quantity: quantity,
            unit: unit.into(),
        }
    }

    fn validate(&self) -> PantryResult<()> {
        if self.ingredient_name.trim().is_empty() {
            return Err(PantryError::Validation(
                "Ingredient name is required".to_string(),
            ));
        }
        if self.required_quantity.is_nan() || self.required_quantity <= 0.0 {
            return Err(PantryError::Validation(format!(
                "Required quantity for '{}' must be greater than 0",
                self.ingredient_name
            )));
        }
        require_text("Ingredient unit", &self.unit, MAX_INGREDIENT_UNIT_LEN)
    }
}

/// Input for creating a recipe or replacing all of its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub instructions: String,
    pub prep_time_minutes: u32,
    pub servings: u32,
    pub ingredients: Vec<NewRecipeIngredient>,
}

impl NewRecipe {
    pub fn validate(&self) -> PantryResult<()> {
        require_text("Recipe name", &self.name, MAX_RECIPE_NAME_LEN)?;
        if let Some(desc) = &self.description {
            if desc.chars().count() > MAX_DESCRIPTION_LEN {
                return Err(PantryError::Validation(format!(
                    "Description cannot exceed {MAX_DESCRIPTION_LEN} characters"
                )));
            }
        }
        if self.instructions.trim().is_empty() {
            return Err(PantryError::Validation(
                "Instructions are required".to_string(),
            ));
        }
        if self.prep_time_minutes < 1 {
            return Err(PantryError::Validation(
                "Preparation time must be at least 1 minute".to_string(),
            ));
        }
        if self.servings < 1 {
            return Err(PantryError::Validation(
                "Servings must be at least 1".to_string(),
            ));
        }
        if self.ingredients.is_empty() {
            return Err(PantryError::Validation(
                "Recipe must have at least one ingredient".to_string(),
            ));
        }
        self.ingredients.iter().try_for_each(|i| i.validate())
    }
}
