//! Store contracts consumed by the core, plus an in-memory keyed store.
//!
//! The core only reads through [`InventoryStore`] and [`RecipeStore`]; it never
//! mutates. `MemoryStore` is the reference implementation and also carries the
//! CRUD surface used by the CLI.
//!
//! Design (v0):
//! - Canonical records in BTreeMaps keyed by id, so enumeration order is id order.
//! - A lowercase category -> ids index for category listings.
//! - The index is derived state; snapshots hold records only.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PantryError, PantryResult};
use crate::expiry;
use crate::food::{FoodItem, NewFoodItem};
use crate::recipe::{NewRecipe, Recipe, RecipeSummary};

pub trait InventoryStore {
    fn all_items(&self) -> Result<Vec<FoodItem>>;

    fn non_expired_items(&self, today: NaiveDate) -> Result<Vec<FoodItem>> {
        Ok(expiry::non_expired_items(&self.all_items()?, today))
    }

    /// Case-insensitive exact category match.
    fn items_by_category(&self, category: &str) -> Result<Vec<FoodItem>>;

    /// Case-insensitive substring match on the item name.
    fn search_items(&self, needle: &str) -> Result<Vec<FoodItem>>;
}

pub trait RecipeStore {
    /// Every recipe with its ingredients populated.
    fn all_recipes(&self) -> Result<Vec<Recipe>>;
}

impl<S: InventoryStore + ?Sized> InventoryStore for &S {
    fn all_items(&self) -> Result<Vec<FoodItem>> {
        (**self).all_items()
    }

    fn non_expired_items(&self, today: NaiveDate) -> Result<Vec<FoodItem>> {
        (**self).non_expired_items(today)
    }

    fn items_by_category(&self, category: &str) -> Result<Vec<FoodItem>> {
        (**self).items_by_category(category)
    }

    fn search_items(&self, needle: &str) -> Result<Vec<FoodItem>> {
        (**self).search_items(needle)
    }
}

impl<S: RecipeStore + ?Sized> RecipeStore for &S {
    fn all_recipes(&self) -> Result<Vec<Recipe>> {
        (**self).all_recipes()
    }
}

/// Serializable content of a [`MemoryStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub items: Vec<FoodItem>,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    #[serde(default)]
    pub next_id: u64,
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: BTreeMap<u64, FoodItem>,
    recipes: BTreeMap<u64, Recipe>,

    // by_category[lowercase category] = set(item_id)
    by_category: HashMap<String, BTreeSet<u64>>,

    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut store = Self::new();
        for item in snapshot.items {
            store.index(&item);
            store.items.insert(item.id, item);
        }
        for recipe in snapshot.recipes {
            store.recipes.insert(recipe.id, recipe);
        }

        let max_seen = store
            .items
            .keys()
            .chain(store.recipes.keys())
            .copied()
            .chain(
                store
                    .recipes
                    .values()
                    .flat_map(|r| r.ingredients.iter().map(|i| i.id)),
            )
            .max()
            .unwrap_or(0);
        store.next_id = snapshot.next_id.max(max_seen);
        store
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            items: self.items.values().cloned().collect(),
            recipes: self.recipes.values().cloned().collect(),
            next_id: self.next_id,
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn add_item(&mut self, new: NewFoodItem, now: DateTime<Utc>) -> PantryResult<FoodItem> {
        new.validate()?;
        let id = self.allocate_id();
        let item = new.into_item(id, now);
        self.index(&item);
        self.items.insert(id, item.clone());
        tracing::info!(id, name = %item.name, "added food item");
        Ok(item)
    }

    pub fn get_item(&self, id: u64) -> PantryResult<&FoodItem> {
        self.items.get(&id).ok_or(PantryError::ItemNotFound(id))
    }

    /// Replace every editable field; `id` and `added_at` are kept.
    pub fn update_item(&mut self, id: u64, new: NewFoodItem) -> PantryResult<FoodItem> {
        new.validate()?;
        let old = self
            .items
            .get(&id)
            .cloned()
            .ok_or(PantryError::ItemNotFound(id))?;
        self.deindex(&old);

        let item = new.into_item(id, old.added_at);
        self.index(&item);
        self.items.insert(id, item.clone());
        tracing::info!(id, "updated food item");
        Ok(item)
    }

    pub fn delete_item(&mut self, id: u64) -> PantryResult<FoodItem> {
        let item = self.items.remove(&id).ok_or_else(|| {
            tracing::warn!(id, "food item not found for deletion");
            PantryError::ItemNotFound(id)
        })?;
        self.deindex(&item);
        tracing::info!(id, "deleted food item");
        Ok(item)
    }

    pub fn add_recipe(&mut self, new: NewRecipe, now: DateTime<Utc>) -> PantryResult<Recipe> {
        new.validate()?;
        let id = self.allocate_id();
        let mut recipe = Recipe {
            id,
            name: new.name,
            description: new.description,
            instructions: new.instructions,
            prep_time_minutes: new.prep_time_minutes,
            servings: new.servings,
            created_at: now,
            ingredients: Vec::new(),
        };
        recipe.replace_ingredients(new.ingredients, &mut || self.allocate_id());
        self.recipes.insert(id, recipe.clone());
        tracing::info!(id, name = %recipe.name, "added recipe");
        Ok(recipe)
    }

    pub fn get_recipe(&self, id: u64) -> PantryResult<&Recipe> {
        self.recipes.get(&id).ok_or(PantryError::RecipeNotFound(id))
    }

    /// Replace header fields and swap the whole ingredient list (clear all, add all).
    pub fn update_recipe(&mut self, id: u64, new: NewRecipe) -> PantryResult<Recipe> {
        new.validate()?;
        let mut recipe = self
            .recipes
            .get(&id)
            .cloned()
            .ok_or(PantryError::RecipeNotFound(id))?;

        recipe.name = new.name;
        recipe.description = new.description;
        recipe.instructions = new.instructions;
        recipe.prep_time_minutes = new.prep_time_minutes;
        recipe.servings = new.servings;
        recipe.replace_ingredients(new.ingredients, &mut || self.allocate_id());

        self.recipes.insert(id, recipe.clone());
        tracing::info!(id, "updated recipe");
        Ok(recipe)
    }

    pub fn delete_recipe(&mut self, id: u64) -> PantryResult<Recipe> {
        let recipe = self
            .recipes
            .remove(&id)
            .ok_or(PantryError::RecipeNotFound(id))?;
        tracing::info!(id, "deleted recipe");
        Ok(recipe)
    }

    /// Name substring (case-insensitive, `None`/empty = any) and inclusive prep-time bounds.
    pub fn search_recipes(
        &self,
        name: Option<&str>,
        min_prep: Option<u32>,
        max_prep: Option<u32>,
    ) -> Vec<RecipeSummary> {
        let needle = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_lowercase);

        self.recipes
            .values()
            .filter(|r| {
                needle
                    .as_deref()
                    .is_none_or(|n| r.name.to_lowercase().contains(n))
            })
            .filter(|r| min_prep.is_none_or(|m| r.prep_time_minutes >= m))
            .filter(|r| max_prep.is_none_or(|m| r.prep_time_minutes <= m))
            .map(RecipeSummary::from)
            .collect()
    }

    fn index(&mut self, item: &FoodItem) {
        self.by_category
            .entry(item.category.to_lowercase())
            .or_default()
            .insert(item.id);
    }

    fn deindex(&mut self, item: &FoodItem) {
        let key = item.category.to_lowercase();
        if let Some(set) = self.by_category.get_mut(&key) {
            set.remove(&item.id);
            if set.is_empty() {
                self.by_category.remove(&key);
            }
        }
    }
}

impl InventoryStore for MemoryStore {
    fn all_items(&self) -> Result<Vec<FoodItem>> {
        Ok(self.items.values().cloned().collect())
    }

    fn items_by_category(&self, category: &str) -> Result<Vec<FoodItem>> {
        let Some(ids) = self.by_category.get(&category.to_lowercase()) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| self.items.get(id))
            .cloned()
            .collect())
    }

    fn search_items(&self, needle: &str) -> Result<Vec<FoodItem>> {
        let needle = needle.to_lowercase();
        Ok(self
            .items
            .values()
            .filter(|i| i.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

impl RecipeStore for MemoryStore {
    fn all_recipes(&self) -> Result<Vec<Recipe>> {
        Ok(self.recipes.values().cloned().collect())
    }
}
