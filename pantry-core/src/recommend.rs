//! Recommendation engine: rank recipes by how much of their ingredient list
//! the current (non-expired) inventory covers.
//!
//! Matching is by name only, case-insensitive. Quantities and units are
//! carried for display and never compared.
//!
//! Ordering:
//! - match_percentage DESC
//! - ties keep the order the recipes were supplied in (stable sort)

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::food::{AvailableIngredient, FoodItem};
use crate::recipe::{Recipe, RecipeSummary};

pub const NO_INGREDIENTS_TEXT: &str = "No ingredients specified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchTier {
    Perfect,
    Good,
    Partial,
    Low,
}

impl MatchTier {
    /// Inclusive lower bounds, checked from the top.
    pub fn for_percentage(pct: f64) -> Self {
        if pct == 100.0 {
            MatchTier::Perfect
        } else if pct >= 80.0 {
            MatchTier::Good
        } else if pct >= 50.0 {
            MatchTier::Partial
        } else {
            MatchTier::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchTier::Perfect => "Perfect match",
            MatchTier::Good => "Good match",
            MatchTier::Partial => "Partial match",
            MatchTier::Low => "Low match",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecommendation {
    pub recipe: RecipeSummary,
    pub match_percentage: f64,
    /// Original-case ingredient names found in inventory.
    pub available_ingredients: Vec<String>,
    pub missing_ingredients: Vec<String>,
    pub can_make: bool,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecommendationFilter {
    /// Keep only recommendations at or above this percentage (0..=100).
    pub min_match_percentage: Option<f64>,
    /// Keep only fully makeable recipes when `Some(true)`.
    pub can_make_only: Option<bool>,
}

impl RecommendationFilter {
    pub fn new(min_match_percentage: Option<f64>, can_make_only: Option<bool>) -> Self {
        Self {
            min_match_percentage,
            can_make_only,
        }
    }

    fn accepts(&self, rec: &RecipeRecommendation) -> bool {
        let meets_min = self
            .min_match_percentage
            .is_none_or(|p| rec.match_percentage >= p);
        let meets_can_make = !self.can_make_only.unwrap_or(false) || rec.can_make;
        meets_min && meets_can_make
    }

    /// Percentages outside 0..=100 (or NaN) are a caller error; treated as "nothing matches".
    fn in_range(&self) -> bool {
        self.min_match_percentage
            .is_none_or(|p| (0.0..=100.0).contains(&p))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub available_ingredients: Vec<AvailableIngredient>,
    pub recommendations: Vec<RecipeRecommendation>,
    /// Recipe count before filtering.
    pub total_recipes: usize,
    /// Recipe count after filtering.
    pub matching_recipes: usize,
}

/// Case-insensitive set of ingredient names on hand.
///
/// Several items with the same name collapse to one entry.
#[derive(Debug, Clone, Default)]
pub struct PantryIndex {
    names: HashSet<String>,
}

impl PantryIndex {
    pub fn from_items(items: &[FoodItem]) -> Self {
        Self {
            names: items.iter().map(|i| i.name.to_lowercase()).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Stateless; safe to share across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    pub fn new() -> Self {
        Self
    }

    /// `non_expired` must already be filtered through the classifier.
    pub fn recommend(
        &self,
        non_expired: &[FoodItem],
        recipes: &[Recipe],
        filter: &RecommendationFilter,
    ) -> RecommendationResponse {
        let available_ingredients: Vec<AvailableIngredient> =
            non_expired.iter().map(AvailableIngredient::from).collect();

        let recommendations = if filter.in_range() {
            let index = PantryIndex::from_items(non_expired);
            let mut recs: Vec<RecipeRecommendation> = recipes
                .iter()
                .map(|r| score_recipe(r, &index))
                .filter(|r| filter.accepts(r))
                .collect();
            sort_by_match(&mut recs);
            recs
        } else {
            tracing::warn!(
                min_match = ?filter.min_match_percentage,
                "minimum match percentage out of range; returning no recommendations"
            );
            Vec::new()
        };

        tracing::debug!(
            total = recipes.len(),
            matching = recommendations.len(),
            "scored recipes"
        );

        RecommendationResponse {
            available_ingredients,
            matching_recipes: recommendations.len(),
            total_recipes: recipes.len(),
            recommendations,
        }
    }

    /// Recipes that use `ingredient` and have it on hand. No percentage or can-make filter.
    pub fn for_ingredient(
        &self,
        non_expired: &[FoodItem],
        recipes: &[Recipe],
        ingredient: &str,
    ) -> Vec<RecipeRecommendation> {
        let index = PantryIndex::from_items(non_expired);
        let wanted = ingredient.to_lowercase();

        let mut recs: Vec<RecipeRecommendation> = recipes
            .iter()
            .map(|r| score_recipe(r, &index))
            .filter(|r| {
                r.available_ingredients
                    .iter()
                    .any(|name| name.to_lowercase() == wanted)
            })
            .collect();
        sort_by_match(&mut recs);
        recs
    }
}

/// Score one recipe against the index.
pub fn score_recipe(recipe: &Recipe, index: &PantryIndex) -> RecipeRecommendation {
    if recipe.ingredients.is_empty() {
        return RecipeRecommendation {
            recipe: recipe.summary(),
            match_percentage: 0.0,
            available_ingredients: Vec::new(),
            missing_ingredients: Vec::new(),
            can_make: false,
            recommendation: NO_INGREDIENTS_TEXT.to_string(),
        };
    }

    let (available, missing): (Vec<String>, Vec<String>) = recipe
        .ingredients
        .iter()
        .map(|i| i.ingredient_name.clone())
        .partition(|name| index.contains(name));

    let total = recipe.ingredients.len();
    let match_percentage = round2(available.len() as f64 / total as f64 * 100.0);
    let can_make = missing.is_empty();

    RecipeRecommendation {
        recipe: recipe.summary(),
        match_percentage,
        available_ingredients: available,
        missing_ingredients: missing,
        can_make,
        recommendation: MatchTier::for_percentage(match_percentage)
            .label()
            .to_string(),
    }
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn sort_by_match(recs: &mut [RecipeRecommendation]) {
    recs.sort_by(|a, b| b.match_percentage.total_cmp(&a.match_percentage));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::NewFoodItem;
    use crate::recipe::RecipeIngredient;
    use chrono::{NaiveDate, Utc};

    fn food(id: u64, name: &str) -> FoodItem {
        NewFoodItem::new(
            name,
            "Misc",
            1.0,
            "pcs",
            NaiveDate::from_ymd_opt(2026, 3, 11).unwrap(),
        )
        .into_item(id, Utc::now())
    }

    fn recipe(id: u64, name: &str, ingredients: &[&str]) -> Recipe {
        Recipe {
            id,
            name: name.to_string(),
            description: None,
            instructions: "Cook.".to_string(),
            prep_time_minutes: 10,
            servings: 1,
            created_at: Utc::now(),
            ingredients: ingredients
                .iter()
                .enumerate()
                .map(|(i, n)| RecipeIngredient {
                    id: id * 100 + i as u64,
                    ingredient_name: n.to_string(),
                    required_quantity: 1.0,
                    unit: "pcs".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn tiers_use_inclusive_lower_bounds() {
        assert_eq!(MatchTier::for_percentage(100.0), MatchTier::Perfect);
        assert_eq!(MatchTier::for_percentage(99.99), MatchTier::Good);
        assert_eq!(MatchTier::for_percentage(80.0), MatchTier::Good);
        assert_eq!(MatchTier::for_percentage(79.99), MatchTier::Partial);
        assert_eq!(MatchTier::for_percentage(50.0), MatchTier::Partial);
        assert_eq!(MatchTier::for_percentage(49.99), MatchTier::Low);
        assert_eq!(MatchTier::for_percentage(0.0).label(), "Low match");
    }

    #[test]
    fn match_is_case_insensitive_and_keeps_display_case() {
        let index = PantryIndex::from_items(&[food(1, "EGG"), food(2, "egg")]);
        assert_eq!(index.len(), 1);

        let rec = score_recipe(&recipe(1, "Omelette", &["Egg", "Chives"]), &index);
        assert_eq!(rec.available_ingredients, vec!["Egg".to_string()]);
        assert_eq!(rec.missing_ingredients, vec!["Chives".to_string()]);
        assert_eq!(rec.match_percentage, 50.0);
        assert!(!rec.can_make);
        assert_eq!(rec.recommendation, "Partial match");
    }

    #[test]
    fn percentage_rounds_to_two_places() {
        let index = PantryIndex::from_items(&[food(1, "a")]);
        let rec = score_recipe(&recipe(1, "r", &["a", "b", "c"]), &index);
        assert_eq!(rec.match_percentage, 33.33);

        let index = PantryIndex::from_items(&[food(1, "a"), food(2, "b")]);
        let rec = score_recipe(&recipe(1, "r", &["a", "b", "c"]), &index);
        assert_eq!(rec.match_percentage, 66.67);
    }

    #[test]
    fn empty_recipe_is_degenerate_not_an_error() {
        let index = PantryIndex::from_items(&[food(1, "egg")]);
        let rec = score_recipe(&recipe(1, "Air", &[]), &index);
        assert_eq!(rec.match_percentage, 0.0);
        assert!(rec.available_ingredients.is_empty());
        assert!(rec.missing_ingredients.is_empty());
        assert!(!rec.can_make);
        assert_eq!(rec.recommendation, "No ingredients specified");
    }

    #[test]
    fn sort_is_descending_and_stable_on_ties() {
        let items = vec![food(1, "a"), food(2, "b")];
        let recipes = vec![
            recipe(1, "half-1", &["a", "z"]),
            recipe(2, "full", &["a", "b"]),
            recipe(3, "half-2", &["b", "y"]),
            recipe(4, "none", &["q"]),
        ];
        let resp = RecommendationEngine::new().recommend(
            &items,
            &recipes,
            &RecommendationFilter::default(),
        );
        let names: Vec<&str> = resp
            .recommendations
            .iter()
            .map(|r| r.recipe.name.as_str())
            .collect();
        assert_eq!(names, vec!["full", "half-1", "half-2", "none"]);
        assert_eq!(resp.total_recipes, 4);
        assert_eq!(resp.matching_recipes, 4);
        assert_eq!(resp.available_ingredients.len(), 2);
    }

    #[test]
    fn filters_are_subsets_of_unfiltered_output() {
        let items = vec![food(1, "a"), food(2, "b"), food(3, "c")];
        let recipes = vec![
            recipe(1, "r1", &["a", "b", "c", "d"]),
            recipe(2, "r2", &["a"]),
            recipe(3, "r3", &["x", "y"]),
            recipe(4, "r4", &["a", "b"]),
            recipe(5, "r5", &[]),
        ];
        let engine = RecommendationEngine::new();
        let all = engine.recommend(&items, &recipes, &RecommendationFilter::default());

        let makeable = engine.recommend(&items, &recipes, &RecommendationFilter::new(None, Some(true)));
        let expected: Vec<_> = all
            .recommendations
            .iter()
            .filter(|r| r.can_make)
            .cloned()
            .collect();
        assert_eq!(makeable.recommendations, expected);
        assert_eq!(makeable.total_recipes, 5);
        assert_eq!(makeable.matching_recipes, 2);

        for p in [0.0, 25.0, 50.0, 75.0, 100.0] {
            let filtered = engine.recommend(&items, &recipes, &RecommendationFilter::new(Some(p), None));
            let expected: Vec<_> = all
                .recommendations
                .iter()
                .filter(|r| r.match_percentage >= p)
                .cloned()
                .collect();
            assert_eq!(filtered.recommendations, expected, "min={p}");
        }

        let off = engine.recommend(&items, &recipes, &RecommendationFilter::new(None, Some(false)));
        assert_eq!(off.recommendations, all.recommendations);
    }

    #[test]
    fn out_of_range_minimum_yields_empty_list() {
        let items = vec![food(1, "a")];
        let recipes = vec![recipe(1, "r", &["a"])];
        let engine = RecommendationEngine::new();
        for p in [-1.0, 100.5, f64::NAN] {
            let resp = engine.recommend(&items, &recipes, &RecommendationFilter::new(Some(p), None));
            assert!(resp.recommendations.is_empty());
            assert_eq!(resp.total_recipes, 1);
            assert_eq!(resp.matching_recipes, 0);
        }
    }

    #[test]
    fn for_ingredient_requires_name_on_hand() {
        let items = vec![food(1, "Egg"), food(2, "flour")];
        let recipes = vec![
            recipe(1, "bread", &["Flour", "Water"]),
            recipe(2, "omelette", &["egg"]),
            recipe(3, "crepe", &["EGG", "Flour", "Milk"]),
            recipe(4, "salad", &["Lettuce"]),
        ];
        let engine = RecommendationEngine::new();

        let recs = engine.for_ingredient(&items, &recipes, "eGg");
        let names: Vec<&str> = recs.iter().map(|r| r.recipe.name.as_str()).collect();
        assert_eq!(names, vec!["omelette", "crepe"]);

        // Listed in a recipe but not on hand: no result.
        assert!(engine.for_ingredient(&items, &recipes, "milk").is_empty());
    }
}
