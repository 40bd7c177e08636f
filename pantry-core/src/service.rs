//! Query facade over the stores: the operations callers actually invoke.
//!
//! Each operation reads `today` from the clock exactly once and reuses it for
//! every comparison, so one response is internally consistent.

use anyhow::Result;
use chrono::NaiveDate;

use crate::error::PantryError;
use crate::expiry::{self, DEFAULT_SOON_DAYS, ExpirationSummary};
use crate::food::{FoodItem, FoodItemView};
use crate::recommend::{
    RecipeRecommendation, RecommendationEngine, RecommendationFilter, RecommendationResponse,
};
use crate::store::{InventoryStore, RecipeStore};
use crate::time::Clock;

pub const MIN_HORIZON_DAYS: i64 = 1;
pub const MAX_HORIZON_DAYS: i64 = 30;

pub fn validate_min_match(min_match: Option<f64>) -> Result<(), PantryError> {
    match min_match {
        Some(p) if !(0.0..=100.0).contains(&p) => Err(PantryError::InvalidMatchPercentage(p)),
        _ => Ok(()),
    }
}

pub fn validate_horizon(days: i64) -> Result<(), PantryError> {
    if (MIN_HORIZON_DAYS..=MAX_HORIZON_DAYS).contains(&days) {
        Ok(())
    } else {
        Err(PantryError::InvalidHorizon {
            days,
            min: MIN_HORIZON_DAYS,
            max: MAX_HORIZON_DAYS,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PantryService<I, R, C> {
    inventory: I,
    recipes: R,
    clock: C,
    engine: RecommendationEngine,
    soon_days: i64,
}

impl<I: InventoryStore, R: RecipeStore, C: Clock> PantryService<I, R, C> {
    pub fn new(inventory: I, recipes: R, clock: C) -> Self {
        Self {
            inventory,
            recipes,
            clock,
            engine: RecommendationEngine::new(),
            soon_days: DEFAULT_SOON_DAYS,
        }
    }

    /// Override the "expiring soon" horizon used by summaries.
    pub fn with_soon_days(mut self, days: i64) -> Self {
        self.soon_days = days;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn expiration_summary(&self) -> Result<ExpirationSummary> {
        let today = self.clock.today();
        tracing::info!(%today, "generating expiration summary");
        let items = self.inventory.all_items()?;
        Ok(ExpirationSummary::build(&items, today, self.soon_days))
    }

    pub fn recipe_recommendations(
        &self,
        min_match: Option<f64>,
        can_make_only: Option<bool>,
    ) -> Result<RecommendationResponse> {
        validate_min_match(min_match)?;
        tracing::info!(
            ?min_match,
            ?can_make_only,
            "generating recipe recommendations"
        );

        let today = self.clock.today();
        let on_hand = self.inventory.non_expired_items(today)?;
        let recipes = self.recipes.all_recipes()?;
        let response = self.engine.recommend(
            &on_hand,
            &recipes,
            &RecommendationFilter::new(min_match, can_make_only),
        );

        tracing::info!(
            matching = response.matching_recipes,
            total = response.total_recipes,
            "generated recommendations"
        );
        Ok(response)
    }

    pub fn recipes_for_ingredient(&self, ingredient: &str) -> Result<Vec<RecipeRecommendation>> {
        tracing::info!(ingredient, "finding recipes for ingredient");
        let today = self.clock.today();
        let on_hand = self.inventory.non_expired_items(today)?;
        let recipes = self.recipes.all_recipes()?;
        Ok(self.engine.for_ingredient(&on_hand, &recipes, ingredient))
    }

    pub fn expired_items(&self) -> Result<Vec<FoodItemView>> {
        let today = self.clock.today();
        let items = self.inventory.all_items()?;
        Ok(FoodItemView::all_at(expiry::expired_items(&items, today), today))
    }

    pub fn non_expired_items(&self) -> Result<Vec<FoodItemView>> {
        let today = self.clock.today();
        Ok(FoodItemView::all_at(
            self.inventory.non_expired_items(today)?,
            today,
        ))
    }

    /// Items expiring in `[today, today + days]`; `days` must be within 1..=30.
    pub fn expiring_within(&self, days: i64) -> Result<Vec<FoodItemView>> {
        validate_horizon(days)?;
        let today = self.clock.today();
        tracing::info!(days, %today, "retrieving items expiring soon");
        let items = self.inventory.all_items()?;
        Ok(FoodItemView::all_at(
            expiry::expiring_within(&items, today, days),
            today,
        ))
    }

    pub fn is_item_expiring_within(&self, item: &FoodItem, days: i64) -> Result<bool> {
        validate_horizon(days)?;
        Ok(expiry::is_expiring_within(item, self.clock.today(), days))
    }

    pub fn items(&self, category: Option<&str>, search: Option<&str>) -> Result<Vec<FoodItemView>> {
        let today = self.clock.today();
        // Blank filters are treated as absent.
        let category = category.filter(|c| !c.trim().is_empty());
        let search = search.filter(|s| !s.trim().is_empty());
        let items = match (category, search) {
            (Some(c), _) => self.inventory.items_by_category(c)?,
            (None, Some(s)) => self.inventory.search_items(s)?,
            (None, None) => self.inventory.all_items()?,
        };
        Ok(FoodItemView::all_at(items, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::NewFoodItem;
    use crate::recipe::{NewRecipe, NewRecipeIngredient};
    use crate::store::MemoryStore;
    use crate::time::FixedClock;
    use chrono::{Duration, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn seeded() -> MemoryStore {
        let mut s = MemoryStore::new();
        for (name, cat, off) in [
            ("Egg", "Dairy", 1),
            ("Milk", "Dairy", -1),
            ("Flour", "Baking", 90),
        ] {
            s.add_item(
                NewFoodItem::new(name, cat, 1.0, "pcs", today() + Duration::days(off)),
                Utc::now(),
            )
            .unwrap();
        }
        s.add_recipe(
            NewRecipe {
                name: "Pancakes".to_string(),
                description: None,
                instructions: "Mix and fry.".to_string(),
                prep_time_minutes: 15,
                servings: 2,
                ingredients: vec![
                    NewRecipeIngredient::new("egg", 2.0, "pcs"),
                    NewRecipeIngredient::new("milk", 0.2, "l"),
                    NewRecipeIngredient::new("flour", 0.2, "kg"),
                ],
            },
            Utc::now(),
        )
        .unwrap();
        s
    }

    #[test]
    fn expired_items_are_not_ingredients() {
        let store = seeded();
        let svc = PantryService::new(&store, &store, FixedClock::on_date(today()));
        let resp = svc.recipe_recommendations(None, None).unwrap();
        assert_eq!(resp.available_ingredients.len(), 2);
        let r = &resp.recommendations[0];
        assert_eq!(r.missing_ingredients, vec!["milk".to_string()]);
        assert_eq!(r.match_percentage, 66.67);
    }

    #[test]
    fn rejects_out_of_range_inputs() {
        let store = seeded();
        let svc = PantryService::new(&store, &store, FixedClock::on_date(today()));

        let err = svc.recipe_recommendations(Some(120.0), None).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PantryError>(),
            Some(&PantryError::InvalidMatchPercentage(120.0))
        );
        assert!(svc.expiring_within(0).is_err());
        assert!(svc.expiring_within(31).is_err());
        assert!(svc.expiring_within(30).is_ok());
    }

    #[test]
    fn summary_and_horizon_queries_share_the_clock() {
        let store = seeded();
        let svc = PantryService::new(&store, &store, FixedClock::on_date(today()));

        let s = svc.expiration_summary().unwrap();
        assert_eq!(s.expired_count, 1);
        assert_eq!(s.expiring_soon_count, 1);
        assert_eq!(s.expiring_this_week_count, 1);

        let soon = svc.expiring_within(1).unwrap();
        assert_eq!(soon.len(), 1);
        assert_eq!(soon[0].days_until_expiration, 1);

        let egg = store.search_items("egg").unwrap().remove(0);
        assert!(svc.is_item_expiring_within(&egg, 1).unwrap());

        // Same data one day later: egg expires today, milk is two days gone.
        let later = PantryService::new(
            &store,
            &store,
            FixedClock::on_date(today() + Duration::days(1)),
        );
        let expired = later.expired_items().unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].days_until_expiration, -2);
    }

    #[test]
    fn custom_soon_horizon() {
        let store = seeded();
        let svc = PantryService::new(&store, &store, FixedClock::on_date(today()))
            .with_soon_days(0);
        assert_eq!(svc.expiration_summary().unwrap().expiring_soon_count, 0);
    }

    #[test]
    fn item_listing_filters() {
        let store = seeded();
        let svc = PantryService::new(&store, &store, FixedClock::on_date(today()));
        assert_eq!(svc.items(Some("dairy"), None).unwrap().len(), 2);
        assert_eq!(svc.items(None, Some("fl")).unwrap().len(), 1);
        assert_eq!(svc.items(None, None).unwrap().len(), 3);
        assert_eq!(svc.non_expired_items().unwrap().len(), 2);
    }

    #[test]
    fn blank_filters_fall_through() {
        let store = seeded();
        let svc = PantryService::new(&store, &store, FixedClock::on_date(today()));
        assert_eq!(svc.items(Some(""), None).unwrap().len(), 3);
        assert_eq!(svc.items(Some("   "), Some("fl")).unwrap().len(), 1);
        assert_eq!(svc.items(Some(" "), Some("\t")).unwrap().len(), 3);
    }

    #[test]
    fn recipes_for_ingredient_skips_expired_stock() {
        let store = seeded();
        let svc = PantryService::new(&store, &store, FixedClock::on_date(today()));
        assert_eq!(svc.recipes_for_ingredient("EGG").unwrap().len(), 1);
        assert!(svc.recipes_for_ingredient("milk").unwrap().is_empty());
    }
}
