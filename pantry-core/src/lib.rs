//! pantry-core: expiration classification and recipe matching for a home pantry

pub mod error;
pub mod expiry;
pub mod food;
pub mod notify;
pub mod recipe;
pub mod recommend;
pub mod service;
pub mod store;
pub mod sweep;
pub mod time;

pub use error::{PantryError, PantryResult};
pub use expiry::{
    DEFAULT_SOON_DAYS, ExpirationSummary, WEEK_DAYS, days_until_expiration, is_expired,
    is_expiring_within,
};
pub use food::{AvailableIngredient, FoodItem, FoodItemView, NewFoodItem};
pub use notify::{Alert, AlertKind, LogNotifier, Notifier};
pub use recipe::{NewRecipe, NewRecipeIngredient, Recipe, RecipeIngredient, RecipeSummary};
pub use recommend::{
    MatchTier, RecipeRecommendation, RecommendationEngine, RecommendationFilter,
    RecommendationResponse,
};
pub use service::PantryService;
pub use store::{InventoryStore, MemoryStore, RecipeStore, StoreSnapshot};
pub use sweep::{SWEEP_SOON_DAYS, SweepReport, SweepState, run_sweep};
pub use time::{Clock, FixedClock, ZonedClock};
