//! Domain errors raised at the boundary of the core.
//!
//! The classifier and the recommendation engine never fail; these errors come
//! from input validation and keyed lookups against a store.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PantryError {
    #[error("minimum match percentage must be between 0 and 100, got {0}")]
    InvalidMatchPercentage(f64),

    #[error("day horizon must be between {min} and {max}, got {days}")]
    InvalidHorizon { days: i64, min: i64, max: i64 },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("food item with ID {0} not found")]
    ItemNotFound(u64),

    #[error("recipe with ID {0} not found")]
    RecipeNotFound(u64),
}

pub type PantryResult<T> = std::result::Result<T, PantryError>;
