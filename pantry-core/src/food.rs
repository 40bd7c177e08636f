//! Food item records held by the inventory store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PantryError, PantryResult};
use crate::expiry;

pub const MAX_ITEM_NAME_LEN: usize = 100;
pub const MAX_CATEGORY_LEN: usize = 50;
pub const MAX_UNIT_LEN: usize = 20;

/// A perishable item on hand.
///
/// Expiry status is never stored here; see [`FoodItemView`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: u64,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub expiration_date: NaiveDate,
    pub added_at: DateTime<Utc>,
}

/// Input for creating or replacing a food item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFoodItem {
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub expiration_date: NaiveDate,
}

impl NewFoodItem {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        expiration_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            quantity,
            unit: unit.into(),
            expiration_date,
        }
    }

    pub fn validate(&self) -> PantryResult<()> {
        require_text("Name", &self.name, MAX_ITEM_NAME_LEN)?;
        require_text("Category", &self.category, MAX_CATEGORY_LEN)?;
        if self.quantity.is_nan() || self.quantity <= 0.0 {
            return Err(PantryError::Validation(
                "Quantity must be greater than 0".to_string(),
            ));
        }
        require_text("Unit", &self.unit, MAX_UNIT_LEN)?;
        Ok(())
    }

    pub fn into_item(self, id: u64, added_at: DateTime<Utc>) -> FoodItem {
        FoodItem {
            id,
            name: self.name,
            category: self.category,
            quantity: self.quantity,
            unit: self.unit,
            expiration_date: self.expiration_date,
            added_at,
        }
    }
}

/// Read model: an item plus expiry fields derived against a given `today`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItemView {
    #[serde(flatten)]
    pub item: FoodItem,
    pub is_expired: bool,
    pub days_until_expiration: i64,
}

impl FoodItemView {
    pub fn at(item: FoodItem, today: NaiveDate) -> Self {
        let is_expired = expiry::is_expired(&item, today);
        let days_until_expiration = expiry::days_until_expiration(&item, today);
        Self {
            item,
            is_expired,
            days_until_expiration,
        }
    }

    pub fn all_at(items: Vec<FoodItem>, today: NaiveDate) -> Vec<Self> {
        items.into_iter().map(|i| Self::at(i, today)).collect()
    }
}

/// Name + quantity + unit of one non-expired item, as shown in recommendation responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableIngredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

impl From<&FoodItem> for AvailableIngredient {
    fn from(item: &FoodItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
        }
    }
}

pub(crate) fn require_text(field: &str, value: &str, max_len: usize) -> PantryResult<()> {
    if value.trim().is_empty() {
        return Err(PantryError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > max_len {
        return Err(PantryError::Validation(format!(
            "{field} cannot exceed {max_len} characters"
        )));
    }
    Ok(())
}
