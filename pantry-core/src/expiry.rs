//! Expiration classifier.
//!
//! Pure functions over an item and an explicit `today`. No clock access here:
//! callers capture `today` once and pass it to every call of one operation.
//!
//! Windows:
//! - expired: `expiration_date < today`
//! - expiring within n days: `today <= expiration_date <= today + n`
//!
//! Expired items never fall inside an "expiring within" window, and the
//! windows nest: within(n1) is a subset of within(n2) for n1 < n2.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::food::{FoodItem, FoodItemView};

/// Horizon of the "expiring soon" bucket in summaries.
pub const DEFAULT_SOON_DAYS: i64 = 3;
/// Horizon of the "expiring this week" bucket in summaries.
pub const WEEK_DAYS: i64 = 7;

pub fn is_expired(item: &FoodItem, today: NaiveDate) -> bool {
    item.expiration_date < today
}

/// Signed day distance; negative once the item has expired.
pub fn days_until_expiration(item: &FoodItem, today: NaiveDate) -> i64 {
    (item.expiration_date - today).num_days()
}

/// Inclusive window `[today, today + days]`. Negative horizons match nothing.
pub fn is_expiring_within(item: &FoodItem, today: NaiveDate, days: i64) -> bool {
    if days < 0 {
        return false;
    }
    // Horizons past the calendar's end cover every remaining date.
    let Some(limit) = Duration::try_days(days).and_then(|d| today.checked_add_signed(d)) else {
        return item.expiration_date >= today;
    };
    today <= item.expiration_date && item.expiration_date <= limit
}

pub fn expired_items(items: &[FoodItem], today: NaiveDate) -> Vec<FoodItem> {
    items
        .iter()
        .filter(|i| is_expired(i, today))
        .cloned()
        .collect()
}

pub fn non_expired_items(items: &[FoodItem], today: NaiveDate) -> Vec<FoodItem> {
    items
        .iter()
        .filter(|i| !is_expired(i, today))
        .cloned()
        .collect()
}

pub fn expiring_within(items: &[FoodItem], today: NaiveDate, days: i64) -> Vec<FoodItem> {
    items
        .iter()
        .filter(|i| is_expiring_within(i, today, days))
        .cloned()
        .collect()
}

/// Three overlapping expiry buckets over one inventory snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirationSummary {
    pub expired_count: usize,
    pub expired_items: Vec<FoodItemView>,
    pub expiring_soon_count: usize,
    pub expiring_soon_items: Vec<FoodItemView>,
    pub expiring_this_week_count: usize,
    pub expiring_this_week_items: Vec<FoodItemView>,
}

impl ExpirationSummary {
    /// Each bucket is computed independently; an item due tomorrow shows up in
    /// both the soon and the this-week lists.
    pub fn build(items: &[FoodItem], today: NaiveDate, soon_days: i64) -> Self {
        let expired_items = FoodItemView::all_at(expired_items(items, today), today);
        let expiring_soon_items =
            FoodItemView::all_at(expiring_within(items, today, soon_days), today);
        let expiring_this_week_items =
            FoodItemView::all_at(expiring_within(items, today, WEEK_DAYS), today);

        Self {
            expired_count: expired_items.len(),
            expired_items,
            expiring_soon_count: expiring_soon_items.len(),
            expiring_soon_items,
            expiring_this_week_count: expiring_this_week_items.len(),
            expiring_this_week_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::NewFoodItem;
    use chrono::Utc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn item(id: u64, name: &str, offset_days: i64) -> FoodItem {
        NewFoodItem::new(name, "Misc", 1.0, "pcs", today() + Duration::days(offset_days))
            .into_item(id, Utc::now())
    }

    #[test]
    fn yesterday_is_expired_and_not_soon() {
        let i = item(1, "Yogurt", -1);
        assert!(is_expired(&i, today()));
        assert_eq!(days_until_expiration(&i, today()), -1);
        assert!(!is_expiring_within(&i, today(), 3));

        let s = ExpirationSummary::build(&[i], today(), DEFAULT_SOON_DAYS);
        assert_eq!(s.expired_count, 1);
        assert_eq!(s.expired_items[0].item.name, "Yogurt");
        assert!(s.expiring_soon_items.is_empty());
        assert!(s.expiring_this_week_items.is_empty());
    }

    #[test]
    fn today_is_not_expired_and_inside_every_window() {
        let i = item(1, "Bread", 0);
        assert!(!is_expired(&i, today()));
        assert_eq!(days_until_expiration(&i, today()), 0);
        assert!(is_expiring_within(&i, today(), 0));
        assert!(is_expiring_within(&i, today(), 1));
    }

    #[test]
    fn horizon_upper_bound_is_inclusive() {
        let i = item(1, "Cheese", 2);
        assert!(is_expiring_within(&i, today(), 3));
        assert!(is_expiring_within(&i, today(), 2));
        assert!(!is_expiring_within(&i, today(), 1));
    }

    #[test]
    fn huge_horizon_covers_all_non_expired() {
        let fresh = item(1, "Rice", 400);
        let gone = item(2, "Fish", -1);
        assert!(is_expiring_within(&fresh, today(), i64::MAX));
        assert!(!is_expiring_within(&gone, today(), i64::MAX));

        let summary = ExpirationSummary::build(&[fresh, gone], today(), 200_000_000_000_000);
        assert_eq!(summary.expired_count, 1);
        assert_eq!(summary.expiring_soon_count, 1);
    }

    #[test]
    fn negative_horizon_matches_nothing() {
        let i = item(1, "Cheese", 0);
        assert!(!is_expiring_within(&i, today(), -1));
    }

    #[test]
    fn windows_nest() {
        let items: Vec<FoodItem> = (-3..=12).map(|d| item((d + 10) as u64, "x", d)).collect();
        for n1 in 0..10 {
            for n2 in (n1 + 1)..12 {
                let small = expiring_within(&items, today(), n1);
                let large = expiring_within(&items, today(), n2);
                assert!(small.iter().all(|i| large.contains(i)), "{n1} ⊄ {n2}");
            }
        }
        for d in 0..12 {
            assert!(
                expiring_within(&items, today(), d)
                    .iter()
                    .all(|i| !is_expired(i, today()))
            );
        }
    }

    #[test]
    fn summary_buckets_overlap() {
        let items = vec![
            item(1, "Milk", 1),
            item(2, "Ham", 5),
            item(3, "Fish", -2),
            item(4, "Rice", 30),
        ];
        let s = ExpirationSummary::build(&items, today(), DEFAULT_SOON_DAYS);
        assert_eq!(s.expired_count, 1);
        assert_eq!(s.expiring_soon_count, 1);
        assert_eq!(s.expiring_this_week_count, 2);
        assert_eq!(s.expiring_soon_items[0].item.name, "Milk");
        assert!(s.expiring_this_week_items.iter().any(|v| v.item.name == "Milk"));
    }

    #[test]
    fn non_expired_partition() {
        let items = vec![item(1, "a", -1), item(2, "b", 0), item(3, "c", 4)];
        assert_eq!(non_expired_items(&items, today()).len(), 2);
        assert_eq!(expired_items(&items, today()).len(), 1);
    }
}
