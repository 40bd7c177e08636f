//! Alert rendering and the notifier contract used by the expiration sweep.

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::food::FoodItemView;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AlertKind {
    Expired,
    ExpiringSoon,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Expired => "expired",
            AlertKind::ExpiringSoon => "expiring-soon",
        }
    }
}

/// A rendered, channel-agnostic message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub subject: String,
    pub body: String,
    pub item_ids: Vec<u64>,
    /// Date the sweep classified against.
    pub as_of: NaiveDate,
    pub dedupe_key: String,
}

/// Delivery side of the sweep.
///
/// Errors stay with the caller of the sweep: it logs them and moves on.
pub trait Notifier {
    fn notify_expired(&self, items: &[FoodItemView]) -> Result<()>;

    fn notify_expiring_soon(&self, items: &[FoodItemView]) -> Result<()>;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify_expired(&self, items: &[FoodItemView]) -> Result<()> {
        (**self).notify_expired(items)
    }

    fn notify_expiring_soon(&self, items: &[FoodItemView]) -> Result<()> {
        (**self).notify_expiring_soon(items)
    }
}

pub fn render_expired_alert(items: &[FoodItemView], as_of: NaiveDate) -> Alert {
    let mut body = String::from("The following items in your fridge have expired:\n\n");
    for v in items {
        body.push_str(&format!(
            "• {} ({} {}) - Expired on {}\n",
            v.item.name, v.item.quantity, v.item.unit, v.item.expiration_date
        ));
    }
    body.push_str("\nPlease remove these items from your fridge.");

    build_alert(AlertKind::Expired, "⚠️ EXPIRED ITEMS ALERT ⚠️", body, items, as_of)
}

pub fn render_expiring_soon_alert(items: &[FoodItemView], as_of: NaiveDate) -> Alert {
    let mut body = String::from("The following items will expire soon:\n\n");
    for v in items {
        body.push_str(&format!(
            "• {} ({} {}) - Expires {}\n",
            v.item.name,
            v.item.quantity,
            v.item.unit,
            relative_day(v.days_until_expiration)
        ));
    }
    body.push_str("\nConsider using these items soon!");

    build_alert(AlertKind::ExpiringSoon, "🔔 EXPIRATION WARNING 🔔", body, items, as_of)
}

fn relative_day(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n => format!("in {n} days"),
    }
}

fn build_alert(
    kind: AlertKind,
    subject: &str,
    body: String,
    items: &[FoodItemView],
    as_of: NaiveDate,
) -> Alert {
    Alert {
        kind,
        subject: subject.to_string(),
        body,
        item_ids: items.iter().map(|v| v.item.id).collect(),
        as_of,
        // One alert per kind per classified day.
        dedupe_key: format!("{}:{}", kind.as_str(), as_of),
    }
}

/// Writes alerts to the log only. Default channel when nothing else is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_expired(&self, items: &[FoodItemView]) -> Result<()> {
        let as_of = as_of_from(items);
        let alert = render_expired_alert(items, as_of);
        tracing::warn!(count = items.len(), subject = %alert.subject, "NOTIFICATION:\n{}", alert.body);
        Ok(())
    }

    fn notify_expiring_soon(&self, items: &[FoodItemView]) -> Result<()> {
        let as_of = as_of_from(items);
        let alert = render_expiring_soon_alert(items, as_of);
        tracing::info!(count = items.len(), subject = %alert.subject, "NOTIFICATION:\n{}", alert.body);
        Ok(())
    }
}

/// Recover the classification date from the views themselves.
///
/// Every view in one sweep was derived against the same `today`, so any item
/// gives `expiration_date - days_until_expiration`.
pub fn as_of_from(items: &[FoodItemView]) -> NaiveDate {
    items
        .first()
        .map(|v| v.item.expiration_date - chrono::Duration::days(v.days_until_expiration))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::NewFoodItem;
    use chrono::Utc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn view(id: u64, name: &str, offset: i64) -> FoodItemView {
        let item = NewFoodItem::new(name, "Misc", 2.0, "pcs", today() + chrono::Duration::days(offset))
            .into_item(id, Utc::now());
        FoodItemView::at(item, today())
    }

    #[test]
    fn expired_alert_lists_each_item() {
        let alert = render_expired_alert(&[view(1, "Yogurt", -1), view(2, "Ham", -3)], today());
        assert_eq!(alert.kind, AlertKind::Expired);
        assert!(alert.subject.contains("EXPIRED ITEMS ALERT"));
        assert!(alert.body.contains("• Yogurt (2 pcs) - Expired on 2026-03-09"));
        assert!(alert.body.contains("• Ham (2 pcs) - Expired on 2026-03-07"));
        assert!(alert.body.ends_with("Please remove these items from your fridge."));
        assert_eq!(alert.item_ids, vec![1, 2]);
        assert_eq!(alert.dedupe_key, "expired:2026-03-10");
    }

    #[test]
    fn expiring_soon_uses_relative_days() {
        let alert = render_expiring_soon_alert(
            &[view(1, "Milk", 0), view(2, "Bread", 1), view(3, "Cheese", 2)],
            today(),
        );
        assert!(alert.body.contains("Milk (2 pcs) - Expires today"));
        assert!(alert.body.contains("Bread (2 pcs) - Expires tomorrow"));
        assert!(alert.body.contains("Cheese (2 pcs) - Expires in 2 days"));
        assert!(alert.subject.contains("EXPIRATION WARNING"));
    }

    #[test]
    fn as_of_is_recovered_from_views() {
        assert_eq!(as_of_from(&[view(1, "Milk", 2)]), today());
        assert_eq!(as_of_from(&[view(1, "Milk", -4)]), today());
    }

    #[test]
    fn log_notifier_never_fails() {
        let n = LogNotifier;
        assert!(n.notify_expired(&[view(1, "Yogurt", -1)]).is_ok());
        assert!(n.notify_expiring_soon(&[]).is_ok());
    }
}
