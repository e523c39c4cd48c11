//! Common types and display helpers used across the client

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Stock level below which an item counts as "low stock"
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Stock classification of a catalog item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    Low,
    InStock,
}

impl StockLevel {
    pub fn classify(quantity: i64, threshold: i64) -> Self {
        if quantity <= 0 {
            StockLevel::OutOfStock
        } else if is_low_stock(quantity, threshold) {
            StockLevel::Low
        } else {
            StockLevel::InStock
        }
    }
}

impl std::fmt::Display for StockLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockLevel::OutOfStock => write!(f, "Out of Stock"),
            StockLevel::Low => write!(f, "Low Stock"),
            StockLevel::InStock => write!(f, "In Stock"),
        }
    }
}

/// Format a price as US dollars, e.g. `$1,234.50`
pub fn format_price(price: Decimal) -> String {
    let rounded = price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{}", if negative { "-" } else { "" }, grouped, fraction)
}

/// Human readable stock quantity
pub fn format_quantity(quantity: i64) -> String {
    if quantity < 0 {
        return "Out of Stock".to_string();
    }
    if quantity == 0 {
        return "No Stock".to_string();
    }
    quantity.to_string()
}

/// Low stock means some stock is left, but less than the threshold
pub fn is_low_stock(quantity: i64, threshold: i64) -> bool {
    quantity < threshold && quantity > 0
}

/// Profit made by selling `quantity` units bought at `buying_price`.
/// Saturates at the decimal range instead of overflowing.
pub fn calculate_profit(buying_price: Decimal, selling_price: Decimal, quantity: i64) -> Decimal {
    selling_price
        .saturating_sub(buying_price)
        .saturating_mul(Decimal::from(quantity))
}

/// Serde adapter for backend timestamps.
///
/// The API emits either RFC 3339 timestamps or naive ISO-8601 ones (no
/// offset). Both are normalized to a UTC `NaiveDateTime`.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
            return Some(with_offset.naive_utc());
        }
        NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(NAIVE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    /// Same as the parent module for optional fields
    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw))),
                None => Ok(None),
            }
        }
    }
}
