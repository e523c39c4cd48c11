//! Low stock alert and notification preference models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A low stock alert raised by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LowStockAlert {
    pub id: i64,
    pub item_id: i64,
    pub user_id: i64,
    pub quantity_at_alert: i64,
    pub alert_threshold: i64,
    pub is_resolved: bool,
    #[serde(with = "crate::types::timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::types::timestamp::option"
    )]
    pub resolved_at: Option<NaiveDateTime>,
}

/// Aggregate alert counters from `GET /alerts/stats`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertStats {
    pub total_alerts: i64,
    pub active_alerts: i64,
    pub resolved_alerts: i64,
    pub low_stock_items: i64,
}

/// Stored notification preferences of the current user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationPreferences {
    #[serde(default)]
    pub notification_email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub notification_enabled: bool,
    pub alert_threshold: i64,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            notification_email: None,
            phone_number: None,
            notification_enabled: true,
            alert_threshold: crate::types::DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

/// Partial preference update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct UserPreferencesUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_enabled: Option<bool>,
    #[validate(range(min = 1, max = 100, message = "Alert threshold must be between 1 and 100"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_threshold: Option<i64>,
    #[validate(email(message = "Invalid notification email"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// Response of `POST /alerts/test-email`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestEmailResponse {
    pub message: String,
    pub recipient: String,
}
