//! Low stock alert and notification preference endpoints

use serde::de::IgnoredAny;
use shared::{
    AlertStats, LowStockAlert, NotificationPreferences, TestEmailResponse, UserPreferencesUpdate,
};

use super::ApiGateway;
use crate::error::ClientResult;

impl ApiGateway {
    pub async fn list_alerts(&self, show_resolved: bool) -> ClientResult<Vec<LowStockAlert>> {
        self.get_with_query("/alerts/", &[("show_resolved", show_resolved)])
            .await
    }

    pub async fn alert_stats(&self) -> ClientResult<AlertStats> {
        self.get("/alerts/stats").await
    }

    pub async fn get_alert(&self, alert_id: i64) -> ClientResult<LowStockAlert> {
        self.get(&format!("/alerts/{}", alert_id)).await
    }

    pub async fn resolve_alert(&self, alert_id: i64) -> ClientResult<()> {
        self.put_empty::<IgnoredAny>(&format!("/alerts/{}/resolve", alert_id))
            .await?;
        Ok(())
    }

    pub async fn notification_preferences(&self) -> ClientResult<NotificationPreferences> {
        self.get("/alerts/preferences/get").await
    }

    pub async fn update_preferences(&self, update: &UserPreferencesUpdate) -> ClientResult<()> {
        self.put_json::<IgnoredAny, _>("/alerts/preferences/update", update)
            .await?;
        Ok(())
    }

    /// Ask the server to send a test notification email
    pub async fn send_test_email(&self) -> ClientResult<TestEmailResponse> {
        self.post_json("/alerts/test-email", &serde_json::json!({}))
            .await
    }
}
