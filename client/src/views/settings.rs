//! Notification settings form

use shared::{NotificationPreferences, UserPreferencesUpdate};
use validator::Validate;

use crate::error::{ClientError, ClientResult};

/// Editable copy of the stored preferences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettingsForm {
    pub notification_email: String,
    pub phone_number: String,
    pub notification_enabled: bool,
    pub alert_threshold: i64,
}

impl Default for NotificationSettingsForm {
    fn default() -> Self {
        NotificationPreferences::default().into()
    }
}

impl From<NotificationPreferences> for NotificationSettingsForm {
    fn from(prefs: NotificationPreferences) -> Self {
        Self {
            notification_email: prefs.notification_email.unwrap_or_default(),
            phone_number: prefs.phone_number.unwrap_or_default(),
            notification_enabled: prefs.notification_enabled,
            alert_threshold: prefs.alert_threshold,
        }
    }
}

impl NotificationSettingsForm {
    /// Check the form and build the update payload.
    ///
    /// Email format and threshold range come from the payload's `validator`
    /// rules, the same email rule registration uses.
    pub fn to_update(&self) -> ClientResult<UserPreferencesUpdate> {
        let email = self.notification_email.trim();
        if email.is_empty() && self.notification_enabled {
            return Err(ClientError::Validation(
                "Please enter an email address to enable notifications".to_string(),
            ));
        }

        let phone = self.phone_number.trim();
        let update = UserPreferencesUpdate {
            notification_enabled: Some(self.notification_enabled),
            alert_threshold: Some(self.alert_threshold),
            notification_email: (!email.is_empty()).then(|| email.to_string()),
            phone_number: (!phone.is_empty()).then(|| phone.to_string()),
        };
        update.validate()?;
        Ok(update)
    }

    /// A test email needs somewhere to go
    pub fn check_test_email(&self) -> ClientResult<()> {
        if self.notification_email.trim().is_empty() {
            return Err(ClientError::Validation(
                "Please enter an email address first".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_required_when_enabled() {
        let form = NotificationSettingsForm::default();
        assert!(form.notification_enabled);
        let err = form.to_update().unwrap_err();
        assert_eq!(
            err.user_message("Failed to save settings"),
            "Please enter an email address to enable notifications"
        );

        let disabled = NotificationSettingsForm {
            notification_enabled: false,
            ..Default::default()
        };
        let update = disabled.to_update().unwrap();
        assert_eq!(update.notification_enabled, Some(false));
        assert!(update.notification_email.is_none());
    }

    #[test]
    fn test_threshold_bounds() {
        let mut form = NotificationSettingsForm {
            notification_email: " owner@shop.lk ".to_string(),
            ..Default::default()
        };
        for bad in [0, 101] {
            form.alert_threshold = bad;
            assert!(form.to_update().is_err());
        }
        form.alert_threshold = 100;
        let update = form.to_update().unwrap();
        assert_eq!(update.notification_email.as_deref(), Some("owner@shop.lk"));
        assert_eq!(update.alert_threshold, Some(100));
    }

    #[test]
    fn test_email_rule_matches_registration() {
        let form = NotificationSettingsForm {
            notification_email: "owner.shop.lk".to_string(),
            ..Default::default()
        };
        let err = form.to_update().unwrap_err();
        assert_eq!(err.user_message("ignored"), "Invalid notification email");

        let signup = shared::UserCreate {
            email: "owner.shop.lk".to_string(),
            password: "123456".to_string(),
            phone_number: None,
            notification_email: None,
        };
        assert!(signup.validate().is_err());

        let form = NotificationSettingsForm {
            notification_email: "owner@shop.lk".to_string(),
            ..Default::default()
        };
        assert!(form.to_update().is_ok());
    }

    #[test]
    fn test_test_email_needs_address() {
        assert!(NotificationSettingsForm::default().check_test_email().is_err());
        let form = NotificationSettingsForm {
            notification_email: "a@b.lk".to_string(),
            ..Default::default()
        };
        assert!(form.check_test_email().is_ok());
    }
}
