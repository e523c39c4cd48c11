//! Alerts page

use std::str::FromStr;

use shared::LowStockAlert;

/// Status tabs on the alerts page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertStatusFilter {
    All,
    #[default]
    Active,
    Resolved,
}

impl AlertStatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatusFilter::All => "all",
            AlertStatusFilter::Active => "active",
            AlertStatusFilter::Resolved => "resolved",
        }
    }

    /// Whether the server must include resolved alerts in the listing
    pub fn needs_resolved(&self) -> bool {
        !matches!(self, AlertStatusFilter::Active)
    }

    pub fn matches(&self, alert: &LowStockAlert) -> bool {
        match self {
            AlertStatusFilter::All => true,
            AlertStatusFilter::Active => !alert.is_resolved,
            AlertStatusFilter::Resolved => alert.is_resolved,
        }
    }
}

impl std::fmt::Display for AlertStatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(AlertStatusFilter::All),
            "active" => Ok(AlertStatusFilter::Active),
            "resolved" => Ok(AlertStatusFilter::Resolved),
            other => Err(format!("Unknown alert status: {}", other)),
        }
    }
}

/// Alerts in the selected tab, newest first
pub fn filter_alerts(alerts: &[LowStockAlert], status: AlertStatusFilter) -> Vec<&LowStockAlert> {
    let mut matching: Vec<&LowStockAlert> = alerts.iter().filter(|a| status.matches(a)).collect();
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    matching
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(id: i64, resolved: bool, hour: u32) -> LowStockAlert {
        LowStockAlert {
            id,
            item_id: id * 10,
            user_id: 1,
            quantity_at_alert: 2,
            alert_threshold: 5,
            is_resolved: resolved,
            created_at: chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            resolved_at: None,
        }
    }

    #[test]
    fn test_default_tab_is_active() {
        assert_eq!(AlertStatusFilter::default(), AlertStatusFilter::Active);
        assert!(!AlertStatusFilter::Active.needs_resolved());
        assert!(AlertStatusFilter::All.needs_resolved());
    }

    #[test]
    fn test_filter_and_sort() {
        let alerts = vec![alert(1, false, 8), alert(2, true, 9), alert(3, false, 10)];

        let active: Vec<_> = filter_alerts(&alerts, AlertStatusFilter::Active)
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(active, vec![3, 1]);

        let resolved = filter_alerts(&alerts, AlertStatusFilter::Resolved);
        assert_eq!(resolved.len(), 1);
        assert_eq!(filter_alerts(&alerts, AlertStatusFilter::All).len(), 3);
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(
            "Resolved".parse::<AlertStatusFilter>(),
            Ok(AlertStatusFilter::Resolved)
        );
        assert!("open".parse::<AlertStatusFilter>().is_err());
    }
}
