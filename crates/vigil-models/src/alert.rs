//! Alert categories, statuses and provenance.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Category a detection or manual report is filed under.
///
/// This is a closed set: the classifier's fine-grained labels are collapsed
/// onto these four categories before anything is persisted or delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    Violence,
    Theft,
    Normal,
    ManualReport,
}

impl AlertCategory {
    /// Map a raw classifier label onto an alert category.
    ///
    /// Total and pure: several theft sub-types collapse onto `Theft` by
    /// policy, and any label not in the table (including future model
    /// additions) is treated as `Normal`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "violence" => AlertCategory::Violence,
            "normal" => AlertCategory::Normal,
            "shoplifting" | "stealing" | "robbery" | "burglary" => AlertCategory::Theft,
            _ => AlertCategory::Normal,
        }
    }

    /// Whether this category produces a persisted, notified alert.
    ///
    /// `Normal` never reaches the dispatcher; callers short-circuit on it.
    pub fn is_dispatchable(&self) -> bool {
        !matches!(self, AlertCategory::Normal)
    }

    /// Get string representation of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertCategory::Violence => "violence",
            AlertCategory::Theft => "theft",
            AlertCategory::Normal => "normal",
            AlertCategory::ManualReport => "manual_report",
        }
    }

    /// Human-facing notification title, e.g. `"Violence detected"`.
    pub fn notification_title(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        };
        format!("{} detected", capitalized)
    }
}

impl std::fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Delivery state of a persisted alert.
///
/// Transitions: `Pending -> Sent` on successful delivery, `Pending -> Failed`
/// otherwise. Terminal states are final; an alert never reverts to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    #[default]
    Pending,
    Sent,
    Failed,
}

impl AlertStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Pending => "pending",
            AlertStatus::Sent => "sent",
            AlertStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, AlertStatus::Sent | AlertStatus::Failed)
    }

    /// Parse a status string as stored in the database.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(AlertStatus::Pending),
            "sent" => Some(AlertStatus::Sent),
            "failed" => Some(AlertStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How an alert came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertMethod {
    /// Created by the detection pipeline from a classified clip.
    Model,
    /// Created by an operator through the manual trigger endpoint.
    Manual,
}

impl AlertMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertMethod::Model => "model",
            AlertMethod::Manual => "manual",
        }
    }
}

impl std::fmt::Display for AlertMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_mapping_theft_subtypes() {
        assert_eq!(AlertCategory::from_label("shoplifting"), AlertCategory::Theft);
        assert_eq!(AlertCategory::from_label("stealing"), AlertCategory::Theft);
        assert_eq!(AlertCategory::from_label("robbery"), AlertCategory::Theft);
        assert_eq!(AlertCategory::from_label("burglary"), AlertCategory::Theft);
    }

    #[test]
    fn test_label_mapping_is_total() {
        assert_eq!(AlertCategory::from_label("violence"), AlertCategory::Violence);
        assert_eq!(AlertCategory::from_label("normal"), AlertCategory::Normal);
        // Unknown labels fall back to Normal instead of failing.
        assert_eq!(AlertCategory::from_label("xyz_unknown"), AlertCategory::Normal);
        assert_eq!(AlertCategory::from_label(""), AlertCategory::Normal);
    }

    #[test]
    fn test_dispatchable_categories() {
        assert!(AlertCategory::Violence.is_dispatchable());
        assert!(AlertCategory::Theft.is_dispatchable());
        assert!(AlertCategory::ManualReport.is_dispatchable());
        assert!(!AlertCategory::Normal.is_dispatchable());
    }

    #[test]
    fn test_notification_title() {
        assert_eq!(AlertCategory::Theft.notification_title(), "Theft detected");
        assert_eq!(
            AlertCategory::ManualReport.notification_title(),
            "Manual_report detected"
        );
    }

    #[test]
    fn test_status_terminal_states() {
        assert!(!AlertStatus::Pending.is_terminal());
        assert!(AlertStatus::Sent.is_terminal());
        assert!(AlertStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [AlertStatus::Pending, AlertStatus::Sent, AlertStatus::Failed] {
            assert_eq!(AlertStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(AlertStatus::parse("bogus"), None);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&AlertCategory::ManualReport).unwrap();
        assert_eq!(json, "\"manual_report\"");
        let back: AlertCategory = serde_json::from_str("\"theft\"").unwrap();
        assert_eq!(back, AlertCategory::Theft);
    }
}
