use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Stored `tipe_laporan` of flood reports.
pub const FLOOD_REPORT_TYPE: &str = "Banjir";
/// Status a moderator assigns to a confirmed report. Compared case-sensitively.
pub const VALID_STATUS: &str = "Valid";
/// Validated flood reports in one day that trigger an alert.
pub const FLOOD_ALERT_THRESHOLD: i64 = 3;
/// Maximum rows returned by the notification history.
pub const HISTORY_LIMIT: i64 = 50;

pub const INSTALLED_AT_REQUIRED_MESSAGE: &str = "Timestamp instalasi aplikasi diperlukan";

/// Result of today's flood-report count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloodReportSummary {
    pub total_valid_reports: i64,
    pub should_notify: bool,
}

impl FloodReportSummary {
    pub fn from_count(total_valid_reports: i64) -> Self {
        Self {
            total_valid_reports,
            should_notify: total_valid_reports >= FLOOD_ALERT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationHistoryQuery {
    pub installed_at: Option<String>,
}

impl NotificationHistoryQuery {
    /// The app installation instant; notifications before it are not shown.
    pub fn installed_at(&self) -> Result<DateTime<Utc>, ServiceError> {
        let raw = self
            .installed_at
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ServiceError::ValidationError(INSTALLED_AT_REQUIRED_MESSAGE.to_string())
            })?;

        DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|_| {
                ServiceError::ValidationError(
                    "Format timestamp instalasi tidak valid. Gunakan format ISO 8601".to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn alert_fires_from_third_report() {
        assert!(!FloodReportSummary::from_count(0).should_notify);
        assert!(!FloodReportSummary::from_count(2).should_notify);
        assert!(FloodReportSummary::from_count(3).should_notify);
        assert!(FloodReportSummary::from_count(12).should_notify);
    }

    #[test]
    fn installed_at_is_required() {
        for query in [
            NotificationHistoryQuery::default(),
            NotificationHistoryQuery {
                installed_at: Some("  ".into()),
            },
        ] {
            assert_matches!(
                query.installed_at(),
                Err(ServiceError::ValidationError(ref m)) if m == INSTALLED_AT_REQUIRED_MESSAGE
            );
        }
    }

    #[test]
    fn installed_at_must_be_rfc3339() {
        let bad = NotificationHistoryQuery {
            installed_at: Some("01/03/2024".into()),
        };
        assert_matches!(bad.installed_at(), Err(ServiceError::ValidationError(_)));

        let good = NotificationHistoryQuery {
            installed_at: Some("2024-03-01T07:00:00+07:00".into()),
        };
        assert_eq!(
            good.installed_at().unwrap().to_rfc3339(),
            "2024-03-01T00:00:00+00:00"
        );
    }
}
