use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, JsonValue};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{
    db::{fetch_json_rows, raw_statement, statement},
    errors::{ResultExt, ServiceError},
    models::notification::{
        FloodReportSummary, FLOOD_REPORT_TYPE, HISTORY_LIMIT, VALID_STATUS,
    },
};

pub const LIST_NOTIFICATIONS_SQL: &str =
    "SELECT * FROM sigab_app.notifikasi ORDER BY created_at DESC";

pub const COUNT_VALID_FLOOD_REPORTS_SQL: &str = "SELECT COUNT(*) AS total \
     FROM sigab_app.laporan \
     WHERE tipe_laporan = $1 AND status = $2 AND DATE(waktu) = CURRENT_DATE";

pub const NOTIFICATION_HISTORY_SQL: &str = "SELECT * FROM sigab_app.notifikasi \
     WHERE created_at >= $1 \
     ORDER BY created_at DESC \
     LIMIT $2";

#[derive(Debug, Clone)]
pub struct NotificationService {
    db: Arc<DatabaseConnection>,
}

impl NotificationService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All notifications, newest first.
    pub async fn list_notifications(&self) -> Result<Vec<JsonValue>, ServiceError> {
        fetch_json_rows(&*self.db, raw_statement(LIST_NOTIFICATIONS_SQL))
            .await
            .or_internal("Terjadi kesalahan saat mengambil data notifikasi")
    }

    /// Counts today's validated flood reports, "today" being the database's date.
    #[instrument(skip(self))]
    pub async fn check_flood_reports(&self) -> Result<FloodReportSummary, ServiceError> {
        let stmt = statement(
            COUNT_VALID_FLOOD_REPORTS_SQL,
            [FLOOD_REPORT_TYPE.into(), VALID_STATUS.into()],
        );

        let total = async {
            match self.db.query_one(stmt).await? {
                Some(row) => row.try_get::<i64>("", "total"),
                None => Ok(0),
            }
        }
        .await
        .or_internal("Terjadi kesalahan saat mengecek laporan banjir")?;

        let summary = FloodReportSummary::from_count(total);
        debug!(
            total_valid_reports = summary.total_valid_reports,
            should_notify = summary.should_notify,
            "Flood report threshold checked"
        );
        Ok(summary)
    }

    /// Notifications created at or after `installed_at`, newest first, capped.
    pub async fn notification_history(
        &self,
        installed_at: DateTime<Utc>,
    ) -> Result<Vec<JsonValue>, ServiceError> {
        fetch_json_rows(
            &*self.db,
            statement(
                NOTIFICATION_HISTORY_SQL,
                [installed_at.into(), HISTORY_LIMIT.into()],
            ),
        )
        .await
        .or_internal("Terjadi kesalahan saat mengambil riwayat notifikasi")
    }
}
