use sea_orm::{ConnectionTrait, DatabaseConnection};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{
    db::statement,
    errors::{ResultExt, ServiceError},
    models::report::{PhotoSource, ReportCreated, ReportSubmission, USER_NOT_FOUND_MESSAGE},
    services::photos::PhotoStore,
};

pub const USER_EXISTS_SQL: &str = "SELECT 1 AS found FROM sigab_app.user_app WHERE id_user = $1";

pub const INSERT_REPORT_SQL: &str = "INSERT INTO sigab_app.laporan \
     (id_user, tipe_laporan, lokasi, titik_lokasi, waktu, deskripsi, status, foto, created_at, updated_at) \
     VALUES ($1, $2, $3, point($4, $5), $6, $7, $8, $9, NOW(), NOW()) \
     RETURNING id_laporan";

const CREATE_FAILED_MESSAGE: &str = "Terjadi kesalahan saat membuat laporan";

/// Accepts citizen reports and persists them with their photo.
#[derive(Debug, Clone)]
pub struct ReportService {
    db: Arc<DatabaseConnection>,
    photos: PhotoStore,
}

impl ReportService {
    pub fn new(db: Arc<DatabaseConnection>, photos: PhotoStore) -> Self {
        Self { db, photos }
    }

    /// Validates, stores the photo, then inserts the report.
    ///
    /// Nothing touches the database before the request-level checks pass, and
    /// the photo is only written once the submitting user is known to exist.
    #[instrument(skip(self, submission))]
    pub async fn create_report(
        &self,
        submission: ReportSubmission,
    ) -> Result<ReportCreated, ServiceError> {
        let report = submission.validate()?;

        self.ensure_user_exists(report.id_user).await?;

        let (foto_url, written): (String, Option<PathBuf>) = match &report.photo {
            PhotoSource::Upload(upload) => {
                let stored = self.photos.save(upload).await?;
                (stored.url, Some(stored.path))
            }
            PhotoSource::Path(path) => (path.clone(), None),
        };

        let stmt = statement(
            INSERT_REPORT_SQL,
            [
                report.id_user.into(),
                report.tipe_laporan.clone().into(),
                report.lokasi.clone().into(),
                report.coordinates.longitude.into(),
                report.coordinates.latitude.into(),
                report.waktu.into(),
                report.deskripsi.clone().into(),
                report.status.clone().into(),
                foto_url.clone().into(),
            ],
        );

        let inserted = async {
            let row = self
                .db
                .query_one(stmt)
                .await?
                .ok_or_else(|| sea_orm::DbErr::RecordNotInserted)?;
            row.try_get::<i32>("", "id_laporan")
        }
        .await;

        let id_laporan = match inserted {
            Ok(id) => id,
            Err(err) => {
                if let Some(path) = written {
                    warn!(path = %path.display(), "Report insert failed; removing stored photo");
                    self.photos.remove(&path).await;
                }
                return Err(err).or_internal(CREATE_FAILED_MESSAGE);
            }
        };

        info!(id_laporan, id_user = report.id_user, "Report created");
        Ok(ReportCreated {
            id_laporan,
            foto_url,
        })
    }

    async fn ensure_user_exists(&self, id_user: i32) -> Result<(), ServiceError> {
        let found = self
            .db
            .query_one(statement(USER_EXISTS_SQL, [id_user.into()]))
            .await
            .or_internal(CREATE_FAILED_MESSAGE)?;

        match found {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound(USER_NOT_FOUND_MESSAGE.to_string())),
        }
    }
}
