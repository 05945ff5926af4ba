use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

pub const COORDINATE_FORMAT_MESSAGE: &str =
    "Format koordinat tidak valid. Gunakan format \"(longitude,latitude)\"";
pub const USER_NOT_FOUND_MESSAGE: &str = "User dengan ID tersebut tidak ditemukan";
pub const REPORT_CREATED_MESSAGE: &str = "Laporan berhasil dibuat";
pub const IMAGE_ONLY_MESSAGE: &str = "Hanya file gambar yang diperbolehkan!";

/// Photo extensions accepted by the upload gate.
pub const ALLOWED_PHOTO_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

static COORDINATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\(\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*\)$")
        .expect("coordinate pattern is valid")
});

/// A `(longitude,latitude)` pair as submitted by the app.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let invalid = || ServiceError::ValidationError(COORDINATE_FORMAT_MESSAGE.to_string());

        let captures = COORDINATE_PATTERN.captures(raw.trim()).ok_or_else(invalid)?;
        let longitude: f64 = captures[1].parse().map_err(|_| invalid())?;
        let latitude: f64 = captures[2].parse().map_err(|_| invalid())?;

        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(invalid());
        }

        Ok(Self {
            longitude,
            latitude,
        })
    }
}

/// Image part of a multipart submission, buffered until the report is accepted.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    /// Lowercase extension including the leading dot, e.g. `.jpg`
    pub extension: String,
    pub bytes: Bytes,
}

impl PhotoUpload {
    /// Accepts a file only when its name ends in an allowed image extension.
    pub fn new(file_name: &str, bytes: Bytes) -> Result<Self, ServiceError> {
        let extension = photo_extension(file_name)
            .ok_or_else(|| ServiceError::ValidationError(IMAGE_ONLY_MESSAGE.to_string()))?;
        Ok(Self {
            extension,
            bytes,
        })
    }
}

fn photo_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_PHOTO_EXTENSIONS
        .contains(&ext.as_str())
        .then(|| format!(".{}", ext))
}

/// Report fields exactly as they arrived, before any checks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReportFields {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id_user: Option<String>,
    pub tipe_laporan: Option<String>,
    pub lokasi: Option<String>,
    #[serde(alias = "coords")]
    pub titik_lokasi: Option<String>,
    pub waktu: Option<String>,
    pub deskripsi: Option<String>,
    pub status: Option<String>,
    pub foto: Option<String>,
}

/// JSON clients may send `id_user` as a number.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

impl RawReportFields {
    /// Records a text form field. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "id_user" => &mut self.id_user,
            "tipe_laporan" => &mut self.tipe_laporan,
            "lokasi" => &mut self.lokasi,
            "titik_lokasi" | "coords" => &mut self.titik_lokasi,
            "waktu" => &mut self.waktu,
            "deskripsi" => &mut self.deskripsi,
            "status" => &mut self.status,
            "foto" => &mut self.foto,
            _ => return,
        };
        *slot = Some(value);
    }
}

/// Everything a report submission carries.
#[derive(Debug, Clone, Default)]
pub struct ReportSubmission {
    pub fields: RawReportFields,
    pub photo: Option<PhotoUpload>,
}

/// Where the report photo comes from.
#[derive(Debug, Clone)]
pub enum PhotoSource {
    Upload(PhotoUpload),
    Path(String),
}

/// A report that passed every check that does not need the database.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub id_user: i32,
    pub tipe_laporan: String,
    pub lokasi: String,
    pub coordinates: Coordinates,
    pub waktu: DateTime<Utc>,
    pub deskripsi: String,
    pub status: Option<String>,
    pub photo: PhotoSource,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn missing(field: &str) -> ServiceError {
    ServiceError::ValidationError(format!("Field {} wajib diisi", field))
}

impl ReportSubmission {
    /// Runs the request-level checks in their fixed order: required fields,
    /// coordinate format, then field shapes.
    pub fn validate(self) -> Result<NewReport, ServiceError> {
        let fields = &self.fields;

        let id_user = present(&fields.id_user).ok_or_else(|| missing("id_user"))?;
        let tipe_laporan = present(&fields.tipe_laporan).ok_or_else(|| missing("tipe_laporan"))?;
        let waktu = present(&fields.waktu).ok_or_else(|| missing("waktu"))?;
        let deskripsi = present(&fields.deskripsi).ok_or_else(|| missing("deskripsi"))?;
        let lokasi = present(&fields.lokasi).ok_or_else(|| missing("lokasi"))?;
        let titik_lokasi = present(&fields.titik_lokasi).ok_or_else(|| missing("titik_lokasi"))?;
        let foto_path = present(&fields.foto);
        if self.photo.is_none() && foto_path.is_none() {
            return Err(missing("foto"));
        }

        let coordinates = Coordinates::parse(titik_lokasi)?;

        let id_user: i32 = id_user
            .parse()
            .map_err(|_| ServiceError::ValidationError("id_user harus berupa angka".to_string()))?;
        let waktu = parse_waktu(waktu)?;

        let photo = match (self.photo, foto_path) {
            (Some(upload), _) => PhotoSource::Upload(upload),
            (None, Some(path)) => PhotoSource::Path(path.to_string()),
            (None, None) => return Err(missing("foto")),
        };

        Ok(NewReport {
            id_user,
            tipe_laporan: tipe_laporan.to_string(),
            lokasi: lokasi.to_string(),
            coordinates,
            waktu,
            deskripsi: deskripsi.to_string(),
            status: present(&fields.status).map(str::to_string),
            photo,
        })
    }
}

/// Accepts RFC 3339, or a zone-less `YYYY-MM-DD HH:MM[:SS]` read as UTC.
pub fn parse_waktu(raw: &str) -> Result<DateTime<Utc>, ServiceError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            ServiceError::ValidationError(
                "Format waktu tidak valid. Gunakan format ISO 8601".to_string(),
            )
        })
}

/// Payload of a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportCreated {
    pub id_laporan: i32,
    pub foto_url: String,
}
