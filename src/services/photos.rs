use chrono::Utc;
use rand::Rng;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::errors::{ResultExt, ServiceError};
use crate::models::report::PhotoUpload;

/// URL prefix under which stored photos are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// A photo written to disk.
#[derive(Debug, Clone)]
pub struct StoredPhoto {
    pub path: PathBuf,
    /// Public reference saved with the report, e.g. `/uploads/1712-42.jpg`
    pub url: String,
}

/// Writes report photos into the upload directory.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates the upload directory if it is missing.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    /// Stores `upload` under a fresh `<unix-millis>-<random>` name.
    pub async fn save(&self, upload: &PhotoUpload) -> Result<StoredPhoto, ServiceError> {
        self.ensure_dir()
            .await
            .or_internal("Gagal menyiapkan folder upload")?;

        let (name, path, mut file) = loop {
            let name = unique_file_name(&upload.extension);
            let path = self.dir.join(&name);
            let file_result = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;

            match file_result {
                Ok(file) => break (name, path, file),
                Err(ref err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err).or_internal("Gagal menyimpan foto"),
            }
        };

        let written = async {
            file.write_all(&upload.bytes).await?;
            file.flush().await
        }
        .await;

        if let Err(err) = written {
            drop(file);
            self.remove(&path).await;
            return Err(err).or_internal("Gagal menyimpan foto");
        }

        debug!(file = %name, bytes = upload.bytes.len(), "Stored report photo");
        Ok(StoredPhoto {
            url: format!("{}/{}", PUBLIC_PREFIX, name),
            path,
        })
    }

    /// Best-effort removal of a stored photo.
    pub async fn remove(&self, path: &Path) {
        if let Err(err) = fs::remove_file(path).await {
            warn!(path = %path.display(), error = %err, "Failed to remove photo");
        }
    }
}

fn unique_file_name(extension: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..=1_000_000_000);
    format!("{}-{}{}", Utc::now().timestamp_millis(), suffix, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn save_writes_bytes_and_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path().join("uploads"));
        let upload = PhotoUpload::new("banjir.png", Bytes::from_static(b"\x89PNG")).unwrap();

        let stored = store.save(&upload).await.unwrap();

        assert!(stored.url.starts_with("/uploads/"));
        assert!(stored.url.ends_with(".png"));
        assert_eq!(tokio::fs::read(&stored.path).await.unwrap(), b"\x89PNG");

        store.remove(&stored.path).await;
        assert!(!stored.path.exists());
    }

    #[test]
    fn file_names_follow_timestamp_random_pattern() {
        let name = unique_file_name(".jpg");
        let stem = name.strip_suffix(".jpg").unwrap();
        let (millis, random) = stem.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert!(random.parse::<u32>().unwrap() <= 1_000_000_000);
    }
}
