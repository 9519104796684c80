use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::RgbaImage;
use thiserror::Error;

const EXPORT_PREFIX: &str = "annotated_";
const PICTURES_SUBDIR: &str = "Pictures";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("failed to encode png: {0}")]
    Encode(#[from] image::ImageError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Sink for exported annotated images.
pub trait ExportStorage {
    fn save_export(&self, image: &RgbaImage) -> StorageResult<PathBuf>;
}

/// Writes PNG exports into a single directory, one timestamped file per export.
#[derive(Debug, Clone)]
pub struct ExportDirectory {
    dir: PathBuf,
}

impl ExportDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$HOME/Pictures`
    pub fn with_default_path() -> StorageResult<Self> {
        let home = std::env::var_os("HOME").ok_or(StorageError::MissingHomeDirectory)?;
        let mut dir = PathBuf::from(home);
        dir.push(PICTURES_SUBDIR);
        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn allocate_target_path(&self, timestamp_millis: u128) -> PathBuf {
        let base = self.dir.join(export_file_name(timestamp_millis, None));
        if !base.exists() {
            return base;
        }
        // Two exports in the same millisecond must not overwrite each other.
        (1u32..)
            .map(|n| self.dir.join(export_file_name(timestamp_millis, Some(n))))
            .find(|candidate| !candidate.exists())
            .unwrap_or(base)
    }
}

impl ExportStorage for ExportDirectory {
    fn save_export(&self, image: &RgbaImage) -> StorageResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let target = self.allocate_target_path(unix_millis_now());
        image.save_with_format(&target, image::ImageFormat::Png)?;
        tracing::info!(path = %target.display(), "exported annotated image");
        Ok(target)
    }
}

pub fn export_file_name(timestamp_millis: u128, suffix: Option<u32>) -> String {
    match suffix {
        Some(n) => format!("{EXPORT_PREFIX}{timestamp_millis}-{n}.png"),
        None => format!("{EXPORT_PREFIX}{timestamp_millis}.png"),
    }
}

fn unix_millis_now() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}
