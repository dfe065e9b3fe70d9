//! Uploaded image assets and the slots they occupy.
//!
//! An [`UploadedAsset`] is either held in memory or spooled to disk. A
//! spooled asset owns its file through [`SpooledFile`], which removes the
//! file when dropped, so replacing or clearing a slot (or dropping the whole
//! selection) releases the underlying storage.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Logical input slot. At most one asset occupies a slot at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Model,
    Top,
    Bottom,
    Accessory,
}

impl Slot {
    /// All slots, in attachment order.
    pub const ALL: [Slot; 4] = [Slot::Model, Slot::Top, Slot::Bottom, Slot::Accessory];

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Model => "model",
            Slot::Top => "top",
            Slot::Bottom => "bottom",
            Slot::Accessory => "accessory",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Slot {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown slot '{s}'. Must be one of: model, top, bottom, accessory"
                ))
            })
    }
}

/// A file written to the spool directory and deleted again on drop.
#[derive(Debug)]
pub struct SpooledFile {
    path: PathBuf,
}

impl SpooledFile {
    /// Write `bytes` to a fresh, uniquely named file inside `dir`.
    ///
    /// The directory is created if it does not exist yet.
    pub async fn create(dir: &Path, bytes: &[u8]) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}.upload", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, bytes).await?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SpooledFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Released spooled upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove spooled upload");
            }
        }
    }
}

/// Where the bytes of an asset live.
#[derive(Debug)]
pub enum AssetSource {
    Memory(Vec<u8>),
    Spooled(SpooledFile),
}

/// A user-selected image together with its declared media type.
#[derive(Debug)]
pub struct UploadedAsset {
    media_type: String,
    file_name: Option<String>,
    size_bytes: u64,
    source: AssetSource,
}

impl UploadedAsset {
    /// Keep the asset bytes in memory.
    pub fn in_memory(media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            file_name: None,
            size_bytes: bytes.len() as u64,
            source: AssetSource::Memory(bytes),
        }
    }

    /// Spool the asset bytes into `dir`; the file lives as long as the asset.
    pub async fn spooled(
        dir: &Path,
        media_type: impl Into<String>,
        bytes: &[u8],
    ) -> std::io::Result<Self> {
        let file = SpooledFile::create(dir, bytes).await?;
        Ok(Self {
            media_type: media_type.into(),
            file_name: None,
            size_bytes: bytes.len() as u64,
            source: AssetSource::Spooled(file),
        })
    }

    /// Attach the client-side file name (display only).
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn source(&self) -> &AssetSource {
        &self.source
    }

    /// Read the full asset contents.
    ///
    /// Fails only for spooled assets whose file has become unreadable.
    pub async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            AssetSource::Memory(bytes) => Ok(bytes.clone()),
            AssetSource::Spooled(file) => tokio::fs::read(file.path()).await,
        }
    }
}
