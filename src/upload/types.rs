use crate::services::FileRecord;
use chrono::Utc;
use rand::Rng;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Client-side queue key: Unix millis plus a random hex suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(String);

impl FileId {
    pub fn generate() -> Self {
        let suffix: u32 = rand::thread_rng().gen();
        Self(format!("{}-{:08x}", Utc::now().timestamp_millis(), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FileId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueStatus {
    #[default]
    Pending,
    Uploading,
    Completed,
    Failed,
}

impl QueueStatus {
    /// Forward-only: `Pending -> Uploading -> {Completed, Failed}`.
    pub fn can_advance_to(self, next: QueueStatus) -> bool {
        use QueueStatus::*;
        matches!(
            (self, next),
            (Pending, Uploading) | (Uploading, Completed) | (Uploading, Failed)
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Uploading => "uploading",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Broad type bucket used to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Pdf,
    Document,
    Text,
    Other,
}

impl FileKind {
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            Self::Image
        } else if mime_type.contains("pdf") {
            Self::Pdf
        } else if mime_type.contains("word") || mime_type.contains("document") {
            Self::Document
        } else if mime_type.starts_with("text/") {
            Self::Text
        } else {
            Self::Other
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Image => "🖼",
            Self::Pdf => "📕",
            Self::Document => "📝",
            Self::Text => "📄",
            Self::Other => "📁",
        }
    }
}

#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

/// A file handed over by the drop zone or the picker, before validation.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub source: FileSource,
}

impl RawFile {
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            mime_type: guess_mime(&name),
            name,
            size: metadata.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let bytes = bytes.into();
        Self {
            mime_type: guess_mime(&name),
            size: bytes.len() as u64,
            name,
            source: FileSource::Bytes(bytes),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn is_image(&self) -> bool {
        FileKind::from_mime(&self.mime_type) == FileKind::Image
    }

    pub async fn read_bytes(&self) -> io::Result<Vec<u8>> {
        match &self.source {
            FileSource::Path(path) => tokio::fs::read(path).await,
            FileSource::Bytes(bytes) => Ok(bytes.to_vec()),
        }
    }
}

fn guess_mime(name: &str) -> String {
    mime_guess::from_path(name)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

/// One entry of the upload queue.
#[derive(Debug, Clone)]
pub struct QueuedFile {
    pub id: FileId,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub status: QueueStatus,
    pub thumbnail_url: Option<String>,
    pub server_file: Option<FileRecord>,
}

impl QueuedFile {
    pub fn pending(id: FileId, raw: &RawFile) -> Self {
        Self {
            id,
            name: raw.name.clone(),
            size: raw.size,
            mime_type: raw.mime_type.clone(),
            status: QueueStatus::Pending,
            thumbnail_url: None,
            server_file: None,
        }
    }

    pub fn kind(&self) -> FileKind {
        FileKind::from_mime(&self.mime_type)
    }
}

/// Partial update merged into a queued file by id. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct FilePatch {
    pub status: Option<QueueStatus>,
    pub thumbnail_url: Option<String>,
    pub server_file: Option<FileRecord>,
}

impl FilePatch {
    pub fn status(status: QueueStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn thumbnail(url: String) -> Self {
        Self {
            thumbnail_url: Some(url),
            ..Self::default()
        }
    }

    pub fn completed(record: FileRecord) -> Self {
        Self {
            status: Some(QueueStatus::Completed),
            server_file: Some(record),
            ..Self::default()
        }
    }
}
