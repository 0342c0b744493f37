//! Persisted record types.

use super::record::{Record, RecordKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder asset used when an upload has no preview of its own.
pub const PLACEHOLDER_URL: &str =
    "https://images.unsplash.com/photo-1618005182384-a83a8bd57fbe?w=400&h=300&fit=crop";
pub const PLACEHOLDER_THUMBNAIL_URL: &str =
    "https://images.unsplash.com/photo-1618005182384-a83a8bd57fbe?w=150&h=150&fit=crop";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRecordStatus {
    Pending,
    Uploading,
    #[default]
    Completed,
    Failed,
}

/// A stored file as the mock backend knows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub upload_date: DateTime<Utc>,
    pub status: FileRecordStatus,
    pub progress: u8,
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FileDraft {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub upload_date: Option<DateTime<Utc>>,
    pub status: Option<FileRecordStatus>,
    pub progress: Option<u8>,
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FileUpdate {
    pub name: Option<String>,
    pub status: Option<FileRecordStatus>,
    pub progress: Option<u8>,
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl Record for FileRecord {
    type Draft = FileDraft;
    type Update = FileUpdate;

    const KIND: RecordKind = RecordKind::File;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: FileDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            size: draft.size,
            mime_type: draft.mime_type,
            upload_date: draft.upload_date.unwrap_or(now),
            status: draft.status.unwrap_or_default(),
            progress: draft.progress.unwrap_or(100),
            url: draft.url.unwrap_or_else(|| PLACEHOLDER_URL.to_string()),
            thumbnail_url: draft.thumbnail_url,
        }
    }

    fn apply(&mut self, update: FileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(progress) = update.progress {
            self.progress = progress.min(100);
        }
        if let Some(url) = update.url {
            self.url = url;
        }
        if let Some(thumbnail_url) = update.thumbnail_url {
            self.thumbnail_url = Some(thumbnail_url);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Active,
    Completed,
}

/// One batch-upload attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSession {
    pub id: String,
    pub files: Vec<String>,
    pub total_size: u64,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, Default)]
pub struct SessionDraft {
    pub files: Vec<String>,
    pub total_size: u64,
    pub start_time: Option<DateTime<Utc>>,
    pub status: Option<SessionStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub end_time: Option<DateTime<Utc>>,
    pub status: Option<SessionStatus>,
}

impl SessionUpdate {
    pub fn completed(at: DateTime<Utc>) -> Self {
        Self {
            end_time: Some(at),
            status: Some(SessionStatus::Completed),
        }
    }
}

impl Record for UploadSession {
    type Draft = SessionDraft;
    type Update = SessionUpdate;

    const KIND: RecordKind = RecordKind::UploadSession;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: SessionDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            files: draft.files,
            total_size: draft.total_size,
            start_time: draft.start_time.unwrap_or(now),
            end_time: None,
            status: draft.status.unwrap_or_default(),
        }
    }

    fn apply(&mut self, update: SessionUpdate) {
        if let Some(end_time) = update.end_time {
            self.end_time = Some(end_time);
        }
        if let Some(status) = update.status {
            self.status = status;
        }
    }
}

/// A named upload restriction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFilter {
    pub id: String,
    pub name: String,
    pub mime_types: Vec<String>,
    pub max_size: u64,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FilterDraft {
    pub name: String,
    pub mime_types: Vec<String>,
    pub max_size: u64,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct FilterUpdate {
    pub name: Option<String>,
    pub mime_types: Option<Vec<String>>,
    pub max_size: Option<u64>,
    pub enabled: Option<bool>,
}

impl Record for FileFilter {
    type Draft = FilterDraft;
    type Update = FilterUpdate;

    const KIND: RecordKind = RecordKind::FileFilter;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, draft: FilterDraft, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            mime_types: draft.mime_types,
            max_size: draft.max_size,
            enabled: draft.enabled.unwrap_or(true),
        }
    }

    fn apply(&mut self, update: FilterUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(mime_types) = update.mime_types {
            self.mime_types = mime_types;
        }
        if let Some(max_size) = update.max_size {
            self.max_size = max_size;
        }
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
    }
}
