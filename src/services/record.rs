//! What the in-memory store needs to know about a record type.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    File,
    UploadSession,
    FileFilter,
}

impl RecordKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::File => "File",
            Self::UploadSession => "Upload session",
            Self::FileFilter => "File filter",
        }
    }

    /// Bundled seed data.
    pub fn fixture(&self) -> &'static str {
        match self {
            Self::File => include_str!("../../fixtures/files.json"),
            Self::UploadSession => include_str!("../../fixtures/upload_sessions.json"),
            Self::FileFilter => include_str!("../../fixtures/file_filters.json"),
        }
    }

    pub fn latency(&self) -> Latency {
        match self {
            Self::File => Latency::from_millis(300, 200, 400, 300, 250),
            Self::UploadSession => Latency::from_millis(300, 200, 250, 300, 250),
            Self::FileFilter => Latency::from_millis(200, 150, 300, 250, 200),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Artificial delay per store operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latency {
    pub get_all: Duration,
    pub get_by_id: Duration,
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Latency {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_millis(get_all: u64, get_by_id: u64, create: u64, update: u64, delete: u64) -> Self {
        Self {
            get_all: Duration::from_millis(get_all),
            get_by_id: Duration::from_millis(get_by_id),
            create: Duration::from_millis(create),
            update: Duration::from_millis(update),
            delete: Duration::from_millis(delete),
        }
    }
}

/// A record held by a [`RecordStore`](super::RecordStore).
///
/// `Draft` carries the fields a caller supplies on create; `from_draft` fills
/// in the defaults. `Update` is a partial record merged over an existing one.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Draft: Send + 'static;
    type Update: Send + 'static;

    const KIND: RecordKind;

    fn id(&self) -> &str;

    fn from_draft(id: String, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    fn apply(&mut self, update: Self::Update);
}
