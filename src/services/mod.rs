//! Mock persistence backend.
//!
//! Three in-memory stores (files, upload sessions, file filters) behind the
//! [`RecordStore`] contract. A [`Services`] bundle is built once at startup
//! and handed to whoever needs it; nothing here is a global.

mod error;
mod record;
mod stats;
mod store;
mod types;

pub use error::StoreError;
pub use record::{Latency, Record, RecordKind};
pub use stats::{StatsState, UploadStats};
pub use store::{InMemoryStore, RecordStore};
pub use types::{
    FileDraft, FileFilter, FileRecord, FileRecordStatus, FileUpdate, FilterDraft, FilterUpdate,
    SessionDraft, SessionStatus, SessionUpdate, UploadSession, PLACEHOLDER_THUMBNAIL_URL,
    PLACEHOLDER_URL,
};

pub type FileStore = InMemoryStore<FileRecord>;
pub type SessionStore = InMemoryStore<UploadSession>;
pub type FilterStore = InMemoryStore<FileFilter>;

#[derive(Clone)]
pub struct Services {
    pub files: FileStore,
    pub sessions: SessionStore,
    pub filters: FilterStore,
}

impl Services {
    /// Fixture-seeded stores; `simulate_latency` toggles the artificial delays.
    pub fn seeded(simulate_latency: bool) -> Self {
        let latency = |kind: RecordKind| {
            if simulate_latency {
                kind.latency()
            } else {
                Latency::none()
            }
        };
        Self {
            files: InMemoryStore::seeded(latency(RecordKind::File)),
            sessions: InMemoryStore::seeded(latency(RecordKind::UploadSession)),
            filters: InMemoryStore::seeded(latency(RecordKind::FileFilter)),
        }
    }
}
