use super::types::{FileId, FilePatch, QueueStatus, QueuedFile};
use crate::notify::Notification;
use crate::services::{UploadSession, UploadStats};
use crate::utils::file_size::FileSizeUtils;
use std::collections::HashMap;

/// Messages from background tasks back to the owner of the queue.
///
/// Tasks never touch the queue directly; everything they change arrives here
/// and is applied on the UI thread.
#[derive(Debug, Clone)]
pub enum QueueEvent {
    Patch { id: FileId, patch: FilePatch },
    Progress { id: FileId, percent: u8 },
    SessionStarted(UploadSession),
    SessionCompleted(UploadSession),
    /// Taints every queued file as failed.
    BatchFailed { message: String },
    /// Sent on success and failure alike; ends the uploading state.
    BatchFinished,
    /// Purges the queue once a successful batch has been on screen long enough.
    /// Ignored unless `session_id` is still the queue's session.
    Cleared { session_id: String },
    Notify(Notification),
    StatsLoaded(Result<UploadStats, String>),
}

/// Files staged for upload plus per-file progress and the active session.
#[derive(Debug, Default)]
pub struct UploadQueue {
    files: Vec<QueuedFile>,
    progress: HashMap<FileId, u8>,
    session: Option<UploadSession>,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[QueuedFile] {
        &self.files
    }

    pub fn get(&self, id: &FileId) -> Option<&QueuedFile> {
        self.files.iter().find(|f| &f.id == id)
    }

    pub fn contains(&self, id: &FileId) -> bool {
        self.get(id).is_some()
    }

    pub fn progress_of(&self, id: &FileId) -> u8 {
        self.progress.get(id).copied().unwrap_or(0)
    }

    pub fn has_progress(&self, id: &FileId) -> bool {
        self.progress.contains_key(id)
    }

    pub fn session(&self) -> Option<&UploadSession> {
        self.session.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Appends in the given order. Entries whose id is already queued are
    /// skipped and returned.
    pub fn push(&mut self, file: QueuedFile) -> Result<(), QueuedFile> {
        if self.contains(&file.id) {
            return Err(file);
        }
        self.files.push(file);
        Ok(())
    }

    /// Merges `patch` into the file with `id`.
    ///
    /// Returns `false` when no such file is queued. A status that would move
    /// backwards is ignored while the other fields still apply.
    pub fn patch(&mut self, id: &FileId, patch: FilePatch) -> bool {
        let Some(file) = self.files.iter_mut().find(|f| &f.id == id) else {
            log::debug!(target: "dropzone::queue", "patch for unknown file {}", id);
            return false;
        };

        if let Some(status) = patch.status {
            if file.status.can_advance_to(status) {
                file.status = status;
            } else if file.status != status {
                log::warn!(
                    target: "dropzone::queue",
                    "ignoring {} -> {} for {}",
                    file.status.label(),
                    status.label(),
                    id
                );
            }
        }
        if let Some(thumbnail_url) = patch.thumbnail_url {
            file.thumbnail_url = Some(thumbnail_url);
        }
        if let Some(server_file) = patch.server_file {
            file.server_file = Some(server_file);
        }
        true
    }

    pub fn set_progress(&mut self, id: &FileId, percent: u8) {
        if self.contains(id) {
            self.progress.insert(id.clone(), percent.min(100));
        }
    }

    /// Unconditional; the UI only offers removal for pending files.
    pub fn remove(&mut self, id: &FileId) -> Option<QueuedFile> {
        self.progress.remove(id);
        let index = self.files.iter().position(|f| &f.id == id)?;
        Some(self.files.remove(index))
    }

    pub fn set_session(&mut self, session: Option<UploadSession>) {
        self.session = session;
    }

    /// Marks every queued file failed, whatever its current status.
    pub fn fail_all(&mut self) {
        for file in &mut self.files {
            file.status = QueueStatus::Failed;
        }
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.progress.clear();
        self.session = None;
    }

    /// Clears the queue only if `session_id` is the current session.
    pub fn clear_session(&mut self, session_id: &str) -> bool {
        if self.session.as_ref().is_some_and(|s| s.id == session_id) {
            self.clear();
            true
        } else {
            false
        }
    }

    /// Files that have not been part of any batch yet.
    pub fn pending_files(&self) -> Vec<QueuedFile> {
        self.files
            .iter()
            .filter(|f| f.status == QueueStatus::Pending)
            .cloned()
            .collect()
    }

    pub fn has_pending(&self) -> bool {
        self.files.iter().any(|f| f.status == QueueStatus::Pending)
    }

    pub fn total_files(&self) -> usize {
        self.files.len()
    }

    pub fn completed_files(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status == QueueStatus::Completed)
            .count()
    }

    /// Percentage of completed files, `0.0` for an empty queue.
    pub fn overall_progress(&self) -> f32 {
        let total = self.total_files();
        if total == 0 {
            0.0
        } else {
            (self.completed_files() as f32 / total as f32) * 100.0
        }
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn total_size_label(&self) -> String {
        FileSizeUtils::format_size(self.total_size())
    }
}
