use super::queue::UploadQueue;
use super::types::{FileId, QueuedFile, RawFile};
use crate::config::UploadPolicy;
use crate::utils::file_size::FileSizeUtils;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("File \"{name}\" exceeds maximum size of {}", size_label(.max_size))]
    TooLarge { name: String, size: u64, max_size: u64 },

    #[error("File \"{name}\" has unsupported type {mime_type}")]
    UnsupportedType { name: String, mime_type: String },
}

fn size_label(size: &u64) -> String {
    FileSizeUtils::format_size(*size)
}

/// Outcome of one intake call.
#[derive(Debug, Default)]
pub struct IntakeReport {
    pub accepted: Vec<FileId>,
    pub rejected: Vec<IntakeError>,
    /// Accepted images that still need a preview.
    pub thumbnails: Vec<(FileId, RawFile)>,
}

impl IntakeReport {
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }
}

/// Validates dropped or picked files and appends the valid ones to a queue.
#[derive(Debug, Clone, Default)]
pub struct FileIntake {
    policy: UploadPolicy,
}

impl FileIntake {
    pub fn new(policy: UploadPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn validate(&self, raw: &RawFile) -> Result<(), IntakeError> {
        if raw.size > self.policy.max_file_size {
            return Err(IntakeError::TooLarge {
                name: raw.name.clone(),
                size: raw.size,
                max_size: self.policy.max_file_size,
            });
        }
        if !self.policy.is_allowed_type(&raw.mime_type) {
            return Err(IntakeError::UnsupportedType {
                name: raw.name.clone(),
                mime_type: raw.mime_type.clone(),
            });
        }
        Ok(())
    }

    pub fn admit(&self, files: Vec<RawFile>, queue: &mut UploadQueue) -> IntakeReport {
        let mut report = IntakeReport::default();

        for raw in files {
            if let Err(e) = self.validate(&raw) {
                log::debug!(target: "dropzone::intake", "rejected {}: {}", raw.name, e);
                report.rejected.push(e);
                continue;
            }

            let mut entry = QueuedFile::pending(FileId::generate(), &raw);
            // Ids are only unique enough; regenerate on the rare clash.
            while queue.contains(&entry.id) {
                entry.id = FileId::generate();
            }
            let id = entry.id.clone();
            if queue.push(entry).is_err() {
                continue;
            }

            log::debug!(
                target: "dropzone::intake",
                "queued {} as {} ({}, {})",
                raw.name,
                id,
                raw.mime_type,
                FileSizeUtils::format_size(raw.size)
            );
            if raw.is_image() {
                report.thumbnails.push((id.clone(), raw));
            }
            report.accepted.push(id);
        }

        report
    }
}
