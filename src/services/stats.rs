use super::types::FileRecord;
use crate::utils::file_size::FileSizeUtils;
use chrono::{DateTime, Duration, Utc};

/// Totals shown in the header and stats cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadStats {
    pub total_files: usize,
    pub total_size: u64,
    /// Records uploaded within the last 24 hours.
    pub recent_uploads: usize,
}

impl UploadStats {
    pub fn from_records(records: &[FileRecord], now: DateTime<Utc>) -> Self {
        let day_ago = now - Duration::hours(24);
        Self {
            total_files: records.len(),
            total_size: records.iter().map(|r| r.size).sum(),
            recent_uploads: records.iter().filter(|r| r.upload_date > day_ago).count(),
        }
    }

    pub fn total_size_label(&self) -> String {
        FileSizeUtils::format_size(self.total_size)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum StatsState {
    #[default]
    Loading,
    Ready(UploadStats),
    Failed(String),
}

impl StatsState {
    pub fn ready(&self) -> Option<&UploadStats> {
        match self {
            Self::Ready(stats) => Some(stats),
            _ => None,
        }
    }
}
