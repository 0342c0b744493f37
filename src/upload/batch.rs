use super::queue::QueueEvent;
use super::types::{FilePatch, QueueStatus, QueuedFile};
use crate::config::SimulationConfig;
use crate::notify::Notification;
use crate::services::{
    FileDraft, FileRecord, FileRecordStatus, RecordStore, SessionDraft, SessionStatus,
    SessionUpdate, StoreError, UploadSession, UploadStats, PLACEHOLDER_THUMBNAIL_URL,
    PLACEHOLDER_URL,
};
use chrono::Utc;
use std::sync::mpsc::Sender;

/// Walks a queue snapshot one file at a time, simulating the transfer and
/// recording the result in the stores.
#[derive(Clone)]
pub struct BatchUploader<F, S> {
    files: F,
    sessions: S,
    simulation: SimulationConfig,
}

impl<F, S> BatchUploader<F, S>
where
    F: RecordStore<FileRecord>,
    S: RecordStore<UploadSession>,
{
    pub fn new(files: F, sessions: S, simulation: SimulationConfig) -> Self {
        Self {
            files,
            sessions,
            simulation,
        }
    }

    /// Runs the whole batch and reports through `events`.
    ///
    /// `BatchFinished` is always sent. On success the queue is purged after
    /// the display delay; on failure every queued file is marked failed.
    pub async fn run(self, files: Vec<QueuedFile>, events: Sender<QueueEvent>) {
        let count = files.len();
        log::info!(target: "dropzone::batch", "starting batch of {} file(s)", count);

        match self.upload_all(&files, &events).await {
            Ok(session) => {
                log::info!(
                    target: "dropzone::batch",
                    "session {} completed with {} file(s)",
                    session.id,
                    count
                );
                let _ = events.send(QueueEvent::Notify(Notification::success(format!(
                    "Successfully uploaded {} file(s)",
                    count
                ))));
                let _ = events.send(QueueEvent::BatchFinished);

                let delay = self.simulation.display_delay();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let _ = events.send(QueueEvent::Cleared {
                    session_id: session.id,
                });
                self.refresh_stats(&events).await;
            }
            Err(e) => {
                log::error!(target: "dropzone::batch", "batch failed: {}", e);
                let message = e.to_string();
                let _ = events.send(QueueEvent::Notify(Notification::error(format!(
                    "Upload failed: {}",
                    message
                ))));
                let _ = events.send(QueueEvent::BatchFailed { message });
                let _ = events.send(QueueEvent::BatchFinished);
            }
        }
    }

    async fn upload_all(
        &self,
        files: &[QueuedFile],
        events: &Sender<QueueEvent>,
    ) -> Result<UploadSession, StoreError> {
        let session = self
            .sessions
            .create(SessionDraft {
                files: files.iter().map(|f| f.id.to_string()).collect(),
                total_size: files.iter().map(|f| f.size).sum(),
                start_time: Some(Utc::now()),
                status: Some(SessionStatus::Active),
            })
            .await?;
        let _ = events.send(QueueEvent::SessionStarted(session.clone()));

        for file in files {
            self.upload_one(file, events).await?;
        }

        let session = self
            .sessions
            .update(&session.id, SessionUpdate::completed(Utc::now()))
            .await?;
        let _ = events.send(QueueEvent::SessionCompleted(session.clone()));
        Ok(session)
    }

    async fn upload_one(
        &self,
        file: &QueuedFile,
        events: &Sender<QueueEvent>,
    ) -> Result<FileRecord, StoreError> {
        let _ = events.send(QueueEvent::Patch {
            id: file.id.clone(),
            patch: FilePatch::status(QueueStatus::Uploading),
        });

        let interval = self.simulation.step_interval();
        for percent in self.simulation.progress_ticks() {
            let _ = events.send(QueueEvent::Progress {
                id: file.id.clone(),
                percent,
            });
            if !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }
        }

        let record = self
            .files
            .create(FileDraft {
                name: file.name.clone(),
                size: file.size,
                mime_type: file.mime_type.clone(),
                upload_date: Some(Utc::now()),
                status: Some(FileRecordStatus::Completed),
                progress: Some(100),
                url: Some(PLACEHOLDER_URL.to_string()),
                thumbnail_url: Some(
                    file.thumbnail_url
                        .clone()
                        .unwrap_or_else(|| PLACEHOLDER_THUMBNAIL_URL.to_string()),
                ),
            })
            .await?;

        log::debug!(
            target: "dropzone::batch",
            "{} stored as record {}",
            file.name,
            record.id
        );
        let _ = events.send(QueueEvent::Patch {
            id: file.id.clone(),
            patch: FilePatch::completed(record.clone()),
        });
        Ok(record)
    }

    pub async fn refresh_stats(&self, events: &Sender<QueueEvent>) {
        let stats = load_stats(&self.files).await;
        let _ = events.send(QueueEvent::StatsLoaded(stats));
    }
}

pub async fn load_stats<F: RecordStore<FileRecord>>(files: &F) -> Result<UploadStats, String> {
    files
        .get_all()
        .await
        .map(|records| UploadStats::from_records(&records, Utc::now()))
        .map_err(|e| e.to_string())
}
