use super::batch::{load_stats, BatchUploader};
use super::intake::{FileIntake, IntakeReport};
use super::queue::{QueueEvent, UploadQueue};
use super::thumbnail;
use super::types::{FileId, RawFile};
use crate::config::DropZoneConfig;
use crate::notify::{Notification, Notifications};
use crate::services::{FileRecord, FileStore, RecordStore, SessionStore, StatsState, UploadSession};
use derivative::Derivative;
use std::sync::mpsc::{self, Receiver, Sender};
use tokio::runtime::Handle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStart {
    Started,
    EmptyQueue,
    /// Every queued file already went through a batch.
    NothingPending,
    AlreadyUploading,
}

/// Owns the upload queue and everything derived from it.
///
/// Lives on the UI thread. Work that takes time (the batch, thumbnails,
/// stats) runs on the tokio runtime behind `runtime` and reports back through
/// a channel that [`poll`](Self::poll) drains.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct UploadController<F = FileStore, S = SessionStore> {
    queue: UploadQueue,
    is_uploading: bool,
    notifications: Notifications,
    stats: StatsState,
    intake: FileIntake,
    #[derivative(Debug = "ignore")]
    uploader: BatchUploader<F, S>,
    #[derivative(Debug = "ignore")]
    files: F,
    #[derivative(Debug = "ignore")]
    runtime: Handle,
    #[derivative(Debug = "ignore")]
    events_tx: Sender<QueueEvent>,
    #[derivative(Debug = "ignore")]
    events_rx: Receiver<QueueEvent>,
}

impl<F, S> UploadController<F, S>
where
    F: RecordStore<FileRecord>,
    S: RecordStore<UploadSession>,
{
    pub fn new(files: F, sessions: S, config: &DropZoneConfig, runtime: Handle) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            queue: UploadQueue::new(),
            is_uploading: false,
            notifications: Notifications::default(),
            stats: StatsState::Loading,
            intake: FileIntake::new(config.policy.clone()),
            uploader: BatchUploader::new(files.clone(), sessions, config.simulation.clone()),
            files,
            runtime,
            events_tx,
            events_rx,
        }
    }

    pub fn queue(&self) -> &UploadQueue {
        &self.queue
    }

    pub fn is_uploading(&self) -> bool {
        self.is_uploading
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn stats(&self) -> &StatsState {
        &self.stats
    }

    pub fn intake(&self) -> &FileIntake {
        &self.intake
    }

    /// Validates and enqueues `files`, then starts thumbnails for images.
    pub fn add_files(&mut self, files: Vec<RawFile>) -> IntakeReport {
        if files.is_empty() {
            return IntakeReport::default();
        }

        let report = self.intake.admit(files, &mut self.queue);

        for rejection in &report.rejected {
            self.notifications
                .push(Notification::error(rejection.to_string()));
        }
        if report.accepted_count() > 0 {
            self.notifications.push(Notification::success(format!(
                "{} file(s) added to upload queue",
                report.accepted_count()
            )));
        }
        for (id, raw) in &report.thumbnails {
            self.runtime.spawn(thumbnail::generate(
                id.clone(),
                raw.clone(),
                self.events_tx.clone(),
            ));
        }

        report
    }

    pub fn remove_file(&mut self, id: &FileId) -> bool {
        let removed = self.queue.remove(id).is_some();
        if removed {
            log::debug!(target: "dropzone::controller", "removed {}", id);
        }
        removed
    }

    /// Empties the queue, the progress map and the session reference.
    pub fn clear(&mut self) {
        let count = self.queue.total_files();
        log::debug!(target: "dropzone::controller", "clearing {} queued file(s)", count);
        self.queue.clear();
        if count > 0 {
            self.notifications.push(Notification::info(format!(
                "Removed {} file(s) from the queue",
                count
            )));
        }
    }

    pub fn start_upload(&mut self) -> UploadStart {
        if self.is_uploading {
            log::debug!(target: "dropzone::controller", "upload already in progress");
            return UploadStart::AlreadyUploading;
        }
        if self.queue.is_empty() {
            self.notifications
                .push(Notification::warning("Please select files to upload"));
            return UploadStart::EmptyQueue;
        }

        // Failed and completed files stay out; they have to be re-added.
        let snapshot = self.queue.pending_files();
        if snapshot.is_empty() {
            self.notifications
                .push(Notification::warning("No pending files to upload"));
            return UploadStart::NothingPending;
        }

        self.is_uploading = true;
        self.runtime
            .spawn(self.uploader.clone().run(snapshot, self.events_tx.clone()));
        UploadStart::Started
    }

    /// Loads storage stats in the background.
    pub fn refresh_stats(&mut self) {
        self.stats = StatsState::Loading;
        let files = self.files.clone();
        let events = self.events_tx.clone();
        self.runtime.spawn(async move {
            let _ = events.send(QueueEvent::StatsLoaded(load_stats(&files).await));
        });
    }

    /// Applies every pending background event. Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, event: QueueEvent) {
        match event {
            QueueEvent::Patch { id, patch } => {
                self.queue.patch(&id, patch);
            }
            QueueEvent::Progress { id, percent } => self.queue.set_progress(&id, percent),
            QueueEvent::SessionStarted(session) | QueueEvent::SessionCompleted(session) => {
                self.queue.set_session(Some(session));
            }
            QueueEvent::BatchFailed { message } => {
                log::debug!(
                    target: "dropzone::controller",
                    "marking {} file(s) failed: {}",
                    self.queue.total_files(),
                    message
                );
                self.queue.fail_all();
            }
            QueueEvent::BatchFinished => self.is_uploading = false,
            QueueEvent::Cleared { session_id } => {
                if !self.queue.clear_session(&session_id) {
                    log::debug!(
                        target: "dropzone::controller",
                        "ignoring purge for stale session {}",
                        session_id
                    );
                }
            }
            QueueEvent::Notify(notification) => self.notifications.push(notification),
            QueueEvent::StatsLoaded(Ok(stats)) => self.stats = StatsState::Ready(stats),
            QueueEvent::StatsLoaded(Err(message)) => {
                log::warn!(target: "dropzone::controller", "stats unavailable: {}", message);
                self.stats = StatsState::Failed(message);
            }
        }
    }
}
