//! End-to-end upload flows through the controller.
//!
//! These tests drive `UploadController` the way the UI does: mutate through
//! its operations, then call `poll()` until the background work has landed.

use dropzone::config::DropZoneConfig;
use dropzone::notify::NotificationLevel;
use dropzone::services::{
    FileDraft, FileRecord, FileUpdate, InMemoryStore, Latency, RecordKind, RecordStore,
    SessionStatus, SessionStore, StoreError, UploadSession,
};
use dropzone::upload::{QueueStatus, RawFile, UploadController, UploadStart};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

type Controller<F> = UploadController<F, SessionStore>;

/// A file store that has lost every record.
#[derive(Clone)]
struct OfflineFiles;

impl RecordStore<FileRecord> for OfflineFiles {
    async fn get_all(&self) -> Result<Vec<FileRecord>, StoreError> {
        Ok(Vec::new())
    }

    async fn get_by_id(&self, _id: &str) -> Result<FileRecord, StoreError> {
        Err(StoreError::NotFound(RecordKind::File))
    }

    async fn create(&self, _draft: FileDraft) -> Result<FileRecord, StoreError> {
        Err(StoreError::NotFound(RecordKind::File))
    }

    async fn update(&self, _id: &str, _update: FileUpdate) -> Result<FileRecord, StoreError> {
        Err(StoreError::NotFound(RecordKind::File))
    }

    async fn delete(&self, _id: &str) -> Result<FileRecord, StoreError> {
        Err(StoreError::NotFound(RecordKind::File))
    }
}

/// Fails the first `failures` creates, then behaves like a normal store.
#[derive(Clone)]
struct FlakyFiles {
    inner: FileStore,
    failures: Arc<AtomicUsize>,
}

impl FlakyFiles {
    fn new(failures: usize) -> Self {
        Self {
            inner: FileStore::empty(),
            failures: Arc::new(AtomicUsize::new(failures)),
        }
    }
}

impl RecordStore<FileRecord> for FlakyFiles {
    async fn get_all(&self) -> Result<Vec<FileRecord>, StoreError> {
        self.inner.get_all().await
    }

    async fn get_by_id(&self, id: &str) -> Result<FileRecord, StoreError> {
        self.inner.get_by_id(id).await
    }

    async fn create(&self, draft: FileDraft) -> Result<FileRecord, StoreError> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::NotFound(RecordKind::File));
        }
        self.inner.create(draft).await
    }

    async fn update(&self, id: &str, update: FileUpdate) -> Result<FileRecord, StoreError> {
        self.inner.update(id, update).await
    }

    async fn delete(&self, id: &str) -> Result<FileRecord, StoreError> {
        self.inner.delete(id).await
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config_with(step_interval_ms: u64, display_delay_ms: u64) -> DropZoneConfig {
    let mut config = DropZoneConfig::instant();
    config.simulation.step_interval_ms = step_interval_ms;
    config.simulation.display_delay_ms = display_delay_ms;
    config
}

fn text_file(name: &str, len: usize) -> RawFile {
    RawFile::from_bytes(name, vec![b'a'; len])
}

fn png_file(name: &str) -> RawFile {
    let img = image::RgbaImage::from_pixel(300, 200, image::Rgba([10, 20, 30, 255]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    RawFile::from_bytes(name, out.into_inner())
}

type FileStore = InMemoryStore<FileRecord>;

fn seeded_controller(config: &DropZoneConfig) -> (Controller<FileStore>, FileStore, SessionStore) {
    let files = FileStore::seeded(Latency::none());
    let sessions = InMemoryStore::<UploadSession>::seeded(Latency::none());
    let controller = UploadController::new(
        files.clone(),
        sessions.clone(),
        config,
        Handle::current(),
    );
    (controller, files, sessions)
}

/// Polls until `done` holds or roughly five seconds pass.
async fn settle<F>(controller: &mut Controller<F>, done: impl Fn(&Controller<F>) -> bool) -> bool
where
    F: RecordStore<FileRecord>,
{
    for _ in 0..500 {
        controller.poll();
        if done(controller) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

fn has_notification<F>(controller: &Controller<F>, level: NotificationLevel, message: &str) -> bool
where
    F: RecordStore<FileRecord>,
{
    controller
        .notifications()
        .iter()
        .any(|n| n.level == level && n.message == message)
}

#[tokio::test(flavor = "multi_thread")]
async fn successful_batch_completes_then_clears() {
    init_logging();
    let config = config_with(0, 300);
    let (mut controller, files, sessions) = seeded_controller(&config);

    let report = controller.add_files(vec![text_file("a.txt", 10), text_file("b.txt", 20)]);
    assert_eq!(report.accepted_count(), 2);
    assert!(has_notification(
        &controller,
        NotificationLevel::Success,
        "2 file(s) added to upload queue"
    ));

    assert_eq!(controller.start_upload(), UploadStart::Started);
    assert!(controller.is_uploading());

    assert!(settle(&mut controller, |c| !c.is_uploading()).await);
    let queue = controller.queue();
    assert_eq!(queue.total_files(), 2);
    for file in queue.files() {
        assert_eq!(file.status, QueueStatus::Completed);
        assert_eq!(queue.progress_of(&file.id), 100);
        let record = file.server_file.as_ref().unwrap();
        assert_eq!(record.name, file.name);
    }
    assert_eq!(queue.completed_files(), 2);
    let session = queue.session().unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert!(session.end_time.is_some());
    assert!(has_notification(
        &controller,
        NotificationLevel::Success,
        "Successfully uploaded 2 file(s)"
    ));

    assert!(settle(&mut controller, |c| c.queue().is_empty()).await);
    assert!(controller.queue().session().is_none());

    let stored = files.get_all().await.unwrap();
    assert_eq!(stored.len(), 6);
    assert!(stored.iter().any(|r| r.name == "a.txt"));
    let stored_sessions = sessions.get_all().await.unwrap();
    assert_eq!(stored_sessions.len(), 3);

    assert!(
        settle(&mut controller, |c| c
            .stats()
            .ready()
            .is_some_and(|s| s.total_files == 6))
        .await
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_batch_marks_every_file_failed() {
    init_logging();
    let config = config_with(0, 0);
    let sessions = InMemoryStore::<UploadSession>::seeded(Latency::none());
    let mut controller =
        UploadController::new(OfflineFiles, sessions.clone(), &config, Handle::current());

    controller.add_files(vec![text_file("a.txt", 10), text_file("b.txt", 20)]);
    assert_eq!(controller.start_upload(), UploadStart::Started);

    assert!(settle(&mut controller, |c| !c.is_uploading()).await);
    // Failed batches are not purged.
    tokio::time::sleep(Duration::from_millis(50)).await;
    controller.poll();

    let queue = controller.queue();
    assert_eq!(queue.total_files(), 2);
    assert!(queue.files().iter().all(|f| f.status == QueueStatus::Failed));
    assert!(queue.files().iter().all(|f| f.server_file.is_none()));
    assert_eq!(queue.session().unwrap().status, SessionStatus::Active);
    assert!(has_notification(
        &controller,
        NotificationLevel::Error,
        "Upload failed: File not found"
    ));

    // Failed files never re-enter a batch on their own.
    assert_eq!(controller.start_upload(), UploadStart::NothingPending);
    assert!(!controller.is_uploading());
    assert_eq!(sessions.get_all().await.unwrap().len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_files_are_retried_by_re_adding_them() {
    init_logging();
    let config = config_with(0, 2000);
    let files = FlakyFiles::new(1);
    let sessions = InMemoryStore::<UploadSession>::seeded(Latency::none());
    let mut controller =
        UploadController::new(files.clone(), sessions, &config, Handle::current());

    let report = controller.add_files(vec![text_file("a.txt", 10), text_file("b.txt", 20)]);
    assert_eq!(controller.start_upload(), UploadStart::Started);
    assert!(settle(&mut controller, |c| !c.is_uploading()).await);
    assert!(controller
        .queue()
        .files()
        .iter()
        .all(|f| f.status == QueueStatus::Failed));

    // Pressing Upload All again does not start a batch over failed files.
    assert_eq!(controller.start_upload(), UploadStart::NothingPending);
    assert!(has_notification(
        &controller,
        NotificationLevel::Warning,
        "No pending files to upload"
    ));
    assert!(files.get_all().await.unwrap().is_empty());

    for id in &report.accepted {
        assert!(controller.remove_file(id));
    }
    controller.add_files(vec![text_file("a.txt", 10), text_file("b.txt", 20)]);
    assert_eq!(controller.start_upload(), UploadStart::Started);
    assert!(settle(&mut controller, |c| !c.is_uploading()).await);

    let queue = controller.queue();
    assert_eq!(queue.total_files(), 2);
    assert!(queue.files().iter().all(|f| f.status == QueueStatus::Completed));
    assert_eq!(queue.completed_files(), 2);
    assert_eq!(queue.overall_progress(), 100.0);
    assert_eq!(files.get_all().await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn completed_files_are_not_uploaded_twice() {
    init_logging();
    let config = config_with(0, 2000);
    let (mut controller, files, _) = seeded_controller(&config);

    let first = controller.add_files(vec![text_file("a.txt", 10)]).accepted[0].clone();
    assert_eq!(controller.start_upload(), UploadStart::Started);
    assert!(settle(&mut controller, |c| !c.is_uploading()).await);

    // Still on screen: only the completed file is queued.
    assert_eq!(controller.start_upload(), UploadStart::NothingPending);

    let second = controller.add_files(vec![text_file("b.txt", 20)]).accepted[0].clone();
    assert_eq!(controller.start_upload(), UploadStart::Started);
    assert!(settle(&mut controller, |c| !c.is_uploading()).await);

    let queue = controller.queue();
    assert_eq!(queue.get(&first).unwrap().status, QueueStatus::Completed);
    assert_eq!(queue.get(&second).unwrap().status, QueueStatus::Completed);
    assert_eq!(queue.session().unwrap().files, vec![second.to_string()]);
    assert_eq!(files.get_all().await.unwrap().len(), 6);
}

#[tokio::test(flavor = "multi_thread")]
async fn late_purge_spares_files_added_after_a_clear() {
    init_logging();
    let config = config_with(0, 300);
    let (mut controller, _, _) = seeded_controller(&config);

    controller.add_files(vec![text_file("a.txt", 10)]);
    assert_eq!(controller.start_upload(), UploadStart::Started);
    assert!(settle(&mut controller, |c| !c.is_uploading()).await);

    controller.clear();
    let fresh = controller.add_files(vec![text_file("c.txt", 5)]).accepted[0].clone();

    // Outlast the display delay of the finished batch.
    tokio::time::sleep(Duration::from_millis(600)).await;
    controller.poll();

    let queue = controller.queue();
    assert_eq!(queue.total_files(), 1);
    assert_eq!(queue.get(&fresh).unwrap().status, QueueStatus::Pending);
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_queue_only_warns() {
    init_logging();
    let config = config_with(0, 0);
    let (mut controller, _, sessions) = seeded_controller(&config);

    assert_eq!(controller.start_upload(), UploadStart::EmptyQueue);
    assert!(!controller.is_uploading());
    assert!(has_notification(
        &controller,
        NotificationLevel::Warning,
        "Please select files to upload"
    ));
    assert_eq!(sessions.get_all().await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn second_start_while_uploading_is_ignored() {
    init_logging();
    let config = config_with(20, 0);
    let (mut controller, _, sessions) = seeded_controller(&config);

    controller.add_files(vec![text_file("a.txt", 10)]);
    assert_eq!(controller.start_upload(), UploadStart::Started);
    assert_eq!(controller.start_upload(), UploadStart::AlreadyUploading);

    assert!(settle(&mut controller, |c| !c.is_uploading()).await);
    assert_eq!(sessions.get_all().await.unwrap().len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_files_are_reported_and_skipped() {
    init_logging();
    let mut config = config_with(0, 0);
    config.policy.max_file_size = 4;
    let (mut controller, _, _) = seeded_controller(&config);

    let report = controller.add_files(vec![
        text_file("ok.txt", 4),
        text_file("big.txt", 10),
        RawFile::from_bytes("tool.exe", vec![0u8; 2]),
    ]);

    assert_eq!(report.accepted_count(), 1);
    assert_eq!(report.rejected.len(), 2);
    assert_eq!(controller.queue().total_files(), 1);
    assert!(has_notification(
        &controller,
        NotificationLevel::Error,
        "File \"big.txt\" exceeds maximum size of 4 Bytes"
    ));
    assert!(has_notification(
        &controller,
        NotificationLevel::Success,
        "1 file(s) added to upload queue"
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn removal_works_for_any_queued_file() {
    init_logging();
    let config = config_with(30, 2000);
    let (mut controller, _, _) = seeded_controller(&config);

    let report = controller.add_files(vec![text_file("a.txt", 10), text_file("b.txt", 20)]);
    let first = report.accepted[0].clone();
    let second = report.accepted[1].clone();

    assert!(!controller.remove_file(&"missing".into()));
    assert!(controller.remove_file(&first));
    assert_eq!(controller.queue().total_files(), 1);

    controller.add_files(vec![text_file("c.txt", 5)]);
    assert_eq!(controller.start_upload(), UploadStart::Started);
    assert!(
        settle(&mut controller, |c| c
            .queue()
            .get(&second)
            .is_some_and(|f| f.status == QueueStatus::Uploading))
        .await
    );

    // The in-flight file can still be dropped; its later updates are ignored.
    assert!(controller.remove_file(&second));
    assert!(!controller.queue().has_progress(&second));

    assert!(settle(&mut controller, |c| !c.is_uploading()).await);
    assert!(!controller.queue().contains(&second));
    assert_eq!(controller.queue().total_files(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn images_get_a_thumbnail() {
    init_logging();
    let config = config_with(0, 0);
    let (mut controller, _, _) = seeded_controller(&config);

    let report = controller.add_files(vec![png_file("photo.png"), text_file("notes.txt", 3)]);
    assert_eq!(report.thumbnails.len(), 1);
    let photo = report.accepted[0].clone();
    let notes = report.accepted[1].clone();

    assert!(
        settle(&mut controller, |c| c
            .queue()
            .get(&photo)
            .is_some_and(|f| f.thumbnail_url.is_some()))
        .await
    );
    let uri = controller.queue().get(&photo).unwrap().thumbnail_url.clone().unwrap();
    assert!(uri.starts_with("data:image/png;base64,"));
    assert!(controller.queue().get(&notes).unwrap().thumbnail_url.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn clear_empties_the_queue() {
    init_logging();
    let config = config_with(0, 0);
    let (mut controller, _, _) = seeded_controller(&config);

    controller.add_files(vec![text_file("a.txt", 10), text_file("b.txt", 20)]);
    assert_eq!(controller.queue().total_size(), 30);

    controller.clear();
    assert!(controller.queue().is_empty());
    assert_eq!(controller.queue().total_size(), 0);
    assert_eq!(controller.queue().overall_progress(), 0.0);
    assert!(has_notification(
        &controller,
        NotificationLevel::Info,
        "Removed 2 file(s) from the queue"
    ));

    // Clearing an empty queue says nothing.
    let before = controller.notifications().len();
    controller.clear();
    assert_eq!(controller.notifications().len(), before);
}
