mod batch;
mod controller;
mod intake;
mod queue;
pub mod thumbnail;
mod types;

pub use batch::BatchUploader;
pub use controller::{UploadController, UploadStart};
pub use intake::{FileIntake, IntakeError, IntakeReport};
pub use queue::{QueueEvent, UploadQueue};
pub use types::{FileId, FileKind, FilePatch, FileSource, QueueStatus, QueuedFile, RawFile};
