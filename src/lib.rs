//! DropZone: a desktop file-upload queue backed by simulated storage.

pub mod app;
pub mod config;
pub mod notify;
pub mod services;
pub mod upload;
pub mod utils;
