//! Files arriving from drag-and-drop and the native picker.

use crate::config::UploadPolicy;
use crate::upload::RawFile;
use eframe::egui;
use rfd::FileDialog;
use std::path::PathBuf;

/// Files dropped onto the window during this frame.
pub fn dropped_files(ctx: &egui::Context) -> Vec<RawFile> {
    let dropped = ctx.input(|i| i.raw.dropped_files.clone());
    if dropped.is_empty() {
        return Vec::new();
    }

    log::trace!(target: "dropzone::input", "dropped_files={}", dropped.len());
    dropped.iter().filter_map(raw_from_dropped).collect()
}

pub fn is_hovering_files(ctx: &egui::Context) -> bool {
    ctx.input(|i| !i.raw.hovered_files.is_empty())
}

pub(crate) fn raw_from_dropped(file: &egui::DroppedFile) -> Option<RawFile> {
    if let Some(path) = &file.path {
        return match RawFile::from_path(path) {
            Ok(raw) => Some(raw),
            Err(e) => {
                log::warn!(target: "dropzone::input", "cannot read dropped {:?}: {}", path, e);
                None
            }
        };
    }

    if let Some(bytes) = &file.bytes {
        return Some(RawFile::from_bytes(file.name.clone(), bytes.clone()));
    }

    log::warn!(
        target: "dropzone::input",
        "dropped file {} has neither path nor bytes",
        file.name
    );
    None
}

/// Opens the native multi-file picker filtered to the allowed types.
pub fn pick_files(policy: &UploadPolicy) -> Vec<PathBuf> {
    let extensions = policy.picker_extensions();
    let mut dialog = FileDialog::new().set_title("Select files to upload");
    if !extensions.is_empty() {
        dialog = dialog.add_filter("Supported files", extensions.as_slice());
    }
    dialog.pick_files().unwrap_or_default()
}

pub fn raw_files_from_paths(paths: &[PathBuf]) -> Vec<RawFile> {
    paths
        .iter()
        .filter_map(|path| match RawFile::from_path(path) {
            Ok(raw) => Some(raw),
            Err(e) => {
                log::warn!(target: "dropzone::input", "cannot read {:?}: {}", path, e);
                None
            }
        })
        .collect()
}
