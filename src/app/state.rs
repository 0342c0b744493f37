use crate::services::FileFilter;
use crate::upload::{thumbnail, FileId, UploadQueue};
use eframe::egui;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;

/// How long a toast stays on screen.
pub const TOAST_TTL_SECS: u64 = 4;

/// View state that is not part of the upload queue itself.
#[derive(Default)]
pub struct UiState {
    pub hovering: bool,
    /// Files picked in the last dialog; reset by "Clear All" so the same
    /// files can be picked again.
    pub selection: Vec<PathBuf>,
    pub filters: Option<Result<Vec<FileFilter>, String>>,
    pub filters_receiver: Option<Receiver<Result<Vec<FileFilter>, String>>>,
    pub thumbnails: ThumbnailCache,
}

impl UiState {
    pub fn reset_input(&mut self) {
        self.selection.clear();
    }

    pub fn poll_filters(&mut self) -> bool {
        let Some(receiver) = &self.filters_receiver else {
            return false;
        };
        match receiver.try_recv() {
            Ok(result) => {
                self.filters = Some(result);
                self.filters_receiver = None;
                true
            }
            Err(_) => false,
        }
    }
}

/// GPU textures for queued image previews, keyed by file id.
///
/// A `None` entry marks a preview that could not be decoded so it is not
/// retried every frame.
#[derive(Default)]
pub struct ThumbnailCache {
    textures: HashMap<FileId, Option<egui::TextureHandle>>,
}

impl ThumbnailCache {
    pub fn get_or_load(
        &mut self,
        ctx: &egui::Context,
        id: &FileId,
        data_uri: &str,
    ) -> Option<&egui::TextureHandle> {
        self.textures
            .entry(id.clone())
            .or_insert_with(|| load_texture(ctx, id, data_uri))
            .as_ref()
    }

    /// Drops textures for files that left the queue.
    pub fn retain_queued(&mut self, queue: &UploadQueue) {
        self.textures.retain(|id, _| queue.contains(id));
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

fn load_texture(ctx: &egui::Context, id: &FileId, data_uri: &str) -> Option<egui::TextureHandle> {
    let bytes = match thumbnail::decode_data_uri(data_uri) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::debug!(target: "dropzone::ui", "thumbnail for {} unusable: {}", id, e);
            return None;
        }
    };
    let image = match image::load_from_memory(&bytes) {
        Ok(image) => image.to_rgba8(),
        Err(e) => {
            log::debug!(target: "dropzone::ui", "thumbnail for {} not decodable: {}", id, e);
            return None;
        }
    };

    let size = [image.width() as usize, image.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
    Some(ctx.load_texture(
        format!("thumbnail-{}", id),
        color_image,
        egui::TextureOptions::LINEAR,
    ))
}
