pub mod input;
mod state;
mod ui;

use crate::config::DropZoneConfig;
use crate::services::{RecordStore, Services};
use crate::upload::{FileId, UploadController, UploadStart};
use crate::utils::color::Palette;
use eframe::{egui, App};
pub use state::{ThumbnailCache, UiState, TOAST_TTL_SECS};
use std::sync::mpsc as std_mpsc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;

pub struct DropZoneApp {
    controller: UploadController,
    services: Services,
    state: UiState,
    palette: Palette,
    runtime: Handle,
}

impl DropZoneApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        services: Services,
        config: &DropZoneConfig,
        runtime: Handle,
    ) -> Self {
        log::info!(target: "dropzone::app", "initializing DropZone");
        let controller = UploadController::new(
            services.files.clone(),
            services.sessions.clone(),
            config,
            runtime.clone(),
        );
        let mut app = Self {
            controller,
            services,
            state: UiState::default(),
            palette: Palette::default(),
            runtime,
        };
        app.controller.refresh_stats();
        app.load_filters();
        app
    }

    fn load_filters(&mut self) {
        let (sender, receiver) = std_mpsc::channel();
        self.state.filters_receiver = Some(receiver);
        let filters = self.services.filters.clone();
        self.runtime.spawn(async move {
            let result = filters.get_all().await.map_err(|e| e.to_string());
            let _ = sender.send(result);
        });
    }

    pub fn browse_files(&mut self) {
        let paths = input::pick_files(self.controller.intake().policy());
        if paths.is_empty() {
            return;
        }
        log::debug!(target: "dropzone::app", "picked {} file(s)", paths.len());
        let raws = input::raw_files_from_paths(&paths);
        self.state.selection = paths;
        self.controller.add_files(raws);
    }

    pub fn upload_all(&mut self) {
        match self.controller.start_upload() {
            UploadStart::Started => {
                log::info!(
                    target: "dropzone::app",
                    "uploading {} file(s)",
                    self.controller.queue().total_files()
                );
            }
            UploadStart::EmptyQueue
            | UploadStart::NothingPending
            | UploadStart::AlreadyUploading => {}
        }
    }

    pub fn remove_file(&mut self, id: &FileId) {
        self.controller.remove_file(id);
    }

    pub fn clear_all(&mut self) {
        self.controller.clear();
        self.state.reset_input();
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        let mut changed = self.controller.poll() > 0;
        changed |= self.state.poll_filters();

        self.state.hovering = input::is_hovering_files(ctx);
        if !self.controller.is_uploading() {
            let dropped = input::dropped_files(ctx);
            if !dropped.is_empty() {
                self.controller.add_files(dropped);
                changed = true;
            }
        }

        self.state.thumbnails.retain_queued(self.controller.queue());
        self.controller
            .notifications_mut()
            .prune(Instant::now(), Duration::from_secs(TOAST_TTL_SECS));

        if changed {
            ctx.request_repaint();
        }
        let busy = self.controller.is_uploading()
            || !self.controller.notifications().is_empty()
            || !self.controller.queue().is_empty()
            || self.state.filters_receiver.is_some();
        if busy {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl App for DropZoneApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}
