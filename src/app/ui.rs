use super::state::ThumbnailCache;
use super::DropZoneApp;
use crate::services::StatsState;
use crate::upload::{FileId, QueueStatus, QueuedFile, UploadQueue};
use crate::utils::color::Palette;
use crate::utils::file_size::FileSizeUtils;
use eframe::egui::{self, Align, Color32, RichText};

const ROW_THUMBNAIL: f32 = 40.0;

/// What the user clicked this frame; applied once rendering is done.
#[derive(Default)]
struct Actions {
    browse: bool,
    upload: bool,
    clear: bool,
    remove: Option<FileId>,
}

impl DropZoneApp {
    pub fn render(&mut self, ctx: &egui::Context) {
        let mut actions = Actions::default();

        egui::CentralPanel::default().show(ctx, |ui| {
            let total_height = ui.available_height();
            let footer_height = 40.0;
            let footer_margin = 15.0;
            let content_height = total_height - footer_height - footer_margin;

            egui::ScrollArea::vertical()
                .max_height(content_height)
                .show(ui, |ui| {
                    ui.add_space(20.0);
                    self.render_header(ui);
                    ui.add_space(20.0);
                    self.render_stats(ui);
                    ui.add_space(20.0);
                    self.render_drop_zone(ui, &mut actions);

                    if !self.controller.queue().is_empty() {
                        ui.add_space(20.0);
                        self.render_queue(ctx, ui, &mut actions);
                    }

                    ui.add_space(10.0);
                    self.render_rules(ui);
                    ui.add_space(20.0);
                });

            ui.with_layout(egui::Layout::bottom_up(Align::Center), |ui| {
                ui.add_space(footer_margin);
                self.render_footer(ui);
            });
        });

        self.render_toasts(ctx);
        self.apply_actions(actions);
    }

    fn apply_actions(&mut self, actions: Actions) {
        if let Some(id) = actions.remove {
            self.remove_file(&id);
        }
        if actions.clear {
            self.clear_all();
        }
        if actions.browse {
            self.browse_files();
        }
        if actions.upload {
            self.upload_all();
        }
    }

    fn render_header(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.heading(
                RichText::new("⬆ DropZone")
                    .size(28.0)
                    .strong()
                    .color(self.palette.primary),
            );
            ui.add_space(5.0);
            ui.label(
                RichText::new("Effortless file management")
                    .color(ui.visuals().text_color().gamma_multiply(0.7)),
            );
            if let Some(stats) = self.controller.stats().ready() {
                ui.add_space(3.0);
                ui.label(
                    RichText::new(format!(
                        "🗂 {} files   💾 {}",
                        stats.total_files,
                        stats.total_size_label()
                    ))
                    .small(),
                );
            }
        });
    }

    fn render_stats(&self, ui: &mut egui::Ui) {
        let (files, storage, recent) = match self.controller.stats() {
            StatsState::Loading => ("...".to_string(), "...".to_string(), "...".to_string()),
            StatsState::Ready(stats) => (
                stats.total_files.to_string(),
                stats.total_size_label(),
                stats.recent_uploads.to_string(),
            ),
            StatsState::Failed(message) => {
                ui.colored_label(self.palette.danger, format!("Stats unavailable: {}", message));
                return;
            }
        };

        ui.columns(3, |columns| {
            stat_card(&mut columns[0], "🗂", &files, "Total Files", self.palette.primary);
            stat_card(&mut columns[1], "💾", &storage, "Storage Used", self.palette.secondary);
            stat_card(&mut columns[2], "🕑", &recent, "Recent Uploads", self.palette.accent);
        });
    }

    fn render_drop_zone(&self, ui: &mut egui::Ui, actions: &mut Actions) {
        let uploading = self.controller.is_uploading();
        let hovering = self.state.hovering && !uploading;
        let stroke_color = if hovering {
            self.palette.primary
        } else {
            self.palette.muted
        };

        egui::Frame::none()
            .stroke(egui::Stroke::new(2.0, stroke_color))
            .rounding(16.0)
            .inner_margin(24.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new(if hovering { "⬇" } else { "⬆" }).size(40.0));
                    ui.add_space(8.0);
                    ui.label(
                        RichText::new(if hovering {
                            "Drop files here!"
                        } else {
                            "Drag & drop your files"
                        })
                        .size(20.0)
                        .strong(),
                    );
                    ui.label("or browse your device");
                    ui.add_space(8.0);

                    let max_size =
                        FileSizeUtils::format_size(self.controller.intake().policy().max_file_size);
                    ui.label(
                        RichText::new(format!("✔ Max {} per file", max_size))
                            .small()
                            .color(self.palette.secondary),
                    );
                    ui.add_space(8.0);

                    let button =
                        egui::Button::new("📂 Browse files").min_size(egui::vec2(160.0, 32.0));
                    if ui.add_enabled(!uploading, button).clicked() {
                        actions.browse = true;
                    }
                    if !self.state.selection.is_empty() {
                        ui.label(
                            RichText::new(format!("{} file(s) selected", self.state.selection.len()))
                                .small(),
                        );
                    }
                });
            });
    }

    fn render_queue(&mut self, ctx: &egui::Context, ui: &mut egui::Ui, actions: &mut Actions) {
        let uploading = self.controller.is_uploading();
        let queue = self.controller.queue();
        let palette = self.palette;

        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label(
                        RichText::new(format!("Upload Queue ({} files)", queue.total_files()))
                            .strong(),
                    );
                    ui.label(
                        RichText::new(format!("Total size: {}", queue.total_size_label())).small(),
                    );
                });

                ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                    let upload_label = if uploading {
                        "⏳ Uploading..."
                    } else {
                        "📤 Upload All"
                    };
                    let upload_button =
                        egui::Button::new(upload_label).min_size(egui::vec2(120.0, 28.0));
                    if ui
                        .add_enabled(!uploading && queue.has_pending(), upload_button)
                        .clicked()
                    {
                        actions.upload = true;
                    }
                    if ui
                        .add_enabled(!uploading, egui::Button::new("🗑 Clear All"))
                        .clicked()
                    {
                        actions.clear = true;
                    }
                });
            });

            if uploading {
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    ui.label("Overall Progress");
                    ui.label(format!(
                        "{}/{} files",
                        queue.completed_files(),
                        queue.total_files()
                    ));
                });
                let progress_bar = egui::ProgressBar::new(queue.overall_progress() / 100.0)
                    .show_percentage()
                    .animate(false)
                    .fill(palette.primary);
                ui.add(progress_bar);
            }

            ui.add_space(8.0);
            egui::ScrollArea::vertical()
                .id_source("queue_files")
                .max_height(320.0)
                .show(ui, |ui| {
                    for file in queue.files() {
                        file_row(
                            ctx,
                            ui,
                            file,
                            queue,
                            &mut self.state.thumbnails,
                            &palette,
                            actions,
                        );
                        ui.add_space(4.0);
                    }
                });
        });
    }

    fn render_rules(&self, ui: &mut egui::Ui) {
        let palette = self.palette;
        ui.collapsing("Upload rules", |ui| match &self.state.filters {
            None => {
                ui.label("Loading...");
            }
            Some(Err(message)) => {
                ui.colored_label(palette.danger, message);
            }
            Some(Ok(filters)) => {
                for filter in filters {
                    ui.horizontal(|ui| {
                        let (glyph, color) = if filter.enabled {
                            ("✅", palette.secondary)
                        } else {
                            ("⏸", palette.muted)
                        };
                        ui.label(glyph);
                        ui.colored_label(color, &filter.name);
                        ui.label(
                            RichText::new(format!(
                                "{} · up to {}",
                                filter.mime_types.join(", "),
                                FileSizeUtils::format_size(filter.max_size)
                            ))
                            .small(),
                        );
                    });
                }
            }
        });
    }

    fn render_toasts(&self, ctx: &egui::Context) {
        if self.controller.notifications().is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("dropzone_toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -60.0))
            .show(ctx, |ui| {
                for notification in self.controller.notifications().iter() {
                    egui::Frame::none()
                        .fill(ui.style().visuals.extreme_bg_color)
                        .stroke(egui::Stroke::new(
                            1.0,
                            self.palette.for_level(notification.level),
                        ))
                        .rounding(8.0)
                        .inner_margin(8.0)
                        .show(ui, |ui| {
                            ui.colored_label(
                                self.palette.for_level(notification.level),
                                &notification.message,
                            );
                        });
                    ui.add_space(4.0);
                }
            });
    }

    fn render_footer(&self, ui: &mut egui::Ui) {
        ui.horizontal_centered(|ui| {
            ui.label("⬆");
            ui.colored_label(self.palette.primary, "DropZone");
            ui.label(
                RichText::new("Simplifying file management for everyone.")
                    .small()
                    .color(ui.visuals().text_color().gamma_multiply(0.7)),
            );
        });
    }
}

fn stat_card(ui: &mut egui::Ui, icon: &str, value: &str, caption: &str, color: Color32) {
    ui.group(|ui| {
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(icon).size(22.0).color(color));
            ui.label(RichText::new(value).size(22.0).strong());
            ui.label(RichText::new(caption).small());
        });
    });
}

fn status_glyph(status: QueueStatus, palette: &Palette) -> Option<(&'static str, Color32)> {
    match status {
        QueueStatus::Pending => None,
        QueueStatus::Uploading => Some(("⏳", palette.primary)),
        QueueStatus::Completed => Some(("✅", palette.secondary)),
        QueueStatus::Failed => Some(("❌", palette.danger)),
    }
}

fn file_row(
    ctx: &egui::Context,
    ui: &mut egui::Ui,
    file: &QueuedFile,
    queue: &UploadQueue,
    thumbnails: &mut ThumbnailCache,
    palette: &Palette,
    actions: &mut Actions,
) {
    egui::Frame::none()
        .fill(ui.style().visuals.faint_bg_color)
        .rounding(8.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                let texture = match file.thumbnail_url.as_deref() {
                    Some(uri) => thumbnails.get_or_load(ctx, &file.id, uri),
                    None => None,
                };
                match texture {
                    Some(texture) => {
                        ui.add(egui::Image::new(egui::load::SizedTexture::new(
                            texture.id(),
                            egui::vec2(ROW_THUMBNAIL, ROW_THUMBNAIL),
                        )));
                    }
                    None => {
                        ui.add_sized(
                            [ROW_THUMBNAIL, ROW_THUMBNAIL],
                            egui::Label::new(RichText::new(file.kind().icon()).size(24.0)),
                        );
                    }
                }

                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(&file.name).strong());
                        if let Some((glyph, color)) = status_glyph(file.status, palette) {
                            ui.colored_label(color, glyph);
                        }
                    });
                    ui.label(RichText::new(FileSizeUtils::format_size(file.size)).small());

                    if matches!(file.status, QueueStatus::Uploading | QueueStatus::Completed) {
                        let progress = queue.progress_of(&file.id) as f32 / 100.0;
                        ui.add(
                            egui::ProgressBar::new(progress)
                                .desired_width(ui.available_width().min(360.0))
                                .animate(false)
                                .fill(palette.primary),
                        );
                    }
                });

                if file.status == QueueStatus::Pending {
                    ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                        if ui.small_button("✖").on_hover_text("Remove").clicked() {
                            actions.remove = Some(file.id.clone());
                        }
                    });
                }
            });
        });
}
