use crate::settings::Settings;
use crate::viewer::backend::{DecodedImage, FileImageBackend};
use crate::viewer::heatmap::{synthesize_regions, HeatmapFrameBuffer};
use crate::viewer::model::{CanvasRect, ShapeKind};
use crate::viewer::overlay::AnnotationFrameBuffer;
use crate::viewer::session::{AnnotationSession, RedrawGate, SessionEvent};
use crate::viewer::viewport::ViewportAdapter;
use eframe::egui;
use egui::{Color32, Pos2, Rect, Sense, TextureHandle, TextureOptions};
use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};

/// Viewer window hosting the image surface, the two overlay layers and the
/// annotation controls. The image itself is a plain texture; annotations
/// and heatmap are rasterized into separate transparent layers and painted
/// over it in heatmap-then-annotations order, candidate on top.
pub struct ViewerApp {
    viewport: ViewportAdapter<FileImageBackend>,
    session: AnnotationSession,
    events: Receiver<SessionEvent>,
    overlay: AnnotationFrameBuffer,
    heatmap: HeatmapFrameBuffer,
    heatmap_gate: RedrawGate,
    show_heatmap: bool,
    heatmap_intensity: f32,
    pending_upload: Option<DecodedImage>,
    image_tex: Option<TextureHandle>,
    overlay_tex: Option<TextureHandle>,
    heatmap_tex: Option<TextureHandle>,
    comment_text: String,
}

impl ViewerApp {
    pub fn new(settings: &Settings) -> Self {
        let debounce = Duration::from_millis(settings.redraw_debounce_ms);
        let mut session = AnnotationSession::new(debounce);
        let (tx, rx) = channel();
        session.subscribe(tx);

        let mut viewport = ViewportAdapter::new(FileImageBackend::new());
        let mut pending_upload = None;
        if let Err(err) = viewport.attach() {
            tracing::error!(error = %err, "viewport attach failed");
        } else if let Some(path) = settings.image_path.as_deref() {
            viewport.show(path);
            pending_upload = viewport.backend_mut().take_decoded();
        }

        let mut heatmap_gate = RedrawGate::new(debounce);
        if settings.show_heatmap {
            heatmap_gate.mark(Instant::now());
        }

        Self {
            viewport,
            session,
            events: rx,
            overlay: AnnotationFrameBuffer::default(),
            heatmap: HeatmapFrameBuffer::default(),
            heatmap_gate,
            show_heatmap: settings.show_heatmap,
            heatmap_intensity: settings.heatmap_intensity,
            pending_upload,
            image_tex: None,
            overlay_tex: None,
            heatmap_tex: None,
            comment_text: String::new(),
        }
    }

    /// Open a new image reference, superseding any in-flight load.
    pub fn open_image(&mut self, path: &str) {
        self.viewport.show(path);
        self.pending_upload = self.viewport.backend_mut().take_decoded();
        self.image_tex = None;
    }

    /// Dropping an image file anywhere on the window opens it. With several
    /// files the last one wins.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(path) = dropped.into_iter().filter_map(|file| file.path).last() {
            if let Some(path) = path.to_str() {
                self.open_image(path);
            }
        }
    }

    fn drain_session_events(&mut self) {
        while let Ok(SessionEvent::AnnotationsChanged { annotations }) = self.events.try_recv() {
            tracing::info!(count = annotations.len(), "annotation set changed");
        }
    }

    fn upload_image_texture(&mut self, ctx: &egui::Context) {
        if let Some(decoded) = self.pending_upload.take() {
            let size = [decoded.width as usize, decoded.height as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &decoded.rgba);
            self.image_tex = Some(ctx.load_texture("scan", color_image, TextureOptions::LINEAR));
        }
    }

    fn refresh_overlay_texture(&mut self, ctx: &egui::Context, canvas_px: (u32, u32)) {
        let now = Instant::now();
        let due = self.session.overlay_gate().take_if_due(now)
            || self.overlay.size() != canvas_px;
        if !due {
            return;
        }
        self.overlay
            .render(self.session.annotations(), self.session.candidate(), canvas_px);
        let size = [canvas_px.0 as usize, canvas_px.1 as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, self.overlay.rgba_pixels());
        match &mut self.overlay_tex {
            Some(tex) => tex.set(image, TextureOptions::LINEAR),
            None => {
                self.overlay_tex = Some(ctx.load_texture("annotations", image, TextureOptions::LINEAR))
            }
        }
    }

    fn refresh_heatmap_texture(&mut self, ctx: &egui::Context, canvas_px: (u32, u32)) {
        let now = Instant::now();
        let due = self.heatmap_gate.take_if_due(now) || self.heatmap.size() != canvas_px;
        if !due {
            return;
        }
        let regions = if self.show_heatmap {
            synthesize_regions(self.heatmap_intensity)
        } else {
            Vec::new()
        };
        self.heatmap.render(&regions, canvas_px);
        let size = [canvas_px.0 as usize, canvas_px.1 as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, self.heatmap.rgba_pixels());
        match &mut self.heatmap_tex {
            Some(tex) => tex.set(image, TextureOptions::LINEAR),
            None => {
                self.heatmap_tex = Some(ctx.load_texture("heatmap", image, TextureOptions::LINEAR))
            }
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        let now = Instant::now();
        ui.horizontal(|ui| {
            let armed = self.session.armed_tool();
            if ui
                .selectable_label(armed == Some(ShapeKind::Ellipse), "⭕ Circle")
                .clicked()
            {
                self.session.select_tool(ShapeKind::Ellipse, now);
            }
            if ui
                .selectable_label(armed == Some(ShapeKind::Rectangle), "⬜ Rectangle")
                .clicked()
            {
                self.session.select_tool(ShapeKind::Rectangle, now);
            }

            ui.separator();
            if ui.checkbox(&mut self.show_heatmap, "AI heatmap").changed() {
                self.heatmap_gate.mark(now);
            }
            let slider = ui.add(
                egui::Slider::new(&mut self.heatmap_intensity, 0.0..=1.0).text("confidence"),
            );
            if slider.changed() {
                self.heatmap_gate.mark(now);
            }
        });
    }

    fn viewer_canvas(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let Some(image_tex) = self.image_tex.clone() else {
            if self.viewport.is_loading() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading image…");
                });
            } else if let Some(error) = &self.viewport.state().error {
                ui.colored_label(Color32::RED, error);
            } else {
                ui.label("No image loaded");
            }
            return;
        };

        let state = self.viewport.state();
        let img_size = egui::vec2(state.pixel_width as f32, state.pixel_height as f32);
        let scale = (ui.available_width() / img_size.x).min(1.0);
        let display = img_size * scale;
        let (response, painter) = ui.allocate_painter(display, Sense::click_and_drag());
        let uv = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0));
        painter.image(image_tex.id(), response.rect, uv, Color32::WHITE);

        // Overlay layers are sized to the rendered rect, re-queried every
        // pass because the viewport may resize between frames.
        let canvas_px = (
            response.rect.width().round().max(1.0) as u32,
            response.rect.height().round().max(1.0) as u32,
        );
        self.refresh_heatmap_texture(ctx, canvas_px);
        self.refresh_overlay_texture(ctx, canvas_px);

        if self.show_heatmap {
            if let Some(tex) = &self.heatmap_tex {
                painter.image(tex.id(), response.rect, uv, Color32::WHITE);
            }
        }
        if let Some(tex) = &self.overlay_tex {
            painter.image(tex.id(), response.rect, uv, Color32::WHITE);
        }

        self.handle_pointer(ctx, &response);

        if self.show_heatmap {
            ui.colored_label(Color32::from_rgb(220, 38, 38), "AI Overlay Active");
        }
    }

    fn handle_pointer(&mut self, ctx: &egui::Context, response: &egui::Response) {
        let now = Instant::now();
        let rect = response.rect;
        let canvas = CanvasRect::new(rect.min.x, rect.min.y, rect.width(), rect.height());

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.session.pointer_down(pos.x, pos.y, canvas, now);
            }
        }
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                if rect.contains(pos) {
                    self.session.pointer_move(pos.x, pos.y, canvas, now);
                } else if self.session.candidate().is_some() {
                    // Pointer escaped the canvas mid-gesture: discard, do
                    // not commit.
                    self.session.pointer_left(now);
                }
            }
        }
        if response.drag_stopped() && self.session.candidate().is_some() {
            self.session.pointer_up(now);
            self.comment_text.clear();
        }

        if self.session.candidate().is_some() || self.session.overlay_gate().is_dirty() {
            ctx.request_repaint_after(Duration::from_millis(16));
        }
        if self.heatmap_gate.is_dirty() {
            ctx.request_repaint_after(Duration::from_millis(16));
        }
    }

    fn comment_dialog(&mut self, ctx: &egui::Context) {
        if self.session.pending().is_none() {
            return;
        }
        let now = Instant::now();
        let mut save = false;
        let mut cancel = false;
        egui::Window::new("Add Comment to Annotation")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Comment (optional)");
                let edit = ui.text_edit_singleline(&mut self.comment_text);
                edit.request_focus();
                if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    save = true;
                }
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                    if ui.button("Save Annotation").clicked() {
                        save = true;
                    }
                });
            });
        if save {
            let text = std::mem::take(&mut self.comment_text);
            self.session.confirm_comment(text, now);
        } else if cancel {
            self.comment_text.clear();
            self.session.cancel_comment(now);
        }
    }

    fn annotation_list(&mut self, ui: &mut egui::Ui) {
        if self.session.annotations().is_empty() {
            return;
        }
        let now = Instant::now();
        ui.separator();
        ui.label(format!(
            "Your Annotations ({})",
            self.session.annotations().len()
        ));
        let mut delete = None;
        for (index, annotation) in self.session.annotations().iter().enumerate() {
            ui.horizontal(|ui| {
                let kind = match annotation.shape {
                    ShapeKind::Ellipse => "circle",
                    ShapeKind::Rectangle => "rectangle",
                };
                ui.label(format!("Annotation {} ({kind})", index + 1));
                if !annotation.comment.is_empty() {
                    ui.weak(annotation.comment.as_str());
                }
                if ui.small_button("🗑").clicked() {
                    delete = Some(annotation.id);
                }
            });
        }
        if let Some(id) = delete {
            self.session.remove(id, now);
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_session_events();
        self.handle_dropped_files(ctx);
        self.upload_image_texture(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Scan Annotator");
            self.toolbar(ui);
            self.viewer_canvas(ui, ctx);
            self.annotation_list(ui);
        });

        self.comment_dialog(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.viewport.detach();
    }
}
