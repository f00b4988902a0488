//! Full-window player overlay drawn with egui

use std::time::{Duration, Instant};

use eframe::egui;
use egui::{Color32, RichText};

use crate::models::StreamingSource;
use crate::player::ffmpeg::FfmpegMedia;
use crate::player::media::MediaElement;
use crate::player::state::{format_clock, PlaybackState, PlayerController, ProgressCallback, SKIP_SECONDS};

pub struct VideoPlayerProps {
    pub source: Option<StreamingSource>,
    pub title: String,
    pub episode: Option<String>,
    pub on_close: Option<Box<dyn FnMut()>>,
    pub on_progress: Option<ProgressCallback>,
    pub start_time: f64,
}

impl VideoPlayerProps {
    pub fn new(title: &str) -> Self {
        Self {
            source: None,
            title: title.to_string(),
            episode: None,
            on_close: None,
            on_progress: None,
            start_time: 0.0,
        }
    }
}

pub struct VideoPlayer {
    controller: PlayerController<Box<dyn MediaElement>>,
    url: String,
    title: String,
    episode: Option<String>,
    on_close: Option<Box<dyn FnMut()>>,
    texture: Option<egui::TextureHandle>,
    pointer_inside: bool,
}

impl VideoPlayer {
    /// Open the overlay on the built-in backend. A missing source plays
    /// `fallback_url`.
    pub fn open(props: VideoPlayerProps, fallback_url: &str, user_agent: &str, hide_delay: Duration) -> Self {
        let url = resolve_url(props.source.as_ref(), fallback_url);
        log::info!("Opening player for {} ({})", props.title, url);
        let media: Box<dyn MediaElement> = Box::new(FfmpegMedia::open(&url, user_agent));
        Self::with_media(props, url, media, hide_delay)
    }

    pub fn with_media(props: VideoPlayerProps, url: String, media: Box<dyn MediaElement>, hide_delay: Duration) -> Self {
        let mut controller = PlayerController::new(media)
            .with_hide_delay(hide_delay)
            .with_start_time(props.start_time);
        if let Some(callback) = props.on_progress {
            controller = controller.with_progress_callback(callback);
        }

        Self {
            controller,
            url,
            title: props.title,
            episode: props.episode,
            on_close: props.on_close,
            texture: None,
            pointer_inside: false,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn state(&self) -> &PlaybackState {
        self.controller.state()
    }

    /// Stop playback and notify the host through `on_close`
    pub fn request_close(&mut self) {
        if self.controller.is_closed() {
            return;
        }
        self.controller.close();
        self.texture = None;
        if let Some(ref mut on_close) = self.on_close {
            on_close();
        }
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.controller.pump_media();
        self.controller.tick(now);

        if let Some(frame) = self.controller.media_mut().take_frame() {
            let image = egui::ColorImage::from_rgb([frame.width as usize, frame.height as usize], &frame.data);
            match self.texture {
                Some(ref mut texture) => texture.set(image, egui::TextureOptions::LINEAR),
                None => self.texture = Some(ctx.load_texture("video_frame", image, egui::TextureOptions::LINEAR)),
            }
        }

        self.handle_keys(ctx, now);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(Color32::BLACK))
            .show(ctx, |ui| {
                let surface = ui.max_rect();
                self.track_pointer(ctx, surface, now);
                self.draw_video(ui, surface);

                let state = self.controller.state().clone();
                if state.is_loading {
                    self.draw_loading(ui, surface);
                } else if let Some(ref error) = state.error {
                    self.draw_error(ui, surface, error);
                }

                if state.controls_visible {
                    self.draw_top_bar(ui, surface);
                    self.draw_bottom_bar(ui, surface, now);
                } else if self.pointer_inside {
                    ctx.set_cursor_icon(egui::CursorIcon::None);
                }

                if state.error.is_none() {
                    self.draw_center_button(ui, surface, now);
                }
            });

        // Keep frames and the hide timer moving
        let state = self.controller.state();
        if state.is_playing || state.is_loading {
            ctx.request_repaint();
        } else if let Some(deadline) = self.controller.hide_timer() {
            ctx.request_repaint_after(deadline.remaining(now));
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context, now: Instant) {
        let (space, mute, escape, left, right) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Space),
                i.key_pressed(egui::Key::M),
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::ArrowRight),
            )
        });

        if space {
            self.controller.toggle_play(now);
        }
        if mute {
            self.controller.toggle_mute();
        }
        if left {
            self.controller.skip(-SKIP_SECONDS);
        }
        if right {
            self.controller.skip(SKIP_SECONDS);
        }
        if space || mute || left || right {
            self.controller.pointer_moved(now);
        }
        if escape {
            self.request_close();
        }
    }

    fn track_pointer(&mut self, ctx: &egui::Context, surface: egui::Rect, now: Instant) {
        let (hover_pos, moved) = ctx.input(|i| (i.pointer.hover_pos(), i.pointer.delta() != egui::Vec2::ZERO));
        let inside = hover_pos.is_some_and(|p| surface.contains(p));

        if inside && (moved || !self.pointer_inside) {
            self.controller.pointer_moved(now);
        } else if !inside && self.pointer_inside {
            self.controller.pointer_left();
        }
        self.pointer_inside = inside;
    }

    fn draw_video(&self, ui: &mut egui::Ui, surface: egui::Rect) {
        let Some(ref texture) = self.texture else {
            return;
        };

        let tex_size = texture.size_vec2();
        let aspect = tex_size.x / tex_size.y;
        let size = if surface.width() / surface.height() > aspect {
            egui::vec2(surface.height() * aspect, surface.height())
        } else {
            egui::vec2(surface.width(), surface.width() / aspect)
        };
        let rect = egui::Rect::from_center_size(surface.center(), size);
        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        ui.painter().image(texture.id(), rect, uv, Color32::WHITE);
    }

    fn draw_loading(&self, ui: &mut egui::Ui, surface: egui::Rect) {
        ui.painter().rect_filled(surface, 0.0, Color32::from_black_alpha(204));
        let area = egui::Rect::from_center_size(surface.center(), egui::vec2(400.0, 120.0));
        ui.scope_builder(egui::UiBuilder::new().max_rect(area), |ui| {
            ui.vertical_centered(|ui| {
                ui.spinner();
                ui.add_space(12.0);
                ui.label(RichText::new(format!("Loading: {}", self.title)).size(18.0).color(Color32::WHITE));
                if let Some(ref episode) = self.episode {
                    ui.label(RichText::new(episode).color(Color32::from_white_alpha(204)));
                }
            });
        });
    }

    fn draw_error(&self, ui: &mut egui::Ui, surface: egui::Rect, error: &str) {
        let area = egui::Rect::from_center_size(surface.center(), egui::vec2(520.0, 120.0));
        ui.scope_builder(egui::UiBuilder::new().max_rect(area), |ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(&self.title).size(18.0).color(Color32::WHITE));
                ui.add_space(8.0);
                ui.colored_label(Color32::LIGHT_RED, format!("Playback failed: {}", error));
            });
        });
    }

    fn draw_top_bar(&mut self, ui: &mut egui::Ui, surface: egui::Rect) {
        let bar = egui::Rect::from_min_size(surface.min, egui::vec2(surface.width(), 72.0));
        ui.painter().rect_filled(bar, 0.0, Color32::from_black_alpha(160));

        let mut close = false;
        ui.scope_builder(egui::UiBuilder::new().max_rect(bar.shrink(16.0)), |ui| {
            ui.horizontal(|ui| {
                if ui.button(RichText::new("← Back").color(Color32::WHITE)).clicked() {
                    close = true;
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.vertical(|ui| {
                        ui.label(RichText::new(&self.title).size(20.0).strong().color(Color32::WHITE));
                        if let Some(ref episode) = self.episode {
                            ui.label(RichText::new(episode).color(Color32::from_white_alpha(204)));
                        }
                    });
                });
            });
        });

        if close {
            self.request_close();
        }
    }

    fn draw_center_button(&mut self, ui: &mut egui::Ui, surface: egui::Rect, now: Instant) {
        let icon = if self.controller.state().is_playing { "⏸" } else { "▶" };
        let rect = egui::Rect::from_center_size(surface.center(), egui::vec2(80.0, 80.0));
        let button = egui::Button::new(RichText::new(icon).size(32.0).color(Color32::WHITE))
            .fill(Color32::from_white_alpha(40));
        if ui.put(rect, button).clicked() {
            self.controller.toggle_play(now);
        }
    }

    fn draw_bottom_bar(&mut self, ui: &mut egui::Ui, surface: egui::Rect, now: Instant) {
        let bar = egui::Rect::from_min_max(egui::pos2(surface.min.x, surface.max.y - 96.0), surface.max);
        ui.painter().rect_filled(bar, 0.0, Color32::from_black_alpha(160));

        let state = self.controller.state().clone();
        ui.scope_builder(egui::UiBuilder::new().max_rect(bar.shrink(16.0)), |ui| {
            ui.add(
                egui::ProgressBar::new((state.progress_percent() / 100.0) as f32)
                    .desired_width(ui.available_width()),
            );
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                let play_text = if state.is_playing { "⏸" } else { "▶" };
                if ui.button(play_text).clicked() {
                    self.controller.toggle_play(now);
                }
                if ui.button("⏪").on_hover_text("Back 10s").clicked() {
                    self.controller.skip(-SKIP_SECONDS);
                }
                if ui.button("⏩").on_hover_text("Forward 10s").clicked() {
                    self.controller.skip(SKIP_SECONDS);
                }

                let mute_text = if state.is_muted { "🔇" } else { "🔊" };
                if ui.button(mute_text).clicked() {
                    self.controller.toggle_mute();
                }
                let mut volume = state.volume;
                if ui
                    .add(egui::Slider::new(&mut volume, 0.0..=1.0).show_value(false))
                    .changed()
                {
                    self.controller.set_volume(volume);
                }

                ui.label(
                    RichText::new(format!(
                        "{} / {}",
                        format_clock(state.current_time),
                        format_clock(state.duration)
                    ))
                    .color(Color32::WHITE),
                );
            });
        });
    }
}

/// Source URL, or the fallback when the source is missing or blank
pub fn resolve_url(source: Option<&StreamingSource>, fallback: &str) -> String {
    source
        .map(|s| s.url.trim())
        .filter(|url| !url.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::media::MediaEvent;
    use std::cell::Cell;
    use std::rc::Rc;

    struct SilentMedia;

    impl MediaElement for SilentMedia {
        fn play(&mut self) {}
        fn pause(&mut self) {}
        fn seek(&mut self, _seconds: f64) {}
        fn set_muted(&mut self, _muted: bool) {}
        fn is_muted(&self) -> bool { false }
        fn set_volume(&mut self, _volume: f32) {}
        fn stop(&mut self) {}
        fn poll_events(&mut self) -> Vec<MediaEvent> { Vec::new() }
    }

    #[test]
    fn test_resolve_url_falls_back() {
        let fallback = "https://example.com/demo.mp4";
        assert_eq!(resolve_url(None, fallback), fallback);

        let blank = StreamingSource { url: "  ".to_string(), quality: None };
        assert_eq!(resolve_url(Some(&blank), fallback), fallback);

        let real = StreamingSource { url: "https://cdn.example.com/a.mp4".to_string(), quality: Some("1080p".to_string()) };
        assert_eq!(resolve_url(Some(&real), fallback), "https://cdn.example.com/a.mp4");
    }

    #[test]
    fn test_close_invokes_callback_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut props = VideoPlayerProps::new("Big Buck Bunny");
        props.on_close = Some(Box::new(move || counter.set(counter.get() + 1)));

        let mut player = VideoPlayer::with_media(props, "demo".to_string(), Box::new(SilentMedia), Duration::from_secs(3));
        player.request_close();
        player.request_close();
        assert_eq!(calls.get(), 1);
        assert!(!player.state().is_playing);
    }
}
