//! Presentation components: navbar, hero, rows, detail modal and the
//! welcome/search screens. Views draw and report what the user asked for;
//! the app applies it.

use std::time::{Duration, Instant};

use eframe::egui;
use egui::{Color32, RichText};

use crate::models::{ContentItem, DetailContent, MovieSummary, Route, TopTenItem, User};
use crate::posters::PosterCache;
use crate::timer::{self, Deadline};

const ACCENT: Color32 = Color32::from_rgb(229, 9, 20);
const CARD_SIZE: egui::Vec2 = egui::vec2(150.0, 225.0);

/// What a view wants the app to do
#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    Navigate(Route),
    OpenDetail(String),
    Play(String),
    SignIn,
    SignOut,
    Retry,
    Search,
    OpenSettings,
}

/// Welcome screen form fields
#[derive(Debug, Default)]
pub struct SignInForm {
    pub name: String,
    pub email: String,
    pub remember: bool,
    pub error: Option<String>,
}

/// Rotation through the hero movies
pub struct HeroCarousel {
    index: usize,
    next: Option<Deadline>,
    interval: Duration,
}

impl HeroCarousel {
    pub fn new(interval: Duration) -> Self {
        Self { index: 0, next: None, interval }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Advance when the interval elapses. Returns the time until the next step.
    pub fn tick(&mut self, now: Instant, count: usize) -> Option<Duration> {
        if count < 2 {
            self.index = 0;
            self.next = None;
            return None;
        }
        if self.index >= count {
            self.index = 0;
        }
        if timer::take_if_due(&mut self.next, now) {
            self.index = (self.index + 1) % count;
        }
        let next = *self.next.get_or_insert_with(|| Deadline::after(now, self.interval));
        Some(next.remaining(now))
    }

    /// Jump to `index` and restart the interval
    pub fn select(&mut self, index: usize, now: Instant) {
        self.index = index;
        self.next = Some(Deadline::after(now, self.interval));
    }

    /// Cancel rotation (e.g. when the home view goes away)
    pub fn stop(&mut self) {
        self.next = None;
    }
}

pub fn navbar(ui: &mut egui::Ui, user: Option<&User>, route: Route) -> Option<ViewAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        ui.label(RichText::new("🎬 CineStream").size(22.0).strong().color(ACCENT));
        ui.add_space(20.0);

        if user.is_some() {
            if ui.selectable_label(route == Route::Home, "🏠 Home").clicked() {
                action = Some(ViewAction::Navigate(Route::Home));
            }
            if ui.selectable_label(route == Route::Search, "🔍 Search").clicked() {
                action = Some(ViewAction::Navigate(Route::Search));
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if let Some(user) = user {
                if ui.button("Sign out").clicked() {
                    action = Some(ViewAction::SignOut);
                }
                ui.label(format!("👤 {}", user.name));
            }
            if ui.button("⚙").on_hover_text("Settings").clicked() {
                action = Some(ViewAction::OpenSettings);
            }
        });
    });
    action
}

/// Poster image, or a placeholder card with the title
fn poster_tile(
    ui: &mut egui::Ui,
    posters: &mut PosterCache,
    image: Option<&str>,
    title: &str,
    size: egui::Vec2,
) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
    let texture = image.and_then(|url| posters.get(url));

    match texture {
        Some(texture) => {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            ui.painter().image(texture.id(), rect, uv, Color32::WHITE);
        }
        None => {
            ui.painter().rect_filled(rect, 6.0, Color32::from_gray(40));
            let waiting = image.is_some_and(|url| !posters.is_failed(url));
            let text = if waiting { "…".to_string() } else { title.to_string() };
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                text,
                egui::FontId::proportional(14.0),
                Color32::from_gray(180),
            );
        }
    }

    if response.hovered() {
        ui.painter().rect_stroke(rect, 6.0, egui::Stroke::new(2.0, ACCENT), egui::StrokeKind::Inside);
    }
    response.on_hover_text(title)
}

pub fn hero_section(
    ui: &mut egui::Ui,
    posters: &mut PosterCache,
    movies: &[MovieSummary],
    carousel: &mut HeroCarousel,
) -> Option<ViewAction> {
    let movie = movies.get(carousel.index())?;
    let mut action = None;

    egui::Frame::NONE
        .fill(Color32::from_gray(20))
        .inner_margin(egui::Margin::same(24))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                if poster_tile(ui, posters, movie.poster_url.as_deref(), &movie.title, egui::vec2(200.0, 300.0)).clicked() {
                    action = Some(ViewAction::OpenDetail(movie.id.clone()));
                }
                ui.add_space(24.0);

                ui.vertical(|ui| {
                    ui.label(RichText::new(&movie.title).size(32.0).strong());
                    ui.horizontal(|ui| {
                        if let Some(year) = movie.release_year {
                            ui.label(year.to_string());
                        }
                        if let Some(rating) = movie.rating {
                            ui.label(RichText::new(format!("⭐ {}", rating)).color(Color32::GOLD));
                        }
                        if !movie.genre.is_empty() {
                            ui.label(RichText::new(movie.genre.join(" • ")).weak());
                        }
                    });
                    ui.add_space(12.0);
                    ui.add(egui::Label::new(&movie.description).wrap());
                    ui.add_space(16.0);

                    ui.horizontal(|ui| {
                        let play = egui::Button::new(RichText::new("▶ Play").strong().color(Color32::WHITE)).fill(ACCENT);
                        if ui.add(play).clicked() {
                            action = Some(ViewAction::Play(movie.id.clone()));
                        }
                        if ui.button("ℹ More info").clicked() {
                            action = Some(ViewAction::OpenDetail(movie.id.clone()));
                        }
                    });

                    ui.add_space(16.0);
                    ui.horizontal(|ui| {
                        for i in 0..movies.len() {
                            let dot = if i == carousel.index() { "●" } else { "○" };
                            if ui.small_button(dot).clicked() {
                                carousel.select(i, Instant::now());
                            }
                        }
                    });
                });
            });
        });

    action
}

pub fn top_ten_row(ui: &mut egui::Ui, posters: &mut PosterCache, title: &str, items: &[TopTenItem]) -> Option<ViewAction> {
    let mut action = None;
    ui.heading(title);
    egui::ScrollArea::horizontal().id_salt("top_ten_row").show(ui, |ui| {
        ui.horizontal(|ui| {
            for item in items {
                ui.label(RichText::new(item.rank.to_string()).size(72.0).strong().color(Color32::from_gray(90)));
                ui.vertical(|ui| {
                    if poster_tile(ui, posters, item.image.as_deref(), &item.title, CARD_SIZE).clicked() {
                        action = Some(ViewAction::OpenDetail(item.id.clone()));
                    }
                    ui.label(RichText::new(&item.category).small().weak());
                });
                ui.add_space(12.0);
            }
        });
    });
    action
}

pub fn content_row(
    ui: &mut egui::Ui,
    posters: &mut PosterCache,
    title: &str,
    subtitle: Option<&str>,
    items: &[ContentItem],
) -> Option<ViewAction> {
    let mut action = None;
    ui.heading(title);
    if let Some(subtitle) = subtitle {
        ui.label(RichText::new(subtitle).weak());
    }
    egui::ScrollArea::horizontal().id_salt(title).show(ui, |ui| {
        ui.horizontal(|ui| {
            for item in items {
                ui.vertical(|ui| {
                    ui.set_width(CARD_SIZE.x);
                    if poster_tile(ui, posters, item.image.as_deref(), &item.title, CARD_SIZE).clicked() {
                        action = Some(ViewAction::OpenDetail(item.id.clone()));
                    }
                    ui.add(egui::Label::new(RichText::new(&item.title).strong()).truncate());
                    ui.label(RichText::new(format!("{} • ⭐ {}", item.year, item.rating)).small().weak());
                });
            }
        });
    });
    action
}

pub fn call_to_action(ui: &mut egui::Ui) -> Option<ViewAction> {
    let mut action = None;
    ui.vertical_centered(|ui| {
        ui.add_space(24.0);
        ui.label(RichText::new("⭐⭐⭐⭐⭐").color(Color32::GOLD));
        ui.heading("Discover your next favorite movie");
        ui.label(RichText::new("Explore our selection with real data from IMDb").weak());
        ui.add_space(12.0);
        if ui.button("🔍 Search movies").clicked() {
            action = Some(ViewAction::Navigate(Route::Search));
        }
        ui.add_space(24.0);
    });
    action
}

/// Detail window. `open` is cleared when the user closes it.
pub fn detail_modal(
    ctx: &egui::Context,
    posters: &mut PosterCache,
    content: &DetailContent,
    open: &mut bool,
) -> Option<ViewAction> {
    let mut action = None;
    egui::Window::new(RichText::new(&content.title).strong())
        .id(egui::Id::new("movie_detail"))
        .open(open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .min_width(560.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                let _ = poster_tile(ui, posters, content.image.as_deref(), &content.title, CARD_SIZE);
                ui.add_space(16.0);
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(format!("⭐ {}", content.rating)).color(Color32::GOLD));
                        ui.label(&content.year);
                        ui.label(&content.duration);
                    });
                    ui.label(RichText::new(&content.category).weak());
                    ui.add_space(8.0);
                    ui.add(egui::Label::new(&content.description).wrap());
                    ui.add_space(8.0);

                    egui::Grid::new("detail_grid").num_columns(2).spacing([12.0, 4.0]).show(ui, |ui| {
                        ui.label(RichText::new("Director").strong());
                        ui.label(&content.director);
                        ui.end_row();
                        ui.label(RichText::new("Cast").strong());
                        if content.cast.is_empty() {
                            ui.label("N/A");
                        } else {
                            ui.add(egui::Label::new(content.cast.join(", ")).wrap());
                        }
                        ui.end_row();
                    });

                    ui.add_space(12.0);
                    let play = egui::Button::new(RichText::new("▶ Play").strong().color(Color32::WHITE)).fill(ACCENT);
                    if ui.add(play).clicked() {
                        action = Some(ViewAction::Play(content.id.clone()));
                    }
                });
            });
        });
    action
}

pub fn welcome_view(ui: &mut egui::Ui, form: &mut SignInForm) -> Option<ViewAction> {
    let mut action = None;
    ui.vertical_centered(|ui| {
        ui.add_space(100.0);
        ui.label(RichText::new("🎬 CineStream").size(40.0).strong().color(ACCENT));
        ui.add_space(8.0);
        ui.label("Unlimited movies. Sign in to start watching.");
        ui.add_space(24.0);

        ui.allocate_ui(egui::vec2(320.0, 200.0), |ui| {
            ui.vertical(|ui| {
                ui.label("Name");
                let name = ui.add(egui::TextEdit::singleline(&mut form.name).hint_text("Your name").desired_width(f32::INFINITY));
                ui.label("Email (optional)");
                let email = ui.add(egui::TextEdit::singleline(&mut form.email).hint_text("you@example.com").desired_width(f32::INFINITY));
                ui.checkbox(&mut form.remember, "Remember me");
                ui.add_space(8.0);

                let submitted = (name.lost_focus() || email.lost_focus()) && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let button = egui::Button::new(RichText::new("Sign in").strong().color(Color32::WHITE)).fill(ACCENT);
                if ui.add_sized([ui.available_width(), 32.0], button).clicked() || submitted {
                    action = Some(ViewAction::SignIn);
                }
                if let Some(ref error) = form.error {
                    ui.colored_label(Color32::LIGHT_RED, error);
                }
            });
        });
    });
    action
}

pub fn search_bar(ui: &mut egui::Ui, query: &mut String, loading: bool) -> Option<ViewAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        let edit = ui.add(egui::TextEdit::singleline(query).hint_text("Search by title...").desired_width(360.0));
        let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.add_enabled(!loading, egui::Button::new("🔍 Search")).clicked() || submitted {
            action = Some(ViewAction::Search);
        }
        if loading {
            ui.spinner();
        }
    });
    action
}

pub fn loading_view(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(160.0);
        ui.spinner();
    });
}

pub fn empty_view(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(160.0);
        ui.heading("Loading content...");
        ui.label(RichText::new("We're getting the best movies ready for you.").weak());
    });
}

pub fn failed_view(ui: &mut egui::Ui, message: &str) -> Option<ViewAction> {
    let mut action = None;
    ui.vertical_centered(|ui| {
        ui.add_space(160.0);
        ui.heading("Couldn't load movies");
        ui.colored_label(Color32::LIGHT_RED, message);
        ui.add_space(12.0);
        ui.horizontal(|ui| {
            if ui.button("⟳ Retry").clicked() {
                action = Some(ViewAction::Retry);
            }
            if ui.button("⚙ Settings").clicked() {
                action = Some(ViewAction::OpenSettings);
            }
        });
    });
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carousel_rotates_on_interval() {
        let start = Instant::now();
        let mut carousel = HeroCarousel::new(Duration::from_secs(8));

        assert_eq!(carousel.tick(start, 5), Some(Duration::from_secs(8)));
        assert_eq!(carousel.index(), 0);

        carousel.tick(start + Duration::from_secs(8), 5);
        assert_eq!(carousel.index(), 1);

        carousel.tick(start + Duration::from_secs(9), 5);
        assert_eq!(carousel.index(), 1);
    }

    #[test]
    fn test_carousel_wraps_and_selects() {
        let start = Instant::now();
        let mut carousel = HeroCarousel::new(Duration::from_secs(1));
        carousel.select(2, start);
        carousel.tick(start + Duration::from_secs(1), 3);
        assert_eq!(carousel.index(), 0);
    }

    #[test]
    fn test_carousel_idle_with_single_movie() {
        let start = Instant::now();
        let mut carousel = HeroCarousel::new(Duration::from_secs(1));
        carousel.select(3, start);
        assert_eq!(carousel.tick(start + Duration::from_secs(5), 1), None);
        assert_eq!(carousel.index(), 0);
    }
}
