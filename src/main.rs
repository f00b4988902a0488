//! CineStream - desktop movie streaming client
//! Browse movies from OMDb and watch them in the built-in player overlay

// Hide console window on Windows release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Use mimalloc for faster memory allocation (Linux, macOS)
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

mod api;
mod catalog;
mod config;
mod error;
mod fetch;
mod models;
mod player;
mod posters;
mod progress;
mod session;
mod timer;
mod views;

use api::{MetadataProvider, OmdbClient};
use catalog::HomeScreen;
use config::AppConfig;
use fetch::{FetchStatus, MovieFetcher};
use models::{DetailContent, MovieSummary, Route};
use player::{VideoPlayer, VideoPlayerProps};
use posters::PosterCache;
use progress::ProgressStore;
use session::{Session, SessionProvider};
use views::{HeroCarousel, SignInForm, ViewAction};

/// Load application icon: rounded red tile with a white play triangle
fn load_icon() -> egui::IconData {
    let size: usize = 64;
    let mut rgba = vec![0u8; size * size * 4];

    for y in 0..size {
        for x in 0..size {
            let idx = (y * size + x) * 4;

            // Normalize coordinates to 0.0-1.0
            let nx = x as f32 / size as f32;
            let ny = y as f32 / size as f32;

            let corner_radius = 0.18;
            let in_rounded_rect = {
                let dx = (corner_radius - nx).max(nx - (1.0 - corner_radius)).max(0.0);
                let dy = (corner_radius - ny).max(ny - (1.0 - corner_radius)).max(0.0);
                dx * dx + dy * dy <= corner_radius * corner_radius
            };
            if !in_rounded_rect {
                continue; // transparent
            }

            // Play triangle pointing right, centred
            let px = nx - 0.36;
            let py = ny - 0.5;
            let in_play = px >= 0.0 && px <= 0.34 && py.abs() <= (0.34 - px) * 0.6;

            let (r, g, b) = if in_play {
                (255, 255, 255)
            } else {
                // Red gradient background (#e50914 to #8b0000)
                let t = nx * 0.5 + ny * 0.5;
                ((229.0 - 90.0 * t) as u8, (9.0 * (1.0 - t)) as u8, (20.0 * (1.0 - t)) as u8)
            };
            rgba[idx] = r;
            rgba[idx + 1] = g;
            rgba[idx + 2] = b;
            rgba[idx + 3] = 255;
        }
    }

    egui::IconData {
        rgba,
        width: size as u32,
        height: size as u32,
    }
}

/// Add a system emoji font so titles and icons render
fn install_emoji_font(ctx: &egui::Context) {
    let candidates: &[&str] = if cfg!(target_os = "windows") {
        &["C:\\Windows\\Fonts\\seguiemj.ttf"]
    } else if cfg!(target_os = "macos") {
        &["/System/Library/Fonts/Apple Color Emoji.ttc"]
    } else {
        &[
            "/usr/share/fonts/truetype/noto/NotoColorEmoji.ttf",
            "/usr/share/fonts/noto-emoji/NotoColorEmoji.ttf",
            "/usr/share/fonts/google-noto-emoji/NotoColorEmoji.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        ]
    };

    let mut fonts = egui::FontDefinitions::default();
    for path in candidates {
        if let Ok(font_data) = std::fs::read(path) {
            fonts.font_data.insert(
                "emoji".to_owned(),
                egui::FontData::from_owned(font_data).into(),
            );
            fonts.families
                .entry(egui::FontFamily::Proportional)
                .or_default()
                .push("emoji".to_owned());
            log::debug!("Loaded emoji font {}", path);
            break;
        }
    }
    ctx.set_fonts(fonts);
}

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([960.0, 600.0])
            .with_icon(load_icon()),
        vsync: true,
        hardware_acceleration: eframe::HardwareAcceleration::Preferred,
        ..Default::default()
    };

    eframe::run_native(
        "CineStream",
        options,
        Box::new(|cc| {
            install_emoji_font(&cc.egui_ctx);
            let app = CineApp::new();
            app.apply_theme(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
}

/// Messages from the player overlay callbacks
enum AppMessage {
    PlayerProgress { key: String, title: String, position: f64 },
    PlayerClosed,
}

fn metadata_provider(config: &AppConfig) -> Arc<dyn MetadataProvider> {
    Arc::new(
        OmdbClient::new(&config.omdb_base_url, config.api_key())
            .with_user_agent(&config.user_agent)
            .with_popular_ids(&config.popular_ids),
    )
}

struct CineApp {
    route: Route,
    session: Session,
    sign_in: SignInForm,
    status_message: String,

    // Data
    popular: MovieFetcher,
    popular_requested: bool,
    search: MovieFetcher,
    search_query: String,
    posters: PosterCache,
    carousel: HeroCarousel,

    // Modal and player
    detail: Option<DetailContent>,
    player: Option<VideoPlayer>,
    progress: ProgressStore,
    message_sender: Sender<AppMessage>,
    message_receiver: Receiver<AppMessage>,

    // Settings
    config: AppConfig,
    show_settings: bool,
    api_key_input: String,
}

impl CineApp {
    fn new() -> Self {
        let config = AppConfig::load();
        let provider = metadata_provider(&config);
        let (message_sender, message_receiver) = channel();

        let saved_user = if config.remember_session { config.saved_user.clone() } else { None };
        let route = if saved_user.is_some() { Route::Home } else { Route::Welcome };
        if let Some(ref user) = saved_user {
            log::info!("Restored session for {}", user.name);
        }

        Self {
            route,
            session: Session::new(saved_user),
            sign_in: SignInForm {
                remember: config.remember_session,
                ..SignInForm::default()
            },
            status_message: "Ready".to_string(),
            popular: MovieFetcher::new(Arc::clone(&provider)),
            popular_requested: false,
            search: MovieFetcher::new(provider),
            search_query: String::new(),
            posters: PosterCache::new(&config.user_agent),
            carousel: HeroCarousel::new(Duration::from_secs_f32(config.hero_rotate_secs.max(1.0))),
            detail: None,
            player: None,
            progress: ProgressStore::new(config.watch_progress()),
            message_sender,
            message_receiver,
            api_key_input: config.omdb_api_key.clone(),
            show_settings: false,
            config,
        }
    }

    fn apply_theme(&self, ctx: &egui::Context) {
        ctx.set_visuals(if self.config.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });
    }

    fn find_movie(&self, id: &str) -> Option<&MovieSummary> {
        self.popular
            .movies()
            .iter()
            .chain(self.search.movies())
            .find(|m| m.id == id)
    }

    fn navigate(&mut self, route: Route) {
        if route != Route::Home {
            self.carousel.stop();
        }
        self.route = route;
    }

    fn open_player(&mut self, movie_id: &str) {
        let Some(movie) = self.find_movie(movie_id) else {
            log::warn!("Play requested for unknown movie {}", movie_id);
            return;
        };
        let title = movie.title.clone();
        let key = movie.id.clone();

        let progress_sender = self.message_sender.clone();
        let close_sender = self.message_sender.clone();
        let (progress_key, progress_title) = (key.clone(), title.clone());

        let mut props = VideoPlayerProps::new(&title);
        props.start_time = self.progress.resume_position(&key);
        props.on_progress = Some(Box::new(move |position| {
            let _ = progress_sender.send(AppMessage::PlayerProgress {
                key: progress_key.clone(),
                title: progress_title.clone(),
                position,
            });
        }));
        props.on_close = Some(Box::new(move || {
            let _ = close_sender.send(AppMessage::PlayerClosed);
        }));

        self.detail = None;
        self.carousel.stop();
        self.player = Some(VideoPlayer::open(
            props,
            &self.config.demo_video_url,
            &self.config.user_agent,
            Duration::from_secs_f32(self.config.controls_hide_secs.max(0.5)),
        ));
        self.status_message = format!("Playing {}", title);
    }

    fn process_messages(&mut self) {
        while let Ok(message) = self.message_receiver.try_recv() {
            match message {
                AppMessage::PlayerProgress { key, title, position } => {
                    let duration = self.player.as_ref().map_or(0.0, |p| p.state().duration);
                    self.progress.record(&key, &title, position, duration);
                }
                AppMessage::PlayerClosed => {
                    if let Some(player) = self.player.take() {
                        log::info!("Closed player for {} ({})", player.title(), player.url());
                    }
                    self.progress.mark_dirty();
                    self.status_message = "Ready".to_string();
                }
            }
        }

        if self.progress.take_dirty() {
            self.config.set_watch_progress(self.progress.entries());
            self.config.save();
        }
    }

    fn sign_in(&mut self) {
        let result = self
            .session
            .sign_in(&self.sign_in.name, &self.sign_in.email)
            .map(|_| ());

        match result {
            Ok(()) => {
                self.config.remember_session = self.sign_in.remember;
                self.config.saved_user = session::remembered_user(&self.session, self.config.remember_session);
                self.config.save();
                self.sign_in = SignInForm {
                    remember: self.config.remember_session,
                    ..SignInForm::default()
                };
                self.popular_requested = false;
                self.navigate(Route::Home);
            }
            Err(message) => self.sign_in.error = Some(message),
        }
    }

    fn sign_out(&mut self) {
        self.session.sign_out();
        self.config.saved_user = None;
        self.config.save();
        self.detail = None;
        self.navigate(Route::Welcome);
    }

    fn save_settings(&mut self, ctx: &egui::Context) {
        self.config.omdb_api_key = self.api_key_input.trim().to_string();
        self.config.saved_user = session::remembered_user(&self.session, self.config.remember_session);
        self.config.save();
        self.apply_theme(ctx);

        let provider = metadata_provider(&self.config);
        self.popular.set_provider(Arc::clone(&provider));
        self.search.set_provider(provider);
        if matches!(self.popular.status(), FetchStatus::Failed(_)) {
            self.popular.get_popular_movies();
        }
        self.status_message = "Settings saved".to_string();
    }

    fn apply(&mut self, action: ViewAction) {
        match action {
            ViewAction::Navigate(route) => self.navigate(route),
            ViewAction::OpenDetail(id) => {
                self.detail = self.find_movie(&id).map(catalog::to_detail);
            }
            ViewAction::Play(id) => self.open_player(&id),
            ViewAction::SignIn => self.sign_in(),
            ViewAction::SignOut => self.sign_out(),
            ViewAction::Retry => self.popular.get_popular_movies(),
            ViewAction::Search => {
                let query = self.search_query.clone();
                self.search.search(&query);
            }
            ViewAction::OpenSettings => {
                self.api_key_input = self.config.omdb_api_key.clone();
                self.show_settings = true;
            }
        }
    }

    fn show_home(&mut self, ui: &mut egui::Ui, actions: &mut Vec<ViewAction>) {
        if !self.popular_requested {
            self.popular_requested = true;
            self.popular.get_popular_movies();
        }

        match catalog::compose_home(&self.session, &self.popular) {
            HomeScreen::Redirect => {
                self.navigate(Route::Welcome);
            }
            HomeScreen::Spinner => views::loading_view(ui),
            HomeScreen::Empty => views::empty_view(ui),
            HomeScreen::Failed(message) => actions.extend(views::failed_view(ui, &message)),
            HomeScreen::Catalog(catalog) => {
                if let Some(wait) = self.carousel.tick(Instant::now(), catalog.hero.len()) {
                    ui.ctx().request_repaint_after(wait);
                }

                egui::ScrollArea::vertical().show(ui, |ui| {
                    actions.extend(views::hero_section(ui, &mut self.posters, &catalog.hero, &mut self.carousel));
                    ui.add_space(24.0);
                    actions.extend(views::top_ten_row(ui, &mut self.posters, "Top 10", &catalog.top_ten));
                    ui.add_space(24.0);
                    actions.extend(views::content_row(
                        ui,
                        &mut self.posters,
                        "Popular Movies",
                        Some("The best movies according to OMDb"),
                        &catalog.popular,
                    ));
                    ui.add_space(24.0);
                    actions.extend(views::call_to_action(ui));
                });
            }
        }
    }

    fn show_search(&mut self, ui: &mut egui::Ui, actions: &mut Vec<ViewAction>) {
        ui.add_space(12.0);
        actions.extend(views::search_bar(ui, &mut self.search_query, self.search.is_loading()));
        ui.add_space(12.0);

        match self.search.status() {
            FetchStatus::Idle => {
                ui.label(egui::RichText::new("Type a title and press Enter").weak());
            }
            FetchStatus::Loading if self.search.movies().is_empty() => views::loading_view(ui),
            FetchStatus::Empty => {
                ui.label(format!("No movies found for \"{}\"", self.search.query()));
            }
            FetchStatus::Failed(message) => {
                ui.colored_label(egui::Color32::LIGHT_RED, format!("Search failed: {}", message));
            }
            FetchStatus::Loading | FetchStatus::Loaded => {
                let items: Vec<_> = self.search.movies().iter().map(catalog::to_content_item).collect();
                let heading = format!("Results ({})", items.len());
                actions.extend(views::content_row(ui, &mut self.posters, &heading, None, &items));
            }
        }
    }

    fn show_settings_window(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings;
        let mut save = false;

        egui::Window::new("⚙ Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .min_width(420.0)
            .show(ctx, |ui| {
                ui.label("OMDb API key:");
                ui.add(egui::TextEdit::singleline(&mut self.api_key_input)
                    .password(true)
                    .hint_text("Get one at omdbapi.com")
                    .desired_width(f32::INFINITY));
                ui.label(egui::RichText::new("[i] The OMDB_API_KEY environment variable overrides this on start").weak());
                ui.separator();

                ui.checkbox(&mut self.config.dark_mode, "Dark mode");
                ui.checkbox(&mut self.config.remember_session, "Remember me on this computer");
                ui.horizontal(|ui| {
                    ui.label("Hide player controls after");
                    ui.add(egui::DragValue::new(&mut self.config.controls_hide_secs).range(1.0..=30.0).suffix(" s"));
                });
                ui.separator();

                ui.horizontal(|ui| {
                    if ui.button("Save & Close").clicked() {
                        save = true;
                    }
                    if ui.button("Clear watch history").clicked() {
                        self.progress = ProgressStore::default();
                        self.progress.mark_dirty();
                    }
                });
            });

        if save {
            self.save_settings(ctx);
            open = false;
        }
        self.show_settings = open;
    }
}

impl eframe::App for CineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_messages();
        let mut changed = self.popular.poll();
        changed |= self.search.poll();
        changed |= self.posters.poll(ctx);

        // The overlay covers the whole window while it is open
        if let Some(player) = self.player.as_mut() {
            player.show(ctx);
        }
        if self.player.is_some() {
            self.process_messages();
            if self.player.is_none() {
                ctx.request_repaint();
            }
            return;
        }

        if self.route != Route::Welcome && !self.session.is_signed_in() {
            self.navigate(Route::Welcome);
        } else if self.route == Route::Welcome && self.session.is_signed_in() {
            self.navigate(Route::Home);
        }

        let mut actions = Vec::new();

        egui::TopBottomPanel::top("navbar").show(ctx, |ui| {
            ui.add_space(6.0);
            actions.extend(views::navbar(ui, self.session.current_user(), self.route));
            ui.add_space(6.0);
        });

        // Bottom panel - Status
        egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.popular.is_loading() || self.search.is_loading() {
                    ui.spinner();
                }
                ui.label(&self.status_message);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.route {
            Route::Welcome => actions.extend(views::welcome_view(ui, &mut self.sign_in)),
            Route::Home => self.show_home(ui, &mut actions),
            Route::Search => self.show_search(ui, &mut actions),
        });

        if let Some(detail) = self.detail.clone() {
            let mut open = true;
            actions.extend(views::detail_modal(ctx, &mut self.posters, &detail, &mut open));
            if !open {
                self.detail = None;
            }
        }

        if self.show_settings {
            self.show_settings_window(ctx);
        }

        for action in actions {
            self.apply(action);
        }

        // Background work reports through channels; keep polling while it runs
        if changed {
            ctx.request_repaint();
        } else if self.popular.is_loading() || self.search.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else {
            ctx.request_repaint_after(Duration::from_millis(500));
        }
    }
}
