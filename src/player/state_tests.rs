//! Tests for the playback state machine

use super::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct FakeMedia {
    playing: bool,
    muted: bool,
    volume: f32,
    seeks: Vec<f64>,
    stopped: bool,
    queued: Vec<MediaEvent>,
}

impl MediaElement for FakeMedia {
    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek(&mut self, seconds: f64) {
        self.seeks.push(seconds);
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.playing = false;
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        std::mem::take(&mut self.queued)
    }
}

fn ready_player(duration: f64) -> PlayerController<FakeMedia> {
    let mut player = PlayerController::new(FakeMedia::default());
    player.handle_event(MediaEvent::MetadataLoaded { duration });
    player
}

#[test]
fn test_initial_state() {
    let player = PlayerController::new(FakeMedia::default());
    let state = player.state();
    assert!(state.is_loading);
    assert!(!state.is_playing);
    assert!(state.controls_visible);
    assert!(!state.is_muted);
    assert_eq!(state.progress_percent(), 0.0);
    assert!(player.hide_timer().is_none());
}

#[test]
fn test_metadata_ends_loading() {
    let mut player = PlayerController::new(FakeMedia::default());
    player.media_mut().queued.push(MediaEvent::MetadataLoaded { duration: 596.5 });
    player.pump_media();
    assert!(!player.state().is_loading);
    assert_eq!(player.state().duration, 596.5);
    assert_eq!(player.media().volume, 1.0);
}

#[test]
fn test_progress_percentage() {
    let mut player = ready_player(200.0);
    for (t, expected) in [(0.0, 0.0), (50.0, 25.0), (100.0, 50.0), (200.0, 100.0)] {
        player.handle_event(MediaEvent::TimeUpdate(t));
        assert!((player.state().progress_percent() - expected).abs() < 1e-9);
    }
}

#[test]
fn test_progress_zero_without_duration() {
    let state = PlaybackState {
        current_time: 42.0,
        duration: 0.0,
        ..PlaybackState::default()
    };
    assert_eq!(state.progress_percent(), 0.0);
}

#[test]
fn test_toggle_play_drives_media() {
    let now = Instant::now();
    let mut player = ready_player(100.0);

    player.toggle_play(now);
    assert!(player.state().is_playing);
    assert!(player.media().playing);
    // Controls stay up until the inactivity delay elapses
    assert!(player.state().controls_visible);

    player.toggle_play(now);
    assert!(!player.state().is_playing);
    assert!(!player.media().playing);
    assert!(player.hide_timer().is_none());
}

#[test]
fn test_mute_twice_restores_and_mirrors() {
    let mut player = ready_player(100.0);
    let original = player.state().is_muted;

    player.toggle_mute();
    assert_eq!(player.state().is_muted, !original);
    assert_eq!(player.media().is_muted(), player.state().is_muted);

    player.toggle_mute();
    assert_eq!(player.state().is_muted, original);
    assert_eq!(player.media().is_muted(), player.state().is_muted);
}

#[test]
fn test_controls_hide_after_inactivity() {
    let start = Instant::now();
    let mut player = ready_player(100.0);
    player.toggle_play(start);

    player.tick(start + Duration::from_millis(2999));
    assert!(player.state().controls_visible);

    player.tick(start + DEFAULT_HIDE_DELAY);
    assert!(!player.state().controls_visible);
    assert!(player.hide_timer().is_none());
}

#[test]
fn test_pointer_movement_restarts_delay() {
    let start = Instant::now();
    let mut player = ready_player(100.0);
    player.toggle_play(start);

    let moved_at = start + Duration::from_secs(2);
    player.pointer_moved(moved_at);

    // Original deadline has passed, the restarted one has not
    player.tick(start + Duration::from_secs(4));
    assert!(player.state().controls_visible);

    player.tick(moved_at + DEFAULT_HIDE_DELAY);
    assert!(!player.state().controls_visible);
}

#[test]
fn test_pointer_movement_shows_hidden_controls() {
    let start = Instant::now();
    let mut player = ready_player(100.0);
    player.toggle_play(start);
    player.tick(start + DEFAULT_HIDE_DELAY);
    assert!(!player.state().controls_visible);

    let later = start + Duration::from_secs(10);
    player.pointer_moved(later);
    assert!(player.state().controls_visible);
    assert!(player.hide_timer().is_some());
}

#[test]
fn test_controls_stay_visible_while_paused() {
    let start = Instant::now();
    let mut player = ready_player(100.0);
    player.pointer_moved(start);
    assert!(player.hide_timer().is_none());

    player.tick(start + Duration::from_secs(60));
    assert!(player.state().controls_visible);
}

#[test]
fn test_pausing_cancels_pending_hide() {
    let start = Instant::now();
    let mut player = ready_player(100.0);
    player.toggle_play(start);
    player.toggle_play(start + Duration::from_secs(1));

    player.tick(start + Duration::from_secs(5));
    assert!(player.state().controls_visible);
}

#[test]
fn test_pointer_leave_hides_immediately() {
    let start = Instant::now();
    let mut player = ready_player(100.0);
    player.toggle_play(start);
    player.pointer_left();
    assert!(!player.state().controls_visible);
    assert!(player.hide_timer().is_none());
}

#[test]
fn test_custom_hide_delay() {
    let start = Instant::now();
    let mut player = PlayerController::new(FakeMedia::default()).with_hide_delay(Duration::from_secs(1));
    player.handle_event(MediaEvent::MetadataLoaded { duration: 10.0 });
    player.toggle_play(start);
    player.tick(start + Duration::from_secs(1));
    assert!(!player.state().controls_visible);
}

#[test]
fn test_end_of_media_pauses() {
    let start = Instant::now();
    let mut player = ready_player(100.0);
    player.toggle_play(start);
    player.handle_event(MediaEvent::Ended);
    assert!(!player.state().is_playing);
    assert!(player.hide_timer().is_none());

    // Already paused: still paused
    player.handle_event(MediaEvent::Ended);
    assert!(!player.state().is_playing);
}

#[test]
fn test_progress_callback_gets_raw_seconds() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut player = PlayerController::new(FakeMedia::default())
        .with_progress_callback(Box::new(move |t| sink.borrow_mut().push(t)));
    player.handle_event(MediaEvent::MetadataLoaded { duration: 10.0 });

    player.handle_event(MediaEvent::TimeUpdate(1.25));
    player.handle_event(MediaEvent::TimeUpdate(12.0));

    assert_eq!(*seen.borrow(), vec![1.25, 12.0]);
    // Displayed time never passes the duration
    assert_eq!(player.state().current_time, 10.0);
}

#[test]
fn test_late_metadata_clamps_current_time() {
    let mut player = PlayerController::new(FakeMedia::default());
    player.handle_event(MediaEvent::TimeUpdate(50.0));
    assert_eq!(player.state().current_time, 50.0);

    player.handle_event(MediaEvent::MetadataLoaded { duration: 30.0 });
    assert_eq!(player.state().current_time, 30.0);
    assert_eq!(player.state().progress_percent(), 100.0);
}

#[test]
fn test_start_time_seeks_on_metadata() {
    let mut player = PlayerController::new(FakeMedia::default()).with_start_time(42.0);
    assert!(player.media().seeks.is_empty());
    player.handle_event(MediaEvent::MetadataLoaded { duration: 100.0 });
    assert_eq!(player.media().seeks, vec![42.0]);
    assert_eq!(player.state().current_time, 42.0);
}

#[test]
fn test_start_time_outside_media_ignored() {
    let mut player = PlayerController::new(FakeMedia::default()).with_start_time(500.0);
    player.handle_event(MediaEvent::MetadataLoaded { duration: 100.0 });
    assert!(player.media().seeks.is_empty());
    assert_eq!(player.state().current_time, 0.0);
}

#[test]
fn test_skip_is_clamped() {
    let mut player = ready_player(30.0);
    player.handle_event(MediaEvent::TimeUpdate(25.0));
    player.skip(SKIP_SECONDS);
    assert_eq!(player.state().current_time, 30.0);
    player.skip(-100.0);
    assert_eq!(player.state().current_time, 0.0);
    assert_eq!(player.media().seeks, vec![30.0, 0.0]);
}

#[test]
fn test_skip_ignored_while_loading() {
    let mut player = PlayerController::new(FakeMedia::default());
    player.skip(SKIP_SECONDS);
    assert!(player.media().seeks.is_empty());
}

#[test]
fn test_media_error() {
    let start = Instant::now();
    let mut player = PlayerController::new(FakeMedia::default());
    player.handle_event(MediaEvent::Error("404 Not Found".to_string()));
    assert!(!player.state().is_loading);
    assert_eq!(player.state().error.as_deref(), Some("404 Not Found"));

    player.toggle_play(start);
    assert!(!player.state().is_playing);
    assert!(!player.media().playing);
}

#[test]
fn test_close_releases_media_and_timer() {
    let start = Instant::now();
    let mut player = ready_player(100.0);
    player.toggle_play(start);
    player.close();
    assert!(player.is_closed());
    assert!(player.media().stopped);
    assert!(player.hide_timer().is_none());
    assert!(!player.state().is_playing);
}

#[test]
fn test_format_clock() {
    assert_eq!(format_clock(0.0), "0:00");
    assert_eq!(format_clock(9.7), "0:09");
    assert_eq!(format_clock(61.0), "1:01");
    assert_eq!(format_clock(3599.0), "59:59");
    assert_eq!(format_clock(3725.0), "1:02:05");
    assert_eq!(format_clock(f64::NAN), "0:00");
}
