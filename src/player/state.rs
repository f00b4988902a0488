//! Playback state machine behind the player overlay.
//!
//! The controller owns the media element and a [`PlaybackState`]. All input
//! (button presses, pointer movement, media notifications, frame ticks) goes
//! through it, which keeps the overlay's drawing code free of state logic and
//! lets the transitions be tested without a window.

use std::time::{Duration, Instant};

use crate::player::media::{MediaElement, MediaEvent};
use crate::timer::{self, Deadline};

pub const DEFAULT_HIDE_DELAY: Duration = Duration::from_secs(3);
pub const SKIP_SECONDS: f64 = 10.0;

/// UI-facing playback state. Flags compose; they are not an exclusive enum.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub is_muted: bool,
    pub volume: f32,
    pub controls_visible: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            is_muted: false,
            volume: 1.0,
            controls_visible: true,
            is_loading: true,
            error: None,
        }
    }
}

impl PlaybackState {
    /// Elapsed share in percent, 0 while the duration is unknown
    pub fn progress_percent(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration) * 100.0
        } else {
            0.0
        }
    }
}

pub type ProgressCallback = Box<dyn FnMut(f64)>;

pub struct PlayerController<M: MediaElement> {
    media: M,
    state: PlaybackState,
    hide_timer: Option<Deadline>,
    hide_delay: Duration,
    start_time: f64,
    on_progress: Option<ProgressCallback>,
    closed: bool,
}

impl<M: MediaElement> PlayerController<M> {
    pub fn new(media: M) -> Self {
        Self {
            media,
            state: PlaybackState::default(),
            hide_timer: None,
            hide_delay: DEFAULT_HIDE_DELAY,
            start_time: 0.0,
            on_progress: None,
            closed: false,
        }
    }

    pub fn with_hide_delay(mut self, delay: Duration) -> Self {
        self.hide_delay = delay;
        self
    }

    /// Offset to seek to once the media's duration is known
    pub fn with_start_time(mut self, seconds: f64) -> Self {
        self.start_time = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn hide_timer(&self) -> Option<&Deadline> {
        self.hide_timer.as_ref()
    }

    fn arm_hide_timer(&mut self, now: Instant) {
        self.hide_timer = if self.state.is_playing {
            Some(Deadline::after(now, self.hide_delay))
        } else {
            None
        };
    }

    pub fn toggle_play(&mut self, now: Instant) {
        if self.closed || self.state.error.is_some() {
            return;
        }
        if self.state.is_playing {
            self.media.pause();
            self.state.is_playing = false;
        } else {
            self.media.play();
            self.state.is_playing = true;
        }
        self.arm_hide_timer(now);
    }

    pub fn toggle_mute(&mut self) {
        self.state.is_muted = !self.state.is_muted;
        self.media.set_muted(self.state.is_muted);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.state.volume = volume.clamp(0.0, 1.0);
        self.media.set_volume(self.state.volume);
    }

    /// Relative seek, clamped to the media bounds
    pub fn skip(&mut self, delta: f64) {
        if self.state.is_loading || self.state.duration <= 0.0 {
            return;
        }
        let target = (self.state.current_time + delta).clamp(0.0, self.state.duration);
        self.media.seek(target);
        self.state.current_time = target;
    }

    pub fn pointer_moved(&mut self, now: Instant) {
        self.state.controls_visible = true;
        self.arm_hide_timer(now);
    }

    pub fn pointer_left(&mut self) {
        self.state.controls_visible = false;
        self.hide_timer = None;
    }

    /// Advance timers. Call once per frame.
    pub fn tick(&mut self, now: Instant) {
        if timer::take_if_due(&mut self.hide_timer, now) && self.state.is_playing {
            self.state.controls_visible = false;
        }
    }

    /// Pull media notifications and apply them
    pub fn pump_media(&mut self) {
        for event in self.media.poll_events() {
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::MetadataLoaded { duration } => {
                self.state.is_loading = false;
                self.state.duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
                if self.state.duration > 0.0 {
                    self.state.current_time = self.state.current_time.min(self.state.duration);
                }
                self.media.set_volume(self.state.volume);
                self.media.set_muted(self.state.is_muted);

                if self.start_time > 0.0 && self.start_time < self.state.duration {
                    log::debug!("Resuming at {:.1}s", self.start_time);
                    self.media.seek(self.start_time);
                    self.state.current_time = self.start_time;
                }
            }
            MediaEvent::TimeUpdate(seconds) => {
                self.state.current_time = if self.state.duration > 0.0 {
                    seconds.clamp(0.0, self.state.duration)
                } else {
                    seconds.max(0.0)
                };
                if let Some(ref mut callback) = self.on_progress {
                    callback(seconds);
                }
            }
            MediaEvent::Ended => {
                self.state.is_playing = false;
                self.hide_timer = None;
            }
            MediaEvent::Error(message) => {
                log::error!("Playback error: {}", message);
                self.state.error = Some(message);
                self.state.is_loading = false;
                self.state.is_playing = false;
                self.state.controls_visible = true;
                self.hide_timer = None;
            }
        }
    }

    /// Tear down: cancel the timer and release the media
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.hide_timer = None;
        self.state.is_playing = false;
        self.media.stop();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<M: MediaElement> Drop for PlayerController<M> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Elapsed/total readout: "m:ss", or "h:mm:ss" from one hour up
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 { seconds.floor() as u64 } else { 0 };
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
