//! Video player overlay
//!
//! `state` holds the playback state machine, `media` the backend seam,
//! `ffmpeg` the built-in backend and `overlay` the egui surface.

pub mod ffmpeg;
pub mod media;
mod overlay;
mod state;

pub use overlay::{VideoPlayer, VideoPlayerProps};
