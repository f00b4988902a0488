//! Seam between the overlay and whatever actually plays the media

/// Decoded video frame for rendering
pub struct DecodedFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGB24 data
    pub pts: i64,
}

/// Notifications from the playback backend
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Metadata is known; duration in seconds (0 for live/unknown)
    MetadataLoaded { duration: f64 },
    /// Playback position in seconds
    TimeUpdate(f64),
    Ended,
    Error(String),
}

/// Media element the overlay drives. Implementations report progress
/// asynchronously through `poll_events`.
pub trait MediaElement {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    fn set_muted(&mut self, muted: bool);
    fn is_muted(&self) -> bool;
    fn set_volume(&mut self, volume: f32);
    fn stop(&mut self);

    /// Drain pending notifications
    fn poll_events(&mut self) -> Vec<MediaEvent>;

    /// Latest frame not yet handed out
    fn take_frame(&mut self) -> Option<DecodedFrame> {
        None
    }
}

impl<M: MediaElement + ?Sized> MediaElement for Box<M> {
    fn play(&mut self) {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn seek(&mut self, seconds: f64) {
        (**self).seek(seconds)
    }

    fn set_muted(&mut self, muted: bool) {
        (**self).set_muted(muted)
    }

    fn is_muted(&self) -> bool {
        (**self).is_muted()
    }

    fn set_volume(&mut self, volume: f32) {
        (**self).set_volume(volume)
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        (**self).poll_events()
    }

    fn take_frame(&mut self) -> Option<DecodedFrame> {
        (**self).take_frame()
    }
}
