// Built-in media backend using ffmpeg-next
// Requires FFmpeg libraries: libavcodec, libavformat, libavutil, libswscale
//
// To install FFmpeg development libraries:
// - Ubuntu/Debian: sudo apt install libavcodec-dev libavformat-dev libavutil-dev libswscale-dev libavdevice-dev
// - Fedora: sudo dnf install ffmpeg-devel
// - macOS: brew install ffmpeg
// - Windows: Download from https://ffmpeg.org and set FFMPEG_DIR environment variable

#[cfg(feature = "internal-player")]
mod backend_impl {
    use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::{Duration, Instant};

    extern crate ffmpeg_next as ffmpeg;
    use ffmpeg::format::Pixel;
    use ffmpeg::media::Type;
    use ffmpeg::software::scaling::{context::Context as ScalingContext, flag::Flags};
    use ffmpeg::util::frame::video::Video as VideoFrame;

    use crate::player::media::{DecodedFrame, MediaElement, MediaEvent};

    /// AV_TIME_BASE: container timestamps are in microseconds
    const TIME_BASE_US: f64 = 1_000_000.0;
    /// Browsers fire timeupdate roughly four times a second
    const TIME_UPDATE_INTERVAL: Duration = Duration::from_millis(250);

    /// Commands to send to the decode thread
    enum PlayerCommand {
        Stop,
        Pause,
        Resume,
        Seek(f64),
    }

    pub struct FfmpegMedia {
        command_sender: Option<Sender<PlayerCommand>>,
        event_receiver: Option<Receiver<MediaEvent>>,
        current_frame: Arc<Mutex<Option<DecodedFrame>>>,
        volume: f32,
        muted: bool,
    }

    impl FfmpegMedia {
        /// Open `url` on a background thread. Playback starts paused; the
        /// first event is `MetadataLoaded` (or `Error`).
        pub fn open(url: &str, user_agent: &str) -> Self {
            if let Err(e) = ffmpeg::init() {
                log::warn!("FFmpeg init failed: {}", e);
            }

            let (cmd_tx, cmd_rx) = channel();
            let (event_tx, event_rx) = channel();
            let current_frame = Arc::new(Mutex::new(None));

            let url = url.to_string();
            let user_agent = user_agent.to_string();
            let frame_slot = Arc::clone(&current_frame);
            thread::spawn(move || {
                decode_thread(url, user_agent, frame_slot, cmd_rx, event_tx);
            });

            Self {
                command_sender: Some(cmd_tx),
                event_receiver: Some(event_rx),
                current_frame,
                volume: 1.0,
                muted: false,
            }
        }

        fn send(&self, command: PlayerCommand) {
            if let Some(ref sender) = self.command_sender {
                let _ = sender.send(command);
            }
        }
    }

    impl MediaElement for FfmpegMedia {
        fn play(&mut self) {
            self.send(PlayerCommand::Resume);
        }

        fn pause(&mut self) {
            self.send(PlayerCommand::Pause);
        }

        fn seek(&mut self, seconds: f64) {
            self.send(PlayerCommand::Seek(seconds.max(0.0)));
        }

        // Video-only decoding; mute and volume are tracked for the UI
        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn is_muted(&self) -> bool {
            self.muted
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume.clamp(0.0, 1.0);
        }

        fn stop(&mut self) {
            self.send(PlayerCommand::Stop);
            self.command_sender = None;
            self.event_receiver = None;
            if let Ok(mut slot) = self.current_frame.lock() {
                *slot = None;
            }
        }

        fn poll_events(&mut self) -> Vec<MediaEvent> {
            let mut events = Vec::new();
            if let Some(ref receiver) = self.event_receiver {
                loop {
                    match receiver.try_recv() {
                        Ok(event) => events.push(event),
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            self.event_receiver = None;
                            break;
                        }
                    }
                }
            }
            events
        }

        fn take_frame(&mut self) -> Option<DecodedFrame> {
            self.current_frame.lock().ok().and_then(|mut slot| slot.take())
        }
    }

    impl Drop for FfmpegMedia {
        fn drop(&mut self) {
            self.stop();
        }
    }

    fn fail(events: &Sender<MediaEvent>, message: String) {
        log::error!("{}", message);
        let _ = events.send(MediaEvent::Error(message));
    }

    fn decode_thread(
        url: String,
        user_agent: String,
        current_frame: Arc<Mutex<Option<DecodedFrame>>>,
        cmd_rx: Receiver<PlayerCommand>,
        events: Sender<MediaEvent>,
    ) {
        // Set options for network streams
        let mut options = ffmpeg::Dictionary::new();
        options.set("user_agent", &user_agent);
        options.set("reconnect", "1");
        options.set("reconnect_streamed", "1");
        options.set("reconnect_delay_max", "5");
        options.set("timeout", "5000000"); // 5 second timeout

        let mut ictx = match ffmpeg::format::input_with_dictionary(&url, options) {
            Ok(ctx) => ctx,
            Err(e) => return fail(&events, format!("Failed to open media: {}", e)),
        };

        let (video_stream_index, time_base, parameters) = match ictx.streams().best(Type::Video) {
            Some(stream) => (stream.index(), f64::from(stream.time_base()), stream.parameters()),
            None => return fail(&events, "No video stream found".to_string()),
        };

        let mut decoder = match ffmpeg::codec::context::Context::from_parameters(parameters)
            .and_then(|ctx| ctx.decoder().video())
        {
            Ok(d) => d,
            Err(e) => return fail(&events, format!("Failed to create decoder: {}", e)),
        };

        let width = decoder.width();
        let height = decoder.height();

        // Scale to reasonable size if too large
        let (target_width, target_height) = if width > 1280 || height > 720 {
            let scale = f64::min(1280.0 / width as f64, 720.0 / height as f64);
            ((width as f64 * scale) as u32, (height as f64 * scale) as u32)
        } else {
            (width, height)
        };

        let mut scaler = match ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            target_width,
            target_height,
            Flags::BILINEAR,
        ) {
            Ok(s) => s,
            Err(e) => return fail(&events, format!("Failed to create scaler: {}", e)),
        };

        let duration = if ictx.duration() > 0 {
            ictx.duration() as f64 / TIME_BASE_US
        } else {
            0.0
        };
        log::info!("Opened {} ({}x{}, {:.1}s)", url, width, height, duration);
        let _ = events.send(MediaEvent::MetadataLoaded { duration });

        let mut paused = true;
        let mut ended = false;
        // (wall clock, media time) pair frames are paced against
        let mut clock: Option<(Instant, f64)> = None;
        let mut last_time_update: Option<Instant> = None;

        loop {
            loop {
                match cmd_rx.try_recv() {
                    Ok(PlayerCommand::Stop) | Err(TryRecvError::Disconnected) => return,
                    Ok(PlayerCommand::Pause) => {
                        paused = true;
                        clock = None;
                    }
                    Ok(PlayerCommand::Resume) => {
                        if ended {
                            // Replay from the start, like a browser <video>
                            let _ = ictx.seek(0, ..0);
                            decoder.flush();
                            ended = false;
                        }
                        paused = false;
                    }
                    Ok(PlayerCommand::Seek(seconds)) => {
                        let ts = (seconds * TIME_BASE_US) as i64;
                        match ictx.seek(ts, ..ts) {
                            Ok(()) => {
                                decoder.flush();
                                clock = None;
                                ended = false;
                                let _ = events.send(MediaEvent::TimeUpdate(seconds));
                            }
                            Err(e) => log::warn!("Seek to {:.1}s failed: {}", seconds, e),
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                }
            }

            if paused {
                thread::sleep(Duration::from_millis(50));
                continue;
            }

            let (stream_index, packet) = match ictx.packets().next() {
                Some((stream, packet)) => (stream.index(), packet),
                None => {
                    ended = true;
                    paused = true;
                    clock = None;
                    let _ = events.send(MediaEvent::Ended);
                    continue;
                }
            };

            // Only process video packets
            if stream_index != video_stream_index {
                continue;
            }

            if decoder.send_packet(&packet).is_err() {
                continue;
            }

            let mut decoded = VideoFrame::empty();
            while decoder.receive_frame(&mut decoded).is_ok() {
                let mut rgb_frame = VideoFrame::empty();
                if scaler.run(&decoded, &mut rgb_frame).is_err() {
                    continue;
                }

                let data = rgb_frame.data(0);
                let stride = rgb_frame.stride(0);

                // Copy frame data (handling stride)
                let mut frame_data = Vec::with_capacity((target_width * target_height * 3) as usize);
                for y in 0..target_height as usize {
                    let row_start = y * stride;
                    let row_end = row_start + (target_width as usize * 3);
                    frame_data.extend_from_slice(&data[row_start..row_end]);
                }

                let pts = decoded.pts().unwrap_or(0);
                let position = pts as f64 * time_base;

                // Pace frames against the wall clock
                let (origin, origin_position) = *clock.get_or_insert((Instant::now(), position));
                let target = origin + Duration::from_secs_f64((position - origin_position).max(0.0));
                let now = Instant::now();
                if target > now {
                    thread::sleep(target - now);
                }

                if let Ok(mut slot) = current_frame.lock() {
                    *slot = Some(DecodedFrame {
                        width: target_width,
                        height: target_height,
                        data: frame_data,
                        pts,
                    });
                }

                let due = last_time_update.map_or(true, |t| t.elapsed() >= TIME_UPDATE_INTERVAL);
                if due {
                    last_time_update = Some(Instant::now());
                    let _ = events.send(MediaEvent::TimeUpdate(position));
                }
            }
        }
    }
}

// Stub implementation when internal-player feature is disabled
#[cfg(not(feature = "internal-player"))]
mod backend_impl {
    use crate::player::media::{MediaElement, MediaEvent};

    pub struct FfmpegMedia {
        pending_error: Option<String>,
        muted: bool,
    }

    impl FfmpegMedia {
        pub fn open(url: &str, _user_agent: &str) -> Self {
            log::warn!("Cannot play {}: built without internal-player", url);
            Self {
                pending_error: Some(
                    "Internal player not enabled. Build with --features internal-player".to_string(),
                ),
                muted: false,
            }
        }
    }

    impl MediaElement for FfmpegMedia {
        fn play(&mut self) {}
        fn pause(&mut self) {}
        fn seek(&mut self, _seconds: f64) {}
        fn set_muted(&mut self, muted: bool) { self.muted = muted; }
        fn is_muted(&self) -> bool { self.muted }
        fn set_volume(&mut self, _volume: f32) {}
        fn stop(&mut self) {}

        fn poll_events(&mut self) -> Vec<MediaEvent> {
            self.pending_error.take().map(MediaEvent::Error).into_iter().collect()
        }
    }
}

pub use backend_impl::FfmpegMedia;
