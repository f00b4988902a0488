//! Poster images: downloaded on worker threads, uploaded as textures on the UI thread

use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use std::time::Duration;

use eframe::egui;

/// Posters larger than this are downscaled before upload
const MAX_POSTER_HEIGHT: u32 = 450;

enum PosterSlot {
    Pending,
    Ready(egui::TextureHandle),
    Failed,
}

struct DecodedPoster {
    url: String,
    result: Result<egui::ColorImage, String>,
}

pub struct PosterCache {
    slots: HashMap<String, PosterSlot>,
    sender: Sender<DecodedPoster>,
    receiver: Receiver<DecodedPoster>,
    agent: ureq::Agent,
    user_agent: String,
}

impl PosterCache {
    pub fn new(user_agent: &str) -> Self {
        let (sender, receiver) = channel();
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(20)))
            .timeout_connect(Some(Duration::from_secs(10)))
            .build()
            .new_agent();

        Self {
            slots: HashMap::new(),
            sender,
            receiver,
            agent,
            user_agent: user_agent.to_string(),
        }
    }

    /// Texture for `url`, starting a download the first time it is asked for
    pub fn get(&mut self, url: &str) -> Option<&egui::TextureHandle> {
        if !self.slots.contains_key(url) {
            self.request(url);
        }
        match self.slots.get(url) {
            Some(PosterSlot::Ready(texture)) => Some(texture),
            _ => None,
        }
    }

    pub fn is_failed(&self, url: &str) -> bool {
        matches!(self.slots.get(url), Some(PosterSlot::Failed))
    }

    fn request(&mut self, url: &str) {
        self.slots.insert(url.to_string(), PosterSlot::Pending);

        let url = url.to_string();
        let agent = self.agent.clone();
        let user_agent = self.user_agent.clone();
        let sender = self.sender.clone();
        thread::spawn(move || {
            let result = download(&agent, &url, &user_agent).and_then(|bytes| decode(&bytes));
            let _ = sender.send(DecodedPoster { url, result });
        });
    }

    /// Upload finished downloads. Returns true if anything new arrived.
    pub fn poll(&mut self, ctx: &egui::Context) -> bool {
        let mut changed = false;
        while let Ok(poster) = self.receiver.try_recv() {
            changed = true;
            let slot = match poster.result {
                Ok(image) => PosterSlot::Ready(ctx.load_texture(
                    format!("poster:{}", poster.url),
                    image,
                    egui::TextureOptions::LINEAR,
                )),
                Err(e) => {
                    log::warn!("Poster {} unavailable: {}", poster.url, e);
                    PosterSlot::Failed
                }
            };
            self.slots.insert(poster.url, slot);
        }
        changed
    }
}

fn download(agent: &ureq::Agent, url: &str, user_agent: &str) -> Result<Vec<u8>, String> {
    let mut response = agent
        .get(url)
        .header("User-Agent", user_agent)
        .call()
        .map_err(|e| format!("Request failed: {}", e))?;

    response
        .body_mut()
        .read_to_vec()
        .map_err(|e| format!("Read failed: {}", e))
}

/// Width that keeps the aspect ratio at `target_height`
fn scaled_width(width: u32, height: u32, target_height: u32) -> u32 {
    let scaled = u64::from(width) * u64::from(target_height) / u64::from(height.max(1));
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<egui::ColorImage, String> {
    let mut image = image::load_from_memory(bytes).map_err(|e| format!("Decode failed: {}", e))?;
    if image.height() > MAX_POSTER_HEIGHT {
        let width = scaled_width(image.width(), image.height(), MAX_POSTER_HEIGHT);
        image = image.thumbnail(width, MAX_POSTER_HEIGHT);
    }

    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 30, 30, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_small_poster() {
        let image = decode(&png(30, 45)).unwrap();
        assert_eq!(image.size, [30, 45]);
    }

    #[test]
    fn test_decode_downscales_tall_poster() {
        let image = decode(&png(300, 900)).unwrap();
        assert_eq!(image.size[1], MAX_POSTER_HEIGHT as usize);
        assert!(image.size[0] <= 150);
    }

    #[test]
    fn test_scaled_width_of_very_wide_poster() {
        assert_eq!(scaled_width(300, 900, MAX_POSTER_HEIGHT), 150);
        // 10M * 450 overflows u32
        assert_eq!(scaled_width(10_000_000, 900, MAX_POSTER_HEIGHT), 5_000_000);
        assert_eq!(scaled_width(1, 100_000, MAX_POSTER_HEIGHT), 1);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode(b"definitely not an image").is_err());
    }
}
