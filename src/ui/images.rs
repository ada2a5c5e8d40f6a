//! Image textures for the document viewer
//!
//! The viewer asks for local images by path. The first request queues a
//! decode for the app to run off the UI thread; once the pixels arrive they
//! are uploaded as an egui texture. Results are cached per path, including
//! failures, so a broken reference is only tried once.

use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

enum CachedImage {
    Loading,
    Loaded(TextureHandle),
    Failed,
}

/// What the viewer can draw for an image right now.
pub enum ImageState<'a> {
    Ready(&'a TextureHandle),
    Loading,
    Failed,
}

/// Texture cache keyed by image path.
#[derive(Default)]
pub struct ImageCache {
    entries: HashMap<PathBuf, CachedImage>,
    /// Paths seen for the first time, waiting to be decoded
    requests: Vec<PathBuf>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The state of `path`, queueing a decode on first use.
    pub fn get(&mut self, path: &Path) -> ImageState<'_> {
        if !self.entries.contains_key(path) {
            debug!("Requesting image {}", path.display());
            self.entries.insert(path.to_path_buf(), CachedImage::Loading);
            self.requests.push(path.to_path_buf());
        }

        match self.entries.get(path) {
            Some(CachedImage::Loaded(texture)) => ImageState::Ready(texture),
            Some(CachedImage::Failed) => ImageState::Failed,
            Some(CachedImage::Loading) | None => ImageState::Loading,
        }
    }

    /// Decodes queued since the last call.
    pub fn take_requests(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.requests)
    }

    /// Store the decoded pixels for `path`, or mark it failed.
    pub fn insert(&mut self, ctx: &egui::Context, path: PathBuf, image: Option<ColorImage>) {
        let entry = match image {
            Some(image) => {
                debug!("Loaded image {}", path.display());
                CachedImage::Loaded(ctx.load_texture(
                    path.to_string_lossy(),
                    image,
                    TextureOptions::LINEAR,
                ))
            }
            None => CachedImage::Failed,
        };
        self.entries.insert(path, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::image_decode::decode_image;
    use crate::files::image_decode::png_bytes;

    fn state_name(state: ImageState<'_>) -> &'static str {
        match state {
            ImageState::Ready(_) => "ready",
            ImageState::Loading => "loading",
            ImageState::Failed => "failed",
        }
    }

    #[test]
    fn test_first_use_queues_one_decode() {
        let mut cache = ImageCache::new();
        let path = Path::new("/docs/a.png");

        assert_eq!(state_name(cache.get(path)), "loading");
        assert_eq!(state_name(cache.get(path)), "loading");
        assert_eq!(cache.take_requests(), vec![PathBuf::from("/docs/a.png")]);
        assert!(cache.take_requests().is_empty());
        assert_eq!(state_name(cache.get(path)), "loading");
        assert!(cache.take_requests().is_empty());
    }

    #[test]
    fn test_insert_resolves_loading_entries() {
        let ctx = egui::Context::default();
        let mut cache = ImageCache::new();
        let good = Path::new("/docs/good.png");
        let bad = Path::new("/docs/bad.png");
        cache.get(good);
        cache.get(bad);

        cache.insert(&ctx, good.to_path_buf(), decode_image(&png_bytes(3, 2)));
        cache.insert(&ctx, bad.to_path_buf(), None);

        match cache.get(good) {
            ImageState::Ready(texture) => assert_eq!(texture.size(), [3, 2]),
            _ => panic!("Expected a loaded texture"),
        }
        assert_eq!(state_name(cache.get(bad)), "failed");
        assert_eq!(cache.take_requests().len(), 2);
    }
}
