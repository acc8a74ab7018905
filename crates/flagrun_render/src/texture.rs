//! Sprite sheet loading with placeholder fallback.
//!
//! Visuals are requested by key (`"player/idle"`, `"tiles/level2"`, ...) and
//! resolve over later polls, a few per frame, so startup never waits on disk.
//! A handle is `Loading`, `Ready` with the decoded sheet, or `Failed` with the
//! flat colour the renderer draws instead. Only the draw pass looks at
//! handles; simulation never branches on load state.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;

use crate::target::Color;

/// A decoded sprite sheet: `frames` equally wide frames laid out left to right.
#[derive(Debug, Clone)]
pub struct SpriteImage {
    pub key: Arc<str>,
    pub width: u32,
    pub height: u32,
    pub frames: u32,
    pub pixels: image::RgbaImage,
}

impl SpriteImage {
    pub fn frame_width(&self) -> u32 {
        self.width / self.frames.max(1)
    }
}

#[derive(Debug, Clone)]
pub enum AssetHandle {
    Loading { placeholder: Color },
    Ready(Arc<SpriteImage>),
    Failed { placeholder: Color },
}

impl AssetHandle {
    pub fn sprite(&self) -> Option<&Arc<SpriteImage>> {
        match self {
            Self::Ready(sprite) => Some(sprite),
            _ => None,
        }
    }

    pub fn placeholder(&self) -> Option<Color> {
        match self {
            Self::Loading { placeholder } | Self::Failed { placeholder } => Some(*placeholder),
            Self::Ready(_) => None,
        }
    }
}

/// Source of decoded sprite sheets.
pub trait AssetProvider {
    fn load(&mut self, key: &str, frames: u32) -> Result<SpriteImage, String>;
}

/// Loads `<root>/<key>.png` from disk.
pub struct FileAssetProvider {
    root: PathBuf,
}

impl FileAssetProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetProvider for FileAssetProvider {
    fn load(&mut self, key: &str, frames: u32) -> Result<SpriteImage, String> {
        let path = self.root.join(format!("{key}.png"));
        let pixels = image::open(&path)
            .map_err(|e| format!("Failed to load sprite {}: {e}", path.display()))?
            .into_rgba8();
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(format!("Sprite {} has zero size", path.display()));
        }
        Ok(SpriteImage {
            key: Arc::from(key),
            width,
            height,
            frames: frames.max(1),
            pixels,
        })
    }
}

struct PendingAsset {
    key: Arc<str>,
    frames: u32,
}

pub struct AssetRegistry {
    handles: HashMap<Arc<str>, AssetHandle>,
    queue: VecDeque<PendingAsset>,
    loads_per_poll: usize,
}

impl AssetRegistry {
    pub fn new(loads_per_poll: usize) -> Self {
        Self {
            handles: HashMap::new(),
            queue: VecDeque::new(),
            loads_per_poll: loads_per_poll.max(1),
        }
    }

    /// Register interest in `key`. Re-requesting a known key is a no-op.
    pub fn request(&mut self, key: &str, frames: u32, placeholder: Color) {
        if self.handles.contains_key(key) {
            return;
        }
        let key: Arc<str> = Arc::from(key);
        self.handles
            .insert(key.clone(), AssetHandle::Loading { placeholder });
        self.queue.push_back(PendingAsset { key, frames });
    }

    /// Resolve up to `loads_per_poll` queued requests. Returns how many were processed.
    pub fn poll(&mut self, provider: &mut dyn AssetProvider) -> usize {
        let mut processed = 0;
        while processed < self.loads_per_poll {
            let Some(pending) = self.queue.pop_front() else {
                break;
            };
            processed += 1;

            let placeholder = self
                .handles
                .get(&pending.key)
                .and_then(AssetHandle::placeholder)
                .unwrap_or([1.0, 0.0, 1.0, 1.0]);
            let handle = match provider.load(&pending.key, pending.frames) {
                Ok(sprite) => {
                    log::debug!(
                        "Sprite '{}' loaded ({}x{})",
                        pending.key,
                        sprite.width,
                        sprite.height
                    );
                    AssetHandle::Ready(Arc::new(sprite))
                }
                Err(err) => {
                    log::warn!("{err}. Using placeholder for '{}'.", pending.key);
                    AssetHandle::Failed { placeholder }
                }
            };
            self.handles.insert(pending.key, handle);
        }
        processed
    }

    pub fn get(&self, key: &str) -> Option<&AssetHandle> {
        self.handles.get(key)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn ready_count(&self) -> usize {
        self.handles
            .values()
            .filter(|h| matches!(h, AssetHandle::Ready(_)))
            .count()
    }
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::new(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    const GREY: Color = [0.5, 0.5, 0.5, 1.0];

    fn temp_dir(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "flagrun_texture_test_{}_{}_{}",
            name_hint,
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(dir.join("player")).expect("create temp dir");
        dir
    }

    #[test]
    fn file_provider_decodes_png_sheet() {
        let dir = temp_dir("decode");
        image::RgbaImage::new(24, 8)
            .save(dir.join("player/idle.png"))
            .expect("write png");

        let mut provider = FileAssetProvider::new(&dir);
        let sprite = provider.load("player/idle", 3).expect("should decode");
        assert_eq!((sprite.width, sprite.height), (24, 8));
        assert_eq!(sprite.frame_width(), 8);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_file_resolves_to_placeholder() {
        let dir = temp_dir("missing");
        let mut provider = FileAssetProvider::new(&dir);
        let mut registry = AssetRegistry::new(8);
        registry.request("player/run", 6, GREY);

        assert!(matches!(registry.get("player/run"), Some(AssetHandle::Loading { .. })));
        registry.poll(&mut provider);
        let handle = registry.get("player/run").expect("handle exists");
        assert!(matches!(handle, AssetHandle::Failed { .. }));
        assert_eq!(handle.placeholder(), Some(GREY));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn poll_respects_per_frame_budget() {
        struct CountingProvider(usize);
        impl AssetProvider for CountingProvider {
            fn load(&mut self, key: &str, frames: u32) -> Result<SpriteImage, String> {
                self.0 += 1;
                Ok(SpriteImage {
                    key: Arc::from(key),
                    width: 4 * frames,
                    height: 4,
                    frames,
                    pixels: image::RgbaImage::new(4 * frames, 4),
                })
            }
        }

        let mut registry = AssetRegistry::new(2);
        for key in ["a", "b", "c"] {
            registry.request(key, 1, GREY);
        }
        registry.request("a", 1, GREY);
        assert_eq!(registry.pending(), 3);

        let mut provider = CountingProvider(0);
        assert_eq!(registry.poll(&mut provider), 2);
        assert_eq!(registry.ready_count(), 2);
        assert_eq!(registry.poll(&mut provider), 1);
        assert_eq!(registry.poll(&mut provider), 0);
        assert_eq!(provider.0, 3);
        assert!(registry.get("c").and_then(AssetHandle::sprite).is_some());
    }
}
