use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{BackendError, TextureError};
use crate::handles::TextureId;

/// Number of texture units the fragment shader can sample from.
pub const MAX_TEXTURE_SLOTS: usize = 16;

/// CPU-side pixels, bottom row first, tightly packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// 3 for RGB, 4 for RGBA.
    pub channels: u8,
    pub pixels: Vec<u8>,
}

/// GPU side of texture management.
pub trait TextureBackend {
    /// Creates a 2D texture with repeat wrapping, linear filtering and mipmaps.
    fn upload(&mut self, image: &DecodedImage) -> Result<TextureId, BackendError>;

    fn bind(&mut self, unit: u32, texture: TextureId);
}

/// A texture file and the tag scene objects refer to it by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureSpec {
    pub path: PathBuf,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureEntry {
    pub tag: String,
    pub texture: TextureId,
}

/// Decodes an image file, flipped so the first row is the bottom one.
pub fn decode_image(path: &Path) -> Result<DecodedImage, TextureError> {
    let image = image::open(path)
        .map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .flipv();

    let (width, height) = (image.width(), image.height());
    let channels = image.color().channel_count();
    let pixels = match channels {
        3 => image.into_rgb8().into_raw(),
        4 => image.into_rgba8().into_raw(),
        _ => {
            return Err(TextureError::UnsupportedChannels {
                path: path.to_path_buf(),
                channels,
            })
        }
    };

    Ok(DecodedImage {
        width,
        height,
        channels,
        pixels,
    })
}

/// Tag to texture-unit table. Slot `n` is the `n`th successfully registered
/// texture and is bound to texture unit `n`.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    entries: Vec<TextureEntry>,
    slots: HashMap<String, usize>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `path` and registers it under `tag`, returning its slot.
    pub fn load(
        &mut self,
        backend: &mut dyn TextureBackend,
        path: &Path,
        tag: &str,
    ) -> Result<usize, TextureError> {
        self.check_capacity(tag)?;
        let image = decode_image(path)?;
        let slot = self.register(backend, tag, &image)?;
        log::info!(
            "Loaded texture {:?} as {:?} ({}x{}, {} channels) into slot {}",
            path,
            tag,
            image.width,
            image.height,
            image.channels,
            slot
        );
        Ok(slot)
    }

    /// Loads every spec in order, decoding on the rayon pool. Failures are
    /// logged and skipped; returns how many textures were registered.
    pub fn load_all(&mut self, backend: &mut dyn TextureBackend, specs: &[TextureSpec]) -> usize {
        let decoded: Vec<_> = specs
            .par_iter()
            .map(|spec| (spec, decode_image(&spec.path)))
            .collect();

        let mut loaded = 0;
        for (spec, image) in decoded {
            let result = image.and_then(|image| self.register(backend, &spec.tag, &image));
            match result {
                Ok(slot) => {
                    log::info!("Loaded texture {:?} as {:?} into slot {}", spec.path, spec.tag, slot);
                    loaded += 1;
                }
                Err(e) => log::error!("Could not load texture {:?}: {}", spec.path, e),
            }
        }
        loaded
    }

    /// Uploads an already decoded image and registers it under `tag`.
    pub fn register(
        &mut self,
        backend: &mut dyn TextureBackend,
        tag: &str,
        image: &DecodedImage,
    ) -> Result<usize, TextureError> {
        self.check_capacity(tag)?;
        let texture = backend.upload(image)?;

        let slot = self.entries.len();
        self.entries.push(TextureEntry {
            tag: tag.to_string(),
            texture,
        });
        // Duplicate tags keep resolving to the first registration.
        self.slots.entry(tag.to_string()).or_insert(slot);
        Ok(slot)
    }

    /// Binds every texture to the unit matching its slot.
    pub fn bind_all(&self, backend: &mut dyn TextureBackend) {
        for (unit, entry) in self.entries.iter().enumerate() {
            backend.bind(unit as u32, entry.texture);
        }
    }

    pub fn find_slot(&self, tag: &str) -> Option<usize> {
        self.slots.get(tag).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TextureEntry] {
        &self.entries
    }

    fn check_capacity(&self, tag: &str) -> Result<(), TextureError> {
        if self.entries.len() >= MAX_TEXTURE_SLOTS {
            return Err(TextureError::CapacityExceeded {
                tag: tag.to_string(),
                capacity: MAX_TEXTURE_SLOTS,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{temp_path, write_test_image, FakeTextures};

    fn pixel(channels: u8) -> DecodedImage {
        DecodedImage {
            width: 1,
            height: 1,
            channels,
            pixels: vec![255; channels as usize],
        }
    }

    #[test]
    fn slots_follow_registration_order() {
        let mut backend = FakeTextures::default();
        let mut registry = TextureRegistry::new();

        assert_eq!(registry.register(&mut backend, "floor", &pixel(3)).unwrap(), 0);
        assert_eq!(registry.register(&mut backend, "knobs", &pixel(4)).unwrap(), 1);
        assert_eq!(registry.find_slot("knobs"), Some(1));
        assert_eq!(registry.find_slot("missing"), None);

        registry.bind_all(&mut backend);
        assert_eq!(backend.bound, vec![(0, TextureId(0)), (1, TextureId(1))]);
    }

    #[test]
    fn duplicate_tags_resolve_to_first_match() {
        let mut backend = FakeTextures::default();
        let mut registry = TextureRegistry::new();

        registry.register(&mut backend, "wood", &pixel(3)).unwrap();
        registry.register(&mut backend, "metal", &pixel(3)).unwrap();
        registry.register(&mut backend, "wood", &pixel(3)).unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.find_slot("wood"), Some(0));
    }

    #[test]
    fn seventeenth_texture_is_rejected() {
        let mut backend = FakeTextures::default();
        let mut registry = TextureRegistry::new();
        for i in 0..MAX_TEXTURE_SLOTS {
            registry
                .register(&mut backend, &format!("tex{i}"), &pixel(3))
                .unwrap();
        }

        let result = registry.register(&mut backend, "one too many", &pixel(3));
        assert!(matches!(
            result,
            Err(TextureError::CapacityExceeded { capacity: MAX_TEXTURE_SLOTS, .. })
        ));
        assert_eq!(registry.len(), MAX_TEXTURE_SLOTS);
        assert_eq!(backend.uploaded.len(), MAX_TEXTURE_SLOTS);
        assert_eq!(registry.find_slot("one too many"), None);
        for i in 0..MAX_TEXTURE_SLOTS {
            assert_eq!(registry.find_slot(&format!("tex{i}")), Some(i));
        }

        registry.bind_all(&mut backend);
        assert_eq!(backend.bound.len(), MAX_TEXTURE_SLOTS);
        assert_eq!(backend.bound[15], (15, TextureId(15)));
    }

    #[test]
    fn load_decodes_rgb_and_rgba_files() {
        let rgb = temp_path("rgb.png");
        let rgba = temp_path("rgba.png");
        write_test_image(&rgb, 3);
        write_test_image(&rgba, 4);

        let mut backend = FakeTextures::default();
        let mut registry = TextureRegistry::new();
        assert_eq!(registry.load(&mut backend, &rgb, "rgb").unwrap(), 0);
        assert_eq!(registry.load(&mut backend, &rgba, "rgba").unwrap(), 1);
        assert_eq!(backend.uploaded, vec![(2, 2, 3), (2, 2, 4)]);
    }

    #[test]
    fn grayscale_images_fail_without_side_effects() {
        let gray = temp_path("gray.png");
        write_test_image(&gray, 1);

        let mut backend = FakeTextures::default();
        let mut registry = TextureRegistry::new();
        let result = registry.load(&mut backend, &gray, "gray");

        assert!(matches!(
            result,
            Err(TextureError::UnsupportedChannels { channels: 1, .. })
        ));
        assert!(registry.is_empty());
        assert!(backend.uploaded.is_empty());
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let mut backend = FakeTextures::default();
        let mut registry = TextureRegistry::new();
        let result = registry.load(&mut backend, &temp_path("nope.png"), "nope");
        assert!(matches!(result, Err(TextureError::Decode { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn load_all_keeps_configured_order_and_skips_failures() {
        let a = temp_path("order-a.png");
        let c = temp_path("order-c.png");
        write_test_image(&a, 3);
        write_test_image(&c, 4);
        let specs = vec![
            TextureSpec { path: a, tag: "a".into() },
            TextureSpec { path: temp_path("order-missing.png"), tag: "b".into() },
            TextureSpec { path: c, tag: "c".into() },
        ];

        let mut backend = FakeTextures::default();
        let mut registry = TextureRegistry::new();
        assert_eq!(registry.load_all(&mut backend, &specs), 2);
        assert_eq!(registry.find_slot("a"), Some(0));
        assert_eq!(registry.find_slot("b"), None);
        assert_eq!(registry.find_slot("c"), Some(1));
    }
}
