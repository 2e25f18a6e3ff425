use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{AssetKind, EngineError};
use crate::surface::Pixmap;

use super::loader::{settle_all, PendingLoad};
use super::{AssetSource, LoadReport};

fn decode_image(name: &str, bytes: &[u8]) -> Result<Pixmap, EngineError> {
    let rgba = image::load_from_memory(bytes)
        .map_err(|e| EngineError::AssetLoad { name: name.to_owned(), reason: e.to_string() })?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    Pixmap::from_rgba8(width, height, rgba.into_raw()).ok_or_else(|| EngineError::AssetLoad {
        name: name.to_owned(),
        reason: "decoded buffer size mismatch".into(),
    })
}

/// Decoded images by name.
///
/// Images are shared read-only with sprites (`Rc<Pixmap>`); clearing the
/// registry does not invalidate sprites that already hold one.
#[derive(Default)]
pub struct ImageRegistry {
    images: HashMap<String, Rc<Pixmap>>,
    pending: Vec<PendingLoad<Pixmap>>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts decoding `source` in the background.
    ///
    /// Ignored when `name` is already loaded or pending.
    pub fn add(&mut self, name: &str, source: impl Into<AssetSource>) {
        if self.images.contains_key(name) || self.pending.iter().any(|p| p.name == name) {
            log::debug!("image '{name}' already registered");
            return;
        }
        self.pending.push(PendingLoad::spawn(name, source.into(), decode_image));
    }

    /// Registers an already-decoded image, replacing any previous entry.
    pub fn insert(&mut self, name: &str, pixmap: Pixmap) -> Rc<Pixmap> {
        let image = Rc::new(pixmap);
        self.images.insert(name.to_owned(), Rc::clone(&image));
        image
    }

    /// Waits for every pending load.
    pub fn load_all(&mut self) -> LoadReport {
        let pending = std::mem::take(&mut self.pending);
        let images = &mut self.images;
        settle_all(pending, "image", |name, pixmap| {
            images.insert(name, Rc::new(pixmap));
        })
    }

    pub fn get(&self, name: &str) -> Option<Rc<Pixmap>> {
        self.images.get(name).cloned()
    }

    pub fn require(&self, name: &str) -> Result<Rc<Pixmap>, EngineError> {
        self.get(name).ok_or_else(|| EngineError::MissingAsset {
            kind: AssetKind::Image,
            name: name.to_owned(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Drops every loaded image. Pending loads are left to `load_all`.
    pub fn clear(&mut self) {
        self.images.clear();
    }
}
