//! Drawing-surface seam and registry.
//!
//! A drawing surface is a bitmap-backed render target whose pixels must
//! be explicitly sampled; the host registers and removes surfaces
//! through the registry instead of the core polling for readiness.

use std::sync::{Arc, Mutex, PoisonError};

use dashcam_common::DashcamResult;

/// Encoding applied to sampled surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// MIME type used in data URLs.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Parse a config-file format name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

/// A bitmap-backed render target (collaborator contract).
///
/// `encode` may fail per surface (e.g., cross-origin taint in the
/// original host); callers skip the failing surface and continue.
pub trait DrawingSurface: Send {
    /// Identifier assigned by the capture context.
    fn id(&self) -> &str;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Encode the current pixel contents as a data URL at the given
    /// quality factor in `[0.0, 1.0]` (lossy formats only).
    fn encode(&self, format: ImageFormat, quality: f64) -> DashcamResult<String>;

    /// Replace the surface contents with a decoded data URL.
    fn restore(&mut self, data_url: &str) -> DashcamResult<()>;
}

/// Ordered set of currently known drawing surfaces.
///
/// Surfaces are addressed by index in registration order; indices are
/// stable only while the set is unchanged, which is why snapshot
/// entries also carry the surface id.
#[derive(Default)]
pub struct SurfaceRegistry {
    surfaces: Vec<Box<dyn DrawingSurface>>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a surface; returns its index.
    pub fn add(&mut self, surface: Box<dyn DrawingSurface>) -> usize {
        let index = self.surfaces.len();
        tracing::debug!(index, id = surface.id(), "Surface registered");
        self.surfaces.push(surface);
        index
    }

    /// Remove a surface by id. Later surfaces shift down an index.
    pub fn remove(&mut self, id: &str) -> Option<Box<dyn DrawingSurface>> {
        let position = self.surfaces.iter().position(|s| s.id() == id)?;
        tracing::debug!(index = position, id, "Surface removed");
        Some(self.surfaces.remove(position))
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn DrawingSurface> {
        self.surfaces.get(index).map(|s| &**s)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut dyn DrawingSurface> {
        match self.surfaces.get_mut(index) {
            Some(s) => Some(s.as_mut()),
            None => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &dyn DrawingSurface)> {
        self.surfaces.iter().enumerate().map(|(i, s)| (i, &**s))
    }
}

impl std::fmt::Debug for SurfaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<&str> = self.surfaces.iter().map(|s| s.id()).collect();
        f.debug_struct("SurfaceRegistry").field("ids", &ids).finish()
    }
}

/// Registry handle shared between the host, the sampler task, and the
/// replay engine.
#[derive(Debug, Clone, Default)]
pub struct SharedSurfaceRegistry {
    inner: Arc<Mutex<SurfaceRegistry>>,
}

impl SharedSurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a closure with the locked registry.
    pub fn with<R>(&self, f: impl FnOnce(&mut SurfaceRegistry) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn add(&self, surface: Box<dyn DrawingSurface>) -> usize {
        self.with(|registry| registry.add(surface))
    }

    pub fn remove(&self, id: &str) -> bool {
        self.with(|registry| registry.remove(id).is_some())
    }

    pub fn len(&self) -> usize {
        self.with(|registry| registry.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeSurface;
    use super::*;

    #[test]
    fn test_format_names_and_mime() {
        assert_eq!(ImageFormat::from_name("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_name("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_name("png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_name("webp"), None);
        assert_eq!(ImageFormat::Jpeg.mime(), "image/jpeg");
    }

    #[test]
    fn test_registry_indexes_in_registration_order() {
        let mut registry = SurfaceRegistry::new();
        assert_eq!(registry.add(Box::new(FakeSurface::new("a"))), 0);
        assert_eq!(registry.add(Box::new(FakeSurface::new("b"))), 1);

        assert_eq!(registry.get(0).unwrap().id(), "a");
        assert_eq!(registry.get(1).unwrap().id(), "b");
        assert!(registry.get(2).is_none());
    }

    #[test]
    fn test_remove_shifts_later_indices() {
        let mut registry = SurfaceRegistry::new();
        registry.add(Box::new(FakeSurface::new("a")));
        registry.add(Box::new(FakeSurface::new("b")));
        registry.add(Box::new(FakeSurface::new("c")));

        assert!(registry.remove("b").is_some());
        assert!(registry.remove("b").is_none());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(1).unwrap().id(), "c");
    }

    #[test]
    fn test_shared_registry_add_remove() {
        let shared = SharedSurfaceRegistry::new();
        assert!(shared.is_empty());
        shared.add(Box::new(FakeSurface::new("plot")));
        assert_eq!(shared.len(), 1);
        assert!(shared.remove("plot"));
        assert!(!shared.remove("plot"));
    }
}
