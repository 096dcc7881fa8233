//! In-memory drawing surfaces for the CLI.
//!
//! The CLI has no browser canvas, so demo recordings sample a synthetic
//! test pattern and replay restores decoded images into plain pixel
//! buffers.

use std::io::Cursor;
use std::time::Instant;

use image::{ImageEncoder, Rgb, RgbImage};

use dashcam_capture::{DrawingSurface, ImageFormat};
use dashcam_common::{DashcamError, DashcamResult};
use dashcam_session_model::{encode_data_url, parse_data_url};

/// A pixel-buffer surface.
///
/// In animated mode (demo recordings) each encode renders a moving test
/// pattern from elapsed time; a restore replaces the buffer and pins it.
pub struct MemorySurface {
    id: String,
    image: RgbImage,
    animated: bool,
    created: Instant,
}

impl MemorySurface {
    /// Blank surface for replay targets.
    pub fn blank(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            image: RgbImage::new(width.max(1), height.max(1)),
            animated: false,
            created: Instant::now(),
        }
    }

    /// Animated test-pattern surface for demo recordings.
    pub fn test_pattern(id: impl Into<String>, width: u32, height: u32) -> Self {
        let mut surface = Self::blank(id, width, height);
        surface.animated = true;
        surface.paint(0);
        surface
    }

    /// Latest pixel contents (for assertions and debugging).
    pub fn pixels(&self) -> &RgbImage {
        &self.image
    }

    fn paint(&mut self, phase: u32) {
        let (width, height) = self.image.dimensions();
        let phase = u64::from(phase);
        // Widen before multiplying; phase grows without bound while the
        // demo runs.
        for (x, y, pixel) in self.image.enumerate_pixels_mut() {
            let r = ((u64::from(x) + phase) * 255 / u64::from(width.max(1))) as u8;
            let g = ((u64::from(y) + phase / 2) * 255 / u64::from(height.max(1))) as u8;
            let b = (x ^ y).wrapping_add(phase as u32) as u8;
            *pixel = Rgb([r, g, b]);
        }
    }

    fn encode_pixels(&self, format: ImageFormat, quality: f64) -> DashcamResult<Vec<u8>> {
        let (width, height) = self.image.dimensions();
        let mut bytes = Vec::new();

        match format {
            ImageFormat::Jpeg => {
                let quality = (quality.clamp(0.01, 1.0) * 100.0).round() as u8;
                let encoder =
                    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality);
                encoder
                    .write_image(
                        self.image.as_raw(),
                        width,
                        height,
                        image::ExtendedColorType::Rgb8,
                    )
                    .map_err(|e| DashcamError::snapshot(format!("jpeg encode: {e}")))?;
            }
            ImageFormat::Png => {
                let encoder = image::codecs::png::PngEncoder::new(Cursor::new(&mut bytes));
                encoder
                    .write_image(
                        self.image.as_raw(),
                        width,
                        height,
                        image::ExtendedColorType::Rgb8,
                    )
                    .map_err(|e| DashcamError::snapshot(format!("png encode: {e}")))?;
            }
        }

        Ok(bytes)
    }
}

impl DrawingSurface for MemorySurface {
    fn id(&self) -> &str {
        &self.id
    }

    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn encode(&self, format: ImageFormat, quality: f64) -> DashcamResult<String> {
        let bytes = if self.animated {
            // Render the pattern for this instant without touching the
            // stored buffer; encode is a read on the surface seam.
            let mut frame = Self::blank(self.id.clone(), self.width(), self.height());
            frame.paint(self.created.elapsed().as_millis() as u32 / 4);
            frame.encode_pixels(format, quality)
        } else {
            self.encode_pixels(format, quality)
        }?;
        Ok(encode_data_url(format.mime(), &bytes))
    }

    fn restore(&mut self, data_url: &str) -> DashcamResult<()> {
        let (_, bytes) = parse_data_url(data_url)
            .ok_or_else(|| DashcamError::restore("entry is not a base64 data URL"))?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| DashcamError::restore(format!("image decode: {e}")))?;
        self.image = decoded.to_rgb8();
        self.animated = false;
        Ok(())
    }
}
