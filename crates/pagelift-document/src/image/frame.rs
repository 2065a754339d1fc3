// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Frame — the single image value type handed through the scanning pipeline.

use image::{GrayImage, RgbImage};
use pagelift_core::error::{PageliftError, Result};
use tracing::{debug, info, instrument};

/// An immutable captured frame: a fixed-size RGB8 pixel grid.
///
/// Constructed once per capture (webcam, raw bytes, or a file on disk) and
/// passed by shared reference through detection and rectification. Nothing
/// in the pipeline mutates a `Frame`; every processing stage works on its
/// own copies, so a frame stays pristine for re-processing after a probe
/// pass. Live frames and file-loaded frames are indistinguishable once
/// wrapped.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    // -- Construction ---------------------------------------------------------

    /// Wrap an already-decoded RGB buffer.
    pub fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }

    /// Decode a frame from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| PageliftError::Image(format!("failed to decode frame: {}", err)))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Frame decoded from bytes"
        );
        Ok(Self {
            image: img.to_rgb8(),
        })
    }

    /// Load a frame from an image file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|err| {
            PageliftError::Image(format!(
                "failed to open frame {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(
            width = img.width(),
            height = img.height(),
            "Frame loaded from file"
        );
        Ok(Self {
            image: img.to_rgb8(),
        })
    }

    // -- Accessors ------------------------------------------------------------

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying RGB pixel buffer.
    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }

    /// Copy out the pixel buffer (used for raw-capture fallback pages).
    pub fn to_rgb(&self) -> RgbImage {
        self.image.clone()
    }

    /// Single-channel intensity rendition of the frame.
    pub fn to_luma(&self) -> GrayImage {
        image::imageops::grayscale(&self.image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn from_bytes_decodes_png() {
        let img = RgbImage::from_pixel(8, 6, Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .expect("encode");

        let frame = Frame::from_bytes(&bytes).expect("decode");
        assert_eq!(frame.width(), 8);
        assert_eq!(frame.height(), 6);
        assert_eq!(frame.as_rgb().get_pixel(3, 3), &Rgb([10, 20, 30]));
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        assert!(Frame::from_bytes(&[0u8, 1, 2, 3]).is_err());
    }

    #[test]
    fn open_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("frame.png");
        RgbImage::from_pixel(5, 4, Rgb([200, 100, 50]))
            .save(&path)
            .expect("save");

        let frame = Frame::open(&path).expect("open");
        assert_eq!((frame.width(), frame.height()), (5, 4));
    }

    #[test]
    fn to_luma_matches_dimensions() {
        let frame = Frame::from_rgb(RgbImage::from_pixel(10, 12, Rgb([90, 90, 90])));
        let gray = frame.to_luma();
        assert_eq!(gray.dimensions(), (10, 12));
        assert_eq!(gray.get_pixel(0, 0).0[0], 90);
    }
}
