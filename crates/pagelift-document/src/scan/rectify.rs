// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Perspective rectification — maps a detected document quadrilateral onto
// the canonical top-down square and applies the enhancement pass.

use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use pagelift_core::error::{PageliftError, Result};
use pagelift_core::{CornerSet, EnhanceConfig, RectifyConfig};
use tracing::{debug, info, instrument, warn};

use crate::image::Frame;
use crate::scan::enhance;

/// Rectifies and enhances a detected document.
///
/// Takes a frame plus the corner set produced by the detector and returns
/// the flattened page image. Geometry failures (coincident or collinear
/// corners, singular transform) are reported as errors so the caller can
/// fall back to the raw capture; they never panic and never abort the
/// session.
pub struct DocumentProcessor {
    rectify: RectifyConfig,
    enhance: EnhanceConfig,
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new(RectifyConfig::default(), EnhanceConfig::default())
    }
}

impl DocumentProcessor {
    pub fn new(rectify: RectifyConfig, enhance: EnhanceConfig) -> Self {
        Self { rectify, enhance }
    }

    /// Produce the flattened, enhanced page for a frame and its corners.
    ///
    /// Enhancement runs on the full frame first; the perspective warp then
    /// resamples the enhanced image into the canonical square, so warp
    /// artefacts never feed the contrast statistics.
    #[instrument(skip_all)]
    pub fn process(&self, frame: &Frame, corners: &CornerSet) -> Result<RgbImage> {
        if corners.is_degenerate(self.rectify.min_corner_separation) {
            warn!("Rejecting corner set with coincident points");
            return Err(PageliftError::DegenerateQuad(
                "two or more corners coincide".into(),
            ));
        }

        let enhanced = enhance::enhance(frame, &self.enhance);
        let warped = self.warp(&enhanced, corners)?;

        info!(size = self.rectify.output_size, "Document rectified");
        Ok(warped)
    }

    /// The projective transform taking the ordered corners to the canonical
    /// square: top-left to (0,0), bottom-left to (0,S), bottom-right to
    /// (S,S), top-right to (S,0).
    fn projection(&self, corners: &CornerSet) -> Result<Projection> {
        let size = self.rectify.output_size as f32;
        let quad = corners.ordered();
        let src = [
            (quad.top_left.x, quad.top_left.y),
            (quad.bottom_left.x, quad.bottom_left.y),
            (quad.bottom_right.x, quad.bottom_right.y),
            (quad.top_right.x, quad.top_right.y),
        ];
        let dest = [(0.0, 0.0), (0.0, size), (size, size), (size, 0.0)];

        Projection::from_control_points(src, dest).ok_or_else(|| {
            PageliftError::Transform("corner points admit no projective transform".into())
        })
    }

    /// Resample an image through the corner-set transform into the
    /// canonical square.
    fn warp(&self, image: &RgbImage, corners: &CornerSet) -> Result<RgbImage> {
        let projection = self.projection(corners)?;
        debug!("Projective transform computed");

        let mut output = RgbImage::new(self.rectify.output_size, self.rectify.output_size);
        warp_into(
            image,
            &projection,
            Interpolation::Bilinear,
            Rgb([255, 255, 255]),
            &mut output,
        );
        Ok(output)
    }
}
