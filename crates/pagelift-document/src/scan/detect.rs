// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Document detection — locates the most plausible document-shaped
// quadrilateral in a frame via Otsu binarization, external contour
// extraction, and perimeter-proportional polygon approximation.

use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use pagelift_core::{Corner, CornerSet, DetectionState, DetectorConfig};
use tracing::{debug, instrument};

use crate::image::Frame;

/// Locates document boundaries in captured frames.
///
/// Detection is best-effort and per-frame: every failure mode (no contours,
/// nothing large enough, nothing quadrilateral) maps to
/// [`DetectionState::NotFound`] so a live feed keeps running. The same
/// routine serves camera frames and file-loaded frames; identical input
/// produces identical output.
pub struct DocumentDetector {
    config: DetectorConfig,
}

impl Default for DocumentDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

impl DocumentDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Run one detection pass over a frame.
    ///
    /// ## Pipeline
    ///
    /// 1. Grayscale conversion
    /// 2. Gaussian smoothing (small sigma, suppresses sensor noise)
    /// 3. Otsu global thresholding
    /// 4. External contour extraction (holes inside shapes are ignored)
    /// 5. Candidates ranked by enclosed area, descending; candidates below
    ///    the minimum-area threshold are never considered
    /// 6. Douglas-Peucker approximation with epsilon = 5% of perimeter;
    ///    the first candidate reducing to exactly 4 vertices wins
    ///
    /// No convexity or aspect-ratio validation is performed; a 4-vertex
    /// approximation is the accepted proxy for "document".
    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    pub fn detect(&self, frame: &Frame) -> DetectionState {
        let gray = frame.to_luma();
        let blurred = gaussian_blur_f32(&gray, self.config.blur_sigma);

        let threshold = otsu_threshold(&blurred);
        let binary = binarize(&blurred, threshold);
        debug!(threshold, "Frame binarized");

        let contours: Vec<Contour<i32>> = find_contours(&binary);

        // External borders only; a hole cannot be a document boundary.
        let mut candidates: Vec<(f64, &Contour<i32>)> = contours
            .iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .map(|c| (contour_area(&c.points), c))
            .collect();

        if candidates.is_empty() {
            debug!("No contours in frame");
            return DetectionState::NotFound;
        }

        candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let min_area = self.scaled_min_area(frame.width(), frame.height());
        if candidates[0].0 < min_area {
            debug!(
                largest_area = candidates[0].0,
                min_area, "Largest contour below area threshold"
            );
            return DetectionState::NotFound;
        }

        // Largest-area-first with early termination bounds the cost on
        // cluttered scenes.
        for (area, contour) in &candidates {
            if *area < min_area {
                break;
            }
            let perimeter = arc_length(&contour.points, true);
            let epsilon = self.config.epsilon_ratio * perimeter;
            let approx = approximate_polygon_dp(&contour.points, epsilon, true);
            if approx.len() == 4 {
                debug!(area = *area, perimeter, "Document quadrilateral accepted");
                return DetectionState::Found(corner_set(&approx));
            }
        }

        debug!("No contour approximates to a quadrilateral");
        DetectionState::NotFound
    }

    /// Effective area threshold for this frame size.
    ///
    /// `min_area` is calibrated at the reference resolution and scales
    /// linearly with pixel count, so detection behaves the same across
    /// capture resolutions.
    fn scaled_min_area(&self, width: u32, height: u32) -> f64 {
        self.config.min_area * (width as f64 * height as f64) / self.config.reference_pixels
    }
}

/// Threshold a grayscale image: values above `threshold` become white.
fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut output = GrayImage::new(width, height);
    for (x, y, pixel) in gray.enumerate_pixels() {
        let value = if pixel.0[0] > threshold { 255u8 } else { 0u8 };
        output.put_pixel(x, y, Luma([value]));
    }
    output
}

/// Compute the Otsu threshold for a grayscale image.
///
/// Picks the threshold maximising between-class variance of the dark and
/// bright pixel populations, so binarization adapts to scene lighting
/// without manual tuning.
fn otsu_threshold(gray: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total = gray.width() as u64 * gray.height() as u64;
    if total == 0 {
        return 128;
    }

    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(value, &count)| value as f64 * count as f64)
        .sum();

    let mut background_count: u64 = 0;
    let mut background_sum: f64 = 0.0;
    let mut best_threshold: u8 = 0;
    let mut best_variance: f64 = 0.0;

    for (value, &count) in histogram.iter().enumerate() {
        background_count += count;
        if background_count == 0 {
            continue;
        }
        let foreground_count = total - background_count;
        if foreground_count == 0 {
            break;
        }

        background_sum += value as f64 * count as f64;
        let background_mean = background_sum / background_count as f64;
        let foreground_mean = (weighted_total - background_sum) / foreground_count as f64;

        let variance = background_count as f64
            * foreground_count as f64
            * (background_mean - foreground_mean).powi(2);

        if variance > best_variance {
            best_variance = variance;
            best_threshold = value as u8;
        }
    }

    best_threshold
}

/// Enclosed area of a closed contour via the shoelace formula.
fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut doubled = 0.0f64;
    for i in 0..points.len() {
        let j = (i + 1) % points.len();
        doubled += points[i].x as f64 * points[j].y as f64;
        doubled -= points[j].x as f64 * points[i].y as f64;
    }
    doubled.abs() / 2.0
}

/// Build a corner set from a 4-vertex approximation, keeping walk order.
fn corner_set(approx: &[Point<i32>]) -> CornerSet {
    debug_assert_eq!(approx.len(), 4);
    CornerSet::new([
        Corner::new(approx[0].x as f32, approx[0].y as f32),
        Corner::new(approx[1].x as f32, approx[1].y as f32),
        Corner::new(approx[2].x as f32, approx[2].y as f32),
        Corner::new(approx[3].x as f32, approx[3].y as f32),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// 640x480 black frame with a white axis-aligned rectangle.
    fn frame_with_rect(x0: u32, y0: u32, x1: u32, y1: u32) -> Frame {
        let mut img = RgbImage::from_pixel(640, 480, Rgb([10, 10, 10]));
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, Rgb([245, 245, 245]));
            }
        }
        Frame::from_rgb(img)
    }

    fn closest_corner_distance(corners: &CornerSet, x: f32, y: f32) -> f32 {
        corners
            .0
            .iter()
            .map(|c| ((c.x - x).powi(2) + (c.y - y).powi(2)).sqrt())
            .fold(f32::INFINITY, f32::min)
    }

    #[test]
    fn blank_frame_yields_not_found() {
        let frame = Frame::from_rgb(RgbImage::from_pixel(640, 480, Rgb([128, 128, 128])));
        let state = DocumentDetector::default().detect(&frame);
        assert!(!state.is_found());
    }

    #[test]
    fn clean_rectangle_is_found_with_matching_corners() {
        let frame = frame_with_rect(150, 100, 500, 380);
        let state = DocumentDetector::default().detect(&frame);

        let corners = state.corners().expect("rectangle should be detected");
        for (x, y) in [(150.0, 100.0), (150.0, 380.0), (500.0, 380.0), (500.0, 100.0)] {
            assert!(
                closest_corner_distance(corners, x, y) < 10.0,
                "no detected corner near ({x}, {y}): {corners:?}"
            );
        }
    }

    #[test]
    fn under_threshold_rectangle_is_rejected() {
        // 60x60 = 3600 square pixels, below the 10,000 minimum at 640x480.
        let frame = frame_with_rect(300, 200, 360, 260);
        let state = DocumentDetector::default().detect(&frame);
        assert!(!state.is_found());
    }

    #[test]
    fn falls_back_to_smaller_quadrilateral_when_largest_is_not_one() {
        // Largest contour: a big filled triangle (approximates to 3
        // vertices). A smaller rectangle above the area threshold should
        // still be picked up.
        let mut img = RgbImage::from_pixel(640, 480, Rgb([10, 10, 10]));
        for row in 0..380u32 {
            for x in 20..(20 + row) {
                img.put_pixel(x, 40 + row, Rgb([245, 245, 245]));
            }
        }
        for y in 80..230u32 {
            for x in 440..620u32 {
                img.put_pixel(x, y, Rgb([245, 245, 245]));
            }
        }
        let frame = Frame::from_rgb(img);

        let state = DocumentDetector::default().detect(&frame);
        let corners = state.corners().expect("rectangle should be detected");
        assert!(closest_corner_distance(corners, 440.0, 80.0) < 10.0);
        assert!(closest_corner_distance(corners, 620.0, 230.0) < 10.0);
    }

    #[test]
    fn detection_is_deterministic_across_calls() {
        // The static-image path reuses this routine; an identical frame must
        // give an identical result.
        let frame = frame_with_rect(150, 100, 500, 380);
        let detector = DocumentDetector::default();
        assert_eq!(detector.detect(&frame), detector.detect(&frame));
    }

    #[test]
    fn shoelace_area_of_rectangle() {
        let points = [
            Point::new(0i32, 0),
            Point::new(10, 0),
            Point::new(10, 5),
            Point::new(0, 5),
        ];
        assert!((contour_area(&points) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn otsu_separates_bimodal_histogram() {
        let mut img = GrayImage::from_pixel(100, 100, Luma([30u8]));
        for y in 0..100 {
            for x in 0..50 {
                img.put_pixel(x, y, Luma([220u8]));
            }
        }
        let threshold = otsu_threshold(&img);
        assert!((30..220).contains(&(threshold as i32)));
    }
}
