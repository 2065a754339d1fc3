// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scan enhancement pipeline — adaptive contrast, contrast-limited histogram
// equalization, unsharp masking, and color-aware saturation boosting for
// captured document frames.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::filter::gaussian_blur_f32;
use palette::{FromColor, Hsv, Lab, LinSrgb, Srgb};
use pagelift_core::EnhanceConfig;
use tracing::{debug, instrument};

use crate::image::Frame;

/// Give a captured frame the "scanned document" look.
///
/// A sharpened, locally equalized grayscale is computed first, then the
/// frame is classified by its mean pairwise channel difference:
///
/// - pure monochrome: the sharpened grayscale is the output;
/// - tinted monochrome: saturation is boosted and the HSV value channel is
///   replaced by the sharpened grayscale;
/// - color: saturation is boosted more gently, the value channel blends the
///   original with the sharpened grayscale to keep brightness
///   relationships, and Lab chroma gets a final linear lift.
///
/// Output dimensions always match the input frame.
#[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
pub fn enhance(frame: &Frame, config: &EnhanceConfig) -> RgbImage {
    let gray = frame.to_luma();
    // Near-identity smoothing; just enough to stop single-pixel sensor
    // noise from dominating the equalization histograms.
    let smoothed = gaussian_blur_f32(&gray, 0.5);

    // Auxiliary contrast reference only; the binarized image is never the
    // output.
    let reference = adaptive_threshold(
        &smoothed,
        config.adaptive_block_radius,
        config.adaptive_bias,
    );
    debug!(
        ink_ratio = ink_coverage(&reference),
        "Adaptive binarization reference computed"
    );

    let equalized = clahe(&smoothed, config.clahe_clip_limit, config.clahe_grid);
    let sharpened = unsharp_mask(&equalized, config.sharpen_amount, config.sharpen_sigma);

    let spread = mean_channel_spread(frame.as_rgb());
    if spread < config.mono_threshold {
        debug!(spread, "Classified as pure monochrome");
        replicate_gray(&sharpened)
    } else if spread < config.tint_threshold {
        debug!(spread, "Classified as tinted monochrome");
        boost_tinted(frame.as_rgb(), &sharpened, config.tint_saturation_boost)
    } else {
        debug!(spread, "Classified as color document");
        let boosted = boost_color(frame.as_rgb(), &sharpened, config);
        boost_chroma(&boosted, config.chroma_boost)
    }
}

/// Mean pairwise absolute difference between the three color channels,
/// averaged over the whole image.
///
/// Zero for a perfectly desaturated image; grows with color content. The
/// measure is symmetric in the channels, so it does not depend on channel
/// ordering conventions.
pub fn mean_channel_spread(image: &RgbImage) -> f32 {
    let pixel_count = (image.width() as u64 * image.height() as u64) as f32;
    if pixel_count == 0.0 {
        return 0.0;
    }

    let mut total: f64 = 0.0;
    for Rgb([r, g, b]) in image.pixels() {
        let spread = r.abs_diff(*g) as u32 + r.abs_diff(*b) as u32 + g.abs_diff(*b) as u32;
        total += spread as f64 / 3.0;
    }
    (total / pixel_count as f64) as f32
}

// -- Grayscale stages ---------------------------------------------------------

/// Local-mean adaptive binarization over a square neighbourhood.
///
/// For each pixel the threshold is the mean intensity of the surrounding
/// `(2 * radius + 1)`-wide block, minus `bias`. Pixels above the local
/// threshold become white. Uses a summed-area table so the cost is
/// independent of the block size.
fn adaptive_threshold(gray: &GrayImage, radius: u32, bias: i32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let stride = width as usize + 1;

    // Summed-area table with a zero top/left border: integral[y][x] holds
    // the sum of all pixels in [0, x) x [0, y).
    let mut integral = vec![0u64; stride * (height as usize + 1)];
    for y in 0..height as usize {
        let mut row_sum = 0u64;
        for x in 0..width as usize {
            row_sum += gray.as_raw()[y * width as usize + x] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }

    let mut output = GrayImage::new(width, height);
    for y in 0..height {
        let y0 = y.saturating_sub(radius) as usize;
        let y1 = ((y + radius + 1) as usize).min(height as usize);
        for x in 0..width {
            let x0 = x.saturating_sub(radius) as usize;
            let x1 = ((x + radius + 1) as usize).min(width as usize);

            let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
                - integral[y0 * stride + x1]
                - integral[y1 * stride + x0];
            let area = ((x1 - x0) * (y1 - y0)) as u64;
            let threshold = (sum / area) as i32 - bias;

            let value = if (gray.get_pixel(x, y).0[0] as i32) > threshold {
                255u8
            } else {
                0u8
            };
            output.put_pixel(x, y, Luma([value]));
        }
    }
    output
}

/// Fraction of black pixels in a binary image.
fn ink_coverage(binary: &GrayImage) -> f32 {
    let total = binary.width() as u64 * binary.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let dark = binary.pixels().filter(|p| p.0[0] == 0).count() as u64;
    dark as f32 / total as f32
}

/// Contrast-limited adaptive histogram equalization.
///
/// The image is divided into a `grid` x `grid` tile lattice. Each tile gets
/// a clipped histogram (the excess redistributed uniformly across all bins,
/// bounding local contrast amplification) and a CDF lookup table. Output
/// pixels interpolate bilinearly between the four surrounding tile tables,
/// referenced at tile centres, so tile seams stay invisible.
fn clahe(gray: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }
    let grid = grid.max(1);
    let tile_w = width.div_ceil(grid).max(1);
    let tile_h = height.div_ceil(grid).max(1);

    // Identity tables cover degenerate tiles on tiny images.
    let mut tables = vec![identity_table(); (grid * grid) as usize];

    for ty in 0..grid {
        for tx in 0..grid {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            if x0 >= width || y0 >= height {
                continue;
            }
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);

            let mut histogram = [0.0f32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    histogram[gray.get_pixel(x, y).0[0] as usize] += 1.0;
                }
            }

            let pixels = ((x1 - x0) * (y1 - y0)) as f32;
            let limit = (clip_limit * pixels / 256.0).max(1.0);

            let mut excess = 0.0f32;
            for bin in histogram.iter_mut() {
                if *bin > limit {
                    excess += *bin - limit;
                    *bin = limit;
                }
            }
            let bonus = excess / 256.0;

            let table = &mut tables[(ty * grid + tx) as usize];
            let mut cumulative = 0.0f32;
            for (value, bin) in histogram.iter().enumerate() {
                cumulative += bin + bonus;
                table[value] = ((cumulative / pixels) * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    let mut output = GrayImage::new(width, height);
    for y in 0..height {
        let (ty0, ty1, wy) = tile_blend(y, tile_h, grid);
        for x in 0..width {
            let (tx0, tx1, wx) = tile_blend(x, tile_w, grid);
            let value = gray.get_pixel(x, y).0[0] as usize;

            let top = lerp(
                tables[ty0 * grid as usize + tx0][value],
                tables[ty0 * grid as usize + tx1][value],
                wx,
            );
            let bottom = lerp(
                tables[ty1 * grid as usize + tx0][value],
                tables[ty1 * grid as usize + tx1][value],
                wx,
            );
            output.put_pixel(x, y, Luma([lerp_round(top, bottom, wy)]));
        }
    }
    output
}

fn identity_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    for (value, slot) in table.iter_mut().enumerate() {
        *slot = value as u8;
    }
    table
}

/// Indices of the two tiles bracketing `pos` on one axis, and the blend
/// weight towards the second. Positions beyond the first/last tile centre
/// clamp to that tile.
fn tile_blend(pos: u32, tile_size: u32, grid: u32) -> (usize, usize, f32) {
    let f = (pos as f32 + 0.5) / tile_size as f32 - 0.5;
    let last = (grid - 1) as f32;
    if f <= 0.0 {
        (0, 0, 0.0)
    } else if f >= last {
        ((grid - 1) as usize, (grid - 1) as usize, 0.0)
    } else {
        let index = f.floor() as usize;
        (index, index + 1, f - f.floor())
    }
}

fn lerp(a: u8, b: u8, weight: f32) -> f32 {
    a as f32 + (b as f32 - a as f32) * weight
}

fn lerp_round(a: f32, b: f32, weight: f32) -> u8 {
    (a + (b - a) * weight).round().clamp(0.0, 255.0) as u8
}

/// Unsharp masking: scale the image by `amount` and subtract a Gaussian
/// blur weighted by `amount - 1.0`, emphasising edges without shifting the
/// overall brightness.
fn unsharp_mask(gray: &GrayImage, amount: f32, sigma: f32) -> GrayImage {
    let blurred = gaussian_blur_f32(gray, sigma);
    let (width, height) = gray.dimensions();
    let mut output = GrayImage::new(width, height);
    for (x, y, pixel) in gray.enumerate_pixels() {
        let sharp = amount * pixel.0[0] as f32
            - (amount - 1.0) * blurred.get_pixel(x, y).0[0] as f32;
        output.put_pixel(x, y, Luma([sharp.round().clamp(0.0, 255.0) as u8]));
    }
    output
}

// -- Classification branches --------------------------------------------------

/// Replicate a grayscale image into three identical channels.
fn replicate_gray(gray: &GrayImage) -> RgbImage {
    let mut output = RgbImage::new(gray.width(), gray.height());
    for (x, y, pixel) in gray.enumerate_pixels() {
        let v = pixel.0[0];
        output.put_pixel(x, y, Rgb([v, v, v]));
    }
    output
}

/// Tinted-monochrome branch: boost saturation and replace the value channel
/// with the sharpened grayscale outright.
fn boost_tinted(image: &RgbImage, sharpened: &GrayImage, saturation_boost: f32) -> RgbImage {
    let mut output = RgbImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let mut hsv: Hsv = Hsv::from_color(srgb_of(pixel));
        hsv.saturation = (hsv.saturation * saturation_boost).min(1.0);
        hsv.value = sharpened.get_pixel(x, y).0[0] as f32 / 255.0;
        output.put_pixel(x, y, rgb8_of(Srgb::from_color(hsv)));
    }
    output
}

/// Color branch: gentler saturation boost; the value channel blends the
/// original with the sharpened grayscale so brightness relationships
/// between colored regions survive.
fn boost_color(image: &RgbImage, sharpened: &GrayImage, config: &EnhanceConfig) -> RgbImage {
    let original_weight = config.value_blend_original;
    let mut output = RgbImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let mut hsv: Hsv = Hsv::from_color(srgb_of(pixel));
        hsv.saturation = (hsv.saturation * config.color_saturation_boost).min(1.0);
        let sharp = sharpened.get_pixel(x, y).0[0] as f32 / 255.0;
        hsv.value = original_weight * hsv.value + (1.0 - original_weight) * sharp;
        output.put_pixel(x, y, rgb8_of(Srgb::from_color(hsv)));
    }
    output
}

/// Final color lift: scale both Lab chroma channels linearly.
fn boost_chroma(image: &RgbImage, factor: f32) -> RgbImage {
    let mut output = RgbImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let linear: LinSrgb = srgb_of(pixel).into_linear();
        let mut lab: Lab = Lab::from_color(linear);
        lab.a *= factor;
        lab.b *= factor;
        let back = Srgb::from_linear(LinSrgb::from_color(lab));
        output.put_pixel(x, y, rgb8_of(back));
    }
    output
}

fn srgb_of(pixel: &Rgb<u8>) -> Srgb<f32> {
    Srgb::new(
        pixel.0[0] as f32 / 255.0,
        pixel.0[1] as f32 / 255.0,
        pixel.0[2] as f32 / 255.0,
    )
}

fn rgb8_of(color: Srgb<f32>) -> Rgb<u8> {
    let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgb([to_u8(color.red), to_u8(color.green), to_u8(color.blue)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_frame(rgb: [u8; 3]) -> Frame {
        Frame::from_rgb(RgbImage::from_pixel(64, 48, Rgb(rgb)))
    }

    #[test]
    fn channel_spread_zero_for_desaturated_image() {
        let image = RgbImage::from_pixel(32, 32, Rgb([77, 77, 77]));
        assert_eq!(mean_channel_spread(&image), 0.0);
    }

    #[test]
    fn channel_spread_of_known_tint() {
        // |r-g| = 50, |r-b| = 50, |g-b| = 0 -> 100/3 per pixel.
        let image = RgbImage::from_pixel(16, 16, Rgb([150, 100, 100]));
        assert!((mean_channel_spread(&image) - 100.0 / 3.0).abs() < 0.01);
    }

    #[test]
    fn monochrome_frame_takes_gray_branch() {
        let output = enhance(&uniform_frame([90, 90, 90]), &EnhanceConfig::default());
        assert_eq!(output.dimensions(), (64, 48));
        for pixel in output.pixels() {
            assert_eq!(pixel.0[0], pixel.0[1]);
            assert_eq!(pixel.0[1], pixel.0[2]);
        }
    }

    #[test]
    fn tinted_frame_keeps_some_color() {
        // Spread = (12 + 0 + 12) / 3 = 8: tinted-monochrome branch.
        let output = enhance(&uniform_frame([120, 132, 120]), &EnhanceConfig::default());
        assert_eq!(output.dimensions(), (64, 48));
        let centre = output.get_pixel(32, 24);
        assert!(
            centre.0[0] != centre.0[1] || centre.0[1] != centre.0[2],
            "tint should survive enhancement, got {centre:?}"
        );
    }

    #[test]
    fn color_frame_takes_color_branch() {
        // Spread = (80 + 140 + 60) / 3 ~= 93: color branch.
        let output = enhance(&uniform_frame([200, 120, 60]), &EnhanceConfig::default());
        assert_eq!(output.dimensions(), (64, 48));
        let centre = output.get_pixel(32, 24);
        assert!(centre.0[0] > centre.0[2], "red cast should survive, got {centre:?}");
    }

    #[test]
    fn unsharp_mask_preserves_flat_regions() {
        let gray = GrayImage::from_pixel(32, 32, Luma([100u8]));
        let sharpened = unsharp_mask(&gray, 1.1, 2.0);
        let centre = sharpened.get_pixel(16, 16).0[0];
        assert!((centre as i32 - 100).abs() <= 1, "got {centre}");
    }

    #[test]
    fn clahe_widens_a_compressed_range() {
        // Low-contrast horizontal gradient: values 100..=139.
        let gray = GrayImage::from_fn(256, 64, |x, _| Luma([(100 + x / 7) as u8 % 140]));
        let equalized = clahe(&gray, 1.5, 8);
        assert_eq!(equalized.dimensions(), (256, 64));

        let range = |img: &GrayImage| {
            let min = img.pixels().map(|p| p.0[0]).min().unwrap();
            let max = img.pixels().map(|p| p.0[0]).max().unwrap();
            max - min
        };
        assert!(range(&equalized) >= range(&gray));
    }

    #[test]
    fn adaptive_threshold_separates_dark_blob() {
        let mut gray = GrayImage::from_pixel(64, 64, Luma([200u8]));
        for y in 30..33 {
            for x in 30..33 {
                gray.put_pixel(x, y, Luma([50u8]));
            }
        }
        let binary = adaptive_threshold(&gray, 7, 5);
        assert_eq!(binary.get_pixel(31, 31).0[0], 0);
        assert_eq!(binary.get_pixel(5, 5).0[0], 255);
    }

    #[test]
    fn ink_coverage_counts_black_fraction() {
        let mut binary = GrayImage::from_pixel(10, 10, Luma([255u8]));
        for x in 0..10 {
            binary.put_pixel(x, 0, Luma([0u8]));
        }
        assert!((ink_coverage(&binary) - 0.1).abs() < 1e-6);
    }
}
