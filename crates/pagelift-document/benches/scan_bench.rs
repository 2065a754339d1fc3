// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Criterion benchmarks for the scan pipeline in the pagelift-document crate.
// Benchmarks detection and enhancement on a synthetic camera-resolution
// frame, the per-frame hot path of a live preview.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgb, RgbImage};

use pagelift_core::EnhanceConfig;
use pagelift_document::scan::enhance;
use pagelift_document::{DocumentDetector, Frame};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Dark 640x480 frame with a bright off-axis document rectangle, the same
/// pattern the detector unit tests use.
fn synthetic_frame() -> Frame {
    let mut img = RgbImage::from_pixel(640, 480, Rgb([18, 18, 22]));
    for y in 90..400 {
        for x in 140..520 {
            img.put_pixel(x, y, Rgb([235, 232, 225]));
        }
    }
    Frame::from_rgb(img)
}

/// Benchmark one full detection pass at camera resolution. This runs on
/// every preview frame, so it dominates interactive latency.
fn bench_detect(c: &mut Criterion) {
    let frame = synthetic_frame();
    let detector = DocumentDetector::default();

    c.bench_function("detect (640x480)", |b| {
        b.iter(|| black_box(detector.detect(black_box(&frame))));
    });
}

/// Benchmark the enhancement pass (adaptive stats, CLAHE, unsharp mask,
/// color classification). Runs once per accepted capture, not per frame.
fn bench_enhance(c: &mut Criterion) {
    let frame = synthetic_frame();
    let config = EnhanceConfig::default();

    c.bench_function("enhance (640x480)", |b| {
        b.iter(|| black_box(enhance::enhance(black_box(&frame), &config)));
    });
}

criterion_group!(benches, bench_detect, bench_enhance);
criterion_main!(benches);
