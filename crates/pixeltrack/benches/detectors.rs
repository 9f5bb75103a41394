use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pixeltrack::cascade::{scan, CascadeClassifier, ViolaJonesParams};
use pixeltrack::color::{ColorParams, ColorTracker};
use pixeltrack::core::{GrayImage, IntegralImageBuilder, RgbaImageView, Tracker};
use pixeltrack::keypoints::FastCornerDetector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Noisy gray frame with a few bright squares.
fn gray_fixture(width: usize, height: usize, seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut img = GrayImage::new(width, height);
    for v in img.data.iter_mut() {
        *v = rng.gen_range(20..60);
    }
    for _ in 0..12 {
        let side = rng.gen_range(8..40);
        let x0 = rng.gen_range(0..width - side);
        let y0 = rng.gen_range(0..height - side);
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                img.data[y * width + x] = 220;
            }
        }
    }
    img
}

fn rgba_fixture(gray: &GrayImage) -> Vec<u8> {
    gray.data
        .iter()
        .flat_map(|&v| if v > 200 { [255, 0, 255, 255] } else { [v, v, v, 255] })
        .collect()
}

/// Two-stage classifier with an upright and a tilted feature.
fn bench_classifier() -> CascadeClassifier {
    CascadeClassifier::from_flat(&[
        20.0, 20.0, //
        0.5, 1.0, 0.0, 2.0, 2.0, 2.0, 16.0, 8.0, -1.0, 2.0, 10.0, 16.0, 8.0, 1.0, 0.01, 0.0, 1.0, //
        0.5, 1.0, 1.0, 1.0, 8.0, 2.0, 6.0, 4.0, 1.0, 0.1, 0.0, 1.0,
    ])
    .unwrap_or_else(|e| panic!("bench classifier: {e}"))
}

fn bench_integral(c: &mut Criterion) {
    let img = gray_fixture(320, 240, 7);
    let builder = IntegralImageBuilder::new(true);
    c.bench_function("integral_320x240_edges", |b| {
        b.iter(|| black_box(builder.build(black_box(&img.view()))).sum.len())
    });
}

fn bench_cascade(c: &mut Criterion) {
    let img = gray_fixture(320, 240, 11);
    let integral = IntegralImageBuilder::new(true).build(&img.view());
    let classifier = bench_classifier();
    let params = ViolaJonesParams::default();
    c.bench_function("cascade_scan_320x240", |b| {
        b.iter(|| {
            black_box(scan(black_box(&integral), &params, &classifier))
                .map(|hits| hits.len())
                .unwrap_or(0)
        })
    });
}

fn bench_fast(c: &mut Criterion) {
    let img = gray_fixture(640, 480, 13);
    let detector = FastCornerDetector::default();
    c.bench_function("fast_640x480", |b| {
        b.iter(|| black_box(detector.find_corners(black_box(&img.view()))).len())
    });
}

fn bench_color(c: &mut Criterion) {
    let gray = gray_fixture(640, 480, 17);
    let data = rgba_fixture(&gray);
    let tracker = ColorTracker::with_builtins(ColorParams::default())
        .unwrap_or_else(|e| panic!("color tracker: {e}"));
    c.bench_function("color_magenta_640x480", |b| {
        b.iter(|| {
            let frame = RgbaImageView {
                width: 640,
                height: 480,
                data: black_box(&data),
            };
            tracker.track(&frame).map(|r| r.len()).unwrap_or(0)
        })
    });
}

criterion_group!(benches, bench_integral, bench_cascade, bench_fast, bench_color);
criterion_main!(benches);
