use chrono::{DateTime, TimeZone, Utc};
use rand::Rng;
use seisplot::data_types::{ChannelCodes, ScreenPoint, ScreenRect, Segment, Size};
use seisplot::decimation::{bucket_min_max, compute_envelope, pixel_count};
use seisplot::renderer::{DecimationRenderer, RenderMode};
use seisplot::scales::LinearScale;
use seisplot::transform::{PlotTransform, ZoomTransform};
use seisplot::utils::to_ms;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn segment(rate: f64, samples: Vec<f64>) -> Segment {
    Segment::new(ChannelCodes::new("IU", "ANMO", "00", "BHZ"), start(), rate, samples).unwrap()
}

/// Time scale over `seconds` of data starting at `start()`, `width` pixels wide.
fn scale_over(seconds: f64, width: f64) -> LinearScale {
    let s = to_ms(start());
    LinearScale::new((s, s + seconds * 1000.0), (0.0, width))
}

#[test]
fn test_minute_at_100hz_on_400px() {
    let samples: Vec<f64> = (0..6000).map(|i| (i as f64 * 0.01).sin()).collect();
    let seg = segment(100.0, samples);
    let scale = scale_over(60.0, 400.0);
    let mut renderer = DecimationRenderer::default();

    let spp = DecimationRenderer::samples_per_pixel(&seg, &scale);
    assert!((spp - 15.0).abs() < 1e-9, "expected 15 samples per pixel, got {}", spp);

    let points = renderer.segment_points(&seg, &scale);
    assert_eq!(points.mode, RenderMode::Compressed);
    assert_eq!(points.points.len(), 2 * 400);

    // 8x zoom leaves 1.875 samples per pixel, below the default cutoff of 10
    let zoomed = ZoomTransform::new(8.0, 0.0).rescale_x(&scale);
    let spp = DecimationRenderer::samples_per_pixel(&seg, &zoomed);
    assert!((spp - 1.875).abs() < 1e-9, "got {}", spp);
    let points = renderer.segment_points(&seg, &zoomed);
    assert_eq!(points.mode, RenderMode::Full);
    assert_eq!(points.points.len(), 6000);
}

#[test]
fn test_cutoff_crossover() {
    let seg = segment(100.0, vec![0.0; 6000]);
    let renderer = DecimationRenderer::new(10.0);

    // 10 samples per pixel exactly: compressed
    let scale = scale_over(60.0, 600.0);
    assert_eq!(renderer.mode_for(&seg, &scale), RenderMode::Compressed);

    // just under: full
    let scale = scale_over(60.0, 601.0);
    assert_eq!(renderer.mode_for(&seg, &scale), RenderMode::Full);
}

#[test]
fn test_full_mode_uses_exact_sample_times() {
    let seg = segment(20.0, vec![1.0, 2.0, 3.0, 4.0]);
    let scale = scale_over(10.0, 1000.0);
    let mut renderer = DecimationRenderer::default();

    let points = renderer.segment_points(&seg, &scale);
    assert_eq!(points.mode, RenderMode::Full);
    let s = to_ms(start());
    let times: Vec<f64> = points.points.iter().map(|(t, _)| *t).collect();
    assert_eq!(times, vec![s, s + 50.0, s + 100.0, s + 150.0]);
}

#[test]
fn test_compressed_point_bound_random() {
    let mut rng = rand::rng();
    let mut renderer = DecimationRenderer::default();

    for _ in 0..50 {
        let rate = rng.random_range(1.0..500.0);
        let n = rng.random_range(1..20_000);
        let width = rng.random_range(50.0..1500.0);
        let seconds = rng.random_range(1.0..600.0);
        let samples: Vec<f64> = (0..n).map(|_| rng.random_range(-1000.0..1000.0)).collect();
        let seg = segment(rate, samples);
        let scale = scale_over(seconds, width);

        let points = renderer.segment_points(&seg, &scale);
        match points.mode {
            RenderMode::Full => assert_eq!(points.points.len(), n),
            RenderMode::Compressed => {
                let bound = 2 * pixel_count(n, points.samples_per_pixel);
                assert!(
                    points.points.len() <= bound,
                    "{} points exceed bound {}",
                    points.points.len(),
                    bound
                );
            }
        }
    }
}

#[test]
fn test_envelope_contains_every_sample() {
    let mut rng = rand::rng();

    for _ in 0..20 {
        let n = rng.random_range(100..50_000);
        let spp: f64 = rng.random_range(10.0..200.0);
        let samples: Vec<f64> = (0..n).map(|_| rng.random_range(-1e6..1e6)).collect();

        let envelope = compute_envelope(&samples, spp);
        assert_eq!(envelope.len(), pixel_count(n, spp));

        for bucket in &envelope {
            let lo = ((bucket.pixel as f64 * spp).floor() as usize).min(n);
            let hi = (((bucket.pixel + 1) as f64 * spp).floor() as usize).min(n);
            for &v in &samples[lo..hi] {
                assert!(bucket.low <= v && v <= bucket.high);
            }
            // bounds are actual samples, not padding
            assert!(samples[lo..hi].contains(&bucket.low));
            assert!(samples[lo..hi].contains(&bucket.high));
        }
    }
}

#[test]
fn test_parallel_envelope_matches_per_bucket_scan() {
    let mut rng = rand::rng();
    // large enough to take the rayon path
    let samples: Vec<f64> = (0..200_000).map(|_| rng.random_range(-1.0..1.0)).collect();
    let spp = 37.5;

    let envelope = compute_envelope(&samples, spp);
    assert_eq!(envelope.len(), pixel_count(samples.len(), spp));
    for (i, bucket) in envelope.iter().enumerate() {
        assert_eq!(bucket.pixel, i);
        let lo = (i as f64 * spp).floor() as usize;
        let hi = (((i + 1) as f64 * spp).floor() as usize).min(samples.len());
        assert_eq!(bucket_min_max(&samples[lo..hi]), Some((bucket.low, bucket.high)));
    }
}

#[test]
fn test_nan_gap_splits_full_path() {
    let mut samples = vec![1.0; 40];
    samples[20] = f64::NAN;
    samples[21] = f64::NAN;
    let seg = segment(10.0, samples);
    let scale = scale_over(4.0, 400.0);
    let y = LinearScale::new((-2.0, 2.0), (100.0, 0.0));
    let transform = PlotTransform::new(
        scale,
        y,
        ScreenRect::new(ScreenPoint::new(75.0, 20.0), Size::new(400.0, 100.0)),
    );
    let mut renderer = DecimationRenderer::default();

    let runs = renderer.segment_path(&seg, &transform);
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].len(), 20);
    assert_eq!(runs[1].len(), 18);
    // first point sits on the plot's left edge, at amplitude 1
    assert_eq!(runs[0][0], ScreenPoint::new(75.0, 45.0));
}

#[test]
fn test_path_culls_to_visible_domain() {
    let seg = segment(10.0, (0..100).map(|i| i as f64).collect());
    let s = to_ms(start());
    // show seconds 2..4 only
    let x = LinearScale::new((s + 2000.0, s + 4000.0), (0.0, 200.0));
    let y = LinearScale::new((0.0, 100.0), (100.0, 0.0));
    let transform = PlotTransform::new(x, y, ScreenRect::new(ScreenPoint::default(), Size::new(200.0, 100.0)));
    let mut renderer = DecimationRenderer::default();

    let runs = renderer.segment_path(&seg, &transform);
    assert_eq!(runs.len(), 1);
    // samples 20..=40 plus one neighbour on each side
    assert_eq!(runs[0].len(), 23);
    assert!(runs[0][0].x < 0.0);
    assert!(runs[0][22].x > 200.0);
}
