use chrono::{DateTime, Duration, TimeZone, Utc};
use seisplot::chart::{DEFAULT_SPAN_MS, MAX_DEFERRED_COMMANDS};
use seisplot::command::{ChartCommand, CommandQueue};
use seisplot::data_types::{ChannelCodes, ChartConfig, Marker, MarkerKind, Segment};
use seisplot::surface::{Element, SurfaceOp};
use seisplot::utils::to_ms;
use seisplot::zoom_controller::ZoomEvent;
use seisplot::{Chart, ChartError, ChartState, RecordingSurface, RedrawReason, ZoomTransform};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration as StdDuration, Instant};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// One minute of a 100 Hz sine with the given peak amplitude.
fn minute_segment(station: &str, offset_s: i64, amplitude: f64) -> Segment {
    let samples: Vec<f64> = (0..6000)
        .map(|i| (i as f64 * 0.01).sin() * amplitude)
        .collect();
    Segment::new(
        ChannelCodes::new("IU", station, "00", "BHZ"),
        t0() + Duration::seconds(offset_s),
        100.0,
        samples,
    )
    .unwrap()
}

/// 495x160 outer size leaves a 400x100 plot with the default margins.
fn chart(segments: Vec<Segment>) -> Chart<RecordingSurface> {
    Chart::new(
        Some(RecordingSurface::new(495.0, 160.0)),
        segments,
        ChartConfig::default(),
    )
    .unwrap()
}

fn position(ops: &[SurfaceOp], id: &str) -> usize {
    ops.iter()
        .position(|op| *op == SurfaceOp::Upsert(id.to_string()))
        .unwrap_or_else(|| panic!("{} was never drawn", id))
}

#[test]
fn test_missing_surface_is_fatal() {
    let result = Chart::<RecordingSurface>::new(None, vec![minute_segment("ANMO", 0, 1.0)], ChartConfig::default());
    assert_eq!(result.err(), Some(ChartError::MissingSurface));
}

#[test]
fn test_invalid_surface_size() {
    let result = Chart::new(
        Some(RecordingSurface::new(f32::NAN, 100.0)),
        vec![minute_segment("ANMO", 0, 1.0)],
        ChartConfig::default(),
    );
    assert!(matches!(result, Err(ChartError::InvalidSurface { .. })));

    let result = Chart::new(
        Some(RecordingSurface::new(-5.0, 100.0)),
        vec![minute_segment("ANMO", 0, 1.0)],
        ChartConfig::default(),
    );
    assert!(matches!(result, Err(ChartError::InvalidSurface { .. })));
}

#[test]
fn test_empty_domain_needs_explicit_window() {
    let result = Chart::new(Some(RecordingSurface::new(495.0, 160.0)), vec![], ChartConfig::default());
    assert_eq!(result.err(), Some(ChartError::EmptyDomain));

    let chart = Chart::with_domain(
        Some(RecordingSurface::new(495.0, 160.0)),
        vec![],
        t0(),
        t0() + Duration::minutes(1),
        ChartConfig::default(),
    )
    .unwrap();
    assert_eq!(chart.scales().y().domain(), (-1.0, 1.0));
    assert_eq!(chart.scales().y_axis().domain(), (-1.0, 1.0));
}

#[test]
fn test_invalid_config_rejected() {
    let config = ChartConfig {
        compressed_cutoff: 0.0,
        ..Default::default()
    };
    let result = Chart::new(
        Some(RecordingSurface::new(495.0, 160.0)),
        vec![minute_segment("ANMO", 0, 1.0)],
        config,
    );
    assert!(matches!(result, Err(ChartError::InvalidConfig(_))));
}

#[test]
fn test_degenerate_time_domain_gets_default_span() {
    let single = Segment::new(ChannelCodes::new("IU", "ANMO", "00", "BHZ"), t0(), 1.0, vec![3.0]).unwrap();
    let chart = Chart::new(
        Some(RecordingSurface::new(495.0, 160.0)),
        vec![single],
        ChartConfig::default(),
    )
    .unwrap();
    let (d0, d1) = chart.scales().x().domain();
    assert!(d1 - d0 >= DEFAULT_SPAN_MS);
    assert!(d0 <= to_ms(t0()) && d1 >= to_ms(t0()));
}

#[test]
fn test_surface_sizing_rules() {
    let chart = Chart::new(
        Some(RecordingSurface::new(0.0, 0.0)),
        vec![minute_segment("ANMO", 0, 1.0)],
        ChartConfig::default(),
    )
    .unwrap();
    assert_eq!(chart.outer_size().width, 200.0);
    assert_eq!(chart.outer_size().height, 100.0);
    assert_eq!(chart.plot_size().width, 105.0);
    assert_eq!(chart.plot_size().height, 40.0);

    let chart = chart_of_size(495.0, 160.0);
    assert_eq!(chart.plot_size().width, 400.0);
    assert_eq!(chart.plot_size().height, 100.0);
    let rect = chart.plot_rect();
    assert_eq!((rect.origin.x, rect.origin.y), (75.0, 20.0));
}

fn chart_of_size(w: f32, h: f32) -> Chart<RecordingSurface> {
    Chart::new(
        Some(RecordingSurface::new(w, h)),
        vec![minute_segment("ANMO", 0, 1.0)],
        ChartConfig::default(),
    )
    .unwrap()
}

#[test]
fn test_built_state_emits_only_clip() {
    let mut chart = chart(vec![minute_segment("ANMO", 0, 1.0)]);
    assert_eq!(chart.state(), ChartState::Built);
    assert!(chart.clip_id().starts_with("clippath_"));
    assert_eq!(chart.surface().ops(), &[SurfaceOp::Clip(chart.clip_id().to_string())]);

    let clip = chart.surface().clip(chart.clip_id()).unwrap();
    assert_eq!(clip, chart.plot_rect());

    // zooming before the first draw moves the transform but emits nothing
    assert!(chart.zoom_by(2.0, 0.0));
    assert_eq!(chart.surface().ops().len(), 1);
    assert!(chart.last_redraw().is_none());
}

#[test]
fn test_draw_emits_layers_in_order() {
    let seg = minute_segment("ANMO", 0, 1.0);
    let mut chart = chart(vec![seg.clone()]);
    chart.add_marker(Marker::new("P", t0() + Duration::seconds(20), MarkerKind::Phase));
    chart.draw();
    assert_eq!(chart.state(), ChartState::Drawn);

    let ops = chart.surface().ops().to_vec();
    let path = position(&ops, &chart.path_id(seg.id()));
    let x_axis = position(&ops, &chart.element_id("x_axis"));
    let y_axis = position(&ops, &chart.element_id("y_axis"));
    let marker = position(&ops, &chart.marker_id(&Marker::new("P", t0() + Duration::seconds(20), MarkerKind::Phase).key()));
    let label = position(&ops, &chart.element_id("x_label"));
    assert!(path < x_axis && x_axis < y_axis && y_axis < marker && marker < label);

    let report = chart.last_redraw().unwrap();
    assert_eq!(report.reason, RedrawReason::Initial);
    assert_eq!(report.paths, 1);
    assert_eq!(report.markers, 1);
    assert!(report.axes && report.labels);
}

#[test]
fn test_element_ids() {
    let seg = minute_segment("ANMO", 0, 1.0);
    let chart = chart(vec![seg.clone()]);
    let suffix = &chart.clip_id()["clippath_".len()..];

    let path_id = chart.path_id(seg.id());
    assert_eq!(path_id, format!("IU.ANMO.00.BHZ_2024-01-01T00:00:00.000000Z_{}", suffix));
    assert_eq!(chart.element_id("x_axis"), format!("x_axis_{}", suffix));

    // every chart gets its own ids
    let other = self::chart(vec![seg.clone()]);
    assert_ne!(other.path_id(seg.id()), path_id);
}

#[test]
fn test_minute_scenario_through_chart() {
    let seg = minute_segment("ANMO", 0, 1.0);
    let mut chart = chart(vec![seg.clone()]);
    chart.draw();

    // domain niced to exactly one minute over 400 px: 15 samples per pixel
    let s = to_ms(t0());
    assert_eq!(chart.scales().x().domain(), (s, s + 60_000.0));
    assert_eq!(chart.max_zoom(), 512.0);

    let report = chart.last_redraw().unwrap();
    assert_eq!(report.compressed, 1);
    let Some(Element::Path(path)) = chart.surface().element(&chart.path_id(seg.id())) else {
        panic!("segment path missing");
    };
    assert_eq!(path.runs.len(), 1);
    assert_eq!(path.runs[0].len(), 800);
    assert_eq!(path.clip_id.as_deref(), Some(chart.clip_id()));

    assert!(chart.zoom_by(8.0, 0.0));
    let report = chart.last_redraw().unwrap();
    assert_eq!(report.reason, RedrawReason::Zoomed);
    assert_eq!(report.compressed, 0);
    assert!(!report.labels);
    let Some(Element::Path(path)) = chart.surface().element(&chart.path_id(seg.id())) else {
        panic!("segment path missing");
    };
    // 7.5 s visible at 100 Hz, plus the neighbours just outside
    assert_eq!(path.runs[0].len(), 752);
}

#[test]
fn test_append_updates_amplitude_symmetrically() {
    let mut chart = chart(vec![minute_segment("ANMO", 0, 1.0)]);
    chart.draw();
    let (lo, hi) = chart.scales().y_axis().domain();
    assert_eq!((lo, hi), (-1.0, 1.0));

    let louder = minute_segment("COLA", 0, 5.0);
    chart.append(louder.clone());
    assert_eq!(chart.segments().len(), 2);

    let (lo2, hi2) = chart.scales().y_axis().domain();
    assert!(hi2 > hi);
    assert_eq!(lo2, -hi2);
    let report = chart.last_redraw().unwrap();
    assert_eq!(report.reason, RedrawReason::Appended);
    assert!(report.axes);
    assert_eq!(report.paths, 2);
    assert!(chart.surface().element(&chart.path_id(louder.id())).is_some());
}

#[test]
fn test_append_within_range_leaves_axes() {
    let mut chart = chart(vec![minute_segment("ANMO", 0, 1.0)]);
    chart.draw();
    chart.surface_mut().clear_ops();

    chart.append(minute_segment("COLA", 0, 0.5));
    let report = chart.last_redraw().unwrap();
    assert!(!report.axes);
    let x_axis = SurfaceOp::Upsert(chart.element_id("x_axis"));
    assert!(!chart.surface().ops().contains(&x_axis));
}

#[test]
fn test_append_same_identity_replaces() {
    let seg = minute_segment("ANMO", 0, 1.0);
    let mut chart = chart(vec![seg.clone()]);
    chart.draw();

    let replacement = minute_segment("ANMO", 0, 3.0);
    assert_eq!(seg.id(), replacement.id());
    chart.append(replacement);
    assert_eq!(chart.segments().len(), 1);
    assert_eq!(chart.segments()[0].min_max().map(|(_, hi)| hi > 2.0), Some(true));
    assert_eq!(chart.surface().paths().count(), 1);
}

#[test]
fn test_construction_keeps_last_of_same_identity() {
    let quiet = minute_segment("ANMO", 0, 1.0);
    let loud = minute_segment("ANMO", 0, 1000.0);
    assert_eq!(quiet.id(), loud.id());
    let mut chart = chart(vec![quiet, minute_segment("COLA", 0, 1.0), loud.clone()]);
    assert_eq!(chart.segments().len(), 2);
    assert_eq!(chart.segments()[0].id(), loud.id());
    assert!(chart.scales().y_axis().domain().1 >= 999.0);

    chart.draw();
    assert_eq!(chart.renderer().cache().computations(), 2);
    let Some(Element::Path(path)) = chart.surface().element(&chart.path_id(loud.id())) else {
        panic!("segment path missing");
    };
    // the envelope reaches the top of the plot, so the loud peak survived
    let top = chart.plot_rect().origin.y;
    let highest = path.runs[0].iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
    assert!(highest - top < 5.0);
}

#[test]
fn test_append_all_redraws_once() {
    let mut chart = chart(vec![minute_segment("ANMO", 0, 1.0)]);
    chart.draw();
    chart.surface_mut().clear_ops();

    chart.append_all(vec![minute_segment("COLA", 0, 1.0), minute_segment("KONO", 0, 1.0)]);
    assert_eq!(chart.segments().len(), 3);
    let path_writes = chart
        .surface()
        .ops()
        .iter()
        .filter(|op| matches!(op, SurfaceOp::Upsert(id) if id.starts_with("IU.")))
        .count();
    assert_eq!(path_writes, 3);
}

#[test]
fn test_trim_drops_old_segments() {
    let early = minute_segment("ANMO", 0, 1.0);
    let late = minute_segment("ANMO", 120, 4.0);
    let mut chart = chart(vec![early.clone(), late.clone()]);
    chart.draw();
    assert!(chart.renderer().cache().get(early.id()).is_some());

    let removed = chart.trim(t0() + Duration::seconds(90));
    assert_eq!(removed, 1);
    assert_eq!(chart.segments().len(), 1);
    assert!(chart.surface().element(&chart.path_id(early.id())).is_none());
    assert!(chart.surface().element(&chart.path_id(late.id())).is_some());
    assert!(chart.renderer().cache().get(early.id()).is_none());
    assert_eq!(chart.last_redraw().unwrap().reason, RedrawReason::Trimmed);

    // nothing older than the cutoff left
    assert_eq!(chart.trim(t0() + Duration::seconds(90)), 0);

    assert_eq!(chart.trim(t0() + Duration::days(1)), 1);
    assert!(chart.segments().is_empty());
    assert_eq!(chart.scales().y_axis().domain(), (-1.0, 1.0));
    assert_eq!(chart.surface().paths().count(), 0);
}

#[test]
fn test_resize_is_debounced() {
    let mut chart = chart(vec![minute_segment("ANMO", 0, 1.0)]);
    chart.draw();
    let start = Instant::now();

    chart.resize_needed(600.0, 300.0, start);
    chart.resize_needed(800.0, 300.0, start + StdDuration::from_millis(100));
    assert!(chart.resize_pending());
    assert!(!chart.poll(start + StdDuration::from_millis(200)));
    assert_eq!(chart.outer_size().width, 495.0);

    assert!(chart.poll(start + StdDuration::from_millis(400)));
    assert!(!chart.resize_pending());
    assert_eq!(chart.outer_size().width, 800.0);
    assert_eq!(chart.outer_size().height, 300.0);
    assert_eq!(chart.plot_size().width, 705.0);
    assert_eq!(chart.plot_size().height, 240.0);
    assert_eq!(chart.scales().x().range(), (0.0, 705.0));
    assert_eq!(chart.surface().clip(chart.clip_id()), Some(chart.plot_rect()));
    assert_eq!(chart.last_redraw().unwrap().reason, RedrawReason::Resized);

    assert!(!chart.poll(start + StdDuration::from_secs(5)));
}

#[test]
fn test_resize_clamps_to_minimum() {
    let mut chart = chart(vec![minute_segment("ANMO", 0, 1.0)]);
    chart.resize(10.0, 10.0);
    assert_eq!(chart.outer_size().width, 200.0);
    assert_eq!(chart.outer_size().height, 100.0);
}

#[test]
fn test_resize_keeps_zoom_within_plot() {
    let mut chart = chart(vec![minute_segment("ANMO", 0, 1.0)]);
    chart.draw();
    chart.scale_to(4.0, 400.0);
    chart.resize(295.0, 160.0);

    let (_, d1) = chart.x_scale().domain();
    let (_, base_end) = chart.scales().x().domain();
    assert!(d1 <= base_end + 1e-6);
}

#[test]
fn test_set_plot_start_redraws_after_debounce() {
    let mut chart = chart(vec![minute_segment("ANMO", 0, 1.0)]);
    chart.draw();
    let now = Instant::now();
    let s = to_ms(t0());

    chart.set_plot_start(t0() + Duration::seconds(10), now);
    assert_eq!(chart.scales().x().domain().0, s + 10_000.0);
    assert_eq!(chart.plot_start(), t0() + Duration::seconds(10));
    assert!(chart.resize_pending());
    assert!(chart.poll(now + StdDuration::from_millis(300)));

    chart.set_plot_end(t0() + Duration::seconds(40), now);
    assert_eq!(chart.plot_end(), t0() + Duration::seconds(40));
}

#[test]
fn test_inverted_domain_falls_back() {
    let mut chart = chart(vec![minute_segment("ANMO", 0, 1.0)]);
    chart.draw();
    chart.set_domain(t0() + Duration::seconds(30), t0());
    let (d0, d1) = chart.scales().x().domain();
    assert_eq!(d1 - d0, DEFAULT_SPAN_MS);
    assert_eq!(chart.last_redraw().unwrap().reason, RedrawReason::DomainChanged);
}

#[test]
fn test_reset_zoom_restores_scale() {
    let mut chart = chart(vec![minute_segment("ANMO", 0, 1.0)]);
    chart.draw();
    let original = *chart.scales().x();

    chart.zoom_by(6.0, 130.0);
    chart.drag_by(-40.0);
    chart.translate_by(15.0);
    assert_ne!(chart.x_scale(), original);

    assert!(chart.reset_zoom());
    assert_eq!(chart.zoom_transform(), ZoomTransform::IDENTITY);
    assert_eq!(chart.x_scale(), original);
}

#[test]
fn test_listener_commands_run_after_redraw() {
    let mut chart = chart(vec![minute_segment("ANMO", 0, 1.0)]);
    chart.draw();

    let fired = Rc::new(Cell::new(false));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let extra = minute_segment("COLA", 0, 1.0);
    let flag = fired.clone();
    let log = seen.clone();
    chart.add_zoom_listener(move |event: &ZoomEvent, commands: &mut CommandQueue| {
        log.borrow_mut().push(event.transform.k);
        if !flag.replace(true) {
            commands.push(ChartCommand::Append(extra.clone()));
            commands.push(ChartCommand::AddMarker(Marker::new(
                "S",
                t0() + Duration::seconds(30),
                MarkerKind::Phase,
            )));
        }
    });

    assert!(chart.zoom_by(2.0, 200.0));
    assert!(fired.get());
    assert_eq!(*seen.borrow(), vec![2.0]);
    assert_eq!(chart.segments().len(), 2);
    assert_eq!(chart.markers().len(), 1);
    assert_eq!(chart.last_redraw().unwrap().reason, RedrawReason::MarkersChanged);
}

#[test]
fn test_runaway_listener_is_bounded() {
    let mut chart = chart(vec![minute_segment("ANMO", 0, 1.0)]);
    chart.draw();

    let calls = Rc::new(Cell::new(0usize));
    let counter = calls.clone();
    chart.add_zoom_listener(move |_: &ZoomEvent, commands: &mut CommandQueue| {
        counter.set(counter.get() + 1);
        commands.push(ChartCommand::ResetZoom);
    });

    assert!(chart.zoom_by(2.0, 0.0));
    assert_eq!(calls.get(), MAX_DEFERRED_COMMANDS + 1);
    assert_eq!(chart.zoom_transform(), ZoomTransform::IDENTITY);
}

#[test]
fn test_apply_config() {
    let mut chart = chart(vec![minute_segment("ANMO", 0, 1.0)]);
    chart.draw();

    let bad = ChartConfig {
        max_zoom_pixel_per_sample: -1.0,
        ..ChartConfig::default()
    };
    assert!(matches!(chart.apply_config(bad), Err(ChartError::InvalidConfig(_))));
    assert_eq!(chart.config(), &ChartConfig::default());

    let mut config = ChartConfig::default();
    config.labels.title = Some("IU.ANMO M6.1".to_string());
    config.margins.left = 95.0;
    config.max_zoom_pixel_per_sample = 40.0;
    chart.apply_config(config).unwrap();

    assert_eq!(chart.plot_size().width, 380.0);
    assert_eq!(chart.max_zoom(), 1024.0);
    let Some(Element::Text(title)) = chart.surface().element(&chart.element_id("title")) else {
        panic!("title missing");
    };
    assert_eq!(title.text, "IU.ANMO M6.1");
    assert_eq!(chart.last_redraw().unwrap().reason, RedrawReason::Configured);

    // removing the title removes its element
    chart.apply_config(ChartConfig::default()).unwrap();
    assert!(chart.surface().element(&chart.element_id("title")).is_none());
}

#[test]
fn test_axis_labels_positions() {
    let mut chart = chart(vec![minute_segment("ANMO", 0, 1.0)]);
    chart.draw();

    let Some(Element::Text(x_label)) = chart.surface().element(&chart.element_id("x_label")) else {
        panic!("x label missing");
    };
    assert_eq!(x_label.text, "Time");
    assert_eq!((x_label.position.x, x_label.position.y), (275.0, 154.0));
    assert_eq!(x_label.rotation, 0.0);

    let Some(Element::Text(y_label)) = chart.surface().element(&chart.element_id("y_label")) else {
        panic!("y label missing");
    };
    assert_eq!(y_label.text, "Amplitude");
    assert_eq!(y_label.position.y, 70.0);
    assert_eq!(y_label.rotation, -90.0);

    assert!(chart.surface().element(&chart.element_id("x_sublabel")).is_none());
    assert!(chart.surface().element(&chart.element_id("title")).is_none());
}

#[test]
fn test_axes_follow_zoom() {
    let mut chart = chart(vec![minute_segment("ANMO", 0, 1.0)]);
    chart.draw();

    let Some(Element::Axis(before)) = chart.surface().element(&chart.element_id("x_axis")).cloned() else {
        panic!("x axis missing");
    };
    chart.zoom_by(4.0, 0.0);
    let Some(Element::Axis(after)) = chart.surface().element(&chart.element_id("x_axis")).cloned() else {
        panic!("x axis missing");
    };
    assert_ne!(before.ticks, after.ticks);
    let (d0, d1) = chart.x_scale().domain();
    assert!(after.ticks.iter().all(|t| t.value >= d0 && t.value <= d1));
    assert_eq!(after.origin.y, 120.0);
}
