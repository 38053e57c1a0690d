use crate::ambient_pipeline::{
    analysis::{
        AnalyzeSettings, BUCKETS, FrameAnalyzer, WeightMap,
        analyzer::select_dominant_hue,
        histogram::{peak, window_circular},
        hsv_to_rgb, rgb_to_hsv,
    },
    common::color::{Hsv, Rgb},
    layout::ChannelLayout,
    source::Frame,
};

fn solid_frame(width: usize, height: usize, color: Rgb) -> Frame {
    let data = std::iter::repeat([color.r, color.g, color.b])
        .take(width * height)
        .flatten()
        .collect();
    Frame { width, height, data }
}

fn edge_layout() -> ChannelLayout {
    ChannelLayout { top: 3, bottom: 3, center: 1, ..Default::default() }
}

#[test]
fn test_hsv_round_trip_of_primaries_and_grays() {
    for color in [
        Rgb::new(255, 0, 0),
        Rgb::new(0, 255, 0),
        Rgb::new(0, 0, 255),
        Rgb::new(128, 0, 0),
        Rgb::new(0, 0, 0),
        Rgb::new(128, 128, 128),
        Rgb::new(255, 255, 255),
    ] {
        let hsv = rgb_to_hsv(color.r, color.g, color.b);
        assert_eq!(hsv_to_rgb(hsv.h, hsv.s, hsv.v), color, "{:?} via {:?}", color, hsv);
    }
}

#[test]
fn test_rgb_to_hsv_quantization() {
    assert_eq!(rgb_to_hsv(255, 0, 0), Hsv { h: 0, s: 255, v: 255 });
    assert_eq!(rgb_to_hsv(0, 255, 0), Hsv { h: 85, s: 255, v: 255 });
    assert_eq!(rgb_to_hsv(0, 0, 255), Hsv { h: 170, s: 255, v: 255 });
    assert_eq!(rgb_to_hsv(40, 40, 40), Hsv { h: 0, s: 0, v: 40 });
}

#[test]
fn test_window_wraps_around_hue_circle() {
    let mut src = vec![0u64; BUCKETS];
    src[0] = 1;
    let mut dst = vec![0u64; BUCKETS];

    window_circular(&src, &mut dst, 2);
    assert_eq!(dst[0], 3);
    assert_eq!(dst[1], 2);
    assert_eq!(dst[2], 1);
    assert_eq!(dst[3], 0);
    assert_eq!(dst[255], 2);
    assert_eq!(dst[254], 1);
    assert_eq!(dst[253], 0);

    window_circular(&src, &mut dst, 0);
    assert_eq!(dst, src);
}

#[test]
fn test_window_mass_is_scaled_by_window_area() {
    let mut src = vec![0u64; BUCKETS];
    src[254] = 7;
    src[3] = 2;
    for win in 0..=5u64 {
        let mut dst = vec![0u64; BUCKETS];
        window_circular(&src, &mut dst, win as u32);
        let total: u64 = dst.iter().sum();
        assert_eq!(total, 9 * (win + 1) * (win + 1));
    }
}

#[test]
fn test_peak_takes_first_maximum() {
    assert_eq!(peak(&[0, 5, 5, 1]), (1, 5));
    assert_eq!(peak(&[0, 0, 0]), (0, 0));
}

#[test]
fn test_dominant_hue_hysteresis_keeps_previous() {
    let mut hist = vec![0u64; BUCKETS];
    hist[10] = 100;
    hist[200] = 95;

    // 95 is within 93% of the new peak
    assert_eq!(select_dominant_hue(&hist, 200, 93), (200, 200));
    // but not within 96%
    assert_eq!(select_dominant_hue(&hist, 200, 96), (10, 10));
    // an empty previous bucket never wins
    assert_eq!(select_dominant_hue(&hist, 50, 0), (10, 10));
}

#[test]
fn test_dominant_hue_of_empty_histogram_resets() {
    let hist = vec![0u64; BUCKETS];
    assert_eq!(select_dominant_hue(&hist, 42, 93), (0, 0));
}

#[test]
fn test_weight_map_regions() {
    let layout = ChannelLayout { top: 2, center: 1, top_left: 1, ..Default::default() };
    let map = WeightMap::compute(&layout, 8, 4, 80);
    assert_eq!(map.channels(), 4);

    // channel order: top 0, top 1, center, top left
    let px = |row: usize, col: usize| map.pixel(row * 8 + col).to_vec();

    // top channels split the width after the top left corner slot
    let first = px(0, 0);
    assert_eq!(first[2], 255);
    assert_eq!(first[3], 255);

    let sum_top = 3;
    let start = 8 / sum_top;
    assert_eq!(px(0, start)[0], 255);
    assert_eq!(px(0, 0)[0], 0);
    assert_eq!(px(0, 7)[1], 255);

    // lower half carries no top weight
    for col in 0..8 {
        let w = px(3, col);
        assert_eq!(w[0], 0);
        assert_eq!(w[1], 0);
        assert_eq!(w[3], 0);
        assert_eq!(w[2], 255);
    }

    assert!(map.matches(&layout, 8, 4, 80));
    assert!(!map.matches(&layout, 8, 4, 90));
}

#[test]
fn test_weight_map_without_channels() {
    let map = WeightMap::compute(&ChannelLayout::default(), 16, 9, 80);
    assert_eq!(map.channels(), 0);
}

#[test]
fn test_black_frame_gives_black_channels() {
    let mut analyzer = FrameAnalyzer::new(edge_layout());
    let frame = solid_frame(64, 36, Rgb::BLACK);
    let mut out = vec![Rgb::new(1, 2, 3); 7];

    analyzer.analyze_frame(&frame, &AnalyzeSettings::default(), &mut out);

    assert!(out.iter().all(Rgb::is_black));
}

#[test]
fn test_solid_frame_colors_every_channel() {
    let mut analyzer = FrameAnalyzer::new(edge_layout());
    let frame = solid_frame(64, 36, Rgb::new(255, 0, 0));
    let mut out = vec![Rgb::BLACK; 7];

    analyzer.analyze_frame(&frame, &AnalyzeSettings::default(), &mut out);

    assert!(out.iter().all(|c| *c == Rgb::new(255, 0, 0)), "{:?}", out);
    assert!(analyzer.dominant_hues().iter().all(|&h| h == 0));
}

#[test]
fn test_brightness_scale_is_clamped() {
    let mut analyzer = FrameAnalyzer::new(ChannelLayout { center: 1, ..Default::default() });
    let settings = AnalyzeSettings { brightness: 300, ..Default::default() };
    let mut out = vec![Rgb::BLACK; 1];

    analyzer.analyze_frame(&solid_frame(64, 36, Rgb::new(0, 0, 200)), &settings, &mut out);
    assert_eq!(out[0], Rgb::new(0, 0, 255));

    let settings = AnalyzeSettings { brightness: 50, ..Default::default() };
    analyzer.analyze_frame(&solid_frame(64, 36, Rgb::new(0, 0, 200)), &settings, &mut out);
    assert_eq!(out[0], Rgb::new(0, 0, 100));
}

#[test]
fn test_hue_sticks_to_previous_scene() {
    let mut analyzer = FrameAnalyzer::new(ChannelLayout { center: 1, ..Default::default() });
    let settings = AnalyzeSettings::default();
    let mut out = vec![Rgb::BLACK; 1];

    analyzer.analyze_frame(&solid_frame(64, 36, Rgb::new(0, 0, 255)), &settings, &mut out);
    assert_eq!(analyzer.dominant_hues(), &[170]);

    // half blue, half a slightly larger share of green
    let (w, h) = (64, 36);
    let mut frame = solid_frame(w, h, Rgb::new(0, 0, 255));
    for px in frame.data.chunks_exact_mut(3).take(w * h / 2 + 20) {
        px.copy_from_slice(&[0, 255, 0]);
    }
    analyzer.analyze_frame(&frame, &settings, &mut out);
    assert_eq!(analyzer.dominant_hues(), &[170]);

    analyzer.analyze_frame(&solid_frame(w, h, Rgb::new(0, 255, 0)), &settings, &mut out);
    assert_eq!(analyzer.dominant_hues(), &[85]);
    assert_eq!(out[0], Rgb::new(0, 255, 0));
}
