use crate::ambient_pipeline::{
    common::color::Rgb,
    filter::{FilterMode, FilterSettings, TemporalFilter},
};

fn settings(mode: FilterMode, smoothness: u32) -> FilterSettings {
    FilterSettings { mode, smoothness, ..Default::default() }
}

fn gray(v: u8) -> Rgb {
    Rgb::new(v, v, v)
}

#[test]
fn test_filter_mode_names() {
    assert_eq!("off".parse::<FilterMode>().unwrap(), FilterMode::Off);
    assert_eq!("Percentage".parse::<FilterMode>().unwrap(), FilterMode::Percentage);
    assert_eq!(FilterMode::Combined.to_string(), "combined");
    assert!("median".parse::<FilterMode>().is_err());
}

#[test]
fn test_mean_length() {
    let s = FilterSettings::default();
    assert_eq!(s.mean_length(), 25);
    assert_eq!(FilterSettings { length_ms: 10, ..s }.mean_length(), 1);
    assert_eq!(s.jump_threshold(), 144);
}

#[test]
fn test_off_passes_through() {
    let mut filter = TemporalFilter::new(2);
    let input = [Rgb::new(1, 2, 3), Rgb::new(200, 100, 50)];
    assert_eq!(filter.apply(&input, &settings(FilterMode::Off, 90)), &input);
}

#[test]
fn test_percentage_without_smoothness_is_identity() {
    let mut filter = TemporalFilter::new(1);
    let s = settings(FilterMode::Percentage, 0);
    for color in [Rgb::new(10, 200, 30), Rgb::new(255, 0, 0), gray(7), Rgb::new(0, 99, 254)] {
        assert_eq!(filter.apply(&[color], &s), &[color]);
    }
}

#[test]
fn test_percentage_decay() {
    let mut filter = TemporalFilter::new(1);
    let s = settings(FilterMode::Percentage, 50);
    let target = [Rgb::new(200, 100, 0)];
    assert_eq!(filter.apply(&target, &s), &[Rgb::new(100, 50, 0)]);
    assert_eq!(filter.apply(&target, &s), &[Rgb::new(150, 75, 0)]);
    assert_eq!(filter.apply(&target, &s), &[Rgb::new(175, 87, 0)]);
}

#[test]
fn test_mean_filter_snaps_on_scene_cut() {
    let mut filter = TemporalFilter::new(1);
    let s = settings(FilterMode::Combined, 50);

    for _ in 0..30 {
        assert_eq!(filter.apply(&[gray(10)], &s), &[gray(10)]);
    }

    // distance ~400 exceeds the threshold of 144
    assert_eq!(filter.apply(&[gray(250)], &s), &[gray(250)]);
    for _ in 0..10 {
        assert_eq!(filter.apply(&[gray(250)], &s), &[gray(250)]);
    }
}

#[test]
fn test_mean_filter_lags_small_changes() {
    let mut filter = TemporalFilter::new(1);
    let s = settings(FilterMode::Combined, 50);
    for _ in 0..5 {
        filter.apply(&[gray(10)], &s);
    }

    let target = [Rgb::new(40, 10, 10)];
    assert_eq!(filter.apply(&target, &s)[0].r, 10);

    for _ in 0..200 {
        filter.apply(&target, &s);
    }
    let r = filter.filtered()[0].r;
    assert!((38..=40).contains(&r), "converged to {}", r);
}

#[test]
fn test_reset_reinitializes_mean() {
    let mut filter = TemporalFilter::new(1);
    let s = settings(FilterMode::Combined, 50);
    for _ in 0..5 {
        filter.apply(&[gray(10)], &s);
    }

    filter.reset();
    assert_eq!(filter.apply(&[gray(30)], &s), &[gray(30)]);
}

#[test]
fn test_mean_length_change_reinitializes() {
    let mut filter = TemporalFilter::new(1);
    let s = settings(FilterMode::Combined, 50);
    for _ in 0..5 {
        filter.apply(&[gray(10)], &s);
    }

    let longer = FilterSettings { length_ms: 1000, ..s };
    assert_eq!(filter.apply(&[gray(30)], &longer), &[gray(30)]);
}
