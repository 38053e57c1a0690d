use crate::ambient_pipeline::{
    common::color::Rgb,
    correction::{CorrectionSettings, apply},
};

#[test]
fn test_gamma_disabled_up_to_ten() {
    let original: Vec<Rgb> = (0..=255u8).map(|v| Rgb::new(v, 255 - v, v / 2)).collect();
    for gamma in [0, 5, 10] {
        let mut colors = original.clone();
        apply(&mut colors, &CorrectionSettings { gamma, ..Default::default() });
        assert_eq!(colors, original);
    }
}

#[test]
fn test_gamma_darkens_midtones() {
    let mut colors = vec![Rgb::new(128, 0, 255)];
    apply(&mut colors, &CorrectionSettings { gamma: 20, ..Default::default() });
    let expected = ((128.0f64 / 255.0).powf(2.0) * 255.0) as u8;
    assert_eq!(expected, 64);
    assert_eq!(colors[0], Rgb::new(expected, 0, 255));
}

#[test]
fn test_white_calibration_scales_primaries() {
    let mut colors = vec![Rgb::new(255, 255, 100)];
    let settings = CorrectionSettings { wc_red: 255, wc_green: 128, wc_blue: 51, ..Default::default() };
    apply(&mut colors, &settings);
    assert_eq!(colors[0], Rgb::new(255, 128, 20));
}

#[test]
fn test_gamma_applied_before_white_calibration() {
    let mut colors = vec![gray(128)];
    let settings = CorrectionSettings { gamma: 20, wc_red: 128, wc_green: 255, wc_blue: 255 };
    apply(&mut colors, &settings);
    // 128 -> 64 by gamma, then 64 * 128 / 255 = 32
    assert_eq!(colors[0], Rgb::new(32, 64, 64));
}

fn gray(v: u8) -> Rgb {
    Rgb::new(v, v, v)
}
