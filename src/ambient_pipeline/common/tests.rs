use std::time::Duration;

use crate::ambient_pipeline::common::{AtmoError, DeviceError, LatencyStats, Rgb, Timer};

#[test]
fn test_latency_average_halves() {
    let mut stats = LatencyStats::new();
    assert!(stats.record(Duration::from_micros(800)));
    assert_eq!(stats.average(), Duration::from_micros(400));
    assert!(!stats.record(Duration::from_micros(400)));
    assert_eq!(stats.average(), Duration::from_micros(400));
    assert!(stats.record(Duration::from_micros(1200)));
    assert_eq!(stats.average(), Duration::from_micros(800));
    assert_eq!(stats.max(), Duration::from_micros(1200));
    assert_eq!(stats.samples(), 3);
}

#[test]
fn test_timer_reports_name() {
    let timer = Timer::start("analyze");
    let (name, elapsed) = timer.stop();
    assert_eq!(name, "analyze");
    assert!(elapsed < Duration::from_secs(1));
}

#[test]
fn test_black() {
    assert!(Rgb::BLACK.is_black());
    assert!(!Rgb::new(0, 0, 1).is_black());
}

#[test]
fn test_error_messages() {
    let err = AtmoError::InvalidParameter { name: "gamma", value: 31, min: 0, max: 30 };
    assert_eq!(err.to_string(), "parameter gamma=31 out of range 0..=30");

    let err: AtmoError = DeviceError::NotConfigured("DF10CH[1,4]".into()).into();
    assert_eq!(
        err.to_string(),
        "output driver: DF10CH[1,4]: controller is not configured! Please run setup program first"
    );
}
