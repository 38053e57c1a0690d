use std::fs;

use regex::Regex;
use tempfile::tempdir;

use crate::ambient_pipeline::{
    common::{color::Rgb, error::DeviceError},
    layout::ChannelLayout,
    output::{DriverKind, FileLogger, OutputDriver, create_driver},
};

#[test]
fn test_driver_kind_names() {
    for kind in DriverKind::ALL {
        assert_eq!(kind.to_string().parse::<DriverKind>().unwrap(), kind);
    }
    assert_eq!("DF10CH".parse::<DriverKind>().unwrap(), DriverKind::Df10ch);
    assert!("karate".parse::<DriverKind>().is_err());
}

#[test]
fn test_create_driver() {
    assert!(create_driver(DriverKind::None).is_none());
    assert_eq!(create_driver(DriverKind::File).unwrap().name(), "file");
    assert_eq!(create_driver(DriverKind::Classic).unwrap().name(), "classic");
    assert_eq!(create_driver(DriverKind::Df4ch).unwrap().name(), "df4ch");
    assert_eq!(create_driver(DriverKind::Df10ch).unwrap().name(), "df10ch");
}

#[test]
fn test_file_logger_record_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("atmo.out");
    let mut layout = ChannelLayout { top: 2, left: 1, center: 1, top_left: 1, bottom_right: 1, ..Default::default() };

    let mut driver = FileLogger::new();
    driver.open(path.to_str().unwrap(), &mut layout).unwrap();

    let colors = [
        Rgb::new(255, 0, 0),
        Rgb::new(0, 255, 0),
        Rgb::new(0, 0, 255),
        Rgb::new(10, 20, 30),
        Rgb::new(1, 2, 3),
        Rgb::new(4, 5, 6),
    ];
    driver.output_colors(&colors, None).unwrap();
    driver.output_colors(&colors, Some(&colors)).unwrap();
    driver.close();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 14);

    let header = Regex::new(r"^(\d+): \d+\.\d{3} ---$").unwrap();
    assert_eq!(&header.captures(lines[0]).unwrap()[1], "0");
    assert_eq!(&header.captures(lines[7]).unwrap()[1], "1");

    assert_eq!(lines[1], "      top  1: 255   0   0");
    assert_eq!(lines[2], "      top  2:   0 255   0");
    assert_eq!(lines[3], "     left  1:   0   0 255");
    assert_eq!(lines[4], "      center:  10  20  30");
    assert_eq!(lines[5], "    top left:   1   2   3");
    assert_eq!(lines[6], " bottom right:   4   5   6");
}

#[test]
fn test_file_logger_appends() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("atmo.out");
    fs::write(&path, "previous run\n").unwrap();

    let mut layout = ChannelLayout { center: 1, ..Default::default() };
    let mut driver = FileLogger::new();
    driver.open(path.to_str().unwrap(), &mut layout).unwrap();
    driver.output_colors(&[Rgb::BLACK], None).unwrap();
    driver.close();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("previous run\n0: "));
    assert!(text.ends_with("      center:   0   0   0\n"));
}

#[test]
fn test_file_logger_requires_open() {
    let mut driver = FileLogger::new();
    assert!(matches!(driver.output_colors(&[Rgb::BLACK], None), Err(DeviceError::NotOpen)));
    driver.close();
}

#[test]
fn test_file_logger_open_failure() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("atmo.out");
    let mut layout = ChannelLayout { center: 1, ..Default::default() };
    let mut driver = FileLogger::new();
    assert!(matches!(driver.open(path.to_str().unwrap(), &mut layout), Err(DeviceError::Io(_))));
    driver.close();
}
