use std::{
    io::{Cursor, Write},
    sync::{Arc, Mutex},
};

use crate::ambient_pipeline::{
    common::{color::Rgb, error::DeviceError},
    layout::ChannelLayout,
    output::{
        driver::OutputDriver,
        serial::{ClassicProtocol, Df4chProtocol, SerialDriver, SerialProtocol, UsbSerialRegistry, resolve_device},
    },
};

const REGISTRY: &str = "usbserinfo:1.0 driver:2.0\n\
0: module:ftdi_sio name:\"FTDI USB Serial Device\" vendor:0403 product:6001 num_ports:1 port:1 path:usb-0000:00:1d.0-1\n\
1: module:pl2303 name:\"pl2303\" vendor:067b product:2303 num_ports:1 port:1 path:usb-0000:00:1d.0-2\n";

#[derive(Clone, Default)]
struct SharedBuffer {
    data: Arc<Mutex<Vec<u8>>>,
    flushes: Arc<Mutex<usize>>,
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.data.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        *self.flushes.lock().unwrap() += 1;
        Ok(())
    }
}

fn five_areas() -> ChannelLayout {
    ChannelLayout { top: 2, bottom: 1, left: 1, right: 1, center: 1, ..Default::default() }
}

fn five_colors() -> Vec<Rgb> {
    vec![
        Rgb::new(1, 2, 3),    // top 1
        Rgb::new(9, 9, 9),    // top 2
        Rgb::new(4, 5, 6),    // bottom
        Rgb::new(7, 8, 9),    // left
        Rgb::new(10, 11, 12), // right
        Rgb::new(13, 14, 15), // center
    ]
}

#[test]
fn test_classic_frame() {
    let msg = ClassicProtocol.encode(&five_areas(), &five_colors());
    assert_eq!(
        msg,
        vec![0xFF, 0, 0, 15, 13, 14, 15, 7, 8, 9, 10, 11, 12, 1, 2, 3, 4, 5, 6]
    );
}

#[test]
fn test_df4ch_frame() {
    let msg = Df4chProtocol.encode(&five_areas(), &five_colors());
    assert_eq!(msg, vec![0xFF, 0, 12, 7, 8, 9, 10, 11, 12, 1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_missing_areas_stay_zero() {
    let layout = ChannelLayout { bottom: 1, ..Default::default() };
    let msg = ClassicProtocol.encode(&layout, &[Rgb::new(50, 60, 70)]);
    assert_eq!(msg.len(), ClassicProtocol::FRAME_LEN);
    assert_eq!(&msg[4..16], &[0; 12]);
    assert_eq!(&msg[16..19], &[50, 60, 70]);
}

#[test]
fn test_registry_lookup() {
    let registry = UsbSerialRegistry::new(Cursor::new(REGISTRY));
    assert_eq!(registry.find("pl2303").unwrap(), "/dev/ttyUSB1");

    let registry = UsbSerialRegistry::new(Cursor::new(REGISTRY));
    assert_eq!(registry.find("vendor:0403 product:6001").unwrap(), "/dev/ttyUSB0");
}

#[test]
fn test_registry_skips_header() {
    let registry = UsbSerialRegistry::new(Cursor::new(REGISTRY));
    assert_eq!(registry.find("usbserinfo|ftdi").unwrap(), "/dev/ttyUSB0");
}

#[test]
fn test_registry_errors() {
    let registry = UsbSerialRegistry::new(Cursor::new(REGISTRY));
    assert!(matches!(registry.find("cp210x"), Err(DeviceError::DeviceNotFound(_))));

    let registry = UsbSerialRegistry::new(Cursor::new(REGISTRY));
    assert!(matches!(registry.find("(unclosed"), Err(DeviceError::InvalidPattern { .. })));
}

#[test]
fn test_resolve_plain_device() {
    assert_eq!(resolve_device("/dev/ttyS0").unwrap(), "/dev/ttyS0");
    assert!(matches!(resolve_device(""), Err(DeviceError::MissingParameter)));
}

#[test]
fn test_open_without_parameter_fails() {
    let mut driver = SerialDriver::new(ClassicProtocol);
    let mut layout = five_areas();
    assert!(matches!(driver.open("", &mut layout), Err(DeviceError::MissingParameter)));
    assert!(!driver.is_open());
    driver.close();
}

#[test]
fn test_output_writes_and_drains() {
    let buffer = SharedBuffer::default();
    let mut driver = SerialDriver::with_link(Df4chProtocol, five_areas(), Box::new(buffer.clone()));

    driver.output_colors(&five_colors(), None).unwrap();
    driver.output_colors(&five_colors(), Some(&five_colors())).unwrap();

    assert_eq!(buffer.data.lock().unwrap().len(), 2 * Df4chProtocol::FRAME_LEN);
    assert_eq!(*buffer.flushes.lock().unwrap(), 2);

    driver.close();
    assert!(!driver.is_open());
    driver.output_colors(&five_colors(), None).unwrap();
    assert_eq!(buffer.data.lock().unwrap().len(), 2 * Df4chProtocol::FRAME_LEN);
}
