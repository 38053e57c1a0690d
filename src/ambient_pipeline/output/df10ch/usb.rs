//! libusb backed controller access

use std::{sync::Arc, time::Duration};

use rusb::{Context, Device, DeviceDescriptor, DeviceHandle, Direction, Recipient, RequestType, UsbContext};
use tracing::{debug, info, instrument};

use crate::ambient_pipeline::{
    common::error::{DeviceError, TransferError},
    output::df10ch::{
        protocol::{MANUFACTURER, PRODUCT, PRODUCT_ID, VENDOR_ID},
        transport::{ControlTransport, ControllerBus, DiscoveredController},
    },
};

fn transfer_error(e: rusb::Error) -> TransferError {
    match e {
        rusb::Error::Pipe => TransferError::Stall,
        rusb::Error::Interrupted => TransferError::Interrupted,
        rusb::Error::Timeout => TransferError::Timeout,
        rusb::Error::NoDevice => TransferError::NoDevice,
        other => TransferError::Other(other.to_string()),
    }
}

pub struct RusbTransport {
    handle: DeviceHandle<Context>,
    serial_index: Option<u8>,
}

impl ControlTransport for RusbTransport {
    fn serial_number(&self) -> Result<String, TransferError> {
        let index = self
            .serial_index
            .ok_or_else(|| TransferError::Other("device has no serial number".to_string()))?;
        self.handle.read_string_descriptor_ascii(index).map_err(transfer_error)
    }

    fn control_in(
        &self,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, TransferError> {
        let request_type = rusb::request_type(Direction::In, RequestType::Vendor, Recipient::Device);
        self.handle
            .read_control(request_type, request, value, index, buf, timeout)
            .map_err(transfer_error)
    }

    fn control_out(
        &self,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
        timeout: Duration,
    ) -> Result<usize, TransferError> {
        let request_type = rusb::request_type(Direction::Out, RequestType::Vendor, Recipient::Device);
        self.handle
            .write_control(request_type, request, value, index, data, timeout)
            .map_err(transfer_error)
    }
}

/// Finds DF10CH controllers on all USB buses
///
/// The controllers share a free vendor/product id pair, so manufacturer and
/// product strings must match as well.
#[derive(Debug, Default, Clone, Copy)]
pub struct RusbBus;

impl ControllerBus for RusbBus {
    #[instrument(skip(self), name = "df10ch_discover")]
    fn discover(&self) -> Result<Vec<DiscoveredController>, DeviceError> {
        let context =
            Context::new().map_err(|e| DeviceError::Usb(format!("can't initialize USB library: {}", e)))?;
        let devices = context
            .devices()
            .map_err(|e| DeviceError::Usb(format!("getting list of USB devices failed: {}", e)))?;

        let mut found = Vec::new();
        for device in devices.iter() {
            let (bus, address) = (device.bus_number(), device.address());
            let desc = match device.device_descriptor() {
                Ok(desc) => desc,
                Err(e) => {
                    debug!("USB[{},{}]: getting USB device descriptor failed: {}", bus, address, e);
                    continue;
                }
            };
            if desc.vendor_id() != VENDOR_ID || desc.product_id() != PRODUCT_ID {
                continue;
            }

            match open_controller(&device, &desc) {
                Ok(Some(controller)) => found.push(controller),
                Ok(None) => debug!("USB[{},{}]: not a DF10CH controller", bus, address),
                Err(e) => debug!("USB[{},{}]: {}", bus, address, e),
            }
        }
        Ok(found)
    }
}

fn open_controller(
    device: &Device<Context>,
    desc: &DeviceDescriptor,
) -> Result<Option<DiscoveredController>, String> {
    let mut handle = device
        .open()
        .map_err(|e| format!("open of USB device failed: {}", e))?;

    let manufacturer = handle
        .read_manufacturer_string_ascii(desc)
        .map_err(|e| format!("getting USB manufacturer string failed: {}", e))?;
    if manufacturer != MANUFACTURER {
        return Ok(None);
    }
    let product = handle
        .read_product_string_ascii(desc)
        .map_err(|e| format!("getting USB product string failed: {}", e))?;
    if product != PRODUCT {
        return Ok(None);
    }

    let id = format!("DF10CH[{},{}]", device.bus_number(), device.address());
    handle
        .set_active_configuration(1)
        .map_err(|e| format!("{}: setting USB configuration failed: {}", id, e))?;
    handle
        .claim_interface(0)
        .map_err(|e| format!("{}: claiming USB interface failed: {}", id, e))?;
    info!("{}: device opened", id);

    Ok(Some(DiscoveredController {
        id,
        transport: Arc::new(RusbTransport {
            handle,
            serial_index: desc.serial_number_string_index(),
        }),
    }))
}
