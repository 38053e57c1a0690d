use std::{sync::Arc, time::Duration};

use crate::ambient_pipeline::{
    common::error::{DeviceError, TransferError},
    output::df10ch::protocol::DEFAULT_TIMEOUT,
};

/// Attempts of a control-in request that keeps stalling
const STALL_ATTEMPTS: u32 = 3;

/// Vendor control transfers to one opened controller
pub trait ControlTransport: Send + Sync {
    fn serial_number(&self) -> Result<String, TransferError>;

    fn control_in(
        &self,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, TransferError>;

    fn control_out(
        &self,
        request: u8,
        value: u16,
        index: u16,
        data: &[u8],
        timeout: Duration,
    ) -> Result<usize, TransferError>;
}

/// A matched, opened and claimed controller
pub struct DiscoveredController {
    pub id: String,
    pub transport: Arc<dyn ControlTransport>,
}

/// Enumerates controllers
pub trait ControllerBus: Send {
    fn discover(&self) -> Result<Vec<DiscoveredController>, DeviceError>;
}

/// Control-in request expecting exactly `len` reply bytes
///
/// The device always gets at least a one byte buffer so it can reply with a
/// status. Interrupted transfers are repeated, stalled ones up to three
/// attempts in total.
pub fn read_control(
    transport: &dyn ControlTransport,
    id: &str,
    what: &'static str,
    request: u8,
    value: u16,
    index: u16,
    len: usize,
) -> Result<Vec<u8>, DeviceError> {
    let mut buf = vec![0u8; len.max(1)];
    let mut stalls = 0;

    let n = loop {
        match transport.control_in(request, value, index, &mut buf, DEFAULT_TIMEOUT) {
            Ok(n) => break n,
            Err(TransferError::Interrupted) => continue,
            Err(TransferError::Stall) if stalls + 1 < STALL_ATTEMPTS => stalls += 1,
            Err(e) => {
                return Err(DeviceError::Transfer {
                    id: id.to_string(),
                    what,
                    reason: e.to_string(),
                });
            }
        }
    };

    if n != len {
        return Err(DeviceError::UnexpectedReply {
            id: id.to_string(),
            what,
            actual: n,
            expected: len,
        });
    }
    buf.truncate(len);
    Ok(buf)
}
