use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Sender, TrySendError};
use tracing::{debug, info, warn};

use crate::ambient_pipeline::{
    common::{
        color::Rgb,
        error::{DeviceError, TransferError},
    },
    layout::{Area, ChannelLayout},
    output::df10ch::{
        gamma::{GammaTable, GammaTableCache},
        protocol::{
            APPLICATION_SERIAL, CONFIG_SIZE, DEFAULT_TIMEOUT, DeviceConfig, PWM_REQ_GET_MAX_PWM,
            PWM_REQ_GET_VERSION, PWM_REQ_SET_BRIGHTNESS, PWM_VERS_APPL, Primary, REQ_READ_EE_DATA,
        },
        transport::{ControlTransport, DiscoveredController, read_control},
    },
};

/// Result of one asynchronous SET_BRIGHTNESS transfer
#[derive(Debug)]
pub struct Completion {
    pub controller: usize,
    pub round: u64,
    pub result: Result<usize, TransferError>,
}

struct TransferJob {
    round: u64,
    payload: Vec<u8>,
}

/// PWM channel bound to one source color primary
#[derive(Debug, Clone)]
pub struct ChannelMapping {
    pub req_channel: usize,
    pub area: Area,
    pub area_num: usize,
    pub primary: Primary,
    pub table: Arc<GammaTable>,
}

/// Background thread performing the transfers of one controller
struct TransferWorker {
    jobs: Option<Sender<TransferJob>>,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TransferWorker {
    fn spawn(
        index: usize,
        id: &str,
        transport: Arc<dyn ControlTransport>,
        completions: Sender<Completion>,
    ) -> Result<Self, DeviceError> {
        let (jobs, queue) = crossbeam_channel::bounded::<TransferJob>(1);
        let cancel = Arc::new(AtomicBool::new(false));
        let cancelled = cancel.clone();

        let handle = thread::Builder::new()
            .name(format!("{} transfer", id))
            .spawn(move || {
                for job in queue.iter() {
                    if cancelled.load(Ordering::Relaxed) {
                        break;
                    }
                    let result =
                        transport.control_out(PWM_REQ_SET_BRIGHTNESS, 0, 0, &job.payload, DEFAULT_TIMEOUT);
                    let completion = Completion {
                        controller: index,
                        round: job.round,
                        result,
                    };
                    if completions.send(completion).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            jobs: Some(jobs),
            cancel,
            handle: Some(handle),
        })
    }

    /// Cancel queued transfers and wait for the one in flight
    fn stop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TransferWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Configured DF10CH controller
pub struct Controller {
    id: String,
    transport: Arc<dyn ControlTransport>,
    config_version: u16,
    pwm_res: u16,
    layout: ChannelLayout,
    mappings: Vec<ChannelMapping>,
    payload: Vec<u8>,
    worker: Option<TransferWorker>,
}

impl Controller {
    /// Verify the firmware of a discovered controller and load its
    /// configuration
    pub fn setup(found: DiscoveredController, tables: &mut GammaTableCache) -> Result<Self, DeviceError> {
        let DiscoveredController { id, transport } = found;

        let serial = transport.serial_number().map_err(|e| DeviceError::Transfer {
            id: id.clone(),
            what: "getting USB serial number string",
            reason: e.to_string(),
        })?;
        if serial != APPLICATION_SERIAL {
            return Err(DeviceError::FirmwareMismatch {
                id,
                unit: "USB",
                mode: serial,
            });
        }

        let version = read_control(&*transport, &id, "reading PWM controller version", PWM_REQ_GET_VERSION, 0, 0, 2)?;
        if version[0] != PWM_VERS_APPL {
            return Err(DeviceError::FirmwareMismatch {
                id,
                unit: "PWM",
                mode: version[0].to_string(),
            });
        }

        let eeprom = read_control(&*transport, &id, "reading eeprom config data", REQ_READ_EE_DATA, 0, 1, CONFIG_SIZE)?;
        let config = DeviceConfig::parse(&id, &eeprom)?;

        let max_pwm = read_control(&*transport, &id, "reading PWM resolution data", PWM_REQ_GET_MAX_PWM, 0, 0, 2)?;
        let pwm_res = u16::from_le_bytes([max_pwm[0], max_pwm[1]]);

        let mappings = config
            .channels
            .iter()
            .map(|ch| ChannelMapping {
                req_channel: ch.req_channel,
                area: ch.area,
                area_num: ch.area_num,
                primary: ch.primary,
                table: tables.get_or_build(ch.gamma, ch.white_cal, pwm_res),
            })
            .collect();

        info!(
            "{}: config version {}, {} request channels, PWM resolution {}, layout {}",
            id, config.version, config.req_channels, pwm_res, config.layout
        );

        Ok(Self {
            id,
            transport,
            config_version: config.version,
            pwm_res,
            layout: config.layout,
            mappings,
            payload: vec![0u8; config.req_channels * 2],
            worker: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config_version(&self) -> u16 {
        self.config_version
    }

    pub fn pwm_res(&self) -> u16 {
        self.pwm_res
    }

    /// Channel counts stored in this controller's EEPROM
    pub fn layout(&self) -> &ChannelLayout {
        &self.layout
    }

    pub fn mappings(&self) -> &[ChannelMapping] {
        &self.mappings
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn start_worker(&mut self, index: usize, completions: Sender<Completion>) -> Result<(), DeviceError> {
        let worker = TransferWorker::spawn(index, &self.id, self.transport.clone(), completions)?;
        self.worker = Some(worker);
        Ok(())
    }

    pub fn stop_worker(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.stop();
        }
    }

    /// Encode `colors` into the payload
    ///
    /// Returns whether any mapped primary differs from `last`; always `true`
    /// for the first packet.
    pub fn fill_payload(&mut self, layout: &ChannelLayout, colors: &[Rgb], last: Option<&[Rgb]>) -> bool {
        let mut changed = last.is_none();

        for m in &self.mappings {
            let index = layout.index_of(m.area, m.area_num);
            let value = index.and_then(|i| colors.get(i)).map_or(0, |c| m.primary.of(c));
            if let Some(last) = last {
                let previous = index.and_then(|i| last.get(i)).map_or(0, |c| m.primary.of(c));
                changed |= previous != value;
            }

            let pwm = m.table.get(value).min(self.pwm_res);
            let at = m.req_channel * 2;
            self.payload[at..at + 2].copy_from_slice(&pwm.to_le_bytes());
        }
        changed
    }

    /// Queue the current payload for transmission
    pub fn submit(&self, round: u64) -> bool {
        let Some(jobs) = self.worker.as_ref().and_then(|w| w.jobs.as_ref()) else {
            return false;
        };
        let job = TransferJob {
            round,
            payload: self.payload.clone(),
        };
        match jobs.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("{}: previous USB control transfer still pending", self.id);
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("{}: transfer worker is gone", self.id);
                false
            }
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop_worker();
    }
}
