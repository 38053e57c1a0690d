use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("no device parameter")]
    MissingParameter,

    #[error("illegal device identification pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("could not open {path}: {source}")]
    Registry {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not find usb device in {0}")]
    DeviceNotFound(String),

    #[error("could not open serial port {path}: {source}")]
    SerialOpen {
        path: String,
        #[source]
        source: serialport::Error,
    },

    #[error("configuration of serial port failed: {0}")]
    SerialConfig(#[from] serialport::Error),

    #[error("USB: {0}")]
    Usb(String),

    #[error("USB: no DF10CH devices found!")]
    NoControllers,

    #[error("{id}: application firmware of {unit} controller is not running! Current mode is: {mode}")]
    FirmwareMismatch {
        id: String,
        unit: &'static str,
        mode: String,
    },

    #[error("{0}: controller is not configured! Please run setup program first")]
    NotConfigured(String),

    #[error("{id}: {what} fails: read {actual} bytes but expected {expected} bytes")]
    UnexpectedReply {
        id: String,
        what: &'static str,
        actual: usize,
        expected: usize,
    },

    #[error("{id}: {what} fails: {reason}")]
    Transfer {
        id: String,
        what: &'static str,
        reason: String,
    },

    #[error("output driver is not open")]
    NotOpen,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum AtmoError {
    #[error("parameter {name}={value} out of range {min}..={max}")]
    InvalidParameter {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("no valid output driver selected")]
    NoDriverSelected,

    #[error("no channels configured")]
    NoChannels,

    #[error("can't create {name} thread: {source}")]
    ThreadSpawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} thread did not confirm start")]
    ThreadStart { name: &'static str },

    #[error("output driver: {0}")]
    Device(#[from] DeviceError),
}

pub type Result<T> = std::result::Result<T, AtmoError>;

/// Failure of a single frame grab; never fatal for the analyze loop
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrabError {
    #[error("grab failed: {0}")]
    Failed(String),

    #[error("grab timed out")]
    Timeout,

    #[error("frame grabbing not supported by this frame source")]
    Unsupported,
}

/// USB transport level failure of one control transfer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("control request stalled")]
    Stall,

    #[error("system call interrupted")]
    Interrupted,

    #[error("transfer timed out")]
    Timeout,

    #[error("device was disconnected")]
    NoDevice,

    #[error("{0}")]
    Other(String),
}
