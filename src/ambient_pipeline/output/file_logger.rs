//! Text dump driver
//!
//! Appends one record per transmitted frame:
//!
//! ```text
//! 0: 1718000000.042 ---
//!       top  1: 255   0   0
//!       center:  10  10  10
//! ```

use std::{
    fmt::Write as _,
    fs::{File, OpenOptions},
    io::Write,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use tracing::{debug, info};

use crate::ambient_pipeline::{
    common::{color::Rgb, error::DeviceError},
    layout::{Area, ChannelLayout},
    output::driver::OutputDriver,
};

pub const DEFAULT_FILE: &str = "xine_atmo_data.out";

#[derive(Debug, Default)]
pub struct FileLogger {
    file: Option<File>,
    path: Option<PathBuf>,
    layout: ChannelLayout,
    id: u64,
}

impl FileLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    fn format_record(&self, id: u64, now: std::time::Duration, colors: &[Rgb]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}: {}.{:03} ---", id, now.as_secs(), now.subsec_millis());

        for ((area, idx), c) in self.layout.channels().zip(colors) {
            let _ = if area.is_edge() {
                writeln!(out, "{:>9} {:2}: {:3} {:3} {:3}", area.label(), idx + 1, c.r, c.g, c.b)
            } else {
                writeln!(out, "{}: {:3} {:3} {:3}", single_label(area), c.r, c.g, c.b)
            };
        }
        out
    }
}

fn single_label(area: Area) -> &'static str {
    match area {
        Area::Center => "      center",
        Area::TopLeft => "    top left",
        Area::TopRight => "    top right",
        Area::BottomLeft => "  bottom left",
        Area::BottomRight => " bottom right",
        other => other.label(),
    }
}

impl OutputDriver for FileLogger {
    fn name(&self) -> &'static str {
        "file"
    }

    fn open(&mut self, param: &str, layout: &mut ChannelLayout) -> Result<(), DeviceError> {
        let path = PathBuf::from(if param.is_empty() { DEFAULT_FILE } else { param });
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        info!("writing colors to {}", path.display());

        self.file = Some(file);
        self.path = Some(path);
        self.layout = *layout;
        self.id = 0;
        Ok(())
    }

    fn configure(&mut self, layout: &mut ChannelLayout) -> Result<(), DeviceError> {
        self.layout = *layout;
        Ok(())
    }

    fn close(&mut self) {
        if self.file.take().is_some() {
            debug!("closed color dump after {} records", self.id);
        }
    }

    fn output_colors(&mut self, colors: &[Rgb], _last: Option<&[Rgb]>) -> Result<(), DeviceError> {
        if self.file.is_none() {
            return Err(DeviceError::NotOpen);
        }

        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        let record = self.format_record(self.id, now, colors);
        self.id += 1;

        if let Some(file) = self.file.as_mut() {
            file.write_all(record.as_bytes())?;
            file.flush()?;
        }
        Ok(())
    }
}
