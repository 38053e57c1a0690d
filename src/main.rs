use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use anyhow::Context;
use clap::Parser;

use atmolight_rs::ambient_pipeline::{
    AtmoConfig, AtmoController, ChannelLayout, DriverKind, FilterMode, Frame, FrameSource, GrabError,
    GrabRequest, UnrestrictedTicket, analysis::hsv_to_rgb,
};
use atmolight_rs::logger;

use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Drive ambient lights from a synthetic moving picture", long_about = None)]
struct Args {
    /// Output driver: none, file, classic, df4ch or df10ch
    #[arg(short, long, default_value = "file")]
    driver: DriverKind,

    /// Driver parameter: output file, serial device or usb:<regex>
    #[arg(short, long, default_value = "xine_atmo_data.out")]
    param: String,

    #[arg(long, default_value = "1")]
    top: usize,

    #[arg(long, default_value = "1")]
    bottom: usize,

    #[arg(long, default_value = "1")]
    left: usize,

    #[arg(long, default_value = "1")]
    right: usize,

    #[arg(long, default_value = "1")]
    center: usize,

    /// Enable all four corner channels
    #[arg(long)]
    corners: bool,

    /// Temporal filter: off, percentage or combined
    #[arg(long, default_value = "combined")]
    filter: FilterMode,

    /// Brightness in percent
    #[arg(long, default_value = "100")]
    brightness: u32,

    /// Run time in seconds
    #[arg(short, long, default_value = "10")]
    seconds: u64,
}

/// Frame source showing a horizontal hue gradient that scrolls over time
struct GradientSource {
    width: usize,
    height: usize,
    started: Instant,
}

impl GradientSource {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            started: Instant::now(),
        }
    }
}

impl FrameSource for GradientSource {
    fn display_size(&self) -> Option<(usize, usize)> {
        Some((self.width, self.height))
    }

    fn grab(&self, request: &GrabRequest) -> Result<Frame, GrabError> {
        let (w, h) = (request.width, request.height);
        if w == 0 || h == 0 {
            return Err(GrabError::Failed(format!("empty grab size {}x{}", w, h)));
        }

        let shift = (self.started.elapsed().as_millis() / 20) as usize;
        let mut data = Vec::with_capacity(w * h * 3);
        for row in 0..h {
            let value = (255 - row * 128 / h) as u8;
            for col in 0..w {
                let hue = ((col * 256 / w + shift) % 256) as u8;
                let c = hsv_to_rgb(hue, 255, value);
                data.extend_from_slice(&[c.r, c.g, c.b]);
            }
        }
        Ok(Frame::new(w, h, data))
    }
}

fn main() -> anyhow::Result<()> {
    logger::init();

    let args = Args::parse();
    info!("Starting atmolight...");

    let corner = usize::from(args.corners);
    let layout = ChannelLayout {
        top: args.top,
        bottom: args.bottom,
        left: args.left,
        right: args.right,
        center: args.center,
        top_left: corner,
        top_right: corner,
        bottom_left: corner,
        bottom_right: corner,
    };

    let config = AtmoConfig::builder()
        .driver(args.driver)
        .driver_param(args.param)
        .layout(layout)
        .filter(args.filter)
        .brightness(args.brightness)
        .build();

    let mut controller = AtmoController::new(Arc::new(GradientSource::new(1920, 1080)), Arc::new(UnrestrictedTicket));
    controller
        .apply(config.clone())
        .with_context(|| format!("could not start {} output", args.driver))?;

    info!("Layout: {}", controller.layout());
    thread::sleep(Duration::from_secs(args.seconds));

    controller.apply(AtmoConfig {
        enabled: false,
        ..config
    })?;
    info!("Done");

    Ok(())
}
