//! Per-pixel channel weights
//!
//! Every pixel carries one weight (0..=255) per channel that encodes the
//! spatial falloff toward that channel's screen region. The map only depends
//! on the image size, the edge weighting exponent and the channel layout, so
//! it is recomputed only when one of those changes.

use rayon::prelude::*;

use crate::ambient_pipeline::layout::ChannelLayout;

#[derive(Debug, Clone)]
pub struct WeightMap {
    width: usize,
    height: usize,
    edge_weighting: u32,
    layout: ChannelLayout,
    channels: usize,
    data: Vec<u8>,
}

impl WeightMap {
    pub fn compute(layout: &ChannelLayout, width: usize, height: usize, edge_weighting: u32) -> Self {
        let channels = layout.total();
        let mut data = vec![0u8; width * height * channels];

        if channels > 0 && width > 0 {
            let exponent = if edge_weighting > 10 {
                edge_weighting as f64 / 10.0
            } else {
                10.0
            };
            let geometry = Geometry::new(layout, width, height, exponent);
            data.par_chunks_mut(width * channels)
                .enumerate()
                .for_each(|(row, out)| geometry.fill_row(row, out));
        }

        Self {
            width,
            height,
            edge_weighting,
            layout: *layout,
            channels,
            data,
        }
    }

    /// Whether this map was computed for the given parameters
    pub fn matches(&self, layout: &ChannelLayout, width: usize, height: usize, edge_weighting: u32) -> bool {
        self.width == width
            && self.height == height
            && self.edge_weighting == edge_weighting
            && self.layout == *layout
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Weight of `channel` at flat pixel index `pixel`
    #[inline]
    pub fn at(&self, pixel: usize, channel: usize) -> u8 {
        self.data[pixel * self.channels + channel]
    }

    /// All channel weights of one pixel
    #[inline]
    pub fn pixel(&self, pixel: usize) -> &[u8] {
        &self.data[pixel * self.channels..(pixel + 1) * self.channels]
    }
}

struct Geometry {
    layout: ChannelLayout,
    width: usize,
    height: usize,
    exponent: f64,
    sum_top: usize,
    sum_bottom: usize,
    sum_left: usize,
    sum_right: usize,
    center_x: usize,
    center_y: usize,
}

impl Geometry {
    fn new(layout: &ChannelLayout, width: usize, height: usize, exponent: f64) -> Self {
        Self {
            layout: *layout,
            width,
            height,
            exponent,
            sum_top: layout.top + layout.top_left + layout.top_right,
            sum_bottom: layout.bottom + layout.bottom_left + layout.bottom_right,
            sum_left: layout.left + layout.bottom_left + layout.top_left,
            sum_right: layout.right + layout.bottom_right + layout.top_right,
            center_x: width / 2,
            center_y: height / 2,
        }
    }

    fn falloff(&self, norm: f64) -> u8 {
        (255.0 * norm.powf(self.exponent)) as u8
    }

    fn fill_row(&self, row: usize, out: &mut [u8]) {
        let l = &self.layout;
        let (w, h) = (self.width, self.height);
        let row_norm = row as f64 / (h.saturating_sub(1).max(1)) as f64;
        let top = self.falloff(1.0 - row_norm);
        let bottom = self.falloff(row_norm);
        let upper = row < self.center_y;

        let mut out = out.iter_mut();
        let mut put = |v: u8| {
            if let Some(slot) = out.next() {
                *slot = v;
            }
        };

        for col in 0..w {
            let col_norm = col as f64 / (w.saturating_sub(1).max(1)) as f64;
            let left = self.falloff(1.0 - col_norm);
            let right = self.falloff(col_norm);
            let leftish = col < self.center_x;

            for c in l.top_left..(l.top + l.top_left) {
                let inside = col >= w * c / self.sum_top && col < w * (c + 1) / self.sum_top;
                put(if inside && upper { top } else { 0 });
            }
            for c in l.bottom_left..(l.bottom + l.bottom_left) {
                let inside = col >= w * c / self.sum_bottom && col < w * (c + 1) / self.sum_bottom;
                put(if inside && !upper { bottom } else { 0 });
            }
            for c in l.top_left..(l.left + l.top_left) {
                let inside = row >= h * c / self.sum_left && row < h * (c + 1) / self.sum_left;
                put(if inside && leftish { left } else { 0 });
            }
            for c in l.top_right..(l.right + l.top_right) {
                let inside = row >= h * c / self.sum_right && row < h * (c + 1) / self.sum_right;
                put(if inside && !leftish { right } else { 0 });
            }
            if l.center > 0 {
                put(255);
            }
            if l.top_left > 0 {
                put(if leftish && upper { top.max(left) } else { 0 });
            }
            if l.top_right > 0 {
                put(if !leftish && upper { top.max(right) } else { 0 });
            }
            if l.bottom_left > 0 {
                put(if leftish && !upper { bottom.max(left) } else { 0 });
            }
            if l.bottom_right > 0 {
                put(if !leftish && !upper { bottom.max(right) } else { 0 });
            }
        }
    }
}
