//! Weighted per-channel hue and saturation histograms

use rayon::prelude::*;

use crate::ambient_pipeline::{analysis::weight::WeightMap, common::color::Hsv};

/// Buckets per histogram, one per quantized hue or saturation value
pub const BUCKETS: usize = 256;

/// Raw and windowed histograms of every channel, stored channel-major
#[derive(Debug, Clone, Default)]
pub struct Histograms {
    channels: usize,
    pub hue: Vec<u64>,
    pub windowed_hue: Vec<u64>,
    pub sat: Vec<u64>,
    pub windowed_sat: Vec<u64>,
}

impl Histograms {
    pub fn new(channels: usize) -> Self {
        let len = channels * BUCKETS;
        Self {
            channels,
            hue: vec![0; len],
            windowed_hue: vec![0; len],
            sat: vec![0; len],
            windowed_sat: vec![0; len],
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Accumulate `weight * value` of every non-dark pixel into its hue bucket
    pub fn accumulate_hue(&mut self, hsv: &[Hsv], weights: &WeightMap, darkness_limit: u8) {
        if self.channels == 0 {
            return;
        }
        self.hue
            .par_chunks_mut(BUCKETS)
            .enumerate()
            .for_each(|(c, hist)| {
                hist.fill(0);
                for (i, px) in hsv.iter().enumerate() {
                    if px.v >= darkness_limit {
                        hist[px.h as usize] += weights.at(i, c) as u64 * px.v as u64;
                    }
                }
            });
    }

    /// Accumulate saturation of non-dark pixels whose hue lies strictly
    /// within `hue_win_size` of the channel's dominant hue
    pub fn accumulate_sat(
        &mut self,
        hsv: &[Hsv],
        weights: &WeightMap,
        darkness_limit: u8,
        dominant_hue: &[u8],
        hue_win_size: u32,
    ) {
        if self.channels == 0 {
            return;
        }
        let win = hue_win_size as i32;
        self.sat
            .par_chunks_mut(BUCKETS)
            .enumerate()
            .for_each(|(c, hist)| {
                hist.fill(0);
                let most = dominant_hue[c] as i32;
                for (i, px) in hsv.iter().enumerate() {
                    let h = px.h as i32;
                    if px.v >= darkness_limit && h > most - win && h < most + win {
                        hist[px.s as usize] += weights.at(i, c) as u64 * px.v as u64;
                    }
                }
            });
    }

    pub fn window_hue(&mut self, win_size: u32) {
        for (src, dst) in self.hue.chunks(BUCKETS).zip(self.windowed_hue.chunks_mut(BUCKETS)) {
            window_circular(src, dst, win_size);
        }
    }

    pub fn window_sat(&mut self, win_size: u32) {
        for (src, dst) in self.sat.chunks(BUCKETS).zip(self.windowed_sat.chunks_mut(BUCKETS)) {
            window_circular(src, dst, win_size);
        }
    }

    pub fn windowed_hue_of(&self, channel: usize) -> &[u64] {
        &self.windowed_hue[channel * BUCKETS..(channel + 1) * BUCKETS]
    }

    pub fn windowed_sat_of(&self, channel: usize) -> &[u64] {
        &self.windowed_sat[channel * BUCKETS..(channel + 1) * BUCKETS]
    }
}

/// Triangular smoothing over a circular 256-bucket histogram
///
/// Bucket `i` of `dst` is the sum of `src[i + w] * (win_size + 1 - |w|)` for
/// `w` in `-win_size..=win_size`, with indices wrapping around.
pub fn window_circular(src: &[u64], dst: &mut [u64], win_size: u32) {
    let win = win_size as i64;
    let n = src.len() as i64;
    for (i, out) in dst.iter_mut().enumerate() {
        *out = (-win..=win)
            .map(|w| {
                let iw = (i as i64 + w).rem_euclid(n) as usize;
                src[iw] * (win + 1 - w.abs()) as u64
            })
            .sum();
    }
}

/// Index and weight of the first strictly greatest bucket
///
/// An all-zero histogram yields `(0, 0)`.
pub fn peak(hist: &[u64]) -> (usize, u64) {
    hist.iter()
        .enumerate()
        .fold((0, 0), |(bi, bv), (i, &v)| if v > bv { (i, v) } else { (bi, bv) })
}
