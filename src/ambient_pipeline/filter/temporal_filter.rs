use crate::ambient_pipeline::{
    common::color::Rgb,
    filter::types::{FilterMode, FilterSettings},
};

/// Per-channel filter state
///
/// `filtered` persists across calls and is the output of [`apply`]. The mean
/// accumulators are reinitialized from the current input on the first call
/// after [`reset`] or whenever the mean length changes.
///
/// [`apply`]: TemporalFilter::apply
/// [`reset`]: TemporalFilter::reset
#[derive(Debug, Clone)]
pub struct TemporalFilter {
    filtered: Vec<Rgb>,
    mean_values: Vec<Rgb>,
    mean_sums: Vec<[i64; 3]>,
    old_mean_length: i64,
}

impl TemporalFilter {
    pub fn new(channels: usize) -> Self {
        Self {
            filtered: vec![Rgb::BLACK; channels],
            mean_values: vec![Rgb::BLACK; channels],
            mean_sums: vec![[0; 3]; channels],
            old_mean_length: 0,
        }
    }

    /// Force the mean filter to restart from the next input
    pub fn reset(&mut self) {
        self.old_mean_length = 0;
    }

    pub fn filtered(&self) -> &[Rgb] {
        &self.filtered
    }

    pub fn apply(&mut self, analyzed: &[Rgb], settings: &FilterSettings) -> &[Rgb] {
        match settings.mode {
            FilterMode::Off => {
                for (out, act) in self.filtered.iter_mut().zip(analyzed) {
                    *out = *act;
                }
            }
            FilterMode::Percentage => {
                let old_p = settings.smoothness.min(100) as i64;
                for (out, act) in self.filtered.iter_mut().zip(analyzed) {
                    *out = blend(act, out, old_p);
                }
            }
            FilterMode::Combined => self.mean_filter(analyzed, settings),
        }
        &self.filtered
    }

    fn mean_filter(&mut self, analyzed: &[Rgb], settings: &FilterSettings) {
        let mean_length = settings.mean_length();
        let threshold = settings.jump_threshold();
        let old_p = settings.smoothness.min(100) as i64;
        let reinitialize = mean_length != self.old_mean_length;
        self.old_mean_length = mean_length;

        let state = self
            .filtered
            .iter_mut()
            .zip(self.mean_values.iter_mut())
            .zip(self.mean_sums.iter_mut());

        for (((out, mean), sums), act) in state.zip(analyzed) {
            let act_c = [act.r as i64, act.g as i64, act.b as i64];
            let mut mean_c = [mean.r as i64, mean.g as i64, mean.b as i64];

            let mut dist = 0i64;
            for i in 0..3 {
                sums[i] += act_c[i] - mean_c[i];
                mean_c[i] = (sums[i] / mean_length) as u8 as i64;
                let d = mean_c[i] - act_c[i];
                dist += d * d;
            }
            *mean = Rgb::new(mean_c[0] as u8, mean_c[1] as u8, mean_c[2] as u8);

            let dist = (dist as f64).sqrt() as i64;
            if dist > threshold || reinitialize {
                *out = *act;
                *mean = *act;
                *sums = act_c.map(|c| c * mean_length);
            } else {
                *out = blend(mean, out, old_p);
            }
        }
    }
}

/// `(src * (100 - old_p) + prev * old_p) / 100` per primary
#[inline]
fn blend(src: &Rgb, prev: &Rgb, old_p: i64) -> Rgb {
    let new_p = 100 - old_p;
    let mix = |s: u8, p: u8| ((s as i64 * new_p + p as i64 * old_p) / 100) as u8;
    Rgb::new(mix(src.r, prev.r), mix(src.g, prev.g), mix(src.b, prev.b))
}
