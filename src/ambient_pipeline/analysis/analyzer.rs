use tracing::{debug, instrument};

use crate::ambient_pipeline::{
    analysis::{
        histogram::{Histograms, peak},
        hsv::{convert_image, hsv_to_rgb},
        types::AnalyzeSettings,
        weight::WeightMap,
    },
    common::color::{Hsv, Rgb},
    layout::ChannelLayout,
    source::Frame,
};

/// Per-channel color extraction with dominant hue hysteresis
///
/// Buffers are kept between frames and only reallocated when the analyze
/// image grows or the layout changes.
pub struct FrameAnalyzer {
    layout: ChannelLayout,
    hists: Histograms,
    dominant_hue: Vec<u8>,
    last_dominant_hue: Vec<u8>,
    dominant_sat: Vec<u8>,
    brightness: Vec<u8>,
    hsv: Vec<Hsv>,
    weights: Option<WeightMap>,
}

impl FrameAnalyzer {
    pub fn new(layout: ChannelLayout) -> Self {
        let n = layout.total();
        Self {
            layout,
            hists: Histograms::new(n),
            dominant_hue: vec![0; n],
            last_dominant_hue: vec![0; n],
            dominant_sat: vec![0; n],
            brightness: vec![0; n],
            hsv: Vec::new(),
            weights: None,
        }
    }

    pub fn layout(&self) -> &ChannelLayout {
        &self.layout
    }

    pub fn channels(&self) -> usize {
        self.dominant_hue.len()
    }

    /// Dominant hue of every channel after the last analysis
    pub fn dominant_hues(&self) -> &[u8] {
        &self.dominant_hue
    }

    /// Analyze a grabbed RGB frame, writing one color per channel to `out`
    ///
    /// The weight map is recomputed only when the frame size or the edge
    /// weighting differs from the previous call.
    #[instrument(skip_all, level = "trace", fields(w = frame.width, h = frame.height))]
    pub fn analyze_frame(&mut self, frame: &Frame, settings: &AnalyzeSettings, out: &mut [Rgb]) {
        let (w, h) = (frame.width, frame.height);
        let img_size = w * h;
        if frame.data.len() < img_size * 3 {
            debug!("short frame: {} bytes for {}x{}", frame.data.len(), w, h);
            return;
        }

        let stale = self
            .weights
            .as_ref()
            .is_none_or(|m| !m.matches(&self.layout, w, h, settings.edge_weighting));
        if stale {
            debug!("computing weights for {}x{}, edge weighting {}", w, h, settings.edge_weighting);
            self.weights = Some(WeightMap::compute(&self.layout, w, h, settings.edge_weighting));
        }

        let mut hsv = std::mem::take(&mut self.hsv);
        hsv.resize(img_size, Hsv::default());
        convert_image(&frame.data[..img_size * 3], &mut hsv);

        if let Some(weights) = self.weights.take() {
            self.analyze(&hsv, &weights, settings, out);
            self.weights = Some(weights);
        }
        self.hsv = hsv;
    }

    /// Run the histogram stages on an already converted HSV image
    pub fn analyze(&mut self, hsv: &[Hsv], weights: &WeightMap, settings: &AnalyzeSettings, out: &mut [Rgb]) {
        let n = self.channels();
        if n == 0 {
            return;
        }

        self.hists.accumulate_hue(hsv, weights, settings.darkness_limit);
        self.hists.window_hue(settings.hue_win_size);
        for c in 0..n {
            let (hue, last) = select_dominant_hue(
                self.hists.windowed_hue_of(c),
                self.last_dominant_hue[c],
                settings.hue_threshold,
            );
            self.dominant_hue[c] = hue;
            self.last_dominant_hue[c] = last;
        }

        self.hists.accumulate_sat(
            hsv,
            weights,
            settings.darkness_limit,
            &self.dominant_hue,
            settings.hue_win_size,
        );
        self.hists.window_sat(settings.sat_win_size);
        for c in 0..n {
            self.dominant_sat[c] = peak(self.hists.windowed_sat_of(c)).0 as u8;
        }

        average_brightness(hsv, weights, settings, &mut self.brightness);

        for (c, color) in out.iter_mut().take(n).enumerate() {
            *color = hsv_to_rgb(self.dominant_hue[c], self.dominant_sat[c], self.brightness[c]);
        }
    }

    /// Drop the image sized buffers, keeping the hysteresis state
    pub fn release_buffers(&mut self) {
        self.hsv = Vec::new();
        self.weights = None;
    }
}

/// Pick the dominant hue of one windowed histogram
///
/// Returns `(dominant, remembered)`. The previously remembered hue is kept
/// while its weight is at least `threshold` percent of the new peak.
pub fn select_dominant_hue(windowed: &[u64], last: u8, threshold: u32) -> (u8, u8) {
    let (most, max) = peak(windowed);
    if max == 0 {
        return (0, 0);
    }
    let prev = windowed[last as usize];
    if prev > 0 && prev as u128 * 100 >= max as u128 * threshold as u128 {
        (last, last)
    } else {
        (most as u8, most as u8)
    }
}

fn average_brightness(hsv: &[Hsv], weights: &WeightMap, settings: &AnalyzeSettings, out: &mut [u8]) {
    let n = out.len();
    let mut sums = vec![0u64; n];
    let mut counts = vec![0u64; n];

    for (i, px) in hsv.iter().enumerate() {
        if px.v >= settings.darkness_limit {
            for (c, &w) in weights.pixel(i).iter().enumerate() {
                sums[c] += px.v as u64 * w as u64;
                counts[c] += w as u64;
            }
        }
    }

    let bright = settings.brightness as u64;
    for c in 0..n {
        out[c] = if counts[c] > 0 {
            (sums[c] * bright / (counts[c] * 100)).min(255) as u8
        } else {
            0
        };
    }
}
