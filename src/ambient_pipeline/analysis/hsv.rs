//! Integer RGB/HSV conversions
//!
//! Hue, saturation and value are all quantized to 0..=255. Integer divisions
//! round half up via [`pos_div`], truncating toward zero for negative
//! dividends.

use rayon::prelude::*;

use crate::ambient_pipeline::common::color::{Hsv, Rgb};

const H_MAX: i32 = 255;
const S_MAX: i32 = 255;
const V_MAX: i32 = 255;

#[inline]
fn pos_div(a: i32, b: i32) -> i32 {
    a / b + if a % b >= b / 2 { 1 } else { 0 }
}

#[inline]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let min = r.min(g).min(b);
    let max = r.max(g).max(b);
    let delta = max - min;

    let v = pos_div(max * V_MAX, 255) as u8;
    if delta == 0 {
        return Hsv { h: 0, s: 0, v };
    }

    let s = pos_div(delta * S_MAX, max) as u8;

    let dr = (max - r) + 3 * delta;
    let dg = (max - g) + 3 * delta;
    let db = (max - b) + 3 * delta;
    let divisor = 6 * delta;

    let mut h = if r == max {
        pos_div((db - dg) * H_MAX, divisor)
    } else if g == max {
        pos_div((dr - db) * H_MAX, divisor) + H_MAX / 3
    } else {
        pos_div((dg - dr) * H_MAX, divisor) + (H_MAX / 3) * 2
    };

    if h < 0 {
        h += H_MAX;
    }
    if h > H_MAX {
        h -= H_MAX;
    }

    Hsv { h: h as u8, s, v }
}

#[inline]
fn to_byte(x: f64) -> u8 {
    (x * 255.0 + 0.5) as u8
}

/// Six-sector HSV to RGB conversion with half-up rounding
pub fn hsv_to_rgb(h: u8, s: u8, v: u8) -> Rgb {
    let h = h as f64 / H_MAX as f64;
    let s = s as f64 / S_MAX as f64;
    let v = v as f64 / V_MAX as f64;

    if s == 0.0 {
        let c = to_byte(v);
        return Rgb::new(c, c, c);
    }

    let mut h = h * 6.0;
    if h == 6.0 {
        h = 0.0;
    }
    let i = h as i32;
    let f = h - i as f64;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match i {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Rgb::new(to_byte(r), to_byte(g), to_byte(b))
}

/// Convert a packed RGB image into `hsv`, one entry per pixel
pub fn convert_image(rgb: &[u8], hsv: &mut [Hsv]) {
    hsv.par_iter_mut()
        .zip(rgb.par_chunks_exact(3))
        .for_each(|(out, px)| *out = rgb_to_hsv(px[0], px[1], px[2]));
}
