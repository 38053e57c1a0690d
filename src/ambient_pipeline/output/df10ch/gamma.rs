use std::{collections::HashMap, sync::Arc};

/// 256-entry brightness to PWM lookup of one (gamma, white calibration) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GammaTable {
    gamma: u8,
    white_cal: u16,
    pwm_res: u16,
    values: Vec<u16>,
}

impl GammaTable {
    /// `round((v / 255) ^ (gamma / 10) * white_cal)`, clamped to `pwm_res`
    pub fn compute(gamma: u8, white_cal: u16, pwm_res: u16) -> Self {
        let exponent = gamma as f64 / 10.0;
        let values = (0..=255u16)
            .map(|v| {
                let pwm = ((v as f64 / 255.0).powf(exponent) * white_cal as f64).round() as u16;
                pwm.min(pwm_res)
            })
            .collect();
        Self {
            gamma,
            white_cal,
            pwm_res,
            values,
        }
    }

    #[inline]
    pub fn get(&self, value: u8) -> u16 {
        self.values[value as usize]
    }

    pub fn gamma(&self) -> u8 {
        self.gamma
    }

    pub fn white_cal(&self) -> u16 {
        self.white_cal
    }

    pub fn pwm_res(&self) -> u16 {
        self.pwm_res
    }
}

/// Tables shared by every channel with the same correction parameters
#[derive(Debug, Default)]
pub struct GammaTableCache {
    tables: HashMap<(u8, u16, u16), Arc<GammaTable>>,
}

impl GammaTableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(&mut self, gamma: u8, white_cal: u16, pwm_res: u16) -> Arc<GammaTable> {
        self.tables
            .entry((gamma, white_cal, pwm_res))
            .or_insert_with(|| Arc::new(GammaTable::compute(gamma, white_cal, pwm_res)))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }
}
