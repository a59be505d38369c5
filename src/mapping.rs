//! Value normalization and the linear value -> angle mapping shared by the
//! needle, the color bands and the ticks.

use serde::Serialize;

use crate::error::{GaugeError, Result};

/// The numeric `[min, max]` range a gauge represents. Always `min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Domain {
    min: f64,
    max: f64,
}

impl Domain {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(GaugeError::InvalidDomain { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Clamp into `[min, max]`. `NaN` is treated as `min`.
    pub fn clamp(&self, raw: f64) -> f64 {
        if raw.is_nan() {
            self.min
        } else {
            raw.clamp(self.min, self.max)
        }
    }

    /// Position of `value` in the domain: 0 at `min`, 1 at `max`. Not clamped,
    /// so values outside the domain extrapolate.
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.min) / self.span()
    }

}

/// A value that has been clamped into its domain.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct GaugeValue(f64);

impl GaugeValue {
    pub fn new(raw: f64, domain: &Domain) -> Self {
        Self(domain.clamp(raw))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// Start and end of the gauge arc in degrees. Either direction is allowed and
/// the angles may lie outside `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AngularSweep {
    pub start: f64,
    pub end: f64,
}

impl AngularSweep {
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(GaugeError::InvalidAngle { start, end });
        }
        Ok(Self { start, end })
    }

    /// Signed extent in degrees; negative for a clockwise sweep.
    pub fn extent(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_clockwise(&self) -> bool {
        self.end < self.start
    }
}

/// Linear map from domain values to angles on the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AngularMapping {
    pub domain: Domain,
    pub sweep: AngularSweep,
}

impl AngularMapping {
    pub fn new(domain: Domain, sweep: AngularSweep) -> Self {
        Self { domain, sweep }
    }

    pub fn angle_deg(&self, value: f64) -> f64 {
        self.sweep.start + self.domain.normalize(value) * self.sweep.extent()
    }

    pub fn angle_rad(&self, value: f64) -> f64 {
        self.angle_deg(value).to_radians()
    }
}

/// `n` evenly spaced samples from `start` to `end`, both included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}
