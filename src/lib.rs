// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

pub mod config;
pub mod error;
pub mod format;
pub mod layout;
pub mod mapping;
pub mod raster;
pub mod viewer;

use std::sync::mpsc::Receiver;

pub use config::{Color, ColorBand, GaugeConfig, LabelColor};
pub use error::{GaugeError, Result};
pub use format::ValueFormat;
pub use layout::{Point, Primitive, Scene};
pub use mapping::{AngularMapping, AngularSweep, Domain, GaugeValue};
pub use raster::Renderer;
pub use viewer::ViewerOptions;

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// A circular gauge: an immutable configuration plus the current value.
///
/// Construction validates the configuration once. Setting a value clamps it
/// into the domain; every call to [`Gauge::layout`] recomputes the whole
/// scene from scratch.
#[derive(Debug, Clone)]
pub struct Gauge {
    config: GaugeConfig,
    mapping: AngularMapping,
    format: ValueFormat,
    value: GaugeValue,
}

impl Gauge {
    pub fn new(config: GaugeConfig, value: f64) -> Result<Self> {
        let format = config.validate()?;
        let mapping = config.mapping()?;
        let value = GaugeValue::new(value, &mapping.domain);
        Ok(Self {
            config,
            mapping,
            format,
            value,
        })
    }

    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    pub fn mapping(&self) -> &AngularMapping {
        &self.mapping
    }

    pub fn value(&self) -> f64 {
        self.value.get()
    }

    /// Replace the value, returning what was actually stored.
    pub fn set_value(&mut self, raw: f64) -> f64 {
        self.value = GaugeValue::new(raw, &self.mapping.domain);
        self.value.get()
    }

    /// A copy of this gauge showing `raw` instead.
    pub fn with_value(&self, raw: f64) -> Self {
        let mut next = self.clone();
        next.set_value(raw);
        next
    }

    /// Needle angle in degrees.
    pub fn needle_angle(&self) -> f64 {
        self.mapping.angle_deg(self.value.get())
    }

    pub fn value_text(&self) -> String {
        self.format.render(self.value.get())
    }

    /// Color the value label would be drawn in. Fails for an "auto" color
    /// when the value falls outside every band.
    pub fn value_color(&self) -> Result<Color> {
        layout::resolve_label_color(
            self.config.value_font_color,
            &self.config.effective_bands(),
            self.value.get(),
        )
    }

    pub fn layout(&self) -> Result<Scene> {
        layout::layout(&self.config, &self.mapping, &self.format, self.value)
    }

    /// Open a window showing this gauge until it is closed.
    pub fn show(
        self,
        renderer: Renderer,
        options: ViewerOptions,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        viewer::run(self, renderer, options, None)
    }

    /// Like [`Gauge::show`], taking new values from `receiver`.
    pub fn show_with_values(
        self,
        renderer: Renderer,
        options: ViewerOptions,
        receiver: Receiver<f64>,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        viewer::run(self, renderer, options, Some(receiver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn construction_clamps_initial_value() {
        let gauge = Gauge::new(GaugeConfig::default(), -3.0).unwrap();
        assert_eq!(gauge.value(), 0.0);
        assert_eq!(gauge.needle_angle(), 225.0);
    }

    #[test]
    fn set_value_returns_stored_value() {
        let mut gauge = Gauge::new(GaugeConfig::default(), 50.0).unwrap();
        assert_eq!(gauge.set_value(150.0), 100.0);
        assert_eq!(gauge.value(), 100.0);
        assert_eq!(gauge.needle_angle(), -45.0);
        assert_eq!(gauge.set_value(12.5), 12.5);
    }

    #[test]
    fn with_value_leaves_original_untouched() {
        let gauge = Gauge::new(GaugeConfig::default(), 20.0).unwrap();
        let moved = gauge.with_value(80.0);
        assert_eq!(gauge.value(), 20.0);
        assert_eq!(moved.value(), 80.0);
    }

    #[test]
    fn invalid_domain_fails_fast() {
        let config = GaugeConfig::builder().min_value(100.0).max_value(0.0).build();
        assert_eq!(
            Gauge::new(config, 50.0).unwrap_err(),
            GaugeError::InvalidDomain { min: 100.0, max: 0.0 }
        );
    }
}
