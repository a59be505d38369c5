use thiserror::Error;

/// Errors raised while configuring or laying out a gauge.
///
/// Out-of-range values are never an error; they are clamped into the domain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GaugeError {
    #[error("invalid gauge domain [{min}, {max}]: min must be finite and strictly less than max")]
    InvalidDomain { min: f64, max: f64 },

    #[error("invalid angular sweep {start}° -> {end}°: angles must be finite")]
    InvalidAngle { start: f64, end: f64 },

    #[error(
        "value label color is \"auto\" but value {value} lies outside every color band; \
         specify an explicit value font color"
    )]
    NoBandForValue { value: f64 },

    #[error("invalid value format {spec:?}: {reason}")]
    InvalidFormat { spec: String, reason: String },

    #[error("invalid color {0:?}")]
    InvalidColor(String),
}

pub type Result<T, E = GaugeError> = std::result::Result<T, E>;
