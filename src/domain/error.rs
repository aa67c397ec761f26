//! Construction-time configuration faults.
//!
//! Every check happens when a vehicle or scene is built. A scene that was constructed
//! successfully never fails during a tick.

use thiserror::Error;

use super::SourceType;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("source type {0} is not part of the scene palette")]
    UnknownSourceType(SourceType),
    #[error("scene palette must contain at least one source type")]
    EmptyPalette,
    #[error("channel {channel} has gain {gain}; gains must be finite and non-negative, direction is set by the sign")]
    InvalidGain { channel: usize, gain: f64 },
    #[error("channel {channel} reads sensor pair {index} but the vehicle has {available}")]
    MissingSensorPair {
        channel: usize,
        index: usize,
        available: usize,
    },
    #[error("vehicle needs at least one sensor pair")]
    NoSensors,
    #[error("bell curve sigma must be finite and positive, got {0}")]
    InvalidSigma(f64),
    #[error("parameter {name} is out of range: {value}")]
    OutOfRange { name: &'static str, value: f64 },
    #[error("wheelbase must be finite and positive, got {0}")]
    InvalidWheelbase(f64),
    #[error("minimum sensing distance must be finite and positive, got {0}")]
    InvalidMinDistance(f64),
    #[error("motor limits are inconsistent: floor {floor}, ceiling {ceiling:?}")]
    InvalidMotorLimits { floor: f64, ceiling: Option<f64> },
    #[error("domain bounds must be finite and positive, got {width} x {height}")]
    InvalidBounds { width: f64, height: f64 },
    #[error("tick rate must be finite and positive, got {0} Hz")]
    InvalidTickRate(f64),
    #[error("scene needs at least one variant")]
    NoVariants,
    #[error("unknown variant {0:?}")]
    UnknownVariant(String),
    #[error("variant {0:?} is defined more than once")]
    DuplicateVariant(String),
    #[error("spawn pose ({x}, {y}) heading {heading} must be finite and inside the domain")]
    InvalidPose { x: f64, y: f64, heading: f64 },
    #[error("zone {label:?} spans {start}..{end}; it must be a non-empty range inside the domain")]
    InvalidZone { label: String, start: f64, end: f64 },
    #[error("vehicle observes zone {index} but the scene has {available}")]
    UnknownZone { index: usize, available: usize },
}
