//! Response laws: how strongly a sensor feels the sources around it.
//!
//! A law has two stages. The falloff turns the distance to each matching source into an
//! intensity and sums them. The activation then maps the summed intensity onto the value fed
//! into the wiring. Both stages are pure functions of their parameters.

use std::fmt;

use super::{ConfigError, Position, Source};

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum Falloff {
    /// `base + k / d`
    InverseDistance { base: f64, k: f64 },
    /// `k / d^2`
    InverseSquare { k: f64 },
    /// `((range - d) / range)^curve` inside `range`, nothing beyond. The sum over all sources is
    /// capped at 1.
    Range { range: f64, curve: f64 },
}

impl Falloff {
    /// Intensity of one source at `distance`, which is clamped to `min_distance` first.
    pub fn intensity(&self, distance: f64, min_distance: f64) -> f64 {
        let distance = distance.max(min_distance);
        match *self {
            Falloff::InverseDistance { base, k } => base + k / distance,
            Falloff::InverseSquare { k } => k / distance.powi(2),
            Falloff::Range { range, curve } => {
                if distance >= range {
                    0.0
                } else {
                    ((range - distance) / range).powf(curve)
                }
            }
        }
    }

    pub fn aggregate<'a>(
        &self,
        point: Position,
        sources: impl Iterator<Item = &'a Source>,
        min_distance: f64,
    ) -> f64 {
        let total = sources
            .map(|s| self.intensity(point.distance(s.position()), min_distance))
            .sum::<f64>();
        match self {
            Falloff::Range { .. } => total.min(1.0),
            _ => total,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Falloff::InverseDistance { base, k } => {
                non_negative("inverse distance base", base)?;
                non_negative("inverse distance k", k)
            }
            Falloff::InverseSquare { k } => non_negative("inverse square k", k),
            Falloff::Range { range, curve } => {
                positive("sensing range", range)?;
                positive("range curve", curve)
            }
        }
    }
}

impl fmt::Display for Falloff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Falloff::InverseDistance { base, k } => write!(f, "{base} + {k}/d"),
            Falloff::InverseSquare { k } => write!(f, "{k}/d^2"),
            Falloff::Range { range, curve } => write!(f, "range {range}^{curve}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum Activation {
    /// Passes the intensity through unchanged.
    Linear,
    /// `min(cap, slope * i)`
    Saturating { slope: f64, cap: f64 },
    /// Gaussian bump, exactly 1 at `optimal`.
    BellCurve { optimal: f64, sigma: f64 },
    /// Silent below `threshold`, then jumps to `min_activation` and rises with `slope`.
    Threshold {
        threshold: f64,
        min_activation: f64,
        slope: f64,
    },
}

impl Activation {
    pub fn apply(&self, intensity: f64) -> f64 {
        match *self {
            Activation::Linear => intensity,
            Activation::Saturating { slope, cap } => (slope * intensity).min(cap),
            Activation::BellCurve { optimal, sigma } => {
                (-(intensity - optimal).powi(2) / (2.0 * sigma * sigma)).exp()
            }
            Activation::Threshold {
                threshold,
                min_activation,
                slope,
            } => {
                if intensity < threshold {
                    0.0
                } else {
                    min_activation + slope * (intensity - threshold)
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Activation::Linear => Ok(()),
            Activation::Saturating { slope, cap } => {
                non_negative("saturation slope", slope)?;
                non_negative("saturation cap", cap)
            }
            Activation::BellCurve { optimal, sigma } => {
                finite("bell curve optimum", optimal)?;
                if sigma.is_finite() && sigma > 0.0 {
                    Ok(())
                } else {
                    Err(ConfigError::InvalidSigma(sigma))
                }
            }
            Activation::Threshold {
                threshold,
                min_activation,
                slope,
            } => {
                finite("threshold", threshold)?;
                non_negative("threshold minimum activation", min_activation)?;
                non_negative("threshold slope", slope)
            }
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::Linear => write!(f, "linear"),
            Activation::Saturating { slope, cap } => write!(f, "min({cap}, {slope}*i)"),
            Activation::BellCurve { optimal, sigma } => write!(f, "bell({optimal}, {sigma})"),
            Activation::Threshold {
                threshold,
                min_activation,
                slope,
            } => write!(f, "step({threshold}, {min_activation}, {slope})"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct ResponseLaw {
    pub falloff: Falloff,
    pub activation: Activation,
}

impl ResponseLaw {
    pub const fn new(falloff: Falloff, activation: Activation) -> Self {
        Self {
            falloff,
            activation,
        }
    }

    pub const fn inverse_distance(base: f64, k: f64) -> Self {
        Self::new(Falloff::InverseDistance { base, k }, Activation::Linear)
    }

    pub const fn inverse_square(k: f64) -> Self {
        Self::new(Falloff::InverseSquare { k }, Activation::Linear)
    }

    pub const fn range(range: f64, curve: f64) -> Self {
        Self::new(Falloff::Range { range, curve }, Activation::Linear)
    }

    pub const fn with_activation(self, activation: Activation) -> Self {
        Self {
            activation,
            ..self
        }
    }

    /// Raw summed intensity at `point`.
    pub fn intensity<'a>(
        &self,
        point: Position,
        sources: impl Iterator<Item = &'a Source>,
        min_distance: f64,
    ) -> f64 {
        self.falloff.aggregate(point, sources, min_distance)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.falloff.validate()?;
        self.activation.validate()
    }
}

impl fmt::Display for ResponseLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.falloff, self.activation)
    }
}

fn finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value })
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value })
    }
}
