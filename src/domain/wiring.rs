//! Wiring from sensor readings to motor speeds.
//!
//! Each channel adds an independent term to the two motor accumulators, which start at the
//! topology's base speed. The sum is clamped once after every channel has contributed.

use std::fmt;

use super::{ConfigError, Reading, ResponseLaw, SensorArray, SourceType};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Sign {
    /// More stimulus, more speed.
    Excitatory,
    /// More stimulus, less speed.
    Inhibitory,
}

impl Sign {
    pub fn factor(&self) -> f64 {
        match self {
            Sign::Excitatory => 1.0,
            Sign::Inhibitory => -1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Crossing {
    /// Each sensor drives the motor on its own side.
    Uncrossed,
    /// Each sensor drives the motor on the opposite side.
    Crossed,
    /// Both motors receive the mean of the two sensors.
    Bilateral,
}

/// Behavior named after the classic vehicles, derived from sign and crossing.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Behavior {
    Fear,
    Aggression,
    Love,
    Explorer,
    Drive,
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Behavior::Fear => "fear",
            Behavior::Aggression => "aggression",
            Behavior::Love => "love",
            Behavior::Explorer => "explorer",
            Behavior::Drive => "drive",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotorPair {
    pub left: f64,
    pub right: f64,
}

impl MotorPair {
    pub const fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotorLimits {
    pub floor: f64,
    pub ceiling: Option<f64>,
}

impl MotorLimits {
    pub const fn floor(floor: f64) -> Self {
        Self {
            floor,
            ceiling: None,
        }
    }

    pub const fn between(floor: f64, ceiling: f64) -> Self {
        Self {
            floor,
            ceiling: Some(ceiling),
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        let value = value.max(self.floor);
        match self.ceiling {
            Some(ceiling) => value.min(ceiling),
            None => value,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let floor_ok = self.floor.is_finite() && self.floor >= 0.0;
        let ceiling_ok = self
            .ceiling
            .map_or(true, |c| c.is_finite() && c >= self.floor);
        if floor_ok && ceiling_ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidMotorLimits {
                floor: self.floor,
                ceiling: self.ceiling,
            })
        }
    }
}

impl Default for MotorLimits {
    fn default() -> Self {
        Self::floor(0.0)
    }
}

/// One path from a source type through a response law into the motors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Channel {
    /// `None` reacts to every source in the field.
    pub source_type: Option<SourceType>,
    pub sign: Sign,
    pub crossing: Crossing,
    pub response: ResponseLaw,
    pub gain: f64,
    pub sensor_pair: usize,
    /// Channel stays silent while both raw intensities are below this level.
    pub quiescence: Option<f64>,
}

impl Channel {
    pub const fn new(
        source_type: Option<SourceType>,
        sign: Sign,
        crossing: Crossing,
        response: ResponseLaw,
        gain: f64,
    ) -> Self {
        Self {
            source_type,
            sign,
            crossing,
            response,
            gain,
            sensor_pair: 0,
            quiescence: None,
        }
    }

    pub const fn quiescent_below(self, level: f64) -> Self {
        Self {
            quiescence: Some(level),
            ..self
        }
    }

    pub fn behavior(&self) -> Behavior {
        match (self.sign, self.crossing) {
            (_, Crossing::Bilateral) => Behavior::Drive,
            (Sign::Excitatory, Crossing::Uncrossed) => Behavior::Fear,
            (Sign::Excitatory, Crossing::Crossed) => Behavior::Aggression,
            (Sign::Inhibitory, Crossing::Uncrossed) => Behavior::Love,
            (Sign::Inhibitory, Crossing::Crossed) => Behavior::Explorer,
        }
    }

    /// Term added to the left and right motors for `reading`.
    pub fn contribution(&self, reading: &Reading) -> (f64, f64) {
        if self.quiescence.is_some_and(|level| reading.is_quiet(level)) {
            return (0.0, 0.0);
        }
        let scale = self.sign.factor() * self.gain;
        let (left, right) = reading.activation;
        match self.crossing {
            Crossing::Uncrossed => (scale * left, scale * right),
            Crossing::Crossed => (scale * right, scale * left),
            Crossing::Bilateral => {
                let mean = scale * (left + right) / 2.0;
                (mean, mean)
            }
        }
    }

    fn validate(
        &self,
        index: usize,
        sensors: &SensorArray,
        palette: &[SourceType],
    ) -> Result<(), ConfigError> {
        if !self.gain.is_finite() || self.gain < 0.0 {
            return Err(ConfigError::InvalidGain {
                channel: index,
                gain: self.gain,
            });
        }
        if sensors.pair(self.sensor_pair).is_none() {
            return Err(ConfigError::MissingSensorPair {
                channel: index,
                index: self.sensor_pair,
                available: sensors.pairs().len(),
            });
        }
        if let Some(source_type) = self.source_type {
            if !palette.contains(&source_type) {
                return Err(ConfigError::UnknownSourceType(source_type));
            }
        }
        if let Some(level) = self.quiescence {
            if !level.is_finite() || level < 0.0 {
                return Err(ConfigError::OutOfRange {
                    name: "quiescence level",
                    value: level,
                });
            }
        }
        self.response.validate()
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = self
            .source_type
            .map_or("any source", |source_type| source_type.name());
        write!(
            f,
            "{source}: {} x{} ({})",
            self.behavior(),
            self.gain,
            self.response
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WiringTopology {
    pub base_speed: f64,
    pub channels: Vec<Channel>,
    pub limits: MotorLimits,
}

impl WiringTopology {
    pub fn new(base_speed: f64, channels: Vec<Channel>, limits: MotorLimits) -> Self {
        Self {
            base_speed,
            channels,
            limits,
        }
    }

    /// Folds one reading per channel into a motor pair. `readings` must line up with the
    /// channels.
    pub fn motors(&self, readings: &[Reading]) -> MotorPair {
        let (left, right) = self.channels.iter().zip(readings).fold(
            (self.base_speed, self.base_speed),
            |(left, right), (channel, reading)| {
                let (dl, dr) = channel.contribution(reading);
                (left + dl, right + dr)
            },
        );

        MotorPair::new(self.limits.clamp(left), self.limits.clamp(right))
    }

    pub fn validate(
        &self,
        sensors: &SensorArray,
        palette: &[SourceType],
    ) -> Result<(), ConfigError> {
        if !self.base_speed.is_finite() {
            return Err(ConfigError::OutOfRange {
                name: "base speed",
                value: self.base_speed,
            });
        }
        self.limits.validate()?;
        self.channels
            .iter()
            .enumerate()
            .try_for_each(|(index, channel)| channel.validate(index, sensors, palette))
    }
}
