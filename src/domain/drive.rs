//! Differential-drive kinematics.
//!
//! Heading 0 points along +x and a positive turn rotates from +x toward +y. With the left sensor
//! at a negative angle offset, a faster left motor turns the vehicle toward its right side.

use nalgebra::{Matrix2, Vector2};

use super::{Angle, Bounds, ConfigError, MotorPair, Position};

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Pose {
    position: Position,
    heading: Angle,
}

impl Pose {
    pub const fn new(position: Position, heading: Angle) -> Self {
        Self { position, heading }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn heading(&self) -> Angle {
        self.heading
    }
}

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct DriveIntegrator {
    wheelbase: f64,
}

impl DriveIntegrator {
    pub fn new(wheelbase: f64) -> Result<Self, ConfigError> {
        if wheelbase.is_finite() && wheelbase > 0.0 {
            Ok(Self { wheelbase })
        } else {
            Err(ConfigError::InvalidWheelbase(wheelbase))
        }
    }

    pub fn wheelbase(&self) -> f64 {
        self.wheelbase
    }

    /// Forward speed and turn rate per tick for the given motor pair.
    pub fn velocity_vector(&self, motors: MotorPair) -> Vector2<f64> {
        let j = Matrix2::new(
            0.5,
            0.5,
            self.wheelbase.recip(),
            -self.wheelbase.recip(),
        );
        j * Vector2::new(motors.left, motors.right)
    }

    /// Advances a pose by one tick. The heading is turned first, the vehicle then moves along
    /// the new heading and is wrapped back into the domain.
    pub fn integrate(&self, pose: Pose, motors: MotorPair, bounds: Bounds) -> Pose {
        let q = self.velocity_vector(motors);
        let forward = q[0];
        let turn = q[1];

        let heading = pose.heading + Angle::new(turn);
        let position = pose.position + Position::polar(forward, heading);

        Pose::new(bounds.wrap(position), heading)
    }
}
