//! Sensors mounted on a vehicle body and the readings they take.

use super::{Angle, ConfigError, FieldView, Pose, Position, ResponseLaw, SourceType};

/// Mounting point of one sensor, relative to the vehicle center and heading.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct SensorGeometry {
    pub distance: f64,
    pub angle_offset: Angle,
}

impl SensorGeometry {
    pub const fn new(distance: f64, angle_offset: Angle) -> Self {
        Self {
            distance,
            angle_offset,
        }
    }

    pub fn local_position(&self) -> Position {
        Position::polar(self.distance, self.angle_offset)
    }

    /// Sensor position in the world. The result is not wrapped, a sensor may stick out of the
    /// domain while its vehicle is close to an edge.
    pub fn world_position(&self, pose: &Pose) -> Position {
        pose.position() + self.local_position().rotate_vector(pose.heading())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct SensorPair {
    pub left: SensorGeometry,
    pub right: SensorGeometry,
}

impl SensorPair {
    /// Mirror-image pair. The left sensor sits at `-spread`, the right one at `+spread`.
    pub const fn symmetric(distance: f64, spread: f64) -> Self {
        Self {
            left: SensorGeometry::new(distance, Angle::new(-spread)),
            right: SensorGeometry::new(distance, Angle::new(spread)),
        }
    }

    pub fn world_positions(&self, pose: &Pose) -> (Position, Position) {
        (
            self.left.world_position(pose),
            self.right.world_position(pose),
        )
    }
}

/// Left and right values taken by one channel during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reading {
    pub intensity: (f64, f64),
    pub activation: (f64, f64),
}

impl Reading {
    pub fn is_quiet(&self, level: f64) -> bool {
        self.intensity.0 < level && self.intensity.1 < level
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SensorArray {
    pairs: Vec<SensorPair>,
}

impl SensorArray {
    pub fn new(pairs: Vec<SensorPair>) -> Result<Self, ConfigError> {
        if pairs.is_empty() {
            return Err(ConfigError::NoSensors);
        }
        for pair in &pairs {
            for sensor in [pair.left, pair.right] {
                if !sensor.distance.is_finite() || sensor.distance < 0.0 {
                    return Err(ConfigError::OutOfRange {
                        name: "sensor distance",
                        value: sensor.distance,
                    });
                }
                if !f64::from(sensor.angle_offset).is_finite() {
                    return Err(ConfigError::OutOfRange {
                        name: "sensor angle",
                        value: sensor.angle_offset.into(),
                    });
                }
            }
        }
        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[SensorPair] {
        &self.pairs
    }

    pub fn pair(&self, index: usize) -> Option<&SensorPair> {
        self.pairs.get(index)
    }

    /// World positions of all sensors, left before right, pair by pair.
    pub fn positions(&self, pose: &Pose) -> Vec<Position> {
        self.pairs
            .iter()
            .flat_map(|p| {
                let (left, right) = p.world_positions(pose);
                [left, right]
            })
            .collect()
    }

    /// Samples `view` at both sensors of pair `index`.
    ///
    /// The index must come from a topology that was validated against this array, an unknown
    /// pair panics.
    pub fn sample(
        &self,
        index: usize,
        pose: &Pose,
        view: &FieldView<'_>,
        filter: Option<SourceType>,
        law: &ResponseLaw,
        min_distance: f64,
    ) -> Reading {
        let (left, right) = self.pairs[index].world_positions(pose);
        let intensity = (
            law.intensity(left, view.query(filter), min_distance),
            law.intensity(right, view.query(filter), min_distance),
        );
        let activation = (
            law.activation.apply(intensity.0),
            law.activation.apply(intensity.1),
        );

        Reading {
            intensity,
            activation,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::domain::{Activation, StimulusField};

    const EPSILON: f64 = 1e-9;

    #[rstest]
    #[case::ahead(  Angle::new(0.0),      Position::new(130.0, 100.0) )]
    #[case::turned( Angle::new(0.5 * PI), Position::new(100.0, 130.0) )]
    #[case::behind( Angle::new(PI),       Position::new( 70.0, 100.0) )]
    fn test_world_position_rotates_with_heading(
        #[case] heading: Angle,
        #[case] expected: Position,
    ) {
        let sensor = SensorGeometry::new(30.0, Angle::new(0.0));
        let pose = Pose::new(Position::new(100.0, 100.0), heading);
        let position = sensor.world_position(&pose);
        assert_abs_diff_eq!(position.x(), expected.x(), epsilon = EPSILON);
        assert_abs_diff_eq!(position.y(), expected.y(), epsilon = EPSILON);
    }

    #[test]
    fn test_left_sensor_on_negative_side() {
        let pair = SensorPair::symmetric(30.0, 0.5);
        let pose = Pose::new(Position::new(100.0, 100.0), Angle::new(0.0));
        let (left, right) = pair.world_positions(&pose);
        assert!(left.y() < 100.0);
        assert!(right.y() > 100.0);
        assert_abs_diff_eq!(left.x(), right.x(), epsilon = EPSILON);
    }

    #[test]
    fn test_sensors_may_leave_the_domain() {
        let sensor = SensorGeometry::new(30.0, Angle::new(0.0));
        let pose = Pose::new(Position::new(790.0, 100.0), Angle::new(0.0));
        assert_abs_diff_eq!(sensor.world_position(&pose).x(), 820.0, epsilon = EPSILON);
    }

    #[test]
    fn test_positions_in_pair_order() {
        let array = SensorArray::new(vec![
            SensorPair::symmetric(30.0, 0.5),
            SensorPair::symmetric(10.0, 0.5),
        ])
        .unwrap();
        let pose = Pose::new(Position::new(0.0, 0.0), Angle::new(0.0));
        let positions = array.positions(&pose);
        assert_eq!(positions.len(), 4);
        assert!(positions[0].y() < 0.0 && positions[1].y() > 0.0);
        assert!(positions[0].x() > positions[2].x());
    }

    #[test]
    fn test_sample_on_axis_is_symmetric() {
        let mut field = StimulusField::new(vec![SourceType::Light]).unwrap();
        field.add(Position::new(300.0, 100.0), SourceType::Light).unwrap();
        let array = SensorArray::new(vec![SensorPair::symmetric(37.5, 0.7)]).unwrap();
        let pose = Pose::new(Position::new(100.0, 100.0), Angle::new(0.0));
        let law = ResponseLaw::inverse_square(50000.0).with_activation(Activation::BellCurve {
            optimal: 1.0,
            sigma: 0.5,
        });

        let reading = array.sample(0, &pose, &field.view(None), None, &law, 1.0);

        assert!(reading.intensity.0 > 0.0);
        assert_abs_diff_eq!(reading.intensity.0, reading.intensity.1, epsilon = EPSILON);
        assert_abs_diff_eq!(reading.activation.0, reading.activation.1, epsilon = EPSILON);
    }

    #[test]
    fn test_sample_filters_by_type() {
        let mut field = StimulusField::new(vec![SourceType::Light, SourceType::Heat]).unwrap();
        field.add(Position::new(130.0, 100.0), SourceType::Heat).unwrap();
        let array = SensorArray::new(vec![SensorPair::symmetric(30.0, 0.5)]).unwrap();
        let pose = Pose::new(Position::new(100.0, 100.0), Angle::new(0.0));
        let law = ResponseLaw::inverse_square(100.0);
        let view = field.view(None);

        let light = array.sample(0, &pose, &view, Some(SourceType::Light), &law, 1.0);
        let any = array.sample(0, &pose, &view, None, &law, 1.0);

        assert_eq!(light, Reading::default());
        assert!(any.intensity.0 > 0.0);
    }

    #[test]
    fn test_reading_quiet_needs_both_sides_below_level() {
        let reading = Reading {
            intensity: (0.05, 0.2),
            activation: (0.0, 0.0),
        };
        assert!(!reading.is_quiet(0.1));
        assert!(reading.is_quiet(0.3));
    }

    #[rstest]
    #[case::empty(vec![], ConfigError::NoSensors)]
    #[case::negative_distance(
        vec![SensorPair::symmetric(-1.0, 0.5)],
        ConfigError::OutOfRange { name: "sensor distance", value: -1.0 },
    )]
    fn test_invalid_array(#[case] pairs: Vec<SensorPair>, #[case] expected: ConfigError) {
        assert_eq!(SensorArray::new(pairs), Err(expected));
    }
}
