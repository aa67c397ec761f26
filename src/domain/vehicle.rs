//! A vehicle: sensors, wiring and drive composed into one memoryless control loop.

use super::{
    Bounds, ConfigError, DriveIntegrator, FieldView, MotorPair, Pose, Position, Reading,
    SensorArray, SourceType, WiringTopology,
};

#[derive(Clone, Debug, PartialEq)]
pub struct VehicleConfig {
    pub label: String,
    pub body_radius: f64,
    pub sensors: SensorArray,
    pub wiring: WiringTopology,
    pub drive: DriveIntegrator,
    /// Distances below this are clamped before a falloff law is applied.
    pub min_distance: f64,
}

impl VehicleConfig {
    pub fn validate(&self, palette: &[SourceType]) -> Result<(), ConfigError> {
        if !self.min_distance.is_finite() || self.min_distance <= 0.0 {
            return Err(ConfigError::InvalidMinDistance(self.min_distance));
        }
        if !self.body_radius.is_finite() || self.body_radius < 0.0 {
            return Err(ConfigError::OutOfRange {
                name: "body radius",
                value: self.body_radius,
            });
        }
        self.wiring.validate(&self.sensors, palette)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Vehicle {
    pose: Pose,
    initial_pose: Pose,
    motors: MotorPair,
    readings: Vec<Reading>,
    config: VehicleConfig,
}

impl Vehicle {
    pub fn new(
        pose: Pose,
        config: VehicleConfig,
        palette: &[SourceType],
    ) -> Result<Self, ConfigError> {
        config.validate(palette)?;
        Ok(Self {
            pose,
            initial_pose: pose,
            motors: MotorPair::default(),
            readings: vec![Reading::default(); config.wiring.channels.len()],
            config,
        })
    }

    /// Runs one tick against `view`. Readings and motors are recomputed from scratch, nothing
    /// carries over from the previous tick except the pose.
    pub fn update(&mut self, view: &FieldView<'_>, bounds: Bounds) {
        let VehicleConfig {
            sensors,
            wiring,
            drive,
            min_distance,
            ..
        } = &self.config;

        self.readings.clear();
        self.readings.extend(wiring.channels.iter().map(|channel| {
            sensors.sample(
                channel.sensor_pair,
                &self.pose,
                view,
                channel.source_type,
                &channel.response,
                *min_distance,
            )
        }));
        self.motors = wiring.motors(&self.readings);
        self.pose = drive.integrate(self.pose, self.motors, bounds);
    }

    pub fn reset(&mut self) {
        self.pose = self.initial_pose;
        self.motors = MotorPair::default();
        self.readings.fill(Reading::default());
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn motors(&self) -> MotorPair {
        self.motors
    }

    /// Readings of the last tick, one per channel.
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn sensor_positions(&self) -> Vec<Position> {
        self.config.sensors.positions(&self.pose)
    }

    pub fn label(&self) -> &str {
        &self.config.label
    }

    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::domain::{
        Activation, Angle, Channel, Crossing, MotorLimits, ResponseLaw, SensorPair, Sign,
        StimulusField,
    };

    const EPSILON: f64 = 1e-9;
    const BOUNDS: Bounds = Bounds::new(800.0, 600.0);

    fn config(base_speed: f64, channels: Vec<Channel>) -> VehicleConfig {
        VehicleConfig {
            label: "test".to_string(),
            body_radius: 20.0,
            sensors: SensorArray::new(vec![SensorPair::symmetric(30.0, 0.5)]).unwrap(),
            wiring: WiringTopology::new(base_speed, channels, MotorLimits::default()),
            drive: DriveIntegrator::new(40.0).unwrap(),
            min_distance: 1.0,
        }
    }

    fn light(sign: Sign, crossing: Crossing) -> Channel {
        Channel::new(
            Some(SourceType::Light),
            sign,
            crossing,
            ResponseLaw::inverse_square(50000.0),
            0.1,
        )
    }

    fn field(sources: &[(f64, f64)]) -> StimulusField {
        let mut field = StimulusField::new(vec![SourceType::Light]).unwrap();
        for &(x, y) in sources {
            field.add(Position::new(x, y), SourceType::Light).unwrap();
        }
        field
    }

    #[test]
    fn test_straight_line_without_stimulus() {
        let field = field(&[]);
        let pose = Pose::new(Position::new(100.0, 100.0), Angle::new(0.0));
        let mut vehicle = Vehicle::new(
            pose,
            config(2.0, vec![light(Sign::Excitatory, Crossing::Crossed)]),
            field.palette(),
        )
        .unwrap();

        vehicle.update(&field.view(None), BOUNDS);

        assert_eq!(
            vehicle.pose(),
            Pose::new(Position::new(102.0, 100.0), Angle::new(0.0))
        );
        assert_eq!(vehicle.motors(), MotorPair::new(2.0, 2.0));
    }

    #[test]
    fn test_wraps_at_domain_edge() {
        let field = field(&[]);
        let pose = Pose::new(Position::new(799.0, 300.0), Angle::new(0.0));
        let mut vehicle = Vehicle::new(pose, config(2.0, vec![]), field.palette()).unwrap();

        vehicle.update(&field.view(None), BOUNDS);

        assert_abs_diff_eq!(vehicle.pose().position().x(), 1.0, epsilon = EPSILON);
    }

    #[rstest]
    #[case(Sign::Excitatory, Crossing::Uncrossed)]
    #[case(Sign::Excitatory, Crossing::Crossed)]
    #[case(Sign::Inhibitory, Crossing::Uncrossed)]
    #[case(Sign::Inhibitory, Crossing::Crossed)]
    fn test_source_on_axis_does_not_turn(#[case] sign: Sign, #[case] crossing: Crossing) {
        let field = field(&[(300.0, 100.0)]);
        let pose = Pose::new(Position::new(100.0, 100.0), Angle::new(0.0));
        let mut vehicle =
            Vehicle::new(pose, config(1.0, vec![light(sign, crossing)]), field.palette()).unwrap();

        vehicle.update(&field.view(None), BOUNDS);

        let reading = vehicle.readings()[0];
        assert!(reading.intensity.0 > 0.0);
        assert_abs_diff_eq!(reading.intensity.0, reading.intensity.1, epsilon = EPSILON);
        assert_abs_diff_eq!(f64::from(vehicle.pose().heading()), 0.0, epsilon = EPSILON);
    }

    #[rstest]
    #[case::inverse_distance(ResponseLaw::inverse_distance(50.0, 1000.0), Crossing::Crossed)]
    #[case::bell_curve(
        ResponseLaw::inverse_square(50000.0)
            .with_activation(Activation::BellCurve { optimal: 1.0, sigma: 0.5 }),
        Crossing::Crossed,
    )]
    #[case::threshold(
        ResponseLaw::inverse_square(50000.0).with_activation(Activation::Threshold {
            threshold: 1.0,
            min_activation: 1.5,
            slope: 0.015,
        }),
        Crossing::Uncrossed,
    )]
    #[case::range(ResponseLaw::range(300.0, 2.2), Crossing::Crossed)]
    #[case::bilateral(ResponseLaw::inverse_square(50000.0), Crossing::Bilateral)]
    fn test_source_on_axis_does_not_turn_for_any_law(
        #[case] law: ResponseLaw,
        #[case] crossing: Crossing,
    ) {
        let field = field(&[(300.0, 100.0)]);
        let pose = Pose::new(Position::new(100.0, 100.0), Angle::new(0.0));
        let channel = Channel::new(Some(SourceType::Light), Sign::Excitatory, crossing, law, 0.5);
        let mut vehicle = Vehicle::new(pose, config(1.0, vec![channel]), field.palette()).unwrap();

        vehicle.update(&field.view(None), BOUNDS);

        let reading = vehicle.readings()[0];
        assert!(reading.activation.0 > 0.0);
        assert_abs_diff_eq!(reading.activation.0, reading.activation.1, epsilon = EPSILON);
        assert_abs_diff_eq!(f64::from(vehicle.pose().heading()), 0.0, epsilon = EPSILON);
    }

    /// Heading change after one tick with a light ahead on the left. The light lies at a
    /// negative bearing, so turning toward it decreases the heading.
    fn heading_change_with_light_on_left(crossing: Crossing) -> f64 {
        let field = field(&[(500.0, 200.0)]);
        let pose = Pose::new(Position::new(400.0, 300.0), Angle::new(0.0));
        let mut vehicle = Vehicle::new(
            pose,
            config(1.0, vec![light(Sign::Excitatory, crossing)]),
            field.palette(),
        )
        .unwrap();

        vehicle.update(&field.view(None), BOUNDS);

        let reading = vehicle.readings()[0];
        assert!(reading.intensity.0 > reading.intensity.1);
        f64::from(vehicle.pose().heading()) - f64::from(pose.heading())
    }

    #[test]
    fn test_crossed_excitatory_approaches() {
        assert!(heading_change_with_light_on_left(Crossing::Crossed) < 0.0);
    }

    #[test]
    fn test_uncrossed_excitatory_flees() {
        assert!(heading_change_with_light_on_left(Crossing::Uncrossed) > 0.0);
    }

    #[test]
    fn test_zone_view_hides_sources() {
        let field = field(&[(500.0, 200.0)]);
        let zone = crate::domain::Zone::new("left", 0.0..450.0);
        let pose = Pose::new(Position::new(400.0, 300.0), Angle::new(0.0));
        let mut vehicle = Vehicle::new(
            pose,
            config(1.0, vec![light(Sign::Excitatory, Crossing::Crossed)]),
            field.palette(),
        )
        .unwrap();

        vehicle.update(&field.view(Some(&zone)), BOUNDS);

        assert_eq!(vehicle.readings()[0], Reading::default());
        assert_eq!(vehicle.motors(), MotorPair::new(1.0, 1.0));
    }

    #[test]
    fn test_channel_reads_its_own_sensor_pair() {
        let field = field(&[(300.0, 100.0)]);
        let pose = Pose::new(Position::new(400.0, 100.0), Angle::new(0.0));
        let front = light(Sign::Excitatory, Crossing::Crossed);
        let rear = Channel {
            sensor_pair: 1,
            ..front
        };
        let config = VehicleConfig {
            sensors: SensorArray::new(vec![
                SensorPair::symmetric(30.0, 0.5),
                SensorPair::symmetric(30.0, 2.5),
            ])
            .unwrap(),
            ..config(1.0, vec![front, rear])
        };
        let mut vehicle = Vehicle::new(pose, config, field.palette()).unwrap();

        vehicle.update(&field.view(None), BOUNDS);

        let readings = vehicle.readings();
        assert!(readings[1].intensity.0 > readings[0].intensity.0);
        assert_eq!(vehicle.sensor_positions().len(), 4);
    }

    #[test]
    fn test_reset_restores_initial_pose() {
        let field = field(&[(500.0, 200.0)]);
        let pose = Pose::new(Position::new(400.0, 300.0), Angle::new(0.0));
        let mut vehicle = Vehicle::new(
            pose,
            config(1.0, vec![light(Sign::Excitatory, Crossing::Crossed)]),
            field.palette(),
        )
        .unwrap();
        for _ in 0..20 {
            vehicle.update(&field.view(None), BOUNDS);
        }
        assert_ne!(vehicle.pose(), pose);

        vehicle.reset();

        assert_eq!(vehicle.pose(), pose);
        assert_eq!(vehicle.motors(), MotorPair::default());
    }

    #[test]
    fn test_sensor_positions_follow_pose() {
        let field = field(&[]);
        let pose = Pose::new(Position::new(100.0, 100.0), Angle::new(0.0));
        let vehicle = Vehicle::new(pose, config(0.0, vec![]), field.palette()).unwrap();
        let positions = vehicle.sensor_positions();
        assert_eq!(positions.len(), 2);
        assert_abs_diff_eq!(positions[0].distance(pose.position()), 30.0, epsilon = EPSILON);
    }

    #[rstest]
    #[case::min_distance(
        VehicleConfig { min_distance: 0.0, ..config(1.0, vec![]) },
        ConfigError::InvalidMinDistance(0.0),
    )]
    #[case::body_radius(
        VehicleConfig { body_radius: -1.0, ..config(1.0, vec![]) },
        ConfigError::OutOfRange { name: "body radius", value: -1.0 },
    )]
    #[case::unknown_source(
        config(1.0, vec![Channel::new(
            Some(SourceType::Heat),
            Sign::Excitatory,
            Crossing::Crossed,
            ResponseLaw::inverse_square(1.0),
            1.0,
        )]),
        ConfigError::UnknownSourceType(SourceType::Heat),
    )]
    fn test_invalid_vehicle(#[case] config: VehicleConfig, #[case] expected: ConfigError) {
        let pose = Pose::new(Position::new(0.0, 0.0), Angle::new(0.0));
        assert_eq!(
            Vehicle::new(pose, config, &[SourceType::Light]),
            Err(expected)
        );
    }
}
