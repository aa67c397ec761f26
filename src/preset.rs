//! Ready-made scenes, one per classic vehicle demonstration.
//!
//! Every preset is plain configuration data for the one engine in `domain`; none of them adds
//! behavior of its own.

use std::{f64::consts::PI, fmt, slice::Iter, str::FromStr};

use thiserror::Error;

use crate::domain::{
    Activation, Angle, Bounds, Channel, ConfigError, Crossing, DriveIntegrator, MotorLimits, Pose,
    Position, ResponseLaw, Scene, SceneConfig, SensorArray, SensorPair, Sign, Source, SourceType,
    Spawn, Variant, VehicleConfig, WiringTopology, Zone,
};

const TICK_RATE: f64 = 60.0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresetError {
    #[error("unknown preset {0:?}")]
    Unknown(String),
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Preset {
    FearAndAggression,
    LoveAndExploration,
    #[default]
    Multisensorial,
    Zones,
    RangeSensing,
    Values,
    Comparison,
}

impl Preset {
    pub fn iter() -> Iter<'static, Preset> {
        static PRESETS: [Preset; 7] = [
            Preset::FearAndAggression,
            Preset::LoveAndExploration,
            Preset::Multisensorial,
            Preset::Zones,
            Preset::RangeSensing,
            Preset::Values,
            Preset::Comparison,
        ];
        PRESETS.iter()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preset::FearAndAggression => "fear-and-aggression",
            Preset::LoveAndExploration => "love-and-exploration",
            Preset::Multisensorial => "multisensorial",
            Preset::Zones => "zones",
            Preset::RangeSensing => "range-sensing",
            Preset::Values => "values",
            Preset::Comparison => "comparison",
        }
    }

    pub fn config(&self) -> Result<SceneConfig, ConfigError> {
        match self {
            Preset::FearAndAggression => fear_and_aggression(),
            Preset::LoveAndExploration => love_and_exploration(),
            Preset::Multisensorial => multisensorial(),
            Preset::Zones => zones(),
            Preset::RangeSensing => range_sensing(),
            Preset::Values => values(),
            Preset::Comparison => comparison(),
        }
    }

    pub fn scene(&self) -> Result<Scene, ConfigError> {
        Scene::new(self.config()?)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::iter()
            .find(|p| p.name() == s)
            .copied()
            .ok_or_else(|| PresetError::Unknown(s.to_string()))
    }
}

fn pose(x: f64, y: f64, heading: f64) -> Pose {
    Pose::new(Position::new(x, y), Angle::new(heading))
}

fn light_sources() -> Vec<Source> {
    vec![
        Source::new(Position::new(200.0, 150.0), SourceType::Light),
        Source::new(Position::new(600.0, 450.0), SourceType::Light),
    ]
}

/// Body shared by the vehicles of the second and third chapter.
struct Body {
    radius: f64,
    sensor_distance: f64,
    sensor_spread: f64,
    wheelbase: f64,
    min_distance: f64,
}

impl Body {
    const SMALL: Body = Body {
        radius: 20.0,
        sensor_distance: 30.0,
        sensor_spread: 0.5,
        wheelbase: 40.0,
        min_distance: 0.1,
    };

    const MEDIUM: Body = Body {
        radius: 25.0,
        sensor_distance: 37.5,
        sensor_spread: 0.7,
        wheelbase: 37.5,
        min_distance: 0.5,
    };

    const COMPACT: Body = Body {
        radius: 22.0,
        sensor_distance: 30.8,
        sensor_spread: 0.6,
        wheelbase: 33.0,
        min_distance: 1.0,
    };

    fn vehicle(
        &self,
        label: &str,
        base_speed: f64,
        channels: Vec<Channel>,
        limits: MotorLimits,
    ) -> Result<VehicleConfig, ConfigError> {
        Ok(VehicleConfig {
            label: label.to_string(),
            body_radius: self.radius,
            sensors: SensorArray::new(vec![SensorPair::symmetric(
                self.sensor_distance,
                self.sensor_spread,
            )])?,
            wiring: WiringTopology::new(base_speed, channels, limits),
            drive: DriveIntegrator::new(self.wheelbase)?,
            min_distance: self.min_distance,
        })
    }
}

fn fear_and_aggression() -> Result<SceneConfig, ConfigError> {
    let law = ResponseLaw::inverse_distance(50.0, 1000.0);
    let vehicle = |label: &str, crossing: Crossing| {
        let channel = Channel::new(Some(SourceType::Light), Sign::Excitatory, crossing, law, 0.01);
        Body::SMALL.vehicle(label, 0.0, vec![channel], MotorLimits::floor(0.0))
    };

    Ok(SceneConfig {
        bounds: Bounds::new(800.0, 600.0),
        tick_rate: TICK_RATE,
        palette: vec![SourceType::Light],
        zones: vec![],
        variants: vec![Variant::new(
            "2abc",
            vec![
                Spawn::new(pose(200.0, 200.0, 0.0), vehicle("2a fear", Crossing::Uncrossed)?),
                Spawn::new(
                    pose(200.0, 300.0, 0.5 * PI),
                    vehicle("2b aggression", Crossing::Crossed)?,
                ),
                Spawn::new(pose(200.0, 400.0, PI), vehicle("2c drive", Crossing::Bilateral)?),
            ],
        )],
        initial_sources: light_sources(),
    })
}

fn love_and_exploration() -> Result<SceneConfig, ConfigError> {
    let law = ResponseLaw::inverse_distance(50.0, 1000.0);
    let vehicle = |label: &str, crossing: Crossing| {
        let channel = Channel::new(Some(SourceType::Light), Sign::Inhibitory, crossing, law, 0.01);
        Body::SMALL.vehicle(label, 2.0, vec![channel], MotorLimits::floor(0.1))
    };

    Ok(SceneConfig {
        bounds: Bounds::new(800.0, 600.0),
        tick_rate: TICK_RATE,
        palette: vec![SourceType::Light],
        zones: vec![],
        variants: vec![Variant::new(
            "3ab",
            vec![
                Spawn::new(pose(200.0, 200.0, 0.0), vehicle("3a love", Crossing::Uncrossed)?),
                Spawn::new(
                    pose(200.0, 400.0, 0.5 * PI),
                    vehicle("3b explorer", Crossing::Crossed)?,
                ),
            ],
        )],
        initial_sources: light_sources(),
    })
}

/// Channels of the third-chapter vehicle with four senses.
fn values_channels(law: ResponseLaw, warmth: f64, aversion: f64) -> Vec<Channel> {
    vec![
        Channel::new(
            Some(SourceType::Temperature),
            Sign::Excitatory,
            Crossing::Uncrossed,
            law,
            warmth,
        ),
        Channel::new(Some(SourceType::Light), Sign::Excitatory, Crossing::Crossed, law, warmth),
        Channel::new(
            Some(SourceType::Organic),
            Sign::Inhibitory,
            Crossing::Uncrossed,
            law,
            aversion,
        ),
        Channel::new(Some(SourceType::Oxygen), Sign::Inhibitory, Crossing::Crossed, law, aversion),
    ]
}

fn multisensorial() -> Result<SceneConfig, ConfigError> {
    let law = ResponseLaw::inverse_square(50000.0);
    let any = |crossing: Crossing| Channel::new(None, Sign::Inhibitory, crossing, law, 0.12);
    let body = Body::MEDIUM;
    let limits = MotorLimits::floor(0.0);

    Ok(SceneConfig {
        bounds: Bounds::new(800.0, 600.0),
        tick_rate: TICK_RATE,
        palette: vec![
            SourceType::Temperature,
            SourceType::Light,
            SourceType::Organic,
            SourceType::Oxygen,
        ],
        zones: vec![],
        variants: vec![Variant::new(
            "3abc",
            vec![
                Spawn::new(
                    pose(200.0, 300.0, 0.0),
                    body.vehicle("3a love", 2.0, vec![any(Crossing::Uncrossed)], limits)?,
                ),
                Spawn::new(
                    pose(400.0, 300.0, 0.0),
                    body.vehicle("3b explorer", 2.0, vec![any(Crossing::Crossed)], limits)?,
                ),
                Spawn::new(
                    pose(600.0, 300.0, 0.0),
                    body.vehicle("3c values", 1.5, values_channels(law, 0.1, 0.15), limits)?,
                ),
            ],
        )],
        initial_sources: vec![],
    })
}

fn zones() -> Result<SceneConfig, ConfigError> {
    let law = ResponseLaw::inverse_square(40000.0);
    let generic = |crossing: Crossing| {
        Channel::new(Some(SourceType::Generic), Sign::Inhibitory, crossing, law, 0.12)
    };
    let body = Body::COMPACT;
    let limits = MotorLimits::floor(0.0);

    Ok(SceneConfig {
        bounds: Bounds::new(1000.0, 700.0),
        tick_rate: TICK_RATE,
        palette: vec![
            SourceType::Generic,
            SourceType::Temperature,
            SourceType::Light,
            SourceType::Oxygen,
            SourceType::Organic,
        ],
        zones: vec![
            Zone::new("3a love", 0.0..333.0).with_placement(SourceType::Generic),
            Zone::new("3b explorer", 333.0..666.0).with_placement(SourceType::Generic),
            Zone::new("3c values", 666.0..1000.0),
        ],
        variants: vec![Variant::new(
            "3abc",
            vec![
                Spawn::new(
                    pose(166.0, 350.0, 0.0),
                    body.vehicle("3a love", 1.8, vec![generic(Crossing::Uncrossed)], limits)?,
                )
                .in_zone(0),
                Spawn::new(
                    pose(499.0, 350.0, 0.0),
                    body.vehicle("3b explorer", 1.8, vec![generic(Crossing::Crossed)], limits)?,
                )
                .in_zone(1),
                Spawn::new(
                    pose(832.0, 350.0, 0.0),
                    body.vehicle("3c values", 1.8, values_channels(law, 0.08, 0.12), limits)?,
                )
                .in_zone(2),
            ],
        )],
        initial_sources: vec![],
    })
}

fn range_sensing() -> Result<SceneConfig, ConfigError> {
    let channel = |source_type, sign, crossing, range, curve, gain| {
        Channel::new(Some(source_type), sign, crossing, ResponseLaw::range(range, curve), gain)
    };
    let body = Body {
        radius: 25.0,
        sensor_distance: 34.0,
        sensor_spread: 0.85,
        wheelbase: 40.0,
        min_distance: 0.5,
    };
    let channels = vec![
        channel(SourceType::Light, Sign::Excitatory, Crossing::Crossed, 260.0, 1.0, 3.1),
        channel(SourceType::Temperature, Sign::Excitatory, Crossing::Uncrossed, 220.0, 1.0, 2.4),
        channel(SourceType::Oxygen, Sign::Inhibitory, Crossing::Crossed, 280.0, 1.8, 1.4),
        channel(SourceType::Organic, Sign::Inhibitory, Crossing::Uncrossed, 150.0, 2.2, 2.6),
    ];

    Ok(SceneConfig {
        bounds: Bounds::new(800.0, 600.0),
        tick_rate: TICK_RATE,
        palette: vec![
            SourceType::Light,
            SourceType::Temperature,
            SourceType::Oxygen,
            SourceType::Organic,
        ],
        zones: vec![],
        variants: vec![Variant::new(
            "3c",
            vec![Spawn::new(
                pose(400.0, 300.0, 0.0),
                body.vehicle("3c range", 1.4, channels, MotorLimits::between(0.05, 6.0))?,
            )],
        )],
        initial_sources: vec![],
    })
}

fn values() -> Result<SceneConfig, ConfigError> {
    let law = ResponseLaw::inverse_square(50000.0);
    let body = Body {
        min_distance: 1.0,
        ..Body::MEDIUM
    };
    let senses = [
        (SourceType::Light, Crossing::Crossed),
        (SourceType::Sound, Crossing::Uncrossed),
        (SourceType::Smell, Crossing::Crossed),
        (SourceType::Heat, Crossing::Uncrossed),
    ];

    let bells = [(150.0, 100.0), (200.0, 120.0), (100.0, 80.0), (80.0, 60.0)];
    let bell_channels = senses
        .iter()
        .zip(bells)
        .map(|(&(source_type, crossing), (optimal, sigma))| {
            let law = law.with_activation(Activation::BellCurve { optimal, sigma });
            Channel::new(Some(source_type), Sign::Excitatory, crossing, law, 2.0)
                .quiescent_below(0.1)
        })
        .collect();

    let steps = [
        (50.0, 1.5, 0.015),
        (80.0, 1.2, 0.012),
        (40.0, 1.0, 0.010),
        (60.0, 1.8, 0.020),
    ];
    let threshold_channels = senses
        .iter()
        .zip(steps)
        .map(|(&(source_type, crossing), (threshold, min_activation, slope))| {
            let activation = Activation::Threshold {
                threshold,
                min_activation,
                slope,
            };
            Channel::new(
                Some(source_type),
                Sign::Excitatory,
                crossing,
                law.with_activation(activation),
                1.0,
            )
        })
        .collect();

    let limits = MotorLimits::floor(0.0);
    Ok(SceneConfig {
        bounds: Bounds::new(800.0, 600.0),
        tick_rate: TICK_RATE,
        palette: vec![
            SourceType::Light,
            SourceType::Sound,
            SourceType::Smell,
            SourceType::Heat,
        ],
        zones: vec![],
        variants: vec![
            Variant::new(
                "4a",
                vec![Spawn::new(
                    pose(400.0, 300.0, 0.0),
                    body.vehicle("4a bell curve", 1.0, bell_channels, limits)?,
                )],
            ),
            Variant::new(
                "4b",
                vec![Spawn::new(
                    pose(400.0, 300.0, 0.0),
                    body.vehicle("4b threshold", 0.8, threshold_channels, limits)?,
                )],
            ),
        ],
        initial_sources: vec![],
    })
}

fn comparison() -> Result<SceneConfig, ConfigError> {
    let law = ResponseLaw::inverse_square(40000.0);
    let vehicle = |label: &str, activation: Activation| {
        let channel = Channel::new(
            Some(SourceType::Light),
            Sign::Excitatory,
            Crossing::Crossed,
            law.with_activation(activation),
            2.5,
        );
        Body::COMPACT.vehicle(label, 1.2, vec![channel], MotorLimits::floor(0.0))
    };

    Ok(SceneConfig {
        bounds: Bounds::new(1200.0, 700.0),
        tick_rate: TICK_RATE,
        palette: vec![SourceType::Light],
        zones: vec![
            Zone::new("bell curve", 0.0..600.0),
            Zone::new("saturating linear", 600.0..1200.0),
        ],
        variants: vec![Variant::new(
            "4",
            vec![
                Spawn::new(
                    pose(200.0, 300.0, 0.5),
                    vehicle(
                        "bell curve",
                        Activation::BellCurve {
                            optimal: 120.0,
                            sigma: 80.0,
                        },
                    )?,
                )
                .in_zone(0),
                Spawn::new(
                    pose(800.0, 300.0, 0.5),
                    vehicle(
                        "saturating linear",
                        Activation::Saturating {
                            slope: 0.02,
                            cap: 1.0,
                        },
                    )?,
                )
                .in_zone(1),
            ],
        )],
        initial_sources: vec![
            Source::new(Position::new(300.0, 450.0), SourceType::Light),
            Source::new(Position::new(900.0, 450.0), SourceType::Light),
        ],
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::tests::trajectories;

    #[test]
    fn test_every_preset_builds_a_valid_scene() {
        for preset in Preset::iter() {
            let scene = preset.scene();
            assert!(scene.is_ok(), "{preset}: {scene:?}");
        }
    }

    #[test]
    fn test_preset_names_round_trip() {
        for preset in Preset::iter() {
            assert_eq!(preset.name().parse::<Preset>(), Ok(*preset));
        }
    }

    #[test]
    fn test_unknown_preset() {
        assert_eq!(
            "vehicle-99".parse::<Preset>(),
            Err(PresetError::Unknown("vehicle-99".to_string()))
        );
    }

    #[test]
    fn test_default_preset() {
        assert_eq!(Preset::default().name(), "multisensorial");
    }

    #[rstest]
    #[case(Preset::FearAndAggression, 3, &["2abc"])]
    #[case(Preset::LoveAndExploration, 2, &["3ab"])]
    #[case(Preset::Multisensorial, 3, &["3abc"])]
    #[case(Preset::Zones, 3, &["3abc"])]
    #[case(Preset::RangeSensing, 1, &["3c"])]
    #[case(Preset::Values, 1, &["4a", "4b"])]
    #[case(Preset::Comparison, 2, &["4"])]
    fn test_preset_layout(
        #[case] preset: Preset,
        #[case] vehicles: usize,
        #[case] variants: &[&str],
    ) {
        let scene = preset.scene().unwrap();
        assert_eq!(scene.vehicles().count(), vehicles);
        assert_eq!(scene.variant_ids().collect::<Vec<_>>(), variants);
        for vehicle in scene.vehicles() {
            assert!(scene.bounds().contains(vehicle.pose().position()));
        }
    }

    #[test]
    fn test_vehicles_stay_inside_the_domain() {
        for preset in Preset::iter() {
            let mut scene = preset.scene().unwrap();
            let bounds = scene.bounds();
            for positions in trajectories(&mut scene, 600) {
                assert!(positions.iter().all(|p| bounds.contains(*p)), "{preset}");
            }
        }
    }

    #[test]
    fn test_runs_are_deterministic() {
        let run = || {
            let mut scene = Preset::Comparison.scene().unwrap();
            trajectories(&mut scene, 200)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_initial_lights_survive_reset() {
        let mut scene = Preset::FearAndAggression.scene().unwrap();
        scene
            .add_source(Position::new(10.0, 10.0), SourceType::Light)
            .unwrap();
        scene.tick();
        scene.reset();
        assert_eq!(scene.sources(), light_sources().as_slice());
    }

    #[test]
    fn test_quiet_senses_leave_base_speed() {
        let mut scene = Preset::Values.scene().unwrap();
        scene.tick();
        let vehicle = scene.vehicles().next().unwrap();
        assert_eq!(vehicle.motors().left, 1.0);
        assert_eq!(vehicle.motors().right, 1.0);
    }

    #[test]
    fn test_zone_placement_types() {
        let mut scene = Preset::Zones.scene().unwrap();
        scene.set_current_source_type(SourceType::Light).unwrap();
        assert_eq!(
            scene.place_source(Position::new(100.0, 100.0)),
            Ok(SourceType::Generic)
        );
        assert_eq!(
            scene.place_source(Position::new(900.0, 100.0)),
            Ok(SourceType::Light)
        );
    }

    #[test]
    fn test_vehicle_summary() {
        let scene = Preset::Multisensorial.scene().unwrap();
        let summary = scene
            .vehicles()
            .map(|v| {
                let channels = v
                    .config()
                    .wiring
                    .channels
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                format!("{}: {}", v.label(), channels)
            })
            .collect::<Vec<_>>()
            .join("\n");
        insta::assert_snapshot!(summary, @r"
        3a love: any source: love x0.12 (50000/d^2 -> linear)
        3b explorer: any source: explorer x0.12 (50000/d^2 -> linear)
        3c values: Temperature: fear x0.1 (50000/d^2 -> linear); Light: aggression x0.1 (50000/d^2 -> linear); Organic: love x0.15 (50000/d^2 -> linear); Oxygen: explorer x0.15 (50000/d^2 -> linear)
        ");
    }
}
