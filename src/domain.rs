//! The domain module holds the sensorimotor engine: the stimulus field, response laws, sensors,
//! wiring, drive kinematics, vehicles and the scene that ticks them.
//!
//! By minimizing hard dependencies, this module ensures the engine remains independent of how
//! it is rendered or controlled.

mod basis;
mod drive;
mod error;
mod field;
mod response;
mod scene;
mod sensor;
mod vehicle;
mod wiring;

pub use basis::{Angle, Bounds, Position};
pub use drive::{DriveIntegrator, Pose};
pub use error::ConfigError;
pub use field::{FieldView, Source, SourceType, StimulusField, Zone};
pub use response::{Activation, ResponseLaw};
pub use scene::{Scene, SceneConfig, Spawn, Variant};
pub use sensor::{Reading, SensorArray, SensorPair};
pub use vehicle::{Vehicle, VehicleConfig};
pub use wiring::{Channel, Crossing, MotorLimits, MotorPair, Sign, WiringTopology};
