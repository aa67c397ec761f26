//! Fixed-rate simulation of the scene.
//!
//! One tick per `FixedUpdate` step. The step length comes from the scene's tick rate, which is
//! installed as `Time<Fixed>` at start-up, so the simulation speed does not depend on the frame
//! rate.

use bevy::prelude::*;

use crate::resource::SceneRes;

pub struct Simulator;

impl Plugin for Simulator {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, simulate);
    }
}

fn simulate(mut scene: ResMut<SceneRes>) {
    scene.tick();
}
