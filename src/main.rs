use std::env;

use bevy::prelude::*;
use tracing::{error, info, warn};


mod controller;
mod domain;
mod preset;
mod resource;
mod simulator;
mod visualizer;

use preset::Preset;
use resource::{PresetRes, SceneRes};

fn main() {
    let requested = env::args().nth(1).map(|name| name.parse::<Preset>());
    let preset = match &requested {
        Some(Ok(preset)) => *preset,
        _ => Preset::default(),
    };
    let scene = preset.scene();
    let (width, height) = scene.as_ref().map_or((800.0, 600.0), |s| {
        (s.bounds().width() as f32, s.bounds().height() as f32)
    });

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: format!("Braitenberg vehicles: {preset}"),
            resolution: (width, height).into(),
            resizable: false,
            ..default()
        }),
        ..default()
    }));

    if let Some(Err(error)) = requested {
        warn!(%error, fallback = %preset, "falling back to the default preset");
    }
    let scene = match scene {
        Ok(scene) => scene,
        Err(error) => {
            error!(%error, %preset, "invalid scene configuration");
            return;
        }
    };
    info!(%preset, tick_rate = scene.tick_rate(), "starting simulation");

    app.insert_resource(Time::<Fixed>::from_hz(scene.tick_rate()))
        .insert_resource(SceneRes::from(scene))
        .insert_resource(PresetRes(preset))
        .add_plugins(controller::Controller)
        .add_plugins(visualizer::Visualizer)
        .add_plugins(simulator::Simulator)
        .run();
}
