//! 2D visualization.
//!
//! The scene is drawn with immediate-mode gizmos every frame. Only the vehicle labels and the
//! overlay text are entities. Domain coordinates have their origin in the top left corner with
//! y pointing down; Bevy's 2D world has its origin in the window center with y pointing up.

use bevy::prelude::*;

use crate::{
    domain::{Bounds, Position, Scene, SourceType, Vehicle},
    resource::{PresetRes, SceneRes},
};

pub struct Visualizer;

impl Plugin for Visualizer {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, set_up)
            .add_systems(
                Update,
                (
                    draw_zones,
                    draw_sources,
                    draw_vehicles,
                    update_labels,
                    update_text,
                    handle_keyboard_input,
                ),
            )
            .insert_resource(ClearColor(Color::rgb(0.08, 0.08, 0.1)))
            .init_resource::<View>();
    }
}

#[derive(Resource)]
pub struct View {
    show_text: bool,
}

impl Default for View {
    fn default() -> Self {
        Self { show_text: true }
    }
}

#[derive(Component)]
struct VehicleLabel(usize);

#[derive(Component)]
struct Overlay;

const SOURCE_RADIUS: f32 = 8.0;
const PENDING_ALPHA: f32 = 0.4;
const SENSOR_RADIUS: f32 = 4.0;
const MOTOR_SCALE: f32 = 6.0;
const MAX_MOTOR_LENGTH: f32 = 40.0;
const MAX_SENSOR_GLOW: f32 = 8.0;
const LABEL_OFFSET: f32 = 14.0;
const BODY_COLOR: Color = Color::rgb(0.85, 0.85, 0.9);
const SENSOR_COLOR: Color = Color::rgb(1.0, 0.85, 0.2);
const MOTOR_COLOR: Color = Color::rgb(0.3, 0.9, 0.4);
const ZONE_COLOR: Color = Color::rgba(1.0, 1.0, 1.0, 0.3);

fn set_up(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
    create_text(&mut commands);
}

fn create_text(commands: &mut Commands) {
    let text_style = TextStyle {
        font_size: 18.0,
        ..default()
    };
    commands.spawn((
        TextBundle::from_sections(vec![TextSection::new("", text_style)]).with_style(Style {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        }),
        Overlay,
    ));
}

fn source_color(source_type: SourceType) -> Color {
    match source_type {
        SourceType::Generic => Color::rgb(1.0, 1.0, 1.0),
        SourceType::Light => Color::rgb(1.0, 0.95, 0.4),
        SourceType::Temperature => Color::rgb(1.0, 0.45, 0.2),
        SourceType::Oxygen => Color::rgb(0.4, 0.7, 1.0),
        SourceType::Organic => Color::rgb(0.4, 0.85, 0.3),
        SourceType::Sound => Color::rgb(0.75, 0.5, 1.0),
        SourceType::Smell => Color::rgb(0.9, 0.6, 0.8),
        SourceType::Heat => Color::rgb(0.9, 0.15, 0.1),
    }
}

fn draw_zones(scene: Res<SceneRes>, mut gizmos: Gizmos) {
    let bounds = scene.bounds();
    for zone in scene.zones() {
        let x = zone.x_range.start;
        if x <= 0.0 {
            continue;
        }
        gizmos.line_2d(
            to_bevy_position(Position::new(x, 0.0), bounds),
            to_bevy_position(Position::new(x, bounds.height()), bounds),
            ZONE_COLOR,
        );
    }
}

fn draw_sources(scene: Res<SceneRes>, mut gizmos: Gizmos) {
    let bounds = scene.bounds();
    for (position, color) in source_markers(&scene) {
        let center = to_bevy_position(position, bounds);
        gizmos.circle_2d(center, SOURCE_RADIUS, color);
        gizmos.circle_2d(center, SOURCE_RADIUS / 2.0, color);
    }
}

/// Committed sources followed by the dimmed ones still waiting for the next tick.
fn source_markers(scene: &Scene) -> Vec<(Position, Color)> {
    let committed = scene.sources().iter().map(|s| (s, 1.0));
    let pending = scene.pending_sources().iter().map(|s| (s, PENDING_ALPHA));
    committed
        .chain(pending)
        .map(|(source, alpha)| {
            let color = source_color(source.source_type()).with_a(alpha);
            (source.position(), color)
        })
        .collect()
}

fn draw_vehicles(scene: Res<SceneRes>, mut gizmos: Gizmos) {
    let bounds = scene.bounds();
    for vehicle in scene.vehicles() {
        draw_vehicle(vehicle, bounds, &mut gizmos);
    }
}

fn draw_vehicle(vehicle: &Vehicle, bounds: Bounds, gizmos: &mut Gizmos) {
    let pose = vehicle.pose();
    let center = to_bevy_position(pose.position(), bounds);
    let radius = vehicle.config().body_radius as f32;
    let forward = to_bevy_direction(pose.heading().into());
    let left = to_bevy_left(forward);

    gizmos.circle_2d(center, radius, BODY_COLOR);
    gizmos.line_2d(center, center + forward * radius, BODY_COLOR);

    let activity = sensor_activity(vehicle);
    for (sensor, activation) in vehicle.sensor_positions().into_iter().zip(activity) {
        let sensor = to_bevy_position(sensor, bounds);
        let glow = (activation.ln_1p() as f32 * SENSOR_RADIUS).min(MAX_SENSOR_GLOW);
        gizmos.line_2d(center, sensor, SENSOR_COLOR.with_a(0.4));
        gizmos.circle_2d(sensor, SENSOR_RADIUS + glow, SENSOR_COLOR);
    }

    let motors = vehicle.motors();
    let half_axle = vehicle.config().drive.wheelbase() as f32 / 2.0;
    for (side, speed) in [(left, motors.left), (-left, motors.right)] {
        let wheel = center + side * half_axle;
        let length = (speed as f32 * MOTOR_SCALE).min(MAX_MOTOR_LENGTH);
        gizmos.line_2d(wheel, wheel - forward * length, MOTOR_COLOR);
    }
}

/// Summed activation magnitude per sensor, in the order of `Vehicle::sensor_positions`.
fn sensor_activity(vehicle: &Vehicle) -> Vec<f64> {
    let config = vehicle.config();
    let mut activity = vec![0.0; config.sensors.pairs().len() * 2];
    for (channel, reading) in config.wiring.channels.iter().zip(vehicle.readings()) {
        let index = channel.sensor_pair * 2;
        if let Some(left) = activity.get_mut(index) {
            *left += reading.activation.0.abs();
        }
        if let Some(right) = activity.get_mut(index + 1) {
            *right += reading.activation.1.abs();
        }
    }
    activity
}

fn update_labels(
    scene: Res<SceneRes>,
    mut commands: Commands,
    mut labels: Query<(Entity, &VehicleLabel, &mut Text, &mut Transform)>,
) {
    let bounds = scene.bounds();
    let vehicles = scene.vehicles().collect::<Vec<_>>();
    let mut labelled = vec![false; vehicles.len()];

    for (entity, label, mut text, mut transform) in &mut labels {
        let Some(vehicle) = vehicles.get(label.0) else {
            commands.entity(entity).despawn();
            continue;
        };
        labelled[label.0] = true;
        text.sections[0].value = label_text(vehicle);
        transform.translation = label_translation(vehicle, bounds);
    }

    for (index, vehicle) in vehicles.iter().enumerate() {
        if labelled[index] {
            continue;
        }
        commands.spawn((
            Text2dBundle {
                text: Text::from_section(
                    label_text(vehicle),
                    TextStyle {
                        font_size: 14.0,
                        color: BODY_COLOR,
                        ..default()
                    },
                ),
                transform: Transform::from_translation(label_translation(vehicle, bounds)),
                ..default()
            },
            VehicleLabel(index),
        ));
    }
}

fn label_text(vehicle: &Vehicle) -> String {
    let motors = vehicle.motors();
    let heading = vehicle.pose().heading().to_deg();
    format!(
        "{}  L {:.2} R {:.2}  {heading:.0} deg",
        vehicle.label(),
        motors.left,
        motors.right
    )
}

fn label_translation(vehicle: &Vehicle, bounds: Bounds) -> Vec3 {
    let center = to_bevy_position(vehicle.pose().position(), bounds);
    let offset = vehicle.config().body_radius as f32 + LABEL_OFFSET;
    Vec3::new(center.x, center.y + offset, 1.0)
}

fn update_text(
    mut text: Query<&mut Text, With<Overlay>>,
    view: Res<View>,
    scene: Res<SceneRes>,
    preset: Res<PresetRes>,
) {
    let Ok(mut text) = text.get_single_mut() else {
        return;
    };
    text.sections[0].value = if view.show_text {
        overlay_text(&scene, preset.0.name())
    } else {
        String::new()
    };
}

fn overlay_text(scene: &SceneRes, preset: &str) -> String {
    let palette = scene
        .palette()
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}:{t}", i + 1))
        .collect::<Vec<_>>()
        .join(" ");
    let mut text = format!(
        "{preset} / variant {}   tick {}   sources {}\n\
         placing {}   [{palette}]\n\
         click: place  R: reset  C: clear  Space: restart vehicles  V: variant  S: scatter  \
         T: text",
        scene.active_variant(),
        scene.tick_count(),
        scene.sources().len(),
        scene.current_source_type(),
    );
    if !scene.zones().is_empty() {
        let zones = scene
            .zones()
            .iter()
            .map(|z| match z.placement {
                Some(source_type) => format!("{} ({source_type} only)", z.label),
                None => z.label.clone(),
            })
            .collect::<Vec<_>>()
            .join(" | ");
        text.push_str(&format!("\nzones: {zones}"));
    }
    text
}

fn handle_keyboard_input(keys: Res<ButtonInput<KeyCode>>, mut view: ResMut<View>) {
    if keys.just_pressed(KeyCode::KeyT) {
        view.show_text = !view.show_text;
    }
}

/// Maps a window-centered Bevy world position to domain coordinates.
pub fn to_domain_position(position: Vec2, bounds: Bounds) -> Position {
    Position::new(
        position.x as f64 + bounds.width() / 2.0,
        bounds.height() / 2.0 - position.y as f64,
    )
}

pub fn to_bevy_position(position: Position, bounds: Bounds) -> Vec2 {
    Vec2::new(
        (position.x() - bounds.width() / 2.0) as f32,
        (bounds.height() / 2.0 - position.y()) as f32,
    )
}

fn to_bevy_direction(heading: f32) -> Vec2 {
    Vec2::new(heading.cos(), -heading.sin())
}

/// Perpendicular toward the vehicle's left side, where the sensors with a negative angle offset
/// sit.
fn to_bevy_left(forward: Vec2) -> Vec2 {
    forward.perp()
}
