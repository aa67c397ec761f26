//! Controller turning mouse and keyboard input into scene mutations.
//!
//! A left click places a source at the pointer. The keyboard resets the scene or parts of it,
//! selects the source type and the active variant, and scatters random sources. Every rejected
//! request is logged and otherwise ignored.

use bevy::prelude::*;
use rand::{
    distr::{uniform, Distribution, Uniform},
    Rng, SeedableRng,
};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::{
    domain::{Bounds, Position},
    resource::SceneRes,
    visualizer::to_domain_position,
};

const RNG_SEED: u64 = 19878367467712;
const SCATTER_COUNT: usize = 5;
const TYPE_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

pub struct Controller;

impl Plugin for Controller {
    fn build(&self, app: &mut App) {
        app.insert_resource(ScatterRng(ChaCha8Rng::seed_from_u64(RNG_SEED)))
            .add_systems(Update, (handle_pointer_input, handle_keyboard_input));
    }
}

#[derive(Resource)]
struct ScatterRng(ChaCha8Rng);

fn handle_pointer_input(
    buttons: Res<ButtonInput<MouseButton>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    windows: Query<&Window>,
    mut scene: ResMut<SceneRes>,
) {
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(position) = get_pointer_position(&cameras, &windows, scene.bounds()) else {
        return;
    };

    if let Err(error) = scene.place_source(position) {
        warn!(%error, "source rejected");
    }
}

fn get_pointer_position(
    cameras: &Query<(&Camera, &GlobalTransform)>,
    windows: &Query<&Window>,
    bounds: Bounds,
) -> Option<Position> {
    let (camera, camera_transform) = cameras.get_single().ok()?;
    let cursor_position = windows.get_single().ok()?.cursor_position()?;
    let world_position = camera.viewport_to_world_2d(camera_transform, cursor_position)?;
    let position = to_domain_position(world_position, bounds);
    bounds.contains(position).then_some(position)
}

fn handle_keyboard_input(
    keys: Res<ButtonInput<KeyCode>>,
    mut scene: ResMut<SceneRes>,
    mut rng: ResMut<ScatterRng>,
) {
    if keys.just_pressed(KeyCode::KeyR) {
        scene.reset();
        info!("scene reset");
    }

    if keys.just_pressed(KeyCode::KeyC) {
        scene.clear_sources();
        info!("sources cleared");
    }

    if keys.just_pressed(KeyCode::Space) {
        scene.reset_vehicles();
        info!("vehicles reset");
    }

    for (index, key) in TYPE_KEYS.iter().enumerate() {
        if !keys.just_pressed(*key) {
            continue;
        }
        match scene.palette().get(index).copied() {
            Some(source_type) => {
                if let Err(error) = scene.set_current_source_type(source_type) {
                    warn!(%error, "source type rejected");
                } else {
                    info!(%source_type, "source type selected");
                }
            }
            None => warn!(key = index + 1, "no source type on this key"),
        }
    }

    if keys.just_pressed(KeyCode::KeyV) {
        let next = next_variant(&scene);
        if let Err(error) = scene.select_variant(&next) {
            warn!(%error, "variant rejected");
        }
    }

    if keys.just_pressed(KeyCode::KeyS) {
        let source_type = scene.current_source_type();
        match scatter_positions(&mut rng.0, scene.bounds(), SCATTER_COUNT) {
            Ok(positions) => {
                for position in positions {
                    if let Err(error) = scene.add_source(position, source_type) {
                        warn!(%error, "source rejected");
                    }
                }
            }
            Err(error) => warn!(%error, "cannot scatter sources"),
        }
    }
}

/// Id of the variant after the active one, wrapping around.
fn next_variant(scene: &SceneRes) -> String {
    let ids = scene.variant_ids().collect::<Vec<_>>();
    let active = ids
        .iter()
        .position(|id| *id == scene.active_variant())
        .unwrap_or(0);
    ids[(active + 1) % ids.len()].to_string()
}

/// Uniformly distributed positions inside `bounds`.
pub fn scatter_positions(
    rng: &mut impl Rng,
    bounds: Bounds,
    count: usize,
) -> Result<Vec<Position>, uniform::Error> {
    let x = Uniform::try_from(0.0..bounds.width())?;
    let y = Uniform::try_from(0.0..bounds.height())?;
    Ok((0..count)
        .map(|_| Position::new(x.sample(rng), y.sample(rng)))
        .collect())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{preset::Preset, tests::positions_of};

    #[test]
    fn test_scatter_positions_inside_bounds() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut rng = ChaCha8Rng::seed_from_u64(RNG_SEED);
        let positions = scatter_positions(&mut rng, bounds, 100).unwrap();
        assert_eq!(positions.len(), 100);
        assert!(positions.iter().all(|p| bounds.contains(*p)));
    }

    #[test]
    fn test_scatter_positions_are_reproducible() {
        let bounds = Bounds::new(800.0, 600.0);
        let first = scatter_positions(&mut ChaCha8Rng::seed_from_u64(1), bounds, 5).unwrap();
        let second = scatter_positions(&mut ChaCha8Rng::seed_from_u64(1), bounds, 5).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_scatter_rejects_degenerate_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(RNG_SEED);
        assert!(scatter_positions(&mut rng, Bounds::new(0.0, 600.0), 1).is_err());
    }

    #[test]
    fn test_next_variant_wraps_around() {
        let mut scene = SceneRes::from(Preset::Values.scene().unwrap());
        assert_eq!(next_variant(&scene), "4b");
        scene.select_variant("4b").unwrap();
        assert_eq!(next_variant(&scene), "4a");
    }

    #[test]
    fn test_scattered_sources_enter_on_next_tick() {
        let mut scene = Preset::Multisensorial.scene().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(RNG_SEED);
        let positions = scatter_positions(&mut rng, scene.bounds(), SCATTER_COUNT).unwrap();
        for position in &positions {
            scene
                .add_source(*position, scene.current_source_type())
                .unwrap();
        }
        scene.tick();
        assert_eq!(positions_of(scene.sources()), positions);
    }
}
