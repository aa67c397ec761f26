//! The resource module encapsulates domain entities for use with Bevy.

use std::ops::{Deref, DerefMut};

use bevy::ecs::system::Resource;

use crate::{domain, preset::Preset};

#[derive(Resource)]
pub struct SceneRes(domain::Scene);

impl Deref for SceneRes {
    type Target = domain::Scene;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SceneRes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<domain::Scene> for SceneRes {
    fn from(value: domain::Scene) -> Self {
        Self(value)
    }
}

/// Preset the scene was built from.
#[derive(Resource, Clone, Copy, Debug)]
pub struct PresetRes(pub Preset);
