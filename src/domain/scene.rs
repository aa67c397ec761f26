//! The scene owns the stimulus field and the vehicles, and drives the ticks.
//!
//! Mutations requested between ticks are buffered and applied at the start of the next tick, so
//! every vehicle evaluates a tick against the same set of sources.

use tracing::{debug, info, trace};

use super::{
    Bounds, ConfigError, Pose, Position, Source, SourceType, StimulusField, Vehicle,
    VehicleConfig, Zone,
};

/// A vehicle to place when a variant becomes active.
#[derive(Clone, Debug, PartialEq)]
pub struct Spawn {
    pub pose: Pose,
    pub config: VehicleConfig,
    /// Zone whose sources the vehicle perceives. `None` perceives the whole field.
    pub zone: Option<usize>,
}

impl Spawn {
    pub fn new(pose: Pose, config: VehicleConfig) -> Self {
        Self {
            pose,
            config,
            zone: None,
        }
    }

    pub fn in_zone(self, zone: usize) -> Self {
        Self {
            zone: Some(zone),
            ..self
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Variant {
    pub id: String,
    pub spawns: Vec<Spawn>,
}

impl Variant {
    pub fn new(id: impl Into<String>, spawns: Vec<Spawn>) -> Self {
        Self {
            id: id.into(),
            spawns,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub bounds: Bounds,
    pub tick_rate: f64,
    pub palette: Vec<SourceType>,
    pub zones: Vec<Zone>,
    pub variants: Vec<Variant>,
    pub initial_sources: Vec<Source>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    vehicle: Vehicle,
    zone: Option<usize>,
}

impl Agent {
    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }
}

#[derive(Clone, Debug, PartialEq)]
struct VariantState {
    id: String,
    agents: Vec<Agent>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    bounds: Bounds,
    tick_rate: f64,
    field: StimulusField,
    pending: Vec<Source>,
    initial_sources: Vec<Source>,
    zones: Vec<Zone>,
    variants: Vec<VariantState>,
    active: usize,
    current_source_type: SourceType,
    ticks: u64,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Result<Self, ConfigError> {
        let SceneConfig {
            bounds,
            tick_rate,
            palette,
            zones,
            variants,
            initial_sources,
        } = config;

        let (width, height) = (bounds.width(), bounds.height());
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidBounds { width, height });
        }
        if !tick_rate.is_finite() || tick_rate <= 0.0 {
            return Err(ConfigError::InvalidTickRate(tick_rate));
        }

        let field = StimulusField::new(palette)?;
        let current_source_type = field.palette()[0];
        let check_type = |source_type: SourceType| {
            if field.accepts(source_type) {
                Ok(())
            } else {
                Err(ConfigError::UnknownSourceType(source_type))
            }
        };
        for zone in &zones {
            let (start, end) = (zone.x_range.start, zone.x_range.end);
            let inside = start.is_finite() && end.is_finite() && 0.0 <= start && end <= width;
            if !inside || start >= end {
                return Err(ConfigError::InvalidZone {
                    label: zone.label.clone(),
                    start,
                    end,
                });
            }
            if let Some(source_type) = zone.placement {
                check_type(source_type)?;
            }
        }
        for source in &initial_sources {
            check_type(source.source_type())?;
        }

        if variants.is_empty() {
            return Err(ConfigError::NoVariants);
        }
        let mut states: Vec<VariantState> = Vec::with_capacity(variants.len());
        for variant in variants {
            if states.iter().any(|s| s.id == variant.id) {
                return Err(ConfigError::DuplicateVariant(variant.id));
            }
            let agents = variant
                .spawns
                .into_iter()
                .map(|spawn| {
                    let position = spawn.pose.position();
                    let heading = f64::from(spawn.pose.heading());
                    if !heading.is_finite() || !bounds.contains(position) {
                        return Err(ConfigError::InvalidPose {
                            x: position.x(),
                            y: position.y(),
                            heading,
                        });
                    }
                    if let Some(index) = spawn.zone.filter(|&i| i >= zones.len()) {
                        return Err(ConfigError::UnknownZone {
                            index,
                            available: zones.len(),
                        });
                    }
                    Ok(Agent {
                        vehicle: Vehicle::new(spawn.pose, spawn.config, field.palette())?,
                        zone: spawn.zone,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            states.push(VariantState {
                id: variant.id,
                agents,
            });
        }

        let mut scene = Self {
            bounds,
            tick_rate,
            field,
            pending: vec![],
            initial_sources,
            zones,
            variants: states,
            active: 0,
            current_source_type,
            ticks: 0,
        };
        scene.reset();

        info!(
            variants = scene.variants.len(),
            zones = scene.zones.len(),
            width,
            height,
            tick_rate,
            "scene created"
        );

        Ok(scene)
    }

    /// Buffers a source. It enters the field at the start of the next tick.
    pub fn add_source(
        &mut self,
        position: Position,
        source_type: SourceType,
    ) -> Result<(), ConfigError> {
        if !self.field.accepts(source_type) {
            return Err(ConfigError::UnknownSourceType(source_type));
        }
        debug!(x = position.x(), y = position.y(), %source_type, "source added");
        self.pending.push(Source::new(position, source_type));
        Ok(())
    }

    /// Adds a source of the current type, or of the fixed type of the zone the position lies in.
    pub fn place_source(&mut self, position: Position) -> Result<SourceType, ConfigError> {
        let source_type = self
            .zones
            .iter()
            .find(|z| z.contains(position))
            .and_then(|z| z.placement)
            .unwrap_or(self.current_source_type);
        self.add_source(position, source_type)?;
        Ok(source_type)
    }

    pub fn set_current_source_type(&mut self, source_type: SourceType) -> Result<(), ConfigError> {
        if !self.field.accepts(source_type) {
            return Err(ConfigError::UnknownSourceType(source_type));
        }
        self.current_source_type = source_type;
        Ok(())
    }

    /// Activates a variant and puts its vehicles back on their initial poses.
    pub fn select_variant(&mut self, id: &str) -> Result<(), ConfigError> {
        let index = self
            .variants
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| ConfigError::UnknownVariant(id.to_string()))?;
        self.active = index;
        self.reset_vehicles();
        info!(variant = id, "variant selected");
        Ok(())
    }

    /// Clears all sources, seeds the initial ones again and restores the vehicles.
    pub fn reset(&mut self) {
        self.clear_sources();
        self.field.commit(self.initial_sources.iter().copied());
        self.reset_vehicles();
        self.ticks = 0;
        debug!(sources = self.field.sources().len(), "scene reset");
    }

    /// Removes every source, including those not yet committed.
    pub fn clear_sources(&mut self) {
        self.pending.clear();
        self.field.reset();
    }

    pub fn reset_vehicles(&mut self) {
        for agent in &mut self.variants[self.active].agents {
            agent.vehicle.reset();
        }
    }

    /// Commits buffered sources, then updates the active vehicles in order.
    pub fn tick(&mut self) {
        self.field.commit(self.pending.drain(..));

        let field = &self.field;
        let zones = &self.zones;
        for agent in &mut self.variants[self.active].agents {
            let view = field.view(agent.zone.and_then(|i| zones.get(i)));
            agent.vehicle.update(&view, self.bounds);
        }

        self.ticks += 1;
        trace!(tick = self.ticks, sources = field.sources().len(), "tick");
    }

    pub fn sources(&self) -> &[Source] {
        self.field.sources()
    }

    pub fn pending_sources(&self) -> &[Source] {
        &self.pending
    }

    pub fn agents(&self) -> &[Agent] {
        &self.variants[self.active].agents
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.agents().iter().map(Agent::vehicle)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn tick_rate(&self) -> f64 {
        self.tick_rate
    }

    pub fn palette(&self) -> &[SourceType] {
        self.field.palette()
    }

    pub fn current_source_type(&self) -> SourceType {
        self.current_source_type
    }

    pub fn active_variant(&self) -> &str {
        &self.variants[self.active].id
    }

    pub fn variant_ids(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|v| v.id.as_str())
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }
}
