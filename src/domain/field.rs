//! Point-like stimulus sources and the field that owns them.

use std::{fmt, ops::Range};

use super::{ConfigError, Position};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum SourceType {
    Generic,
    Light,
    Temperature,
    Oxygen,
    Organic,
    Sound,
    Smell,
    Heat,
}

impl SourceType {
    pub fn name(&self) -> &'static str {
        match self {
            SourceType::Generic => "Source",
            SourceType::Light => "Light",
            SourceType::Temperature => "Temperature",
            SourceType::Oxygen => "Oxygen",
            SourceType::Organic => "Organic",
            SourceType::Sound => "Sound",
            SourceType::Smell => "Smell",
            SourceType::Heat => "Heat",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Source {
    position: Position,
    source_type: SourceType,
}

impl Source {
    pub fn new(position: Position, source_type: SourceType) -> Self {
        Self {
            position,
            source_type,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    pub fn matches(&self, filter: Option<SourceType>) -> bool {
        filter.map_or(true, |source_type| source_type == self.source_type)
    }
}

/// Vertical strip of the domain. Vehicles assigned to a zone only perceive the sources inside
/// it; sources placed by pointer inside a zone may be forced to a fixed type.
#[derive(Clone, Debug, PartialEq)]
pub struct Zone {
    pub label: String,
    pub x_range: Range<f64>,
    pub placement: Option<SourceType>,
}

impl Zone {
    pub fn new(label: impl Into<String>, x_range: Range<f64>) -> Self {
        Self {
            label: label.into(),
            x_range,
            placement: None,
        }
    }

    pub fn with_placement(self, source_type: SourceType) -> Self {
        Self {
            placement: Some(source_type),
            ..self
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        self.x_range.contains(&position.x())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StimulusField {
    palette: Vec<SourceType>,
    sources: Vec<Source>,
}

impl StimulusField {
    pub fn new(palette: Vec<SourceType>) -> Result<Self, ConfigError> {
        if palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(Self {
            palette,
            sources: vec![],
        })
    }

    pub fn palette(&self) -> &[SourceType] {
        &self.palette
    }

    pub fn accepts(&self, source_type: SourceType) -> bool {
        self.palette.contains(&source_type)
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn add(&mut self, position: Position, source_type: SourceType) -> Result<(), ConfigError> {
        if !self.accepts(source_type) {
            return Err(ConfigError::UnknownSourceType(source_type));
        }
        self.sources.push(Source::new(position, source_type));
        Ok(())
    }

    /// Appends sources that were already checked against the palette.
    pub(super) fn commit(&mut self, sources: impl IntoIterator<Item = Source>) {
        self.sources.extend(sources);
    }

    /// Sources of the given type in insertion order, or every source without a filter.
    pub fn query(&self, filter: Option<SourceType>) -> impl Iterator<Item = &Source> + '_ {
        self.sources.iter().filter(move |s| s.matches(filter))
    }

    pub fn view<'a>(&'a self, zone: Option<&'a Zone>) -> FieldView<'a> {
        FieldView { field: self, zone }
    }

    pub fn reset(&mut self) {
        self.sources.clear();
    }
}

/// Read-only window onto a field, optionally restricted to one zone.
#[derive(Clone, Copy, Debug)]
pub struct FieldView<'a> {
    field: &'a StimulusField,
    zone: Option<&'a Zone>,
}

impl<'a> FieldView<'a> {
    pub fn query(&self, filter: Option<SourceType>) -> impl Iterator<Item = &'a Source> + 'a {
        let field: &'a StimulusField = self.field;
        let zone = self.zone;
        field
            .query(filter)
            .filter(move |s| zone.map_or(true, |z| z.contains(s.position())))
    }
}
