use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::{
    config::{ConfigError, MapConfig},
    ramp::Ramp,
    year::YEAR_ATTRIBUTE,
};

fn default_min_zoom() -> u8 {
    11
}

fn default_max_zoom() -> u8 {
    15
}

/// Highest zoom level the tile server will cut.
pub const MAX_ZOOM: u8 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomRange {
    #[serde(default = "default_min_zoom")]
    pub min: u8,
    #[serde(default = "default_max_zoom")]
    pub max: u8,
}

impl ZoomRange {
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max && self.max <= MAX_ZOOM
    }

    /// Style layers hide at `zoom >= maxzoom`, so the inclusive range ends one past `max`.
    pub fn layer_max(&self) -> u8 {
        self.max + 1
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self::new(default_min_zoom(), default_max_zoom())
    }
}

/// How features with an unknown construction year are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndatedMode {
    /// One layer; the paint expression special-cases the sentinel.
    #[default]
    Merged,
    /// A filtered undated layer stacked beneath the dated layer.
    Stacked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSource {
    pub name: String,
    pub tiles: Vec<String>,
    pub zoom: ZoomRange,
}

impl TileSource {
    pub fn to_style_source(&self) -> Value {
        json!({
            "type": "vector",
            "tiles": self.tiles,
            "minzoom": self.zoom.min,
            "maxzoom": self.zoom.max,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    YearEquals(i32),
    YearNotEquals(i32),
}

impl Filter {
    pub fn matches(&self, year: i32) -> bool {
        match *self {
            Filter::YearEquals(value) => year == value,
            Filter::YearNotEquals(value) => year != value,
        }
    }

    pub fn to_expression(&self) -> Value {
        let (op, value) = match *self {
            Filter::YearEquals(value) => ("==", value),
            Filter::YearNotEquals(value) => ("!=", value),
        };
        json!([op, ["get", YEAR_ATTRIBUTE], value])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// Full ramp including the unknown-year case.
    Ramp(Ramp),
    /// Ramp without the unknown-year case; the layer filter excludes the sentinel.
    DatedRamp(Ramp),
    Solid(String),
    Outline { color: String, width: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Fill,
    Line,
}

impl LayerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Fill => "fill",
            LayerKind::Line => "line",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub kind: LayerKind,
    pub source: String,
    pub source_layer: String,
    pub zoom: ZoomRange,
    pub filter: Option<Filter>,
    pub paint: Paint,
}

impl LayerSpec {
    pub fn to_style_layer(&self) -> Value {
        let mut layer = Map::new();
        layer.insert("id".into(), json!(self.id));
        layer.insert("type".into(), json!(self.kind.as_str()));
        layer.insert("source".into(), json!(self.source));
        layer.insert("source-layer".into(), json!(self.source_layer));
        layer.insert("minzoom".into(), json!(self.zoom.min));
        layer.insert("maxzoom".into(), json!(self.zoom.layer_max()));
        if let Some(filter) = &self.filter {
            layer.insert("filter".into(), filter.to_expression());
        }
        layer.insert("paint".into(), self.paint_properties());
        Value::Object(layer)
    }

    fn paint_properties(&self) -> Value {
        match &self.paint {
            Paint::Ramp(ramp) => json!({ "fill-color": ramp.step_expression() }),
            Paint::DatedRamp(ramp) => json!({ "fill-color": ramp.dated_expression() }),
            Paint::Solid(color) => json!({ "fill-color": color }),
            Paint::Outline { color, width } => json!({
                "line-color": color,
                "line-width": width,
            }),
        }
    }

    /// Whether this layer draws a feature with the given year. Layers on
    /// other sources never draw building features.
    fn treats(&self, source: &str, year: i32) -> bool {
        self.source == source && self.filter.map_or(true, |filter| filter.matches(year))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("layer '{layer}' references undeclared source '{source_name}'")]
    UnknownSource { layer: String, source_name: String },
    #[error("layer id '{0}' is used more than once")]
    DuplicateLayer(String),
    #[error("layer '{0}' has an invalid zoom range")]
    InvalidZoom(String),
    #[error("a building built in {year} receives {treatments} treatments")]
    Coverage { year: i32, treatments: usize },
}

/// Sources and layers in registration order.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSet {
    pub sources: Vec<TileSource>,
    pub layers: Vec<LayerSpec>,
    pub building_source: String,
    pub sentinel: i32,
}

impl LayerSet {
    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.id.as_str()).collect()
    }

    pub fn validate(&self) -> Result<(), LayerError> {
        let declared: BTreeSet<&str> = self.sources.iter().map(|s| s.name.as_str()).collect();
        let mut seen = BTreeSet::new();
        for layer in &self.layers {
            if !declared.contains(layer.source.as_str()) {
                return Err(LayerError::UnknownSource {
                    layer: layer.id.clone(),
                    source_name: layer.source.clone(),
                });
            }
            if !seen.insert(layer.id.as_str()) {
                return Err(LayerError::DuplicateLayer(layer.id.clone()));
            }
            if !layer.zoom.is_valid() {
                return Err(LayerError::InvalidZoom(layer.id.clone()));
            }
        }

        for year in self.probe_years() {
            let treatments = self
                .layers
                .iter()
                .filter(|layer| layer.treats(&self.building_source, year))
                .count();
            if treatments != 1 {
                return Err(LayerError::Coverage { year, treatments });
            }
        }
        Ok(())
    }

    /// Years where a filter could change its answer: the sentinel, every
    /// filter value and their neighbours.
    fn probe_years(&self) -> BTreeSet<i32> {
        let mut years = BTreeSet::from([self.sentinel]);
        for filter in self.layers.iter().filter_map(|layer| layer.filter) {
            let (Filter::YearEquals(value) | Filter::YearNotEquals(value)) = filter;
            years.insert(value);
        }
        years
            .iter()
            .flat_map(|&year| [year.saturating_sub(1), year, year.saturating_add(1)])
            .collect()
    }

    pub fn to_style_fragment(&self) -> Value {
        let sources: Map<String, Value> = self
            .sources
            .iter()
            .map(|source| (source.name.clone(), source.to_style_source()))
            .collect();
        let layers: Vec<Value> = self.layers.iter().map(LayerSpec::to_style_layer).collect();
        json!({ "sources": sources, "layers": layers })
    }
}

pub struct LayerConfigBuilder<'a> {
    config: &'a MapConfig,
}

impl<'a> LayerConfigBuilder<'a> {
    pub fn new(config: &'a MapConfig) -> Self {
        Self { config }
    }

    pub fn build(&self) -> Result<LayerSet, LayerError> {
        let config = self.config;
        config.validate()?;
        let ramp = config.ramp()?;

        let mut sources = vec![TileSource {
            name: config.dataset.clone(),
            tiles: vec![config.tile_url(&config.dataset)],
            zoom: config.zoom,
        }];
        let mut layers = Vec::new();

        match config.undated {
            UndatedMode::Merged => layers.push(self.building_layer(
                "buildings",
                None,
                Paint::Ramp(ramp.clone()),
            )),
            UndatedMode::Stacked => {
                let sentinel = ramp.unknown().sentinel;
                layers.push(self.building_layer(
                    "buildings-undated",
                    Some(Filter::YearEquals(sentinel)),
                    Paint::Solid(ramp.unknown().color.clone()),
                ));
                layers.push(self.building_layer(
                    "buildings",
                    Some(Filter::YearNotEquals(sentinel)),
                    Paint::DatedRamp(ramp.clone()),
                ));
            }
        }

        if let Some(boundary) = &config.boundary {
            sources.push(TileSource {
                name: boundary.name.clone(),
                tiles: vec![config.tile_url(&boundary.dataset)],
                zoom: config.zoom,
            });
            layers.push(LayerSpec {
                id: boundary.name.clone(),
                kind: LayerKind::Line,
                source: boundary.name.clone(),
                source_layer: boundary.source_layer.clone(),
                zoom: config.zoom,
                filter: None,
                paint: Paint::Outline {
                    color: boundary.color.clone(),
                    width: boundary.width,
                },
            });
        }

        let set = LayerSet {
            sources,
            layers,
            building_source: config.dataset.clone(),
            sentinel: ramp.unknown().sentinel,
        };
        set.validate()?;
        debug!(
            map = %config.name,
            sources = set.sources.len(),
            layers = ?set.layer_ids(),
            "built layer set"
        );
        Ok(set)
    }

    fn building_layer(&self, id: &str, filter: Option<Filter>, paint: Paint) -> LayerSpec {
        LayerSpec {
            id: id.to_string(),
            kind: LayerKind::Fill,
            source: self.config.dataset.clone(),
            source_layer: self.config.source_layer.clone(),
            zoom: self.config.zoom,
            filter,
            paint,
        }
    }
}
