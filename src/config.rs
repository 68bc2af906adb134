use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    layers::{UndatedMode, ZoomRange},
    ramp::{Ramp, RampError, UnknownYear, YearColorStop},
    year::UNKNOWN_YEAR,
};

fn default_server_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_dataset() -> String {
    "buildings".to_string()
}

fn default_stops() -> Vec<YearColorStop> {
    vec![
        YearColorStop::new(1800, "#e41a1c"),
        YearColorStop::new(1925, "#4daf4a"),
        YearColorStop::new(2019, "#377eb8"),
    ]
}

fn default_center() -> [f64; 2] {
    [-82.9988, 39.9612]
}

fn default_initial_zoom() -> f64 {
    12.0
}

fn default_outline_color() -> String {
    "#333333".to_string()
}

fn default_outline_width() -> f64 {
    1.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub name: String,
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_dataset")]
    pub dataset: String,
    #[serde(default = "default_dataset")]
    pub source_layer: String,
    #[serde(default)]
    pub zoom: ZoomRange,
    pub unknown: UnknownYear,
    #[serde(default = "default_stops")]
    pub stops: Vec<YearColorStop>,
    #[serde(default)]
    pub undated: UndatedMode,
    #[serde(default)]
    pub boundary: Option<BoundaryConfig>,
    #[serde(default = "default_center")]
    pub center: [f64; 2],
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: f64,
}

/// Outline of the administrative area drawn above the buildings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    pub name: String,
    pub dataset: String,
    pub source_layer: String,
    #[serde(default = "default_outline_color")]
    pub color: String,
    #[serde(default = "default_outline_width")]
    pub width: f64,
}

impl BoundaryConfig {
    pub fn columbus() -> Self {
        Self {
            name: "columbus".to_string(),
            dataset: "columbus".to_string(),
            source_layer: "columbus".to_string(),
            color: default_outline_color(),
            width: default_outline_width(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Ramp(#[from] RampError),
    #[error("zoom range {min}-{max} is invalid")]
    InvalidZoom { min: u8, max: u8 },
    #[error("server_url must not be empty")]
    MissingServer,
    #[error("boundary '{0}' collides with the building source name")]
    BoundaryCollision(String),
}

impl MapConfig {
    /// Light gray unknown bucket, zoom 11-15, one layer with a case expression.
    pub fn gray_revision() -> Self {
        Self {
            name: "columbus-gray".to_string(),
            server_url: default_server_url(),
            dataset: default_dataset(),
            source_layer: default_dataset(),
            zoom: ZoomRange::new(11, 15),
            unknown: UnknownYear::new(UNKNOWN_YEAR, "gray"),
            stops: default_stops(),
            undated: UndatedMode::Merged,
            boundary: Some(BoundaryConfig::columbus()),
            center: default_center(),
            initial_zoom: default_initial_zoom(),
        }
    }

    /// Black unknown bucket, zoom 12-18, undated buildings on their own layer.
    pub fn black_revision() -> Self {
        Self {
            name: "columbus-black".to_string(),
            zoom: ZoomRange::new(12, 18),
            unknown: UnknownYear::new(UNKNOWN_YEAR, "black"),
            undated: UndatedMode::Stacked,
            ..Self::gray_revision()
        }
    }

    pub fn ramp(&self) -> Result<Ramp, ConfigError> {
        Ok(Ramp::new(self.stops.clone(), self.unknown.clone())?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_url.trim().is_empty() {
            return Err(ConfigError::MissingServer);
        }
        if !self.zoom.is_valid() {
            return Err(ConfigError::InvalidZoom {
                min: self.zoom.min,
                max: self.zoom.max,
            });
        }
        if let Some(boundary) = &self.boundary {
            if boundary.name == self.dataset || boundary.dataset == self.dataset {
                return Err(ConfigError::BoundaryCollision(boundary.name.clone()));
            }
        }
        self.ramp()?;
        Ok(())
    }

    pub fn server_base(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }

    pub fn style_url(&self) -> String {
        format!("{}/styles/base/style.json", self.server_base())
    }

    pub fn tile_url(&self, dataset: &str) -> String {
        format!("{}/data/{}/{{z}}/{{x}}/{{y}}.pbf", self.server_base(), dataset)
    }
}

pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<MapConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read map config {}", path.display()))?;
        let config: MapConfig = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid map config {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revisions_differ_only_where_observed() {
        let gray = MapConfig::gray_revision();
        let black = MapConfig::black_revision();

        assert_eq!(gray.unknown.color, "gray");
        assert_eq!(black.unknown.color, "black");
        assert_eq!(gray.zoom, ZoomRange::new(11, 15));
        assert_eq!(black.zoom, ZoomRange::new(12, 18));
        assert_eq!(gray.stops, black.stops);
        assert!(gray.validate().is_ok());
        assert!(black.validate().is_ok());
    }

    #[test]
    fn urls_ignore_trailing_slash() {
        let mut config = MapConfig::gray_revision();
        config.server_url = "http://tiles.example:8080/".into();

        assert_eq!(
            config.style_url(),
            "http://tiles.example:8080/styles/base/style.json"
        );
        assert_eq!(
            config.tile_url("buildings"),
            "http://tiles.example:8080/data/buildings/{z}/{x}/{y}.pbf"
        );
    }
}
