use serde::Serialize;
use serde_json::Value;

use crate::{
    bootstrap::UNSUPPORTED_NOTICE,
    config::MapConfig,
    layers::{LayerConfigBuilder, LayerError, LayerSet},
    ramp::Ramp,
};

#[derive(Debug, Clone, Serialize)]
pub struct SourceEntry {
    pub id: String,
    pub source: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

/// Everything the browser page needs to draw the map.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewDocument {
    pub name: String,
    pub style_url: String,
    pub center: [f64; 2],
    pub zoom: f64,
    pub sources: Vec<SourceEntry>,
    pub layers: Vec<Value>,
    pub legend: Vec<LegendEntry>,
    pub unsupported_notice: &'static str,
}

impl PreviewDocument {
    pub fn from_config(config: &MapConfig) -> Result<Self, LayerError> {
        let set = LayerConfigBuilder::new(config).build()?;
        let ramp = config.ramp()?;
        Ok(Self::assemble(config, &set, &ramp))
    }

    pub fn assemble(config: &MapConfig, set: &LayerSet, ramp: &Ramp) -> Self {
        Self {
            name: config.name.clone(),
            style_url: config.style_url(),
            center: config.center,
            zoom: config.initial_zoom,
            sources: set
                .sources
                .iter()
                .map(|source| SourceEntry {
                    id: source.name.clone(),
                    source: source.to_style_source(),
                })
                .collect(),
            layers: set.layers.iter().map(|layer| layer.to_style_layer()).collect(),
            legend: legend(ramp),
            unsupported_notice: UNSUPPORTED_NOTICE,
        }
    }
}

pub fn legend(ramp: &Ramp) -> Vec<LegendEntry> {
    let stops = ramp.stops();
    let mut entries: Vec<LegendEntry> = stops
        .iter()
        .enumerate()
        .map(|(index, stop)| {
            let label = match stops.get(index + 1) {
                Some(next) if next.year - 1 > stop.year => {
                    format!("{}\u{2013}{}", stop.year, next.year - 1)
                }
                Some(_) => stop.year.to_string(),
                None => format!("{}+", stop.year),
            };
            LegendEntry {
                label,
                color: stop.color.clone(),
            }
        })
        .collect();
    entries.push(LegendEntry {
        label: "Unknown".to_string(),
        color: ramp.unknown().color.clone(),
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legend_labels_cover_each_bucket() {
        let ramp = Ramp::columbus("gray").unwrap();
        let labels: Vec<String> = legend(&ramp).into_iter().map(|e| e.label).collect();
        assert_eq!(
            labels,
            vec!["1800\u{2013}1924", "1925\u{2013}2018", "2019+", "Unknown"]
        );
    }
}
