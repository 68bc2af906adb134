pub mod bootstrap;
pub mod config;
pub mod layers;
pub mod preview;
pub mod ramp;
pub mod web;
pub mod year;

pub use bootstrap::{BootOutcome, Bootstrapper, MapEngine, RecordingEngine};
pub use config::{ConfigLoader, MapConfig};
pub use layers::{LayerConfigBuilder, LayerSet, LayerSpec, UndatedMode};
pub use ramp::{Ramp, UnknownYear, YearColorStop};
