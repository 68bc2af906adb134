use std::collections::BTreeSet;

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::layers::{LayerSet, LayerSpec, TileSource};

pub const UNSUPPORTED_NOTICE: &str =
    "Your browser does not support the map renderer. Try a recent desktop browser.";

pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// Host map engine that sources and layers are registered with.
pub trait MapEngine {
    fn supports_rendering(&self) -> bool;
    fn add_source(&mut self, source: &TileSource) -> Result<(), EngineError>;
    fn add_layer(&mut self, layer: &LayerSpec) -> Result<(), EngineError>;
    fn notify_user(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootState {
    Unloaded,
    Loaded,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootOutcome {
    Registered { sources: usize, layers: usize },
    AlreadyLoaded,
    /// An earlier ready event failed; nothing is registered.
    Aborted,
    Unsupported,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("map engine rejected {item}")]
    Engine {
        item: String,
        #[source]
        source: EngineError,
    },
    #[error("ready notification was dropped before the map loaded")]
    ReadySignalDropped,
}

/// Attaches a prepared [`LayerSet`] to an engine exactly once.
pub struct Bootstrapper<E> {
    engine: E,
    layers: LayerSet,
    state: BootState,
}

impl<E: MapEngine> Bootstrapper<E> {
    pub fn new(engine: E, layers: LayerSet) -> Self {
        Self {
            engine,
            layers,
            state: BootState::Unloaded,
        }
    }

    pub fn state(&self) -> BootState {
        self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    pub fn on_ready(&mut self) -> Result<BootOutcome, BootstrapError> {
        match self.state {
            BootState::Unloaded => {}
            BootState::Loaded => return Ok(BootOutcome::AlreadyLoaded),
            BootState::Aborted => return Ok(BootOutcome::Aborted),
        }

        if !self.engine.supports_rendering() {
            warn!("map engine cannot render, skipping layer registration");
            self.engine.notify_user(UNSUPPORTED_NOTICE);
            self.state = BootState::Aborted;
            return Ok(BootOutcome::Unsupported);
        }

        // No retries: a failed registration leaves the page as it is.
        self.state = BootState::Aborted;

        let mut registered = BTreeSet::new();
        for source in &self.layers.sources {
            if !registered.insert(source.name.as_str()) {
                continue;
            }
            self.engine
                .add_source(source)
                .map_err(|err| BootstrapError::Engine {
                    item: format!("source '{}'", source.name),
                    source: err,
                })?;
        }
        for layer in &self.layers.layers {
            self.engine
                .add_layer(layer)
                .map_err(|err| BootstrapError::Engine {
                    item: format!("layer '{}'", layer.id),
                    source: err,
                })?;
        }

        self.state = BootState::Loaded;
        info!(
            sources = registered.len(),
            layers = self.layers.layers.len(),
            "map layers registered"
        );
        Ok(BootOutcome::Registered {
            sources: registered.len(),
            layers: self.layers.layers.len(),
        })
    }

    pub async fn run(&mut self, ready: oneshot::Receiver<()>) -> Result<BootOutcome, BootstrapError> {
        ready
            .await
            .map_err(|_| BootstrapError::ReadySignalDropped)?;
        self.on_ready()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Source(String),
    Layer(String),
}

/// In-memory engine that records what was registered and in which order.
#[derive(Debug, Clone)]
pub struct RecordingEngine {
    supported: bool,
    reject: Option<String>,
    registrations: Vec<Registration>,
    notices: Vec<String>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self {
            supported: true,
            reject: None,
            registrations: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Fail when a source or layer with this id is registered.
    pub fn rejecting(mut self, id: impl Into<String>) -> Self {
        self.reject = Some(id.into());
        self
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    fn check(&self, id: &str) -> Result<(), EngineError> {
        match &self.reject {
            Some(rejected) if rejected == id => Err(format!("rejected '{id}'").into()),
            _ => Ok(()),
        }
    }
}

impl Default for RecordingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MapEngine for RecordingEngine {
    fn supports_rendering(&self) -> bool {
        self.supported
    }

    fn add_source(&mut self, source: &TileSource) -> Result<(), EngineError> {
        self.check(&source.name)?;
        self.registrations
            .push(Registration::Source(source.name.clone()));
        Ok(())
    }

    fn add_layer(&mut self, layer: &LayerSpec) -> Result<(), EngineError> {
        self.check(&layer.id)?;
        self.registrations.push(Registration::Layer(layer.id.clone()));
        Ok(())
    }

    fn notify_user(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}
