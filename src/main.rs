use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use agemap::{
    bootstrap::{BootOutcome, Bootstrapper, RecordingEngine, Registration},
    config::{ConfigLoader, MapConfig},
    layers::LayerConfigBuilder,
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Building age map preview")]
struct Cli {
    /// Path to a map config YAML file (overrides --preset)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Built-in map revision used when no config file is given
    #[arg(long, global = true, value_enum, default_value_t = Preset::Gray)]
    preset: Preset,

    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    Gray,
    Black,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the preview page
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
    /// Print sources and layers as style JSON
    Layers,
    /// Print the color for a construction year
    Resolve { year: i32 },
    /// Print the order sources and layers would be registered in
    Plan,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    let map = match &cli.config {
        Some(path) => ConfigLoader::new(".").load(path)?,
        None => match cli.preset {
            Preset::Gray => MapConfig::gray_revision(),
            Preset::Black => MapConfig::black_revision(),
        },
    };
    info!(map = %map.name, "using map config");

    match cli.command {
        Command::Serve { host, port } => {
            web::run(WebServerConfig { map, host, port }).await?;
        }
        Command::Layers => {
            let set = LayerConfigBuilder::new(&map).build()?;
            println!("{}", serde_json::to_string_pretty(&set.to_style_fragment())?);
        }
        Command::Resolve { year } => {
            let ramp = map.ramp()?;
            println!("{}", ramp.resolve(year));
        }
        Command::Plan => {
            let set = LayerConfigBuilder::new(&map).build()?;
            let mut bootstrapper = Bootstrapper::new(RecordingEngine::new(), set);
            match bootstrapper.on_ready()? {
                BootOutcome::Registered { sources, layers } => {
                    println!("{sources} sources, {layers} layers")
                }
                BootOutcome::AlreadyLoaded => println!("already loaded"),
                BootOutcome::Aborted => println!("aborted, nothing registered"),
                BootOutcome::Unsupported => println!("engine cannot render"),
            }
            for registration in bootstrapper.engine().registrations() {
                match registration {
                    Registration::Source(name) => println!("source {name}"),
                    Registration::Layer(id) => println!("layer  {id}"),
                }
            }
        }
    }
    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level.as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("warn") => "warn",
        Some("error") => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
