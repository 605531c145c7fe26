#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the ride map analytics layers.
//!
//! Fetches the analysis dataset once, applies the requested layer toggles
//! and prints what the dashboard would show: view status, the layer list,
//! the legend, the session summary and the renderer plan.

use std::path::PathBuf;

use clap::Parser;
use ride_map_engine::{DashboardSession, LayerRender, RendererFamily, RendererHost, ViewStatus};
use ride_map_layer_models::LayerId;
use ride_map_store::{DashboardConfig, HttpDatasetFetcher};

#[derive(Parser)]
#[command(name = "ride_map", about = "Inspect ride analytics map layers")]
struct Cli {
    /// Dataset URL (overrides the config file and `ANALYSIS_DATA_URL`)
    #[arg(long)]
    url: Option<String>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable every available layer
    #[arg(long)]
    all: bool,

    /// Toggle a layer (repeatable), e.g. `--layer routes --layer violations`
    #[arg(long = "layer", value_parser = parse_layer)]
    layers: Vec<LayerId>,

    /// Print the listing, legend and summary as JSON
    #[arg(long)]
    json: bool,
}

fn parse_layer(value: &str) -> Result<LayerId, String> {
    value.parse().map_err(|_| {
        let known: Vec<&str> = LayerId::ALL.iter().map(AsRef::as_ref).collect();
        format!("unknown layer '{value}' (expected one of: {})", known.join(", "))
    })
}

/// Renderer host that prints every mount to stdout.
struct PrintHost;

impl RendererHost for PrintHost {
    fn mount(&mut self, render: &LayerRender<'_>) {
        let family = render.family.to_string();
        println!(
            "  + {:<14} {family:<16} {} items",
            render.layer.as_ref(),
            render.payload.len()
        );
    }

    fn unmount(&mut self, layer: LayerId, family: RendererFamily) {
        println!("  - {:<14} {family}", layer.as_ref());
    }
}

fn load_config(cli: &Cli) -> Result<DashboardConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    }
    .with_env_overrides()?;

    if let Some(url) = &cli.url {
        config.data_url.clone_from(url);
    }
    config.validate()?;

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let fetcher = HttpDatasetFetcher::new(&config)?;

    let mut session = DashboardSession::new();
    session.mount(&fetcher).await;

    let status = session.view_status();
    println!("Status: {status}");
    if let ViewStatus::Failed { message } = status {
        return Err(format!("failed to load analysis data: {message}").into());
    }

    if cli.all {
        session.enable_all();
    }
    for layer in &cli.layers {
        if !session.toggle(*layer) {
            log::warn!("Layer '{layer}' has no data and cannot be shown");
        }
    }

    if cli.json {
        let report = serde_json::json!({
            "status": session.view_status().to_string(),
            "layers": session.listing(),
            "legend": session.legend(),
            "summary": session.summary(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("Layers:");
    for entry in session.listing() {
        let mark = if entry.active { 'x' } else { ' ' };
        println!(
            "  [{mark}] {} {:<22} {}  {}",
            entry.icon, entry.name, entry.color, entry.description
        );
    }

    let legend = session.legend();
    if !legend.is_empty() {
        println!();
        println!("Legend:");
        for entry in legend {
            println!("  {} {}: {}", entry.color, entry.name, entry.caption);
        }
    }

    if let Some(summary) = session.summary() {
        println!();
        println!("Total records: {}", summary.total_records);
        println!(
            "Active Layers: {} / {}",
            summary.active_layers, summary.available_layers
        );
    }

    println!();
    println!("Renderers:");
    let change = session.compose(&mut PrintHost);
    if change.is_empty() {
        println!("  (none)");
    }

    Ok(())
}
