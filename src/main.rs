//! quakemap - earthquakes and tectonic plates on an interactive web map.
//!
//! Fetches the USGS earthquake feed and the PB2002 plate boundaries, styles
//! each event by depth and magnitude, and serves or exports a Leaflet map
//! with a basemap switcher, overlay toggles and a depth legend.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

mod basemap;
mod cli;
mod client;
mod errors;
mod filters;
mod layers;
mod legend;
mod models;
mod output;
mod page;
mod popup;
mod server;
mod style;

use cli::{Cli, Command, LegendFormat};
use client::FeedClient;
use filters::EventFilter;
use legend::Legend;
use models::FeatureCollection;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Export(args) => cmd_export(&args),
        Command::Styles(args) => cmd_styles(&args),
        Command::Legend(args) => cmd_legend(&args),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the `serve` command.
fn cmd_serve(args: cli::ServeArgs) -> Result<()> {
    let refresh = args.refresh.map(|secs| {
        let clamped = secs.max(server::MIN_REFRESH_SECS);
        if clamped != secs {
            tracing::warn!(
                "refresh interval clamped to minimum of {} seconds",
                server::MIN_REFRESH_SECS
            );
        }
        clamped
    });

    let config = server::ServerConfig {
        port: args.port,
        host: args.host.clone(),
        load: args.source.load_config(),
        refresh,
    };

    // Built before the runtime: the blocking client may not be created inside it.
    let client = FeedClient::new()
        .context("failed to create feed client")?
        .with_base_url(&args.source.usgs_url);

    let url = format!("http://{}:{}", args.host, args.port);
    println!("\x1b[1mquakemap\x1b[0m");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("  Local:   \x1b[96m{url}\x1b[0m");
    println!("  Feed:    {}", args.source.feed);
    match refresh {
        Some(secs) => println!("  Refresh: {secs}s"),
        None => println!("  Refresh: off"),
    }
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop\x1b[0m\n");

    if args.open {
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "windows")]
        let _ = std::process::Command::new("cmd").args(["/c", "start", &url]).spawn();
    }

    tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(server::run_server(config, client))
}

/// Execute the `export` command - fetch both layers and write one HTML file.
fn cmd_export(args: &cli::ExportArgs) -> Result<()> {
    let client = FeedClient::new()
        .context("failed to create feed client")?
        .with_base_url(&args.source.usgs_url);
    let map = Arc::new(server::build_map()?);
    let load = args.source.load_config();

    let runtime = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    let (quakes, plates) = runtime.block_on(async {
        layers::populate(&map, &client, &load).await;
        (map.earthquakes.snapshot().await, map.plates.snapshot().await)
    });

    if quakes.is_empty() && plates.is_empty() {
        anyhow::bail!("neither data feed could be loaded");
    }

    let html = page::standalone_html(
        &map.config(),
        &layers::earthquakes_geojson(&quakes),
        &layers::plates_geojson(&plates)?,
    )?;
    std::fs::write(&args.output, html)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!(
        "wrote {} ({} earthquakes, {} plate boundaries)",
        args.output.display(),
        quakes.len(),
        plates.len()
    );
    Ok(())
}

/// Execute the `styles` command - print styled earthquakes.
fn cmd_styles(args: &cli::StylesArgs) -> Result<()> {
    let feed: FeatureCollection = match &args.input {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let feed: FeatureCollection = serde_json::from_str(&text)
                .with_context(|| format!("{} is not an earthquake feed", path.display()))?;
            feed.validate()?;
            feed
        }
        None => FeedClient::new()
            .context("failed to create feed client")?
            .with_base_url(&args.usgs_url)
            .fetch_earthquakes(args.feed)
            .context("failed to fetch earthquake feed")?,
    };

    let filter = EventFilter {
        min_magnitude: args.min_magnitude,
        ..Default::default()
    };
    let mut quakes = layers::build_earthquake_layer(&feed, &filter);

    // Most recent first
    quakes.sort_by(|a, b| b.feature.time.cmp(&a.feature.time));
    quakes.truncate(args.limit);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_quakes(&mut handle, &quakes, args.format)?;

    Ok(())
}

/// Execute the `legend` command.
fn cmd_legend(args: &cli::LegendArgs) -> Result<()> {
    let legend = Legend::depth()?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match args.format {
        LegendFormat::Text => write!(handle, "{}", legend.to_text())?,
        LegendFormat::Html => writeln!(handle, "{}", legend.to_html())?,
    }
    Ok(())
}
