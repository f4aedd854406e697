//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::client::{FeedType, PLATES_URL, USGS_BASE_URL};
use crate::filters::{BBox, EventFilter};
use crate::layers::LoadConfig;
use crate::output::Format;

/// Earthquakes and tectonic plates on an interactive web map.
#[derive(Parser, Debug)]
#[command(name = "quakemap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the map over HTTP
    Serve(ServeArgs),

    /// Write a self-contained HTML map
    Export(ExportArgs),

    /// Print styled earthquakes
    Styles(StylesArgs),

    /// Print the depth legend
    Legend(LegendArgs),
}

/// Data source and filter options shared by the map commands.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// USGS summary feed to plot
    #[arg(long, default_value = "all_week", value_parser = parse_feed_type)]
    pub feed: FeedType,

    /// Host serving the USGS summary feeds
    #[arg(long, default_value = USGS_BASE_URL)]
    pub usgs_url: String,

    /// Plate-boundary GeoJSON URL
    #[arg(long, default_value = PLATES_URL)]
    pub plates_url: String,

    /// Minimum magnitude to plot
    #[arg(long)]
    pub min_magnitude: Option<f64>,

    /// Maximum depth in km to plot
    #[arg(long)]
    pub max_depth: Option<f64>,

    /// Bounding box filter: minlat,minlon,maxlat,maxlon
    #[arg(long, value_parser = parse_bbox)]
    pub bbox: Option<BBox>,
}

impl SourceArgs {
    #[must_use]
    pub fn filter(&self) -> EventFilter {
        EventFilter {
            min_magnitude: self.min_magnitude,
            max_depth: self.max_depth,
            bbox: self.bbox,
        }
    }

    #[must_use]
    pub fn load_config(&self) -> LoadConfig {
        LoadConfig {
            feed: self.feed,
            plates_url: self.plates_url.clone(),
            filter: self.filter(),
        }
    }
}

/// Arguments for the `serve` command.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Reload both datasets every N seconds (minimum 60); loads once if unset
    #[arg(long)]
    pub refresh: Option<u64>,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

/// Arguments for the `export` command.
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Output HTML file
    #[arg(long, short = 'o', default_value = "quakemap.html")]
    pub output: PathBuf,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Arguments for the `styles` command.
#[derive(Parser, Debug)]
pub struct StylesArgs {
    /// Read a local GeoJSON feed instead of fetching
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// USGS summary feed to fetch when no input file is given
    #[arg(long, default_value = "all_week", value_parser = parse_feed_type)]
    pub feed: FeedType,

    /// Host serving the USGS summary feeds
    #[arg(long, default_value = USGS_BASE_URL)]
    pub usgs_url: String,

    /// Minimum magnitude to show
    #[arg(long)]
    pub min_magnitude: Option<f64>,

    /// Maximum number of events to show
    #[arg(long, short = 'n', default_value = "50")]
    pub limit: usize,

    /// Output format
    #[arg(long, short = 'f', value_enum, ignore_case = true, default_value_t = Format::Human)]
    pub format: Format,
}

/// Legend rendering.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendFormat {
    #[default]
    Text,
    Html,
}

/// Arguments for the `legend` command.
#[derive(Parser, Debug)]
pub struct LegendArgs {
    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = LegendFormat::Text)]
    pub format: LegendFormat,
}

/// Parse a feed type from string.
fn parse_feed_type(s: &str) -> Result<FeedType, String> {
    s.parse()
}

/// Parse a bounding box from string.
fn parse_bbox(s: &str) -> Result<BBox, String> {
    s.parse()
}
