//! Terminal output for styled earthquakes.
//!
//! Supports human-readable (colored by depth band), GeoJSON, and NDJSON.

use std::io::{self, Write};

use clap::ValueEnum;

use crate::layers::{StyledQuake, earthquakes_geojson};
use crate::style::DepthBand;

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Output format selection.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// Pretty-printed GeoJSON FeatureCollection
    #[value(name = "geojson")]
    GeoJson,
    /// Newline-delimited JSON (one styled event per line)
    Ndjson,
}

/// Terminal color approximating a depth band's marker color.
fn band_ansi(band: DepthBand) -> &'static str {
    match band {
        DepthBand::VeryDeep => "\x1b[91m",
        DepthBand::Deep => "\x1b[38;5;202m",
        DepthBand::Lower => "\x1b[38;5;208m",
        DepthBand::Middle => "\x1b[38;5;214m",
        DepthBand::Upper => "\x1b[38;5;190m",
        DepthBand::Shallow => "\x1b[92m",
    }
}

/// Write events as colored rows.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human<W: Write>(writer: &mut W, quakes: &[StyledQuake]) -> io::Result<()> {
    for quake in quakes {
        let f = &quake.feature;
        let time = f
            .time
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".into());
        let color = band_ansi(DepthBand::classify(f.depth()));

        writeln!(
            writer,
            "{color}●{RESET} {BOLD}M{mag:.1}{RESET} │ \
             {color}{depth:>6.1}km{RESET} │ \
             {DIM}r={radius:<5.1} {fill:<8}{RESET} │ \
             {time} UTC │ {place}",
            mag = f.magnitude,
            depth = f.depth(),
            radius = quake.style.radius,
            fill = quake.style.fill_color,
            place = f.place,
        )?;
    }
    Ok(())
}

/// Write events as one GeoJSON document.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_geojson<W: Write>(writer: &mut W, quakes: &[StyledQuake]) -> io::Result<()> {
    let json = serde_json::to_string_pretty(&earthquakes_geojson(quakes))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write events as newline-delimited JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_ndjson<W: Write>(writer: &mut W, quakes: &[StyledQuake]) -> io::Result<()> {
    for quake in quakes {
        let json = serde_json::to_string(quake)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Write events in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_quakes<W: Write>(writer: &mut W, quakes: &[StyledQuake], format: Format) -> io::Result<()> {
    match format {
        Format::Human => write_human(writer, quakes),
        Format::GeoJson => write_geojson(writer, quakes),
        Format::Ndjson => write_ndjson(writer, quakes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::EventFilter;
    use crate::layers::build_earthquake_layer;
    use crate::models::FeatureCollection;

    fn sample() -> Vec<StyledQuake> {
        let feed: FeatureCollection =
            serde_json::from_str(include_str!("../tools/sample_all_week.json")).expect("feed");
        build_earthquake_layer(&feed, &EventFilter::default())
    }

    #[test]
    fn test_human_rows() {
        let mut buf = Vec::new();
        write_human(&mut buf, &sample()).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("M4.5"));
        assert!(text.contains("Ridgecrest"));
        assert!(text.contains("2025-10-19 07:00:00 UTC"));
    }

    #[test]
    fn test_ndjson_lines() {
        let mut buf = Vec::new();
        write_ndjson(&mut buf, &sample()).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);

        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("json line");
        assert_eq!(first["style"]["fillColor"], "#d4ff00");
        assert_eq!(first["feature"]["place"], "10km NW of Ridgecrest, CA");
    }

    #[test]
    fn test_geojson_document() {
        let mut buf = Vec::new();
        write_quakes(&mut buf, &sample(), Format::GeoJson).expect("write");
        let value: serde_json::Value = serde_json::from_slice(&buf).expect("json");
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"].as_array().map(Vec::len), Some(4));
    }
}
