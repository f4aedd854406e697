//! Depth legend.
//!
//! Pairs each depth interval's color swatch with a textual range. The table
//! is built from [`DepthBand`] so the legend always agrees with the marker
//! colors.

use std::cmp::Ordering;

use serde::Serialize;

use crate::errors::QuakeMapError;
use crate::popup::escape_html;
use crate::style::DepthBand;

/// One interval: everything from `lower` up to the next interval's bound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendInterval {
    pub lower: f64,
    pub color: String,
}

/// One rendered legend row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub color: String,
    pub label: String,
}

/// Ordered depth intervals. The last interval is open-ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    intervals: Vec<LegendInterval>,
}

impl Legend {
    /// The canonical six-band depth legend.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the depth bands are out of order.
    pub fn depth() -> Result<Self, QuakeMapError> {
        let bounds = DepthBand::ALL.map(DepthBand::legend_floor);
        let colors = DepthBand::ALL.map(DepthBand::color);
        Self::from_parts(&bounds, &colors)
    }

    /// Build a legend from parallel bound and color tables.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the tables differ in length or the
    /// bounds are not strictly increasing.
    pub fn from_parts<S: AsRef<str>>(bounds: &[f64], colors: &[S]) -> Result<Self, QuakeMapError> {
        if bounds.len() != colors.len() {
            return Err(QuakeMapError::Validation(format!(
                "legend has {} bounds but {} colors",
                bounds.len(),
                colors.len()
            )));
        }
        if let Some(&bound) = bounds.iter().find(|b| b.is_nan()) {
            return Err(QuakeMapError::Validation(format!(
                "legend bound {bound} is not a number"
            )));
        }
        if let Some(pair) = bounds
            .windows(2)
            .find(|w| w[0].partial_cmp(&w[1]) != Some(Ordering::Less))
        {
            return Err(QuakeMapError::Validation(format!(
                "legend bounds must be strictly increasing ({} then {})",
                pair[0], pair[1]
            )));
        }

        Ok(Self {
            intervals: bounds
                .iter()
                .zip(colors)
                .map(|(&lower, color)| LegendInterval {
                    lower,
                    color: color.as_ref().to_string(),
                })
                .collect(),
        })
    }

    /// One entry per declared interval, in order.
    #[must_use]
    pub fn entries(&self) -> Vec<LegendEntry> {
        self.intervals
            .iter()
            .enumerate()
            .map(|(i, interval)| {
                let label = match self.intervals.get(i + 1) {
                    Some(next) => format!("{}km – {}km", interval.lower, next.lower),
                    None => format!("{}+", interval.lower),
                };
                LegendEntry {
                    color: interval.color.clone(),
                    label,
                }
            })
            .collect()
    }

    /// Render the legend control body.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::from(r#"<div class="info legend">"#);
        for entry in self.entries() {
            html.push_str(&format!(
                r#"<i style="background: {}"></i> {}<br>"#,
                escape_html(&entry.color),
                escape_html(&entry.label)
            ));
        }
        html.push_str("</div>");
        html
    }

    /// Plain-text rendering, one interval per line.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.entries()
            .iter()
            .map(|e| format!("{:<8} {}\n", e.color, e.label))
            .collect()
    }
}
