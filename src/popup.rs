//! Popup text for earthquake markers.

use crate::models::EarthquakeFeature;

/// Build the popup shown when a marker is clicked.
///
/// Magnitude and depth are bold; each field sits on its own line. The place
/// comes from the remote feed, so it is escaped before being inserted into
/// markup.
#[must_use]
pub fn popup_text(feature: &EarthquakeFeature) -> String {
    format!(
        "Magnitude: <b>{}</b><br>\nDepth: <b>{}</b><br>\nLocation: <b>{}</b>",
        feature.magnitude,
        feature.depth(),
        escape_html(&feature.place)
    )
}

/// Escape the characters that are significant in HTML text and attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;

    fn quake(magnitude: f64, depth: f64, place: &str) -> EarthquakeFeature {
        EarthquakeFeature {
            id: "ci1".into(),
            magnitude,
            magnitude_type: None,
            place: place.into(),
            coordinates: Coordinates {
                longitude: -117.7,
                latitude: 35.7,
                depth,
            },
            time: None,
            url: None,
        }
    }

    #[test]
    fn test_popup_contains_all_fields() {
        let text = popup_text(&quake(4.5, 12.3, "10km NW of Ridgecrest, CA"));
        assert!(text.contains("4.5"));
        assert!(text.contains("12.3"));
        assert!(text.contains("10km NW of Ridgecrest, CA"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_popup_emphasizes_numbers() {
        let text = popup_text(&quake(4.5, 12.3, "x"));
        assert!(text.contains("Magnitude: <b>4.5</b>"));
        assert!(text.contains("Depth: <b>12.3</b>"));
    }

    #[test]
    fn test_whole_numbers_print_without_fraction() {
        let text = popup_text(&quake(5.0, 10.0, "x"));
        assert!(text.contains("<b>5</b>"));
        assert!(text.contains("<b>10</b>"));
    }

    #[test]
    fn test_place_is_escaped() {
        let text = popup_text(&quake(1.0, 1.0, "<script>alert('x')</script> & co"));
        assert!(!text.contains("<script>"));
        assert!(text.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; co"));
    }
}
