//! Errors raised while loading the earthquake and plate-boundary feeds and
//! assembling the map from them.

use thiserror::Error;

/// Failure to load, validate or assemble map data.
#[derive(Error, Debug)]
pub enum QuakeMapError {
    /// The earthquake or plate feed could not be reached
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A feed body or embedded layer was not valid JSON
    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The feed host answered with a non-success status
    #[error("feed error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The feed document is not a GeoJSON `FeatureCollection`
    #[error("unexpected feed document: {0}")]
    InvalidResponse(String),

    /// An event, plate boundary, legend table or layer label was rejected
    #[error("invalid map data: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_feed() {
        let err = QuakeMapError::Api {
            status: 503,
            message: "down".into(),
        };
        assert_eq!(err.to_string(), "feed error (HTTP 503): down");

        let err = QuakeMapError::Validation("event x: missing geometry".into());
        assert_eq!(err.to_string(), "invalid map data: event x: missing geometry");
    }

    #[test]
    fn test_json_errors_convert() {
        let parse = serde_json::from_str::<serde_json::Value>("{").expect_err("truncated");
        let err: QuakeMapError = parse.into();
        assert!(matches!(err, QuakeMapError::Parse(_)));
        assert!(err.to_string().starts_with("malformed JSON"));
    }
}
