//! HTTP client for the two remote feeds.
//!
//! Provides blocking access to the USGS summary feeds and the PB2002
//! plate-boundary document. Uses reqwest with rustls for TLS.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use tracing::{debug, instrument};

use crate::errors::QuakeMapError;
use crate::models::{FeatureCollection, PlateBoundaries};

/// Default request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent string for feed requests.
const USER_AGENT: &str = concat!("quakemap/", env!("CARGO_PKG_VERSION"));

/// USGS base URL for earthquake feeds.
pub const USGS_BASE_URL: &str = "https://earthquake.usgs.gov";

/// Bird (2003) plate boundaries as GeoJSON.
pub const PLATES_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";

/// Magnitude threshold of a summary feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMagnitude {
    All,
    M1,
    M25,
    M45,
    Significant,
}

/// Time window of a summary feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPeriod {
    Hour,
    Day,
    Week,
    Month,
}

/// A USGS summary feed, e.g. `all_week` or `4.5_day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedType {
    pub magnitude: FeedMagnitude,
    pub period: FeedPeriod,
}

impl FeedType {
    /// Every earthquake from the past seven days.
    pub const ALL_WEEK: Self = Self {
        magnitude: FeedMagnitude::All,
        period: FeedPeriod::Week,
    };
}

impl Default for FeedType {
    fn default() -> Self {
        Self::ALL_WEEK
    }
}

impl fmt::Display for FeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = match self.magnitude {
            FeedMagnitude::All => "all",
            FeedMagnitude::M1 => "1.0",
            FeedMagnitude::M25 => "2.5",
            FeedMagnitude::M45 => "4.5",
            FeedMagnitude::Significant => "significant",
        };
        let period = match self.period {
            FeedPeriod::Hour => "hour",
            FeedPeriod::Day => "day",
            FeedPeriod::Week => "week",
            FeedPeriod::Month => "month",
        };
        write!(f, "{magnitude}_{period}")
    }
}

impl std::str::FromStr for FeedType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        let Some((magnitude, period)) = lower.rsplit_once('_') else {
            return Err(format!("unknown feed type: {s} (expected e.g. all_week)"));
        };

        let magnitude = match magnitude {
            "all" => FeedMagnitude::All,
            "1.0" => FeedMagnitude::M1,
            "2.5" => FeedMagnitude::M25,
            "4.5" => FeedMagnitude::M45,
            "significant" => FeedMagnitude::Significant,
            _ => return Err(format!("unknown feed magnitude: {magnitude}")),
        };
        let period = match period {
            "hour" => FeedPeriod::Hour,
            "day" => FeedPeriod::Day,
            "week" => FeedPeriod::Week,
            "month" => FeedPeriod::Month,
            _ => return Err(format!("unknown feed period: {period}")),
        };

        Ok(Self { magnitude, period })
    }
}

/// Client for the earthquake and plate-boundary feeds.
#[derive(Clone)]
pub struct FeedClient {
    client: Client,
    base_url: String,
}

impl FeedClient {
    /// Create a new feed client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, QuakeMapError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: USGS_BASE_URL.to_string(),
        })
    }

    /// Point the earthquake feed at a different host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// URL of a summary feed.
    #[must_use]
    pub fn feed_url(&self, feed_type: FeedType) -> String {
        format!(
            "{}/earthquakes/feed/v1.0/summary/{feed_type}.geojson",
            self.base_url
        )
    }

    /// Fetch a summary GeoJSON feed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or response cannot be parsed.
    #[instrument(skip(self), fields(feed = %feed_type))]
    pub fn fetch_earthquakes(&self, feed_type: FeedType) -> Result<FeatureCollection, QuakeMapError> {
        let url = self.feed_url(feed_type);
        debug!("fetching earthquakes from {}", url);

        let response = check_status(self.client.get(&url).send()?)?;
        let feed: FeatureCollection = response.json()?;
        feed.validate()?;

        if let Some(meta) = &feed.metadata {
            debug!(
                "{} (generated {}, {} events listed)",
                meta.title, meta.generated, meta.count
            );
        }
        debug!("fetched {} events", feed.features.len());
        Ok(feed)
    }

    /// Fetch the plate-boundary document.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the document is not a
    /// collection of boundary lines.
    #[instrument(skip(self))]
    pub fn fetch_plates(&self, url: &str) -> Result<PlateBoundaries, QuakeMapError> {
        debug!("fetching plate boundaries from {}", url);

        let response = check_status(self.client.get(url).send()?)?;
        let plates = PlateBoundaries::from_json(&response.text()?)?;

        debug!("fetched {} boundaries", plates.len());
        Ok(plates)
    }
}

/// Turn a non-success status into an [`QuakeMapError::Api`].
fn check_status(response: Response) -> Result<Response, QuakeMapError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(QuakeMapError::Api {
        status: status.as_u16(),
        message: body,
    })
}
