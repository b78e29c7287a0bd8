//! Error kinds shared by the resolution pipeline and the map model.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Invalid coordinate format: '{0}'")]
    InvalidCoordinateFormat(String),
    #[error("Coordinates out of range: lat={lat}, lon={lon} (lat: -90..90, lon: -180..180)")]
    InvalidCoordinateRange { lat: f64, lon: f64 },
    #[error("Empty location query")]
    EmptyQuery,
    #[error("Geocoding backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("Location could not be resolved: {0}")]
    UnresolvableLocation(String),
    #[error("No markers to render")]
    NoMarkersToRender,
    #[error("Invalid zoom value: {0}")]
    InvalidZoomValue(String),
    #[error("Malformed location query: {0}")]
    MalformedQuery(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this is a per-entry resolution failure that the caller
    /// skips and reports, as opposed to a failure of the whole operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidCoordinateFormat(_)
                | Self::InvalidCoordinateRange { .. }
                | Self::EmptyQuery
                | Self::BackendUnavailable(_)
                | Self::UnresolvableLocation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_failures_are_recoverable() {
        assert!(Error::EmptyQuery.is_recoverable());
        assert!(Error::BackendUnavailable("timeout".into()).is_recoverable());
        assert!(Error::InvalidCoordinateRange { lat: 91.0, lon: 0.0 }.is_recoverable());
    }

    #[test]
    fn test_render_failures_are_fatal() {
        assert!(!Error::NoMarkersToRender.is_recoverable());
        assert!(!Error::MalformedQuery("3 elements".into()).is_recoverable());
        assert!(!Error::InvalidZoomValue("-1".into()).is_recoverable());
    }

    #[test]
    fn test_display_mentions_range() {
        let msg = Error::InvalidCoordinateRange { lat: 91.0, lon: 0.0 }.to_string();
        assert!(msg.contains("lat=91"));
    }
}
