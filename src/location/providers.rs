//! Geocoding backends: a Nominatim-compatible HTTP API and caller-supplied geocoders.

use super::types::GeocodeResult;
use crate::coords::{self, Coordinate, Degrees};
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves free text to a coordinate.
///
/// Failures are returned, never raised; the resolver decides what to do
/// with them.
pub trait GeocodeBackend: Send + Sync {
    fn resolve(&self, label: &str) -> Result<Coordinate>;

    /// Short name used in log lines.
    fn name(&self) -> &str;
}

// ─── Nominatim-compatible HTTP backend ──────────────────────────

#[derive(Deserialize, Debug)]
struct SearchHit {
    lat: Degrees,
    lon: Degrees,
}

/// Queries `GET <endpoint>?format=json&q=<text>` and takes the first hit.
pub struct RemoteHttpBackend {
    agent: ureq::Agent,
    endpoint: String,
}

impl RemoteHttpBackend {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self::with_agent(agent, endpoint)
    }

    /// Use a caller-configured HTTP agent (proxy, TLS, pooling).
    pub fn with_agent(agent: ureq::Agent, endpoint: impl Into<String>) -> Self {
        Self {
            agent,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for RemoteHttpBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GeocodeBackend for RemoteHttpBackend {
    fn resolve(&self, label: &str) -> Result<Coordinate> {
        let response = self
            .agent
            .get(&self.endpoint)
            .query("format", "json")
            .query("q", label)
            .set("User-Agent", USER_AGENT)
            .set("Accept", "application/json")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => {
                    Error::BackendUnavailable(format!("HTTP {} from {}", code, self.endpoint))
                }
                ureq::Error::Transport(t) => Error::BackendUnavailable(t.to_string()),
            })?;

        let body: Value = response.into_json().map_err(|e| {
            Error::UnresolvableLocation(format!("unparsable response for '{}': {}", label, e))
        })?;

        let hit = first_hit(body, label)?;
        coords::check(&hit.lat, &hit.lon).map_err(|e| invalid_answer(label, e))
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// First element of a result array, or the body itself if it is an object.
fn first_hit(body: Value, label: &str) -> Result<SearchHit> {
    let first = match body {
        Value::Array(items) => items
            .into_iter()
            .next()
            .ok_or_else(|| Error::UnresolvableLocation(format!("no results for '{}'", label)))?,
        obj @ Value::Object(_) => obj,
        other => {
            return Err(Error::UnresolvableLocation(format!(
                "unexpected response for '{}': {}",
                label, other
            )))
        }
    };
    serde_json::from_value(first).map_err(|e| {
        Error::UnresolvableLocation(format!("result for '{}' lacks lat/lon: {}", label, e))
    })
}

/// A backend answer that fails validation is the backend's fault, not the
/// caller's: report it as unresolvable rather than as a coordinate error.
pub(crate) fn invalid_answer(label: &str, error: Error) -> Error {
    match error {
        Error::InvalidCoordinateFormat(_) | Error::InvalidCoordinateRange { .. } => {
            Error::UnresolvableLocation(format!(
                "backend returned invalid coordinates for '{}': {}",
                label, error
            ))
        }
        other => other,
    }
}

// ─── Pluggable geocoder backend ─────────────────────────────────

pub type GeocoderError = Box<dyn std::error::Error + Send + Sync>;

/// A caller-supplied geocoder. `Ok(None)` means "ran, found nothing".
pub trait Geocoder: Send + Sync {
    fn geocode(&self, query: &str) -> std::result::Result<Option<GeocodeResult>, GeocoderError>;
}

impl<F> Geocoder for F
where
    F: Fn(&str) -> std::result::Result<Option<GeocodeResult>, GeocoderError> + Send + Sync,
{
    fn geocode(&self, query: &str) -> std::result::Result<Option<GeocodeResult>, GeocoderError> {
        self(query)
    }
}

pub struct PluggableGeocoderBackend<G> {
    geocoder: G,
}

impl<G: Geocoder> PluggableGeocoderBackend<G> {
    pub fn new(geocoder: G) -> Self {
        Self { geocoder }
    }
}

impl<G: Geocoder> GeocodeBackend for PluggableGeocoderBackend<G> {
    fn resolve(&self, label: &str) -> Result<Coordinate> {
        match self.geocoder.geocode(label) {
            Ok(Some(result)) => result.into_coordinate().map_err(|e| invalid_answer(label, e)),
            Ok(None) => Err(Error::UnresolvableLocation(format!("no results for '{}'", label))),
            Err(e) => Err(Error::BackendUnavailable(e.to_string())),
        }
    }

    fn name(&self) -> &str {
        "geocoder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn resolve_against(server: &MockServer, label: &str) -> Result<Coordinate> {
        let backend = RemoteHttpBackend::with_endpoint(format!("{}/search", server.uri()));
        let label = label.to_string();
        tokio::task::spawn_blocking(move || backend.resolve(&label))
            .await
            .unwrap()
    }

    async fn server_returning(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_http_first_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("format", "json"))
            .and(query_param("q", "Paris, France"))
            .and(header("User-Agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"lat": "48.85", "lon": "2.35", "display_name": "Paris"},
                {"lat": "33.66", "lon": "-95.55", "display_name": "Paris, TX"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let c = resolve_against(&server, "Paris, France").await.unwrap();
        assert_eq!((c.lat(), c.lon()), (48.85, 2.35));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_http_single_object_numeric() {
        let server =
            server_returning(ResponseTemplate::new(200).set_body_json(json!({"lat": 59.33, "lon": 18.07})))
                .await;
        let c = resolve_against(&server, "Stockholm").await.unwrap();
        assert_eq!((c.lat(), c.lon()), (59.33, 18.07));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_http_empty_result() {
        let server = server_returning(ResponseTemplate::new(200).set_body_json(json!([]))).await;
        assert!(matches!(
            resolve_against(&server, "xyznonexistent").await,
            Err(Error::UnresolvableLocation(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_http_server_error() {
        let server = server_returning(ResponseTemplate::new(503)).await;
        assert!(matches!(
            resolve_against(&server, "Paris").await,
            Err(Error::BackendUnavailable(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_http_garbage_body() {
        let server =
            server_returning(ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;
        assert!(matches!(
            resolve_against(&server, "Paris").await,
            Err(Error::UnresolvableLocation(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_http_out_of_range_result() {
        let server = server_returning(
            ResponseTemplate::new(200).set_body_json(json!([{"lat": "95.0", "lon": "0"}])),
        )
        .await;
        assert!(matches!(
            resolve_against(&server, "Nowhere").await,
            Err(Error::UnresolvableLocation(_))
        ));
    }

    #[test]
    fn test_http_connection_refused() {
        let backend = RemoteHttpBackend::with_timeout("http://127.0.0.1:1/search", Duration::from_secs(2));
        assert!(matches!(
            backend.resolve("Paris"),
            Err(Error::BackendUnavailable(_))
        ));
    }

    #[test]
    fn test_user_agent_names_library() {
        assert!(USER_AGENT.starts_with("geomarker/"));
    }

    #[test]
    fn test_geocoder_closure() {
        let backend = PluggableGeocoderBackend::new(|_q: &str| {
            Ok::<_, GeocoderError>(Some(GeocodeResult::LatLon {
                lat: "48.85".into(),
                lon: "2.35".into(),
            }))
        });
        let c = backend.resolve("Paris").unwrap();
        assert_eq!((c.lat(), c.lon()), (48.85, 2.35));
    }

    #[test]
    fn test_geocoder_nothing_found() {
        let backend = PluggableGeocoderBackend::new(|_q: &str| Ok::<_, GeocoderError>(None));
        assert!(matches!(
            backend.resolve("Atlantis"),
            Err(Error::UnresolvableLocation(_))
        ));
    }

    #[test]
    fn test_geocoder_failure() {
        let backend =
            PluggableGeocoderBackend::new(|_q: &str| Err::<Option<GeocodeResult>, GeocoderError>("quota exceeded".into()));
        match backend.resolve("Paris") {
            Err(Error::BackendUnavailable(msg)) => assert!(msg.contains("quota")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_geocoder_bad_pair() {
        let backend = PluggableGeocoderBackend::new(|_q: &str| {
            Ok::<_, GeocoderError>(Some(GeocodeResult::Pair(vec![1.0.into()])))
        });
        assert!(matches!(
            backend.resolve("Paris"),
            Err(Error::UnresolvableLocation(_))
        ));
    }

    struct FixedGeocoder(Coordinate);

    impl Geocoder for FixedGeocoder {
        fn geocode(&self, _query: &str) -> std::result::Result<Option<GeocodeResult>, GeocoderError> {
            Ok(Some(GeocodeResult::from_located(&self.0)))
        }
    }

    #[test]
    fn test_geocoder_named_type() {
        let fixed = Coordinate::new(-33.87, 151.21).unwrap();
        let backend = PluggableGeocoderBackend::new(FixedGeocoder(fixed));
        assert_eq!(backend.resolve("Sydney").unwrap(), fixed);
        assert_eq!(backend.name(), "geocoder");
    }
}
