//! Building a map model from JSON place entries with an offline geocoder.

use geomarker::location::{GeocodeResult, GeocoderError, LocationQuery};
use geomarker::{CoordinateResolver, Error, MapConfig, MapModel, MarkerSet, PlaceEntry, ViewportCalculator};
use serde_json::json;

fn gazetteer() -> CoordinateResolver {
    CoordinateResolver::with_geocoder(|q: &str| -> Result<Option<GeocodeResult>, GeocoderError> {
        let result = match q {
            "Paris" => Some(GeocodeResult::LatLon {
                lat: "48.85".into(),
                lon: "2.35".into(),
            }),
            "Berlin" => Some(GeocodeResult::from_json(json!({"geometry": {"location": {"lat": 52.52, "lng": 13.405}}}))?),
            "Madrid" => Some(GeocodeResult::Pair(vec!["40.42".into(), "-3.70".into()])),
            "Broken" => return Err("upstream timeout".into()),
            _ => None,
        };
        Ok(result)
    })
}

fn entries(value: serde_json::Value) -> Vec<PlaceEntry> {
    serde_json::from_value(value).unwrap()
}

#[test]
fn viewport_centers() {
    let resolver = gazetteer();
    let calc = ViewportCalculator::default();

    let mut two = MarkerSet::new();
    two.add_from_query(&resolver, &LocationQuery::coordinates(10.0, 10.0));
    two.add_from_query(&resolver, &LocationQuery::coordinates(20.0, 20.0));
    let vp = calc.compute(&two, None).unwrap();
    assert_eq!((vp.center.lat(), vp.center.lon()), (15.0, 15.0));

    let mut one = MarkerSet::new();
    one.add_from_query(&resolver, &LocationQuery::coordinates(5.0, 5.0));
    let vp = calc.compute(&one, None).unwrap();
    assert_eq!((vp.center.lat(), vp.center.lon()), (5.0, 5.0));

    assert_eq!(calc.compute(&MarkerSet::new(), None), Err(Error::NoMarkersToRender));
}

#[test]
fn out_of_range_coordinates_do_not_grow_set() {
    let mut set = MarkerSet::new();
    assert!(!set.add_from_query(&gazetteer(), &LocationQuery::coordinates(91.0, 0.0)));
    assert_eq!(set.len(), 0);
}

#[test]
fn mixed_entries_end_to_end() {
    let list = entries(json!([
        {"address": "Paris", "label": "Capital", "icon": "https://example.org/pin.png"},
        {"coordinates": ["52.52", "13.405"], "label": "Berlin"},
        {"address": "Madrid"},
        {"address": "Broken"},
        {"coordinates": [91, 0]},
        {"address": "Berlin"}
    ]));
    let model = MapModel::build(&list, &gazetteer(), &MapConfig::default()).unwrap();

    let labels: Vec<_> = model.markers.iter().map(|m| m.label()).collect();
    assert_eq!(labels, [Some("Capital"), Some("Berlin"), Some("Madrid"), Some("Berlin")]);
    assert_eq!(model.failures.len(), 2);
    assert!(matches!(model.failures[0].error, Error::BackendUnavailable(_)));
    assert!(matches!(model.failures[1].error, Error::InvalidCoordinateRange { .. }));

    assert_eq!(model.bounds.south_west.lat(), 40.42);
    assert_eq!(model.bounds.south_west.lon(), -3.70);
    assert_eq!(model.bounds.north_east.lat(), 52.52);
    assert_eq!(model.bounds.north_east.lon(), 13.405);
    assert_eq!(model.viewport.zoom.get(), 13);

    let json = serde_json::to_value(&model).unwrap();
    assert_eq!(json["markers"][0]["icon"], "https://example.org/pin.png");
    assert_eq!(json["failures"][0]["query"], "'Broken'");
}

#[test]
fn pinned_center_and_zoom_from_config() {
    let cfg = geomarker::Config::from_toml("[map]\nzoom = 4\ncenter = [0.0, 0.0]\n").unwrap();
    let list = entries(json!([{"address": "Paris"}, {"address": "Berlin"}]));
    let model = MapModel::build(&list, &gazetteer(), &cfg.map).unwrap();
    assert_eq!(model.viewport.zoom.get(), 4);
    assert_eq!((model.viewport.center.lat(), model.viewport.center.lon()), (0.0, 0.0));
}

#[test]
fn nothing_resolvable_fails() {
    let list = entries(json!([{"address": "Atlantis"}, {"address": " "}]));
    let result = MapModel::build(&list, &gazetteer(), &MapConfig::default());
    assert!(matches!(result, Err(Error::NoMarkersToRender)));
}

#[test]
fn malformed_entries_rejected_at_parse() {
    let three: Result<Vec<PlaceEntry>, _> = serde_json::from_value(json!([{"coordinates": [1, 2, 3]}]));
    assert!(three.is_err());
    let neither: Result<Vec<PlaceEntry>, _> = serde_json::from_value(json!([{"label": "x"}]));
    assert!(neither.is_err());
}
