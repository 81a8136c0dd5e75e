//! GeoJSON export

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value as GeoValue};
use serde_json::json;
use threat_map_wasm::{Palette, ThreatDataset};

/// One Point feature per country, `[lon, lat]` order per RFC 7946
pub fn to_feature_collection(dataset: &ThreatDataset, palette: &Palette) -> FeatureCollection {
    let features = dataset
        .countries
        .iter()
        .map(|c| {
            let severity = c.severity();
            let mut properties = JsonObject::new();
            properties.insert("name".to_string(), json!(c.name));
            properties.insert("risk".to_string(), json!(c.risk));
            properties.insert("cves".to_string(), json!(c.cves));
            properties.insert("severity".to_string(), json!(severity.label()));
            properties.insert("color".to_string(), json!(palette.color(severity)));

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(GeoValue::Point(vec![c.lon, c.lat]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
