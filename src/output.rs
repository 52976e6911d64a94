use crate::colors::EDGE_COLOR;
use crate::isochrone::IsochroneMap;

use geo::Polygon;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use serde_json::json;
use std::collections::HashSet;

pub fn polygon_to_geometry(polygon: &Polygon<f64>) -> Geometry {
    let ring = |coords: &geo::LineString<f64>| {
        coords
            .0
            .iter()
            .map(|coord| vec![coord.x, coord.y])
            .collect::<Vec<_>>()
    };
    let mut rings = vec![ring(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(ring));

    Geometry::new(Value::Polygon(rings))
}

fn feature(geometry: Geometry, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn properties(value: serde_json::Value) -> JsonObject {
    match value {
        serde_json::Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}

/// Street segments, colored nodes and band hulls of an isochrone map.
///
/// Band polygons come first, largest band first, then the street segments (two-way
/// streets appear once) and finally one point per reached node.
pub fn to_feature_collection(map: &IsochroneMap) -> FeatureCollection {
    let graph = &map.graph;
    let mut features = Vec::new();

    for band in &map.bands {
        features.push(feature(
            polygon_to_geometry(&band.polygon),
            properties(json!({
                "kind": "isochrone",
                "trip_time": band.trip_time,
                "color": band.color,
            })),
        ));
    }

    let mut drawn = HashSet::new();
    for edge in graph.raw_edges() {
        let (u, v) = (edge.source(), edge.target());
        if !drawn.insert((u.min(v), u.max(v))) {
            continue;
        }
        let line = vec![
            vec![graph[u].lon, graph[u].lat],
            vec![graph[v].lon, graph[v].lat],
        ];
        let mut props = properties(json!({
            "kind": "street",
            "osmid": edge.weight.id,
            "length": edge.weight.length,
            "travel_time": edge.weight.travel_time,
            "color": EDGE_COLOR,
        }));
        if let Some(name) = edge.weight.tag("name") {
            props.insert("name".to_string(), json!(name));
        }
        features.push(feature(Geometry::new(Value::LineString(line)), props));
    }

    for node in graph.node_indices() {
        let Some(color) = map.node_colors.get(&node) else {
            continue;
        };
        let osm_node = &graph[node];
        features.push(feature(
            Geometry::new(Value::Point(vec![osm_node.lon, osm_node.lat])),
            properties(json!({
                "kind": "node",
                "osmid": osm_node.id,
                "color": color,
                "trip_time": map.trip_time_of(node),
                "center": node == map.center,
            })),
        ));
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(properties(json!({
            "place": map.place,
            "network_type": map.network_type.as_str(),
            "travel_speed": map.travel_speed,
        }))),
    }
}

pub fn to_geojson_string(map: &IsochroneMap) -> String {
    GeoJson::FeatureCollection(to_feature_collection(map)).to_string()
}
