use isoband::graph::StreetNetwork;
use isoband::{
    create_isochrone, output, BandPolicy, Center, IsobandError, IsochroneConfig, IsochroneMap,
    NetworkType,
};
use petgraph::graph::NodeIndex;
use std::path::PathBuf;

fn grid_osm() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("grid.osm")
}

/// 3x3 grid of 111 m blocks walked at 6 km/h, so one block takes about 1.1 minutes.
/// Trip times are 0, 2 and 4 minutes.
fn grid_config() -> IsochroneConfig {
    IsochroneConfig {
        osm_file: Some(grid_osm()),
        place: "Grid".to_string(),
        network_type: NetworkType::Walk,
        min_time: 0,
        max_time: 6,
        time_step: 2,
        travel_speed: 6.0,
        ..Default::default()
    }
}

fn node_by_osmid(graph: &StreetNetwork, osmid: i64) -> NodeIndex {
    graph
        .node_indices()
        .find(|&n| graph[n].id == osmid)
        .unwrap()
}

fn color_of(map: &IsochroneMap, osmid: i64) -> Option<&str> {
    map.node_colors
        .get(&node_by_osmid(&map.graph, osmid))
        .map(String::as_str)
}

fn color_for_trip_time(map: &IsochroneMap, trip_time: f64) -> &str {
    map.band_colors
        .iter()
        .find(|(t, _)| *t == trip_time)
        .map(|(_, c)| c.as_str())
        .unwrap()
}

#[test]
fn test_centroid_start_and_largest_component() {
    let map = create_isochrone(&grid_config()).unwrap();
    assert_eq!(map.graph.node_count(), 9);
    assert_eq!(map.graph[map.center].id, 5);
    assert_eq!(map.band_colors.len(), 3);
}

#[test]
fn test_outermost_colors_everything_with_largest_band() {
    let map = create_isochrone(&grid_config()).unwrap();
    let outer = color_for_trip_time(&map, 4.0);
    for osmid in 1..=9 {
        assert_eq!(color_of(&map, osmid), Some(outer), "node {osmid}");
    }
}

#[test]
fn test_innermost_rings() {
    let conf = IsochroneConfig {
        band_policy: BandPolicy::Innermost,
        ..grid_config()
    };
    let map = create_isochrone(&conf).unwrap();
    assert_eq!(color_of(&map, 5), Some(color_for_trip_time(&map, 0.0)));
    for osmid in [2, 4, 6, 8] {
        assert_eq!(color_of(&map, osmid), Some(color_for_trip_time(&map, 2.0)));
    }
    for osmid in [1, 3, 7, 9] {
        assert_eq!(color_of(&map, osmid), Some(color_for_trip_time(&map, 4.0)));
    }
    assert_eq!(map.trip_time_of(node_by_osmid(&map.graph, 5)), Some(0.0));
    assert_eq!(map.trip_time_of(node_by_osmid(&map.graph, 2)), Some(2.0));
    assert_eq!(map.trip_time_of(node_by_osmid(&map.graph, 9)), Some(4.0));
}

#[test]
fn test_minute_bands_keep_their_own_trip_time() {
    // 300 one-minute bands share far fewer distinct palette colors
    let conf = IsochroneConfig {
        max_time: 300,
        time_step: 1,
        band_policy: BandPolicy::Innermost,
        ..grid_config()
    };
    let map = create_isochrone(&conf).unwrap();
    assert_eq!(map.band_colors.len(), 300);
    // a block is about 1.1 minutes, so edges land in band 2 and corners in band 3
    assert_eq!(map.trip_time_of(node_by_osmid(&map.graph, 5)), Some(0.0));
    for osmid in [2, 4, 6, 8] {
        assert_eq!(map.trip_time_of(node_by_osmid(&map.graph, osmid)), Some(2.0));
    }
    for osmid in [1, 3, 7, 9] {
        assert_eq!(map.trip_time_of(node_by_osmid(&map.graph, osmid)), Some(3.0));
    }
}

#[test]
fn test_drive_network_follows_oneway() {
    let conf = IsochroneConfig {
        network_type: NetworkType::Drive,
        max_time: 3,
        time_step: 2,
        ..grid_config()
    };
    let map = create_isochrone(&conf).unwrap();
    assert_eq!(map.graph[map.center].id, 5);
    let mut reached: Vec<i64> = map
        .node_colors
        .keys()
        .map(|&n| map.graph[n].id)
        .collect();
    reached.sort();
    // Centre Street runs one way from 4 towards 6
    assert_eq!(reached, vec![2, 5, 6, 8]);
}

#[test]
fn test_explicit_center_and_retain_all() {
    let conf = IsochroneConfig {
        center: Some(Center { lat: 0.0, lon: 0.0 }),
        retain_all: true,
        ..grid_config()
    };
    let map = create_isochrone(&conf).unwrap();
    assert_eq!(map.graph.node_count(), 11);
    assert_eq!(map.graph[map.center].id, 1);
    assert_eq!(color_of(&map, 50), None);
    assert_eq!(color_of(&map, 9), None);
}

#[test]
fn test_empty_time_range_leaves_nodes_uncolored() {
    let conf = IsochroneConfig {
        min_time: 10,
        max_time: 10,
        ..grid_config()
    };
    let map = create_isochrone(&conf).unwrap();
    assert!(map.node_colors.is_empty());
    assert!(map.bands.is_empty());
    assert!(map.node_color_list().iter().all(Option::is_none));
}

#[test]
fn test_geojson_artifact() {
    let map = create_isochrone(&grid_config()).unwrap();
    let collection = output::to_feature_collection(&map);
    let nodes = collection
        .features
        .iter()
        .filter(|f| f.property("kind") == Some(&serde_json::json!("node")))
        .count();
    let streets = collection
        .features
        .iter()
        .filter(|f| f.property("kind") == Some(&serde_json::json!("street")))
        .count();
    assert_eq!(nodes, 9);
    assert_eq!(streets, 12);
}

#[test]
fn test_missing_file_is_an_io_error() {
    let conf = IsochroneConfig {
        osm_file: Some(PathBuf::from("does/not/exist.osm")),
        use_cache: false,
        ..grid_config()
    };
    assert!(matches!(
        create_isochrone(&conf),
        Err(IsobandError::StdIoError { .. })
    ));
}

#[test]
fn test_invalid_speed_is_rejected() {
    let conf = IsochroneConfig {
        travel_speed: -1.0,
        ..grid_config()
    };
    assert!(matches!(
        create_isochrone(&conf),
        Err(IsobandError::InvalidTravelSpeed(_))
    ));
}
