use crate::error::IsobandError;
use crate::network::{NetworkType, WayFilter};
use crate::utils::{calculate_distance, travel_time_minutes, validate_speed};

use geo::{Centroid, MultiPoint, Point};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Street network: OSM nodes joined by directed way segments.
pub type StreetNetwork = DiGraph<OsmNode, OsmWay>;

#[derive(Debug, Deserialize)]
pub struct OsmData {
    #[serde(rename = "node", default)]
    pub nodes: Vec<OsmNode>,
    #[serde(rename = "way", default)]
    pub ways: Vec<OsmWay>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OsmNode {
    #[serde(rename = "@id")]
    pub id: i64,
    #[serde(rename = "@lat")]
    pub lat: f64,
    #[serde(rename = "@lon")]
    pub lon: f64,
    #[serde(rename = "tag", default)]
    pub tags: Vec<OsmTag>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OsmWay {
    #[serde(rename = "@id")]
    pub id: i64,
    #[serde(rename = "nd", default)]
    pub nodes: Vec<OsmNodeRef>,
    #[serde(rename = "tag", default)]
    pub tags: Vec<OsmTag>,
    /// Segment length in meters.
    #[serde(default)]
    pub length: f64,
    /// Minutes needed to traverse the segment, see [`assign_travel_times`].
    #[serde(default)]
    pub travel_time: f64,
}

impl OsmWay {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.key == key)
            .map(|tag| tag.value.as_str())
    }

    pub fn filter_useful_tags(&self) -> OsmWay {
        let useful_tags_way: HashSet<&str> = [
            "bridge",
            "tunnel",
            "oneway",
            "lanes",
            "ref",
            "name",
            "highway",
            "maxspeed",
            "service",
            "access",
            "area",
            "landuse",
            "width",
            "est_width",
            "junction",
        ]
        .iter()
        .copied()
        .collect();

        let filtered_tags: Vec<OsmTag> = self
            .tags
            .iter()
            .filter(|tag| useful_tags_way.contains(tag.key.as_str()))
            .cloned()
            .collect();

        OsmWay {
            tags: filtered_tags,
            nodes: Vec::new(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OsmNodeRef {
    #[serde(rename = "@ref")]
    pub node_id: i64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OsmTag {
    #[serde(rename = "@k")]
    pub key: String,
    #[serde(rename = "@v")]
    pub value: String,
}

pub fn parse_xml(xml_data: &str) -> Result<OsmData, IsobandError> {
    let root: OsmData = quick_xml::de::from_str(xml_data)?;
    Ok(root)
}

/// Reads an OSM XML extract and builds the street network for one travel mode.
pub fn load_network(
    path: &Path,
    network_type: NetworkType,
    retain_all: bool,
) -> Result<StreetNetwork, IsobandError> {
    log::info!("reading {network_type} network from {}", path.display());
    let xml = std::fs::read_to_string(path)?;
    let parsed = parse_xml(&xml)?;
    log::debug!(
        "parsed {} nodes and {} ways",
        parsed.nodes.len(),
        parsed.ways.len()
    );
    let graph = create_graph(parsed.nodes, parsed.ways, network_type, retain_all)?;
    if graph.node_count() == 0 {
        return Err(IsobandError::EmptyNetwork(path.display().to_string()));
    }
    Ok(graph)
}

// Function checks whether a path is one way
fn is_path_one_way(path: &OsmWay, bidirectional: bool) -> bool {
    let oneway_values = ["yes", "true", "1", "-1", "reverse", "T", "F"];

    if bidirectional {
        return false;
    }

    if let Some(oneway) = path.tag("oneway") {
        return oneway_values.contains(&oneway);
    }

    // Roundabouts are implicitly one way
    if let Some(junction) = path.tag("junction") {
        return junction == "roundabout";
    }

    false
}

fn is_path_reversed(path: &OsmWay) -> bool {
    let reversed_values = ["-1", "reverse", "T"];
    path.tag("oneway")
        .is_some_and(|oneway| reversed_values.contains(&oneway))
}

/// Builds the street network of `network_type` from parsed OSM elements.
///
/// Only nodes referenced by a kept way become graph nodes. Unless `retain_all` is set the
/// result is reduced to its largest weakly connected component.
pub fn create_graph(
    nodes: Vec<OsmNode>,
    ways: Vec<OsmWay>,
    network_type: NetworkType,
    retain_all: bool,
) -> Result<StreetNetwork, IsobandError> {
    let filter = WayFilter::for_network(network_type)?;
    let bidirectional = network_type.is_bidirectional();

    let nodes_by_id: HashMap<i64, OsmNode> = nodes.into_iter().map(|n| (n.id, n)).collect();
    let mut graph = StreetNetwork::new();
    let mut node_index_map: HashMap<i64, NodeIndex> = HashMap::new();

    for way in ways.iter().filter(|way| filter.accepts(&way.tags)) {
        let edge_data = way.filter_useful_tags();
        let is_one_way = is_path_one_way(&edge_data, bidirectional);
        let is_reversed = !bidirectional && is_path_reversed(&edge_data);

        for window in way.nodes.windows(2) {
            let [start_ref, end_ref] = window else {
                continue;
            };
            let (Some(start_node), Some(end_node)) = (
                nodes_by_id.get(&start_ref.node_id),
                nodes_by_id.get(&end_ref.node_id),
            ) else {
                log::warn!(
                    "way {} references a missing node ({} or {}), skipping segment",
                    way.id,
                    start_ref.node_id,
                    end_ref.node_id
                );
                continue;
            };
            let mut index_of = |node: &OsmNode| -> NodeIndex {
                *node_index_map
                    .entry(node.id)
                    .or_insert_with(|| graph.add_node(node.clone()))
            };
            let (start_index, end_index) = (index_of(start_node), index_of(end_node));
            let (start_index, end_index) = if is_reversed {
                (end_index, start_index)
            } else {
                (start_index, end_index)
            };

            graph.add_edge(start_index, end_index, edge_data.clone());
            if !is_one_way {
                graph.add_edge(end_index, start_index, edge_data.clone());
            }
        }
    }

    add_edge_lengths(&mut graph);

    if !retain_all {
        graph = largest_component(&graph);
    }

    log::info!(
        "built {network_type} network with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Keeps the largest weakly connected component.
pub fn largest_component(graph: &StreetNetwork) -> StreetNetwork {
    let mut components = UnionFind::new(graph.node_count());
    for edge in graph.raw_edges() {
        components.union(edge.source().index(), edge.target().index());
    }
    let labels = components.into_labeling();

    let mut sizes = vec![0usize; labels.len()];
    for &label in &labels {
        sizes[label] += 1;
    }
    let Some(largest) = sizes
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
        .map(|(label, _)| label)
    else {
        return graph.clone();
    };

    graph.filter_map(
        |index, node| (labels[index.index()] == largest).then(|| node.clone()),
        |_, way| Some(way.clone()),
    )
}

fn add_edge_lengths(graph: &mut StreetNetwork) {
    for edge in graph.edge_indices() {
        let Some((start_index, end_index)) = graph.edge_endpoints(edge) else {
            continue;
        };
        let start_node = &graph[start_index];
        let end_node = &graph[end_index];

        let distance =
            calculate_distance(start_node.lat, start_node.lon, end_node.lat, end_node.lon);

        graph[edge].length = distance;
    }
}

/// Sets every edge's `travel_time` (minutes) for a constant speed in km/h.
pub fn assign_travel_times(graph: &mut StreetNetwork, speed_kph: f64) -> Result<(), IsobandError> {
    let speed_kph = validate_speed(speed_kph)?;
    for way in graph.edge_weights_mut() {
        way.travel_time = travel_time_minutes(way.length, speed_kph);
    }
    Ok(())
}

pub fn node_to_latlon(graph: &StreetNetwork, node_index: NodeIndex) -> (f64, f64) {
    let node = &graph[node_index];
    (node.lat, node.lon)
}

pub fn nearest_node(graph: &StreetNetwork, lat: f64, lon: f64) -> Option<NodeIndex> {
    graph.node_indices().min_by(|&a, &b| {
        let node_a = &graph[a];
        let node_b = &graph[b];
        let dist_a = calculate_distance(node_a.lat, node_a.lon, lat, lon);
        let dist_b = calculate_distance(node_b.lat, node_b.lon, lat, lon);
        dist_a
            .partial_cmp(&dist_b)
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

/// Node closest to the centroid of all network nodes.
pub fn center_node(graph: &StreetNetwork) -> Option<NodeIndex> {
    let points: MultiPoint<f64> = graph
        .raw_nodes()
        .iter()
        .map(|node| Point::new(node.weight.lon, node.weight.lat))
        .collect::<Vec<_>>()
        .into();
    let centroid = points.centroid()?;
    nearest_node(graph, centroid.y(), centroid.x())
}
