use crate::cache;
use crate::colors;
use crate::config::IsochroneConfig;
use crate::error::IsobandError;
use crate::graph::{self, StreetNetwork};
use crate::network::NetworkType;

use geo::{ConcaveHull, ConvexHull, KNearestConcaveHull, MultiPoint, Point, Polygon};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::str::FromStr;

/// Hex color assigned to each reached node.
pub type NodeColors = HashMap<NodeIndex, String>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HullType {
    FastConcave,
    Concave,
    #[default]
    Convex,
}

impl FromStr for HullType {
    type Err = IsobandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fast_concave" | "fastconcave" => Ok(HullType::FastConcave),
            "concave" => Ok(HullType::Concave),
            "convex" => Ok(HullType::Convex),
            _ => Err(IsobandError::InvalidHullType(s.to_string())),
        }
    }
}

/// Which band a node reached by several thresholds is colored with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandPolicy {
    /// The largest threshold is written first and never overwritten.
    #[default]
    Outermost,
    /// Every smaller threshold overwrites, leaving the tightest band.
    Innermost,
}

impl FromStr for BandPolicy {
    type Err = IsobandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "outermost" => Ok(BandPolicy::Outermost),
            "innermost" => Ok(BandPolicy::Innermost),
            _ => Err(IsobandError::InvalidBandPolicy(s.to_string())),
        }
    }
}

/// Trip time thresholds in minutes, without duplicates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TripTimes(Vec<f64>);

impl TripTimes {
    pub fn new(mut values: Vec<f64>) -> Result<TripTimes, IsobandError> {
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(IsobandError::InvalidTripTimes(format!(
                "{bad} is not a non-negative number of minutes"
            )));
        }
        values.sort_by(f64::total_cmp);
        values.dedup();
        Ok(TripTimes(values))
    }

    /// `start, start + step, ...` strictly below `end`.
    pub fn from_range(start: u32, end: u32, step: u32) -> Result<TripTimes, IsobandError> {
        if step == 0 {
            return Err(IsobandError::InvalidTripTimes(
                "time step must be at least one minute".to_string(),
            ));
        }
        let values = (start..end).step_by(step as usize).map(f64::from).collect();
        TripTimes::new(values)
    }

    pub fn descending(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().rev().copied()
    }

    pub fn largest(&self) -> Option<f64> {
        self.0.last().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// One plasma color per threshold, darkest for the largest.
    pub fn band_colors(&self) -> Vec<(f64, String)> {
        self.descending()
            .zip(colors::get_colors(self.len(), 0.0))
            .collect()
    }
}

#[derive(Copy, Clone, Debug)]
struct Visit {
    cost: f64,
    node: NodeIndex,
}

impl PartialEq for Visit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Visit {}

impl PartialOrd for Visit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Visit {
    // reversed so the heap pops the cheapest visit
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Shortest cumulative cost from `start` to every node within `cutoff`, boundary included.
pub fn bounded_dijkstra<N, E, F>(
    graph: &DiGraph<N, E>,
    start: NodeIndex,
    cutoff: f64,
    mut edge_cost: F,
) -> HashMap<NodeIndex, f64>
where
    F: FnMut(&E) -> f64,
{
    let mut best: HashMap<NodeIndex, f64> = HashMap::new();
    if graph.node_weight(start).is_none() || cutoff.is_nan() || cutoff < 0.0 {
        return best;
    }
    let mut settled: HashSet<NodeIndex> = HashSet::new();
    let mut next = BinaryHeap::new();
    best.insert(start, 0.0);
    next.push(Visit { cost: 0.0, node: start });

    while let Some(Visit { cost, node }) = next.pop() {
        if !settled.insert(node) {
            continue;
        }
        for edge in graph.edges(node) {
            let other = edge.target();
            if settled.contains(&other) {
                continue;
            }
            let other_cost = cost + edge_cost(edge.weight());
            if other_cost > cutoff {
                continue;
            }
            let improved = best.get(&other).map_or(true, |&known| other_cost < known);
            if improved {
                best.insert(other, other_cost);
                next.push(Visit { cost: other_cost, node: other });
            }
        }
    }

    best
}

/// Nodes within `radius` minutes of `center` along the street network.
pub fn ego_graph(graph: &StreetNetwork, center: NodeIndex, radius: f64) -> HashSet<NodeIndex> {
    bounded_dijkstra(graph, center, radius, |way| way.travel_time)
        .into_keys()
        .collect()
}

/// Band assignment of every reached node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeBands {
    pub colors: NodeColors,
    /// Threshold whose color the node carries.
    pub trip_times: HashMap<NodeIndex, f64>,
}

impl NodeBands {
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Assigns each node of `reach_times` the band of a threshold that reaches it.
///
/// Thresholds are visited from largest to smallest, paired with `colors` in that order.
/// Under [`BandPolicy::Outermost`] a node keeps the first band it receives, so the
/// largest threshold reaching it wins. Unreached nodes are absent from the result.
pub fn band_nodes(
    reach_times: &HashMap<NodeIndex, f64>,
    trip_times: &TripTimes,
    colors: &[String],
    policy: BandPolicy,
) -> Result<NodeBands, IsobandError> {
    if colors.len() != trip_times.len() {
        return Err(IsobandError::InvalidTripTimes(format!(
            "{} trip times but {} colors",
            trip_times.len(),
            colors.len()
        )));
    }

    let mut node_bands = NodeBands::default();
    for (trip_time, color) in trip_times.descending().zip(colors) {
        let subgraph = reach_times
            .iter()
            .filter(|(_, &time)| time <= trip_time)
            .map(|(&node, _)| node);
        for node in subgraph {
            let assigned = node_bands.colors.contains_key(&node);
            if policy == BandPolicy::Innermost || !assigned {
                node_bands.colors.insert(node, color.clone());
                node_bands.trip_times.insert(node, trip_time);
            }
        }
    }

    Ok(node_bands)
}

/// Colors every node reached within a threshold with that threshold's color.
///
/// Runs one search out to the largest threshold, then [`band_nodes`].
pub fn color_nodes<N, E, F>(
    graph: &DiGraph<N, E>,
    center: NodeIndex,
    trip_times: &TripTimes,
    colors: &[String],
    policy: BandPolicy,
    edge_cost: F,
) -> Result<NodeBands, IsobandError>
where
    F: FnMut(&E) -> f64,
{
    let reach_times = match trip_times.largest() {
        Some(largest) => bounded_dijkstra(graph, center, largest, edge_cost),
        None => HashMap::new(),
    };
    band_nodes(&reach_times, trip_times, colors, policy)
}

/// The area reachable within one trip time.
#[derive(Debug, Clone)]
pub struct IsochroneBand {
    pub trip_time: f64,
    pub color: String,
    pub polygon: Polygon<f64>,
}

/// Hull polygons around the nodes of each band, from the travel times of a search out
/// to the largest band. Bands with fewer than three nodes have no area and are left out.
pub fn calculate_isochrones(
    graph: &StreetNetwork,
    reach_times: &HashMap<NodeIndex, f64>,
    band_colors: &[(f64, String)],
    hull_type: HullType,
) -> Vec<IsochroneBand> {
    let mut isochrones = Vec::new();
    for (trip_time, color) in band_colors {
        let isochrone_points = reach_times
            .iter()
            .filter(|(_, &time)| time <= *trip_time)
            .map(|(&node_index, _)| {
                let (lat, lon) = graph::node_to_latlon(graph, node_index);
                Point::new(lon, lat)
            })
            .collect::<Vec<_>>();
        if isochrone_points.len() < 3 {
            log::debug!("band {trip_time} reaches too few nodes for a hull");
            continue;
        }

        let points: MultiPoint<f64> = isochrone_points.into();
        let polygon = match hull_type {
            HullType::FastConcave => points.concave_hull(2.0),
            HullType::Concave => points.k_nearest_concave_hull(3),
            HullType::Convex => points.convex_hull(),
        };

        isochrones.push(IsochroneBand {
            trip_time: *trip_time,
            color: color.clone(),
            polygon,
        });
    }

    isochrones
}

/// A banded street network, ready to be written out.
#[derive(Debug, Clone)]
pub struct IsochroneMap {
    pub place: String,
    pub network_type: NetworkType,
    pub travel_speed: f64,
    pub graph: StreetNetwork,
    pub center: NodeIndex,
    pub band_colors: Vec<(f64, String)>,
    pub node_colors: NodeColors,
    pub node_trip_times: HashMap<NodeIndex, f64>,
    pub bands: Vec<IsochroneBand>,
}

impl IsochroneMap {
    /// Color of every graph node in index order, `None` for unreached nodes.
    pub fn node_color_list(&self) -> Vec<Option<&str>> {
        self.graph
            .node_indices()
            .map(|node| self.node_colors.get(&node).map(String::as_str))
            .collect()
    }

    /// Trip time of the band a node was assigned to.
    pub fn trip_time_of(&self, node: NodeIndex) -> Option<f64> {
        self.node_trip_times.get(&node).copied()
    }
}

fn load_street_network(config: &IsochroneConfig) -> Result<StreetNetwork, IsobandError> {
    let osm_file = config.osm_file.as_ref().ok_or_else(|| {
        IsobandError::ConfigurationError("no OSM file given".to_string())
    })?;
    let key = cache::cache_key(osm_file, config.network_type, config.retain_all);

    if config.use_cache {
        if let Some(graph) = cache::check_cache(&key) {
            log::info!("using cached {} network for {}", config.network_type, osm_file.display());
            return Ok(graph);
        }
    }

    let graph = graph::load_network(osm_file, config.network_type, config.retain_all)?;
    if config.use_cache {
        cache::insert_into_cache(key, graph.clone());
    }
    Ok(graph)
}

/// Loads the network, bands it around the center and builds the band hulls.
pub fn create_isochrone(config: &IsochroneConfig) -> Result<IsochroneMap, IsobandError> {
    let trip_times = config.trip_times()?;
    let mut graph = load_street_network(config)?;

    let center = match config.center {
        Some(center) => graph::nearest_node(&graph, center.lat, center.lon),
        None => graph::center_node(&graph),
    }
    .ok_or_else(|| IsobandError::EmptyNetwork(config.place.clone()))?;

    graph::assign_travel_times(&mut graph, config.travel_speed)?;

    let reach_times = match trip_times.largest() {
        Some(largest) => bounded_dijkstra(&graph, center, largest, |way| way.travel_time),
        None => HashMap::new(),
    };

    let band_colors = trip_times.band_colors();
    let colors: Vec<String> = band_colors.iter().map(|(_, c)| c.clone()).collect();
    let node_bands = band_nodes(&reach_times, &trip_times, &colors, config.band_policy)?;
    log::info!(
        "{} of {} nodes reached within {:?} minutes",
        node_bands.len(),
        graph.node_count(),
        trip_times.largest()
    );

    let bands = calculate_isochrones(&graph, &reach_times, &band_colors, config.hull_type);

    Ok(IsochroneMap {
        place: config.place.clone(),
        network_type: config.network_type,
        travel_speed: config.travel_speed,
        graph,
        center,
        band_colors,
        node_colors: node_bands.colors,
        node_trip_times: node_bands.trip_times,
        bands,
    })
}
