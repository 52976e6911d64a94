use crate::error::IsobandError;
use crate::graph::OsmTag;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Define an enum for network types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    Drive,
    DriveService,
    #[default]
    Walk,
    Bike,
    All,
    AllPrivate,
}

impl NetworkType {
    /// Walking networks ignore one-way restrictions.
    pub fn is_bidirectional(&self) -> bool {
        matches!(self, NetworkType::Walk)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Drive => "drive",
            NetworkType::DriveService => "drive_service",
            NetworkType::Walk => "walk",
            NetworkType::Bike => "bike",
            NetworkType::All => "all",
            NetworkType::AllPrivate => "all_private",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NetworkType {
    type Err = IsobandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "drive" => Ok(NetworkType::Drive),
            "drive_service" | "driveservice" => Ok(NetworkType::DriveService),
            "walk" => Ok(NetworkType::Walk),
            "bike" => Ok(NetworkType::Bike),
            "all" => Ok(NetworkType::All),
            "all_private" | "allprivate" => Ok(NetworkType::AllPrivate),
            _ => Err(IsobandError::InvalidNetworkType(s.to_string())),
        }
    }
}

// Overpass-style way filter for each network type
pub fn get_osm_filter(network_type: NetworkType) -> &'static str {
    match network_type {
        NetworkType::Drive => {
            "[\"highway\"][\"area\"!~\"yes\"][\"highway\"!~\"abandoned|bridleway|bus_guideway|construction|corridor|cycleway|elevator|escalator|footway|no|path|pedestrian|planned|platform|proposed|raceway|razed|service|steps|track\"][\"motor_vehicle\"!~\"no\"][\"motorcar\"!~\"no\"][\"service\"!~\"alley|driveway|emergency_access|parking|parking_aisle|private\"]"
        }
        NetworkType::DriveService => {
            "[\"highway\"][\"area\"!~\"yes\"][\"highway\"!~\"abandoned|bridleway|bus_guideway|construction|corridor|cycleway|elevator|escalator|footway|no|path|pedestrian|planned|platform|proposed|raceway|razed|steps|track\"][\"motor_vehicle\"!~\"no\"][\"motorcar\"!~\"no\"][\"service\"!~\"emergency_access|parking|parking_aisle|private\"]"
        }
        NetworkType::Walk => {
            "[\"highway\"][\"area\"!~\"yes\"][\"highway\"!~\"abandoned|bus_guideway|construction|cycleway|motor|no|planned|platform|proposed|raceway|razed\"][\"foot\"!~\"no\"][\"service\"!~\"private\"]"
        }
        NetworkType::Bike => {
            "[\"highway\"][\"area\"!~\"yes\"][\"highway\"!~\"abandoned|bus_guideway|construction|corridor|elevator|escalator|footway|motor|no|planned|platform|proposed|raceway|razed|steps\"][\"bicycle\"!~\"no\"][\"service\"!~\"private\"]"
        }
        NetworkType::All => {
            "[\"highway\"][\"area\"!~\"yes\"][\"highway\"!~\"abandoned|construction|no|planned|platform|proposed|raceway|razed\"][\"service\"!~\"private\"]"
        }
        NetworkType::AllPrivate => {
            "[\"highway\"][\"area\"!~\"yes\"][\"highway\"!~\"abandoned|construction|no|planned|platform|proposed|raceway|razed\"]"
        }
    }
}

fn tag_value<'a>(tags: &'a [OsmTag], key: &str) -> Option<&'a str> {
    tags.iter()
        .find(|tag| tag.key == key)
        .map(|tag| tag.value.as_str())
}

#[derive(Debug)]
enum TagClause {
    Exists(String),
    Matches(String, Regex),
    NotMatches(String, Regex),
}

impl TagClause {
    fn accepts(&self, tags: &[OsmTag]) -> bool {
        match self {
            TagClause::Exists(key) => tag_value(tags, key).is_some(),
            TagClause::Matches(key, re) => tag_value(tags, key).is_some_and(|v| re.is_match(v)),
            TagClause::NotMatches(key, re) => {
                !tag_value(tags, key).is_some_and(|v| re.is_match(v))
            }
        }
    }
}

/// An Overpass tag filter evaluated locally against way tags.
///
/// Regex clauses are unanchored, so `"motor"` excludes `motorway` as it does on the
/// Overpass server.
#[derive(Debug)]
pub struct WayFilter {
    clauses: Vec<TagClause>,
}

impl WayFilter {
    pub fn for_network(network_type: NetworkType) -> Result<WayFilter, IsobandError> {
        WayFilter::parse(get_osm_filter(network_type))
    }

    pub fn parse(filter: &str) -> Result<WayFilter, IsobandError> {
        let invalid = |reason: String| IsobandError::InvalidFilter {
            filter: filter.to_string(),
            reason,
        };
        let clause_re = Regex::new(r#"\["([^"]+)"(?:(!?~)"([^"]*)")?\]"#)
            .map_err(|e| invalid(e.to_string()))?;

        let mut clauses = Vec::new();
        let mut consumed = 0;
        for caps in clause_re.captures_iter(filter) {
            let whole = caps.get(0).ok_or_else(|| invalid("empty clause".to_string()))?;
            if whole.start() != consumed {
                return Err(invalid(format!("unexpected text at {}", consumed)));
            }
            consumed = whole.end();

            let key = caps[1].to_string();
            let clause = match (caps.get(2).map(|m| m.as_str()), caps.get(3)) {
                (None, _) => TagClause::Exists(key),
                (Some(op), Some(pattern)) => {
                    let re = Regex::new(pattern.as_str()).map_err(|e| invalid(e.to_string()))?;
                    if op == "~" {
                        TagClause::Matches(key, re)
                    } else {
                        TagClause::NotMatches(key, re)
                    }
                }
                (Some(op), None) => return Err(invalid(format!("missing pattern after {op}"))),
            };
            clauses.push(clause);
        }
        if consumed != filter.len() {
            return Err(invalid(format!("unexpected text at {}", consumed)));
        }

        Ok(WayFilter { clauses })
    }

    pub fn accepts(&self, tags: &[OsmTag]) -> bool {
        self.clauses.iter().all(|clause| clause.accepts(tags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Vec<OsmTag> {
        pairs
            .iter()
            .map(|(k, v)| OsmTag {
                key: k.to_string(),
                value: v.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_every_network_filter_parses() {
        for network_type in [
            NetworkType::Drive,
            NetworkType::DriveService,
            NetworkType::Walk,
            NetworkType::Bike,
            NetworkType::All,
            NetworkType::AllPrivate,
        ] {
            assert!(WayFilter::for_network(network_type).is_ok(), "{network_type}");
        }
    }

    #[test]
    fn test_walk_filter() {
        let walk = WayFilter::for_network(NetworkType::Walk).unwrap();
        assert!(walk.accepts(&tags(&[("highway", "residential")])));
        assert!(walk.accepts(&tags(&[("highway", "footway")])));
        assert!(!walk.accepts(&tags(&[("highway", "motorway")])));
        assert!(!walk.accepts(&tags(&[("highway", "cycleway")])));
        assert!(!walk.accepts(&tags(&[("highway", "residential"), ("foot", "no")])));
        assert!(!walk.accepts(&tags(&[("building", "yes")])));
    }

    #[test]
    fn test_drive_filter() {
        let drive = WayFilter::for_network(NetworkType::Drive).unwrap();
        assert!(drive.accepts(&tags(&[("highway", "primary")])));
        assert!(!drive.accepts(&tags(&[("highway", "footway")])));
        assert!(!drive.accepts(&tags(&[("highway", "service")])));
        assert!(!drive.accepts(&tags(&[("highway", "primary"), ("area", "yes")])));
        assert!(!drive.accepts(&tags(&[("highway", "primary"), ("motorcar", "no")])));
    }

    #[test]
    fn test_positive_match_clause() {
        let filter = WayFilter::parse("[\"highway\"~\"^(primary|secondary)$\"]").unwrap();
        assert!(filter.accepts(&tags(&[("highway", "primary")])));
        assert!(!filter.accepts(&tags(&[("highway", "tertiary")])));
        assert!(!filter.accepts(&tags(&[])));
    }

    #[test]
    fn test_malformed_filter_is_rejected() {
        assert!(WayFilter::parse("[\"highway\"] junk").is_err());
        assert!(WayFilter::parse("[\"highway\"!~\"(\"]").is_err());
    }

    #[test]
    fn test_network_type_from_str() {
        assert_eq!("Walk".parse::<NetworkType>().unwrap(), NetworkType::Walk);
        assert_eq!(
            "drive-service".parse::<NetworkType>().unwrap(),
            NetworkType::DriveService
        );
        assert!("boat".parse::<NetworkType>().is_err());
    }
}
