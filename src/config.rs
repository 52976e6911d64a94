use crate::error::IsobandError;
use crate::isochrone::{BandPolicy, HullType, TripTimes};
use crate::network::NetworkType;
use crate::utils::validate_speed;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

/// defines one isochrone run
#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct IsochroneConfig {
    /// OSM XML extract holding the street network
    pub osm_file: Option<PathBuf>,
    /// label for the area covered by the extract
    pub place: String,
    pub network_type: NetworkType,
    /// first trip time in minutes
    pub min_time: u32,
    /// trip times stop below this many minutes
    pub max_time: u32,
    pub time_step: u32,
    /// km/h
    pub travel_speed: f64,
    /// start here instead of the network's centroid
    pub center: Option<Center>,
    pub hull_type: HullType,
    pub band_policy: BandPolicy,
    /// keep disconnected pieces of the network
    pub retain_all: bool,
    pub use_cache: bool,
}

impl Default for IsochroneConfig {
    fn default() -> Self {
        Self {
            osm_file: None,
            place: String::from("Toronto, Ontario, Canada"),
            network_type: NetworkType::Walk,
            min_time: 0,
            max_time: 30,
            time_step: 5,
            travel_speed: 4.5,
            center: None,
            hull_type: HullType::Convex,
            band_policy: BandPolicy::Outermost,
            retain_all: false,
            use_cache: true,
        }
    }
}

impl IsochroneConfig {
    pub fn trip_times(&self) -> Result<TripTimes, IsobandError> {
        TripTimes::from_range(self.min_time, self.max_time, self.time_step)
    }

    pub fn validate(&self) -> Result<(), IsobandError> {
        validate_speed(self.travel_speed)?;
        self.trip_times()?;
        if self.osm_file.is_none() {
            return Err(IsobandError::ConfigurationError(
                "no OSM file given".to_string(),
            ));
        }
        Ok(())
    }
}

impl TryFrom<&String> for IsochroneConfig {
    type Error = IsobandError;

    fn try_from(f: &String) -> Result<Self, Self::Error> {
        let read = || {
            std::fs::read_to_string(f).map_err(|e| {
                IsobandError::ConfigurationError(format!("failure reading {f}: {e}"))
            })
        };
        if f.ends_with(".toml") {
            toml::from_str(&read()?).map_err(|e| {
                IsobandError::ConfigurationError(format!("failure decoding {f}: {e}"))
            })
        } else if f.ends_with(".json") {
            serde_json::from_str(&read()?).map_err(|e| {
                IsobandError::ConfigurationError(format!("failure decoding {f}: {e}"))
            })
        } else {
            Err(IsobandError::ConfigurationError(format!(
                "unsupported file type: {f}"
            )))
        }
    }
}
