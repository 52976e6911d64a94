use thiserror::Error;

#[derive(Error, Debug)]
pub enum IsobandError {
    #[error("failure reading run configuration: {0}")]
    ConfigurationError(String),
    #[error("invalid network type: {0}")]
    InvalidNetworkType(String),
    #[error("invalid hull type: {0}")]
    InvalidHullType(String),
    #[error("invalid band policy: {0}")]
    InvalidBandPolicy(String),
    #[error("travel speed must be a positive number of km/h, found {0}")]
    InvalidTravelSpeed(f64),
    #[error("invalid trip times: {0}")]
    InvalidTripTimes(String),
    #[error("invalid OSM filter {filter}: {reason}")]
    InvalidFilter { filter: String, reason: String },
    #[error("street network for {0} has no nodes")]
    EmptyNetwork(String),
    #[error("failure reading OSM data: {source}")]
    StdIoError {
        #[from]
        source: std::io::Error,
    },
    #[error("failure decoding OSM XML: {source}")]
    XmlError {
        #[from]
        source: quick_xml::DeError,
    },
    #[error("failure encoding JSON: {source}")]
    SerdeJsonError {
        #[from]
        source: serde_json::Error,
    },
}
