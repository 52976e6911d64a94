pub mod cache;
pub mod colors;
pub mod config;
pub mod error;
pub mod graph;
pub mod isochrone;
pub mod network;
pub mod output;
pub mod utils;

pub use config::{Center, IsochroneConfig};
pub use error::IsobandError;
pub use isochrone::{create_isochrone, BandPolicy, HullType, IsochroneMap, TripTimes};
pub use network::NetworkType;

#[cfg(feature = "python")]
mod python {
    use crate::{create_isochrone, output, IsochroneConfig, IsobandError, NetworkType};
    use pyo3::prelude::*;
    use std::path::PathBuf;

    fn to_py_err(err: IsobandError) -> PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }

    /// Colors the street network in an OSM extract by travel time and returns GeoJSON
    #[pyfunction]
    fn calc_isochrone_map(
        osm_file: String,
        network_type: String,
        min_time: u32,
        max_time: u32,
        travel_speed: f64,
    ) -> PyResult<String> {
        let network_type: NetworkType = network_type.parse().map_err(to_py_err)?;
        let config = IsochroneConfig {
            osm_file: Some(PathBuf::from(osm_file)),
            network_type,
            min_time,
            max_time,
            travel_speed,
            ..Default::default()
        };
        config.validate().map_err(to_py_err)?;
        let map = create_isochrone(&config).map_err(to_py_err)?;
        Ok(output::to_geojson_string(&map))
    }

    /// Python module for banding street networks by travel time
    #[pymodule]
    fn isoband(_py: Python, m: &PyModule) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(calc_isochrone_map, m)?)?;
        Ok(())
    }
}
