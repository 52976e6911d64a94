use clap::Parser;
use isoband::{
    create_isochrone, output, BandPolicy, Center, HullType, IsobandError, IsochroneConfig,
    NetworkType,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct IsobandArguments {
    #[arg(long, help = "path to file with isochrone run parameters (.toml or .json)")]
    config: Option<String>,
    #[arg(long, help = "OSM XML extract holding the street network")]
    osm_file: Option<PathBuf>,
    #[arg(long, help = "label for the mapped area")]
    place: Option<String>,
    #[arg(long, help = "walk, bike, drive, drive_service, all or all_private")]
    network_type: Option<NetworkType>,
    #[arg(long, help = "first trip time in minutes")]
    min_time: Option<u32>,
    #[arg(long, help = "trip times stop below this many minutes")]
    max_time: Option<u32>,
    #[arg(long, help = "minutes between trip times")]
    step: Option<u32>,
    #[arg(long, help = "travel speed in km/h")]
    travel_speed: Option<f64>,
    #[arg(long, requires = "lon", help = "latitude of the starting point")]
    lat: Option<f64>,
    #[arg(long, requires = "lat", help = "longitude of the starting point")]
    lon: Option<f64>,
    #[arg(long, help = "convex, concave or fast_concave")]
    hull_type: Option<HullType>,
    #[arg(long, help = "outermost or innermost")]
    band_policy: Option<BandPolicy>,
    #[arg(long, help = "keep disconnected parts of the street network")]
    retain_all: bool,
    #[arg(long, help = "write GeoJSON here instead of stdout")]
    output: Option<PathBuf>,
}

impl IsobandArguments {
    fn into_config(self) -> Result<(IsochroneConfig, Option<PathBuf>), IsobandError> {
        let mut conf = match &self.config {
            None => IsochroneConfig::default(),
            Some(f) => {
                log::info!("reading isochrone configuration from {f}");
                IsochroneConfig::try_from(f)?
            }
        };
        if let Some(osm_file) = self.osm_file {
            conf.osm_file = Some(osm_file);
        }
        if let Some(place) = self.place {
            conf.place = place;
        }
        if let Some(network_type) = self.network_type {
            conf.network_type = network_type;
        }
        if let Some(min_time) = self.min_time {
            conf.min_time = min_time;
        }
        if let Some(max_time) = self.max_time {
            conf.max_time = max_time;
        }
        if let Some(step) = self.step {
            conf.time_step = step;
        }
        if let Some(travel_speed) = self.travel_speed {
            conf.travel_speed = travel_speed;
        }
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            conf.center = Some(Center { lat, lon });
        }
        if let Some(hull_type) = self.hull_type {
            conf.hull_type = hull_type;
        }
        if let Some(band_policy) = self.band_policy {
            conf.band_policy = band_policy;
        }
        conf.retain_all |= self.retain_all;
        conf.validate()?;
        Ok((conf, self.output))
    }
}

pub fn run(args: IsobandArguments) -> Result<(), IsobandError> {
    let (conf, output_path) = args.into_config()?;
    let map = create_isochrone(&conf)?;
    let geojson = output::to_geojson_string(&map);
    match output_path {
        Some(path) => {
            std::fs::write(&path, geojson)?;
            log::info!("wrote isochrone map to {}", path.display());
        }
        None => println!("{geojson}"),
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let args = IsobandArguments::parse();
    if let Err(e) = run(args) {
        log::error!("isoband failed: {e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}
