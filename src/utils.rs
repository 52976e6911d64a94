use crate::error::IsobandError;

pub fn calculate_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let radius_earth = 6371000.0; // Radius of the Earth in meters

    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();

    let a = (dlat / 2.0).sin().powi(2) + (dlon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
    let c = 2.0 * a.sqrt().asin();

    radius_earth * c // Distance in meters
}

/// Rejects speeds a traveler cannot move at.
pub fn validate_speed(speed_kph: f64) -> Result<f64, IsobandError> {
    if speed_kph.is_finite() && speed_kph > 0.0 {
        Ok(speed_kph)
    } else {
        Err(IsobandError::InvalidTravelSpeed(speed_kph))
    }
}

// km per hour to m per minute
pub fn meters_per_minute(speed_kph: f64) -> f64 {
    speed_kph * 1000.0 / 60.0
}

pub fn travel_time_minutes(length: f64, speed_kph: f64) -> f64 {
    length / meters_per_minute(speed_kph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pace_conversion() {
        assert_eq!(meters_per_minute(6.0), 100.0);
        assert_eq!(travel_time_minutes(250.0, 6.0), 2.5);
    }

    #[test]
    fn test_distance_of_one_degree_latitude() {
        let d = calculate_distance(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 1.0, "{d}");
        assert_eq!(calculate_distance(43.65, -79.38, 43.65, -79.38), 0.0);
    }

    #[test]
    fn test_validate_speed() {
        assert!(validate_speed(4.5).is_ok());
        assert!(validate_speed(0.0).is_err());
        assert!(validate_speed(-3.0).is_err());
        assert!(validate_speed(f64::NAN).is_err());
    }
}
