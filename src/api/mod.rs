pub mod alerts;
pub mod auth;
pub mod authority;
pub mod emergency;
pub mod gamification;
pub mod hazards;
pub mod sensor_data;
pub mod trips;

use crate::error::ApiError;
use crate::geo::Coordinates;
use crate::models::alert::AlertSeverity;

/// Boundary check for raw coordinate pairs; nothing past this point sees
/// NaN or out-of-range degrees.
pub(crate) fn valid_coords(latitude: f64, longitude: f64) -> Result<Coordinates, ApiError> {
    let coords = Coordinates::new(latitude, longitude);
    if !coords.is_valid() {
        return Err(ApiError::bad_request("Invalid coordinates"));
    }
    Ok(coords)
}

pub(crate) fn parse_severity(
    input: Option<&str>,
    default: AlertSeverity,
) -> Result<AlertSeverity, ApiError> {
    match input {
        None => Ok(default),
        Some(s) => AlertSeverity::parse(s).ok_or_else(|| {
            ApiError::bad_request(
                "Invalid severity. Must be one of: info, warning, critical, emergency",
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_pairs() {
        assert!(valid_coords(12.9, 77.6).is_ok());
        assert!(valid_coords(95.0, 77.6).is_err());
        assert!(valid_coords(12.9, 190.0).is_err());
        assert!(valid_coords(f64::NAN, 77.6).is_err());
    }

    #[test]
    fn severity_defaults_apply_only_when_absent() {
        assert_eq!(
            parse_severity(None, AlertSeverity::Warning).unwrap(),
            AlertSeverity::Warning
        );
        assert_eq!(
            parse_severity(Some("critical"), AlertSeverity::Warning).unwrap(),
            AlertSeverity::Critical
        );
        assert!(parse_severity(Some("high"), AlertSeverity::Warning).is_err());
    }
}
