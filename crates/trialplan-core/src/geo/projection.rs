//! UTM zones on the WGS 84 ellipsoid
//!
//! The transverse Mercator math is done by `proj4rs`. This module picks the
//! zone, including the Norway and Svalbard exceptions, and applies the sign
//! convention for the southern hemisphere: the false-northed value is negated,
//! so a point at 10°S has a north value of about -8 894 000.

use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::diagnostics::Warning;
use crate::error::{Result, TrialplanError};

/// Equatorial circumference used by the east-only zone estimate, in metres
pub const EARTH_CIRCUMFERENCE: f64 = 40_075_017.0;

pub const MIN_ZONE: i32 = 1;
pub const MAX_ZONE: i32 = 60;

const GEOGRAPHIC: &str = "+proj=longlat +ellps=WGS84 +no_defs";

/// A projected position: east/north in metres plus its zone number
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub east: f64,
    pub north: f64,
    pub zone: i32,
}

fn build_proj(definition: &str) -> Result<Proj> {
    Proj::from_proj_string(definition).map_err(|e| TrialplanError::InvalidCoordinate {
        value: definition.to_string(),
        reason: format!("Failed to create projection: {}", e),
    })
}

fn utm_proj(zone: i32, south: bool) -> Result<Proj> {
    let hemisphere = if south { " +south" } else { "" };
    build_proj(&format!("+proj=utm +zone={}{} +ellps=WGS84 +units=m +no_defs", zone, hemisphere))
}

fn run(from: &Proj, to: &Proj, point: (f64, f64)) -> Result<(f64, f64)> {
    let mut point = (point.0, point.1, 0.0);
    transform(from, to, &mut point).map_err(|e| TrialplanError::InvalidCoordinate {
        value: format!("({}, {})", point.0, point.1),
        reason: format!("Projection failed: {}", e),
    })?;
    Ok((point.0, point.1))
}

/// Check that a latitude/longitude pair lies in the valid geographic range
pub fn check_geographic(latitude: f64, longitude: f64) -> Result<()> {
    if !latitude.is_finite() || latitude.abs() > 90.0 {
        return Err(TrialplanError::InvalidCoordinate {
            value: format!("latitude {}", latitude),
            reason: "latitude must be within -90..=90 degrees".to_string(),
        });
    }
    if !longitude.is_finite() || longitude.abs() > 180.0 {
        return Err(TrialplanError::InvalidCoordinate {
            value: format!("longitude {}", longitude),
            reason: "longitude must be within -180..=180 degrees".to_string(),
        });
    }
    Ok(())
}

pub fn check_zone(zone: i32) -> Result<()> {
    if !(MIN_ZONE..=MAX_ZONE).contains(&zone) {
        return Err(TrialplanError::InvalidCoordinate {
            value: format!("zone {}", zone),
            reason: format!("zone must be within {}..={}", MIN_ZONE, MAX_ZONE),
        });
    }
    Ok(())
}

/// Zone number for a geographic position, including the Norway and Svalbard
/// exceptions
pub fn zone_number(latitude: f64, longitude: f64) -> i32 {
    let longitude = (longitude + 180.0).rem_euclid(360.0) - 180.0;

    if (56.0..64.0).contains(&latitude) && (3.0..12.0).contains(&longitude) {
        return 32;
    }

    if (72.0..=84.0).contains(&latitude) && longitude >= 0.0 {
        if longitude < 9.0 {
            return 31;
        } else if longitude < 21.0 {
            return 33;
        } else if longitude < 33.0 {
            return 35;
        } else if longitude < 42.0 {
            return 37;
        }
    }

    ((longitude + 180.0) / 6.0).floor() as i32 + 1
}

/// Guess a zone from the east value alone.
///
/// This is not a geographic truth: east values repeat in every zone, so the
/// result only matches the real zone by coincidence. It is kept because exported
/// plans have always been produced this way when no zone is known. Estimates
/// outside the valid zone range are rejected.
pub fn estimate_zone(east: f64) -> Result<(i32, Warning)> {
    if !east.is_finite() || east <= 0.0 {
        return Err(TrialplanError::InvalidCoordinate {
            value: format!("east {}", east),
            reason: "cannot estimate a zone from a non-positive east value".to_string(),
        });
    }
    let estimate = (EARTH_CIRCUMFERENCE / east).ceil() - 30.0;
    if estimate < f64::from(MIN_ZONE) || estimate > f64::from(MAX_ZONE) {
        return Err(TrialplanError::InvalidCoordinate {
            value: format!("east {}", east),
            reason: format!("estimated zone {} is outside {}..={}", estimate, MIN_ZONE, MAX_ZONE),
        });
    }
    let zone = estimate as i32;
    Ok((zone, Warning::ZoneAmbiguity { east, zone }))
}

/// Project a geographic position into its own zone
pub fn to_projected(latitude: f64, longitude: f64) -> Result<Projected> {
    check_geographic(latitude, longitude)?;

    let zone = zone_number(latitude, longitude);
    let south = latitude < 0.0;
    let (east, north) = run(
        &build_proj(GEOGRAPHIC)?,
        &utm_proj(zone, south)?,
        (longitude.to_radians(), latitude.to_radians()),
    )?;

    let north = if south { -north } else { north };
    Ok(Projected { east, north, zone })
}

/// Inverse projection. A negative north selects the southern hemisphere.
pub fn to_geographic(east: f64, north: f64, zone: i32) -> Result<(f64, f64)> {
    if !east.is_finite() || !north.is_finite() {
        return Err(TrialplanError::InvalidCoordinate {
            value: format!("({}, {})", east, north),
            reason: "projected coordinates must be finite".to_string(),
        });
    }
    check_zone(zone)?;

    let south = north < 0.0;
    let (longitude, latitude) =
        run(&utm_proj(zone, south)?, &build_proj(GEOGRAPHIC)?, (east, north.abs()))?;

    Ok((latitude.to_degrees(), longitude.to_degrees()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_number_regular() {
        assert_eq!(zone_number(55.0, 9.5), 32);
        assert_eq!(zone_number(0.0, -180.0), 1);
        assert_eq!(zone_number(0.0, 179.9), 60);
        assert_eq!(zone_number(0.0, 180.0), 1);
        assert_eq!(zone_number(-33.9, 18.4), 34);
    }

    #[test]
    fn test_zone_number_exceptions() {
        // Western Norway
        assert_eq!(zone_number(60.0, 5.0), 32);
        // Svalbard
        assert_eq!(zone_number(78.0, 15.0), 33);
        assert_eq!(zone_number(78.0, 25.0), 35);
    }

    #[test]
    fn test_central_meridian_projects_to_false_easting() {
        let p = to_projected(45.0, 9.0).unwrap();
        assert_eq!(p.zone, 32);
        assert!((p.east - 500_000.0).abs() < 1e-6);
        // Meridian arc at 45° scaled by k0
        assert!((p.north - 4_982_950.4).abs() < 1.0);
    }

    #[test]
    fn test_known_point_aarhus() {
        let p = to_projected(56.1629, 10.2039).unwrap();
        assert_eq!(p.zone, 32);
        assert!((p.east - 574_766.39).abs() < 0.5);
        assert!((p.north - 6_224_862.65).abs() < 0.5);
    }

    #[test]
    fn test_southern_hemisphere_is_negative() {
        let p = to_projected(-10.0, 20.0).unwrap();
        assert!(p.north < 0.0);
        let (lat, lon) = to_geographic(p.east, p.north, p.zone).unwrap();
        assert!((lat + 10.0).abs() < 1e-7);
        assert!((lon - 20.0).abs() < 1e-7);
    }

    #[test]
    fn test_equator_stays_northern() {
        let p = to_projected(0.0, 3.0).unwrap();
        let (lat, _) = to_geographic(p.east, p.north, p.zone).unwrap();
        assert!(lat.abs() < 1e-7);
    }

    #[test]
    fn test_svalbard_wide_zone_round_trip() {
        let p = to_projected(78.5, 20.5).unwrap();
        assert_eq!(p.zone, 33);
        let (lat, lon) = to_geographic(p.east, p.north, p.zone).unwrap();
        assert!((lat - 78.5).abs() < 1e-7);
        assert!((lon - 20.5).abs() < 1e-7);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        assert!(matches!(
            to_projected(90.5, 0.0),
            Err(TrialplanError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            to_projected(0.0, -180.5),
            Err(TrialplanError::InvalidCoordinate { .. })
        ));
        assert!(to_projected(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_zone_outside_range_is_rejected() {
        for zone in [0, 61, -1, i32::MAX, i32::MIN] {
            assert!(matches!(
                to_geographic(500_000.0, 6_000_000.0, zone),
                Err(TrialplanError::InvalidCoordinate { .. })
            ));
        }
        assert!(to_geographic(500_000.0, 6_000_000.0, 60).is_ok());
    }

    #[test]
    fn test_estimate_zone_from_east() {
        let (zone, warning) = estimate_zone(575_000.0).unwrap();
        // ceil(40075017 / 575000) = 70
        assert_eq!(zone, 40);
        assert_eq!(warning, Warning::ZoneAmbiguity { east: 575_000.0, zone: 40 });
        assert!(estimate_zone(0.0).is_err());
        assert!(estimate_zone(-5.0).is_err());
    }

    #[test]
    fn test_estimate_zone_outside_range_is_rejected() {
        // A tiny east would estimate a zone near i32::MAX
        assert!(matches!(estimate_zone(0.05), Err(TrialplanError::InvalidCoordinate { .. })));
        // ceil(40075017 / 400000) - 30 = 71
        assert!(estimate_zone(400_000.0).is_err());
        // ceil(40075017 / 2000000) - 30 = -9
        assert!(estimate_zone(2_000_000.0).is_err());
        assert!(estimate_zone(f64::MAX).is_err());
    }
}
