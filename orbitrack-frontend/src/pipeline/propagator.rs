//! Orbital-mechanics capability: element-set parsing, propagation and the
//! inertial-to-geodetic conversion.

use chrono::{DateTime, Utc};
use sgp4::{Constants, MinutesSinceEpoch};
use std::f64::consts::PI;
use thiserror::Error;

pub const MILLIS_PER_DAY: f64 = 86_400_000.0;
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36525.0;
pub const GMST_BASE_DEG: f64 = 280.46061837;
pub const GMST_ROTATION_PER_DAY: f64 = 360.98564736629;
pub const GMST_CORRECTION: f64 = 0.000387933;
/// 2000-01-01T12:00:00Z
const J2000_UNIX_MILLIS: i64 = 946_728_000_000;

pub const WGS84_EQUATORIAL_RADIUS_KM: f64 = 6378.137;
pub const WGS84_POLAR_RADIUS_KM: f64 = 6356.7523142;
const GEODETIC_ITERATIONS: usize = 20;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("element set has {found} usable line(s), need 2")]
    TooFewLines { found: usize },

    #[error("element set rejected: {0}")]
    Rejected(String),
}

/// Latitude/longitude in radians, height in km above the reference ellipsoid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub latitude: f64,
    pub longitude: f64,
    pub height_km: f64,
}

pub trait Propagator {
    type Handle;

    fn parse(&self, line1: &str, line2: &str) -> Result<Self::Handle, ParseError>;

    /// `None` when the element set yields no usable position at `at`
    fn position_at(&self, handle: &Self::Handle, at: DateTime<Utc>) -> Option<Geodetic>;
}

/// Greenwich mean sidereal time in radians
pub fn greenwich_mean_sidereal_time(at: DateTime<Utc>) -> f64 {
    let days_since_j2000 = (at.timestamp_millis() - J2000_UNIX_MILLIS) as f64 / MILLIS_PER_DAY;
    let centuries = days_since_j2000 / DAYS_PER_JULIAN_CENTURY;
    let gmst_degrees = GMST_BASE_DEG
        + GMST_ROTATION_PER_DAY * days_since_j2000
        + GMST_CORRECTION * centuries * centuries
        - centuries * centuries * centuries / 38710000.0;
    gmst_degrees.rem_euclid(360.0).to_radians()
}

/// Earth-centered inertial position (km) to geodetic coordinates on WGS84
pub fn eci_to_geodetic(position: [f64; 3], gmst: f64) -> Geodetic {
    let [x, y, z] = position;
    let a = WGS84_EQUATORIAL_RADIUS_KM;
    let f = (a - WGS84_POLAR_RADIUS_KM) / a;
    let e2 = 2.0 * f - f * f;

    let r = (x * x + y * y).sqrt();

    let mut longitude = y.atan2(x) - gmst;
    while longitude < -PI {
        longitude += 2.0 * PI;
    }
    while longitude > PI {
        longitude -= 2.0 * PI;
    }

    let mut latitude = z.atan2(r);
    let mut c = 1.0;
    for _ in 0..GEODETIC_ITERATIONS {
        let sin_lat = latitude.sin();
        c = 1.0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        latitude = (z + a * c * e2 * sin_lat).atan2(r);
    }

    // r / cos(lat) is singular over the poles
    let height_km = if latitude.cos().abs() > 1e-6 {
        r / latitude.cos() - a * c
    } else {
        z / latitude.sin() - a * c * (1.0 - e2)
    };

    Geodetic {
        latitude,
        longitude,
        height_km,
    }
}

/// Propagable handle produced by [`Sgp4Propagator`]
pub struct Sgp4Handle {
    constants: Constants,
    epoch: DateTime<Utc>,
}

impl Sgp4Handle {
    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }
}

/// SGP4/SDP4 propagation of two-line element sets
#[derive(Debug, Clone, Copy, Default)]
pub struct Sgp4Propagator;

impl Propagator for Sgp4Propagator {
    type Handle = Sgp4Handle;

    fn parse(&self, line1: &str, line2: &str) -> Result<Sgp4Handle, ParseError> {
        let elements = sgp4::Elements::from_tle(None, line1.as_bytes(), line2.as_bytes())
            .map_err(|e| ParseError::Rejected(format!("{:?}", e)))?;
        let constants = Constants::from_elements(&elements)
            .map_err(|e| ParseError::Rejected(format!("{:?}", e)))?;

        let epoch_millis = elements.datetime.and_utc().timestamp_millis();
        let epoch = DateTime::from_timestamp_millis(epoch_millis)
            .ok_or_else(|| ParseError::Rejected("epoch out of range".to_string()))?;

        Ok(Sgp4Handle { constants, epoch })
    }

    fn position_at(&self, handle: &Sgp4Handle, at: DateTime<Utc>) -> Option<Geodetic> {
        let minutes = (at - handle.epoch).num_milliseconds() as f64 / 60_000.0;
        let prediction = handle.constants.propagate(MinutesSinceEpoch(minutes)).ok()?;

        if prediction.position.iter().any(|v| !v.is_finite()) {
            return None;
        }
        Some(eci_to_geodetic(prediction.position, greenwich_mean_sidereal_time(at)))
    }
}
