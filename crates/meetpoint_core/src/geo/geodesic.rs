use std::f64::consts::PI;

use map_3d::Ellipsoid;
use meetpoint_derive::CliValue;

use crate::{
    Coordinate, Error, Result,
    constants::{
        MEAN_EARTH_RADIUS_M, METERS_PER_KILOMETER, METERS_PER_MILE, VINCENTY_CONVERGENCE_RAD,
        VINCENTY_MAX_ITERATIONS,
    },
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "metric")]
pub enum DistanceMetric {
    /// Inverse Vincenty on the WGS-84 ellipsoid.
    #[cli(alias = "ellipsoid")]
    Vincenty,
    /// Great circle on a sphere of mean Earth radius.
    #[cli(alias = "sphere")]
    Haversine,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "unit")]
pub enum DistanceUnit {
    #[cli(alias = "mi")]
    Miles,
    #[cli(alias = "km")]
    Kilometers,
    #[cli(alias = "m")]
    Meters,
}

impl DistanceUnit {
    pub fn from_meters(self, meters: f64) -> f64 {
        match self {
            Self::Miles => meters / METERS_PER_MILE,
            Self::Kilometers => meters / METERS_PER_KILOMETER,
            Self::Meters => meters,
        }
    }
}

/// Distance metric plus output unit. Every distance in a solve goes through one of these.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Geodesic {
    pub metric: DistanceMetric,
    pub unit: DistanceUnit,
}

impl Default for Geodesic {
    fn default() -> Self {
        Self {
            metric: DistanceMetric::Vincenty,
            unit: DistanceUnit::Miles,
        }
    }
}

impl Geodesic {
    pub const fn new(metric: DistanceMetric, unit: DistanceUnit) -> Self {
        Self { metric, unit }
    }

    /// Distance between two coordinates in `self.unit`.
    ///
    /// Out-of-range candidates are normalized first. A non-finite result is
    /// reported as [`Error::NumericDomain`].
    pub fn distance(&self, a: Coordinate, b: Coordinate) -> Result<f64> {
        let (a, b) = (a.normalized(), b.normalized());
        let meters = match self.metric {
            DistanceMetric::Haversine => haversine_meters(a, b),
            DistanceMetric::Vincenty => vincenty_meters(a, b).unwrap_or_else(|| {
                log::trace!("geodesic: vincenty did not converge a={a} b={b}; using haversine");
                haversine_meters(a, b)
            }),
        };

        if !meters.is_finite() || meters < 0.0 {
            return Err(Error::numeric_domain(format!(
                "distance between {a} and {b} is not representable ({meters})"
            )));
        }
        Ok(self.unit.from_meters(meters))
    }
}

/// Great-circle distance using the haversine formula, in meters.
pub fn haversine_meters(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();
    let s1 = (dlat / 2.0).sin();
    let s2 = (dlng / 2.0).sin();
    // rounding can push h a hair outside [0, 1], which would make asin NaN
    let h = (s1 * s1 + lat1.cos() * lat2.cos() * s2 * s2).clamp(0.0, 1.0);
    2.0 * MEAN_EARTH_RADIUS_M * h.sqrt().asin()
}

/// Inverse Vincenty distance on the WGS-84 ellipsoid, in meters.
///
/// Returns `None` when the iteration fails to converge, which happens for
/// nearly antipodal points.
pub fn vincenty_meters(a: Coordinate, b: Coordinate) -> Option<f64> {
    if a == b {
        return Some(0.0);
    }

    let (major, minor, flattening, _) = Ellipsoid::default().parameters();

    let l = (b.lng - a.lng).to_radians();
    let u1 = ((1.0 - flattening) * a.lat.to_radians().tan()).atan();
    let u2 = ((1.0 - flattening) * b.lat.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..VINCENTY_MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let cross = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2) + cross * cross).sqrt();
        if sin_sigma == 0.0 {
            return Some(0.0);
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // both points on the equator
        let cos_2sigma_m = if cos_sq_alpha == 0.0 {
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        };
        let c = flattening / 16.0 * cos_sq_alpha * (4.0 + flattening * (4.0 - 3.0 * cos_sq_alpha));

        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * flattening
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if lambda.abs() > PI {
            return None;
        }

        if (lambda - previous).abs() < VINCENTY_CONVERGENCE_RAD {
            let u_sq = cos_sq_alpha * (major * major - minor * minor) / (minor * minor);
            let big_a =
                1.0 + u_sq / 16_384.0 * (4_096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let big_b = u_sq / 1_024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = big_b
                * sin_sigma
                * (cos_2sigma_m
                    + big_b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - big_b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
            return Some(minor * big_a * (sigma - delta_sigma));
        }
    }

    None
}
