use map_3d::Ellipsoid;

use crate::{Coordinate, Error, OriginPoint, Result};

type Geocentric = (f64, f64, f64);

/// Below this fraction of the weight-scaled radius the summed ECEF vector
/// has no usable direction.
const DEGENERATE_FRACTION: f64 = 1e-9;

/// Weight-scaled ECEF mean of the origins, projected radially back onto the
/// ellipsoid. Falls back to the heaviest origin when the weighted vectors
/// cancel out (for example two equal-weight antipodes).
pub fn weighted_centroid(origins: &[OriginPoint]) -> Result<Coordinate> {
    if origins.is_empty() {
        return Err(Error::invalid_input("cannot take the centroid of zero origins"));
    }

    let mut dir: Geocentric = (0.0, 0.0, 0.0);
    let mut total_weight = 0.0;
    for origin in origins {
        let (x, y, z) = map_3d::geodetic2ecef(
            origin.lat().to_radians(),
            origin.lng().to_radians(),
            0.0,
            Ellipsoid::default(),
        );
        let w = origin.weight();
        dir.0 += w * x;
        dir.1 += w * y;
        dir.2 += w * z;
        total_weight += w;
    }

    let major = Ellipsoid::default().parameters().0;
    let norm = (dir.0 * dir.0 + dir.1 * dir.1 + dir.2 * dir.2).sqrt();
    if norm <= DEGENERATE_FRACTION * total_weight * major {
        let heaviest = origins
            .iter()
            .max_by(|a, b| a.weight().total_cmp(&b.weight()))
            .ok_or_else(|| Error::invalid_input("cannot take the centroid of zero origins"))?;
        log::debug!("centroid: degenerate direction; seeding from heaviest origin {heaviest}");
        return Ok(heaviest.coordinate());
    }

    Ok(radial_project(dir))
}

fn radial_project(p: Geocentric) -> Coordinate {
    let t = 1.0 - Ellipsoid::default().parameters().2;
    let lat = p.2.atan2(t * t * (p.0 * p.0 + p.1 * p.1).sqrt());
    let lng = p.1.atan2(p.0);
    Coordinate::new(lat.to_degrees(), lng.to_degrees())
}
