use std::fmt;

use crate::{
    Error, Result,
    constants::{NINETY, ONE_EIGHTY, THREE_SIXTY},
};

/// A latitude/longitude pair in degrees.
///
/// Optimizers move candidates freely through `(lat, lng)` space, so a
/// `Coordinate` may be out of range until [`Coordinate::normalized`] folds it
/// back onto the globe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub(crate) const fn from_array(x: [f64; 2]) -> Self {
        Self { lat: x[0], lng: x[1] }
    }

    pub(crate) const fn to_array(self) -> [f64; 2] {
        [self.lat, self.lng]
    }

    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-NINETY..=NINETY).contains(&self.lat)
            && (-ONE_EIGHTY..=ONE_EIGHTY).contains(&self.lng)
    }

    /// Folds an unconstrained candidate back into `[-90, 90] x [-180, 180]`.
    ///
    /// Crossing a pole reflects the latitude and moves to the opposite
    /// meridian. Valid coordinates are returned unchanged.
    pub fn normalized(self) -> Self {
        if self.is_valid() || !self.lat.is_finite() || !self.lng.is_finite() {
            return self;
        }

        let shifted = (self.lat + NINETY).rem_euclid(THREE_SIXTY);
        let (lat, over_pole) = if shifted <= ONE_EIGHTY {
            (shifted - NINETY, false)
        } else {
            (THREE_SIXTY - NINETY - shifted, true)
        };

        let lng = if over_pole { self.lng + ONE_EIGHTY } else { self.lng };
        let lng = if (-ONE_EIGHTY..=ONE_EIGHTY).contains(&lng) {
            lng
        } else {
            (lng + ONE_EIGHTY).rem_euclid(THREE_SIXTY) - ONE_EIGHTY
        };

        Self { lat, lng }
    }

    /// Parses `"lat,lng"`.
    pub fn parse(raw: &str) -> Result<Self> {
        let (lat_s, lng_s) = raw.trim().split_once(',').ok_or_else(|| {
            Error::invalid_input(format!("expected 'lat,lng' but got: {raw}"))
        })?;
        let lat: f64 = lat_s
            .trim()
            .parse()
            .map_err(|_| Error::invalid_input(format!("invalid latitude: {lat_s}")))?;
        let lng: f64 = lng_s
            .trim()
            .parse()
            .map_err(|_| Error::invalid_input(format!("invalid longitude: {lng_s}")))?;

        let coord = Self::new(lat, lng);
        if !coord.is_valid() {
            return Err(Error::invalid_input(format!(
                "coordinate out of range: {raw}"
            )));
        }
        Ok(coord)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut b1 = ryu::Buffer::new();
        let mut b2 = ryu::Buffer::new();
        write!(f, "{},{}", b1.format(self.lat), b2.format(self.lng))
    }
}

/// A starting location and the number of people travelling from it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OriginPoint {
    coord: Coordinate,
    weight: f64,
}

impl OriginPoint {
    pub fn new(lat: f64, lng: f64, weight: f64) -> Result<Self> {
        let coord = Coordinate::new(lat, lng);
        if !coord.is_valid() {
            return Err(Error::invalid_input(format!(
                "origin lat/lng out of range: {lat},{lng}"
            )));
        }
        if !(weight.is_finite() && weight > 0.0) {
            return Err(Error::invalid_input(format!(
                "origin weight must be a positive finite number: {weight}"
            )));
        }
        Ok(Self { coord, weight })
    }

    pub fn lat(&self) -> f64 {
        self.coord.lat
    }

    pub fn lng(&self) -> f64 {
        self.coord.lng
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coord
    }
}

impl fmt::Display for OriginPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut b = ryu::Buffer::new();
        write!(f, "{},{}", self.coord, b.format(self.weight))
    }
}
