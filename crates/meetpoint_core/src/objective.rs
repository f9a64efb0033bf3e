use crate::{Coordinate, Geodesic, OriginPoint, Result, algo::problem::MinimizationProblem};

/// One origin's share of the total at a given destination.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Leg {
    pub origin: OriginPoint,
    pub distance: f64,
    pub weighted: f64,
}

/// `Σ weight_i * distance(origin_i, candidate)` over every origin.
#[derive(Clone, Copy, Debug)]
pub struct WeightedDistance<'a> {
    origins: &'a [OriginPoint],
    geodesic: Geodesic,
}

impl<'a> WeightedDistance<'a> {
    pub fn new(origins: &'a [OriginPoint], geodesic: Geodesic) -> Self {
        Self { origins, geodesic }
    }

    pub fn evaluate(&self, candidate: Coordinate) -> Result<f64> {
        let mut total = 0.0;
        for origin in self.origins {
            total += origin.weight() * self.geodesic.distance(origin.coordinate(), candidate)?;
        }
        Ok(total)
    }

    /// Per-origin breakdown at `destination`, in input order.
    pub fn legs(&self, destination: Coordinate) -> Result<Vec<Leg>> {
        self.origins
            .iter()
            .map(|origin| {
                let distance = self.geodesic.distance(origin.coordinate(), destination)?;
                Ok(Leg {
                    origin: *origin,
                    distance,
                    weighted: origin.weight() * distance,
                })
            })
            .collect()
    }
}

impl MinimizationProblem<2> for WeightedDistance<'_> {
    fn objective(&self, x: &[f64; 2]) -> Result<f64> {
        self.evaluate(Coordinate::from_array(*x))
    }
}
