use std::fmt;

use crate::{Coordinate, DistanceUnit, Method};

/// Outcome of one solve. `converged == false` means the iteration cap was hit;
/// the location is still the best point found.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Solution {
    pub latitude: f64,
    pub longitude: f64,
    pub total_distance: f64,
    pub converged: bool,
    pub iterations: usize,
    pub evaluations: usize,
    /// Objective at the seed the minimizer started from.
    pub initial_distance: f64,
    pub unit: DistanceUnit,
    pub method: Method,
}

impl Solution {
    pub fn location(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// How much the minimizer took off the seed's total. Never negative.
    pub fn improvement(&self) -> f64 {
        self.initial_distance - self.total_distance
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.location())?;
        write!(
            f,
            "total_distance={:.6} unit={} converged={} iterations={} evaluations={}",
            self.total_distance, self.unit, self.converged, self.iterations, self.evaluations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Solution;
    use crate::{DistanceUnit, Method};

    #[test]
    fn display_prints_location_then_summary() {
        let solution = Solution {
            latitude: 39.5,
            longitude: -81.25,
            total_distance: 1234.5,
            converged: true,
            iterations: 42,
            evaluations: 90,
            initial_distance: 1500.0,
            unit: DistanceUnit::Miles,
            method: Method::NelderMead,
        };
        assert_eq!(
            solution.to_string(),
            "39.5,-81.25\ntotal_distance=1234.500000 unit=miles converged=true iterations=42 evaluations=90"
        );
        assert_eq!(solution.improvement(), 265.5);
    }
}
