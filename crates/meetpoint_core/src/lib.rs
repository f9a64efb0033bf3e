//! Weighted geodesic median: the point on Earth that minimizes the
//! weight-scaled sum of distances to a set of origin points.
//! Distances are ellipsoidal (Vincenty on WGS-84) or spherical, and the
//! search runs Nelder-Mead or BFGS from one seed or many in parallel.

mod algo;
mod constants;
mod error;
mod geo;
mod io;
pub mod logging;
mod objective;
mod origin;
mod solution;
mod solver;

pub(crate) use geo::{centroid, geodesic};
pub(crate) use io::options;

pub use algo::bfgs::bfgs;
pub use algo::nelder_mead::nelder_mead;
pub use algo::problem::{Method, MinimizationProblem, Minimum, Status, Termination};
pub use centroid::weighted_centroid;
pub use error::{Error, Result};
pub use geodesic::{DistanceMetric, DistanceUnit, Geodesic, haversine_meters, vincenty_meters};
pub use io::input::{SolverInput, parse_origins};
pub use io::options::{LogFormat, LogLevel, Options};
pub use objective::{Leg, WeightedDistance};
pub use origin::{Coordinate, OriginPoint};
pub use solution::Solution;
pub use solver::{MultiStartOptions, SolveOptions, solve, solve_multi_start};
