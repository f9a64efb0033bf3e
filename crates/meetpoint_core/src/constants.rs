pub(crate) const NINETY: f64 = 90.0;
pub(crate) const ONE_EIGHTY: f64 = NINETY * 2.0;
pub(crate) const THREE_SIXTY: f64 = ONE_EIGHTY * 2.0;

/// IUGG mean Earth radius in meters.
pub(crate) const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

pub(crate) const METERS_PER_MILE: f64 = 1_609.344;
pub(crate) const METERS_PER_KILOMETER: f64 = 1_000.0;

pub(crate) const VINCENTY_MAX_ITERATIONS: usize = 200;
pub(crate) const VINCENTY_CONVERGENCE_RAD: f64 = 1e-12;

pub(crate) const DEFAULT_TOLERANCE_DEG: f64 = 1e-8;
pub(crate) const DEFAULT_F_TOLERANCE: f64 = 1e-10;
pub(crate) const DEFAULT_MAX_ITERATIONS: usize = 1_000;
pub(crate) const DEFAULT_INITIAL_STEP_DEG: f64 = 1.0;
pub(crate) const DEFAULT_JITTER_DEG: f64 = 5.0;
pub(crate) const DEFAULT_START_SEED: u64 = 12_345;

pub(crate) const NELDER_MEAD_REFLECTION: f64 = 1.0;
pub(crate) const NELDER_MEAD_EXPANSION: f64 = 2.0;
pub(crate) const NELDER_MEAD_CONTRACTION: f64 = 0.5;
pub(crate) const NELDER_MEAD_SHRINK: f64 = 0.5;

pub(crate) const BFGS_GRADIENT_STEP_DEG: f64 = 1e-7;
pub(crate) const BFGS_ARMIJO_C: f64 = 1e-4;
pub(crate) const BFGS_BACKTRACK_BETA: f64 = 0.5;
pub(crate) const BFGS_MAX_BACKTRACKS: usize = 40;

pub(crate) const THREAD_FALLBACK_PARALLELISM: usize = 2;
pub(crate) const THREAD_MIN_PARALLELISM: usize = 2;
pub(crate) const THREAD_RESERVED_CORES: usize = 1;
