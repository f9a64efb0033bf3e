use std::thread;

use meetpoint_derive::New;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;

use crate::{
    Coordinate, Error, Geodesic, Method, OriginPoint, Result, Solution, WeightedDistance,
    algo::{
        bfgs::bfgs,
        nelder_mead::nelder_mead,
        problem::{Status, Termination},
    },
    centroid::weighted_centroid,
    constants::{
        DEFAULT_F_TOLERANCE, DEFAULT_INITIAL_STEP_DEG, DEFAULT_JITTER_DEG, DEFAULT_MAX_ITERATIONS,
        DEFAULT_START_SEED, DEFAULT_TOLERANCE_DEG, THREAD_FALLBACK_PARALLELISM,
        THREAD_MIN_PARALLELISM, THREAD_RESERVED_CORES,
    },
};

const ERR_NO_ORIGINS: &str = "at least one origin point is required";
const ERR_INVALID_SEED: &str = "initial guess contains invalid lat/lng values";
const ERR_NO_RESULTS: &str = "no multi-start runs produced a solution";

/// Tuning for a single solve. Unset optional fields use the crate defaults.
#[derive(Clone, Copy, Debug, PartialEq, New)]
pub struct SolveOptions {
    pub method: Method,
    pub geodesic: Geodesic,
    /// Coordinate tolerance in degrees.
    pub tolerance: Option<f64>,
    /// Objective tolerance relative to `max(1, |total|)`.
    pub f_tolerance: Option<f64>,
    pub max_iterations: Option<usize>,
    /// Initial simplex edge / first step length in degrees.
    pub initial_step: Option<f64>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self::new(Method::NelderMead, Geodesic::default())
    }
}

impl SolveOptions {
    fn termination(&self) -> Result<Termination> {
        let termination = Termination {
            x_tolerance: self.tolerance.unwrap_or(DEFAULT_TOLERANCE_DEG),
            f_tolerance: self.f_tolerance.unwrap_or(DEFAULT_F_TOLERANCE),
            max_iterations: self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
            initial_step: self.initial_step.unwrap_or(DEFAULT_INITIAL_STEP_DEG),
        };

        for (name, value) in [
            ("tolerance", termination.x_tolerance),
            ("f_tolerance", termination.f_tolerance),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::invalid_input(format!(
                    "{name} must be a non-negative finite number: {value}"
                )));
            }
        }
        if !(termination.initial_step.is_finite() && termination.initial_step > 0.0) {
            return Err(Error::invalid_input(format!(
                "initial_step must be > 0: {}",
                termination.initial_step
            )));
        }
        Ok(termination)
    }
}

/// Extra seeds for [`solve_multi_start`].
#[derive(Clone, Copy, Debug, PartialEq, New)]
pub struct MultiStartOptions {
    /// Number of jittered seeds around the centroid, on top of the centroid and every origin.
    pub starts: usize,
    pub start_seed: u64,
    /// Maximum jitter in degrees along each axis.
    pub jitter: f64,
}

impl Default for MultiStartOptions {
    fn default() -> Self {
        Self::new(0, DEFAULT_START_SEED, DEFAULT_JITTER_DEG)
    }
}

fn validate_origins(origins: &[OriginPoint]) -> Result<()> {
    if origins.is_empty() {
        return Err(Error::invalid_input(ERR_NO_ORIGINS));
    }
    Ok(())
}

/// Finds the point minimizing total weighted geodesic distance to `origins`.
///
/// The search starts from `initial_guess`, or the weighted centroid when
/// `None`. Only a local optimum is guaranteed; see [`solve_multi_start`]
/// for restarting from several seeds.
#[meetpoint_derive::timer("solver")]
pub fn solve(
    origins: &[OriginPoint],
    initial_guess: Option<Coordinate>,
    options: &SolveOptions,
) -> Result<Solution> {
    validate_origins(origins)?;
    let termination = options.termination()?;

    let seed = match initial_guess {
        Some(seed) => seed,
        None => weighted_centroid(origins)?,
    };
    if !seed.is_valid() {
        return Err(Error::invalid_input(format!("{ERR_INVALID_SEED}: {seed}")));
    }

    let objective = WeightedDistance::new(origins, options.geodesic);
    let initial_distance = objective.evaluate(seed)?;

    log::debug!(
        "solver: start n={} method={} metric={} seed={seed} initial={initial_distance:.3}",
        origins.len(),
        options.method,
        options.geodesic.metric,
    );

    let minimum = match options.method {
        Method::NelderMead => nelder_mead(&objective, seed.to_array(), &termination)?,
        Method::Bfgs => bfgs(&objective, seed.to_array(), &termination)?,
    };

    let location = Coordinate::from_array(minimum.x).normalized();
    let converged = minimum.status == Status::Converged;
    match minimum.status {
        Status::Converged => {}
        Status::ExhaustedIterations => log::warn!(
            "solver: iteration cap reached max_iterations={} best={location} total={:.3}",
            termination.max_iterations,
            minimum.value
        ),
        Status::Stalled => log::warn!(
            "solver: line search stalled iterations={} best={location} total={:.3}",
            minimum.iterations,
            minimum.value
        ),
    }

    if log::log_enabled!(log::Level::Trace) {
        for (idx, leg) in objective.legs(location)?.iter().enumerate() {
            log::trace!(
                "solver.leg: idx={idx} origin={} distance={:.3} weighted={:.3}",
                leg.origin,
                leg.distance,
                leg.weighted
            );
        }
    }

    log::debug!(
        "solver: done location={location} total={:.3} converged={converged} iterations={} evaluations={}",
        minimum.value,
        minimum.iterations,
        minimum.evaluations
    );

    Ok(Solution {
        latitude: location.lat,
        longitude: location.lng,
        total_distance: minimum.value,
        converged,
        iterations: minimum.iterations,
        evaluations: minimum.evaluations,
        initial_distance,
        unit: options.geodesic.unit,
        method: options.method,
    })
}

pub(crate) fn threads() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(THREAD_FALLBACK_PARALLELISM)
        .max(THREAD_MIN_PARALLELISM)
        - THREAD_RESERVED_CORES
}

fn jittered_seeds(center: Coordinate, multi: &MultiStartOptions) -> Vec<Coordinate> {
    if multi.starts == 0 || multi.jitter <= 0.0 {
        return Vec::new();
    }
    let mut rng = StdRng::seed_from_u64(multi.start_seed);
    (0..multi.starts)
        .map(|_| {
            Coordinate::new(
                center.lat + rng.random_range(-multi.jitter..=multi.jitter),
                center.lng + rng.random_range(-multi.jitter..=multi.jitter),
            )
            .normalized()
        })
        .collect()
}

/// Full seed list: caller seeds, the weighted centroid, every origin, then jitter.
fn candidate_seeds(
    origins: &[OriginPoint],
    seeds: &[Coordinate],
    multi: &MultiStartOptions,
) -> Result<Vec<Coordinate>> {
    let centroid = weighted_centroid(origins)?;
    let mut out = Vec::with_capacity(seeds.len() + origins.len() + 1 + multi.starts);
    out.extend_from_slice(seeds);
    out.push(centroid);
    out.extend(origins.iter().map(OriginPoint::coordinate));
    out.extend(jittered_seeds(centroid, multi));
    Ok(out)
}

/// Lowest total wins. Ties go to the earliest entry, i.e. the earliest seed.
fn best_solution(results: Vec<Solution>) -> Option<Solution> {
    results
        .into_iter()
        .min_by(|a, b| a.total_distance.total_cmp(&b.total_distance))
}

/// Runs [`solve`] from many seeds in parallel and keeps the lowest total.
#[meetpoint_derive::timer("solver.multi")]
pub fn solve_multi_start(
    origins: &[OriginPoint],
    seeds: &[Coordinate],
    options: &SolveOptions,
    multi: &MultiStartOptions,
) -> Result<Solution> {
    validate_origins(origins)?;
    if let Some(bad) = seeds.iter().find(|s| !s.is_valid()) {
        return Err(Error::invalid_input(format!("{ERR_INVALID_SEED}: {bad}")));
    }

    let seeds = candidate_seeds(origins, seeds, multi)?;
    let parallelism = threads();
    log::info!(
        "solver.multi: start n={} seeds={} threads={parallelism}",
        origins.len(),
        seeds.len()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallelism)
        .build()
        .map_err(|e| Error::other(format!("rayon pool: {e}")))?;

    let results: Vec<Solution> = pool.install(|| {
        seeds
            .par_iter()
            .enumerate()
            .map(|(idx, seed)| -> Result<Solution> {
                let solution = solve(origins, Some(*seed), options)?;
                log::debug!(
                    "solver.run: done idx={idx} seed={seed} total={:.3} converged={}",
                    solution.total_distance,
                    solution.converged
                );
                Ok(solution)
            })
            .collect::<Result<Vec<_>>>()
    })?;

    let run_count = results.len();
    let best = best_solution(results).ok_or_else(|| Error::other(ERR_NO_RESULTS))?;

    log::info!(
        "solver.multi: complete runs={run_count} best={} total={:.3}",
        best.location(),
        best.total_distance
    );
    Ok(best)
}
