use meetpoint_derive::CliValue;

use crate::Result;

/// A scalar objective over `N` solver variables.
///
/// Minimizers only ever see the raw variable vector; mapping it onto
/// something meaningful (a coordinate, a parameter set) is the problem's job.
pub trait MinimizationProblem<const N: usize> {
    /// Objective value at `x`.
    ///
    /// # Errors
    ///
    /// Returns an error if the objective cannot be evaluated at `x`. The
    /// minimizer stops and propagates it.
    fn objective(&self, x: &[f64; N]) -> Result<f64>;
}

impl<const N: usize, F> MinimizationProblem<N> for F
where
    F: Fn(&[f64; N]) -> Result<f64>,
{
    fn objective(&self, x: &[f64; N]) -> Result<f64> {
        self(x)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "method")]
pub enum Method {
    /// Derivative-free downhill simplex.
    #[cli(alias = "simplex")]
    NelderMead,
    /// Quasi-Newton with finite-difference gradients.
    Bfgs,
}

/// Stopping rules shared by every minimizer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Termination {
    /// Variable-space tolerance, in solver units (degrees here).
    pub x_tolerance: f64,
    /// Objective tolerance relative to `max(1, |f|)`.
    pub f_tolerance: f64,
    pub max_iterations: usize,
    /// Initial simplex edge / probe length.
    pub initial_step: f64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Converged,
    ExhaustedIterations,
    /// No descent step could be found, but the last step tried was still
    /// larger than the coordinate tolerance.
    Stalled,
}

/// Best point a minimizer found, with its bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Minimum<const N: usize> {
    pub x: [f64; N],
    pub value: f64,
    pub status: Status,
    pub iterations: usize,
    pub evaluations: usize,
}

/// Counts objective evaluations and rejects non-finite values.
pub(crate) struct Counted<'a, P> {
    problem: &'a P,
    pub(crate) evaluations: usize,
}

impl<'a, P> Counted<'a, P> {
    pub(crate) fn new(problem: &'a P) -> Self {
        Self {
            problem,
            evaluations: 0,
        }
    }

    pub(crate) fn eval<const N: usize>(&mut self, x: &[f64; N]) -> Result<f64>
    where
        P: MinimizationProblem<N>,
    {
        self.evaluations += 1;
        let value = self.problem.objective(x)?;
        if value.is_nan() {
            return Err(crate::Error::numeric_domain(format!(
                "objective is NaN at {x:?}"
            )));
        }
        Ok(value)
    }
}
