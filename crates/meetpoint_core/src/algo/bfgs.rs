use crate::{
    Result,
    algo::problem::{Counted, MinimizationProblem, Minimum, Status, Termination},
    constants::{
        BFGS_ARMIJO_C, BFGS_BACKTRACK_BETA, BFGS_GRADIENT_STEP_DEG, BFGS_MAX_BACKTRACKS,
    },
};

type Matrix<const N: usize> = [[f64; N]; N];

fn dot<const N: usize>(a: &[f64; N], b: &[f64; N]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn norm<const N: usize>(a: &[f64; N]) -> f64 {
    dot(a, a).sqrt()
}

fn scaled_identity<const N: usize>(scale: f64) -> Matrix<N> {
    std::array::from_fn(|i| std::array::from_fn(|j| if i == j { scale } else { 0.0 }))
}

fn mat_vec<const N: usize>(m: &Matrix<N>, v: &[f64; N]) -> [f64; N] {
    std::array::from_fn(|i| dot(&m[i], v))
}

/// Inverse-Hessian BFGS update with `rho = 1 / (s . y)`.
fn bfgs_update<const N: usize>(h: &Matrix<N>, s: &[f64; N], y: &[f64; N], rho: f64) -> Matrix<N> {
    let hy = mat_vec(h, y);
    let yhy = dot(y, &hy);
    std::array::from_fn(|i| {
        std::array::from_fn(|j| {
            h[i][j] - rho * (hy[i] * s[j] + s[i] * hy[j]) + (rho * rho * yhy + rho) * s[i] * s[j]
        })
    })
}

/// `None` when `s . y <= 0`: the update would lose positive definiteness, so the
/// current inverse Hessian is kept.
fn curvature_update<const N: usize>(h: &Matrix<N>, s: &[f64; N], y: &[f64; N]) -> Option<Matrix<N>> {
    let sy = dot(s, y);
    (sy > 0.0).then(|| bfgs_update(h, s, y, 1.0 / sy))
}

fn central_gradient<const N: usize, P>(objective: &mut Counted<'_, P>, x: &[f64; N]) -> Result<[f64; N]>
where
    P: MinimizationProblem<N>,
{
    let mut g = [0.0; N];
    for i in 0..N {
        let mut forward = *x;
        let mut backward = *x;
        forward[i] += BFGS_GRADIENT_STEP_DEG;
        backward[i] -= BFGS_GRADIENT_STEP_DEG;
        g[i] = (objective.eval(&forward)? - objective.eval(&backward)?)
            / (2.0 * BFGS_GRADIENT_STEP_DEG);
    }
    Ok(g)
}

/// Identity scaled so the first steepest-descent step is `initial_step` long.
fn fresh_inverse_hessian<const N: usize>(g: &[f64; N], initial_step: f64) -> Matrix<N> {
    let g_norm = norm(g);
    let scale = if g_norm > 0.0 { initial_step / g_norm } else { initial_step };
    scaled_identity(scale)
}

/// Quasi-Newton minimization from `x0` with finite-difference gradients.
///
/// Steps are only taken when they satisfy the Armijo condition, so the
/// objective never increases. At a kink (an origin point of the weighted
/// distance objective) the line search eventually fails to find descent;
/// once the failed step is below `x_tolerance` the point is accepted as converged.
pub fn bfgs<const N: usize, P>(
    problem: &P,
    x0: [f64; N],
    termination: &Termination,
) -> Result<Minimum<N>>
where
    P: MinimizationProblem<N>,
{
    let mut objective = Counted::new(problem);

    let mut x = x0;
    let mut f = objective.eval(&x)?;
    let mut g = central_gradient(&mut objective, &x)?;
    let mut h: Matrix<N> = fresh_inverse_hessian(&g, termination.initial_step);
    let mut fresh = true;
    let mut iterations = 0;

    let status = loop {
        if norm(&g) <= termination.f_tolerance * f.abs().max(1.0) {
            break Status::Converged;
        }
        if iterations >= termination.max_iterations {
            break Status::ExhaustedIterations;
        }
        iterations += 1;

        let mut p = mat_vec(&h, &g).map(|v| -v);
        let mut slope = dot(&g, &p);
        if slope >= 0.0 {
            h = fresh_inverse_hessian(&g, termination.initial_step);
            fresh = true;
            p = mat_vec(&h, &g).map(|v| -v);
            slope = dot(&g, &p);
        }

        let mut alpha = 1.0;
        let mut accepted = None;
        for _ in 0..BFGS_MAX_BACKTRACKS {
            let candidate: [f64; N] = std::array::from_fn(|i| x[i] + alpha * p[i]);
            let candidate_f = objective.eval(&candidate)?;
            if candidate_f <= f + BFGS_ARMIJO_C * alpha * slope && candidate_f <= f {
                accepted = Some((candidate, candidate_f));
                break;
            }
            alpha *= BFGS_BACKTRACK_BETA;
        }

        let Some((x_new, f_new)) = accepted else {
            if fresh {
                let tried = alpha * norm(&p);
                break if tried <= termination.x_tolerance {
                    Status::Converged
                } else {
                    Status::Stalled
                };
            }
            log::trace!("bfgs: line search failed; resetting inverse hessian");
            h = fresh_inverse_hessian(&g, termination.initial_step);
            fresh = true;
            continue;
        };

        let g_new = central_gradient(&mut objective, &x_new)?;
        let s: [f64; N] = std::array::from_fn(|i| x_new[i] - x[i]);
        let y: [f64; N] = std::array::from_fn(|i| g_new[i] - g[i]);
        x = x_new;
        f = f_new;
        g = g_new;

        if s.iter().all(|v| v.abs() <= termination.x_tolerance) {
            break Status::Converged;
        }

        if let Some(updated) = curvature_update(&h, &s, &y) {
            h = updated;
            fresh = false;
        }
    };

    log::trace!(
        "bfgs: done status={status:?} iterations={iterations} evaluations={} value={f}",
        objective.evaluations
    );

    Ok(Minimum {
        x,
        value: f,
        status,
        iterations,
        evaluations: objective.evaluations,
    })
}
