use crate::{
    Result,
    algo::problem::{Counted, MinimizationProblem, Minimum, Status, Termination},
    constants::{
        NELDER_MEAD_CONTRACTION, NELDER_MEAD_EXPANSION, NELDER_MEAD_REFLECTION, NELDER_MEAD_SHRINK,
    },
};

type Vertex<const N: usize> = ([f64; N], f64);

/// `base + t * (toward - base)`, component-wise.
fn lerp<const N: usize>(base: &[f64; N], toward: &[f64; N], t: f64) -> [f64; N] {
    std::array::from_fn(|i| base[i] + t * (toward[i] - base[i]))
}

fn centroid_without_worst<const N: usize>(simplex: &[Vertex<N>]) -> [f64; N] {
    let kept = &simplex[..simplex.len() - 1];
    let n = kept.len() as f64;
    std::array::from_fn(|i| kept.iter().map(|(x, _)| x[i]).sum::<f64>() / n)
}

fn sort_simplex<const N: usize>(simplex: &mut [Vertex<N>]) {
    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
}

/// `(max coordinate offset from best, max objective offset from best)`.
fn spread<const N: usize>(simplex: &[Vertex<N>]) -> (f64, f64) {
    let (best_x, best_f) = simplex[0];
    simplex[1..]
        .iter()
        .fold((0.0_f64, 0.0_f64), |(dx, df), (x, f)| {
            let vertex_dx = x
                .iter()
                .zip(best_x.iter())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0_f64, f64::max);
            (dx.max(vertex_dx), df.max((f - best_f).abs()))
        })
}

/// Downhill simplex minimization from `x0`.
///
/// The seed is a simplex vertex and only better vertices ever replace the
/// worst one, so the returned value never exceeds `f(x0)`.
pub fn nelder_mead<const N: usize, P>(
    problem: &P,
    x0: [f64; N],
    termination: &Termination,
) -> Result<Minimum<N>>
where
    P: MinimizationProblem<N>,
{
    let mut objective = Counted::new(problem);

    let mut simplex: Vec<Vertex<N>> = Vec::with_capacity(N + 1);
    simplex.push((x0, objective.eval(&x0)?));
    for i in 0..N {
        let mut x = x0;
        x[i] += termination.initial_step;
        simplex.push((x, objective.eval(&x)?));
    }

    let mut iterations = 0;
    let status = loop {
        sort_simplex(&mut simplex);

        let (dx, df) = spread(&simplex);
        if dx <= termination.x_tolerance
            && df <= termination.f_tolerance * simplex[0].1.abs().max(1.0)
        {
            break Status::Converged;
        }
        if iterations >= termination.max_iterations {
            break Status::ExhaustedIterations;
        }
        iterations += 1;

        let centroid = centroid_without_worst(&simplex);
        let (worst_x, worst_f) = simplex[N];
        let best_f = simplex[0].1;
        let second_worst_f = simplex[N - 1].1;

        let reflected = lerp(&centroid, &worst_x, -NELDER_MEAD_REFLECTION);
        let reflected_f = objective.eval(&reflected)?;

        if reflected_f < best_f {
            let expanded = lerp(&centroid, &reflected, NELDER_MEAD_EXPANSION);
            let expanded_f = objective.eval(&expanded)?;
            simplex[N] = if expanded_f < reflected_f {
                (expanded, expanded_f)
            } else {
                (reflected, reflected_f)
            };
            continue;
        }

        if reflected_f < second_worst_f {
            simplex[N] = (reflected, reflected_f);
            continue;
        }

        let (contracted, contracted_f, accept) = if reflected_f < worst_f {
            let x = lerp(&centroid, &reflected, NELDER_MEAD_CONTRACTION);
            let f = objective.eval(&x)?;
            (x, f, f <= reflected_f)
        } else {
            let x = lerp(&centroid, &worst_x, NELDER_MEAD_CONTRACTION);
            let f = objective.eval(&x)?;
            (x, f, f < worst_f)
        };
        if accept {
            simplex[N] = (contracted, contracted_f);
            continue;
        }

        let best_x = simplex[0].0;
        for vertex in simplex.iter_mut().skip(1) {
            let x = lerp(&best_x, &vertex.0, NELDER_MEAD_SHRINK);
            *vertex = (x, objective.eval(&x)?);
        }
    };

    sort_simplex(&mut simplex);
    let (x, value) = simplex[0];
    log::trace!(
        "nelder_mead: done status={status:?} iterations={iterations} evaluations={} value={value}",
        objective.evaluations
    );

    Ok(Minimum {
        x,
        value,
        status,
        iterations,
        evaluations: objective.evaluations,
    })
}

#[cfg(test)]
mod tests {
    use super::nelder_mead;
    use crate::{
        Error, Result,
        algo::problem::{Status, Termination},
    };

    fn termination(max_iterations: usize) -> Termination {
        Termination {
            x_tolerance: 1e-8,
            f_tolerance: 1e-12,
            max_iterations,
            initial_step: 1.0,
        }
    }

    #[test]
    fn finds_minimum_of_shifted_bowl() {
        let bowl = |x: &[f64; 2]| -> Result<f64> {
            Ok((x[0] - 3.0).powi(2) + 2.0 * (x[1] + 1.0).powi(2))
        };
        let min = nelder_mead(&bowl, [0.0, 0.0], &termination(1_000)).expect("minimize");
        assert_eq!(min.status, Status::Converged);
        assert!((min.x[0] - 3.0).abs() < 1e-6, "x={:?}", min.x);
        assert!((min.x[1] + 1.0).abs() < 1e-6, "x={:?}", min.x);
    }

    #[test]
    fn handles_kinked_objective() {
        let cone = |x: &[f64; 2]| -> Result<f64> { Ok(((x[0] - 1.0).powi(2) + x[1] * x[1]).sqrt()) };
        let min = nelder_mead(&cone, [-2.0, 3.0], &termination(1_000)).expect("minimize");
        assert_eq!(min.status, Status::Converged);
        assert!(min.value < 1e-6, "value={}", min.value);
    }

    #[test]
    fn reports_exhaustion_but_keeps_best_point() {
        let bowl = |x: &[f64; 2]| -> Result<f64> { Ok(x[0] * x[0] + x[1] * x[1]) };
        let start = [10.0, -7.0];
        let min = nelder_mead(&bowl, start, &termination(3)).expect("minimize");
        assert_eq!(min.status, Status::ExhaustedIterations);
        assert_eq!(min.iterations, 3);
        assert!(min.value <= 149.0);
    }

    #[test]
    fn propagates_objective_errors() {
        let failing = |_: &[f64; 2]| -> Result<f64> { Err(Error::numeric_domain("boom")) };
        let err = nelder_mead(&failing, [0.0, 0.0], &termination(10)).expect_err("error");
        assert!(matches!(err, Error::NumericDomain(_)));
    }
}
