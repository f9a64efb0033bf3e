use std::{fs, io::Write, time::Instant};

use log::info;

use meetpoint_core::{
    Options, Result, Solution, SolverInput, logging, solve, solve_multi_start,
};

fn main() -> Result<()> {
    let now = Instant::now();
    let options = Options::from_args()?;
    logging::init_logger(&options)?;
    let input = SolverInput::from_options(&options)?;

    info!("input: {input}");
    info!("options: {options}");

    let solve_options = options.solve_options();
    let solution = if options.is_multi_start() {
        let seeds: Vec<_> = input.seed.into_iter().collect();
        solve_multi_start(
            &input.origins,
            &seeds,
            &solve_options,
            &options.multi_start_options(),
        )?
    } else {
        solve(&input.origins, input.seed, &solve_options)?
    };

    write_solution(&solution, &options)?;

    info!(
        "output: total_distance={:.3} {} converged={} time={:.2}s",
        solution.total_distance,
        solution.unit,
        solution.converged,
        now.elapsed().as_secs_f32()
    );

    Ok(())
}

fn write_solution(solution: &Solution, options: &Options) -> Result<()> {
    match options.output_path() {
        Some(path) => fs::write(path, format!("{solution}\n"))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{solution}")?;
        }
    }
    Ok(())
}
