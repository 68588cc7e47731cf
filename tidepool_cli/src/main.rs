use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tidepool_core::{
    Level, Puzzle, PuzzleSolver, RandomWalker, Simulator, Solution, SolutionStep, SolveOutcome,
    SolverConfig, loader::parse_level,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;

use render::{describe_event, render_board};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the shortest solution of a level
    Solve {
        /// Level file, `.json` or the text map format
        #[arg(value_name = "LEVEL")]
        level: PathBuf,
        /// Give up after this many distinct states
        #[arg(long, default_value_t = SolverConfig::default().max_visited)]
        max_states: usize,
        /// Print the solution as JSON instead of boards
        #[arg(long)]
        json: bool,
    },
    /// Take random turns through a level
    Walk {
        #[arg(value_name = "LEVEL")]
        level: PathBuf,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 20)]
        turns: usize,
    },
    /// Check that a stored solution replays on a level
    Verify {
        #[arg(value_name = "LEVEL")]
        level: PathBuf,
        #[arg(value_name = "SOLUTION_JSON")]
        solution: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let args = Args::parse();

    match args.command {
        Command::Solve {
            level,
            max_states,
            json,
        } => solve(&level, max_states, json),
        Command::Walk { level, seed, turns } => walk(&level, seed, turns),
        Command::Verify { level, solution } => verify(&level, &solution),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Loads a level from JSON when the file ends in `.json`, from the text format otherwise.
fn load_level(path: &Path) -> Result<Level> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read level file {}", path.display()))?;
    let level: Level = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON level {}", path.display()))?
    } else {
        parse_level(&text).with_context(|| format!("Failed to parse level {}", path.display()))?
    };
    info!(path = %path.display(), cells = level.positions().count(), "loaded level");
    Ok(level)
}

fn solve(path: &Path, max_states: usize, json: bool) -> Result<ExitCode> {
    let level = load_level(path)?;
    let solver = PuzzleSolver::new(SolverConfig {
        max_visited: max_states,
    });

    let solution = match solver.solve(&level) {
        SolveOutcome::Solved(solution) => solution,
        SolveOutcome::Unsolvable => {
            println!("No solution exists.");
            return Ok(ExitCode::FAILURE);
        }
        SolveOutcome::Exhausted { visited } => {
            println!("No solution found within {visited} states; try a larger --max-states.");
            return Ok(ExitCode::FAILURE);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&solution)?);
    } else {
        print_steps(&level, &solution.steps)?;
        println!("Solved in {} steps.", solution.step_count());
    }
    if !level.star_thresholds().is_empty() {
        println!(
            "Stars: {}/{}",
            solution.stars(level.star_thresholds()),
            level.star_thresholds().len()
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn walk(path: &Path, seed: u64, turns: usize) -> Result<ExitCode> {
    let level = load_level(path)?;
    let mut simulator = Simulator::new(&level);
    let history = simulator.run(&mut RandomWalker::new(seed), turns);
    print_steps(&level, &history)?;
    if simulator.is_won() {
        println!("Won after {} turns.", history.len() - 1);
    }
    Ok(ExitCode::SUCCESS)
}

fn verify(level_path: &Path, solution_path: &Path) -> Result<ExitCode> {
    let level = load_level(level_path)?;
    let text = std::fs::read_to_string(solution_path)
        .with_context(|| format!("Failed to read solution {}", solution_path.display()))?;
    let solution: Solution = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse solution {}", solution_path.display()))?;

    let mut simulator = Simulator::new(&level);
    simulator.verify(&solution)?;

    let mut puzzle = Puzzle::new(&level);
    if let Some(last) = solution.last() {
        puzzle.set_snapshot(last);
    }
    if !puzzle.is_won() {
        println!("Replay is legal but does not end in a won state.");
        return Ok(ExitCode::FAILURE);
    }
    println!("Valid solution in {} steps.", solution.step_count());
    Ok(ExitCode::SUCCESS)
}

fn print_steps(level: &Level, steps: &[SolutionStep]) -> Result<()> {
    let mut puzzle = Puzzle::new(level);
    for (i, step) in steps.iter().enumerate() {
        puzzle.set_snapshot(&step.state);
        println!("Step {i}");
        for event in &step.events {
            println!("  {}", describe_event(&puzzle, event));
        }
        println!("{}\n", render_board(level, &puzzle)?);
    }
    Ok(())
}
