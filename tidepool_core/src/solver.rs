//! Breadth-first search for the shortest solution of a level.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    time::Instant,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    Level, Puzzle, PuzzleLogic, PuzzleState, ReducedPuzzleState, Solution, SolutionStep,
    TurnEvent,
};

/// Search limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// The search gives up once more reduced states than this have been seen.
    pub max_visited: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_visited: 100_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Solved(Solution),
    /// Every reachable state was explored and none is won.
    Unsolvable,
    /// The search stopped at the visited-state cap. The level may still be solvable.
    Exhausted { visited: usize },
}

impl SolveOutcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveOutcome::Solved(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution> {
        match self {
            SolveOutcome::Solved(solution) => Some(solution),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PuzzleSolver {
    config: SolverConfig,
}

impl PuzzleSolver {
    pub fn new(config: SolverConfig) -> Self {
        PuzzleSolver { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Builds a fresh puzzle from `level` and solves it.
    pub fn solve(&self, level: &Level) -> SolveOutcome {
        let mut puzzle = Puzzle::new(level);
        self.solve_puzzle(&mut puzzle)
    }

    /// Solves from the puzzle's current state.
    ///
    /// The puzzle is mutated during the search and restored to the starting
    /// state before returning.
    pub fn solve_puzzle(&self, puzzle: &mut Puzzle) -> SolveOutcome {
        let start = Instant::now();
        let initial = puzzle.snapshot();
        let (outcome, visited) = self.search(puzzle, &initial);
        puzzle.set_snapshot(&initial);

        match &outcome {
            SolveOutcome::Solved(solution) => info!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                visited,
                steps = solution.step_count(),
                "solution found"
            ),
            SolveOutcome::Unsolvable => info!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                visited,
                "no solution exists"
            ),
            SolveOutcome::Exhausted { visited } => warn!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                visited,
                max_visited = self.config.max_visited,
                "search budget exhausted"
            ),
        }
        outcome
    }

    fn search(&self, puzzle: &mut Puzzle, initial: &PuzzleState) -> (SolveOutcome, usize) {
        if puzzle.is_won() {
            debug!("initial state is already won");
            let solution = Solution {
                steps: vec![SolutionStep {
                    state: initial.clone(),
                    events: Vec::new(),
                }],
            };
            return (SolveOutcome::Solved(solution), 1);
        }

        let mut frontier: VecDeque<PuzzleState> = VecDeque::new();
        let mut visited: HashSet<ReducedPuzzleState> = HashSet::new();
        let mut came_from: HashMap<PuzzleState, (PuzzleState, Vec<TurnEvent>)> = HashMap::new();

        frontier.push_back(initial.clone());
        visited.insert(puzzle.reduced_snapshot());

        while let Some(current) = frontier.pop_front() {
            if visited.len() > self.config.max_visited {
                let visited = visited.len();
                return (SolveOutcome::Exhausted { visited }, visited);
            }

            let successors = PuzzleLogic::new(puzzle).next_states(&current);
            for successor in successors {
                puzzle.set_snapshot(&successor.state);
                if !visited.insert(puzzle.reduced_snapshot()) {
                    continue;
                }
                came_from.insert(
                    successor.state.clone(),
                    (current.clone(), successor.events),
                );

                if puzzle.is_won() {
                    let solution = reconstruct_path(&came_from, initial, successor.state);
                    debug!(
                        visited = visited.len(),
                        steps = solution.step_count(),
                        "reached a won state"
                    );
                    return (SolveOutcome::Solved(solution), visited.len());
                }
                frontier.push_back(successor.state);
            }
        }

        debug!(visited = visited.len(), "frontier exhausted");
        (SolveOutcome::Unsolvable, visited.len())
    }
}

/// Walks `came_from` back from `goal` to `start`.
fn reconstruct_path(
    came_from: &HashMap<PuzzleState, (PuzzleState, Vec<TurnEvent>)>,
    start: &PuzzleState,
    goal: PuzzleState,
) -> Solution {
    let mut steps = Vec::new();
    let mut current = goal;
    while &current != start {
        let Some((previous, events)) = came_from.get(&current) else {
            break;
        };
        steps.push(SolutionStep {
            state: current,
            events: events.clone(),
        });
        current = previous.clone();
    }
    steps.push(SolutionStep {
        state: current,
        events: Vec::new(),
    });
    steps.reverse();
    Solution { steps }
}
