use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::{
    Level, Puzzle, PuzzleLogic, PuzzleState, ReplayError, Solution, SolutionStep, Successor,
};

/// Picks the next turn when stepping through a puzzle by hand.
pub trait Driver {
    /// Returns the index of the chosen successor, or `None` to stop.
    fn choose(&mut self, successors: &[Successor]) -> Option<usize>;
}

/// Picks uniformly among the successors.
#[derive(Debug)]
pub struct RandomWalker {
    rng: StdRng,
}

impl RandomWalker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Driver for RandomWalker {
    fn choose(&mut self, successors: &[Successor]) -> Option<usize> {
        if successors.is_empty() {
            None
        } else {
            Some(self.rng.random_range(0..successors.len()))
        }
    }
}

/// Steps a puzzle one turn at a time, for drivers other than the solver.
#[derive(Debug, Clone)]
pub struct Simulator {
    puzzle: Puzzle,
    initial: PuzzleState,
    state: PuzzleState,
}

impl Simulator {
    pub fn new(level: &Level) -> Self {
        let puzzle = Puzzle::new(level);
        let initial = puzzle.snapshot();
        Simulator {
            puzzle,
            state: initial.clone(),
            initial,
        }
    }

    pub fn state(&self) -> &PuzzleState {
        &self.state
    }

    pub fn initial(&self) -> &PuzzleState {
        &self.initial
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn is_won(&self) -> bool {
        self.puzzle.is_won()
    }

    /// Goes back to the level's starting state.
    pub fn reset(&mut self) {
        self.state = self.initial.clone();
        self.puzzle.set_snapshot(&self.state);
    }

    /// Every turn possible from the current state.
    pub fn successors(&mut self) -> Vec<Successor> {
        let successors = PuzzleLogic::new(&mut self.puzzle).next_states(&self.state);
        self.puzzle.set_snapshot(&self.state);
        successors
    }

    /// Takes the successor at `index` of [`Simulator::successors`].
    ///
    /// Returns `None` and leaves the state untouched when `index` is out of range.
    pub fn advance(&mut self, index: usize) -> Option<Successor> {
        let successor = self.successors().into_iter().nth(index)?;
        self.state = successor.state.clone();
        self.puzzle.set_snapshot(&self.state);
        Some(successor)
    }

    /// Lets `driver` play up to `max_turns` turns.
    ///
    /// Stops early once the puzzle is won, no turn is possible or the driver
    /// declines. The returned history starts with the state the run began in.
    pub fn run(&mut self, driver: &mut dyn Driver, max_turns: usize) -> Vec<SolutionStep> {
        let mut history = vec![SolutionStep {
            state: self.state.clone(),
            events: Vec::new(),
        }];

        for turn in 0..max_turns {
            if self.is_won() {
                debug!(turn, "won");
                break;
            }
            let successors = self.successors();
            let Some(successor) = driver
                .choose(&successors)
                .and_then(|i| successors.into_iter().nth(i))
            else {
                debug!(turn, "driver stopped");
                break;
            };
            self.state = successor.state;
            self.puzzle.set_snapshot(&self.state);
            history.push(SolutionStep {
                state: self.state.clone(),
                events: successor.events,
            });
        }
        history
    }

    /// Replays `solution` from the level's starting state, checking that every
    /// step is a legal turn with the recorded events.
    ///
    /// The simulator is left at the starting state either way.
    pub fn verify(&mut self, solution: &Solution) -> Result<(), ReplayError> {
        self.reset();
        let result = self.replay(solution);
        self.reset();
        result
    }

    fn replay(&mut self, solution: &Solution) -> Result<(), ReplayError> {
        let (first, rest) = solution
            .steps
            .split_first()
            .ok_or(ReplayError::EmptySolution)?;
        if first.state != self.initial {
            return Err(ReplayError::InitialMismatch);
        }

        for (i, step) in rest.iter().enumerate() {
            let legal = self
                .successors()
                .into_iter()
                .any(|s| s.state == step.state && s.events == step.events);
            if !legal {
                return Err(ReplayError::IllegalStep { step: i + 1 });
            }
            self.state = step.state.clone();
            self.puzzle.set_snapshot(&self.state);
        }
        Ok(())
    }
}
