use serde::{Deserialize, Serialize};

use crate::{PuzzleState, TurnEvent};

/// One state on a solution path, with the forced movements that led into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionStep {
    pub state: PuzzleState,
    pub events: Vec<TurnEvent>,
}

/// A path from the initial state to a winning one.
///
/// The first step is the initial state and carries no events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub steps: Vec<SolutionStep>,
}

impl Solution {
    /// Number of turns taken, one less than the number of states.
    pub fn step_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn initial(&self) -> Option<&PuzzleState> {
        self.steps.first().map(|s| &s.state)
    }

    pub fn last(&self) -> Option<&PuzzleState> {
        self.steps.last().map(|s| &s.state)
    }

    pub fn stars(&self, thresholds: &[usize]) -> usize {
        star_rating(thresholds, self.step_count())
    }
}

/// Stars earned by a solution of `steps` turns.
///
/// Thresholds are ascending; the rating is the number of thresholds the step
/// count reaches.
pub fn star_rating(thresholds: &[usize], steps: usize) -> usize {
    thresholds
        .iter()
        .rposition(|&threshold| steps >= threshold)
        .map_or(0, |i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PlayerState, Position};

    fn state_at(x: i32) -> PuzzleState {
        PuzzleState {
            players: vec![PlayerState {
                position: Position::new(x, 0),
                sliding: None,
            }],
            buttons: vec![],
        }
    }

    #[test]
    fn step_count_excludes_the_initial_state() {
        let solution = Solution {
            steps: (0..3)
                .map(|x| SolutionStep {
                    state: state_at(x),
                    events: vec![],
                })
                .collect(),
        };
        assert_eq!(solution.step_count(), 2);
        assert_eq!(solution.initial(), Some(&state_at(0)));
        assert_eq!(solution.last(), Some(&state_at(2)));
        assert_eq!(Solution { steps: vec![] }.step_count(), 0);
    }

    #[test]
    fn stars_count_reached_thresholds() {
        let thresholds = [3, 5, 8];
        assert_eq!(star_rating(&thresholds, 2), 0);
        assert_eq!(star_rating(&thresholds, 3), 1);
        assert_eq!(star_rating(&thresholds, 7), 2);
        assert_eq!(star_rating(&thresholds, 20), 3);
        assert_eq!(star_rating(&[], 20), 0);
    }
}
