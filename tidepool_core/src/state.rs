use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Position;

/// Where one player stands and which way it is sliding, if it is on ice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: Position,
    pub sliding: Option<Position>,
}

/// Full snapshot of the dynamic part of a puzzle.
///
/// One entry per player and one flag per button, both in the puzzle's fixed
/// entity order. Enough to restore and replay the puzzle exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PuzzleState {
    pub players: Vec<PlayerState>,
    pub buttons: Vec<bool>,
}

/// Deduplication key for the search.
///
/// Keeps the players but folds buttons and occupied plates into one parity bit
/// per [`Color`](crate::Color): spikes only ever look at that parity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReducedPuzzleState {
    pub players: Vec<PlayerState>,
    pub toggles: Vec<bool>,
}

impl fmt::Display for PuzzleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Puzzle(")?;
        for (i, player) in self.players.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(
                f,
                "Player {}: ({}, {})",
                i + 1,
                player.position.x,
                player.position.y
            )?;
            if let Some(dir) = player.sliding {
                write!(f, " sliding ({}, {})", dir.x, dir.y)?;
            }
        }
        for (i, pressed) in self.buttons.iter().enumerate() {
            write!(f, ", Button {}: {}", i + 1, pressed)?;
        }
        write!(f, ")")
    }
}
