use crate::{EntityTag, Position};

/// Errors raised while building or loading a [`Level`](crate::Level).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("Position ({}, {}) is not part of the level", .0.x, .0.y)]
    OutOfLevel(Position),
    #[error("Position ({}, {}) already holds a {tag:?}", .position.x, .position.y)]
    Occupied { position: Position, tag: EntityTag },
    #[error("Cannot place an empty entity at ({}, {})", .0.x, .0.y)]
    EmptyPlacement(Position),
    #[error("Portal at ({}, {}) links to ({}, {}), which is not part of the level", .position.x, .position.y, .destination.x, .destination.y)]
    PortalOutOfLevel {
        position: Position,
        destination: Position,
    },
    #[error("Map string is empty")]
    EmptyMap,
    #[error("Inconsistent width at row {row}: expected {expected}, found {found}")]
    InconsistentWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Unknown map code '{token}' at row {row}, column {column}")]
    UnknownToken {
        token: String,
        row: usize,
        column: usize,
    },
    #[error("Portal label '{label}' appears {count} times, expected exactly 2")]
    UnpairedPortal { label: char, count: usize },
    #[error("Invalid directive '{0}'")]
    InvalidDirective(String),
}

/// Errors raised while replaying a stored [`Solution`](crate::Solution).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("Solution has no steps")]
    EmptySolution,
    #[error("Solution does not start from the level's initial state")]
    InitialMismatch,
    #[error("Step {step} is not reachable from the previous state")]
    IllegalStep { step: usize },
}
