use std::{
    hash::{Hash, Hasher},
    ops::{Add, Mul, Sub},
};

use serde::{Deserialize, Serialize};

pub mod error;
pub mod grid;
pub mod index;
pub mod level;
pub mod loader;
pub mod logic;
pub mod moves;
pub mod simulator;
pub mod solution;
pub mod solver;
pub mod state;

pub use error::{LevelError, ReplayError};
pub use index::{Entity, EntityState, Puzzle};
pub use level::{Level, Placement};
pub use logic::{PuzzleLogic, Rejection, Successor, TurnEvent};
pub use simulator::{Driver, RandomWalker, Simulator};
pub use solution::{Solution, SolutionStep, star_rating};
pub use solver::{PuzzleSolver, SolveOutcome, SolverConfig};
pub use state::{PlayerState, PuzzleState, ReducedPuzzleState};

/// Index of an entity inside a [`Puzzle`]. Stable for the lifetime of the puzzle.
pub type EntityId = usize;

/// Represents a 2D coordinate. `y` grows upwards.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ZERO: Position = Position { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Clamps both components to `-1..=1`.
    pub fn clamp_unit(self) -> Self {
        Position {
            x: self.x.clamp(-1, 1),
            y: self.y.clamp(-1, 1),
        }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<i32> for Position {
    type Output = Position;

    fn mul(self, rhs: i32) -> Position {
        Position::new(self.x * rhs, self.y * rhs)
    }
}

/// Orthogonal direction of a conveyor belt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Right,
    Left,
    Up,
    Down,
}

impl Direction {
    /// Unit offset of one step in this direction.
    pub fn offset(self) -> Position {
        match self {
            Direction::Right => Position::new(1, 0),
            Direction::Left => Position::new(-1, 0),
            Direction::Up => Position::new(0, 1),
            Direction::Down => Position::new(0, -1),
        }
    }
}

/// Color shared by buttons, pressure plates and the spikes they control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    Red,
    Blue,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::Red, Color::Blue];
    pub const COUNT: usize = Self::ALL.len();

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The kind of a movable actor. Decides its move-offset table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    Crab,
    Octopus,
    Fish,
    Starfish,
    Penguin,
}

/// Tag of an [`EntityKind`] without its payload. A cell holds at most one entity per tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityTag {
    None,
    Wall,
    Chest,
    Spike,
    Button,
    Player,
    Ice,
    Conveyor,
    PressurePlate,
    Portal,
}

impl EntityTag {
    pub const COUNT: usize = 10;

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Everything that can be placed on a cell.
///
/// Equality and hashing look at the tag plus the fields that define the
/// variant's identity: colors for buttons, plates and spikes (spikes also
/// their initial state), the actor kind for players and the direction for
/// conveyors. A portal's destination is not part of its identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EntityKind {
    None,
    Wall,
    Chest,
    Spike { color: Color, extended: bool },
    Button { color: Color },
    Player { actor: ActorKind },
    Ice,
    Conveyor { direction: Direction },
    PressurePlate { color: Color },
    Portal { destination: Position },
}

impl EntityKind {
    pub fn tag(&self) -> EntityTag {
        match self {
            EntityKind::None => EntityTag::None,
            EntityKind::Wall => EntityTag::Wall,
            EntityKind::Chest => EntityTag::Chest,
            EntityKind::Spike { .. } => EntityTag::Spike,
            EntityKind::Button { .. } => EntityTag::Button,
            EntityKind::Player { .. } => EntityTag::Player,
            EntityKind::Ice => EntityTag::Ice,
            EntityKind::Conveyor { .. } => EntityTag::Conveyor,
            EntityKind::PressurePlate { .. } => EntityTag::PressurePlate,
            EntityKind::Portal { .. } => EntityTag::Portal,
        }
    }

    /// The color of a button, plate or spike.
    pub fn color(&self) -> Option<Color> {
        match *self {
            EntityKind::Spike { color, .. }
            | EntityKind::Button { color }
            | EntityKind::PressurePlate { color } => Some(color),
            _ => None,
        }
    }
}

impl PartialEq for EntityKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                EntityKind::Spike { color, extended },
                EntityKind::Spike {
                    color: other_color,
                    extended: other_extended,
                },
            ) => color == other_color && extended == other_extended,
            (EntityKind::Button { color }, EntityKind::Button { color: other })
            | (EntityKind::PressurePlate { color }, EntityKind::PressurePlate { color: other }) => {
                color == other
            }
            (EntityKind::Player { actor }, EntityKind::Player { actor: other }) => actor == other,
            (EntityKind::Conveyor { direction }, EntityKind::Conveyor { direction: other }) => {
                direction == other
            }
            _ => self.tag() == other.tag(),
        }
    }
}

impl Eq for EntityKind {}

impl Hash for EntityKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag().hash(state);
        match self {
            EntityKind::Spike { color, extended } => {
                color.hash(state);
                extended.hash(state);
            }
            EntityKind::Button { color } | EntityKind::PressurePlate { color } => color.hash(state),
            EntityKind::Player { actor } => actor.hash(state),
            EntityKind::Conveyor { direction } => direction.hash(state),
            _ => {}
        }
    }
}
