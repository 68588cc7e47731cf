//! Per-actor move tables and candidate move generation.

use serde::{Deserialize, Serialize};

use crate::{ActorKind, EntityTag, Position, Puzzle};

/// One voluntary move of a single player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerMove {
    Stay,
    /// A single step; every cell along the way must be walkable.
    Walk { direction: Position },
    /// A starfish leap over the wall next to it. Only the landing cell matters.
    Jump { offset: Position },
}

const ORTHOGONAL: [PlayerMove; 5] = [
    PlayerMove::Stay,
    PlayerMove::walk(0, 1),
    PlayerMove::walk(0, -1),
    PlayerMove::walk(1, 0),
    PlayerMove::walk(-1, 0),
];

const EIGHT_WAY: [PlayerMove; 9] = [
    PlayerMove::Stay,
    PlayerMove::walk(0, 1),
    PlayerMove::walk(0, -1),
    PlayerMove::walk(1, 0),
    PlayerMove::walk(-1, 0),
    PlayerMove::walk(1, 1),
    PlayerMove::walk(1, -1),
    PlayerMove::walk(-1, 1),
    PlayerMove::walk(-1, -1),
];

const FISH: [PlayerMove; 4] = [
    PlayerMove::Stay,
    PlayerMove::walk(0, 1),
    PlayerMove::walk(1, 0),
    PlayerMove::walk(-1, -1),
];

impl PlayerMove {
    const fn walk(x: i32, y: i32) -> Self {
        PlayerMove::Walk {
            direction: Position::new(x, y),
        }
    }

    pub fn destination(self, from: Position) -> Position {
        match self {
            PlayerMove::Stay => from,
            PlayerMove::Walk { direction } => from + direction,
            PlayerMove::Jump { offset } => from + offset,
        }
    }

    pub fn is_valid(self, puzzle: &Puzzle, from: Position) -> bool {
        match self {
            PlayerMove::Stay => true,
            PlayerMove::Walk { .. } | PlayerMove::Jump { .. } => {
                puzzle.can_walk(self.destination(from))
            }
        }
    }

    pub fn walk_direction(self) -> Option<Position> {
        match self {
            PlayerMove::Walk { direction } => Some(direction),
            _ => None,
        }
    }
}

impl ActorKind {
    /// The move table before walls are taken into account.
    pub fn move_table(self) -> &'static [PlayerMove] {
        match self {
            ActorKind::Crab | ActorKind::Starfish | ActorKind::Penguin => &ORTHOGONAL,
            ActorKind::Octopus => &EIGHT_WAY,
            ActorKind::Fish => &FISH,
        }
    }
}

/// Every move a player may choose this turn.
///
/// A player sliding on ice whose next cell is walkable has no choice but to
/// keep sliding. Otherwise its move table is filtered to walkable landings,
/// `Stay` included; a starfish facing a wall jumps over it instead.
pub fn candidate_moves(
    puzzle: &Puzzle,
    actor: ActorKind,
    position: Position,
    sliding: Option<Position>,
) -> Vec<PlayerMove> {
    if let Some(direction) = sliding {
        if puzzle.can_walk(position + direction) {
            return vec![PlayerMove::Walk { direction }];
        }
    }

    actor
        .move_table()
        .iter()
        .map(|&mv| match (actor, mv) {
            (ActorKind::Starfish, PlayerMove::Walk { direction })
                if puzzle.has_entity(position + direction, EntityTag::Wall) =>
            {
                PlayerMove::Jump {
                    offset: direction * 2,
                }
            }
            _ => mv,
        })
        .filter(|mv| mv.is_valid(puzzle, position))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_level;

    fn destinations(moves: &[PlayerMove], from: Position) -> Vec<Position> {
        moves.iter().map(|m| m.destination(from)).collect()
    }

    #[test]
    fn crab_in_open_field_has_five_moves() {
        let level = parse_level(".. .. ..\n.. CR ..\n.. .. ..").unwrap();
        let puzzle = Puzzle::new(&level);
        let moves = candidate_moves(&puzzle, ActorKind::Crab, Position::new(1, 1), None);
        assert_eq!(moves.len(), 5);
        assert_eq!(moves[0], PlayerMove::Stay);
    }

    #[test]
    fn octopus_moves_diagonally() {
        let level = parse_level(".. .. ..\n.. OC ..\n.. .. ..").unwrap();
        let puzzle = Puzzle::new(&level);
        let moves = candidate_moves(&puzzle, ActorKind::Octopus, Position::new(1, 1), None);
        assert_eq!(moves.len(), 9);
        assert!(destinations(&moves, Position::new(1, 1)).contains(&Position::new(0, 0)));
    }

    #[test]
    fn fish_has_three_fixed_offsets() {
        let level = parse_level(".. .. ..\n.. FI ..\n.. .. ..").unwrap();
        let puzzle = Puzzle::new(&level);
        let from = Position::new(1, 1);
        let moves = candidate_moves(&puzzle, ActorKind::Fish, from, None);
        assert_eq!(
            destinations(&moves, from),
            vec![from, Position::new(1, 2), Position::new(2, 1), Position::new(0, 0)]
        );
    }

    #[test]
    fn walls_and_edges_filter_moves() {
        let level = parse_level("CR WL").unwrap();
        let puzzle = Puzzle::new(&level);
        let moves = candidate_moves(&puzzle, ActorKind::Crab, Position::ZERO, None);
        assert_eq!(moves, vec![PlayerMove::Stay]);
    }

    #[test]
    fn starfish_jumps_over_walls() {
        let level = parse_level("SF WL ..").unwrap();
        let puzzle = Puzzle::new(&level);
        let moves = candidate_moves(&puzzle, ActorKind::Starfish, Position::ZERO, None);
        assert_eq!(
            moves,
            vec![
                PlayerMove::Stay,
                PlayerMove::Jump {
                    offset: Position::new(2, 0)
                }
            ]
        );
    }

    #[test]
    fn starfish_cannot_jump_onto_a_wall_or_out_of_level() {
        let level = parse_level("SF WL WL").unwrap();
        let puzzle = Puzzle::new(&level);
        let moves = candidate_moves(&puzzle, ActorKind::Starfish, Position::ZERO, None);
        assert_eq!(moves, vec![PlayerMove::Stay]);

        let level = parse_level("SF WL").unwrap();
        let puzzle = Puzzle::new(&level);
        let moves = candidate_moves(&puzzle, ActorKind::Starfish, Position::ZERO, None);
        assert_eq!(moves, vec![PlayerMove::Stay]);
    }

    #[test]
    fn sliding_overrides_the_move_table() {
        let level = parse_level("OC+IC IC ..").unwrap();
        let puzzle = Puzzle::new(&level);
        let right = Position::new(1, 0);
        let moves = candidate_moves(&puzzle, ActorKind::Octopus, Position::ZERO, Some(right));
        assert_eq!(moves, vec![PlayerMove::Walk { direction: right }]);
    }

    #[test]
    fn blocked_slide_falls_back_to_the_table() {
        let level = parse_level("CR+IC WL").unwrap();
        let puzzle = Puzzle::new(&level);
        let right = Position::new(1, 0);
        let moves = candidate_moves(&puzzle, ActorKind::Crab, Position::ZERO, Some(right));
        assert_eq!(moves, vec![PlayerMove::Stay]);
    }
}
