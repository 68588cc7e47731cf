//! One-turn resolution of simultaneous multi-player moves.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    ActorKind, EntityId, EntityKind, EntityTag, Position, Puzzle, PuzzleState,
    moves::{PlayerMove, candidate_moves},
};

/// Something the playback layer should animate besides plain walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnEvent {
    /// A conveyor pushed `entity` off the cell at `from`.
    Shift { entity: EntityId, from: Position },
    /// A portal sent `entity` away from the cell at `from`.
    Teleport { entity: EntityId, from: Position },
}

/// A state reachable in one turn, with the events that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Successor {
    pub state: PuzzleState,
    pub events: Vec<TurnEvent>,
}

/// Why a move permutation produced no successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Two players would stand on `position` after conveyors moved them.
    ShiftCollision { position: Position },
    /// The portal on `portal` leads to a cell nobody can stand on.
    PortalBlocked { portal: Position },
    /// Two players would stand on `position` after portals moved them.
    TeleportCollision { position: Position },
    /// A player ended the turn on the raised spike at `position`.
    Spiked { position: Position },
}

/// The transition function over a [`Puzzle`].
///
/// Every query starts by restoring the given snapshot, so the puzzle's state
/// between calls is irrelevant.
pub struct PuzzleLogic<'a> {
    puzzle: &'a mut Puzzle,
}

impl<'a> PuzzleLogic<'a> {
    pub fn new(puzzle: &'a mut Puzzle) -> Self {
        PuzzleLogic { puzzle }
    }

    pub fn puzzle(&self) -> &Puzzle {
        self.puzzle
    }

    /// Candidate moves of every player, in player order.
    pub fn player_moves(&self) -> Vec<Vec<PlayerMove>> {
        self.puzzle
            .players()
            .map(|p| match p.actor() {
                Some(actor) => candidate_moves(self.puzzle, actor, p.position, p.sliding()),
                None => vec![PlayerMove::Stay],
            })
            .collect()
    }

    /// Every state reachable from `state` in one turn.
    pub fn next_states(&mut self, state: &PuzzleState) -> Vec<Successor> {
        self.puzzle.set_snapshot(state);

        let origins: Vec<Position> = self.puzzle.players().map(|p| p.position).collect();
        let actors: Vec<Option<ActorKind>> = self.puzzle.players().map(|p| p.actor()).collect();
        let choices = self.player_moves();

        let mut successors = Vec::new();
        for permutation in move_permutations(&origins, &choices) {
            if !penguins_agree(&actors, &choices, &permutation) {
                continue;
            }
            match self.try_move_players(state, &permutation) {
                Ok(successor) => successors.push(successor),
                Err(rejection) => trace!(?permutation, ?rejection, "move rejected"),
            }
        }
        successors
    }

    /// Resolves one turn in which player `i` makes `moves[i]`.
    ///
    /// Stages run in a fixed order: moves, conveyors, portals, ice, buttons,
    /// plates and parity, spikes. The puzzle is left in the resulting state on
    /// success and in an unspecified state on rejection.
    pub fn try_move_players(
        &mut self,
        state: &PuzzleState,
        moves: &[PlayerMove],
    ) -> Result<Successor, Rejection> {
        self.puzzle.set_snapshot(state);
        let ids = self.puzzle.entity_ids(EntityTag::Player).to_vec();
        debug_assert_eq!(ids.len(), moves.len());

        let origins: Vec<Position> = ids.iter().map(|&id| self.puzzle.entity(id).position).collect();
        let mut positions: Vec<Position> = origins
            .iter()
            .zip(moves)
            .map(|(&from, mv)| mv.destination(from))
            .collect();
        let mut events = Vec::new();

        let shifts = self.shift(&ids, &mut positions, &mut events)?;
        self.teleport(&ids, &mut positions, &mut events)?;

        for (i, &id) in ids.iter().enumerate() {
            // A player that ends still on ice keeps a zero slide and is stuck there.
            let sliding = self.puzzle.has_entity(positions[i], EntityTag::Ice).then(|| {
                shifts[i]
                    .unwrap_or(positions[i] - origins[i])
                    .clamp_unit()
            });
            self.puzzle.move_player(id, positions[i], sliding);
        }

        for i in 0..ids.len() {
            if positions[i] == origins[i] {
                continue;
            }
            if let Some(button) = self.puzzle.entity_id_at(positions[i], EntityTag::Button) {
                self.puzzle.toggle_button(button);
            }
        }

        self.puzzle.update_state();
        self.check_spikes(&positions)?;

        Ok(Successor {
            state: self.puzzle.snapshot(),
            events,
        })
    }

    /// Conveyors push each player one cell along the belt when that cell is walkable.
    /// Returns the push direction per player.
    fn shift(
        &self,
        ids: &[EntityId],
        positions: &mut [Position],
        events: &mut Vec<TurnEvent>,
    ) -> Result<Vec<Option<Position>>, Rejection> {
        let mut used = HashSet::with_capacity(positions.len());
        let mut shifts = vec![None; positions.len()];

        for (i, &id) in ids.iter().enumerate() {
            let from = positions[i];
            let mut to = from;
            if let Some(EntityKind::Conveyor { direction }) = self
                .puzzle
                .entity_at(from, EntityTag::Conveyor)
                .map(|e| e.kind)
            {
                let offset = direction.offset();
                if self.puzzle.can_walk(from + offset) {
                    to = from + offset;
                    shifts[i] = Some(offset);
                    events.push(TurnEvent::Shift { entity: id, from });
                }
            }
            if !used.insert(to) {
                return Err(Rejection::ShiftCollision { position: to });
            }
            positions[i] = to;
        }
        Ok(shifts)
    }

    /// Portals relocate each player standing on them to the linked cell.
    fn teleport(
        &self,
        ids: &[EntityId],
        positions: &mut [Position],
        events: &mut Vec<TurnEvent>,
    ) -> Result<(), Rejection> {
        let mut used = HashSet::with_capacity(positions.len());

        for (i, &id) in ids.iter().enumerate() {
            let from = positions[i];
            let mut to = from;
            if let Some(EntityKind::Portal { destination }) = self
                .puzzle
                .entity_at(from, EntityTag::Portal)
                .map(|e| e.kind)
            {
                if !self.puzzle.can_walk(destination) {
                    return Err(Rejection::PortalBlocked { portal: from });
                }
                to = destination;
                events.push(TurnEvent::Teleport { entity: id, from });
            }
            if !used.insert(to) {
                return Err(Rejection::TeleportCollision { position: to });
            }
            positions[i] = to;
        }
        Ok(())
    }

    fn check_spikes(&self, positions: &[Position]) -> Result<(), Rejection> {
        for &position in positions {
            if self.puzzle.is_spike_raised(position) == Some(true) {
                return Err(Rejection::Spiked { position });
            }
        }
        Ok(())
    }
}

/// Every combination of one candidate per player in which no two players pick
/// the same landing cell.
///
/// Enumerates depth first in player order, then candidate order. Recursion
/// depth equals the player count.
pub fn move_permutations(
    origins: &[Position],
    choices: &[Vec<PlayerMove>],
) -> Vec<Vec<PlayerMove>> {
    fn generate(
        depth: usize,
        origins: &[Position],
        choices: &[Vec<PlayerMove>],
        used: &mut HashSet<Position>,
        current: &mut Vec<PlayerMove>,
        out: &mut Vec<Vec<PlayerMove>>,
    ) {
        if depth == choices.len() {
            out.push(current.clone());
            return;
        }
        for &mv in &choices[depth] {
            let destination = mv.destination(origins[depth]);
            if !used.insert(destination) {
                continue;
            }
            current.push(mv);
            generate(depth + 1, origins, choices, used, current, out);
            current.pop();
            used.remove(&destination);
        }
    }

    let mut out = Vec::new();
    let mut used = HashSet::with_capacity(choices.len());
    let mut current = Vec::with_capacity(choices.len());
    generate(0, origins, choices, &mut used, &mut current, &mut out);
    out
}

/// Penguins move as a group.
///
/// All walking penguins must share one direction, and a penguin that stays put
/// must have been unable to walk that way.
pub fn penguins_agree(
    actors: &[Option<ActorKind>],
    choices: &[Vec<PlayerMove>],
    permutation: &[PlayerMove],
) -> bool {
    let mut group_direction: Option<Position> = None;
    let mut idle = Vec::new();

    for (i, mv) in permutation.iter().enumerate() {
        if actors[i] != Some(ActorKind::Penguin) {
            continue;
        }
        match *mv {
            PlayerMove::Walk { direction } if direction != Position::ZERO => {
                match group_direction {
                    None => group_direction = Some(direction),
                    Some(d) if d != direction => return false,
                    Some(_) => {}
                }
            }
            // A penguin frozen on ice walks in place, which counts as staying.
            PlayerMove::Stay | PlayerMove::Walk { .. } => idle.push(i),
            PlayerMove::Jump { .. } => {}
        }
    }

    let Some(direction) = group_direction else {
        return true;
    };
    !idle.iter().any(|&i| {
        choices[i]
            .iter()
            .any(|c| c.walk_direction() == Some(direction))
    })
}
