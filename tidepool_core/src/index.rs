use std::collections::HashMap;

use crate::{
    ActorKind, Color, EntityId, EntityKind, EntityTag, Level, PlayerState, Position, PuzzleState,
    ReducedPuzzleState,
};

/// Per-instance mutable state, parallel to [`EntityKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    Fixed,
    Button { pressed: bool },
    Plate { pressed: bool },
    Player { sliding: Option<Position> },
}

impl EntityState {
    fn initial(kind: &EntityKind) -> Self {
        match kind {
            EntityKind::Button { .. } => EntityState::Button { pressed: false },
            EntityKind::PressurePlate { .. } => EntityState::Plate { pressed: false },
            EntityKind::Player { .. } => EntityState::Player { sliding: None },
            _ => EntityState::Fixed,
        }
    }
}

/// A live entity inside a [`Puzzle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub kind: EntityKind,
    pub position: Position,
    pub state: EntityState,
}

impl Entity {
    pub fn actor(&self) -> Option<ActorKind> {
        match self.kind {
            EntityKind::Player { actor } => Some(actor),
            _ => None,
        }
    }

    pub fn is_pressed(&self) -> bool {
        matches!(
            self.state,
            EntityState::Button { pressed: true } | EntityState::Plate { pressed: true }
        )
    }

    pub fn sliding(&self) -> Option<Position> {
        match self.state {
            EntityState::Player { sliding } => sliding,
            _ => None,
        }
    }
}

/// Slots of one walkable cell, one per [`EntityTag`].
#[derive(Debug, Clone, Default)]
struct Cell {
    slots: [Option<EntityId>; EntityTag::COUNT],
}

/// Mutable spatial index over a [`Level`].
///
/// Gives constant-time position/entity lookups and owns the live state of the
/// dynamic entities: player positions and sliding directions, pressed flags and
/// the toggle parity of each color. Build one per solve or replay; it is
/// rewritten in place every turn.
///
/// Cells are keyed by position, so memory follows the number of walkable
/// cells and not the extent of the level.
#[derive(Debug, Clone)]
pub struct Puzzle {
    cells: HashMap<Position, Cell>,
    entities: Vec<Entity>,
    by_tag: HashMap<EntityTag, Vec<EntityId>>,
    /// Where each entity is currently filed in `cells`.
    indexed_positions: Vec<Position>,
    toggles: [bool; Color::COUNT],
}

impl Puzzle {
    /// Indexes every cell of `level` and derives the starting plate and
    /// parity state.
    ///
    /// Entities are numbered in `(x, y)` order of their cells, so player `i`
    /// of every snapshot is always the same player.
    pub fn new(level: &Level) -> Self {
        let positions = level.sorted_positions();
        let mut cells = HashMap::with_capacity(positions.len());
        let mut entities = Vec::new();
        let mut by_tag: HashMap<EntityTag, Vec<EntityId>> = HashMap::new();

        for &position in &positions {
            let mut cell = Cell::default();
            for placement in level.entities_at(position) {
                let id = entities.len();
                let tag = placement.kind.tag();
                entities.push(Entity {
                    kind: placement.kind,
                    position,
                    state: EntityState::initial(&placement.kind),
                });
                by_tag.entry(tag).or_default().push(id);
                cell.slots[tag.index()] = Some(id);
            }
            cells.insert(position, cell);
        }

        let indexed_positions = entities.iter().map(|e| e.position).collect();
        let mut puzzle = Puzzle {
            cells,
            entities,
            by_tag,
            indexed_positions,
            toggles: [false; Color::COUNT],
        };
        puzzle.update_state();
        puzzle
    }

    /// Whether `position` is a cell of the level.
    #[inline]
    pub fn is_valid_position(&self, position: Position) -> bool {
        self.cells.contains_key(&position)
    }

    /// A valid position without a wall.
    #[inline]
    pub fn can_walk(&self, position: Position) -> bool {
        self.is_valid_position(position) && !self.has_entity(position, EntityTag::Wall)
    }

    #[inline]
    pub fn has_entity(&self, position: Position, tag: EntityTag) -> bool {
        self.entity_id_at(position, tag).is_some()
    }

    /// Returns the id of the entity with `tag` on `position`.
    ///
    /// # Arguments
    ///
    /// * `position` - Any position; cells outside the level hold nothing.
    /// * `tag` - The slot to read. Players are found where they currently stand.
    pub fn entity_id_at(&self, position: Position, tag: EntityTag) -> Option<EntityId> {
        self.cells.get(&position)?.slots[tag.index()]
    }

    pub fn entity_at(&self, position: Position, tag: EntityTag) -> Option<&Entity> {
        self.entity_id_at(position, tag).map(|id| &self.entities[id])
    }

    /// # Panics
    ///
    /// Panics if `id` was not handed out by this puzzle.
    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id]
    }

    /// Ids of every entity with the given tag, in the puzzle's fixed order.
    pub fn entity_ids(&self, tag: EntityTag) -> &[EntityId] {
        self.by_tag.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn entities_of(&self, tag: EntityTag) -> impl Iterator<Item = &Entity> {
        self.entity_ids(tag).iter().map(|&id| &self.entities[id])
    }

    /// Players in the order used by [`PuzzleState::players`].
    pub fn players(&self) -> impl Iterator<Item = &Entity> {
        self.entities_of(EntityTag::Player)
    }

    pub fn player_count(&self) -> usize {
        self.entity_ids(EntityTag::Player).len()
    }

    /// Parity of pressed buttons plus occupied plates of `color`.
    pub fn toggle_state(&self, color: Color) -> bool {
        self.toggles[color.index()]
    }

    /// Whether the spike on `position` currently blocks the cell.
    ///
    /// Returns `None` when the cell holds no spike.
    pub fn is_spike_raised(&self, position: Position) -> Option<bool> {
        match self.entity_at(position, EntityTag::Spike)?.kind {
            EntityKind::Spike { color, extended } => Some(extended != self.toggle_state(color)),
            _ => None,
        }
    }

    /// Captures the player and button state. Plates and parity are derived
    /// from it again by [`Puzzle::set_snapshot`].
    pub fn snapshot(&self) -> PuzzleState {
        PuzzleState {
            players: self
                .players()
                .map(|p| PlayerState {
                    position: p.position,
                    sliding: p.sliding(),
                })
                .collect(),
            buttons: self
                .entities_of(EntityTag::Button)
                .map(Entity::is_pressed)
                .collect(),
        }
    }

    /// Like [`Puzzle::snapshot`], but buttons are folded into the toggle
    /// parity of each color.
    ///
    /// Two states with the same reduced snapshot have the same successors,
    /// so the solver keys its visited set on this.
    pub fn reduced_snapshot(&self) -> ReducedPuzzleState {
        let mut toggles = vec![false; Color::COUNT];
        let pressed = self
            .entities_of(EntityTag::Button)
            .chain(self.entities_of(EntityTag::PressurePlate))
            .filter(|e| e.is_pressed());
        for entity in pressed {
            if let Some(color) = entity.kind.color() {
                toggles[color.index()] = !toggles[color.index()];
            }
        }

        ReducedPuzzleState {
            players: self
                .players()
                .map(|p| PlayerState {
                    position: p.position,
                    sliding: p.sliding(),
                })
                .collect(),
            toggles,
        }
    }

    /// Restores a snapshot taken from this puzzle, re-indexing players and
    /// recomputing plates and color parity.
    pub fn set_snapshot(&mut self, state: &PuzzleState) {
        debug_assert_eq!(state.players.len(), self.player_count());
        debug_assert_eq!(state.buttons.len(), self.entity_ids(EntityTag::Button).len());

        let players = self.entity_ids(EntityTag::Player).to_vec();
        for (&id, player) in players.iter().zip(&state.players) {
            let entity = &mut self.entities[id];
            entity.position = player.position;
            entity.state = EntityState::Player {
                sliding: player.sliding,
            };
        }

        let buttons = self.entity_ids(EntityTag::Button).to_vec();
        for (&id, &pressed) in buttons.iter().zip(&state.buttons) {
            self.entities[id].state = EntityState::Button { pressed };
        }

        self.update_state();
    }

    /// True iff at least one player exists and every player stands on a chest.
    pub fn is_won(&self) -> bool {
        self.player_count() > 0
            && self
                .players()
                .all(|p| self.has_entity(p.position, EntityTag::Chest))
    }

    pub(crate) fn move_player(&mut self, id: EntityId, position: Position, sliding: Option<Position>) {
        let entity = &mut self.entities[id];
        entity.position = position;
        entity.state = EntityState::Player { sliding };
    }

    pub(crate) fn toggle_button(&mut self, id: EntityId) {
        if let EntityState::Button { pressed } = &mut self.entities[id].state {
            *pressed = !*pressed;
        }
    }

    /// Files moved players under their new cells, then recomputes plate
    /// occupancy and the toggle parity of every color.
    pub(crate) fn update_state(&mut self) {
        let players = self.entity_ids(EntityTag::Player).to_vec();
        let slot = EntityTag::Player.index();

        for &id in &players {
            let from = self.indexed_positions[id];
            if let Some(cell) = self.cells.get_mut(&from) {
                if cell.slots[slot] == Some(id) {
                    cell.slots[slot] = None;
                }
            }
        }
        for &id in &players {
            let to = self.entities[id].position;
            if let Some(cell) = self.cells.get_mut(&to) {
                cell.slots[slot] = Some(id);
            }
            self.indexed_positions[id] = to;
        }

        let mut counts = [0usize; Color::COUNT];
        for button in self.entities_of(EntityTag::Button) {
            if let (true, Some(color)) = (button.is_pressed(), button.kind.color()) {
                counts[color.index()] += 1;
            }
        }

        let plates = self.entity_ids(EntityTag::PressurePlate).to_vec();
        for id in plates {
            let occupied = self.has_entity(self.entities[id].position, EntityTag::Player);
            if let (true, Some(color)) = (occupied, self.entities[id].kind.color()) {
                counts[color.index()] += 1;
            }
            self.entities[id].state = EntityState::Plate { pressed: occupied };
        }

        for color in Color::ALL {
            self.toggles[color.index()] = counts[color.index()] % 2 == 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_level;

    #[test]
    fn lookups_follow_the_level() {
        let level = parse_level("CR .. WL --\n.. CH .. ..").unwrap();
        let puzzle = Puzzle::new(&level);

        // Row 0 is the top row, so the crab sits at y = 1.
        assert!(puzzle.has_entity(Position::new(0, 1), EntityTag::Player));
        assert!(puzzle.has_entity(Position::new(1, 0), EntityTag::Chest));
        assert!(puzzle.is_valid_position(Position::new(2, 1)));
        assert!(!puzzle.can_walk(Position::new(2, 1)));
        assert!(!puzzle.is_valid_position(Position::new(3, 1)));
        assert!(!puzzle.is_valid_position(Position::new(-1, 0)));
        assert_eq!(puzzle.player_count(), 1);
    }

    #[test]
    fn far_apart_cells_stay_cheap() {
        let far = Position::new(200_000, 200_000);
        let mut level = Level::new([Position::ZERO, far]);
        level
            .add_entity(
                Position::ZERO,
                EntityKind::Player {
                    actor: ActorKind::Crab,
                },
                false,
            )
            .unwrap();
        level.add_entity(far, EntityKind::Chest, false).unwrap();

        let puzzle = Puzzle::new(&level);
        assert!(puzzle.is_valid_position(far));
        assert!(puzzle.has_entity(far, EntityTag::Chest));
        assert!(!puzzle.is_valid_position(Position::new(1, 0)));
        assert_eq!(puzzle.cells.len(), 2);
        assert!(!puzzle.is_won());
    }

    #[test]
    fn zero_players_is_never_won() {
        let level = parse_level("CH ..").unwrap();
        let puzzle = Puzzle::new(&level);
        assert!(!puzzle.is_won());
    }

    #[test]
    fn won_when_every_player_is_on_a_chest() {
        let level = parse_level("CR+CH FI ..\n.. .. CH").unwrap();
        let mut puzzle = Puzzle::new(&level);
        assert!(!puzzle.is_won());

        let mut state = puzzle.snapshot();
        // Players are ordered by x, then y: crab (0, 1), then fish (1, 1).
        state.players[1].position = Position::new(2, 0);
        puzzle.set_snapshot(&state);
        assert!(puzzle.is_won());
        assert!(puzzle.has_entity(Position::new(2, 0), EntityTag::Player));
        assert!(!puzzle.has_entity(Position::new(1, 1), EntityTag::Player));
    }

    #[test]
    fn snapshot_roundtrip_is_a_noop() {
        let level = parse_level("CR BR .. BR\nPR .. OC BB").unwrap();
        let mut puzzle = Puzzle::new(&level);
        let mut state = puzzle.snapshot();
        state.buttons[0] = true;
        state.players[1].sliding = Some(Position::new(1, 0));
        puzzle.set_snapshot(&state);

        let toggles_before: Vec<bool> = Color::ALL.iter().map(|&c| puzzle.toggle_state(c)).collect();
        let reduced_before = puzzle.reduced_snapshot();
        puzzle.set_snapshot(&puzzle.snapshot());
        assert_eq!(puzzle.snapshot(), state);
        assert_eq!(puzzle.reduced_snapshot(), reduced_before);
        let toggles_after: Vec<bool> = Color::ALL.iter().map(|&c| puzzle.toggle_state(c)).collect();
        assert_eq!(toggles_before, toggles_after);
    }

    #[test]
    fn plates_count_towards_parity() {
        // Crab starts on the red plate: red parity is odd from the start.
        let level = parse_level("CR+PR .. BR").unwrap();
        let mut puzzle = Puzzle::new(&level);
        assert!(puzzle.toggle_state(Color::Red));
        assert!(!puzzle.toggle_state(Color::Blue));

        let mut state = puzzle.snapshot();
        state.buttons[0] = true;
        puzzle.set_snapshot(&state);
        // Plate plus button: even.
        assert!(!puzzle.toggle_state(Color::Red));
        assert_eq!(puzzle.reduced_snapshot().toggles, vec![false, false]);
    }

    #[test]
    fn reduced_key_ignores_which_button_is_pressed() {
        let level = parse_level("CR BR BR ..").unwrap();
        let mut puzzle = Puzzle::new(&level);

        let mut first = puzzle.snapshot();
        first.buttons = vec![true, false];
        puzzle.set_snapshot(&first);
        let first_key = puzzle.reduced_snapshot();

        let mut second = puzzle.snapshot();
        second.buttons = vec![false, true];
        puzzle.set_snapshot(&second);
        let second_key = puzzle.reduced_snapshot();

        assert_ne!(first, second);
        assert_eq!(first_key, second_key);
    }

    #[test]
    fn spike_raised_follows_parity() {
        let level = parse_level("CR SR Sr BR").unwrap();
        let mut puzzle = Puzzle::new(&level);
        assert_eq!(puzzle.is_spike_raised(Position::new(1, 0)), Some(true));
        assert_eq!(puzzle.is_spike_raised(Position::new(2, 0)), Some(false));
        assert_eq!(puzzle.is_spike_raised(Position::new(0, 0)), None);

        let mut state = puzzle.snapshot();
        state.buttons[0] = true;
        puzzle.set_snapshot(&state);
        assert_eq!(puzzle.is_spike_raised(Position::new(1, 0)), Some(false));
        assert_eq!(puzzle.is_spike_raised(Position::new(2, 0)), Some(true));
    }
}
