use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{EntityKind, EntityTag, LevelError, Position};

/// An entity as authored into a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub position: Position,
    pub kind: EntityKind,
    /// Whether the level author lets the player remove this entity again.
    /// Irrelevant to simulation.
    pub editable: bool,
}

/// The immutable description of a level: its walkable cells and what sits on them.
///
/// Invariant: every placement lies on a position of the level, and a cell holds
/// at most one entity per [`EntityTag`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LevelData", into = "LevelData")]
pub struct Level {
    positions: HashSet<Position>,
    entities: HashMap<Position, BTreeMap<EntityTag, Placement>>,
    star_thresholds: Vec<usize>,
}

/// Flat, serializable form of a [`Level`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelData {
    pub positions: Vec<Position>,
    pub placements: Vec<Placement>,
    #[serde(default)]
    pub star_thresholds: Vec<usize>,
}

impl Level {
    pub fn new(positions: impl IntoIterator<Item = Position>) -> Self {
        Level {
            positions: positions.into_iter().collect(),
            entities: HashMap::new(),
            star_thresholds: Vec::new(),
        }
    }

    /// A `width` x `height` rectangle whose border cells hold fixed walls.
    pub fn bordered(width: i32, height: i32) -> Self {
        let mut level = Level::new(
            (0..width).flat_map(|x| (0..height).map(move |y| Position::new(x, y))),
        );
        for x in 0..width {
            for y in 0..height {
                if x == 0 || x == width - 1 || y == 0 || y == height - 1 {
                    level
                        .entities
                        .entry(Position::new(x, y))
                        .or_default()
                        .insert(
                            EntityTag::Wall,
                            Placement {
                                position: Position::new(x, y),
                                kind: EntityKind::Wall,
                                editable: false,
                            },
                        );
                }
            }
        }
        level
    }

    pub fn contains(&self, position: Position) -> bool {
        self.positions.contains(&position)
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions.iter().copied()
    }

    /// Positions sorted by `x`, then `y`. This order fixes entity order in a [`Puzzle`](crate::Puzzle).
    pub fn sorted_positions(&self) -> Vec<Position> {
        let mut positions: Vec<Position> = self.positions.iter().copied().collect();
        positions.sort_unstable();
        positions
    }

    /// Entities on one cell, ordered by tag.
    pub fn entities_at(&self, position: Position) -> impl Iterator<Item = &Placement> {
        self.entities
            .get(&position)
            .into_iter()
            .flat_map(|slots| slots.values())
    }

    pub fn entity_at(&self, position: Position, tag: EntityTag) -> Option<&Placement> {
        self.entities.get(&position)?.get(&tag)
    }

    /// All placements in stable order (sorted positions, then tag).
    pub fn placements(&self) -> Vec<Placement> {
        self.sorted_positions()
            .into_iter()
            .flat_map(|p| self.entities_at(p).copied().collect::<Vec<_>>())
            .collect()
    }

    pub fn can_add_entity(&self, position: Position, kind: &EntityKind) -> Result<(), LevelError> {
        if !self.contains(position) {
            return Err(LevelError::OutOfLevel(position));
        }
        let tag = kind.tag();
        if tag == EntityTag::None {
            return Err(LevelError::EmptyPlacement(position));
        }
        if self.entity_at(position, tag).is_some() {
            return Err(LevelError::Occupied { position, tag });
        }
        if let EntityKind::Portal { destination } = *kind {
            if !self.contains(destination) {
                return Err(LevelError::PortalOutOfLevel {
                    position,
                    destination,
                });
            }
        }
        Ok(())
    }

    /// Places an entity on a cell.
    pub fn add_entity(
        &mut self,
        position: Position,
        kind: EntityKind,
        editable: bool,
    ) -> Result<(), LevelError> {
        self.can_add_entity(position, &kind)?;
        self.entities.entry(position).or_default().insert(
            kind.tag(),
            Placement {
                position,
                kind,
                editable,
            },
        );
        Ok(())
    }

    /// Places two portals linked to each other. Either both are placed or neither.
    pub fn add_portal_pair(&mut self, a: Position, b: Position) -> Result<(), LevelError> {
        let to_b = EntityKind::Portal { destination: b };
        let to_a = EntityKind::Portal { destination: a };
        self.can_add_entity(a, &to_b)?;
        self.can_add_entity(b, &to_a)?;
        if a == b {
            return Err(LevelError::Occupied {
                position: a,
                tag: EntityTag::Portal,
            });
        }
        self.add_entity(a, to_b, true)?;
        self.add_entity(b, to_a, true)
    }

    /// Removes the editable entities on a cell and returns them.
    ///
    /// Removing a portal also removes the portal it links to.
    pub fn remove_at(&mut self, position: Position) -> Vec<Placement> {
        let mut removed = Vec::new();
        if let Some(slots) = self.entities.get_mut(&position) {
            slots.retain(|_, placement| {
                if placement.editable {
                    removed.push(*placement);
                    false
                } else {
                    true
                }
            });
        }

        for placement in &removed {
            if let EntityKind::Portal { destination } = placement.kind {
                let linked_editable = self
                    .entity_at(destination, EntityTag::Portal)
                    .is_some_and(|p| p.editable);
                if let (true, Some(slots)) = (linked_editable, self.entities.get_mut(&destination))
                {
                    slots.remove(&EntityTag::Portal);
                }
            }
        }
        self.entities.retain(|_, slots| !slots.is_empty());
        removed
    }

    pub fn star_thresholds(&self) -> &[usize] {
        &self.star_thresholds
    }

    pub fn set_star_thresholds(&mut self, thresholds: Vec<usize>) {
        self.star_thresholds = thresholds;
    }
}

impl TryFrom<LevelData> for Level {
    type Error = LevelError;

    fn try_from(data: LevelData) -> Result<Self, Self::Error> {
        let mut level = Level::new(data.positions);
        for placement in data.placements {
            level.add_entity(placement.position, placement.kind, placement.editable)?;
        }
        level.star_thresholds = data.star_thresholds;
        Ok(level)
    }
}

impl From<Level> for LevelData {
    fn from(level: Level) -> Self {
        LevelData {
            positions: level.sorted_positions(),
            placements: level.placements(),
            star_thresholds: level.star_thresholds,
        }
    }
}
