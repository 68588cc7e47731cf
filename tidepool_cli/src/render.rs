use tidepool_core::{
    ActorKind, Direction, EntityKind, EntityTag, Level, Position, Puzzle, TurnEvent,
    grid::{Grid, GridError},
};

/// Draws the puzzle's current state, top row first.
///
/// Players are capitals, lowercase once they stand on a chest. Levels whose
/// cells are too far apart to draw give [`GridError::TooLarge`].
pub fn render_board(level: &Level, puzzle: &Puzzle) -> Result<String, GridError> {
    let mut board: Grid<Option<char>> = Grid::covering(level.positions())?;
    for position in level.positions() {
        board.set(position, Some(glyph(puzzle, position)))?;
    }

    let mut rows = vec![String::with_capacity(board.width()); board.height()];
    for (position, cell) in board.enumerate() {
        let row = (position.y - board.origin().y) as usize;
        rows[row].push(cell.unwrap_or(' '));
    }
    rows.reverse();
    Ok(rows.join("\n"))
}

pub fn describe_event(puzzle: &Puzzle, event: &TurnEvent) -> String {
    let (verb, entity, from) = match *event {
        TurnEvent::Shift { entity, from } => ("pushed off", entity, from),
        TurnEvent::Teleport { entity, from } => ("teleported from", entity, from),
    };
    let name = puzzle
        .entity(entity)
        .actor()
        .map_or_else(|| format!("entity {entity}"), |actor| format!("{actor:?}"));
    format!("{name} {verb} ({}, {})", from.x, from.y)
}

fn glyph(puzzle: &Puzzle, position: Position) -> char {
    if let Some(actor) = puzzle
        .entity_at(position, EntityTag::Player)
        .and_then(|e| e.actor())
    {
        let c = match actor {
            ActorKind::Crab => 'C',
            ActorKind::Octopus => 'O',
            ActorKind::Fish => 'F',
            ActorKind::Starfish => 'S',
            ActorKind::Penguin => 'P',
        };
        return if puzzle.has_entity(position, EntityTag::Chest) {
            c.to_ascii_lowercase()
        } else {
            c
        };
    }

    if let Some(raised) = puzzle.is_spike_raised(position) {
        return if raised { '!' } else { ',' };
    }
    if let Some(button) = puzzle.entity_at(position, EntityTag::Button) {
        return if button.is_pressed() { '*' } else { 'o' };
    }
    if puzzle.has_entity(position, EntityTag::PressurePlate) {
        return '_';
    }
    if puzzle.has_entity(position, EntityTag::Portal) {
        return '@';
    }
    if let Some(EntityKind::Conveyor { direction }) = puzzle
        .entity_at(position, EntityTag::Conveyor)
        .map(|e| e.kind)
    {
        return match direction {
            Direction::Right => '>',
            Direction::Left => '<',
            Direction::Up => '^',
            Direction::Down => 'v',
        };
    }
    if puzzle.has_entity(position, EntityTag::Ice) {
        return '~';
    }
    if puzzle.has_entity(position, EntityTag::Chest) {
        return '$';
    }
    if puzzle.has_entity(position, EntityTag::Wall) {
        return '#';
    }
    '.'
}
