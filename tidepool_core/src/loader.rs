//! Text format for levels.
//!
//! One row per line, top row first, cells separated by whitespace. Each cell is
//! one or more two-character codes joined by `+`:
//!
//! | Code            | Meaning                                   |
//! |-----------------|-------------------------------------------|
//! | `..`            | floor                                     |
//! | `--`            | void, not part of the level               |
//! | `WL`            | wall                                      |
//! | `CH`            | chest                                     |
//! | `IC`            | ice                                       |
//! | `CR` `OC` `FI` `SF` `PG` | crab, octopus, fish, starfish, penguin |
//! | `BR` `BB`       | red / blue button                         |
//! | `PR` `PB`       | red / blue pressure plate                 |
//! | `SR` `SB`       | red / blue spike, extended at the start   |
//! | `Sr` `Sb`       | red / blue spike, retracted at the start  |
//! | `C>` `C<` `C^` `Cv` | conveyor                              |
//! | `T1` .. `T9`    | portal; both cells with a label link up   |
//!
//! Lines starting with `#` are comments and `stars: 3 5 8` sets the star
//! thresholds.

use std::collections::BTreeMap;

use crate::{ActorKind, Color, Direction, EntityKind, EntityTag, Level, LevelError, Position};

const STARS_DIRECTIVE: &str = "stars:";

/// Parses a level from its text form.
pub fn parse_level(map_string: &str) -> Result<Level, LevelError> {
    let mut rows: Vec<Vec<&str>> = Vec::new();
    let mut star_thresholds = Vec::new();

    for line in map_string.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(rest) = line.strip_prefix(STARS_DIRECTIVE) {
            star_thresholds = rest
                .split_whitespace()
                .map(|t| {
                    t.parse::<usize>()
                        .map_err(|_| LevelError::InvalidDirective(line.to_string()))
                })
                .collect::<Result<_, _>>()?;
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if let Some(first) = rows.first() {
            if tokens.len() != first.len() {
                return Err(LevelError::InconsistentWidth {
                    row: rows.len(),
                    expected: first.len(),
                    found: tokens.len(),
                });
            }
        }
        rows.push(tokens);
    }

    if rows.is_empty() {
        return Err(LevelError::EmptyMap);
    }

    let height = rows.len();
    let mut cells: Vec<(Position, Vec<EntityKind>)> = Vec::new();
    let mut portals: BTreeMap<char, Vec<Position>> = BTreeMap::new();

    for (row, tokens) in rows.iter().enumerate() {
        let y = (height - 1 - row) as i32;
        for (column, token) in tokens.iter().enumerate() {
            let position = Position::new(column as i32, y);
            if *token == "--" {
                continue;
            }
            let mut kinds = Vec::new();
            for code in token.split('+') {
                match parse_code(code) {
                    Some(Code::Floor) => {}
                    Some(Code::Entity(kind)) => kinds.push(kind),
                    Some(Code::Portal(label)) => portals.entry(label).or_default().push(position),
                    None => {
                        return Err(LevelError::UnknownToken {
                            token: code.to_string(),
                            row,
                            column,
                        });
                    }
                }
            }
            cells.push((position, kinds));
        }
    }

    let mut level = Level::new(cells.iter().map(|(p, _)| *p));
    for (position, kinds) in cells {
        for kind in kinds {
            level.add_entity(position, kind, false)?;
        }
    }
    for (label, ends) in portals {
        match ends[..] {
            [a, b] => level.add_portal_pair(a, b)?,
            _ => {
                return Err(LevelError::UnpairedPortal {
                    label,
                    count: ends.len(),
                });
            }
        }
    }
    level.set_star_thresholds(star_thresholds);
    Ok(level)
}

/// Writes a level back into its text form.
///
/// Portals are written in pairs when they link to each other; any other portal
/// wiring has no text form and is dropped.
pub fn write_level(level: &Level) -> String {
    let positions = level.sorted_positions();
    let Some(first) = positions.first() else {
        return String::new();
    };
    let (mut min, mut max) = (*first, *first);
    for p in &positions {
        min = Position::new(min.x.min(p.x), min.y.min(p.y));
        max = Position::new(max.x.max(p.x), max.y.max(p.y));
    }

    let mut labels: BTreeMap<Position, char> = BTreeMap::new();
    let mut next_label = b'1';
    for &p in &positions {
        if labels.contains_key(&p) || next_label > b'9' {
            continue;
        }
        if let Some(EntityKind::Portal { destination }) =
            level.entity_at(p, EntityTag::Portal).map(|e| e.kind)
        {
            let linked_back = matches!(
                level.entity_at(destination, EntityTag::Portal).map(|e| e.kind),
                Some(EntityKind::Portal { destination: back }) if back == p
            );
            if linked_back && destination != p {
                labels.insert(p, next_label as char);
                labels.insert(destination, next_label as char);
                next_label += 1;
            }
        }
    }

    let mut out = String::new();
    if !level.star_thresholds().is_empty() {
        let thresholds: Vec<String> = level
            .star_thresholds()
            .iter()
            .map(ToString::to_string)
            .collect();
        out.push_str(&format!("{STARS_DIRECTIVE} {}\n", thresholds.join(" ")));
    }

    for y in (min.y..=max.y).rev() {
        let row: Vec<String> = (min.x..=max.x)
            .map(|x| {
                let p = Position::new(x, y);
                if !level.contains(p) {
                    return "--".to_string();
                }
                let mut codes: Vec<String> = level
                    .entities_at(p)
                    .filter_map(|placement| match placement.kind {
                        EntityKind::Portal { .. } => labels.get(&p).map(|l| format!("T{l}")),
                        kind => code_for(&kind).map(str::to_string),
                    })
                    .collect();
                if codes.is_empty() {
                    codes.push("..".to_string());
                }
                codes.join("+")
            })
            .collect();
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}

enum Code {
    Floor,
    Entity(EntityKind),
    Portal(char),
}

fn parse_code(code: &str) -> Option<Code> {
    let kind = match code {
        ".." => return Some(Code::Floor),
        "WL" => EntityKind::Wall,
        "CH" => EntityKind::Chest,
        "IC" => EntityKind::Ice,
        "CR" => player(ActorKind::Crab),
        "OC" => player(ActorKind::Octopus),
        "FI" => player(ActorKind::Fish),
        "SF" => player(ActorKind::Starfish),
        "PG" => player(ActorKind::Penguin),
        "BR" => EntityKind::Button { color: Color::Red },
        "BB" => EntityKind::Button { color: Color::Blue },
        "PR" => EntityKind::PressurePlate { color: Color::Red },
        "PB" => EntityKind::PressurePlate { color: Color::Blue },
        "SR" => spike(Color::Red, true),
        "SB" => spike(Color::Blue, true),
        "Sr" => spike(Color::Red, false),
        "Sb" => spike(Color::Blue, false),
        "C>" => conveyor(Direction::Right),
        "C<" => conveyor(Direction::Left),
        "C^" => conveyor(Direction::Up),
        "Cv" => conveyor(Direction::Down),
        _ => {
            let mut chars = code.chars();
            return match (chars.next(), chars.next(), chars.next()) {
                (Some('T'), Some(label @ '1'..='9'), None) => Some(Code::Portal(label)),
                _ => None,
            };
        }
    };
    Some(Code::Entity(kind))
}

fn code_for(kind: &EntityKind) -> Option<&'static str> {
    Some(match *kind {
        EntityKind::None | EntityKind::Portal { .. } => return None,
        EntityKind::Wall => "WL",
        EntityKind::Chest => "CH",
        EntityKind::Ice => "IC",
        EntityKind::Player { actor } => match actor {
            ActorKind::Crab => "CR",
            ActorKind::Octopus => "OC",
            ActorKind::Fish => "FI",
            ActorKind::Starfish => "SF",
            ActorKind::Penguin => "PG",
        },
        EntityKind::Button { color: Color::Red } => "BR",
        EntityKind::Button { color: Color::Blue } => "BB",
        EntityKind::PressurePlate { color: Color::Red } => "PR",
        EntityKind::PressurePlate { color: Color::Blue } => "PB",
        EntityKind::Spike { color, extended } => match (color, extended) {
            (Color::Red, true) => "SR",
            (Color::Blue, true) => "SB",
            (Color::Red, false) => "Sr",
            (Color::Blue, false) => "Sb",
        },
        EntityKind::Conveyor { direction } => match direction {
            Direction::Right => "C>",
            Direction::Left => "C<",
            Direction::Up => "C^",
            Direction::Down => "Cv",
        },
    })
}

fn player(actor: ActorKind) -> EntityKind {
    EntityKind::Player { actor }
}

fn spike(color: Color, extended: bool) -> EntityKind {
    EntityKind::Spike { color, extended }
}

fn conveyor(direction: Direction) -> EntityKind {
    EntityKind::Conveyor { direction }
}
