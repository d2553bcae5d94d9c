//! Astral entity taxonomy and wire text encoding
//!
//! Every cell of the megaverse holds exactly one entity. The remote API
//! describes cells with uppercase text (`"POLYANET"`, `"BLUE_SOLOON"`,
//! `"UP_COMETH"`, `"SPACE"`); mutation endpoints expect lowercase
//! attribute values.

use std::fmt;

/// Soloon color attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Blue,
    Red,
    Purple,
    White,
}

impl Color {
    /// Parse from descriptor text, case-insensitive
    pub fn parse(text: &str) -> Option<Color> {
        match text.to_ascii_uppercase().as_str() {
            "BLUE" => Some(Color::Blue),
            "RED" => Some(Color::Red),
            "PURPLE" => Some(Color::Purple),
            "WHITE" => Some(Color::White),
            _ => None,
        }
    }

    /// Wire attribute value for create calls
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Blue => "blue",
            Color::Red => "red",
            Color::Purple => "purple",
            Color::White => "white",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Color::Blue => "BLUE",
            Color::Red => "RED",
            Color::Purple => "PURPLE",
            Color::White => "WHITE",
        }
    }
}

/// Cometh drift direction attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Parse from descriptor text, case-insensitive
    pub fn parse(text: &str) -> Option<Direction> {
        match text.to_ascii_uppercase().as_str() {
            "UP" => Some(Direction::Up),
            "DOWN" => Some(Direction::Down),
            "LEFT" => Some(Direction::Left),
            "RIGHT" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Wire attribute value for create calls
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }
}

/// One cell's inhabitant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Entity {
    /// Empty space
    Space,
    Polyanet,
    Soloon(Color),
    Cometh(Direction),
}

impl Entity {
    /// Strict descriptor parse, case-insensitive.
    ///
    /// Blank text and `"SPACE"` parse to [`Entity::Space`]; text that
    /// matches no known entity returns `None` so callers can decide how
    /// loudly to normalize.
    pub fn parse_descriptor(text: &str) -> Option<Entity> {
        let upper = text.trim().to_ascii_uppercase();
        if upper.is_empty() || upper == "SPACE" {
            return Some(Entity::Space);
        }
        if upper == "POLYANET" {
            return Some(Entity::Polyanet);
        }
        if let Some(color) = upper.strip_suffix("_SOLOON").and_then(Color::parse) {
            return Some(Entity::Soloon(color));
        }
        if let Some(direction) = upper.strip_suffix("_COMETH").and_then(Direction::parse) {
            return Some(Entity::Cometh(direction));
        }
        None
    }

    #[inline]
    pub fn is_space(self) -> bool {
        matches!(self, Entity::Space)
    }

    /// Wire entity type for create/delete calls. Space has no endpoint.
    pub fn endpoint(self) -> Option<&'static str> {
        match self {
            Entity::Space => None,
            Entity::Polyanet => Some("polyanets"),
            Entity::Soloon(_) => Some("soloons"),
            Entity::Cometh(_) => Some("comeths"),
        }
    }

    /// Canonical descriptor text
    pub fn descriptor(self) -> String {
        match self {
            Entity::Space => "SPACE".to_string(),
            Entity::Polyanet => "POLYANET".to_string(),
            Entity::Soloon(color) => format!("{}_SOLOON", color.label()),
            Entity::Cometh(direction) => format!("{}_COMETH", direction.label()),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor())
    }
}
