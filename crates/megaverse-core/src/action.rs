//! Per-cell mutations derived from a grid comparison

use std::fmt;

use crate::{Entity, Position};

/// One create or delete of one entity at one position.
///
/// A cell whose occupant changes yields a Delete of the old entity
/// followed by a Create of the new one, in that order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Remove the entity currently occupying the cell
    Delete { position: Position, entity: Entity },
    /// Place the goal entity into the cell
    Create { position: Position, entity: Entity },
}

impl Action {
    pub fn position(&self) -> Position {
        match self {
            Action::Delete { position, .. } | Action::Create { position, .. } => *position,
        }
    }

    pub fn entity(&self) -> Entity {
        match self {
            Action::Delete { entity, .. } | Action::Create { entity, .. } => *entity,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Delete { position, entity } => {
                write!(f, "delete {} at {}", entity, position)
            }
            Action::Create { position, entity } => {
                write!(f, "create {} at {}", entity, position)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    #[test]
    fn test_action_accessors() {
        let action = Action::Create {
            position: Position::new(1, 2),
            entity: Entity::Soloon(Color::Blue),
        };
        assert_eq!(action.position(), Position::new(1, 2));
        assert_eq!(action.entity(), Entity::Soloon(Color::Blue));
    }

    #[test]
    fn test_action_display() {
        let action = Action::Delete {
            position: Position::new(0, 3),
            entity: Entity::Polyanet,
        };
        assert_eq!(action.to_string(), "delete POLYANET at (0, 3)");
    }
}
