//! Grid comparison

use megaverse_core::{Action, Grid, MegaverseError, MegaverseResult};

/// Compare two snapshots cell by cell.
///
/// Returns the row-major ordered action list that converges `observed`
/// toward `goal`: for each differing cell, a Delete of the current
/// occupant when the cell is inhabited, then a Create of the goal
/// occupant when the goal is not empty space. Equal cells emit nothing,
/// so replaying the list is idempotent.
pub fn diff(observed: &Grid, goal: &Grid) -> MegaverseResult<Vec<Action>> {
    if observed.dimensions() != goal.dimensions() {
        let (observed_rows, observed_columns) = observed.dimensions();
        let (goal_rows, goal_columns) = goal.dimensions();
        return Err(MegaverseError::DimensionMismatch {
            observed_rows,
            observed_columns,
            goal_rows,
            goal_columns,
        });
    }

    let mut actions = Vec::new();
    for ((position, current), (_, wanted)) in observed.cells().zip(goal.cells()) {
        if current == wanted {
            continue;
        }
        if !current.is_space() {
            actions.push(Action::Delete {
                position,
                entity: current,
            });
        }
        if !wanted.is_space() {
            actions.push(Action::Create {
                position,
                entity: wanted,
            });
        }
    }
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use megaverse_core::{Color, Direction, Entity, Position};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn grid_of(rows: Vec<Vec<Entity>>) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    #[test]
    fn test_single_create_on_empty_grid() {
        let observed = grid_of(vec![
            vec![Entity::Space, Entity::Space],
            vec![Entity::Space, Entity::Space],
        ]);
        let goal = grid_of(vec![
            vec![Entity::Polyanet, Entity::Space],
            vec![Entity::Space, Entity::Space],
        ]);

        let actions = diff(&observed, &goal).unwrap();
        assert_eq!(
            actions,
            vec![Action::Create {
                position: Position::new(0, 0),
                entity: Entity::Polyanet,
            }]
        );
    }

    #[test]
    fn test_replacement_deletes_before_creating() {
        let observed = grid_of(vec![vec![Entity::Soloon(Color::Red)]]);
        let goal = grid_of(vec![vec![Entity::Soloon(Color::Blue)]]);

        let actions = diff(&observed, &goal).unwrap();
        assert_eq!(
            actions,
            vec![
                Action::Delete {
                    position: Position::new(0, 0),
                    entity: Entity::Soloon(Color::Red),
                },
                Action::Create {
                    position: Position::new(0, 0),
                    entity: Entity::Soloon(Color::Blue),
                },
            ]
        );
    }

    #[test]
    fn test_matching_grids_need_nothing() {
        let grid = grid_of(vec![vec![
            Entity::Cometh(Direction::Up),
            Entity::Polyanet,
        ]]);

        assert!(diff(&grid, &grid).unwrap().is_empty());
    }

    #[test]
    fn test_cell_becoming_space_only_deletes() {
        let observed = grid_of(vec![vec![Entity::Polyanet]]);
        let goal = grid_of(vec![vec![Entity::Space]]);

        let actions = diff(&observed, &goal).unwrap();
        assert_eq!(
            actions,
            vec![Action::Delete {
                position: Position::new(0, 0),
                entity: Entity::Polyanet,
            }]
        );
    }

    #[test]
    fn test_dimension_mismatch_is_fatal() {
        let observed = grid_of(vec![vec![Entity::Space]]);
        let goal = grid_of(vec![vec![Entity::Space, Entity::Space]]);

        let err = diff(&observed, &goal).unwrap_err();
        assert!(matches!(
            err,
            MegaverseError::DimensionMismatch {
                observed_rows: 1,
                observed_columns: 1,
                goal_rows: 1,
                goal_columns: 2,
            }
        ));
    }

    fn entity() -> impl Strategy<Value = Entity> {
        prop_oneof![
            Just(Entity::Space),
            Just(Entity::Polyanet),
            prop_oneof![
                Just(Color::Blue),
                Just(Color::Red),
                Just(Color::Purple),
                Just(Color::White),
            ]
            .prop_map(Entity::Soloon),
            prop_oneof![
                Just(Direction::Up),
                Just(Direction::Down),
                Just(Direction::Left),
                Just(Direction::Right),
            ]
            .prop_map(Entity::Cometh),
        ]
    }

    fn grid(rows: usize, columns: usize) -> impl Strategy<Value = Grid> {
        proptest::collection::vec(proptest::collection::vec(entity(), columns), rows)
            .prop_map(|rows| Grid::from_rows(rows).unwrap())
    }

    fn grid_pair() -> impl Strategy<Value = (Grid, Grid)> {
        (1usize..6, 1usize..6).prop_flat_map(|(rows, columns)| {
            (grid(rows, columns), grid(rows, columns))
        })
    }

    proptest! {
        #[test]
        fn diff_of_identical_grids_is_empty((observed, _) in grid_pair()) {
            prop_assert!(diff(&observed, &observed).unwrap().is_empty());
        }

        #[test]
        fn applying_the_diff_converges((observed, goal) in grid_pair()) {
            let actions = diff(&observed, &goal).unwrap();

            let (rows, columns) = observed.dimensions();
            let mut cells: Vec<Vec<Entity>> = (0..rows)
                .map(|r| {
                    (0..columns)
                        .map(|c| observed.get(Position::new(r, c)).unwrap())
                        .collect()
                })
                .collect();

            for action in &actions {
                let p = action.position();
                match action {
                    Action::Delete { entity, .. } => {
                        prop_assert_eq!(cells[p.row][p.column], *entity);
                        cells[p.row][p.column] = Entity::Space;
                    }
                    Action::Create { entity, .. } => {
                        prop_assert!(cells[p.row][p.column].is_space());
                        cells[p.row][p.column] = *entity;
                    }
                }
            }

            let converged = Grid::from_rows(cells).unwrap();
            prop_assert_eq!(&converged, &goal);
            // rerunning finds nothing left to do
            prop_assert!(diff(&converged, &goal).unwrap().is_empty());
        }

        #[test]
        fn every_differing_cell_yields_one_ordered_group((observed, goal) in grid_pair()) {
            let actions = diff(&observed, &goal).unwrap();

            let mut groups: BTreeMap<Position, Vec<&Action>> = BTreeMap::new();
            for action in &actions {
                groups.entry(action.position()).or_default().push(action);
            }

            for (position, group) in &groups {
                prop_assert!(group.len() <= 2);
                let deletes = group
                    .iter()
                    .filter(|a| matches!(a, Action::Delete { .. }))
                    .count();
                let creates = group
                    .iter()
                    .filter(|a| matches!(a, Action::Create { .. }))
                    .count();
                prop_assert!(deletes <= 1);
                prop_assert!(creates <= 1);
                if group.len() == 2 {
                    prop_assert!(matches!(group[0], Action::Delete { .. }), "expected Delete first");
                    prop_assert!(matches!(group[1], Action::Create { .. }), "expected Create second");
                }
                prop_assert_ne!(observed.get(*position), goal.get(*position));
            }

            // and no differing cell is missing
            for (position, current) in observed.cells() {
                if goal.get(position) != Some(current) {
                    prop_assert!(groups.contains_key(&position));
                }
            }
        }
    }
}
