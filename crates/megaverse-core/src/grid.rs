//! Grid snapshots of the megaverse

use std::fmt;

use crate::{Entity, MegaverseError, MegaverseResult, Position};

/// Rectangular snapshot of entities, row-major
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<Entity>>,
}

impl Grid {
    /// Build from rows, validating that every row has the same length
    pub fn from_rows(rows: Vec<Vec<Entity>>) -> MegaverseResult<Self> {
        let expected = rows.first().map(Vec::len).unwrap_or(0);
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != expected {
                return Err(MegaverseError::RaggedGrid {
                    row,
                    expected,
                    got: cells.len(),
                });
            }
        }
        Ok(Grid { rows })
    }

    /// (rows, columns)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.height(), self.width())
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.height() * self.width()
    }

    /// Entity at a position, if in bounds
    pub fn get(&self, position: Position) -> Option<Entity> {
        self.rows
            .get(position.row)
            .and_then(|row| row.get(position.column))
            .copied()
    }

    /// Iterate all cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (Position, Entity)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(column, &entity)| (Position::new(row, column), entity))
        })
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cells in &self.rows {
            let line: Vec<String> = cells.iter().map(|e| e.descriptor()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
