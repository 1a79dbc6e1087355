// grid.rs — per-surface cell store
//
// Dense storage: cell (column, row) lives at `row * columns + column`.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::color::Rgb;
use crate::error::GridError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub column: u32,
    pub row: u32,
    pub color: Rgb,
    pub selected: bool,
}

#[derive(Debug, Default)]
pub struct GridModel {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl GridModel {
    /// Fill a `columns × rows` grid with random shades from `palette`.
    pub fn initialize<R: Rng + ?Sized>(
        columns: u32,
        rows: u32,
        palette: &[Rgb],
        rng: &mut R,
    ) -> Self {
        let mut cells = Vec::with_capacity(columns as usize * rows as usize);
        for row in 0..rows {
            for column in 0..columns {
                cells.push(Cell {
                    column,
                    row,
                    color: palette.choose(rng).copied().unwrap_or(Rgb::WHITE),
                    selected: false,
                });
            }
        }
        Self {
            columns,
            rows,
            cells,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn index_of(&self, column: u32, row: u32) -> Option<usize> {
        (column < self.columns && row < self.rows)
            .then(|| row as usize * self.columns as usize + column as usize)
    }

    pub fn get(&self, column: u32, row: u32) -> Result<&Cell, GridError> {
        self.index_of(column, row)
            .map(|i| &self.cells[i])
            .ok_or(GridError::CellOutOfRange {
                column: column.into(),
                row: row.into(),
            })
    }

    /// Cell by dense index. Panics if `index >= len()`.
    pub fn at(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub fn set_color(&mut self, column: u32, row: u32, color: Rgb) {
        let i = self.dense(column, row);
        self.cells[i].color = color;
    }

    pub fn set_selected(&mut self, column: u32, row: u32, selected: bool) {
        let i = self.dense(column, row);
        self.cells[i].selected = selected;
    }

    pub fn set_color_at(&mut self, index: usize, color: Rgb) {
        self.cells[index].color = color;
    }

    pub fn set_selected_at(&mut self, index: usize, selected: bool) {
        self.cells[index].selected = selected;
    }

    fn dense(&self, column: u32, row: u32) -> usize {
        row as usize * self.columns as usize + column as usize
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StyleConfig;
    use rand::{rngs::StdRng, SeedableRng};

    fn grid(columns: u32, rows: u32) -> GridModel {
        let palette = StyleConfig::default().palette;
        GridModel::initialize(columns, rows, &palette, &mut StdRng::seed_from_u64(1))
    }

    #[test]
    fn initialize_uses_palette_and_clears_selection() {
        let palette = StyleConfig::default().palette;
        let g = grid(50, 200);
        assert_eq!(g.len(), 10_000);
        assert!(g.cells().iter().all(|c| !c.selected));
        assert!(g.cells().iter().all(|c| palette.contains(&c.color)));
        // all four shades show up in a grid this size
        for shade in palette {
            assert!(g.cells().iter().any(|c| c.color == shade));
        }
    }

    #[test]
    fn cells_know_their_position() {
        let g = grid(7, 3);
        for row in 0..3 {
            for column in 0..7 {
                let c = g.get(column, row).unwrap();
                assert_eq!((c.column, c.row), (column, row));
            }
        }
        assert_eq!(g.index_of(2, 1), Some(9));
    }

    #[test]
    fn get_out_of_range() {
        let g = grid(7, 3);
        assert!(matches!(
            g.get(7, 0),
            Err(GridError::CellOutOfRange { column: 7, row: 0 })
        ));
        assert!(g.get(0, 3).is_err());
        assert_eq!(g.index_of(0, 3), None);
    }

    #[test]
    fn mutators_touch_one_cell() {
        let mut g = grid(4, 4);
        let before: Vec<Cell> = g.cells().to_vec();
        g.set_color(1, 2, Rgb::new(1, 2, 3));
        g.set_selected(1, 2, true);
        for (i, c) in g.cells().iter().enumerate() {
            if i == g.index_of(1, 2).unwrap() {
                assert_eq!(c.color, Rgb::new(1, 2, 3));
                assert!(c.selected);
            } else {
                assert_eq!(*c, before[i]);
            }
        }
    }
}
