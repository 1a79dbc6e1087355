// layout.rs — per-surface grid geometry, computed once at init

use crate::canvas::Rect;
use crate::config::GridConfig;
use crate::error::GridError;

/// Immutable geometry of one surface's grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceLayout {
    pub columns: u32,
    pub rows: u32,
    pub cell_size: u32,
    pub gap: u32,
    /// Horizontal shift that centres the grid in the leftover pixel space.
    pub origin_offset: u32,
    pub width: u32,
    pub height: u32,
}

impl SurfaceLayout {
    pub fn compute(viewport_width: u32, grid: &GridConfig) -> Result<Self, GridError> {
        let pitch = grid.cell_size + grid.gap;
        if pitch == 0 || grid.surfaces == 0 {
            return Err(GridError::Layout(format!(
                "cell_size + gap = {pitch}, surfaces = {}",
                grid.surfaces
            )));
        }
        let columns = viewport_width / pitch;
        if columns == 0 {
            return Err(GridError::Layout(format!(
                "viewport width {viewport_width} is narrower than one cell pitch ({pitch})"
            )));
        }
        let rows = u32::try_from(grid.total_elements / grid.surfaces as u64 / columns as u64)
            .map_err(|_| {
                GridError::Layout(format!("{} elements need too many rows", grid.total_elements))
            })?;
        let height = rows.checked_mul(pitch).ok_or_else(|| {
            GridError::Layout(format!("{rows} rows of {pitch} px overflow the surface height"))
        })?;
        Ok(Self {
            columns,
            rows,
            cell_size: grid.cell_size,
            gap: grid.gap,
            origin_offset: (viewport_width % pitch).div_ceil(2),
            width: viewport_width,
            height,
        })
    }

    pub fn pitch(&self) -> u32 {
        self.cell_size + self.gap
    }

    pub fn cell_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Pixel square covered by the cell at (column, row).
    pub fn cell_rect(&self, column: u32, row: u32) -> Rect {
        Rect::new(
            self.origin_offset + self.pitch() * column,
            self.pitch() * row,
            self.cell_size,
            self.cell_size,
        )
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousand_pixel_viewport() {
        let l = SurfaceLayout::compute(1000, &GridConfig::default()).unwrap();
        assert_eq!(l.columns, 50);
        assert_eq!(l.rows, 200);
        assert_eq!(l.origin_offset, 0);
        assert_eq!(l.height, 4000);
        assert_eq!(l.cell_count(), 10_000);
    }

    #[test]
    fn leftover_space_centres_grid() {
        let l = SurfaceLayout::compute(1013, &GridConfig::default()).unwrap();
        assert_eq!(l.columns, 50);
        // 13 px leftover → ceil(6.5)
        assert_eq!(l.origin_offset, 7);
        assert_eq!(l.cell_rect(0, 0), Rect::new(7, 0, 16, 16));
        assert_eq!(l.cell_rect(2, 3), Rect::new(47, 60, 16, 16));
    }

    #[test]
    fn oversized_grid_is_an_error() {
        let huge = GridConfig {
            total_elements: u64::MAX,
            surfaces: 1,
            ..GridConfig::default()
        };
        assert!(matches!(
            SurfaceLayout::compute(1000, &huge),
            Err(GridError::Layout(_))
        ));

        // rows fit in u32 but their pixel height does not
        let tall = GridConfig {
            total_elements: 50 * 300_000_000,
            surfaces: 1,
            ..GridConfig::default()
        };
        assert!(matches!(
            SurfaceLayout::compute(1000, &tall),
            Err(GridError::Layout(_))
        ));
    }

    #[test]
    fn too_narrow_is_an_error() {
        assert!(matches!(
            SurfaceLayout::compute(19, &GridConfig::default()),
            Err(GridError::Layout(_))
        ));
    }
}
