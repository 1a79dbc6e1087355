// render.rs — paints the grid and the selection highlight onto a canvas

use crate::canvas::{Canvas, Rect};
use crate::color::Rgba;
use crate::config::StyleConfig;
use crate::grid::{Cell, GridModel};
use crate::layout::SurfaceLayout;

/// Progress of a fade-in: painted at `step / total` opacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fade {
    pub step: u32,
    pub total: u32,
}

impl Fade {
    pub fn opacity(self) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        self.step.min(self.total) as f32 / self.total as f32
    }
}

pub struct Renderer {
    canvas: Box<dyn Canvas>,
    layout: SurfaceLayout,
    style: StyleConfig,
}

impl Renderer {
    /// Takes ownership of the canvas and sizes it to the grid.
    pub fn new(mut canvas: Box<dyn Canvas>, layout: SurfaceLayout, style: StyleConfig) -> Self {
        canvas.resize(layout.width, layout.height);
        Self {
            canvas,
            layout,
            style,
        }
    }

    pub fn canvas(&self) -> &dyn Canvas {
        self.canvas.as_ref()
    }

    pub fn clear(&mut self) {
        let (w, h) = self.canvas.size();
        self.canvas
            .fill_rect(Rect::new(0, 0, w, h), self.style.background.opaque());
    }

    pub fn draw_all(&mut self, grid: &GridModel) {
        for cell in grid.cells() {
            self.draw_cell(cell, None);
        }
    }

    pub fn draw_cell(&mut self, cell: &Cell, fade: Option<Fade>) {
        let rect = self.layout.cell_rect(cell.column, cell.row);
        let paint = match fade {
            Some(f) => Rgba::from_opacity(cell.color, f.opacity()),
            None => cell.color.opaque(),
        };
        self.canvas.fill_rect(rect, paint);

        if cell.selected {
            // Same pixels as a border_width stroke centred on the rect inset
            // by half the border width.
            self.canvas.stroke_rect(
                rect,
                self.style.border_color.opaque(),
                self.style.border_width,
            );
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
