// protocol.rs — one-way messages between the controller and its workers
//
// Controller → worker travels as `ToWorker` over a calloop channel, so the
// canvas can be moved in by value. Worker → controller travels as
// `SelectionReport` over a crossbeam channel shared by all workers.
//
// The driver binary also accepts a newline-delimited JSON form of the
// controller's inputs:
//
//   { "type": "click", "page_x": 34, "page_y": 4010 }
//   { "type": "click_surface", "surface": 2, "x": 34, "y": 10 }
//   { "type": "close", "surface": 2 }
//   { "type": "quit" }
//
// Anything else is a `MalformedMessage` and is dropped.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::canvas::Canvas;
use crate::color::Rgb;
use crate::error::GridError;

// ── controller → worker ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClickEvent {
    pub page_x: f64,
    pub page_y: f64,
    pub surface_left: f64,
    pub surface_top: f64,
    pub surface_index: usize,
}

/// A cell previously reported by a worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRef {
    pub column: u32,
    pub row: u32,
}

pub enum ToWorker {
    /// Hands the worker its canvas. Exactly one per worker, sent first.
    Init {
        canvas: Box<dyn Canvas>,
        viewport_width: u32,
        surface_index: usize,
    },
    Click(ClickEvent),
    /// The popup closed; clear the selection on `cell` if there is one.
    Close { cell: Option<CellRef> },
}

impl fmt::Debug for ToWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init {
                canvas,
                viewport_width,
                surface_index,
            } => f
                .debug_struct("Init")
                .field("canvas_size", &canvas.size())
                .field("viewport_width", viewport_width)
                .field("surface_index", surface_index)
                .finish(),
            Self::Click(ev) => f.debug_tuple("Click").field(ev).finish(),
            Self::Close { cell } => f.debug_struct("Close").field("cell", cell).finish(),
        }
    }
}

// ── worker → controller ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionReport {
    pub surface_index: usize,
    pub column: u32,
    pub row: u32,
    pub color: Rgb,
    pub rows_per_surface: u32,
}

impl SelectionReport {
    /// Row counted across all surfaces stacked top to bottom.
    pub fn global_row(&self) -> u64 {
        self.row as u64 + self.rows_per_surface as u64 * self.surface_index as u64
    }

    pub fn hex(&self) -> String {
        self.color.to_hex()
    }

    pub fn cell(&self) -> CellRef {
        CellRef {
            column: self.column,
            row: self.row,
        }
    }
}

// ── driver commands ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Page-relative click; the controller finds the surface under it.
    Click { page_x: f64, page_y: f64 },
    /// Surface-relative click.
    ClickSurface { surface: usize, x: f64, y: f64 },
    /// Close the popup for `surface`.
    Close { surface: usize },
    Quit,
}

impl Command {
    pub fn decode(line: &str) -> Result<Self, GridError> {
        serde_json::from_str(line.trim()).map_err(|e| GridError::MalformedMessage(e.to_string()))
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
