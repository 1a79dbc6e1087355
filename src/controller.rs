// controller.rs — owns the workers, routes clicks, collects popup data
//
// Surfaces are stacked top to bottom at left offset 0, each `layout.height`
// pixels tall, so a page coordinate maps to exactly one surface.

use std::fmt;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::canvas::PixelCanvas;
use crate::config::Config;
use crate::error::{GridError, Result};
use crate::layout::SurfaceLayout;
use crate::protocol::{ClickEvent, SelectionReport, ToWorker};
use crate::worker::{spawn_worker, WorkerHandle};

/// What the shared popup shows for a selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Popup {
    pub surface_index: usize,
    pub column: u32,
    pub row: u64,
    pub color: String,
}

impl From<&SelectionReport> for Popup {
    fn from(r: &SelectionReport) -> Self {
        Self {
            surface_index: r.surface_index,
            column: r.column,
            row: r.global_row(),
            color: r.hex(),
        }
    }
}

impl fmt::Display for Popup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Column: {}  Row: {}  Color: {}",
            self.column, self.row, self.color
        )
    }
}

pub struct Controller {
    workers: Vec<WorkerHandle>,
    reports: Receiver<SelectionReport>,
    layout: SurfaceLayout,
    /// Last report per surface; what `close` hands back to the worker.
    last: Vec<Option<SelectionReport>>,
}

impl Controller {
    pub fn spawn(config: &Config) -> Result<Self> {
        let layout = SurfaceLayout::compute(config.grid.viewport_width, &config.grid)?;
        let (tx, reports) = crossbeam_channel::unbounded();
        let count = config.grid.surfaces as usize;

        let mut workers = Vec::with_capacity(count);
        for index in 0..count {
            let worker = spawn_worker(index, config.clone(), tx.clone())?;
            worker.send(ToWorker::Init {
                canvas: Box::new(PixelCanvas::new(
                    config.grid.viewport_width,
                    config.grid.viewport_height,
                )),
                viewport_width: config.grid.viewport_width,
                surface_index: index,
            })?;
            workers.push(worker);
        }

        tracing::info!(
            "Spawned {count} surfaces of {}x{} cells ({} px tall each)",
            layout.columns,
            layout.rows,
            layout.height
        );

        Ok(Self {
            workers,
            reports,
            layout,
            last: vec![None; count],
        })
    }

    pub fn surface_count(&self) -> usize {
        self.workers.len()
    }

    pub fn layout(&self) -> &SurfaceLayout {
        &self.layout
    }

    /// Screen offset `(left, top)` of a surface.
    pub fn surface_offset(&self, index: usize) -> (f64, f64) {
        (0.0, self.layout.height as f64 * index as f64)
    }

    /// Surface under a page y coordinate, if any.
    pub fn surface_at(&self, page_y: f64) -> Option<usize> {
        if self.layout.height == 0 || !(page_y >= 0.0) {
            return None;
        }
        let index = (page_y / self.layout.height as f64).floor() as usize;
        (index < self.workers.len()).then_some(index)
    }

    /// Forward a page-relative click to the surface under it. Clicks below the
    /// last surface are dropped.
    pub fn click_page(&self, page_x: f64, page_y: f64) -> Result<()> {
        match self.surface_at(page_y) {
            Some(index) => {
                let (surface_left, surface_top) = self.surface_offset(index);
                self.send(
                    index,
                    ToWorker::Click(ClickEvent {
                        page_x,
                        page_y,
                        surface_left,
                        surface_top,
                        surface_index: index,
                    }),
                )
            }
            None => {
                tracing::debug!("click at ({page_x}, {page_y}) hits no surface");
                Ok(())
            }
        }
    }

    /// Forward a click given in the surface's own coordinates.
    pub fn click_surface(&self, index: usize, x: f64, y: f64) -> Result<()> {
        let (left, top) = self.surface_offset(index);
        self.send(
            index,
            ToWorker::Click(ClickEvent {
                page_x: x + left,
                page_y: y + top,
                surface_left: left,
                surface_top: top,
                surface_index: index,
            }),
        )
    }

    /// The popup for `index` closed: hand back the last reported cell.
    pub fn close(&mut self, index: usize) -> Result<()> {
        let err = self.no_such_surface(index);
        let cell = self.last.get_mut(index).ok_or(err)?.take().map(|r| r.cell());
        self.send(index, ToWorker::Close { cell })
    }

    /// Next selection report, formatted for the popup.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<Popup> {
        match self.reports.recv_timeout(timeout) {
            Ok(report) => Some(self.record(report)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                tracing::warn!("all workers gone");
                None
            }
        }
    }

    /// Drain whatever reports are already queued.
    pub fn try_recv_all(&mut self) -> Vec<Popup> {
        let pending: Vec<SelectionReport> = self.reports.try_iter().collect();
        pending.into_iter().map(|r| self.record(r)).collect()
    }

    fn record(&mut self, report: SelectionReport) -> Popup {
        if let Some(slot) = self.last.get_mut(report.surface_index) {
            *slot = Some(report);
        }
        Popup::from(&report)
    }

    fn send(&self, index: usize, msg: ToWorker) -> Result<()> {
        self.workers
            .get(index)
            .ok_or_else(|| self.no_such_surface(index))?
            .send(msg)
    }

    fn no_such_surface(&self, index: usize) -> GridError {
        GridError::NoSuchSurface {
            index,
            count: self.workers.len(),
        }
    }

    /// Close every inbox and join the worker threads.
    pub fn shutdown(self) {
        for worker in self.workers {
            let index = worker.index();
            worker.join();
            tracing::debug!("surface {index}: joined");
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
