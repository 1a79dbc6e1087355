// worker.rs — one surface, one thread, one calloop loop
//
// The loop multiplexes three sources onto a single `Worker` context:
//
//   inbound channel  →  Worker::handle   (Init / Click / Close)
//   tick timer       →  Worker::on_tick  (random recolour, every tick_ms)
//   frame timer      →  Worker::on_frame (advance fade-ins, every 1/frame_hz)
//
// Nothing here blocks, and nothing is shared with other workers; selection
// reports leave through the controller's crossbeam channel.

use std::thread::JoinHandle;

use calloop::{
    channel::{self, Channel},
    timer::{TimeoutAction, Timer},
    EventLoop,
};
use crossbeam_channel::Sender;
use rand::{rngs::StdRng, SeedableRng};

use crate::animation::AnimationScheduler;
use crate::canvas::Canvas;
use crate::config::Config;
use crate::error::{GridError, Result};
use crate::grid::GridModel;
use crate::hit_test;
use crate::layout::SurfaceLayout;
use crate::protocol::{CellRef, ClickEvent, SelectionReport, ToWorker};
use crate::render::{Fade, Renderer};

// ── per-surface state ─────────────────────────────────────────────────────────

/// Everything that exists once `Init` has been handled.
struct Surface {
    index: usize,
    layout: SurfaceLayout,
    grid: GridModel,
    renderer: Renderer,
    scheduler: AnimationScheduler,
    /// At most one selected cell per surface.
    selected: Option<usize>,
    rng: StdRng,
}

impl Surface {
    /// Repaint one cell. A selected cell re-reports itself so the popup
    /// tracks its live colour.
    fn paint(&mut self, index: usize, fade: Option<Fade>, reports: &Sender<SelectionReport>) {
        let cell = *self.grid.at(index);
        self.renderer.draw_cell(&cell, fade);
        if cell.selected {
            let report = SelectionReport {
                surface_index: self.index,
                column: cell.column,
                row: cell.row,
                color: cell.color,
                rows_per_surface: self.layout.rows,
            };
            if reports.send(report).is_err() {
                tracing::debug!("surface {}: controller gone, report dropped", self.index);
            }
        }
    }
}

// ── Worker ────────────────────────────────────────────────────────────────────

pub struct Worker {
    config: Config,
    reports: Sender<SelectionReport>,
    surface: Option<Surface>,
}

impl Worker {
    pub fn new(config: Config, reports: Sender<SelectionReport>) -> Self {
        Self {
            config,
            reports,
            surface: None,
        }
    }

    /// Dispatch one inbound message. Failures are logged and dropped.
    pub fn handle(&mut self, msg: ToWorker) {
        let result = match msg {
            ToWorker::Init {
                canvas,
                viewport_width,
                surface_index,
            } => self.init(canvas, viewport_width, surface_index),
            ToWorker::Click(ev) => self.click(&ev),
            ToWorker::Close { cell } => self.close(cell),
        };
        match result {
            Ok(()) => {}
            Err(e @ GridError::CellOutOfRange { .. }) => tracing::debug!("ignored: {e}"),
            Err(e) => tracing::warn!("ignored: {e}"),
        }
    }

    fn init(
        &mut self,
        canvas: Box<dyn Canvas>,
        viewport_width: u32,
        surface_index: usize,
    ) -> Result<()> {
        if let Some(s) = &self.surface {
            tracing::warn!(
                "surface {}: duplicate init (as surface {surface_index}) ignored",
                s.index
            );
            return Ok(());
        }

        let layout = SurfaceLayout::compute(viewport_width, &self.config.grid)?;
        let mut rng = match self.config.animation.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(surface_index as u64)),
            None => StdRng::from_entropy(),
        };
        let grid = GridModel::initialize(
            layout.columns,
            layout.rows,
            &self.config.style.palette,
            &mut rng,
        );
        let mut renderer = Renderer::new(canvas, layout, self.config.style.clone());
        renderer.clear();
        renderer.draw_all(&grid);

        tracing::info!(
            "surface {surface_index}: {}x{} cells, origin offset {}px, canvas {}x{}",
            layout.columns,
            layout.rows,
            layout.origin_offset,
            layout.width,
            layout.height
        );

        self.surface = Some(Surface {
            index: surface_index,
            layout,
            grid,
            renderer,
            scheduler: AnimationScheduler::new(
                self.config.animation.mutations_per_tick,
                self.config.animation.fade_steps,
            ),
            selected: None,
            rng,
        });
        Ok(())
    }

    fn click(&mut self, ev: &ClickEvent) -> Result<()> {
        let s = self.surface.as_mut().ok_or(GridError::UninitializedSurface)?;
        let (column, row) = hit_test::resolve(&s.layout, ev)?;
        let index = s
            .grid
            .index_of(column, row)
            .ok_or(GridError::CellOutOfRange {
                column: column.into(),
                row: row.into(),
            })?;

        if let Some(prev) = s.selected.filter(|&p| p != index) {
            s.grid.set_selected_at(prev, false);
            s.paint(prev, None, &self.reports);
        }
        s.selected = Some(index);
        s.grid.set_selected(column, row, true);
        tracing::debug!("surface {}: selected ({column}, {row})", s.index);
        s.paint(index, None, &self.reports);
        Ok(())
    }

    fn close(&mut self, cell: Option<CellRef>) -> Result<()> {
        let s = self.surface.as_mut().ok_or(GridError::UninitializedSurface)?;
        let Some(CellRef { column, row }) = cell else {
            return Ok(());
        };
        let index = s.grid.index_of(column, row).ok_or(GridError::CellOutOfRange {
            column: column.into(),
            row: row.into(),
        })?;

        s.grid.set_selected(column, row, false);
        if s.selected == Some(index) {
            s.selected = None;
        }
        tracing::debug!("surface {}: cleared ({column}, {row})", s.index);
        s.paint(index, None, &self.reports);
        Ok(())
    }

    /// One scheduler tick: recolour random cells and start their fade-ins.
    pub fn on_tick(&mut self) {
        let Some(s) = self.surface.as_mut() else {
            tracing::trace!("tick before init");
            return;
        };
        let picks = s.scheduler.tick(&mut s.grid, &mut s.rng);
        let start = s.scheduler.fade(0);
        for index in picks {
            s.paint(index, Some(start), &self.reports);
        }
    }

    /// One repaint opportunity: advance every running fade-in by a step.
    pub fn on_frame(&mut self) {
        let Some(s) = self.surface.as_mut() else {
            return;
        };
        if s.scheduler.is_idle() {
            return;
        }
        for (index, fade) in s.scheduler.advance() {
            s.paint(index, Some(fade), &self.reports);
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.surface.is_some()
    }

    pub fn layout(&self) -> Option<&SurfaceLayout> {
        self.surface.as_ref().map(|s| &s.layout)
    }

    pub fn grid(&self) -> Option<&GridModel> {
        self.surface.as_ref().map(|s| &s.grid)
    }

    pub fn canvas(&self) -> Option<&dyn Canvas> {
        self.surface.as_ref().map(|s| s.renderer.canvas())
    }

    pub fn selected(&self) -> Option<CellRef> {
        let s = self.surface.as_ref()?;
        let cell = s.grid.at(s.selected?);
        Some(CellRef {
            column: cell.column,
            row: cell.row,
        })
    }

    pub fn active_transitions(&self) -> usize {
        self.surface
            .as_ref()
            .map_or(0, |s| s.scheduler.active().len())
    }
}

// ── event loop ────────────────────────────────────────────────────────────────

/// Run `worker` until every sender of `inbox` is dropped.
pub fn run(mut worker: Worker, inbox: Channel<ToWorker>) -> Result<()> {
    let mut event_loop: EventLoop<'static, Worker> = EventLoop::try_new()?;
    let handle = event_loop.handle();
    let signal = event_loop.get_signal();
    let tick = worker.config.animation.tick_period();
    let frame = worker.config.animation.frame_interval();

    handle
        .insert_source(inbox, move |event, _, worker| match event {
            channel::Event::Msg(msg) => worker.handle(msg),
            channel::Event::Closed => {
                tracing::info!("controller hung up, stopping worker");
                signal.stop();
            }
        })
        .map_err(|e| e.error)?;

    handle
        .insert_source(Timer::from_duration(tick), move |_, _, worker| {
            worker.on_tick();
            TimeoutAction::ToDuration(tick)
        })
        .map_err(|e| e.error)?;

    handle
        .insert_source(Timer::from_duration(frame), move |_, _, worker| {
            worker.on_frame();
            TimeoutAction::ToDuration(frame)
        })
        .map_err(|e| e.error)?;

    event_loop.run(frame, &mut worker, |_| {})?;
    Ok(())
}

/// A running worker thread and the sending half of its inbox.
pub struct WorkerHandle {
    index: usize,
    sender: channel::Sender<ToWorker>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn send(&self, msg: ToWorker) -> Result<()> {
        self.sender
            .send(msg)
            .map_err(|_| GridError::WorkerGone(self.index))
    }

    /// Close the inbox and wait for the thread to finish.
    pub fn join(self) {
        drop(self.sender);
        if self.join.join().is_err() {
            tracing::error!("surface {}: worker thread panicked", self.index);
        }
    }
}

pub fn spawn_worker(
    index: usize,
    config: Config,
    reports: Sender<SelectionReport>,
) -> Result<WorkerHandle> {
    let (sender, inbox) = channel::channel::<ToWorker>();
    let join = std::thread::Builder::new()
        .name(format!("surface-{index}"))
        .spawn(move || {
            if let Err(e) = run(Worker::new(config, reports), inbox) {
                tracing::error!("surface {index}: worker loop failed: {e}");
            }
        })?;
    Ok(WorkerHandle {
        index,
        sender,
        join,
    })
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::PixelCanvas;
    use crossbeam_channel::Receiver;

    fn config() -> Config {
        let mut cfg = Config::default();
        cfg.animation.seed = Some(17);
        cfg
    }

    fn ready() -> (Worker, Receiver<SelectionReport>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut w = Worker::new(config(), tx);
        w.handle(ToWorker::Init {
            canvas: Box::new(PixelCanvas::new(1000, 600)),
            viewport_width: 1000,
            surface_index: 2,
        });
        (w, rx)
    }

    fn click_at(x: f64, y: f64) -> ToWorker {
        ToWorker::Click(ClickEvent {
            page_x: x,
            page_y: y,
            surface_left: 0.0,
            surface_top: 0.0,
            surface_index: 2,
        })
    }

    #[test]
    fn init_builds_grid_and_sizes_canvas() {
        let (w, rx) = ready();
        let layout = w.layout().unwrap();
        assert_eq!((layout.columns, layout.rows), (50, 200));
        assert_eq!(w.grid().unwrap().len(), 10_000);
        assert_eq!(w.canvas().unwrap().size(), (1000, 4000));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn messages_before_init_are_ignored() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut w = Worker::new(config(), tx);
        w.handle(click_at(34.0, 10.0));
        w.handle(ToWorker::Close {
            cell: Some(CellRef { column: 0, row: 0 }),
        });
        w.on_tick();
        w.on_frame();
        assert!(!w.is_initialized());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn bad_viewport_leaves_worker_uninitialised() {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let mut w = Worker::new(config(), tx);
        w.handle(ToWorker::Init {
            canvas: Box::new(PixelCanvas::new(10, 10)),
            viewport_width: 10,
            surface_index: 0,
        });
        assert!(!w.is_initialized());
    }

    #[test]
    fn second_init_is_ignored() {
        let (mut w, _rx) = ready();
        w.handle(ToWorker::Init {
            canvas: Box::new(PixelCanvas::new(400, 10)),
            viewport_width: 400,
            surface_index: 5,
        });
        assert_eq!(w.layout().unwrap().columns, 50);
    }

    #[test]
    fn click_reports_cell_state() {
        let (mut w, rx) = ready();
        w.handle(click_at(34.0, 10.0));
        let report = rx.try_recv().unwrap();
        let cell = *w.grid().unwrap().get(1, 0).unwrap();
        assert!(cell.selected);
        assert_eq!((report.column, report.row), (1, 0));
        assert_eq!(report.color, cell.color);
        assert_eq!(report.surface_index, 2);
        assert_eq!(report.rows_per_surface, 200);
        assert_eq!(report.global_row(), 400);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn click_outside_grid_is_a_no_op() {
        let (mut w, rx) = ready();
        w.handle(click_at(-50.0, 10.0));
        w.handle(click_at(10.0, 5000.0));
        assert!(rx.try_recv().is_err());
        assert_eq!(w.selected(), None);
    }

    #[test]
    fn new_click_moves_the_selection() {
        let (mut w, rx) = ready();
        w.handle(click_at(34.0, 10.0));
        w.handle(click_at(74.0, 30.0));
        let grid = w.grid().unwrap();
        assert!(!grid.get(1, 0).unwrap().selected);
        assert!(grid.get(3, 1).unwrap().selected);
        assert_eq!(w.selected(), Some(CellRef { column: 3, row: 1 }));
        let reports: Vec<_> = rx.try_iter().collect();
        assert_eq!(reports.len(), 2);
        assert_eq!((reports[1].column, reports[1].row), (3, 1));
    }

    #[test]
    fn close_clears_only_that_cell() {
        let (mut w, _rx) = ready();
        w.handle(click_at(34.0, 10.0));
        let before: Vec<_> = w.grid().unwrap().cells().to_vec();

        w.handle(ToWorker::Close {
            cell: Some(CellRef { column: 1, row: 0 }),
        });
        let grid = w.grid().unwrap();
        let target = grid.index_of(1, 0).unwrap();
        for (i, cell) in grid.cells().iter().enumerate() {
            if i == target {
                assert!(!cell.selected);
                assert_eq!(cell.color, before[i].color);
            } else {
                assert_eq!(*cell, before[i]);
            }
        }
        assert_eq!(w.selected(), None);
    }

    #[test]
    fn close_without_cell_or_out_of_range_is_harmless() {
        let (mut w, _rx) = ready();
        w.handle(click_at(34.0, 10.0));
        w.handle(ToWorker::Close { cell: None });
        w.handle(ToWorker::Close {
            cell: Some(CellRef {
                column: 500,
                row: 0,
            }),
        });
        assert_eq!(w.selected(), Some(CellRef { column: 1, row: 0 }));
    }

    #[test]
    fn tick_then_frames_drain_transitions() {
        let (mut w, _rx) = ready();
        w.on_tick();
        assert!(w.active_transitions() > 0);
        assert!(w.active_transitions() <= 200);
        for _ in 0..10 {
            w.on_frame();
        }
        assert_eq!(w.active_transitions(), 0);
    }

    #[test]
    fn animated_selected_cell_keeps_reporting() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut cfg = config();
        // tiny grid so a tick is certain to hit the selected cell
        cfg.grid.total_elements = 1;
        cfg.grid.surfaces = 1;
        let mut w = Worker::new(cfg, tx);
        w.handle(ToWorker::Init {
            canvas: Box::new(PixelCanvas::new(20, 20)),
            viewport_width: 20,
            surface_index: 0,
        });
        w.handle(click_at(8.0, 8.0));
        let first = rx.try_recv().unwrap();

        w.on_tick();
        let during: Vec<_> = rx.try_iter().collect();
        assert_eq!(during.len(), 200);
        let live = w.grid().unwrap().get(0, 0).unwrap().color;
        assert!(during.iter().all(|r| r.color == live));

        for _ in 0..10 {
            w.on_frame();
        }
        let frames: Vec<_> = rx.try_iter().collect();
        assert_eq!(frames.len(), 10);
        assert!(frames.iter().all(|r| r.cell() == first.cell()));
        assert_eq!(frames[9].color, live);
    }
}
