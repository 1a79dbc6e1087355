// animation.rs — periodic random recolouring with bounded fade-in
//
// Each tick recolours a fixed number of random cells and starts a fade-in
// transition for each. Transitions are plain records advanced once per frame
// by the worker loop; nothing reschedules itself.

use rand::Rng;

use crate::color::Rgb;
use crate::config::MAX_FADE_STEPS;
use crate::grid::GridModel;
use crate::render::Fade;

/// One running fade-in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub index: usize,
    pub step: u32,
}

#[derive(Debug)]
pub struct AnimationScheduler {
    mutations_per_tick: u32,
    total_steps: u32,
    active: Vec<Transition>,
}

impl AnimationScheduler {
    pub fn new(mutations_per_tick: u32, fade_steps: u32) -> Self {
        Self {
            mutations_per_tick,
            total_steps: fade_steps.clamp(1, MAX_FADE_STEPS),
            active: Vec::new(),
        }
    }

    pub fn total_steps(&self) -> u32 {
        self.total_steps
    }

    pub fn active(&self) -> &[Transition] {
        &self.active
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// Recolour `mutations_per_tick` random cells (with replacement) and
    /// (re)start their transitions at step 0. Returns the picks in order.
    pub fn tick<R: Rng + ?Sized>(&mut self, grid: &mut GridModel, rng: &mut R) -> Vec<usize> {
        if grid.is_empty() {
            return Vec::new();
        }
        let picks: Vec<usize> = (0..self.mutations_per_tick)
            .map(|_| {
                let index = rng.gen_range(0..grid.len());
                grid.set_color_at(index, Rgb::random(&mut *rng));
                self.start(index);
                index
            })
            .collect();
        tracing::trace!(
            "tick: {} picks, {} transitions active",
            picks.len(),
            self.active.len()
        );
        picks
    }

    /// Start or restart the transition for `index`.
    pub fn start(&mut self, index: usize) {
        match self.active.iter_mut().find(|t| t.index == index) {
            Some(t) => t.step = 0,
            None => self.active.push(Transition { index, step: 0 }),
        }
    }

    /// Fade to paint for a transition that is at `step`.
    pub fn fade(&self, step: u32) -> Fade {
        Fade {
            step,
            total: self.total_steps,
        }
    }

    /// Advance every transition one step. Returns the repaints due this frame;
    /// transitions that reach the last step are dropped.
    pub fn advance(&mut self) -> Vec<(usize, Fade)> {
        let total = self.total_steps;
        let mut due = Vec::with_capacity(self.active.len());
        self.active.retain_mut(|t| {
            t.step += 1;
            due.push((
                t.index,
                Fade {
                    step: t.step,
                    total,
                },
            ));
            t.step < total
        });
        due
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
