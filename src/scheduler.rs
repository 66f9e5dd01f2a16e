//! Frame-paced scheduler driving the growth engine
//!
//! Pending branches live in a double-buffered queue. Each executing tick
//! snapshots the queue, then walks the snapshot executing roughly half of
//! the tasks and pushing the rest back for the next tick. Children spawned
//! during a tick always wait for a later tick.

use crate::config::{CanvasSize, GrowthParams, RootStep};
use crate::growth::{grow, BranchTask, DEG_180, DEG_90};
use crate::platform::{Clock, FrameHandle, FrameHost};
use crate::surface::{Surface, SurfaceBinding};
use rand::rngs::StdRng;
use rand::Rng;

/// Probability that a queued task waits another tick
const DEFER_RATE: f64 = 0.5;

/// Edge roots start this far outside the canvas
const EDGE_INSET: f64 = 5.0;

/// How the frame loop behaves when it is created
#[derive(Clone, Copy, Debug, Default)]
pub struct LoopOptions {
    /// Subscribe to frames right away instead of waiting for `start`
    pub immediate: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Inactive,
    Active,
    Stopped,
}

/// What one executing tick did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub executed: usize,
    pub deferred: usize,
    pub spawned: usize,
}

/// A plum blossom run: queues, run state, surface binding and capabilities
pub struct Plum<S, H, C, R = StdRng> {
    params: GrowthParams,
    binding: Option<SurfaceBinding<S>>,
    steps: Vec<BranchTask>,
    prev_steps: Vec<BranchTask>,
    roots: Vec<RootStep>,
    last_executed_time: f64,
    pending: Option<FrameHandle>,
    is_active: bool,
    stopped: bool,
    host: H,
    clock: C,
    rng: R,
}

impl<S, H, C, R> Plum<S, H, C, R>
where
    S: Surface,
    H: FrameHost,
    C: Clock,
    R: Rng,
{
    pub fn new(params: GrowthParams, host: H, clock: C, rng: R) -> Self {
        Self::with_options(params, host, clock, rng, LoopOptions::default())
    }

    pub fn with_options(
        params: GrowthParams,
        host: H,
        clock: C,
        rng: R,
        options: LoopOptions,
    ) -> Self {
        let last_executed_time = clock.now();
        let mut plum = Self {
            params,
            binding: None,
            steps: Vec::new(),
            prev_steps: Vec::new(),
            roots: Vec::new(),
            last_executed_time,
            pending: None,
            is_active: false,
            stopped: false,
            host,
            clock,
            rng,
        };
        if options.immediate {
            plum.resume();
        }
        plum
    }

    pub fn params(&self) -> &GrowthParams {
        &self.params
    }

    pub fn state(&self) -> RunState {
        if self.stopped {
            RunState::Stopped
        } else if self.is_active {
            RunState::Active
        } else {
            RunState::Inactive
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Tasks waiting for the next tick
    pub fn queued(&self) -> &[BranchTask] {
        &self.steps
    }

    /// Snapshot taken by the last executing tick
    pub fn deferred(&self) -> &[BranchTask] {
        &self.prev_steps
    }

    pub fn surface(&self) -> Option<&S> {
        self.binding.as_ref().map(|b| &b.surface)
    }

    pub fn size(&self) -> Option<CanvasSize> {
        self.binding.as_ref().map(|b| b.size)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Replace the four edge roots with caller-supplied starting branches.
    /// Takes effect on the next `start`.
    pub fn add_root_steps(&mut self, roots: impl IntoIterator<Item = RootStep>) {
        self.roots.extend(roots);
    }

    /// Begin a fresh run on `surface`, discarding any previous run
    #[tracing::instrument(skip_all, fields(width = size.width, height = size.height))]
    pub fn start(&mut self, mut surface: S, size: CanvasSize) {
        self.pause();

        surface.configure(size, self.host.device_pixel_ratio());
        surface.clear();
        surface.set_line_width(1.0);
        surface.set_stroke_color(&self.params.color);
        self.binding = Some(SurfaceBinding { surface, size });

        self.prev_steps.clear();
        self.steps = self.seed_roots(size);
        tracing::info!(roots = self.steps.len(), "plum run started");

        self.resume();
        self.stopped = false;
    }

    fn seed_roots(&mut self, size: CanvasSize) -> Vec<BranchTask> {
        if !self.roots.is_empty() {
            return self
                .roots
                .iter()
                .map(|r| BranchTask::root(r.x, r.y, r.heading))
                .collect();
        }

        let (w, h) = (size.width, size.height);
        vec![
            BranchTask::root(self.random_pos() * w, -EDGE_INSET, DEG_90),
            BranchTask::root(self.random_pos() * w, h + EDGE_INSET, -DEG_90),
            BranchTask::root(-EDGE_INSET, self.random_pos() * h, 0.0),
            BranchTask::root(w + EDGE_INSET, self.random_pos() * h, DEG_180),
        ]
    }

    /// Uniform in [0.2, 0.8)
    fn random_pos(&mut self) -> f64 {
        self.rng.gen::<f64>() * 0.6 + 0.2
    }

    /// Stop receiving frames. Safe to call at any time.
    pub fn pause(&mut self) {
        self.is_active = false;
        if let Some(handle) = self.pending.take() {
            self.host.cancel_frame(handle);
        }
    }

    /// Resume receiving frames. Does nothing when already active or when
    /// the host has no frame source.
    pub fn resume(&mut self) {
        if self.is_active {
            return;
        }
        if let Some(handle) = self.host.request_frame() {
            self.is_active = true;
            self.pending = Some(handle);
        } else {
            tracing::debug!("frame host unavailable, staying inactive");
        }
    }

    /// Frame callback. Ignored unless the run is live and `handle` is the
    /// request it is waiting on.
    pub fn on_frame(&mut self, handle: FrameHandle) -> Option<TickReport> {
        if !self.is_active || self.pending != Some(handle) {
            tracing::trace!(?handle, "ignoring stale frame");
            return None;
        }
        self.pending = None;

        let now = self.clock.now();
        let report = self.tick(now);

        if self.is_active {
            self.pending = self.host.request_frame();
            if self.pending.is_none() {
                self.is_active = false;
            }
        }
        report
    }

    /// Run one tick at `now` if the frame budget has elapsed
    pub fn tick(&mut self, now: f64) -> Option<TickReport> {
        if now - self.last_executed_time < self.params.frame_budget_ms() {
            return None;
        }
        Some(self.run_tick(now))
    }

    #[tracing::instrument(level = "trace", skip(self))]
    fn run_tick(&mut self, now: f64) -> TickReport {
        self.prev_steps = std::mem::take(&mut self.steps);
        self.last_executed_time = now;

        let mut report = TickReport::default();
        if self.prev_steps.is_empty() {
            if !self.stopped {
                tracing::info!("plum run finished");
            }
            self.pause();
            self.stopped = true;
            return report;
        }

        for task in &self.prev_steps {
            if self.rng.gen::<f64>() < DEFER_RATE {
                self.steps.push(*task);
                report.deferred += 1;
            } else {
                report.spawned += grow(
                    task,
                    &self.params,
                    self.binding.as_mut(),
                    &mut self.rng,
                    &mut self.steps,
                );
                report.executed += 1;
            }
        }

        tracing::trace!(
            executed = report.executed,
            deferred = report.deferred,
            spawned = report.spawned,
            queued = self.steps.len(),
            "tick"
        );
        report
    }

    /// Tick without frame gating until the run stops or `max_ticks` is
    /// reached. Returns the number of ticks run.
    pub fn run_to_completion(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while !self.stopped && ticks < max_ticks {
            let now = self.clock.now();
            self.run_tick(now);
            ticks += 1;
        }
        ticks
    }
}
