//! Branch growth rule
//!
//! Each call to [`grow`] draws one segment of a branch and decides whether
//! the branch continues, and in how many directions.

use crate::config::{CanvasSize, GrowthParams};
use crate::surface::{Surface, SurfaceBinding};
use rand::Rng;
use std::f64::consts::PI;

pub const DEG_180: f64 = PI;
pub const DEG_90: f64 = DEG_180 / 2.0;
pub const DEG_15: f64 = DEG_90 / 6.0;

/// How far past the canvas edge a branch may wander before it dies
pub const BOUNDARY_MARGIN: f64 = 100.0;

const DENSE_RATE: f64 = 0.8;
const SPARSE_RATE: f64 = 0.5;

/// A pending branch segment
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BranchTask {
    pub x: f64,
    pub y: f64,
    /// Heading in radians
    pub heading: f64,
    /// Number of ancestor segments
    pub generation: u32,
}

impl BranchTask {
    pub fn root(x: f64, y: f64, heading: f64) -> Self {
        Self {
            x,
            y,
            heading,
            generation: 0,
        }
    }
}

/// Project `r` along `theta` from `(x, y)`
pub fn polar2cart(x: f64, y: f64, r: f64, theta: f64) -> (f64, f64) {
    let dx = r * theta.cos();
    let dy = r * theta.sin();
    (x + dx, y + dy)
}

/// Probability that each candidate continuation is spawned
pub fn spawn_rate(generation: u32, min_branch: u32) -> f64 {
    if generation <= min_branch {
        DENSE_RATE
    } else {
        SPARSE_RATE
    }
}

/// Whether `(x, y)` is within the margin around the canvas
pub fn within_bounds(x: f64, y: f64, size: CanvasSize) -> bool {
    !(x < -BOUNDARY_MARGIN
        || x > size.width + BOUNDARY_MARGIN
        || y < -BOUNDARY_MARGIN
        || y > size.height + BOUNDARY_MARGIN)
}

/// Grow `task` by one segment, appending continuations to `out`.
///
/// Returns the number of continuations spawned (0-2). Nothing is drawn or
/// spawned when no surface is bound.
pub fn grow<S, R>(
    task: &BranchTask,
    params: &GrowthParams,
    binding: Option<&mut SurfaceBinding<S>>,
    rng: &mut R,
    out: &mut Vec<BranchTask>,
) -> usize
where
    S: Surface,
    R: Rng,
{
    let Some(binding) = binding else {
        return 0;
    };

    let len = rng.gen::<f64>() * params.length;
    let (nx, ny) = polar2cart(task.x, task.y, len, task.heading);

    let surface = &mut binding.surface;
    surface.move_to(task.x, task.y);
    surface.line_to(nx, ny);
    surface.stroke();

    let clockwise = task.heading + rng.gen::<f64>() * DEG_15;
    let counter_clockwise = task.heading - rng.gen::<f64>() * DEG_15;

    if !within_bounds(nx, ny, binding.size) {
        return 0;
    }

    let rate = spawn_rate(task.generation, params.min_branch);
    let generation = task.generation.saturating_add(1);
    let mut spawned = 0;
    for heading in [clockwise, counter_clockwise] {
        if rng.gen::<f64>() < rate {
            out.push(BranchTask {
                x: nx,
                y: ny,
                heading,
                generation,
            });
            spawned += 1;
        }
    }
    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::RecordingSurface;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn binding(width: f64, height: f64) -> SurfaceBinding<RecordingSurface> {
        SurfaceBinding {
            surface: RecordingSurface::default(),
            size: CanvasSize::new(width, height),
        }
    }

    fn still_params() -> GrowthParams {
        GrowthParams {
            length: 0.0,
            ..GrowthParams::default()
        }
    }

    #[test]
    fn polar2cart_projects_exactly() {
        for &(x, y, r, theta) in &[
            (0.0, 0.0, 0.0, 0.0),
            (1.5, -2.0, 10.0, DEG_90),
            (-3.0, 4.0, 7.25, -DEG_15),
            (100.0, 100.0, 3.0, DEG_180),
        ] {
            let (nx, ny) = polar2cart(x, y, r, theta);
            assert_eq!(nx, x + r * theta.cos());
            assert_eq!(ny, y + r * theta.sin());
        }
    }

    #[test]
    fn spawn_rate_decays_after_min_branch() {
        assert_eq!(spawn_rate(0, 50), 0.8);
        assert_eq!(spawn_rate(50, 50), 0.8);
        assert_eq!(spawn_rate(51, 50), 0.5);
        assert_eq!(spawn_rate(0, 0), 0.8);
        assert_eq!(spawn_rate(1, 0), 0.5);
    }

    fn observed_rate(generation: u32) -> f64 {
        let mut rng = StdRng::seed_from_u64(7);
        let mut bind = binding(1000.0, 1000.0);
        let params = GrowthParams::default();
        let task = BranchTask {
            x: 500.0,
            y: 500.0,
            heading: 0.0,
            generation,
        };
        let trials = 20_000;
        let mut spawned = 0;
        let mut out = Vec::new();
        for _ in 0..trials {
            out.clear();
            spawned += grow(&task, &params, Some(&mut bind), &mut rng, &mut out);
        }
        spawned as f64 / (2 * trials) as f64
    }

    #[test]
    fn young_branches_spawn_densely() {
        let rate = observed_rate(10);
        assert!((rate - 0.8).abs() < 0.02, "rate {rate}");
    }

    #[test]
    fn old_branches_spawn_sparsely() {
        let rate = observed_rate(51);
        assert!((rate - 0.5).abs() < 0.02, "rate {rate}");
    }

    #[test]
    fn draws_segment_from_task_position() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut bind = binding(600.0, 600.0);
        let params = GrowthParams::default();
        let task = BranchTask::root(300.0, 300.0, DEG_90);
        let mut out = Vec::new();
        grow(&task, &params, Some(&mut bind), &mut rng, &mut out);

        let segments = &bind.surface.segments;
        assert_eq!(segments.len(), 1);
        let seg = segments[0];
        assert_eq!(seg.from, (300.0, 300.0));
        let len = ((seg.to.0 - 300.0).powi(2) + (seg.to.1 - 300.0).powi(2)).sqrt();
        assert!(len < params.length);
        for child in &out {
            assert_eq!((child.x, child.y), seg.to);
            assert_eq!(child.generation, 1);
            assert!((child.heading - DEG_90).abs() < DEG_15);
        }
    }

    #[test]
    fn unbound_surface_terminates() {
        let mut rng = StepRng::new(0, 0);
        let mut out = Vec::new();
        let task = BranchTask::root(0.0, 0.0, 0.0);
        let spawned = grow::<RecordingSurface, _>(
            &task,
            &GrowthParams::default(),
            None,
            &mut rng,
            &mut out,
        );
        assert_eq!(spawned, 0);
        assert!(out.is_empty());
    }

    fn spawned_at(x: f64, y: f64) -> usize {
        let mut rng = StepRng::new(0, 0);
        let mut bind = binding(600.0, 400.0);
        let mut out = Vec::new();
        let task = BranchTask::root(x, y, 0.0);
        grow(&task, &still_params(), Some(&mut bind), &mut rng, &mut out)
    }

    #[test]
    fn boundary_allows_exactly_one_hundred_units() {
        assert_eq!(spawned_at(-100.0, 200.0), 2);
        assert_eq!(spawned_at(700.0, 200.0), 2);
        assert_eq!(spawned_at(300.0, -100.0), 2);
        assert_eq!(spawned_at(300.0, 500.0), 2);
    }

    #[test]
    fn boundary_rejects_one_hundred_and_one_units() {
        assert_eq!(spawned_at(-101.0, 200.0), 0);
        assert_eq!(spawned_at(701.0, 200.0), 0);
        assert_eq!(spawned_at(300.0, -101.0), 0);
        assert_eq!(spawned_at(300.0, 501.0), 0);
    }

    #[test]
    fn terminated_branch_still_draws() {
        let mut rng = StepRng::new(0, 0);
        let mut bind = binding(600.0, 400.0);
        let mut out = Vec::new();
        let task = BranchTask::root(-500.0, 0.0, 0.0);
        grow(&task, &still_params(), Some(&mut bind), &mut rng, &mut out);
        assert_eq!(bind.surface.segments.len(), 1);
        assert!(out.is_empty());
    }
}
