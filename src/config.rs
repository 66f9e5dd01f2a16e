use std::f64::consts::PI;

/// Default stroke color: light grey with a faint alpha
pub const DEFAULT_COLOR: &str = "#99999920";

/// Growth parameters shared by the engine and the scheduler
#[derive(Clone, Debug, PartialEq)]
pub struct GrowthParams {
    /// Maximum segment length, sampled uniformly in [0, length)
    pub length: f64,
    /// Generation threshold below which branching is dense
    pub min_branch: u32,
    /// Stroke color, handed to the surface untouched
    pub color: String,
    /// Logical frames per second; a tick needs 1000 / fps ms to elapse
    pub fps: f64,
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            length: 10.0,
            min_branch: 15,
            color: DEFAULT_COLOR.to_string(),
            fps: 40.0,
        }
    }
}

impl GrowthParams {
    /// Minimum time between executing ticks, in milliseconds
    pub fn frame_budget_ms(&self) -> f64 {
        1000.0 / self.fps
    }
}

/// Logical canvas dimensions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(600.0, 600.0)
    }
}

/// A caller-supplied starting branch
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootStep {
    pub x: f64,
    pub y: f64,
    /// Heading in radians
    pub heading: f64,
}

impl RootStep {
    /// Parse `x,y,degrees`
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split(',').map(|p| p.trim().parse::<f64>());
        let x = parts.next()?.ok()?;
        let y = parts.next()?.ok()?;
        let deg = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            x,
            y,
            heading: deg * PI / 180.0,
        })
    }
}

/// Configuration for a plum run from the command line
#[derive(Clone, Debug)]
pub struct PlumConfig {
    pub growth: GrowthParams,
    pub infinite: bool,
    pub time_wait: f64,
    pub seed: Option<u64>,
    pub density: f64,
    pub roots: Vec<RootStep>,
}
