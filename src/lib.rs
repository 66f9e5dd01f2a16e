//! Frame-paced plum blossom growth for the terminal.
//!
//! - [`growth`]: the branching rule, one segment per call.
//! - [`scheduler`]: double-buffered task queue paced by frame callbacks.
//! - [`platform`]: clock and frame-callback capabilities.
//! - [`surface`] / [`canvas`]: drawing surface trait and braille canvas.
//! - [`blossom`]: terminal host loop and print mode.

pub mod blossom;
pub mod canvas;
pub mod config;
pub mod error;
pub mod growth;
pub mod help;
pub mod platform;
pub mod scheduler;
pub mod settings;
pub mod surface;
pub mod terminal;

pub use config::{CanvasSize, GrowthParams, PlumConfig, RootStep};
pub use error::{PlumError, PlumResult};
pub use growth::{grow, polar2cart, BranchTask};
pub use scheduler::{LoopOptions, Plum, RunState, TickReport};
