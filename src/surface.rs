//! Drawing surface abstraction consumed by the growth engine

use crate::config::CanvasSize;

/// Primitive line drawing in logical coordinates
pub trait Surface {
    /// Size the backing store for `size` logical units at `pixel_ratio`
    /// device pixels per unit. Logical coordinates are not affected.
    fn configure(&mut self, size: CanvasSize, pixel_ratio: f64);

    /// Erase everything drawn so far
    fn clear(&mut self);

    fn set_line_width(&mut self, width: f64);

    fn set_stroke_color(&mut self, color: &str);

    /// Start a new path at `(x, y)`
    fn move_to(&mut self, x: f64, y: f64);

    /// Extend the current path to `(x, y)`
    fn line_to(&mut self, x: f64, y: f64);

    /// Draw the current path and discard it
    fn stroke(&mut self);
}

/// The (surface, dimensions) pair bound by a run
pub struct SurfaceBinding<S> {
    pub surface: S,
    pub size: CanvasSize,
}
