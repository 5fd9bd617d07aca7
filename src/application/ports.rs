use crate::config::MinimapConfig;
use crate::domain::chart::SurfaceSize;
use crate::domain::measurement::OverlayView;
use crate::domain::minimap::{CacheKey, SparklineGeometry, ViewportRect};
use strum::AsRefStr;

/// Draws the measurement overlay. Called synchronously after every gesture input.
pub trait OverlayPainter {
    fn paint(&mut self, view: &OverlayView);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
pub enum MinimapCursor {
    #[strum(serialize = "default")]
    Default,
    #[strum(serialize = "grab")]
    Grab,
    #[strum(serialize = "grabbing")]
    Grabbing,
}

/// Canvas the minimap draws on
pub trait MinimapCanvas {
    /// Layout size in CSS pixels.
    fn css_size(&self) -> SurfaceSize;
    fn pixel_ratio(&self) -> f64;

    /// Resize the backing store for `key`, draw the sparkline and keep a
    /// snapshot of the result for later blits.
    fn rasterize(&mut self, key: CacheKey, geometry: &SparklineGeometry, style: &MinimapConfig);

    /// Restore the snapshot and draw the viewport rectangle over it.
    fn blit_viewport(&mut self, viewport: Option<ViewportRect>, style: &MinimapConfig);

    fn show_tooltip(&mut self, x: f64, label: &str);
    fn hide_tooltip(&mut self);
    fn set_cursor(&mut self, cursor: MinimapCursor);

    fn clear(&mut self);
}
