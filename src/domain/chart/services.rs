use super::ports::ChartSurface;
use crate::domain::errors::GeometryError;
use crate::domain::market_data::{Bar, Series, Timestamp};

/// Converts between pixel x, logical bar index and epoch time.
///
/// Stateless: every call reads the chart and the series it was built with.
pub struct CoordinateMapper<'a, C: ChartSurface + ?Sized> {
    chart: &'a C,
    series: &'a Series,
}

impl<'a, C: ChartSurface + ?Sized> CoordinateMapper<'a, C> {
    pub fn new(chart: &'a C, series: &'a Series) -> Self {
        Self { chart, series }
    }

    /// Prefers the engine's coordinate→logical primitive and falls back to
    /// coordinate→time followed by a nearest-bar search. Times outside the
    /// loaded bars are not snapped to the edges.
    pub fn pixel_to_logical(&self, x: f64) -> Result<f64, GeometryError> {
        if !x.is_finite() {
            return Err(GeometryError::NonFinite("pixel x"));
        }
        if let Some(logical) = self.chart.coordinate_to_logical(x).filter(|l| l.is_finite()) {
            return Ok(logical);
        }
        let time = self.chart.coordinate_to_time(x).ok_or(GeometryError::ChartNotReady)?;
        if time < self.series.first_time() || time > self.series.last_time() {
            return Err(GeometryError::NoBarUnderCursor);
        }
        Ok(self.series.nearest_index_by_time(time) as f64)
    }

    pub fn logical_to_time(&self, logical: f64) -> Result<Timestamp, GeometryError> {
        self.series.logical_to_time(logical).ok_or(GeometryError::NonFinite("logical index"))
    }

    pub fn nearest_bar_by_time(&self, time: Timestamp) -> Bar {
        self.series.nearest_bar_by_time(time)
    }

    /// Bar whose slot contains pixel `x`, if `x` lies over plotted data.
    pub fn bar_at_pixel(&self, x: f64) -> Result<Bar, GeometryError> {
        let logical = self.pixel_to_logical(x)?;
        let index = logical.round();
        if index < 0.0 || index >= self.series.len() as f64 {
            return Err(GeometryError::NoBarUnderCursor);
        }
        self.series.bar_at_index(index as usize).ok_or(GeometryError::NoBarUnderCursor)
    }
}
