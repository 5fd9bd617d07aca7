use crate::domain::market_data::SeriesId;

/// Identity of a rasterized sparkline: which series, at which backing size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub series: SeriesId,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl CacheKey {
    /// Backing-store size is the CSS size scaled by the device pixel ratio.
    pub fn new(series: SeriesId, css_width: f64, css_height: f64, pixel_ratio: f64) -> Self {
        let ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
        let to_px = |css: f64| (css * ratio).round().max(0.0) as u32;
        Self { series, pixel_width: to_px(css_width), pixel_height: to_px(css_height) }
    }
}

/// Tracks which sparkline raster is current. Pan and zoom never touch it.
#[derive(Debug, Default)]
pub struct SparklineCache {
    key: Option<CacheKey>,
    builds: u64,
}

impl SparklineCache {
    pub fn is_current(&self, key: CacheKey) -> bool {
        self.key == Some(key)
    }

    pub fn store(&mut self, key: CacheKey) {
        self.key = Some(key);
        self.builds += 1;
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }

    pub fn build_count(&self) -> u64 {
        self.builds
    }
}
