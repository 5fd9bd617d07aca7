use super::sessions::{SessionBucket, session_bands};
use crate::config::{BAND_ALPHA, MinimapConfig};
use crate::domain::chart::Color;
use crate::domain::market_data::Series;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandRect {
    pub bucket: SessionBucket,
    pub x: f64,
    pub width: f64,
    pub color: Color,
}

/// Pre-computed drawing of the full series in CSS pixels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SparklineGeometry {
    pub width: f64,
    pub height: f64,
    pub bands: Vec<BandRect>,
    pub points: Vec<(f64, f64)>,
}

impl SparklineGeometry {
    pub fn compute(series: &Series, width: f64, height: f64, config: &MinimapConfig) -> Self {
        let total = series.len() as f64;
        let bands = session_bands(series)
            .into_iter()
            .map(|band| BandRect {
                bucket: band.bucket,
                x: band.start as f64 / total * width,
                width: (band.end - band.start) as f64 / total * width,
                color: band_color(band.bucket, config),
            })
            .collect();

        Self { width, height, bands, points: polyline(series, width, height, config.padding_px) }
    }
}

fn band_color(bucket: SessionBucket, config: &MinimapConfig) -> Color {
    let base = match bucket {
        SessionBucket::PreMarket => config.premarket_band,
        SessionBucket::Market => config.market_band,
        SessionBucket::AfterHours => config.afterhours_band,
    };
    base.with_alpha(BAND_ALPHA)
}

/// Close prices min/max-normalized between the top and bottom padding.
fn polyline(series: &Series, width: f64, height: f64, padding: f64) -> Vec<(f64, f64)> {
    let (min, max) = series.close_range();
    let range = if max > min { max - min } else { 1.0 };
    let draw_height = (height - padding * 2.0).max(0.0);
    let step_count = series.len().saturating_sub(1).max(1) as f64;

    let project = |(i, close): (usize, f64)| {
        let x = i as f64 / step_count * width;
        let y = padding + draw_height - (close - min) / range * draw_height;
        (x, y)
    };

    let closes: Vec<f64> = series.bars().iter().map(|b| b.close.value()).collect();

    #[cfg(feature = "parallel")]
    {
        closes.into_par_iter().enumerate().map(project).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        closes.into_iter().enumerate().map(project).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::SeriesBar;

    #[test]
    fn flat_series_sits_on_the_bottom_padding() {
        let bars = (0..3).map(|i| SeriesBar::close_only(i, 5.0)).collect();
        let series = Series::new(bars, 1).unwrap();
        let geo = SparklineGeometry::compute(&series, 100.0, 40.0, &MinimapConfig::default());
        assert_eq!(geo.points, vec![(0.0, 36.0), (50.0, 36.0), (100.0, 36.0)]);
    }

    #[test]
    fn min_and_max_touch_the_padding() {
        let bars = vec![SeriesBar::close_only(0, 10.0), SeriesBar::close_only(1, 20.0)];
        let series = Series::new(bars, 1).unwrap();
        let geo = SparklineGeometry::compute(&series, 80.0, 48.0, &MinimapConfig::default());
        assert_eq!(geo.points, vec![(0.0, 44.0), (80.0, 4.0)]);
    }

    #[test]
    fn single_bar_is_drawn_at_the_left_edge() {
        let series = Series::new(vec![SeriesBar::close_only(0, 1.0)], 1).unwrap();
        let geo = SparklineGeometry::compute(&series, 50.0, 20.0, &MinimapConfig::default());
        assert_eq!(geo.points.len(), 1);
        assert_eq!(geo.points[0].0, 0.0);
        assert_eq!(geo.bands.len(), 1);
        assert_eq!(geo.bands[0].width, 50.0);
    }
}
