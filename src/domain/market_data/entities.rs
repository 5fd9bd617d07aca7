pub use super::value_objects::{Price, Resolution, Timestamp, Volume};
use crate::domain::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// The bar under the pointer: its time and the price the chart reports there
/// (close for candles, line value otherwise).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bar {
    pub time: Timestamp,
    pub price: Price,
}

impl Bar {
    pub fn new(time: Timestamp, price: Price) -> Self {
        Self { time, price }
    }

    pub fn is_valid(&self) -> bool {
        self.price.is_finite()
    }
}

/// One OHLC sample as delivered by the data loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesBar {
    pub time: Timestamp,
    #[serde(default)]
    pub open: Option<Price>,
    #[serde(default)]
    pub high: Option<Price>,
    #[serde(default)]
    pub low: Option<Price>,
    pub close: Price,
    #[serde(default)]
    pub volume: Option<Volume>,
}

impl SeriesBar {
    pub fn close_only(time: i64, close: f64) -> Self {
        Self {
            time: Timestamp::from_secs(time),
            open: None,
            high: None,
            low: None,
            close: Price::from(close),
            volume: None,
        }
    }

    pub fn as_bar(&self) -> Bar {
        Bar::new(self.time, self.close)
    }
}

/// Identity of a loaded series, unique per process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesId(u64);

impl SeriesId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Deserialize)]
struct SeriesPayload {
    #[serde(alias = "candles")]
    bars: Vec<SeriesBar>,
    #[serde(rename = "resolutionSeconds", alias = "resolution", default = "default_resolution")]
    resolution: i64,
}

fn default_resolution() -> i64 {
    1
}

/// Domain entity - an immutable, time-sorted price series
#[derive(Debug, Clone)]
pub struct Series {
    id: SeriesId,
    bars: Vec<SeriesBar>,
    resolution: Resolution,
}

impl Series {
    pub fn new(bars: Vec<SeriesBar>, resolution_seconds: i64) -> Result<Self, ValidationError> {
        let resolution = Resolution::new(resolution_seconds)
            .ok_or(ValidationError::InvalidResolution(resolution_seconds))?;
        if bars.is_empty() {
            return Err(ValidationError::EmptySeries);
        }
        for (index, pair) in bars.windows(2).enumerate() {
            if pair[1].time <= pair[0].time {
                return Err(ValidationError::NonIncreasingTime {
                    index: index + 1,
                    previous: pair[0].time.secs(),
                    time: pair[1].time.secs(),
                });
            }
        }
        if let Some(index) = bars.iter().position(|b| !b.close.is_finite()) {
            return Err(ValidationError::NonFinitePrice { index });
        }
        Ok(Self { id: SeriesId::next(), bars, resolution })
    }

    /// Parse `{ "bars" | "candles": [...], "resolutionSeconds" | "resolution": n }`.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let payload: SeriesPayload = serde_json::from_str(json)
            .map_err(|e| ValidationError::MalformedPayload(e.to_string()))?;
        Self::new(payload.bars, payload.resolution)
    }

    pub fn id(&self) -> SeriesId {
        self.id
    }

    pub fn bars(&self) -> &[SeriesBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn first_time(&self) -> Timestamp {
        self.bars[0].time
    }

    pub fn last_time(&self) -> Timestamp {
        self.bars[self.bars.len() - 1].time
    }

    pub fn bar_at_index(&self, index: usize) -> Option<Bar> {
        self.bars.get(index).map(SeriesBar::as_bar)
    }

    /// Bar closest in time to `time`; equal distances resolve to the later bar.
    pub fn nearest_index_by_time(&self, time: Timestamp) -> usize {
        let insertion = self.bars.partition_point(|b| b.time < time);
        if insertion == 0 {
            return 0;
        }
        if insertion == self.bars.len() {
            return self.bars.len() - 1;
        }
        let before = self.bars[insertion - 1].time.abs_diff(time);
        let after = self.bars[insertion].time.abs_diff(time);
        if after <= before { insertion } else { insertion - 1 }
    }

    pub fn nearest_bar_by_time(&self, time: Timestamp) -> Bar {
        self.bars[self.nearest_index_by_time(time)].as_bar()
    }

    /// `first.time + logical × resolution`, rounded to whole seconds.
    pub fn logical_to_time(&self, logical: f64) -> Option<Timestamp> {
        if !logical.is_finite() {
            return None;
        }
        let offset = (logical * self.resolution.as_f64()).round() as i64;
        Some(Timestamp::from_secs(self.first_time().secs() + offset))
    }

    pub fn time_to_logical(&self, time: Timestamp) -> f64 {
        (time.secs() - self.first_time().secs()) as f64 / self.resolution.as_f64()
    }

    /// Minimum and maximum close price.
    pub fn close_range(&self) -> (f64, f64) {
        self.bars.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
            (lo.min(b.close.value()), hi.max(b.close.value()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(times: &[i64]) -> Series {
        let bars = times.iter().map(|t| SeriesBar::close_only(*t, 100.0)).collect();
        Series::new(bars, 1).unwrap()
    }

    #[test]
    fn nearest_prefers_later_bar_on_tie() {
        let s = series(&[0, 10, 20]);
        assert_eq!(s.nearest_index_by_time(Timestamp::from_secs(5)), 1);
        assert_eq!(s.nearest_index_by_time(Timestamp::from_secs(4)), 0);
        assert_eq!(s.nearest_index_by_time(Timestamp::from_secs(16)), 2);
    }

    #[test]
    fn nearest_clamps_outside_series() {
        let s = series(&[100, 200]);
        assert_eq!(s.nearest_index_by_time(Timestamp::from_secs(-50)), 0);
        assert_eq!(s.nearest_index_by_time(Timestamp::from_secs(900)), 1);
        assert_eq!(s.nearest_index_by_time(Timestamp::from_secs(200)), 1);
    }

    #[test]
    fn rejects_unsorted_bars() {
        let bars = vec![SeriesBar::close_only(10, 1.0), SeriesBar::close_only(10, 2.0)];
        assert_eq!(
            Series::new(bars, 1).unwrap_err(),
            ValidationError::NonIncreasingTime { index: 1, previous: 10, time: 10 }
        );
    }

    #[test]
    fn each_series_gets_its_own_identity() {
        assert_ne!(series(&[1, 2]).id(), series(&[1, 2]).id());
    }

    #[test]
    fn parses_candles_alias_and_resolution() {
        let json = r#"{"candles":[{"time":60,"close":1.5,"open":1.0},{"time":120,"close":2.0}],"resolution":60}"#;
        let s = Series::from_json(json).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.resolution().seconds(), 60);
        assert_eq!(s.logical_to_time(1.0), Some(Timestamp::from_secs(120)));
        assert_eq!(s.time_to_logical(Timestamp::from_secs(120)), 1.0);
    }
}
