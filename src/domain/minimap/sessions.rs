use crate::domain::market_data::{Series, Timestamp};
use serde::Serialize;
use strum::{AsRefStr, EnumIter};

const PREMARKET_START_MIN: i64 = 9 * 60; // 09:00 UTC
const MARKET_START_MIN: i64 = 14 * 60 + 30; // 14:30 UTC
const AFTERHOURS_START_MIN: i64 = 21 * 60; // 21:00 UTC

/// Time-of-day bucket used to tint the minimap background.
///
/// Boundaries are fixed UTC minutes of the day and do not move with
/// daylight-saving time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIter, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionBucket {
    PreMarket,
    Market,
    AfterHours,
}

impl SessionBucket {
    pub fn for_time(time: Timestamp) -> Self {
        let minute = time.utc_seconds_of_day() / 60;
        if (PREMARKET_START_MIN..MARKET_START_MIN).contains(&minute) {
            SessionBucket::PreMarket
        } else if (MARKET_START_MIN..AFTERHOURS_START_MIN).contains(&minute) {
            SessionBucket::Market
        } else {
            SessionBucket::AfterHours
        }
    }
}

/// Run of consecutive bars in one bucket, `[start, end)` in bar indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionBand {
    pub bucket: SessionBucket,
    pub start: usize,
    pub end: usize,
}

pub fn session_bands(series: &Series) -> Vec<SessionBand> {
    let mut bands: Vec<SessionBand> = Vec::new();
    for (index, bar) in series.bars().iter().enumerate() {
        let bucket = SessionBucket::for_time(bar.time);
        match bands.last_mut() {
            Some(band) if band.bucket == bucket => band.end = index + 1,
            _ => bands.push(SessionBand { bucket, start: index, end: index + 1 }),
        }
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_half_open() {
        let at = |h: i64, m: i64| SessionBucket::for_time(Timestamp::from_secs(h * 3600 + m * 60));
        assert_eq!(at(8, 59), SessionBucket::AfterHours);
        assert_eq!(at(9, 0), SessionBucket::PreMarket);
        assert_eq!(at(14, 29), SessionBucket::PreMarket);
        assert_eq!(at(14, 30), SessionBucket::Market);
        assert_eq!(at(20, 59), SessionBucket::Market);
        assert_eq!(at(21, 0), SessionBucket::AfterHours);
    }

    #[test]
    fn negative_epochs_wrap_into_the_day() {
        // 1969-12-31 15:00 UTC
        assert_eq!(SessionBucket::for_time(Timestamp::from_secs(-9 * 3600)), SessionBucket::Market);
    }
}
