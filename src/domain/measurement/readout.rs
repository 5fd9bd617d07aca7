use crate::domain::market_data::{Bar, Resolution};
use serde::Serialize;
use strum::AsRefStr;

/// Direction of a measured move, drives up/down coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

/// Return and duration between two bars, ordered by time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalReadout {
    pub left: Bar,
    pub right: Bar,
    pub percent: f64,
    pub duration_secs: i64,
    pub trend: Trend,
    pub percent_label: String,
    pub duration_label: String,
}

impl IntervalReadout {
    /// `None` when the percentage cannot be computed (zero or non-finite base).
    pub fn between(a: Bar, b: Bar, resolution: Resolution) -> Option<Self> {
        let (left, right) = order_by_time(a, b);
        let percent = percent_change(left.price.value(), right.price.value())?;
        let duration_secs = right.time.secs() - left.time.secs();
        Some(Self {
            left,
            right,
            percent,
            duration_secs,
            trend: if percent >= 0.0 { Trend::Up } else { Trend::Down },
            percent_label: format_percent(percent),
            duration_label: format_duration(duration_secs, resolution),
        })
    }

    /// Everything after the percent label: `duration · left → right`.
    pub fn details(&self) -> String {
        format!(
            "{} · {} → {}",
            self.duration_label,
            format_price(self.left.price.value()),
            format_price(self.right.price.value())
        )
    }

    pub fn summary(&self) -> String {
        format!("{} · {}", self.percent_label, self.details())
    }
}

pub fn order_by_time(a: Bar, b: Bar) -> (Bar, Bar) {
    if a.time <= b.time { (a, b) } else { (b, a) }
}

/// `(right − left) / left × 100`
pub fn percent_change(left: f64, right: f64) -> Option<f64> {
    if !left.is_finite() || !right.is_finite() || left == 0.0 {
        return None;
    }
    Some((right - left) / left * 100.0)
}

pub fn format_percent(percent: f64) -> String {
    // -0.0 compares equal to zero and gets the plus sign
    let sign = if percent >= 0.0 { '+' } else { '-' };
    format!("{sign}{:.2}%", percent.abs())
}

pub fn format_duration(secs: i64, resolution: Resolution) -> String {
    if resolution.is_sub_minute() {
        format!("{secs}s")
    } else {
        format!("{}m", (secs as f64 / 60.0).round() as i64)
    }
}

pub fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::{Price, Timestamp};

    fn bar(time: i64, price: f64) -> Bar {
        Bar::new(Timestamp::from_secs(time), Price::from(price))
    }

    #[test]
    fn readout_orders_and_labels() {
        let res = Resolution::new(60).unwrap();
        let readout = IntervalReadout::between(bar(180, 160.0), bar(0, 110.0), res).unwrap();
        assert_eq!(readout.left.time.secs(), 0);
        assert_eq!(readout.percent_label, "+45.45%");
        assert_eq!(readout.duration_label, "3m");
        assert_eq!(readout.trend, Trend::Up);
        assert_eq!(readout.details(), "3m · 110.00 → 160.00");
        assert_eq!(readout.summary(), "+45.45% · 3m · 110.00 → 160.00");
    }

    #[test]
    fn negative_moves_are_down() {
        let readout = IntervalReadout::between(bar(0, 100.0), bar(50, 96.9), Resolution::ONE_SECOND).unwrap();
        assert_eq!(readout.percent_label, "-3.10%");
        assert_eq!(readout.duration_label, "50s");
        assert_eq!(readout.trend, Trend::Down);
    }

    #[test]
    fn zero_base_price_has_no_readout() {
        assert!(IntervalReadout::between(bar(0, 0.0), bar(1, 5.0), Resolution::ONE_SECOND).is_none());
    }

    #[test]
    fn sign_follows_unrounded_value() {
        assert_eq!(format_percent(-0.001), "-0.00%");
        assert_eq!(format_percent(0.0), "+0.00%");
        assert_eq!(format_percent(-0.0), "+0.00%");
    }
}
