use crate::domain::market_data::Timestamp;

const SECONDS_PER_DAY: i64 = 86_400;

/// Wall-clock `HH:MM:SS` for an epoch-second timestamp shifted by a fixed
/// UTC offset in minutes.
pub fn format_clock(timestamp: Timestamp, utc_offset_minutes: i32) -> String {
    let local = timestamp.secs() + i64::from(utc_offset_minutes) * 60;
    let of_day = local.rem_euclid(SECONDS_PER_DAY);
    format!("{:02}:{:02}:{:02}", of_day / 3600, of_day % 3600 / 60, of_day % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_offset_and_wraps_the_day() {
        // 1970-01-01 20:00:05 UTC is 04:00:05 the next day at UTC+8
        let ts = Timestamp::from_secs(20 * 3600 + 5);
        assert_eq!(format_clock(ts, 0), "20:00:05");
        assert_eq!(format_clock(ts, 480), "04:00:05");
    }

    #[test]
    fn negative_offsets_wrap_backwards() {
        assert_eq!(format_clock(Timestamp::from_secs(60), -90), "22:31:00");
    }
}
