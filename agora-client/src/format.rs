use crate::api::Time;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

/// Human-readable age of `then`, as seen at `now`
pub fn time_since(then: Time, now: Time) -> String {
    let secs = (now - then).num_seconds();
    let (n, unit) = match secs {
        s if s < MINUTE => return String::from("Just now"),
        s if s < HOUR => (s / MINUTE, "minute"),
        s if s < DAY => (s / HOUR, "hour"),
        s if s < WEEK => (s / DAY, "day"),
        s => (s / WEEK, "week"),
    };
    match n {
        1 => format!("1 {unit} ago"),
        n => format!("{n} {unit}s ago"),
    }
}

pub fn yes_no(b: bool) -> &'static str {
    match b {
        true => "Yes",
        false => "No",
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    #[test]
    fn buckets() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let ago = |secs| time_since(now - Duration::seconds(secs), now);
        assert_eq!(ago(0), "Just now");
        assert_eq!(ago(59), "Just now");
        assert_eq!(ago(60), "1 minute ago");
        assert_eq!(ago(3599), "59 minutes ago");
        assert_eq!(ago(7200), "2 hours ago");
        assert_eq!(ago(86_400), "1 day ago");
        assert_eq!(ago(6 * 86_400 + 1), "6 days ago");
        assert_eq!(ago(604_800), "1 week ago");
        assert_eq!(ago(30 * 86_400), "4 weeks ago");
        assert_eq!(ago(-3600), "Just now");
    }
}
