// src/domain/countdown.rs

use chrono::{DateTime, Duration, Utc};

/// Length of the COPA notice window, counted from the time the notice
/// was sent.
pub const NOTICE_WINDOW_DAYS: i64 = 5;

const MS_PER_DAY: i64 = 86_400_000;

/// Whole days left in the notice window, ceiling-rounded, floored at 0.
/// None when the notice timestamp is unknown.
///
/// `now` is always passed in by the caller: results depend on the clock and
/// must be recomputed on every render, never cached across requests.
pub fn days_remaining(sent_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    let sent = sent_at?;
    let window_end = sent + Duration::days(NOTICE_WINDOW_DAYS);
    let diff_ms = (window_end - now).num_milliseconds();
    // ceil(diff / day) without floating point
    let days = (diff_ms + MS_PER_DAY - 1).div_euclid(MS_PER_DAY);
    Some(days.max(0))
}

/// Urgency classification over the remaining-days value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStatus {
    /// Notice window has passed. Terminal.
    Expired,
    /// Exactly one day left; labels use the singular "day left".
    Critical,
    /// Two or three days left.
    Urgent,
    /// Four or more days left.
    Normal,
}

impl CountdownStatus {
    pub fn classify(remaining: i64) -> CountdownStatus {
        if remaining <= 0 {
            CountdownStatus::Expired
        } else if remaining == 1 {
            CountdownStatus::Critical
        } else if remaining <= 3 {
            CountdownStatus::Urgent
        } else {
            CountdownStatus::Normal
        }
    }

    /// CSS class for the countdown badge.
    pub fn css_class(self) -> &'static str {
        match self {
            CountdownStatus::Expired => "badge badge-expired",
            CountdownStatus::Critical => "badge badge-critical",
            CountdownStatus::Urgent => "badge badge-urgent",
            CountdownStatus::Normal => "badge badge-normal",
        }
    }
}

/// Badge text: "Past COPA", "1 day left", "{n} days left".
pub fn countdown_label(remaining: i64) -> String {
    match CountdownStatus::classify(remaining) {
        CountdownStatus::Expired => "Past COPA".to_string(),
        CountdownStatus::Critical => "1 day left".to_string(),
        _ => format!("{remaining} days left"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn sent_exactly_five_days_ago_has_zero_left() {
        let now = at("2025-08-06T12:00:00Z");
        let sent = at("2025-08-01T12:00:00Z");
        assert_eq!(days_remaining(Some(sent), now), Some(0));
    }

    #[test]
    fn sent_now_has_five_left() {
        let now = Utc.with_ymd_and_hms(2025, 8, 6, 9, 30, 0).unwrap();
        assert_eq!(days_remaining(Some(now), now), Some(5));
    }

    #[test]
    fn unknown_sent_time_is_none() {
        let now = at("2025-08-06T12:00:00Z");
        assert_eq!(days_remaining(None, now), None);
    }

    #[test]
    fn never_negative() {
        let now = at("2025-08-06T12:00:00Z");
        let long_ago = at("2025-01-01T00:00:00Z");
        assert_eq!(days_remaining(Some(long_ago), now), Some(0));
    }

    #[test]
    fn partial_days_round_up() {
        let now = at("2025-08-06T12:00:00Z");
        // window ends in 2 days and 1 second -> 3 days remaining
        let sent = at("2025-08-03T12:00:01Z");
        assert_eq!(days_remaining(Some(sent), now), Some(3));
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(CountdownStatus::classify(0), CountdownStatus::Expired);
        assert_eq!(CountdownStatus::classify(-2), CountdownStatus::Expired);
        assert_eq!(CountdownStatus::classify(1), CountdownStatus::Critical);
        assert_eq!(CountdownStatus::classify(2), CountdownStatus::Urgent);
        assert_eq!(CountdownStatus::classify(3), CountdownStatus::Urgent);
        assert_eq!(CountdownStatus::classify(4), CountdownStatus::Normal);
        assert_eq!(CountdownStatus::classify(5), CountdownStatus::Normal);
    }

    #[test]
    fn labels_use_singular_for_one_day() {
        assert_eq!(countdown_label(1), "1 day left");
        assert_eq!(countdown_label(3), "3 days left");
        assert_eq!(countdown_label(0), "Past COPA");
    }
}
