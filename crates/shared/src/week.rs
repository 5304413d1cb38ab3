use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const DAYS_PER_WEEK: i64 = 7;
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Half-open `[start, end)` interval of a team's Nth week, anchored at its activation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekWindow {
    pub week_number: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl WeekWindow {
    /// `None` for week numbers below 1, i.e. a team that hasn't started
    pub fn new(started_at: DateTime<Utc>, week_number: i64) -> Option<Self> {
        if week_number < 1 {
            return None;
        }
        let start = started_at + Duration::days((week_number - 1) * DAYS_PER_WEEK);
        Some(Self {
            week_number,
            start,
            end: start + Duration::days(DAYS_PER_WEEK),
        })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }

    pub fn has_elapsed(&self, now: DateTime<Utc>) -> bool {
        now >= self.end
    }

    /// Last instant reported to clients as the end of the week
    pub fn display_end(&self) -> DateTime<Utc> {
        self.end - Duration::seconds(1)
    }

    /// Days left before the week closes, partial days rounded up, never negative
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        let seconds = (self.end - now).num_seconds();
        if seconds <= 0 {
            return 0;
        }
        (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn weeks_are_anchored_at_activation() {
        let week = WeekWindow::new(start(), 3).unwrap();
        assert_eq!(week.start, start() + Duration::days(14));
        assert_eq!(week.end, start() + Duration::days(21));
        assert!(WeekWindow::new(start(), 0).is_none());
    }

    #[test]
    fn end_is_exclusive() {
        let week = WeekWindow::new(start(), 1).unwrap();
        assert!(week.contains(start()));
        assert!(week.contains(week.end - Duration::milliseconds(1)));
        assert!(!week.contains(week.end));
        assert!(!week.has_elapsed(week.end - Duration::seconds(1)));
        assert!(week.has_elapsed(week.end));
    }

    #[test]
    fn days_remaining_rounds_up_and_floors_at_zero() {
        let week = WeekWindow::new(start(), 1).unwrap();
        assert_eq!(week.days_remaining(start()), 7);
        assert_eq!(week.days_remaining(start() + Duration::hours(30)), 6);
        assert_eq!(week.days_remaining(week.end - Duration::seconds(1)), 1);
        assert_eq!(week.days_remaining(week.end + Duration::days(2)), 0);
    }
}
