//! Read-only views derived from stored evaluations and activity history.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::{
    api::payloads::{DailyStat, HpChangeEntry, WeekHpHistory},
    model::WeeklyEvaluation,
};

pub const ANALYSIS_PERIOD_WEEKS: i64 = 4;
/// Weekdays with a lower success rate than this are flagged
pub const DANGER_THRESHOLD: f64 = 0.4;

pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Replays evaluations week by week starting from `max_hp`.
///
/// Only floored at 0, like the history it reproduces. The team's stored HP stays authoritative.
pub fn hp_history<'a, I>(evaluations: I, max_hp: i64) -> Vec<WeekHpHistory>
where
    I: IntoIterator<Item = (&'a WeeklyEvaluation, String)>,
{
    let mut weeks: BTreeMap<i64, Vec<HpChangeEntry>> = BTreeMap::new();
    for (evaluation, user_name) in evaluations {
        weeks
            .entry(evaluation.week_number)
            .or_default()
            .push(HpChangeEntry {
                user_id: evaluation.user_id.clone(),
                user_name,
                hp_change: evaluation.hp_change,
                target_met: evaluation.target_met,
            });
    }

    let mut hp = max_hp;
    weeks
        .into_iter()
        .map(|(week, changes)| {
            let hp_start = hp;
            let delta: i64 = changes.iter().map(|c| c.hp_change).sum();
            hp = (hp + delta).max(0);
            WeekHpHistory {
                week,
                hp_start,
                hp_end: hp,
                changes,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub daily_stats: Vec<DailyStat>,
    pub danger_days: Vec<String>,
    pub recommendation: String,
}

pub fn analysis_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(ANALYSIS_PERIOD_WEEKS * 7)
}

/// Per weekday share of days in the trailing window on which the user completed anything.
///
/// `activity_starts` are the start times of completed activities inside the window.
pub fn predict<I>(activity_starts: I, now: DateTime<Utc>) -> Prediction
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let since = analysis_start(now);

    let mut day_total = [0i64; 7];
    let mut day = since;
    while day < now {
        day_total[day.weekday().num_days_from_sunday() as usize] += 1;
        day += Duration::days(1);
    }

    let active_dates: HashSet<NaiveDate> = activity_starts
        .into_iter()
        .filter(|at| *at >= since)
        .map(|at| at.date_naive())
        .collect();
    let mut day_active = [0i64; 7];
    for date in active_dates {
        day_active[date.weekday().num_days_from_sunday() as usize] += 1;
    }

    let mut danger_days = Vec::new();
    let daily_stats = (0..7)
        .map(|dow| {
            let success_rate = if day_total[dow] > 0 {
                day_active[dow] as f64 / day_total[dow] as f64
            } else {
                0.0
            };
            let is_danger = success_rate < DANGER_THRESHOLD;
            if is_danger {
                danger_days.push(DAY_NAMES[dow].to_string());
            }
            DailyStat {
                day_of_week: dow as i64,
                day_name: DAY_NAMES[dow].to_string(),
                success_rate,
                activity_count: day_active[dow],
                is_danger,
            }
        })
        .collect();

    let recommendation = if danger_days.is_empty() {
        "Great work! You are exercising consistently across the whole week.".to_string()
    } else {
        format!(
            "Watch out for {}. You tend to skip workouts on these days.",
            danger_days.join(", ")
        )
    };

    Prediction {
        daily_stats,
        danger_days,
        recommendation,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::Id;

    fn evaluation(week_number: i64, user_id: &str, hp_change: i64) -> WeeklyEvaluation {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        WeeklyEvaluation {
            id: Id::new(),
            team_id: Id::new(),
            user_id: user_id.into(),
            week_number,
            target_met: hp_change >= 0,
            total_distance_km: 0.0,
            total_visits: 0,
            total_duration_min: 0,
            hp_change,
            evaluated_at: at,
            created_at: at,
        }
    }

    #[test]
    fn replays_weeks_in_order() {
        let evaluations = [
            evaluation(2, "a", -25),
            evaluation(1, "a", 0),
            evaluation(1, "b", -15),
            evaluation(2, "b", -25),
            evaluation(3, "a", -25),
            evaluation(3, "b", -25),
        ];
        let history = hp_history(evaluations.iter().map(|e| (e, e.user_id.to_uppercase())), 100);

        let summary: Vec<_> = history.iter().map(|w| (w.week, w.hp_start, w.hp_end)).collect();
        assert_eq!(summary, vec![(1, 100, 85), (2, 85, 35), (3, 35, 0)]);
        assert_eq!(history[0].changes[1].user_name, "B");
    }

    #[test]
    fn history_is_not_capped_at_max() {
        let evaluations = [evaluation(1, "a", 5), evaluation(1, "b", 5)];
        let history = hp_history(evaluations.iter().map(|e| (e, String::new())), 100);
        assert_eq!(history[0].hp_end, 110);
    }

    #[test]
    fn flags_weekdays_without_activity() {
        // Wednesday noon
        let now = Utc.with_ymd_and_hms(2024, 5, 29, 12, 0, 0).unwrap();
        let since = analysis_start(now);

        // Every Monday in the window, twice on one of them
        let mut starts: Vec<DateTime<Utc>> = (0..28)
            .map(|d| since + Duration::days(d))
            .filter(|d| d.weekday() == chrono::Weekday::Mon)
            .collect();
        starts.push(starts[0] + Duration::hours(3));
        // Outside the window
        starts.push(since - Duration::days(1));

        let prediction = predict(starts, now);

        assert_eq!(prediction.daily_stats.len(), 7);
        let monday = &prediction.daily_stats[1];
        assert_eq!(monday.day_name, "Monday");
        assert_eq!(monday.activity_count, 4);
        assert_eq!(monday.success_rate, 1.0);
        assert!(!monday.is_danger);

        assert_eq!(prediction.danger_days.len(), 6);
        assert!(!prediction.danger_days.contains(&"Monday".to_string()));
        assert!(prediction.recommendation.contains("Sunday"));
    }

    #[test]
    fn no_activity_flags_every_day() {
        let now = Utc.with_ymd_and_hms(2024, 5, 29, 12, 0, 0).unwrap();
        let prediction = predict(Vec::new(), now);
        assert!(prediction.daily_stats.iter().all(|s| s.is_danger && s.success_rate == 0.0));
        assert_eq!(prediction.danger_days.len(), 7);
    }
}
