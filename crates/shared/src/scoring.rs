//! Weekly target arithmetic shared by the evaluator and the live progress views.

use serde::{Deserialize, Serialize};

use crate::model::{Activity, ExerciseType, Goal, Strictness};

/// Added to every member's HP change when the whole team met its target
pub const ALL_MET_BONUS: i64 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekTotals {
    pub total_distance_km: f64,
    pub total_visits: i64,
    /// Gym visits lasting at least the goal's minimum duration, or all visits when unset
    pub qualified_visits: i64,
    pub total_duration_min: i64,
}

impl WeekTotals {
    pub fn tally<'a, I>(activities: I, min_duration_min: Option<i64>) -> Self
    where
        I: IntoIterator<Item = &'a Activity>,
    {
        let mut totals = Self::default();
        for activity in activities {
            totals.total_distance_km += activity.distance_km;
            totals.total_duration_min += activity.duration_min;
            if activity.exercise_type == ExerciseType::Gym {
                totals.total_visits += 1;
                if min_duration_min.map_or(true, |min| activity.duration_min >= min) {
                    totals.qualified_visits += 1;
                }
            }
        }
        totals
    }
}

/// Binary pass/fail for a week. Goals missing the field for the team's exercise never pass.
pub fn target_met(exercise_type: ExerciseType, goal: &Goal, totals: &WeekTotals) -> bool {
    match exercise_type {
        ExerciseType::Running => goal
            .target_distance_km
            .is_some_and(|target| totals.total_distance_km >= target),
        ExerciseType::Gym => goal
            .target_visits_per_week
            .is_some_and(|target| totals.qualified_visits >= target),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberScore {
    pub totals: WeekTotals,
    pub target_met: bool,
    pub hp_change: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekScore {
    /// Same order as the totals passed to [`score_week`]
    pub members: Vec<MemberScore>,
    pub all_met: bool,
    pub hp_delta: i64,
}

pub fn score_week(
    strictness: Strictness,
    exercise_type: ExerciseType,
    goal: &Goal,
    member_totals: Vec<WeekTotals>,
) -> WeekScore {
    let mut members: Vec<MemberScore> = member_totals
        .into_iter()
        .map(|totals| {
            let target_met = target_met(exercise_type, goal, &totals);
            MemberScore {
                totals,
                target_met,
                hp_change: if target_met { 0 } else { strictness.miss_penalty() },
            }
        })
        .collect();

    let all_met = !members.is_empty() && members.iter().all(|m| m.target_met);
    if all_met {
        for member in members.iter_mut() {
            member.hp_change += ALL_MET_BONUS;
        }
    }

    let hp_delta = members.iter().map(|m| m.hp_change).sum();
    WeekScore {
        members,
        all_met,
        hp_delta,
    }
}

pub fn apply_hp_delta(current_hp: i64, delta: i64, max_hp: i64) -> i64 {
    (current_hp + delta).clamp(0, max_hp)
}

/// Share of the member's (multiplied) target reached so far, capped at 100
pub fn progress_percent(
    exercise_type: ExerciseType,
    goal: Option<&Goal>,
    totals: &WeekTotals,
    multiplier: f64,
) -> f64 {
    let Some(goal) = goal else {
        return 0.0;
    };
    let multiplier = if multiplier > 0.0 { multiplier } else { 1.0 };

    let percent = match exercise_type {
        ExerciseType::Running => match goal.target_distance_km {
            Some(target) if target > 0.0 => totals.total_distance_km / (target * multiplier) * 100.0,
            _ => 0.0,
        },
        ExerciseType::Gym => match goal.target_visits_per_week {
            Some(target) if target > 0 => {
                totals.qualified_visits as f64 / (target as f64 * multiplier) * 100.0
            }
            _ => 0.0,
        },
    };

    percent.min(100.0)
}

pub fn on_track(progress_percent: f64, days_remaining: i64) -> bool {
    progress_percent >= 100.0 || (days_remaining > 0 && progress_percent > 0.0)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::types::Id;

    fn goal(distance: Option<f64>, visits: Option<i64>, min_duration: Option<i64>) -> Goal {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Goal {
            id: Id::new(),
            team_id: Id::new(),
            exercise_type: if distance.is_some() { ExerciseType::Running } else { ExerciseType::Gym },
            target_distance_km: distance,
            target_visits_per_week: visits,
            target_min_duration_min: min_duration,
            created_at: now,
            updated_at: now,
        }
    }

    fn run(km: f64) -> WeekTotals {
        WeekTotals {
            total_distance_km: km,
            ..Default::default()
        }
    }

    fn gym_visit(duration_min: i64) -> Activity {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 18, 0, 0).unwrap();
        let mut activity = Activity::start("u".into(), None, ExerciseType::Gym, now);
        activity.duration_min = duration_min;
        activity
    }

    #[test]
    fn one_runner_meets_target_two_miss() {
        let goal = goal(Some(15.0), None, None);
        let score = score_week(
            Strictness::Normal,
            ExerciseType::Running,
            &goal,
            vec![run(16.0), run(0.0), run(0.0)],
        );

        let changes: Vec<_> = score.members.iter().map(|m| (m.target_met, m.hp_change)).collect();
        assert_eq!(changes, vec![(true, 0), (false, -15), (false, -15)]);
        assert!(!score.all_met);
        assert_eq!(apply_hp_delta(100, score.hp_delta, 100), 70);
    }

    #[test]
    fn everyone_meeting_target_earns_bonus() {
        let goal = goal(Some(15.0), None, None);
        let score = score_week(
            Strictness::Strict,
            ExerciseType::Running,
            &goal,
            vec![run(15.0), run(20.0), run(31.5)],
        );

        assert!(score.all_met);
        assert!(score.members.iter().all(|m| m.hp_change == ALL_MET_BONUS));
        assert_eq!(score.hp_delta, 15);
        assert_eq!(apply_hp_delta(100, score.hp_delta, 100), 100);
    }

    #[test]
    fn strictness_sets_penalty() {
        let goal = goal(Some(5.0), None, None);
        let score = score_week(Strictness::Strict, ExerciseType::Running, &goal, vec![run(1.0)]);
        assert_eq!(score.hp_delta, -25);
        assert_eq!(apply_hp_delta(20, score.hp_delta, 100), 0);
    }

    #[test]
    fn missing_goal_field_never_meets_target() {
        let gym_goal = goal(None, Some(2), None);
        assert!(!target_met(ExerciseType::Running, &gym_goal, &run(100.0)));

        let empty = score_week(Strictness::Normal, ExerciseType::Gym, &gym_goal, vec![]);
        assert!(!empty.all_met);
        assert_eq!(empty.hp_delta, 0);
    }

    #[test]
    fn short_gym_visits_do_not_qualify() {
        let visits = [gym_visit(25), gym_visit(45), gym_visit(30)];

        let totals = WeekTotals::tally(&visits, Some(30));
        assert_eq!(totals.total_visits, 3);
        assert_eq!(totals.qualified_visits, 2);
        assert_eq!(totals.total_duration_min, 100);

        let goal = goal(None, Some(3), Some(30));
        assert!(!target_met(ExerciseType::Gym, &goal, &totals));
        assert!(target_met(ExerciseType::Gym, &goal, &WeekTotals::tally(&visits, None)));
    }

    #[test]
    fn progress_applies_multiplier_and_caps() {
        let goal = goal(Some(10.0), None, None);
        assert_eq!(progress_percent(ExerciseType::Running, Some(&goal), &run(5.0), 1.0), 50.0);
        assert_eq!(progress_percent(ExerciseType::Running, Some(&goal), &run(5.0), 2.0), 25.0);
        assert_eq!(progress_percent(ExerciseType::Running, Some(&goal), &run(5.0), 0.0), 50.0);
        assert_eq!(progress_percent(ExerciseType::Running, Some(&goal), &run(30.0), 1.0), 100.0);
        assert_eq!(progress_percent(ExerciseType::Running, None, &run(30.0), 1.0), 0.0);
    }

    #[test]
    fn on_track_rules() {
        assert!(on_track(100.0, 0));
        assert!(on_track(10.0, 3));
        assert!(!on_track(0.0, 3));
        assert!(!on_track(60.0, 0));
    }
}
