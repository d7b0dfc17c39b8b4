use std::collections::{BTreeMap, HashMap};

use time::{macros::format_description, Date, UtcOffset};

use super::dto::{ExerciseProgress, ProgressResponse, VolumePoint};
use crate::workouts::repo_types::Workout;

/// Per-exercise daily volume series for one user's workouts.
///
/// Workouts are bucketed by their UTC calendar day; the same exercise on the
/// same day sums. Exercises appear in order of first occurrence, each series
/// ascending by date. Rounding happens only on output.
pub fn aggregate(workouts: &[Workout]) -> ProgressResponse {
    let mut order: Vec<(String, BTreeMap<Date, f64>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for workout in workouts {
        let day = workout.date.to_offset(UtcOffset::UTC).date();
        for exercise in &workout.exercises {
            let slot = *index.entry(exercise.name.clone()).or_insert_with(|| {
                order.push((exercise.name.clone(), BTreeMap::new()));
                order.len() - 1
            });
            *order[slot].1.entry(day).or_insert(0.0) += exercise.volume();
        }
    }

    let exercises = order
        .into_iter()
        .map(|(name, days)| ExerciseProgress {
            name,
            data: days
                .into_iter()
                .map(|(day, volume)| VolumePoint {
                    date: format_day(day),
                    volume: round2(volume),
                })
                .collect(),
        })
        .collect();

    ProgressResponse { exercises }
}

fn format_day(day: Date) -> String {
    day.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| day.to_string())
}

/// Two-decimal rounding. Totals beyond `f64` range saturate so the series
/// stays numeric.
fn round2(v: f64) -> f64 {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded.is_finite() {
        rounded
    } else {
        v.clamp(0.0, f64::MAX)
    }
}
