//! Turns raw workout payloads into canonical [`Workout`] records.
//!
//! Payloads arrive untyped (`{date?, notes?, exercises?}`); set values are
//! coerced the way loose form input is (numeric strings, booleans, null).
//! Validation either yields a complete record or a [`ValidationError`];
//! nothing is partially applied.

use serde_json::Value;
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime, UtcOffset,
};
use uuid::Uuid;

use super::repo_types::{Exercise, Set, Workout};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("At least one exercise with valid sets is required")]
    MissingExercises,
    #[error("Exercise at index {index} requires a name")]
    MissingExerciseName { index: usize },
    #[error("Exercise {exercise} requires at least one set")]
    MissingSets { exercise: String },
    #[error("Invalid set at index {index} for exercise {exercise}")]
    InvalidSet { index: usize, exercise: String },
    #[error("Invalid workout date: {value}")]
    InvalidDate { value: String },
}

/// Builds a new workout for `user_id` from a create payload.
pub fn validate_new(
    payload: &Value,
    user_id: Uuid,
    now: OffsetDateTime,
) -> Result<Workout, ValidationError> {
    let exercises = parse_exercises(payload.get("exercises"))?;
    let date = match date_field(payload) {
        Some(parsed) => parsed?,
        None => now,
    };
    let notes = notes_field(payload).unwrap_or_default();

    Ok(Workout {
        id: Uuid::new_v4(),
        user_id,
        date,
        notes,
        exercises,
        created_at: now,
        updated_at: now,
    })
}

/// Applies an update payload on top of `existing`.
///
/// Absent fields keep their stored values; an unusable `date` keeps the
/// stored date rather than failing.
pub fn validate_update(
    payload: &Value,
    existing: &Workout,
    now: OffsetDateTime,
) -> Result<Workout, ValidationError> {
    let exercises = match payload.get("exercises") {
        None | Some(Value::Null) => existing.exercises.clone(),
        present => parse_exercises(present)?,
    };
    let date = match date_field(payload) {
        Some(Ok(date)) => date,
        _ => existing.date,
    };
    let notes = notes_field(payload).unwrap_or_else(|| existing.notes.clone());

    Ok(Workout {
        date,
        notes,
        exercises,
        updated_at: now,
        ..existing.clone()
    })
}

fn parse_exercises(raw: Option<&Value>) -> Result<Vec<Exercise>, ValidationError> {
    match raw {
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .enumerate()
            .map(|(index, item)| parse_exercise(index, item))
            .collect(),
        _ => Err(ValidationError::MissingExercises),
    }
}

fn parse_exercise(index: usize, raw: &Value) -> Result<Exercise, ValidationError> {
    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(ValidationError::MissingExerciseName { index })?
        .to_string();

    let sets = match raw.get("sets") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(set_index, item)| parse_set(set_index, item, &name))
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };
    if sets.is_empty() {
        return Err(ValidationError::MissingSets { exercise: name });
    }
    // The exercise total must stay a finite number as well as each set.
    let mut total = 0.0;
    for (index, set) in sets.iter().enumerate() {
        total += set.volume();
        if !total.is_finite() {
            return Err(ValidationError::InvalidSet { index, exercise: name });
        }
    }

    Ok(Exercise { name, sets })
}

fn parse_set(index: usize, raw: &Value, exercise: &str) -> Result<Set, ValidationError> {
    let reps = coerce_number(raw.get("reps"));
    let weight = coerce_number(raw.get("weight"));

    let reps_ok = reps.is_finite()
        && reps > 0.0
        && reps.fract() == 0.0
        && reps <= f64::from(u32::MAX);
    let weight_ok = weight.is_finite() && weight >= 0.0;
    if !(reps_ok && weight_ok && (reps * weight).is_finite()) {
        return Err(ValidationError::InvalidSet {
            index,
            exercise: exercise.to_string(),
        });
    }

    Ok(Set {
        reps: reps as u32,
        weight,
    })
}

/// Loose numeric coercion; anything without a numeric reading is NaN.
fn coerce_number(raw: Option<&Value>) -> f64 {
    match raw {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse().unwrap_or(f64::NAN)
            }
        }
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Null) => 0.0,
        Some(Value::Array(_) | Value::Object(_)) | None => f64::NAN,
    }
}

/// `None` when the payload carries no date; blank strings count as absent.
fn date_field(payload: &Value) -> Option<Result<OffsetDateTime, ValidationError>> {
    let raw = payload.get("date")?;
    let invalid = || ValidationError::InvalidDate {
        value: raw.to_string(),
    };
    match raw {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(parse_date(s.trim()).ok_or_else(invalid)),
        _ => Some(Err(invalid())),
    }
}

fn notes_field(payload: &Value) -> Option<String> {
    payload
        .get("notes")
        .and_then(Value::as_str)
        .map(|n| n.trim().to_string())
}

/// Accepts RFC 3339, a bare calendar date (midnight UTC), or a local
/// date-time without offset (taken as UTC). Result is normalized to UTC.
pub fn parse_date(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(dt.to_offset(UtcOffset::UTC));
    }
    if let Ok(date) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
        return Some(date.midnight().assume_utc());
    }
    let with_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let without_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]");
    PrimitiveDateTime::parse(raw, with_seconds)
        .or_else(|_| PrimitiveDateTime::parse(raw, without_seconds))
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-03-10 15:30 UTC);

    fn squat_payload() -> Value {
        json!({
            "date": "2024-01-01",
            "notes": "  felt strong  ",
            "exercises": [{ "name": " Squat ", "sets": [{ "reps": 5, "weight": 100 }] }]
        })
    }

    #[test]
    fn set_volume_must_stay_finite() {
        let payload = json!({
            "exercises": [{ "name": "Squat", "sets": [{ "reps": 2, "weight": 1e308 }] }]
        });
        assert_eq!(
            validate_new(&payload, Uuid::new_v4(), NOW),
            Err(ValidationError::InvalidSet { index: 0, exercise: "Squat".into() })
        );
    }

    #[test]
    fn exercise_volume_total_must_stay_finite() {
        let payload = json!({
            "exercises": [{
                "name": "Squat",
                "sets": [{ "reps": 1, "weight": 1e308 }, { "reps": 1, "weight": 1e308 }]
            }]
        });
        assert_eq!(
            validate_new(&payload, Uuid::new_v4(), NOW),
            Err(ValidationError::InvalidSet { index: 1, exercise: "Squat".into() })
        );
    }

    #[test]
    fn valid_payload_becomes_canonical_workout() {
        let user_id = Uuid::new_v4();
        let w = validate_new(&squat_payload(), user_id, NOW).unwrap();
        assert_eq!(w.user_id, user_id);
        assert_eq!(w.date, datetime!(2024-01-01 00:00 UTC));
        assert_eq!(w.notes, "felt strong");
        assert_eq!(
            w.exercises,
            vec![Exercise {
                name: "Squat".into(),
                sets: vec![Set {
                    reps: 5,
                    weight: 100.0
                }],
            }]
        );
        assert_eq!(w.created_at, NOW);
        assert_eq!(w.updated_at, NOW);
    }

    #[test]
    fn exercise_and_set_order_is_preserved() {
        let payload = json!({
            "exercises": [
                { "name": "Bench Press", "sets": [{ "reps": 8, "weight": 60 }, { "reps": 6, "weight": 70 }] },
                { "name": "Row", "sets": [{ "reps": 10, "weight": 40 }] },
            ]
        });
        let w = validate_new(&payload, Uuid::new_v4(), NOW).unwrap();
        let names: Vec<_> = w.exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Bench Press", "Row"]);
        assert_eq!(w.exercises[0].sets[1], Set { reps: 6, weight: 70.0 });
    }

    #[test]
    fn missing_date_defaults_to_now_and_notes_to_empty() {
        let payload = json!({ "exercises": [{ "name": "Row", "sets": [{ "reps": 1, "weight": 0 }] }] });
        let w = validate_new(&payload, Uuid::new_v4(), NOW).unwrap();
        assert_eq!(w.date, NOW);
        assert_eq!(w.notes, "");
    }

    #[test]
    fn blank_date_counts_as_absent() {
        let mut payload = squat_payload();
        payload["date"] = json!("  ");
        assert_eq!(validate_new(&payload, Uuid::new_v4(), NOW).unwrap().date, NOW);
    }

    #[test]
    fn unparseable_date_fails_on_create() {
        let mut payload = squat_payload();
        payload["date"] = json!("next tuesday");
        assert!(matches!(
            validate_new(&payload, Uuid::new_v4(), NOW),
            Err(ValidationError::InvalidDate { .. })
        ));
    }

    #[test]
    fn exercises_missing_empty_or_not_a_list_fail() {
        for payload in [
            json!({}),
            json!({ "exercises": [] }),
            json!({ "exercises": "Squat" }),
            json!({ "exercises": null }),
            json!("not even an object"),
        ] {
            assert_eq!(
                validate_new(&payload, Uuid::new_v4(), NOW),
                Err(ValidationError::MissingExercises),
                "payload {payload}"
            );
        }
    }

    #[test]
    fn blank_or_missing_name_identifies_exercise() {
        let payload = json!({
            "exercises": [
                { "name": "Squat", "sets": [{ "reps": 5, "weight": 100 }] },
                { "name": "   ", "sets": [{ "reps": 5, "weight": 100 }] },
            ]
        });
        assert_eq!(
            validate_new(&payload, Uuid::new_v4(), NOW),
            Err(ValidationError::MissingExerciseName { index: 1 })
        );

        let payload = json!({ "exercises": [{ "sets": [{ "reps": 5, "weight": 100 }] }] });
        assert_eq!(
            validate_new(&payload, Uuid::new_v4(), NOW),
            Err(ValidationError::MissingExerciseName { index: 0 })
        );
    }

    #[test]
    fn exercise_without_sets_fails() {
        for sets in [json!([]), json!(null), json!("5x5")] {
            let payload = json!({ "exercises": [{ "name": "Deadlift", "sets": sets }] });
            let err = validate_new(&payload, Uuid::new_v4(), NOW).unwrap_err();
            assert_eq!(
                err,
                ValidationError::MissingSets {
                    exercise: "Deadlift".into()
                }
            );
            assert_eq!(err.to_string(), "Exercise Deadlift requires at least one set");
        }
    }

    #[test]
    fn out_of_range_sets_report_index_and_exercise() {
        let bad_sets = [
            json!({ "reps": 0, "weight": 50 }),
            json!({ "reps": -3, "weight": 50 }),
            json!({ "reps": 5, "weight": -1 }),
            json!({ "reps": "abc", "weight": 50 }),
            json!({ "reps": 5, "weight": "Infinity" }),
            json!({ "reps": 5 }),
            json!({ "reps": 2.5, "weight": 50 }),
            json!({ "reps": [5], "weight": 50 }),
            json!(7),
        ];
        for bad in bad_sets {
            let payload = json!({
                "exercises": [{ "name": "Bench Press", "sets": [{ "reps": 5, "weight": 60 }, bad] }]
            });
            let err = validate_new(&payload, Uuid::new_v4(), NOW).unwrap_err();
            assert_eq!(
                err,
                ValidationError::InvalidSet {
                    index: 1,
                    exercise: "Bench Press".into()
                },
                "set {bad}"
            );
            assert_eq!(err.to_string(), "Invalid set at index 1 for exercise Bench Press");
        }
    }

    #[test]
    fn numeric_strings_and_zero_weight_are_accepted() {
        let payload = json!({
            "exercises": [{ "name": "Pull-up", "sets": [
                { "reps": " 12 ", "weight": "0" },
                { "reps": "3", "weight": "" },
                { "reps": true, "weight": 22.5 },
            ] }]
        });
        let w = validate_new(&payload, Uuid::new_v4(), NOW).unwrap();
        assert_eq!(
            w.exercises[0].sets,
            vec![
                Set { reps: 12, weight: 0.0 },
                Set { reps: 3, weight: 0.0 },
                Set { reps: 1, weight: 22.5 },
            ]
        );
    }

    #[test]
    fn date_forms_normalize_to_utc() {
        assert_eq!(
            parse_date("2024-01-08T18:00:00+02:00"),
            Some(datetime!(2024-01-08 16:00 UTC))
        );
        assert_eq!(
            parse_date("2024-01-08T06:30:00.250Z"),
            Some(datetime!(2024-01-08 06:30:00.25 UTC))
        );
        assert_eq!(parse_date("2024-01-08"), Some(datetime!(2024-01-08 00:00 UTC)));
        assert_eq!(parse_date("2024-01-08T07:15"), Some(datetime!(2024-01-08 07:15 UTC)));
        assert_eq!(parse_date("2024-01-08T07:15:30"), Some(datetime!(2024-01-08 07:15:30 UTC)));
        assert_eq!(parse_date("2024-13-45"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    fn existing() -> Workout {
        validate_new(&squat_payload(), Uuid::new_v4(), datetime!(2024-01-01 12:00 UTC)).unwrap()
    }

    #[test]
    fn update_keeps_identity_and_bumps_updated_at() {
        let old = existing();
        let payload = json!({
            "date": "2024-01-02",
            "notes": "moved",
            "exercises": [{ "name": "Front Squat", "sets": [{ "reps": 3, "weight": 80 }] }]
        });
        let updated = validate_update(&payload, &old, NOW).unwrap();
        assert_eq!(updated.id, old.id);
        assert_eq!(updated.user_id, old.user_id);
        assert_eq!(updated.created_at, old.created_at);
        assert_eq!(updated.updated_at, NOW);
        assert_eq!(updated.date, datetime!(2024-01-02 00:00 UTC));
        assert_eq!(updated.notes, "moved");
        assert_eq!(updated.exercises[0].name, "Front Squat");
    }

    #[test]
    fn update_retains_date_when_absent_or_invalid() {
        let old = existing();
        for payload in [json!({}), json!({ "date": "garbage" }), json!({ "date": 42 })] {
            let updated = validate_update(&payload, &old, NOW).unwrap();
            assert_eq!(updated.date, old.date, "payload {payload}");
            assert_ne!(updated.date, NOW);
        }
    }

    #[test]
    fn update_retains_notes_and_exercises_when_absent() {
        let old = existing();
        let updated = validate_update(&json!({ "date": "2024-02-01" }), &old, NOW).unwrap();
        assert_eq!(updated.notes, old.notes);
        assert_eq!(updated.exercises, old.exercises);
    }

    #[test]
    fn update_with_present_but_invalid_exercises_fails() {
        let old = existing();
        assert_eq!(
            validate_update(&json!({ "exercises": [] }), &old, NOW),
            Err(ValidationError::MissingExercises)
        );
        let bad = json!({ "exercises": [{ "name": "Squat", "sets": [{ "reps": 0, "weight": 1 }] }] });
        assert!(matches!(
            validate_update(&bad, &old, NOW),
            Err(ValidationError::InvalidSet { index: 0, .. })
        ));
    }
}
