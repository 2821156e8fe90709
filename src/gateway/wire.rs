// Wire-format payloads
//
// The backend speaks camelCase JSON with nullable reps/time and
// groupType/groupId pairs; the model speaks tagged variants. Conversions in
// both directions live here so the invariants are checked at exactly one
// boundary:
// - exactly one of reps/time per exercise
// - groupType and groupId present together or not at all
// - completedDate meaningful only while isCompleted is set

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::model::{
    Client, ClientId, Exercise, ExerciseDraft, ExerciseId, Group, GroupId, GroupKind, Meal,
    MealItem, Metric, NutritionPlan, Session, SessionId,
};

use super::{SessionEcho, SessionUpdate};

// ─────────────────────────────────────────────────────────────────────────────
// Exercise
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExerciseWire {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub exercise_name: String,
    pub sets: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<u32>,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<GroupKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ExerciseWire {
    pub fn from_draft(draft: &ExerciseDraft, session_id: &SessionId) -> Self {
        let (reps, time) = split_metric(draft.metric);
        Self {
            id: String::new(),
            exercise_name: draft.name.clone(),
            sets: draft.sets,
            reps,
            time,
            weight: draft.weight,
            group_type: draft.group.as_ref().map(|g| g.kind),
            group_id: draft.group.as_ref().map(|g| g.id.as_str().to_string()),
            session_id: Some(session_id.as_str().to_string()),
        }
    }

    /// Full-replace update payload (no partial patch semantics)
    pub fn from_exercise(exercise: &Exercise, session_id: &SessionId) -> Self {
        let (reps, time) = split_metric(exercise.metric);
        Self {
            id: exercise.id.as_str().to_string(),
            exercise_name: exercise.name.clone(),
            sets: exercise.sets,
            reps,
            time,
            weight: exercise.weight,
            group_type: exercise.group.as_ref().map(|g| g.kind),
            group_id: exercise.group.as_ref().map(|g| g.id.as_str().to_string()),
            session_id: Some(session_id.as_str().to_string()),
        }
    }

    pub fn into_exercise(self) -> Result<Exercise, SyncError> {
        let metric = match (self.reps, self.time) {
            (Some(reps), None) => Metric::Reps(reps),
            (None, Some(time)) => Metric::Time(time),
            (Some(_), Some(_)) => {
                return Err(SyncError::Decoding(format!(
                    "exercise {}: both reps and time present",
                    self.id
                )))
            }
            (None, None) => {
                return Err(SyncError::Decoding(format!(
                    "exercise {}: neither reps nor time present",
                    self.id
                )))
            }
        };

        let group = match (self.group_type, self.group_id) {
            (Some(kind), Some(id)) => Some(Group {
                kind,
                id: GroupId::new(id),
            }),
            (None, None) => None,
            _ => {
                return Err(SyncError::Decoding(format!(
                    "exercise {}: groupType and groupId must be present together",
                    self.id
                )))
            }
        };

        Ok(Exercise {
            id: ExerciseId::new(self.id),
            name: self.exercise_name,
            sets: self.sets,
            metric,
            weight: self.weight,
            group,
        })
    }
}

fn split_metric(metric: Metric) -> (Option<u32>, Option<u32>) {
    match metric {
        Metric::Reps(reps) => (Some(reps), None),
        Metric::Time(time) => (None, Some(time)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionWire {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub workout_name: String,
    pub client_id: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exercises: Vec<ExerciseWire>,
}

impl SessionWire {
    /// Create payload: a fresh session carries only a name and its owner
    pub fn create(client_id: &ClientId, workout_name: &str) -> Self {
        Self {
            id: String::new(),
            workout_name: workout_name.to_string(),
            client_id: client_id.as_str().to_string(),
            is_completed: false,
            completed_date: None,
            exercises: Vec::new(),
        }
    }

    pub fn into_session(self) -> Result<Session, SyncError> {
        // A stray completedDate on an incomplete session is dropped rather
        // than rejected; the flag is authoritative.
        let completed_date = if self.is_completed {
            self.completed_date
        } else {
            None
        };

        let exercises = self
            .exercises
            .into_iter()
            .map(ExerciseWire::into_exercise)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Session {
            id: SessionId::new(self.id),
            workout_name: self.workout_name,
            client_id: ClientId::new(self.client_id),
            exercises,
            is_completed: self.is_completed,
            completed_date,
        })
    }
}

/// Update payload: session metadata plus the exercise-id list, never the
/// nested exercise objects
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionUpdateWire {
    pub workout_name: String,
    pub is_completed: bool,
    pub completed_date: Option<DateTime<Utc>>,
    pub client_id: String,
    pub exercise_ids: Vec<String>,
}

impl From<&SessionUpdate> for SessionUpdateWire {
    fn from(update: &SessionUpdate) -> Self {
        Self {
            workout_name: update.workout_name.clone(),
            is_completed: update.is_completed,
            completed_date: update.completed_date,
            client_id: update.client_id.as_str().to_string(),
            exercise_ids: update
                .exercise_ids
                .iter()
                .map(|id| id.as_str().to_string())
                .collect(),
        }
    }
}

/// What the update endpoint echoes: exercises come back as bare id
/// references, not expanded objects
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionEchoWire {
    pub id: String,
    pub workout_name: String,
    pub client_id: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exercise_ids: Vec<String>,
}

impl From<SessionEchoWire> for SessionEcho {
    fn from(wire: SessionEchoWire) -> Self {
        let completed_date = if wire.is_completed {
            wire.completed_date
        } else {
            None
        };
        Self {
            id: SessionId::new(wire.id),
            workout_name: wire.workout_name,
            client_id: ClientId::new(wire.client_id),
            is_completed: wire.is_completed,
            completed_date,
            exercise_ids: wire.exercise_ids.into_iter().map(ExerciseId::new).collect(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClientWire {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub age: u32,
    pub height: f64,
    pub weight: f64,
    pub medical_history: String,
    pub goals: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_image: Option<String>,
    pub owner_id: String,
}

impl From<&Client> for ClientWire {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id.as_str().to_string(),
            name: client.name.clone(),
            age: client.age,
            height: client.height,
            weight: client.weight,
            medical_history: client.medical_history.clone(),
            goals: client.goals.clone(),
            client_image: client.image_ref.clone(),
            owner_id: client.owner_id.clone(),
        }
    }
}

impl From<ClientWire> for Client {
    fn from(wire: ClientWire) -> Self {
        Self {
            id: ClientId::new(wire.id),
            name: wire.name,
            age: wire.age,
            height: wire.height,
            weight: wire.weight,
            medical_history: wire.medical_history,
            goals: wire.goals,
            image_ref: wire.client_image,
            owner_id: wire.owner_id,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Nutrition
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MealItemWire {
    pub name: String,
    pub quantity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MealWire {
    pub meal_name: String,
    pub items: Vec<MealItemWire>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NutritionWire {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub client_id: String,
    pub meals: Vec<MealWire>,
}

impl From<&NutritionPlan> for NutritionWire {
    fn from(plan: &NutritionPlan) -> Self {
        Self {
            id: plan.id.clone(),
            client_id: plan.client_id.as_str().to_string(),
            meals: plan
                .meals
                .iter()
                .map(|meal| MealWire {
                    meal_name: meal.meal_name.clone(),
                    items: meal
                        .items
                        .iter()
                        .map(|item| MealItemWire {
                            name: item.name.clone(),
                            quantity: item.quantity.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl From<NutritionWire> for NutritionPlan {
    fn from(wire: NutritionWire) -> Self {
        Self {
            id: wire.id,
            client_id: ClientId::new(wire.client_id),
            meals: wire
                .meals
                .into_iter()
                .map(|meal| Meal {
                    meal_name: meal.meal_name,
                    items: meal
                        .items
                        .into_iter()
                        .map(|item| MealItem {
                            name: item.name,
                            quantity: item.quantity,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exercise_decodes_reps_xor_time() {
        let reps: ExerciseWire = serde_json::from_str(
            r#"{"id":"e1","exerciseName":"Squat","sets":5,"reps":5,"weight":100.0}"#,
        )
        .unwrap();
        let exercise = reps.into_exercise().unwrap();
        assert_eq!(exercise.metric, Metric::Reps(5));

        let time: ExerciseWire = serde_json::from_str(
            r#"{"id":"e2","exerciseName":"Plank","sets":3,"time":60,"weight":0.0}"#,
        )
        .unwrap();
        let exercise = time.into_exercise().unwrap();
        assert_eq!(exercise.metric, Metric::Time(60));
    }

    #[test]
    fn exercise_with_both_or_neither_metric_is_rejected() {
        let both: ExerciseWire = serde_json::from_str(
            r#"{"id":"e1","exerciseName":"Squat","sets":5,"reps":5,"time":60,"weight":100.0}"#,
        )
        .unwrap();
        assert!(matches!(
            both.into_exercise(),
            Err(SyncError::Decoding(_))
        ));

        let neither: ExerciseWire = serde_json::from_str(
            r#"{"id":"e1","exerciseName":"Squat","sets":5,"weight":100.0}"#,
        )
        .unwrap();
        assert!(matches!(
            neither.into_exercise(),
            Err(SyncError::Decoding(_))
        ));
    }

    #[test]
    fn group_fields_must_travel_together() {
        let grouped: ExerciseWire = serde_json::from_str(
            r#"{"id":"e1","exerciseName":"Row","sets":3,"reps":12,"weight":40.0,
                "groupType":"circuit","groupId":"g1"}"#,
        )
        .unwrap();
        let exercise = grouped.into_exercise().unwrap();
        assert_eq!(exercise.group_kind(), Some(GroupKind::Circuit));
        assert_eq!(exercise.group_id().map(|g| g.as_str()), Some("g1"));

        let half: ExerciseWire = serde_json::from_str(
            r#"{"id":"e1","exerciseName":"Row","sets":3,"reps":12,"weight":40.0,
                "groupType":"superset"}"#,
        )
        .unwrap();
        assert!(matches!(half.into_exercise(), Err(SyncError::Decoding(_))));
    }

    #[test]
    fn draft_payload_uses_camel_case_and_omits_placeholder_id() {
        let draft = ExerciseDraft {
            name: "Deadlift".into(),
            sets: 3,
            metric: Metric::Reps(5),
            weight: 120.0,
            group: None,
        };
        let wire = ExerciseWire::from_draft(&draft, &SessionId::new("s1"));
        let json = serde_json::to_value(&wire).unwrap();

        assert_eq!(json["exerciseName"], "Deadlift");
        assert_eq!(json["sessionId"], "s1");
        assert_eq!(json["reps"], 5);
        assert!(json.get("id").is_none());
        assert!(json.get("time").is_none());
        assert!(json.get("groupType").is_none());
    }

    #[test]
    fn session_echo_decodes_bare_id_references() {
        let wire: SessionEchoWire = serde_json::from_str(
            r#"{"id":"s1","workoutName":"Push","clientId":"c1",
                "isCompleted":true,"completedDate":"2026-08-01T10:00:00Z",
                "exerciseIds":["e1","e2"]}"#,
        )
        .unwrap();
        let echo = SessionEcho::from(wire);
        assert_eq!(echo.exercise_ids.len(), 2);
        assert!(echo.is_completed);
        assert!(echo.completed_date.is_some());
    }

    #[test]
    fn stray_completed_date_on_incomplete_session_is_dropped() {
        let wire: SessionWire = serde_json::from_str(
            r#"{"id":"s1","workoutName":"Push","clientId":"c1",
                "isCompleted":false,"completedDate":"2026-08-01T10:00:00Z"}"#,
        )
        .unwrap();
        let session = wire.into_session().unwrap();
        assert!(!session.is_completed);
        assert!(session.completed_date.is_none());
    }

    #[test]
    fn session_update_payload_shape() {
        let update = SessionUpdate {
            workout_name: "Pull".into(),
            is_completed: false,
            completed_date: None,
            client_id: ClientId::new("c1"),
            exercise_ids: vec![ExerciseId::new("e1"), ExerciseId::new("e2")],
        };
        let json = serde_json::to_value(SessionUpdateWire::from(&update)).unwrap();

        assert_eq!(json["workoutName"], "Pull");
        assert_eq!(json["clientId"], "c1");
        assert_eq!(json["exerciseIds"], serde_json::json!(["e1", "e2"]));
        // reduced field set: the nested objects are never serialized
        assert!(json.get("exercises").is_none());
    }
}
