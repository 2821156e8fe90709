// Domain model - clients, sessions, exercises, nutrition
//
// These are the in-memory entities held by the local store. Wire-format
// conversion (camelCase field names, nullable reps/time pairs) lives in
// gateway::wire; everything here enforces the model invariants structurally:
// - an exercise measures reps XOR time (tagged variant, not two options)
// - group id and group kind are present together or not at all
// - a session's completion date exists iff the completion flag is set

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Identifiers
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! opaque_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Empty sentinel used before the first successful remote create
            pub fn placeholder() -> Self {
                Self(String::new())
            }

            pub fn is_placeholder(&self) -> bool {
                self.0.is_empty()
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

opaque_id!(
    /// Opaque client identifier assigned by the backend
    ClientId
);
opaque_id!(
    /// Opaque session identifier assigned by the backend
    SessionId
);
opaque_id!(
    /// Opaque exercise identifier assigned by the backend
    ExerciseId
);
opaque_id!(
    /// Opaque group identifier shared by the members of one superset/circuit
    GroupId
);

// ─────────────────────────────────────────────────────────────────────────────
// Exercise
// ─────────────────────────────────────────────────────────────────────────────

/// How an exercise is measured: exactly one of the two is meaningful
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    /// Repetition count per set
    Reps(u32),
    /// Duration in seconds per set
    Time(u32),
}

/// Kind of exercise group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Fixed pair of exercises performed back to back
    Superset,
    /// Run of exercises performed as a unit; grows incrementally
    Circuit,
}

/// Group membership: id and kind travel together by construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub kind: GroupKind,
    pub id: GroupId,
}

/// The atomic unit of a workout
///
/// Created locally with a placeholder id; becomes canonical once the remote
/// gateway returns a persisted id. Updates are full-replace, never patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    pub name: String,
    pub sets: u32,
    pub metric: Metric,
    pub weight: f64,
    /// `None` for a standalone exercise
    pub group: Option<Group>,
}

impl Exercise {
    /// Group id, if any - the key the grouping resolver scans on
    pub fn group_id(&self) -> Option<&GroupId> {
        self.group.as_ref().map(|g| &g.id)
    }

    pub fn group_kind(&self) -> Option<GroupKind> {
        self.group.as_ref().map(|g| g.kind)
    }
}

/// A not-yet-persisted exercise: everything but the server-assigned id
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseDraft {
    pub name: String,
    pub sets: u32,
    pub metric: Metric,
    pub weight: f64,
    pub group: Option<Group>,
}

impl ExerciseDraft {
    /// Promote to a canonical exercise with the id the backend assigned
    pub fn into_exercise(self, id: ExerciseId) -> Exercise {
        Exercise {
            id,
            name: self.name,
            sets: self.sets,
            metric: self.metric,
            weight: self.weight,
            group: self.group,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// An ordered collection of exercises plus workout metadata
///
/// Exercise order is load-bearing: it determines display numbering and group
/// adjacency, and must match the order the server reconstructs from creation
/// order. Nothing in this crate re-sorts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub workout_name: String,
    pub client_id: ClientId,
    pub exercises: Vec<Exercise>,
    pub is_completed: bool,
    /// Present iff `is_completed` is true
    pub completed_date: Option<DateTime<Utc>>,
}

impl Session {
    /// Flip the completion flag, keeping the timestamp invariant intact
    pub fn toggle_completion(&mut self, now: DateTime<Utc>) {
        self.is_completed = !self.is_completed;
        self.completed_date = self.is_completed.then_some(now);
    }

    /// Re-attach locally held exercise objects after a session update.
    ///
    /// The update endpoint echoes exercises as bare id references, so the
    /// full objects the client already holds must be re-attached or the
    /// in-memory exercise detail is silently lost. `echoed_ids` is the order
    /// the server confirmed; any id we have no local object for is dropped
    /// (we could not render it anyway until the next full fetch).
    pub fn reattach_exercises(&mut self, echoed_ids: &[ExerciseId], local: Vec<Exercise>) {
        let mut pool: Vec<Option<Exercise>> = local.into_iter().map(Some).collect();
        self.exercises = echoed_ids
            .iter()
            .filter_map(|id| {
                pool.iter_mut()
                    .find(|slot| slot.as_ref().is_some_and(|e| &e.id == id))
                    .and_then(Option::take)
            })
            .collect();
    }

    /// Ids of the resident exercises, in session order
    pub fn exercise_ids(&self) -> Vec<ExerciseId> {
        self.exercises.iter().map(|e| e.id.clone()).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// A coached client - owns sessions and at most one nutrition plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub age: u32,
    pub height: f64,
    pub weight: f64,
    pub medical_history: String,
    pub goals: String,
    /// Opaque reference into the image collaborator (upload/storage is
    /// outside this core)
    pub image_ref: Option<String>,
    pub owner_id: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Nutrition
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    pub name: String,
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub meal_name: String,
    pub items: Vec<MealItem>,
}

/// Zero-or-one per client; updates replace the meal list wholesale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionPlan {
    pub id: String,
    pub client_id: ClientId,
    pub meals: Vec<Meal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(id: &str) -> Exercise {
        Exercise {
            id: ExerciseId::new(id),
            name: format!("ex-{id}"),
            sets: 3,
            metric: Metric::Reps(10),
            weight: 20.0,
            group: None,
        }
    }

    #[test]
    fn toggle_completion_sets_and_clears_timestamp() {
        let mut session = Session {
            id: SessionId::new("s1"),
            workout_name: "Push day".into(),
            client_id: ClientId::new("c1"),
            exercises: vec![],
            is_completed: false,
            completed_date: None,
        };

        let now = Utc::now();
        session.toggle_completion(now);
        assert!(session.is_completed);
        assert_eq!(session.completed_date, Some(now));

        session.toggle_completion(Utc::now());
        assert!(!session.is_completed);
        assert_eq!(session.completed_date, None);
    }

    #[test]
    fn reattach_restores_full_objects_in_echo_order() {
        let mut session = Session {
            id: SessionId::new("s1"),
            workout_name: "Legs".into(),
            client_id: ClientId::new("c1"),
            exercises: vec![],
            is_completed: false,
            completed_date: None,
        };

        let local = vec![exercise("a"), exercise("b"), exercise("c")];
        let echoed = vec![
            ExerciseId::new("a"),
            ExerciseId::new("b"),
            ExerciseId::new("c"),
        ];

        session.reattach_exercises(&echoed, local.clone());
        assert_eq!(session.exercises, local);
    }

    #[test]
    fn reattach_drops_ids_with_no_local_object() {
        let mut session = Session {
            id: SessionId::new("s1"),
            workout_name: "Pull".into(),
            client_id: ClientId::new("c1"),
            exercises: vec![],
            is_completed: false,
            completed_date: None,
        };

        let local = vec![exercise("a")];
        let echoed = vec![ExerciseId::new("a"), ExerciseId::new("ghost")];

        session.reattach_exercises(&echoed, local);
        assert_eq!(session.exercises.len(), 1);
        assert_eq!(session.exercises[0].id.as_str(), "a");
    }

    #[test]
    fn placeholder_id_is_recognized() {
        assert!(ExerciseId::placeholder().is_placeholder());
        assert!(!ExerciseId::new("e1").is_placeholder());
    }
}
