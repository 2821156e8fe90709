//! Remote gateway - the network boundary
//!
//! The backend exposes CRUD for clients, sessions, exercises and nutrition
//! plans and returns canonical entities. This module owns the contract
//! (`RemoteGateway` trait plus the fixed status-code -> error mapping); the
//! `http` submodule is the reqwest implementation, `wire` the on-the-wire
//! payload shapes. The sync service only ever talks to the trait, which is
//! also the seam the tests drive with an in-memory fake.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::SyncError;
use crate::model::{
    Client, ClientId, Exercise, ExerciseDraft, ExerciseId, NutritionPlan, Session, SessionId,
};

mod http;
pub(crate) mod wire;

pub use http::HttpGateway;

// ─────────────────────────────────────────────────────────────────────────────
// Session update payload and echo
// ─────────────────────────────────────────────────────────────────────────────

/// Reduced field set sent on session update.
///
/// Updates deliberately carry the exercise-id list instead of the full nested
/// objects. The echo comes back just as shallow, so callers re-attach their
/// local `Exercise` objects afterwards (see `SyncService::update_session`).
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUpdate {
    pub workout_name: String,
    pub is_completed: bool,
    pub completed_date: Option<DateTime<Utc>>,
    pub client_id: ClientId,
    pub exercise_ids: Vec<ExerciseId>,
}

impl SessionUpdate {
    /// Derive the update payload from the local session copy
    pub fn from_session(session: &Session) -> Self {
        Self {
            workout_name: session.workout_name.clone(),
            is_completed: session.is_completed,
            completed_date: session.completed_date,
            client_id: session.client_id.clone(),
            exercise_ids: session.exercise_ids(),
        }
    }
}

/// What the update endpoint echoes back: session metadata plus bare exercise
/// id references. A distinct type from `Session` so the re-attachment step
/// cannot be skipped by accident.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEcho {
    pub id: SessionId,
    pub workout_name: String,
    pub client_id: ClientId,
    pub is_completed: bool,
    pub completed_date: Option<DateTime<Utc>>,
    pub exercise_ids: Vec<ExerciseId>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Gateway contract
// ─────────────────────────────────────────────────────────────────────────────

/// CRUD boundary to the backend, one method per operation the app performs.
///
/// Every call suspends the initiating task; none of them retry. The bearer
/// credential is attached by the implementation - credential lifecycle
/// (issuance, refresh) belongs to a collaborator, not this crate.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn list_clients(&self, owner_id: &str) -> Result<Vec<Client>, SyncError>;
    /// `client.id` is a placeholder; the echo carries the persisted id
    async fn create_client(&self, client: &Client) -> Result<Client, SyncError>;
    async fn update_client(&self, client: &Client) -> Result<Client, SyncError>;
    /// Cascades server-side to the client's sessions (and their exercises)
    async fn delete_client(&self, client_id: &ClientId) -> Result<(), SyncError>;

    async fn list_sessions(&self, client_id: &ClientId) -> Result<Vec<Session>, SyncError>;
    /// Created with an empty exercise list; exercises follow one by one
    async fn create_session(
        &self,
        client_id: &ClientId,
        workout_name: &str,
    ) -> Result<Session, SyncError>;
    async fn update_session(
        &self,
        session_id: &SessionId,
        update: &SessionUpdate,
    ) -> Result<SessionEcho, SyncError>;
    async fn delete_session(&self, session_id: &SessionId) -> Result<(), SyncError>;

    async fn list_exercises(&self, session_id: &SessionId) -> Result<Vec<Exercise>, SyncError>;
    /// The backend assigns implicit order by insertion, so callers that care
    /// about order must await each create before issuing the next
    async fn create_exercise(
        &self,
        session_id: &SessionId,
        draft: &ExerciseDraft,
    ) -> Result<Exercise, SyncError>;
    async fn update_exercise(
        &self,
        session_id: &SessionId,
        exercise: &Exercise,
    ) -> Result<Exercise, SyncError>;
    async fn delete_exercise(&self, exercise_id: &ExerciseId) -> Result<(), SyncError>;

    /// `Ok(None)` when the client has no plan yet
    async fn fetch_nutrition(&self, client_id: &ClientId)
        -> Result<Option<NutritionPlan>, SyncError>;
    async fn create_nutrition(&self, plan: &NutritionPlan) -> Result<NutritionPlan, SyncError>;
    async fn update_nutrition(&self, plan: &NutritionPlan) -> Result<NutritionPlan, SyncError>;
    async fn delete_nutrition(&self, plan_id: &str) -> Result<(), SyncError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Status-code mapping
// ─────────────────────────────────────────────────────────────────────────────

/// Error envelope the backend uses for validation/server errors
#[derive(Debug, serde::Deserialize)]
struct ErrorEnvelope {
    message: String,
}

/// Map a non-2xx response to the failure taxonomy.
///
/// The mapping is fixed: 401 -> `Unauthorized`; 400 with a decodable
/// `{ "message": ... }` envelope -> `Validation`, without one -> generic
/// `Server`; every other status -> `Server` with the status embedded and the
/// envelope message when one is present.
pub(crate) fn failure_from_status(status: u16, body: &[u8]) -> SyncError {
    let envelope_message =
        serde_json::from_slice::<ErrorEnvelope>(body).map(|e| e.message).ok();

    match status {
        401 => SyncError::Unauthorized,
        400 => match envelope_message {
            Some(message) => SyncError::Validation(vec![message]),
            None => SyncError::Server {
                status,
                message: format!("status {status}"),
            },
        },
        _ => SyncError::Server {
            status,
            message: envelope_message.unwrap_or_else(|| format!("status {status}")),
        },
    }
}

/// Decode a 2xx body, mapping serde failures to `Decoding`
pub(crate) fn decode_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, SyncError> {
    serde_json::from_slice(body).map_err(SyncError::decoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_maps_to_unauthorized() {
        assert!(matches!(
            failure_from_status(401, b""),
            SyncError::Unauthorized
        ));
        // even with an envelope present, 401 stays Unauthorized
        assert!(matches!(
            failure_from_status(401, br#"{"message":"token expired"}"#),
            SyncError::Unauthorized
        ));
    }

    #[test]
    fn status_400_with_envelope_maps_to_validation() {
        let err = failure_from_status(400, br#"{"message":"sets must be non-negative"}"#);
        match err {
            SyncError::Validation(messages) => {
                assert_eq!(messages, vec!["sets must be non-negative".to_string()]);
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn status_400_without_envelope_falls_back_to_server() {
        let err = failure_from_status(400, b"<html>bad request</html>");
        match err {
            SyncError::Server { status, .. } => assert_eq!(status, 400),
            other => panic!("expected Server, got {other:?}"),
        }
    }

    #[test]
    fn other_statuses_embed_the_status_code() {
        let err = failure_from_status(503, b"");
        match err {
            SyncError::Server { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "status 503");
            }
            other => panic!("expected Server, got {other:?}"),
        }

        let err = failure_from_status(500, br#"{"message":"db down"}"#);
        match err {
            SyncError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "db down");
            }
            other => panic!("expected Server, got {other:?}"),
        }
    }

    #[test]
    fn undecodable_success_body_maps_to_decoding() {
        let result: Result<Vec<String>, _> = decode_body(b"not json");
        assert!(matches!(result, Err(SyncError::Decoding(_))));
    }

    #[test]
    fn update_payload_carries_the_reduced_field_set() {
        use crate::model::{Exercise, Metric};

        let session = Session {
            id: SessionId::new("s1"),
            workout_name: "Upper body".into(),
            client_id: ClientId::new("c1"),
            exercises: vec![Exercise {
                id: ExerciseId::new("e1"),
                name: "Bench press".into(),
                sets: 3,
                metric: Metric::Reps(8),
                weight: 60.0,
                group: None,
            }],
            is_completed: false,
            completed_date: None,
        };

        let update = SessionUpdate::from_session(&session);
        assert_eq!(update.workout_name, "Upper body");
        assert_eq!(update.exercise_ids, vec![ExerciseId::new("e1")]);
        assert_eq!(update.client_id, ClientId::new("c1"));
    }
}
