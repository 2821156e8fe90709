// HTTP implementation of the remote gateway
//
// One reqwest client, built once with timeout and connection pooling, shared
// by every call. The bearer credential is attached here on every request;
// where it comes from (keychain, login flow) is the caller's concern.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::SyncError;
use crate::model::{
    Client, ClientId, Exercise, ExerciseDraft, ExerciseId, NutritionPlan, Session, SessionId,
};

use super::wire::{
    ClientWire, ExerciseWire, NutritionWire, SessionEchoWire, SessionUpdateWire, SessionWire,
};
use super::{decode_body, failure_from_status, RemoteGateway, SessionEcho, SessionUpdate};

/// Request timeout. Mutations are never cancelled mid-flight by this crate,
/// but a hung connection still has to fail eventually.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Gateway backed by the real backend over HTTPS
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(4)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token: bearer_token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode the 2xx body; non-2xx goes through the
    /// fixed status mapping
    async fn execute<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, SyncError> {
        let response = builder.bearer_auth(&self.bearer_token).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            decode_body(&body)
        } else {
            Err(failure_from_status(status.as_u16(), &body))
        }
    }

    /// Send a request where success carries no body worth decoding (deletes)
    async fn execute_unit(&self, builder: reqwest::RequestBuilder) -> Result<(), SyncError> {
        let response = builder.bearer_auth(&self.bearer_token).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            let body = response.bytes().await?;
            Err(failure_from_status(status.as_u16(), &body))
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, SyncError> {
        self.execute(self.client.get(self.url(path)).query(query)).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, SyncError> {
        self.execute(self.client.post(self.url(path)).json(body)).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, SyncError> {
        self.execute(self.client.put(self.url(path)).json(body)).await
    }

    async fn delete(&self, path: &str) -> Result<(), SyncError> {
        self.execute_unit(self.client.delete(self.url(path))).await
    }
}

#[async_trait::async_trait]
impl RemoteGateway for HttpGateway {
    async fn list_clients(&self, owner_id: &str) -> Result<Vec<Client>, SyncError> {
        let wires: Vec<ClientWire> = self.get("/clients", &[("ownerId", owner_id)]).await?;
        Ok(wires.into_iter().map(Client::from).collect())
    }

    async fn create_client(&self, client: &Client) -> Result<Client, SyncError> {
        tracing::debug!(name = %client.name, "creating client");
        let wire: ClientWire = self.post("/clients", &ClientWire::from(client)).await?;
        Ok(Client::from(wire))
    }

    async fn update_client(&self, client: &Client) -> Result<Client, SyncError> {
        let path = format!("/clients/{}", client.id);
        let wire: ClientWire = self.put(&path, &ClientWire::from(client)).await?;
        Ok(Client::from(wire))
    }

    async fn delete_client(&self, client_id: &ClientId) -> Result<(), SyncError> {
        tracing::debug!(%client_id, "deleting client (sessions cascade server-side)");
        self.delete(&format!("/clients/{client_id}")).await
    }

    async fn list_sessions(&self, client_id: &ClientId) -> Result<Vec<Session>, SyncError> {
        let wires: Vec<SessionWire> = self
            .get("/sessions", &[("clientId", client_id.as_str())])
            .await?;
        wires.into_iter().map(SessionWire::into_session).collect()
    }

    async fn create_session(
        &self,
        client_id: &ClientId,
        workout_name: &str,
    ) -> Result<Session, SyncError> {
        tracing::debug!(%client_id, workout_name, "creating session");
        let wire: SessionWire = self
            .post("/sessions", &SessionWire::create(client_id, workout_name))
            .await?;
        wire.into_session()
    }

    async fn update_session(
        &self,
        session_id: &SessionId,
        update: &SessionUpdate,
    ) -> Result<SessionEcho, SyncError> {
        let path = format!("/sessions/{session_id}");
        let wire: SessionEchoWire = self.put(&path, &SessionUpdateWire::from(update)).await?;
        Ok(SessionEcho::from(wire))
    }

    async fn delete_session(&self, session_id: &SessionId) -> Result<(), SyncError> {
        tracing::debug!(%session_id, "deleting session (exercises cascade server-side)");
        self.delete(&format!("/sessions/{session_id}")).await
    }

    async fn list_exercises(&self, session_id: &SessionId) -> Result<Vec<Exercise>, SyncError> {
        let wires: Vec<ExerciseWire> = self
            .get("/exercises", &[("sessionId", session_id.as_str())])
            .await?;
        wires.into_iter().map(ExerciseWire::into_exercise).collect()
    }

    async fn create_exercise(
        &self,
        session_id: &SessionId,
        draft: &ExerciseDraft,
    ) -> Result<Exercise, SyncError> {
        let wire: ExerciseWire = self
            .post("/exercises", &ExerciseWire::from_draft(draft, session_id))
            .await?;
        wire.into_exercise()
    }

    async fn update_exercise(
        &self,
        session_id: &SessionId,
        exercise: &Exercise,
    ) -> Result<Exercise, SyncError> {
        let path = format!("/exercises/{}", exercise.id);
        let wire: ExerciseWire = self
            .put(&path, &ExerciseWire::from_exercise(exercise, session_id))
            .await?;
        wire.into_exercise()
    }

    async fn delete_exercise(&self, exercise_id: &ExerciseId) -> Result<(), SyncError> {
        self.delete(&format!("/exercises/{exercise_id}")).await
    }

    async fn fetch_nutrition(
        &self,
        client_id: &ClientId,
    ) -> Result<Option<NutritionPlan>, SyncError> {
        // No plan yet is a normal state, signalled by 404, not an error
        let builder = self
            .client
            .get(self.url("/nutrition"))
            .query(&[("clientId", client_id.as_str())]);
        let response = builder.bearer_auth(&self.bearer_token).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        match status {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => {
                let wire: NutritionWire = decode_body(&body)?;
                Ok(Some(NutritionPlan::from(wire)))
            }
            s => Err(failure_from_status(s.as_u16(), &body)),
        }
    }

    async fn create_nutrition(&self, plan: &NutritionPlan) -> Result<NutritionPlan, SyncError> {
        let wire: NutritionWire = self.post("/nutrition", &NutritionWire::from(plan)).await?;
        Ok(NutritionPlan::from(wire))
    }

    async fn update_nutrition(&self, plan: &NutritionPlan) -> Result<NutritionPlan, SyncError> {
        let path = format!("/nutrition/{}", plan.id);
        let wire: NutritionWire = self.put(&path, &NutritionWire::from(plan)).await?;
        Ok(NutritionPlan::from(wire))
    }

    async fn delete_nutrition(&self, plan_id: &str) -> Result<(), SyncError> {
        self.delete(&format!("/nutrition/{plan_id}")).await
    }
}
