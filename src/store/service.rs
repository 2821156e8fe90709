// Sync service - the async choreography between gateway, store and bus
//
// Every mutation follows the same shape: remote call first, local store
// update with the canonical entity on success, refresh event last. There is
// no optimistic insert, no automatic retry, and no rollback of partial
// multi-step operations - a failed call is terminal for that user action and
// the caller decides whether to re-issue.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::error::SyncError;
use crate::events::{RefreshBus, RefreshEvent};
use crate::gateway::{RemoteGateway, SessionUpdate};
use crate::model::{
    Client, ClientId, Exercise, ExerciseDraft, ExerciseId, NutritionPlan, Session, SessionId,
};

use super::{LocalStore, SharedStore};

/// Cloneable coordinator handle
///
/// Clones share the gateway, the store and the bus, so any screen can hold
/// one. All store mutation goes through here; the mutex inside the store is
/// taken briefly and never across an await.
#[derive(Clone)]
pub struct SyncService {
    gateway: Arc<dyn RemoteGateway>,
    store: SharedStore,
    bus: RefreshBus,
    /// In-flight nutrition fetches, abortable per client (view teardown).
    /// Session/exercise mutations are deliberately absent: once issued they
    /// run to completion even if nobody is left to look at the result.
    nutrition_fetches: Arc<Mutex<HashMap<ClientId, JoinHandle<()>>>>,
}

impl SyncService {
    pub fn new(gateway: Arc<dyn RemoteGateway>, store: SharedStore, bus: RefreshBus) -> Self {
        Self {
            gateway,
            store,
            bus,
            nutrition_fetches: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn bus(&self) -> &RefreshBus {
        &self.bus
    }

    /// Read-only view into the cache; same brief-lock discipline as writes
    pub fn store_snapshot<R>(&self, f: impl FnOnce(&LocalStore) -> R) -> R {
        let guard = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run a closure against the store, recovering from a poisoned mutex
    /// (a panicked writer leaves the cache stale, not unusable)
    fn with_store<R>(&self, f: impl FnOnce(&mut LocalStore) -> R) -> R {
        let mut guard = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Clients
    // ─────────────────────────────────────────────────────────────────────

    /// Re-fetch the roster. This is the one defined swallow point: a failed
    /// refresh logs and leaves the prior cache untouched instead of failing
    /// the caller, because the screen can keep rendering stale data.
    pub async fn refresh_roster(&self, owner_id: &str) {
        match self.gateway.list_clients(owner_id).await {
            Ok(clients) => {
                tracing::debug!(count = clients.len(), "roster refreshed");
                self.with_store(|store| store.replace_clients(clients));
            }
            Err(e) => {
                tracing::warn!("roster refresh failed, keeping cached roster: {e}");
            }
        }
    }

    pub async fn create_client(&self, client: Client) -> Result<Client, SyncError> {
        let canonical = self.gateway.create_client(&client).await?;
        self.with_store(|store| store.upsert_client(canonical.clone()));
        self.bus.publish(RefreshEvent::ClientsChanged);
        Ok(canonical)
    }

    pub async fn update_client(&self, client: Client) -> Result<Client, SyncError> {
        let canonical = self.gateway.update_client(&client).await?;
        self.with_store(|store| store.upsert_client(canonical.clone()));
        self.bus.publish(RefreshEvent::ClientsChanged);
        Ok(canonical)
    }

    /// Server-side the delete cascades to sessions and exercises; the local
    /// cascade mirrors it by dropping the whole client record
    pub async fn delete_client(&self, client_id: &ClientId) -> Result<(), SyncError> {
        self.gateway.delete_client(client_id).await?;
        self.with_store(|store| store.remove_client(client_id));
        self.bus.publish(RefreshEvent::ClientsChanged);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Sessions
    // ─────────────────────────────────────────────────────────────────────

    pub async fn refresh_sessions(&self, client_id: &ClientId) -> Result<Vec<Session>, SyncError> {
        let sessions = self.gateway.list_sessions(client_id).await?;
        self.with_store(|store| store.replace_sessions(client_id, sessions.clone()));
        Ok(sessions)
    }

    /// Remote create with an empty exercise list. No optimistic insert: on
    /// failure the store is untouched.
    pub async fn create_session(
        &self,
        client_id: &ClientId,
        workout_name: &str,
    ) -> Result<Session, SyncError> {
        let session = self.gateway.create_session(client_id, workout_name).await?;
        self.with_store(|store| store.upsert_session(client_id, session.clone()));
        self.bus.publish(RefreshEvent::SessionsChanged {
            client_id: client_id.clone(),
        });
        Ok(session)
    }

    /// Create the drafts one at a time, in order. The backend assigns
    /// implicit order by insertion, so the next create is not issued until
    /// the previous one completed - never fan these out concurrently.
    ///
    /// A failure at draft k leaves the session with the k-1 already-persisted
    /// exercises (valid, just shorter than intended) and reports
    /// [`SyncError::PartialFailure`] with both counts so the caller can offer
    /// a retry of the remainder. Nothing is rolled back or auto-resumed.
    pub async fn add_exercises_sequentially(
        &self,
        client_id: &ClientId,
        session_id: &SessionId,
        drafts: Vec<ExerciseDraft>,
    ) -> Result<(), SyncError> {
        let intended = drafts.len();
        let mut completed = 0usize;

        for draft in drafts {
            match self.gateway.create_exercise(session_id, &draft).await {
                Ok(exercise) => {
                    self.with_store(|store| {
                        store.push_exercise(client_id, session_id, exercise)
                    });
                    completed += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        %session_id,
                        completed,
                        intended,
                        "exercise creation stopped partway: {e}"
                    );
                    // the persisted prefix is real data other views should see
                    if completed > 0 {
                        self.bus.publish(RefreshEvent::ExercisesChanged {
                            client_id: client_id.clone(),
                            session_id: session_id.clone(),
                        });
                    }
                    return Err(SyncError::PartialFailure {
                        completed,
                        intended,
                        source: Box::new(e),
                    });
                }
            }
        }

        if completed > 0 {
            self.bus.publish(RefreshEvent::ExercisesChanged {
                client_id: client_id.clone(),
                session_id: session_id.clone(),
            });
        }
        Ok(())
    }

    /// Send the reduced field set and re-attach the local exercise objects
    /// onto the echo.
    ///
    /// The update endpoint returns exercises as bare id references, so the
    /// full objects the caller already holds are re-attached before the
    /// session is stored - otherwise in-memory exercise detail would be
    /// silently lost until the next full fetch.
    pub async fn update_session(
        &self,
        client_id: &ClientId,
        session: Session,
    ) -> Result<Session, SyncError> {
        let update = SessionUpdate::from_session(&session);
        let echo = self.gateway.update_session(&session.id, &update).await?;

        let mut updated = Session {
            id: echo.id,
            workout_name: echo.workout_name,
            client_id: echo.client_id,
            exercises: Vec::new(),
            is_completed: echo.is_completed,
            completed_date: echo.completed_date,
        };
        updated.reattach_exercises(&echo.exercise_ids, session.exercises);

        self.with_store(|store| store.upsert_session(client_id, updated.clone()));
        self.bus.publish(RefreshEvent::SessionsChanged {
            client_id: client_id.clone(),
        });
        Ok(updated)
    }

    /// Flip the completion flag; the timestamp becomes "now" iff the session
    /// is becoming complete. Delegates to [`Self::update_session`].
    pub async fn toggle_completion(
        &self,
        client_id: &ClientId,
        mut session: Session,
    ) -> Result<Session, SyncError> {
        session.toggle_completion(Utc::now());
        self.update_session(client_id, session).await
    }

    pub async fn delete_session(
        &self,
        client_id: &ClientId,
        session_id: &SessionId,
    ) -> Result<(), SyncError> {
        self.gateway.delete_session(session_id).await?;
        self.with_store(|store| store.remove_session(client_id, session_id));
        self.bus.publish(RefreshEvent::SessionsChanged {
            client_id: client_id.clone(),
        });
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Exercises
    // ─────────────────────────────────────────────────────────────────────

    /// Full-replace update of one exercise
    pub async fn update_exercise(
        &self,
        client_id: &ClientId,
        session_id: &SessionId,
        exercise: Exercise,
    ) -> Result<Exercise, SyncError> {
        let canonical = self.gateway.update_exercise(session_id, &exercise).await?;
        self.with_store(|store| store.replace_exercise(client_id, session_id, canonical.clone()));
        self.bus.publish(RefreshEvent::ExercisesChanged {
            client_id: client_id.clone(),
            session_id: session_id.clone(),
        });
        Ok(canonical)
    }

    /// Delete by id and drop it from the owning session's order
    pub async fn delete_exercise(
        &self,
        client_id: &ClientId,
        session_id: &SessionId,
        exercise_id: &ExerciseId,
    ) -> Result<(), SyncError> {
        self.gateway.delete_exercise(exercise_id).await?;
        self.with_store(|store| store.remove_exercise(client_id, session_id, exercise_id));
        self.bus.publish(RefreshEvent::ExercisesChanged {
            client_id: client_id.clone(),
            session_id: session_id.clone(),
        });
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Nutrition
    // ─────────────────────────────────────────────────────────────────────

    /// Kick off a background nutrition fetch for a client-detail view.
    ///
    /// The result lands in the store and is announced on the bus; errors are
    /// logged (stale nutrition stays). A second fetch for the same client
    /// replaces the first. Cancellable via [`Self::cancel_fetch`].
    pub fn fetch_nutrition(&self, client_id: ClientId) {
        let gateway = self.gateway.clone();
        let service = self.clone();
        let task_client_id = client_id.clone();

        let handle = tokio::spawn(async move {
            match gateway.fetch_nutrition(&task_client_id).await {
                Ok(plan) => {
                    service.with_store(|store| store.set_nutrition(&task_client_id, plan));
                    service.bus.publish(RefreshEvent::NutritionChanged {
                        client_id: task_client_id,
                    });
                }
                Err(e) => {
                    tracing::warn!(client_id = %task_client_id, "nutrition fetch failed: {e}");
                }
            }
        });

        let mut fetches = self
            .nutrition_fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = fetches.insert(client_id, handle) {
            previous.abort();
        }
    }

    /// Abort the in-flight nutrition fetch for a client, if any. Called on
    /// view teardown so a stale response never lands after the fact.
    pub fn cancel_fetch(&self, client_id: &ClientId) {
        let handle = self
            .nutrition_fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(client_id);
        if let Some(handle) = handle {
            tracing::debug!(%client_id, "cancelling nutrition fetch");
            handle.abort();
        }
    }

    /// Create or replace the client's plan (placeholder id means create)
    pub async fn save_nutrition(&self, plan: NutritionPlan) -> Result<NutritionPlan, SyncError> {
        let canonical = if plan.id.is_empty() {
            self.gateway.create_nutrition(&plan).await?
        } else {
            self.gateway.update_nutrition(&plan).await?
        };
        let client_id = canonical.client_id.clone();
        self.with_store(|store| store.set_nutrition(&client_id, Some(canonical.clone())));
        self.bus
            .publish(RefreshEvent::NutritionChanged { client_id });
        Ok(canonical)
    }

    pub async fn delete_nutrition(
        &self,
        client_id: &ClientId,
        plan_id: &str,
    ) -> Result<(), SyncError> {
        self.gateway.delete_nutrition(plan_id).await?;
        self.with_store(|store| store.set_nutrition(client_id, None));
        self.bus.publish(RefreshEvent::NutritionChanged {
            client_id: client_id.clone(),
        });
        Ok(())
    }
}
