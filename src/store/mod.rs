//! Local store - the in-memory authoritative cache of fetched entities
//!
//! One store per process, built at the composition root and handed to
//! whoever needs it (no global singleton). It holds clients -> sessions ->
//! exercises plus nutrition, and is mutated only through its own methods.
//! Sharing is `Arc<Mutex<_>>`: any number of readers, writes serialized by
//! the mutex, and the lock is never held across an await - the async
//! choreography around it lives in [`service::SyncService`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::model::{Client, ClientId, Exercise, ExerciseId, NutritionPlan, Session, SessionId};

pub mod service;

pub use service::SyncService;

/// Everything cached for one client
#[derive(Debug, Clone, Default)]
pub struct ClientRecord {
    pub client: Option<Client>,
    pub sessions: Vec<Session>,
    pub nutrition: Option<NutritionPlan>,
}

/// Shared handle to the store
pub type SharedStore = Arc<Mutex<LocalStore>>;

/// In-memory cache keyed by client id
#[derive(Debug, Default)]
pub struct LocalStore {
    records: HashMap<ClientId, ClientRecord>,
}

impl LocalStore {
    pub fn new_shared() -> SharedStore {
        Arc::new(Mutex::new(Self::default()))
    }

    // ── clients ──────────────────────────────────────────────────────────

    /// Replace the roster while keeping cached sessions/nutrition for
    /// clients that are still present
    pub fn replace_clients(&mut self, clients: Vec<Client>) {
        let mut old = std::mem::take(&mut self.records);
        for client in clients {
            let mut record = old.remove(&client.id).unwrap_or_default();
            record.client = Some(client.clone());
            self.records.insert(client.id, record);
        }
    }

    pub fn upsert_client(&mut self, client: Client) {
        let id = client.id.clone();
        self.records.entry(id).or_default().client = Some(client);
    }

    /// Local cascade mirroring the server-side one: the record goes away
    /// with its sessions and nutrition
    pub fn remove_client(&mut self, client_id: &ClientId) {
        self.records.remove(client_id);
    }

    /// Roster sorted by name for stable display
    pub fn clients(&self) -> Vec<Client> {
        let mut clients: Vec<Client> = self
            .records
            .values()
            .filter_map(|r| r.client.clone())
            .collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        clients
    }

    // ── sessions ─────────────────────────────────────────────────────────

    pub fn replace_sessions(&mut self, client_id: &ClientId, sessions: Vec<Session>) {
        self.records.entry(client_id.clone()).or_default().sessions = sessions;
    }

    pub fn upsert_session(&mut self, client_id: &ClientId, session: Session) {
        let sessions = &mut self.records.entry(client_id.clone()).or_default().sessions;
        match sessions.iter_mut().find(|s| s.id == session.id) {
            Some(existing) => *existing = session,
            None => sessions.push(session),
        }
    }

    pub fn remove_session(&mut self, client_id: &ClientId, session_id: &SessionId) {
        if let Some(record) = self.records.get_mut(client_id) {
            record.sessions.retain(|s| &s.id != session_id);
        }
    }

    pub fn sessions(&self, client_id: &ClientId) -> Vec<Session> {
        self.records
            .get(client_id)
            .map(|r| r.sessions.clone())
            .unwrap_or_default()
    }

    pub fn session(&self, client_id: &ClientId, session_id: &SessionId) -> Option<Session> {
        self.records
            .get(client_id)?
            .sessions
            .iter()
            .find(|s| &s.id == session_id)
            .cloned()
    }

    // ── exercises ────────────────────────────────────────────────────────

    /// Append to the session's order; creation order is load-bearing
    pub fn push_exercise(
        &mut self,
        client_id: &ClientId,
        session_id: &SessionId,
        exercise: Exercise,
    ) {
        if let Some(session) = self.session_mut(client_id, session_id) {
            session.exercises.push(exercise);
        }
    }

    pub fn replace_exercise(
        &mut self,
        client_id: &ClientId,
        session_id: &SessionId,
        exercise: Exercise,
    ) {
        if let Some(session) = self.session_mut(client_id, session_id) {
            if let Some(existing) = session.exercises.iter_mut().find(|e| e.id == exercise.id) {
                *existing = exercise;
            }
        }
    }

    /// Remove one exercise from the owning session's order. Group membership
    /// of the remaining members is untouched; display numbering recomputes
    /// on the next resolver pass.
    pub fn remove_exercise(
        &mut self,
        client_id: &ClientId,
        session_id: &SessionId,
        exercise_id: &ExerciseId,
    ) {
        if let Some(session) = self.session_mut(client_id, session_id) {
            session.exercises.retain(|e| &e.id != exercise_id);
        }
    }

    // ── nutrition ────────────────────────────────────────────────────────

    pub fn set_nutrition(&mut self, client_id: &ClientId, plan: Option<NutritionPlan>) {
        self.records.entry(client_id.clone()).or_default().nutrition = plan;
    }

    pub fn nutrition(&self, client_id: &ClientId) -> Option<NutritionPlan> {
        self.records.get(client_id)?.nutrition.clone()
    }

    fn session_mut(
        &mut self,
        client_id: &ClientId,
        session_id: &SessionId,
    ) -> Option<&mut Session> {
        self.records
            .get_mut(client_id)?
            .sessions
            .iter_mut()
            .find(|s| &s.id == session_id)
    }
}
