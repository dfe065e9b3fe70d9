//! In-memory try-on sessions.
//!
//! A session holds one user's selection, the submission phase and the last
//! batch results. Nothing is persisted: dropping a session drops its assets,
//! which deletes their spooled files.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tryon_core::error::{CoreError, TryOnError};
use tryon_core::orchestrator::GeneratedImage;
use tryon_core::selection::{SelectionAction, SelectionState};
use tryon_core::submission::{Submission, SubmissionTicket};
use uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// State of one try-on session.
#[derive(Debug)]
pub struct Session {
    pub selection: SelectionState,
    pub submission: Submission,
    /// Results of the last successful batch, in scene order.
    pub results: Vec<GeneratedImage>,
    /// User-facing message of the last failed batch.
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub last_active_at: Timestamp,
}

impl Session {
    fn new() -> Self {
        let now = chrono::Utc::now();
        Self {
            selection: SelectionState::default(),
            submission: Submission::default(),
            results: Vec::new(),
            error: None,
            created_at: now,
            last_active_at: now,
        }
    }

    /// Run the selection reducer, rejecting edits the phase does not allow.
    pub fn apply(&mut self, action: SelectionAction) -> Result<(), CoreError> {
        self.submission.ensure_editable()?;
        self.selection = std::mem::take(&mut self.selection).apply(action);
        Ok(())
    }

    /// Back to idle with an empty selection, whatever the current phase.
    pub fn reset(&mut self) {
        self.selection = std::mem::take(&mut self.selection).apply(SelectionAction::Reset);
        self.submission.reset();
        self.results.clear();
        self.error = None;
    }
}

/// Manages all live sessions.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application. The lock is only held for short,
/// non-blocking updates, never across a generation batch.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(id: Uuid) -> CoreError {
    CoreError::NotFound {
        entity: "Session",
        id: id.to_string(),
    }
}

impl SessionStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Open a fresh session and return its ID.
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(id, Session::new());
        id
    }

    /// Drop a session and everything it holds.
    pub async fn remove(&self, id: Uuid) -> Result<(), CoreError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    /// Read a session without marking it active.
    pub async fn read<R>(&self, id: Uuid, f: impl FnOnce(&Session) -> R) -> Result<R, CoreError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id).ok_or_else(|| not_found(id))?;
        Ok(f(session))
    }

    /// Mutate a session and mark it active.
    pub async fn update<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> Result<R, CoreError>,
    ) -> Result<R, CoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        session.last_active_at = chrono::Utc::now();
        f(session)
    }

    /// Store the outcome of a batch started with `ticket`.
    ///
    /// Outcomes of batches orphaned by a reset, or whose session is gone,
    /// are discarded.
    pub async fn record_outcome(
        &self,
        id: Uuid,
        ticket: SubmissionTicket,
        outcome: &Result<Vec<GeneratedImage>, TryOnError>,
    ) {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(&id) else {
            tracing::info!(session_id = %id, "Session gone before batch finished; result discarded");
            return;
        };

        if !session.submission.complete(ticket, outcome.is_ok()) {
            tracing::info!(session_id = %id, "Stale batch result discarded");
            return;
        }

        session.last_active_at = chrono::Utc::now();
        match outcome {
            Ok(images) => {
                session.results = images.clone();
                session.error = None;
            }
            Err(e) => {
                session.results.clear();
                session.error = Some(e.user_message().to_string());
            }
        }
    }

    /// Remove sessions idle for longer than `max_idle`. Returns how many.
    pub async fn expire_idle(&self, max_idle: chrono::Duration) -> usize {
        let cutoff = chrono::Utc::now() - max_idle;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.last_active_at >= cutoff);
        before - sessions.len()
    }

    /// Number of live sessions.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop every session (used at shutdown to release spooled files).
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use tryon_core::asset::{Slot, UploadedAsset};
    use tryon_core::data_uri::DataUri;
    use tryon_core::scene::Scene;
    use tryon_core::submission::SubmissionPhase;

    use super::*;

    fn asset() -> Arc<UploadedAsset> {
        Arc::new(UploadedAsset::in_memory("image/png", vec![1]))
    }

    fn images() -> Vec<GeneratedImage> {
        Scene::ALL
            .into_iter()
            .map(|scene| GeneratedImage {
                scene,
                image: DataUri::new("image/png", "AAAA"),
            })
            .collect()
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let store = SessionStore::new();
        let result = store.read(Uuid::new_v4(), |_| ()).await;
        assert_matches!(result, Err(CoreError::NotFound { entity: "Session", .. }));
        assert!(store.remove(Uuid::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn edits_are_rejected_while_submitting() {
        let store = SessionStore::new();
        let id = store.create().await;

        store
            .update(id, |s| {
                s.apply(SelectionAction::Set(Slot::Model, asset()))?;
                s.submission.begin()?;
                Ok(())
            })
            .await
            .unwrap();

        let result = store
            .update(id, |s| s.apply(SelectionAction::Clear(Slot::Model)))
            .await;
        assert_matches!(result, Err(CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn outcome_is_recorded_for_current_ticket() {
        let store = SessionStore::new();
        let id = store.create().await;
        let ticket = store.update(id, |s| s.submission.begin()).await.unwrap();

        store.record_outcome(id, ticket, &Ok(images())).await;

        let (phase, count) = store
            .read(id, |s| (s.submission.phase(), s.results.len()))
            .await
            .unwrap();
        assert_eq!(phase, SubmissionPhase::Succeeded);
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn failure_stores_user_message_only() {
        let store = SessionStore::new();
        let id = store.create().await;
        let ticket = store.update(id, |s| s.submission.begin()).await.unwrap();

        let outcome = Err(TryOnError::GenerationCall("socket hang up".into()));
        store.record_outcome(id, ticket, &outcome).await;

        let error = store.read(id, |s| s.error.clone()).await.unwrap().unwrap();
        assert!(!error.contains("socket"));
        assert_eq!(error, tryon_core::error::GENERATION_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn reset_orphans_running_batch() {
        let store = SessionStore::new();
        let id = store.create().await;
        let ticket = store.update(id, |s| s.submission.begin()).await.unwrap();

        store
            .update(id, |s| {
                s.reset();
                Ok(())
            })
            .await
            .unwrap();
        store.record_outcome(id, ticket, &Ok(images())).await;

        let (phase, count) = store
            .read(id, |s| (s.submission.phase(), s.results.len()))
            .await
            .unwrap();
        assert_eq!(phase, SubmissionPhase::Idle);
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn expire_idle_drops_old_sessions() {
        let store = SessionStore::new();
        let stale = store.create().await;
        let fresh = store.create().await;

        store
            .update(stale, |s| {
                s.last_active_at = chrono::Utc::now() - chrono::Duration::hours(2);
                Ok(())
            })
            .await
            .unwrap();

        let removed = store.expire_idle(chrono::Duration::hours(1)).await;
        assert_eq!(removed, 1);
        assert!(store.read(fresh, |_| ()).await.is_ok());
        assert!(store.read(stale, |_| ()).await.is_err());
    }
}
