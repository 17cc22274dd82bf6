//! Connected players and their per-player locks.
//!
//! Each session owns its player's record behind its own mutex: actions on one
//! player are serialized, while different players never wait on each other.

use crate::core::action::Action;
use crate::core::error::GameError;
use crate::core::game_logic::handle_tick;
use crate::core::game_state::PlayerRecord;
use crate::web::protocol::{PlayerView, ServerMessage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

pub type SessionId = u64;

/// Outgoing messages for one connection.
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

pub struct Session {
    id: SessionId,
    player_id: Uuid,
    record: Mutex<PlayerRecord>,
    outbox: Outbox,
    /// Set when the in-memory state differs from the last save.
    dirty: AtomicBool,
}

impl Session {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn player_id(&self) -> Uuid {
        self.player_id
    }

    /// Applies a player action. On rejection the record is left as it was.
    pub async fn apply(&self, action: Action) -> Result<PlayerView, GameError> {
        let mut record = self.record.lock().await;
        let next = action.apply(&record.state)?;
        if next != record.state {
            record.state = next;
            self.mark_dirty();
        }
        Ok(PlayerView::from_record(&record))
    }

    /// Applies one scheduled tick.
    pub async fn tick(&self) -> PlayerView {
        let mut record = self.record.lock().await;
        let next = handle_tick(&record.state);
        if next != record.state {
            record.state = next;
            self.mark_dirty();
        }
        PlayerView::from_record(&record)
    }

    pub async fn view(&self) -> PlayerView {
        PlayerView::from_record(&*self.record.lock().await)
    }

    /// Copy of the current record, for saving.
    pub async fn snapshot(&self) -> PlayerRecord {
        self.record.lock().await.clone()
    }

    /// Queues a message for the client. Returns false once the connection
    /// has gone away.
    pub fn send(&self, message: ServerMessage) -> bool {
        self.outbox.send(message).is_ok()
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Clears the dirty flag, returning whether it was set.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::SeqCst)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }
}

/// All connected sessions, plus the final records of departed players that
/// are not yet safely stored.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
    next_id: AtomicU64,
    pending: Mutex<HashMap<Uuid, PlayerRecord>>,
    player_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session for `record`. Returns `None` if that player is
    /// already connected elsewhere.
    pub async fn attach(&self, record: PlayerRecord, outbox: Outbox) -> Option<Arc<Session>> {
        let mut sessions = self.sessions.write().await;
        if sessions.values().any(|s| s.player_id == record.id) {
            return None;
        }

        // An unsaved record from an earlier visit is newer than the stored one
        let (record, dirty) = match self.pending.lock().await.remove(&record.id) {
            Some(unsaved) => (unsaved, true),
            None => (record, false),
        };

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let session = Arc::new(Session {
            id,
            player_id: record.id,
            record: Mutex::new(record),
            outbox,
            dirty: AtomicBool::new(dirty),
        });
        sessions.insert(id, Arc::clone(&session));
        Some(session)
    }

    /// Removes a session and parks its final record as pending until it is
    /// stored. A player who returns before then resumes from that record.
    pub async fn depart(&self, id: SessionId) -> Option<PlayerRecord> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.remove(&id)?;
        let record = session.snapshot().await;
        self.pending.lock().await.insert(record.id, record.clone());
        Some(record)
    }

    /// Serializes store access for one player. Every save, and the load that
    /// precedes an attach, happens under this lock.
    pub async fn lock_player(&self, player_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(self.player_locks.lock().await.entry(player_id).or_default());
        lock.lock_owned().await
    }

    pub async fn get(&self, id: SessionId) -> Option<Arc<Session>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Snapshot of the connected sessions, ordered by id.
    pub async fn sessions(&self) -> Vec<Arc<Session>> {
        let mut sessions: Vec<Arc<Session>> =
            self.sessions.read().await.values().cloned().collect();
        sessions.sort_by_key(|s| s.id);
        sessions
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn pending_record(&self, player_id: Uuid) -> Option<PlayerRecord> {
        self.pending.lock().await.get(&player_id).cloned()
    }

    /// Drops a pending record once `stored` has been written, unless a newer
    /// record replaced it meanwhile.
    pub async fn settle_pending(&self, stored: &PlayerRecord) {
        let mut pending = self.pending.lock().await;
        if pending.get(&stored.id) == Some(stored) {
            pending.remove(&stored.id);
        }
    }

    pub async fn pending_players(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.pending.lock().await.keys().copied().collect();
        ids.sort();
        ids
    }

    pub async fn pending_len(&self) -> usize {
        self.pending.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tracks::Track;

    fn outbox() -> (Outbox, mpsc::UnboundedReceiver<ServerMessage>) {
        mpsc::unbounded_channel()
    }

    #[tokio::test]
    async fn test_attach_rejects_second_session_for_same_player() {
        let registry = SessionRegistry::new();
        let record = PlayerRecord::new("Ana".into(), 0);
        let (tx, _rx) = outbox();

        let first = registry.attach(record.clone(), tx.clone()).await;
        assert!(first.is_some());
        assert!(registry.attach(record, tx).await.is_none());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_depart_removes_session_and_parks_record() {
        let registry = SessionRegistry::new();
        let (tx, _rx) = outbox();
        let session = registry
            .attach(PlayerRecord::new("Ana".into(), 0), tx)
            .await
            .unwrap();
        session.apply(Action::Click).await.unwrap();

        assert!(registry.get(session.id()).await.is_some());
        let parked = registry.depart(session.id()).await.unwrap();
        assert_eq!(parked.state.currency, 1);
        assert!(registry.get(session.id()).await.is_none());
        assert!(registry.is_empty().await);
        assert_eq!(registry.pending_record(parked.id).await, Some(parked));
        assert!(registry.depart(session.id()).await.is_none());
    }

    #[tokio::test]
    async fn test_settle_keeps_newer_pending_record() {
        let registry = SessionRegistry::new();
        let (tx, _rx) = outbox();
        let session = registry
            .attach(PlayerRecord::new("Ana".into(), 0), tx)
            .await
            .unwrap();
        let parked = registry.depart(session.id()).await.unwrap();

        let mut stale = parked.clone();
        stale.state.currency = 99;
        registry.settle_pending(&stale).await;
        assert_eq!(registry.pending_players().await, vec![parked.id]);

        registry.settle_pending(&parked).await;
        assert_eq!(registry.pending_len().await, 0);
    }

    #[tokio::test]
    async fn test_apply_marks_dirty_only_on_change() {
        let registry = SessionRegistry::new();
        let (tx, _rx) = outbox();
        let session = registry
            .attach(PlayerRecord::new("Ana".into(), 0), tx)
            .await
            .unwrap();

        let err = session.apply(Action::Upgrade(Track::Probe)).await.unwrap_err();
        assert!(matches!(err, GameError::InsufficientFunds { .. }));
        assert!(!session.is_dirty());

        let view = session.apply(Action::Click).await.unwrap();
        assert_eq!(view.state.currency, 1);
        assert!(session.take_dirty());
        assert!(!session.is_dirty());
    }

    #[tokio::test]
    async fn test_rejected_action_leaves_record_untouched() {
        let registry = SessionRegistry::new();
        let (tx, _rx) = outbox();
        let mut record = PlayerRecord::new("Ana".into(), 0);
        record.state.currency = 19;
        let session = registry.attach(record.clone(), tx).await.unwrap();

        assert!(session.apply(Action::Upgrade(Track::Collection)).await.is_err());
        assert_eq!(session.snapshot().await, record);
    }

    #[tokio::test]
    async fn test_returning_player_resumes_from_unsaved_record() {
        let registry = SessionRegistry::new();
        let stored = PlayerRecord::new("Ana".into(), 0);
        let (tx, _rx) = outbox();
        let first = registry.attach(stored.clone(), tx).await.unwrap();
        for _ in 0..10 {
            first.apply(Action::Click).await.unwrap();
        }
        registry.depart(first.id()).await.unwrap();
        assert_eq!(registry.pending_len().await, 1);

        // The stored copy is stale until the departure save lands
        let (tx, _rx) = outbox();
        let session = registry.attach(stored, tx).await.unwrap();
        assert_eq!(registry.pending_len().await, 0);
        assert_eq!(session.snapshot().await.state.currency, 10);
        assert!(session.is_dirty());
    }

    #[tokio::test]
    async fn test_player_lock_is_exclusive_per_player() {
        let registry = SessionRegistry::new();
        let ana = Uuid::new_v4();
        let bia = Uuid::new_v4();

        let guard = registry.lock_player(ana).await;
        // Another player is never blocked
        drop(registry.lock_player(bia).await);
        let waiting = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            registry.lock_player(ana),
        )
        .await;
        assert!(waiting.is_err());

        drop(guard);
        drop(registry.lock_player(ana).await);
    }

    #[tokio::test]
    async fn test_send_fails_after_receiver_dropped() {
        let registry = SessionRegistry::new();
        let (tx, rx) = outbox();
        let session = registry
            .attach(PlayerRecord::new("Ana".into(), 0), tx)
            .await
            .unwrap();

        assert!(session.send(ServerMessage::error("hi")));
        drop(rx);
        assert!(!session.send(ServerMessage::error("hi")));
    }
}
