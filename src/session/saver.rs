//! Moves player records to the store without stalling gameplay.
//!
//! Store calls run on tokio's blocking pool, one player at a time under that
//! player's lock, so saves of one player land in the order they were taken.
//! A failed save never touches the in-memory state: connected players are
//! marked dirty again and departed players stay pending, so the next
//! autosave retries them.

use super::registry::{Session, SessionRegistry};
use crate::core::game_state::PlayerRecord;
use crate::persistence::{PlayerStore, StoreError};
use chrono::Utc;
use std::ops::AddAssign;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub saved: usize,
    pub failed: usize,
}

impl SaveReport {
    const SAVED: Self = Self { saved: 1, failed: 0 };
    const FAILED: Self = Self { saved: 0, failed: 1 };
}

impl AddAssign for SaveReport {
    fn add_assign(&mut self, other: Self) {
        self.saved += other.saved;
        self.failed += other.failed;
    }
}

#[derive(Clone)]
pub struct Saver {
    registry: Arc<SessionRegistry>,
    store: Arc<dyn PlayerStore>,
}

impl Saver {
    pub fn new(registry: Arc<SessionRegistry>, store: Arc<dyn PlayerStore>) -> Self {
        Self { registry, store }
    }

    /// Stamps and writes one record on the blocking pool.
    async fn write(&self, mut record: PlayerRecord) -> Result<(), StoreError> {
        record.last_save_time = Utc::now().timestamp();
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.save(&record))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }

    /// Saves a connected session. With `only_if_dirty` a session that some
    /// other save already caught up is skipped.
    async fn save_connected(&self, session: &Session, only_if_dirty: bool) -> SaveReport {
        let _guard = self.registry.lock_player(session.player_id()).await;

        // Once departed, the pending record is the one to store
        if self.registry.get(session.id()).await.is_none() {
            return SaveReport::default();
        }
        if !session.take_dirty() && only_if_dirty {
            return SaveReport::default();
        }

        let record = session.snapshot().await;
        match self.write(record).await {
            Ok(()) => SaveReport::SAVED,
            Err(e) => {
                warn!(player = %session.player_id(), error = %e, "save failed, will retry");
                session.mark_dirty();
                SaveReport::FAILED
            }
        }
    }

    /// Saves every dirty session plus any departed player still pending.
    pub async fn save_dirty(&self) -> SaveReport {
        let departed = self.registry.pending_players().await;
        let dirty: Vec<Arc<Session>> = self
            .registry
            .sessions()
            .await
            .into_iter()
            .filter(|s| s.is_dirty())
            .collect();

        if departed.is_empty() && dirty.is_empty() {
            return SaveReport::default();
        }

        info!(players = departed.len() + dirty.len(), "autosave started");
        let mut report = SaveReport::default();
        for player_id in departed {
            report += self.save_departed(player_id).await;
        }
        for session in &dirty {
            report += self.save_connected(session, true).await;
        }

        if report.failed == 0 {
            info!(saved = report.saved, "autosave complete");
        } else {
            warn!(saved = report.saved, failed = report.failed, "autosave incomplete");
        }
        report
    }

    /// Saves one session now, regardless of its dirty flag.
    pub async fn save_session(&self, session: &Session) -> SaveReport {
        debug!(player = %session.player_id(), "saving after action");
        self.save_connected(session, false).await
    }

    /// Fire-and-forget variant of [`Saver::save_session`].
    pub fn spawn_save_session(&self, session: Arc<Session>) {
        let saver = self.clone();
        tokio::spawn(async move {
            saver.save_session(&session).await;
        });
    }

    /// Stores the pending record of a departed player. Nothing is written if
    /// the player came back and took the record first. On failure the record
    /// stays pending for the next autosave.
    pub async fn save_departed(&self, player_id: Uuid) -> SaveReport {
        let _guard = self.registry.lock_player(player_id).await;
        let Some(record) = self.registry.pending_record(player_id).await else {
            return SaveReport::default();
        };

        match self.write(record.clone()).await {
            Ok(()) => {
                self.registry.settle_pending(&record).await;
                SaveReport::SAVED
            }
            Err(e) => {
                warn!(player = %record.id, nickname = %record.nickname, error = %e, "save failed, will retry");
                SaveReport::FAILED
            }
        }
    }

    /// Saves every connected session and pending record. Used at shutdown.
    pub async fn save_all(&self) -> SaveReport {
        for session in self.registry.sessions().await {
            session.mark_dirty();
        }
        self.save_dirty().await
    }
}
