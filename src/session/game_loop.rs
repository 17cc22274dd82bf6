//! The shared clock: ticks every connected player and autosaves periodically.

use super::registry::SessionRegistry;
use super::saver::Saver;
use crate::web::protocol::ServerMessage;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// What one pass of the clock did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub tick: u64,
    pub players: usize,
    pub autosave_due: bool,
}

pub struct GameLoop {
    registry: Arc<SessionRegistry>,
    saver: Saver,
    autosave_every: u64,
    tick_count: u64,
}

impl GameLoop {
    pub fn new(registry: Arc<SessionRegistry>, saver: Saver, autosave_every: u64) -> Self {
        Self {
            registry,
            saver,
            autosave_every: autosave_every.max(1),
            tick_count: 0,
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Advances every connected player by one tick and pushes their new
    /// state. Players are locked one at a time, never together.
    pub async fn tick_all(&mut self) -> TickSummary {
        self.tick_count += 1;
        let sessions = self.registry.sessions().await;

        for session in &sessions {
            let view = session.tick().await;
            if !session.send(ServerMessage::GameState { state: view }) {
                debug!(session = session.id(), "client gone before state push");
            }
        }

        TickSummary {
            tick: self.tick_count,
            players: sessions.len(),
            autosave_due: self.tick_count % self.autosave_every == 0,
        }
    }

    /// Runs the clock forever. Autosaves are spawned so a slow disk never
    /// delays the next tick.
    pub async fn run(mut self, period: Duration) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let summary = self.tick_all().await;
            if summary.autosave_due {
                let saver = self.saver.clone();
                tokio::spawn(async move {
                    saver.save_dirty().await;
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::game_state::PlayerRecord;
    use crate::persistence::MemoryStore;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_tick_all_pushes_state_to_each_player() {
        let registry = Arc::new(SessionRegistry::new());
        let saver = Saver::new(Arc::clone(&registry), Arc::new(MemoryStore::new()));
        let mut game_loop = GameLoop::new(Arc::clone(&registry), saver, 15);

        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        registry.attach(PlayerRecord::new("Ana".into(), 0), tx_a).await.unwrap();
        registry.attach(PlayerRecord::new("Bia".into(), 0), tx_b).await.unwrap();

        let summary = game_loop.tick_all().await;
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.players, 2);
        assert!(!summary.autosave_due);

        for rx in [&mut rx_a, &mut rx_b] {
            match rx.try_recv().unwrap() {
                ServerMessage::GameState { state } => {
                    assert!(state.state.route_progress > 0.0);
                }
                other => panic!("unexpected message {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_autosave_due_every_n_ticks() {
        let registry = Arc::new(SessionRegistry::new());
        let saver = Saver::new(Arc::clone(&registry), Arc::new(MemoryStore::new()));
        let mut game_loop = GameLoop::new(registry, saver, 3);

        let due: Vec<bool> = {
            let mut due = Vec::new();
            for _ in 0..6 {
                due.push(game_loop.tick_all().await.autosave_due);
            }
            due
        };
        assert_eq!(due, vec![false, false, true, false, false, true]);
        assert_eq!(game_loop.tick_count(), 6);
    }

    #[tokio::test]
    async fn test_disconnected_client_does_not_stop_the_loop() {
        let registry = Arc::new(SessionRegistry::new());
        let saver = Saver::new(Arc::clone(&registry), Arc::new(MemoryStore::new()));
        let mut game_loop = GameLoop::new(Arc::clone(&registry), saver, 15);

        let (tx, rx) = mpsc::unbounded_channel();
        let session = registry.attach(PlayerRecord::new("Ana".into(), 0), tx).await.unwrap();
        drop(rx);

        game_loop.tick_all().await;
        game_loop.tick_all().await;
        assert!(session.snapshot().await.state.route_progress > 0.0);
    }
}
