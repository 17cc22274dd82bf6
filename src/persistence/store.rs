use super::error::StoreError;
use super::save_file;
use super::MAX_NICKNAME_LEN;
use crate::core::game_state::PlayerRecord;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

/// Durable storage for player records.
///
/// Calls block on I/O; async callers run them on the blocking pool.
pub trait PlayerStore: Send + Sync {
    /// Creates and persists a new player with default state.
    fn create(&self, nickname: &str) -> Result<PlayerRecord, StoreError>;

    /// Looks up the player owning `token`.
    fn find_by_token(&self, token: &str) -> Result<Option<PlayerRecord>, StoreError>;

    /// Writes `record`, replacing any previous save of the same player.
    fn save(&self, record: &PlayerRecord) -> Result<(), StoreError>;
}

fn validated_nickname(nickname: &str) -> Result<String, StoreError> {
    let trimmed = nickname.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_NICKNAME_LEN {
        return Err(StoreError::InvalidNickname);
    }
    Ok(trimmed.to_string())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the lock cannot leave these maps half-written
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

const INDEX_FILE: &str = "tokens.json";
const PLAYERS_DIR: &str = "players";

/// Stores one checksummed file per player plus a JSON token index.
///
/// Layout under the root directory:
/// - `tokens.json` maps login tokens to player ids
/// - `players/<id>.dat` holds each player's save
pub struct FileStore {
    root: PathBuf,
    index: Mutex<BTreeMap<String, Uuid>>,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(root.join(PLAYERS_DIR))?;

        let index_path = root.join(INDEX_FILE);
        let index = match fs::read_to_string(&index_path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            root,
            index: Mutex::new(index),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn player_path(&self, id: Uuid) -> PathBuf {
        self.root.join(PLAYERS_DIR).join(format!("{id}.dat"))
    }

    fn load(&self, id: Uuid) -> Result<PlayerRecord, StoreError> {
        let bytes = fs::read(self.player_path(id))?;
        save_file::decode(&bytes)
    }

    fn write_index(&self, index: &BTreeMap<String, Uuid>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(index)?;
        write_atomically(&self.root.join(INDEX_FILE), json.as_bytes())
    }
}

/// Writes through a temp file and rename so a crash never leaves a torn save.
/// Each write gets its own temp file, so concurrent writers never collide.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
    let result = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    Ok(result?)
}

impl PlayerStore for FileStore {
    fn create(&self, nickname: &str) -> Result<PlayerRecord, StoreError> {
        let nickname = validated_nickname(nickname)?;
        let record = PlayerRecord::new(nickname, Utc::now().timestamp());
        self.save(&record)?;

        let mut index = lock(&self.index);
        index.insert(record.token.clone(), record.id);
        if let Err(e) = self.write_index(&index) {
            index.remove(&record.token);
            return Err(e);
        }
        Ok(record)
    }

    fn find_by_token(&self, token: &str) -> Result<Option<PlayerRecord>, StoreError> {
        let id = match lock(&self.index).get(token) {
            Some(id) => *id,
            None => return Ok(None),
        };
        self.load(id).map(Some)
    }

    fn save(&self, record: &PlayerRecord) -> Result<(), StoreError> {
        let bytes = save_file::encode(record)?;
        write_atomically(&self.player_path(record.id), &bytes)
    }
}

/// In-process store. Saves can be made to fail or to stall, for exercising
/// retry paths and races with slow disks.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<Uuid, PlayerRecord>>,
    fail_saves: AtomicBool,
    save_delay_ms: AtomicU64,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `save` fail until switched back.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Makes every following `save` block for `delay` first.
    pub fn set_save_delay(&self, delay: Duration) {
        self.save_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Last saved copy of a player.
    pub fn saved(&self, id: Uuid) -> Option<PlayerRecord> {
        lock(&self.records).get(&id).cloned()
    }
}

impl PlayerStore for MemoryStore {
    fn create(&self, nickname: &str) -> Result<PlayerRecord, StoreError> {
        let nickname = validated_nickname(nickname)?;
        let record = PlayerRecord::new(nickname, Utc::now().timestamp());
        lock(&self.records).insert(record.id, record.clone());
        Ok(record)
    }

    fn find_by_token(&self, token: &str) -> Result<Option<PlayerRecord>, StoreError> {
        Ok(lock(&self.records)
            .values()
            .find(|record| record.token == token)
            .cloned())
    }

    fn save(&self, record: &PlayerRecord) -> Result<(), StoreError> {
        let delay = self.save_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("simulated save failure")));
        }
        lock(&self.records).insert(record.id, record.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
