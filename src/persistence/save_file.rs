//! Checksummed binary encoding of a player record.
//!
//! File format:
//! - Version magic (8 bytes)
//! - Data length (4 bytes)
//! - bincode-serialized [`PlayerSaveData`] (variable length)
//! - SHA256 checksum over everything above (32 bytes)

use super::error::StoreError;
use crate::core::constants::{SAVE_FORMAT_VERSION, SAVE_VERSION_MAGIC};
use crate::core::game_state::{PlayerRecord, PlayerState};
use crate::core::tracks::PerTrack;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

const MAGIC_LEN: usize = 8;
const LENGTH_LEN: usize = 4;
const CHECKSUM_LEN: usize = 32;

/// On-disk layout. Exact integers are stored natively, never as floats.
#[derive(Serialize, Deserialize)]
struct PlayerSaveData {
    version: u32,
    id: Uuid,
    nickname: String,
    token: String,
    currency: u128,
    fractional_carry: f64,
    levels: [u32; 3],
    prestige_multipliers: [f64; 3],
    route_index: u64,
    route_progress: f64,
    prestige_points: u128,
    last_save_time: i64,
}

impl From<&PlayerRecord> for PlayerSaveData {
    fn from(record: &PlayerRecord) -> Self {
        let state = &record.state;
        Self {
            version: SAVE_FORMAT_VERSION,
            id: record.id,
            nickname: record.nickname.clone(),
            token: record.token.clone(),
            currency: state.currency,
            fractional_carry: state.fractional_carry,
            levels: state.levels.to_array(),
            prestige_multipliers: state.prestige_multipliers.to_array(),
            route_index: state.route_index as u64,
            route_progress: state.route_progress,
            prestige_points: state.prestige_points,
            last_save_time: record.last_save_time,
        }
    }
}

impl PlayerSaveData {
    fn into_record(self) -> Result<PlayerRecord, StoreError> {
        if self.version != SAVE_FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion(self.version));
        }

        let route_index =
            usize::try_from(self.route_index).map_err(|_| StoreError::Corrupted(self.id))?;
        let state = PlayerState {
            currency: self.currency,
            fractional_carry: self.fractional_carry,
            levels: PerTrack::from_array(self.levels),
            prestige_multipliers: PerTrack::from_array(self.prestige_multipliers),
            route_index,
            route_progress: self.route_progress,
            prestige_points: self.prestige_points,
        };
        if !state.invariants_hold() {
            return Err(StoreError::Corrupted(self.id));
        }

        Ok(PlayerRecord {
            id: self.id,
            nickname: self.nickname,
            token: self.token,
            state,
            last_save_time: self.last_save_time,
        })
    }
}

fn checksum(magic: &[u8], length: &[u8], data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(magic);
    hasher.update(length);
    hasher.update(data);
    hasher.finalize().into()
}

pub fn encode(record: &PlayerRecord) -> Result<Vec<u8>, StoreError> {
    let data = bincode::serialize(&PlayerSaveData::from(record))?;
    let length = u32::try_from(data.len())
        .map_err(|_| StoreError::Io(std::io::Error::other("save data too large")))?;

    let magic_bytes = SAVE_VERSION_MAGIC.to_le_bytes();
    let length_bytes = length.to_le_bytes();
    let digest = checksum(&magic_bytes, &length_bytes, &data);

    let mut out = Vec::with_capacity(MAGIC_LEN + LENGTH_LEN + data.len() + CHECKSUM_LEN);
    out.extend_from_slice(&magic_bytes);
    out.extend_from_slice(&length_bytes);
    out.extend_from_slice(&data);
    out.extend_from_slice(&digest);
    Ok(out)
}

/// Decodes and verifies a save.
///
/// Fails if the magic is wrong, the file is truncated, the checksum does not
/// match, or the decoded state breaks an invariant.
pub fn decode(bytes: &[u8]) -> Result<PlayerRecord, StoreError> {
    let truncated = || StoreError::Io(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));

    if bytes.len() < MAGIC_LEN + LENGTH_LEN + CHECKSUM_LEN {
        return Err(truncated());
    }
    let (magic_bytes, rest) = bytes.split_at(MAGIC_LEN);
    let (length_bytes, rest) = rest.split_at(LENGTH_LEN);

    let mut magic = [0u8; MAGIC_LEN];
    magic.copy_from_slice(magic_bytes);
    let found = u64::from_le_bytes(magic);
    if found != SAVE_VERSION_MAGIC {
        return Err(StoreError::BadMagic {
            expected: SAVE_VERSION_MAGIC,
            found,
        });
    }

    let mut length = [0u8; LENGTH_LEN];
    length.copy_from_slice(length_bytes);
    let data_len = u32::from_le_bytes(length) as usize;
    if rest.len() != data_len + CHECKSUM_LEN {
        return Err(truncated());
    }
    let (data, stored_checksum) = rest.split_at(data_len);

    if checksum(magic_bytes, length_bytes, data).as_slice() != stored_checksum {
        return Err(StoreError::ChecksumMismatch);
    }

    let save: PlayerSaveData = bincode::deserialize(data)?;
    save.into_record()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tracks::Track;

    fn sample_record() -> PlayerRecord {
        let mut record = PlayerRecord::new("Ana".to_string(), 1_700_000_000);
        record.state.currency = 98_765_432_109_876_543_210;
        record.state.fractional_carry = 0.37;
        record.state.levels.set(Track::Probe, 6);
        record.state.prestige_multipliers.set(Track::Engines, 1.3);
        record.state.route_index = 4;
        record.state.route_progress = 0.25;
        record.state.prestige_points = 3;
        record
    }

    #[test]
    fn test_encode_decode_preserves_record() {
        let record = sample_record();
        let bytes = encode(&record).unwrap();

        assert_eq!(&bytes[..8], &SAVE_VERSION_MAGIC.to_le_bytes());
        assert_eq!(decode(&bytes).unwrap(), record);
    }

    #[test]
    fn test_decode_detects_tampering() {
        let mut bytes = encode(&sample_record()).unwrap();
        let middle = bytes.len() / 2;
        bytes[middle] ^= 0xFF;

        assert!(matches!(decode(&bytes), Err(StoreError::ChecksumMismatch)));
    }

    #[test]
    fn test_decode_rejects_wrong_magic() {
        let mut bytes = encode(&sample_record()).unwrap();
        bytes[0] ^= 0x01;

        assert!(matches!(decode(&bytes), Err(StoreError::BadMagic { .. })));
    }

    #[test]
    fn test_decode_rejects_truncated_file() {
        let bytes = encode(&sample_record()).unwrap();

        assert!(matches!(
            decode(&bytes[..bytes.len() - 1]),
            Err(StoreError::Io(_))
        ));
        assert!(matches!(decode(&bytes[..10]), Err(StoreError::Io(_))));
    }

    #[test]
    fn test_decode_rejects_state_breaking_invariants() {
        let mut record = sample_record();
        record.state.levels.set(Track::Collection, 42);
        let bytes = encode(&record).unwrap();

        assert!(matches!(decode(&bytes), Err(StoreError::Corrupted(id)) if id == record.id));
    }
}
