//! Serialize exact integers as decimal strings.
//!
//! JSON clients read numbers as doubles, which silently lose precision past
//! 2^53. Currency and prestige points go over the wire as strings instead.
//! Plain JSON numbers are still accepted on input.

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum U128Input {
        String(String),
        Number(u64),
    }

    match U128Input::deserialize(deserializer)? {
        U128Input::String(raw) => raw.trim().parse::<u128>().map_err(D::Error::custom),
        U128Input::Number(value) => Ok(u128::from(value)),
    }
}
