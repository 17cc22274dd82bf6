use super::constants::NUM_TRACKS;
use super::error::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three independent upgrade categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    /// Raises the yield of each click.
    Collection,
    /// Passive income per tick. Yields nothing until first purchased.
    Probe,
    /// Travel speed along the route.
    Engines,
}

impl Track {
    pub fn all() -> [Track; NUM_TRACKS] {
        [Track::Collection, Track::Probe, Track::Engines]
    }

    pub fn id(&self) -> &'static str {
        match self {
            Track::Collection => "collection",
            Track::Probe => "probe",
            Track::Engines => "engines",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Track::Collection => 0,
            Track::Probe => 1,
            Track::Engines => 2,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Track {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Track::all()
            .into_iter()
            .find(|track| track.id() == s)
            .ok_or_else(|| GameError::UnknownTrack(s.to_string()))
    }
}

/// Fixed-size per-track storage, indexed by [`Track`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PerTrack<T> {
    values: [T; NUM_TRACKS],
}

impl<T: Copy> PerTrack<T> {
    pub fn splat(value: T) -> Self {
        Self {
            values: [value; NUM_TRACKS],
        }
    }

    pub fn from_array(values: [T; NUM_TRACKS]) -> Self {
        Self { values }
    }

    pub fn to_array(&self) -> [T; NUM_TRACKS] {
        self.values
    }

    pub fn get(&self, track: Track) -> T {
        self.values[track.index()]
    }

    pub fn set(&mut self, track: Track, value: T) {
        self.values[track.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Track, T)> + '_ {
        Track::all().into_iter().map(move |track| (track, self.get(track)))
    }
}
