//! JSON messages exchanged with browser clients over the websocket.
//!
//! Every message is an object tagged by its `event` field, e.g.
//! `{"event":"player:buyUpgrade","type":"probe"}`.

use crate::core::action::Action;
use crate::core::error::GameError;
use crate::core::game_logic::next_upgrade_cost;
use crate::core::game_state::PlayerRecord;
use crate::core::prestige::can_rebirth;
use crate::core::rates::{compute_rates, Rates};
use crate::core::tables::stage_at;
use crate::core::tracks::Track;
use crate::core::PlayerState;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event")]
pub enum ClientMessage {
    #[serde(rename = "player:register")]
    Register { nickname: String },

    #[serde(rename = "player:authenticate")]
    Authenticate { token: String },

    #[serde(rename = "player:click")]
    Click,

    #[serde(rename = "player:buyUpgrade")]
    BuyUpgrade {
        #[serde(rename = "type")]
        track: String,
    },

    #[serde(rename = "player:rebirth")]
    Rebirth,

    #[serde(rename = "player:spendShard")]
    SpendShard {
        #[serde(rename = "type")]
        track: String,
    },
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The game action this message requests, if any. Track names are
    /// validated here so unknown ones never reach the engine.
    pub fn action(&self) -> Result<Option<Action>, GameError> {
        Ok(match self {
            ClientMessage::Register { .. } | ClientMessage::Authenticate { .. } => None,
            ClientMessage::Click => Some(Action::Click),
            ClientMessage::BuyUpgrade { track } => Some(Action::Upgrade(track.parse()?)),
            ClientMessage::Rebirth => Some(Action::Rebirth),
            ClientMessage::SpendShard { track } => Some(Action::SpendPrestige(track.parse()?)),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum ServerMessage {
    #[serde(rename = "player:registered")]
    Registered { token: String, state: PlayerView },

    #[serde(rename = "player:authenticated")]
    Authenticated { state: PlayerView },

    #[serde(rename = "game:state")]
    GameState { state: PlayerView },

    #[serde(rename = "server:error")]
    Error { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpgradeView {
    pub track: Track,
    pub level: u32,
    /// Decimal string; `None` at max level.
    pub next_cost: Option<String>,
}

/// What a client sees of a player. Credentials are never included.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub id: Uuid,
    pub nickname: String,
    #[serde(flatten)]
    pub state: PlayerState,
    pub rates: Rates,
    pub stage: &'static str,
    pub next_stage: Option<&'static str>,
    pub can_rebirth: bool,
    pub upgrades: Vec<UpgradeView>,
}

impl PlayerView {
    pub fn from_record(record: &PlayerRecord) -> Self {
        let state = &record.state;
        let upgrades = Track::all()
            .into_iter()
            .map(|track| UpgradeView {
                track,
                level: state.level(track),
                next_cost: next_upgrade_cost(state, track).map(|cost| cost.to_string()),
            })
            .collect();

        Self {
            id: record.id,
            nickname: record.nickname.clone(),
            state: state.clone(),
            rates: compute_rates(state),
            stage: stage_at(state.route_index).map_or("", |stage| stage.name),
            next_stage: stage_at(state.route_index + 1).map(|stage| stage.name),
            can_rebirth: can_rebirth(state),
            upgrades,
        }
    }
}
