//! Battle outcome handed to the replay consumer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ConfigId;
use crate::error::{BattleError, Result};
use crate::events::BattleEvent;
use crate::math::round_to;

/// Sent and defeated counts for one enemy config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterStats {
    /// Enemies of this config that were spawned.
    pub num_sent: u32,
    /// Enemies of this config destroyed by towers.
    pub num_defeated: u32,
}

/// Everything a battle produced.
///
/// A non-empty `error_message` means the battle aborted part-way; the
/// events and statistics gathered up to that point are still present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleResult {
    /// Empty on success.
    pub error_message: String,
    /// Per enemy config id.
    pub monster_stats: BTreeMap<ConfigId, MonsterStats>,
    /// Chronologically sorted replay events.
    pub events: Vec<BattleEvent>,
    /// Game time of the last processed tick.
    ///
    /// `0.0` when no tick ran, including a battle rejected before its first
    /// tick; there is no negative sentinel.
    pub final_game_time: f32,
}

impl BattleResult {
    /// Whether the battle ran to completion.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error_message.is_empty()
    }

    /// Whether every enemy that was sent got defeated.
    #[must_use]
    pub fn all_enemies_defeated(&self) -> bool {
        self.monster_stats
            .values()
            .all(|stats| stats.num_defeated == stats.num_sent)
    }

    /// Total enemies spawned over all configs.
    #[must_use]
    pub fn total_sent(&self) -> u32 {
        self.monster_stats.values().map(|s| s.num_sent).sum()
    }

    /// Total enemies defeated over all configs.
    #[must_use]
    pub fn total_defeated(&self) -> u32 {
        self.monster_stats.values().map(|s| s.num_defeated).sum()
    }

    /// Serialize to bincode.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::Serialization`] if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| BattleError::Serialization(format!("Failed to serialize result: {e}")))
    }

    /// Deserialize from bincode.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::Serialization`] for truncated or foreign bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| BattleError::Serialization(format!("Failed to deserialize result: {e}")))
    }

    /// Copy with event times, positions and the final time rounded to
    /// `precision` decimals.
    #[must_use]
    pub fn rounded(&self, precision: u32) -> Self {
        Self {
            error_message: self.error_message.clone(),
            monster_stats: self.monster_stats.clone(),
            events: self.events.iter().map(|e| e.rounded(precision)).collect(),
            final_game_time: round_to(self.final_game_time, precision),
        }
    }
}
