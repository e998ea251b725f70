//! Gold earned from a battle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigId, GameConfig};
use crate::error::{BattleError, Result};
use crate::math::round_to;
use crate::result::MonsterStats;

/// Reward summary for one battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRewards {
    /// Ids of the bonuses earned, in evaluation order.
    pub bonuses: Vec<ConfigId>,
    /// Total gold, bounties plus bonuses.
    pub reward: f32,
    /// Battle length the reward is spread over.
    pub time_secs: f32,
}

impl BattleRewards {
    /// Compute the reward for the given monster statistics.
    ///
    /// The base reward is the bounty of every defeated enemy. Bonuses are
    /// then applied in config order; a multiplicative bonus scales the
    /// reward accumulated so far, including earlier bonuses.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::UnknownEnemyConfig`] if `stats` names an
    /// enemy the config does not define.
    pub fn compute(
        stats: &BTreeMap<ConfigId, MonsterStats>,
        config: &GameConfig,
        time_secs: f32,
    ) -> Result<Self> {
        let mut reward = 0.0;
        for (&id, monster) in stats {
            let enemy = config
                .enemy_by_id(id)
                .ok_or(BattleError::UnknownEnemyConfig(id))?;
            reward += monster.num_defeated as f32 * enemy.bounty;
        }

        let percent = percent_defeated(stats);
        let mut bonuses = Vec::new();
        for bonus in config.battle_bonuses() {
            if bonus.is_earned(percent) {
                reward += bonus.amount(reward);
                bonuses.push(bonus.id);
            }
        }

        tracing::debug!(reward, bonuses = bonuses.len(), percent, "Computed battle rewards");
        Ok(Self {
            bonuses,
            reward,
            time_secs,
        })
    }

    /// Gold per minute, rounded to one decimal. Battles shorter than a
    /// minute count as one minute.
    #[must_use]
    pub fn gold_per_minute(&self) -> f32 {
        let minutes = (self.time_secs / 60.0).max(1.0);
        round_to(self.reward / minutes, 1)
    }
}

/// Percentage (0-100) of sent enemies that were defeated, or `-1.0` if none
/// were sent.
#[must_use]
pub fn percent_defeated(stats: &BTreeMap<ConfigId, MonsterStats>) -> f32 {
    let sent: u32 = stats.values().map(|s| s.num_sent).sum();
    let defeated: u32 = stats.values().map(|s| s.num_defeated).sum();
    if sent == 0 {
        return -1.0;
    }
    defeated as f32 / sent as f32 * 100.0
}
