//! Static game configuration.
//!
//! The engine consumes an already-validated [`GameConfig`]. Its serde shape
//! ([`GameConfigData`]) mirrors the game's JSON config document, so the
//! same text the rest of the game reads can be handed straight to
//! [`GameConfig::from_json_str`]. Loading a file is the caller's job.
//!
//! Towers and enemies are stored in arenas; per-battle state refers to them
//! through [`TowerSlot`]/[`EnemySlot`] indices resolved once, so the hot
//! loop never repeats an id lookup.
//!
//! # Example RON
//!
//! ```text
//! (
//!     playfield: (
//!         numRows: 10,
//!         numCols: 10,
//!         monsterEnter: (row: 0, col: 0),
//!         monsterExit: (row: 9, col: 9),
//!     ),
//!     towers: [
//!         (id: 0, firingRate: 1.0, range: 5.0, damage: 50.0,
//!          projectileSpeed: 10.0, projectileId: 3),
//!     ],
//!     monsters: [
//!         (id: 0, health: 100.0, speed: 1.0, bounty: 5.0, size: 1.0),
//!     ],
//! )
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};
use crate::math::CellPos;

/// Identifier of a tower, enemy, projectile or bonus definition.
pub type ConfigId = u16;

/// An integer grid cell as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCell {
    /// Row index.
    pub row: u32,
    /// Column index.
    pub col: u32,
}

impl GridCell {
    /// Create a new grid cell.
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// The cell as a continuous position.
    #[must_use]
    pub fn to_cell_pos(self) -> CellPos {
        CellPos::new(self.row as f32, self.col as f32)
    }
}

/// Playfield dimensions and the enemy entry/exit cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayfieldConfig {
    /// Number of rows in the grid.
    pub num_rows: usize,
    /// Number of columns in the grid.
    pub num_cols: usize,
    /// Cell where enemies enter the playfield.
    #[serde(rename = "monsterEnter")]
    pub enemy_enter: GridCell,
    /// Cell where enemies leave the playfield.
    #[serde(rename = "monsterExit")]
    pub enemy_exit: GridCell,
}

impl PlayfieldConfig {
    /// Entry cell as a position.
    #[must_use]
    pub fn enemy_enter_cell(&self) -> CellPos {
        self.enemy_enter.to_cell_pos()
    }

    /// Exit cell as a position.
    #[must_use]
    pub fn enemy_exit_cell(&self) -> CellPos {
        self.enemy_exit.to_cell_pos()
    }
}

/// A tower definition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TowerConfig {
    /// Config id referenced by tower placements.
    pub id: ConfigId,
    /// Shots per second. Zero means the tower never fires.
    pub firing_rate: f32,
    /// Maximum reach in cells.
    pub range: f32,
    /// Health removed from the target per shot.
    pub damage: f32,
    /// Projectile speed in cells per second.
    pub projectile_speed: f32,
    /// Config id of the projectile sprite emitted in move events.
    #[serde(rename = "projectileId")]
    pub projectile_type_id: ConfigId,
}

impl TowerConfig {
    /// Whether this tower ever fires.
    #[must_use]
    pub fn can_fire(&self) -> bool {
        self.firing_rate > 0.0
    }

    /// Seconds between two shots.
    #[must_use]
    pub fn cooldown_secs(&self) -> f32 {
        1.0 / self.firing_rate
    }
}

/// An enemy definition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyConfig {
    /// Config id referenced by waves.
    pub id: ConfigId,
    /// Starting health.
    pub health: f32,
    /// Movement speed in cells per second.
    pub speed: f32,
    /// Gold awarded when defeated.
    pub bounty: f32,
    /// Sprite size.
    pub size: f32,
}

/// How a battle bonus changes the reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BonusType {
    /// Adds `bonus_amount` gold.
    Additive,
    /// Multiplies the running reward by `bonus_amount`.
    Multiplicative,
}

/// A requirement a battle must meet to earn a bonus.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusCondition {
    /// Minimum percentage (0-100) of sent enemies that must be defeated.
    #[serde(default)]
    pub percent_defeated: Option<f32>,
}

/// An extra reward granted after a battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleBonus {
    /// Bonus id reported in the rewards.
    pub id: ConfigId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Additive or multiplicative.
    pub bonus_type: BonusType,
    /// Gold (additive) or factor (multiplicative).
    pub bonus_amount: f32,
    /// All conditions must hold.
    #[serde(default)]
    pub conditions: Vec<BonusCondition>,
}

impl BattleBonus {
    /// Whether the bonus is earned for the given defeat percentage.
    ///
    /// A battle with nothing sent reports `-1.0`, which fails any
    /// percentage condition.
    #[must_use]
    pub fn is_earned(&self, percent_defeated: f32) -> bool {
        self.conditions.iter().all(|condition| {
            condition
                .percent_defeated
                .map_or(true, |required| required <= percent_defeated)
        })
    }

    /// Gold this bonus adds on top of `current_reward`.
    #[must_use]
    pub fn amount(&self, current_reward: f32) -> f32 {
        match self.bonus_type {
            BonusType::Additive => self.bonus_amount,
            BonusType::Multiplicative => current_reward * (self.bonus_amount - 1.0),
        }
    }
}

/// Miscellaneous config section; only the battle bonuses matter here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiscConfigData {
    /// Bonuses evaluated after every battle, in order.
    #[serde(default)]
    pub battle_bonuses: Vec<BattleBonus>,
}

/// Serialized configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfigData {
    /// Playfield layout.
    pub playfield: PlayfieldConfig,
    /// Tower catalog.
    pub towers: Vec<TowerConfig>,
    /// Enemy catalog.
    pub monsters: Vec<EnemyConfig>,
    /// Misc section.
    #[serde(default)]
    pub misc: MiscConfigData,
}

/// Index of a tower definition inside a [`GameConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TowerSlot(usize);

/// Index of an enemy definition inside a [`GameConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnemySlot(usize);

/// Immutable, indexed game configuration.
///
/// Safe to share between threads: it is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GameConfigData", into = "GameConfigData")]
pub struct GameConfig {
    playfield: PlayfieldConfig,
    towers: Vec<TowerConfig>,
    enemies: Vec<EnemyConfig>,
    bonuses: Vec<BattleBonus>,
    tower_slots: HashMap<ConfigId, usize>,
    enemy_slots: HashMap<ConfigId, usize>,
}

fn index_ids<I>(ids: I, kind: &'static str) -> Result<HashMap<ConfigId, usize>>
where
    I: IntoIterator<Item = ConfigId>,
{
    let mut slots = HashMap::new();
    for (slot, id) in ids.into_iter().enumerate() {
        if slots.insert(id, slot).is_some() {
            return Err(BattleError::DuplicateConfigId { kind, id });
        }
    }
    Ok(slots)
}

impl GameConfig {
    /// Build an indexed configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::DuplicateConfigId`] if two towers, two
    /// monsters or two bonuses share an id.
    pub fn new(data: GameConfigData) -> Result<Self> {
        let tower_slots = index_ids(data.towers.iter().map(|t| t.id), "tower")?;
        let enemy_slots = index_ids(data.monsters.iter().map(|m| m.id), "monster")?;
        index_ids(data.misc.battle_bonuses.iter().map(|b| b.id), "bonus")?;

        Ok(Self {
            playfield: data.playfield,
            towers: data.towers,
            enemies: data.monsters,
            bonuses: data.misc.battle_bonuses,
            tower_slots,
            enemy_slots,
        })
    }

    /// Parse a JSON config document.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::DataParseError`] for malformed text and
    /// [`BattleError::DuplicateConfigId`] for repeated ids.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let data: GameConfigData =
            serde_json::from_str(text).map_err(|e| BattleError::DataParseError {
                format: "JSON",
                message: e.to_string(),
            })?;
        Self::new(data)
    }

    /// Parse a RON config document.
    ///
    /// # Errors
    ///
    /// Same as [`from_json_str`](Self::from_json_str).
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let data: GameConfigData =
            ron::from_str(text).map_err(|e| BattleError::DataParseError {
                format: "RON",
                message: e.to_string(),
            })?;
        Self::new(data)
    }

    /// Playfield layout.
    #[must_use]
    pub const fn playfield(&self) -> &PlayfieldConfig {
        &self.playfield
    }

    /// Battle bonuses in evaluation order.
    #[must_use]
    pub fn battle_bonuses(&self) -> &[BattleBonus] {
        &self.bonuses
    }

    /// Resolve a tower config id to its slot.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::UnknownTowerConfig`] if no such tower exists.
    pub fn tower_slot(&self, id: ConfigId) -> Result<TowerSlot> {
        self.tower_slots
            .get(&id)
            .map(|&slot| TowerSlot(slot))
            .ok_or(BattleError::UnknownTowerConfig(id))
    }

    /// Resolve an enemy config id to its slot.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::UnknownEnemyConfig`] if no such enemy exists.
    pub fn enemy_slot(&self, id: ConfigId) -> Result<EnemySlot> {
        self.enemy_slots
            .get(&id)
            .map(|&slot| EnemySlot(slot))
            .ok_or(BattleError::UnknownEnemyConfig(id))
    }

    /// Tower definition for a slot obtained from this config.
    #[must_use]
    pub fn tower(&self, slot: TowerSlot) -> &TowerConfig {
        &self.towers[slot.0]
    }

    /// Enemy definition for a slot obtained from this config.
    #[must_use]
    pub fn enemy(&self, slot: EnemySlot) -> &EnemyConfig {
        &self.enemies[slot.0]
    }

    /// Look up a tower definition by id.
    #[must_use]
    pub fn tower_by_id(&self, id: ConfigId) -> Option<&TowerConfig> {
        self.tower_slot(id).ok().map(|slot| self.tower(slot))
    }

    /// Look up an enemy definition by id.
    #[must_use]
    pub fn enemy_by_id(&self, id: ConfigId) -> Option<&EnemyConfig> {
        self.enemy_slot(id).ok().map(|slot| self.enemy(slot))
    }

    /// Rebuild the serialized document.
    #[must_use]
    pub fn to_data(&self) -> GameConfigData {
        GameConfigData {
            playfield: self.playfield,
            towers: self.towers.clone(),
            monsters: self.enemies.clone(),
            misc: MiscConfigData {
                battle_bonuses: self.bonuses.clone(),
            },
        }
    }
}

impl TryFrom<GameConfigData> for GameConfig {
    type Error = BattleError;

    fn try_from(data: GameConfigData) -> Result<Self> {
        Self::new(data)
    }
}

impl From<GameConfig> for GameConfigData {
    fn from(config: GameConfig) -> Self {
        config.to_data()
    }
}
