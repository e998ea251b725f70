//! # Battle Core
//!
//! Deterministic battle-resolution engine for InfiniTD.
//!
//! Given a validated game configuration, a tower placement, a wave of
//! enemies and one precomputed path per enemy, the engine simulates the
//! whole encounter at a fixed tick rate and produces a time-ordered log of
//! [`events::BattleEvent`]s plus per-enemy statistics. A renderer replays
//! that log later, so the same inputs must always produce the same bytes.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO (configuration text is handed in by the caller)
//! - No system randomness
//! - No threads; one battle runs start-to-finish on the calling thread
//!
//! ## Crate Structure
//!
//! - [`math`] - Cell coordinate primitive
//! - [`config`] - Immutable tower/enemy/playfield definitions
//! - [`state`] - Mutable per-battle tower and enemy state
//! - [`movement`] - Path traversal for spawned enemies
//! - [`firing`] - Tower reach, target selection and damage
//! - [`battle`] - The fixed-tick scheduler and [`battle::compute_battle`]
//! - [`events`] - Replay events and stable chronological ordering
//! - [`result`] - Battle result and monster statistics
//! - [`rewards`] - Bounty and battle bonus calculation
//! - [`validation`] - Event stream consistency checks

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod battle;
pub mod config;
pub mod error;
pub mod events;
pub mod firing;
pub mod math;
pub mod movement;
pub mod result;
pub mod rewards;
pub mod state;
pub mod validation;

#[cfg(test)]
mod test_fixtures;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battle::{compute_battle, Battle, BattleRequest, TowerPlacement};
    pub use crate::config::{
        BattleBonus, BonusType, ConfigId, EnemyConfig, GameConfig, GameConfigData,
        PlayfieldConfig, TowerConfig,
    };
    pub use crate::error::{BattleError, Result};
    pub use crate::events::{BattleEvent, ObjectType};
    pub use crate::math::CellPos;
    pub use crate::result::{BattleResult, MonsterStats};
    pub use crate::rewards::BattleRewards;
    pub use crate::state::ObjectId;
}
