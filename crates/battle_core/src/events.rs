//! Replay events produced by a battle.
//!
//! Events are appended in generation order while the battle runs and are
//! sorted exactly once at the end with [`sort_chronologically`].

use serde::{Deserialize, Serialize};

use crate::config::ConfigId;
use crate::math::{round_to, CellPos};
use crate::state::ObjectId;

/// Decimal places used when rounding events for display.
pub const EVENT_PRECISION: u32 = 4;

/// Kind of object an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    /// A walking enemy.
    Enemy,
    /// A tower projectile.
    Projectile,
}

/// An object travels in a straight line between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveEvent {
    /// Kind of moving object.
    pub object_type: ObjectType,
    /// Object id.
    pub id: ObjectId,
    /// Enemy config id, or the tower's projectile type id.
    pub config_id: ConfigId,
    /// Where the movement starts.
    pub start_pos: CellPos,
    /// Where the movement ends.
    pub dest_pos: CellPos,
    /// When the movement starts.
    pub start_time: f32,
    /// When the movement ends.
    pub end_time: f32,
}

/// An object leaves the playfield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeleteEvent {
    /// Kind of removed object.
    pub object_type: ObjectType,
    /// Object id.
    pub id: ObjectId,
    /// When the object disappears.
    pub start_time: f32,
}

/// An enemy's health changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    /// Enemy id.
    pub id: ObjectId,
    /// Health after the hit.
    pub health: f32,
    /// When the hit lands.
    pub start_time: f32,
}

/// One timestamped state change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BattleEvent {
    /// Movement along a segment.
    Move(MoveEvent),
    /// Removal from the playfield.
    Delete(DeleteEvent),
    /// Health change.
    Damage(DamageEvent),
}

impl BattleEvent {
    /// Time the event takes effect.
    #[must_use]
    pub const fn start_time(&self) -> f32 {
        match self {
            Self::Move(e) => e.start_time,
            Self::Delete(e) => e.start_time,
            Self::Damage(e) => e.start_time,
        }
    }

    /// Id of the object the event refers to.
    #[must_use]
    pub const fn object_id(&self) -> ObjectId {
        match self {
            Self::Move(e) => e.id,
            Self::Delete(e) => e.id,
            Self::Damage(e) => e.id,
        }
    }

    /// Kind of object the event refers to. Damage only ever hits enemies.
    #[must_use]
    pub const fn object_type(&self) -> ObjectType {
        match self {
            Self::Move(e) => e.object_type,
            Self::Delete(e) => e.object_type,
            Self::Damage(_) => ObjectType::Enemy,
        }
    }

    /// Copy with times and positions rounded to `precision` decimals.
    ///
    /// Health values are left untouched.
    #[must_use]
    pub fn rounded(&self, precision: u32) -> Self {
        match *self {
            Self::Move(e) => Self::Move(MoveEvent {
                start_pos: e.start_pos.rounded(precision),
                dest_pos: e.dest_pos.rounded(precision),
                start_time: round_to(e.start_time, precision),
                end_time: round_to(e.end_time, precision),
                ..e
            }),
            Self::Delete(e) => Self::Delete(DeleteEvent {
                start_time: round_to(e.start_time, precision),
                ..e
            }),
            Self::Damage(e) => Self::Damage(DamageEvent {
                start_time: round_to(e.start_time, precision),
                ..e
            }),
        }
    }
}

impl From<MoveEvent> for BattleEvent {
    fn from(event: MoveEvent) -> Self {
        Self::Move(event)
    }
}

impl From<DeleteEvent> for BattleEvent {
    fn from(event: DeleteEvent) -> Self {
        Self::Delete(event)
    }
}

impl From<DamageEvent> for BattleEvent {
    fn from(event: DamageEvent) -> Self {
        Self::Damage(event)
    }
}

/// Sort events by start time, keeping generation order among ties.
///
/// The sort must be stable: two damage events against one enemy at the
/// same instant would otherwise replay out of order and the lower health
/// would be overwritten by the earlier, higher one.
pub fn sort_chronologically(events: &mut [BattleEvent]) {
    events.sort_by(|a, b| a.start_time().total_cmp(&b.start_time()));
}
