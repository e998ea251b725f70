//! In-crate fixtures for unit tests.

use crate::config::{
    EnemyConfig, GameConfig, GameConfigData, GridCell, MiscConfigData, PlayfieldConfig,
    TowerConfig,
};
use crate::math::CellPos;

pub fn tower(id: u16, firing_rate: f32, range: f32, damage: f32, speed: f32) -> TowerConfig {
    TowerConfig {
        id,
        firing_rate,
        range,
        damage,
        projectile_speed: speed,
        projectile_type_id: 100 + id,
    }
}

pub fn enemy(id: u16, health: f32, speed: f32) -> EnemyConfig {
    EnemyConfig {
        id,
        health,
        speed,
        bounty: 1.0,
        size: 1.0,
    }
}

pub fn config(
    rows: usize,
    cols: usize,
    towers: Vec<TowerConfig>,
    monsters: Vec<EnemyConfig>,
) -> GameConfig {
    GameConfig::new(GameConfigData {
        playfield: PlayfieldConfig {
            num_rows: rows,
            num_cols: cols,
            enemy_enter: GridCell::new(0, 0),
            enemy_exit: GridCell::new(rows as u32 - 1, cols as u32 - 1),
        },
        towers,
        monsters,
        misc: MiscConfigData::default(),
    })
    .unwrap()
}

/// Straight path along row `row` from column 0 to `len - 1`.
pub fn row_path(row: u32, len: u32) -> Vec<CellPos> {
    (0..len)
        .map(|col| CellPos::new(row as f32, col as f32))
        .collect()
}
