//! Config, path and scenario builders for tests and benchmarks.

use battle_core::battle::{compute_battle, Battle, BattleRequest, TowerPlacement};
use battle_core::config::{
    ConfigId, EnemyConfig, GameConfig, GameConfigData, GridCell, MiscConfigData,
    PlayfieldConfig, TowerConfig,
};
use battle_core::error::Result;
use battle_core::math::CellPos;
use battle_core::result::BattleResult;

/// Tower definition whose projectile type id is `100 + id`.
#[must_use]
pub fn tower_config(
    id: ConfigId,
    firing_rate: f32,
    range: f32,
    damage: f32,
    projectile_speed: f32,
) -> TowerConfig {
    TowerConfig {
        id,
        firing_rate,
        range,
        damage,
        projectile_speed,
        projectile_type_id: 100 + id,
    }
}

/// Enemy definition with a bounty and size of one.
#[must_use]
pub fn enemy_config(id: ConfigId, health: f32, speed: f32) -> EnemyConfig {
    EnemyConfig {
        id,
        health,
        speed,
        bounty: 1.0,
        size: 1.0,
    }
}

/// Config for a `rows` x `cols` playfield entered at the top-left cell
/// and left at the bottom-right cell.
///
/// # Panics
///
/// Panics if two towers or two monsters share an id.
#[must_use]
pub fn game_config(
    rows: usize,
    cols: usize,
    towers: Vec<TowerConfig>,
    monsters: Vec<EnemyConfig>,
) -> GameConfig {
    let last_row = u32::try_from(rows.saturating_sub(1)).expect("playfield too tall");
    let last_col = u32::try_from(cols.saturating_sub(1)).expect("playfield too wide");
    GameConfig::new(GameConfigData {
        playfield: PlayfieldConfig {
            num_rows: rows,
            num_cols: cols,
            enemy_enter: GridCell::new(0, 0),
            enemy_exit: GridCell::new(last_row, last_col),
        },
        towers,
        monsters,
        misc: MiscConfigData::default(),
    })
    .expect("fixture config ids must be unique")
}

/// Placement grid with no towers.
#[must_use]
pub fn empty_placement(rows: usize, cols: usize) -> TowerPlacement {
    vec![vec![None; cols]; rows]
}

/// Cells of `row` from `from_col` to `to_col`, inclusive, in either
/// direction.
#[must_use]
pub fn row_path(row: usize, from_col: usize, to_col: usize) -> Vec<CellPos> {
    if from_col <= to_col {
        (from_col..=to_col).map(|col| CellPos::from_grid(row, col)).collect()
    } else {
        (to_col..=from_col)
            .rev()
            .map(|col| CellPos::from_grid(row, col))
            .collect()
    }
}

/// Path from the top-left cell down column 0, then right along the last
/// row to the bottom-right cell.
#[must_use]
pub fn l_path(rows: usize, cols: usize) -> Vec<CellPos> {
    let last_row = rows.saturating_sub(1);
    let mut path: Vec<CellPos> = (0..rows).map(|row| CellPos::from_grid(row, 0)).collect();
    path.extend((1..cols).map(|col| CellPos::from_grid(last_row, col)));
    path
}

/// A config plus a request against it.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Game configuration.
    pub config: GameConfig,
    /// Battle request.
    pub request: BattleRequest,
}

impl Scenario {
    /// Run the whole battle.
    ///
    /// # Errors
    ///
    /// Request precondition failures from [`compute_battle`].
    pub fn run(&self) -> Result<BattleResult> {
        compute_battle(&self.config, &self.request)
    }

    /// Start a step-wise battle.
    ///
    /// # Errors
    ///
    /// Any error from [`Battle::new`].
    pub fn battle(&self) -> Result<Battle<'_>> {
        Battle::new(&self.config, &self.request)
    }
}

/// One tower (rate 1, range 5, damage 50, projectile speed 10) next to a
/// straight row path, and one enemy with 100 health at speed 1.
///
/// The tower needs two shots, one cooldown apart, to destroy the enemy
/// before it walks out of reach.
#[must_use]
pub fn single_tower_scenario() -> Scenario {
    let config = game_config(
        3,
        5,
        vec![tower_config(0, 1.0, 5.0, 50.0, 10.0)],
        vec![enemy_config(0, 100.0, 1.0)],
    );
    let mut placement = empty_placement(3, 5);
    placement[1][2] = Some(0);
    Scenario {
        config,
        request: BattleRequest::new(placement, vec![0], vec![row_path(0, 0, 4)]),
    }
}

/// A tower that never fires standing beside the path of three enemies.
#[must_use]
pub fn idle_tower_scenario() -> Scenario {
    let config = game_config(
        3,
        5,
        vec![tower_config(3, 0.0, 10.0, 50.0, 10.0)],
        vec![enemy_config(0, 10.0, 2.0)],
    );
    let mut placement = empty_placement(3, 5);
    placement[1][2] = Some(3);
    Scenario {
        config,
        request: BattleRequest::new(placement, vec![0; 3], vec![row_path(0, 0, 4); 3]),
    }
}

/// Two identical towers that each destroy one slow enemy with their
/// first shot, both in the same tick.
///
/// The enemies spawn one tick apart on parallel rows, away from the entry
/// cell, and each walks directly away from its tower.
#[must_use]
pub fn twin_kill_scenario() -> Scenario {
    let config = game_config(
        5,
        4,
        vec![tower_config(0, 1.0, 2.5, 10.0, 1.0)],
        vec![enemy_config(0, 10.0, 0.001)],
    );
    let mut placement = empty_placement(5, 4);
    placement[1][0] = Some(0);
    placement[3][0] = Some(0);
    Scenario {
        config,
        request: BattleRequest::new(
            placement,
            vec![0, 0],
            vec![row_path(1, 2, 3), row_path(3, 2, 3)],
        ),
    }
}

/// A larger battle: several tower kinds along an L-shaped path and a
/// mixed wave of `num_enemies` enemies.
#[must_use]
pub fn gauntlet_scenario(num_enemies: usize) -> Scenario {
    let rows = 12;
    let cols = 12;
    let config = game_config(
        rows,
        cols,
        vec![
            tower_config(0, 1.0, 3.0, 20.0, 8.0),
            tower_config(1, 0.5, 5.0, 45.0, 12.0),
            tower_config(2, 4.0, 2.0, 4.0, 6.0),
            tower_config(3, 0.0, 0.0, 0.0, 0.0),
        ],
        vec![
            enemy_config(0, 60.0, 1.5),
            enemy_config(1, 150.0, 0.8),
            enemy_config(2, 25.0, 3.0),
        ],
    );

    let mut placement = empty_placement(rows, cols);
    for (i, row) in (1..rows - 1).step_by(2).enumerate() {
        placement[row][1] = Some(ConfigId::try_from(i % 4).unwrap_or(0));
    }
    for (i, col) in (2..cols).step_by(3).enumerate() {
        placement[rows - 2][col] = Some(ConfigId::try_from((i + 1) % 3).unwrap_or(0));
    }

    let wave: Vec<ConfigId> = (0..num_enemies)
        .map(|i| ConfigId::try_from(i % 3).unwrap_or(0))
        .collect();
    let paths = vec![l_path(rows, cols); num_enemies];

    Scenario {
        config,
        request: BattleRequest::new(placement, wave, paths),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_path_directions() {
        assert_eq!(
            row_path(2, 1, 3),
            vec![
                CellPos::new(2.0, 1.0),
                CellPos::new(2.0, 2.0),
                CellPos::new(2.0, 3.0)
            ]
        );
        assert_eq!(
            row_path(0, 2, 0),
            vec![
                CellPos::new(0.0, 2.0),
                CellPos::new(0.0, 1.0),
                CellPos::new(0.0, 0.0)
            ]
        );
    }

    #[test]
    fn test_l_path_connects_entry_and_exit() {
        let config = game_config(4, 3, vec![], vec![]);
        let path = l_path(4, 3);
        assert_eq!(path.len(), 6);
        assert_eq!(path.first(), Some(&config.playfield().enemy_enter_cell()));
        assert_eq!(path.last(), Some(&config.playfield().enemy_exit_cell()));
        assert!(path.windows(2).all(|w| (w[0].distance(w[1]) - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_scenarios_are_valid() {
        for scenario in [
            single_tower_scenario(),
            idle_tower_scenario(),
            twin_kill_scenario(),
            gauntlet_scenario(6),
        ] {
            scenario.request.validate(&scenario.config).unwrap();
        }
    }
}
