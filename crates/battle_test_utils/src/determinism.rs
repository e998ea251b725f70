//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the battle engine produces
//! identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! The server computes a battle once and the client replays its event log,
//! so the log must be reproducible bit for bit. Sources of
//! non-determinism include:
//!
//! - **Floating-point evaluation order**: The engine is single-threaded
//!   and evaluates every expression in a fixed order.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Statistics are kept in a `BTreeMap`; hash maps are only used for
//!   lookups.
//!
//! - **Unstable sorting**: Events with equal timestamps keep their
//!   generation order.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual subsystems (movement, firing, ordering)
//! 2. **Property tests**: Random battles must still produce identical logs
//! 3. **Integration tests**: Named scenarios are reproducible
//! 4. **Parallel tests**: Running N battles on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use battle_core::result::BattleResult;

use crate::fixtures::Scenario;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated per run.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic battle).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the battle was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Battle is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel battle runs.
#[derive(Debug, Clone)]
pub struct ParallelBattleResult {
    /// Result fingerprint from each battle.
    pub hashes: Vec<u64>,
    /// Number of battles run.
    pub num_battles: usize,
}

impl ParallelBattleResult {
    /// Check if all battles produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all battles matched.
    ///
    /// # Panics
    ///
    /// Panics if battles produced different results.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel battles diverged!\n\
                 Battles: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_battles,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```ignore
/// use battle_test_utils::determinism::verify_determinism;
/// use battle_test_utils::fixtures::gauntlet_scenario;
///
/// let scenario = gauntlet_scenario(10);
/// let result = verify_determinism(
///     5,   // Run 5 times
///     500, // 500 ticks each
///     || scenario.battle().unwrap(),
///     |battle| battle.tick().unwrap(),
///     |battle| battle.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    summarize(hashes, ticks)
}

/// Run a whole battle `runs` times and compare result fingerprints.
///
/// # Panics
///
/// Panics if the scenario's request is rejected.
#[must_use]
pub fn verify_battle_determinism(scenario: &Scenario, runs: usize) -> DeterminismResult {
    let mut hashes = Vec::with_capacity(runs);
    let mut ticks = 0;

    for _ in 0..runs {
        let mut battle = scenario.battle().expect("scenario must be valid");
        while !battle.is_finished() {
            if battle.tick().is_err() {
                break;
            }
        }
        ticks = battle.current_tick();
        hashes.push(result_fingerprint(&battle.finish()));
    }

    summarize(hashes, ticks)
}

fn summarize(hashes: Vec<u64>, ticks: u64) -> DeterminismResult {
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    if is_deterministic {
        tracing::debug!(runs = hashes.len(), ticks, "Runs agree");
    } else {
        tracing::warn!(runs = hashes.len(), ticks, ?hashes, "Runs diverged");
    }

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run N copies of a battle in parallel using `thread::scope` and collect
/// result fingerprints.
///
/// This is useful for catching non-determinism that only manifests
/// under thread scheduling variations, memory layout differences, etc.
/// All threads share one immutable config.
///
/// # Panics
///
/// Panics if a battle thread panics or the request is rejected.
#[must_use]
pub fn run_parallel_battles_scoped(scenario: &Scenario, num_battles: usize) -> ParallelBattleResult {
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_battles)
            .map(|_| {
                s.spawn(|| {
                    let result = scenario.run().expect("scenario must be valid");
                    result_fingerprint(&result)
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ParallelBattleResult {
        hashes,
        num_battles,
    }
}

/// Compare two battles tick-by-tick, finding first divergence.
///
/// Useful for debugging non-determinism by finding exactly when
/// battles start to differ.
///
/// # Returns
///
/// `None` if the battles agree for `num_ticks` ticks (or until they
/// finish), `Some(tick)` if they diverge at that tick.
///
/// # Panics
///
/// Panics if the scenario's request is rejected.
#[must_use]
pub fn find_first_divergence(scenario: &Scenario, num_ticks: u64) -> Option<u64> {
    let mut first = scenario.battle().expect("scenario must be valid");
    let mut second = scenario.battle().expect("scenario must be valid");

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        if first.is_finished() && second.is_finished() {
            break;
        }
        let a = first.tick();
        let b = second.tick();

        if a != b || first.state_hash() != second.state_hash() {
            tracing::warn!(tick, "Battles diverged");
            return Some(tick);
        }
        if a.is_err() {
            break;
        }
    }

    None
}

/// Fingerprint of a battle result, computed over its bincode bytes.
///
/// # Panics
///
/// Panics if the result cannot be serialized.
#[must_use]
pub fn result_fingerprint(result: &BattleResult) -> u64 {
    let bytes = result.to_bytes().expect("battle results always serialize");
    compute_hash(&bytes)
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for battle testing.
///
/// These strategies generate random but reproducible battles for
/// property-based testing. Every generated battle terminates: enemy
/// speeds are positive and paths are finite.
pub mod strategies {
    use battle_core::battle::BattleRequest;
    use battle_core::config::{ConfigId, EnemyConfig, TowerConfig};
    use proptest::prelude::*;

    use crate::fixtures::{empty_placement, game_config, l_path, Scenario};

    /// Generate tower stats for config `id`. One in four towers never fires.
    pub fn arb_tower_config(id: ConfigId) -> impl Strategy<Value = TowerConfig> {
        (
            prop_oneof![1 => Just(0.0f32), 3 => 0.2f32..4.0],
            0.5f32..5.0,
            1.0f32..60.0,
            1.0f32..20.0,
        )
            .prop_map(move |(firing_rate, range, damage, projectile_speed)| TowerConfig {
                id,
                firing_rate,
                range,
                damage,
                projectile_speed,
                projectile_type_id: 100 + id,
            })
    }

    /// Generate enemy stats for config `id`.
    pub fn arb_enemy_config(id: ConfigId) -> impl Strategy<Value = EnemyConfig> {
        (1.0f32..200.0, 0.5f32..4.0, 0.0f32..10.0).prop_map(move |(health, speed, bounty)| {
            EnemyConfig {
                id,
                health,
                speed,
                bounty,
                size: 1.0,
            }
        })
    }

    /// Generate tower definitions with ids `0..n`.
    pub fn arb_towers(max: u16) -> impl Strategy<Value = Vec<TowerConfig>> {
        (1..=max).prop_flat_map(|n| (0..n).map(arb_tower_config).collect::<Vec<_>>())
    }

    /// Generate enemy definitions with ids `0..n`.
    pub fn arb_enemies(max: u16) -> impl Strategy<Value = Vec<EnemyConfig>> {
        (1..=max).prop_flat_map(|n| (0..n).map(arb_enemy_config).collect::<Vec<_>>())
    }

    /// Generate a whole battle: playfield, catalog, placement and wave.
    ///
    /// Every enemy walks the L-shaped path from the entry to the exit cell.
    pub fn arb_scenario(max_enemies: usize) -> impl Strategy<Value = Scenario> {
        (3usize..8, 3usize..8, arb_towers(4), arb_enemies(3))
            .prop_flat_map(move |(rows, cols, towers, enemies)| {
                let num_towers = towers.len();
                let num_enemies = enemies.len();
                let cell = proptest::option::weighted(0.3, 0..num_towers);
                (
                    Just((rows, cols, towers, enemies)),
                    proptest::collection::vec(proptest::collection::vec(cell, cols), rows),
                    proptest::collection::vec(0..num_enemies, 0..=max_enemies),
                    prop_oneof![Just(0.01f32), Just(0.05f32)],
                )
            })
            .prop_map(|((rows, cols, towers, enemies), cells, wave, tick)| {
                let config = game_config(rows, cols, towers, enemies);
                let mut placement = empty_placement(rows, cols);
                for (row, row_cells) in cells.into_iter().enumerate() {
                    for (col, cell) in row_cells.into_iter().enumerate() {
                        placement[row][col] = cell.and_then(|i| ConfigId::try_from(i).ok());
                    }
                }
                let wave: Vec<ConfigId> = wave
                    .into_iter()
                    .filter_map(|i| ConfigId::try_from(i).ok())
                    .collect();
                let paths = vec![l_path(rows, cols); wave.len()];
                Scenario {
                    config,
                    request: BattleRequest::new(placement, wave, paths).with_tick_duration(tick),
                }
            })
    }
}
