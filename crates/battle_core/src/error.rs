//! Error types for battle computation.

use thiserror::Error;

/// Result type alias using [`BattleError`].
pub type Result<T> = std::result::Result<T, BattleError>;

/// Top-level error type for all battle computation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BattleError {
    /// A placed tower references a tower config that does not exist.
    #[error("Could not find tower with ID: {0}")]
    UnknownTowerConfig(u16),

    /// The wave references an enemy config that does not exist.
    #[error("Could not find enemy config with ID: {0}")]
    UnknownEnemyConfig(u16),

    /// The tower placement grid does not match the playfield.
    #[error(
        "Tower placement is {rows}x{cols} but the playfield is {expected_rows}x{expected_cols}"
    )]
    PlacementShapeMismatch {
        /// Rows in the playfield.
        expected_rows: usize,
        /// Columns in the playfield.
        expected_cols: usize,
        /// Rows in the placement grid.
        rows: usize,
        /// Width of the first placement row that did not match.
        cols: usize,
    },

    /// The wave and the path list have different lengths.
    #[error("Wave has {wave} enemies but {paths} paths were provided")]
    WavePathMismatch {
        /// Number of enemies in the wave.
        wave: usize,
        /// Number of paths provided.
        paths: usize,
    },

    /// A path contains no cells.
    #[error("Path {index} is empty")]
    EmptyPath {
        /// Index of the offending path in the request.
        index: usize,
    },

    /// The tick duration is not a finite positive number.
    #[error("Invalid tick duration: {0}")]
    InvalidTickDuration(f32),

    /// More dynamic objects were spawned than the id space can address.
    #[error("Ran out of object ids")]
    IdSpaceExhausted,

    /// The battle did not finish within the configured tick limit.
    #[error("Battle did not finish within {limit} ticks")]
    TickLimitExceeded {
        /// The configured limit.
        limit: u64,
    },

    /// A produced event stream failed consistency checks.
    #[error("Invalid event stream: {0}")]
    InvalidEventStream(String),

    /// Binary encoding or decoding failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Configuration text could not be parsed.
    #[error("Failed to parse {format} config: {message}")]
    DataParseError {
        /// Source format name.
        format: &'static str,
        /// Parser message.
        message: String,
    },

    /// Two configs of the same kind share an id.
    #[error("Found duplicated {kind} id {id}")]
    DuplicateConfigId {
        /// Config kind ("tower", "monster" or "bonus").
        kind: &'static str,
        /// The repeated id.
        id: u16,
    },
}

impl BattleError {
    /// Whether this error is raised mid-simulation and therefore reported
    /// through [`crate::result::BattleResult::error_message`] instead of
    /// being returned to the caller.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownTowerConfig(_)
                | Self::UnknownEnemyConfig(_)
                | Self::IdSpaceExhausted
                | Self::TickLimitExceeded { .. }
                | Self::InvalidEventStream(_)
        )
    }
}
