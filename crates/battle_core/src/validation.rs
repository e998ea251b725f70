//! Event stream consistency checks.
//!
//! Runs on every battle result when the `debug-validation` feature is
//! enabled, and is available to tests and tools otherwise.

use std::collections::HashMap;

use crate::error::{BattleError, Result};
use crate::events::BattleEvent;
use crate::state::ObjectId;

/// Check that a sorted event stream can be replayed.
///
/// - start times never decrease
/// - no object is deleted twice
/// - no event refers to an object after its deletion
///
/// # Errors
///
/// Returns [`BattleError::InvalidEventStream`] describing the first
/// offending event.
pub fn validate_events(events: &[BattleEvent]) -> Result<()> {
    let mut deleted: HashMap<ObjectId, usize> = HashMap::new();
    let mut previous_time = f32::NEG_INFINITY;

    for (index, event) in events.iter().enumerate() {
        let time = event.start_time();
        if time < previous_time {
            return Err(BattleError::InvalidEventStream(format!(
                "event {index} starts at {time} after an event at {previous_time}"
            )));
        }
        previous_time = time;

        let id = event.object_id();
        if let Some(&deleted_at) = deleted.get(&id) {
            let what = if matches!(event, BattleEvent::Delete(_)) {
                "deleted again"
            } else {
                "referenced"
            };
            return Err(BattleError::InvalidEventStream(format!(
                "object {id} {what} by event {index} after its deletion at event {deleted_at}"
            )));
        }

        if matches!(event, BattleEvent::Delete(_)) {
            deleted.insert(id, index);
        }
    }

    Ok(())
}
