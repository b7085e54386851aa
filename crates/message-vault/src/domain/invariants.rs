//! # Domain Invariants
//!
//! Properties of [`VaultState`] that hold after every committed call.
//!
//! - Owner is never zero
//! - Message counter only grows, one per stored message
//! - An aborted call leaves the state untouched

use crate::domain::entities::VaultState;

/// Owner is never the zero address.
#[must_use]
pub fn check_owner_invariant(state: &VaultState) -> bool {
    !state.owner.is_zero()
}

/// Entry point is never recorded as the zero address.
#[must_use]
pub fn check_entry_point_invariant(state: &VaultState) -> bool {
    state.entry_point.map_or(true, |ep| !ep.is_zero())
}

/// Counter advanced by exactly the number of messages stored in between.
#[must_use]
pub fn check_counter_invariant(before: &VaultState, after: &VaultState, stored: u64) -> bool {
    before.message_count.checked_add(stored) == Some(after.message_count)
}

/// A failed call left no trace.
#[must_use]
pub fn check_revert_invariant(before: &VaultState, after: &VaultState) -> bool {
    before == after
}

/// All single-state invariants.
#[must_use]
pub fn check_all_invariants(state: &VaultState) -> bool {
    check_owner_invariant(state) && check_entry_point_invariant(state)
}
