//! Most-time-unchanged tie-break among free lanes.

use chrono::NaiveDate;

use crate::catalog::ComponentKind;
use crate::error::{PoolError, Result};
use crate::finder::FreeLane;

/// Days `lane` has been sitting free at `changeout_date`.
pub fn days_unchanged(lane: &FreeLane, changeout_date: NaiveDate) -> i64 {
    (changeout_date - lane.free_from).num_days()
}

/// Pick the lane that has been free the longest.
///
/// Equal `days_unchanged` is broken by the lowest lane id, so the choice does
/// not depend on candidate order.
///
/// # Errors
/// Returns `PoolError::EmptyCandidates` when `candidates` is empty.
pub fn select_most_time_unchanged<'a>(
    candidates: &'a [FreeLane],
    component: ComponentKind,
    changeout_date: NaiveDate,
) -> Result<&'a FreeLane> {
    candidates
        .iter()
        .max_by(|a, b| {
            days_unchanged(a, changeout_date)
                .cmp(&days_unchanged(b, changeout_date))
                .then_with(|| b.lane_id.cmp(&a.lane_id))
        })
        .ok_or_else(|| PoolError::EmptyCandidates {
            component: component.code().to_string(),
            changeout_date,
        })
}
