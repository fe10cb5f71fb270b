//! Which lanes of a component are free on a given date.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{LaneAssignment, LaneId};

/// A lane that can accept a new component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeLane {
    pub lane_id: LaneId,
    /// Changeout date of the lane's latest assignment.
    pub last_changeout_date: NaiveDate,
    /// Date the latest occupant returned (or stops blocking).
    pub free_from: NaiveDate,
}

/// Index of the latest assignment of every lane, keyed by lane.
///
/// "Latest" is the maximum `changeout_date`; among equal dates the one that
/// appears later in `assignments` wins.
pub fn latest_per_lane(assignments: &[LaneAssignment]) -> BTreeMap<LaneId, usize> {
    let mut latest: BTreeMap<LaneId, usize> = BTreeMap::new();
    for (i, a) in assignments.iter().enumerate() {
        match latest.get(&a.lane_id) {
            Some(&j) if assignments[j].changeout_date > a.changeout_date => {}
            _ => {
                latest.insert(a.lane_id.clone(), i);
            }
        }
    }
    latest
}

/// Lanes free for a changeout on `changeout_date`, ordered by lane id.
///
/// A lane is free when its latest assignment started before `changeout_date`
/// and its occupant is back strictly before `changeout_date`. Lanes whose
/// latest occupant has no known return are never free.
pub fn find_available_lanes(
    assignments: &[LaneAssignment],
    changeout_date: NaiveDate,
) -> Vec<FreeLane> {
    latest_per_lane(assignments)
        .into_iter()
        .filter_map(|(lane_id, i)| {
            let latest = &assignments[i];
            let free_from = latest.free_from()?;
            (latest.changeout_date < changeout_date && free_from < changeout_date).then(|| {
                FreeLane {
                    lane_id,
                    last_changeout_date: latest.changeout_date,
                    free_from,
                }
            })
        })
        .collect()
}
