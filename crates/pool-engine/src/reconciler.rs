//! Reconcile real arrivals against provisional lane assignments.
//!
//! Matching policy:
//! - Only the open (latest) assignment of a lane can be confirmed, and only
//!   while it is still `Unconfirmed`.
//! - The assignment must have started on or before the arrival date, so a
//!   confirmation can never open a gap that overlaps a later occupancy.
//! - Among eligible assignments the one whose projection is nearest to the
//!   arrival in absolute days wins. Equal distance prefers the earlier
//!   projection (the overdue one), then the lowest lane id.

use chrono::NaiveDate;
use tracing::debug;

use crate::catalog::ComponentKind;
use crate::events::AllocationRecord;
use crate::finder::latest_per_lane;
use crate::model::{ArrivalStatus, LaneAssignment, LaneId};
use crate::state::AllocationState;

/// A successful arrival-to-assignment match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub arrival_index: usize,
    pub lane_id: LaneId,
    pub arrival_date: NaiveDate,
    pub changeout_date: NaiveDate,
    pub projected_arrival_date: NaiveDate,
}

/// Index into `timeline` of the assignment an arrival on `arrival_date`
/// should confirm, if any.
pub fn nearest_unconfirmed(timeline: &[LaneAssignment], arrival_date: NaiveDate) -> Option<usize> {
    latest_per_lane(timeline)
        .into_values()
        .filter(|&i| {
            let a = &timeline[i];
            a.arrival_status == ArrivalStatus::Unconfirmed && a.changeout_date <= arrival_date
        })
        .min_by(|&i, &j| {
            let (a, b) = (&timeline[i], &timeline[j]);
            let dist = |x: &LaneAssignment| (arrival_date - x.projected_arrival_date).num_days().abs();
            dist(a)
                .cmp(&dist(b))
                .then(a.projected_arrival_date.cmp(&b.projected_arrival_date))
                .then_with(|| a.lane_id.cmp(&b.lane_id))
        })
}

/// Try to consume the arrival at `arrival_index`.
///
/// On success the matched assignment becomes `Confirmed` with the arrival's
/// date, the arrival is tagged with the lane, and an `ArrivalConsumed` record
/// is logged. Consumed arrivals are never matched twice.
pub fn reconcile_arrival(state: &mut AllocationState, arrival_index: usize) -> Option<Reconciliation> {
    let arrival = state.arrivals().get(arrival_index)?;
    if arrival.is_consumed() {
        return None;
    }
    let component = arrival.component;
    let arrival_date = arrival.arrival_date;

    let target = nearest_unconfirmed(state.timeline(component), arrival_date)?;
    let assignment = &mut state.timeline_mut(component)[target];
    assignment.arrival_date = Some(arrival_date);
    assignment.arrival_status = ArrivalStatus::Confirmed;
    let reconciliation = Reconciliation {
        arrival_index,
        lane_id: assignment.lane_id.clone(),
        arrival_date,
        changeout_date: assignment.changeout_date,
        projected_arrival_date: assignment.projected_arrival_date,
    };

    if let Some(arrival) = state.arrival_mut(arrival_index) {
        arrival.consuming_lane = Some(reconciliation.lane_id.clone());
    }
    debug!(
        component = %component,
        arrival = %arrival_date,
        lane = %reconciliation.lane_id,
        "arrival confirmed assignment"
    );
    state.record(AllocationRecord::ArrivalConsumed {
        component,
        arrival_date,
        lane: reconciliation.lane_id.clone(),
        changeout_date: reconciliation.changeout_date,
        projected_arrival: reconciliation.projected_arrival_date,
    });
    Some(reconciliation)
}

/// Consume the earliest unconsumed arrival of `component` dated before
/// `before` that has a match.
///
/// Arrivals that find no eligible assignment are skipped and stay
/// unconsumed; the next one is tried.
pub fn reconcile_earliest(
    state: &mut AllocationState,
    component: ComponentKind,
    before: NaiveDate,
) -> Option<Reconciliation> {
    for index in state.unconsumed_arrivals(component) {
        if state.arrivals()[index].arrival_date >= before {
            break;
        }
        if let Some(r) = reconcile_arrival(state, index) {
            return Some(r);
        }
    }
    None
}
