//! Mutable state threaded through one projection run.
//!
//! The driver owns a single [`AllocationState`] and lends it to the finder
//! and reconciler; nothing here outlives a `generate_pool_projection` call.

use std::collections::BTreeMap;

use crate::catalog::ComponentKind;
use crate::events::{AllocationLog, AllocationRecord};
use crate::model::{ArrivalEvent, LaneAssignment};

#[derive(Debug, Clone, Default)]
pub struct AllocationState {
    timelines: BTreeMap<ComponentKind, Vec<LaneAssignment>>,
    arrivals: Vec<ArrivalEvent>,
    log: AllocationLog,
}

impl AllocationState {
    /// Start from baseline assignments and prepared arrivals.
    ///
    /// Arrivals are kept ordered by `(component, arrival_date)`; equal dates
    /// keep their input order.
    pub fn new(assignments: Vec<LaneAssignment>, mut arrivals: Vec<ArrivalEvent>) -> Self {
        let mut timelines: BTreeMap<ComponentKind, Vec<LaneAssignment>> = BTreeMap::new();
        for a in assignments {
            timelines.entry(a.component).or_default().push(a);
        }
        arrivals.sort_by_key(|a| (a.component, a.arrival_date));
        Self {
            timelines,
            arrivals,
            log: AllocationLog::new(),
        }
    }

    /// All assignments of `component`, in insertion order.
    pub fn timeline(&self, component: ComponentKind) -> &[LaneAssignment] {
        self.timelines
            .get(&component)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn timeline_mut(&mut self, component: ComponentKind) -> &mut Vec<LaneAssignment> {
        self.timelines.entry(component).or_default()
    }

    pub fn push_assignment(&mut self, assignment: LaneAssignment) {
        self.timeline_mut(assignment.component).push(assignment);
    }

    pub fn arrivals(&self) -> &[ArrivalEvent] {
        &self.arrivals
    }

    pub fn arrival_mut(&mut self, index: usize) -> Option<&mut ArrivalEvent> {
        self.arrivals.get_mut(index)
    }

    /// Indices of unconsumed arrivals of `component`, earliest first.
    pub fn unconsumed_arrivals(&self, component: ComponentKind) -> Vec<usize> {
        self.arrivals
            .iter()
            .enumerate()
            .filter(|(_, a)| a.component == component && !a.is_consumed())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn record(&mut self, record: AllocationRecord) {
        self.log.push(record);
    }

    pub fn log(&self) -> &AllocationLog {
        &self.log
    }

    /// Tear down into `(assignments, arrivals, log)`.
    ///
    /// Assignments are ordered by catalog component, then lane, then
    /// changeout date.
    pub fn into_parts(self) -> (Vec<LaneAssignment>, Vec<ArrivalEvent>, AllocationLog) {
        let mut assignments = Vec::new();
        for (_, mut timeline) in self.timelines {
            timeline.sort_by(|a, b| {
                a.lane_id
                    .cmp(&b.lane_id)
                    .then(a.changeout_date.cmp(&b.changeout_date))
            });
            assignments.extend(timeline);
        }
        (assignments, self.arrivals, self.log)
    }
}
