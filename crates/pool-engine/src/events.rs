//! Structured record of everything the allocation decided.
//!
//! One [`AllocationRecord`] per allocation attempt, per arrival outcome and
//! per rejected input row. Callers and tests read this instead of scraping
//! log output.

use chrono::NaiveDate;
use serde::Serialize;

use crate::catalog::ComponentKind;
use crate::model::LaneId;
use crate::week::IsoWeek;

/// Why a changeout received no lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnallocatedReason {
    /// Every lane was occupied and no pending arrival could free one.
    NoLaneAvailable,
}

/// Why an arrival could not be reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// The arrival was still unconsumed once every week of its component
    /// had been processed.
    NoOpenAssignment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AllocationRecord {
    /// A changeout was placed on a lane.
    Allocated {
        changeout: String,
        component: ComponentKind,
        week: IsoWeek,
        lane: LaneId,
        days_unchanged: i64,
        projected_arrival: NaiveDate,
    },
    /// A changeout could not be placed. It is absent from the output table.
    Unallocated {
        changeout: String,
        component: ComponentKind,
        week: IsoWeek,
        reason: UnallocatedReason,
    },
    /// An arrival confirmed an assignment.
    ArrivalConsumed {
        component: ComponentKind,
        arrival_date: NaiveDate,
        lane: LaneId,
        changeout_date: NaiveDate,
        projected_arrival: NaiveDate,
    },
    /// An arrival no assignment consumed by the end of its component.
    ArrivalUnmatched {
        component: ComponentKind,
        arrival_date: NaiveDate,
        reason: UnmatchedReason,
    },
    /// An input row was dropped before allocation.
    Rejected {
        table: &'static str,
        row: usize,
        reason: String,
    },
}

/// Ordered allocation log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AllocationLog {
    records: Vec<AllocationRecord>,
}

impl AllocationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: AllocationRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[AllocationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn allocated_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r, AllocationRecord::Allocated { .. }))
            .count()
    }

    /// Changeouts that received no lane.
    pub fn unallocated(&self) -> impl Iterator<Item = &AllocationRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r, AllocationRecord::Unallocated { .. }))
    }

    pub fn rejected(&self) -> impl Iterator<Item = &AllocationRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r, AllocationRecord::Rejected { .. }))
    }
}
