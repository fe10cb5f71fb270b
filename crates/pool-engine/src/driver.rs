//! The allocation driver: per component, per week, allocate changeouts to
//! lanes and reconcile arrivals.
//!
//! The run is single-threaded and deterministic. Identical inputs produce an
//! identical output table and log.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::catalog::ComponentKind;
use crate::config::ProjectionConfig;
use crate::error::Result;
use crate::events::{AllocationLog, AllocationRecord, UnallocatedReason, UnmatchedReason};
use crate::finder::find_available_lanes;
use crate::model::{
    ArrivalEvent, ArrivalStatus, BaselineRecord, ChangeoutEvent, ChangeoutType, LaneAssignment,
};
use crate::priority::priority_sort;
use crate::projector::project_arrival;
use crate::reconciler::{reconcile_arrival, reconcile_earliest};
use crate::selector::{days_unchanged, select_most_time_unchanged};
use crate::state::AllocationState;
use crate::table::RejectedRow;
use crate::week::IsoWeek;

/// The three input tables, already parsed.
#[derive(Debug, Clone, Default)]
pub struct ProjectionInputs {
    pub changeouts: Vec<ChangeoutEvent>,
    pub baseline: Vec<BaselineRecord>,
    pub arrivals: Vec<ArrivalEvent>,
    /// Rows dropped while parsing; copied into the allocation log.
    pub rejected: Vec<RejectedRow>,
}

/// Result of a projection run.
#[derive(Debug, Clone, Serialize)]
pub struct PoolProjection {
    /// Every lane assignment, ordered by component, lane, changeout date.
    pub assignments: Vec<LaneAssignment>,
    /// Arrivals after reconciliation, with `consuming_lane` filled in.
    pub arrivals: Vec<ArrivalEvent>,
    pub log: AllocationLog,
}

/// Key joining changeouts to the baseline history.
type BaselineKey = (String, ComponentKind, String, IsoWeek);

fn changeout_key(c: &ChangeoutEvent) -> BaselineKey {
    (
        c.equipment_id.clone(),
        c.component,
        c.component_serial.clone(),
        c.changeout_week,
    )
}

fn baseline_key(b: &BaselineRecord) -> BaselineKey {
    (
        b.equipment_id.clone(),
        b.component,
        b.component_serial.clone(),
        b.changeout_week,
    )
}

/// Turn baseline rows into lane assignments, enriched from the changeouts
/// table.
///
/// A matching changeout's type, date and subcomponent take precedence over
/// the baseline's own cells. Rows with a recorded arrival are Historical;
/// the rest are Unconfirmed projections.
///
/// # Errors
/// Returns `PoolError::DateOverflow` if a projection leaves the calendar.
pub fn baseline_assignments(
    baseline: &[BaselineRecord],
    changeouts: &[ChangeoutEvent],
    config: &ProjectionConfig,
) -> Result<Vec<LaneAssignment>> {
    let by_key: HashMap<BaselineKey, &ChangeoutEvent> =
        changeouts.iter().map(|c| (changeout_key(c), c)).collect();

    baseline
        .iter()
        .map(|b| {
            let matched = by_key.get(&baseline_key(b)).copied();
            let changeout_type = matched
                .and_then(|c| c.changeout_type)
                .or(b.changeout_type)
                .unwrap_or(ChangeoutType::Planned);
            let changeout_date = matched
                .map(|c| c.changeout_date)
                .or(b.changeout_date)
                .unwrap_or_else(|| b.changeout_week.monday());
            let subcomponent = matched.map(|c| c.subcomponent.clone()).unwrap_or_default();
            let arrival_date = b
                .arrival_date
                .or_else(|| b.arrival_week.map(|w| w.monday()));
            let projection = project_arrival(
                b.component,
                &subcomponent,
                changeout_type,
                changeout_date,
                config.expected_block_days,
            )?;
            Ok(LaneAssignment {
                lane_id: b.lane_id.clone(),
                component: b.component,
                subcomponent,
                equipment_id: b.equipment_id.clone(),
                component_serial: b.component_serial.clone(),
                changeout_date,
                changeout_week: IsoWeek::of(changeout_date),
                changeout_type,
                arrival_date,
                projected_arrival_date: projection.arrival_date,
                projected_arrival_week: projection.arrival_week,
                arrival_status: if arrival_date.is_some() {
                    ArrivalStatus::Historical
                } else {
                    ArrivalStatus::Unconfirmed
                },
            })
        })
        .collect()
}

/// Changeouts the baseline does not already hold and that need a lane.
///
/// Keeps changeouts on or after the horizon whose type is not `None`.
/// Input order (the priority order) is preserved.
pub fn missing_changeouts(
    changeouts: &[ChangeoutEvent],
    baseline: &[BaselineRecord],
    config: &ProjectionConfig,
) -> Vec<ChangeoutEvent> {
    let known: HashSet<BaselineKey> = baseline.iter().map(baseline_key).collect();
    changeouts
        .iter()
        .filter(|c| c.changeout_date >= config.horizon_start)
        .filter(|c| c.changeout_type != Some(ChangeoutType::None))
        .filter(|c| !known.contains(&changeout_key(c)))
        .cloned()
        .collect()
}

/// Arrivals the engine still has to reconcile.
///
/// Drops arrivals before the horizon and arrivals whose
/// `(component, arrival_week)` the baseline already records.
pub fn pending_arrivals(
    arrivals: &[ArrivalEvent],
    baseline: &[BaselineRecord],
    config: &ProjectionConfig,
) -> Vec<ArrivalEvent> {
    let recorded: HashSet<(ComponentKind, IsoWeek)> = baseline
        .iter()
        .filter_map(|b| {
            b.arrival_week
                .or_else(|| b.arrival_date.map(IsoWeek::of))
                .map(|w| (b.component, w))
        })
        .collect();
    arrivals
        .iter()
        .filter(|a| a.arrival_date >= config.horizon_start)
        .filter(|a| !recorded.contains(&(a.component, a.arrival_week)))
        .cloned()
        .collect()
}

/// Run the pool slot allocation.
///
/// For every component, walks the ascending union of changeout and arrival
/// weeks. Within a week, arrivals are reconciled first, then changeouts are
/// placed in priority order. A changeout with no free lane reconciles pending
/// arrivals dated before it, earliest first, re-searching after each match.
/// If no lane frees up it is logged as `Unallocated` and skipped. Arrivals
/// still unconsumed after the last week are logged as `ArrivalUnmatched`.
///
/// # Errors
/// Returns `PoolError::InvalidConfig` for an invalid config and
/// `PoolError::DateOverflow` if a projected arrival leaves the calendar.
pub fn generate_pool_projection(
    inputs: &ProjectionInputs,
    config: &ProjectionConfig,
) -> Result<PoolProjection> {
    config.validate()?;
    let span = info_span!("generate_pool_projection", horizon = %config.horizon_start);
    let _guard = span.enter();

    let changeouts = priority_sort(inputs.changeouts.clone());
    let assignments = baseline_assignments(&inputs.baseline, &changeouts, config)?;
    let mut missing = missing_changeouts(&changeouts, &inputs.baseline, config);
    missing.sort_by_key(|c| (c.component, c.changeout_date));
    let arrivals = pending_arrivals(&inputs.arrivals, &inputs.baseline, config);

    let mut state = AllocationState::new(assignments, arrivals);
    for rejected in &inputs.rejected {
        warn!(table = rejected.table, row = rejected.row, reason = %rejected.reason, "row rejected");
        state.record(AllocationRecord::Rejected {
            table: rejected.table,
            row: rejected.row,
            reason: rejected.reason.clone(),
        });
    }

    for component in ComponentKind::ALL {
        let component_changeouts: Vec<&ChangeoutEvent> =
            missing.iter().filter(|c| c.component == component).collect();
        allocate_component(&mut state, component, &component_changeouts, config)?;
    }

    let (assignments, arrivals, log) = state.into_parts();
    info!(
        assignments = assignments.len(),
        allocated = log.allocated_count(),
        unallocated = log.unallocated().count(),
        "pool projection complete"
    );
    Ok(PoolProjection {
        assignments,
        arrivals,
        log,
    })
}

fn allocate_component(
    state: &mut AllocationState,
    component: ComponentKind,
    changeouts: &[&ChangeoutEvent],
    config: &ProjectionConfig,
) -> Result<()> {
    let weeks: BTreeSet<IsoWeek> = changeouts
        .iter()
        .map(|c| c.changeout_week)
        .chain(
            state
                .arrivals()
                .iter()
                .filter(|a| a.component == component)
                .map(|a| a.arrival_week),
        )
        .collect();
    if weeks.is_empty() {
        return Ok(());
    }
    debug!(component = %component, weeks = weeks.len(), "allocating component");

    let logged_before = state.log().len();
    for week in weeks {
        debug!(component = %component, week = %week, "processing week");
        apply_week_arrivals(state, component, week);
        for changeout in changeouts.iter().filter(|c| c.changeout_week == week) {
            allocate_changeout(state, changeout, config)?;
        }
    }

    for index in state.unconsumed_arrivals(component) {
        let arrival_date = state.arrivals()[index].arrival_date;
        debug!(component = %component, arrival = %arrival_date, "arrival left unmatched");
        state.record(AllocationRecord::ArrivalUnmatched {
            component,
            arrival_date,
            reason: UnmatchedReason::NoOpenAssignment,
        });
    }

    let records = &state.log().records()[logged_before..];
    let allocated = records
        .iter()
        .filter(|r| matches!(r, AllocationRecord::Allocated { .. }))
        .count();
    info!(
        component = %component,
        changeouts = changeouts.len(),
        allocated,
        unallocated = changeouts.len() - allocated,
        assignments = state.timeline(component).len(),
        "component allocated"
    );
    Ok(())
}

fn apply_week_arrivals(state: &mut AllocationState, component: ComponentKind, week: IsoWeek) {
    let due: Vec<usize> = state
        .unconsumed_arrivals(component)
        .into_iter()
        .filter(|&i| state.arrivals()[i].arrival_week == week)
        .collect();
    for index in due {
        if reconcile_arrival(state, index).is_none() {
            debug!(component = %component, week = %week, "arrival has no open assignment yet");
        }
    }
}

fn allocate_changeout(
    state: &mut AllocationState,
    changeout: &ChangeoutEvent,
    config: &ProjectionConfig,
) -> Result<()> {
    let component = changeout.component;
    let date = changeout.changeout_date;

    let mut free = find_available_lanes(state.timeline(component), date);
    while free.is_empty() {
        if reconcile_earliest(state, component, date).is_none() {
            break;
        }
        free = find_available_lanes(state.timeline(component), date);
    }

    if free.is_empty() {
        warn!(changeout = %changeout.id(), "no pool lane available");
        state.record(AllocationRecord::Unallocated {
            changeout: changeout.id(),
            component,
            week: changeout.changeout_week,
            reason: UnallocatedReason::NoLaneAvailable,
        });
        return Ok(());
    }

    let chosen = select_most_time_unchanged(&free, component, date)?;
    let lane_id = chosen.lane_id.clone();
    let idle_days = days_unchanged(chosen, date);
    let changeout_type = changeout.effective_type();
    let projection = project_arrival(
        component,
        &changeout.subcomponent,
        changeout_type,
        date,
        config.expected_block_days,
    )?;

    debug!(
        changeout = %changeout.id(),
        lane = %lane_id,
        days_unchanged = idle_days,
        projected = %projection.arrival_date,
        "changeout allocated"
    );
    state.push_assignment(LaneAssignment {
        lane_id: lane_id.clone(),
        component,
        subcomponent: changeout.subcomponent.clone(),
        equipment_id: changeout.equipment_id.clone(),
        component_serial: changeout.component_serial.clone(),
        changeout_date: date,
        changeout_week: changeout.changeout_week,
        changeout_type,
        arrival_date: None,
        projected_arrival_date: projection.arrival_date,
        projected_arrival_week: projection.arrival_week,
        arrival_status: ArrivalStatus::Unconfirmed,
    });
    state.record(AllocationRecord::Allocated {
        changeout: changeout.id(),
        component,
        week: changeout.changeout_week,
        lane: lane_id,
        days_unchanged: idle_days,
        projected_arrival: projection.arrival_date,
    });
    Ok(())
}

