//! Overhaul duration projection: when does an occupied lane become free?

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::catalog::{self, ComponentKind};
use crate::error::{PoolError, Result};
use crate::model::ChangeoutType;
use crate::week::IsoWeek;

/// A projected lane-free date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub overhaul_days: i64,
    pub arrival_date: NaiveDate,
    pub arrival_week: IsoWeek,
}

/// Overhaul duration in days for a changeout.
///
/// Rules, first match wins:
/// 1. Expected changeouts block for `expected_block_days`.
/// 2. A subcomponent override of the component (e.g. the alternator of a
///    power module) supplies its own planned/unplanned days.
/// 3. The component's own planned/unplanned days.
///
/// Anything that is not `Planned` uses the unplanned duration.
pub fn overhaul_days(
    component: ComponentKind,
    subcomponent: &str,
    changeout_type: ChangeoutType,
    expected_block_days: i64,
) -> i64 {
    if changeout_type == ChangeoutType::Expected {
        return expected_block_days;
    }
    let planned = changeout_type == ChangeoutType::Planned;
    if let Some(o) = component.subcomponent_override(subcomponent) {
        return if planned {
            o.planned_overhaul_days
        } else {
            o.unplanned_overhaul_days
        };
    }
    let ty = component.component_type();
    if planned {
        ty.planned_overhaul_days
    } else {
        ty.unplanned_overhaul_days
    }
}

/// Project the arrival of a component removed on `changeout_date`.
///
/// # Errors
/// Returns `PoolError::DateOverflow` if the projected date is out of range.
pub fn project_arrival(
    component: ComponentKind,
    subcomponent: &str,
    changeout_type: ChangeoutType,
    changeout_date: NaiveDate,
    expected_block_days: i64,
) -> Result<Projection> {
    let days = overhaul_days(component, subcomponent, changeout_type, expected_block_days);
    let arrival_date = Duration::try_days(days)
        .and_then(|delta| changeout_date.checked_add_signed(delta))
        .ok_or(PoolError::DateOverflow {
            date: changeout_date,
            days,
        })?;
    Ok(Projection {
        overhaul_days: days,
        arrival_date,
        arrival_week: IsoWeek::of(arrival_date),
    })
}

/// Like [`project_arrival`], resolving a raw component code first.
///
/// # Errors
/// Returns `PoolError::MissingData` if `component_code` is not in the catalog,
/// and `PoolError::DateOverflow` as [`project_arrival`] does.
pub fn project_arrival_for_code(
    component_code: &str,
    subcomponent: &str,
    changeout_type: ChangeoutType,
    changeout_date: NaiveDate,
    expected_block_days: i64,
) -> Result<Projection> {
    let component = catalog::lookup(component_code)?;
    project_arrival(
        component,
        subcomponent,
        changeout_type,
        changeout_date,
        expected_block_days,
    )
}
