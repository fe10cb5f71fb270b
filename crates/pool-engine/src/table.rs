//! CSV wire format of the input and output tables.
//!
//! Column names are the contract with the ingestion and dashboard sides.
//! Headers are validated before any row is read: a table missing a required
//! column fails the whole run. Rows naming a component the catalog does not
//! know are rejected individually and reported back.

use std::collections::HashMap;
use std::io::{Read, Write};

use chrono::NaiveDate;
use serde::Serialize;

use crate::catalog::{self, normalize_label};
use crate::driver::{PoolProjection, ProjectionInputs};
use crate::error::{PoolError, Result};
use crate::model::{ArrivalEvent, ArrivalStatus, BaselineRecord, ChangeoutEvent, ChangeoutType, LaneId};
use crate::week::IsoWeek;

pub const CHANGEOUTS_TABLE: &str = "changeouts";
pub const BASELINE_TABLE: &str = "baseline";
pub const ARRIVALS_TABLE: &str = "arrivals";

pub const CHANGEOUT_COLUMNS: &[&str] = &[
    "equipo",
    "component",
    "subcomponent",
    "position",
    "component_serial",
    "changeout_week",
    "changeout_date",
    "component_hours",
    "tbo_hours",
    "pool_changeout_type",
];

pub const BASELINE_COLUMNS: &[&str] = &[
    "pool_slot",
    "component",
    "component_serial",
    "equipo",
    "changeout_week",
    "changeout_date",
    "arrival_week",
    "arrival_date",
    "pool_changeout_type",
];

/// `pool_slot` is optional on arrivals; when present it marks the arrival
/// as already consumed.
pub const ARRIVAL_COLUMNS: &[&str] = &["component", "arrival_week", "arrival_date"];

pub const OUTPUT_COLUMNS: &[&str] = &[
    "pool_slot",
    "component",
    "subcomponent",
    "equipo",
    "component_serial",
    "changeout_date",
    "changeout_week",
    "pool_changeout_type",
    "arrival_date",
    "arrival_date_proj",
    "arrival_week_proj",
    "arrival_status",
    "componente",
];

/// An input row dropped before allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub table: &'static str,
    /// 1-based, header excluded.
    pub row: usize,
    pub reason: String,
}

/// Rows parsed from one table plus the rows that were rejected.
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub rows: Vec<T>,
    pub rejected: Vec<RejectedRow>,
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

/// Column positions of a validated header.
struct Header {
    table: &'static str,
    index: HashMap<String, usize>,
}

impl Header {
    fn validate(table: &'static str, headers: &csv::StringRecord, required: &[&str]) -> Result<Self> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_lowercase(), i))
            .collect();
        let missing: Vec<String> = required
            .iter()
            .filter(|c| !index.contains_key(**c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(PoolError::MissingColumns {
                table,
                columns: missing,
            });
        }
        Ok(Self { table, index })
    }

    /// Trimmed cell, or `""` when the column is absent or the row is short.
    fn cell<'r>(&self, record: &'r csv::StringRecord, column: &str) -> &'r str {
        self.index
            .get(column)
            .and_then(|&i| record.get(i))
            .map(str::trim)
            .unwrap_or("")
    }

    fn invalid(&self, row: usize, message: String) -> PoolError {
        PoolError::InvalidRecord {
            table: self.table,
            row,
            message,
        }
    }

    fn date(&self, record: &csv::StringRecord, column: &str, row: usize) -> Result<Option<NaiveDate>> {
        let raw = self.cell(record, column);
        parse_date(raw).map_err(|_| self.invalid(row, format!("{}: invalid date '{}'", column, raw)))
    }

    fn week(&self, record: &csv::StringRecord, column: &str, row: usize) -> Result<Option<IsoWeek>> {
        let raw = self.cell(record, column);
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse()
            .map(Some)
            .map_err(|_| self.invalid(row, format!("{}: invalid week '{}'", column, raw)))
    }

    fn changeout_type(&self, record: &csv::StringRecord, row: usize) -> Result<Option<ChangeoutType>> {
        ChangeoutType::parse_cell(self.cell(record, "pool_changeout_type"))
            .map_err(|e| self.invalid(row, e.to_string()))
    }
}

/// Parse a date cell. Accepts `YYYY-MM-DD`, optionally followed by a time
/// (as spreadsheet exports write it), and `DD/MM/YYYY`.
fn parse_date(raw: &str) -> std::result::Result<Option<NaiveDate>, chrono::ParseError> {
    if raw.is_empty() {
        return Ok(None);
    }
    let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%d/%m/%Y"))
        .map(Some)
}

/// Equipment ids are the digits of the cell (`CAEX 856` → `856`).
fn equipment_id(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        raw.trim().to_string()
    } else {
        digits
    }
}

fn serial(raw: &str) -> String {
    raw.replace('\t', "").trim().to_string()
}

fn optional_f64(raw: &str) -> Option<f64> {
    raw.parse().ok()
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input)
}

/// Read the changeouts table.
pub fn read_changeouts<R: Read>(input: R) -> Result<Parsed<ChangeoutEvent>> {
    let mut rdr = reader(input);
    let header = Header::validate(CHANGEOUTS_TABLE, rdr.headers()?, CHANGEOUT_COLUMNS)?;
    let mut parsed = Parsed::default();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 1;
        let component = match catalog::lookup(header.cell(&record, "component")) {
            Ok(c) => c,
            Err(e) => {
                parsed.rejected.push(RejectedRow {
                    table: CHANGEOUTS_TABLE,
                    row,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let Some(changeout_date) = header.date(&record, "changeout_date", row)? else {
            parsed.rejected.push(RejectedRow {
                table: CHANGEOUTS_TABLE,
                row,
                reason: "missing changeout_date".to_string(),
            });
            continue;
        };
        parsed.rows.push(ChangeoutEvent {
            equipment_id: equipment_id(header.cell(&record, "equipo")),
            component,
            subcomponent: normalize_label(header.cell(&record, "subcomponent")),
            position: header.cell(&record, "position").to_string(),
            component_serial: serial(header.cell(&record, "component_serial")),
            changeout_date,
            changeout_week: IsoWeek::of(changeout_date),
            changeout_type: header.changeout_type(&record, row)?,
            component_hours: optional_f64(header.cell(&record, "component_hours")),
            tbo_hours: optional_f64(header.cell(&record, "tbo_hours")),
        });
    }
    Ok(parsed)
}

/// Read the baseline lane history.
pub fn read_baseline<R: Read>(input: R) -> Result<Parsed<BaselineRecord>> {
    let mut rdr = reader(input);
    let header = Header::validate(BASELINE_TABLE, rdr.headers()?, BASELINE_COLUMNS)?;
    let mut parsed = Parsed::default();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 1;
        let component = match catalog::lookup(header.cell(&record, "component")) {
            Ok(c) => c,
            Err(e) => {
                parsed.rejected.push(RejectedRow {
                    table: BASELINE_TABLE,
                    row,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let slot = header.cell(&record, "pool_slot");
        if slot.is_empty() {
            return Err(header.invalid(row, "pool_slot: empty".to_string()));
        }
        let changeout_date = header.date(&record, "changeout_date", row)?;
        let Some(changeout_week) = header
            .week(&record, "changeout_week", row)?
            .or(changeout_date.map(IsoWeek::of))
        else {
            parsed.rejected.push(RejectedRow {
                table: BASELINE_TABLE,
                row,
                reason: "missing changeout_week and changeout_date".to_string(),
            });
            continue;
        };
        parsed.rows.push(BaselineRecord {
            lane_id: LaneId::new(slot),
            component,
            component_serial: serial(header.cell(&record, "component_serial")),
            equipment_id: equipment_id(header.cell(&record, "equipo")),
            changeout_week,
            changeout_date,
            arrival_week: header.week(&record, "arrival_week", row)?,
            arrival_date: header.date(&record, "arrival_date", row)?,
            changeout_type: header.changeout_type(&record, row)?,
        });
    }
    Ok(parsed)
}

/// Read the arrivals table.
///
/// A missing `arrival_date` is the Monday of `arrival_week`; a missing
/// `arrival_week` is derived from the date. Rows with neither are rejected.
pub fn read_arrivals<R: Read>(input: R) -> Result<Parsed<ArrivalEvent>> {
    let mut rdr = reader(input);
    let header = Header::validate(ARRIVALS_TABLE, rdr.headers()?, ARRIVAL_COLUMNS)?;
    let mut parsed = Parsed::default();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 1;
        let component = match catalog::lookup(header.cell(&record, "component")) {
            Ok(c) => c,
            Err(e) => {
                parsed.rejected.push(RejectedRow {
                    table: ARRIVALS_TABLE,
                    row,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let week = header.week(&record, "arrival_week", row)?;
        let date = header.date(&record, "arrival_date", row)?;
        let (arrival_week, arrival_date) = match (week, date) {
            (Some(w), Some(d)) => (w, d),
            (Some(w), None) => (w, w.monday()),
            (None, Some(d)) => (IsoWeek::of(d), d),
            (None, None) => {
                parsed.rejected.push(RejectedRow {
                    table: ARRIVALS_TABLE,
                    row,
                    reason: "missing arrival_week and arrival_date".to_string(),
                });
                continue;
            }
        };
        let slot = header.cell(&record, "pool_slot");
        parsed.rows.push(ArrivalEvent {
            component,
            arrival_week,
            arrival_date,
            consuming_lane: (!slot.is_empty()).then(|| LaneId::new(slot)),
        });
    }
    Ok(parsed)
}

/// Read all three tables into engine inputs.
pub fn read_inputs<C: Read, B: Read, A: Read>(
    changeouts: C,
    baseline: B,
    arrivals: A,
) -> Result<ProjectionInputs> {
    let changeouts = read_changeouts(changeouts)?;
    let baseline = read_baseline(baseline)?;
    let arrivals = read_arrivals(arrivals)?;

    let mut rejected = changeouts.rejected;
    rejected.extend(baseline.rejected);
    rejected.extend(arrivals.rejected);

    Ok(ProjectionInputs {
        changeouts: changeouts.rows,
        baseline: baseline.rows,
        arrivals: arrivals.rows,
        rejected,
    })
}

/// One row of the consolidated output table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionRow {
    pub pool_slot: LaneId,
    pub component: String,
    pub subcomponent: String,
    pub equipo: String,
    pub component_serial: String,
    pub changeout_date: NaiveDate,
    pub changeout_week: IsoWeek,
    pub pool_changeout_type: ChangeoutType,
    /// Real arrival when known, otherwise the projection.
    pub arrival_date: NaiveDate,
    pub arrival_date_proj: NaiveDate,
    pub arrival_week_proj: IsoWeek,
    pub arrival_status: ArrivalStatus,
    pub componente: String,
}

/// Flatten a projection into output rows, in assignment order.
pub fn projection_rows(projection: &PoolProjection) -> Vec<ProjectionRow> {
    projection
        .assignments
        .iter()
        .map(|a| ProjectionRow {
            pool_slot: a.lane_id.clone(),
            component: a.component.code().to_string(),
            subcomponent: a.subcomponent.clone(),
            equipo: a.equipment_id.clone(),
            component_serial: a.component_serial.clone(),
            changeout_date: a.changeout_date,
            changeout_week: a.changeout_week,
            pool_changeout_type: a.changeout_type,
            arrival_date: a.reported_arrival_date(),
            arrival_date_proj: a.projected_arrival_date,
            arrival_week_proj: a.projected_arrival_week,
            arrival_status: a.arrival_status,
            componente: a.component.display_name().to_string(),
        })
        .collect()
}

/// Write the consolidated table as CSV, header first.
pub fn write_projection_csv<W: Write>(projection: &PoolProjection, output: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(output);
    let rows = projection_rows(projection);
    if rows.is_empty() {
        wtr.write_record(OUTPUT_COLUMNS)?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
