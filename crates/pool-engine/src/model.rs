//! Domain records shared by every stage of the allocation.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::catalog::ComponentKind;
use crate::error::PoolError;
use crate::week::IsoWeek;

/// How a component left its equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeoutType {
    /// Scheduled overhaul (`P`).
    Planned,
    /// Failure-driven overhaul (`I`, also accepted as `U`).
    Unplanned,
    /// Anticipated changeout that pre-blocks a lane (`E`).
    Expected,
    /// Excluded from lane accounting (`N`).
    None,
}

impl ChangeoutType {
    pub fn code(self) -> &'static str {
        match self {
            ChangeoutType::Planned => "P",
            ChangeoutType::Unplanned => "I",
            ChangeoutType::Expected => "E",
            ChangeoutType::None => "N",
        }
    }

    /// Parse a possibly empty cell. Empty cells yield `Ok(None)`.
    pub fn parse_cell(raw: &str) -> Result<Option<Self>, PoolError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed.parse().map(Some)
    }
}

impl FromStr for ChangeoutType {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "P" => Ok(ChangeoutType::Planned),
            "I" | "U" => Ok(ChangeoutType::Unplanned),
            "E" => Ok(ChangeoutType::Expected),
            "N" => Ok(ChangeoutType::None),
            _ => Err(PoolError::UnknownChangeoutType(s.to_string())),
        }
    }
}

impl fmt::Display for ChangeoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for ChangeoutType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for ChangeoutType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Lifecycle of a lane assignment's arrival.
///
/// `Historical` and `Confirmed` are terminal; `Unconfirmed` only moves to
/// `Confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalStatus {
    Historical,
    Unconfirmed,
    Confirmed,
}

impl fmt::Display for ArrivalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArrivalStatus::Historical => "historical",
            ArrivalStatus::Unconfirmed => "unconfirmed",
            ArrivalStatus::Confirmed => "confirmed",
        };
        f.write_str(s)
    }
}

/// Identifier of one physical pool lane.
///
/// Ordering is numeric when both ids are integers (`2 < 10`) and lexical
/// otherwise; integers sort before non-integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LaneId(String);

impl LaneId {
    /// Build a lane id, canonicalizing spreadsheet floats such as `6.0`.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw.as_ref().trim();
        let canonical = match trimmed.strip_suffix(".0") {
            Some(int) if !int.is_empty() && int.bytes().all(|b| b.is_ascii_digit()) => int,
            _ => trimmed,
        };
        LaneId(canonical.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Ord for LaneId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for LaneId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for LaneId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LaneId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(LaneId::new)
    }
}

/// One physical component removal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeoutEvent {
    pub equipment_id: String,
    pub component: ComponentKind,
    /// Normalized subcomponent label; empty when not applicable.
    pub subcomponent: String,
    pub position: String,
    pub component_serial: String,
    pub changeout_date: NaiveDate,
    /// ISO week of `changeout_date`.
    pub changeout_week: IsoWeek,
    /// `None` when the sheet left the cell empty.
    pub changeout_type: Option<ChangeoutType>,
    pub component_hours: Option<f64>,
    pub tbo_hours: Option<f64>,
}

/// Identity of a physical changeout, used for deduplication.
pub type ChangeoutKey = (String, ComponentKind, String, NaiveDate);

impl ChangeoutEvent {
    pub fn key(&self) -> ChangeoutKey {
        (
            self.equipment_id.clone(),
            self.component,
            self.position.clone(),
            self.changeout_date,
        )
    }

    /// Declared type, defaulting to Planned when the cell was empty.
    pub fn effective_type(&self) -> ChangeoutType {
        self.changeout_type.unwrap_or(ChangeoutType::Planned)
    }

    /// Human-readable identifier for logs.
    pub fn id(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.equipment_id, self.component, self.position, self.changeout_date
        )
    }
}

/// A component returning to the pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrivalEvent {
    pub component: ComponentKind,
    pub arrival_week: IsoWeek,
    pub arrival_date: NaiveDate,
    /// Lane this arrival was reconciled against. Set once, never cleared.
    pub consuming_lane: Option<LaneId>,
}

impl ArrivalEvent {
    pub fn is_consumed(&self) -> bool {
        self.consuming_lane.is_some()
    }
}

/// A row of the baseline lane history, before enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineRecord {
    pub lane_id: LaneId,
    pub component: ComponentKind,
    pub component_serial: String,
    pub equipment_id: String,
    pub changeout_week: IsoWeek,
    pub changeout_date: Option<NaiveDate>,
    pub arrival_week: Option<IsoWeek>,
    pub arrival_date: Option<NaiveDate>,
    pub changeout_type: Option<ChangeoutType>,
}

/// One occupancy of one lane: the central output record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneAssignment {
    pub lane_id: LaneId,
    pub component: ComponentKind,
    pub subcomponent: String,
    pub equipment_id: String,
    pub component_serial: String,
    pub changeout_date: NaiveDate,
    pub changeout_week: IsoWeek,
    pub changeout_type: ChangeoutType,
    /// Real (historical or confirmed) arrival, if known.
    pub arrival_date: Option<NaiveDate>,
    pub projected_arrival_date: NaiveDate,
    pub projected_arrival_week: IsoWeek,
    pub arrival_status: ArrivalStatus,
}

impl LaneAssignment {
    /// Date from which the lane holding this assignment is free again.
    ///
    /// A real arrival frees the lane. An Expected changeout blocks it until
    /// its projection. Any other assignment without a real arrival keeps
    /// the lane occupied indefinitely.
    pub fn free_from(&self) -> Option<NaiveDate> {
        match (self.arrival_date, self.changeout_type) {
            (Some(date), _) => Some(date),
            (None, ChangeoutType::Expected) => Some(self.projected_arrival_date),
            (None, _) => None,
        }
    }

    /// Arrival as reported downstream: real when known, else projected.
    pub fn reported_arrival_date(&self) -> NaiveDate {
        self.arrival_date.unwrap_or(self.projected_arrival_date)
    }
}
