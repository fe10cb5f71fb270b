//! # pool-engine
//!
//! Deterministic pool slot allocation for mining component changeouts.
//!
//! A mine keeps a finite set of physical "pool lanes", each holding one
//! component while it is away for overhaul. The engine assigns incoming
//! changeouts to lanes, projects when each lane frees up again, and
//! reconciles those projections against real arrivals as they are reported.
//! It is a greedy, week-by-week online heuristic, recomputed from scratch on
//! every input refresh.
//!
//! ## Modules
//!
//! - [`catalog`]: Static component types and overhaul durations
//! - [`projector`]: Projected lane-free dates
//! - [`priority`]: Canonical changeout ordering and deduplication
//! - [`finder`]: Free lanes at a date
//! - [`selector`]: Most-time-unchanged tie-break
//! - [`reconciler`]: Arrival-to-assignment matching
//! - [`driver`]: The allocation loop (`generate_pool_projection`)
//! - [`model`]: Changeouts, arrivals, lane assignments
//! - [`state`]: Mutable state of one run
//! - [`events`]: Structured allocation log
//! - [`table`]: CSV wire format of inputs and output
//! - [`config`]: Run configuration
//! - [`week`]: ISO year-week labels
//! - [`error`]: Error types

pub mod catalog;
pub mod config;
pub mod driver;
pub mod error;
pub mod events;
pub mod finder;
pub mod model;
pub mod priority;
pub mod projector;
pub mod reconciler;
pub mod selector;
pub mod state;
pub mod table;
pub mod week;

pub use catalog::{ComponentKind, ComponentType};
pub use config::ProjectionConfig;
pub use driver::{generate_pool_projection, PoolProjection, ProjectionInputs};
pub use error::PoolError;
pub use events::{AllocationLog, AllocationRecord};
pub use model::{ArrivalEvent, ArrivalStatus, ChangeoutEvent, ChangeoutType, LaneAssignment, LaneId};
pub use week::IsoWeek;
