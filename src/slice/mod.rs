//! Nexus Domain Slices
//!
//! A slice owns one partition of application state (weather, crypto or news):
//!
//! - **state**: `SliceState`, `LoadStatus` and the events slices publish
//! - **favorites**: the toggle rule and the favorited/others partition
//! - **engine**: `Slice`, the fetch state machine around a gateway
//!
//! # Lifecycle
//!
//! ```text
//!   Idle ──fetch──▶ Pending ──ok──▶ Succeeded ──fetch──▶ Pending ...
//!                      └────err──▶ Failed    ──fetch──▶ Pending ...
//! ```
//!
//! A failed fetch keeps the previous data. Favorites are only touched by
//! `toggle_favorite` and outlive any refresh.

pub mod engine;
pub mod favorites;
pub mod state;

pub use engine::{FetchOutcome, Slice};
pub use favorites::{partition, toggle, Partition};
pub use state::{LoadStatus, SliceEvent, SliceState};
