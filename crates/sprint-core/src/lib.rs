//! `sprint-core`: foundational types for the sprint sustainability simulator.
//!
//! Every other `sprint-*` crate depends on this one.  It has no `sprint-*`
//! dependencies and only `rand` and `thiserror` externally (plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                |
//! |--------------|---------------------------------------------------------|
//! | [`ids`]      | `TicketId`, `WorkerId`                                  |
//! | [`time`]     | `DayTime`, `DAY_MINUTES`                                |
//! | [`config`]   | `SimConfig` and its validation                          |
//! | [`role`]     | `Role` (programmer or tester)                           |
//! | [`rng`]      | `WorkerRng` (per-worker), `SimRng` (global)             |
//! | [`error`]    | `CoreError`, `CoreResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod role;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::SimConfig;
pub use error::{CoreError, CoreResult};
pub use ids::{TicketId, WorkerId};
pub use rng::{SimRng, WorkerRng};
pub use role::Role;
pub use time::{DAY_MINUTES, DayTime};
