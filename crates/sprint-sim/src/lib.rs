//! `sprint-sim`: the sprint simulation driver and its post-run analysis.
//!
//! # Step loop
//!
//! ```text
//! now = earliest free minute of any worker
//! loop:
//!   ① Harvest    : workers whose iteration completes at `now` hand the
//!                   ticket back to the router.
//!   ② Programmers: every idle programmer free at `now` claims a review or
//!                   a passed-back fix, or starts a brand new ticket.
//!   ③ Backfill   : testers' free time before `now` becomes Nothing.
//!   ④ Testers    : every idle tester free at `now` claims a check or an
//!                   automation job, if any exists.
//!   ⑤ Advance    : `now` = earliest upcoming completion or free minute.
//!                   Ends when nothing is coming up, or when only testers
//!                   remain and there is nothing left for them to do.
//! ```
//!
//! After the last step the pools are closed, per-worker minute ledgers are
//! built, and the [`projector`] estimates how many sprints remain before
//! regression checking swallows all tester time.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use sprint_core::SimConfig;
//! use sprint_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(SimConfig::default()).build()?;
//! let report = sim.run(&mut NoopObserver)?;
//! println!("{}", report.projection);
//! ```

pub mod builder;
pub mod error;
pub mod ledger;
pub mod observer;
pub mod projector;
pub mod sim;
pub mod timeline;
pub mod worker;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use ledger::MinuteLedger;
pub use observer::{NoopObserver, SimObserver};
pub use projector::{Projection, ProjectionReport, SustainabilityProjector};
pub use sim::Simulation;
pub use timeline::{PoolSnapshot, PoolTimeline};
pub use worker::Worker;
