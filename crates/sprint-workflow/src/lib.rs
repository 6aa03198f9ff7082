//! `sprint-workflow`: tickets and the pools they move through.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                    |
//! |----------------|-------------------------------------------------------------|
//! | [`iteration`]  | `WorkIteration`                                             |
//! | [`ticket`]     | `Ticket`, `WorkPlan`, `WorkflowState`, `WorkStage`          |
//! | [`generator`]  | `TicketGenerator` trait, `RandomTicketGenerator`, `FixedTicketGenerator` |
//! | [`router`]     | `WorkflowRouter`, `Pool`, `PoolContents`                    |
//! | [`error`]      | `WorkflowError`, `WorkflowResult<T>`                        |
//!
//! # Ticket lifecycle (summary)
//!
//! ```text
//! Programming ──▶ CodeReview ──▶ Checking ──▶ Automation ──▶ Automated
//!      ▲      (skipped when solo)     │
//!      └──────────── pass back ───────┘
//! ```
//!
//! A ticket is either held by exactly one worker or sits in exactly one
//! claimable pool.  `Done`, `Automated` and `Unfinished` are append-only
//! record pools.

pub mod error;
pub mod generator;
pub mod iteration;
pub mod router;
pub mod ticket;


pub use error::{WorkflowError, WorkflowResult};
pub use generator::{FixedTicketGenerator, RandomTicketGenerator, TicketGenerator};
pub use iteration::WorkIteration;
pub use router::{Pool, PoolContents, WorkflowRouter};
pub use ticket::{Ticket, WorkPlan, WorkStage, WorkflowState};
