use sprint_core::{Role, TicketId};
use sprint_workflow::WorkflowState;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("event [{start}, {end}) on day {day} does not fit in any free slot")]
    SchedulingConflict { day: u32, start: u32, end: u32 },

    #[error("no calendar capacity left for ticket {ticket} ({remaining} minutes unplaced)")]
    CapacityExceeded { ticket: TicketId, remaining: u32 },

    #[error("custom events cover {got} days but the run has {expected}")]
    ConfigurationMismatch { expected: usize, got: usize },

    #[error("ticket {0} has no minutes left in its active iteration")]
    EmptyIteration(TicketId),

    #[error("a {role} has nothing to do on ticket {ticket} in state {state:?}")]
    WrongStage {
        ticket: TicketId,
        role:   Role,
        state:  WorkflowState,
    },

    #[error("custom event parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
