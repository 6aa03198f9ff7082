use sprint_core::{Role, TicketId};
use thiserror::Error;

use crate::WorkflowState;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("invalid ticket {id}: {reason}")]
    InvalidTicket { id: TicketId, reason: String },

    #[error("ticket {0} is not tracked by the router")]
    UnknownTicket(TicketId),

    #[error("a {role} cannot complete work on ticket {id} in state {state:?}")]
    WrongStage {
        id:    TicketId,
        role:  Role,
        state: WorkflowState,
    },

    #[error("cannot build the {name} distribution: {reason}")]
    Distribution { name: &'static str, reason: String },
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
