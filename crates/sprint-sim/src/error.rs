use sprint_core::CoreError;
use sprint_schedule::ScheduleError;
use sprint_workflow::WorkflowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation invariant violated: {0}")]
    InvariantViolation(String),

    #[error("{what} length {got} does not match worker count {expected}")]
    ConfigurationMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error(transparent)]
    Config(#[from] CoreError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

pub type SimResult<T> = Result<T, SimError>;
