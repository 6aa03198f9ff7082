//! Worker roles.

use std::fmt;

/// What kind of work a worker pulls from the workflow.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    /// Writes code and reviews peers' code.
    Programmer,
    /// Checks tickets, automates the checks, and runs regression.
    Tester,
}

impl Role {
    #[inline]
    pub fn is_tester(self) -> bool {
        matches!(self, Role::Tester)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Programmer => f.write_str("programmer"),
            Role::Tester => f.write_str("tester"),
        }
    }
}
