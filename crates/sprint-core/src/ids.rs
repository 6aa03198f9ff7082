//! Typed ids for tickets and workers.
//!
//! `WorkerId` is also the worker's position in the simulation's worker list
//! (programmers first, then testers), so it indexes per-worker vectors such
//! as minute ledgers directly.

use std::fmt;

macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty) => $prefix:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }
    };
}

typed_id! {
    /// Ticket number.  Generated tickets are numbered upward from 100.
    pub struct TicketId(u32) => "TKT";
}

typed_id! {
    pub struct WorkerId(u32) => "W";
}
