// Roster table and manual attendance toggles.

pub mod book;
#[cfg(feature = "desktop")]
pub mod commands;
pub mod table;
pub mod toggle;

pub use book::RosterBook;
pub use table::{RosterRow, RosterState, RosterTable};
pub use toggle::{ToggleController, ToggleOutcome};
