use std::collections::HashMap;

use parking_lot::Mutex;

use crate::api::AttendanceApi;
use crate::model::{AttendanceId, SessionKey};
use crate::roster::table::{RosterRow, RosterTable};
use crate::roster::toggle::{ToggleController, ToggleOutcome};

/// Roster tables currently shown, by session.
///
/// The map is only locked for lookups and writes, never while a request or
/// a confirmation is pending, so one slow toggle does not hold up the rest.
#[derive(Default)]
pub struct RosterBook {
    tables: Mutex<HashMap<SessionKey, RosterTable>>,
}

impl RosterBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a session's table.
    pub fn table(&self, session: &SessionKey) -> Option<RosterTable> {
        self.tables.lock().get(session).cloned()
    }

    pub fn insert(&self, table: RosterTable) {
        self.tables
            .lock()
            .insert(table.session_key.clone(), table);
    }

    /// Fetch a session's roster and replace its table.
    pub async fn load(
        &self,
        api: &dyn AttendanceApi,
        session: SessionKey,
        show_time: bool,
    ) -> RosterTable {
        let mut table = RosterTable::loading(session, show_time);
        table.load(api).await;
        self.insert(table.clone());
        table
    }

    /// Toggle one row. The toggle runs on a copy of the row; the result is
    /// written back by id if the row is still shown.
    ///
    /// Returns `None` when the session or record is not displayed.
    pub async fn toggle(
        &self,
        controller: &ToggleController,
        session: &SessionKey,
        id: &AttendanceId,
    ) -> Option<(ToggleOutcome, RosterRow)> {
        let mut row = self.tables.lock().get(session)?.row(id)?.clone();

        let outcome = controller.toggle(&mut row).await;

        if let Some(slot) = self
            .tables
            .lock()
            .get_mut(session)
            .and_then(|table| table.row_mut(id))
        {
            *slot = row.clone();
        }
        Some((outcome, row))
    }
}
