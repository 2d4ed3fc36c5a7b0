//! Per-session selection state.
//!
//! The row set is shared and read-only; every session owns its selection so
//! concurrent viewers never see each other's drill-down.

use crate::state::selection::{resolve, Selection, SelectionEvent};
use std::collections::HashMap;

pub type SessionId = u64;

/// One viewer's selection.
#[derive(Debug, Clone, Default)]
pub struct Session {
    selection: Selection,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Resolve a batch of events. Returns true when the selection changed.
    pub fn apply(&mut self, events: &[SelectionEvent]) -> bool {
        let next = resolve(&self.selection, events);
        if next == self.selection {
            return false;
        }
        self.selection = next;
        true
    }
}

/// Sessions keyed by id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
    next_id: SessionId,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fresh session and return its id.
    pub fn open(&mut self) -> SessionId {
        let id = self.next_id;
        self.next_id += 1;
        self.sessions.insert(id, Session::new());
        id
    }

    pub fn close(&mut self, id: SessionId) -> Option<Session> {
        self.sessions.remove(&id)
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Apply a batch to one session. Unknown ids are a no-op returning None.
    pub fn dispatch(&mut self, id: SessionId, events: &[SelectionEvent]) -> Option<bool> {
        self.sessions.get_mut(&id).map(|session| session.apply(events))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ChartId;

    #[test]
    fn apply_reports_changes() {
        let mut session = Session::new();
        assert!(session.apply(&[SelectionEvent::YearChanged(Some(2019))]));
        assert!(!session.apply(&[SelectionEvent::YearChanged(Some(2019))]));
        assert!(!session.apply(&[]));
        assert_eq!(session.selection().year, Some(2019));
    }

    #[test]
    fn sessions_do_not_share_selection() {
        let mut registry = SessionRegistry::new();
        let a = registry.open();
        let b = registry.open();
        assert_ne!(a, b);

        let click = SelectionEvent::ChartClicked {
            chart: ChartId::ConstituencyTime,
            category: Some("Delhi".to_string()),
            year: Some(2024),
        };
        assert_eq!(registry.dispatch(a, &[click]), Some(true));

        assert_eq!(
            registry.get(a).unwrap().selection(),
            &Selection::new(Some(2024), Some("Delhi".to_string()))
        );
        assert_eq!(registry.get(b).unwrap().selection(), &Selection::default());

        assert!(registry.close(a).is_some());
        assert_eq!(registry.dispatch(a, &[]), None);
        assert!(registry.get(a).is_none());
        assert_eq!(registry.len(), 1);

        // A replacement session starts from "all years, all constituencies".
        let c = registry.open();
        assert_ne!(c, a);
        assert_eq!(registry.get(c).unwrap().selection(), &Selection::default());
    }
}
