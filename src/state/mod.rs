//! State module - drill-down selection and per-session scoping

mod selection;
mod session;

pub use selection::{ChartId, Selection, SelectionEvent};
pub use session::{SessionId, SessionRegistry};
