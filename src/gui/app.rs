//! Turnout Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::args::Args;
use crate::dashboard::DashboardView;
use crate::data::DataStore;
use crate::export;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::state::{Selection, SelectionEvent, SessionId, SessionRegistry};
use egui::SidePanel;
use log::{debug, error, info};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;

/// Data loading result from background thread
enum LoadResult {
    Complete(DataStore),
    Error(String),
}

const LOADER_LOST: &str = "data loading stopped unexpectedly";

/// Non-blocking check of the loader channel. `None` while the thread is
/// still working; a loader that exits without sending is an error.
fn poll_load(rx: &Receiver<LoadResult>) -> Option<LoadResult> {
    match rx.try_recv() {
        Ok(result) => Some(result),
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => Some(LoadResult::Error(LOADER_LOST.to_string())),
    }
}

/// Main application window.
pub struct DashboardApp {
    store: DataStore,
    sessions: SessionRegistry,
    session_id: SessionId,
    view: Option<DashboardView>,
    sheet: Option<String>,

    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async data loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, store: DataStore, args: Args) -> Self {
        let mut sessions = SessionRegistry::new();
        let session_id = sessions.open();

        let mut app = Self {
            store: DataStore::empty(),
            sessions,
            session_id,
            view: None,
            sheet: args.sheet.clone(),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        };

        app.set_store(store, Some(args.data.clone()));

        // One event per batch so both initial filters are applied.
        app.dispatch(&[SelectionEvent::YearChanged(args.year)]);
        app.dispatch(&[SelectionEvent::ConstituencyChanged(args.constituency)]);
        app.rebuild_view();

        app
    }

    /// Replace the row set. The selection starts over.
    fn set_store(&mut self, store: DataStore, requested: Option<PathBuf>) {
        let path = store.source().map(|p| p.to_path_buf()).or(requested);
        let years = store.years();
        let constituencies = store.constituencies();

        self.chart_viewer
            .set_scope(constituencies.len(), years.len());
        self.control_panel
            .update_options(path, years, constituencies, store.row_count());
        self.control_panel.set_status(if store.is_empty() {
            "No data loaded"
        } else {
            "Ready"
        });

        self.store = store;
        self.restart_session();
        self.rebuild_view();
    }

    /// Drop the current session and continue in a fresh one.
    fn restart_session(&mut self) {
        self.sessions.close(self.session_id);
        self.session_id = self.sessions.open();
        debug!(
            "Session {} opened ({} active)",
            self.session_id,
            self.sessions.len()
        );
    }

    fn selection(&self) -> Selection {
        self.sessions
            .get(self.session_id)
            .map(|session| session.selection().clone())
            .unwrap_or_default()
    }

    /// Resolve a batch against this window's session. True when the
    /// selection changed.
    fn dispatch(&mut self, events: &[SelectionEvent]) -> bool {
        self.sessions
            .dispatch(self.session_id, events)
            .unwrap_or(false)
    }

    /// Recompute KPIs and charts for the current selection.
    fn rebuild_view(&mut self) {
        match DashboardView::build(&self.store, &self.selection()) {
            Ok(view) => self.view = Some(view),
            Err(e) => {
                error!("Failed to build dashboard: {}", e);
                self.control_panel.set_status(&format!("Error: {}", e));
                self.view = None;
            }
        }
    }

    /// Handle data file selection - loads in the background
    fn handle_browse_data(&mut self) {
        if self.is_loading {
            return; // Already loading
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Turnout data", &["xlsx", "xls", "csv"])
            .pick_file()
        {
            self.control_panel.set_status("Loading data file...");
            self.is_loading = true;
            self.control_panel.is_loading = true;

            let (tx, rx) = channel();
            self.load_rx = Some(rx);
            let sheet = self.sheet.clone();

            thread::spawn(move || {
                let result = match DataStore::load(&path, sheet.as_deref()) {
                    Ok(store) => LoadResult::Complete(store),
                    Err(e) => LoadResult::Error(e.to_string()),
                };
                let _ = tx.send(result);
            });
        }
    }

    /// Check for data loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match poll_load(&rx) {
            Some(LoadResult::Complete(store)) => {
                info!("Loaded {} rows", store.row_count());
                self.is_loading = false;
                self.control_panel.is_loading = false;
                self.set_store(store, None);
                let status = format!("Loaded {} rows", self.store.row_count());
                self.control_panel.set_status(&status);
            }
            Some(LoadResult::Error(error)) => {
                error!("Load failed: {}", error);
                self.is_loading = false;
                self.control_panel.is_loading = false;
                self.control_panel.set_status(&format!("Error: {}", error));
            }
            None => {
                // Still loading
                self.load_rx = Some(rx);
            }
        }
    }

    fn handle_export_json(&mut self) {
        let Some(view) = &self.view else {
            self.control_panel.set_status("Nothing to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("turnout_dashboard.json")
            .save_file()
        else {
            return; // User cancelled
        };

        match export::write_json(view, &path) {
            Ok(()) => self
                .control_panel
                .set_status(&format!("Exported {}", path.display())),
            Err(e) => self.control_panel.set_status(&format!("Error: {}", e)),
        }
    }

    fn handle_export_png(&mut self) {
        let Some(view) = &self.view else {
            self.control_panel.set_status("Nothing to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        match export::write_png_dir(view, &dir) {
            Ok(paths) => self
                .control_panel
                .set_status(&format!("Exported {} charts", paths.len())),
            Err(e) => self.control_panel.set_status(&format!("Error: {}", e)),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Every input seen this frame is resolved as one batch
        let mut events: Vec<SelectionEvent> = Vec::new();
        let selection = self.selection();

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui, &selection);

                    match action {
                        ControlPanelAction::BrowseData => self.handle_browse_data(),
                        ControlPanelAction::Select(event) => events.push(event),
                        ControlPanelAction::ExportJson => self.handle_export_json(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            events.extend(self.chart_viewer.show(ui, self.view.as_ref()));
        });

        if self.dispatch(&events) {
            self.rebuild_view();
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_load_keeps_waiting() {
        let (tx, rx) = channel::<LoadResult>();
        assert!(poll_load(&rx).is_none());

        tx.send(LoadResult::Complete(DataStore::empty())).unwrap();
        assert!(matches!(poll_load(&rx), Some(LoadResult::Complete(_))));
    }

    #[test]
    fn vanished_loader_ends_the_load() {
        let (tx, rx) = channel::<LoadResult>();
        let worker = thread::spawn(move || {
            let _tx = tx;
            panic!("loader failed");
        });
        assert!(worker.join().is_err());

        match poll_load(&rx) {
            Some(LoadResult::Error(message)) => assert_eq!(message, LOADER_LOST),
            _ => panic!("expected a load error"),
        }
    }
}
