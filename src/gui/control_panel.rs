//! Control Panel Widget
//! Left side panel with the data source, the drill-down filters and export.

use crate::state::{Selection, SelectionEvent};
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

const ALL_YEARS: &str = "All years";
const ALL_CONSTITUENCIES: &str = "All constituencies";

/// Left side control panel with file selection and filter dropdowns.
pub struct ControlPanel {
    pub data_path: Option<PathBuf>,
    pub years: Vec<i64>,
    pub constituencies: Vec<String>,
    pub row_count: usize,
    pub status: String,
    pub is_loading: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            data_path: None,
            years: Vec::new(),
            constituencies: Vec::new(),
            row_count: 0,
            status: "Ready".to_string(),
            is_loading: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh dropdown options after a data load.
    pub fn update_options(
        &mut self,
        data_path: Option<PathBuf>,
        years: Vec<i64>,
        constituencies: Vec<String>,
        row_count: usize,
    ) {
        self.data_path = data_path;
        self.years = years;
        self.constituencies = constituencies;
        self.row_count = row_count;
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel. The dropdowns show the current selection.
    pub fn show(&mut self, ui: &mut egui::Ui, selection: &Selection) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🗳 Turnout Dashboard")
                    .size(22.0)
                    .color(Color32::from_rgb(0xE6, 0x55, 0x0D)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .data_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No data loaded".to_string());

                    let path_color = if self.data_path.is_some() {
                        ui.visuals().text_color()
                    } else {
                        Color32::GRAY
                    };
                    ui.label(RichText::new(&path_text).size(12.0).color(path_color));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.add_enabled_ui(!self.is_loading, |ui| {
                            if ui.button("📂 Browse").clicked() {
                                action = ControlPanelAction::BrowseData;
                            }
                        });
                    });
                });
                ui.label(
                    RichText::new(format!("{} rows", self.row_count))
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filter Section =====
        ui.label(RichText::new("🔎 Filters").size(14.0).strong());
        ui.add_space(8.0);

        let label_width = 90.0;
        let combo_width = 170.0;

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Select Year:"));
            let selected = selection
                .year
                .map(|y| y.to_string())
                .unwrap_or_else(|| ALL_YEARS.to_string());
            ComboBox::from_id_salt("year_filter")
                .width(combo_width)
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    if ui
                        .selectable_label(selection.year.is_none(), ALL_YEARS)
                        .clicked()
                        && selection.year.is_some()
                    {
                        action = ControlPanelAction::Select(SelectionEvent::YearChanged(None));
                    }
                    for year in &self.years {
                        let is_selected = selection.year == Some(*year);
                        if ui.selectable_label(is_selected, year.to_string()).clicked()
                            && !is_selected
                        {
                            action = ControlPanelAction::Select(SelectionEvent::YearChanged(
                                Some(*year),
                            ));
                        }
                    }
                });
        });

        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Constituency:"));
            let selected = selection.constituency().unwrap_or(ALL_CONSTITUENCIES);
            ComboBox::from_id_salt("const_filter")
                .width(combo_width)
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    if ui
                        .selectable_label(selection.constituency.is_none(), ALL_CONSTITUENCIES)
                        .clicked()
                        && selection.constituency.is_some()
                    {
                        action =
                            ControlPanelAction::Select(SelectionEvent::ConstituencyChanged(None));
                    }
                    for name in &self.constituencies {
                        let is_selected = selection.constituency() == Some(name.as_str());
                        if ui.selectable_label(is_selected, name).clicked() && !is_selected {
                            action = ControlPanelAction::Select(
                                SelectionEvent::ConstituencyChanged(Some(name.clone())),
                            );
                        }
                    }
                });
        });

        ui.add_space(8.0);
        ui.label(
            RichText::new("Click a bar or point to drill down.")
                .size(11.0)
                .color(Color32::GRAY),
        );

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Buttons =====
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("💾 Export JSON").size(14.0))
                .min_size(egui::vec2(180.0, 30.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::ExportJson;
            }

            ui.add_space(8.0);

            let button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                .min_size(egui::vec2(180.0, 30.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::ExportPng;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status =====
        if self.is_loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new(&self.status).size(11.0));
            });
        } else {
            let status_color = if self.status.contains("Error") {
                Color32::from_rgb(220, 53, 69)
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        }

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseData,
    Select(SelectionEvent),
    ExportJson,
    ExportPng,
}
