//! Chart Viewer Widget
//! Central scrollable panel: KPI cards on top, the four charts in a 2x2 grid.

use crate::charts::{ChartPlotter, ChartSpec, Rgb, FEMALE_TEXT_COLOR, MALE_COLOR, OVERALL_COLOR};
use crate::dashboard::DashboardView;
use crate::state::{ChartId, SelectionEvent};
use crate::stats::{Kpi, KpiSummary};
use egui::{Color32, RichText, ScrollArea};

/// Chart card configuration
const CHART_SPACING: f32 = 15.0;
const CHART_HEIGHT: f32 = 420.0;

/// KPI text colours: overall, male, female
const KPI_COLORS: [Rgb; 3] = [OVERALL_COLOR, MALE_COLOR, FEMALE_TEXT_COLOR];

/// Scrollable dashboard area. Collects the selection events produced by
/// chart clicks.
#[derive(Default)]
pub struct ChartViewer {
    /// Heading above the KPI row
    pub subtitle: String,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the heading from the loaded data
    pub fn set_scope(&mut self, constituencies: usize, elections: usize) {
        self.subtitle = format!(
            "{} Constituencies, {} General Elections",
            constituencies, elections
        );
    }

    fn chart_heading(id: ChartId) -> &'static str {
        match id {
            ChartId::OverallTime => "1. Change in overall turnout ratio over time",
            ChartId::GenderTime => "2. Change in turnout ratio across genders over time",
            ChartId::ConstituencyTime => "3. Turnout distribution across constituencies and time",
            ChartId::ConstituencyGender => {
                "4. Turnout distribution across constituencies and genders"
            }
        }
    }

    /// Draw the dashboard. Returns the events emitted by chart clicks this frame.
    pub fn show(&mut self, ui: &mut egui::Ui, view: Option<&DashboardView>) -> Vec<SelectionEvent> {
        let mut events = Vec::new();

        ui.vertical_centered(|ui| {
            ui.heading(format!("Voter Turnout Dashboard ({})", self.subtitle));
        });
        ui.add_space(10.0);

        let Some(view) = view else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return events;
        };

        Self::draw_kpi_row(ui, &view.kpis);
        ui.add_space(CHART_SPACING);

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for pair in view.charts.chunks(2) {
                    ui.columns(2, |columns| {
                        for (column, spec) in columns.iter_mut().zip(pair.iter()) {
                            if let Some(event) = Self::draw_chart_card(column, spec) {
                                events.push(event);
                            }
                        }
                    });
                    ui.add_space(CHART_SPACING);
                }
            });

        events
    }

    fn draw_kpi_row(ui: &mut egui::Ui, kpis: &KpiSummary) {
        ui.columns(3, |columns| {
            for ((column, (title, value)), color) in columns
                .iter_mut()
                .zip(kpis.entries())
                .zip(KPI_COLORS)
            {
                egui::Frame::none()
                    .rounding(8.0)
                    .stroke(egui::Stroke::new(1.0, Color32::from_gray(200)))
                    .fill(column.visuals().extreme_bg_color)
                    .inner_margin(15.0)
                    .show(column, |ui| {
                        let value_color = match value {
                            Kpi::Value(_) => ChartPlotter::color32(color, 1.0),
                            Kpi::NotAvailable => Color32::GRAY,
                        };
                        ui.vertical_centered(|ui| {
                            ui.label(
                                RichText::new(value.to_string())
                                    .size(24.0)
                                    .strong()
                                    .color(value_color),
                            );
                            ui.label(RichText::new(title).size(16.0).color(Color32::GRAY));
                        });
                    });
            }
        });
    }

    /// Draw a single chart card
    fn draw_chart_card(ui: &mut egui::Ui, spec: &ChartSpec) -> Option<SelectionEvent> {
        let mut event = None;

        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, Color32::from_gray(200)))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new(Self::chart_heading(spec.id)).size(16.0).strong());
                ui.add_space(6.0);
                event = ChartPlotter::draw_chart(ui, spec, CHART_HEIGHT);
            });

        event
    }
}
