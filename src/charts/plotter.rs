//! Chart Plotter Module
//! Draws chart specifications with egui_plot and turns clicks into
//! selection events.

use crate::charts::{ChartKind, ChartSpec, Facet, Rgb};
use crate::state::SelectionEvent;
use egui::{Align2, Color32, RichText};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, LineStyle, Plot, PlotPoint, PlotPoints, PlotUi,
    Points, Text, VLine,
};

/// Marker for the selected year on the line charts
pub const HIGHLIGHT_COLOR: Color32 = Color32::RED;

/// Draws interactive dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn color32(rgb: Rgb, opacity: f32) -> Color32 {
        let color = Color32::from_rgb(rgb[0], rgb[1], rgb[2]);
        if opacity < 1.0 {
            color.gamma_multiply(opacity)
        } else {
            color
        }
    }

    /// Draw a chart. Returns the event produced by a click on one of its
    /// points, if any.
    pub fn draw_chart(ui: &mut egui::Ui, spec: &ChartSpec, height: f32) -> Option<SelectionEvent> {
        ui.label(RichText::new(&spec.title).size(14.0).strong());
        ui.add_space(4.0);

        if spec.is_empty() {
            ui.allocate_ui(egui::vec2(ui.available_width(), height), |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No Data").size(18.0).color(Color32::GRAY));
                });
            });
            return None;
        }

        match spec.kind {
            ChartKind::Line => Self::draw_line_facet(ui, spec, 0, height),
            ChartKind::GroupedBar => Self::draw_bar_facet(ui, spec, 0, height),
            ChartKind::FacetedGroupedBar => {
                let mut event = None;
                let count = spec.facets.len().max(1);
                ui.columns(count, |columns| {
                    for (idx, column) in columns.iter_mut().enumerate() {
                        if let Some(title) = spec.facets.get(idx).and_then(|f| f.title.as_ref()) {
                            column.vertical_centered(|ui| {
                                ui.label(RichText::new(title).size(12.0));
                            });
                        }
                        if let Some(e) = Self::draw_bar_facet(column, spec, idx, height - 20.0) {
                            event = Some(e);
                        }
                    }
                });
                event
            }
        }
    }

    /// Plot coordinate of a primary click inside the plot area.
    fn clicked_point(plot_ui: &PlotUi) -> Option<PlotPoint> {
        if plot_ui.response().clicked() {
            plot_ui.pointer_coordinate()
        } else {
            None
        }
    }

    /// Line chart: x is the year, one line per series with point labels.
    fn draw_line_facet(
        ui: &mut egui::Ui,
        spec: &ChartSpec,
        idx: usize,
        height: f32,
    ) -> Option<SelectionEvent> {
        let facet = spec.facets.get(idx)?;
        let ticks: Vec<f64> = facet
            .categories
            .iter()
            .filter_map(|c| c.parse::<f64>().ok())
            .collect();

        let response = Plot::new(format!("{}_{}", spec.id.slug(), idx))
            .height(height)
            .legend(Legend::default())
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .x_axis_label(spec.x_label.clone())
            .y_axis_label(spec.y_label.clone())
            .x_grid_spacer(move |_input| {
                ticks
                    .iter()
                    .map(|&value| GridMark {
                        value,
                        step_size: 1.0,
                    })
                    .collect()
            })
            .x_axis_formatter(|mark, _range| format!("{:.0}", mark.value))
            .show(ui, |plot_ui| {
                Self::plot_lines(plot_ui, facet);

                if let Some(year) = spec.highlight_year {
                    plot_ui.vline(
                        VLine::new(year as f64)
                            .color(HIGHLIGHT_COLOR)
                            .style(LineStyle::dashed_loose())
                            .name("Selected year"),
                    );
                }

                Self::clicked_point(plot_ui)
            });

        response
            .inner
            .and_then(|point| spec.click_event(idx, point.x, point.y))
    }

    fn plot_lines(plot_ui: &mut PlotUi, facet: &Facet) {
        for series in &facet.series {
            let color = Self::color32(series.color, series.opacity);
            let points: Vec<[f64; 2]> = series.points.iter().map(|p| [p.x, p.y]).collect();

            plot_ui.line(
                Line::new(PlotPoints::from_iter(points.iter().copied()))
                    .color(color)
                    .width(2.0)
                    .name(&series.name),
            );
            plot_ui.points(
                Points::new(PlotPoints::from_iter(points.iter().copied()))
                    .radius(5.0)
                    .color(color)
                    .name(&series.name),
            );

            for p in &series.points {
                plot_ui.text(
                    Text::new(PlotPoint::new(p.x, p.y), format!("{:.2}%", p.y))
                        .anchor(Align2::CENTER_BOTTOM)
                        .color(color),
                );
            }
        }
    }

    /// Grouped bar chart: categories on x, one bar per series in each slot.
    fn draw_bar_facet(
        ui: &mut egui::Ui,
        spec: &ChartSpec,
        idx: usize,
        height: f32,
    ) -> Option<SelectionEvent> {
        let facet = spec.facets.get(idx)?;
        let categories = facet.categories.clone();
        let slots = categories.len();

        let response = Plot::new(format!("{}_{}", spec.id.slug(), idx))
            .height(height)
            .legend(Legend::default())
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_label(spec.x_label.clone())
            .y_axis_label(spec.y_label.clone())
            .x_grid_spacer(move |_input| {
                (0..slots)
                    .map(|i| GridMark {
                        value: i as f64,
                        step_size: 1.0,
                    })
                    .collect()
            })
            .x_axis_formatter(move |mark, _range| {
                let slot = mark.value.round();
                if slot < 0.0 || (mark.value - slot).abs() > 1e-6 {
                    return String::new();
                }
                categories.get(slot as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                for series in &facet.series {
                    let color = Self::color32(series.color, series.opacity);
                    let bars: Vec<Bar> = series
                        .points
                        .iter()
                        .map(|p| {
                            Bar::new(p.x, p.y)
                                .width(facet.bar_width)
                                .fill(color)
                                .name(format!("{} ({})", p.category, series.name))
                        })
                        .collect();
                    plot_ui.bar_chart(BarChart::new(bars).color(color).name(&series.name));
                }

                Self::clicked_point(plot_ui)
            });

        response
            .inner
            .and_then(|point| spec.click_event(idx, point.x, point.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_colors_are_kept() {
        assert_eq!(
            ChartPlotter::color32([0xE6, 0x55, 0x0D], 1.0),
            Color32::from_rgb(0xE6, 0x55, 0x0D)
        );
    }

    #[test]
    fn dimmed_colors_lose_alpha() {
        let dimmed = ChartPlotter::color32([0xFD, 0x8D, 0x3C], 0.3);
        assert!(dimmed.a() < 255);
    }
}
