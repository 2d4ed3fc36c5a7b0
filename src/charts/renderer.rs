//! Static Chart Renderer
//! Renders chart specifications to PNG files with plotters, matching the
//! interactive layout:
//!
//! 1. Title centered on top
//! 2. One panel per facet, side by side
//! 3. Line charts with labelled points and the selected-year marker,
//!    bar charts with one bar per series in each category slot

use crate::charts::{ChartKind, ChartSpec, Facet, Rgb};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const FONT: &str = "sans-serif";

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render one chart to a PNG file.
    pub fn render_png(
        spec: &ChartSpec,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), Box<dyn Error>> {
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;
        let body = root.titled(&spec.title, (FONT, 22))?;

        if spec.is_empty() {
            body.draw(&Text::new(
                "No Data",
                ((width / 2) as i32 - 40, (height / 2) as i32),
                (FONT, 20).into_font(),
            ))?;
            root.present()?;
            return Ok(());
        }

        let panels = body.split_evenly((1, spec.facets.len().max(1)));
        for (facet, panel) in spec.facets.iter().zip(panels.iter()) {
            match spec.kind {
                ChartKind::Line => Self::draw_line_panel(panel, spec, facet)?,
                ChartKind::GroupedBar | ChartKind::FacetedGroupedBar => {
                    Self::draw_bar_panel(panel, spec, facet)?
                }
            }
        }

        root.present()?;
        Ok(())
    }

    fn rgb(color: Rgb) -> RGBColor {
        RGBColor(color[0], color[1], color[2])
    }

    fn draw_line_panel(area: &Area, spec: &ChartSpec, facet: &Facet) -> Result<(), Box<dyn Error>> {
        let (x_min, x_max) = year_range(facet);
        let y_max = value_ceiling(facet);

        let mut chart = ChartBuilder::on(area)
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(55)
            .build_cartesian_2d(x_min..x_max, 0f64..y_max)?;

        let x_fmt = |x: &f64| format!("{:.0}", x);
        chart
            .configure_mesh()
            .x_desc(&spec.x_label)
            .y_desc(&spec.y_label)
            .x_labels((x_max - x_min) as usize + 1)
            .x_label_formatter(&x_fmt)
            .draw()?;

        for series in &facet.series {
            let color = Self::rgb(series.color);
            chart
                .draw_series(LineSeries::new(
                    series.points.iter().map(|p| (p.x, p.y)),
                    color.stroke_width(2),
                ))?
                .label(series.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

            chart.draw_series(
                series
                    .points
                    .iter()
                    .map(|p| Circle::new((p.x, p.y), 4, color.filled())),
            )?;
            chart.draw_series(series.points.iter().map(|p| {
                Text::new(
                    format!("{:.2}%", p.y),
                    (p.x, p.y + y_max * 0.03),
                    (FONT, 12).into_font(),
                )
            }))?;
        }

        if let Some(year) = spec.highlight_year {
            let year = year as f64;
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(year, 0.0), (year, y_max)],
                RED.stroke_width(1),
            )))?;
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        Ok(())
    }

    fn draw_bar_panel(area: &Area, spec: &ChartSpec, facet: &Facet) -> Result<(), Box<dyn Error>> {
        let area = match &facet.title {
            Some(title) => area.titled(title, (FONT, 14))?,
            None => area.clone(),
        };

        let slots = facet.categories.len().max(1);
        let y_max = value_ceiling(facet);

        let mut chart = ChartBuilder::on(&area)
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(55)
            .build_cartesian_2d(-0.5f64..(slots as f64 - 0.5), 0f64..y_max)?;

        let x_fmt = |x: &f64| {
            let slot = x.round();
            if slot < 0.0 || (x - slot).abs() > 1e-6 {
                return String::new();
            }
            facet
                .categories
                .get(slot as usize)
                .cloned()
                .unwrap_or_default()
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(&spec.x_label)
            .y_desc(&spec.y_label)
            .x_labels(slots)
            .x_label_formatter(&x_fmt)
            .draw()?;

        let half = facet.bar_width / 2.0;
        for series in &facet.series {
            let color = Self::rgb(series.color);
            let fill = color.mix(series.opacity as f64).filled();
            chart
                .draw_series(series.points.iter().map(|p| {
                    Rectangle::new([(p.x - half, 0.0), (p.x + half, p.y)], fill)
                }))?
                .label(series.name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        Ok(())
    }
}

/// Year axis padded by one year on each side.
fn year_range(facet: &Facet) -> (f64, f64) {
    let xs = facet.series.iter().flat_map(|s| s.points.iter().map(|p| p.x));
    let (min, max) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
        (lo.min(x), hi.max(x))
    });
    if min.is_infinite() {
        return (0.0, 1.0);
    }
    (min - 1.0, max + 1.0)
}

/// Headroom above the tallest value for the point labels, capped at 100.
fn value_ceiling(facet: &Facet) -> f64 {
    let max = facet
        .series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.y))
        .fold(0.0f64, f64::max);
    if max <= 0.0 {
        return 100.0;
    }
    (max * 1.15).min(100.0).max(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::builder::{DataPoint, Series};

    fn facet(points: &[(f64, f64)]) -> Facet {
        Facet {
            title: None,
            categories: Vec::new(),
            bar_width: 0.4,
            series: vec![Series {
                name: "Overall".to_string(),
                color: [0, 0, 0],
                opacity: 1.0,
                points: points
                    .iter()
                    .map(|&(x, y)| DataPoint {
                        x,
                        y,
                        category: String::new(),
                        year: x as i64,
                    })
                    .collect(),
            }],
        }
    }

    #[test]
    fn year_axis_is_padded() {
        let f = facet(&[(2014.0, 60.0), (2024.0, 65.0)]);
        assert_eq!(year_range(&f), (2013.0, 2025.0));
        assert_eq!(year_range(&facet(&[])), (0.0, 1.0));
    }

    #[test]
    fn ceiling_leaves_room_but_stays_a_percentage() {
        assert!((value_ceiling(&facet(&[(0.0, 50.0)])) - 57.5).abs() < 1e-9);
        assert_eq!(value_ceiling(&facet(&[(0.0, 95.0)])), 100.0);
        assert_eq!(value_ceiling(&facet(&[])), 100.0);
    }
}
