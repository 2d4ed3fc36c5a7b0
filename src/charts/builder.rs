//! Chart Builder Module
//! Turns the aggregated turnout frames and the current selection into the
//! four dashboard chart specifications consumed by the plotter and renderer.

use crate::data::schema::{
    Gender, CONSTITUENCY, GENDER, TURNOUT_RATIO, TURNOUT_RATIO_OVERALL, TURNOUT_RATIO_OVERALL_AGG,
    YEAR,
};
use crate::data::{AggregateError, Aggregator, DataStore};
use crate::state::{ChartId, Selection, SelectionEvent};
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;

/// RGB colour
pub type Rgb = [u8; 3];

/// Overall turnout line and KPI
pub const OVERALL_COLOR: Rgb = [0xE6, 0x55, 0x0D];
pub const MALE_COLOR: Rgb = [0x00, 0x00, 0xFF];
pub const FEMALE_COLOR: Rgb = [0xFF, 0xC0, 0xCB];
/// Female KPI text, pink is too light on white
pub const FEMALE_TEXT_COLOR: Rgb = [0xFF, 0x14, 0x93];

/// One shade per election, oldest first
pub const YEAR_PALETTE: [Rgb; 3] = [
    [0xFD, 0xBE, 0x85],
    [0xFD, 0x8D, 0x3C],
    [0xE6, 0x55, 0x0D],
];

/// Opacity of the years that are not selected in the grouped bar chart
pub const DIMMED_OPACITY: f32 = 0.3;

/// Share of a category slot covered by its bar group
const BAR_GROUP_WIDTH: f64 = 0.8;

/// Clicks on a line chart snap to the nearest point within this x distance
const LINE_HIT_TOLERANCE: f64 = 1.0;

pub const Y_LABEL: &str = "Turnout ratio (%)";

pub fn gender_color(gender: Gender) -> Rgb {
    match gender {
        Gender::Male => MALE_COLOR,
        Gender::Female => FEMALE_COLOR,
    }
}

/// Palette colour of a year, by its position among all loaded years.
pub fn year_color(year: i64, all_years: &[i64]) -> Rgb {
    let idx = all_years.iter().position(|y| *y == year).unwrap_or(0);
    YEAR_PALETTE[idx % YEAR_PALETTE.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    GroupedBar,
    FacetedGroupedBar,
}

/// A plotted value. `x` is the plot coordinate (the year on line charts,
/// category index plus bar offset on bar charts); `category` and `year` are
/// the attributes a click on it reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
    pub category: String,
    pub year: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub color: Rgb,
    pub opacity: f32,
    pub points: Vec<DataPoint>,
}

/// One panel of a chart. Only the faceted chart has more than one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facet {
    pub title: Option<String>,
    /// Tick labels: years on line charts, constituencies on bar charts
    pub categories: Vec<String>,
    pub bar_width: f64,
    pub series: Vec<Series>,
}

impl Facet {
    fn new(title: Option<String>, categories: Vec<String>) -> Self {
        Self {
            title,
            categories,
            bar_width: 0.0,
            series: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: ChartId,
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Dashed marker at the selected year on the line charts
    pub highlight_year: Option<i64>,
    pub facets: Vec<Facet>,
}

impl ChartSpec {
    /// True when no facet has anything to draw.
    pub fn is_empty(&self) -> bool {
        self.facets
            .iter()
            .all(|f| f.series.iter().all(|s| s.points.is_empty()))
    }

    /// The point under a plot coordinate, if any.
    pub fn hit_test(&self, facet: usize, x: f64, y: f64) -> Option<&DataPoint> {
        let facet = self.facets.get(facet)?;
        let points = facet.series.iter().flat_map(|s| s.points.iter());

        match self.kind {
            ChartKind::Line => points
                .filter(|p| (p.x - x).abs() <= LINE_HIT_TOLERANCE)
                .min_by(|a, b| {
                    let da = (a.x - x).abs() + (a.y - y).abs() * 1e-6;
                    let db = (b.x - x).abs() + (b.y - y).abs() * 1e-6;
                    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                }),
            ChartKind::GroupedBar | ChartKind::FacetedGroupedBar => {
                let half = facet.bar_width / 2.0;
                points.into_iter().find(|p| {
                    let (low, high) = if p.y >= 0.0 { (0.0, p.y) } else { (p.y, 0.0) };
                    (p.x - x).abs() <= half && y >= low && y <= high
                })
            }
        }
    }

    /// Translate a click at a plot coordinate into a selection event.
    /// Charts that do not drive the drill-down, and clicks that miss every
    /// point, produce nothing.
    pub fn click_event(&self, facet: usize, x: f64, y: f64) -> Option<SelectionEvent> {
        if self.id == ChartId::GenderTime {
            return None;
        }
        let point = self.hit_test(facet, x, y)?;
        let category = match self.id {
            ChartId::OverallTime => None,
            _ => Some(point.category.clone()),
        };
        Some(SelectionEvent::ChartClicked {
            chart: self.id,
            category,
            year: Some(point.year),
        })
    }
}

/// Builds the four dashboard charts.
pub struct ChartBuilder;

impl ChartBuilder {
    pub fn build_all(
        store: &DataStore,
        selection: &Selection,
    ) -> Result<Vec<ChartSpec>, AggregateError> {
        ChartId::ALL
            .iter()
            .map(|id| Self::build(*id, store, selection))
            .collect()
    }

    pub fn build(
        id: ChartId,
        store: &DataStore,
        selection: &Selection,
    ) -> Result<ChartSpec, AggregateError> {
        match id {
            ChartId::OverallTime => Self::overall_time(store, selection),
            ChartId::GenderTime => Self::gender_time(store, selection),
            ChartId::ConstituencyTime => Self::constituency_time(store, selection),
            ChartId::ConstituencyGender => Self::constituency_gender(store, selection),
        }
    }

    fn scope_label(selection: &Selection) -> String {
        selection
            .constituency()
            .unwrap_or("All Constituencies")
            .to_string()
    }

    fn year_ticks(store: &DataStore) -> Vec<String> {
        store.years().iter().map(|y| y.to_string()).collect()
    }

    /// 1. Elector-weighted overall turnout per year.
    pub fn overall_time(
        store: &DataStore,
        selection: &Selection,
    ) -> Result<ChartSpec, AggregateError> {
        let rows = store.filter(None, selection.constituency())?;
        let agg = Aggregator::aggregate_overall(&rows)?;

        let year_ca = agg.column(YEAR)?.i64()?;
        let value_ca = agg.column(TURNOUT_RATIO_OVERALL_AGG)?.f64()?;
        let points: Vec<DataPoint> = year_ca
            .into_iter()
            .zip(value_ca.into_iter())
            .filter_map(|(year, value)| Some(year_point(year?, value?)))
            .collect();

        let mut facet = Facet::new(None, Self::year_ticks(store));
        if !points.is_empty() {
            facet.series.push(Series {
                name: "Overall".to_string(),
                color: OVERALL_COLOR,
                opacity: 1.0,
                points,
            });
        }

        Ok(ChartSpec {
            id: ChartId::OverallTime,
            kind: ChartKind::Line,
            title: format!(
                "Overall Voter Turnout Ratio ({})",
                Self::scope_label(selection)
            ),
            x_label: "Year".to_string(),
            y_label: Y_LABEL.to_string(),
            highlight_year: selection.year,
            facets: vec![facet],
        })
    }

    /// 2. Elector-weighted turnout per year, one line per gender.
    pub fn gender_time(
        store: &DataStore,
        selection: &Selection,
    ) -> Result<ChartSpec, AggregateError> {
        let rows = store.filter(None, selection.constituency())?;
        let agg = Aggregator::aggregate_by_gender(&rows)?;

        let year_ca = agg.column(YEAR)?.i64()?;
        let gender_ca = agg.column(GENDER)?.str()?;
        let value_ca = agg.column(TURNOUT_RATIO)?.f64()?;

        let mut facet = Facet::new(None, Self::year_ticks(store));
        for gender in Gender::ALL {
            let points: Vec<DataPoint> = year_ca
                .into_iter()
                .zip(gender_ca.into_iter())
                .zip(value_ca.into_iter())
                .filter(|((_, g), _)| *g == Some(gender.as_str()))
                .filter_map(|((year, _), value)| Some(year_point(year?, value?)))
                .collect();

            if !points.is_empty() {
                facet.series.push(Series {
                    name: gender.to_string(),
                    color: gender_color(gender),
                    opacity: 1.0,
                    points,
                });
            }
        }

        Ok(ChartSpec {
            id: ChartId::GenderTime,
            kind: ChartKind::Line,
            title: format!(
                "Voter Turnout Ratio by Gender ({})",
                Self::scope_label(selection)
            ),
            x_label: "Year".to_string(),
            y_label: Y_LABEL.to_string(),
            highlight_year: selection.year,
            facets: vec![facet],
        })
    }

    /// 3. Per-constituency turnout, one bar per year. The selected year is
    /// emphasised by dimming the others.
    pub fn constituency_time(
        store: &DataStore,
        selection: &Selection,
    ) -> Result<ChartSpec, AggregateError> {
        let rows = store.filter(None, selection.constituency())?;
        let data = Aggregator::constituency_over_time(&rows)?;

        let records = read_constituency_rows(&data, TURNOUT_RATIO_OVERALL, None)?;
        let categories = distinct_categories(&records);
        let years: Vec<i64> = records
            .iter()
            .map(|r| r.year)
            .collect::<BTreeSet<i64>>()
            .into_iter()
            .collect();
        let all_years = store.years();

        let mut facet = Facet::new(None, categories.clone());
        facet.bar_width = bar_width(years.len());

        for (k, year) in years.iter().enumerate() {
            let offset = bar_offset(k, years.len());
            let points = records
                .iter()
                .filter(|r| r.year == *year)
                .filter_map(|r| bar_point(r, &categories, offset))
                .collect();

            let opacity = match selection.year {
                Some(selected) if selected != *year => DIMMED_OPACITY,
                _ => 1.0,
            };

            facet.series.push(Series {
                name: year.to_string(),
                color: year_color(*year, &all_years),
                opacity,
                points,
            });
        }

        Ok(ChartSpec {
            id: ChartId::ConstituencyTime,
            kind: ChartKind::GroupedBar,
            title: "Voter Turnout Ratio across Constituencies and Time".to_string(),
            x_label: CONSTITUENCY.to_string(),
            y_label: Y_LABEL.to_string(),
            highlight_year: None,
            facets: vec![facet],
        })
    }

    /// 4. Per-constituency turnout by gender, one panel per year.
    pub fn constituency_gender(
        store: &DataStore,
        selection: &Selection,
    ) -> Result<ChartSpec, AggregateError> {
        let rows = store.filter(selection.year, selection.constituency())?;
        let data = Aggregator::constituency_by_gender(&rows)?;

        let mut records: Vec<(Gender, ConstituencyRow)> = Vec::new();
        for gender in Gender::ALL {
            for row in read_constituency_rows(&data, TURNOUT_RATIO, Some(gender))? {
                records.push((gender, row));
            }
        }

        let categories =
            distinct_categories(&records.iter().map(|(_, r)| r.clone()).collect::<Vec<_>>());
        let years: BTreeSet<i64> = records.iter().map(|(_, r)| r.year).collect();

        let facets = years
            .iter()
            .map(|year| {
                let mut facet = Facet::new(Some(format!("Year={}", year)), categories.clone());
                facet.bar_width = bar_width(Gender::ALL.len());

                for (k, gender) in Gender::ALL.iter().enumerate() {
                    let offset = bar_offset(k, Gender::ALL.len());
                    let points = records
                        .iter()
                        .filter(|(g, r)| g == gender && r.year == *year)
                        .filter_map(|(_, r)| bar_point(r, &categories, offset))
                        .collect();
                    facet.series.push(Series {
                        name: gender.to_string(),
                        color: gender_color(*gender),
                        opacity: 1.0,
                        points,
                    });
                }
                facet
            })
            .collect();

        Ok(ChartSpec {
            id: ChartId::ConstituencyGender,
            kind: ChartKind::FacetedGroupedBar,
            title: "Voter Turnout Ratio across Constituencies and Genders".to_string(),
            x_label: CONSTITUENCY.to_string(),
            y_label: Y_LABEL.to_string(),
            highlight_year: None,
            facets,
        })
    }
}

#[derive(Debug, Clone)]
struct ConstituencyRow {
    constituency: String,
    year: i64,
    ratio: Option<f64>,
}

/// Rows of a per-constituency frame, optionally restricted to one gender.
fn read_constituency_rows(
    df: &DataFrame,
    ratio_col: &str,
    gender: Option<Gender>,
) -> Result<Vec<ConstituencyRow>, PolarsError> {
    let const_ca = df.column(CONSTITUENCY)?.str()?;
    let year_ca = df.column(YEAR)?.i64()?;
    let ratio_f64 = df.column(ratio_col)?.cast(&DataType::Float64)?;
    let ratio_ca = ratio_f64.f64()?;

    let gender_col = match gender {
        Some(_) => Some(df.column(GENDER)?.str()?),
        None => None,
    };

    let mut rows = Vec::new();
    for (idx, ((name, year), ratio)) in const_ca
        .into_iter()
        .zip(year_ca.into_iter())
        .zip(ratio_ca.into_iter())
        .enumerate()
    {
        if let (Some(g), Some(ca)) = (gender, gender_col) {
            if ca.get(idx) != Some(g.as_str()) {
                continue;
            }
        }
        if let (Some(name), Some(year)) = (name, year) {
            rows.push(ConstituencyRow {
                constituency: name.to_string(),
                year,
                ratio: ratio.filter(|v| !v.is_nan()),
            });
        }
    }
    Ok(rows)
}

fn distinct_categories(rows: &[ConstituencyRow]) -> Vec<String> {
    rows.iter()
        .map(|r| r.constituency.clone())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

fn year_point(year: i64, value: f64) -> DataPoint {
    DataPoint {
        x: year as f64,
        y: value,
        category: year.to_string(),
        year,
    }
}

fn bar_width(series_count: usize) -> f64 {
    BAR_GROUP_WIDTH / series_count.max(1) as f64
}

/// Centre offset of the k-th bar within its category slot.
fn bar_offset(k: usize, series_count: usize) -> f64 {
    let width = bar_width(series_count);
    (k as f64 - (series_count.max(1) - 1) as f64 / 2.0) * width
}

/// Bars with a missing ratio are not drawn.
fn bar_point(row: &ConstituencyRow, categories: &[String], offset: f64) -> Option<DataPoint> {
    let idx = categories.iter().position(|c| *c == row.constituency)?;
    Some(DataPoint {
        x: idx as f64 + offset,
        y: row.ratio?,
        category: row.constituency.clone(),
        year: row.year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    fn selection(year: Option<i64>, constituency: Option<&str>) -> Selection {
        Selection::new(year, constituency.map(|s| s.to_string()))
    }

    #[test]
    fn builds_four_charts_in_order() {
        let charts = ChartBuilder::build_all(&fixtures::store(), &Selection::default()).unwrap();
        let ids: Vec<ChartId> = charts.iter().map(|c| c.id).collect();
        assert_eq!(ids, ChartId::ALL.to_vec());
        assert!(charts.iter().all(|c| !c.is_empty()));
        assert_eq!(charts[0].title, "Overall Voter Turnout Ratio (All Constituencies)");
    }

    #[test]
    fn line_charts_follow_constituency_and_mark_year() {
        let store = fixtures::store();
        let chart = ChartBuilder::overall_time(&store, &selection(Some(2019), Some("Delhi"))).unwrap();

        assert_eq!(chart.title, "Overall Voter Turnout Ratio (Delhi)");
        assert_eq!(chart.highlight_year, Some(2019));
        let points = &chart.facets[0].series[0].points;
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![65.0, 60.0, 65.0]);
        assert_eq!(chart.facets[0].categories, vec!["2014", "2019", "2024"]);
    }

    #[test]
    fn gender_chart_has_a_line_per_gender() {
        let chart = ChartBuilder::gender_time(&fixtures::store(), &Selection::default()).unwrap();
        let names: Vec<&str> = chart.facets[0].series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Male", "Female"]);
        assert_eq!(chart.facets[0].series[0].color, MALE_COLOR);
        assert!(chart.facets[0].series.iter().all(|s| s.points.len() == 3));
    }

    #[test]
    fn selected_year_dims_other_bars() {
        let chart =
            ChartBuilder::constituency_time(&fixtures::store(), &selection(Some(2019), None)).unwrap();
        let facet = &chart.facets[0];
        assert_eq!(facet.categories, vec!["Delhi", "Pune"]);

        let opacity: Vec<(String, f32)> = facet
            .series
            .iter()
            .map(|s| (s.name.clone(), s.opacity))
            .collect();
        assert_eq!(
            opacity,
            vec![
                ("2014".to_string(), DIMMED_OPACITY),
                ("2019".to_string(), 1.0),
                ("2024".to_string(), DIMMED_OPACITY),
            ]
        );
        assert_eq!(facet.series[2].color, YEAR_PALETTE[2]);
    }

    #[test]
    fn faceted_chart_filters_by_year_and_constituency() {
        let store = fixtures::store();

        let all = ChartBuilder::constituency_gender(&store, &Selection::default()).unwrap();
        assert_eq!(all.facets.len(), 3);
        assert_eq!(all.facets[0].title.as_deref(), Some("Year=2014"));

        let one = ChartBuilder::constituency_gender(&store, &selection(Some(2024), Some("Pune")))
            .unwrap();
        assert_eq!(one.facets.len(), 1);
        assert_eq!(one.facets[0].categories, vec!["Pune"]);
        let ys: Vec<f64> = one.facets[0]
            .series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.y))
            .collect();
        assert_eq!(ys, vec![66.67, 63.33]);
    }

    #[test]
    fn bar_click_reports_category_and_year() {
        let chart = ChartBuilder::constituency_time(&fixtures::store(), &Selection::default()).unwrap();
        let target = chart.facets[0].series[2].points[0].clone();
        assert_eq!((target.category.as_str(), target.year), ("Delhi", 2024));

        let event = chart.click_event(0, target.x, target.y / 2.0);
        assert_eq!(
            event,
            Some(SelectionEvent::ChartClicked {
                chart: ChartId::ConstituencyTime,
                category: Some("Delhi".to_string()),
                year: Some(2024),
            })
        );

        // Above the bar or between groups is a miss.
        assert_eq!(chart.click_event(0, target.x, target.y + 10.0), None);
        assert_eq!(chart.click_event(0, 0.5, 10.0), None);
        assert_eq!(chart.click_event(3, target.x, 1.0), None);
    }

    #[test]
    fn line_click_reports_year_only() {
        let store = fixtures::store();
        let overall = ChartBuilder::overall_time(&store, &Selection::default()).unwrap();
        assert_eq!(
            overall.click_event(0, 2018.6, 60.0),
            Some(SelectionEvent::ChartClicked {
                chart: ChartId::OverallTime,
                category: None,
                year: Some(2019),
            })
        );
        assert_eq!(overall.click_event(0, 2016.5, 60.0), None);

        let gender = ChartBuilder::gender_time(&store, &Selection::default()).unwrap();
        assert_eq!(gender.click_event(0, 2019.0, 60.0), None);
    }

    #[test]
    fn empty_store_gives_empty_charts() {
        let charts = ChartBuilder::build_all(&DataStore::empty(), &Selection::default()).unwrap();
        assert_eq!(charts.len(), 4);
        assert!(charts.iter().all(|c| c.is_empty()));
    }
}
