//! Drill-down selection state and the event reducer.
//!
//! Dropdowns and chart clicks are all turned into [`SelectionEvent`]s. A UI
//! frame collects the events it saw into a batch and [`resolve`] applies one
//! of them to the current [`Selection`].

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The (year, constituency) pair every view is filtered by.
/// `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub year: Option<i64>,
    pub constituency: Option<String>,
}

impl Selection {
    pub fn new(year: Option<i64>, constituency: Option<String>) -> Self {
        Self { year, constituency }
    }

    pub fn constituency(&self) -> Option<&str> {
        self.constituency.as_deref()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{}", year)?,
            None => f.write_str("all years")?,
        }
        match &self.constituency {
            Some(name) => write!(f, " / {}", name),
            None => f.write_str(" / all constituencies"),
        }
    }
}

/// The four dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartId {
    OverallTime,
    GenderTime,
    ConstituencyTime,
    ConstituencyGender,
}

impl ChartId {
    pub const ALL: [ChartId; 4] = [
        ChartId::OverallTime,
        ChartId::GenderTime,
        ChartId::ConstituencyTime,
        ChartId::ConstituencyGender,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ChartId::OverallTime => "overall-time",
            ChartId::GenderTime => "gender-time",
            ChartId::ConstituencyTime => "const-time",
            ChartId::ConstituencyGender => "const-gender",
        }
    }
}

/// Inputs that may change the selection.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    YearChanged(Option<i64>),
    ConstituencyChanged(Option<String>),
    ChartClicked {
        chart: ChartId,
        category: Option<String>,
        year: Option<i64>,
    },
}

impl SelectionEvent {
    /// Lower is applied first when several inputs fire together.
    pub fn priority(&self) -> u8 {
        match self {
            SelectionEvent::YearChanged(_) => 0,
            SelectionEvent::ConstituencyChanged(_) => 1,
            SelectionEvent::ChartClicked { chart, .. } => match chart {
                ChartId::ConstituencyTime => 2,
                ChartId::ConstituencyGender => 3,
                ChartId::OverallTime => 4,
                ChartId::GenderTime => 5,
            },
        }
    }
}

/// Apply a single event. Clicks without the attributes their chart needs
/// leave the selection as it was.
pub fn reduce(selection: &Selection, event: &SelectionEvent) -> Selection {
    match event {
        SelectionEvent::YearChanged(year) => Selection {
            year: *year,
            ..selection.clone()
        },
        SelectionEvent::ConstituencyChanged(name) => Selection {
            constituency: name.clone(),
            ..selection.clone()
        },
        SelectionEvent::ChartClicked {
            chart: ChartId::ConstituencyTime | ChartId::ConstituencyGender,
            category: Some(name),
            year: Some(year),
        } => Selection {
            year: Some(*year),
            constituency: Some(name.clone()),
        },
        SelectionEvent::ChartClicked {
            chart: ChartId::OverallTime,
            year: Some(year),
            ..
        } => Selection {
            year: Some(*year),
            ..selection.clone()
        },
        SelectionEvent::ChartClicked { .. } => selection.clone(),
    }
}

/// Apply the single winning event of a batch: the highest priority one, the
/// latest among equals. An empty batch leaves the selection unchanged.
pub fn resolve(selection: &Selection, events: &[SelectionEvent]) -> Selection {
    let winner = events
        .iter()
        .enumerate()
        .min_by_key(|(idx, event)| (event.priority(), std::cmp::Reverse(*idx)))
        .map(|(_, event)| event);

    match winner {
        Some(event) => {
            let next = reduce(selection, event);
            debug!("resolve: {:?} => {} -> {}", event, selection, next);
            next
        }
        None => selection.clone(),
    }
}
