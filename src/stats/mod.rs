//! Stats module - KPI summaries

mod calculator;

pub use calculator::{Kpi, KpiCalculator, KpiSummary};
