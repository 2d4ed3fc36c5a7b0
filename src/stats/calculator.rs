//! KPI Calculator Module
//! Elector-weighted turnout percentages for the current selection.

use crate::data::schema::{Gender, ELECTORS_TOTAL, VOTES_POLLED_TOTAL};
use polars::prelude::*;
use serde::{Serialize, Serializer};
use std::fmt;

/// Text shown when the selection matches no rows.
pub const NOT_AVAILABLE: &str = "N/A";

/// A single turnout percentage, or "not available" for an empty selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kpi {
    Value(f64),
    NotAvailable,
}

impl fmt::Display for Kpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kpi::Value(v) => write!(f, "{:.2}%", v),
            Kpi::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for Kpi {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Kpi::Value(v) => serializer.serialize_f64(*v),
            Kpi::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// The three KPI boxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiSummary {
    pub overall: Kpi,
    pub male: Kpi,
    pub female: Kpi,
}

impl KpiSummary {
    pub fn not_available() -> Self {
        Self {
            overall: Kpi::NotAvailable,
            male: Kpi::NotAvailable,
            female: Kpi::NotAvailable,
        }
    }

    /// (title, value) pairs in display order.
    pub fn entries(&self) -> [(&'static str, Kpi); 3] {
        [
            ("Overall Turnout", self.overall),
            ("Male Turnout", self.male),
            ("Female Turnout", self.female),
        ]
    }
}

pub struct KpiCalculator;

impl KpiCalculator {
    /// Compute the KPIs over an already filtered frame.
    pub fn compute(df: &DataFrame) -> Result<KpiSummary, PolarsError> {
        if df.height() == 0 {
            return Ok(KpiSummary::not_available());
        }

        let (male_votes, male_electors) = Gender::Male.count_columns();
        let (female_votes, female_electors) = Gender::Female.count_columns();

        Ok(KpiSummary {
            overall: Self::percentage(df, VOTES_POLLED_TOTAL, ELECTORS_TOTAL)?,
            male: Self::percentage(df, male_votes, male_electors)?,
            female: Self::percentage(df, female_votes, female_electors)?,
        })
    }

    /// 100 * sum(votes) / sum(electors), 0 when there are no electors.
    fn percentage(df: &DataFrame, votes: &str, electors: &str) -> Result<Kpi, PolarsError> {
        let votes = Self::column_sum(df, votes)?;
        let electors = Self::column_sum(df, electors)?;

        if electors > 0.0 {
            Ok(Kpi::Value(votes * 100.0 / electors))
        } else {
            Ok(Kpi::Value(0.0))
        }
    }

    fn column_sum(df: &DataFrame, name: &str) -> Result<f64, PolarsError> {
        let values = df.column(name)?.cast(&DataType::Float64)?;
        let sum = values
            .f64()?
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .sum();
        Ok(sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{fixtures, schema};

    fn value(kpi: Kpi) -> f64 {
        match kpi {
            Kpi::Value(v) => v,
            Kpi::NotAvailable => panic!("expected a value"),
        }
    }

    #[test]
    fn empty_selection_is_not_available() {
        let kpis = KpiCalculator::compute(&schema::empty_table()).unwrap();
        assert_eq!(kpis, KpiSummary::not_available());
        assert_eq!(kpis.overall.to_string(), "N/A");
    }

    #[test]
    fn zero_electors_do_not_divide() {
        let df = df!(
            "Electors_Total" => [0.0, 0.0],
            "Electors_Male" => [0.0, 0.0],
            "Electors_Female" => [0.0, 0.0],
            "Votes_Polled_Total" => [0.0, 0.0],
            "Votes_Polled_Male" => [0.0, 0.0],
            "Votes_Polled_Female" => [0.0, 0.0]
        )
        .unwrap();

        let kpis = KpiCalculator::compute(&df).unwrap();
        assert_eq!(kpis.overall, Kpi::Value(0.0));
        assert_eq!(kpis.male, Kpi::Value(0.0));
        assert_eq!(kpis.female, Kpi::Value(0.0));
    }

    #[test]
    fn percentages_are_weighted_by_electors() {
        let store = fixtures::store();
        let delhi_2014 = store.filter(Some(2014), Some("Delhi")).unwrap();
        let kpis = KpiCalculator::compute(&delhi_2014).unwrap();

        assert_eq!(kpis.overall, Kpi::Value(65.0));
        assert_eq!(kpis.female.to_string(), "62.50%");
        let male = value(kpis.male);
        assert!((male - 400.0 / 600.0 * 100.0).abs() < 1e-9);

        // Pooled, not an average of per-row percentages.
        let all_2014 = store.filter(Some(2014), None).unwrap();
        let kpis = KpiCalculator::compute(&all_2014).unwrap();
        let overall = value(kpis.overall);
        assert!((overall - 1750.0 / 3000.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn serializes_missing_values_as_text() {
        let json = serde_json::to_value(KpiSummary {
            overall: Kpi::Value(61.5),
            male: Kpi::NotAvailable,
            female: Kpi::Value(0.0),
        })
        .unwrap();
        assert_eq!(json["overall"], 61.5);
        assert_eq!(json["male"], "N/A");
    }
}
