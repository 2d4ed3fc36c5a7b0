//! Turnout Aggregation Module
//! Elector-weighted turnout averages and long-format reshapes for charting.

use crate::data::schema::{
    self, Gender, CONSTITUENCY, ELECTORS_TOTAL, GENDER, TURNOUT_RATIO, TURNOUT_RATIO_OVERALL,
    TURNOUT_RATIO_OVERALL_AGG, YEAR,
};
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Pure aggregations over a turnout frame.
pub struct Aggregator;

impl Aggregator {
    /// sum(value * weight) / sum(weight) within the current group.
    ///
    /// Rows with a missing value contribute neither value nor weight.
    /// A zero weight sum yields 0.
    pub fn weighted_mean(value: &str, weight: &str) -> Expr {
        let present = col(value).is_not_null();
        let w = when(present.clone())
            .then(col(weight).cast(DataType::Float64))
            .otherwise(lit(0.0));
        let v = when(present)
            .then(col(value).cast(DataType::Float64))
            .otherwise(lit(0.0));

        let total = w.clone().sum();
        let weighted = (v * w).sum();

        when(total.clone().gt(lit(0.0)))
            .then(weighted / total)
            .otherwise(lit(0.0))
    }

    /// Elector-weighted overall turnout per year.
    ///
    /// Output columns: ["Year", "Turnout_Ratio_Overall_Agg"]
    pub fn aggregate_overall(df: &DataFrame) -> Result<DataFrame, AggregateError> {
        if df.height() == 0 {
            return Ok(schema::empty_frame(&[YEAR, TURNOUT_RATIO_OVERALL_AGG]));
        }

        let agg = df
            .clone()
            .lazy()
            .group_by([col(YEAR)])
            .agg([Self::weighted_mean(TURNOUT_RATIO_OVERALL, ELECTORS_TOTAL)
                .alias(TURNOUT_RATIO_OVERALL_AGG)])
            .sort_by_exprs([col(YEAR)], SortMultipleOptions::default())
            .collect()?;

        Ok(agg)
    }

    /// Elector-weighted turnout per year and gender, in long format.
    /// All Male rows come first, then all Female rows, each ordered by year.
    ///
    /// Output columns: ["Year", "Gender", "Turnout_Ratio"]
    pub fn aggregate_by_gender(df: &DataFrame) -> Result<DataFrame, AggregateError> {
        if df.height() == 0 {
            return Ok(schema::empty_frame(&[YEAR, GENDER, TURNOUT_RATIO]));
        }

        let aggs: Vec<Expr> = Gender::ALL
            .iter()
            .map(|gender| {
                let (weight, value) = gender.columns();
                Self::weighted_mean(value, weight).alias(gender.as_str())
            })
            .collect();

        let wide = df
            .clone()
            .lazy()
            .group_by([col(YEAR)])
            .agg(aggs)
            .sort_by_exprs([col(YEAR)], SortMultipleOptions::default())
            .collect()?;

        let year_ca = wide.column(YEAR)?.i64()?;

        let mut years: Vec<Option<i64>> = Vec::new();
        let mut genders: Vec<String> = Vec::new();
        let mut ratios: Vec<Option<f64>> = Vec::new();

        for gender in Gender::ALL {
            let value_ca = wide.column(gender.as_str())?.f64()?;
            for (year, ratio) in year_ca.into_iter().zip(value_ca.into_iter()) {
                years.push(year);
                genders.push(gender.as_str().to_string());
                ratios.push(ratio);
            }
        }

        let df = DataFrame::new(vec![
            Column::new(YEAR.into(), years),
            Column::new(GENDER.into(), genders),
            Column::new(TURNOUT_RATIO.into(), ratios),
        ])?;

        Ok(df)
    }

    /// Per-constituency overall turnout, no aggregation.
    ///
    /// Output columns: ["Constituency", "Year", "Turnout_Ratio_Overall"]
    pub fn constituency_over_time(df: &DataFrame) -> Result<DataFrame, AggregateError> {
        let projected = df
            .clone()
            .lazy()
            .select([col(CONSTITUENCY), col(YEAR), col(TURNOUT_RATIO_OVERALL)])
            .collect()?;
        Ok(projected)
    }

    /// Per-constituency male and female turnout in long format.
    /// The Male block precedes the Female block; input order is kept within
    /// each block and missing ratios stay null.
    ///
    /// Output columns: ["Constituency", "Year", "Gender", "Turnout_Ratio"]
    pub fn constituency_by_gender(df: &DataFrame) -> Result<DataFrame, AggregateError> {
        let const_col = df.column(CONSTITUENCY)?.cast(&DataType::String)?;
        let const_ca = const_col.str()?;
        let year_ca = df.column(YEAR)?.i64()?;

        let mut constituencies: Vec<Option<String>> = Vec::new();
        let mut years: Vec<Option<i64>> = Vec::new();
        let mut genders: Vec<String> = Vec::new();
        let mut ratios: Vec<Option<f64>> = Vec::new();

        for gender in Gender::ALL {
            let (_, ratio_col) = gender.columns();
            let ratio_f64 = df.column(ratio_col)?.cast(&DataType::Float64)?;
            let ratio_ca = ratio_f64.f64()?;

            for ((name, year), ratio) in const_ca
                .into_iter()
                .zip(year_ca.into_iter())
                .zip(ratio_ca.into_iter())
            {
                constituencies.push(name.map(|s| s.to_string()));
                years.push(year);
                genders.push(gender.as_str().to_string());
                ratios.push(ratio.filter(|v| !v.is_nan()));
            }
        }

        let df = DataFrame::new(vec![
            Column::new(CONSTITUENCY.into(), constituencies),
            Column::new(YEAR.into(), years),
            Column::new(GENDER.into(), genders),
            Column::new(TURNOUT_RATIO.into(), ratios),
        ])?;

        Ok(df)
    }
}
