//! Turnout Table Schema
//! Fixed column layout of the election workbook.

use polars::prelude::*;
use serde::Serialize;
use std::fmt;

pub const CONSTITUENCY: &str = "Constituency";
pub const STATE: &str = "State";
pub const YEAR: &str = "Year";
pub const ELECTORS_TOTAL: &str = "Electors_Total";
pub const ELECTORS_MALE: &str = "Electors_Male";
pub const ELECTORS_FEMALE: &str = "Electors_Female";
pub const VOTES_POLLED_TOTAL: &str = "Votes_Polled_Total";
pub const VOTES_POLLED_MALE: &str = "Votes_Polled_Male";
pub const VOTES_POLLED_FEMALE: &str = "Votes_Polled_Female";
pub const VOTES_POLLED_POSTAL: &str = "Votes_Polled_Postal";
pub const TURNOUT_RATIO_OVERALL: &str = "Turnout_Ratio_Overall";
pub const TURNOUT_RATIO_MALE: &str = "Turnout_Ratio_Male";
pub const TURNOUT_RATIO_FEMALE: &str = "Turnout_Ratio_Female";
pub const TURNOUT_RATIO_POSTAL: &str = "Turnout_Ratio_Postal";

/// Derived columns produced by the aggregations.
pub const TURNOUT_RATIO_OVERALL_AGG: &str = "Turnout_Ratio_Overall_Agg";
pub const GENDER: &str = "Gender";
pub const TURNOUT_RATIO: &str = "Turnout_Ratio";

/// Column names in file order. Input headers are replaced positionally.
pub const COLUMNS: [&str; 14] = [
    CONSTITUENCY,
    STATE,
    YEAR,
    ELECTORS_TOTAL,
    ELECTORS_MALE,
    ELECTORS_FEMALE,
    VOTES_POLLED_TOTAL,
    VOTES_POLLED_MALE,
    VOTES_POLLED_FEMALE,
    VOTES_POLLED_POSTAL,
    TURNOUT_RATIO_OVERALL,
    TURNOUT_RATIO_MALE,
    TURNOUT_RATIO_FEMALE,
    TURNOUT_RATIO_POSTAL,
];

/// Raw counts: coerced to numbers, invalid entries become zero.
pub const COUNT_COLUMNS: [&str; 7] = [
    ELECTORS_TOTAL,
    ELECTORS_MALE,
    ELECTORS_FEMALE,
    VOTES_POLLED_TOTAL,
    VOTES_POLLED_MALE,
    VOTES_POLLED_FEMALE,
    VOTES_POLLED_POSTAL,
];

/// Percentages: coerced to numbers, invalid entries become null.
pub const RATIO_COLUMNS: [&str; 4] = [
    TURNOUT_RATIO_OVERALL,
    TURNOUT_RATIO_MALE,
    TURNOUT_RATIO_FEMALE,
    TURNOUT_RATIO_POSTAL,
];

/// Gender split used by the by-gender views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    /// (weight column, ratio column) for the weighted mean.
    pub fn columns(&self) -> (&'static str, &'static str) {
        match self {
            Gender::Male => (ELECTORS_MALE, TURNOUT_RATIO_MALE),
            Gender::Female => (ELECTORS_FEMALE, TURNOUT_RATIO_FEMALE),
        }
    }

    /// (votes column, electors column) for the KPI percentages.
    pub fn count_columns(&self) -> (&'static str, &'static str) {
        match self {
            Gender::Male => (VOTES_POLLED_MALE, ELECTORS_MALE),
            Gender::Female => (VOTES_POLLED_FEMALE, ELECTORS_FEMALE),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data type of a normalized column.
pub fn dtype_of(name: &str) -> DataType {
    match name {
        CONSTITUENCY | STATE | GENDER => DataType::String,
        YEAR => DataType::Int64,
        _ => DataType::Float64,
    }
}

/// Empty frame with the given columns, typed as the normalized table types them.
pub fn empty_frame(columns: &[&str]) -> DataFrame {
    let cols: Vec<Column> = columns
        .iter()
        .map(|name| Column::new_empty((*name).into(), &dtype_of(name)))
        .collect();
    DataFrame::new(cols).unwrap_or_default()
}

/// Empty table with the full 14-column schema.
pub fn empty_table() -> DataFrame {
    empty_frame(&COLUMNS)
}
