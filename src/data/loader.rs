//! Turnout Data Loader Module
//! Loads the election workbook (Excel via calamine, CSV via Polars) and
//! normalizes it into the fixed turnout schema.

use crate::data::schema::{self, COLUMNS, CONSTITUENCY, COUNT_COLUMNS, RATIO_COLUMNS, STATE, YEAR};
use calamine::{open_workbook_auto, DataType as Cell, Reader};
use log::{debug, info, warn};
use polars::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data file not found: {0}")]
    NotFound(PathBuf),
    #[error("Unsupported data file format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("Failed to read workbook: {0}")]
    ExcelError(#[from] calamine::Error),
    #[error("Worksheet not found: {0}")]
    MissingSheet(String),
    #[error("Expected {expected} columns, found {found}")]
    SchemaMismatch { expected: usize, found: usize },
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Read-only store of the normalized turnout rows.
#[derive(Clone)]
pub struct DataStore {
    df: DataFrame,
    source: Option<PathBuf>,
}

impl Default for DataStore {
    fn default() -> Self {
        Self::empty()
    }
}

impl DataStore {
    /// Empty store with the full schema.
    pub fn empty() -> Self {
        Self {
            df: schema::empty_table(),
            source: None,
        }
    }

    /// Build a store from an already loaded frame. Headers are replaced
    /// positionally and numeric columns coerced.
    pub fn from_frame(raw: DataFrame) -> Result<Self, LoaderError> {
        Ok(Self {
            df: normalize(raw)?,
            source: None,
        })
    }

    /// Load a data file, dispatching on its extension.
    pub fn load(path: &Path, sheet: Option<&str>) -> Result<Self, LoaderError> {
        if !path.exists() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let raw = match extension.as_str() {
            "csv" => read_csv(path)?,
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path, sheet)?,
            _ => return Err(LoaderError::UnsupportedFormat(path.to_path_buf())),
        };

        let mut store = Self::from_frame(raw)?;
        store.source = Some(path.to_path_buf());
        info!("Loaded {} rows from {}", store.row_count(), path.display());

        Ok(store)
    }

    /// Load a data file, falling back to an empty table on any failure.
    pub fn load_or_empty(path: &Path, sheet: Option<&str>) -> Self {
        match Self::load(path, sheet) {
            Ok(store) => store,
            Err(LoaderError::NotFound(p)) => {
                warn!(
                    "{} not found. Please ensure the data file is in the expected location.",
                    p.display()
                );
                Self::empty()
            }
            Err(e) => {
                warn!("Could not load {}: {}", path.display(), e);
                Self::empty()
            }
        }
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Path the rows were loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Sorted distinct years.
    pub fn years(&self) -> Vec<i64> {
        distinct_years(&self.df)
    }

    /// Sorted distinct constituencies.
    pub fn constituencies(&self) -> Vec<String> {
        self.df
            .column(CONSTITUENCY)
            .ok()
            .and_then(|col| col.str().ok())
            .map(|ca| {
                ca.into_iter()
                    .flatten()
                    .map(|s| s.to_string())
                    .collect::<BTreeSet<String>>()
                    .into_iter()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Rows matching the year and constituency, when given.
    pub fn filter(
        &self,
        year: Option<i64>,
        constituency: Option<&str>,
    ) -> Result<DataFrame, PolarsError> {
        filter_frame(&self.df, year, constituency)
    }
}

/// Filter a turnout frame by year equality and constituency equality.
pub fn filter_frame(
    df: &DataFrame,
    year: Option<i64>,
    constituency: Option<&str>,
) -> Result<DataFrame, PolarsError> {
    if year.is_none() && constituency.is_none() {
        return Ok(df.clone());
    }

    let mut lazy = df.clone().lazy();
    if let Some(year) = year {
        lazy = lazy.filter(col(YEAR).eq(lit(year)));
    }
    if let Some(name) = constituency {
        lazy = lazy.filter(col(CONSTITUENCY).eq(lit(name)));
    }
    lazy.collect()
}

/// Sorted distinct values of the Year column.
pub fn distinct_years(df: &DataFrame) -> Vec<i64> {
    df.column(YEAR)
        .ok()
        .and_then(|col| col.i64().ok())
        .map(|ca| {
            ca.into_iter()
                .flatten()
                .collect::<BTreeSet<i64>>()
                .into_iter()
                .collect()
        })
        .unwrap_or_default()
}

/// Every column is read as text; `normalize` does the numeric coercion so
/// late rows are never judged against a type inferred from early ones.
fn read_csv(path: &Path) -> Result<DataFrame, LoaderError> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(0))
        .finish()?
        .collect()?;
    Ok(df)
}

/// Read the first worksheet (or the named one) into a raw frame with the
/// 14 schema columns. The header row is skipped.
fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<DataFrame, LoaderError> {
    let mut workbook = open_workbook_auto(path)?;

    let range = match sheet {
        Some(name) => workbook
            .worksheet_range(name)
            .ok_or_else(|| LoaderError::MissingSheet(name.to_string()))??,
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| LoaderError::MissingSheet("<first>".to_string()))??,
    };

    let width = range.width();
    if width < COLUMNS.len() {
        return Err(LoaderError::SchemaMismatch {
            expected: COLUMNS.len(),
            found: width,
        });
    }

    let mut rows = range.rows();
    if let Some(header) = rows.next() {
        debug!("read_workbook: header: {:?}", header);
    }

    let mut text: [Vec<Option<String>>; 2] = [Vec::new(), Vec::new()];
    let mut numbers: Vec<Vec<Option<f64>>> = vec![Vec::new(); COLUMNS.len() - 2];

    for row in rows {
        for (idx, values) in text.iter_mut().enumerate() {
            values.push(row.get(idx).and_then(cell_to_string));
        }
        for (offset, values) in numbers.iter_mut().enumerate() {
            values.push(row.get(offset + 2).and_then(cell_to_f64));
        }
    }

    let [constituencies, states] = text;
    let mut columns = vec![
        Column::new(CONSTITUENCY.into(), constituencies),
        Column::new(STATE.into(), states),
    ];
    for (name, values) in COLUMNS[2..].iter().zip(numbers) {
        columns.push(Column::new((*name).into(), values));
    }

    Ok(DataFrame::new(columns)?)
}

fn cell_to_f64(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Int(i) => Some(*i as f64),
        Cell::Float(f) if f.is_finite() => Some(*f),
        Cell::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn cell_to_string(cell: &Cell) -> Option<String> {
    match cell {
        Cell::String(s) => Some(s.trim().to_string()),
        Cell::Int(i) => Some(i.to_string()),
        Cell::Float(f) if !f.is_finite() => None,
        Cell::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
        Cell::Float(f) => Some(f.to_string()),
        Cell::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Rename columns positionally and coerce them to the schema types.
///
/// Counts: Float64, invalid entries become 0.
/// Ratios: Float64, invalid entries become null.
/// Year: Int64, rows where it is not a whole number are dropped.
fn normalize(raw: DataFrame) -> Result<DataFrame, LoaderError> {
    let width = raw.width();
    if width < COLUMNS.len() {
        return Err(LoaderError::SchemaMismatch {
            expected: COLUMNS.len(),
            found: width,
        });
    }
    if width > COLUMNS.len() {
        debug!(
            "normalize: ignoring {} trailing columns",
            width - COLUMNS.len()
        );
    }

    let source: Vec<String> = raw
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let exprs: Vec<Expr> = COLUMNS
        .iter()
        .zip(source.iter())
        .map(|(target, src)| {
            let expr = col(src.as_str());
            let expr = match *target {
                CONSTITUENCY | STATE => expr.cast(DataType::String),
                YEAR => whole_year(expr),
                name if COUNT_COLUMNS.contains(&name) => expr
                    .cast(DataType::Float64)
                    .fill_nan(lit(0.0))
                    .fill_null(lit(0.0)),
                name if RATIO_COLUMNS.contains(&name) => expr
                    .cast(DataType::Float64)
                    .fill_nan(lit(NULL).cast(DataType::Float64)),
                _ => expr,
            };
            expr.alias(*target)
        })
        .collect();

    let before = raw.height();
    let df = raw
        .lazy()
        .select(exprs)
        .filter(col(YEAR).is_not_null())
        .collect()?;

    let dropped = before - df.height();
    if dropped > 0 {
        warn!("Dropped {} rows without a whole-number Year", dropped);
    }

    Ok(df)
}

/// Parse through Float64 so "2014.0" is accepted, then keep only whole
/// years. Fractional or non-finite values become null.
fn whole_year(expr: Expr) -> Expr {
    let year = expr.cast(DataType::Float64);
    let truncated = year.clone().cast(DataType::Int64);
    when(truncated.clone().cast(DataType::Float64).eq(year))
        .then(truncated)
        .otherwise(lit(NULL).cast(DataType::Int64))
}
