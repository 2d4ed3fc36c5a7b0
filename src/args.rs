use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_DATA_FILE: &str = "1100378_Final_Election_data.xlsx";

/// Voter turnout dashboard for constituencies across general elections.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The turnout workbook (.xlsx/.xls) or CSV file. A missing file starts the
    /// dashboard with an empty table.
    #[clap(short, long, value_parser, default_value = DEFAULT_DATA_FILE)]
    pub data: PathBuf,

    /// (default: first worksheet) When using an Excel file, the name of the worksheet to read.
    #[clap(long, value_parser)]
    pub sheet: Option<String>,

    /// Initial year selection. Unset means all years.
    #[clap(short, long, value_parser)]
    pub year: Option<i64>,

    /// Initial constituency selection. Unset means all constituencies.
    #[clap(short, long, value_parser)]
    pub constituency: Option<String>,

    /// (file path) Write the KPIs and chart data for the selection as JSON and exit without
    /// opening a window.
    #[clap(long, value_parser)]
    pub export_json: Option<PathBuf>,

    /// (directory) Render the four charts for the selection as PNG files and exit without
    /// opening a window.
    #[clap(long, value_parser)]
    pub export_png: Option<PathBuf>,

    /// If passed as an argument, will turn on verbose logging.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

impl Args {
    /// True when an export flag asks for a run without the GUI.
    pub fn is_headless(&self) -> bool {
        self.export_json.is_some() || self.export_png.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_open_the_gui() {
        let args = Args::parse_from(["turnout_dashboard"]);
        assert_eq!(args.data, PathBuf::from(DEFAULT_DATA_FILE));
        assert!(!args.is_headless());
        assert!(args.year.is_none());
    }

    #[test]
    fn export_flags_run_headless() {
        let args = Args::parse_from([
            "turnout_dashboard",
            "--data",
            "turnout.csv",
            "--year",
            "2019",
            "--constituency",
            "Delhi",
            "--export-json",
            "out.json",
        ]);
        assert!(args.is_headless());
        assert_eq!(args.year, Some(2019));
        assert_eq!(args.constituency.as_deref(), Some("Delhi"));
    }
}
