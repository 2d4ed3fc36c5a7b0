//! Dashboard export: JSON summary and PNG charts.

use crate::charts::StaticChartRenderer;
use crate::dashboard::DashboardView;
use log::info;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub const PNG_WIDTH: u32 = 1200;
pub const PNG_HEIGHT: u32 = 700;

/// Write the view as pretty-printed JSON.
pub fn write_json(view: &DashboardView, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), view)?;
    info!("Wrote dashboard JSON to {}", path.display());
    Ok(())
}

/// Render every chart into `dir` as `chart-<id>.png`. Returns the written paths.
pub fn write_png_dir(view: &DashboardView, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for chart in &view.charts {
        let path = dir.join(format!("chart-{}.png", chart.id.slug()));
        StaticChartRenderer::render_png(chart, &path, PNG_WIDTH, PNG_HEIGHT)
            .map_err(|e| anyhow::anyhow!("Rendering {} failed: {}", chart.id.slug(), e))?;
        written.push(path);
    }

    info!("Wrote {} charts to {}", written.len(), dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;
    use crate::state::Selection;

    #[test]
    fn json_export_contains_kpis_and_charts() {
        let view = DashboardView::build(&fixtures::store(), &Selection::new(Some(2024), None)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");

        write_json(&view, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["selection"]["year"], 2024);
        assert_eq!(value["charts"].as_array().unwrap().len(), 4);
        assert_eq!(value["charts"][0]["id"], "overall_time");
        assert_eq!(value["charts"][3]["kind"], "faceted_grouped_bar");
        assert!(value["kpis"]["overall"].is_number());
    }
}
