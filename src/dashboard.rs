//! Dashboard View
//! One recomputation cycle: the KPIs and the four charts for a selection.

use crate::charts::{ChartBuilder, ChartSpec};
use crate::data::{AggregateError, DataStore};
use crate::state::Selection;
use crate::stats::{KpiCalculator, KpiSummary};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub selection: Selection,
    pub kpis: KpiSummary,
    pub charts: Vec<ChartSpec>,
}

impl DashboardView {
    /// Derive everything shown for `selection`. Deterministic for an
    /// unchanged store and selection.
    pub fn build(store: &DataStore, selection: &Selection) -> Result<Self, AggregateError> {
        let rows = store.filter(selection.year, selection.constituency())?;
        let kpis = KpiCalculator::compute(&rows)?;
        let charts = ChartBuilder::build_all(store, selection)?;

        Ok(Self {
            selection: selection.clone(),
            kpis,
            charts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;
    use crate::stats::Kpi;

    #[test]
    fn recomputing_is_idempotent() {
        let store = fixtures::store();
        let selection = Selection::new(Some(2019), Some("Delhi".to_string()));

        let first = DashboardView::build(&store, &selection).unwrap();
        let second = DashboardView::build(&store, &selection).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn kpis_follow_the_selection() {
        let store = fixtures::store();

        let view = DashboardView::build(&store, &Selection::new(Some(2014), Some("Delhi".to_string())))
            .unwrap();
        assert_eq!(view.kpis.overall, Kpi::Value(65.0));

        let view = DashboardView::build(&store, &Selection::new(Some(2009), None)).unwrap();
        assert_eq!(view.kpis.overall, Kpi::NotAvailable);
    }

    #[test]
    fn empty_store_degrades_to_no_data() {
        let view = DashboardView::build(&DataStore::empty(), &Selection::default()).unwrap();
        assert_eq!(view.kpis.female, Kpi::NotAvailable);
        assert_eq!(view.charts.len(), 4);
        assert!(view.charts.iter().all(|c| c.is_empty()));
    }
}
