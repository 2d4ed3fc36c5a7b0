//! Charts module - chart specifications and rendering

mod builder;
mod plotter;
mod renderer;

pub use builder::{
    ChartBuilder, ChartKind, ChartSpec, Facet, Rgb, FEMALE_TEXT_COLOR, MALE_COLOR, OVERALL_COLOR,
};
pub use plotter::ChartPlotter;
pub use renderer::StaticChartRenderer;
