//! Data module - turnout table loading and aggregation

mod loader;
mod processor;
pub mod schema;

#[cfg(test)]
pub(crate) mod fixtures;

pub use loader::DataStore;
pub use processor::{AggregateError, Aggregator};
