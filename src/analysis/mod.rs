//! Analysis modules.
//!
//! The aggregation pipeline over the merged crime table.

pub mod aggregator;

pub use aggregator::*;
