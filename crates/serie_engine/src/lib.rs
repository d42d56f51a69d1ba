//! Serie Engine - Per-series incremental chart updates
//!
//! This crate keeps the visuals of chart series in sync with their data:
//! - Dirty-flag driven update engine, one per series
//! - Pooled data labels with rebuild and in-place value refresh
//! - Series titles
//! - Tooltip parameter building
//! - Legend click and hover handling
//! - A registry driving every series of a chart per tick
//!
//! The chart itself is reached only through the [`ChartHost`] trait.

mod config;
mod engine;
mod error;
mod format;
mod host;
mod label;
mod layout;
mod legend;
mod model;
mod pool;
mod registry;
mod stats;
mod theme;
mod title;
mod tooltip;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use format::*;
pub use host::*;
pub use label::*;
pub use layout::*;
pub use legend::*;
pub use model::*;
pub use pool::*;
pub use registry::*;
pub use stats::*;
pub use theme::*;
pub use title::*;
pub use tooltip::*;
