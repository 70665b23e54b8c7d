//! Dashboard aggregation: four independent upstream reads merged into one snapshot.

mod service;

pub use service::{READING_HABIT, WATER_HABIT, WidgetService};
