mod activity;
mod weight;

pub use activity::{Activity, ActivityGoals, ActivityResponse, ActivitySummary};
pub use weight::{WeightRecord, WeightResponse};
