use serde::{Deserialize, Serialize};

/// Weight log from `GET /1/user/-/body/log/weight/date/{date}/7d.json`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WeightResponse {
    #[serde(default, rename = "weight")]
    pub records: Vec<WeightRecord>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WeightRecord {
    pub weight: f64,
    pub date: String,
}
