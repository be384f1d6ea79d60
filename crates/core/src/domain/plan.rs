use serde::{Deserialize, Serialize};

use crate::domain::{category::ShowCategory, recommendation::Action};

/// Snapshot of one evaluated scenario. Field names double as the export column headers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    #[serde(rename = "Show_Type")]
    pub show_type: ShowCategory,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Month")]
    pub month: String,
    #[serde(rename = "Your_Price")]
    pub your_price: u64,
    #[serde(rename = "Recommended_Price")]
    pub recommended_price: u64,
    #[serde(rename = "Adj_Demand")]
    pub adj_demand: f64,
    #[serde(rename = "Recommendation")]
    pub recommendation: Action,
}
