use serde::{Deserialize, Serialize};

/// One row of the static search-demand dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DemandRecord {
    pub keyword: String,
    /// Calendar month, 1..=12.
    pub month: u8,
    pub demand_index: f64,
    pub trend_score: f64,
}

/// Month-level demand for a category, scaled by the city's affordability multiplier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregatedDemand {
    pub avg_demand_index: f64,
    pub avg_trend_score: f64,
    pub city_multiplier: f64,
    pub city_adjusted_demand: f64,
    pub matched_records: usize,
}
