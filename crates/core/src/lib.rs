pub mod config;
pub mod dataset;
pub mod domain;
pub mod errors;
pub mod forecast;
pub mod plan;
pub mod reference;

pub use config::{AppConfig, ConfigError, LoadOptions, LogFormat};
pub use dataset::{DatasetError, DemandDataset, DemandSource};
pub use domain::category::ShowCategory;
pub use domain::demand::{AggregatedDemand, DemandRecord};
pub use domain::month::Month;
pub use domain::plan::PlanEntry;
pub use domain::recommendation::{Action, Recommendation};
pub use errors::{ApplicationError, DomainError};
pub use forecast::{
    classifier::{classify_price, RecommendationPolicy, ToleranceBandPolicy},
    recommender::{recommend_price, DemandBandPricingEngine, PricingEngine, PricingResult},
    ForecastEvaluation, ForecastRuntime, ScenarioInput,
};
pub use plan::{PlanExportError, PlanTable};
pub use reference::{CategoryProfile, ReferenceError, ReferenceTables};
