pub mod aggregator;
pub mod classifier;
pub mod recommender;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::dataset::DemandSource;
use crate::domain::{
    category::ShowCategory,
    demand::AggregatedDemand,
    month::Month,
    plan::PlanEntry,
    recommendation::Recommendation,
};
use crate::errors::DomainError;
use crate::reference::ReferenceTables;

use self::{
    aggregator::aggregate_demand,
    classifier::{RecommendationPolicy, ToleranceBandPolicy},
    recommender::{DemandBandPricingEngine, PricingEngine, PricingResult},
};

/// One user scenario: what, where, when, and at what price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub category: ShowCategory,
    pub city: String,
    pub month: Month,
    pub user_price: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastEvaluation {
    pub scenario: ScenarioInput,
    pub demand: AggregatedDemand,
    pub pricing: PricingResult,
    pub recommendation: Recommendation,
}

impl ForecastEvaluation {
    pub fn to_plan_entry(&self) -> PlanEntry {
        PlanEntry {
            show_type: self.scenario.category.clone(),
            city: self.scenario.city.clone(),
            month: self.scenario.month.label().to_string(),
            your_price: self.scenario.user_price,
            recommended_price: self.pricing.recommended_price,
            adj_demand: round_to_cents(self.demand.city_adjusted_demand),
            recommendation: self.recommendation.action,
        }
    }
}

/// Two decimals, ties to even on the exact binary value. Out-of-range values pass through.
fn round_to_cents(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|exact| exact.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
        .and_then(|rounded| rounded.to_f64())
        .unwrap_or(value)
}

/// Runs aggregation, pricing, and classification against shared read-only data.
pub struct ForecastRuntime<'a, S: ?Sized, P, C> {
    tables: &'a ReferenceTables,
    source: &'a S,
    pricing_engine: P,
    policy: C,
}

impl<'a, S: ?Sized, P, C> ForecastRuntime<'a, S, P, C> {
    pub fn new(tables: &'a ReferenceTables, source: &'a S, pricing_engine: P, policy: C) -> Self {
        Self { tables, source, pricing_engine, policy }
    }

    pub fn tables(&self) -> &ReferenceTables {
        self.tables
    }
}

impl<'a, S> ForecastRuntime<'a, S, DemandBandPricingEngine, ToleranceBandPolicy>
where
    S: DemandSource + ?Sized,
{
    pub fn with_defaults(tables: &'a ReferenceTables, source: &'a S) -> Self {
        Self::new(tables, source, DemandBandPricingEngine, ToleranceBandPolicy)
    }
}

impl<S, P, C> ForecastRuntime<'_, S, P, C>
where
    S: DemandSource + ?Sized,
    P: PricingEngine,
    C: RecommendationPolicy,
{
    pub fn evaluate(&self, scenario: &ScenarioInput) -> Result<ForecastEvaluation, DomainError> {
        let demand = aggregate_demand(
            self.source,
            self.tables,
            &scenario.category,
            &scenario.city,
            scenario.month,
        )?;
        let pricing = self.pricing_engine.recommend(
            self.tables,
            &scenario.category,
            &scenario.city,
            demand.city_adjusted_demand,
        )?;
        let recommendation = self.policy.classify(
            demand.city_adjusted_demand,
            scenario.user_price,
            pricing.recommended_price,
        );

        tracing::info!(
            event_name = "forecast.evaluate.completed",
            category = %scenario.category,
            city = %scenario.city,
            month = scenario.month.label(),
            user_price = scenario.user_price,
            recommended_price = pricing.recommended_price,
            action = recommendation.action.label(),
            "scenario evaluated"
        );

        Ok(ForecastEvaluation { scenario: scenario.clone(), demand, pricing, recommendation })
    }
}
