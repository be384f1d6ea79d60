use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::category::ShowCategory;
use crate::errors::DomainError;
use crate::reference::ReferenceTables;

/// City-adjusted demand at which the demand factor is exactly 1.0.
pub const NEUTRAL_DEMAND: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
pub const MIN_DEMAND_FACTOR: Decimal = Decimal::from_parts(70, 0, 0, false, 2);
pub const MAX_DEMAND_FACTOR: Decimal = Decimal::from_parts(160, 0, 0, false, 2);
pub const PRICE_STEP: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Demand range that maps onto the factor band; anything outside saturates.
const SATURATION_DEMAND: (f64, f64) = (35.0, 80.0);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub recommended_price: u64,
    pub demand_factor: f64,
    pub base_price: u64,
    pub city_multiplier: f64,
}

pub trait PricingEngine: Send + Sync {
    fn recommend(
        &self,
        tables: &ReferenceTables,
        category: &ShowCategory,
        city: &str,
        city_adjusted_demand: f64,
    ) -> Result<PricingResult, DomainError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DemandBandPricingEngine;

impl PricingEngine for DemandBandPricingEngine {
    fn recommend(
        &self,
        tables: &ReferenceTables,
        category: &ShowCategory,
        city: &str,
        city_adjusted_demand: f64,
    ) -> Result<PricingResult, DomainError> {
        recommend_price(tables, category, city, city_adjusted_demand)
    }
}

/// `base_price * city_multiplier * clamp(demand / 50, 0.70, 1.60)`, rounded to the nearest 100.
pub fn recommend_price(
    tables: &ReferenceTables,
    category: &ShowCategory,
    city: &str,
    city_adjusted_demand: f64,
) -> Result<PricingResult, DomainError> {
    let base_price = tables
        .base_price(category)
        .ok_or_else(|| DomainError::UnknownCategory(category.to_string()))?;
    let city_multiplier = tables.city_multiplier(city);

    let demand_factor = demand_factor(city_adjusted_demand)?;
    let multiplier = to_decimal("city multiplier", city_multiplier)?;
    let raw_price = Decimal::from(base_price)
        .checked_mul(multiplier)
        .and_then(|price| price.checked_mul(demand_factor))
        .ok_or_else(|| {
            DomainError::InvariantViolation(format!(
                "price for base {base_price} at city multiplier {city_multiplier} overflows"
            ))
        })?;
    let recommended_price = round_to_price_step(raw_price)?;

    Ok(PricingResult {
        recommended_price,
        demand_factor: demand_factor.to_f64().unwrap_or_default(),
        base_price,
        city_multiplier,
    })
}

/// Ratio of adjusted demand to the neutral baseline, held inside `[0.70, 1.60]`.
pub fn demand_factor(city_adjusted_demand: f64) -> Result<Decimal, DomainError> {
    if !city_adjusted_demand.is_finite() {
        return Err(DomainError::InvariantViolation(format!(
            "city adjusted demand must be a finite number, got {city_adjusted_demand}"
        )));
    }
    let (low, high) = SATURATION_DEMAND;
    let demand = to_decimal("city adjusted demand", city_adjusted_demand.clamp(low, high))?;
    Ok((demand / NEUTRAL_DEMAND).clamp(MIN_DEMAND_FACTOR, MAX_DEMAND_FACTOR))
}

/// Exact halves go to the even hundred.
pub fn round_to_price_step(raw_price: Decimal) -> Result<u64, DomainError> {
    if raw_price.is_sign_negative() && !raw_price.is_zero() {
        return Err(DomainError::InvariantViolation(format!(
            "recommended price cannot be negative, got {raw_price}"
        )));
    }

    let steps =
        (raw_price / PRICE_STEP).round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    steps.checked_mul(PRICE_STEP).and_then(|price| price.to_u64()).ok_or_else(|| {
        DomainError::InvariantViolation(format!("recommended price {raw_price} is out of range"))
    })
}

fn to_decimal(label: &str, value: f64) -> Result<Decimal, DomainError> {
    Decimal::from_f64(value).ok_or_else(|| {
        DomainError::InvariantViolation(format!(
            "{label} must be a finite number within decimal range, got {value}"
        ))
    })
}
