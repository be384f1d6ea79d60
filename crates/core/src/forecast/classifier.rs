use rust_decimal::Decimal;

use crate::domain::recommendation::{Action, Recommendation};

/// Adjusted demand below this pauses the scenario regardless of price.
pub const DEMAND_FLOOR: f64 = 25.0;
/// Allowed relative gap between user and recommended price, either side.
pub const PRICE_TOLERANCE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

pub trait RecommendationPolicy: Send + Sync {
    fn classify(
        &self,
        adjusted_demand: f64,
        user_price: u64,
        recommended_price: u64,
    ) -> Recommendation;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ToleranceBandPolicy;

impl RecommendationPolicy for ToleranceBandPolicy {
    fn classify(
        &self,
        adjusted_demand: f64,
        user_price: u64,
        recommended_price: u64,
    ) -> Recommendation {
        classify_price(adjusted_demand, user_price, recommended_price)
    }
}

pub fn classify_price(
    adjusted_demand: f64,
    user_price: u64,
    recommended_price: u64,
) -> Recommendation {
    if adjusted_demand < DEMAND_FLOOR {
        return Recommendation {
            action: Action::RemoveOrPause,
            reason: format!(
                "Demand is too low for this month to support ₹{recommended_price}. \
                 Pause or shift month/city."
            ),
        };
    }

    let diff = Decimal::from(user_price) - Decimal::from(recommended_price);
    let diff_pct = diff / Decimal::from(recommended_price.max(1));

    if diff_pct < -PRICE_TOLERANCE {
        Recommendation {
            action: Action::IncreasePrice,
            reason: format!("Your price is low vs recommended ₹{recommended_price}."),
        }
    } else if diff_pct > PRICE_TOLERANCE {
        Recommendation {
            action: Action::DecreasePrice,
            reason: format!("Your price is high vs recommended ₹{recommended_price}."),
        }
    } else {
        Recommendation {
            action: Action::Keep,
            reason: format!("Your price is close to recommended ₹{recommended_price}."),
        }
    }
}
