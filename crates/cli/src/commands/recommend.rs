use showprice_core::{
    config::LoadOptions, ApplicationError, ForecastEvaluation, ForecastRuntime, Month,
    ScenarioInput, ShowCategory,
};

use crate::commands::{to_json, CommandResult, ForecastContext};

pub fn run(
    options: &LoadOptions,
    category: &str,
    city: &str,
    month: &str,
    price: u64,
    json_output: bool,
) -> CommandResult {
    match evaluate(options, category, city, month, price) {
        Ok(evaluation) if json_output => to_json("recommend", &evaluation),
        Ok(evaluation) => CommandResult::raw(render_human(&evaluation)),
        Err(error) => CommandResult::from_error("recommend", &error),
    }
}

fn evaluate(
    options: &LoadOptions,
    category: &str,
    city: &str,
    month: &str,
    price: u64,
) -> Result<ForecastEvaluation, ApplicationError> {
    let month = month.parse::<Month>()?;
    let context = ForecastContext::load(options)?;

    if !context.tables.is_known_city(city) {
        tracing::warn!(
            event_name = "forecast.city.unknown",
            city,
            "city not in reference tables; using neutral multiplier"
        );
    }

    let runtime = ForecastRuntime::with_defaults(&context.tables, &context.dataset);
    let scenario = ScenarioInput {
        category: ShowCategory::from(category),
        city: city.to_string(),
        month,
        user_price: price,
    };
    Ok(runtime.evaluate(&scenario)?)
}

pub(crate) fn render_human(evaluation: &ForecastEvaluation) -> String {
    let scenario = &evaluation.scenario;
    let demand = &evaluation.demand;
    let lines = [
        format!("{} in {} ({})", scenario.category, scenario.city, scenario.month),
        "demand snapshot:".to_string(),
        format!("- avg demand index (month): {:.2}", demand.avg_demand_index),
        format!("- avg trend score (month): {:.2}", demand.avg_trend_score),
        format!("- matched dataset rows: {}", demand.matched_records),
        format!("- city multiplier: {:.2}", demand.city_multiplier),
        format!("- city adjusted demand: {:.2}", demand.city_adjusted_demand),
        "pricing:".to_string(),
        format!("- demand factor: {:.2}", evaluation.pricing.demand_factor),
        format!("- recommended price: {}", evaluation.pricing.recommended_price),
        format!("- your price: {}", scenario.user_price),
        "recommendation:".to_string(),
        format!("- action: {}", evaluation.recommendation.action),
        format!("- reason: {}", evaluation.recommendation.reason),
    ];

    lines.join("\n")
}
