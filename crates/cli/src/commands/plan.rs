use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use showprice_core::{
    config::LoadOptions, ApplicationError, ForecastEvaluation, ForecastRuntime, Month, PlanEntry,
    PlanTable, ScenarioInput, ShowCategory,
};

use crate::commands::{to_json, CommandResult, ForecastContext};

/// `[[scenario]]` tables read from the scenarios file.
#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[serde(default)]
    scenario: Vec<ScenarioSpec>,
}

#[derive(Debug, Deserialize)]
struct ScenarioSpec {
    category: String,
    city: String,
    month: MonthSpec,
    price: u64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MonthSpec {
    Number(u8),
    Label(String),
}

#[derive(Debug, Serialize)]
struct PlanReport<'a> {
    output: String,
    rows: usize,
    entries: &'a [PlanEntry],
    evaluations: &'a [ForecastEvaluation],
}

pub fn run(
    options: &LoadOptions,
    scenarios_path: &Path,
    output: Option<&Path>,
    json_output: bool,
) -> CommandResult {
    let scenarios = match read_scenarios(scenarios_path) {
        Ok(scenarios) => scenarios,
        Err(error) => {
            return CommandResult::failure("plan", "scenario_file", format!("{error:#}"), 6);
        }
    };

    let context = match ForecastContext::load(options) {
        Ok(context) => context,
        Err(error) => return CommandResult::from_error("plan", &error),
    };
    let output = output.unwrap_or(context.config.export.path.as_path()).to_path_buf();

    let mut plan = PlanTable::new();
    let evaluations = match build_plan(&context, &scenarios, &mut plan) {
        Ok(evaluations) => evaluations,
        Err(error) => return CommandResult::from_error("plan", &error),
    };

    if let Err(error) = plan.export(&output) {
        return CommandResult::from_error("plan", &ApplicationError::from(error));
    }

    if json_output {
        return to_json(
            "plan",
            &PlanReport {
                output: output.display().to_string(),
                rows: plan.len(),
                entries: plan.entries(),
                evaluations: &evaluations,
            },
        );
    }

    CommandResult::success(
        "plan",
        format!("exported {} plan rows to `{}`", plan.len(), output.display()),
    )
}

/// Appends one entry per scenario, in file order.
fn build_plan(
    context: &ForecastContext,
    scenarios: &[ScenarioInput],
    plan: &mut PlanTable,
) -> Result<Vec<ForecastEvaluation>, ApplicationError> {
    let runtime = ForecastRuntime::with_defaults(&context.tables, &context.dataset);
    let mut evaluations = Vec::with_capacity(scenarios.len());

    for scenario in scenarios {
        let evaluation = runtime.evaluate(scenario)?;
        plan.append(evaluation.to_plan_entry());
        evaluations.push(evaluation);
    }

    Ok(evaluations)
}

fn read_scenarios(path: &Path) -> anyhow::Result<Vec<ScenarioInput>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read scenarios file `{}`", path.display()))?;
    parse_scenarios(&raw).with_context(|| format!("invalid scenarios file `{}`", path.display()))
}

fn parse_scenarios(raw: &str) -> anyhow::Result<Vec<ScenarioInput>> {
    let file: ScenarioFile = toml::from_str(raw).context("could not parse scenarios TOML")?;
    if file.scenario.is_empty() {
        bail!("no [[scenario]] entries found");
    }

    file.scenario
        .into_iter()
        .enumerate()
        .map(|(index, spec)| -> anyhow::Result<ScenarioInput> {
            let position = index + 1;
            let month = match spec.month {
                MonthSpec::Number(number) => Month::from_number(number).with_context(|| {
                    format!("scenario {position}: month {number} out of range")
                })?,
                MonthSpec::Label(label) => label
                    .parse::<Month>()
                    .with_context(|| format!("scenario {position}: invalid month"))?,
            };
            Ok(ScenarioInput {
                category: ShowCategory::from(spec.category.as_str()),
                city: spec.city,
                month,
                user_price: spec.price,
            })
        })
        .collect()
}
