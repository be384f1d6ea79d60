use showprice_core::{config::AppConfig, config::LoadOptions, ApplicationError, ReferenceTables};

use crate::commands::{to_json, CommandResult};

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let tables = match load_tables(options) {
        Ok(tables) => tables,
        Err(error) => return CommandResult::from_error("tables", &error),
    };

    if json_output {
        return to_json("tables", &tables);
    }

    CommandResult::raw(render_human(&tables))
}

fn load_tables(options: &LoadOptions) -> Result<ReferenceTables, ApplicationError> {
    let config = AppConfig::load(options.clone())?;
    Ok(ReferenceTables::load_or_default(config.reference.path.as_deref())?)
}

fn render_human(tables: &ReferenceTables) -> String {
    let mut lines = vec!["show categories:".to_string()];
    for (category, profile) in tables.categories() {
        lines.push(format!("- {category} (base price {})", profile.base_price));
        for keyword in &profile.keywords {
            lines.push(format!("    {keyword}"));
        }
    }

    lines.push("city multipliers (unlisted cities use 1.00):".to_string());
    for (city, multiplier) in tables.cities() {
        lines.push(format!("- {city} = {multiplier:.2}"));
    }

    lines.join("\n")
}
