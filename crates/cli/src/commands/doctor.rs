use std::collections::BTreeSet;

use serde::Serialize;
use showprice_core::{
    config::{AppConfig, LoadOptions},
    DemandDataset, ReferenceTables,
};

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });

            let tables = match ReferenceTables::load_or_default(config.reference.path.as_deref()) {
                Ok(tables) => {
                    checks.push(DoctorCheck {
                        name: "reference_tables",
                        status: CheckStatus::Pass,
                        details: format!(
                            "{} categories, {} cities ({})",
                            tables.categories().count(),
                            tables.cities().count(),
                            if config.reference.path.is_some() { "file" } else { "built-in" }
                        ),
                    });
                    Some(tables)
                }
                Err(error) => {
                    checks.push(DoctorCheck {
                        name: "reference_tables",
                        status: CheckStatus::Fail,
                        details: error.to_string(),
                    });
                    None
                }
            };

            match DemandDataset::load(&config.dataset.path) {
                Ok(dataset) => {
                    checks.push(DoctorCheck {
                        name: "dataset_load",
                        status: CheckStatus::Pass,
                        details: format!(
                            "loaded {} rows from `{}`",
                            dataset.len(),
                            config.dataset.path.display()
                        ),
                    });
                    checks.push(match &tables {
                        Some(tables) => check_keyword_coverage(tables, &dataset),
                        None => skipped("keyword_coverage", "reference tables did not load"),
                    });
                }
                Err(error) => {
                    checks.push(DoctorCheck {
                        name: "dataset_load",
                        status: CheckStatus::Fail,
                        details: error.to_string(),
                    });
                    checks.push(skipped("keyword_coverage", "dataset did not load"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["reference_tables", "dataset_load", "keyword_coverage"] {
                checks.push(skipped(name, "configuration did not load"));
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

/// Missing keywords are tolerated by the aggregator, so this check only reports them.
fn check_keyword_coverage(tables: &ReferenceTables, dataset: &DemandDataset) -> DoctorCheck {
    let present: BTreeSet<&str> =
        dataset.records().iter().map(|record| record.keyword.as_str()).collect();

    let mut missing = Vec::new();
    let mut total = 0usize;
    for (category, profile) in tables.categories() {
        for keyword in &profile.keywords {
            total += 1;
            if !present.contains(keyword.as_str()) {
                missing.push(format!("{category}: {keyword}"));
            }
        }
    }

    let details = if missing.is_empty() {
        format!("all {total} category keywords have dataset rows")
    } else {
        format!(
            "{} of {total} category keywords have dataset rows; missing: {}",
            total - missing.len(),
            missing.join(", ")
        )
    };

    DoctorCheck { name: "keyword_coverage", status: CheckStatus::Pass, details }
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: format!("skipped because {reason}"),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
