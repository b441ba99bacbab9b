use std::fs;

use gamewise_core::catalog::rule_base_identifiers;
use gamewise_core::config::{AppConfig, LoadOptions};
use gamewise_core::Catalog;
use serde::Serialize;

use super::CommandResult;

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

const DEPENDENT_CHECKS: [&str; 4] =
    ["llm_credentials", "solver_binary", "rule_base", "catalog_sync"];

pub fn run(options: LoadOptions, json_output: bool) -> CommandResult {
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

fn build_report(options: LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_llm_credentials(&config));
            checks.push(check_solver_binary(&config));
            let rules = fs::read_to_string(&config.solver.rules_path);
            checks.push(check_rule_base(&config, &rules));
            checks.push(check_catalog_sync(&config, rules.ok().as_deref()));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.extend(DEPENDENT_CHECKS.iter().map(|&name| DoctorCheck {
                name,
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            }));
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

fn check_llm_credentials(config: &AppConfig) -> DoctorCheck {
    match config.llm.require_api_key() {
        Ok(Some(_)) => DoctorCheck {
            name: "llm_credentials",
            status: CheckStatus::Pass,
            details: format!(
                "api key present for {:?} at {}",
                config.llm.provider, config.llm.base_url
            ),
        },
        Ok(None) => DoctorCheck {
            name: "llm_credentials",
            status: CheckStatus::Pass,
            details: format!("{:?} provider runs without an api key", config.llm.provider),
        },
        Err(error) => DoctorCheck {
            name: "llm_credentials",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_solver_binary(config: &AppConfig) -> DoctorCheck {
    match which::which(&config.solver.command) {
        Ok(path) => DoctorCheck {
            name: "solver_binary",
            status: CheckStatus::Pass,
            details: format!("`{}` resolved to {}", config.solver.command, path.display()),
        },
        Err(error) => DoctorCheck {
            name: "solver_binary",
            status: CheckStatus::Fail,
            details: format!("`{}` not found: {error}", config.solver.command),
        },
    }
}

fn check_rule_base(config: &AppConfig, rules: &std::io::Result<String>) -> DoctorCheck {
    match rules {
        Ok(text) => DoctorCheck {
            name: "rule_base",
            status: CheckStatus::Pass,
            details: format!(
                "{} declares {} games",
                config.solver.rules_path.display(),
                rule_base_identifiers(text).len()
            ),
        },
        Err(error) => DoctorCheck {
            name: "rule_base",
            status: CheckStatus::Fail,
            details: format!("cannot read {}: {error}", config.solver.rules_path.display()),
        },
    }
}

fn check_catalog_sync(config: &AppConfig, rules: Option<&str>) -> DoctorCheck {
    let Some(rules) = rules else {
        return DoctorCheck {
            name: "catalog_sync",
            status: CheckStatus::Skipped,
            details: "skipped because the rule base could not be read".to_string(),
        };
    };

    let catalog = match Catalog::from_config(&config.catalog) {
        Ok(catalog) => catalog,
        Err(error) => {
            return DoctorCheck {
                name: "catalog_sync",
                status: CheckStatus::Fail,
                details: error.to_string(),
            }
        }
    };

    let missing = catalog.missing_from(rules);
    if missing.is_empty() {
        DoctorCheck {
            name: "catalog_sync",
            status: CheckStatus::Pass,
            details: format!(
                "every rule-base game has a title ({} catalog entries)",
                catalog.len()
            ),
        }
    } else {
        let missing = missing.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
        DoctorCheck {
            name: "catalog_sync",
            status: CheckStatus::Fail,
            details: format!("rule-base games without a catalog title: {missing}"),
        }
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
