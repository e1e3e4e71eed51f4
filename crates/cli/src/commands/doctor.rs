use quotebox_core::config::{AppConfig, LoadOptions};
use quotebox_db::schema;
use serde::Serialize;

use crate::commands::config::redact_url;
use crate::commands::{connect, current_thread_runtime, CommandResult};

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

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = exit_code(&report);

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                concat!(
                    "{{\"overall_status\":\"fail\",",
                    "\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}"
                ),
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

/// Exit code of the first failing check, using the same classes as the other
/// commands: 2 config, 3 runtime, 4 connectivity, 5 schema.
fn exit_code(report: &DoctorReport) -> u8 {
    report
        .checks
        .iter()
        .find(|check| check.status == CheckStatus::Fail)
        .map(|check| match check.name {
            "config_validation" => 2,
            "async_runtime" => 3,
            "database_connectivity" => 4,
            _ => 5,
        })
        .unwrap_or(0)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.extend(check_database(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["database_connectivity", "quotes_schema"] {
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

fn check_database(config: &AppConfig) -> [DoctorCheck; 2] {
    let runtime = match current_thread_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return [
                DoctorCheck { name: "async_runtime", status: CheckStatus::Fail, details: error },
                skipped("quotes_schema", "async runtime did not start"),
            ];
        }
    };

    runtime.block_on(async {
        let pool = match connect(config).await {
            Ok(pool) => pool,
            Err((_, message, _)) => {
                return [
                    DoctorCheck {
                        name: "database_connectivity",
                        status: CheckStatus::Fail,
                        details: format!("failed to connect to database: {message}"),
                    },
                    skipped("quotes_schema", "database is unreachable"),
                ];
            }
        };

        let connectivity = DoctorCheck {
            name: "database_connectivity",
            status: CheckStatus::Pass,
            details: format!("connected using `{}`", redact_url(&config.database.url)),
        };
        let schema_check = match schema::is_present(&pool).await {
            Ok(true) => DoctorCheck {
                name: "quotes_schema",
                status: CheckStatus::Pass,
                details: "quotes table present".to_string(),
            },
            Ok(false) => DoctorCheck {
                name: "quotes_schema",
                status: CheckStatus::Fail,
                details: "quotes table is missing; run `quotebox init`".to_string(),
            },
            Err(error) => DoctorCheck {
                name: "quotes_schema",
                status: CheckStatus::Fail,
                details: format!("schema lookup failed: {error}"),
            },
        };

        pool.close().await;
        [connectivity, schema_check]
    })
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
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

#[cfg(test)]
mod tests {
    use super::{exit_code, render_human, skipped, CheckStatus, DoctorCheck, DoctorReport};

    fn report(checks: Vec<DoctorCheck>) -> DoctorReport {
        DoctorReport {
            overall_status: CheckStatus::Fail,
            summary: "doctor: one or more readiness checks failed".to_string(),
            checks,
        }
    }

    fn check(name: &'static str, status: CheckStatus) -> DoctorCheck {
        DoctorCheck { name, status, details: String::new() }
    }

    #[test]
    fn exit_code_follows_first_failing_check() {
        use CheckStatus::{Fail, Pass, Skipped};

        let all_pass = report(vec![
            check("config_validation", Pass),
            check("database_connectivity", Pass),
            check("quotes_schema", Pass),
        ]);
        assert_eq!(exit_code(&all_pass), 0);

        let bad_config = report(vec![
            check("config_validation", Fail),
            check("database_connectivity", Skipped),
            check("quotes_schema", Skipped),
        ]);
        assert_eq!(exit_code(&bad_config), 2);

        let unreachable = report(vec![
            check("config_validation", Pass),
            check("database_connectivity", Fail),
            check("quotes_schema", Skipped),
        ]);
        assert_eq!(exit_code(&unreachable), 4);

        let missing_schema = report(vec![
            check("config_validation", Pass),
            check("database_connectivity", Pass),
            check("quotes_schema", Fail),
        ]);
        assert_eq!(exit_code(&missing_schema), 5);
    }

    #[test]
    fn human_render_marks_each_check() {
        let report = DoctorReport {
            overall_status: CheckStatus::Fail,
            summary: "doctor: one or more readiness checks failed".to_string(),
            checks: vec![
                DoctorCheck {
                    name: "config_validation",
                    status: CheckStatus::Pass,
                    details: "configuration loaded and validated".to_string(),
                },
                DoctorCheck {
                    name: "database_connectivity",
                    status: CheckStatus::Fail,
                    details: "refused".to_string(),
                },
                skipped("quotes_schema", "database is unreachable"),
            ],
        };

        assert_eq!(
            render_human(&report),
            "doctor: one or more readiness checks failed\n\
             - [ok] config_validation: configuration loaded and validated\n\
             - [fail] database_connectivity: refused\n\
             - [skip] quotes_schema: skipped because database is unreachable"
        );
    }
}
