use std::fmt::Display;

use chairfit_core::catalog::Catalog;
use chairfit_core::config::{AppConfig, LoadOptions};
use chairfit_core::recommendation::RecommendationEngine;
use chairfit_gateway::{Collaborators, HttpMessagingGateway, MessagingGateway};
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_DOCTOR};

const COMMAND: &str = "doctor";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

impl CheckStatus {
    fn marker(self) -> &'static str {
        match self {
            Self::Pass => "ok",
            Self::Fail => "fail",
            Self::Skipped => "skip",
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn pass(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, details: details.into() }
    }

    fn fail(name: &'static str, error: impl Display) -> Self {
        Self { name, status: CheckStatus::Fail, details: error.to_string() }
    }

    fn skipped(name: &'static str, reason: &str) -> Self {
        Self { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    fn from_checks(checks: Vec<DoctorCheck>) -> Self {
        let failed = checks.iter().filter(|check| check.status == CheckStatus::Fail).count();
        let (overall_status, summary) = if failed == 0 {
            (CheckStatus::Pass, format!("chairfit is ready ({} checks)", checks.len()))
        } else {
            (CheckStatus::Fail, format!("chairfit is not ready: {failed} check(s) failed"))
        };
        Self { overall_status, summary, checks }
    }

    fn render_human(&self) -> String {
        std::iter::once(self.summary.clone())
            .chain(self.checks.iter().map(|check| {
                format!("- [{}] {}: {}", check.status.marker(), check.name, check.details)
            }))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn run(json_output: bool) -> CommandResult {
    let report = DoctorReport::from_checks(collect_checks());
    let exit_code = if report.overall_status == CheckStatus::Fail { EXIT_DOCTOR } else { 0 };

    let mut result = if json_output {
        CommandResult::json(COMMAND, &report)
    } else {
        CommandResult::text(report.render_human())
    };
    if result.exit_code == 0 {
        result.exit_code = exit_code;
    }
    result
}

fn collect_checks() -> Vec<DoctorCheck> {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            let mut checks = vec![DoctorCheck::fail("config_validation", error)];
            checks.extend(
                [
                    "catalog_load",
                    "rule_catalog_consistency",
                    "collaborator_setup",
                    "messaging_connectivity",
                ]
                .into_iter()
                .map(|name| DoctorCheck::skipped(name, "configuration did not load")),
            );
            return checks;
        }
    };

    let mut checks = vec![DoctorCheck::pass("config_validation", "configuration is valid")];
    checks.extend(catalog_checks(&config));
    checks.push(collaborator_check(&config));
    checks.push(messaging_check(&config));
    checks
}

fn catalog_checks(config: &AppConfig) -> [DoctorCheck; 2] {
    let catalog = match Catalog::load(config.catalog.path.as_deref()) {
        Ok(catalog) => catalog,
        Err(error) => {
            return [
                DoctorCheck::fail("catalog_load", error),
                DoctorCheck::skipped("rule_catalog_consistency", "catalog did not load"),
            ];
        }
    };

    let source = match &config.catalog.path {
        Some(path) => format!("`{}`", path.display()),
        None => "builtin catalog".to_string(),
    };
    let loaded =
        DoctorCheck::pass("catalog_load", format!("{} categories from {source}", catalog.len()));

    let engine = RecommendationEngine::new();
    let consistency = match catalog.verify_rules(engine.rules()) {
        Ok(()) => DoctorCheck::pass(
            "rule_catalog_consistency",
            format!("all {} rules resolve to catalog categories", engine.rules().len()),
        ),
        Err(error) => DoctorCheck::fail("rule_catalog_consistency", error),
    };

    [loaded, consistency]
}

fn collaborator_check(config: &AppConfig) -> DoctorCheck {
    if let Err(error) = Collaborators::from_config(config) {
        return DoctorCheck::fail("collaborator_setup", error);
    }

    let enabled: Vec<&str> = [
        ("messaging", config.messaging.enabled),
        ("crm", config.crm.enabled),
        ("lead_store", config.lead_store.enabled),
    ]
    .into_iter()
    .filter_map(|(name, enabled)| enabled.then_some(name))
    .collect();

    if enabled.is_empty() {
        DoctorCheck::pass("collaborator_setup", "all collaborators disabled; no-op adapters in use")
    } else {
        DoctorCheck::pass("collaborator_setup", format!("http adapters for {}", enabled.join(", ")))
    }
}

fn messaging_check(config: &AppConfig) -> DoctorCheck {
    const NAME: &str = "messaging_connectivity";

    if !config.messaging.enabled {
        return DoctorCheck::skipped(NAME, "messaging is disabled");
    }

    let gateway = match HttpMessagingGateway::from_config(&config.messaging) {
        Ok(gateway) => gateway,
        Err(error) => return DoctorCheck::fail(NAME, error),
    };
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => return DoctorCheck::fail(NAME, format!("async runtime unavailable: {error}")),
    };

    match runtime.block_on(gateway.check_connection()) {
        Ok(()) => DoctorCheck::pass(
            NAME,
            format!("gateway reachable at `{}`", config.messaging.base_url),
        ),
        Err(error) => DoctorCheck::fail(NAME, error),
    }
}
