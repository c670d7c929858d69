use chairfit_core::domain::profile::UserProfile;
use chairfit_core::domain::recommendation::RecommendationSummary;
use chairfit_core::recommendation::{RecommendationEngine, RuleTrace};
use serde::Serialize;

use crate::commands::{load_catalog, CommandResult, EXIT_ENGINE};

const COMMAND: &str = "recommend";

#[derive(Debug, Clone, Default)]
pub struct RecommendArgs {
    pub height: String,
    pub weight: String,
    pub profile: String,
    pub json: bool,
    pub explain: bool,
}

#[derive(Debug, Serialize)]
struct RecommendReport {
    command: &'static str,
    status: &'static str,
    profile: UserProfile,
    primary: RecommendationSummary,
    recommendations: Vec<RecommendationSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<Vec<RuleTrace>>,
}

pub fn run(args: &RecommendArgs) -> CommandResult {
    let (_config, catalog) = match load_catalog(COMMAND) {
        Ok(loaded) => loaded,
        Err(result) => return result,
    };

    let profile = UserProfile::from_raw(&args.height, &args.weight, &args.profile);
    let evaluation = match RecommendationEngine::new().evaluate(&profile, &catalog) {
        Ok(evaluation) => evaluation,
        Err(error) => {
            return CommandResult::failure(COMMAND, "engine", error.to_string(), EXIT_ENGINE)
        }
    };
    let set = &evaluation.recommendations;

    if args.json {
        let report = RecommendReport {
            command: COMMAND,
            status: "ok",
            primary: RecommendationSummary::from(set.primary()),
            recommendations: set.iter().map(RecommendationSummary::from).collect(),
            trace: args.explain.then(|| evaluation.trace.clone()),
            profile,
        };
        return CommandResult::json(COMMAND, &report);
    }

    let mut lines = vec![format!(
        "recommendations for {} cm / {} kg / {}:",
        display(profile.height_cm),
        display(profile.weight_kg),
        profile.postural_profile.display_name()
    )];
    for (position, entry) in set.iter().enumerate() {
        lines.push(format!(
            "{}. [{}] {}: {}",
            position + 1,
            entry.priority_tier.badge_label(),
            entry.category.label,
            entry.justification
        ));
    }
    lines.push(format!("primary: {}", set.primary().category.label));

    if args.explain {
        lines.push("rule trace:".to_string());
        for step in &evaluation.trace {
            lines.push(format!(
                "- {} -> {} ({})",
                step.rule,
                step.category_id,
                step.outcome.as_str()
            ));
        }
    }

    CommandResult::text(lines.join("\n"))
}

fn display(value: Option<i32>) -> String {
    value.map(|value| value.to_string()).unwrap_or_else(|| "?".to_string())
}
