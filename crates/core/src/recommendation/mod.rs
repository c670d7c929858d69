//! Recommendation engine: maps a user profile onto catalog categories through
//! an ordered rule table, deduplicating by category id and capping the result.

mod engine;
mod rules;

pub use engine::{
    generate_recommendations, Evaluation, RecommendationEngine, RuleOutcome, RuleTrace,
};
pub use rules::{
    default_rules, Rule, RuleCondition, DIRECTOR_PRESIDENT, EXECUTIVE_MESH, REINFORCED_WEIGHT_KG,
    SECRETARY, TALL_HEIGHT_CM,
};
