use serde::Serialize;

use super::rules::{default_rules, Rule};
use crate::catalog::Catalog;
use crate::domain::category::CategoryId;
use crate::domain::profile::UserProfile;
use crate::domain::recommendation::{Recommendation, RecommendationSet};
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOutcome {
    NotMatched,
    Appended,
    /// Matched, but an earlier rule already selected the category.
    Duplicate,
    /// Appended, then cut by the size cap.
    Truncated,
}

impl RuleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotMatched => "not_matched",
            Self::Appended => "appended",
            Self::Duplicate => "duplicate",
            Self::Truncated => "truncated",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RuleTrace {
    pub rule: String,
    pub category_id: CategoryId,
    pub outcome: RuleOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Evaluation<'c> {
    pub recommendations: RecommendationSet<'c>,
    pub trace: Vec<RuleTrace>,
}

/// Ordered selection keyed by category id. The first writer for an id wins.
struct Selection<'c> {
    entries: Vec<Recommendation<'c>>,
}

impl<'c> Selection<'c> {
    fn new() -> Self {
        Self { entries: Vec::with_capacity(RecommendationSet::MAX_LEN) }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn try_append(&mut self, candidate: Recommendation<'c>) -> bool {
        if self.entries.iter().any(|entry| entry.category_id() == candidate.category_id()) {
            return false;
        }
        self.entries.push(candidate);
        true
    }
}

/// Pure, deterministic mapping from a [`UserProfile`] to a [`RecommendationSet`].
#[derive(Clone, Debug)]
pub struct RecommendationEngine {
    rules: Vec<Rule>,
    max_recommendations: usize,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self { rules, max_recommendations: RecommendationSet::MAX_LEN }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn generate<'c>(
        &self,
        profile: &UserProfile,
        catalog: &'c Catalog,
    ) -> Result<RecommendationSet<'c>, DomainError> {
        self.evaluate(profile, catalog).map(|evaluation| evaluation.recommendations)
    }

    /// Runs the rule table and records what each rule did.
    ///
    /// Every rule's category is resolved up front, so a catalog that lacks any
    /// referenced id fails the call regardless of which rules match.
    pub fn evaluate<'c>(
        &self,
        profile: &UserProfile,
        catalog: &'c Catalog,
    ) -> Result<Evaluation<'c>, DomainError> {
        let resolved = self
            .rules
            .iter()
            .map(|rule| catalog.category(&rule.category_id).map(|category| (rule, category)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut selection = Selection::new();
        let mut trace = Vec::with_capacity(self.rules.len());

        for (rule, category) in resolved {
            let outcome = if !rule.condition.matches(profile, selection.len()) {
                RuleOutcome::NotMatched
            } else if selection.try_append(Recommendation {
                category,
                priority_tier: rule.tier,
                justification: rule.justification.clone(),
            }) {
                RuleOutcome::Appended
            } else {
                RuleOutcome::Duplicate
            };

            trace.push(RuleTrace {
                rule: rule.name.clone(),
                category_id: rule.category_id.clone(),
                outcome,
            });
        }

        if selection.entries.is_empty() {
            return Err(DomainError::InvariantViolation(
                "rule table produced no recommendation; a fallback rule is required".to_string(),
            ));
        }

        let mut entries = selection.entries;
        if entries.len() > self.max_recommendations {
            let dropped: Vec<CategoryId> = entries
                .drain(self.max_recommendations..)
                .map(|entry| entry.category.id.clone())
                .collect();
            for step in trace.iter_mut().filter(|step| step.outcome == RuleOutcome::Appended) {
                if dropped.contains(&step.category_id) {
                    step.outcome = RuleOutcome::Truncated;
                }
            }
        }

        Ok(Evaluation { recommendations: RecommendationSet::from_entries(entries), trace })
    }
}

/// Runs the default rule table against `catalog`.
pub fn generate_recommendations<'c>(
    profile: &UserProfile,
    catalog: &'c Catalog,
) -> Result<RecommendationSet<'c>, DomainError> {
    RecommendationEngine::new().generate(profile, catalog)
}
