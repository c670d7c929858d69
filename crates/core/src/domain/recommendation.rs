use serde::{Deserialize, Serialize};

use crate::domain::category::{CategoryId, ProductCategory};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    High,
    Medium,
    Low,
}

impl PriorityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Label for the card badge.
    pub fn badge_label(&self) -> &'static str {
        match self {
            Self::High => "High Priority",
            Self::Medium => "Recommended",
            Self::Low => "Option",
        }
    }
}

/// One matched rule. The category is borrowed from the catalog that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Recommendation<'c> {
    pub category: &'c ProductCategory,
    pub priority_tier: PriorityTier,
    pub justification: String,
}

impl Recommendation<'_> {
    pub fn category_id(&self) -> &CategoryId {
        &self.category.id
    }
}

/// Ordered, deduplicated recommendations for a single profile.
///
/// Only the engine builds these, so a set always holds between one and
/// [`RecommendationSet::MAX_LEN`] entries with distinct category ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecommendationSet<'c> {
    entries: Vec<Recommendation<'c>>,
}

impl<'c> RecommendationSet<'c> {
    pub const MAX_LEN: usize = 3;

    pub(crate) fn from_entries(entries: Vec<Recommendation<'c>>) -> Self {
        debug_assert!(!entries.is_empty() && entries.len() <= Self::MAX_LEN);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Recommendation<'c>> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Recommendation<'c>] {
        &self.entries
    }

    pub fn contains(&self, category_id: &CategoryId) -> bool {
        self.entries.iter().any(|entry| entry.category_id() == category_id)
    }

    /// The recommendation to message: first `high` entry, else the first entry.
    pub fn primary(&self) -> &Recommendation<'c> {
        self.entries
            .iter()
            .find(|entry| entry.priority_tier == PriorityTier::High)
            .unwrap_or(&self.entries[0])
    }

    pub fn high_priority(&self) -> impl Iterator<Item = &Recommendation<'c>> {
        self.entries.iter().filter(|entry| entry.priority_tier == PriorityTier::High)
    }
}

impl<'a, 'c> IntoIterator for &'a RecommendationSet<'c> {
    type Item = &'a Recommendation<'c>;
    type IntoIter = std::slice::Iter<'a, Recommendation<'c>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Owned, display-ready copy of a recommendation for persistence payloads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationSummary {
    pub category_id: CategoryId,
    pub category_label: String,
    pub priority_tier: PriorityTier,
    pub justification: String,
}

impl From<&Recommendation<'_>> for RecommendationSummary {
    fn from(value: &Recommendation<'_>) -> Self {
        Self {
            category_id: value.category.id.clone(),
            category_label: value.category.label.clone(),
            priority_tier: value.priority_tier,
            justification: value.justification.clone(),
        }
    }
}
