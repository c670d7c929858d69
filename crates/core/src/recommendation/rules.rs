//! Rule table for the recommendation engine.
//!
//! Rules are plain data evaluated top to bottom. Each matching rule offers one
//! candidate; the engine drops candidates whose category is already selected.

use serde::Serialize;

use crate::domain::category::CategoryId;
use crate::domain::profile::{PosturalProfile, UserProfile};
use crate::domain::recommendation::PriorityTier;

pub const DIRECTOR_PRESIDENT: &str = "director-president";
pub const EXECUTIVE_MESH: &str = "executive-mesh";
pub const SECRETARY: &str = "secretary";

/// Inclusive weight threshold for the reinforced-base recommendation.
pub const REINFORCED_WEIGHT_KG: i32 = 100;
/// Inclusive height threshold for the tall-backrest recommendation.
pub const TALL_HEIGHT_CM: i32 = 185;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RuleCondition {
    WeightAtLeast(i32),
    HeightAtLeast(i32),
    PosturalProfileIn(Vec<PosturalProfile>),
    /// Matches only while nothing has been selected yet.
    NothingSelected,
    Always,
}

impl RuleCondition {
    pub fn matches(&self, profile: &UserProfile, selected_so_far: usize) -> bool {
        match self {
            Self::WeightAtLeast(threshold) => profile.weight_at_least(*threshold),
            Self::HeightAtLeast(threshold) => profile.height_at_least(*threshold),
            Self::PosturalProfileIn(profiles) => profiles.contains(&profile.postural_profile),
            Self::NothingSelected => selected_so_far == 0,
            Self::Always => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub name: String,
    pub condition: RuleCondition,
    pub category_id: CategoryId,
    pub tier: PriorityTier,
    pub justification: String,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        condition: RuleCondition,
        category_id: impl Into<String>,
        tier: PriorityTier,
        justification: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            condition,
            category_id: CategoryId::new(category_id),
            tier,
            justification: justification.into(),
        }
    }
}

pub fn default_rules() -> Vec<Rule> {
    let spinal_curve = RuleCondition::PosturalProfileIn(vec![
        PosturalProfile::AccentuatedKyphosis,
        PosturalProfile::AccentuatedLordosis,
    ]);
    let balanced = RuleCondition::PosturalProfileIn(vec![PosturalProfile::Balanced]);

    vec![
        Rule::new(
            "weight_reinforced_base",
            RuleCondition::WeightAtLeast(REINFORCED_WEIGHT_KG),
            DIRECTOR_PRESIDENT,
            PriorityTier::High,
            "Reinforced base and robust structure for proper support",
        ),
        Rule::new(
            "height_tall_backrest",
            RuleCondition::HeightAtLeast(TALL_HEIGHT_CM),
            DIRECTOR_PRESIDENT,
            PriorityTier::High,
            "Tall backrest and headrest essential for your height",
        ),
        Rule::new(
            "posture_curve_lumbar",
            spinal_curve.clone(),
            DIRECTOR_PRESIDENT,
            PriorityTier::High,
            "Adjustable lumbar system (BackSystem) for postural correction",
        ),
        Rule::new(
            "posture_curve_mesh",
            spinal_curve,
            EXECUTIVE_MESH,
            PriorityTier::Medium,
            "Breathable backrest and adjustable lumbar support",
        ),
        Rule::new(
            "posture_asymmetry_fine_adjustment",
            RuleCondition::PosturalProfileIn(vec![PosturalProfile::MildAsymmetry]),
            DIRECTOR_PRESIDENT,
            PriorityTier::High,
            "Fine adjustments (4D armrests, seat, backrest) to correct the asymmetry",
        ),
        Rule::new(
            "posture_balanced_mesh",
            balanced.clone(),
            EXECUTIVE_MESH,
            PriorityTier::High,
            "Modern, ergonomic design ideal for a balanced posture",
        ),
        Rule::new(
            "posture_balanced_compact",
            balanced,
            SECRETARY,
            PriorityTier::Medium,
            "Compact and economical solution for daily use",
        ),
        Rule::new(
            "fallback_versatile",
            RuleCondition::NothingSelected,
            EXECUTIVE_MESH,
            PriorityTier::High,
            "Versatile solution suited to your needs",
        ),
    ]
}
