use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of features shown on a recommendation card.
pub const FEATURE_PREVIEW_LEN: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

impl CategoryId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: CategoryId,
    pub label: String,
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
}

impl ProductCategory {
    pub fn feature_preview(&self) -> &[String] {
        let end = self.features.len().min(FEATURE_PREVIEW_LEN);
        &self.features[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryId, ProductCategory};

    fn category(features: &[&str]) -> ProductCategory {
        ProductCategory {
            id: CategoryId::new("executive-mesh"),
            label: "Executive Mesh Chair".to_string(),
            description: "Breathable".to_string(),
            features: features.iter().map(|feature| feature.to_string()).collect(),
        }
    }

    #[test]
    fn feature_preview_keeps_display_order_and_caps_at_four() {
        let category = category(&["a", "b", "c", "d", "e", "f"]);
        assert_eq!(category.feature_preview(), ["a", "b", "c", "d"]);
    }

    #[test]
    fn feature_preview_handles_short_lists() {
        assert_eq!(category(&["only"]).feature_preview(), ["only"]);
        assert!(category(&[]).feature_preview().is_empty());
    }
}
