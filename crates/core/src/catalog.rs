use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::category::{CategoryId, ProductCategory};
use crate::errors::DomainError;
use crate::recommendation::Rule;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.toml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("catalog must contain at least one category")]
    Empty,
    #[error("catalog category at position {0} has an empty id")]
    EmptyId(usize),
    #[error("catalog category `{0}` has an empty label")]
    EmptyLabel(CategoryId),
    #[error("catalog category id `{0}` is declared more than once")]
    DuplicateId(CategoryId),
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    categories: Vec<ProductCategory>,
}

/// Read-only product reference data, loaded once and shared by reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<ProductCategory>,
}

impl Catalog {
    pub fn new(categories: Vec<ProductCategory>) -> Result<Self, CatalogError> {
        if categories.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(categories.len());
        for (position, category) in categories.iter().enumerate() {
            if category.id.as_str().trim().is_empty() {
                return Err(CatalogError::EmptyId(position));
            }
            if category.label.trim().is_empty() {
                return Err(CatalogError::EmptyLabel(category.id.clone()));
            }
            if !seen.insert(category.id.as_str()) {
                return Err(CatalogError::DuplicateId(category.id.clone()));
            }
        }

        Ok(Self { categories })
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let document = toml::from_str::<CatalogDocument>(raw)?;
        Self::new(document.categories)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw)
    }

    /// Loads the override file when one is configured, the built-in catalog otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::builtin(),
        }
    }

    pub fn find(&self, id: &CategoryId) -> Option<&ProductCategory> {
        self.categories.iter().find(|category| &category.id == id)
    }

    pub fn category(&self, id: &CategoryId) -> Result<&ProductCategory, DomainError> {
        self.find(id).ok_or_else(|| DomainError::CategoryNotFound(id.clone()))
    }

    pub fn categories(&self) -> &[ProductCategory] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Fails on the first category id a rule references that this catalog lacks.
    pub fn verify_rules(&self, rules: &[Rule]) -> Result<(), DomainError> {
        for rule in rules {
            self.category(&rule.category_id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{Catalog, CatalogError};
    use crate::domain::category::CategoryId;
    use crate::errors::DomainError;
    use crate::recommendation::default_rules;

    #[test]
    fn builtin_catalog_covers_every_default_rule() {
        let catalog = Catalog::builtin().expect("builtin catalog should parse");

        assert!(catalog.len() >= 3);
        catalog.verify_rules(&default_rules()).expect("default rules should resolve");
        let director = catalog
            .category(&CategoryId::new("director-president"))
            .expect("director category present");
        assert!(!director.features.is_empty());
    }

    #[test]
    fn missing_category_is_reported_as_lookup_failure() {
        let catalog = Catalog::from_toml_str(
            r#"
[[categories]]
id = "secretary"
label = "Secretary Chair"
description = "Compact"
features = ["Compact footprint"]
"#,
        )
        .expect("catalog should parse");

        assert_eq!(
            catalog.verify_rules(&default_rules()),
            Err(DomainError::CategoryNotFound(CategoryId::new("director-president")))
        );
    }

    #[test]
    fn duplicate_and_empty_entries_are_rejected() {
        let duplicate = Catalog::from_toml_str(
            r#"
[[categories]]
id = "secretary"
label = "A"
description = ""

[[categories]]
id = "secretary"
label = "B"
description = ""
"#,
        );
        assert!(matches!(duplicate, Err(CatalogError::DuplicateId(ref id)) if id.as_str() == "secretary"));

        assert!(matches!(Catalog::from_toml_str(""), Err(CatalogError::Empty)));

        let blank_label = Catalog::from_toml_str(
            r#"
[[categories]]
id = "gamer"
label = "  "
description = ""
"#,
        );
        assert!(matches!(blank_label, Err(CatalogError::EmptyLabel(_))));
    }

    #[test]
    fn load_prefers_override_file() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err| err.to_string())?;
        let path = dir.path().join("catalog.toml");
        fs::write(
            &path,
            r#"
[[categories]]
id = "stool"
label = "Drafting Stool"
description = "Tall stool"
features = ["Foot ring"]
"#,
        )
        .map_err(|err| err.to_string())?;

        let catalog = Catalog::load(Some(&path)).map_err(|err| err.to_string())?;
        assert_eq!(catalog.len(), 1);
        assert!(catalog.find(&CategoryId::new("stool")).is_some());

        let missing = Catalog::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(missing, Err(CatalogError::ReadFile { .. })));
        Ok(())
    }
}
