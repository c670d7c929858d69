use chairfit_core::domain::category::ProductCategory;
use chairfit_core::recommendation::RecommendationEngine;
use serde::Serialize;

use crate::commands::{load_catalog, CommandResult};

const COMMAND: &str = "catalog";

#[derive(Debug, Serialize)]
struct CatalogReport<'a> {
    command: &'static str,
    status: &'static str,
    source: String,
    categories: Vec<CategoryEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct CategoryEntry<'a> {
    #[serde(flatten)]
    category: &'a ProductCategory,
    /// Number of recommendation rules that can select this category.
    rule_count: usize,
}

pub fn run(json_output: bool) -> CommandResult {
    let (config, catalog) = match load_catalog(COMMAND) {
        Ok(loaded) => loaded,
        Err(result) => return result,
    };

    let engine = RecommendationEngine::new();
    let source = config
        .catalog
        .path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "builtin".to_string());
    let entries: Vec<CategoryEntry<'_>> = catalog
        .categories()
        .iter()
        .map(|category| CategoryEntry {
            category,
            rule_count: engine
                .rules()
                .iter()
                .filter(|rule| rule.category_id == category.id)
                .count(),
        })
        .collect();

    if json_output {
        let report =
            CatalogReport { command: COMMAND, status: "ok", source, categories: entries };
        return CommandResult::json(COMMAND, &report);
    }

    let mut lines = vec![format!("catalog ({source}, {} categories):", catalog.len())];
    for entry in &entries {
        let category = entry.category;
        let selectable = if entry.rule_count == 0 {
            "display only".to_string()
        } else {
            format!("{} rules", entry.rule_count)
        };
        lines.push(format!("- {} [{}] ({selectable})", category.label, category.id));
        lines.push(format!("  {}", category.description));
        for feature in category.feature_preview() {
            lines.push(format!("  * {feature}"));
        }
        let hidden = category.features.len().saturating_sub(category.feature_preview().len());
        if hidden > 0 {
            lines.push(format!("  (+{hidden} more)"));
        }
    }

    CommandResult::text(lines.join("\n"))
}
