use std::sync::Arc;

use chairfit_core::catalog::{Catalog, CatalogError};
use chairfit_core::config::AppConfig;
use chairfit_core::errors::DomainError;
use chairfit_gateway::{Collaborators, DispatchSettings, GatewayError, LeadDispatcher};
use thiserror::Error;
use tracing::info;

use crate::api::AppState;

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("catalog could not be loaded: {0}")]
    Catalog(#[from] CatalogError),
    #[error("catalog does not cover the recommendation rules: {0}")]
    RuleMismatch(#[source] DomainError),
    #[error("outbound collaborator setup failed: {0}")]
    Gateway(#[from] GatewayError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let catalog = Catalog::load(config.catalog.path.as_deref())?;
    let dispatcher_settings = DispatchSettings::from_config(&config);
    let collaborators = Collaborators::from_config(&config)?;
    let dispatcher = LeadDispatcher::new(
        Arc::new(catalog),
        collaborators.messaging,
        collaborators.crm,
        collaborators.lead_store,
        dispatcher_settings,
    );

    dispatcher
        .catalog()
        .verify_rules(dispatcher.engine().rules())
        .map_err(BootstrapError::RuleMismatch)?;
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        correlation_id = "bootstrap",
        categories = dispatcher.catalog().len(),
        source = config
            .catalog
            .path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "builtin".to_string()),
        "catalog loaded and verified against the rule table"
    );

    Ok(Application { config, state: AppState::new(dispatcher) })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chairfit_core::config::AppConfig;
    use tempfile::TempDir;

    use super::{bootstrap_with_config, BootstrapError};

    #[test]
    fn default_config_bootstraps_with_builtin_catalog() {
        let app = bootstrap_with_config(AppConfig::default()).expect("bootstrap succeeds");

        assert!(app.state.dispatcher().catalog().len() >= 3);
        assert_eq!(app.config.server.port, 8080);
    }

    #[test]
    fn catalog_without_rule_categories_fails_fast() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("catalog.toml");
        fs::write(
            &path,
            r#"
[[categories]]
id = "gamer"
label = "Gamer Chair"
description = "Racing style"
"#,
        )
        .expect("catalog written");

        let mut config = AppConfig::default();
        config.catalog.path = Some(path);

        let error = match bootstrap_with_config(config) {
            Ok(_) => panic!("bootstrap should fail"),
            Err(error) => error,
        };
        assert!(matches!(error, BootstrapError::RuleMismatch(_)));
    }

    #[test]
    fn missing_catalog_file_is_reported() {
        let mut config = AppConfig::default();
        config.catalog.path = Some("/nonexistent/catalog.toml".into());

        let error = match bootstrap_with_config(config) {
            Ok(_) => panic!("bootstrap should fail"),
            Err(error) => error,
        };
        assert!(matches!(error, BootstrapError::Catalog(_)));
    }
}
