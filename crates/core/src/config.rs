use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::messaging::Branding;
use crate::phone::digits_only;

pub const DEFAULT_MESSAGING_BASE_URL: &str = "https://www.avisaapi.com.br/api/actions";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub messaging: MessagingConfig,
    pub crm: CrmConfig,
    pub lead_store: LeadStoreConfig,
    pub contact: ContactConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug, Default)]
pub struct CatalogConfig {
    /// Override file; the built-in catalog is used when unset.
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct MessagingConfig {
    pub enabled: bool,
    pub base_url: String,
    pub api_token: Option<SecretString>,
    pub team_number: Option<String>,
    pub timeout_secs: u64,
    pub message_interval_ms: u64,
}

#[derive(Clone, Debug)]
pub struct CrmConfig {
    pub enabled: bool,
    pub base_url: Option<String>,
    pub access_token: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LeadStoreConfig {
    pub enabled: bool,
    pub url: Option<String>,
    pub service_key: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ContactConfig {
    pub company_name: String,
    pub sales_email: String,
    pub website: String,
    pub offer_discount_pct: u8,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub catalog_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub server_port: Option<u16>,
    pub messaging_enabled: Option<bool>,
    pub messaging_api_token: Option<String>,
    pub messaging_base_url: Option<String>,
    pub crm_enabled: Option<bool>,
    pub crm_base_url: Option<String>,
    pub crm_access_token: Option<String>,
    pub lead_store_enabled: Option<bool>,
    pub lead_store_url: Option<String>,
    pub lead_store_service_key: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            catalog: CatalogConfig::default(),
            messaging: MessagingConfig {
                enabled: false,
                base_url: DEFAULT_MESSAGING_BASE_URL.to_string(),
                api_token: None,
                team_number: None,
                timeout_secs: 15,
                message_interval_ms: 1_500,
            },
            crm: CrmConfig { enabled: false, base_url: None, access_token: None, timeout_secs: 15 },
            lead_store: LeadStoreConfig {
                enabled: false,
                url: None,
                service_key: None,
                timeout_secs: 15,
            },
            contact: ContactConfig::from(Branding::default()),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl From<Branding> for ContactConfig {
    fn from(value: Branding) -> Self {
        Self {
            company_name: value.company_name,
            sales_email: value.sales_email,
            website: value.website,
            offer_discount_pct: value.offer_discount_pct,
        }
    }
}

impl ContactConfig {
    pub fn branding(&self) -> Branding {
        Branding {
            company_name: self.company_name.clone(),
            sales_email: self.sales_email.clone(),
            website: self.website.clone(),
            offer_discount_pct: self.offer_discount_pct,
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("chairfit.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(catalog) = patch.catalog {
            if let Some(path) = catalog.path {
                self.catalog.path = Some(path);
            }
        }

        if let Some(messaging) = patch.messaging {
            if let Some(enabled) = messaging.enabled {
                self.messaging.enabled = enabled;
            }
            if let Some(base_url) = messaging.base_url {
                self.messaging.base_url = base_url;
            }
            if let Some(messaging_api_token_value) = messaging.api_token {
                self.messaging.api_token = Some(secret_value(messaging_api_token_value));
            }
            if let Some(team_number) = messaging.team_number {
                self.messaging.team_number = Some(team_number);
            }
            if let Some(timeout_secs) = messaging.timeout_secs {
                self.messaging.timeout_secs = timeout_secs;
            }
            if let Some(message_interval_ms) = messaging.message_interval_ms {
                self.messaging.message_interval_ms = message_interval_ms;
            }
        }

        if let Some(crm) = patch.crm {
            if let Some(enabled) = crm.enabled {
                self.crm.enabled = enabled;
            }
            if let Some(base_url) = crm.base_url {
                self.crm.base_url = Some(base_url);
            }
            if let Some(crm_access_token_value) = crm.access_token {
                self.crm.access_token = Some(secret_value(crm_access_token_value));
            }
            if let Some(timeout_secs) = crm.timeout_secs {
                self.crm.timeout_secs = timeout_secs;
            }
        }

        if let Some(lead_store) = patch.lead_store {
            if let Some(enabled) = lead_store.enabled {
                self.lead_store.enabled = enabled;
            }
            if let Some(url) = lead_store.url {
                self.lead_store.url = Some(url);
            }
            if let Some(lead_store_service_key_value) = lead_store.service_key {
                self.lead_store.service_key = Some(secret_value(lead_store_service_key_value));
            }
            if let Some(timeout_secs) = lead_store.timeout_secs {
                self.lead_store.timeout_secs = timeout_secs;
            }
        }

        if let Some(contact) = patch.contact {
            if let Some(company_name) = contact.company_name {
                self.contact.company_name = company_name;
            }
            if let Some(sales_email) = contact.sales_email {
                self.contact.sales_email = sales_email;
            }
            if let Some(website) = contact.website {
                self.contact.website = website;
            }
            if let Some(offer_discount_pct) = contact.offer_discount_pct {
                self.contact.offer_discount_pct = offer_discount_pct;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("CHAIRFIT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("CHAIRFIT_SERVER_PORT") {
            self.server.port = parse_u16("CHAIRFIT_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("CHAIRFIT_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("CHAIRFIT_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("CHAIRFIT_CATALOG_PATH") {
            self.catalog.path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("CHAIRFIT_MESSAGING_ENABLED") {
            self.messaging.enabled = parse_bool("CHAIRFIT_MESSAGING_ENABLED", &value)?;
        }
        if let Some(value) = read_env("CHAIRFIT_MESSAGING_BASE_URL") {
            self.messaging.base_url = value;
        }
        if let Some(value) = read_env("CHAIRFIT_MESSAGING_API_TOKEN") {
            self.messaging.api_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("CHAIRFIT_MESSAGING_TEAM_NUMBER") {
            self.messaging.team_number = Some(value);
        }
        if let Some(value) = read_env("CHAIRFIT_MESSAGING_TIMEOUT_SECS") {
            self.messaging.timeout_secs = parse_u64("CHAIRFIT_MESSAGING_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("CHAIRFIT_MESSAGING_MESSAGE_INTERVAL_MS") {
            self.messaging.message_interval_ms =
                parse_u64("CHAIRFIT_MESSAGING_MESSAGE_INTERVAL_MS", &value)?;
        }

        if let Some(value) = read_env("CHAIRFIT_CRM_ENABLED") {
            self.crm.enabled = parse_bool("CHAIRFIT_CRM_ENABLED", &value)?;
        }
        if let Some(value) = read_env("CHAIRFIT_CRM_BASE_URL") {
            self.crm.base_url = Some(value);
        }
        if let Some(value) = read_env("CHAIRFIT_CRM_ACCESS_TOKEN") {
            self.crm.access_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("CHAIRFIT_CRM_TIMEOUT_SECS") {
            self.crm.timeout_secs = parse_u64("CHAIRFIT_CRM_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("CHAIRFIT_LEAD_STORE_ENABLED") {
            self.lead_store.enabled = parse_bool("CHAIRFIT_LEAD_STORE_ENABLED", &value)?;
        }
        if let Some(value) = read_env("CHAIRFIT_LEAD_STORE_URL") {
            self.lead_store.url = Some(value);
        }
        if let Some(value) = read_env("CHAIRFIT_LEAD_STORE_SERVICE_KEY") {
            self.lead_store.service_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("CHAIRFIT_LEAD_STORE_TIMEOUT_SECS") {
            self.lead_store.timeout_secs = parse_u64("CHAIRFIT_LEAD_STORE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("CHAIRFIT_CONTACT_COMPANY_NAME") {
            self.contact.company_name = value;
        }
        if let Some(value) = read_env("CHAIRFIT_CONTACT_SALES_EMAIL") {
            self.contact.sales_email = value;
        }
        if let Some(value) = read_env("CHAIRFIT_CONTACT_WEBSITE") {
            self.contact.website = value;
        }
        if let Some(value) = read_env("CHAIRFIT_CONTACT_OFFER_DISCOUNT_PCT") {
            self.contact.offer_discount_pct =
                parse_u8("CHAIRFIT_CONTACT_OFFER_DISCOUNT_PCT", &value)?;
        }

        let log_level =
            read_env("CHAIRFIT_LOGGING_LEVEL").or_else(|| read_env("CHAIRFIT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("CHAIRFIT_LOGGING_FORMAT").or_else(|| read_env("CHAIRFIT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(catalog_path) = overrides.catalog_path {
            self.catalog.path = Some(catalog_path);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }

        if let Some(enabled) = overrides.messaging_enabled {
            self.messaging.enabled = enabled;
        }
        if let Some(api_token) = overrides.messaging_api_token {
            self.messaging.api_token = Some(secret_value(api_token));
        }
        if let Some(base_url) = overrides.messaging_base_url {
            self.messaging.base_url = base_url;
        }

        if let Some(enabled) = overrides.crm_enabled {
            self.crm.enabled = enabled;
        }
        if let Some(base_url) = overrides.crm_base_url {
            self.crm.base_url = Some(base_url);
        }
        if let Some(access_token) = overrides.crm_access_token {
            self.crm.access_token = Some(secret_value(access_token));
        }

        if let Some(enabled) = overrides.lead_store_enabled {
            self.lead_store.enabled = enabled;
        }
        if let Some(url) = overrides.lead_store_url {
            self.lead_store.url = Some(url);
        }
        if let Some(service_key) = overrides.lead_store_service_key {
            self.lead_store.service_key = Some(secret_value(service_key));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_messaging(&self.messaging)?;
        validate_crm(&self.crm)?;
        validate_lead_store(&self.lead_store)?;
        validate_contact(&self.contact)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("chairfit.toml"), PathBuf::from("config/chairfit.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_messaging(messaging: &MessagingConfig) -> Result<(), ConfigError> {
    validate_timeout("messaging.timeout_secs", messaging.timeout_secs)?;

    if let Some(team_number) = &messaging.team_number {
        let digits = digits_only(team_number).len();
        if digits < 10 {
            return Err(ConfigError::Validation(
                "messaging.team_number must contain at least 10 digits (DDD + number)".to_string(),
            ));
        }
    }

    if !messaging.enabled {
        return Ok(());
    }

    require_http_url("messaging.base_url", Some(&messaging.base_url))?;
    require_secret(
        "messaging.api_token",
        messaging.api_token.as_ref(),
        " when messaging.enabled is true. Get it from the WhatsApp gateway dashboard",
    )
}

fn validate_crm(crm: &CrmConfig) -> Result<(), ConfigError> {
    validate_timeout("crm.timeout_secs", crm.timeout_secs)?;

    if let Some(base_url) = &crm.base_url {
        require_http_url("crm.base_url", Some(base_url))?;
    }

    if !crm.enabled {
        return Ok(());
    }

    require_http_url("crm.base_url", crm.base_url.as_ref())?;
    require_secret(
        "crm.access_token",
        crm.access_token.as_ref(),
        " when crm.enabled is true (long-lived integration token)",
    )
}

fn validate_lead_store(lead_store: &LeadStoreConfig) -> Result<(), ConfigError> {
    validate_timeout("lead_store.timeout_secs", lead_store.timeout_secs)?;

    if !lead_store.enabled {
        return Ok(());
    }

    require_http_url("lead_store.url", lead_store.url.as_ref())?;
    require_secret(
        "lead_store.service_key",
        lead_store.service_key.as_ref(),
        " when lead_store.enabled is true",
    )
}

fn validate_contact(contact: &ContactConfig) -> Result<(), ConfigError> {
    if contact.company_name.trim().is_empty() {
        return Err(ConfigError::Validation("contact.company_name must not be empty".to_string()));
    }
    if !contact.sales_email.contains('@') {
        return Err(ConfigError::Validation(
            "contact.sales_email must be an email address".to_string(),
        ));
    }
    require_http_url("contact.website", Some(&contact.website))?;
    if contact.offer_discount_pct > 100 {
        return Err(ConfigError::Validation(
            "contact.offer_discount_pct must be in range 0..=100".to_string(),
        ));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn validate_timeout(key: &str, timeout_secs: u64) -> Result<(), ConfigError> {
    if timeout_secs == 0 || timeout_secs > 300 {
        return Err(ConfigError::Validation(format!("{key} must be in range 1..=300")));
    }
    Ok(())
}

fn require_http_url(key: &str, value: Option<&String>) -> Result<(), ConfigError> {
    match value.map(|value| value.trim()) {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => Ok(()),
        Some(_) => {
            Err(ConfigError::Validation(format!("{key} must start with http:// or https://")))
        }
        None => Err(ConfigError::Validation(format!("{key} is required"))),
    }
}

fn require_secret(key: &str, value: Option<&SecretString>, hint: &str) -> Result<(), ConfigError> {
    let missing = value.map(|value| value.expose_secret().trim().is_empty()).unwrap_or(true);
    if missing {
        return Err(ConfigError::Validation(format!("{key} is required{hint}")));
    }
    Ok(())
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u8(key: &str, value: &str) -> Result<u8, ConfigError> {
    value.parse::<u8>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    catalog: Option<CatalogPatch>,
    messaging: Option<MessagingPatch>,
    crm: Option<CrmPatch>,
    lead_store: Option<LeadStorePatch>,
    contact: Option<ContactPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct MessagingPatch {
    enabled: Option<bool>,
    base_url: Option<String>,
    api_token: Option<String>,
    team_number: Option<String>,
    timeout_secs: Option<u64>,
    message_interval_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct CrmPatch {
    enabled: Option<bool>,
    base_url: Option<String>,
    access_token: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LeadStorePatch {
    enabled: Option<bool>,
    url: Option<String>,
    service_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ContactPatch {
    company_name: Option<String>,
    sales_email: Option<String>,
    website: Option<String>,
    offer_discount_pct: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_are_valid_with_collaborators_disabled() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(!config.messaging.enabled, "messaging should be disabled by default")?;
        ensure(!config.crm.enabled, "crm should be disabled by default")?;
        ensure(!config.lead_store.enabled, "lead store should be disabled by default")?;
        ensure(config.catalog.path.is_none(), "builtin catalog should be the default")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_MESSAGING_TOKEN", "gateway-token-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("chairfit.toml");
            fs::write(
                &path,
                r#"
[messaging]
enabled = true
api_token = "${TEST_MESSAGING_TOKEN}"
team_number = "(11) 99999-0000"

[catalog]
path = "config/catalog.toml"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config
                    .messaging
                    .api_token
                    .as_ref()
                    .map(|token| token.expose_secret() == "gateway-token-from-env")
                    .unwrap_or(false),
                "messaging token should be loaded from environment",
            )?;
            ensure(
                config.catalog.path == Some(PathBuf::from("config/catalog.toml")),
                "catalog path should come from the file",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_MESSAGING_TOKEN"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("CHAIRFIT_LOG_LEVEL", "warn");
        env::set_var("CHAIRFIT_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["CHAIRFIT_LOG_LEVEL", "CHAIRFIT_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("CHAIRFIT_SERVER_PORT", "9090");
        env::set_var("CHAIRFIT_CRM_BASE_URL", "https://from-env.kommo.example");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("chairfit.toml");
            fs::write(
                &path,
                r#"
[server]
port = 7070
bind_address = "0.0.0.0"

[crm]
base_url = "https://from-file.kommo.example"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    server_port: Some(6060),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.server.port == 6060, "override port should win")?;
            ensure(config.server.bind_address == "0.0.0.0", "file bind address should apply")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.crm.base_url.as_deref() == Some("https://from-env.kommo.example"),
                "env crm url should win over file and defaults",
            )?;
            Ok(())
        })();

        clear_vars(&["CHAIRFIT_SERVER_PORT", "CHAIRFIT_CRM_BASE_URL"]);
        result
    }

    #[test]
    fn enabled_collaborators_require_credentials() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let error = match AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                crm_enabled: Some(true),
                crm_base_url: Some("https://crm.example".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected validation failure but config load succeeded".to_string()),
            Err(error) => error,
        };
        ensure(
            matches!(error, ConfigError::Validation(ref message) if message.contains("crm.access_token")),
            "validation failure should mention crm.access_token",
        )?;

        let error = match AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                lead_store_enabled: Some(true),
                lead_store_url: Some("ftp://store.example".to_string()),
                lead_store_service_key: Some("service-key".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected validation failure but config load succeeded".to_string()),
            Err(error) => error,
        };
        ensure(
            matches!(error, ConfigError::Validation(ref message) if message.contains("lead_store.url")),
            "validation failure should mention lead_store.url",
        )
    }

    #[test]
    fn invalid_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("CHAIRFIT_MESSAGING_ENABLED", "sometimes");
        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected env override failure".to_string()),
            Err(ConfigError::InvalidEnvOverride { key, .. }) => {
                ensure(key == "CHAIRFIT_MESSAGING_ENABLED", "error should name the variable")
            }
            Err(other) => Err(format!("unexpected error: {other}")),
        };
        clear_vars(&["CHAIRFIT_MESSAGING_ENABLED"]);
        result
    }

    #[test]
    fn missing_required_file_fails() {
        let result = AppConfig::load(LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/chairfit.toml")),
            require_file: true,
            ..LoadOptions::default()
        });
        assert!(matches!(result, Err(ConfigError::MissingConfigFile(_))));
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                messaging_enabled: Some(true),
                messaging_api_token: Some("gateway-secret-value".to_string()),
                crm_access_token: Some("crm-secret-value".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .map_err(|err| format!("config load failed: {err}"))?;
        let debug = format!("{config:?}");

        ensure(!debug.contains("gateway-secret-value"), "debug output should not contain token")?;
        ensure(!debug.contains("crm-secret-value"), "debug output should not contain crm token")
    }
}
