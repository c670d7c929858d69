use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chairfit_core::config::{AppConfig, LoadOptions};
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

struct Field<'a> {
    key: &'a str,
    env_key: &'a str,
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields = [
        Field {
            key: "server.bind_address",
            env_key: "CHAIRFIT_SERVER_BIND_ADDRESS",
            value: config.server.bind_address.clone(),
        },
        Field {
            key: "server.port",
            env_key: "CHAIRFIT_SERVER_PORT",
            value: config.server.port.to_string(),
        },
        Field {
            key: "server.graceful_shutdown_secs",
            env_key: "CHAIRFIT_SERVER_GRACEFUL_SHUTDOWN_SECS",
            value: config.server.graceful_shutdown_secs.to_string(),
        },
        Field {
            key: "catalog.path",
            env_key: "CHAIRFIT_CATALOG_PATH",
            value: config
                .catalog
                .path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "<builtin>".to_string()),
        },
        Field {
            key: "messaging.enabled",
            env_key: "CHAIRFIT_MESSAGING_ENABLED",
            value: config.messaging.enabled.to_string(),
        },
        Field {
            key: "messaging.base_url",
            env_key: "CHAIRFIT_MESSAGING_BASE_URL",
            value: config.messaging.base_url.clone(),
        },
        Field {
            key: "messaging.api_token",
            env_key: "CHAIRFIT_MESSAGING_API_TOKEN",
            value: redact_secret(config.messaging.api_token.as_ref()),
        },
        Field {
            key: "messaging.team_number",
            env_key: "CHAIRFIT_MESSAGING_TEAM_NUMBER",
            value: config.messaging.team_number.clone().unwrap_or_else(|| "<unset>".to_string()),
        },
        Field {
            key: "messaging.message_interval_ms",
            env_key: "CHAIRFIT_MESSAGING_MESSAGE_INTERVAL_MS",
            value: config.messaging.message_interval_ms.to_string(),
        },
        Field {
            key: "crm.enabled",
            env_key: "CHAIRFIT_CRM_ENABLED",
            value: config.crm.enabled.to_string(),
        },
        Field {
            key: "crm.base_url",
            env_key: "CHAIRFIT_CRM_BASE_URL",
            value: config.crm.base_url.clone().unwrap_or_else(|| "<unset>".to_string()),
        },
        Field {
            key: "crm.access_token",
            env_key: "CHAIRFIT_CRM_ACCESS_TOKEN",
            value: redact_secret(config.crm.access_token.as_ref()),
        },
        Field {
            key: "lead_store.enabled",
            env_key: "CHAIRFIT_LEAD_STORE_ENABLED",
            value: config.lead_store.enabled.to_string(),
        },
        Field {
            key: "lead_store.url",
            env_key: "CHAIRFIT_LEAD_STORE_URL",
            value: config.lead_store.url.clone().unwrap_or_else(|| "<unset>".to_string()),
        },
        Field {
            key: "lead_store.service_key",
            env_key: "CHAIRFIT_LEAD_STORE_SERVICE_KEY",
            value: redact_secret(config.lead_store.service_key.as_ref()),
        },
        Field {
            key: "contact.company_name",
            env_key: "CHAIRFIT_CONTACT_COMPANY_NAME",
            value: config.contact.company_name.clone(),
        },
        Field {
            key: "contact.sales_email",
            env_key: "CHAIRFIT_CONTACT_SALES_EMAIL",
            value: config.contact.sales_email.clone(),
        },
        Field {
            key: "contact.website",
            env_key: "CHAIRFIT_CONTACT_WEBSITE",
            value: config.contact.website.clone(),
        },
        Field {
            key: "contact.offer_discount_pct",
            env_key: "CHAIRFIT_CONTACT_OFFER_DISCOUNT_PCT",
            value: config.contact.offer_discount_pct.to_string(),
        },
        Field {
            key: "logging.level",
            env_key: "CHAIRFIT_LOGGING_LEVEL",
            value: config.logging.level.clone(),
        },
        Field {
            key: "logging.format",
            env_key: "CHAIRFIT_LOGGING_FORMAT",
            value: format!("{:?}", config.logging.format),
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in &fields {
        lines.push(render_line(
            field.key,
            &field.value,
            field_source(
                field.key,
                Some(field.env_key),
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
        ));
    }

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("chairfit.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/chairfit.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Shows at most the last four characters of a secret.
fn redact_secret(secret: Option<&SecretString>) -> String {
    let Some(secret) = secret else {
        return "<unset>".to_string();
    };
    let trimmed = secret.expose_secret().trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() <= 8 {
        return "<redacted>".to_string();
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("***{visible}")
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use toml::Value;

    use super::{contains_path, redact_secret};

    #[test]
    fn secrets_are_redacted() {
        let long: SecretString = "swHRaVHVSikH9kppUhgZ".to_string().into();
        let short: SecretString = "abc123".to_string().into();
        let blank: SecretString = "  ".to_string().into();

        assert_eq!(redact_secret(Some(&long)), "***UhgZ");
        assert_eq!(redact_secret(Some(&short)), "<redacted>");
        assert_eq!(redact_secret(Some(&blank)), "<empty>");
        assert_eq!(redact_secret(None), "<unset>");
    }

    #[test]
    fn dotted_paths_are_resolved_in_file_document() {
        let doc: Value = "[messaging]\nenabled = true\n".parse().expect("toml parses");

        assert!(contains_path(&doc, "messaging.enabled"));
        assert!(!contains_path(&doc, "messaging.api_token"));
        assert!(!contains_path(&doc, "crm.enabled"));
    }
}
