use chairfit_core::errors::ApplicationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{service} is not configured: {detail}")]
    NotConfigured { service: &'static str, detail: String },
    #[error("{service} request failed: {message}")]
    Transport { service: &'static str, message: String },
    #[error("{service} rejected the request with status {status}: {message}")]
    Rejected { service: &'static str, status: u16, message: String },
    #[error("{service} returned an unreadable response: {message}")]
    Decode { service: &'static str, message: String },
    #[error("`{0}` is not a usable phone number")]
    InvalidNumber(String),
}

impl GatewayError {
    pub(crate) fn transport(service: &'static str, error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            format!("connection failed: {error}")
        } else {
            error.to_string()
        };
        Self::Transport { service, message }
    }

    /// Failures worth surfacing to an operator as remote-side problems.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Rejected { .. } | Self::Decode { .. })
    }
}

impl From<GatewayError> for ApplicationError {
    fn from(value: GatewayError) -> Self {
        match value {
            GatewayError::NotConfigured { .. } => ApplicationError::Configuration(value.to_string()),
            GatewayError::InvalidNumber(_) => ApplicationError::Validation(value.to_string()),
            other => ApplicationError::Integration(other.to_string()),
        }
    }
}

/// Sends the request and returns the status and body text of a 2xx answer.
/// Any other status becomes `Rejected` with the reason found in the body.
pub(crate) async fn send_expecting_success(
    service: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<(u16, String), GatewayError> {
    let response =
        request.send().await.map_err(|error| GatewayError::transport(service, error))?;
    let status = response.status();
    let text = response.text().await.map_err(|error| GatewayError::transport(service, error))?;

    if !status.is_success() {
        return Err(GatewayError::Rejected {
            service,
            status: status.as_u16(),
            message: rejection_message(status.as_u16(), &text),
        });
    }
    Ok((status.as_u16(), text))
}

/// Pulls a human-readable reason out of an error body: the JSON `message` or
/// `error` field when present, the raw text otherwise.
fn rejection_message(status: u16, body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let field = parsed.as_ref().and_then(|value| {
        ["message", "error"].iter().find_map(|key| match value.get(key) {
            Some(serde_json::Value::String(text)) => Some(text.clone()),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
    });

    match field {
        Some(message) if !message.trim().is_empty() => message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => format!("HTTP {status}"),
    }
}
