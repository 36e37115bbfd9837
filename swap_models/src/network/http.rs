use crate::error::{Error, ModelResult};
use error_stack::{ResultExt, report};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::value::Value;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    GET,
    POST,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::POST => reqwest::Method::POST,
        }
    }
}

/// Converts a JSON Value into a sorted URL query string
///
/// Takes a JSON object and converts it to a query string with parameters
/// sorted alphabetically by key. `null` values are skipped.
///
/// # Errors
///
/// Returns `Error::ParseError` if the input value is not a JSON object
pub fn value_to_sorted_querystring(value: &Value) -> ModelResult<String> {
    let mut pairs: Vec<(String, String)> = match value {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !matches!(v, Value::Null))
            .map(|(k, v)| {
                let value_str = match v {
                    Value::String(s) => s.to_string(),
                    _ => v.to_string(),
                };
                (k.clone(), value_str)
            })
            .collect(),
        _ => {
            return Err(report!(Error::ParseError)
                .attach_printable(format!("Invalid JSON Object: {value:?}")));
        }
    };

    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<String>>()
        .join("&"))
}

/// Picks the human readable message out of a failed response.
///
/// A JSON body yields its `error` string, then its `message` string, then the
/// status line. A non-JSON body yields the raw text, then the status line.
pub fn error_message_from_body(status: StatusCode, body: &str) -> String {
    let status_line = format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    );

    match serde_json::from_str::<Value>(body) {
        Ok(json) => ["error", "message"]
            .iter()
            .find_map(|field| match json.get(field) {
                Some(Value::String(message)) if !message.is_empty() => Some(message.clone()),
                _ => None,
            })
            .unwrap_or(status_line),
        Err(_) if !body.is_empty() => body.to_string(),
        Err(_) => status_line,
    }
}

pub async fn handle_reqwest_response<T: DeserializeOwned>(response: Response) -> ModelResult<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .change_context(Error::SerdeDeserialize(
                "Failed to deserialize JSON".to_string(),
            ));
    }

    let error_body = response.text().await.change_context(Error::ReqwestError(
        "Failed to get text from response".to_string(),
    ))?;

    error!("Error Body: {}", &error_body);

    let message = error_message_from_body(status, &error_body);
    Err(report!(Error::ServiceError(message)))
        .attach_printable_lazy(|| format!("Response status: {status}"))
}
