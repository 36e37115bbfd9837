use async_trait::async_trait;
use error_stack::{Report, ResultExt};
use serde_json::Value;
use swap_models::error::Error as ModelsError;
use swap_models::network::client_rate_limit::Client;
use swap_models::network::http::{HttpMethod, handle_reqwest_response};
use tracing::debug;

use crate::config::TradingApiConfig;
use crate::error::{EngineResult, Error};
use crate::trading::TradingService;

/// HTTP implementation of [`TradingService`] with bearer authentication
#[derive(Debug, Clone)]
pub struct TradingApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TradingApiClient {
    pub fn new(config: &TradingApiConfig) -> EngineResult<Self> {
        config.validate()?;
        let client = Client::new(config.rate_limit, config.request_timeout)
            .change_context(Error::ConfigError(
                "Failed to build HTTP client".to_string(),
            ))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

/// Collapses any failure into a `TradingServiceError` carrying the most useful message
fn to_service_error(report: Report<ModelsError>) -> Report<Error> {
    let message = match report.current_context() {
        ModelsError::ServiceError(message) => message.clone(),
        other => other.to_string(),
    };
    report.change_context(Error::TradingServiceError(message))
}

#[async_trait]
impl TradingService for TradingApiClient {
    async fn request(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<Value>,
    ) -> EngineResult<Value> {
        let url = self.url(endpoint);
        debug!("Trading API {} {}", method.as_str(), url);

        let mut builder = self
            .client
            .inner_client()
            .request(method.into(), url.as_str())
            .bearer_auth(&self.api_key);
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let request = builder.build().map_err(|e| {
            Report::new(Error::TradingServiceError(format!(
                "Failed to build request: {e}"
            )))
        })?;

        let response = self.client.execute(request).await.map_err(|e| {
            Report::new(Error::TradingServiceError(format!("Request failed: {e}")))
                .attach_printable(format!("{} {url}", method.as_str()))
        })?;

        handle_reqwest_response::<Value>(response)
            .await
            .map_err(to_service_error)
            .attach_printable_lazy(|| format!("{} {url}", method.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportDisplayExt;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serves one canned HTTP response and hands back the raw request it received
    async fn serve_once(status_line: &str, body: &str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\n\
             content-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 16 * 1024];
            let mut received = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                received.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&received);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let lower = line.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);
                    if received.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            tx.send(String::from_utf8_lossy(&received).to_string()).ok();
        });

        (format!("http://{addr}"), rx)
    }

    fn client_for(base_url: String) -> TradingApiClient {
        let mut config = TradingApiConfig::new("test-key");
        config.base_url = base_url;
        TradingApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_missing_api_key_fails_construction() {
        let err = TradingApiClient::new(&TradingApiConfig::new("")).unwrap_err();
        assert!(matches!(err.current_context(), Error::ConfigError(_)));
    }

    #[test]
    fn test_url_joining() {
        let client = client_for("http://localhost:9000/api/".to_string());
        assert_eq!(
            client.url("/order/status?txHash=0x01"),
            "http://localhost:9000/api/order/status?txHash=0x01"
        );
        assert_eq!(
            client.url("order/estimate"),
            "http://localhost:9000/api/order/estimate"
        );
    }

    #[tokio::test]
    async fn test_success_returns_json_and_sends_bearer() {
        let (url, received) = serve_once("200 OK", r#"{"status":"PENDING"}"#).await;
        let client = client_for(url);

        let body = json!({"srcChainId": 8453});
        let value = client
            .request("/order/estimate", HttpMethod::POST, Some(body))
            .await
            .unwrap();
        assert_eq!(value, json!({"status": "PENDING"}));

        let raw = received.await.unwrap();
        assert!(raw.starts_with("POST /order/estimate"));
        let lower = raw.to_ascii_lowercase();
        assert!(lower.contains("authorization: bearer test-key"));
        assert!(raw.contains(r#""srcChainId":8453"#));
    }

    #[tokio::test]
    async fn test_error_body_message_is_surfaced() {
        let body = r#"{"error":"liquidity unavailable"}"#;
        let (url, _received) = serve_once("500 Internal Server Error", body).await;
        let client = client_for(url);

        let err = client
            .request("/order/estimate", HttpMethod::POST, None)
            .await
            .unwrap_err();
        assert_eq!(
            err.current_context(),
            &Error::TradingServiceError("liquidity unavailable".to_string())
        );
        assert_eq!(err.root_message(), "liquidity unavailable");
    }

    #[tokio::test]
    async fn test_empty_error_body_uses_status_line() {
        let (url, _received) = serve_once("401 Unauthorized", "").await;
        let client = client_for(url);

        let err = client
            .request("/order/status?txHash=0x01", HttpMethod::GET, None)
            .await
            .unwrap_err();
        assert_eq!(err.root_message(), "HTTP 401: Unauthorized");
    }

    #[tokio::test]
    async fn test_transport_failure_is_normalized() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{addr}"));
        let err = client
            .request("/order/status", HttpMethod::GET, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err.current_context(),
            Error::TradingServiceError(_)
        ));
    }
}
