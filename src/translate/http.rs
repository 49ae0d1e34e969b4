use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::TranslateConfig;
use crate::error::{Result, SubtranError};
use super::{TranslationEndpoint, common::{AttemptOutcome, TranslationRequest, TranslationResponse}};

/// Translation endpoint reached over HTTP POST with a JSON body
pub struct HttpEndpoint {
    client: Client,
    url: String,
}

impl HttpEndpoint {
    pub fn new(config: &TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.endpoint.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, request: &TranslationRequest) -> Result<String> {
        let response = self.client
            .post(&self.url)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SubtranError::Translation(format!(
                "Server error: {} {}", status, error_text.trim()
            )));
        }

        let body: TranslationResponse = response.json().await
            .map_err(|e| SubtranError::Translation(format!("Failed to parse response: {}", e)))?;

        Ok(body.translated_text)
    }
}

#[async_trait]
impl TranslationEndpoint for HttpEndpoint {
    async fn send(&self, request: &TranslationRequest) -> AttemptOutcome {
        debug!(
            "Sending translation request to {} ({} chars, target {})",
            self.url,
            request.text.chars().count(),
            request.target_language
        );

        match self.post(request).await {
            Ok(text) => AttemptOutcome::Success(text),
            Err(e) => AttemptOutcome::Retryable(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response and hand back the request body
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/translate", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            let request_body = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let content_length = text[..split]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= split + 4 + content_length {
                        break String::from_utf8_lossy(&buf[split + 4..split + 4 + content_length]).to_string();
                    }
                }
                if n == 0 {
                    break String::new();
                }
            };

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request_body
        });

        (url, handle)
    }

    fn endpoint(url: &str) -> HttpEndpoint {
        let config = TranslateConfig {
            endpoint: url.to_string(),
            request_timeout_secs: 5,
            ..TranslateConfig::default()
        };
        HttpEndpoint::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_success_returns_translated_text() {
        let (url, server) = serve_once("200 OK", r#"{"translated_text":"Bonjour\n\nMonde"}"#).await;

        let outcome = endpoint(&url)
            .send(&TranslationRequest::new("fr", "Hello\n\nWorld"))
            .await;

        match outcome {
            AttemptOutcome::Success(text) => assert_eq!(text, "Bonjour\n\nMonde"),
            other => panic!("unexpected outcome: {:?}", other),
        }

        let sent: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(sent["target_language"], "fr");
        assert_eq!(sent["text"], "Hello\n\nWorld");
    }

    #[tokio::test]
    async fn test_error_status_is_retryable() {
        let (url, _server) = serve_once("503 Service Unavailable", r#"{"detail":"busy"}"#).await;

        let outcome = endpoint(&url).send(&TranslationRequest::new("fr", "Hi")).await;
        assert!(matches!(outcome, AttemptOutcome::Retryable(SubtranError::Translation(_))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_retryable() {
        let (url, _server) = serve_once("200 OK", r#"{"text":"wrong field"}"#).await;

        let outcome = endpoint(&url).send(&TranslationRequest::new("fr", "Hi")).await;
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn test_connection_refused_is_retryable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/translate", listener.local_addr().unwrap());
        drop(listener);

        let outcome = endpoint(&url).send(&TranslationRequest::new("fr", "Hi")).await;
        assert!(matches!(outcome, AttemptOutcome::Retryable(SubtranError::Http(_))));
    }
}
