//! reqwest-backed transport.

use reqwest::header::HeaderMap;
use reqwest::Client;
use futures_util::future::BoxFuture;

use crate::config::TransportConfig;
use crate::transport::{Transport, TransportFailure, TransportOutcome, TransportRequest, TransportResponse};

/// HTTP transport over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if config.no_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: TransportRequest) -> BoxFuture<'static, TransportOutcome> {
        let client = self.client.clone();

        Box::pin(async move {
            let mut builder = client
                .request(request.method.into(), request.url)
                .headers(request.headers);
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = match builder.send().await {
                Ok(response) => response,
                Err(e) => return TransportOutcome::Failed(TransportFailure::new(e.to_string())),
            };

            let status = response.status();
            let status_text = status.canonical_reason().unwrap_or("").to_string();
            let headers = raw_headers(response.headers());

            // Body is buffered; a connection dropped mid-body counts as a failure
            match response.text().await {
                Ok(body) => TransportOutcome::Loaded(TransportResponse {
                    status: status.as_u16(),
                    status_text,
                    headers,
                    body,
                }),
                Err(e) => TransportOutcome::Failed(TransportFailure::new(e.to_string())),
            }
        })
    }
}

/// Render headers as `name: value\r\n` lines.
fn raw_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| {
            format!("{}: {}\r\n", name, String::from_utf8_lossy(value.as_bytes()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_raw_headers_format() {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("text/plain"));
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));

        let raw = raw_headers(&headers);
        assert!(raw.contains("content-type: text/plain\r\n"));
        assert!(raw.contains("set-cookie: a=1\r\n"));
        assert!(raw.contains("set-cookie: b=2\r\n"));
        assert_eq!(raw.matches("\r\n").count(), 3);
    }

    #[test]
    fn test_raw_headers_empty() {
        assert_eq!(raw_headers(&HeaderMap::new()), "");
    }

    #[test]
    fn test_build_from_config() {
        let config = TransportConfig {
            no_proxy: true,
            ..TransportConfig::default()
        };
        assert!(HttpTransport::new(&config).is_ok());
    }
}
