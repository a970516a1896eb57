// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! JSON resource fetching.
//!
//! Every request carries a `t=<epoch millis>` query parameter so intermediate
//! caches never serve a stale status. Failures are reported as a single
//! [`FetchError`] type; callers are expected to handle all variants the same way.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use log::debug;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while fetching a JSON resource.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot resolve resource '{path}': {reason}")]
    InvalidUrl { path: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("invalid JSON from '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of JSON documents addressed by a relative resource path.
pub trait JsonFetcher {
    /// Fetch and parse the resource at `path`.
    fn fetch_json(&self, path: &str) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

/// Decode a fetched document into a typed record.
///
/// A shape mismatch is reported the same way as malformed JSON.
pub fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|source| FetchError::Decode {
        path: path.to_string(),
        source,
    })
}

/// Current cache-busting token (epoch milliseconds)
fn cache_buster() -> i64 {
    Utc::now().timestamp_millis()
}

/// [`JsonFetcher`] backed by reqwest, resolving paths against a base URL.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpFetcher {
    /// Create a fetcher for resources under `base_url`.
    ///
    /// The base is always treated as a directory, so `http://host/board` and
    /// `http://host/board/` resolve `status.json` to the same URL.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut base_url = Url::parse(base_url).map_err(|e| FetchError::InvalidUrl {
            path: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a resource path against the base URL
    pub fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| FetchError::InvalidUrl {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }
}

impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
        let url = self.resolve(path)?;
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url.clone())
            .query(&[("t", cache_buster())])
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve a single canned HTTP response and hand back the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}/board"), handle)
    }

    #[test]
    fn test_resolve_treats_base_as_directory() {
        let with_slash = HttpFetcher::new("http://example.com/board/", None).unwrap();
        let without_slash = HttpFetcher::new("http://example.com/board", None).unwrap();

        assert_eq!(
            with_slash.resolve("status.json").unwrap().as_str(),
            "http://example.com/board/status.json"
        );
        assert_eq!(
            without_slash.resolve("/status.json").unwrap().as_str(),
            "http://example.com/board/status.json"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpFetcher::new("not a url", None);
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[test]
    fn test_decode_shape_mismatch() {
        let value = serde_json::json!({"unexpected": true});
        let result: Result<crate::model::StatusRecord, _> = decode("status.json", value);
        assert!(matches!(result, Err(FetchError::Decode { path, .. }) if path == "status.json"));
    }

    #[tokio::test]
    async fn test_fetch_appends_cache_buster() {
        let (base, server) = serve_once("200 OK", r#"{"status":"ONLINE"}"#).await;
        let fetcher = HttpFetcher::new(&base, Some(Duration::from_secs(5))).unwrap();

        let value = fetcher.fetch_json("status.json").await.unwrap();
        assert_eq!(value["status"], "ONLINE");

        let request = server.await.unwrap();
        let request_line = request.lines().next().unwrap();
        assert!(request_line.starts_with("GET /board/status.json?t="), "{request_line}");

        let token = request_line
            .trim_start_matches("GET /board/status.json?t=")
            .split_whitespace()
            .next()
            .unwrap();
        assert!(token.parse::<i64>().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let (base, server) = serve_once("404 Not Found", "{}").await;
        let fetcher = HttpFetcher::new(&base, None).unwrap();

        let result = fetcher.fetch_json("updates.json").await;
        assert!(matches!(
            result,
            Err(FetchError::Status { status, .. }) if status == StatusCode::NOT_FOUND
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_malformed_json() {
        let (base, server) = serve_once("200 OK", "{not json").await;
        let fetcher = HttpFetcher::new(&base, None).unwrap();

        let result = fetcher.fetch_json("updates.json").await;
        assert!(matches!(result, Err(FetchError::Decode { .. })));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::new(&format!("http://{addr}/"), None).unwrap();
        let result = fetcher.fetch_json("status.json").await;
        assert!(matches!(result, Err(FetchError::Request { .. })));
    }
}
