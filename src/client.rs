use crate::config::Config;
use crate::error::SmokeError;

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

/// What came back from one call: the status and the raw body text.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub text: String,
}

impl ApiResponse {
    /// The body parsed as JSON, if it is JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.text).ok()
    }
}

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, SmokeError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, SmokeError> {
        self.send::<()>(Method::GET, path, None).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<ApiResponse, SmokeError> {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn send<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
    ) -> Result<ApiResponse, SmokeError> {
        let url = self.url(path);
        let started = Instant::now();

        // .json() also sets Content-Type: application/json
        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(target: "smoke_requests", "{} {} failed: {}", method, url, e);
                return Err(e.into());
            }
        };

        let status = response.status();
        let text = response.text().await?;
        debug!(
            target: "smoke_requests",
            "{} {} -> {} in {:?} ({} bytes)",
            method,
            url,
            status.as_u16(),
            started.elapsed(),
            text.len()
        );

        Ok(ApiResponse { status, text })
    }
}

/// `join_url("http://h/api", "/users")` is `http://h/api/users`; a path of `/`
/// keeps the trailing slash so the liveness check hits `/api/`.
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn joins_paths() {
        assert_eq!(join_url("http://localhost:8081/api", "/"), "http://localhost:8081/api/");
        assert_eq!(
            join_url("http://localhost:8081/api/", "/users/signup"),
            "http://localhost:8081/api/users/signup"
        );
        assert_eq!(join_url("http://h/api", "posts/3"), "http://h/api/posts/3");
    }

    #[test]
    fn json_body_is_optional() {
        let ok = ApiResponse {
            status: StatusCode::OK,
            text: r#"{"id": 3}"#.to_string(),
        };
        assert_eq!(ok.json().unwrap()["id"], 3);

        let plain = ApiResponse {
            status: StatusCode::OK,
            text: "Hello World!".to_string(),
        };
        assert!(plain.json().is_none());
    }
}
