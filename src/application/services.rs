use crate::domain::entities::{ContentMode, Request, RequestSpec, Response};
use crate::domain::value_objects::{Body, Url};
use crate::infrastructure::config::Config;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Trait for HTTP clients to enable mocking and dependency inversion
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response>;
}

/// Application service for orchestrating HTTP request workflows
/// This contains business logic and use cases
pub struct HttpRequestService {
    http_client: Box<dyn HttpClient>,
    config: Config,
}

impl HttpRequestService {
    pub fn new(http_client: Box<dyn HttpClient>, config: Config) -> Self {
        Self { http_client, config }
    }

    /// Turns the command-line description into a concrete request:
    /// completes the URL, encodes the body and settles the headers.
    pub fn prepare(&self, spec: &RequestSpec) -> Result<Request> {
        let url = Url::resolve(&spec.url, &spec.query)?;

        let body = if spec.method.carries_body() {
            Some(Body::encode(spec.content, &spec.data)?)
        } else {
            if !spec.data.is_empty() {
                warn!(method = %spec.method, fields = spec.data.len(), "body fields dropped");
            }
            None
        };

        let mut headers = HeaderList::default();
        headers.set("Accept", "*/*");
        headers.set("User-Agent", &self.config.user_agent);
        if body.is_some() {
            match spec.content {
                ContentMode::Json => {
                    headers.set("Accept", "application/json");
                    headers.set("Content-Type", "application/json");
                }
                ContentMode::Form => {
                    headers.set("Content-Type", "application/x-www-form-urlencoded");
                }
            }
        }
        for (key, value) in &spec.headers {
            headers.set(key, value);
        }

        let request = Request {
            method: spec.method,
            url,
            headers: headers.0,
            body,
            timeout: (spec.timeout > 0).then(|| Duration::from_secs(spec.timeout)),
        };
        debug!(method = %request.method, url = %request.url.as_str(), "prepared request");
        Ok(request)
    }

    /// Sends a simple HTTP request
    pub async fn send_request(&self, request: Request) -> Result<Response> {
        self.validate_request(&request)?;
        self.http_client.send(request).await
    }

    fn validate_request(&self, request: &Request) -> Result<()> {
        RequestValidator::validate(request)
    }
}

/// Ordered header list where setting a name replaces any earlier value, ignoring case
#[derive(Default)]
struct HeaderList(Vec<(String, String)>);

impl HeaderList {
    fn set(&mut self, name: &str, value: &str) {
        match self.0.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
            Some(entry) => *entry = (name.to_string(), value.to_string()),
            None => self.0.push((name.to_string(), value.to_string())),
        }
    }
}

/// Domain service for request validation
/// This contains domain business rules
pub struct RequestValidator;

impl RequestValidator {
    pub fn validate(request: &Request) -> Result<()> {
        Self::validate_url(&request.url)?;
        Self::validate_method_body_combination(request)?;
        Ok(())
    }

    fn validate_url(url: &Url) -> Result<()> {
        if !matches!(url.0.scheme_str(), Some("http") | Some("https")) {
            return Err(anyhow!("URL must start with http:// or https://"));
        }
        if url.host().is_none_or(str::is_empty) {
            return Err(anyhow!("URL has no host: '{}'", url.as_str()));
        }
        Ok(())
    }

    fn validate_method_body_combination(request: &Request) -> Result<()> {
        match (&request.method, &request.body) {
            (method, Some(_)) if !method.carries_body() => {
                Err(anyhow!("{} requests should not have a body", method))
            }
            _ => Ok(()),
        }
    }
}
