use crate::domain::entities::ContentMode;
use anyhow::{Result, anyhow};
use http::Uri;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Everything except ASCII alphanumerics and `-_.~` gets percent-encoded
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Encodes pairs as `application/x-www-form-urlencoded`, space as `+`
pub fn encode_pairs(pairs: &BTreeMap<String, String>) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", form_escape(key), form_escape(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn form_escape(raw: &str) -> String {
    utf8_percent_encode(raw, FORM_VALUE)
        .to_string()
        .replace("%20", "+")
}

/// Represents a validated URL
#[derive(Debug, Clone)]
pub struct Url(pub Uri);

impl Url {
    /// Creates a new Url with validation
    ///
    /// # Arguments
    /// * `url` - The URL string to parse
    ///
    /// # Returns
    /// * `Ok(Url)` - Validated URL
    /// * `Err(anyhow::Error)` - If the URL is invalid
    pub fn new(url: &str) -> Result<Self> {
        let uri = url.parse::<Uri>().map_err(|e| anyhow!("Invalid URL '{}': {}", url, e))?;
        Ok(Url(uri))
    }

    /// Completes a user-supplied target: adds `http://` when no scheme is
    /// given and appends the encoded query parameters.
    pub fn resolve(target: &str, query: &BTreeMap<String, String>) -> Result<Self> {
        let mut url = if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            format!("http://{}", target)
        };

        if !query.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&encode_pairs(query));
        }

        Self::new(&url)
    }

    /// Returns the URL as a string
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }

    pub fn is_https(&self) -> bool {
        self.0.scheme_str() == Some("https")
    }

    /// Host name without IPv6 brackets, suitable for connecting
    pub fn host(&self) -> Option<&str> {
        self.0
            .host()
            .map(|host| host.trim_start_matches('[').trim_end_matches(']'))
    }

    pub fn port(&self) -> u16 {
        self.0
            .port_u16()
            .unwrap_or(if self.is_https() { 443 } else { 80 })
    }

    /// Value for the Host header: host plus the port when one was given explicitly
    pub fn authority(&self) -> String {
        let host = self.0.host().unwrap_or_default();
        match self.0.port_u16() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// Origin-form request target, `/` when the path is empty
    pub fn target(&self) -> String {
        match self.0.query() {
            Some(query) => format!("{}?{}", self.0.path(), query),
            None => self.0.path().to_string(),
        }
    }
}

/// Represents an encoded request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    /// Bytes sent on the wire
    pub payload: String,
    /// Human-readable form shown in verbose output
    pub display: String,
}

impl Body {
    pub fn encode(mode: ContentMode, fields: &BTreeMap<String, String>) -> Result<Self> {
        match mode {
            ContentMode::Json => Self::json(fields),
            ContentMode::Form => Ok(Self::form(fields)),
        }
    }

    /// JSON object of string values, `{}` when there are no fields
    pub fn json(fields: &BTreeMap<String, String>) -> Result<Self> {
        let object: Map<String, Value> = fields
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();
        let value = Value::Object(object);

        let payload = serde_json::to_string(&value)
            .map_err(|e| anyhow!("Failed to encode JSON body: {}", e))?;
        let display = serde_json::to_string_pretty(&value).unwrap_or_else(|_| payload.clone());
        Ok(Body { payload, display })
    }

    pub fn form(fields: &BTreeMap<String, String>) -> Self {
        let payload = encode_pairs(fields);
        Body {
            display: payload.clone(),
            payload,
        }
    }
}
