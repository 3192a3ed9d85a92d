use crate::domain::entities::{ContentMode, Method, RequestSpec};
use crate::domain::request_item::RequestItem;
use crate::infrastructure::config::Config;
use std::collections::BTreeMap;
use tracing::{trace, warn};

/// Accumulates flags and positional tokens into a `RequestSpec`.
/// Later tokens override earlier ones.
pub struct RequestBuilder {
    base_url: String,
    verbose: bool,
    timer: bool,
    timeout: u64,
    content: ContentMode,
    method: Method,
    url: String,
    headers: BTreeMap<String, String>,
    query: BTreeMap<String, String>,
    data: BTreeMap<String, String>,
}

impl RequestBuilder {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            verbose: false,
            timer: false,
            timeout: config.timeout.as_secs(),
            content: ContentMode::default(),
            method: Method::default(),
            url: config.base_url.clone(),
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
            data: BTreeMap::new(),
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn timer(mut self, timer: bool) -> Self {
        self.timer = timer;
        self
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    pub fn content(mut self, content: ContentMode) -> Self {
        self.content = content;
        self
    }

    pub fn items(self, tokens: &[String]) -> Self {
        tokens.iter().fold(self, |builder, token| builder.item(token))
    }

    pub fn item(mut self, token: &str) -> Self {
        let item = RequestItem::classify(token);
        trace!(token, ?item, "classified token");

        match item {
            RequestItem::BaseUrlSuffix(suffix) => self.url = format!("{}{}", self.base_url, suffix),
            RequestItem::Method(method) => self.method = method,
            RequestItem::Url(url) => self.url = url,
            RequestItem::Query(key, value) => {
                self.query.insert(key, value);
            }
            RequestItem::Field(key, value) => {
                self.data.insert(key, value);
            }
            RequestItem::Header(key, value) => {
                self.headers.insert(key, value);
            }
            RequestItem::Ignored(token) => {
                if !token.is_empty() {
                    warn!(token = %token, "ignoring unrecognized argument");
                }
            }
        }
        self
    }

    pub fn build(self) -> RequestSpec {
        RequestSpec {
            verbose: self.verbose,
            timer: self.timer,
            timeout: self.timeout,
            content: self.content,
            method: self.method,
            url: self.url,
            headers: self.headers,
            query: self.query,
            data: self.data,
        }
    }
}
