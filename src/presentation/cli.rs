use crate::application::builders::request_builder::RequestBuilder;
use crate::application::services::HttpRequestService;
use crate::domain::entities::{ContentMode, RequestSpec};
use crate::infrastructure::config::{Config, DEFAULT_TIMEOUT_SECS};
use crate::infrastructure::output;
use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use tracing::{debug, warn};

const VERSION_INFO: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\n",
    "Copyright ",
    env!("CARGO_PKG_AUTHORS"),
    "\n",
    "Released under the Apache License, Version 2.0"
);

const SHORT_FLAGS: &str = "jfvtVh";
const LONG_FLAGS: [&str; 7] = ["json", "form", "verbose", "timer", "timeout", "version", "help"];

const ITEMS_HELP: &str = "\
METHOD: GET (default), POST, PUT, DELETE, PATCH, HEAD, OPTIONS

URL: the HTTP URL for the request, http and https supported
    <empty>       http://127.0.0.1/ (default)
    :8080         http://127.0.0.1:8080/
    :8080/api/    http://127.0.0.1:8080/api/
    /api/         http://127.0.0.1/api/
    example.com   http://example.com/

ITEMS: HTTP headers, body and query, add as many as you want
    key:value     HTTP header     User-Agent:HAT/0.1.0
    key=value     HTTP body       name=likexian
    key?=value    HTTP query      name?=likexian sets the URL to /?name=likexian";

/// CLI configuration for hat
#[derive(Parser, Debug)]
#[command(name = "hat", author, version = VERSION_INFO)]
#[command(about = "hat: a command-line tool for HTTP API testing", long_about = None)]
#[command(after_help = ITEMS_HELP)]
pub struct Cli {
    /// [METHOD] [URL] [ITEM]...
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,

    /// Send body fields JSON-encoded (default)
    #[arg(short, long, overrides_with = "form")]
    pub json: bool,

    /// Send body fields form-encoded
    #[arg(short, long, overrides_with = "json")]
    pub form: bool,

    /// Print the request and the response head
    #[arg(short, long)]
    pub verbose: bool,

    /// Print request and response time and download speed
    #[arg(short = 't', long = "timer")]
    pub timer: bool,

    /// Total request timeout in seconds, 0 for none
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

impl Cli {
    /// Parses argv after dropping hyphen tokens that are not one of our flags.
    /// Everything after `--` is passed through untouched.
    pub fn try_from_argv<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut passthrough = false;
        let mut kept = Vec::new();
        for (index, token) in argv.into_iter().map(Into::<String>::into).enumerate() {
            if index == 0 || passthrough || !token.starts_with('-') || is_known_flag(&token) {
                kept.push(token);
            } else if token == "--" {
                passthrough = true;
                kept.push(token);
            } else {
                warn!(token = %token, "ignoring unrecognized flag");
            }
        }
        Self::try_parse_from(kept)
    }

    /// Help and version requests succeed; every other argument error exits 1
    pub fn exit_status(err: &clap::Error) -> i32 {
        match err.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
            _ => 1,
        }
    }

    pub fn request_spec(&self, config: &Config) -> RequestSpec {
        let content = if self.form {
            ContentMode::Form
        } else {
            ContentMode::Json
        };

        RequestBuilder::new(config)
            .verbose(self.verbose)
            .timer(self.timer)
            .timeout(self.timeout)
            .content(content)
            .items(&self.args)
            .build()
    }

    pub async fn run(&self, request_service: &HttpRequestService, config: &Config) -> Result<()> {
        let spec = self.request_spec(config);
        debug!(spec = %serde_json::to_string(&spec).unwrap_or_default(), "parsed arguments");

        let request = request_service.prepare(&spec)?;
        let response = request_service.send_request(request.clone()).await?;

        output::print_exchange(&request, &response, spec.verbose, spec.timer)
    }
}

fn is_known_flag(token: &str) -> bool {
    match token.strip_prefix("--") {
        Some(long) => {
            let name = long.split_once('=').map_or(long, |(name, _)| name);
            LONG_FLAGS.contains(&name)
        }
        // a lone `-` is a positional value
        None => token[1..].chars().all(|c| SHORT_FLAGS.contains(c)),
    }
}
