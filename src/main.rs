mod application;
mod domain;
mod infrastructure;
mod presentation;

use crate::infrastructure::config::Config;
use crate::infrastructure::http_client::HyperHttpClient;
use crate::presentation::cli::Cli;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

/// hat: a command-line tool for HTTP API testing
///
/// Classifies its arguments into method, URL, headers, body fields and
/// query parameters, sends one request and prints the response, with
/// JSON pretty-printed and optional verbose and timing output.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_from_argv(std::env::args()) {
        Ok(cli) => cli,
        Err(err) => {
            let status = Cli::exit_status(&err);
            if status == 0 {
                let _ = err.print();
            } else {
                eprintln!("{}", err.to_string().trim_end().red());
            }
            std::process::exit(status);
        }
    };
    let config = Config::default();
    let request_service = HyperHttpClient::new().create_request_service(config.clone());

    if let Err(err) = cli.run(&request_service, &config).await {
        eprintln!("{}", format!("{:#}", err).red());
        std::process::exit(1);
    }
}
