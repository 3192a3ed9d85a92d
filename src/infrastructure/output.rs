use crate::domain::entities::{Request, Response, Timing};
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::Value;

/// Prints the exchange: verbose heads first, then the body, then timing
pub fn print_exchange(request: &Request, response: &Response, verbose: bool, timer: bool) -> Result<()> {
    if verbose {
        print!("{}", format_request_head(request).cyan());
        print!("{}", format_response_head(response).yellow());
    }

    print_response_body(response)?;

    if timer {
        println!("{}", format_timing(&response.timing, response.size).dimmed());
    }
    Ok(())
}

pub fn print_response_body(response: &Response) -> Result<()> {
    let (text, is_json) = format_body(response)?;
    if is_json {
        println!("{}", text.green());
    } else {
        println!("{}", text);
    }
    Ok(())
}

/// `> ` lines for the request line, headers and, when present, the body
pub fn format_request_head(request: &Request) -> String {
    let mut head = format!(
        "> {} {} HTTP/1.1\n",
        request.method,
        request.url.target()
    );

    if !request
        .headers
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case("host"))
    {
        head.push_str(&format!("> Host: {}\n", request.url.authority()));
    }
    for (name, value) in &request.headers {
        head.push_str(&format!("> {}: {}\n", name, value));
    }
    head.push_str(">\n");

    if let Some(body) = request.body.as_ref().filter(|body| !body.payload.is_empty()) {
        head.push_str(&body.display);
        head.push_str("\n>\n");
    }
    head
}

/// `< ` lines for the status line and headers
pub fn format_response_head(response: &Response) -> String {
    let mut head = format!(
        "< {:?} {} {}\n",
        response.version,
        response.status.as_str(),
        response.status.canonical_reason().unwrap_or_default()
    );
    for (name, value) in &response.headers {
        head.push_str(&format!("< {}: {}\n", canonical_header_name(name), value));
    }
    head.push_str("<\n");
    head
}

/// `content-type` -> `Content-Type`
fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    let rest = chars.as_str().to_ascii_lowercase();
                    format!("{}{}", first.to_ascii_uppercase(), rest)
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Returns the printable body and whether it was rendered as JSON.
///
/// A body declared as `application/json` must parse; other bodies are
/// pretty-printed only when they look like a JSON object or array and parse.
pub fn format_body(response: &Response) -> Result<(String, bool)> {
    if response.is_json() {
        if response.body.trim().is_empty() {
            return Ok((String::new(), false));
        }
        let value: Value = serde_json::from_str(&response.body)
            .context("Response is declared as application/json but is not valid JSON")?;
        return Ok((serde_json::to_string_pretty(&value)?, true));
    }

    let trimmed = response.body.trim();
    if looks_like_json(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            return Ok((serde_json::to_string_pretty(&value)?, true));
        }
    }
    Ok((response.body.clone(), false))
}

fn looks_like_json(text: &str) -> bool {
    (text.starts_with('{') || text.starts_with('['))
        && (text.ends_with('}') || text.ends_with(']'))
}

/// Blank line, then request time, body read time and download speed in KiB/s
pub fn format_timing(timing: &Timing, size: usize) -> String {
    let request_ms = timing.request.as_millis();
    let response_ms = timing.response.as_millis();
    let speed = (size as u128 * 1000 / 1024) / response_ms.max(1);

    format!(
        "\nrequest:\t{:.2}s\nresponse:\t{:.2}s\ndownload:\t{}k/s",
        request_ms as f64 / 1000.0,
        response_ms as f64 / 1000.0,
        speed
    )
}
