use crate::application::services::{HttpClient, HttpRequestService};
use crate::domain::entities::{Method as DomainMethod, Request, Response, Timing};
use crate::domain::value_objects::{Body, Url};
use crate::infrastructure::config::Config;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::client::conn::http1::{self, SendRequest};
use hyper::header::HOST;
use hyper::{Method, Request as HyperRequest};
use hyper_util::rt::TokioIo;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_native_tls::{TlsConnector, native_tls};
use tracing::debug;

/// Infrastructure implementation of HttpClient using Hyper
/// Opens one HTTP/1.1 connection per request, over TLS for https URLs
#[derive(Default)]
pub struct HyperHttpClient;

impl HyperHttpClient {
    pub fn new() -> Self {
        Self
    }

    /// Creates a configured HTTP request service using this client
    pub fn create_request_service(self, config: Config) -> HttpRequestService {
        HttpRequestService::new(Box::new(self), config)
    }
}

#[async_trait]
impl HttpClient for HyperHttpClient {
    async fn send(&self, request: Request) -> Result<Response> {
        let timeout = request.timeout;
        match timeout {
            Some(limit) => tokio::time::timeout(limit, self.exchange(request))
                .await
                .map_err(|_| anyhow!("Request timed out after {}s", limit.as_secs_f64()))?,
            None => self.exchange(request).await,
        }
    }
}

impl HyperHttpClient {
    /// Request time spans dialling, the TLS handshake and waiting for the response head
    async fn exchange(&self, request: Request) -> Result<Response> {
        let started = Instant::now();
        let mut sender = self.connect(&request.url).await?;
        let hyper_request = RequestAdapter::to_hyper_request(request)?;

        let hyper_response = sender
            .send_request(hyper_request)
            .await
            .map_err(|e| anyhow!("HTTP request execution failed: {}", e))?;
        let request_time = started.elapsed();

        ResponseAdapter::to_domain_response(hyper_response, request_time).await
    }

    async fn connect(&self, url: &Url) -> Result<SendRequest<Full<Bytes>>> {
        let host = url.host().ok_or_else(|| anyhow!("URL has no host: '{}'", url.as_str()))?;
        let port = url.port();

        debug!(host, port, tls = url.is_https(), "connecting");
        let stream = TcpStream::connect((host, port))
            .await
            .with_context(|| format!("Failed to connect to {}:{}", host, port))?;

        if url.is_https() {
            let connector = native_tls::TlsConnector::new()
                .map_err(|e| anyhow!("Failed to initialise TLS: {}", e))?;
            let stream = TlsConnector::from(connector)
                .connect(host, stream)
                .await
                .map_err(|e| anyhow!("TLS handshake with {} failed: {}", host, e))?;
            Self::handshake(stream).await
        } else {
            Self::handshake(stream).await
        }
    }

    async fn handshake<S>(stream: S) -> Result<SendRequest<Full<Bytes>>>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (sender, connection) = http1::handshake(TokioIo::new(stream))
            .await
            .map_err(|e| anyhow!("HTTP handshake failed: {}", e))?;

        tokio::spawn(async move {
            if let Err(err) = connection.await {
                debug!(error = %err, "connection closed with error");
            }
        });

        Ok(sender)
    }
}

/// Adapter for converting domain requests to Hyper requests
struct RequestAdapter;

impl RequestAdapter {
    fn to_hyper_request(domain_request: Request) -> Result<HyperRequest<Full<Bytes>>> {
        let method = MethodAdapter::to_hyper_method(domain_request.method);
        let body = BodyAdapter::to_hyper_body(&domain_request.body);

        let mut builder = HyperRequest::builder()
            .method(method)
            .uri(domain_request.url.target());

        let has_host = domain_request
            .headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("host"));
        if !has_host {
            builder = builder.header(HOST, domain_request.url.authority());
        }

        for (name, value) in &domain_request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .body(body)
            .map_err(|e| anyhow!("Failed to build HTTP request: {}", e))
    }
}

/// Adapter for converting domain responses from Hyper responses
struct ResponseAdapter;

impl ResponseAdapter {
    async fn to_domain_response(
        hyper_response: hyper::Response<Incoming>,
        request_time: std::time::Duration,
    ) -> Result<Response> {
        let status = hyper_response.status();
        let version = hyper_response.version();
        let headers: Vec<(String, String)> = hyper_response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let started = Instant::now();
        let body_bytes = Self::extract_response_body(hyper_response).await?;
        let response_time = started.elapsed();

        Ok(Response {
            status,
            version,
            headers,
            size: body_bytes.len(),
            body: String::from_utf8_lossy(&body_bytes).into_owned(),
            timing: Timing {
                request: request_time,
                response: response_time,
            },
        })
    }

    async fn extract_response_body(response: hyper::Response<Incoming>) -> Result<Bytes> {
        Ok(response
            .into_body()
            .collect()
            .await
            .map_err(|e| anyhow!("Failed to read response body: {}", e))?
            .to_bytes())
    }
}

/// Adapter for converting domain HTTP methods to Hyper methods
struct MethodAdapter;

impl MethodAdapter {
    fn to_hyper_method(domain_method: DomainMethod) -> Method {
        match domain_method {
            DomainMethod::Get => Method::GET,
            DomainMethod::Post => Method::POST,
            DomainMethod::Put => Method::PUT,
            DomainMethod::Delete => Method::DELETE,
            DomainMethod::Patch => Method::PATCH,
            DomainMethod::Head => Method::HEAD,
            DomainMethod::Options => Method::OPTIONS,
        }
    }
}

/// Adapter for converting domain request bodies to Hyper bodies
struct BodyAdapter;

impl BodyAdapter {
    fn to_hyper_body(domain_body: &Option<Body>) -> Full<Bytes> {
        match domain_body {
            Some(body) => Full::new(Bytes::from(body.payload.clone())),
            None => Full::new(Bytes::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accepts one connection, captures the raw request and answers with `reply`
    async fn serve_once(reply: &'static str) -> (SocketAddr, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let raw = read_request(&mut socket).await;
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            raw
        });

        (addr, handle)
    }

    /// Reads the head plus as many body bytes as Content-Length announces
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut raw = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&raw).into_owned();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let expected = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if raw.len() >= head_end + 4 + expected {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&raw).into_owned()
    }

    fn request(method: DomainMethod, url: &str, body: Option<Body>) -> Request {
        Request {
            method,
            url: Url::new(url).unwrap(),
            headers: vec![
                ("Accept".to_string(), "*/*".to_string()),
                ("X-Trace".to_string(), "abc".to_string()),
            ],
            body,
            timeout: Some(Duration::from_secs(5)),
        }
    }

    #[tokio::test]
    async fn get_round_trip_over_a_local_socket() {
        let (addr, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 11\r\nConnection: close\r\n\r\n{\"ok\":true}",
        )
        .await;

        let url = format!("http://{}/status?verbose=1", addr);
        let response = HyperHttpClient::new()
            .send(request(DomainMethod::Get, &url, None))
            .await
            .unwrap();

        assert_eq!(response.status, hyper::StatusCode::OK);
        assert_eq!(response.version, hyper::Version::HTTP_11);
        assert_eq!(response.body, "{\"ok\":true}");
        assert_eq!(response.size, 11);
        assert!(response.is_json());

        let raw = server.await.unwrap();
        assert!(raw.starts_with("GET /status?verbose=1 HTTP/1.1\r\n"), "{raw}");
        assert!(raw.to_lowercase().contains(&format!("host: {}\r\n", addr)), "{raw}");
        assert!(raw.to_lowercase().contains("x-trace: abc\r\n"), "{raw}");
    }

    #[tokio::test]
    async fn post_sends_the_encoded_body() {
        let (addr, server) = serve_once(
            "HTTP/1.1 201 Created\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let body = Body::form(&[("name".to_string(), "hat".to_string())].into_iter().collect());
        let url = format!("http://{}/users", addr);
        let response = HyperHttpClient::new()
            .send(request(DomainMethod::Post, &url, Some(body)))
            .await
            .unwrap();

        assert_eq!(response.status, hyper::StatusCode::CREATED);
        assert_eq!(response.body, "");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /users HTTP/1.1\r\n"), "{raw}");
        assert!(raw.ends_with("\r\n\r\nname=hat"), "{raw}");
    }

    #[tokio::test]
    async fn request_time_spans_the_whole_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_millis(150)).await;
            read_request(&mut socket).await;
            socket
                .write_all(b"HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n")
                .await
                .unwrap();
            socket.shutdown().await.ok();
        });

        let started = Instant::now();
        let response = HyperHttpClient::new()
            .send(request(DomainMethod::Get, &format!("http://{}/", addr), None))
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(response.status, hyper::StatusCode::NO_CONTENT);
        assert!(response.timing.request >= Duration::from_millis(150), "{:?}", response.timing);
        assert!(response.timing.request + response.timing.response <= elapsed);
    }

    #[tokio::test]
    async fn silent_servers_hit_the_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let mut request = request(DomainMethod::Get, &format!("http://{}/", addr), None);
        request.timeout = Some(Duration::from_millis(200));

        let err = HyperHttpClient::new().send(request).await.unwrap_err();
        assert!(err.to_string().contains("timed out"), "{err}");
    }

    #[tokio::test]
    async fn refused_connections_are_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = HyperHttpClient::new()
            .send(request(DomainMethod::Get, &format!("http://{}/", addr), None))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to connect"), "{err}");
    }
}
