//! JSON-over-HTTP transport with status classification and exponential backoff.

use crate::config::{FrostConfig, RetryPolicy};
use crate::transport::error::ApiError;
use log::{debug, warn};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::future::Future;

/// A GET request: base URL, query parameters and whether to send credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub url: String,
    pub query: Vec<(&'static str, String)>,
    pub authenticated: bool,
}

impl Endpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            authenticated: false,
        }
    }

    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    pub fn authenticated(mut self) -> Self {
        self.authenticated = true;
        self
    }

    /// The full URL with URL-encoded query, or `None` if the base URL does not parse.
    pub fn to_url(&self) -> Option<Url> {
        let mut url = Url::parse(&self.url).ok()?;
        if !self.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Some(url)
    }
}

/// How a response status is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 200, 201: decode the body.
    Success,
    /// 404, 412: no data, not an error.
    NoData,
    /// 429: back off and retry.
    Overloaded,
    /// 401, 403.
    Unauthorized,
    /// 400.
    BadRequest,
    /// 5xx.
    Server,
    Unexpected,
}

pub fn classify_status(status: StatusCode) -> StatusClass {
    match status.as_u16() {
        200 | 201 => StatusClass::Success,
        404 | 412 => StatusClass::NoData,
        429 => StatusClass::Overloaded,
        401 | 403 => StatusClass::Unauthorized,
        400 => StatusClass::BadRequest,
        500..=599 => StatusClass::Server,
        _ => StatusClass::Unexpected,
    }
}

/// Result of a single attempt.
pub(crate) enum AttemptOutcome<T> {
    Finished(Result<Option<T>, ApiError>),
    Retry(ApiError),
}

/// Runs `attempt` until it finishes, retrying up to `policy.max_retries` times with doubling
/// delays. The error of the last retryable attempt is returned once retries run out.
pub(crate) async fn run_with_retries<T, F, Fut>(
    policy: &RetryPolicy,
    mut attempt: F,
) -> Result<Option<T>, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AttemptOutcome<T>>,
{
    let mut retry = 0;
    loop {
        match attempt().await {
            AttemptOutcome::Finished(result) => return result,
            AttemptOutcome::Retry(error) => {
                if retry >= policy.max_retries {
                    return Err(error);
                }
                let delay = policy.backoff(retry);
                retry += 1;
                warn!(
                    "{} ({}), retry {}/{} in {:?}",
                    error,
                    error.kind(),
                    retry,
                    policy.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// True if the host of `url` resolves to at least one address.
async fn host_resolves(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let port = url.port_or_known_default().unwrap_or(443);
    match tokio::net::lookup_host((host, port)).await {
        Ok(mut addresses) => addresses.next().is_some(),
        Err(error) => {
            debug!("Cannot resolve {}: {}", host, error);
            false
        }
    }
}

#[derive(Debug, Clone)]
struct Credentials {
    client_id: String,
    client_secret: Option<String>,
}

/// HTTP client shared by all Frost calls.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    credentials: Credentials,
    retry: RetryPolicy,
}

impl HttpClient {
    pub fn new(config: &FrostConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .build()
            .map_err(ApiError::ClientBuild)?;
        Ok(Self {
            client,
            credentials: Credentials {
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
            },
            retry: config.retry,
        })
    }

    /// GETs `endpoint` and decodes the JSON body. `Ok(None)` means the server answered that
    /// there is no data (404 or 412).
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
    ) -> Result<Option<T>, ApiError> {
        let url = endpoint.to_url().ok_or_else(|| ApiError::InvalidUrl {
            url: endpoint.url.clone(),
        })?;
        debug!("GET {}", url);
        run_with_retries(&self.retry, || self.attempt(&url, endpoint.authenticated)).await
    }

    async fn attempt<T: DeserializeOwned>(&self, url: &Url, authenticated: bool) -> AttemptOutcome<T> {
        let url_string = url.to_string();
        let mut request = self.client.get(url.clone());
        if authenticated {
            request = request.basic_auth(
                &self.credentials.client_id,
                self.credentials.client_secret.as_ref(),
            );
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(source) if source.is_timeout() => {
                return AttemptOutcome::Retry(ApiError::Timeout {
                    url: url_string,
                    source,
                })
            }
            Err(source) if source.is_connect() || source.is_request() || source.is_body() => {
                if source.is_connect() && !host_resolves(url).await {
                    return AttemptOutcome::Finished(Err(ApiError::UnresolvedHost {
                        url: url_string,
                        source,
                    }));
                }
                return AttemptOutcome::Retry(ApiError::Network {
                    url: url_string,
                    source,
                })
            }
            Err(source) => {
                return AttemptOutcome::Finished(Err(ApiError::Request {
                    url: url_string,
                    source,
                }))
            }
        };

        let status = response.status();
        let url = url_string;
        let error = match classify_status(status) {
            StatusClass::Success => {
                return AttemptOutcome::Finished(
                    response
                        .json::<T>()
                        .await
                        .map(Some)
                        .map_err(|source| ApiError::Decode { url, source }),
                )
            }
            StatusClass::NoData => {
                debug!("No data ({}) for {}", status, url);
                return AttemptOutcome::Finished(Ok(None));
            }
            StatusClass::Overloaded => return AttemptOutcome::Retry(ApiError::Overloaded { url }),
            StatusClass::Unauthorized => ApiError::Unauthorized { url, status },
            StatusClass::BadRequest => ApiError::BadRequest { url },
            StatusClass::Server => ApiError::Server { url, status },
            StatusClass::Unexpected => ApiError::UnexpectedStatus { url, status },
        };
        AttemptOutcome::Finished(Err(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::error::ApiErrorKind;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(1))
    }

    fn overloaded() -> ApiError {
        ApiError::Overloaded {
            url: "http://localhost".to_string(),
        }
    }

    /// Serves the given raw HTTP responses, one per connection, and counts requests.
    async fn serve(responses: Vec<String>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            for response in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let mut received = Vec::new();
                let mut buffer = [0u8; 1024];
                while !received.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buffer).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => received.extend_from_slice(&buffer[..n]),
                    }
                }
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        (format!("http://{}/data", address), hits)
    }

    fn raw_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    fn client(max_retries: u32) -> HttpClient {
        let config = FrostConfig::builder()
            .client_id("test")
            .retry(fast_policy(max_retries))
            .build();
        HttpClient::new(&config).unwrap()
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        value: i32,
    }

    #[test]
    fn test_status_classification() {
        let cases = [
            (200, StatusClass::Success),
            (201, StatusClass::Success),
            (404, StatusClass::NoData),
            (412, StatusClass::NoData),
            (429, StatusClass::Overloaded),
            (401, StatusClass::Unauthorized),
            (403, StatusClass::Unauthorized),
            (400, StatusClass::BadRequest),
            (500, StatusClass::Server),
            (502, StatusClass::Server),
            (503, StatusClass::Server),
            (418, StatusClass::Unexpected),
            (302, StatusClass::Unexpected),
        ];
        for (code, expected) in cases {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(classify_status(status), expected, "status {}", code);
        }
    }

    #[test]
    fn test_endpoint_url_encodes_parameters() {
        let endpoint = Endpoint::new("https://frost.met.no/observations/v0.jsonld")
            .param("sources", "SN18700,SN18210")
            .param("elements", "mean(air_temperature P1M)");
        let url = endpoint.to_url().unwrap();
        assert_eq!(
            url.as_str(),
            "https://frost.met.no/observations/v0.jsonld?sources=SN18700%2CSN18210&elements=mean%28air_temperature+P1M%29"
        );
        assert!(Endpoint::new("not a url").to_url().is_none());
    }

    #[tokio::test]
    async fn test_persistent_overload_makes_max_retries_plus_one_attempts() {
        let calls = AtomicUsize::new(0);
        let result: Result<Option<()>, ApiError> = run_with_retries(&fast_policy(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { AttemptOutcome::Retry(overloaded()) }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(result.unwrap_err().kind(), ApiErrorKind::Overload);
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: Result<Option<()>, ApiError> = run_with_retries(&fast_policy(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                AttemptOutcome::Finished(Err(ApiError::BadRequest {
                    url: "http://localhost".to_string(),
                }))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.unwrap_err().kind(), ApiErrorKind::MalformedRequest);
    }

    #[tokio::test]
    async fn test_retry_then_success() {
        let calls = AtomicUsize::new(0);
        let result = run_with_retries(&fast_policy(3), || {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if call < 2 {
                    AttemptOutcome::Retry(overloaded())
                } else {
                    AttemptOutcome::Finished(Ok(Some(call)))
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_get_json_decodes_body() {
        let (url, hits) = serve(vec![raw_response("200 OK", r#"{"value":7}"#)]).await;
        let payload: Option<Payload> = client(0).get_json(&Endpoint::new(url)).await.unwrap();
        assert_eq!(payload, Some(Payload { value: 7 }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_json_not_found_is_no_data() {
        let (url, _) = serve(vec![raw_response("404 Not Found", "")]).await;
        let payload: Option<Payload> = client(0).get_json(&Endpoint::new(url)).await.unwrap();
        assert_eq!(payload, None);
    }

    #[tokio::test]
    async fn test_get_json_retries_429() {
        let (url, hits) = serve(vec![
            raw_response("429 Too Many Requests", ""),
            raw_response("429 Too Many Requests", ""),
            raw_response("200 OK", r#"{"value":1}"#),
        ])
        .await;
        let payload: Option<Payload> = client(3).get_json(&Endpoint::new(url)).await.unwrap();
        assert_eq!(payload, Some(Payload { value: 1 }));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_get_json_fatal_statuses() {
        let (url, hits) = serve(vec![
            raw_response("401 Unauthorized", ""),
            raw_response("503 Service Unavailable", ""),
        ])
        .await;
        let client = client(3);
        let endpoint = Endpoint::new(url).authenticated();
        let error = client.get_json::<Payload>(&endpoint).await.unwrap_err();
        assert_eq!(error.kind(), ApiErrorKind::Authorization);
        let error = client.get_json::<Payload>(&endpoint).await.unwrap_err();
        assert_eq!(error.kind(), ApiErrorKind::ServerError);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_get_json_bad_body_is_unknown() {
        let (url, _) = serve(vec![raw_response("200 OK", "not json")]).await;
        let error = client(0)
            .get_json::<Payload>(&Endpoint::new(url))
            .await
            .unwrap_err();
        assert!(matches!(error, ApiError::Decode { .. }));
        assert_eq!(error.kind(), ApiErrorKind::Unknown);
    }

    #[tokio::test]
    async fn test_host_resolution() {
        assert!(host_resolves(&Url::parse("http://127.0.0.1:8080/").unwrap()).await);
        assert!(host_resolves(&Url::parse("http://[::1]/").unwrap()).await);
        assert!(!host_resolves(&Url::parse("https://frost-climate.invalid/").unwrap()).await);
    }

    #[tokio::test]
    async fn test_unresolved_host_fails_without_retrying() {
        let endpoint = Endpoint::new("http://frost-climate.invalid/observations");
        let started = std::time::Instant::now();
        let config = FrostConfig::builder()
            .client_id("test")
            .retry(RetryPolicy::new(3, Duration::from_secs(5)))
            .build();
        let error = HttpClient::new(&config)
            .unwrap()
            .get_json::<Payload>(&endpoint)
            .await
            .unwrap_err();
        assert!(matches!(error, ApiError::UnresolvedHost { .. }), "{error:?}");
        assert_eq!(error.kind(), ApiErrorKind::Network);
        // A retry would have slept for at least five seconds.
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_refused_connection_is_retried() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);
        let error = client(2)
            .get_json::<Payload>(&Endpoint::new(format!("http://{}/data", address)))
            .await
            .unwrap_err();
        assert!(matches!(error, ApiError::Network { .. }), "{error:?}");
    }
}
