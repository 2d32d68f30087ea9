//! HTTP client for the backend API.
//!
//! Every public call except [`ApiClient::request`] converts failures into data
//! (`ApiResult`, `HealthReport`, `bool`), so callers never handle errors from
//! this layer.

use crate::config::{GenerateRequest, TransportConfig};
use crate::error::{TransportError, TransportResult};
use futures_util::future::join_all;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use satvis_core::{
    ApiResult, BatchResult, Category, EndpointHealth, HealthReport, HttpMethod, QueryParams,
    RequestSpec,
};
use satvis_telemetry::Metrics;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Client for the satellite visibility backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client (connection pool shared by clones).
    client: Client,
    /// Base URL without trailing slash.
    base_url: String,
    /// Budget for one request, response body included.
    timeout: Duration,
}

impl ApiClient {
    /// Create a new client.
    pub fn new(config: &TransportConfig) -> TransportResult<Self> {
        if config.timeout_ms == 0 {
            return Err(TransportError::InvalidConfig(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(TransportError::InvalidConfig(format!(
                "base_url must be an http(s) URL: {}",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            timeout: config.timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute one request and return the decoded JSON body.
    ///
    /// `body` is only sent for POST/PUT. On timeout the request future is
    /// dropped, which aborts the underlying connection.
    pub async fn request(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<&Value>,
    ) -> TransportResult<Value> {
        self.send(endpoint, method, &QueryParams::new(), body).await
    }

    async fn send(
        &self,
        path: &str,
        method: HttpMethod,
        params: &QueryParams,
        body: Option<&Value>,
    ) -> TransportResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.request(to_reqwest_method(method), &url);
        if !params.is_empty() {
            builder = builder.query(params);
        }
        if let (true, Some(body)) = (method.carries_body(), body) {
            builder = builder.json(body);
        }

        let exchange = async {
            let response = builder.send().await.map_err(TransportError::from_reqwest)?;

            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::Http {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or("").to_string(),
                });
            }

            let bytes = response
                .bytes()
                .await
                .map_err(TransportError::from_reqwest)?;
            serde_json::from_slice::<Value>(&bytes)
                .map_err(|e| TransportError::InvalidResponse(e.to_string()))
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(self.timeout)),
        }
    }

    /// Call a category route and normalize the outcome.
    async fn call(
        &self,
        category: Category,
        method: HttpMethod,
        params: &QueryParams,
        body: Option<&Value>,
    ) -> ApiResult {
        let started = Instant::now();
        let outcome = match category.check_method(method) {
            Ok(()) => self.send(category.path(), method, params, body).await,
            Err(e) => Err(e.into()),
        };
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok(data) => {
                Metrics::request(category.as_str(), "ok", elapsed_ms);
                debug!(%category, %method, elapsed_ms, "Request succeeded");
                ApiResult::ok(data)
            }
            Err(e) => {
                Metrics::request(category.as_str(), e.outcome_label(), elapsed_ms);
                warn!(%category, %method, error = %e, elapsed_ms, "Request failed");
                ApiResult::failed(e.to_string())
            }
        }
    }

    /// GET a category with query parameters. Never fails.
    pub async fn call_category(&self, category: Category, params: &QueryParams) -> ApiResult {
        self.call(category, HttpMethod::Get, params, None).await
    }

    /// Execute all requests concurrently.
    ///
    /// Every descriptor is validated first; a single malformed descriptor
    /// rejects the whole batch without issuing any request. Otherwise each
    /// request's failure stays inside its own `ApiResult` and the results
    /// are returned in input order.
    pub async fn batch(&self, requests: &[RequestSpec]) -> BatchResult {
        let categories = match requests
            .iter()
            .map(RequestSpec::resolve)
            .collect::<satvis_core::Result<Vec<_>>>()
        {
            Ok(categories) => categories,
            Err(e) => {
                warn!(error = %e, "Batch rejected");
                return BatchResult::rejected(e.to_string());
            }
        };

        let calls = categories
            .into_iter()
            .zip(requests)
            .map(|(category, spec)| self.call_category(category, &spec.params));
        let results = join_all(calls).await;

        debug!(
            requests = results.len(),
            failed = results.iter().filter(|r| !r.is_success()).count(),
            "Batch settled"
        );
        BatchResult::completed(results)
    }

    /// Ask the backend to generate test data (POST /api/satellite).
    pub async fn generate_test_data(&self, params: &GenerateRequest) -> ApiResult {
        let body = match serde_json::to_value(params) {
            Ok(body) => body,
            Err(e) => return ApiResult::failed(e.to_string()),
        };
        info!(
            satellite_count = params.satellite_count,
            trajectory_count = params.trajectory_count,
            analysis_type = %params.analysis_type,
            "Requesting test data generation"
        );
        self.call(
            Category::Satellite,
            HttpMethod::Post,
            &QueryParams::new(),
            Some(&body),
        )
        .await
    }

    /// Upload trajectory data (POST /api/trajectory). The body is passed through.
    pub async fn upload_trajectory(&self, data: &Value) -> ApiResult {
        self.call(
            Category::Trajectory,
            HttpMethod::Post,
            &QueryParams::new(),
            Some(data),
        )
        .await
    }

    /// Start an analysis run (POST /api/analysis). The body is passed through.
    pub async fn run_analysis(&self, params: &Value) -> ApiResult {
        self.call(
            Category::Analysis,
            HttpMethod::Post,
            &QueryParams::new(),
            Some(params),
        )
        .await
    }

    /// Whether the backend answers `/api/status` with `"success": true`.
    pub async fn check_connection(&self) -> bool {
        match self
            .request(Category::Status.path(), HttpMethod::Get, None)
            .await
        {
            Ok(body) => body.get("success").and_then(Value::as_bool).unwrap_or(false),
            Err(e) => {
                warn!(base_url = %self.base_url, error = %e, "Backend unreachable");
                false
            }
        }
    }

    /// Probe every category route independently.
    ///
    /// All probes run concurrently and each settles on its own; one failing
    /// route never hides the others.
    pub async fn health_check(&self) -> HealthReport {
        let probes = Category::ALL.into_iter().map(|category| async move {
            let outcome = self.request(category.path(), HttpMethod::Get, None).await;
            (category, outcome)
        });

        join_all(probes)
            .await
            .into_iter()
            .map(|(category, outcome)| {
                let health = match outcome {
                    Ok(_) => EndpointHealth::healthy(),
                    Err(e) => EndpointHealth::unhealthy(e.to_string()),
                };
                Metrics::endpoint_health(category.as_str(), health.is_healthy());
                (category, health)
            })
            .collect()
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
    }
}
