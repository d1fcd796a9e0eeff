//! Request forwarding to upstream services.

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, HeaderMap, HeaderName},
    response::Response,
};
use service_core::error::AppError;
use service_core::observability::inject_trace_context;
use std::time::{Duration, Instant};
use tracing::{instrument, warn};

use crate::services::metrics::{UPSTREAM_REQUESTS_TOTAL, UPSTREAM_REQUEST_DURATION};

/// Largest request body the gateway buffers before forwarding.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Connection-scoped headers that must not be relayed (RFC 9110 §7.6.1).
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

fn forwardable_request_headers(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| {
            let name = *name;
            !is_hop_by_hop(name) && ![header::HOST, header::CONTENT_LENGTH].contains(name)
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Maps the raw request path under `gateway_prefix` onto `upstream_prefix`.
///
/// The path is taken as received, still percent-encoded, so an encoded `?`
/// or `/` stays inside its segment upstream. Dot segments, plain or encoded,
/// are rejected.
pub fn rewrite_path(
    raw_path: &str,
    gateway_prefix: &str,
    upstream_prefix: &str,
) -> Result<String, AppError> {
    let rest = raw_path
        .strip_prefix(gateway_prefix)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        .ok_or_else(|| {
            AppError::BadRequest(anyhow::anyhow!("Path is outside {}", gateway_prefix))
        })?;

    let has_dot_segment = rest.split('/').any(|segment| {
        let segment = segment.to_ascii_lowercase().replace("%2e", ".");
        segment == "." || segment == ".."
    });
    if has_dot_segment {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Relative path segments are not allowed"
        )));
    }

    let path = format!("{}{}", upstream_prefix, rest);
    Ok(if path.is_empty() { "/".to_string() } else { path })
}

/// Relays requests to an upstream and copies the reply back.
#[derive(Clone)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new(request_timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Send `request` to `{base_url}{path}`, keeping method, query, headers and body.
    #[instrument(skip(self, request), fields(upstream = %upstream, method = %request.method()))]
    pub async fn forward(
        &self,
        upstream: &'static str,
        base_url: &str,
        path: &str,
        request: Request,
    ) -> Result<Response, AppError> {
        let (parts, body) = request.into_parts();

        let mut url = format!("{}{}", base_url, path);
        if let Some(query) = parts.uri.query() {
            url.push('?');
            url.push_str(query);
        }

        let body = to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read request body: {}", e)))?;

        let mut headers = forwardable_request_headers(&parts.headers);
        inject_trace_context(&mut headers);

        let started = Instant::now();
        let result = self
            .client
            .request(parts.method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await;
        UPSTREAM_REQUEST_DURATION
            .with_label_values(&[upstream])
            .observe(started.elapsed().as_secs_f64());

        let upstream_response = result.map_err(|e| {
            UPSTREAM_REQUESTS_TOTAL
                .with_label_values(&[upstream, "error"])
                .inc();
            warn!(error = %e, url = %url, "Upstream request failed");
            AppError::BadGateway(format!("{} unreachable", upstream))
        })?;

        let status = upstream_response.status();
        UPSTREAM_REQUESTS_TOTAL
            .with_label_values(&[upstream, status.as_str()])
            .inc();

        let mut response = Response::builder().status(status);
        if let Some(headers) = response.headers_mut() {
            for (name, value) in upstream_response.headers() {
                if !is_hop_by_hop(name) {
                    headers.append(name.clone(), value.clone());
                }
            }
        }

        let bytes = upstream_response.bytes().await.map_err(|e| {
            warn!(error = %e, url = %url, "Failed to read upstream body");
            AppError::BadGateway(format!("{} sent an unreadable response", upstream))
        })?;

        response
            .body(Body::from(bytes))
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to build response: {}", e)))
    }
}
