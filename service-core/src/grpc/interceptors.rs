//! gRPC interceptors for cross-cutting concerns.
//!
//! Provides interceptors for:
//! - Trace context propagation (W3C traceparent/tracestate)
//! - Request ID correlation

use opentelemetry::propagation::{Extractor, TextMapPropagator};
use opentelemetry::trace::TraceContextExt;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use tonic::{Request, Status};
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// gRPC metadata key for W3C traceparent header.
pub const TRACEPARENT_KEY: &str = "traceparent";

/// gRPC metadata key for W3C tracestate header.
pub const TRACESTATE_KEY: &str = "tracestate";

/// gRPC metadata key for request ID.
pub const REQUEST_ID_KEY: &str = "x-request-id";

/// A text map extractor for gRPC metadata.
struct MetadataExtractor<'a>(&'a tonic::metadata::MetadataMap);

impl Extractor for MetadataExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0
            .keys()
            .filter_map(|k| match k {
                tonic::metadata::KeyRef::Ascii(key) => Some(key.as_str()),
                tonic::metadata::KeyRef::Binary(_) => None,
            })
            .collect()
    }
}

/// Interceptor that extracts trace context from incoming requests and sets it
/// as the parent of the current span.
///
/// ```ignore
/// let service = BillingServiceServer::with_interceptor(svc, trace_context_interceptor);
/// ```
#[allow(clippy::result_large_err)]
pub fn trace_context_interceptor(request: Request<()>) -> Result<Request<()>, Status> {
    let propagator = TraceContextPropagator::new();
    let context = propagator.extract(&MetadataExtractor(request.metadata()));
    Span::current().set_parent(context);

    if let Some(traceparent) = extract_traceparent(&request) {
        tracing::debug!(traceparent = %traceparent, "gRPC request with trace context");
    }

    if let Some(request_id) = extract_request_id(&request) {
        Span::current().record("request_id", request_id.as_str());
    }

    Ok(request)
}

/// Inject current trace context into outgoing gRPC request metadata.
pub fn inject_trace_context<T>(request: &mut Request<T>) {
    let span = Span::current();
    let context = span.context();
    let otel_span = context.span();
    let span_context = otel_span.span_context();

    if span_context.is_valid() {
        // Format: version-trace_id-span_id-trace_flags
        let traceparent = format!(
            "00-{}-{}-{:02x}",
            span_context.trace_id(),
            span_context.span_id(),
            span_context.trace_flags().to_u8()
        );

        if let Ok(value) = traceparent.parse() {
            request.metadata_mut().insert(TRACEPARENT_KEY, value);
        }

        let tracestate_str = span_context.trace_state().header();
        if !tracestate_str.is_empty() {
            if let Ok(value) = tracestate_str.parse() {
                request.metadata_mut().insert(TRACESTATE_KEY, value);
            }
        }
    }
}

/// Extract the traceparent value from incoming gRPC request metadata.
pub fn extract_traceparent<T>(request: &Request<T>) -> Option<String> {
    request
        .metadata()
        .get(TRACEPARENT_KEY)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Extract request ID from incoming gRPC request metadata.
pub fn extract_request_id<T>(request: &Request<T>) -> Option<String> {
    request
        .metadata()
        .get(REQUEST_ID_KEY)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
