use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_CORRELATION_ID_LEN: usize = 128;

/// Per-HTTP-request correlation id, distinct from a job's own `request_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    /// Keeps a caller-supplied id when it is short printable ASCII, otherwise mints one.
    pub fn from_header(value: Option<&HeaderValue>) -> Self {
        let supplied = value
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| {
                !id.is_empty()
                    && id.len() <= MAX_CORRELATION_ID_LEN
                    && id.bytes().all(|b| b.is_ascii_graphic())
            });

        match supplied {
            Some(id) => Self(id.to_string()),
            None => Self(Uuid::new_v4().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let correlation_id = CorrelationId::from_header(request.headers().get(REQUEST_ID_HEADER));
    let span = tracing::info_span!(
        "http_request",
        correlation_id = %correlation_id.as_str(),
        method = %request.method(),
        path = %request.uri().path()
    );
    let header_value = HeaderValue::from_str(correlation_id.as_str()).ok();
    request.extensions_mut().insert(correlation_id);

    let mut response = next.run(request).instrument(span).await;
    if let Some(value) = header_value {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
