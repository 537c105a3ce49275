use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Formats a byte count with thousands separators: 1234567 -> "1.234.567".
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Logs method, path, status, response size and duration of every request.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // buffer the body to learn its real size
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(
                status = parts.status.as_u16(),
                %method,
                path = uri.path(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "failed to read response body: {}",
                e
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    let status = parts.status.as_u16();
    let size = format_number(bytes.len());
    let elapsed_ms = start.elapsed().as_millis() as u64;
    if parts.status.is_success() {
        tracing::info!(status, %method, path = uri.path(), size = %size, elapsed_ms, "request");
    } else {
        tracing::warn!(status, %method, path = uri.path(), size = %size, elapsed_ms, "request");
    }

    Response::from_parts(parts, Body::from(bytes))
}
