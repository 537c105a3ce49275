//! HTTP side of the grid: raw requests against `/<table>/items` and the
//! mapping of responses onto [`GridError`].

use async_trait::async_trait;
use contracts::shared::commit::CommitError;
use contracts::shared::row::{ValidationFailure, VALIDATION_FAILURE_STATUS};
use gloo_net::http::{Request, RequestBuilder};
use serde_json::Value;
use thiserror::Error;

use crate::shared::api_utils::api_url;
use crate::system::auth::storage;

/// HTTP status of a request without a live session.
pub const UNAUTHORIZED_STATUS: u16 = 401;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
    Put,
    Delete,
}

/// Status and body of a response, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("the session has expired, log in again")]
    Unauthorized,
    #[error("server responded with HTTP {status}")]
    Server { status: u16, body: String },
    #[error("{0}")]
    Validation(String),
    #[error("failed to parse response: {0}")]
    Decode(String),
    #[error(transparent)]
    Commit(#[from] CommitError),
    #[error("no row is being edited")]
    NoEditInProgress,
}

/// Sends requests for a grid. `path` is relative to the API origin.
#[async_trait(?Send)]
pub trait GridTransport {
    async fn get(&self, path: &str) -> Result<RawResponse, GridError>;
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: String,
    ) -> Result<RawResponse, GridError>;
}

/// Interprets a response: 2xx is success, 278 a validation failure
/// carrying `error_msg`, 401 a lost session, anything else a server failure.
pub fn classify_response(response: RawResponse) -> Result<Value, GridError> {
    if response.status == UNAUTHORIZED_STATUS {
        return Err(GridError::Unauthorized);
    }
    if response.status == VALIDATION_FAILURE_STATUS {
        let message = serde_json::from_str::<ValidationFailure>(&response.body)
            .map(|f| f.error_msg)
            .unwrap_or(response.body);
        return Err(GridError::Validation(message));
    }
    if !(200..300).contains(&response.status) {
        return Err(GridError::Server {
            status: response.status,
            body: response.body,
        });
    }
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|e| GridError::Decode(e.to_string()))
}

/// Transport over the browser `fetch` API.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTransport;

async fn into_raw(response: gloo_net::http::Response) -> Result<RawResponse, GridError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GridError::Transport(e.to_string()))?;
    Ok(RawResponse { status, body })
}

/// Adds the bearer token of the stored session, if any.
fn authorized(builder: RequestBuilder) -> RequestBuilder {
    match storage::get_access_token() {
        Some(token) => builder.header("Authorization", &format!("Bearer {}", token)),
        None => builder,
    }
}

#[async_trait(?Send)]
impl GridTransport for GlooTransport {
    async fn get(&self, path: &str) -> Result<RawResponse, GridError> {
        let response = authorized(Request::get(&api_url(path)))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| GridError::Transport(e.to_string()))?;
        into_raw(response).await
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: String,
    ) -> Result<RawResponse, GridError> {
        let url = api_url(path);
        let builder = match method {
            HttpMethod::Post => Request::post(&url),
            HttpMethod::Put => Request::put(&url),
            HttpMethod::Delete => Request::delete(&url),
        };
        let response = authorized(builder)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .body(body)
            .map_err(|e| GridError::Transport(e.to_string()))?
            .send()
            .await
            .map_err(|e| GridError::Transport(e.to_string()))?;
        into_raw(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_success_decodes_body() {
        assert_eq!(
            classify_response(raw(200, r#"{"name":"Asia"}"#)),
            Ok(json!({"name": "Asia"}))
        );
        assert_eq!(classify_response(raw(204, "")), Ok(Value::Null));
        assert!(matches!(
            classify_response(raw(200, "not json")),
            Err(GridError::Decode(_))
        ));
    }

    #[test]
    fn test_validation_status_carries_message() {
        assert_eq!(
            classify_response(raw(278, r#"{"error_msg":"duplicate key"}"#)),
            Err(GridError::Validation("duplicate key".into()))
        );
        assert_eq!(
            classify_response(raw(278, "plain text")),
            Err(GridError::Validation("plain text".into()))
        );
    }

    #[test]
    fn test_other_statuses_are_server_errors() {
        assert!(matches!(
            classify_response(raw(500, "boom")),
            Err(GridError::Server { status: 500, .. })
        ));
        assert!(matches!(
            classify_response(raw(404, "")),
            Err(GridError::Server { status: 404, .. })
        ));
    }

    #[test]
    fn test_unauthorized_is_its_own_error() {
        assert_eq!(
            classify_response(raw(401, "unauthorized")),
            Err(GridError::Unauthorized)
        );
    }
}
