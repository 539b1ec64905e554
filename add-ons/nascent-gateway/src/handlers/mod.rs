//! HTTP handlers, grouped by concern.

pub(crate) mod dna;
pub(crate) mod learning;
pub(crate) mod mind;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nascent_core::RecordError;

/// JSON error body `{"error": "..."}` with a status code.
#[derive(Debug)]
pub(crate) struct ApiError(pub(crate) StatusCode, pub(crate) String);

impl ApiError {
    pub(crate) fn bad_request(msg: impl Into<String>) -> Self {
        Self(StatusCode::BAD_REQUEST, msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, axum::Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

impl From<RecordError> for ApiError {
    fn from(e: RecordError) -> Self {
        let status = match &e {
            RecordError::NotFound(_) => StatusCode::NOT_FOUND,
            RecordError::InvalidAvatar(_) => StatusCode::BAD_REQUEST,
            RecordError::Storage(_) | RecordError::Codec(_) => {
                tracing::error!(error = %e, "DNA repository failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self(status, e.to_string())
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use axum::body::Body;
    use axum::http::{Request, Response};

    pub(crate) fn get(uri: &str) -> Request<Body> {
        Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
    }

    pub(crate) fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub(crate) fn post_empty(uri: &str) -> Request<Body> {
        Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
    }

    pub(crate) async fn json(res: Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
