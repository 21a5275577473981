use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Pairs the underlying report (logged server-side) with the response the
/// caller should see.
#[derive(Debug)]
pub struct ServerError<R: IntoResponse>(pub(crate) color_eyre::Report, pub(crate) R);

pub type ServerResult<S, F = Response> = Result<S, ServerError<F>>;

impl<R: IntoResponse> IntoResponse for ServerError<R> {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self.0, "Request Error");

        let response = self.1.into_response();

        // In development, show the report instead of an opaque 500.
        let is_dev_mode = std::env::var("DEVELOPMENT_MODE")
            .map(|v| v == "1")
            .unwrap_or(false);
        if is_dev_mode && response.status() == StatusCode::INTERNAL_SERVER_ERROR {
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("{:?}", self.0)).into_response();
        }

        response
    }
}

impl<E> From<E> for ServerError<StatusCode>
where
    E: Into<color_eyre::Report>,
{
    fn from(err: E) -> Self {
        ServerError(err.into(), StatusCode::INTERNAL_SERVER_ERROR)
    }
}
