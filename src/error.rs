use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::content_type::TEXT_HTML;
use crate::pages;
use crate::respond::{DocResponse, Payload};

/// An unexpected failure while handling a request.
///
/// Expected outcomes (bad paths, missing archives or entries) are ordinary
/// responses; only faults nothing else can classify end up here, and they
/// become the fixed 500 page.
#[derive(Debug)]
pub struct ServerError(anyhow::Error);

impl<E> From<E> for ServerError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        error!("Internal server error: {:#}", self.0);
        DocResponse::fixed(
            StatusCode::INTERNAL_SERVER_ERROR,
            TEXT_HTML,
            Payload::Content(pages::INTERNAL_ERROR.into()),
        )
        .into_response()
    }
}
