//! Turning archive entries and fixed pages into HTTP responses.

use std::path::Path;

use axum::body::{Body, Bytes};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::archive::JavadocArchive;
use crate::content_type::{ContentTypeTable, OCTET_STREAM, TEXT_HTML};
use crate::error::ServerError;
use crate::pages;

/// Body of a response.
///
/// `Absent` and an empty `Content` are different things: the first sends no
/// body and no `Content-Length`, the second is a real, zero byte document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Absent,
    Content(Bytes),
}

/// Status, content type and payload of a documentation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub payload: Payload,
}

impl DocResponse {
    /// A response from an in-memory payload, no archive involved.
    pub fn fixed(status: StatusCode, content_type: &str, payload: Payload) -> Self {
        Self {
            status,
            content_type: content_type.to_string(),
            payload,
        }
    }

    pub fn html(status: StatusCode, page: &'static [u8]) -> Self {
        Self::fixed(status, TEXT_HTML, Payload::Content(Bytes::from_static(page)))
    }

    pub fn getting_started() -> Self {
        Self::html(StatusCode::OK, pages::GETTING_STARTED)
    }

    pub fn bad_request() -> Self {
        Self::html(StatusCode::BAD_REQUEST, pages::BAD_REQUEST)
    }

    pub fn not_found() -> Self {
        Self::html(StatusCode::NOT_FOUND, pages::NOT_FOUND)
    }
}

impl IntoResponse for DocResponse {
    fn into_response(self) -> Response {
        let content_length = match &self.payload {
            Payload::Absent => None,
            Payload::Content(bytes) => Some(bytes.len()),
        };
        debug!(
            status = self.status.as_u16(),
            content_type = %self.content_type,
            ?content_length,
            "Sending response"
        );

        let content_type = HeaderValue::from_str(&self.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(OCTET_STREAM));

        let mut response = match self.payload {
            Payload::Absent => Response::new(Body::empty()),
            Payload::Content(bytes) => {
                let len = bytes.len();
                let mut response = Response::new(Body::from(bytes));
                response
                    .headers_mut()
                    .insert(header::CONTENT_LENGTH, HeaderValue::from(len));
                response
            }
        };
        *response.status_mut() = self.status;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, content_type);
        response
    }
}

/// Serve one entry of an archive, or the not-found page.
///
/// An archive that cannot be opened or read is reported as not found: from
/// the browser's point of view the page simply is not there. The archive is
/// closed before this function returns, whichever way it goes.
pub async fn serve_entry(
    archive_path: &Path,
    entry_path: &str,
    content_types: &ContentTypeTable,
) -> Result<DocResponse, ServerError> {
    let archive = match JavadocArchive::open(archive_path).await {
        Ok(archive) => archive,
        Err(e) if is_fault(&e) => return Err(e.into()),
        Err(e) => {
            warn!("Cannot open archive, answering not found: {:#}", e);
            return Ok(DocResponse::not_found());
        }
    };

    let Some(entry) = archive.entry(entry_path) else {
        debug!(archive = %archive_path.display(), entry = entry_path, "No such entry");
        return Ok(DocResponse::not_found());
    };

    let data = match archive.read_entry(entry).await {
        Ok(data) => data,
        Err(e) if is_fault(&e) => return Err(e.into()),
        Err(e) => {
            warn!(
                "Cannot read {} from {}, answering not found: {:#}",
                entry_path,
                archive_path.display(),
                e
            );
            return Ok(DocResponse::not_found());
        }
    };
    drop(archive);

    let content_type = content_types
        .content_type_for(entry_path)
        .unwrap_or(OCTET_STREAM);

    Ok(DocResponse::fixed(
        StatusCode::OK,
        content_type,
        Payload::Content(Bytes::from(data)),
    ))
}

/// A failed or panicked worker task is a fault of the server, not of the
/// archive, and must not be disguised as a missing page.
fn is_fault(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.is::<tokio::task::JoinError>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_payload_has_no_length() {
        let response = DocResponse::fixed(
            StatusCode::METHOD_NOT_ALLOWED,
            TEXT_HTML,
            Payload::Absent,
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.headers().get(header::CONTENT_LENGTH).is_none());
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_HTML);
    }

    #[test]
    fn empty_content_keeps_its_length() {
        let response =
            DocResponse::fixed(StatusCode::OK, "text/plain", Payload::Content(Bytes::new()))
                .into_response();
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "0");
    }

    #[test]
    fn fixed_pages_carry_html_and_length() {
        let response = DocResponse::bad_request().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_HTML);
        assert_eq!(
            response.headers()[header::CONTENT_LENGTH],
            pages::BAD_REQUEST.len().to_string().as_str()
        );
    }

    #[tokio::test]
    async fn missing_archive_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let response = serve_entry(
            &dir.path().join("missing.jar"),
            "index.html",
            &ContentTypeTable::fallback(),
        )
        .await
        .unwrap();
        assert_eq!(response, DocResponse::not_found());
    }

    #[tokio::test]
    async fn file_that_is_not_an_archive_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken-javadoc.jar");
        std::fs::write(&path, b"this is not a zip file").unwrap();
        let response = serve_entry(&path, "index.html", &ContentTypeTable::fallback())
            .await
            .unwrap();
        assert_eq!(response, DocResponse::not_found());
    }

    #[tokio::test]
    async fn directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let response = serve_entry(dir.path(), "index.html", &ContentTypeTable::fallback())
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
}
