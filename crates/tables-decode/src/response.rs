// SPDX-License-Identifier: MIT OR Apache-2.0
//! Response boundary types.

use std::fmt;

/// The parts of an HTTP response the decoder reads.
pub trait HttpResponse {
    /// Status code.
    fn status(&self) -> u16;

    /// First value of header `name`, compared case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;

    /// Raw body bytes.
    fn body(&self) -> &[u8];

    /// Declared `Content-Type`, if any.
    fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

// ---------------------------------------------------------------------------
// RawResponse
// ---------------------------------------------------------------------------

/// An owned, fully-buffered response.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl RawResponse {
    /// A response with `status`, no headers and an empty body.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Append a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replace the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// All headers in insertion order.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl HttpResponse for RawResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &String::from_utf8_lossy(&self.body))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ResponseError
// ---------------------------------------------------------------------------

/// A failed call as reported by the HTTP pipeline.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ResponseError {
    message: String,
    response: Option<RawResponse>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ResponseError {
    /// A failure with no response attached (e.g. the connection dropped).
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
            source: None,
        }
    }

    /// A failure carrying the service's response.
    #[must_use]
    pub fn from_response(response: RawResponse) -> Self {
        Self {
            message: format!(
                "Operation returned an invalid status code {}",
                response.status()
            ),
            response: Some(response),
            source: None,
        }
    }

    /// Attach the response.
    #[must_use]
    pub fn with_response(mut self, response: RawResponse) -> Self {
        self.response = Some(response);
        self
    }

    /// Attach a lower-level cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// The transport's own message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The response, if the service answered.
    pub fn response(&self) -> Option<&RawResponse> {
        self.response.as_ref()
    }

    /// Status of the response, if any.
    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(HttpResponse::status)
    }
}
