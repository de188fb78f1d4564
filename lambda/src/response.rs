use bytes::Bytes;
use http::header::HeaderName;
use http::Response;
use thiserror::Error;

use crate::headers::Headers;

/// A response that no trigger family could send.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidResponse {
    /// A status code outside 100–599.
    #[error("invalid status code {0}, expected 100-599")]
    Status(u16),
    /// A header name that is not an HTTP token.
    #[error("invalid header name {0:?}")]
    HeaderName(String),
    /// A header value with characters other than visible ASCII, space and tab.
    #[error("invalid value for header {0}")]
    HeaderValue(String),
}

fn visible_ascii(value: &str) -> bool {
    value.bytes().all(|b| b == b'\t' || (b' '..=b'~').contains(&b))
}

/// The trigger-agnostic response a [`Handler`](crate::Handler) returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalResponse {
    status: u16,
    headers: Headers,
    body: Option<Bytes>,
}

impl CanonicalResponse {
    /// Starts a `200` response with no headers and no body.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder {
            status: 200,
            headers: Headers::new(),
            body: None,
        }
    }

    /// The status code, always within 100–599.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response headers, in the order the handler set them.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The body, if any. `Some` of an empty buffer is still a body.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Converts an [`http::Response`], keeping header order and repetition.
    pub fn from_http(res: Response<Bytes>) -> Result<Self, InvalidResponse> {
        let (parts, body) = res.into_parts();
        let mut builder = CanonicalResponse::builder()
            .status(parts.status.as_u16())
            .body(body);
        for (name, value) in &parts.headers {
            let value = value
                .to_str()
                .map_err(|_| InvalidResponse::HeaderValue(name.to_string()))?;
            builder = builder.header(name.as_str(), value);
        }
        builder.build()
    }
}

/// Assembles a [`CanonicalResponse`].
#[derive(Debug)]
pub struct ResponseBuilder {
    status: u16,
    headers: Headers,
    body: Option<Bytes>,
}

impl ResponseBuilder {
    /// Sets the status code. It is checked by [`build`](ResponseBuilder::build), along
    /// with every header.
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Appends one header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Finishes the response.
    pub fn build(self) -> Result<CanonicalResponse, InvalidResponse> {
        if !(100..=599).contains(&self.status) {
            return Err(InvalidResponse::Status(self.status));
        }
        for h in &self.headers {
            if HeaderName::from_bytes(h.name.as_bytes()).is_err() {
                return Err(InvalidResponse::HeaderName(h.name.clone()));
            }
            if !visible_ascii(&h.value) {
                return Err(InvalidResponse::HeaderValue(h.name.clone()));
            }
        }
        Ok(CanonicalResponse {
            status: self.status,
            headers: self.headers,
            body: self.body,
        })
    }
}
