use bytes::Bytes;
use http::{Method, Request, Uri};

use crate::headers::Headers;

/// The trigger-agnostic request handed to a [`Handler`](crate::Handler).
///
/// Built once per invocation by the adapter and never changed afterwards. `path` never
/// includes the stage or base path that was stripped off; that prefix lives at the
/// end of `base_url` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    method: String,
    path: String,
    base_url: String,
    query_string: String,
    headers: Headers,
    body: Option<Bytes>,
    body_was_base64: bool,
}

impl CanonicalRequest {
    /// Starts a request for `method` and `path`. Mostly useful when testing handlers.
    pub fn builder(method: impl Into<String>, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            inner: CanonicalRequest {
                method: method.into(),
                path: path.into(),
                base_url: String::new(),
                query_string: String::new(),
                headers: Headers::new(),
                body: None,
                body_was_base64: false,
            },
        }
    }

    /// The HTTP method as the trigger reported it.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The application-relative path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Scheme, host and any stripped stage or base path, e.g. `https://example.com/prod`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The wire-encoded query string without the leading `?`.
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Request headers. Inbound names are lowercase.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The decoded body, if the event carried one.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Whether the event delivered the body base64-encoded.
    pub fn body_was_base64(&self) -> bool {
        self.body_was_base64
    }

    /// `path` followed by `?query` when there is a query string.
    pub fn path_and_query(&self) -> String {
        if self.query_string.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string)
        }
    }

    /// Converts into an [`http::Request`].
    ///
    /// The URI is the application-relative path and query; the base URL travels along as
    /// a [`BaseUrl`] extension. An absent body becomes an empty one.
    pub fn into_http(self) -> Result<Request<Bytes>, http::Error> {
        let uri: Uri = self.path_and_query().parse()?;
        let method = Method::from_bytes(self.method.as_bytes())?;
        let mut builder = Request::builder().method(method).uri(uri);
        for h in &self.headers {
            builder = builder.header(h.name.as_str(), h.value.as_str());
        }
        builder = builder.extension(BaseUrl(self.base_url));
        builder.body(self.body.unwrap_or_default())
    }
}

/// The base URL of a request converted with [`CanonicalRequest::into_http`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(pub String);

/// Assembles a [`CanonicalRequest`].
#[derive(Debug)]
pub struct RequestBuilder {
    inner: CanonicalRequest,
}

impl RequestBuilder {
    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.inner.base_url = base_url.into();
        self
    }

    /// Sets the raw query string.
    pub fn query_string(mut self, query_string: impl Into<String>) -> Self {
        self.inner.query_string = query_string.into();
        self
    }

    /// Replaces all headers.
    pub fn headers(mut self, headers: Headers) -> Self {
        self.inner.headers = headers;
        self
    }

    /// Appends one header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.headers.append(name, value);
        self
    }

    /// Sets the body, or clears it with `None`.
    pub fn body(mut self, body: Option<Bytes>) -> Self {
        self.inner.body = body;
        self
    }

    /// Records whether the body arrived base64-encoded.
    pub fn body_was_base64(mut self, was_base64: bool) -> Self {
        self.inner.body_was_base64 = was_base64;
        self
    }

    /// Finishes the request.
    pub fn build(self) -> CanonicalRequest {
        self.inner
    }
}
