#![warn(missing_docs, nonstandard_style, rust_2018_idioms)]

//! Run one HTTP handler behind API Gateway REST APIs (payload 1.0), HTTP APIs
//! (payload 2.0) and Lambda@Edge request triggers.
//!
//! The adapter turns whichever event arrives into a [`CanonicalRequest`], calls the
//! handler exactly once, and serializes its [`CanonicalResponse`] into the reply shape
//! the trigger expects.
//!
//! ```
//! use lambda_adapter::{
//!     handler_fn, Adapter, CanonicalRequest, CanonicalResponse, Config, Context, Err,
//! };
//! use serde_json::json;
//!
//! fn hello(req: CanonicalRequest) -> Result<CanonicalResponse, Err> {
//!     let body = format!("hello from {}", req.path());
//!     Ok(CanonicalResponse::builder().body(body).build()?)
//! }
//!
//! let mut adapter = Adapter::new(handler_fn(hello), Config::default());
//! let event = json!({
//!     "rawPath": "/world",
//!     "requestContext": {"http": {"method": "GET"}, "stage": "$default"}
//! });
//! let reply = adapter.handle(event, &Context::new("req-1"))?.to_value()?;
//! assert_eq!(reply["statusCode"], 200);
//! assert_eq!(reply["isBase64Encoded"], true);
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! ```

use bytes::Bytes;
use http::{Request, Response};
use serde_json::Value;
use tracing::{debug, info_span};

pub use crate::config::Config;
pub use crate::context::Context;
pub use crate::envelope::{Family, InvocationEnvelope};
pub use crate::error::{AdapterError, Err, ErrorReport};
pub use crate::headers::{Header, Headers};
pub use crate::logging::LogScope;
pub use crate::request::{BaseUrl, CanonicalRequest};
pub use crate::response::{CanonicalResponse, InvalidResponse};
pub use crate::wire::{EdgeResponse, WireResponse};

pub mod body;
mod config;
mod context;
pub mod edge;
pub mod envelope;
mod error;
pub mod headers;
pub mod http_v2;
pub mod logging;
pub mod path;
pub mod query;
mod request;
mod response;
pub mod rest_v1;
pub mod wire;

/// An application handler: one canonical request in, one canonical response out.
pub trait Handler {
    /// Errors returned by this handler.
    type Error: Into<Err>;
    /// Process the request and return the response.
    fn call(&mut self, request: CanonicalRequest) -> Result<CanonicalResponse, Self::Error>;
}

/// Returns a new [`HandlerFn`] with the given closure.
pub fn handler_fn<Function>(f: Function) -> HandlerFn<Function> {
    HandlerFn { f }
}

/// A [`Handler`] implemented by a closure.
#[derive(Copy, Clone, Debug)]
pub struct HandlerFn<Function> {
    f: Function,
}

impl<Function, Error> Handler for HandlerFn<Function>
where
    Function: FnMut(CanonicalRequest) -> Result<CanonicalResponse, Error>,
    Error: Into<Err>,
{
    type Error = Error;
    fn call(&mut self, request: CanonicalRequest) -> Result<CanonicalResponse, Error> {
        (self.f)(request)
    }
}

/// Returns a new [`HttpHandlerFn`] with the given closure.
pub fn http_handler_fn<Function>(f: Function) -> HttpHandlerFn<Function> {
    HttpHandlerFn { f }
}

/// A [`Handler`] written against [`http::Request`] and [`http::Response`].
///
/// The request URI holds the application path and query; the base URL is available as
/// a [`BaseUrl`] extension.
#[derive(Copy, Clone, Debug)]
pub struct HttpHandlerFn<Function> {
    f: Function,
}

impl<Function, Error> Handler for HttpHandlerFn<Function>
where
    Function: FnMut(Request<Bytes>) -> Result<Response<Bytes>, Error>,
    Error: Into<Err>,
{
    type Error = Err;
    fn call(&mut self, request: CanonicalRequest) -> Result<CanonicalResponse, Err> {
        let request = request.into_http()?;
        let response = (self.f)(request).map_err(Into::<Err>::into)?;
        Ok(CanonicalResponse::from_http(response)?)
    }
}

/// Drives a [`Handler`] from raw trigger events.
#[derive(Debug)]
pub struct Adapter<H> {
    handler: H,
    config: Config,
}

impl<H: Handler> Adapter<H> {
    /// Wraps `handler` with an explicit configuration.
    pub fn new(handler: H, config: Config) -> Self {
        Adapter { handler, config }
    }

    /// Wraps `handler`, reading [`Config`] from the environment once.
    pub fn from_env(handler: H) -> Result<Self, envy::Error> {
        Ok(Adapter::new(handler, Config::from_env()?))
    }

    /// The configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handles one invocation.
    ///
    /// Detects the event's family, applies any `LEVEL` stage variable for the duration
    /// of the call, builds the canonical request, calls the handler once, and returns the
    /// family's reply. Every error is fatal for this invocation only.
    pub fn handle(&mut self, event: Value, ctx: &Context) -> Result<WireResponse, AdapterError> {
        let envelope = InvocationEnvelope::from_value(event)?;
        let family = envelope.family();
        let scope = LogScope::new(self.config.ambient_level(), envelope.level_override());
        let config = &self.config;
        let handler = &mut self.handler;

        scope.run(move || {
            let span = info_span!("invocation", request_id = %ctx.request_id, %family);
            let _guard = span.enter();

            let request = envelope.to_request(config)?;
            debug!(method = request.method(), path = request.path(), "calling handler");
            let response = handler
                .call(request)
                .map_err(|e| AdapterError::HandlerFailure(e.into()))?;
            Ok(family.reply(&response))
        })
    }
}
