//! API Gateway HTTP API events (payload format 2.0).

use aws_lambda_events::event::apigw::ApiGatewayV2httpResponse;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::body;
use crate::envelope::host_or_default;
use crate::headers::Headers;
use crate::path::resolve_stage;
use crate::request::CanonicalRequest;
use crate::response::CanonicalResponse;
use crate::rest_v1::stage_level;
use crate::wire;
use crate::AdapterError;

/// The fields of an HTTP v2 event the adapter reads.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HttpV2Event {
    /// Request path, stage included.
    pub raw_path: String,
    /// Query string exactly as the client sent it.
    #[serde(default)]
    pub raw_query_string: Option<String>,
    /// Headers; repeated headers arrive comma-joined.
    #[serde(default)]
    pub headers: Option<Map<String, Value>>,
    /// Cookies, which HTTP APIs move out of the `cookie` header.
    #[serde(default)]
    pub cookies: Option<Vec<String>>,
    /// Stage variables.
    #[serde(default)]
    pub stage_variables: Option<Map<String, Value>>,
    /// Request metadata.
    pub request_context: HttpV2Context,
    /// The body, base64-encoded when `is_base64_encoded` is set.
    #[serde(default)]
    pub body: Option<String>,
    /// Whether `body` is base64.
    #[serde(default)]
    pub is_base64_encoded: Option<bool>,
}

/// The parts of `requestContext` the adapter reads.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HttpV2Context {
    /// Method and friends.
    pub http: HttpDescription,
    /// Deployment stage.
    #[serde(default)]
    pub stage: Option<String>,
    /// Host the client called.
    #[serde(default)]
    pub domain_name: Option<String>,
}

/// `requestContext.http`.
#[derive(Deserialize, Debug, Clone)]
pub struct HttpDescription {
    /// Request method.
    pub method: String,
}

impl HttpV2Event {
    pub(crate) fn level_override(&self) -> Option<&str> {
        stage_level(self.stage_variables.as_ref())
    }

    pub(crate) fn to_request(&self) -> Result<CanonicalRequest, AdapterError> {
        let mut headers = self
            .headers
            .as_ref()
            .map(Headers::from_v2)
            .unwrap_or_default();
        match &self.cookies {
            Some(cookies) if !cookies.is_empty() && !headers.contains("cookie") => {
                headers.append("cookie", cookies.join("; "));
            }
            _ => {}
        }

        let resolved = resolve_stage(&self.raw_path, self.request_context.stage.as_deref());
        let host = host_or_default(
            self.request_context.domain_name.as_deref(),
            headers.get("host"),
        );
        let base_url = resolved.base_url(host);
        let query_string = self.raw_query_string.clone().unwrap_or_default();
        let base64 = self.is_base64_encoded.unwrap_or(false);
        let body = body::decode(self.body.as_deref(), base64)?;

        debug!(%base_url, path = %resolved.path, %query_string, "HTTP v2 event mapped");

        Ok(
            CanonicalRequest::builder(self.request_context.http.method.as_str(), resolved.path)
                .base_url(base_url)
                .query_string(query_string)
                .headers(headers)
                .body_was_base64(base64 && body.is_some())
                .body(body)
                .build(),
        )
    }
}

/// The 2.0 reply, with cookies repeated in `cookies`.
pub fn reply(response: &CanonicalResponse) -> ApiGatewayV2httpResponse {
    wire::http_v2_reply(response)
}
