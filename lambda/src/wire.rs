//! Reply objects for each trigger family.
//!
//! Gateway replies use the `aws_lambda_events` response types, whose header maps keep
//! the order names first appeared in. Edge header maps are sorted. Nothing time- or
//! counter-dependent is included, so equal responses always produce byte-identical
//! replies.

use std::collections::BTreeMap;

use aws_lambda_events::encodings::Body;
use aws_lambda_events::event::apigw::{ApiGatewayProxyResponse, ApiGatewayV2httpResponse};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::body;
use crate::headers::EdgeHeader;
use crate::response::CanonicalResponse;

/// The reply for a REST API. Every body is sent base64-encoded.
pub fn rest_v1_reply(response: &CanonicalResponse) -> ApiGatewayProxyResponse {
    let (headers, multi_value_headers) = response.headers().to_gateway();
    let encoded = response.body().map(|b| body::encode(b));
    log_gateway(response.status(), &headers, &multi_value_headers, encoded.as_deref());
    ApiGatewayProxyResponse {
        status_code: i64::from(response.status()),
        headers,
        multi_value_headers,
        body: encoded.map(Body::Text),
        is_base64_encoded: true,
    }
}

/// The reply for an HTTP API. `cookies` carries every `Set-Cookie` value, since the
/// 2.0 format ignores `multiValueHeaders`.
pub fn http_v2_reply(response: &CanonicalResponse) -> ApiGatewayV2httpResponse {
    let (headers, multi_value_headers) = response.headers().to_gateway();
    let encoded = response.body().map(|b| body::encode(b));
    log_gateway(response.status(), &headers, &multi_value_headers, encoded.as_deref());
    ApiGatewayV2httpResponse {
        status_code: i64::from(response.status()),
        headers,
        multi_value_headers,
        body: encoded.map(Body::Text),
        is_base64_encoded: true,
        cookies: response
            .headers()
            .get_all("set-cookie")
            .into_iter()
            .map(str::to_owned)
            .collect(),
    }
}

fn log_gateway(status: u16, headers: &HeaderMap, multi: &HeaderMap, encoded: Option<&str>) {
    let encoded = encoded.unwrap_or_default();
    info!(
        status_code = status,
        ?headers,
        multi_value_headers = ?multi,
        body = %body::preview(encoded),
        "gateway reply"
    );
    debug!(body = encoded, "full reply body");
}

/// The generated-response object for a Lambda@Edge request trigger.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EdgeResponse {
    /// HTTP status code, as a decimal string.
    pub status: String,
    /// Always `base64`.
    pub body_encoding: String,
    /// The base64-encoded body. Omitted when the response has no body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Headers keyed by lowercase name.
    pub headers: BTreeMap<String, Vec<EdgeHeader>>,
}

impl EdgeResponse {
    /// Serializes a handler response.
    pub fn from_canonical(response: &CanonicalResponse) -> Self {
        let reply = EdgeResponse {
            status: response.status().to_string(),
            body_encoding: String::from("base64"),
            body: response.body().map(|b| body::encode(b)),
            headers: response.headers().to_edge(),
        };
        let encoded = reply.body.as_deref().unwrap_or_default();
        info!(
            status = %reply.status,
            headers = ?reply.headers,
            body = %body::preview(encoded),
            "edge reply"
        );
        debug!(body = encoded, "full reply body");
        reply
    }
}

/// A reply in whichever shape the caller's family expects.
#[derive(Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum WireResponse {
    /// REST v1.
    RestV1(ApiGatewayProxyResponse),
    /// HTTP v2.
    HttpV2(ApiGatewayV2httpResponse),
    /// Lambda@Edge.
    Edge(EdgeResponse),
}

impl WireResponse {
    /// The reply as a JSON value.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cookies_and_ok() -> CanonicalResponse {
        CanonicalResponse::builder()
            .status(200)
            .header("Set-Cookie", "a=1")
            .header("Set-Cookie", "b=2")
            .body("ok")
            .build()
            .unwrap()
    }

    #[test]
    fn rest_reply_splits_multi_value_headers() {
        let value = WireResponse::RestV1(rest_v1_reply(&cookies_and_ok()))
            .to_value()
            .unwrap();
        assert_eq!(
            value,
            json!({
                "statusCode": 200,
                "headers": {},
                "multiValueHeaders": {"set-cookie": ["a=1", "b=2"]},
                "body": "b2s=",
                "isBase64Encoded": true
            })
        );
    }

    #[test]
    fn http_reply_repeats_set_cookie_in_cookies() {
        let res = CanonicalResponse::builder()
            .header("Content-Type", "text/plain")
            .header("Set-Cookie", "a=1")
            .header("Set-Cookie", "b=2")
            .build()
            .unwrap();
        let value = WireResponse::HttpV2(http_v2_reply(&res)).to_value().unwrap();
        assert_eq!(value["headers"], json!({"content-type": "text/plain"}));
        assert_eq!(value["multiValueHeaders"], json!({"set-cookie": ["a=1", "b=2"]}));
        assert_eq!(value["cookies"], json!(["a=1", "b=2"]));
    }

    #[test]
    fn equal_responses_serialize_identically() {
        let first = serde_json::to_vec(&WireResponse::HttpV2(http_v2_reply(&cookies_and_ok())));
        let second = serde_json::to_vec(&WireResponse::HttpV2(http_v2_reply(&cookies_and_ok())));
        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[test]
    fn missing_body_omits_the_field_but_empty_body_does_not() {
        let none = CanonicalResponse::builder().status(204).build().unwrap();
        let value = WireResponse::RestV1(rest_v1_reply(&none)).to_value().unwrap();
        assert!(value.get("body").is_none());

        let empty = CanonicalResponse::builder().body("").build().unwrap();
        let value = WireResponse::Edge(EdgeResponse::from_canonical(&empty)).to_value().unwrap();
        assert_eq!(value["body"], "");
    }

    #[test]
    fn edge_reply_shape() {
        let res = CanonicalResponse::builder()
            .status(404)
            .header("Content-Type", "text/plain")
            .body("nope")
            .build()
            .unwrap();
        let value = WireResponse::Edge(EdgeResponse::from_canonical(&res)).to_value().unwrap();
        assert_eq!(
            value,
            json!({
                "status": "404",
                "bodyEncoding": "base64",
                "body": "bm9wZQ==",
                "headers": {"content-type": [{"key": "Content-Type", "value": "text/plain"}]}
            })
        );
    }

    #[test]
    fn edge_records_without_key_omit_it() {
        let record = EdgeHeader {
            key: None,
            value: String::from("v"),
        };
        assert_eq!(serde_json::to_value(record).unwrap(), json!({"value": "v"}));
    }
}
