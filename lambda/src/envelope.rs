//! Classifying raw events by trigger family.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::edge::EdgeEvent;
use crate::error::AdapterError;
use crate::http_v2::HttpV2Event;
use crate::request::CanonicalRequest;
use crate::response::CanonicalResponse;
use crate::rest_v1::RestV1Event;
use crate::wire::WireResponse;
use crate::{edge, http_v2, rest_v1};

/// The trigger families the adapter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// API Gateway REST API, payload format 1.0.
    RestV1,
    /// API Gateway HTTP API, payload format 2.0.
    HttpV2,
    /// Lambda@Edge on an origin-request trigger.
    EdgeOrigin,
    /// Lambda@Edge on a viewer-request trigger. Handled exactly like [`Family::EdgeOrigin`].
    EdgeViewer,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::RestV1 => "RestV1",
            Family::HttpV2 => "HttpV2",
            Family::EdgeOrigin => "EdgeOrigin",
            Family::EdgeViewer => "EdgeViewer",
        };
        f.write_str(name)
    }
}

impl Family {
    /// Works out which family produced `event` from its shape.
    ///
    /// A CloudFront record carrying a request wins, then an explicit `version` marker,
    /// then `rawPath` (HTTP v2), then `httpMethod` (REST v1).
    pub fn detect(event: &Value) -> Result<Family, AdapterError> {
        let fields = event.as_object().ok_or_else(|| {
            AdapterError::UnrecognizedSchema(String::from("event is not a JSON object"))
        })?;

        let cf = fields
            .get("Records")
            .and_then(Value::as_array)
            .and_then(|records| records.first())
            .and_then(|record| record.get("cf"));
        if let Some(cf) = cf {
            if cf.get("response").is_some() {
                return Err(AdapterError::UnrecognizedSchema(String::from(
                    "CloudFront response triggers are not supported, install on a request trigger",
                )));
            }
            if cf.get("request").is_some() {
                let event_type = cf
                    .pointer("/config/eventType")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                return Ok(if event_type.starts_with("viewer") {
                    Family::EdgeViewer
                } else {
                    Family::EdgeOrigin
                });
            }
        }

        if event.pointer("/requestContext/elb").is_some() {
            return Err(AdapterError::UnrecognizedSchema(String::from(
                "Elastic Load Balancer events are not supported",
            )));
        }

        match fields.get("version").and_then(Value::as_str) {
            Some("2.0") => return Ok(Family::HttpV2),
            Some("1.0") => return Ok(Family::RestV1),
            _ => {}
        }
        if fields.contains_key("rawPath") {
            return Ok(Family::HttpV2);
        }
        if fields.get("httpMethod").is_some_and(Value::is_string) {
            return Ok(Family::RestV1);
        }
        Err(AdapterError::UnrecognizedSchema(String::from(
            "expected Records[0].cf.request, rawPath or httpMethod",
        )))
    }

    /// Serializes a handler response in the shape this family's caller expects.
    pub fn reply(self, response: &CanonicalResponse) -> WireResponse {
        match self {
            Family::RestV1 => WireResponse::RestV1(rest_v1::reply(response)),
            Family::HttpV2 => WireResponse::HttpV2(http_v2::reply(response)),
            Family::EdgeOrigin | Family::EdgeViewer => WireResponse::Edge(edge::reply(response)),
        }
    }
}

/// A raw event parsed into its family's typed form.
#[derive(Debug, Clone)]
pub enum InvocationEnvelope {
    /// REST API, payload format 1.0.
    RestV1(RestV1Event),
    /// HTTP API, payload format 2.0.
    HttpV2(HttpV2Event),
    /// Lambda@Edge origin request.
    EdgeOrigin(EdgeEvent),
    /// Lambda@Edge viewer request.
    EdgeViewer(EdgeEvent),
}

fn parse<T: DeserializeOwned>(family: Family, event: Value) -> Result<T, AdapterError> {
    serde_json::from_value(event).map_err(|e| AdapterError::malformed(family, e.to_string()))
}

impl InvocationEnvelope {
    /// Classifies `event` and parses it.
    pub fn from_value(event: Value) -> Result<Self, AdapterError> {
        let family = Family::detect(&event)?;
        Ok(match family {
            Family::RestV1 => InvocationEnvelope::RestV1(parse(family, event)?),
            Family::HttpV2 => InvocationEnvelope::HttpV2(parse(family, event)?),
            Family::EdgeOrigin => InvocationEnvelope::EdgeOrigin(parse(family, event)?),
            Family::EdgeViewer => InvocationEnvelope::EdgeViewer(parse(family, event)?),
        })
    }

    /// Which family the event came from.
    pub fn family(&self) -> Family {
        match self {
            InvocationEnvelope::RestV1(_) => Family::RestV1,
            InvocationEnvelope::HttpV2(_) => Family::HttpV2,
            InvocationEnvelope::EdgeOrigin(_) => Family::EdgeOrigin,
            InvocationEnvelope::EdgeViewer(_) => Family::EdgeViewer,
        }
    }

    /// The `LEVEL` stage variable, if the event has one. Edge events never do.
    pub fn level_override(&self) -> Option<&str> {
        match self {
            InvocationEnvelope::RestV1(event) => event.level_override(),
            InvocationEnvelope::HttpV2(event) => event.level_override(),
            InvocationEnvelope::EdgeOrigin(_) | InvocationEnvelope::EdgeViewer(_) => None,
        }
    }

    /// Builds the canonical request for the handler.
    pub fn to_request(&self, config: &Config) -> Result<CanonicalRequest, AdapterError> {
        match self {
            InvocationEnvelope::RestV1(event) => event.to_request(),
            InvocationEnvelope::HttpV2(event) => event.to_request(),
            InvocationEnvelope::EdgeOrigin(event) => {
                event.to_request(Family::EdgeOrigin, config.base_path.as_deref())
            }
            InvocationEnvelope::EdgeViewer(event) => {
                event.to_request(Family::EdgeViewer, config.base_path.as_deref())
            }
        }
    }
}

// Gateway events name the host in the request context; tests from the console
// sometimes leave it out.
pub(crate) fn host_or_default<'a>(
    domain_name: Option<&'a str>,
    host_header: Option<&'a str>,
) -> &'a str {
    domain_name
        .filter(|d| !d.is_empty())
        .or(host_header)
        .unwrap_or("localhost")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unrecognized(event: Value) -> String {
        match Family::detect(&event) {
            Err(AdapterError::UnrecognizedSchema(reason)) => reason,
            other => panic!("expected UnrecognizedSchema, got {:?}", other),
        }
    }

    #[test]
    fn raw_path_means_http_v2() {
        assert_eq!(Family::detect(&json!({"rawPath": "/x"})).unwrap(), Family::HttpV2);
    }

    #[test]
    fn version_marker_wins_over_fields() {
        let event = json!({"version": "1.0", "rawPath": "/x", "httpMethod": "GET"});
        assert_eq!(Family::detect(&event).unwrap(), Family::RestV1);
        let event = json!({"version": "2.0", "httpMethod": "GET"});
        assert_eq!(Family::detect(&event).unwrap(), Family::HttpV2);
    }

    #[test]
    fn http_method_means_rest_v1() {
        assert_eq!(Family::detect(&json!({"httpMethod": "GET"})).unwrap(), Family::RestV1);
    }

    #[test]
    fn cloudfront_request_means_edge() {
        let origin = json!({"Records": [{"cf": {"request": {"uri": "/"}}}]});
        assert_eq!(Family::detect(&origin).unwrap(), Family::EdgeOrigin);

        let viewer = json!({"Records": [{"cf": {
            "config": {"eventType": "viewer-request"},
            "request": {"uri": "/"}
        }}]});
        assert_eq!(Family::detect(&viewer).unwrap(), Family::EdgeViewer);
    }

    #[test]
    fn cloudfront_response_is_rejected() {
        let event = json!({"Records": [{"cf": {"request": {}, "response": {}}}]});
        assert!(unrecognized(event).contains("response triggers"));
    }

    #[test]
    fn load_balancer_is_rejected() {
        let event = json!({"httpMethod": "GET", "requestContext": {"elb": {"targetGroupArn": "x"}}});
        assert!(unrecognized(event).contains("Load Balancer"));
    }

    #[test]
    fn anything_else_is_unrecognized() {
        unrecognized(json!({"foo": "bar"}));
        unrecognized(json!({"Records": [{"s3": {}}]}));
        unrecognized(json!({"httpMethod": 3}));
        unrecognized(json!([1, 2, 3]));
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let err = InvocationEnvelope::from_value(json!({"rawPath": "/x"})).unwrap_err();
        match err {
            AdapterError::MalformedEnvelope { family, .. } => assert_eq!(family, Family::HttpV2),
            other => panic!("expected MalformedEnvelope, got {:?}", other),
        }
    }

    #[test]
    fn host_falls_back_to_header_then_localhost() {
        assert_eq!(host_or_default(Some("api.example.com"), Some("h")), "api.example.com");
        assert_eq!(host_or_default(Some(""), Some("h")), "h");
        assert_eq!(host_or_default(None, None), "localhost");
    }
}
