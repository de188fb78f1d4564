//! API Gateway REST API events (payload format 1.0).

use aws_lambda_events::event::apigw::ApiGatewayProxyResponse;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::body;
use crate::envelope::{host_or_default, Family};
use crate::error::AdapterError;
use crate::headers::Headers;
use crate::path::resolve_stage;
use crate::query;
use crate::request::CanonicalRequest;
use crate::response::CanonicalResponse;
use crate::wire;

/// The fields of a REST v1 proxy event the adapter reads.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RestV1Event {
    /// Request method.
    pub http_method: String,
    /// Resource path without the stage. Only used when the request context has no path.
    #[serde(default)]
    pub path: Option<String>,
    /// Last value of each header.
    #[serde(default)]
    pub headers: Option<Map<String, Value>>,
    /// Every value of each header.
    #[serde(default)]
    pub multi_value_headers: Option<Map<String, Value>>,
    /// Last value of each query parameter, decoded.
    #[serde(default)]
    pub query_string_parameters: Option<Map<String, Value>>,
    /// Every value of each query parameter, decoded.
    #[serde(default)]
    pub multi_value_query_string_parameters: Option<Map<String, Value>>,
    /// Stage variables.
    #[serde(default)]
    pub stage_variables: Option<Map<String, Value>>,
    /// Request metadata.
    #[serde(default)]
    pub request_context: RestV1Context,
    /// The body, base64-encoded when `is_base64_encoded` is set.
    #[serde(default)]
    pub body: Option<String>,
    /// Whether `body` is base64.
    #[serde(default)]
    pub is_base64_encoded: Option<bool>,
}

/// The parts of `requestContext` the adapter reads.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RestV1Context {
    /// Full request path, stage included.
    #[serde(default)]
    pub path: Option<String>,
    /// Deployment stage.
    #[serde(default)]
    pub stage: Option<String>,
    /// Host the client called.
    #[serde(default)]
    pub domain_name: Option<String>,
}

impl RestV1Event {
    pub(crate) fn level_override(&self) -> Option<&str> {
        stage_level(self.stage_variables.as_ref())
    }

    pub(crate) fn to_request(&self) -> Result<CanonicalRequest, AdapterError> {
        let empty = Map::new();
        let raw_path = self
            .request_context
            .path
            .as_deref()
            .or(self.path.as_deref())
            .ok_or_else(|| AdapterError::malformed(Family::RestV1, "missing requestContext.path"))?;

        let headers = Headers::from_v1(
            self.headers.as_ref().unwrap_or(&empty),
            self.multi_value_headers.as_ref().unwrap_or(&empty),
        );
        let query_string = query::from_v1(
            self.query_string_parameters.as_ref().unwrap_or(&empty),
            self.multi_value_query_string_parameters
                .as_ref()
                .unwrap_or(&empty),
        );
        let resolved = resolve_stage(raw_path, self.request_context.stage.as_deref());
        let host = host_or_default(
            self.request_context.domain_name.as_deref(),
            headers.get("host"),
        );
        let base_url = resolved.base_url(host);
        let base64 = self.is_base64_encoded.unwrap_or(false);
        let body = body::decode(self.body.as_deref(), base64)?;

        debug!(%base_url, path = %resolved.path, %query_string, "REST v1 event mapped");

        Ok(CanonicalRequest::builder(self.http_method.as_str(), resolved.path)
            .base_url(base_url)
            .query_string(query_string)
            .headers(headers)
            .body_was_base64(base64 && body.is_some())
            .body(body)
            .build())
    }
}

pub(crate) fn stage_level(stage_variables: Option<&Map<String, Value>>) -> Option<&str> {
    stage_variables?
        .get("LEVEL")
        .and_then(Value::as_str)
        .filter(|level| !level.is_empty())
}

/// REST APIs take the proxy reply as is.
pub fn reply(response: &CanonicalResponse) -> ApiGatewayProxyResponse {
    wire::rest_v1_reply(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: Value) -> RestV1Event {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> Value {
        json!({
            "resource": "/{proxy+}",
            "path": "/users/7",
            "httpMethod": "POST",
            "headers": {"Host": "abc.execute-api.us-east-1.amazonaws.com", "Accept": "x"},
            "multiValueHeaders": {"Accept": ["text/html", "application/json"]},
            "queryStringParameters": {"a": "1"},
            "multiValueQueryStringParameters": {"b": ["2", "3"]},
            "stageVariables": {"LEVEL": "WARNING"},
            "requestContext": {
                "path": "/prod/users/7",
                "stage": "prod",
                "domainName": "abc.execute-api.us-east-1.amazonaws.com"
            },
            "body": "eyJpZCI6N30=",
            "isBase64Encoded": true
        })
    }

    #[test]
    fn maps_every_part_of_the_request() {
        let req = event(sample()).to_request().unwrap();
        assert_eq!(req.method(), "POST");
        assert_eq!(req.path(), "/users/7");
        assert_eq!(req.base_url(), "https://abc.execute-api.us-east-1.amazonaws.com/prod");
        assert_eq!(req.query_string(), "b=2,3&a=1");
        assert_eq!(req.headers().get_all("accept"), vec!["text/html", "application/json"]);
        assert_eq!(req.headers().get("host"), Some("abc.execute-api.us-east-1.amazonaws.com"));
        assert_eq!(req.body().map(|b| &b[..]), Some(&b"{\"id\":7}"[..]));
        assert!(req.body_was_base64());
    }

    #[test]
    fn reads_level_override() {
        assert_eq!(event(sample()).level_override(), Some("WARNING"));
        let bare = event(json!({"httpMethod": "GET", "stageVariables": null}));
        assert_eq!(bare.level_override(), None);
    }

    #[test]
    fn nulls_are_treated_as_absent() {
        let req = event(json!({
            "httpMethod": "GET",
            "path": "/health",
            "headers": null,
            "multiValueHeaders": null,
            "queryStringParameters": null,
            "multiValueQueryStringParameters": null,
            "requestContext": {"stage": "$default"},
            "body": null,
            "isBase64Encoded": false
        }))
        .to_request()
        .unwrap();
        assert_eq!(req.path(), "/health");
        assert_eq!(req.base_url(), "https://localhost");
        assert_eq!(req.query_string(), "");
        assert!(req.headers().is_empty());
        assert!(req.body().is_none());
        assert!(!req.body_was_base64());
    }

    #[test]
    fn missing_path_is_malformed() {
        let err = event(json!({"httpMethod": "GET"})).to_request().unwrap_err();
        assert!(matches!(
            err,
            AdapterError::MalformedEnvelope { family: Family::RestV1, .. }
        ));
    }

    #[test]
    fn bad_base64_body_is_an_encoding_error() {
        let err = event(json!({
            "httpMethod": "POST",
            "path": "/",
            "body": "%%%",
            "isBase64Encoded": true
        }))
        .to_request()
        .unwrap_err();
        assert!(matches!(err, AdapterError::Encoding(_)));
    }
}
