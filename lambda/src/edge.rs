//! Lambda@Edge viewer- and origin-request events.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use crate::body;
use crate::envelope::{host_or_default, Family};
use crate::error::AdapterError;
use crate::headers::{EdgeHeader, Headers};
use crate::path::resolve_base_path;
use crate::request::CanonicalRequest;
use crate::response::CanonicalResponse;
use crate::wire::EdgeResponse;

/// A CloudFront event. It must hold exactly one record.
#[derive(Deserialize, Debug, Clone)]
pub struct EdgeEvent {
    /// The records; CloudFront always sends one.
    #[serde(rename = "Records")]
    pub records: Vec<EdgeRecord>,
}

/// One CloudFront record.
#[derive(Deserialize, Debug, Clone)]
pub struct EdgeRecord {
    /// The CloudFront payload.
    pub cf: EdgeCf,
}

/// `Records[0].cf`.
#[derive(Deserialize, Debug, Clone)]
pub struct EdgeCf {
    /// The viewer or origin request.
    pub request: EdgeRequest,
}

/// The CloudFront request object.
#[derive(Deserialize, Debug, Clone)]
pub struct EdgeRequest {
    /// Request method.
    pub method: String,
    /// Request path, without the query string.
    pub uri: String,
    /// Query string as received, without the `?`.
    #[serde(default)]
    pub querystring: Option<String>,
    /// Headers keyed by lowercase name.
    #[serde(default)]
    pub headers: BTreeMap<String, Vec<EdgeHeader>>,
    /// Present only when the distribution includes the body.
    #[serde(default)]
    pub body: Option<EdgeBody>,
}

/// The CloudFront request body.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EdgeBody {
    /// The body, encoded as `encoding` says.
    #[serde(default)]
    pub data: Option<String>,
    /// `base64` or `text`.
    #[serde(default)]
    pub encoding: Option<String>,
    /// Whether CloudFront truncated the body.
    #[serde(default)]
    pub input_truncated: bool,
}

impl EdgeEvent {
    pub(crate) fn to_request(
        &self,
        family: Family,
        base_path: Option<&str>,
    ) -> Result<CanonicalRequest, AdapterError> {
        let request = match self.records.as_slice() {
            [record] => &record.cf.request,
            records => {
                return Err(AdapterError::malformed(
                    family,
                    format!("expected exactly one record, found {}", records.len()),
                ))
            }
        };

        let headers = Headers::from_edge(&request.headers);
        let resolved = resolve_base_path(&request.uri, base_path);
        let base_url = resolved.base_url(host_or_default(None, headers.get("host")));
        let query_string = request.querystring.clone().unwrap_or_default();

        let (data, base64) = match &request.body {
            Some(EdgeBody {
                data: Some(data),
                encoding,
                input_truncated,
            }) => {
                if *input_truncated {
                    debug!("edge request body was truncated by CloudFront");
                }
                (Some(data.as_str()), encoding.as_deref() == Some("base64"))
            }
            _ => (None, false),
        };
        let body = body::decode(data, base64)?;

        debug!(%base_url, path = %resolved.path, %query_string, "edge event mapped");

        Ok(CanonicalRequest::builder(request.method.as_str(), resolved.path)
            .base_url(base_url)
            .query_string(query_string)
            .headers(headers)
            .body_was_base64(base64 && body.is_some())
            .body(body)
            .build())
    }
}

/// Builds the CloudFront generated-response object.
pub fn reply(response: &CanonicalResponse) -> EdgeResponse {
    EdgeResponse::from_canonical(response)
}
