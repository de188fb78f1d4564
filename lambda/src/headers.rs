//! An ordered, case-insensitive header multimap and its conversions to and from each
//! trigger family's header representation.

use std::collections::BTreeMap;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Map;
use tracing::warn;

/// A header as a name-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Name as it was inserted.
    pub name: String,
    /// One value. Repeated headers are separate entries.
    pub value: String,
}

impl Header {
    /// Creates a header.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered header multimap.
///
/// Lookup is case-insensitive. Entries keep insertion order, so repeated names
/// (e.g. `Set-Cookie`) keep the order of their values. A name only exists in the map
/// while it has at least one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<Header>,
}

impl Headers {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value after any existing values for the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push(Header::new(name, value));
    }

    /// Removes every value for `name` and sets `value` as the only one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.append(name, value);
    }

    /// Removes every value for `name`, returning how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|h| !h.name.eq_ignore_ascii_case(name));
        before - self.entries.len()
    }

    /// The first value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Every value for `name`, in order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
            .collect()
    }

    /// Whether `name` has any value.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.entries.iter()
    }

    /// Number of entries, counting repeated names once per value.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Groups values by case-insensitive name.
    ///
    /// Groups appear in order of each name's first entry and are labelled with that
    /// entry's spelling.
    pub fn grouped(&self) -> Vec<(&str, Vec<&str>)> {
        let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
        for h in &self.entries {
            match groups
                .iter_mut()
                .find(|(name, _)| name.eq_ignore_ascii_case(&h.name))
            {
                Some((_, values)) => values.push(h.value.as_str()),
                None => groups.push((h.name.as_str(), vec![h.value.as_str()])),
            }
        }
        groups
    }

    /// Builds the map from the REST v1 pair of header maps.
    ///
    /// Every name in `multi` contributes all its values; a name only in `single`
    /// contributes its one value. A name present in both, in any spelling, uses the
    /// multi-valued list even when that list is empty.
    pub fn from_v1(
        single: &Map<String, serde_json::Value>,
        multi: &Map<String, serde_json::Value>,
    ) -> Self {
        let mut headers = Headers::new();
        for (name, values) in multi {
            for value in string_list(values) {
                headers.append(name.to_ascii_lowercase(), value);
            }
        }
        for (name, value) in single {
            if multi.keys().any(|m| m.eq_ignore_ascii_case(name)) {
                continue;
            }
            if let Some(value) = scalar(value) {
                headers.append(name.to_ascii_lowercase(), value);
            }
        }
        headers
    }

    /// Builds the map from an HTTP v2 header map, where repeated headers have already
    /// been joined with commas by the gateway.
    pub fn from_v2(single: &Map<String, serde_json::Value>) -> Self {
        single
            .iter()
            .filter_map(|(name, value)| scalar(value).map(|v| (name.to_ascii_lowercase(), v)))
            .collect()
    }

    /// Builds the map from CloudFront's `{lowercase: [{key, value}, ...]}` form.
    pub fn from_edge(edge: &BTreeMap<String, Vec<EdgeHeader>>) -> Self {
        let mut headers = Headers::new();
        for (lower, records) in edge {
            for record in records {
                headers.append(lower.to_ascii_lowercase(), record.value.clone());
            }
        }
        headers
    }

    /// Splits the map into the gateway reply's `headers` and `multiValueHeaders`.
    ///
    /// Names with one value go to the first map; names with several go only to the
    /// second, in order. Names come out lowercase, in order of first appearance. Entries
    /// that are not valid HTTP are dropped with a warning; a built
    /// [`CanonicalResponse`](crate::CanonicalResponse) never has any.
    pub fn to_gateway(&self) -> (HeaderMap, HeaderMap) {
        let mut single = HeaderMap::new();
        let mut multi = HeaderMap::new();
        for (name, values) in self.grouped() {
            let Ok(header) = HeaderName::from_bytes(name.as_bytes()) else {
                warn!(name, "dropping header with an invalid name");
                continue;
            };
            let values: Vec<HeaderValue> = values
                .into_iter()
                .filter_map(|v| match HeaderValue::from_str(v) {
                    Ok(v) => Some(v),
                    Err(_) => {
                        warn!(name, "dropping invalid header value");
                        None
                    }
                })
                .collect();
            let target = if values.len() == 1 {
                &mut single
            } else {
                &mut multi
            };
            for value in values {
                target.append(header.clone(), value);
            }
        }
        (single, multi)
    }

    /// Groups the map into CloudFront's reply form, keyed by lowercase name, each record
    /// keeping the name as it was inserted.
    pub fn to_edge(&self) -> BTreeMap<String, Vec<EdgeHeader>> {
        let mut out: BTreeMap<String, Vec<EdgeHeader>> = BTreeMap::new();
        for h in &self.entries {
            out.entry(h.name.to_ascii_lowercase())
                .or_default()
                .push(EdgeHeader {
                    key: Some(h.name.clone()),
                    value: h.value.clone(),
                });
        }
        out
    }
}

impl FromIterator<Header> for Headers {
    fn from_iter<I: IntoIterator<Item = Header>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<(String, String)> for Headers {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        iter.into_iter().map(|(n, v)| Header::new(n, v)).collect()
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// One CloudFront header record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeHeader {
    /// Original spelling of the name. CloudFront may omit it on input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// The value.
    pub value: String,
}

// Gateways send numbers and booleans in these maps when the client did; anything else
// (null, objects) carries no header value.
fn scalar(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn string_list(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items.iter().filter_map(scalar).collect(),
        other => scalar(other).into_iter().collect(),
    }
}
