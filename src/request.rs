//! The inbound request as seen by the authentication gate.

use {
    http::{
        header::{HeaderMap, HeaderValue},
        method::Method,
        request::{Parts, Request},
    },
    qualifier_attr::qualifiers,
    std::{
        collections::HashMap,
        fmt::{Display, Formatter, Result as FmtResult},
    },
};

/// Opaque identifier correlated 1:1 with a request. This is generated by the host before
/// authentication begins and attached to every denial for traceability.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct RequestId(String);

impl RequestId {
    /// Create a new request id.
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Retrieve the request id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// An inbound HTTP request, read-only to the authentication gate.
///
/// Headers are case-insensitive and may be multi-valued. Query parameters are percent-decoded
/// and may also be multi-valued; lookups return the first value.
#[derive(Clone, Debug)]
pub struct IncomingRequest {
    method: Method,
    path: String,
    headers: HeaderMap<HeaderValue>,
    query_parameters: HashMap<String, Vec<String>>,
}

impl IncomingRequest {
    /// Create a request from already-parsed components.
    pub fn new(
        method: Method,
        path: impl Into<String>,
        headers: HeaderMap<HeaderValue>,
        query_parameters: HashMap<String, Vec<String>>,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            headers,
            query_parameters,
        }
    }

    /// Create a request from HTTP request [`Parts`], decoding the query string.
    pub fn from_parts(parts: &Parts) -> Self {
        let query_parameters = match parts.uri.query() {
            Some(query) => query_string_to_map(query),
            None => HashMap::new(),
        };

        Self {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            headers: parts.headers.clone(),
            query_parameters,
        }
    }

    /// The HTTP method of the request.
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The URI path of the request.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The HTTP headers of the request.
    #[inline]
    pub fn headers(&self) -> &HeaderMap<HeaderValue> {
        &self.headers
    }

    /// The decoded query parameters of the request.
    #[inline]
    pub fn query_parameters(&self) -> &HashMap<String, Vec<String>> {
        &self.query_parameters
    }

    /// Returns the first value of the named query parameter, if any. Names are case-sensitive.
    pub fn query_parameter(&self, name: &str) -> Option<&str> {
        self.query_parameters.get(name).and_then(|values| values.first()).map(String::as_str)
    }

    /// Returns the first value of the named header as a string, if any.
    ///
    /// Header values are interpreted as Latin-1 so that no value is ever rejected for its encoding.
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers.get(name).map(|value| latin1_to_string(value.as_bytes()))
    }
}

impl From<&Parts> for IncomingRequest {
    fn from(parts: &Parts) -> Self {
        Self::from_parts(parts)
    }
}

impl<B> From<&Request<B>> for IncomingRequest {
    fn from(request: &Request<B>) -> Self {
        let query_parameters = match request.uri().query() {
            Some(query) => query_string_to_map(query),
            None => HashMap::new(),
        };

        Self {
            method: request.method().clone(),
            path: request.uri().path().to_string(),
            headers: request.headers().clone(),
            query_parameters,
        }
    }
}

/// Convert a Latin-1 slice of bytes to a UTF-8 string.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| *b as char).collect()
}

/// Split a raw query string into a map of decoded keys to decoded values.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn query_string_to_map(query_string: &str) -> HashMap<String, Vec<String>> {
    let mut result = HashMap::<String, Vec<String>>::new();

    for component in query_string.split('&') {
        if component.is_empty() {
            continue;
        }

        let (key, value) = component.split_once('=').unwrap_or((component, ""));
        result.entry(unescape_uri_encoding(key)).or_default().push(unescape_uri_encoding(value));
    }

    result
}

/// Unescapes a URI percent-encoded string. `+` is left as is.
///
/// Malformed escapes (a `%` not followed by two hex digits) are passed through literally. The
/// decoded bytes are interpreted as UTF-8, with invalid sequences replaced.
pub fn unescape_uri_encoding(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                match (hex_value(bytes.get(i + 1)), hex_value(bytes.get(i + 2))) {
                    (Some(hi), Some(lo)) => {
                        result.push((hi << 4) | lo);
                        i += 3;
                    }
                    _ => {
                        result.push(b'%');
                        i += 1;
                    }
                }
            }
            c => {
                result.push(c);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&result).into_owned()
}

#[inline(always)]
fn hex_value(c: Option<&u8>) -> Option<u8> {
    match *c? {
        c @ b'0'..=b'9' => Some(c - b'0'),
        c @ b'a'..=b'f' => Some(c - b'a' + 10),
        c @ b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
