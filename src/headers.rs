//! Header normalization and signed-header selection.

use {
    crate::{
        constants::*,
        error::DenyReason,
        request::{latin1_to_string, IncomingRequest},
    },
    http::header::{HeaderMap, HeaderValue},
    log::trace,
    std::collections::HashMap,
};

/// The client-declared signed headers, in declaration order, paired with their values.
///
/// A declared header that is absent from the request is paired with an empty value; whether that
/// invalidates the signature is decided by the signature verifier.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SignedHeaderSet {
    headers: Vec<(String, String)>,
}

impl SignedHeaderSet {
    /// The `(name, value)` pairs in declaration order.
    #[inline]
    pub fn as_slice(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The declared header names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().map(|(name, _)| name.as_str())
    }

    /// The value selected for the named header, if it was declared.
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers.iter().find(|(n, _)| *n == name).map(|(_, value)| value.as_str())
    }

    /// The number of signed headers.
    #[inline]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether there are no signed headers.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl<'a> IntoIterator for &'a SignedHeaderSet {
    type Item = &'a (String, String);
    type IntoIter = std::slice::Iter<'a, (String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.iter()
    }
}

/// Group the request headers by lower-cased name, normalizing each value with
/// [`normalize_header_value`]. Values for a repeated header keep their request order.
pub fn normalize_headers(headers: &HeaderMap<HeaderValue>) -> HashMap<String, Vec<Vec<u8>>> {
    headers.iter().fold(HashMap::new(), |mut result, (name, value)| {
        let value = normalize_header_value(value.as_bytes());
        result.entry(name.as_str().to_ascii_lowercase()).or_insert_with(Vec::new).push(value);
        result
    })
}

/// Trim a header value and collapse each inner run of whitespace to a single space.
pub fn normalize_header_value(value: &[u8]) -> Vec<u8> {
    let words = value.split(u8::is_ascii_whitespace).filter(|word| !word.is_empty()).collect::<Vec<&[u8]>>();
    words.join(&b' ')
}

/// Returns the `Host` header value, which every request must carry.
pub(crate) fn require_host(request: &IncomingRequest) -> Result<String, DenyReason> {
    match request.header(HDR_HOST) {
        Some(host) if !host.trim().is_empty() => Ok(host.trim().to_string()),
        _ => Err(DenyReason::MissingHost),
    }
}

/// Parse the declared signed header names and pair each with its normalized request value.
pub(crate) fn select_signed_headers(
    request: &IncomingRequest,
    signed_header_names_raw: &str,
) -> Result<SignedHeaderSet, DenyReason> {
    let names = signed_header_names_raw
        .split(SIGNED_HEADERS_SEPARATOR)
        .map(|name| name.trim().to_ascii_lowercase())
        .collect::<Vec<String>>();

    if names.iter().any(String::is_empty) {
        return Err(DenyReason::MalformedSignedHeaders(signed_header_names_raw.to_string()));
    }

    let normalized = normalize_headers(request.headers());
    let headers = names
        .into_iter()
        .map(|name| {
            let value = match normalized.get(&name) {
                Some(values) => values.iter().map(|v| latin1_to_string(v)).collect::<Vec<String>>().join(","),
                None => {
                    trace!("select_signed_headers: signed header '{}' is not present in the request", name);
                    String::new()
                }
            };
            (name, value)
        })
        .collect();

    Ok(SignedHeaderSet {
        headers,
    })
}

#[cfg(test)]
mod tests {
    use {
        super::{normalize_header_value, normalize_headers, require_host, select_signed_headers},
        crate::{error::DenyReason, IncomingRequest},
        http::{
            header::{HeaderMap, HeaderValue},
            request::Request,
        },
    };

    fn request_with(headers: &[(&str, &str)]) -> IncomingRequest {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        IncomingRequest::from(&builder.body(()).unwrap())
    }

    #[test_log::test]
    fn test_normalize_header_value() {
        assert_eq!(normalize_header_value(b"  a   b  c  "), b"a b c".to_vec());
        assert_eq!(normalize_header_value(b"value"), b"value".to_vec());
        assert_eq!(normalize_header_value(b"   "), b"".to_vec());
        assert_eq!(normalize_header_value(b"a\t\tb"), b"a b".to_vec());
    }

    #[test_log::test]
    fn test_normalize_headers_multi_valued() {
        let mut headers = HeaderMap::new();
        headers.append("X-Multi", HeaderValue::from_static("one"));
        headers.append("x-multi", HeaderValue::from_static(" two  words "));
        let normalized = normalize_headers(&headers);
        assert_eq!(normalized.get("x-multi").unwrap(), &vec![b"one".to_vec(), b"two words".to_vec()]);
    }

    #[test_log::test]
    fn test_select_preserves_declared_order() {
        let req = request_with(&[
            ("Host", "storage.example.com"),
            ("X-Amz-Date", "20240615T000000Z"),
            ("Content-Type", "text/plain"),
        ]);
        let set = select_signed_headers(&req, "x-amz-date;Host;content-type").unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["x-amz-date", "host", "content-type"]);
        assert_eq!(set.get("HOST"), Some("storage.example.com"));
        assert_eq!(set.len(), 3);
        assert!(!set.is_empty());
        let pairs = (&set).into_iter().cloned().collect::<Vec<_>>();
        assert_eq!(pairs[2], ("content-type".to_string(), "text/plain".to_string()));
    }

    #[test_log::test]
    fn test_select_missing_header_is_empty() {
        let req = request_with(&[("Host", "storage.example.com")]);
        let set = select_signed_headers(&req, "host;x-amz-content-sha256").unwrap();
        assert_eq!(
            set.as_slice(),
            &[
                ("host".to_string(), "storage.example.com".to_string()),
                ("x-amz-content-sha256".to_string(), String::new()),
            ]
        );
    }

    #[test_log::test]
    fn test_select_multi_valued_joined() {
        let req = request_with(&[("Host", "h"), ("X-Multi", "a"), ("X-Multi", "b")]);
        let set = select_signed_headers(&req, "x-multi").unwrap();
        assert_eq!(set.get("x-multi"), Some("a,b"));
    }

    #[test_log::test]
    fn test_select_malformed_list() {
        let req = request_with(&[("Host", "h")]);
        for bad in ["", "host;", ";host", "host;;date"] {
            assert_eq!(
                select_signed_headers(&req, bad).unwrap_err(),
                DenyReason::MalformedSignedHeaders(bad.to_string())
            );
        }
    }

    #[test_log::test]
    fn test_require_host() {
        assert_eq!(require_host(&request_with(&[("Host", " example.com ")])).unwrap(), "example.com");
        assert_eq!(require_host(&request_with(&[])).unwrap_err(), DenyReason::MissingHost);
        assert_eq!(require_host(&request_with(&[("Host", "")])).unwrap_err(), DenyReason::MissingHost);
    }
}
