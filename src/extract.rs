//! Field extraction: selects the authentication mode and pulls the raw signing fields out of the
//! `Authorization` header or the query string.

use {
    crate::{authenticator::AuthOptions, constants::*, error::DenyReason, request::IncomingRequest},
    log::trace,
    std::{
        collections::HashMap,
        fmt::{Display, Formatter, Result as FmtResult},
    },
};

/// How the client delivered its signature.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AuthMode {
    /// Signing parameters are in the `Authorization` header.
    HeaderAuth,

    /// Signing parameters are in the query string (a presigned URL).
    PresignedQuery,
}

impl AuthMode {
    /// Select the mode for a request: header authentication if a non-empty `Authorization` header
    /// is present, presigned query authentication otherwise.
    pub fn for_request(request: &IncomingRequest) -> Self {
        match request.headers().get(HDR_AUTHORIZATION) {
            Some(value) if !value.as_bytes().iter().all(u8::is_ascii_whitespace) => Self::HeaderAuth,
            _ => Self::PresignedQuery,
        }
    }
}

impl Display for AuthMode {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::HeaderAuth => f.write_str("header"),
            Self::PresignedQuery => f.write_str("presigned-query"),
        }
    }
}

/// The raw, unparsed signing fields of a request.
///
/// For presigned requests, a missing query parameter is represented as an empty string; it is the
/// later parsing steps that reject it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct RawAuthFields {
    credential: String,
    date_token: String,
    signed_header_names_raw: String,
    expiry_or_fixed: String,
    signature: String,
}

impl RawAuthFields {
    /// The credential, in the form `keyid/date/region/service/aws4_request`.
    #[inline]
    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// The `X-Amz-Date` value from the header or query string; empty if absent.
    #[inline]
    pub fn date_token(&self) -> &str {
        &self.date_token
    }

    /// The semicolon-delimited list of signed header names.
    #[inline]
    pub fn signed_header_names_raw(&self) -> &str {
        &self.signed_header_names_raw
    }

    /// The `X-Amz-Expires` value for presigned requests, or the fixed header expiry.
    #[inline]
    pub fn expiry_or_fixed(&self) -> &str {
        &self.expiry_or_fixed
    }

    /// The signature supplied by the client.
    #[inline]
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

/// The components of a SigV4 `Authorization` header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthorizationHeader {
    credential: String,
    signed_headers: String,
    signature: String,
}

impl AuthorizationHeader {
    /// Parse an `Authorization` header of the form
    /// `AWS4-HMAC-SHA256 Credential=..., SignedHeaders=..., Signature=...`.
    ///
    /// Returns `None` if the scheme is not `AWS4-HMAC-SHA256` or a component is missing or empty.
    pub fn parse(auth_header: &str) -> Option<Self> {
        Self::validate(auth_header).ok()
    }

    pub(crate) fn validate(auth_header: &str) -> Result<Self, DenyReason> {
        let auth_header = auth_header.trim();
        let (algorithm, parameters) = auth_header.split_once(' ').unwrap_or((auth_header, ""));

        if algorithm != AWS4_HMAC_SHA256 {
            return Err(DenyReason::UnsupportedAlgorithm(algorithm.to_string()));
        }

        // Use the last value for each key; overwriting is ok.
        let mut parameter_map = HashMap::new();
        for parameter in parameters.split(',').map(str::trim) {
            if parameter.is_empty() {
                continue;
            }

            let Some((key, value)) = parameter.split_once('=') else {
                return Err(DenyReason::MalformedAuthorization(format!(
                    "'{}' is not a key=value pair",
                    parameter
                )));
            };
            parameter_map.insert(key.trim(), value.trim());
        }

        let mut take = |key: &str| match parameter_map.remove(key) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(DenyReason::MalformedAuthorization(format!("missing '{}' parameter", key))),
        };

        Ok(Self {
            credential: take(CREDENTIAL)?,
            signed_headers: take(SIGNED_HEADERS)?,
            signature: take(SIGNATURE)?,
        })
    }

    /// The `Credential` parameter.
    #[inline]
    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// The `SignedHeaders` parameter.
    #[inline]
    pub fn signed_headers(&self) -> &str {
        &self.signed_headers
    }

    /// The `Signature` parameter.
    #[inline]
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

/// Pull the raw signing fields from the request according to its [`AuthMode`].
pub(crate) fn extract_fields(
    request: &IncomingRequest,
    mode: AuthMode,
    options: &AuthOptions,
) -> Result<RawAuthFields, DenyReason> {
    match mode {
        AuthMode::HeaderAuth => {
            let auth_header = request.header(HDR_AUTHORIZATION).unwrap_or_default();
            let auth = AuthorizationHeader::validate(&auth_header)?;
            trace!("extract_fields: parsed Authorization header, signed headers '{}'", auth.signed_headers());

            Ok(RawAuthFields {
                credential: auth.credential,
                date_token: request.header(HDR_X_AMZ_DATE).unwrap_or_default(),
                signed_header_names_raw: auth.signed_headers,
                expiry_or_fixed: options.header_expiry_seconds.to_string(),
                signature: auth.signature,
            })
        }
        AuthMode::PresignedQuery => {
            if let Some(algorithm) = request.query_parameter(QP_X_AMZ_ALGORITHM) {
                if algorithm != AWS4_HMAC_SHA256 {
                    return Err(DenyReason::UnsupportedAlgorithm(algorithm.to_string()));
                }
            }

            let param = |name: &str| request.query_parameter(name).unwrap_or_default().to_string();
            Ok(RawAuthFields {
                credential: param(QP_X_AMZ_CREDENTIAL),
                date_token: param(QP_X_AMZ_DATE),
                signed_header_names_raw: param(QP_X_AMZ_SIGNED_HEADERS),
                expiry_or_fixed: param(QP_X_AMZ_EXPIRES),
                signature: param(QP_X_AMZ_SIGNATURE),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::{extract_fields, AuthorizationHeader, RawAuthFields},
        crate::{error::DenyReason, AuthMode, AuthOptions, IncomingRequest},
        http::request::Request,
    };

    fn incoming(uri: &str, headers: &[(&str, &str)]) -> IncomingRequest {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        IncomingRequest::from(&builder.body(()).unwrap())
    }

    #[test_log::test]
    fn test_mode_selection() {
        let req = incoming("/", &[("authorization", "AWS4-HMAC-SHA256 Credential=x")]);
        assert_eq!(AuthMode::for_request(&req), AuthMode::HeaderAuth);

        let req = incoming("/?X-Amz-Credential=x", &[]);
        assert_eq!(AuthMode::for_request(&req), AuthMode::PresignedQuery);

        // An empty Authorization header is treated as absent.
        let req = incoming("/", &[("authorization", "")]);
        assert_eq!(AuthMode::for_request(&req), AuthMode::PresignedQuery);
        assert_eq!(AuthMode::HeaderAuth.to_string(), "header");
        assert_eq!(AuthMode::PresignedQuery.to_string(), "presigned-query");
    }

    #[test_log::test]
    fn test_parse_authorization() {
        let auth = AuthorizationHeader::parse(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
            SignedHeaders=host;x-amz-date, Signature=c9d5ea9f",
        )
        .unwrap();
        assert_eq!(auth.credential(), "AKIDEXAMPLE/20150830/us-east-1/service/aws4_request");
        assert_eq!(auth.signed_headers(), "host;x-amz-date");
        assert_eq!(auth.signature(), "c9d5ea9f");
    }

    #[test_log::test]
    fn test_parse_authorization_component_ordering() {
        let auth = AuthorizationHeader::parse(
            "  AWS4-HMAC-SHA256   Signature=1234 ,SignedHeaders=host,Credential=A/B/C,  Credential=D/E/F  ",
        )
        .unwrap();
        assert_eq!(auth.credential(), "D/E/F");
        assert_eq!(auth.signed_headers(), "host");
        assert_eq!(auth.signature(), "1234");
    }

    #[test_log::test]
    fn test_parse_authorization_failures() {
        assert!(matches!(
            AuthorizationHeader::validate("AWS3-ZZZ Credential=12345"),
            Err(DenyReason::UnsupportedAlgorithm(_))
        ));
        assert!(matches!(AuthorizationHeader::validate("AWS4-HMAC-SHA256"), Err(DenyReason::MalformedAuthorization(_))));
        assert!(matches!(
            AuthorizationHeader::validate("AWS4-HMAC-SHA256 Credential=1234, SignedHeadersdate;host"),
            Err(DenyReason::MalformedAuthorization(_))
        ));

        // Each of the three components is required.
        for i in 0..7 {
            let mut parts = Vec::new();
            if i & 1 != 0 {
                parts.push("Credential=A/B/C/D/E");
            }
            if i & 2 != 0 {
                parts.push("SignedHeaders=host");
            }
            if i & 4 != 0 {
                parts.push("Signature=1234");
            }
            let header = format!("AWS4-HMAC-SHA256 {}", parts.join(", "));
            assert!(
                matches!(AuthorizationHeader::validate(&header), Err(DenyReason::MalformedAuthorization(_))),
                "{} should not parse",
                header
            );
        }

        assert!(matches!(
            AuthorizationHeader::validate("AWS4-HMAC-SHA256 Credential=, SignedHeaders=host, Signature=1234"),
            Err(DenyReason::MalformedAuthorization(_))
        ));
    }

    #[test_log::test]
    fn test_extract_header_fields() {
        let req = incoming(
            "/?X-Amz-Expires=3600&X-Amz-Date=19990101T000000Z",
            &[
                ("authorization", "AWS4-HMAC-SHA256 Credential=A/20240615/r/s/aws4_request, SignedHeaders=host, Signature=ff"),
                ("x-amz-date", "20240615T120000Z"),
            ],
        );
        let fields = extract_fields(&req, AuthMode::HeaderAuth, &AuthOptions::default()).unwrap();
        assert_eq!(fields.credential(), "A/20240615/r/s/aws4_request");
        assert_eq!(fields.date_token(), "20240615T120000Z");
        assert_eq!(fields.signed_header_names_raw(), "host");
        assert_eq!(fields.expiry_or_fixed(), "300");
        assert_eq!(fields.signature(), "ff");
    }

    #[test_log::test]
    fn test_extract_query_fields() {
        let req = incoming(
            "/obj?X-Amz-Credential=A%2F20240615%2Fr%2Fs%2Faws4_request&X-Amz-Date=20240615T000000Z\
            &X-Amz-SignedHeaders=host&X-Amz-Expires=3600&X-Amz-Signature=abcd",
            &[("x-amz-date", "19990101T000000Z")],
        );
        let fields = extract_fields(&req, AuthMode::PresignedQuery, &AuthOptions::default()).unwrap();
        assert_eq!(fields.credential(), "A/20240615/r/s/aws4_request");
        assert_eq!(fields.date_token(), "20240615T000000Z");
        assert_eq!(fields.signed_header_names_raw(), "host");
        assert_eq!(fields.expiry_or_fixed(), "3600");
        assert_eq!(fields.signature(), "abcd");
    }

    #[test_log::test]
    fn test_extract_query_missing_fields_default_empty() {
        let req = incoming("/obj", &[]);
        let fields = extract_fields(&req, AuthMode::PresignedQuery, &AuthOptions::default()).unwrap();
        assert_eq!(fields, RawAuthFields::default());
    }

    #[test_log::test]
    fn test_extract_query_wrong_algorithm() {
        let req = incoming("/obj?X-Amz-Algorithm=AWS4-HMAC-SHA512", &[]);
        let e = extract_fields(&req, AuthMode::PresignedQuery, &AuthOptions::default()).unwrap_err();
        assert_eq!(e, DenyReason::UnsupportedAlgorithm("AWS4-HMAC-SHA512".to_string()));
    }
}
