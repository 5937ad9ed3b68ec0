//! The request authentication pipeline.
//!
//! [`RequestAuthenticator`] runs every inbound request through a fixed sequence of validation
//! steps:
//!
//! 1. Select the [`AuthMode`] from the presence of an `Authorization` header.
//! 2. Extract the raw signing fields from the header or query string.
//! 3. Parse the credential.
//! 4. Resolve the request date and match it against the credential scope date.
//! 5. Require a `Host` header and select the signed header values.
//! 6. Parse and range-check the expiry.
//!
//! The first failing step ends the pipeline. The caller only ever sees [`AccessDenied`]; the
//! specific reason is logged at `debug` level.

use {
    crate::{
        constants::*,
        credential::Credential,
        date::resolve_date,
        error::{AccessDenied, DenyReason},
        expiry::ExpiryWindow,
        extract::{extract_fields, AuthMode},
        headers::{require_host, select_signed_headers, SignedHeaderSet},
        request::{IncomingRequest, RequestId},
    },
    chrono::{DateTime, Utc},
    derive_builder::Builder,
    log::{debug, trace},
    std::fmt::{Debug, Display, Formatter, Result as FmtResult},
};

/// Protocol limits applied by the pipeline.
///
/// The defaults are the values SigV4 clients expect; other values are not interoperable.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AuthOptions {
    /// Expiry applied to header-authenticated requests, in seconds.
    pub header_expiry_seconds: i64,

    /// Presigned expiries must be strictly greater than this.
    pub min_expiry_seconds_exclusive: i64,

    /// Presigned expiries must be strictly less than this.
    pub max_expiry_seconds_exclusive: i64,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            header_expiry_seconds: HEADER_AUTH_EXPIRY_SECONDS,
            min_expiry_seconds_exclusive: MIN_EXPIRY_SECONDS_EXCLUSIVE,
            max_expiry_seconds_exclusive: MAX_EXPIRY_SECONDS_EXCLUSIVE,
        }
    }
}

/// The last pipeline stage a request reached.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AuthStage {
    /// Nothing has been examined yet.
    Start,

    /// The [`AuthMode`] has been chosen.
    ModeSelected,

    /// The raw signing fields have been extracted.
    FieldsExtracted,

    /// The credential has been parsed.
    CredentialParsed,

    /// The request date has been resolved and matches the credential scope.
    DateResolved,

    /// The `Host` header is present and the signed headers have been selected.
    HeadersNormalized,

    /// The expiry is within range.
    ExpiryChecked,

    /// An [`AuthContext`] has been produced.
    Authenticated,
}

impl Display for AuthStage {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        Debug::fmt(self, f)
    }
}

/// The validated authentication inputs of a request, handed to the signature verifier.
///
/// AuthContext structs are immutable. Use [AuthContextBuilder] to construct one outside the
/// pipeline.
#[derive(Builder, Clone, Eq, PartialEq)]
pub struct AuthContext {
    /// The `Host` header value.
    #[builder(setter(into))]
    host: String,

    /// The access key id from the credential.
    #[builder(setter(into))]
    access_key_id: String,

    /// The region from the credential scope.
    #[builder(setter(into))]
    region: String,

    /// The request timestamp.
    date: DateTime<Utc>,

    /// The signed headers and their values, in declaration order.
    #[builder(default)]
    signed_headers: SignedHeaderSet,

    /// How the signature was delivered.
    mode: AuthMode,

    /// The validity window of the signature.
    expires: ExpiryWindow,

    /// The signature supplied by the client.
    #[builder(setter(into), default)]
    signature: String,
}

impl AuthContext {
    /// Create an [AuthContextBuilder] to construct an [AuthContext].
    #[inline]
    pub fn builder() -> AuthContextBuilder {
        AuthContextBuilder::default()
    }

    /// The `Host` header value.
    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The access key id from the credential.
    #[inline]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// The region from the credential scope.
    #[inline]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The request timestamp.
    #[inline]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// The signed headers and their values, in declaration order.
    #[inline]
    pub fn signed_headers(&self) -> &SignedHeaderSet {
        &self.signed_headers
    }

    /// How the signature was delivered.
    #[inline]
    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// The validity window of the signature.
    #[inline]
    pub fn expires(&self) -> ExpiryWindow {
        self.expires
    }

    /// The signature supplied by the client.
    #[inline]
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

impl Debug for AuthContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AuthContext")
            .field("host", &self.host)
            .field("access_key_id", &self.access_key_id)
            .field("region", &self.region)
            .field("date", &self.date)
            .field("signed_headers", &self.signed_headers)
            .field("mode", &self.mode)
            .field("expires", &self.expires)
            .finish_non_exhaustive()
    }
}

/// Validates the signing inputs of inbound requests.
///
/// This holds no per-request state; a single instance can be shared freely across threads.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestAuthenticator {
    options: AuthOptions,
}

impl RequestAuthenticator {
    /// Create an authenticator with the given protocol limits.
    pub fn new(options: AuthOptions) -> Self {
        Self {
            options,
        }
    }

    /// The protocol limits in use.
    #[inline]
    pub fn options(&self) -> &AuthOptions {
        &self.options
    }

    /// Validate a request, producing either an [`AuthContext`] or an [`AccessDenied`] carrying
    /// `request_id`.
    pub fn authenticate(&self, request: &IncomingRequest, request_id: &RequestId) -> Result<AuthContext, AccessDenied> {
        let mut stage = AuthStage::Start;
        match self.run(request, &mut stage) {
            Ok(context) => {
                trace!("authenticate: request {} authenticated: {:?}", request_id, context);
                Ok(context)
            }
            Err(reason) => {
                debug!("authenticate: request {} denied after stage {}: {}", request_id, stage, reason);
                Err(AccessDenied::new(request_id.clone()))
            }
        }
    }

    fn run(&self, request: &IncomingRequest, stage: &mut AuthStage) -> Result<AuthContext, DenyReason> {
        let mode = AuthMode::for_request(request);
        advance(stage, AuthStage::ModeSelected);

        let fields = extract_fields(request, mode, &self.options)?;
        advance(stage, AuthStage::FieldsExtracted);

        let credential = Credential::validate(fields.credential())?;
        advance(stage, AuthStage::CredentialParsed);

        let date = resolve_date(fields.date_token(), request, &credential)?;
        advance(stage, AuthStage::DateResolved);

        let host = require_host(request)?;
        let signed_headers = select_signed_headers(request, fields.signed_header_names_raw())?;
        advance(stage, AuthStage::HeadersNormalized);

        let expires = ExpiryWindow::validate(fields.expiry_or_fixed(), &self.options)?;
        advance(stage, AuthStage::ExpiryChecked);

        let context = AuthContext::builder()
            .host(host)
            .access_key_id(credential.access_key_id())
            .region(credential.region())
            .date(date)
            .signed_headers(signed_headers)
            .mode(mode)
            .expires(expires)
            .signature(fields.signature())
            .build()
            .map_err(|e| DenyReason::Internal(e.to_string()))?;
        advance(stage, AuthStage::Authenticated);

        Ok(context)
    }
}

#[inline]
fn advance(stage: &mut AuthStage, next: AuthStage) {
    trace!("authenticate: {} -> {}", stage, next);
    *stage = next;
}

#[cfg(test)]
mod tests {
    use {
        super::{AuthContext, AuthOptions, AuthStage, RequestAuthenticator},
        crate::{AuthMode, IncomingRequest, RequestId},
        chrono::{DateTime, NaiveDate, Utc},
        http::request::Request,
    };

    const VALID_AUTH_HEADER: &str = "AWS4-HMAC-SHA256 \
    Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
    SignedHeaders=host;x-amz-date, \
    Signature=c9d5ea9f3f72853aea855b47ea873832890dbdd183b4468f858259531a5138ea";

    fn timestamp() -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(
            NaiveDate::from_ymd_opt(2015, 8, 30).unwrap().and_hms_opt(12, 36, 0).unwrap(),
            Utc,
        )
    }

    fn header_request(auth: &str, date: Option<&str>, host: Option<&str>) -> IncomingRequest {
        let mut builder = Request::builder().uri("/").header("authorization", auth);
        if let Some(date) = date {
            builder = builder.header("x-amz-date", date);
        }
        if let Some(host) = host {
            builder = builder.header("host", host);
        }
        IncomingRequest::from(&builder.body(()).unwrap())
    }

    #[test_log::test]
    fn test_header_auth_success() {
        let req = header_request(VALID_AUTH_HEADER, Some("20150830T123600Z"), Some("example.amazonaws.com"));
        let ctx = RequestAuthenticator::default().authenticate(&req, &RequestId::from("r1")).unwrap();
        assert_eq!(ctx.host(), "example.amazonaws.com");
        assert_eq!(ctx.access_key_id(), "AKIDEXAMPLE");
        assert_eq!(ctx.region(), "us-east-1");
        assert_eq!(ctx.date(), timestamp());
        assert_eq!(ctx.mode(), AuthMode::HeaderAuth);
        assert_eq!(ctx.expires().as_secs(), 300);
        assert_eq!(ctx.signature(), "c9d5ea9f3f72853aea855b47ea873832890dbdd183b4468f858259531a5138ea");
        assert_eq!(
            ctx.signed_headers().as_slice(),
            &[
                ("host".to_string(), "example.amazonaws.com".to_string()),
                ("x-amz-date".to_string(), "20150830T123600Z".to_string()),
            ]
        );

        // The signature is kept out of debug output.
        let debug = format!("{:?}", ctx);
        assert!(debug.contains("AKIDEXAMPLE"));
        assert!(!debug.contains("c9d5ea9f"));
    }

    #[test_log::test]
    fn test_header_auth_failures_carry_request_id() {
        let cases = [
            header_request("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE", Some("20150830T123600Z"), Some("h")),
            header_request(VALID_AUTH_HEADER, None, Some("h")),
            header_request(VALID_AUTH_HEADER, Some("20150831T000000Z"), Some("h")),
            header_request(VALID_AUTH_HEADER, Some("20150830T123600Z"), None),
            header_request(
                "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830, SignedHeaders=host, Signature=ff",
                Some("20150830T123600Z"),
                Some("h"),
            ),
        ];

        let authenticator = RequestAuthenticator::default();
        for (i, req) in cases.iter().enumerate() {
            let request_id = RequestId::new(format!("req-{}", i));
            let e = authenticator.authenticate(req, &request_id).unwrap_err();
            assert_eq!(e.request_id(), &request_id);
            assert_eq!(e.to_string(), "Access Denied");
        }
    }

    #[test_log::test]
    fn test_custom_header_expiry() {
        let options = AuthOptions {
            header_expiry_seconds: 900,
            ..AuthOptions::default()
        };
        let authenticator = RequestAuthenticator::new(options);
        assert_eq!(authenticator.options().header_expiry_seconds, 900);

        let req = header_request(VALID_AUTH_HEADER, Some("20150830T123600Z"), Some("h"));
        let ctx = authenticator.authenticate(&req, &RequestId::default()).unwrap();
        assert_eq!(ctx.expires().as_secs(), 900);

        // A fixed expiry outside the bounds is rejected like any other.
        let authenticator = RequestAuthenticator::new(AuthOptions {
            header_expiry_seconds: 1,
            ..AuthOptions::default()
        });
        assert!(authenticator.authenticate(&req, &RequestId::default()).is_err());
    }

    #[test_log::test]
    fn test_builder() {
        let ctx = AuthContext::builder()
            .host("h")
            .access_key_id("AKIDEXAMPLE")
            .region("us-east-1")
            .date(timestamp())
            .mode(AuthMode::PresignedQuery)
            .expires(crate::ExpiryWindow::parse("60", &AuthOptions::default()).unwrap())
            .build()
            .unwrap();
        assert!(ctx.signed_headers().is_empty());
        assert_eq!(ctx.signature(), "");

        assert!(AuthContext::builder().host("h").build().is_err());
    }

    #[test_log::test]
    fn test_stage_ordering() {
        assert!(AuthStage::Start < AuthStage::ModeSelected);
        assert!(AuthStage::HeadersNormalized < AuthStage::ExpiryChecked);
        assert_eq!(AuthStage::DateResolved.to_string(), "DateResolved");
    }
}
