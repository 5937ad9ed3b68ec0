use {
    crate::{constants::*, request::RequestId},
    bytes::Bytes,
    http::{header::CONTENT_TYPE, response::Response, status::StatusCode},
    quick_xml::{events::BytesText, writer::Writer as XmlWriter},
    scratchstack_errors::ServiceError,
    std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
    },
    tower::BoxError,
};

/// Error returned when a request fails authentication.
///
/// Every failure of the authentication gate produces this same error, regardless of which check
/// failed. The only information it carries is the request id, so callers probing the gate cannot
/// tell one failure from another.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessDenied {
    request_id: RequestId,
}

impl AccessDenied {
    /// Create a new `AccessDenied` error for the given request.
    #[inline]
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
        }
    }

    /// Retrieve the id of the request that was denied.
    #[inline]
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Render this error as an S3-style XML error response.
    ///
    /// The body has the form
    /// `<Error><Code>AccessDenied</Code><Message>Access Denied</Message><RequestId>...</RequestId></Error>`
    /// and the status is `403 Forbidden`.
    pub fn to_xml_response(&self) -> Result<Response<Bytes>, BoxError> {
        let buffer = Vec::with_capacity(256);
        let mut xml = XmlWriter::new(buffer);
        xml.create_element("Error").write_inner_content(|xml| {
            xml.create_element("Code").write_text_content(BytesText::new(self.error_code()))?;
            xml.create_element("Message").write_text_content(BytesText::new(ERR_MSG_ACCESS_DENIED))?;
            xml.create_element("RequestId").write_text_content(BytesText::new(self.request_id.as_str()))?;
            Ok::<(), quick_xml::Error>(())
        })?;

        let body = Bytes::from(xml.into_inner());
        let response = Response::builder()
            .status(self.http_status())
            .header(CONTENT_TYPE, "application/xml")
            .body(body)?;
        Ok(response)
    }
}

impl ServiceError for AccessDenied {
    fn error_code(&self) -> &'static str {
        ERR_CODE_ACCESS_DENIED
    }

    fn http_status(&self) -> StatusCode {
        StatusCode::FORBIDDEN
    }
}

impl Display for AccessDenied {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.write_str(ERR_MSG_ACCESS_DENIED)
    }
}

impl Error for AccessDenied {}

/// The reason a request was denied. This is logged but never exposed outside the crate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum DenyReason {
    /// The `Authorization` header could not be split into credential, signed headers, and signature.
    MalformedAuthorization(String),

    /// The signing algorithm is not `AWS4-HMAC-SHA256`.
    UnsupportedAlgorithm(String),

    /// The credential string is not of the form `keyid/date/region/...`.
    MalformedCredential(String),

    /// Neither `X-Amz-Date` nor `Date` supplied a value.
    MissingDate,

    /// The request date could not be parsed.
    MalformedDate(String),

    /// The request date does not fall on the credential scope date.
    DateScopeMismatch {
        scope_date: String,
        request_date: String,
    },

    /// The request has no `Host` header.
    MissingHost,

    /// The signed headers list is empty or contains an empty name.
    MalformedSignedHeaders(String),

    /// The expiry is not an integer.
    MalformedExpiry(String),

    /// The expiry is outside the allowed window.
    ExpiryOutOfRange(i64),

    /// The downstream signature verifier rejected the request.
    VerifierRejected(String),

    /// An unexpected internal failure.
    Internal(String),
}

impl Display for DenyReason {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::MalformedAuthorization(msg) => write!(f, "malformed Authorization header: {}", msg),
            Self::UnsupportedAlgorithm(alg) => write!(f, "unsupported algorithm '{}'", alg),
            Self::MalformedCredential(cred) => write!(f, "malformed credential '{}'", cred),
            Self::MissingDate => f.write_str("request has neither an X-Amz-Date nor a Date value"),
            Self::MalformedDate(date) => write!(f, "malformed request date '{}'", date),
            Self::DateScopeMismatch {
                scope_date,
                request_date,
            } => write!(f, "credential scope date '{}' does not match request date '{}'", scope_date, request_date),
            Self::MissingHost => f.write_str("request has no Host header"),
            Self::MalformedSignedHeaders(raw) => write!(f, "malformed signed headers '{}'", raw),
            Self::MalformedExpiry(raw) => write!(f, "malformed expiry '{}'", raw),
            Self::ExpiryOutOfRange(value) => write!(f, "expiry {} is out of range", value),
            Self::VerifierRejected(msg) => write!(f, "signature verifier rejected request: {}", msg),
            Self::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}
