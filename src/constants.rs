//! Common constants used throughout the crate.
//!
//! These are consolidated here so every pipeline step agrees on header names, query parameter
//! names, and protocol limits. If a value is spelled incorrectly, at least it can be fixed in one
//! spot.
//!
//! Tests that are testing protocol strings should not use these constants; they should use
//! hard-coded strings so the tests are also testing for misspellings.
//!
//! Please keep this file organized alphabetically.

/// Algorithm for AWS SigV4
pub(crate) const AWS4_HMAC_SHA256: &str = "AWS4-HMAC-SHA256";

/// Signature field for the access key
pub(crate) const CREDENTIAL: &str = "Credential";

/// Error code returned for every authentication failure.
pub(crate) const ERR_CODE_ACCESS_DENIED: &str = "AccessDenied";

/// Error message returned for every authentication failure.
pub(crate) const ERR_MSG_ACCESS_DENIED: &str = "Access Denied";

/// Expiry applied to header-authenticated requests, in seconds.
pub(crate) const HEADER_AUTH_EXPIRY_SECONDS: i64 = 300;

/// Header for `authorization`
pub(crate) const HDR_AUTHORIZATION: &str = "authorization";

/// Header for `date`
pub(crate) const HDR_DATE: &str = "date";

/// Header for `host`
pub(crate) const HDR_HOST: &str = "host";

/// Header for delivering the alternate date
pub(crate) const HDR_X_AMZ_DATE: &str = "x-amz-date";

/// Short date format used in the credential scope.
pub(crate) const ISO8601_DATE_FORMAT: &str = "%Y%m%d";

/// Presigned URL expiry must be strictly less than this many seconds (7 days).
pub(crate) const MAX_EXPIRY_SECONDS_EXCLUSIVE: i64 = 604_800;

/// Presigned URL expiry must be strictly greater than this many seconds.
pub(crate) const MIN_EXPIRY_SECONDS_EXCLUSIVE: i64 = 1;

/// Query parameter for the signature algorithm
pub(crate) const QP_X_AMZ_ALGORITHM: &str = "X-Amz-Algorithm";

/// Query parameter for delivering the access key
pub(crate) const QP_X_AMZ_CREDENTIAL: &str = "X-Amz-Credential";

/// Query parameter for delivering the date
pub(crate) const QP_X_AMZ_DATE: &str = "X-Amz-Date";

/// Query parameter for delivering the expiration time of a presigned URL
pub(crate) const QP_X_AMZ_EXPIRES: &str = "X-Amz-Expires";

/// Query parameter for delivering the signature
pub(crate) const QP_X_AMZ_SIGNATURE: &str = "X-Amz-Signature";

/// Query parameter specifying the signed headers
pub(crate) const QP_X_AMZ_SIGNED_HEADERS: &str = "X-Amz-SignedHeaders";

/// Signature field for the signature itself
pub(crate) const SIGNATURE: &str = "Signature";

/// Authorization header parameter specifying the signed headers
pub(crate) const SIGNED_HEADERS: &str = "SignedHeaders";

/// Separator between names in a signed headers list.
pub(crate) const SIGNED_HEADERS_SEPARATOR: char = ';';
