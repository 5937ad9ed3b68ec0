//! The `scratchstack_s3_auth` crate validates the AWS SigV4 signing inputs of requests arriving at
//! an S3-compatible gateway. It does _not_ compute or compare signatures; that is left to a
//! verifier you supply.
//!
//! Requests are authenticated either with an `Authorization` header or with presigned query
//! parameters (`X-Amz-Credential`, `X-Amz-Date`, and so on). Each request is checked for a
//! well-formed credential, a request date that falls on the credential scope date, a `Host`
//! header, the headers it claims to have signed, and an expiry within the permitted window. The
//! validated inputs are packaged into an [`AuthContext`] and handed to the verifier.
//!
//! Every failure, whatever its cause, is reported as the same [`AccessDenied`] error carrying
//! only the request id. The specific reason is logged via the [`log`](https://docs.rs/log) crate
//! at `debug` level.
//!
//! # Workflow
//! 1. Convert an HTTP `Request` into an [`IncomingRequest`].
//! 2. Call [`RequestAuthenticator::authenticate`] to obtain an [`AuthContext`].
//! 3. Pass the [`AuthContext`] to your signature verifier.
//!
//! [`authenticate_and_verify`] performs steps 2 and 3 together. For Tower-based servers,
//! [`AuthGateLayer`] wraps an inner service so that only authenticated requests reach it.
//!
//! ## Example
//! ```rust
//! use http::Request;
//! use scratchstack_s3_auth::{
//!     authenticate_and_verify, service_for_verifier_fn, AuthContext, AuthMode, IncomingRequest,
//!     RequestAuthenticator, RequestId,
//! };
//! use tower::BoxError;
//!
//! // This is a mock verifier. A real one would look up the secret key for the access key id
//! // and check the signature.
//! async fn verify(ctx: AuthContext) -> Result<String, BoxError> {
//!     if ctx.access_key_id() == "AKIDEXAMPLE" {
//!         Ok(format!("user/{}", ctx.access_key_id()))
//!     } else {
//!         Err("unknown access key".into())
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! // Normally this would come from your web framework.
//! let req = Request::get("/examplebucket/test.txt?X-Amz-Credential=AKIDEXAMPLE%2F20240615%2Fus-east-1%2Fs3%2Faws4_request\
//! &X-Amz-Date=20240615T120000Z&X-Amz-SignedHeaders=host&X-Amz-Expires=3600&X-Amz-Signature=abc123")
//!     .header("Host", "examplebucket.s3.amazonaws.com")
//!     .body(())
//!     .unwrap();
//!
//! let incoming = IncomingRequest::from(&req);
//! let request_id = RequestId::from("4442587FB7D0A2F9");
//! let authenticator = RequestAuthenticator::default();
//!
//! let ctx = authenticator.authenticate(&incoming, &request_id).unwrap();
//! assert_eq!(ctx.mode(), AuthMode::PresignedQuery);
//! assert_eq!(ctx.region(), "us-east-1");
//! assert_eq!(ctx.expires().as_secs(), 3600);
//!
//! let mut verifier = service_for_verifier_fn(verify);
//! let (_ctx, principal) =
//!     authenticate_and_verify(&authenticator, &incoming, &request_id, &mut verifier).await.unwrap();
//! assert_eq!(principal, "user/AKIDEXAMPLE");
//! # });
//! ```
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

mod authenticator;
mod constants;
mod credential;
mod date;
mod error;
mod expiry;
mod extract;
mod headers;
mod request;
mod service;
mod verify;

pub use crate::{
    authenticator::{AuthContext, AuthContextBuilder, AuthOptions, AuthStage, RequestAuthenticator},
    credential::Credential,
    error::AccessDenied,
    expiry::ExpiryWindow,
    extract::{AuthMode, AuthorizationHeader},
    headers::{normalize_header_value, normalize_headers, SignedHeaderSet},
    request::{unescape_uri_encoding, IncomingRequest, RequestId},
    service::{AuthGateLayer, AuthGateService},
    verify::{authenticate_and_verify, service_for_verifier_fn},
};
