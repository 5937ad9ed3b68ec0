//! Hand-off to the signature verifier.
//!
//! Cryptographic verification is performed by a separate collaborator, modelled as a
//! [Tower `Service`][tower::Service] that accepts an [`AuthContext`]. Whatever the verifier
//! returns on success is passed back to the caller untouched; any error it returns is reported
//! as the same [`AccessDenied`] the validation pipeline produces.

use {
    crate::{
        authenticator::{AuthContext, RequestAuthenticator},
        error::{AccessDenied, DenyReason},
        request::{IncomingRequest, RequestId},
    },
    log::{debug, trace},
    std::future::Future,
    tower::{service_fn, util::ServiceFn, BoxError, Service, ServiceExt},
};

/// Authenticate a request and, if it passes validation, verify its signature.
///
/// On success, returns the [`AuthContext`] along with the verifier's response. A failure of
/// either stage yields an [`AccessDenied`] carrying `request_id`; the two are indistinguishable
/// to the caller.
pub async fn authenticate_and_verify<V>(
    authenticator: &RequestAuthenticator,
    request: &IncomingRequest,
    request_id: &RequestId,
    verifier: &mut V,
) -> Result<(AuthContext, V::Response), AccessDenied>
where
    V: Service<AuthContext, Error = BoxError> + Send,
    V::Future: Send,
{
    let context = authenticator.authenticate(request, request_id)?;

    match verifier.oneshot(context.clone()).await {
        Ok(response) => {
            trace!("authenticate_and_verify: request {} verified", request_id);
            Ok((context, response))
        }
        Err(e) => {
            let reason = DenyReason::VerifierRejected(e.to_string());
            debug!("authenticate_and_verify: request {} denied: {}", request_id, reason);
            Err(AccessDenied::new(request_id.clone()))
        }
    }
}

/// Create a Service that wraps a function that verifies the signature of an [`AuthContext`].
pub fn service_for_verifier_fn<F, Fut, R>(f: F) -> ServiceFn<F>
where
    F: FnMut(AuthContext) -> Fut + Send + 'static,
    Fut: Future<Output = Result<R, BoxError>> + Send + 'static,
{
    service_fn(f)
}
