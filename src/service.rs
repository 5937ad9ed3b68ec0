use {
    crate::{
        authenticator::{AuthContext, RequestAuthenticator},
        request::{IncomingRequest, RequestId},
        verify::authenticate_and_verify,
    },
    bytes::Bytes,
    http::{request::Request, response::Response},
    log::warn,
    std::{
        any::type_name,
        fmt::{Debug, Formatter, Result as FmtResult},
        future::Future,
        pin::Pin,
        task::{Context, Poll},
    },
    tower::{BoxError, Layer, Service, ServiceExt},
};

/// AuthGateService implements a Tower service that authenticates each request before passing it
/// to an inner service.
///
/// The host is expected to attach a [`RequestId`] to the request extensions before the request
/// reaches this service. On success, the [`AuthContext`] and the verifier's response are added
/// to the request extensions. On failure, the inner service is not called and an XML
/// `AccessDenied` response is returned instead.
#[derive(Clone)]
pub struct AuthGateService<V, S> {
    authenticator: RequestAuthenticator,
    verifier: V,
    inner: S,
}

impl<V, S> AuthGateService<V, S> {
    /// Create a new authentication gate in front of `inner`.
    pub fn new(authenticator: RequestAuthenticator, verifier: V, inner: S) -> Self {
        AuthGateService {
            authenticator,
            verifier,
            inner,
        }
    }
}

impl<V, S> Debug for AuthGateService<V, S> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.debug_struct("AuthGateService")
            .field("authenticator", &self.authenticator)
            .field("verifier", &type_name::<V>())
            .field("inner", &type_name::<S>())
            .finish()
    }
}

impl<V, S, B, ResBody> Service<Request<B>> for AuthGateService<V, S>
where
    V: Service<AuthContext, Error = BoxError> + Clone + Send + 'static,
    V::Future: Send,
    V::Response: Clone + Send + Sync + 'static,
    S: Service<Request<B>, Response = Response<ResBody>, Error = BoxError> + Clone + Send + 'static,
    S::Future: Send,
    B: Send + 'static,
    ResBody: From<Bytes> + Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Response<ResBody>, BoxError>> + Send>>;

    fn poll_ready(&mut self, c: &mut Context) -> Poll<Result<(), Self::Error>> {
        match self.verifier.poll_ready(c) {
            Poll::Ready(Ok(())) => self.inner.poll_ready(c),
            other => other,
        }
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let authenticator = self.authenticator;
        let verifier = self.verifier.clone();
        let inner = self.inner.clone();

        Box::pin(handle_call(req, authenticator, verifier, inner))
    }
}

async fn handle_call<V, S, B, ResBody>(
    mut req: Request<B>,
    authenticator: RequestAuthenticator,
    mut verifier: V,
    inner: S,
) -> Result<Response<ResBody>, BoxError>
where
    V: Service<AuthContext, Error = BoxError> + Send,
    V::Future: Send,
    V::Response: Clone + Send + Sync + 'static,
    S: Service<Request<B>, Response = Response<ResBody>, Error = BoxError>,
    ResBody: From<Bytes>,
{
    let request_id = match req.extensions().get::<RequestId>() {
        Some(request_id) => request_id.clone(),
        None => {
            warn!("AuthGateService: request has no RequestId extension");
            RequestId::default()
        }
    };

    let incoming = IncomingRequest::from(&req);
    match authenticate_and_verify(&authenticator, &incoming, &request_id, &mut verifier).await {
        Ok((context, authorized)) => {
            req.extensions_mut().insert(context);
            req.extensions_mut().insert(authorized);
            inner.oneshot(req).await
        }
        Err(denied) => Ok(denied.to_xml_response()?.map(ResBody::from)),
    }
}

/// A [`Layer`] that wraps services in an [`AuthGateService`].
#[derive(Clone, Debug)]
pub struct AuthGateLayer<V> {
    authenticator: RequestAuthenticator,
    verifier: V,
}

impl<V> AuthGateLayer<V> {
    /// Create a new layer using the given authenticator and signature verifier.
    pub fn new(authenticator: RequestAuthenticator, verifier: V) -> Self {
        AuthGateLayer {
            authenticator,
            verifier,
        }
    }
}

impl<V: Clone, S> Layer<S> for AuthGateLayer<V> {
    type Service = AuthGateService<V, S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthGateService::new(self.authenticator, self.verifier.clone(), inner)
    }
}
