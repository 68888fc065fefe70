//! Application interface.
use crate::body::Body;
use crate::error::BoxError;
use crate::http::Response;
use crate::proto::RequestContext;

// ===== Service =====

/// An asynchronous function from request to response.
pub trait Service<Request> {
    type Response;

    type Error;

    type Future: Future<Output = Result<Self::Response, Self::Error>>;

    fn call(&self, request: Request) -> Self::Future;
}

/// A [`Service`] that accept a [`RequestContext`] and return a [`Response`] that can be served
/// on a connection.
pub trait HttpService:
    Service<RequestContext, Response = Response<Self::ResBody>, Error: Into<BoxError>, Future = Self::HttpFuture>
    + Send
    + Sync
    + 'static
{
    type ResBody: Body<Error: Into<BoxError>> + Send + 'static;

    type HttpFuture: Future<Output = Result<Response<Self::ResBody>, Self::Error>> + Send + 'static;
}

impl<S, B> HttpService for S
where
    S: Service<RequestContext, Response = Response<B>> + Send + Sync + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
    B: Body + Send + 'static,
    B::Error: Into<BoxError>,
{
    type ResBody = B;

    type HttpFuture = S::Future;
}

// ===== FromFn =====

/// Create [`Service`] from an async function.
///
/// ```rust
/// use h1engine::body::Full;
/// use h1engine::http::Response;
/// use h1engine::proto::RequestContext;
///
/// let service = h1engine::service::from_fn(|req: RequestContext| async move {
///     let body = format!("hello {}", req.path());
///     Ok::<_, std::convert::Infallible>(Response::new(Full::new(body)))
/// });
/// # let _ = service;
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F> {
    FromFn { f }
}

#[derive(Debug, Clone)]
pub struct FromFn<F> {
    f: F,
}

impl<F, Fut, Req, Res, E> Service<Req> for FromFn<F>
where
    F: Fn(Req) -> Fut,
    Fut: Future<Output = Result<Res, E>>,
{
    type Response = Res;

    type Error = E;

    type Future = Fut;

    #[inline]
    fn call(&self, request: Req) -> Self::Future {
        (self.f)(request)
    }
}
