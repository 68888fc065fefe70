//! HTTP Response
use crate::{
    body::{BoxBody, Full},
    headers::{HeaderSet, HeaderValue, IntoHeaderName, standard::CONTENT_LENGTH},
    http::StatusCode,
};

/// HTTP Response Parts.
#[derive(Debug, Default, Clone)]
pub struct Parts {
    pub status: StatusCode,
    pub headers: HeaderSet,
}

/// HTTP Response returned by an application.
///
/// Headers are given exactly as the application wants them on the wire. Connection management
/// headers such as `Connection` or `Transfer-Encoding` are owned by the engine and are dropped.
#[derive(Debug, Default)]
pub struct Response<T = BoxBody> {
    parts: Parts,
    body: T,
}

/// Constructor
impl<T> Response<T> {
    /// Create `200 OK` [`Response`] with given body.
    #[inline]
    pub fn new(body: T) -> Self {
        Self {
            parts: Parts::default(),
            body,
        }
    }

    /// Create [`Response`] from [`Parts`] and body.
    #[inline]
    pub fn from_parts(parts: Parts, body: T) -> Self {
        Self { parts, body }
    }

    /// Set status code.
    #[inline]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.parts.status = status;
        self
    }

    /// Append a header.
    #[inline]
    pub fn with_header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.parts.headers.add(name, value);
        self
    }

    /// Declare the body length, the body is then written as is instead of chunked.
    ///
    /// A body that turns out longer or shorter than declared truncates the response.
    #[inline]
    pub fn with_content_length(mut self, len: u64) -> Self {
        self.parts.headers.set(CONTENT_LENGTH, HeaderValue::from_u64(len));
        self
    }
}

impl Response<Full> {
    /// Create `200 OK` [`Response`] with a single fragment body.
    ///
    /// No `Content-Length` is declared, see [`with_content_length`][Response::with_content_length].
    #[inline]
    pub fn full<B: Into<bytes::Bytes>>(body: B) -> Self {
        Self::new(Full::new(body))
    }
}

impl<T> Response<T> {
    /// Returns shared reference to [`Parts`].
    #[inline]
    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    /// Returns mutable reference to [`Parts`].
    #[inline]
    pub fn parts_mut(&mut self) -> &mut Parts {
        &mut self.parts
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.parts.status
    }

    #[inline]
    pub fn status_mut(&mut self) -> &mut StatusCode {
        &mut self.parts.status
    }

    #[inline]
    pub fn headers(&self) -> &HeaderSet {
        &self.parts.headers
    }

    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderSet {
        &mut self.parts.headers
    }

    /// Returns shared reference to the body.
    #[inline]
    pub fn body(&self) -> &T {
        &self.body
    }

    /// Returns mutable reference to the body.
    #[inline]
    pub fn body_mut(&mut self) -> &mut T {
        &mut self.body
    }

    /// Map the body.
    #[inline]
    pub fn map_body<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            parts: self.parts,
            body: f(self.body),
        }
    }
}

/// Destructor
impl<T> Response<T> {
    /// Destruct response into [`Parts`] and body.
    #[inline]
    pub fn into_parts(self) -> (Parts, T) {
        (self.parts, self.body)
    }

    /// Destruct response into its body.
    #[inline]
    pub fn into_body(self) -> T {
        self.body
    }
}
