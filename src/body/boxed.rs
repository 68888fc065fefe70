use bytes::Bytes;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::body::{Body, Empty, Full};
use crate::error::BoxError;

/// Type erased [`Body`] with boxed error.
pub struct BoxBody {
    inner: Pin<Box<dyn Body<Error = BoxError> + Send>>,
}

impl BoxBody {
    /// Erase the type of given body.
    pub fn new<B>(body: B) -> Self
    where
        B: Body + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self {
            inner: Box::pin(MapErr { body }),
        }
    }

    /// Body without content.
    #[inline]
    pub fn empty() -> Self {
        Self::new(Empty)
    }

    /// Body of a single fragment.
    #[inline]
    pub fn full<B: Into<Bytes>>(bytes: B) -> Self {
        Self::new(Full::new(bytes))
    }
}

impl Body for BoxBody {
    type Error = BoxError;

    #[inline]
    fn poll_data(
        self: Pin<&mut Self>,
        cx: &mut Context,
    ) -> Poll<Option<Result<Bytes, Self::Error>>> {
        self.get_mut().inner.as_mut().poll_data(cx)
    }

    #[inline]
    fn size_hint(&self) -> Option<u64> {
        self.inner.size_hint()
    }

    #[inline]
    fn close(self: Pin<&mut Self>) {
        self.get_mut().inner.as_mut().close()
    }
}

impl std::fmt::Debug for BoxBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxBody").finish_non_exhaustive()
    }
}

pin_project! {
    struct MapErr<B> {
        #[pin]
        body: B,
    }
}

impl<B> Body for MapErr<B>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    type Error = BoxError;

    #[inline]
    fn poll_data(
        self: Pin<&mut Self>,
        cx: &mut Context,
    ) -> Poll<Option<Result<Bytes, Self::Error>>> {
        self.project()
            .body
            .poll_data(cx)
            .map(|e| e.map(|e| e.map_err(Into::into)))
    }

    #[inline]
    fn size_hint(&self) -> Option<u64> {
        self.body.size_hint()
    }

    #[inline]
    fn close(self: Pin<&mut Self>) {
        self.project().body.close()
    }
}
