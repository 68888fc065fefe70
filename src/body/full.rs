use bytes::Bytes;
use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::body::Body;

/// A [`Body`] implementation that consist of a single chunk.
#[derive(Clone, Debug, Default)]
pub struct Full {
    data: Option<Bytes>,
}

impl Full {
    /// Creates a new [`Full`].
    #[inline]
    pub fn new<B: Into<Bytes>>(body: B) -> Self {
        let data: Bytes = body.into();
        Self { data: (!data.is_empty()).then_some(data) }
    }
}

impl Body for Full {
    type Error = Infallible;

    fn poll_data(
        self: Pin<&mut Self>,
        _: &mut Context,
    ) -> Poll<Option<Result<Bytes, Self::Error>>> {
        Poll::Ready(self.get_mut().data.take().map(Ok))
    }

    fn size_hint(&self) -> Option<u64> {
        Some(self.data.as_ref().map_or(0, |d| d.len() as u64))
    }
}

/// A [`Body`] without any fragment.
#[derive(Clone, Copy, Debug, Default)]
pub struct Empty;

impl Body for Empty {
    type Error = Infallible;

    #[inline]
    fn poll_data(
        self: Pin<&mut Self>,
        _: &mut Context,
    ) -> Poll<Option<Result<Bytes, Self::Error>>> {
        Poll::Ready(None)
    }

    #[inline]
    fn size_hint(&self) -> Option<u64> {
        Some(0)
    }
}

impl From<Bytes> for Full {
    #[inline]
    fn from(value: Bytes) -> Self {
        Self::new(value)
    }
}

impl From<&'static str> for Full {
    #[inline]
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Full {
    #[inline]
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
