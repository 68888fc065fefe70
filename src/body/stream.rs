use bytes::Bytes;
use futures_core::Stream;
use pin_project_lite::pin_project;
use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::body::Body;

pin_project! {
    /// A [`Body`] that pull fragments from an [`Iterator`].
    ///
    /// Each `next` call produces one fragment, the iterator is never driven ahead.
    #[derive(Debug)]
    pub struct Iter<I> {
        iter: I,
    }
}

impl<I> Iter<I> {
    /// Create new [`Iter`] from iterator of `Result`.
    #[inline]
    pub fn new(iter: I) -> Self {
        Self { iter }
    }
}

/// Create infallible [`Iter`] body from fragments.
pub fn from_fragments<I, T>(fragments: I) -> Iter<impl Iterator<Item = Result<T, Infallible>>>
where
    I: IntoIterator<Item = T>,
    T: Into<Bytes>,
{
    Iter::new(fragments.into_iter().map(Ok))
}

impl<I, T, E> Body for Iter<I>
where
    I: Iterator<Item = Result<T, E>>,
    T: Into<Bytes>,
{
    type Error = E;

    fn poll_data(
        self: Pin<&mut Self>,
        _: &mut Context,
    ) -> Poll<Option<Result<Bytes, Self::Error>>> {
        Poll::Ready(self.project().iter.next().map(|e| e.map(Into::into)))
    }
}

pin_project! {
    /// A [`Body`] that pull fragments from a [`Stream`].
    #[derive(Debug)]
    pub struct StreamBody<S> {
        #[pin]
        stream: S,
    }
}

impl<S> StreamBody<S> {
    /// Create new [`StreamBody`].
    #[inline]
    pub fn new(stream: S) -> Self {
        Self { stream }
    }
}

impl<S, T, E> Body for StreamBody<S>
where
    S: Stream<Item = Result<T, E>>,
    T: Into<Bytes>,
{
    type Error = E;

    fn poll_data(
        self: Pin<&mut Self>,
        cx: &mut Context,
    ) -> Poll<Option<Result<Bytes, Self::Error>>> {
        self.project()
            .stream
            .poll_next(cx)
            .map(|e| e.map(|e| e.map(Into::into)))
    }
}
