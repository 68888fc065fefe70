//! HTTP Response Body.
//!
//! ## Core
//!
//! - [`Body`] the trait that represent a lazily produced message body
//! - [`BoxBody`] type erased body used by the response generator
//!
//! ## Implementation
//!
//! - [`Full`] single chunk body
//! - [`Empty`] body without content
//! - [`Iter`] body from an iterator of fragments
//! - [`StreamBody`] body from a [`Stream`] of fragments
//! - [`OnClose`] attach a cleanup hook to another body
//!
//! ## Wire
//!
//! - [`ChunkEncoder`] / [`ChunkedDecoder`] chunked transfer coding
//! - [`BodyCoder`] per response framing
//!
//! [`Stream`]: futures_core::Stream
mod full;
mod stream;
mod close;
mod boxed;
mod collect;
mod chunked;
mod coder;
mod error;

pub use full::{Full, Empty};
pub use stream::{Iter, StreamBody, from_fragments};
pub use close::OnClose;
pub use boxed::BoxBody;
pub use collect::Collect;
pub use chunked::{ChunkEncoder, ChunkedDecoder, EncodedChunk};
pub use coder::BodyCoder;
pub use error::BodyError;

use bytes::Bytes;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A lazily produced sequence of body fragments.
///
/// Each call to [`poll_data`][Body::poll_data] yields at most one fragment. An empty fragment is
/// a valid item and is distinct from the end of the body, which is signaled by `None`.
pub trait Body {
    type Error;

    /// Attempt to pull the next fragment.
    fn poll_data(
        self: Pin<&mut Self>,
        cx: &mut Context,
    ) -> Poll<Option<Result<Bytes, Self::Error>>>;

    /// Returns the exact remaining length if known.
    fn size_hint(&self) -> Option<u64> {
        None
    }

    /// Release resources held by the body.
    ///
    /// The response generator calls this exactly once at the end of an exchange, whether it
    /// completed, failed, or was abandoned.
    fn close(self: Pin<&mut Self>) {}

    /// Attach a hook that runs when the body is closed.
    fn on_close<F>(self, f: F) -> OnClose<Self, F>
    where
        F: FnOnce(),
        Self: Sized,
    {
        OnClose::new(self, f)
    }

    /// Returns future that buffer the entire body.
    fn collect(self) -> Collect<Self>
    where
        Self: Sized,
    {
        Collect::new(self)
    }
}

impl<B> Body for Pin<Box<B>>
where
    B: Body + ?Sized,
{
    type Error = B::Error;

    #[inline]
    fn poll_data(
        self: Pin<&mut Self>,
        cx: &mut Context,
    ) -> Poll<Option<Result<Bytes, Self::Error>>> {
        self.get_mut().as_mut().poll_data(cx)
    }

    #[inline]
    fn size_hint(&self) -> Option<u64> {
        self.as_ref().size_hint()
    }

    #[inline]
    fn close(self: Pin<&mut Self>) {
        self.get_mut().as_mut().close()
    }
}

#[cfg(test)]
mod test;
