use bytes::Bytes;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::body::Body;

pin_project! {
    /// A [`Body`] with a cleanup hook, created by [`Body::on_close`].
    ///
    /// The hook runs after the inner body is closed, at most once.
    pub struct OnClose<B, F> {
        #[pin]
        body: B,
        hook: Option<F>,
    }
}

impl<B, F> OnClose<B, F> {
    pub(crate) fn new(body: B, hook: F) -> Self {
        Self { body, hook: Some(hook) }
    }
}

impl<B, F> Body for OnClose<B, F>
where
    B: Body,
    F: FnOnce(),
{
    type Error = B::Error;

    #[inline]
    fn poll_data(
        self: Pin<&mut Self>,
        cx: &mut Context,
    ) -> Poll<Option<Result<Bytes, Self::Error>>> {
        self.project().body.poll_data(cx)
    }

    #[inline]
    fn size_hint(&self) -> Option<u64> {
        self.body.size_hint()
    }

    fn close(self: Pin<&mut Self>) {
        let me = self.project();
        me.body.close();
        if let Some(hook) = me.hook.take() {
            hook();
        }
    }
}

impl<B, F> std::fmt::Debug for OnClose<B, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnClose")
            .field("closed", &self.hook.is_none())
            .finish_non_exhaustive()
    }
}
