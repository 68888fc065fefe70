use bytes::{Bytes, BytesMut};
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use crate::body::Body;

pin_project! {
    /// A future returned from [`Body::collect`], which buffer entire body.
    #[derive(Debug)]
    pub struct Collect<B> {
        #[pin]
        body: B,
        buffer: Buffer,
    }
}

/// This state can optimize in case of only one Bytes returned from body, which will prevent
/// copying in concatenation.
#[derive(Debug)]
enum Buffer {
    None,
    Ref(Bytes),
    Mut(BytesMut),
}

impl<B> Collect<B> {
    pub(crate) fn new(body: B) -> Self {
        Self {
            body,
            buffer: Buffer::None,
        }
    }
}

impl<B: Body> Future for Collect<B> {
    type Output = Result<Bytes, B::Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut me = self.project();
        loop {
            let Some(data) = ready!(me.body.as_mut().poll_data(cx)?) else {
                me.body.as_mut().close();
                let buffer = std::mem::replace(me.buffer, Buffer::None);
                return Poll::Ready(Ok(match buffer {
                    Buffer::None => Bytes::new(),
                    Buffer::Ref(bytes) => bytes,
                    Buffer::Mut(bytes) => bytes.freeze(),
                }));
            };
            if data.is_empty() {
                continue;
            }
            *me.buffer = match std::mem::replace(me.buffer, Buffer::None) {
                Buffer::None => Buffer::Ref(data),
                Buffer::Ref(first) => {
                    let mut buffer = BytesMut::with_capacity(first.len() + data.len());
                    buffer.extend_from_slice(&first);
                    buffer.extend_from_slice(&data);
                    Buffer::Mut(buffer)
                }
                Buffer::Mut(mut buffer) => {
                    buffer.extend_from_slice(&data);
                    Buffer::Mut(buffer)
                }
            };
        }
    }
}
