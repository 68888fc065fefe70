use bytes::Bytes;
use futures_core::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use super::{Body, BoxBody, Empty, Full, StreamBody, from_fragments};

/// Counts down to zero, one fragment per number.
struct Countdown(u8);

impl Stream for Countdown {
    type Item = Result<String, std::io::Error>;

    fn poll_next(mut self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.0 == 0 {
            return Poll::Ready(None);
        }
        self.0 -= 1;
        Poll::Ready(Some(Ok(self.0.to_string())))
    }
}

#[tokio::test]
async fn collect_fragments() {
    let body = from_fragments(["hello", "", " ", "world"]);
    assert_eq!(body.collect().await.unwrap(), "hello world");

    assert_eq!(Full::new("one").collect().await.unwrap(), "one");
    assert!(Empty.collect().await.unwrap().is_empty());
    assert_eq!(StreamBody::new(Countdown(3)).collect().await.unwrap(), "210");
}

#[test]
fn size_hint() {
    assert_eq!(Full::new("four").size_hint(), Some(4));
    assert_eq!(Empty.size_hint(), Some(0));
    assert_eq!(BoxBody::full(Bytes::from_static(b"abc")).size_hint(), Some(3));
    assert_eq!(BoxBody::new(from_fragments(["a"])).size_hint(), None);
}

#[tokio::test]
async fn on_close_runs_once() {
    let count = Arc::new(AtomicUsize::new(0));
    let hook = {
        let count = Arc::clone(&count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
        }
    };

    let mut body = BoxBody::new(from_fragments(["a"]).on_close(hook));
    Pin::new(&mut body).close();
    Pin::new(&mut body).close();
    assert_eq!(count.load(Ordering::SeqCst), 1);

    // collecting to the end closes the body
    let count = Arc::new(AtomicUsize::new(0));
    let hook = {
        let count = Arc::clone(&count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
        }
    };
    let body = from_fragments(["a", "b"]).on_close(hook);
    assert_eq!(body.collect().await.unwrap(), "ab");
    assert_eq!(count.load(Ordering::SeqCst), 1);
}
