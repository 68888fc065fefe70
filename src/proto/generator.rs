use bytes::Bytes;
use futures_core::Stream;
use pin_project_lite::pin_project;
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use crate::body::{Body, BodyCoder, BoxBody};
use crate::config::Config;
use crate::error::{BoxError, HttpError};
use crate::headers::{HeaderSet, HeaderValue, standard::CONTENT_LENGTH};
use crate::http::{Response, StatusCode};
use crate::log::{debug, error};
use crate::proto::error::ProtoError;
use crate::proto::state::ResponseState;

/// Callback invoked with the final status and headers, right before the header block is
/// written.
pub type HeaderObserver = Arc<dyn Fn(StatusCode, &HeaderSet) + Send + Sync>;

/// How a response exchange ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The whole response was produced.
    Complete { keep_alive: bool },
    /// The response was truncated, the connection must be closed.
    Fatal,
}

impl Outcome {
    /// Returns `true` if the connection can serve another request.
    #[inline]
    pub const fn keep_alive(&self) -> bool {
        matches!(self, Self::Complete { keep_alive: true })
    }
}

pin_project! {
    /// Drives an application future into the wire bytes of its response.
    ///
    /// The first item is the header block, emitted lazily at the first non-empty body fragment
    /// or when the body is exhausted. Following items are body frames, encoded per the chosen
    /// transfer coding. Empty items are heartbeats from empty body fragments and have no wire
    /// effect.
    ///
    /// An application failure before the header block is written is answered with a single
    /// substitute error response. Any failure after that, or during the substitute, truncates
    /// the response and the stream ends with [`Outcome::Fatal`].
    pub struct ResponseGenerator<F> {
        #[pin]
        phase: Phase<F>,
        inner: Inner,
    }
}

pin_project! {
    #[project = PhaseProject]
    enum Phase<F> {
        Service { #[pin] future: F },
        Streaming,
        Done,
    }
}

struct Inner {
    state: ResponseState,
    config: Arc<Config>,
    queue: VecDeque<Bytes>,
    coder: Option<BodyCoder>,
    body: Option<BoxBody>,
    substituted: bool,
    outcome: Option<Outcome>,
    observer: Option<HeaderObserver>,
}

/// Result of pulling one body fragment.
enum Event {
    Continue,
    Heartbeat,
    Done,
}

impl<F> ResponseGenerator<F> {
    /// Create generator for an application future.
    pub fn new(state: ResponseState, future: F, config: Arc<Config>) -> Self {
        Self {
            phase: Phase::Service { future },
            inner: Inner {
                state,
                config,
                queue: VecDeque::with_capacity(4),
                coder: None,
                body: None,
                substituted: false,
                outcome: None,
                observer: None,
            },
        }
    }

    /// Observe the final header block.
    #[inline]
    pub fn with_observer(mut self, observer: HeaderObserver) -> Self {
        self.inner.observer = Some(observer);
        self
    }

    /// Response bookkeeping.
    #[inline]
    pub fn state(&self) -> &ResponseState {
        &self.inner.state
    }

    /// Returns how the exchange ended, `None` while the stream is not exhausted.
    #[inline]
    pub fn outcome(&self) -> Option<Outcome> {
        self.inner.outcome
    }

    /// Abandon the response, e.g. on transport failure or shutdown.
    ///
    /// The application body is closed if it was not already, and the stream ends.
    pub fn abort(self: Pin<&mut Self>) {
        let mut me = self.project();
        if me.inner.outcome.is_none() {
            debug!("response aborted");
            me.inner.fatal();
        }
        me.inner.queue.clear();
        me.phase.set(Phase::Done);
    }
}

impl<F, B, E> Stream for ResponseGenerator<F>
where
    F: Future<Output = Result<Response<B>, E>>,
    B: Body + Send + 'static,
    B::Error: Into<BoxError>,
    E: Into<BoxError>,
{
    type Item = Bytes;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let me = self.project();
        let mut phase = me.phase;
        let inner = me.inner;

        loop {
            if let Some(frame) = inner.queue.pop_front() {
                return Poll::Ready(Some(frame));
            }

            match phase.as_mut().project() {
                PhaseProject::Service { future } => {
                    let done = match ready!(future.poll(cx)) {
                        Ok(response) => inner.start(response.map_body(BoxBody::new)),
                        Err(err) => inner.fail(err.into()),
                    };
                    phase.set(if done { Phase::Done } else { Phase::Streaming });
                }
                PhaseProject::Streaming => match ready!(inner.poll_body(cx)) {
                    Event::Continue => {}
                    Event::Heartbeat => return Poll::Ready(Some(Bytes::new())),
                    Event::Done => phase.set(Phase::Done),
                },
                PhaseProject::Done => return Poll::Ready(None),
            }
        }
    }
}

impl Inner {
    /// Returns `true` if the exchange is over.
    fn start(&mut self, response: Response<BoxBody>) -> bool {
        let (parts, body) = response.into_parts();
        self.body = Some(body);
        match self.state.set_status_and_headers(parts.status, parts.headers, false) {
            Ok(()) => false,
            Err(err) => self.fail(err.into()),
        }
    }

    fn poll_body(&mut self, cx: &mut Context) -> Poll<Event> {
        if self.coder.as_ref().is_some_and(BodyCoder::is_discard) {
            return Poll::Ready(self.complete());
        }
        let Some(body) = self.body.as_mut() else {
            return Poll::Ready(self.complete());
        };

        let event = match ready!(Pin::new(body).poll_data(cx)) {
            Some(Ok(data)) if data.is_empty() => {
                if self.coder.is_none() && self.state.is_upgrade() {
                    match self.flush_head() {
                        Ok(()) => Event::Continue,
                        Err(err) => self.fail_proto(err),
                    }
                } else {
                    Event::Heartbeat
                }
            }
            Some(Ok(data)) => match self.write_data(data) {
                Ok(()) => Event::Continue,
                Err(err) => self.fail_proto(err),
            },
            Some(Err(err)) => self.fail_event(err),
            None => self.complete(),
        };
        Poll::Ready(event)
    }

    fn write_data(&mut self, data: Bytes) -> Result<(), ProtoError> {
        self.flush_head()?;
        if let Some(coder) = self.coder.as_mut() {
            coder.encode(data, &mut self.queue)?;
        }
        Ok(())
    }

    fn flush_head(&mut self) -> Result<(), ProtoError> {
        if self.coder.is_some() {
            return Ok(());
        }
        let (head, coder) = self.state.finalize_head(&self.config)?;
        if let Some(status) = self.state.status() {
            debug!("{} {status} {:?}", self.state.version(), self.state.headers());
            if let Some(observer) = &self.observer {
                observer(status, self.state.headers());
            }
        }
        self.queue.push_back(head);
        self.coder = Some(coder);
        Ok(())
    }

    /// Body exhausted, write the header block if not yet and terminate the body.
    fn complete(&mut self) -> Event {
        let finished = self.flush_head().and_then(|()| match self.coder.as_mut() {
            Some(coder) => Ok(coder.finish(&mut self.queue)?),
            None => Ok(()),
        });
        if let Err(err) = finished {
            return self.fail_proto(err);
        }
        self.close_body();
        self.outcome = Some(Outcome::Complete {
            keep_alive: self.state.keep_alive(),
        });
        Event::Done
    }

    fn fail_event(&mut self, err: BoxError) -> Event {
        if self.fail(err) { Event::Done } else { Event::Continue }
    }

    fn fail_proto(&mut self, err: ProtoError) -> Event {
        self.fail_event(err.into())
    }

    /// Handle a failure, substituting an error response when possible.
    ///
    /// Returns `true` if the exchange is over.
    fn fail(&mut self, err: BoxError) -> bool {
        let fatal = match err.downcast_ref::<ProtoError>() {
            Some(err) => err.is_fatal(),
            None => false,
        };
        if fatal || self.substituted || self.state.headers_sent() {
            error!("could not send valid response: {err}");
            self.fatal();
            return true;
        }

        self.substituted = true;
        self.close_body();

        let (status, mut headers) = match err.downcast::<HttpError>() {
            Ok(err) => {
                debug!("application error: {err}");
                (*err).into_parts()
            }
            Err(err) => {
                error!("application error: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, HeaderSet::new())
            }
        };
        let body = Bytes::from(status.to_string());
        headers.set(CONTENT_LENGTH, HeaderValue::from_u64(body.len() as u64));

        if let Err(err) = self.state.set_status_and_headers(status, headers, true) {
            error!("could not send valid response: {err}");
            self.fatal();
            return true;
        }
        if !status.is_redirect() {
            self.state.disable_keep_alive();
        }
        self.body = Some(BoxBody::full(body));
        false
    }

    /// Frames already queued are still written.
    fn fatal(&mut self) {
        self.state.disable_keep_alive();
        self.close_body();
        self.outcome = Some(Outcome::Fatal);
    }

    fn close_body(&mut self) {
        if let Some(mut body) = self.body.take() {
            Pin::new(&mut body).close();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.close_body();
    }
}

impl<F> std::fmt::Debug for ResponseGenerator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseGenerator")
            .field("state", &self.inner.state)
            .field("queue", &self.inner.queue.len())
            .field("outcome", &self.inner.outcome)
            .finish_non_exhaustive()
    }
}
