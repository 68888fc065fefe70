use bytes::Bytes;
use futures_core::Stream;
use std::future::poll_fn;
use std::io;
use std::pin::pin;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::log::debug;
use crate::proto::generator::{Outcome, ResponseGenerator};

enum Step {
    Frame(Option<Bytes>),
    Cancelled,
}

/// Write a response to the transport.
///
/// Each frame is fully written before the next one is produced, so the application is never
/// more than one fragment ahead of the transport. Heartbeats are not written.
///
/// When `cancel` resolves, or a write fails, the response is aborted and nothing more is
/// written. The transport is shut down when the connection is not kept alive.
///
/// # Errors
///
/// Returns error if writing to the transport fails.
pub async fn exchange<W, F, C>(
    io: &mut W,
    generator: ResponseGenerator<F>,
    cancel: C,
) -> io::Result<Outcome>
where
    W: AsyncWrite + Unpin,
    ResponseGenerator<F>: Stream<Item = Bytes>,
    C: Future<Output = ()>,
{
    let mut generator = pin!(generator);
    let mut cancel = pin!(cancel);

    loop {
        let step = tokio::select! {
            biased;
            () = &mut cancel => Step::Cancelled,
            frame = poll_fn(|cx| generator.as_mut().poll_next(cx)) => Step::Frame(frame),
        };

        let frame = match step {
            Step::Frame(Some(frame)) => frame,
            Step::Frame(None) => break,
            Step::Cancelled => {
                generator.as_mut().abort();
                close(io).await;
                return Ok(Outcome::Fatal);
            }
        };

        if frame.is_empty() {
            continue;
        }

        let written = tokio::select! {
            biased;
            () = &mut cancel => None,
            result = io.write_all(&frame) => Some(result),
        };

        match written {
            Some(Ok(())) => {}
            Some(Err(err)) => {
                generator.as_mut().abort();
                return Err(err);
            }
            None => {
                generator.as_mut().abort();
                close(io).await;
                return Ok(Outcome::Fatal);
            }
        }
    }

    let outcome = generator.outcome().unwrap_or(Outcome::Fatal);
    io.flush().await?;
    if !outcome.keep_alive() {
        close(io).await;
    }
    Ok(outcome)
}

/// Shut down the write side, failures are only logged.
pub(crate) async fn close<W: AsyncWrite + Unpin>(io: &mut W) {
    if let Err(_err) = io.shutdown().await {
        debug!("failed to shutdown transport: {_err}");
    }
}
