//! Connection runtime.
use bytes::{Buf, BytesMut};
use std::future::poll_fn;
use std::io;
use std::sync::Arc;
use std::task::{Poll, ready};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

use crate::config::Config;
use crate::error::BoxError;
use crate::log::{debug, error, info};
use crate::proto::{
    ConnectionInfo, EnvironmentBuilder, ExpectContinue, HeaderObserver, ResponseGenerator,
    ResponseState, close, exchange,
};
use crate::request::RequestParser;
use crate::service::HttpService;

const DEFAULT_BUFFER_CAP: usize = 1024;

/// Pipelined bytes buffered while a response is in flight, reading pauses beyond this.
const MAX_PIPELINED: usize = 64 * 1024;

// ===== Listener =====

/// Source of transport connections.
pub trait Listener {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn poll_accept(
        &self,
        cx: &mut std::task::Context,
    ) -> Poll<io::Result<(Self::Stream, ConnectionInfo)>>;
}

impl Listener for TcpListener {
    type Stream = TcpStream;

    fn poll_accept(
        &self,
        cx: &mut std::task::Context,
    ) -> Poll<io::Result<(Self::Stream, ConnectionInfo)>> {
        let (stream, peer) = ready!(TcpListener::poll_accept(self, cx))?;
        let local = stream.local_addr()?;
        Poll::Ready(Ok((stream, ConnectionInfo::new(peer, local))))
    }
}

// ===== Server =====

/// Start server with given `Service`.
pub fn serve<L: Listener, S: HttpService>(listener: L, service: S) -> Server<L, S> {
    Server {
        listener,
        connection: Connection::new(service),
    }
}

/// Accept loop, serving each connection on its own task.
#[derive(Debug)]
pub struct Server<L, S> {
    listener: L,
    connection: Connection<S>,
}

impl<L, S> Server<L, S>
where
    L: Listener,
    S: HttpService,
{
    pub fn config(mut self, config: Config) -> Self {
        self.connection.config = Arc::new(config);
        self
    }

    /// Observe every response header block.
    pub fn observer(mut self, observer: HeaderObserver) -> Self {
        self.connection.observer = Some(observer);
        self
    }

    /// Stop accepting and abort in flight responses once the value becomes `true`, or the
    /// sender is dropped.
    pub fn shutdown(mut self, signal: watch::Receiver<bool>) -> Self {
        self.connection.shutdown = Some(signal);
        self
    }

    /// Run the accept loop, returns after shutdown.
    pub async fn run<P>(self)
    where
        P: RequestParser + Default + Send + 'static,
    {
        let Self { listener, connection } = self;

        loop {
            let accepted = tokio::select! {
                biased;
                () = shutdown_signal(connection.shutdown.clone()) => break,
                accepted = poll_fn(|cx| listener.poll_accept(cx)) => accepted,
            };

            match accepted {
                Ok((io, conn)) => {
                    let connection = connection.clone();
                    tokio::spawn(async move {
                        if let Err(_err) = connection.serve::<_, P>(io, conn).await {
                            error!("failed to serve {}: {_err}", conn.peer);
                        }
                    });
                }
                Err(_err) => {
                    error!("failed to accept connection: {_err}");
                }
            }
        }

        info!("server stopped");
    }
}

// ===== Connection =====

/// Serves HTTP/1.x requests on a single transport.
pub struct Connection<S> {
    service: Arc<S>,
    config: Arc<Config>,
    observer: Option<HeaderObserver>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl<S> Connection<S> {
    pub fn new(service: S) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::default(),
            observer: None,
            shutdown: None,
        }
    }

    pub fn with_config(mut self, config: Arc<Config>) -> Self {
        self.config = config;
        self
    }

    pub fn with_observer(mut self, observer: HeaderObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_shutdown(mut self, signal: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(signal);
        self
    }
}

impl<S: HttpService> Connection<S> {
    /// Serve requests until the connection is closed by either side.
    ///
    /// Requests are parsed with a fresh `P` each. Bytes received after a complete request are
    /// kept for the next pipelined one, which is parsed only after the current response is
    /// fully written.
    ///
    /// While a response is in flight the read side is still watched. A peer hangup abandons
    /// the response, unless `Config::half_close` allows end of input.
    ///
    /// # Errors
    ///
    /// Returns error on malformed request, in which case the transport is closed without a
    /// response, or on transport failure.
    pub async fn serve<IO, P>(&self, io: IO, conn: ConnectionInfo) -> Result<(), BoxError>
    where
        IO: AsyncRead + AsyncWrite + Unpin,
        P: RequestParser + Default,
    {
        let (mut reader, mut writer) = tokio::io::split(io);
        let mut buffer = BytesMut::with_capacity(DEFAULT_BUFFER_CAP);

        loop {
            // ===== Request =====

            let mut parser = P::default();
            let mut expect = ExpectContinue::new();

            loop {
                if !buffer.is_empty() {
                    let consumed = match parser.feed(&buffer) {
                        Ok(consumed) => consumed.min(buffer.len()),
                        Err(err) => {
                            debug!("closing {} on malformed request: {err}", conn.peer);
                            close(&mut writer).await;
                            return Err(err.into());
                        }
                    };
                    buffer.advance(consumed);

                    if parser.message_complete() {
                        break;
                    }
                    if parser.headers_complete() {
                        if let Some(interim) = expect.check(parser.version(), parser.headers(), false) {
                            writer.write_all(&interim).await?;
                            writer.flush().await?;
                        }
                    }
                }

                let read = tokio::select! {
                    biased;
                    () = shutdown_signal(self.shutdown.clone()) => return Ok(()),
                    read = reader.read_buf(&mut buffer) => read?,
                };
                if read == 0 {
                    return Ok(());
                }
            }

            // ===== Response =====

            let request = EnvironmentBuilder::new(&self.config).build(&parser, &conn);
            let state = ResponseState::from_request(&request);
            let future = self.service.call(request);

            let mut generator = ResponseGenerator::new(state, future, Arc::clone(&self.config));
            if let Some(observer) = &self.observer {
                generator = generator.with_observer(Arc::clone(observer));
            }

            let cancel = {
                let shutdown = shutdown_signal(self.shutdown.clone());
                let hangup = hangup(&mut reader, &mut buffer, self.config.half_close, conn);
                async move {
                    tokio::select! {
                        () = shutdown => {}
                        () = hangup => {}
                    }
                }
            };

            let outcome = exchange(&mut writer, generator, cancel).await?;
            if !outcome.keep_alive() {
                return Ok(());
            }
        }
    }
}

impl<S> Clone for Connection<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            config: Arc::clone(&self.config),
            observer: self.observer.clone(),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<S> std::fmt::Debug for Connection<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Resolves once shutdown is requested, never without a signal.
async fn shutdown_signal(signal: Option<watch::Receiver<bool>>) {
    match signal {
        Some(mut signal) => {
            let _ = signal.wait_for(|stop| *stop).await;
        }
        None => std::future::pending().await,
    }
}

/// Resolves once the peer is gone.
///
/// Bytes received meanwhile are kept in `buffer` for the next request. `read_buf` is cancel
/// safe, so dropping this future loses nothing.
async fn hangup<R>(io: &mut R, buffer: &mut BytesMut, half_close: bool, _conn: ConnectionInfo)
where
    R: AsyncRead + Unpin,
{
    while buffer.len() < MAX_PIPELINED {
        match io.read_buf(buffer).await {
            Ok(0) if half_close => break,
            Ok(0) => {
                debug!("{} hung up during response", _conn.peer);
                return;
            }
            Ok(_) => {}
            Err(_err) => {
                debug!("failed to read from {}: {_err}", _conn.peer);
                return;
            }
        }
    }
    std::future::pending().await
}
