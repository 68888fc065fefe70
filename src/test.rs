use bytes::{Bytes, BytesMut};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::sync::{oneshot, watch};

use crate::body::{Body, BoxBody, Full, from_fragments};
use crate::config::Config;
use crate::error::BoxError;
use crate::headers::HeaderSet;
use crate::http::{Response, Version};
use crate::proto::{CONTINUE, ConnectionInfo, ParseError, RequestContext};
use crate::request::RequestParser;
use crate::rt::Connection;
use crate::service::from_fn;

/// Minimal parser, request body is framed by `Content-Length` only.
///
/// An incomplete head consumes nothing and is parsed again once more bytes arrive.
#[derive(Debug, Default)]
pub(crate) struct LineParser {
    method: String,
    path: String,
    query: String,
    url: String,
    version: Version,
    headers: HeaderSet,
    head: bool,
    remaining: usize,
    body: BytesMut,
}

impl LineParser {
    /// Parse a complete request.
    pub(crate) fn parse(bytes: &[u8]) -> Self {
        let mut parser = Self::default();
        let consumed = parser.feed(bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert!(parser.message_complete());
        parser
    }
}

impl RequestParser for LineParser {
    fn feed(&mut self, bytes: &[u8]) -> Result<usize, ParseError> {
        let mut consumed = 0;

        if !self.head {
            let Some(end) = bytes.windows(4).position(|e| e == b"\r\n\r\n") else {
                return Ok(0);
            };
            let head = std::str::from_utf8(&bytes[..end]).map_err(|_| ParseError::InvalidRequestLine)?;
            let mut lines = head.split("\r\n");

            let mut line = lines.next().unwrap_or_default().split(' ');
            let (Some(method), Some(url), Some(version), None) =
                (line.next(), line.next(), line.next(), line.next())
            else {
                return Err(ParseError::InvalidRequestLine);
            };
            self.version = Version::parse(version).ok_or(ParseError::UnsupportedVersion)?;
            self.method = method.to_owned();
            self.url = url.to_owned();
            let (path, query) = url.split_once('?').unwrap_or((url, ""));
            self.path = path.to_owned();
            self.query = query.to_owned();

            for line in lines {
                let (name, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;
                self.headers.try_add(name, value.trim())?;
            }
            self.remaining = match self.headers.get("content-length") {
                Some(len) => len.as_str().parse().map_err(|_| ParseError::InvalidHeader)?,
                None => 0,
            };
            self.head = true;
            consumed = end + 4;
        }

        let take = self.remaining.min(bytes.len() - consumed);
        self.body.extend_from_slice(&bytes[consumed..consumed + take]);
        self.remaining -= take;
        Ok(consumed + take)
    }

    fn headers_complete(&self) -> bool {
        self.head
    }

    fn message_complete(&self) -> bool {
        self.head && self.remaining == 0
    }

    fn version(&self) -> Version {
        self.version
    }

    fn method(&self) -> &str {
        &self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn query_string(&self) -> &str {
        &self.query
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    fn body_bytes(&self) -> Bytes {
        self.body.clone().freeze()
    }
}

pub(crate) fn conn_info() -> ConnectionInfo {
    let peer: SocketAddr = "192.0.2.7:50000".parse().unwrap();
    let local: SocketAddr = "127.0.0.1:8080".parse().unwrap();
    ConnectionInfo::new(peer, local)
}

async fn echo_path(req: RequestContext) -> Result<Response, BoxError> {
    Ok(Response::new(BoxBody::new(from_fragments([req.path().to_owned()]))))
}

/// Connection that keeps responding after the client shut down its write half.
fn half_close<S>(service: S) -> Connection<S> {
    Connection::new(service).with_config(Arc::new(Config::new().half_close(true)))
}

/// Write `request`, close the write half, and read everything the server sends.
async fn client(mut io: DuplexStream, request: &[u8]) -> Vec<u8> {
    io.write_all(request).await.unwrap();
    io.shutdown().await.unwrap();
    let mut out = vec![];
    io.read_to_end(&mut out).await.unwrap();
    out
}

#[tokio::test]
async fn pipelined_keep_alive() {
    let (client_io, server_io) = tokio::io::duplex(4096);
    let connection = half_close(from_fn(echo_path));

    let (result, out) = tokio::join!(
        connection.serve::<_, LineParser>(server_io, conn_info()),
        client(client_io, b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\nHost: x\r\n\r\n"),
    );

    assert!(result.is_ok());
    let one = "HTTP/1.1 200 OK\r\nConnection: keep-alive\r\nTransfer-Encoding: chunked\r\n\
        Content-Type: text/plain\r\n\r\n2\r\n/a\r\n0\r\n\r\n";
    let two = "HTTP/1.1 200 OK\r\nConnection: keep-alive\r\nTransfer-Encoding: chunked\r\n\
        Content-Type: text/plain\r\n\r\n2\r\n/b\r\n0\r\n\r\n";
    assert_eq!(String::from_utf8(out).unwrap(), format!("{one}{two}"));
}

#[tokio::test]
async fn connection_close_ends_exchange() {
    let (mut client_io, server_io) = tokio::io::duplex(4096);
    let connection = Connection::new(from_fn(echo_path));

    // the client never closes its write half, the server must
    let (result, out) = tokio::join!(
        connection.serve::<_, LineParser>(server_io, conn_info()),
        async {
            client_io
                .write_all(b"GET /e HTTP/1.1\r\nConnection: close\r\n\r\n")
                .await
                .unwrap();
            let mut out = vec![];
            client_io.read_to_end(&mut out).await.unwrap();
            out
        },
    );

    assert!(result.is_ok());
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "HTTP/1.1 200 OK\r\nConnection: close\r\nTransfer-Encoding: chunked\r\n\
        Content-Type: text/plain\r\n\r\n2\r\n/e\r\n0\r\n\r\n"
    );
}

#[tokio::test]
async fn http10_body_delimited_by_close() {
    let (client_io, server_io) = tokio::io::duplex(4096);
    let connection = half_close(from_fn(echo_path));

    let (result, out) = tokio::join!(
        connection.serve::<_, LineParser>(server_io, conn_info()),
        client(client_io, b"GET /x HTTP/1.0\r\nConnection: keep-alive\r\n\r\nGET /y HTTP/1.0\r\n\r\n"),
    );

    assert!(result.is_ok());
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "HTTP/1.0 200 OK\r\nConnection: close\r\nContent-Type: text/plain\r\n\r\n/x"
    );
}

#[tokio::test]
async fn http10_keep_alive_with_length() {
    let (client_io, server_io) = tokio::io::duplex(4096);
    let connection = half_close(from_fn(|req: RequestContext| async move {
        let path = req.path().to_owned();
        let len = path.len() as u64;
        Ok::<_, BoxError>(Response::full(path).with_content_length(len))
    }));

    let (result, out) = tokio::join!(
        connection.serve::<_, LineParser>(server_io, conn_info()),
        client(client_io, b"GET /x HTTP/1.0\r\nConnection: keep-alive\r\n\r\nGET /y HTTP/1.0\r\n\r\n"),
    );

    assert!(result.is_ok());
    let one = "HTTP/1.0 200 OK\r\nContent-Length: 2\r\nConnection: keep-alive\r\n\
        Content-Type: text/plain\r\n\r\n/x";
    let two = "HTTP/1.0 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\
        Content-Type: text/plain\r\n\r\n/y";
    assert_eq!(String::from_utf8(out).unwrap(), format!("{one}{two}"));
}

#[tokio::test]
async fn expect_continue() {
    let (mut client_io, server_io) = tokio::io::duplex(4096);
    let connection = half_close(from_fn(|req: RequestContext| async move {
        Ok::<_, BoxError>(Response::full(req.body().clone()))
    }));

    let (result, (interim, out)) = tokio::join!(
        connection.serve::<_, LineParser>(server_io, conn_info()),
        async {
            client_io
                .write_all(b"POST /up HTTP/1.1\r\nExpect: 100-continue\r\nContent-Length: 4\r\n\r\n")
                .await
                .unwrap();

            let mut interim = [0; CONTINUE.len()];
            client_io.read_exact(&mut interim).await.unwrap();

            client_io.write_all(b"data").await.unwrap();
            client_io.shutdown().await.unwrap();
            let mut out = vec![];
            client_io.read_to_end(&mut out).await.unwrap();
            (interim, out)
        },
    );

    assert!(result.is_ok());
    assert_eq!(&interim[..], CONTINUE);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "HTTP/1.1 200 OK\r\nConnection: keep-alive\r\nTransfer-Encoding: chunked\r\n\
        Content-Type: text/plain\r\n\r\n4\r\ndata\r\n0\r\n\r\n"
    );
}

#[tokio::test]
async fn no_continue_when_body_received() {
    let (client_io, server_io) = tokio::io::duplex(4096);
    let connection = half_close(from_fn(|req: RequestContext| async move {
        Ok::<_, BoxError>(Response::full(req.body().clone()))
    }));

    let (result, out) = tokio::join!(
        connection.serve::<_, LineParser>(server_io, conn_info()),
        client(
            client_io,
            b"POST / HTTP/1.1\r\nExpect: 100-continue\r\nContent-Length: 2\r\n\r\nok"
        ),
    );

    assert!(result.is_ok());
    let out = String::from_utf8(out).unwrap();
    assert!(out.starts_with("HTTP/1.1 200 OK\r\n"), "{out}");
    assert!(out.ends_with("2\r\nok\r\n0\r\n\r\n"), "{out}");
}

#[tokio::test]
async fn malformed_request_closes_silently() {
    let (client_io, server_io) = tokio::io::duplex(4096);
    let connection = Connection::new(from_fn(echo_path));

    let (result, out) = tokio::join!(
        connection.serve::<_, LineParser>(server_io, conn_info()),
        client(client_io, b"BROKEN\r\n\r\n"),
    );

    let err = result.unwrap_err();
    assert_eq!(
        err.downcast_ref::<ParseError>(),
        Some(&ParseError::InvalidRequestLine)
    );
    assert!(out.is_empty());
}

#[tokio::test]
async fn application_error_substituted() {
    let (client_io, server_io) = tokio::io::duplex(4096);
    let connection = half_close(from_fn(|_: RequestContext| async move {
        Err::<Response<Full>, BoxError>("database unavailable".into())
    }));

    let (result, out) = tokio::join!(
        connection.serve::<_, LineParser>(server_io, conn_info()),
        client(client_io, b"GET / HTTP/1.1\r\n\r\nGET /never HTTP/1.1\r\n\r\n"),
    );

    assert!(result.is_ok());
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 25\r\nConnection: close\r\n\
        Content-Type: text/plain\r\n\r\n500 Internal Server Error"
    );
}

#[tokio::test]
async fn shutdown_aborts_pending_response() {
    let (client_io, server_io) = tokio::io::duplex(4096);
    let (tx, rx) = watch::channel(false);
    let connection = Connection::new(from_fn(|_: RequestContext| {
        std::future::pending::<Result<Response<Full>, BoxError>>()
    }))
    .with_shutdown(rx);

    let (result, out) = tokio::join!(
        connection.serve::<_, LineParser>(server_io, conn_info()),
        async {
            let mut client_io = client_io;
            client_io.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
            tokio::task::yield_now().await;
            tx.send(true).unwrap();
            let mut out = vec![];
            client_io.read_to_end(&mut out).await.unwrap();
            out
        },
    );

    assert!(result.is_ok());
    assert!(out.is_empty());
}

/// Never yields a fragment, signals when first polled.
struct Hang(Option<oneshot::Sender<()>>);

impl Body for Hang {
    type Error = Infallible;

    fn poll_data(
        self: Pin<&mut Self>,
        _: &mut Context,
    ) -> Poll<Option<Result<Bytes, Self::Error>>> {
        if let Some(polled) = self.get_mut().0.take() {
            let _ = polled.send(());
        }
        Poll::Pending
    }
}

#[tokio::test]
async fn peer_hangup_abandons_response() {
    let closed = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = oneshot::channel();
    let polled = Mutex::new(Some(tx));
    let connection = Connection::new(from_fn({
        let closed = Arc::clone(&closed);
        move |_: RequestContext| {
            let closed = Arc::clone(&closed);
            let body = Hang(polled.lock().unwrap().take()).on_close(move || {
                closed.fetch_add(1, Ordering::SeqCst);
            });
            async move { Ok::<_, BoxError>(Response::new(body)) }
        }
    }));

    let (mut client_io, server_io) = tokio::io::duplex(4096);
    let serve = connection.serve::<_, LineParser>(server_io, conn_info());
    let client = async move {
        client_io.write_all(b"GET /a HTTP/1.1\r\n\r\n").await.unwrap();
        rx.await.unwrap();
        drop(client_io);
    };

    let (result, ()) = tokio::time::timeout(Duration::from_secs(5), async { tokio::join!(serve, client) })
        .await
        .expect("connection is still serving after the peer left");

    assert!(result.is_ok());
    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

#[test]
fn line_parser_reparses_partial_head() {
    let mut parser = LineParser::default();
    assert_eq!(parser.feed(b"GET /a?q=1 HTTP/1.1\r\nHost: x").unwrap(), 0);
    assert!(!parser.headers_complete());

    let parser = LineParser::parse(b"GET /a?q=1 HTTP/1.1\r\nHost: x\r\n\r\n");
    assert_eq!(parser.path(), "/a");
    assert_eq!(parser.query_string(), "q=1");
    assert_eq!(parser.url(), "/a?q=1");
    assert_eq!(parser.headers().get("host").unwrap(), "x");
}
