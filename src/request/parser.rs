use bytes::Bytes;

use crate::headers::HeaderSet;
use crate::http::Version;
use crate::proto::ParseError;

/// Incremental HTTP/1.x request parser.
///
/// The engine never parses requests itself, it feeds transport bytes into an implementation of
/// this trait and reads the parsed message back once [`headers_complete`] returns `true`.
///
/// A parser instance handles exactly one request. For every following request on a keep-alive
/// connection a fresh parser is created with [`Default`].
///
/// [`headers_complete`]: RequestParser::headers_complete
pub trait RequestParser {
    /// Feed bytes into the parser, returns the number of bytes consumed.
    ///
    /// Every byte must be consumed until the message is complete. Bytes after the end of the
    /// message are left unconsumed and belong to the next pipelined request.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not a valid request.
    fn feed(&mut self, bytes: &[u8]) -> Result<usize, ParseError>;

    /// Returns `true` once the request line and header section are parsed.
    fn headers_complete(&self) -> bool;

    /// Returns `true` once the entire message, body included, is parsed.
    fn message_complete(&self) -> bool;

    /// Request version, only meaningful after headers are complete.
    fn version(&self) -> Version;

    fn method(&self) -> &str;

    /// Percent encoded request path, without query.
    fn path(&self) -> &str;

    /// Query string without the leading `?`, empty if none.
    fn query_string(&self) -> &str;

    /// Request target exactly as received.
    fn url(&self) -> &str;

    fn headers(&self) -> &HeaderSet;

    /// Message body received so far, with any transfer coding removed.
    fn body_bytes(&self) -> Bytes;
}
