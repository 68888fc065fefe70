use crate::body::BodyError;
use crate::headers::HeaderError;

// ===== Parsing Error =====

/// Malformed request bytes reported by a [`RequestParser`][crate::request::RequestParser].
///
/// The connection is closed immediately without a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Request line or header section is too long.
    TooLong,
    /// Invalid request line.
    InvalidRequestLine,
    /// Unsupported version.
    UnsupportedVersion,
    /// Invalid header field.
    InvalidHeader,
    /// Invalid message body framing.
    InvalidBody,
}

impl std::error::Error for ParseError {}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::TooLong => f.write_str("request head too long"),
            Self::InvalidRequestLine => f.write_str("invalid request line"),
            Self::UnsupportedVersion => f.write_str("unsupported version"),
            Self::InvalidHeader => f.write_str("invalid header"),
            Self::InvalidBody => f.write_str("invalid message body"),
        }
    }
}

impl From<HeaderError> for ParseError {
    #[inline]
    fn from(_: HeaderError) -> Self {
        Self::InvalidHeader
    }
}

// ===== Protocol Error =====

/// Response protocol error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtoError {
    /// Status and headers set twice without error substitution.
    AlreadyStarted,
    /// Header block requested before status and headers were set.
    HeadersNotSet,
    /// Error substitution after the header block was written.
    HeadersSent,
    /// Invalid `Content-Length` set by the application.
    InvalidContentLength,
    /// Body does not match its framing.
    Body(BodyError),
}

impl ProtoError {
    /// Returns `true` if the error cannot be answered with a substitute response.
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::AlreadyStarted | Self::HeadersNotSet | Self::HeadersSent => true,
            Self::InvalidContentLength => false,
            Self::Body(_) => true,
        }
    }
}

impl std::error::Error for ProtoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Body(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProtoError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::AlreadyStarted => f.write_str("response headers already set"),
            Self::HeadersNotSet => f.write_str("response headers not set"),
            Self::HeadersSent => f.write_str("response headers already sent"),
            Self::InvalidContentLength => f.write_str("invalid content length"),
            Self::Body(err) => write!(f, "body error: {err}"),
        }
    }
}

impl From<BodyError> for ProtoError {
    #[inline]
    fn from(value: BodyError) -> Self {
        Self::Body(value)
    }
}
