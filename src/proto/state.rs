use bytes::Bytes;

use crate::body::BodyCoder;
use crate::config::Config;
use crate::headers::standard::{
    CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, DATE, EXPECT, SERVER, TRANSFER_ENCODING, UPGRADE,
};
use crate::headers::{HeaderSet, HeaderValue};
use crate::http::{StatusCode, Version, date_header_value};
use crate::log::warning;
use crate::proto::environ::RequestContext;
use crate::proto::error::ProtoError;
use crate::proto::policy::{self, ConnectionOption, KeepAlive};

/// Interim response written before the request body is read.
pub const CONTINUE: &[u8] = b"HTTP/1.1 100 Continue\r\n\r\n";

/// Status and header bookkeeping of a single response.
///
/// Status is set at most once, unless an error response is substituted before the header block
/// is sent. Once the header block is finalized nothing can be changed anymore.
#[derive(Debug)]
pub struct ResponseState {
    version: Version,
    head: bool,
    keep_alive: KeepAlive,
    upgrade: Option<HeaderValue>,
    status: Option<StatusCode>,
    headers: HeaderSet,
    chunked_declared: bool,
    headers_sent: bool,
}

impl ResponseState {
    /// Create state with an explicit connection reuse decision.
    pub fn new(version: Version, keep_alive: KeepAlive) -> Self {
        Self {
            version,
            head: false,
            keep_alive,
            upgrade: None,
            status: None,
            headers: HeaderSet::new(),
            chunked_declared: false,
            headers_sent: false,
        }
    }

    /// Create state for a request, deciding connection reuse from its `Connection` header.
    pub fn from_request(request: &RequestContext) -> Self {
        let headers = request.headers();
        let keep_alive = policy::decide_keep_alive(
            request.version(),
            headers.get_all(CONNECTION).flat_map(HeaderValue::tokens),
        );

        let mut state = Self::new(request.version(), keep_alive);
        state.head = request.is_head();
        if keep_alive.connection == ConnectionOption::Upgrade {
            state.upgrade = headers.get(UPGRADE).cloned();
        }
        state
    }

    /// Response to a `HEAD` request, body is never written.
    #[inline]
    pub fn with_head(mut self, head: bool) -> Self {
        self.head = head;
        self
    }

    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    #[inline]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    #[inline]
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    #[inline]
    pub fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    /// Returns `true` if the connection can be reused after this response.
    #[inline]
    pub fn keep_alive(&self) -> bool {
        self.keep_alive.keep_alive
    }

    #[inline]
    pub fn connection(&self) -> ConnectionOption {
        self.keep_alive.connection
    }

    /// Returns `true` for protocol upgrade, which header block is flushed without body.
    #[inline]
    pub fn is_upgrade(&self) -> bool {
        self.keep_alive.keep_alive && self.keep_alive.connection == ConnectionOption::Upgrade
    }

    /// Close the connection after this response.
    ///
    /// Has no effect on the wire if the header block is already sent.
    #[inline]
    pub fn disable_keep_alive(&mut self) {
        self.keep_alive.disable();
    }

    /// Set response status and headers.
    ///
    /// Connection management headers are dropped with a warning, `Transfer-Encoding: chunked`
    /// is remembered to force chunked coding.
    ///
    /// # Errors
    ///
    /// - [`AlreadyStarted`][ProtoError::AlreadyStarted] if status is already set and this is
    ///   not a `substitute`
    /// - [`HeadersSent`][ProtoError::HeadersSent] for a `substitute` after the header block is
    ///   sent
    pub fn set_status_and_headers(
        &mut self,
        status: StatusCode,
        headers: HeaderSet,
        substitute: bool,
    ) -> Result<(), ProtoError> {
        if substitute {
            if self.headers_sent {
                return Err(ProtoError::HeadersSent);
            }
            self.headers.clear();
            self.chunked_declared = false;
        } else if self.status.is_some() {
            return Err(ProtoError::AlreadyStarted);
        }

        self.status = Some(status);
        for (name, value) in &headers {
            if name.is_hop_by_hop() {
                if name.eq_ignore_ascii_case(TRANSFER_ENCODING.as_str()) {
                    self.chunked_declared |= value.tokens().any(|e| e.eq_ignore_ascii_case("chunked"));
                }
                warning!("application passing hop header {name:?}");
                continue;
            }
            self.headers.add(name, value.clone());
        }
        Ok(())
    }

    /// Finalize the header block and choose body framing.
    ///
    /// After this call the state is frozen, status cannot be substituted anymore.
    ///
    /// # Errors
    ///
    /// - [`HeadersNotSet`][ProtoError::HeadersNotSet] if status was never set
    /// - [`AlreadyStarted`][ProtoError::AlreadyStarted] if called twice
    /// - [`InvalidContentLength`][ProtoError::InvalidContentLength] if the application set a
    ///   `Content-Length` that is not all digits, or several that disagree, the state is left
    ///   untouched
    pub fn finalize_head(&mut self, config: &Config) -> Result<(Bytes, BodyCoder), ProtoError> {
        let Some(status) = self.status else {
            return Err(ProtoError::HeadersNotSet);
        };
        if self.headers_sent {
            return Err(ProtoError::AlreadyStarted);
        }

        let declared_length = declared_length(&self.headers)?;
        let transfer = policy::decide(self.version, status, declared_length, self.chunked_declared);
        if transfer.body && !transfer.chunked && declared_length.is_none() && !self.head {
            // body is delimited by closing the connection
            self.keep_alive.disable();
        }

        self.headers.set(CONNECTION, self.keep_alive.connection.header_value());
        if self.is_upgrade() {
            if let Some(upgrade) = self.upgrade.clone() {
                self.headers.set(UPGRADE, upgrade);
            }
        }

        if transfer.chunked {
            self.headers.set(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
            self.headers.remove(CONTENT_LENGTH);
        } else {
            self.headers.remove(TRANSFER_ENCODING);
            if let Some(len) = declared_length {
                self.headers.set(CONTENT_LENGTH, HeaderValue::from_u64(len));
            }
        }

        if let Some(server) = &config.server_software {
            if !self.headers.contains(SERVER) {
                match HeaderValue::from_slice(server) {
                    Ok(value) => self.headers.add(SERVER, value),
                    Err(_) => {
                        warning!("invalid server software {server:?}");
                    }
                }
            }
        }
        if config.date_header && !self.headers.contains(DATE) {
            self.headers.add(DATE, date_header_value());
        }
        if transfer.body && !self.headers.contains(CONTENT_TYPE) {
            match HeaderValue::from_slice(&config.default_content_type) {
                Ok(value) => self.headers.add(CONTENT_TYPE, value),
                Err(_) => {
                    warning!("invalid default content type");
                }
            }
        }

        let coder = if self.head || !transfer.body {
            BodyCoder::discard()
        } else if transfer.chunked {
            BodyCoder::chunked(config.max_chunk_size)
        } else {
            BodyCoder::raw(declared_length)
        };

        self.headers_sent = true;
        Ok((self.headers.flatten(self.version, status), coder))
    }
}

// ===== Expect Continue =====

/// `100 Continue` interim response tracker, at most one per request.
#[derive(Debug, Default)]
pub struct ExpectContinue {
    sent: bool,
}

impl ExpectContinue {
    #[inline]
    pub const fn new() -> Self {
        Self { sent: false }
    }

    /// Returns the interim response to write, if the request expects it and its body is not
    /// received yet.
    ///
    /// Returns `None` on every call after the first one that returned the response. `HTTP/1.0`
    /// clients never receive it.
    pub fn check(
        &mut self,
        version: Version,
        headers: &HeaderSet,
        message_complete: bool,
    ) -> Option<Bytes> {
        if self.sent
            || message_complete
            || !version.accepts_interim()
            || !headers.has_token(EXPECT, "100-continue")
        {
            return None;
        }
        self.sent = true;
        Some(Bytes::from_static(CONTINUE))
    }

    #[inline]
    pub fn is_sent(&self) -> bool {
        self.sent
    }
}

/// `Content-Length` set by the application, equal duplicates are one value.
fn declared_length(headers: &HeaderSet) -> Result<Option<u64>, ProtoError> {
    let mut declared = None;
    for value in headers.get_all(CONTENT_LENGTH) {
        let digits = value.as_str().trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProtoError::InvalidContentLength);
        }
        let len = digits.parse::<u64>().map_err(|_| ProtoError::InvalidContentLength)?;
        match declared {
            Some(prev) if prev != len => return Err(ProtoError::InvalidContentLength),
            _ => declared = Some(len),
        }
    }
    Ok(declared)
}
