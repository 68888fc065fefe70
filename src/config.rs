//! Engine configuration.

/// Default upper bound of a single chunk payload.
pub const MAX_CHUNK_SIZE: usize = 65536;

/// Response engine configuration.
///
/// Shared by every connection of a server, usually behind an [`Arc`][std::sync::Arc].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// `Content-Type` of responses with a body that did not set one.
    pub default_content_type: String,
    /// Header name and value pairs that mark a request as received over `https`.
    ///
    /// Names are compared case-insensitively, values exactly after trimming.
    pub trusted_forwarding_headers: Vec<(String, String)>,
    /// Upper bound of a single chunk payload, larger fragments are split.
    pub max_chunk_size: usize,
    /// Use the last hop of `X-Forwarded-For` as the remote address.
    pub forwarded_for: bool,
    /// Mount prefix stripped from request paths.
    pub script_name: String,
    /// Value of the `Server` header, none is written if `None`.
    pub server_software: Option<String>,
    /// Write the `Date` header.
    pub date_header: bool,
    /// Keep writing the response after the peer shut down its write side.
    ///
    /// When disabled, end of input while a response is in flight is a hangup and the response
    /// is abandoned.
    pub half_close: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_content_type: "text/plain".into(),
            trusted_forwarding_headers: vec![
                ("X-Forwarded-Protocol".into(), "ssl".into()),
                ("X-Forwarded-Proto".into(), "https".into()),
                ("X-Forwarded-Ssl".into(), "on".into()),
            ],
            max_chunk_size: MAX_CHUNK_SIZE,
            forwarded_for: true,
            script_name: String::new(),
            server_software: None,
            date_header: false,
            half_close: false,
        }
    }
}

impl Config {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.default_content_type = content_type.into();
        self
    }

    /// Add trusted forwarding header name and value pair.
    pub fn trust_forwarding_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.trusted_forwarding_headers.push((name.into(), value.into()));
        self
    }

    pub fn max_chunk_size(mut self, size: usize) -> Self {
        self.max_chunk_size = size;
        self
    }

    pub fn forwarded_for(mut self, enabled: bool) -> Self {
        self.forwarded_for = enabled;
        self
    }

    /// Set mount prefix, trailing slashes are ignored.
    pub fn script_name(mut self, script_name: impl Into<String>) -> Self {
        let mut script_name = script_name.into();
        while script_name.ends_with('/') {
            script_name.pop();
        }
        self.script_name = script_name;
        self
    }

    pub fn server_software(mut self, server: impl Into<String>) -> Self {
        self.server_software = Some(server.into());
        self
    }

    pub fn date_header(mut self, enabled: bool) -> Self {
        self.date_header = enabled;
        self
    }

    pub fn half_close(mut self, enabled: bool) -> Self {
        self.half_close = enabled;
        self
    }
}
