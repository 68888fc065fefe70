use bytes::Bytes;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};

use crate::config::Config;
use crate::headers::standard::{CONTENT_LENGTH, CONTENT_TYPE, HOST, X_FORWARDED_FOR};
use crate::headers::{HeaderSet, HeaderValue};
use crate::http::Version;
use crate::log::debug;
use crate::request::RequestParser;

/// Request header overriding the configured mount prefix.
const SCRIPT_NAME: &str = "script_name";

// ===== Connection =====

/// Transport level addresses of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub peer: SocketAddr,
    pub local: SocketAddr,
}

impl ConnectionInfo {
    #[inline]
    pub const fn new(peer: SocketAddr, local: SocketAddr) -> Self {
        Self { peer, local }
    }
}

/// URL scheme the request was received with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    pub const fn default_port(&self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host and port pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addr {
    pub host: String,
    pub port: u16,
}

impl Addr {
    fn from_socket(addr: SocketAddr) -> Self {
        Self {
            host: addr.ip().to_string(),
            port: addr.port(),
        }
    }
}

impl std::fmt::Display for Addr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

// ===== Context =====

/// Parsed request with its connection metadata, handed to the application.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: String,
    path: String,
    query_string: String,
    raw_uri: String,
    version: Version,
    headers: HeaderSet,
    body: Bytes,
    remote: Addr,
    server: Addr,
    scheme: Scheme,
    script_name: String,
    content_type: Option<HeaderValue>,
    content_length: Option<u64>,
}

impl RequestContext {
    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns `true` for `HEAD` request, which response never carry a body.
    #[inline]
    pub fn is_head(&self) -> bool {
        self.method.eq_ignore_ascii_case("HEAD")
    }

    /// Percent decoded path with the script name stripped.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Request target as received.
    #[inline]
    pub fn raw_uri(&self) -> &str {
        &self.raw_uri
    }

    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Protocol string, e.g. `HTTP/1.1`.
    #[inline]
    pub fn server_protocol(&self) -> &'static str {
        self.version.as_str()
    }

    #[inline]
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// The request message body.
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Take the request message body, leaving it empty.
    #[inline]
    pub fn take_body(&mut self) -> Bytes {
        std::mem::take(&mut self.body)
    }

    /// Client address, the last `X-Forwarded-For` hop when trusted.
    #[inline]
    pub fn remote_addr(&self) -> &Addr {
        &self.remote
    }

    /// Server name and port, from `Host` when present.
    #[inline]
    pub fn server_addr(&self) -> &Addr {
        &self.server
    }

    #[inline]
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    #[inline]
    pub fn script_name(&self) -> &str {
        &self.script_name
    }

    #[inline]
    pub fn content_type(&self) -> Option<&HeaderValue> {
        self.content_type.as_ref()
    }

    #[inline]
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }
}

// ===== Builder =====

/// Builds [`RequestContext`] from a parsed request and connection addresses.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentBuilder<'a> {
    config: &'a Config,
}

impl<'a> EnvironmentBuilder<'a> {
    #[inline]
    pub const fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Build request context.
    ///
    /// Malformed forwarding or `Host` headers never fail, the transport addresses are used
    /// instead.
    pub fn build<P>(&self, parser: &P, conn: &ConnectionInfo) -> RequestContext
    where
        P: RequestParser + ?Sized,
    {
        let headers = parser.headers().clone();
        let scheme = self.scheme(&headers);
        let remote = self.remote_addr(&headers, conn);
        let server = server_addr(&headers, scheme, conn);

        let script_name = match headers.get(SCRIPT_NAME) {
            Some(value) => value.as_str().trim_end_matches('/').to_owned(),
            None => self.config.script_name.clone(),
        };
        let path = decode_path(strip_script_name(parser.path(), &script_name));

        let content_type = headers.get(CONTENT_TYPE).cloned();
        let content_length = headers.get(CONTENT_LENGTH).and_then(|value| {
            let len = value.as_str().trim().parse().ok();
            if len.is_none() {
                debug!("ignoring invalid request content-length: {value:?}");
            }
            len
        });

        RequestContext {
            method: parser.method().to_owned(),
            path,
            query_string: parser.query_string().to_owned(),
            raw_uri: parser.url().to_owned(),
            version: parser.version(),
            body: parser.body_bytes(),
            headers,
            remote,
            server,
            scheme,
            script_name,
            content_type,
            content_length,
        }
    }

    fn scheme(&self, headers: &HeaderSet) -> Scheme {
        let trusted = self.config.trusted_forwarding_headers.iter().any(|(name, expected)| {
            headers
                .get_all(name.as_str())
                .any(|value| value.as_str().trim() == expected.as_str())
        });
        if trusted { Scheme::Https } else { Scheme::Http }
    }

    fn remote_addr(&self, headers: &HeaderSet, conn: &ConnectionInfo) -> Addr {
        if self.config.forwarded_for {
            if let Some(forwarded) = headers.get_all(X_FORWARDED_FOR).last() {
                // only the last hop is appended by a proxy we talk to directly
                let hop = forwarded.as_str().rsplit(',').next().unwrap_or_default().trim();
                match parse_hop(hop) {
                    Some(addr) => return addr,
                    None => {
                        debug!("ignoring malformed x-forwarded-for: {forwarded:?}");
                    }
                }
            }
        }
        Addr::from_socket(conn.peer)
    }
}

/// Parse `X-Forwarded-For` entry, port defaults to 80.
fn parse_hop(hop: &str) -> Option<Addr> {
    const DEFAULT_PORT: u16 = 80;

    if hop.is_empty() {
        return None;
    }
    if let Ok(addr) = hop.parse::<SocketAddr>() {
        return Some(Addr::from_socket(addr));
    }
    if let Ok(ip) = hop.parse::<IpAddr>() {
        return Some(Addr { host: ip.to_string(), port: DEFAULT_PORT });
    }
    if let Some(ip) = hop.strip_prefix('[').and_then(|e| e.strip_suffix(']')) {
        let ip = ip.parse::<Ipv6Addr>().ok()?;
        return Some(Addr { host: ip.to_string(), port: DEFAULT_PORT });
    }

    let (host, port) = match hop.split_once(':') {
        Some((host, port)) => (host, port.parse().ok()?),
        None => (hop, DEFAULT_PORT),
    };
    is_hostname(host).then(|| Addr { host: host.to_owned(), port })
}

/// Server address from `Host`, port defaults by scheme.
fn server_addr(headers: &HeaderSet, scheme: Scheme, conn: &ConnectionInfo) -> Addr {
    let Some(host) = headers.get(HOST) else {
        return Addr::from_socket(conn.local);
    };
    let host = host.as_str().trim();

    let (name, port) = if let Some(rest) = host.strip_prefix('[') {
        match rest.split_once(']') {
            Some((ip, port)) => (ip, port.strip_prefix(':')),
            None => ("", None),
        }
    } else {
        match host.rsplit_once(':') {
            Some((name, port)) => (name, Some(port)),
            None => (host, None),
        }
    };

    let port = match port {
        None | Some("") => Some(scheme.default_port()),
        Some(port) => port.parse().ok(),
    };

    match port {
        Some(port) if !name.is_empty() => Addr { host: name.to_owned(), port },
        _ => {
            debug!("ignoring malformed host: {host:?}");
            Addr::from_socket(conn.local)
        }
    }
}

fn is_hostname(host: &str) -> bool {
    !host.is_empty()
        && host
            .bytes()
            .all(|e| e.is_ascii_alphanumeric() || matches!(e, b'.' | b'-' | b'_'))
}

/// Strip mount prefix at a segment boundary, the path is left as is if it is not mounted.
fn strip_script_name<'a>(path: &'a str, script_name: &str) -> &'a str {
    if script_name.is_empty() {
        return path;
    }
    match path.strip_prefix(script_name) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}

fn decode_path(path: &str) -> String {
    percent_encoding::percent_decode_str(path)
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hop() {
        let addr = |host: &str, port| Some(Addr { host: host.into(), port });

        assert_eq!(parse_hop("10.0.0.1"), addr("10.0.0.1", 80));
        assert_eq!(parse_hop("10.0.0.1:8000"), addr("10.0.0.1", 8000));
        assert_eq!(parse_hop("2001:db8::1"), addr("2001:db8::1", 80));
        assert_eq!(parse_hop("[2001:db8::1]:443"), addr("2001:db8::1", 443));
        assert_eq!(parse_hop("[::1]"), addr("::1", 80));
        assert_eq!(parse_hop("proxy.local"), addr("proxy.local", 80));
        assert_eq!(parse_hop(""), None);
        assert_eq!(parse_hop("10.0.0.1:http"), None);
        assert_eq!(parse_hop("bad host"), None);
    }

    #[test]
    fn test_strip_script_name() {
        assert_eq!(strip_script_name("/app/users", "/app"), "/users");
        assert_eq!(strip_script_name("/app", "/app"), "");
        assert_eq!(strip_script_name("/application", "/app"), "/application");
        assert_eq!(strip_script_name("/users", ""), "/users");
        assert_eq!(decode_path("/a%20b/%E2%9C%93"), "/a b/\u{2713}");
    }
}
