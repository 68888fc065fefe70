//! Transfer coding and connection reuse decisions.
use crate::headers::HeaderValue;
use crate::http::{StatusCode, Version};

/// Response body transfer decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    /// Use chunked transfer coding.
    pub chunked: bool,
    /// Response is allowed to carry a body.
    pub body: bool,
}

/// Decide response transfer coding.
///
/// - never chunked for `HTTP/1.0` and below
/// - never chunked for `1xx`, `204` and `304` responses, which have no body
/// - chunked if the application declared `Transfer-Encoding: chunked`
/// - otherwise chunked exactly when there is no `Content-Length`
pub fn decide(
    version: Version,
    status: StatusCode,
    declared_length: Option<u64>,
    chunked_declared: bool,
) -> Transfer {
    let body = !status.has_empty_body();
    let chunked = version.supports_chunked()
        && body
        && (chunked_declared || declared_length.is_none());
    Transfer { chunked, body }
}

/// Outgoing `Connection` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOption {
    Close,
    KeepAlive,
    Upgrade,
}

impl ConnectionOption {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::KeepAlive => "keep-alive",
            Self::Upgrade => "Upgrade",
        }
    }

    pub const fn header_value(&self) -> HeaderValue {
        HeaderValue::from_static(self.as_str())
    }
}

/// Connection reuse decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlive {
    pub keep_alive: bool,
    pub connection: ConnectionOption,
}

impl KeepAlive {
    /// Connection is closed after the response.
    pub const CLOSE: Self = Self {
        keep_alive: false,
        connection: ConnectionOption::Close,
    };

    /// Disable reuse, keeps nothing of the previous decision.
    #[inline]
    pub fn disable(&mut self) {
        *self = Self::CLOSE;
    }
}

/// Decide connection reuse from request `Connection` tokens, first matching rule wins:
///
/// 1. `close` token, closed
/// 2. `upgrade` token, kept with `Connection: Upgrade`
/// 3. `keep-alive` token, kept
/// 4. `HTTP/1.1`, kept
/// 5. otherwise closed
pub fn decide_keep_alive<'a, I>(version: Version, tokens: I) -> KeepAlive
where
    I: IntoIterator<Item = &'a str>,
{
    let mut upgrade = false;
    let mut keep_alive = false;

    for token in tokens {
        if token.eq_ignore_ascii_case("close") {
            return KeepAlive::CLOSE;
        }
        upgrade |= token.eq_ignore_ascii_case("upgrade");
        keep_alive |= token.eq_ignore_ascii_case("keep-alive");
    }

    let connection = if upgrade {
        ConnectionOption::Upgrade
    } else if keep_alive || version.is_persistent_by_default() {
        ConnectionOption::KeepAlive
    } else {
        return KeepAlive::CLOSE;
    };

    KeepAlive { keep_alive: true, connection }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunked_decision() {
        let v11 = Version::HTTP_11;
        let v10 = Version::HTTP_10;
        let ok = StatusCode::OK;

        assert!(decide(v11, ok, None, false).chunked);
        assert!(!decide(v11, ok, Some(12), false).chunked);
        assert!(decide(v11, ok, Some(12), true).chunked);
        assert!(!decide(v10, ok, None, false).chunked);
        assert!(!decide(v10, ok, None, true).chunked);

        for status in [StatusCode::NO_CONTENT, StatusCode::NOT_MODIFIED, StatusCode::CONTINUE] {
            let transfer = decide(v11, status, None, true);
            assert!(!transfer.chunked);
            assert!(!transfer.body);
        }
    }

    #[test]
    fn test_keep_alive_table() {
        let v11 = Version::HTTP_11;
        let v10 = Version::HTTP_10;

        assert_eq!(decide_keep_alive(v11, ["close"]), KeepAlive::CLOSE);
        assert_eq!(decide_keep_alive(v11, ["keep-alive", "Close"]), KeepAlive::CLOSE);
        assert_eq!(
            decide_keep_alive(v11, ["Upgrade"]).connection,
            ConnectionOption::Upgrade
        );
        assert!(decide_keep_alive(v10, ["upgrade"]).keep_alive);

        let ka = decide_keep_alive(v10, ["Keep-Alive"]);
        assert!(ka.keep_alive);
        assert_eq!(ka.connection, ConnectionOption::KeepAlive);

        let ka = decide_keep_alive(v11, []);
        assert!(ka.keep_alive);
        assert_eq!(ka.connection.as_str(), "keep-alive");

        assert_eq!(decide_keep_alive(v10, []), KeepAlive::CLOSE);
        assert_eq!(decide_keep_alive(Version::HTTP_09, []), KeepAlive::CLOSE);
    }
}
