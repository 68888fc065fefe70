use std::borrow::Cow;

use crate::headers::error::HeaderError;
use crate::headers::matches;

const MAX_HEADER_NAME_LEN: usize = 1 << 8;

/// HTTP Header name.
///
/// # Case Preservation
///
/// Unlike the request side, response header names keep the case they are constructed with, so
/// the wire output is exactly what the application supplied. Comparison is always ASCII
/// case-insensitive.
#[derive(Clone)]
pub struct HeaderName {
    repr: Cow<'static, str>,
}

impl HeaderName {
    /// Parse header name from static string.
    ///
    /// # Panics
    ///
    /// Panics if the input is not a valid header name.
    #[inline]
    pub const fn from_static(name: &'static str) -> Self {
        match validate_header_name(name.as_bytes()) {
            Ok(()) => Self {
                repr: Cow::Borrowed(name),
            },
            Err(err) => err.panic_const(),
        }
    }

    /// Parse header name by copying from slice of bytes.
    ///
    /// # Errors
    ///
    /// Returns error if the input is not a valid header name.
    pub fn from_slice<A: AsRef<[u8]>>(name: A) -> Result<Self, HeaderError> {
        let bytes = name.as_ref();
        validate_header_name(bytes)?;
        // `validate_header_name` only accept ASCII token
        let string = bytes.iter().map(|&b| b as char).collect::<String>();
        Ok(Self {
            repr: Cow::Owned(string),
        })
    }

    /// Extracts a string slice of the header name, in the case it was constructed with.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.repr
    }

    /// Checks that two header name are an ASCII case-insensitive match.
    #[inline]
    pub fn eq_ignore_ascii_case(&self, name: &str) -> bool {
        self.repr.eq_ignore_ascii_case(name)
    }

    /// Returns `true` if this is a hop-by-hop header that only the connection may set.
    #[inline]
    pub fn is_hop_by_hop(&self) -> bool {
        is_hop_by_hop(self.as_str())
    }
}

/// Headers meaningful only for a single transport leg.
///
/// Applications are never allowed to set these, the response generator owns them.
pub const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Returns `true` if `name` is a hop-by-hop header.
pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|hop| hop.eq_ignore_ascii_case(name))
        || name.len() > 6 && name.as_bytes()[..6].eq_ignore_ascii_case(b"proxy-")
}

const fn validate_header_name(mut bytes: &[u8]) -> Result<(), HeaderError> {
    if bytes.is_empty() || bytes.len() > MAX_HEADER_NAME_LEN {
        return Err(HeaderError::invalid_len(bytes.len()));
    }
    while let [byte, rest @ ..] = bytes {
        if !matches::is_token(*byte) {
            return Err(HeaderError::Invalid);
        }
        bytes = rest;
    }
    Ok(())
}

// ===== Traits =====

impl std::fmt::Debug for HeaderName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HeaderName").field(&self.as_str()).finish()
    }
}

impl std::fmt::Display for HeaderName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq for HeaderName {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.eq_ignore_ascii_case(other.as_str())
    }
}

impl Eq for HeaderName {}

impl PartialEq<str> for HeaderName {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.eq_ignore_ascii_case(other)
    }
}

impl PartialEq<&str> for HeaderName {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.eq_ignore_ascii_case(other)
    }
}

impl std::str::FromStr for HeaderName {
    type Err = HeaderError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(s)
    }
}

// ===== Conversion =====

/// A type that can be used to look up a header.
pub trait AsHeaderName {
    fn as_header_str(&self) -> &str;
}

impl AsHeaderName for HeaderName {
    #[inline]
    fn as_header_str(&self) -> &str {
        self.as_str()
    }
}

impl AsHeaderName for &HeaderName {
    #[inline]
    fn as_header_str(&self) -> &str {
        self.as_str()
    }
}

impl AsHeaderName for &str {
    #[inline]
    fn as_header_str(&self) -> &str {
        self
    }
}

impl AsHeaderName for String {
    #[inline]
    fn as_header_str(&self) -> &str {
        self
    }
}

/// A type that can be converted into [`HeaderName`].
///
/// # Panics
///
/// Static string conversion panics when the name is not a valid token.
pub trait IntoHeaderName {
    fn into_header_name(self) -> HeaderName;
}

impl IntoHeaderName for HeaderName {
    #[inline]
    fn into_header_name(self) -> HeaderName {
        self
    }
}

impl IntoHeaderName for &HeaderName {
    #[inline]
    fn into_header_name(self) -> HeaderName {
        self.clone()
    }
}

impl IntoHeaderName for &'static str {
    #[inline]
    fn into_header_name(self) -> HeaderName {
        HeaderName::from_static(self)
    }
}

// ===== Standard =====

/// Standard header names used by the response engine.
pub mod standard {
    use super::HeaderName;

    macro_rules! standard {
        ($($(#[$doc:meta])* $id:ident = $name:literal;)*) => {
            $(
                $(#[$doc])*
                pub const $id: HeaderName = HeaderName::from_static($name);
            )*
        };
    }

    standard! {
        CONNECTION = "Connection";
        CONTENT_LENGTH = "Content-Length";
        CONTENT_TYPE = "Content-Type";
        DATE = "Date";
        EXPECT = "Expect";
        HOST = "Host";
        LOCATION = "Location";
        SERVER = "Server";
        TRANSFER_ENCODING = "Transfer-Encoding";
        UPGRADE = "Upgrade";
        /// Non standard, de-facto proxy chain header.
        X_FORWARDED_FOR = "X-Forwarded-For";
    }
}
