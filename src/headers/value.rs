use bytes::Bytes;
use std::str::FromStr;

use crate::headers::error::HeaderError;
use crate::headers::matches;

const MAX_HEADER_VALUE_LEN: usize = 1 << 13; // 8KB

/// HTTP Header Value.
///
/// This API does not support non-ASCII value. CR and LF are always rejected, so a value can
/// never break out of its header line.
#[derive(Clone)]
pub struct HeaderValue {
    /// is ASCII
    bytes: Bytes,
}

impl HeaderValue {
    /// Parse header value from static string.
    ///
    /// # Panics
    ///
    /// Panics if the input is not a valid header value.
    #[inline]
    pub const fn from_static(value: &'static str) -> Self {
        match validate_header_value(value.as_bytes()) {
            Ok(()) => Self {
                bytes: Bytes::from_static(value.as_bytes()),
            },
            Err(err) => err.panic_const(),
        }
    }

    /// Parse header value from [`Bytes`].
    ///
    /// # Errors
    ///
    /// Returns error if the input is not a valid header value.
    #[inline]
    pub fn from_bytes<B: Into<Bytes>>(value: B) -> Result<Self, HeaderError> {
        let bytes = value.into();
        validate_header_value(&bytes)?;
        Ok(Self { bytes })
    }

    /// Parse header value by coyping from slice of bytes.
    ///
    /// # Errors
    ///
    /// Returns error if the input is not a valid header value.
    #[inline]
    pub fn from_slice<A: AsRef<[u8]>>(value: A) -> Result<Self, HeaderError> {
        validate_header_value(value.as_ref())?;
        Ok(Self {
            bytes: Bytes::copy_from_slice(value.as_ref()),
        })
    }

    /// Create header value from an integer.
    #[inline]
    pub fn from_u64(value: u64) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(itoa::Buffer::new().format(value).as_bytes()),
        }
    }

    /// Returns header value as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns header value as `str`.
    #[inline]
    pub fn as_str(&self) -> &str {
        // SAFETY: `bytes` is validated ASCII
        unsafe { std::str::from_utf8_unchecked(&self.bytes) }
    }

    /// Iterate over comma separated elements, trimmed, skipping empty ones.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.as_str()
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

// ===== Parsing =====

const fn validate_header_value(mut bytes: &[u8]) -> Result<(), HeaderError> {
    use HeaderError as E;
    match bytes {
        // no leading SP / HTAB
        | [b' ' | b'\t', ..]
        // no trailing SP / HTAB
        | [.., b' ' | b'\t'] => {
            return Err(E::Invalid);
        },
        _ => {}
    }
    if bytes.len() > MAX_HEADER_VALUE_LEN {
        return Err(E::TooLong);
    }
    let mut error = false;
    while let [byte, rest @ ..] = bytes {
        error |= !matches::is_header_value(*byte);
        bytes = rest;
    }
    if !error { Ok(()) } else { Err(E::Invalid) }
}

// ===== Traits =====

impl std::fmt::Debug for HeaderValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HeaderValue").field(&self.as_str()).finish()
    }
}

impl std::fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaderValue {
    type Err = HeaderError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(s)
    }
}

impl TryFrom<String> for HeaderValue {
    type Error = HeaderError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_bytes(value)
    }
}

impl TryFrom<&str> for HeaderValue {
    type Error = HeaderError;

    #[inline]
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_slice(value)
    }
}

impl PartialEq for HeaderValue {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl PartialEq<str> for HeaderValue {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl PartialEq<&str> for HeaderValue {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl From<HeaderValue> for Bytes {
    #[inline]
    fn from(value: HeaderValue) -> Self {
        value.bytes
    }
}
