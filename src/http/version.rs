/// HTTP/1.x protocol version of a request.
///
/// Versions are ordered, `HTTP/0.9 < HTTP/1.0 < HTTP/1.1`, and every capability check of the
/// engine is a comparison against `HTTP/1.1`.
///
/// [httpwg](https://httpwg.org/specs/rfc9112.html#http.version)
#[derive(Copy, Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct Version(u8);

impl Version {
    /// `HTTP/0.9`
    pub const HTTP_09: Version = Version(9);

    /// `HTTP/1.0`
    pub const HTTP_10: Version = Version(10);

    /// `HTTP/1.1`
    pub const HTTP_11: Version = Version(11);

    /// Version from the digits of an `HTTP/<major>.<minor>` token.
    ///
    /// Later `1.x` minor versions are answered as `HTTP/1.1`, anything else is not supported.
    pub const fn from_digits(major: u8, minor: u8) -> Option<Version> {
        match (major, minor) {
            (0, 9) => Some(Self::HTTP_09),
            (1, 0) => Some(Self::HTTP_10),
            (1, _) => Some(Self::HTTP_11),
            _ => None,
        }
    }

    /// Parse the protocol token of a request line, e.g. `HTTP/1.1`.
    pub fn parse(token: &str) -> Option<Version> {
        let digits = token.strip_prefix("HTTP/")?.as_bytes();
        match digits {
            [major @ b'0'..=b'9', b'.', minor @ b'0'..=b'9'] => {
                Self::from_digits(major - b'0', minor - b'0')
            }
            _ => None,
        }
    }

    /// Returns `true` if chunked transfer coding can be used in the response.
    #[inline]
    pub const fn supports_chunked(&self) -> bool {
        self.0 >= Self::HTTP_11.0
    }

    /// Returns `true` if connections are persistent unless `Connection: close` is sent.
    #[inline]
    pub const fn is_persistent_by_default(&self) -> bool {
        self.0 >= Self::HTTP_11.0
    }

    /// Returns `true` if the client understands `1xx` interim responses.
    #[inline]
    pub const fn accepts_interim(&self) -> bool {
        self.0 >= Self::HTTP_11.0
    }

    /// Returns the status line token, e.g. `HTTP/1.1`.
    pub const fn as_str(&self) -> &'static str {
        match self.0 {
            9 => "HTTP/0.9",
            10 => "HTTP/1.0",
            _ => "HTTP/1.1",
        }
    }
}

impl Default for Version {
    #[inline]
    fn default() -> Version {
        Version::HTTP_11
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Debug for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Version;

    #[test]
    fn test_parse() {
        assert_eq!(Version::parse("HTTP/1.1"), Some(Version::HTTP_11));
        assert_eq!(Version::parse("HTTP/1.0"), Some(Version::HTTP_10));
        assert_eq!(Version::parse("HTTP/1.9"), Some(Version::HTTP_11));
        assert_eq!(Version::parse("HTTP/0.9"), Some(Version::HTTP_09));
        assert_eq!(Version::parse("HTTP/2.0"), None);
        assert_eq!(Version::parse("HTTP/1.10"), None);
        assert_eq!(Version::parse("http/1.1"), None);

        assert!(Version::HTTP_10 < Version::HTTP_11);
        assert!(!Version::HTTP_10.supports_chunked());
        assert!(Version::HTTP_11.is_persistent_by_default());
    }
}
