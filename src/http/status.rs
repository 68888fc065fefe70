use std::num::NonZeroU16;

/// HTTP [Status Code][rfc].
///
/// Any three digit code is accepted, codes without a registered reason phrase are written with
/// `"Unknown"` as their reason.
///
/// [rfc]: <https://datatracker.ietf.org/doc/html/rfc9110#name-status-codes>
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusCode(NonZeroU16);

impl Default for StatusCode {
    #[inline]
    fn default() -> Self {
        Self::OK
    }
}

impl StatusCode {
    /// Create status code from integer.
    ///
    /// # Errors
    ///
    /// Returns error if the code is not within `100..=999`.
    #[inline]
    pub const fn from_u16(code: u16) -> Result<Self, InvalidStatusCode> {
        match code {
            100..=999 => match NonZeroU16::new(code) {
                Some(code) => Ok(Self(code)),
                None => Err(InvalidStatusCode),
            },
            _ => Err(InvalidStatusCode),
        }
    }

    /// Returns status code value, e.g: `200`.
    #[inline]
    pub const fn as_u16(&self) -> u16 {
        self.0.get()
    }

    /// `1xx`
    #[inline]
    pub const fn is_informational(&self) -> bool {
        matches!(self.0.get(), 100..=199)
    }

    /// `2xx`
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self.0.get(), 200..=299)
    }

    /// `4xx`
    #[inline]
    pub const fn is_client_error(&self) -> bool {
        matches!(self.0.get(), 400..=499)
    }

    /// `5xx`
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        matches!(self.0.get(), 500..=599)
    }

    /// Returns `true` for redirect statuses that point the client at another location.
    ///
    /// `300 Multiple Choices` and `304 Not Modified` are excluded.
    #[inline]
    pub const fn is_redirect(&self) -> bool {
        matches!(self.0.get(), 301 | 302 | 303 | 305 | 307 | 308)
    }

    /// Returns `true` if the status is defined to never carry a message body.
    ///
    /// [rfc](https://www.rfc-editor.org/rfc/rfc9112#section-6.3)
    #[inline]
    pub const fn has_empty_body(&self) -> bool {
        matches!(self.0.get(), 100..=199 | 204 | 304)
    }
}

macro_rules! status_code {
    (
        $(
            $(#[$doc:meta])*
            $int:literal $id:ident $msg:literal;
        )*
    ) => {
        impl StatusCode {
            /// Returns the registered reason phrase, e.g: `"OK"`, or `"Unknown"`.
            #[inline]
            pub const fn reason(&self) -> &'static str {
                match self.0.get() {
                    $(
                        $int => $msg,
                    )*
                    _ => "Unknown",
                }
            }
        }

        impl StatusCode {
            $(
                $(#[$doc])*
                pub const $id: Self = Self(NonZeroU16::new($int).unwrap());
            )*
        }
    };
}

status_code! {
    /// `100`. The client should continue the request or ignore the response if the request is
    /// already finished.
    100 CONTINUE "Continue";
    /// `101`, This code is sent in response to an `Upgrade` request header from the client and
    /// indicates the protocol the server is switching to.
    101 SWITCHING_PROTOCOLS "Switching Protocols";
    /// `200`. The request succeeded.
    200 OK "OK";
    /// `201`. The request succeeded, and a new resource was created as a result.
    201 CREATED "Created";
    /// `202`. The request has been received but not yet acted upon.
    202 ACCEPTED "Accepted";
    /// `204`. There is no content to send for this request, but the headers are useful.
    204 NO_CONTENT "No Content";
    /// `206`. Only part of the resource is sent, as requested by a `Range` header.
    206 PARTIAL_CONTENT "Partial Content";
    /// `301`. The URL of the requested resource has been changed permanently.
    301 MOVED_PERMANENTLY "Moved Permanently";
    /// `302`. This response code means that the URI of requested resource has been changed temporarily.
    302 FOUND "Found";
    /// `303`. The server sent this response to direct the client to get the requested resource at another
    /// URI with a GET request.
    303 SEE_OTHER "See Other";
    /// `304`. This is used for caching purposes. It tells the client that the response has not been
    /// modified, so the client can continue to use the same cached version of the response.
    304 NOT_MODIFIED "Not Modified";
    /// `305`. Deprecated, the requested resource must be accessed through a proxy.
    305 USE_PROXY "Use Proxy";
    /// `307`. The server sends this response to direct the client to get the requested resource at
    /// another URI with the same method that was used in the prior request.
    307 TEMPORARY_REDIRECT "Temporary Redirect";
    /// `308`. The resource is now permanently located at another URI, method must not change.
    308 PERMANENT_REDIRECT "Permanent Redirect";
    /// `400`. The server cannot or will not process the request due to something that is perceived to be
    /// a client error.
    400 BAD_REQUEST "Bad Request";
    /// `401`. Although the HTTP standard specifies "unauthorized", semantically this response means
    /// "unauthenticated".
    401 UNAUTHORIZED "Unauthorized";
    /// `403`. The client's identity is known to the server, but client does not have access rights
    /// to the content.
    403 FORBIDDEN "Forbidden";
    /// `404`. The server cannot find the requested resource.
    404 NOT_FOUND "Not Found";
    /// `405`. The request method is known by the server but is not supported by the target resource.
    405 METHOD_NOT_ALLOWED "Method Not Allowed";
    /// `408`. This response is sent on an idle connection by some servers, even without any previous
    /// request by the client.
    408 REQUEST_TIMEOUT "Request Timeout";
    /// `411`. Server rejected the request because the `Content-Length` header field is not defined and the
    /// server requires it.
    411 LENGTH_REQUIRED "Length Required";
    /// `413`. The request body is larger than limits defined by server.
    413 CONTENT_TOO_LARGE "Content Too Large";
    /// `417`. This response code means the expectation indicated by the `Expect` request header field
    /// cannot be met by the server.
    417 EXPECTATION_FAILED "Expectation Failed";
    /// `500`. The server has encountered a situation it does not know how to handle.
    500 INTERNAL_SERVER_ERROR "Internal Server Error";
    /// `501`. The request method is not supported by the server and cannot be handled.
    501 NOT_IMPLEMENTED "Not Implemented";
    /// `502`. The server, while working as a gateway, got an invalid response.
    502 BAD_GATEWAY "Bad Gateway";
    /// `503`. The server is not ready to handle the request.
    503 SERVICE_UNAVAILABLE "Service Unavailable";
    /// `504`. The server is acting as a gateway and cannot get a response in time.
    504 GATEWAY_TIMEOUT "Gateway Timeout";
    /// `505`. The HTTP version used in the request is not supported by the server.
    505 HTTP_VERSION_NOT_SUPPORTED "HTTP Version Not Supported";
}

impl TryFrom<u16> for StatusCode {
    type Error = InvalidStatusCode;

    #[inline]
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::from_u16(value)
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason())
    }
}

impl std::fmt::Debug for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_tuple("StatusCode").field(&self.as_u16()).finish()
    }
}

// ===== Error =====

/// Status code out of the three digit range.
#[derive(Debug)]
pub struct InvalidStatusCode;

impl std::error::Error for InvalidStatusCode { }

impl std::fmt::Display for InvalidStatusCode {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid status code")
    }
}

#[cfg(test)]
mod tests {
    use super::StatusCode;

    #[test]
    fn test_status_code() {
        assert_eq!(StatusCode::OK.as_u16(), 200);
        assert_eq!(StatusCode::OK.reason(), "OK");
        assert_eq!(StatusCode::from_u16(599).unwrap().reason(), "Unknown");
        assert!(StatusCode::from_u16(99).is_err());
        assert!(StatusCode::from_u16(1000).is_err());
        assert_eq!(StatusCode::NOT_FOUND.to_string(), "404 Not Found");

        assert!(StatusCode::NO_CONTENT.has_empty_body());
        assert!(StatusCode::NOT_MODIFIED.has_empty_body());
        assert!(StatusCode::CONTINUE.has_empty_body());
        assert!(!StatusCode::OK.has_empty_body());

        assert!(StatusCode::FOUND.is_redirect());
        assert!(StatusCode::PERMANENT_REDIRECT.is_redirect());
        assert!(!StatusCode::NOT_MODIFIED.is_redirect());
    }
}
