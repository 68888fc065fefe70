//! Application facing errors.
use crate::headers::{HeaderSet, HeaderValue, standard::LOCATION};
use crate::http::StatusCode;

/// Boxed application error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An application error that choose the status of the substitute response.
///
/// Any other error returned by an application is answered with `500 Internal Server Error`.
#[derive(Debug, Clone)]
pub struct HttpError {
    status: StatusCode,
    headers: HeaderSet,
    message: Option<String>,
}

impl HttpError {
    /// Create new error with given status.
    #[inline]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderSet::new(),
            message: None,
        }
    }

    /// Redirect to given location.
    ///
    /// # Errors
    ///
    /// Returns error if `location` is not a valid header value.
    pub fn redirect(status: StatusCode, location: &str) -> Result<Self, crate::headers::HeaderError> {
        let mut err = Self::new(status);
        err.headers.add(LOCATION, HeaderValue::from_slice(location)?);
        Ok(err)
    }

    /// Attach message to be logged.
    #[inline]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Add a header to the substitute response.
    #[inline]
    pub fn with_header(mut self, name: &'static str, value: HeaderValue) -> Self {
        self.headers.add(name, value);
        self
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[inline]
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub(crate) fn into_parts(self) -> (StatusCode, HeaderSet) {
        (self.status, self.headers)
    }
}

impl std::error::Error for HttpError {}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {msg}", self.status),
            None => write!(f, "{}", self.status),
        }
    }
}

impl From<StatusCode> for HttpError {
    #[inline]
    fn from(status: StatusCode) -> Self {
        Self::new(status)
    }
}
