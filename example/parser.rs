use bytes::{Bytes, BytesMut};
use h1engine::{
    Version,
    headers::HeaderSet,
    proto::ParseError,
    request::RequestParser,
};

const MAX_HEAD: usize = 8 * 1024;

/// Request parser for the demo server, body is framed by `Content-Length` only.
#[derive(Debug, Default)]
pub struct DemoParser {
    method: String,
    url: String,
    version: Version,
    headers: HeaderSet,
    head: bool,
    remaining: usize,
    body: BytesMut,
}

impl DemoParser {
    fn parse_head(&mut self, head: &str) -> Result<(), ParseError> {
        let mut lines = head.split("\r\n");
        let line = lines.next().ok_or(ParseError::InvalidRequestLine)?;

        let mut parts = line.splitn(3, ' ');
        let (Some(method), Some(url), Some(version)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(ParseError::InvalidRequestLine);
        };
        self.version = Version::parse(version).ok_or(ParseError::UnsupportedVersion)?;
        self.method = method.to_owned();
        self.url = url.to_owned();

        for line in lines {
            let (name, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;
            self.headers.try_add(name, value.trim())?;
        }

        self.remaining = match self.headers.get("content-length") {
            Some(len) => len.as_str().trim().parse().map_err(|_| ParseError::InvalidHeader)?,
            None => 0,
        };
        Ok(())
    }
}

impl RequestParser for DemoParser {
    fn feed(&mut self, bytes: &[u8]) -> Result<usize, ParseError> {
        let mut read = 0;

        if !self.head {
            let Some(end) = bytes.windows(4).position(|e| e == b"\r\n\r\n") else {
                if bytes.len() > MAX_HEAD {
                    return Err(ParseError::TooLong);
                }
                return Ok(0);
            };
            let head = std::str::from_utf8(&bytes[..end]).map_err(|_| ParseError::InvalidHeader)?;
            self.parse_head(head)?;
            self.head = true;
            read = end + 4;
        }

        let take = self.remaining.min(bytes.len() - read);
        self.body.extend_from_slice(&bytes[read..read + take]);
        self.remaining -= take;
        Ok(read + take)
    }

    fn headers_complete(&self) -> bool {
        self.head
    }

    fn message_complete(&self) -> bool {
        self.head && self.remaining == 0
    }

    fn version(&self) -> Version {
        self.version
    }

    fn method(&self) -> &str {
        &self.method
    }

    fn path(&self) -> &str {
        self.url.split_once('?').map_or(self.url.as_str(), |(path, _)| path)
    }

    fn query_string(&self) -> &str {
        self.url.split_once('?').map_or("", |(_, query)| query)
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    fn body_bytes(&self) -> Bytes {
        self.body.clone().freeze()
    }
}
