use bytes::{Buf, Bytes, BytesMut};
use std::task::Poll;

use crate::body::error::BodyError;

const CRLF: &[u8; 2] = b"\r\n";

/// Terminating zero-size chunk, without trailer fields.
const LAST_CHUNK: &[u8] = b"0\r\n\r\n";

/// Maximum hex digits in a chunk size line.
const MAX_SIZE_DIGITS: usize = 16;

/// Chunked transfer coding encoder.
///
/// [rfc](https://www.rfc-editor.org/rfc/rfc9112#name-chunked-transfer-coding)
#[derive(Clone, Copy, Debug, Default)]
pub struct ChunkEncoder;

impl ChunkEncoder {
    #[inline]
    pub const fn new() -> Self {
        Self
    }

    /// Encode a fragment into a single chunk.
    ///
    /// An empty fragment produces an empty [`EncodedChunk`], never a zero-size chunk, since that
    /// would terminate the body. Use [`final_chunk`][ChunkEncoder::final_chunk] for that.
    pub fn encode(&self, fragment: Bytes) -> EncodedChunk {
        if fragment.is_empty() {
            return EncodedChunk::exact(fragment);
        }

        let mut header = BytesMut::with_capacity(MAX_SIZE_DIGITS + CRLF.len());
        write_hex(&mut header, fragment.len() as u64);
        header.extend_from_slice(CRLF);

        EncodedChunk {
            header: header.freeze(),
            data: fragment,
            trail: CRLF,
        }
    }

    /// The terminating zero-size chunk.
    #[inline]
    pub const fn final_chunk(&self) -> Bytes {
        Bytes::from_static(LAST_CHUNK)
    }
}

fn write_hex(buf: &mut BytesMut, mut n: u64) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut digits = [0u8; MAX_SIZE_DIGITS];
    let mut i = digits.len();
    loop {
        i -= 1;
        digits[i] = HEX[(n & 0xF) as usize];
        n >>= 4;
        if n == 0 {
            break;
        }
    }
    buf.extend_from_slice(&digits[i..]);
}

/// The return type for encoded message body chunk.
///
/// The returned bytes must be written in following order: `header`, `data`, then `trail`.
#[derive(Debug)]
pub struct EncodedChunk {
    pub header: Bytes,
    pub data: Bytes,
    pub trail: &'static [u8],
}

impl EncodedChunk {
    /// Unframed data.
    pub fn exact(data: Bytes) -> Self {
        Self { header: Bytes::new(), data, trail: b"" }
    }

    /// Returns `true` if there is nothing to write.
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.data.is_empty() && self.trail.is_empty()
    }

    /// Concatenate into a single wire frame.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.header.len() + self.data.len() + self.trail.len());
        buf.extend_from_slice(&self.header);
        buf.extend_from_slice(&self.data);
        buf.extend_from_slice(self.trail);
        buf.freeze()
    }
}

// ===== Decoder =====

/// Incremental chunked transfer coding decoder.
#[derive(Clone, Debug)]
pub struct ChunkedDecoder {
    phase: Phase,
}

#[derive(Clone, Copy, Debug)]
enum Phase {
    Size,
    Data(u64),
    DataEnd,
    Trailer,
    Eof,
}

impl Default for ChunkedDecoder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkedDecoder {
    #[inline]
    pub const fn new() -> Self {
        Self { phase: Phase::Size }
    }

    /// Returns `true` if the terminating chunk and trailer section has been read.
    #[inline]
    pub const fn is_eof(&self) -> bool {
        matches!(self.phase, Phase::Eof)
    }

    /// Poll for chunked body data, returns `None` after the end of chunks.
    ///
    /// Returns `Poll::Pending` if `buffer` does not contain enough bytes to make progress. Bytes
    /// after the end of chunks are left in `buffer`.
    pub fn decode_chunk(&mut self, buffer: &mut BytesMut) -> Poll<Option<Result<Bytes, BodyError>>> {
        loop {
            match self.phase {
                Phase::Eof => return Poll::Ready(None),
                Phase::Size => {
                    let Some(line) = find_crlf(buffer) else {
                        return Poll::Pending;
                    };
                    let digits_len = buffer[..line]
                        .iter()
                        .position(|e| !e.is_ascii_hexdigit())
                        .unwrap_or(line);
                    // chunk extension is ignored
                    if digits_len == 0 || !matches!(buffer.get(digits_len), Some(b';' | b'\r' | b' ' | b'\t')) {
                        return Poll::Ready(Some(Err(BodyError::InvalidChunked)));
                    }
                    if digits_len > MAX_SIZE_DIGITS {
                        return Poll::Ready(Some(Err(BodyError::ChunkTooLarge)));
                    }
                    let Ok(digits) = std::str::from_utf8(&buffer[..digits_len]) else {
                        return Poll::Ready(Some(Err(BodyError::InvalidChunked)));
                    };
                    let Ok(size) = u64::from_str_radix(digits, 16) else {
                        return Poll::Ready(Some(Err(BodyError::ChunkTooLarge)));
                    };
                    buffer.advance(line + CRLF.len());
                    self.phase = match size {
                        0 => Phase::Trailer,
                        size => Phase::Data(size),
                    };
                }
                Phase::Data(remaining) => {
                    if buffer.is_empty() {
                        return Poll::Pending;
                    }
                    let cnt = remaining.min(buffer.len() as u64);
                    let data = buffer.split_to(cnt as usize).freeze();
                    self.phase = match remaining - cnt {
                        0 => Phase::DataEnd,
                        rem => Phase::Data(rem),
                    };
                    return Poll::Ready(Some(Ok(data)));
                }
                Phase::DataEnd => {
                    let Some(crlf) = buffer.first_chunk::<2>() else {
                        return Poll::Pending;
                    };
                    if crlf != CRLF {
                        return Poll::Ready(Some(Err(BodyError::InvalidChunked)));
                    }
                    buffer.advance(CRLF.len());
                    self.phase = Phase::Size;
                }
                Phase::Trailer => {
                    let Some(line) = find_crlf(buffer) else {
                        return Poll::Pending;
                    };
                    // trailer fields are discarded
                    buffer.advance(line + CRLF.len());
                    if line == 0 {
                        self.phase = Phase::Eof;
                    }
                }
            }
        }
    }
}

fn find_crlf(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|e| e == CRLF)
}

#[cfg(test)]
mod tests {
    use bytes::{Bytes, BytesMut};
    use std::task::Poll;

    use super::{ChunkEncoder, ChunkedDecoder};
    use crate::body::BodyError;

    fn decode_all(mut buffer: BytesMut) -> Result<(Vec<Bytes>, BytesMut), BodyError> {
        let mut decoder = ChunkedDecoder::new();
        let mut out = vec![];
        loop {
            match decoder.decode_chunk(&mut buffer) {
                Poll::Ready(Some(Ok(data))) => out.push(data),
                Poll::Ready(Some(Err(err))) => return Err(err),
                Poll::Ready(None) => return Ok((out, buffer)),
                Poll::Pending => panic!("unexpected `Poll::Pending`"),
            }
        }
    }

    #[test]
    fn test_encode() {
        let enc = ChunkEncoder::new();
        assert_eq!(&enc.encode(Bytes::from_static(b"hello")).to_bytes()[..], b"5\r\nhello\r\n");
        assert_eq!(&enc.encode(Bytes::from(vec![b'a'; 26])).header[..], b"1A\r\n");
        assert!(enc.encode(Bytes::new()).is_empty());
        assert_eq!(&enc.final_chunk()[..], b"0\r\n\r\n");
    }

    #[test]
    fn test_round_trip() {
        let enc = ChunkEncoder::new();
        let fragments: [&[u8]; 4] = [b"hello", b" ", b"", &[0xFF; 300]];

        let mut wire = BytesMut::new();
        for fragment in fragments {
            wire.extend_from_slice(&enc.encode(Bytes::copy_from_slice(fragment)).to_bytes());
        }
        wire.extend_from_slice(&enc.final_chunk());
        wire.extend_from_slice(b"GET / HTTP/1.1\r\n");

        let (decoded, rest) = decode_all(wire).unwrap();
        let expected = fragments.concat();
        assert_eq!(decoded.concat(), expected);
        // decoder stops right after the zero-size chunk
        assert_eq!(&rest[..], b"GET / HTTP/1.1\r\n");
    }

    #[test]
    fn test_decode_extension_and_trailer() {
        let wire = BytesMut::from(&b"4;ext=1\r\nWiki\r\n5\r\npedia\r\n0\r\nX-Sum: 1\r\n\r\n"[..]);
        let (decoded, rest) = decode_all(wire).unwrap();
        assert_eq!(decoded.concat(), b"Wikipedia");
        assert!(rest.is_empty());
    }

    #[test]
    fn test_decode_partial() {
        let mut decoder = ChunkedDecoder::new();
        let mut buffer = BytesMut::from(&b"5\r\nhe"[..]);

        assert!(matches!(decoder.decode_chunk(&mut buffer), Poll::Ready(Some(Ok(b))) if b == "he"));
        assert!(decoder.decode_chunk(&mut buffer).is_pending());

        buffer.extend_from_slice(b"llo\r\n0\r\n");
        assert!(matches!(decoder.decode_chunk(&mut buffer), Poll::Ready(Some(Ok(b))) if b == "llo"));
        assert!(decoder.decode_chunk(&mut buffer).is_pending());

        buffer.extend_from_slice(b"\r\n");
        assert!(matches!(decoder.decode_chunk(&mut buffer), Poll::Ready(None)));
        assert!(decoder.is_eof());
    }

    #[test]
    fn test_decode_invalid() {
        let wire = BytesMut::from(&b"xyz\r\n"[..]);
        assert_eq!(decode_all(wire).unwrap_err(), BodyError::InvalidChunked);

        let wire = BytesMut::from(&b"3\r\nabcXX"[..]);
        assert_eq!(decode_all(wire).unwrap_err(), BodyError::InvalidChunked);
    }
}
