use bytes::Bytes;
use std::collections::VecDeque;

use crate::body::chunked::ChunkEncoder;
use crate::body::error::BodyError;

/// Response body framing, decided once when the header block is finalized.
#[derive(Clone, Debug)]
pub struct BodyCoder {
    kind: Kind,
}

#[derive(Clone, Debug)]
enum Kind {
    /// Chunked transfer coding, fragments larger than the limit are split.
    Chunked { encoder: ChunkEncoder, max_chunk_size: usize },
    /// Raw bytes limited by a declared `Content-Length`.
    Length { declared: u64, remaining: u64 },
    /// Raw bytes until the connection closes.
    Eof,
    /// Body not allowed, e.g. `HEAD` request or `204` response.
    Discard,
}

impl BodyCoder {
    /// Chunked transfer coding.
    ///
    /// `max_chunk_size` of zero is treated as one.
    pub fn chunked(max_chunk_size: usize) -> Self {
        Self {
            kind: Kind::Chunked {
                encoder: ChunkEncoder::new(),
                max_chunk_size: max_chunk_size.max(1),
            },
        }
    }

    /// Raw body with optional declared length.
    pub fn raw(len: Option<u64>) -> Self {
        Self {
            kind: match len {
                Some(declared) => Kind::Length { declared, remaining: declared },
                None => Kind::Eof,
            },
        }
    }

    /// Drop every fragment.
    pub fn discard() -> Self {
        Self { kind: Kind::Discard }
    }

    pub const fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked { .. })
    }

    pub const fn is_discard(&self) -> bool {
        matches!(self.kind, Kind::Discard)
    }

    /// Encode a fragment, pushing frames to write in order into `out`.
    ///
    /// Each chunk is a single frame. Empty fragments produce nothing.
    pub fn encode(&mut self, mut fragment: Bytes, out: &mut VecDeque<Bytes>) -> Result<(), BodyError> {
        if fragment.is_empty() {
            return Ok(());
        }
        match &mut self.kind {
            Kind::Chunked { encoder, max_chunk_size } => {
                while !fragment.is_empty() {
                    let at = fragment.len().min(*max_chunk_size);
                    let chunk = fragment.split_to(at);
                    out.push_back(encoder.encode(chunk).to_bytes());
                }
                Ok(())
            }
            Kind::Length { declared, remaining } => {
                match remaining.checked_sub(fragment.len() as u64) {
                    Some(rem) => {
                        *remaining = rem;
                        out.push_back(fragment);
                        Ok(())
                    }
                    None => Err(BodyError::LengthOverflow { declared: *declared }),
                }
            }
            Kind::Eof => {
                out.push_back(fragment);
                Ok(())
            }
            Kind::Discard => Ok(()),
        }
    }

    /// Finish the body, pushing the terminating frame if any.
    pub fn finish(&mut self, out: &mut VecDeque<Bytes>) -> Result<(), BodyError> {
        match &self.kind {
            Kind::Chunked { encoder, .. } => {
                out.push_back(encoder.final_chunk());
                Ok(())
            }
            Kind::Length { remaining: 0, .. } | Kind::Eof | Kind::Discard => Ok(()),
            Kind::Length { declared, remaining } => Err(BodyError::LengthUnderflow {
                declared: *declared,
                remaining: *remaining,
            }),
        }
    }
}
