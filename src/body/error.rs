/// Message body coding error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyError {
    /// Body wrote more bytes than its declared `Content-Length`.
    LengthOverflow { declared: u64 },
    /// Body ended before its declared `Content-Length` was written.
    LengthUnderflow { declared: u64, remaining: u64 },
    /// Invalid chunked framing.
    InvalidChunked,
    /// Chunk size cannot be represented.
    ChunkTooLarge,
}

impl std::error::Error for BodyError {}

impl std::fmt::Display for BodyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LengthOverflow { declared } => {
                write!(f, "body exceeds declared content-length of {declared}")
            }
            Self::LengthUnderflow { declared, remaining } => write!(
                f,
                "body ended {remaining} bytes short of declared content-length of {declared}"
            ),
            Self::InvalidChunked => f.write_str("invalid chunked body"),
            Self::ChunkTooLarge => f.write_str("chunk too large"),
        }
    }
}
