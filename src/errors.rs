//! Errors specific to decoding icon group and version information resources.

use alloc::string::String;

/// Error that can occur when reading and parsing bytes.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[cfg_attr(feature = "std", error("{0}"))]
pub struct ReadError(pub String);

/// Category of a [`DecodeError`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum DecodeErrorKind {
    OutOfBounds,
    UnterminatedString,
    InvalidHeader,
    MalformedBlock,
}

/// Errors that can occur when decoding a resource.
///
/// All errors are terminal for the decode call that produced them, no partial result is returned.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum DecodeError {
    /// A read or alignment step would exceed the buffer.
    #[cfg_attr(feature = "std", error("out of bounds: {0}"))]
    OutOfBounds(String),
    /// A UTF-16 string starting at the given offset lacks its terminator.
    #[cfg_attr(feature = "std", error("unterminated string at offset {0:#x}"))]
    UnterminatedString(usize),
    /// A fixed magic, type or reserved field failed validation.
    #[cfg_attr(feature = "std", error("invalid header: {0}"))]
    InvalidHeader(String),
    /// A declared block length violates its parent's bound or is too small.
    #[cfg_attr(feature = "std", error("malformed block: {0}"))]
    MalformedBlock(String),
}
impl DecodeError {
    /// Returns the category of the error.
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            DecodeError::OutOfBounds(_) => DecodeErrorKind::OutOfBounds,
            DecodeError::UnterminatedString(_) => DecodeErrorKind::UnterminatedString,
            DecodeError::InvalidHeader(_) => DecodeErrorKind::InvalidHeader,
            DecodeError::MalformedBlock(_) => DecodeErrorKind::MalformedBlock,
        }
    }
}
impl From<ReadError> for DecodeError {
    fn from(error: ReadError) -> Self { DecodeError::OutOfBounds(error.0) }
}

/// Errors that can occur when building resource data.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum EncodeError {
    /// A block does not fit its 16-bit length field.
    #[cfg_attr(feature = "std", error("block {0:?} is too large: {1} bytes"))]
    BlockTooLarge(String, usize),
    /// A string contains a zero unit, which would terminate it early.
    #[cfg_attr(feature = "std", error("string {0:?} contains a nul character"))]
    InteriorNul(String),
    /// An icon group entry has no image data.
    #[cfg_attr(feature = "std", error("icon group entry {0} has no data"))]
    EmptyIconEntry(u16),
    /// An icon group holds the maximum number of entries.
    #[cfg_attr(feature = "std", error("icon group is full with {0} entries"))]
    IconGroupFull(usize),
}
