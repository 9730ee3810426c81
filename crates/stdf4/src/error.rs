//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// The FAR record declared a byte order this library cannot convert
    #[error("unsupported cpu type {0}, only 1 (big endian) or 2 (little endian) are allowed")]
    #[diagnostic(help("cpu type 0 (DEC PDP-11/VAX) is not supported"))]
    UnsupportedCpuType(u8),

    /// A fixed width field runs past the end of the record
    #[error("need {needed} bytes at offset {offset} but the record only has {available}")]
    InsufficientData {
        /// Offset of the field inside the record body
        offset: usize,
        /// Width of the field
        needed: usize,
        /// Length of the record body
        available: usize,
    },

    /// A length prefixed string runs past the end of the record
    #[error("could not read a string of length {length}, only {remaining} bytes left in the record")]
    TruncatedString {
        /// Declared string length
        length: usize,
        /// Bytes left after the length byte
        remaining: usize,
    },

    /// A length prefixed byte array runs past the end of the record
    #[error("could not read {length} bytes, only {remaining} bytes left in the record")]
    TruncatedBytes {
        /// Declared array length
        length: usize,
        /// Bytes left after the length byte
        remaining: usize,
    },

    /// A set optional field follows an unset one
    #[error("there is a non-null field after a null field")]
    #[diagnostic(help("set the fields in between to an empty value instead of leaving them unset"))]
    NonNullAfterNull,

    /// Variable length fields hold at most 255 characters
    #[error("string of {0} characters is too long, max is 255")]
    StringTooLong(usize),

    /// Encoded record does not fit in the 16 bit length field
    #[error("record of {0} bytes is too long, max is 65535")]
    RecordTooLong(usize),

    /// Character can not be written as a single byte
    #[error("character {0:?} is out of the ascii range")]
    CharOutOfAsciiRange(char),

    /// Destination slice can not hold the encoded record
    #[error("destination buffer needs {needed} bytes but only {available} are available")]
    BufferTooSmall {
        /// Bytes required from the write offset
        needed: usize,
        /// Bytes available from the write offset
        available: usize,
    },

    /// {0} records can be decoded but not encoded
    #[error("{0} encoding is not implemented")]
    NotImplemented(&'static str),

    /// Name does not match any record type
    #[error("unknown record type name {0}")]
    UnknownRecordName(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
