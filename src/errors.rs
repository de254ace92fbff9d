use std::io;
use crate::pdu::Alphabet;

/// The three broad categories every `GsmError` falls into.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed, truncated or otherwise undecodable PDU.
    Decode,
    /// Bad arguments to an operation (missing index, capacity exceeded, ...).
    Parameter,
    /// Failure of whatever medium backs a store.
    Os
}
#[derive(Fail, Debug)]
pub enum GsmError {
    #[fail(display = "Invalid PDU: {}", _0)]
    InvalidPdu(String),
    #[fail(display = "PDU truncated: wanted {} bits at bit offset {}, but only {} bits available", wanted, offset, available)]
    Truncated {
        wanted: usize,
        offset: usize,
        available: usize
    },
    #[fail(display = "Unknown message type indicator in first octet 0x{:02X}", _0)]
    UnknownMessageType(u8),
    #[fail(display = "Invalid BCD digit 0x{:X} in address", _0)]
    InvalidDigit(u8),
    #[fail(display = "Data of unsupported encoding: {:?}", _0)]
    UnsupportedEncoding(Alphabet),
    #[fail(display = "Value out of range: {}", _0)]
    ValueOutOfRange(u32),
    #[fail(display = "{}", _0)]
    Parameter(String),
    #[fail(display = "no index {} in {}", _1, _0)]
    MissingIndices(&'static str, IndexList),
    #[fail(display = "An I/O error occurred: {}", _0)]
    IoError(#[cause] io::Error)
}
/// List of store indices, displayed as `'3', '99'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexList(pub Vec<u32>);
impl ::std::fmt::Display for IndexList {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        for (i, idx) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{}'", idx)?;
        }
        Ok(())
    }
}
impl GsmError {
    pub fn kind(&self) -> ErrorKind {
        use self::GsmError::*;
        match *self {
            InvalidPdu(_) | Truncated { .. } | UnknownMessageType(_) |
                InvalidDigit(_) | UnsupportedEncoding(_) | ValueOutOfRange(_) => ErrorKind::Decode,
            Parameter(_) | MissingIndices(..) => ErrorKind::Parameter,
            IoError(_) => ErrorKind::Os
        }
    }
    pub(crate) fn parameter<S: Into<String>>(msg: S) -> Self {
        GsmError::Parameter(msg.into())
    }
}
impl From<io::Error> for GsmError {
    fn from(e: io::Error) -> GsmError {
        GsmError::IoError(e)
    }
}
pub type GsmResult<T> = Result<T, GsmError>;
