//! Data coding schemes (GSM 03.38 section 4 for SMS, section 5 for cell broadcast).
//!
//! Both are kept as the raw octet they were built from, so that re-encoding a message always
//! produces the same byte; everything else is derived on demand.
use std::fmt;
use num_traits::FromPrimitive;

/// The alphabet a message's user data is encoded in.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum Alphabet {
    /// The GSM 7-bit default alphabet (packed septets).
    Default7Bit = 0b0000_00_00,
    /// 8-bit data.
    EightBit = 0b0000_01_00,
    /// UCS-2.
    SixteenBit = 0b0000_10_00,
    Reserved = 0b0000_11_00
}
impl Alphabet {
    fn from_bits(b: u8) -> Self {
        Alphabet::from_u8(b & 0b0000_11_00)
            .unwrap_or(Alphabet::Reserved)
    }
}
/// Message class, for the coding groups that have one.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum MessageClass {
    /// Class 0: display immediately, don't store.
    Silent = 0b000000_00,
    /// Class 1: store in the ME.
    StoreToNv = 0b000000_01,
    /// Class 2: store on the SIM.
    StoreToSim = 0b000000_10,
    /// Class 3: hand to the TE.
    StoreToTe = 0b000000_11
}
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum MessageWaitingType {
    Voice = 0b000000_00,
    Fax = 0b000000_01,
    Email = 0b000000_10,
    Unknown = 0b000000_11
}

/// SMS data coding scheme (TP-DCS).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct DataCodingScheme(pub u8);
impl DataCodingScheme {
    /// A general data coding scheme with the given alphabet and (optionally) message class.
    pub fn new(alphabet: Alphabet, class: Option<MessageClass>) -> Self {
        let mut ret = alphabet as u8;
        if let Some(c) = class {
            ret |= 0b0001_0000 | c as u8;
        }
        DataCodingScheme(ret)
    }
    pub fn alphabet(&self) -> Alphabet {
        let b = self.0;
        match b & 0b1111_0000 {
            0b1111_0000 => if b & 0b0000_0100 > 0 {
                Alphabet::EightBit
            }
            else {
                Alphabet::Default7Bit
            },
            0b1110_0000 => Alphabet::SixteenBit,
            0b1100_0000 | 0b1101_0000 => Alphabet::Default7Bit,
            _ => Alphabet::from_bits(b)
        }
    }
    /// Whether the user data is compressed (only possible in the general coding groups).
    pub fn compressed(&self) -> bool {
        (self.0 & 0b1000_0000) == 0 && (self.0 & 0b0010_0000) > 0
    }
    pub fn message_class(&self) -> Option<MessageClass> {
        let b = self.0;
        let has_class = match b & 0b1111_0000 {
            0b1111_0000 => true,
            x if x & 0b1000_0000 == 0 => b & 0b0001_0000 > 0,
            _ => false
        };
        if has_class {
            MessageClass::from_u8(b & 0b0000_0011)
        }
        else {
            None
        }
    }
    /// For the message waiting indication groups: whether the indication is set, and what's
    /// waiting.
    pub fn message_waiting(&self) -> Option<(bool, MessageWaitingType)> {
        match self.0 & 0b1111_0000 {
            0b1100_0000 | 0b1101_0000 | 0b1110_0000 => {
                let waiting = (self.0 & 0b0000_1000) > 0;
                MessageWaitingType::from_u8(self.0 & 0b0000_0011)
                    .map(|t| (waiting, t))
            },
            _ => None
        }
    }
}
impl From<u8> for DataCodingScheme {
    fn from(b: u8) -> Self {
        DataCodingScheme(b)
    }
}
impl Into<u8> for DataCodingScheme {
    fn into(self) -> u8 {
        self.0
    }
}

/// Language of a cell broadcast message.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum Language {
    German = 0,
    English = 1,
    Italian = 2,
    French = 3,
    Spanish = 4,
    Dutch = 5,
    Swedish = 6,
    Danish = 7,
    Portuguese = 8,
    Finnish = 9,
    Norwegian = 10,
    Greek = 11,
    Turkish = 12,
    Unknown = 15
}
/// Cell broadcast data coding scheme.
///
/// Octets `0000 xxxx` name a language (and imply the default alphabet); anything else gets its
/// alphabet and compression flag from the same bit positions as the SMS general coding groups.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct CbDataCodingScheme(pub u8);
impl CbDataCodingScheme {
    fn is_language_group(&self) -> bool {
        (self.0 & 0xF0) <= 0x30 && (self.0 & 0x30) == 0
    }
    pub fn language(&self) -> Language {
        if self.is_language_group() {
            Language::from_u8(self.0).unwrap_or(Language::Unknown)
        }
        else {
            Language::Unknown
        }
    }
    pub fn alphabet(&self) -> Alphabet {
        if self.is_language_group() {
            Alphabet::Default7Bit
        }
        else {
            Alphabet::from_bits(self.0)
        }
    }
    pub fn compressed(&self) -> bool {
        !self.is_language_group() && (self.0 & 0b0010_0000) > 0
    }
}
impl From<u8> for CbDataCodingScheme {
    fn from(b: u8) -> Self {
        CbDataCodingScheme(b)
    }
}
impl Into<u8> for CbDataCodingScheme {
    fn into(self) -> u8 {
        self.0
    }
}
impl fmt::Display for CbDataCodingScheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.compressed() {
            write!(f, "compressed   ")?;
        }
        let alphabet = match self.alphabet() {
            Alphabet::Default7Bit => "default alphabet",
            Alphabet::EightBit => "8-bit alphabet",
            Alphabet::SixteenBit => "16-bit alphabet",
            Alphabet::Reserved => "reserved alphabet"
        };
        write!(f, "{:?}   {}", self.language(), alphabet)
    }
}
