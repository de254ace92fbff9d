//! Phone numbers and other addresses, as they appear in PDUs.
//!
//! Numeric addresses are packed two decimal digits to an octet with the nibbles swapped
//! ("semi-octets"), padded with `0xF` if there's an odd number of digits. Alphanumeric addresses
//! (e.g. when banks/other companies send you SMSes) are packed GSM 7-bit text.
use std::fmt;
use std::str::FromStr;
use std::convert::{Infallible, TryFrom};
use num_traits::FromPrimitive;
use crate::errors::*;
use crate::gsm_encoding;
use super::cursor::BitCursor;

/// Type of number value - used as part of phone numbers to indicate whether the number is
/// international, alphanumeric, etc.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive, Hash)]
pub enum TypeOfNumber {
    /// Unknown number type ('let the network handle it please').
    Unknown = 0b0_000_0000,
    /// International (i.e. starting with +). This is probably what you want when sending messages.
    International = 0b0_001_0000,
    /// National number - no prefix or suffix added.
    National = 0b0_010_0000,
    /// Network specific number.
    Special = 0b0_011_0000,
    Subscriber = 0b0_100_0000,
    /// Alphanumeric "number" - some text that indicates who the sender is.
    Alphanumeric = 0b0_101_0000,
    /// Abbreviated number.
    Short = 0b0_110_0000,
    Reserved = 0b0_111_0000
}
/// Numbering plan identification value.
///
/// Mostly vestigial; you'll want `IsdnTelephone` for phone numbers. Every nibble value has a
/// variant, so unassigned plans seen in the wild survive a decode/encode cycle.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive, Hash)]
pub enum NumberingPlanIdentification {
    NetworkDetermined = 0b0_000_0000,
    IsdnTelephone = 0b0_000_0001,
    Reserved2 = 0b0_000_0010,
    Data = 0b0_000_0011,
    Telex = 0b0_000_0100,
    ServiceCentreSpecific = 0b0_000_0101,
    ServiceCentreSpecific2 = 0b0_000_0110,
    Reserved7 = 0b0_000_0111,
    National = 0b0_000_1000,
    Private = 0b0_000_1001,
    Ermes = 0b0_000_1010,
    Reserved11 = 0b0_000_1011,
    Reserved12 = 0b0_000_1100,
    Reserved13 = 0b0_000_1101,
    Reserved14 = 0b0_000_1110,
    Reserved = 0b0_000_1111
}
/// Address type, comprised of a `TypeOfNumber` and `NumberingPlanIdentification` value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AddressType {
    pub type_of_number: TypeOfNumber,
    pub numbering_plan_identification: NumberingPlanIdentification
}
impl Default for AddressType {
    fn default() -> Self {
        AddressType {
            type_of_number: TypeOfNumber::Unknown,
            numbering_plan_identification: NumberingPlanIdentification::IsdnTelephone
        }
    }
}
impl TryFrom<u8> for AddressType {
    type Error = GsmError;
    fn try_from(b: u8) -> GsmResult<Self>  {
        let ton = b & 0b0_111_0000;
        let ton = TypeOfNumber::from_u8(ton)
            .ok_or(GsmError::InvalidPdu(format!("invalid type of number in 0x{:02X}", b)))?;
        let npi = b & 0b0_000_1111;
        let npi = NumberingPlanIdentification::from_u8(npi)
            .ok_or(GsmError::InvalidPdu(format!("invalid numbering plan in 0x{:02X}", b)))?;
        Ok(Self {
            type_of_number: ton,
            numbering_plan_identification: npi
        })
    }
}
impl Into<u8> for AddressType {
    fn into(self) -> u8 {
        let mut ret: u8 = 0b1_000_0000;
        ret |= self.type_of_number as u8;
        ret |= self.numbering_plan_identification as u8;
        ret
    }
}

/// A PDU address: a number (or, for alphanumeric addresses, some text) and its type.
///
/// Use the `FromStr` implementation to turn ordinary strings like `+441234567890` into one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Address {
    pub type_addr: AddressType,
    /// Decimal digits, or text if the type of number is `Alphanumeric`.
    pub number: String
}
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.type_addr.type_of_number == TypeOfNumber::International {
            write!(f, "+")?;
        }
        write!(f, "{}", self.number)
    }
}
impl FromStr for Address {
    type Err = Infallible;
    fn from_str(st: &str) -> Result<Self, Infallible> {
        let st = st.trim();
        let stripped = st.chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
            .collect::<String>();
        let (int, digits) = if stripped.starts_with('+') {
            (true, &stripped[1..])
        }
        else {
            (false, &stripped[..])
        };
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Ok(Address::alphanumeric(st));
        }
        let ton = if int {
            TypeOfNumber::International
        }
        else {
            TypeOfNumber::Unknown
        };
        Ok(Address {
            type_addr: AddressType {
                type_of_number: ton,
                numbering_plan_identification: NumberingPlanIdentification::IsdnTelephone
            },
            number: digits.to_owned()
        })
    }
}
impl Address {
    pub fn alphanumeric<S: Into<String>>(text: S) -> Self {
        Address {
            type_addr: AddressType {
                type_of_number: TypeOfNumber::Alphanumeric,
                numbering_plan_identification: NumberingPlanIdentification::NetworkDetermined
            },
            number: text.into()
        }
    }
    pub fn is_alphanumeric(&self) -> bool {
        self.type_addr.type_of_number == TypeOfNumber::Alphanumeric
    }
    fn digit_octets(&self) -> GsmResult<Vec<u8>> {
        let mut ret = vec![];
        let mut cur = 0b0000_0000;
        for (i, c) in self.number.chars().enumerate() {
            let b = c.to_digit(10)
                .ok_or(GsmError::parameter(format!("'{}' is not a digit in address '{}'", c, self.number)))? as u8;
            if i % 2 == 0 {
                cur = b;
            }
            else {
                ret.push(cur | (b << 4));
            }
        }
        if self.number.len() % 2 != 0 {
            ret.push(cur | 0b1111_0000);
        }
        Ok(ret)
    }
    /// Encode this address as (length field, type octet, address octets).
    ///
    /// The length field counts digits (semi-octets) for ordinary addresses, and octets (type octet
    /// included) for service centre addresses.
    pub fn encode(&self, sc_address: bool) -> GsmResult<(u8, u8, Vec<u8>)> {
        let (semi_octets, octets) = if self.is_alphanumeric() {
            let septets = gsm_encoding::gsm_encode_string_lossy(&self.number).len();
            ((septets * 7 + 3) / 4, gsm_encoding::pack_septets(&self.number))
        }
        else {
            (self.number.len(), self.digit_octets()?)
        };
        let len = if sc_address {
            octets.len() + 1
        }
        else {
            semi_octets
        };
        if len > 0xFF {
            Err(GsmError::parameter(format!("address '{}' is too long", self.number)))?
        }
        Ok((len as u8, self.type_addr.into(), octets))
    }
    /// Decode an address from its length field, type octet and address octets. See `encode` for
    /// what `length` counts.
    pub fn decode(length: u8, type_byte: u8, octets: &[u8], sc_address: bool) -> GsmResult<Self> {
        let length = length as usize;
        let type_addr = AddressType::try_from(type_byte)?;
        let expected = if sc_address {
            length.saturating_sub(1)
        }
        else {
            (length + 1) / 2
        };
        if octets.len() != expected {
            Err(GsmError::InvalidPdu(format!("address length {} doesn't match {} address octets", length, octets.len())))?
        }
        let number = if type_addr.type_of_number == TypeOfNumber::Alphanumeric {
            if sc_address {
                // the octet count leaves the last 7 bits ambiguous: fill (CR, or zeroes from
                // encoders that don't pad) rather than text
                let mut text = gsm_encoding::unpack_septets_all(octets);
                if octets.len() % 7 == 0 && text.ends_with('@') {
                    text.pop();
                }
                text
            }
            else {
                gsm_encoding::unpack_septets(octets, length * 4 / 7)?
            }
        }
        else {
            let digits = if sc_address {
                None
            }
            else {
                Some(length)
            };
            decode_semi_octets(octets, digits)?
        };
        Ok(Address { type_addr, number })
    }
    /// Read an ordinary (TP-layer) address.
    pub fn read(cur: &mut BitCursor) -> GsmResult<Self> {
        let len = cur.read_octet()?;
        let type_byte = cur.read_octet()?;
        let octets = cur.read_octets((len as usize + 1) / 2)?;
        Self::decode(len, type_byte, &octets, false)
    }
    pub fn write(&self, cur: &mut BitCursor) -> GsmResult<()> {
        let (len, type_byte, octets) = self.encode(false)?;
        cur.write_octet(len);
        cur.write_octet(type_byte);
        cur.write_octets(&octets);
        Ok(())
    }
    /// Read a service centre address, which is absent if its length octet is zero.
    pub fn read_sc(cur: &mut BitCursor) -> GsmResult<Option<Self>> {
        let len = cur.read_octet()?;
        if len == 0 {
            return Ok(None);
        }
        let type_byte = cur.read_octet()?;
        let octets = cur.read_octets(len as usize - 1)?;
        Self::decode(len, type_byte, &octets, true).map(Some)
    }
    pub fn write_sc(sca: Option<&Self>, cur: &mut BitCursor) -> GsmResult<()> {
        match sca {
            Some(a) if !a.number.is_empty() => {
                let (len, type_byte, octets) = a.encode(true)?;
                cur.write_octet(len);
                cur.write_octet(type_byte);
                cur.write_octets(&octets);
            },
            _ => cur.write_octet(0)
        }
        Ok(())
    }
}
/// Decode swapped-nibble BCD digits. With `digits` unknown, a trailing `0xF` nibble is taken as
/// padding.
fn decode_semi_octets(octets: &[u8], digits: Option<usize>) -> GsmResult<String> {
    let total = digits.unwrap_or(octets.len() * 2);
    let mut ret = String::with_capacity(total);
    for i in 0..total {
        let b = octets[i / 2];
        let nibble = if i % 2 == 0 {
            b & 0b0000_1111
        }
        else {
            b >> 4
        };
        let last = i + 1 == total;
        match nibble {
            0 ..= 9 => ret.push((b'0' + nibble) as char),
            0xF if digits.is_none() && last && i % 2 == 1 => {},
            x => Err(GsmError::InvalidDigit(x))?
        }
    }
    if let Some(n) = digits {
        if n % 2 == 1 && octets[n / 2] >> 4 != 0xF {
            Err(GsmError::InvalidDigit(octets[n / 2] >> 4))?
        }
    }
    Ok(ret)
}
