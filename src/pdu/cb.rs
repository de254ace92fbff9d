//! Cell broadcast messages (GSM 03.41).
//!
//! A CB page is always 88 octets: a 6-octet header, then either 93 septets of default alphabet
//! text (padded out with carriage returns) or 82 octets of something else.
use std::fmt;
use crate::errors::*;
use crate::util::GsmFromPrimitive;
use crate::gsm_encoding::{self, UserDataBody};
use crate::gsm_encoding::lookup_tables::GSM_PAD;
use super::cursor::{BitCursor, HexData};
use super::dcs::{Alphabet, CbDataCodingScheme};

/// Number of septets of text in one page.
pub const CB_SEPTETS: usize = 93;
/// Number of octets of data in one page.
pub const CB_OCTETS: usize = 82;

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum GeographicalScope {
    /// Cell wide, displayed immediately.
    CellWide = 0,
    PlmnWide = 1,
    LocationAreaWide = 2,
    /// Cell wide, normal display.
    CellWide2 = 3
}
impl fmt::Display for GeographicalScope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::GeographicalScope::*;
        let s = match *self {
            CellWide => "Cell wide",
            PlmnWide => "PLMN wide",
            LocationAreaWide => "Location area wide",
            CellWide2 => "Cell wide (2)"
        };
        write!(f, "{}", s)
    }
}
/// One page of a cell broadcast message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CbMessage {
    pub geographical_scope: GeographicalScope,
    /// 10-bit message code.
    pub message_code: u16,
    /// 4-bit update number.
    pub update_number: u8,
    pub message_identifier: u16,
    pub dcs: CbDataCodingScheme,
    pub total_pages: u8,
    pub current_page: u8,
    /// Text for the default alphabet (pad characters included), raw octets otherwise.
    pub data: UserDataBody
}
impl CbMessage {
    pub fn decode(data: &str) -> GsmResult<Self> {
        let mut cur = BitCursor::from_hex(data)?;
        let code_hi = cur.read_bits(6)? as u16;
        let geographical_scope = GeographicalScope::from_integer(cur.read_2bits()? as u32)?;
        let code_lo = cur.read_bits(4)? as u16;
        let update_number = cur.read_bits(4)? as u8;
        let id_hi = cur.read_octet()? as u16;
        let id_lo = cur.read_octet()? as u16;
        let dcs = CbDataCodingScheme(cur.read_octet()?);
        let total_pages = cur.read_bits(4)? as u8;
        let current_page = cur.read_bits(4)? as u8;
        cur.mark_septet_boundary();
        let data = if dcs.alphabet() == Alphabet::Default7Bit {
            UserDataBody::Text(cur.read_septets(CB_SEPTETS)?)
        }
        else {
            UserDataBody::Octets(cur.read_octets(CB_OCTETS)?)
        };
        let ret = CbMessage {
            geographical_scope,
            message_code: (code_hi << 4) | code_lo,
            update_number,
            message_identifier: (id_hi << 8) | id_lo,
            dcs, total_pages, current_page, data
        };
        trace!("decoded CB message {} page {}/{}", ret.message_identifier, ret.current_page, ret.total_pages);
        Ok(ret)
    }
    pub fn encode(&self) -> GsmResult<String> {
        if self.message_code > 0x3FF {
            Err(GsmError::parameter(format!("message code {} doesn't fit in 10 bits", self.message_code)))?
        }
        if self.update_number > 0xF || self.total_pages > 0xF || self.current_page > 0xF {
            Err(GsmError::parameter("update number and page numbers must fit in 4 bits"))?
        }
        let mut cur = BitCursor::new();
        cur.write_bits((self.message_code >> 4) as u32, 6);
        cur.write_2bits(self.geographical_scope as u8);
        cur.write_bits((self.message_code & 0xF) as u32, 4);
        cur.write_bits(self.update_number as u32, 4);
        cur.write_octet((self.message_identifier >> 8) as u8);
        cur.write_octet(self.message_identifier as u8);
        cur.write_octet(self.dcs.into());
        cur.write_bits(self.total_pages as u32, 4);
        cur.write_bits(self.current_page as u32, 4);
        cur.mark_septet_boundary();
        match (self.dcs.alphabet(), &self.data) {
            (Alphabet::Default7Bit, &UserDataBody::Text(ref text)) => {
                let mut codes = gsm_encoding::gsm_encode_string_lossy(text);
                if codes.len() > CB_SEPTETS {
                    Err(GsmError::parameter(format!("{} septets of text won't fit in a CB page", codes.len())))?
                }
                codes.resize(CB_SEPTETS, GSM_PAD);
                cur.write_septet_codes(&codes);
                cur.pad_octet();
            },
            (Alphabet::Default7Bit, _) => {
                Err(GsmError::parameter("default alphabet CB pages must carry text"))?
            },
            (_, &UserDataBody::Octets(ref data)) => {
                if data.len() > CB_OCTETS {
                    Err(GsmError::parameter(format!("{} octets won't fit in a CB page", data.len())))?
                }
                let mut data = data.clone();
                data.resize(CB_OCTETS, 0);
                cur.write_octets(&data);
            },
            (alphabet, _) => Err(GsmError::UnsupportedEncoding(alphabet))?
        }
        Ok(HexData(cur.as_octets()).to_string())
    }
    /// The text of this page with the trailing padding removed, if it's text.
    pub fn text(&self) -> Option<&str> {
        match self.data {
            UserDataBody::Text(ref t) => Some(t.trim_end_matches('\r')),
            UserDataBody::Octets(_) => None
        }
    }
}
impl fmt::Display for CbMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Message type: CB")?;
        writeln!(f, "Geographical scope: {}", self.geographical_scope)?;
        writeln!(f, "Message Code: {}", self.message_code)?;
        writeln!(f, "Update Number: {}", self.update_number)?;
        writeln!(f, "Message Identifier: {}", self.message_identifier)?;
        writeln!(f, "Data coding scheme: {}", self.dcs)?;
        writeln!(f, "Total page number: {}", self.total_pages)?;
        writeln!(f, "Current page number: {}", self.current_page)?;
        match self.data {
            UserDataBody::Octets(ref o) => writeln!(f, "Data: {}", HexData(o)),
            UserDataBody::Text(_) => writeln!(f, "Data: '{}'", self.text().unwrap_or(""))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::dcs::Language;

    const CITY: &str = "001000320111C3343D0F82C51A8D46A3D168341A8D46A3D168341A8D46A3D168341A8D46A3D168341A8D46A3D168341A8D46A3D168341A8D46A3D168341A8D46A3D168341A8D46A3D168341A8D46A3D168341A8D46A3D100";

    #[test]
    fn decode_city() {
        let cb = CbMessage::decode(CITY).unwrap();
        assert_eq!(cb.geographical_scope, GeographicalScope::CellWide);
        assert_eq!(cb.update_number, 1);
        assert_eq!(cb.message_code, 0);
        assert_eq!(cb.message_identifier, 50);
        assert_eq!(cb.dcs.language(), Language::English);
        assert_eq!(cb.dcs.alphabet(), Alphabet::Default7Bit);
        assert_eq!(cb.total_pages, 1);
        assert_eq!(cb.current_page, 1);
        assert_eq!(cb.text(), Some("City 01"));
        match cb.data {
            UserDataBody::Text(ref t) => assert_eq!(t.chars().count(), CB_SEPTETS),
            _ => panic!("expected text")
        }
    }
    #[test]
    fn reencode_city() {
        let cb = CbMessage::decode(CITY).unwrap();
        assert_eq!(cb.encode().unwrap(), CITY);
    }
    #[test]
    fn eight_bit_page() {
        let cb = CbMessage {
            geographical_scope: GeographicalScope::PlmnWide,
            message_code: 0x2A5,
            update_number: 7,
            message_identifier: 0x1234,
            dcs: CbDataCodingScheme(0x44),
            total_pages: 3,
            current_page: 2,
            data: UserDataBody::Octets(vec![0xAA; CB_OCTETS])
        };
        let hex = cb.encode().unwrap();
        assert_eq!(hex.len(), 88 * 2);
        assert_eq!(CbMessage::decode(&hex).unwrap(), cb);
    }
    #[test]
    fn short_page_is_truncated() {
        assert!(CbMessage::decode(&CITY[..40]).is_err());
    }
    #[test]
    fn display_strips_padding() {
        let cb = CbMessage::decode(CITY).unwrap();
        let s = cb.to_string();
        assert!(s.contains("Data: 'City 01'"));
        assert!(s.contains("English   default alphabet"));
    }
}
