//! A bit-level cursor over the octets of a PDU.
//!
//! PDUs arrive as strings of hex digits, but the fields inside them are anything but
//! octet-aligned: cell broadcast headers pack 2-, 4- and 6-bit fields together, and text is packed
//! as 7-bit septets that straddle octet boundaries. `BitCursor` wraps the octets and keeps a bit
//! offset into them, reading and writing bits **least significant bit first** within each octet
//! (as GSM 03.38 / 03.40 lay them out).
use std::fmt;
use crate::errors::*;
use crate::gsm_encoding;

/// Hex formatting / parsing of raw octets.
#[derive(Debug)]
pub struct HexData<'a>(pub &'a [u8]);
impl<'a> fmt::Display for HexData<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
       for b in self.0.iter() {
           write!(f, "{:02X}", b)?;
       }
       Ok(())
    }
}
impl<'a> HexData<'a> {
    pub fn decode(data: &str) -> GsmResult<Vec<u8>> {
        let data = data.trim();
        if data.len() % 2 != 0 {
            Err(GsmError::InvalidPdu("odd number of hex digits".into()))?
        }
        data.as_bytes()
            .chunks(2)
            .map(::std::str::from_utf8)
            .map(|x| {
                match x {
                    Ok(x) => u8::from_str_radix(x, 16)
                        .map_err(|_| GsmError::InvalidPdu(format!("invalid hex digits '{}'", x))),
                    Err(_) => Err(GsmError::InvalidPdu("invalid hex string".into()))
                }
            })
            .collect()
    }
}

/// Readable and writable bit stream over an owned octet buffer.
#[derive(Debug, Clone, Default)]
pub struct BitCursor {
    buf: Vec<u8>,
    /// Current position, in bits.
    offset: usize,
    /// Bit offset that septet runs are aligned against.
    septet_origin: usize
}
impl BitCursor {
    /// An empty cursor, for encoding.
    pub fn new() -> Self {
        Self::default()
    }
    /// A cursor positioned at the start of `buf`, for decoding.
    pub fn from_octets(buf: Vec<u8>) -> Self {
        BitCursor { buf, offset: 0, septet_origin: 0 }
    }
    /// A cursor over the octets represented by a string of hex digits.
    pub fn from_hex(data: &str) -> GsmResult<Self> {
        Ok(Self::from_octets(HexData::decode(data)?))
    }
    /// Current position, in bits.
    pub fn offset(&self) -> usize {
        self.offset
    }
    /// Number of bits left to read.
    pub fn remaining_bits(&self) -> usize {
        (self.buf.len() * 8).saturating_sub(self.offset)
    }
    /// Number of whole octets left to read from the next octet boundary on.
    pub fn remaining_octets(&self) -> usize {
        let aligned = (self.offset + 7) / 8;
        self.buf.len().saturating_sub(aligned)
    }
    pub fn as_octets(&self) -> &[u8] {
        &self.buf
    }
    pub fn into_octets(self) -> Vec<u8> {
        self.buf
    }
    pub fn to_hex(&self) -> String {
        HexData(&self.buf).to_string()
    }
    fn ensure(&self, wanted: usize) -> GsmResult<()> {
        let available = self.remaining_bits();
        if wanted > available {
            Err(GsmError::Truncated { wanted, offset: self.offset, available })?
        }
        Ok(())
    }

    pub fn read_bit(&mut self) -> GsmResult<bool> {
        self.ensure(1)?;
        let ret = self.buf[self.offset / 8] & (1 << (self.offset % 8)) != 0;
        self.offset += 1;
        Ok(ret)
    }
    /// Read `n` bits (at most 32) as an unsigned integer; the first bit read is the least
    /// significant.
    pub fn read_bits(&mut self, n: usize) -> GsmResult<u32> {
        assert!(n <= 32, "read_bits: can't read {} bits into a u32", n);
        self.ensure(n)?;
        let mut ret = 0;
        for i in 0..n {
            if self.read_bit()? {
                ret |= 1 << i;
            }
        }
        Ok(ret)
    }
    pub fn read_2bits(&mut self) -> GsmResult<u8> {
        Ok(self.read_bits(2)? as u8)
    }
    /// Skip to the next octet boundary (no-op if already aligned).
    pub fn align_octet(&mut self) -> GsmResult<()> {
        let rem = self.offset % 8;
        if rem != 0 {
            self.ensure(8 - rem)?;
            self.offset += 8 - rem;
        }
        Ok(())
    }
    /// Read a whole octet, aligning to the next octet boundary first.
    pub fn read_octet(&mut self) -> GsmResult<u8> {
        self.align_octet()?;
        self.ensure(8)?;
        let ret = self.buf[self.offset / 8];
        self.offset += 8;
        Ok(ret)
    }
    pub fn read_octets(&mut self, n: usize) -> GsmResult<Vec<u8>> {
        self.align_octet()?;
        self.ensure(n * 8)?;
        let start = self.offset / 8;
        self.offset += n * 8;
        Ok(self.buf[start..start + n].to_owned())
    }
    /// Everything from the next octet boundary to the end of the buffer.
    pub fn read_remaining_octets(&mut self) -> GsmResult<Vec<u8>> {
        let n = self.remaining_octets();
        self.read_octets(n)
    }
    /// Make the current position the origin for septet alignment.
    ///
    /// Septet runs read or written afterwards start at a multiple of 7 bits from here, so e.g. a
    /// user data header can be skipped and the text after it picked up at the right fill bit.
    pub fn mark_septet_boundary(&mut self) {
        debug!("septet boundary marked at bit {}", self.offset);
        self.septet_origin = self.offset;
    }
    fn septet_fill(&self) -> usize {
        let since = self.offset.saturating_sub(self.septet_origin);
        (7 - since % 7) % 7
    }
    /// Read `n` raw septet codes, after skipping to the next septet boundary.
    pub fn read_septet_codes(&mut self, n: usize) -> GsmResult<Vec<u8>> {
        let fill = self.septet_fill();
        self.ensure(fill + n * 7)?;
        if fill > 0 {
            debug!("skipping {} fill bits before septets", fill);
        }
        self.offset += fill;
        (0..n).map(|_| self.read_bits(7).map(|s| s as u8)).collect()
    }
    /// Read `n` septets and decode them as default-alphabet text.
    pub fn read_septets(&mut self, n: usize) -> GsmResult<String> {
        Ok(gsm_encoding::gsm_decode_string(&self.read_septet_codes(n)?))
    }

    pub fn write_bit(&mut self, bit: bool) {
        let idx = self.offset / 8;
        if idx == self.buf.len() {
            self.buf.push(0);
        }
        let mask = 1 << (self.offset % 8);
        if bit {
            self.buf[idx] |= mask;
        }
        else {
            self.buf[idx] &= !mask;
        }
        self.offset += 1;
    }
    /// Write the low `n` bits of `value`, least significant first.
    pub fn write_bits(&mut self, value: u32, n: usize) {
        assert!(n <= 32, "write_bits: can't write {} bits from a u32", n);
        for i in 0..n {
            self.write_bit(value & (1 << i) != 0);
        }
    }
    pub fn write_2bits(&mut self, value: u8) {
        self.write_bits(value as u32, 2);
    }
    /// Pad with zero bits up to the next octet boundary.
    pub fn pad_octet(&mut self) {
        while self.offset % 8 != 0 {
            self.write_bit(false);
        }
    }
    pub fn write_octet(&mut self, b: u8) {
        self.pad_octet();
        self.write_bits(b as u32, 8);
    }
    pub fn write_octets(&mut self, b: &[u8]) {
        self.pad_octet();
        for o in b.iter() {
            self.write_bits(*o as u32, 8);
        }
    }
    /// Write raw septet codes, padding with zero bits to the next septet boundary first.
    pub fn write_septet_codes(&mut self, codes: &[u8]) {
        for _ in 0..self.septet_fill() {
            self.write_bit(false);
        }
        for c in codes.iter() {
            self.write_bits((*c & 0x7F) as u32, 7);
        }
    }
    /// Encode `text` in the default alphabet (replacing anything unrepresentable with `?`) and
    /// write it as septets. Returns the number of septets written.
    pub fn write_septets(&mut self, text: &str) -> usize {
        let codes = gsm_encoding::gsm_encode_string_lossy(text);
        self.write_septet_codes(&codes);
        codes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_are_lsb_first() {
        let mut c = BitCursor::from_hex("10").unwrap();
        assert_eq!(c.read_bits(4).unwrap(), 0);
        assert_eq!(c.read_bits(4).unwrap(), 1);
        assert!(c.read_bit().is_err());
    }
    #[test]
    fn truncated_read_fails_without_moving() {
        let mut c = BitCursor::from_hex("FF").unwrap();
        c.read_bits(3).unwrap();
        match c.read_octet() {
            Err(GsmError::Truncated { .. }) => {},
            x => panic!("expected truncation, got {:?}", x)
        }
    }
    #[test]
    fn write_then_read_mixed_fields() {
        let mut c = BitCursor::new();
        c.write_bits(0b101010, 6);
        c.write_2bits(0b11);
        c.write_bits(0x9, 4);
        c.write_octet(0xAB);
        assert_eq!(c.to_hex(), "EA09AB");
        let mut r = BitCursor::from_octets(c.into_octets());
        assert_eq!(r.read_bits(6).unwrap(), 0b101010);
        assert_eq!(r.read_2bits().unwrap(), 0b11);
        assert_eq!(r.read_bits(4).unwrap(), 0x9);
        assert_eq!(r.read_octet().unwrap(), 0xAB);
        assert_eq!(r.remaining_bits(), 0);
    }
    #[test]
    fn septets_after_mark() {
        // "hello" packed after a one-octet header.
        let mut c = BitCursor::new();
        c.write_octet(0x42);
        c.mark_septet_boundary();
        assert_eq!(c.write_septets("hello"), 5);
        assert_eq!(c.to_hex(), "42E8329BFD06");
        let mut r = BitCursor::from_octets(c.into_octets());
        assert_eq!(r.read_octet().unwrap(), 0x42);
        r.mark_septet_boundary();
        assert_eq!(r.read_septets(5).unwrap(), "hello");
    }
    #[test]
    fn septet_fill_is_relative_to_mark() {
        // A 6-octet header needs one fill bit before the first septet.
        let mut c = BitCursor::new();
        c.mark_septet_boundary();
        c.write_octets(&[0x05, 0x00, 0x03, 0x01, 0x02, 0x01]);
        c.write_septet_codes(&[0x41]);
        assert_eq!(c.offset(), 48 + 1 + 7);
        let mut r = BitCursor::from_octets(c.into_octets());
        r.mark_septet_boundary();
        r.read_octets(6).unwrap();
        assert_eq!(r.read_septet_codes(1).unwrap(), vec![0x41]);
    }
    #[test]
    fn hex_decoding() {
        assert_eq!(HexData::decode("00ff10").unwrap(), vec![0x00, 0xFF, 0x10]);
        assert!(HexData::decode("0").is_err());
        assert!(HexData::decode("zz").is_err());
        assert_eq!(HexData(&[0x0A, 0xBC]).to_string(), "0ABC");
    }
}
