//! Text in SMS and cell broadcast messages: the GSM 03.38 default alphabet, UCS-2, and splitting
//! long texts into concatenated parts.
//!
//! Default-alphabet text goes through two steps. Characters map to 7-bit codes (one code per
//! byte here, called *unpacked* septets; extension characters take two), and then the codes get
//! packed eight to every seven octets. `pdu::BitCursor` does the packing inside a PDU;
//! `pack_septets` and `unpack_septets` do it for a bare buffer.

use crate::pdu::{Alphabet, BitCursor};
use crate::errors::*;

pub mod lookup_tables;
pub mod udh;

use self::udh::{UserDataHeader, UdhComponent};
use self::lookup_tables::*;

/// Maximum number of septets in the user data of one SMS.
pub const MAX_SEPTETS: usize = 160;
/// Maximum number of octets in the user data of one SMS.
pub const MAX_OCTETS: usize = 140;

/// Decode a GSM 7-bit-encoded buffer into a string.
///
/// **Warning:** You need to unpack the string first; this method operates on unpacked septets, not
/// packed septets. See `unpack_septets` for that.
///
/// This method is lossy, and doesn't complain about crap that it can't decode. An escape followed by
/// a code that has no extension character decodes as the default-table character for that code.
pub fn gsm_decode_string(input: &[u8]) -> String {
    let mut ret = String::new();
    let mut skip = false;
    for (i, b) in input.iter().enumerate() {
        if skip {
            skip = false;
            continue;
        }
        match *b {
            GSM_ESCAPE => {
                if let Some(next) = input.get(i+1) {
                    skip = true;
                    match GSM_EXTENDED_ENCODING_TABLE.iter().find(|&&(_, val)| val == *next) {
                        Some(&(ch, _)) => ret.push(ch),
                        None => push_default(&mut ret, *next)
                    }
                }
            },
            b => push_default(&mut ret, b)
        }
    }
    ret
}
fn push_default(ret: &mut String, b: u8) {
    match b {
        b'A' ..= b'Z' | b'a' ..= b'z' | b'0' ..= b'9' => {
            ret.push(b as char);
        },
        b => {
            if let Some(&(ch, _)) = GSM_ENCODING_TABLE.iter().find(|&&(_, val)| val == b) {
                ret.push(ch);
            }
        }
    }
}
/// Tries to encode a character into the given destination buffer, returning `true` if the
/// character was successfully encoded, and `false` if the character cannot be represented in the
/// GSM 7-bit encoding.
pub fn try_gsm_encode_char(b: char, dest: &mut Vec<u8>) -> bool {
    match b {
        'A' ..= 'Z' | 'a' ..= 'z' | '0' ..= '9' => {
            dest.push(b as u8);
            return true;
        },
        b => {
            for &(ch, val) in GSM_ENCODING_TABLE.iter() {
                if b == ch {
                    dest.push(val);
                    return true;
                }
            }
            for &(ch, val) in GSM_EXTENDED_ENCODING_TABLE.iter() {
                if b == ch {
                    dest.push(GSM_ESCAPE);
                    dest.push(val);
                    return true;
                }
            }
        }
    }
    false
}
/// Map `input` to unpacked septets, or `None` if any character isn't in the default alphabet
/// (or its extension table).
pub fn try_gsm_encode_string(input: &str) -> Option<Vec<u8>> {
    let mut ret = Vec::with_capacity(input.len());
    if input.chars().all(|c| try_gsm_encode_char(c, &mut ret)) {
        Some(ret)
    }
    else {
        None
    }
}
/// Like `try_gsm_encode_string`, but anything unrepresentable becomes `?`.
pub fn gsm_encode_string_lossy(input: &str) -> Vec<u8> {
    let mut ret = Vec::with_capacity(input.len());
    for c in input.chars() {
        if !try_gsm_encode_char(c, &mut ret) {
            ret.push(b'?');
        }
    }
    ret
}
/// Pack `text` into octets, 8 septets to every 7 octets.
///
/// If the last octet would be left with 7 spare bits (which a receiver couldn't tell apart from
/// an `@`), they're filled with a carriage return.
pub fn pack_septets(text: &str) -> Vec<u8> {
    let mut codes = gsm_encode_string_lossy(text);
    if codes.len() % 8 == 7 {
        codes.push(GSM_PAD);
    }
    let mut cur = BitCursor::new();
    cur.write_septet_codes(&codes);
    cur.into_octets()
}
/// Unpack exactly `count` septets from `octets` and decode them.
pub fn unpack_septets(octets: &[u8], count: usize) -> GsmResult<String> {
    let mut cur = BitCursor::from_octets(octets.to_owned());
    cur.read_septets(count)
}
/// Unpack as many septets as fit in `octets`, dropping a trailing pad character put there by
/// `pack_septets`.
pub fn unpack_septets_all(octets: &[u8]) -> String {
    let count = octets.len() * 8 / 7;
    let mut cur = BitCursor::from_octets(octets.to_owned());
    // can't fail: `count` septets always fit
    let mut codes = cur.read_septet_codes(count).unwrap_or_default();
    if count % 8 == 0 && codes.last() == Some(&GSM_PAD) {
        codes.pop();
    }
    gsm_decode_string(&codes)
}
/// Encode text as UCS-2 (big-endian UTF-16).
pub fn ucs2_encode(text: &str) -> Vec<u8> {
    use encoding::{Encoding, EncoderTrap};
    use encoding::all::UTF_16BE;
    UTF_16BE.encode(text, EncoderTrap::Replace)
        .unwrap_or_default()
}
/// Decode UCS-2 (big-endian UTF-16) octets, replacing anything malformed.
pub fn ucs2_decode(octets: &[u8]) -> String {
    use encoding::{Encoding, DecoderTrap};
    use encoding::all::UTF_16BE;
    UTF_16BE.decode(octets, DecoderTrap::Replace)
        .unwrap_or_default()
}
/// Split `buf` into chunks of at most `max_len`, never separating an escape from the code after it.
fn split_septets(buf: Vec<u8>, max_len: usize) -> Vec<Vec<u8>> {
    let mut ret = vec![];
    let mut cbuf = buf;
    while max_len < cbuf.len() {
        let mut at = max_len;
        if cbuf[at - 1] == GSM_ESCAPE {
            at -= 1;
        }
        let split = cbuf.split_off(at);
        let old = ::std::mem::replace(&mut cbuf, split);
        ret.push(old);
    }
    ret.push(cbuf);
    ret
}
/// Split `text` into runs of at most `max_units` UTF-16 code units, never separating the two
/// halves of a surrogate pair.
fn split_utf16(text: &str, max_units: usize) -> Vec<String> {
    let mut ret = vec![];
    let mut cur = String::new();
    let mut units = 0;
    for c in text.chars() {
        let n = c.len_utf16();
        if units + n > max_units {
            ret.push(::std::mem::replace(&mut cur, String::new()));
            units = 0;
        }
        cur.push(c);
        units += n;
    }
    ret.push(cur);
    ret
}

/// The body of a message's user data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserDataBody {
    /// Text (default alphabet or UCS-2).
    Text(String),
    /// Raw octets (8-bit data, or an alphabet we don't understand).
    Octets(Vec<u8>)
}
impl Default for UserDataBody {
    fn default() -> Self {
        UserDataBody::Text(String::new())
    }
}
/// TP-User-Data: an optional header followed by the body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserData {
    pub header: Option<UserDataHeader>,
    pub body: UserDataBody
}
impl UserData {
    pub fn text<S: Into<String>>(text: S) -> Self {
        UserData { header: None, body: UserDataBody::Text(text.into()) }
    }
    /// The text in this user data, if it's text.
    pub fn as_text(&self) -> Option<&str> {
        match self.body {
            UserDataBody::Text(ref t) => Some(t),
            UserDataBody::Octets(_) => None
        }
    }
}
/// One part of a (possibly concatenated) message, ready to be put into a PDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSegment {
    pub alphabet: Alphabet,
    pub user_data: UserData
}
/// Encode an arbitrary string of text into one, or multiple, message segments.
///
/// Text that fits the default alphabet is sent as such, otherwise as UCS-2. If this function
/// returns more than one segment, the text has been split into concatenated parts for you, each
/// carrying a header with `reference` (a random one if `None`), and you'll need to send each part
/// individually, in order.
///
/// Fails if the text would need more than 255 parts.
pub fn encode_message(msg: &str, reference: Option<u8>) -> GsmResult<Vec<MessageSegment>> {
    let concat = |parts: Vec<UserDataBody>, alphabet: Alphabet| -> GsmResult<Vec<MessageSegment>> {
        if parts.len() > u8::MAX as usize {
            Err(GsmError::parameter(format!("message needs {} parts, but at most 255 can be concatenated", parts.len())))?
        }
        let csms_ref = reference.unwrap_or_else(rand::random::<u8>);
        let num_parts = parts.len() as u8;
        debug!("splitting message into {} parts, reference {}", num_parts, csms_ref);
        Ok(parts.into_iter()
            .enumerate()
            .map(|(i, body)| {
                let header = UserDataHeader {
                    components: vec![UdhComponent {
                        id: 0,
                        data: vec![csms_ref, num_parts, i as u8 + 1]
                    }]
                };
                MessageSegment {
                    alphabet,
                    user_data: UserData { header: Some(header), body }
                }
            })
            .collect())
    };
    if let Some(buf) = try_gsm_encode_string(msg) {
        if buf.len() > MAX_SEPTETS {
            // time to make a Concatenated SMS: 7 septets go to the header
            let parts = split_septets(buf, MAX_SEPTETS - 7)
                .into_iter()
                .map(|b| UserDataBody::Text(gsm_decode_string(&b)))
                .collect();
            concat(parts, Alphabet::Default7Bit)
        }
        else {
            Ok(vec![MessageSegment {
                alphabet: Alphabet::Default7Bit,
                user_data: UserData::text(msg)
            }])
        }
    }
    else {
        let units = msg.encode_utf16().count();
        if units * 2 > MAX_OCTETS {
            let parts = split_utf16(msg, (MAX_OCTETS - 6) / 2)
                .into_iter()
                .map(UserDataBody::Text)
                .collect();
            concat(parts, Alphabet::SixteenBit)
        }
        else {
            Ok(vec![MessageSegment {
                alphabet: Alphabet::SixteenBit,
                user_data: UserData::text(msg)
            }])
        }
    }
}
