//! User data headers: the information elements that can precede the text of a message.
//!
//! The only element anything here understands is concatenation (8-bit and 16-bit reference);
//! everything else is kept as raw octets so it survives a decode/encode cycle.
use std::collections::HashMap;
use std::convert::TryFrom;
use crate::errors::*;

/// Information element identifier of an 8-bit reference concatenation header.
pub const IEI_CONCAT_8BIT: u8 = 0x00;
/// Information element identifier of a 16-bit reference concatenation header.
pub const IEI_CONCAT_16BIT: u8 = 0x08;

/// One information element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdhComponent {
    pub id: u8,
    pub data: Vec<u8>
}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDataHeader {
    pub components: Vec<UdhComponent>
}
/// Which part of which concatenated message a PDU carries.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ConcatenatedSmsData {
    /// Shared by every part of the same message (per sender).
    pub reference: u16,
    pub parts: u8,
    /// 1-based.
    pub sequence: u8
}
impl UserDataHeader {
    /// A header carrying only an 8-bit reference concatenation element.
    pub fn concatenated(reference: u8, parts: u8, sequence: u8) -> Self {
        UserDataHeader {
            components: vec![UdhComponent {
                id: IEI_CONCAT_8BIT,
                data: vec![reference, parts, sequence]
            }]
        }
    }
    /// The first well-formed concatenation element, if any.
    pub fn get_concatenated_sms_data(&self) -> Option<ConcatenatedSmsData> {
        self.components.iter()
            .filter_map(|c| match (c.id, &c.data[..]) {
                (IEI_CONCAT_8BIT, &[r, parts, sequence]) => {
                    Some(ConcatenatedSmsData { reference: r as u16, parts, sequence })
                },
                (IEI_CONCAT_16BIT, &[hi, lo, parts, sequence]) => {
                    Some(ConcatenatedSmsData { reference: u16::from_be_bytes([hi, lo]), parts, sequence })
                },
                _ => None
            })
            .next()
    }
    /// Wire form, starting with the header length octet.
    pub fn as_bytes(&self) -> Vec<u8> {
        let body = self.components.iter()
            .flat_map(|c| {
                [c.id, c.data.len() as u8].iter()
                    .cloned()
                    .chain(c.data.iter().cloned())
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        let mut ret = Vec::with_capacity(body.len() + 1);
        ret.push(body.len() as u8);
        ret.extend(body);
        ret
    }
}
impl<'a> TryFrom<&'a [u8]> for UserDataHeader {
    type Error = GsmError;
    /// Parses the elements that follow the header length octet (which must not be included).
    fn try_from(b: &[u8]) -> GsmResult<Self> {
        let mut rest = b;
        let mut components = vec![];
        while let Some((&id, tail)) = rest.split_first() {
            let (&len, tail) = tail.split_first()
                .ok_or_else(|| GsmError::InvalidPdu(format!("UDH element 0x{:02X} has no length", id)))?;
            let len = len as usize;
            if tail.len() < len {
                Err(GsmError::InvalidPdu(format!("UDH element 0x{:02X} wants {} octets, only {} left", id, len, tail.len())))?
            }
            components.push(UdhComponent { id, data: tail[..len].to_vec() });
            rest = &tail[len..];
        }
        debug!("parsed UDH with {} components", components.len());
        Ok(UserDataHeader { components })
    }
}

/// Collects the parts of concatenated messages and hands back the full text once every part of
/// one has arrived.
///
/// Parts are grouped by a caller-supplied sender key (usually the originating address) and the
/// concatenation reference, since references are only unique per sender.
#[derive(Debug, Default)]
pub struct Reassembler {
    pending: HashMap<(String, u16), Vec<Option<String>>>
}
impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }
    /// Number of messages still waiting for parts.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
    /// Add one part. Returns the whole text if this completed a message.
    pub fn push(&mut self, sender: &str, concat: ConcatenatedSmsData, text: &str) -> GsmResult<Option<String>> {
        if concat.parts == 0 || concat.sequence == 0 || concat.sequence > concat.parts {
            Err(GsmError::InvalidPdu(format!("concatenated part {} of {} makes no sense", concat.sequence, concat.parts)))?
        }
        let key = (sender.to_owned(), concat.reference);
        let complete = {
            let parts = self.pending.entry(key.clone())
                .or_insert_with(|| vec![None; concat.parts as usize]);
            if parts.len() != concat.parts as usize {
                Err(GsmError::InvalidPdu(format!("part count changed from {} to {} for reference {}", parts.len(), concat.parts, concat.reference)))?
            }
            parts[concat.sequence as usize - 1] = Some(text.to_owned());
            parts.iter().all(|p| p.is_some())
        };
        if !complete {
            return Ok(None);
        }
        let parts = self.pending.remove(&key).unwrap_or_default();
        debug!("reassembled {} parts from {} (reference {})", parts.len(), sender, concat.reference);
        Ok(Some(parts.into_iter().filter_map(|p| p).collect()))
    }
}
