//! Entries of an SMS store (the messages kept on a SIM, in a phone, or in a file).
use std::fmt;
use crate::errors::*;
use crate::util::GsmFromPrimitive;
use crate::pdu::{Direction, SmsMessage, SmsPdu};
use super::{SortKey, SortOrder, StoreEntry};

/// The storage status of a stored message, as reported by `AT+CMGL`.
#[repr(u8)]
#[derive(Debug, FromPrimitive, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageStatus {
    /// Received and unread.
    ReceivedUnread = 0,
    /// Received and read.
    ReceivedRead = 1,
    /// Outgoing and unsent.
    StoredUnsent = 2,
    /// Outgoing and sent.
    StoredSent = 3
}
impl MessageStatus {
    /// Which way messages with this status travelled.
    pub fn direction(&self) -> Direction {
        match *self {
            MessageStatus::ReceivedUnread | MessageStatus::ReceivedRead => Direction::ScToMs,
            MessageStatus::StoredUnsent | MessageStatus::StoredSent => Direction::MsToSc
        }
    }
}
impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::MessageStatus::*;
        let s = match *self {
            ReceivedUnread => "Unread",
            ReceivedRead => "Read",
            StoredUnsent => "Unsent",
            StoredSent => "Sent"
        };
        write!(f, "{}", s)
    }
}

/// A slot in an SMS store. Slots without a message are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsStoreEntry {
    pub index: Option<u32>,
    pub status: MessageStatus,
    pub pdu: Option<SmsPdu>
}
impl SmsStoreEntry {
    /// An entry for a message about to be stored; outgoing messages start out unsent, incoming
    /// ones unread.
    pub fn new(pdu: SmsPdu) -> Self {
        let status = match pdu.message.direction() {
            Direction::MsToSc => MessageStatus::StoredUnsent,
            Direction::ScToMs => MessageStatus::ReceivedUnread
        };
        SmsStoreEntry { index: None, status, pdu: Some(pdu) }
    }
    /// Decode a stored message as listed by the device: its index, numeric status and PDU.
    pub fn decode_stored(index: u32, status: u32, data: &str) -> GsmResult<Self> {
        let status = MessageStatus::from_integer(status)?;
        let pdu = SmsPdu::decode(data, status.direction())?;
        Ok(SmsStoreEntry { index: Some(index), status, pdu: Some(pdu) })
    }
    pub fn message(&self) -> Option<&SmsMessage> {
        self.pdu.as_ref().map(|p| &p.message)
    }
}
impl fmt::Display for SmsStoreEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(i) = self.index {
            write!(f, "index #{} ", i)?;
        }
        match self.pdu {
            Some(ref p) => write!(f, "[{}] {}", self.status, p),
            None => write!(f, "(empty)")
        }
    }
}
impl StoreEntry for SmsStoreEntry {
    fn index(&self) -> Option<u32> {
        self.index
    }
    fn set_index(&mut self, index: Option<u32>) {
        self.index = index;
    }
    fn is_empty(&self) -> bool {
        self.pdu.is_none()
    }
    fn supports_order(_: SortOrder) -> bool {
        true
    }
    fn sort_key(&self, order: SortOrder) -> Option<SortKey> {
        Some(match order {
            SortOrder::ByIndex => SortKey::Index(self.index.unwrap_or(0)),
            SortOrder::ByText => SortKey::text(&self.text()),
            SortOrder::ByTelephone => SortKey::Telephone(self.telephone()),
            SortOrder::ByDate => {
                SortKey::Date(self.message().and_then(|m| m.service_centre_timestamp()).cloned())
            }
        })
    }
    /// Stored messages are the same if their PDUs are; the status doesn't count.
    fn content_eq(&self, other: &Self) -> bool {
        self.pdu == other.pdu
    }
    fn text(&self) -> String {
        self.message()
            .and_then(|m| m.text())
            .unwrap_or("")
            .to_owned()
    }
    fn telephone(&self) -> String {
        self.message()
            .and_then(|m| m.address())
            .map(|a| a.to_string())
            .unwrap_or_default()
    }
}
