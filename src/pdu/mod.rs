//! Types for dealing with SMS and cell broadcast PDUs.
//!
//! Everything goes through a `BitCursor`: decoding reads fields off one in wire order, encoding
//! writes them onto a fresh one. The main entry points are `SmsPdu::decode` /
//! `SmsPdu::encode` for SMS, and `CbMessage::decode` / `CbMessage::encode` for cell broadcast.
pub mod address;
pub mod cb;
pub mod cursor;
pub mod dcs;
pub mod sms;
pub mod timestamp;

pub use self::address::{Address, AddressType, NumberingPlanIdentification, TypeOfNumber};
pub use self::cb::{CbMessage, GeographicalScope};
pub use self::cursor::{BitCursor, HexData};
pub use self::dcs::{Alphabet, CbDataCodingScheme, DataCodingScheme, Language, MessageClass, MessageWaitingType};
pub use self::sms::{
    CommandMessage, DeliverMessage, DeliverReportMessage, Direction, ReportParameters, SmsMessage,
    SmsPdu, StatusReportMessage, SubmitMessage, SubmitReportMessage
};
pub use self::timestamp::{Timestamp, ValidityPeriod, VpFieldValidity};
