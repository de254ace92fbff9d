//! SMS TPDUs: the six message variants of GSM 03.40, and their encoding and decoding.
//!
//! The two-bit message type indicator in the first octet means different things depending on
//! which way the message is travelling, so decoding needs a `Direction`. Every variant keeps only
//! the fields it actually carries; flags that are implied by other fields (the user data header
//! indicator, the validity period format) are derived on encode.
use std::convert::TryFrom;
use std::fmt;
use crate::errors::*;
use crate::gsm_encoding::{self, UserData, UserDataBody, MAX_OCTETS, MAX_SEPTETS};
use crate::gsm_encoding::lookup_tables::GSM_PAD;
use crate::gsm_encoding::udh::UserDataHeader;
use super::address::Address;
use super::cursor::{BitCursor, HexData};
use super::dcs::{Alphabet, DataCodingScheme};
use super::timestamp::{Timestamp, ValidityPeriod, VpFieldValidity};

/// Which way a PDU is travelling.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Service centre to mobile station: DELIVER, SUBMIT-REPORT and STATUS-REPORT.
    ScToMs,
    /// Mobile station to service centre: DELIVER-REPORT, SUBMIT and COMMAND.
    MsToSc
}

const MTI_MASK: u8 = 0b0000_0011;
const FO_MMS: u8 = 0b0000_0100;
const FO_RD: u8 = 0b0000_0100;
const FO_SRI: u8 = 0b0010_0000;
const FO_SRR: u8 = 0b0010_0000;
const FO_UDHI: u8 = 0b0100_0000;
const FO_RP: u8 = 0b1000_0000;

const PI_PID: u8 = 0b0000_0001;
const PI_DCS: u8 = 0b0000_0010;
const PI_UDL: u8 = 0b0000_0100;

fn flag(b: u8, mask: u8) -> bool {
    b & mask > 0
}
fn set(b: &mut u8, mask: u8, v: bool) {
    if v {
        *b |= mask;
    }
}
fn body_is_octets(dcs: DataCodingScheme) -> bool {
    match dcs.alphabet() {
        Alphabet::EightBit | Alphabet::Reserved => true,
        _ => dcs.compressed()
    }
}
/// Read TP-UDL and the user data that follows it.
fn read_user_data(cur: &mut BitCursor, dcs: DataCodingScheme, udhi: bool) -> GsmResult<UserData> {
    let udl = cur.read_octet()? as usize;
    cur.mark_septet_boundary();
    let (header, header_octets) = if udhi {
        let udhl = cur.read_octet()? as usize;
        let raw = cur.read_octets(udhl)?;
        (Some(UserDataHeader::try_from(&raw[..])?), udhl + 1)
    }
    else {
        (None, 0)
    };
    let body = if body_is_octets(dcs) {
        let n = udl.checked_sub(header_octets)
            .ok_or(GsmError::InvalidPdu(format!("user data length {} shorter than header", udl)))?;
        UserDataBody::Octets(cur.read_octets(n)?)
    }
    else if dcs.alphabet() == Alphabet::SixteenBit {
        let n = udl.checked_sub(header_octets)
            .ok_or(GsmError::InvalidPdu(format!("user data length {} shorter than header", udl)))?;
        UserDataBody::Text(gsm_encoding::ucs2_decode(&cur.read_octets(n)?))
    }
    else {
        let header_septets = (header_octets * 8 + 6) / 7;
        let n = udl.checked_sub(header_septets)
            .ok_or(GsmError::InvalidPdu(format!("user data length {} shorter than header", udl)))?;
        UserDataBody::Text(cur.read_septets(n)?)
    };
    Ok(UserData { header, body })
}
/// Write TP-UDL and the user data, in the alphabet `dcs` calls for.
fn write_user_data(cur: &mut BitCursor, dcs: DataCodingScheme, ud: &UserData) -> GsmResult<()> {
    let header = ud.header.as_ref()
        .map(|h| h.as_bytes())
        .unwrap_or_default();
    match (dcs.alphabet(), body_is_octets(dcs), &ud.body) {
        (_, true, &UserDataBody::Octets(ref data)) => {
            let udl = header.len() + data.len();
            if udl > MAX_OCTETS {
                Err(GsmError::parameter(format!("user data of {} octets doesn't fit in one message", udl)))?
            }
            cur.write_octet(udl as u8);
            cur.write_octets(&header);
            cur.write_octets(data);
        },
        (Alphabet::SixteenBit, false, &UserDataBody::Text(ref text)) => {
            let data = gsm_encoding::ucs2_encode(text);
            let udl = header.len() + data.len();
            if udl > MAX_OCTETS {
                Err(GsmError::parameter(format!("user data of {} octets doesn't fit in one message", udl)))?
            }
            cur.write_octet(udl as u8);
            cur.write_octets(&header);
            cur.write_octets(&data);
        },
        (Alphabet::Default7Bit, false, &UserDataBody::Text(ref text)) => {
            let codes = gsm_encoding::gsm_encode_string_lossy(text);
            let udl = (header.len() * 8 + 6) / 7 + codes.len();
            if udl > MAX_SEPTETS {
                Err(GsmError::parameter(format!("user data of {} septets doesn't fit in one message", udl)))?
            }
            cur.write_octet(udl as u8);
            cur.mark_septet_boundary();
            cur.write_octets(&header);
            cur.write_septet_codes(&codes);
            if cur.offset() % 8 == 1 {
                cur.write_septet_codes(&[GSM_PAD]);
            }
        },
        (alphabet, _, _) => {
            Err(GsmError::parameter(format!("user data body doesn't match the {:?} coding scheme", alphabet)))?
        }
    }
    Ok(())
}

/// SMS-DELIVER: a message from the service centre to the phone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeliverMessage {
    pub reply_path: bool,
    /// Set if the service centre will send a status report to the originator.
    pub status_report_indication: bool,
    pub more_messages_to_send: bool,
    pub originating_address: Address,
    pub protocol_identifier: u8,
    pub dcs: DataCodingScheme,
    pub service_centre_timestamp: Timestamp,
    pub user_data: UserData
}
impl DeliverMessage {
    fn decode(fo: u8, cur: &mut BitCursor) -> GsmResult<Self> {
        let originating_address = Address::read(cur)?;
        let protocol_identifier = cur.read_octet()?;
        let dcs = DataCodingScheme(cur.read_octet()?);
        let service_centre_timestamp = Timestamp::read(cur)?;
        let user_data = read_user_data(cur, dcs, flag(fo, FO_UDHI))?;
        Ok(DeliverMessage {
            reply_path: flag(fo, FO_RP),
            status_report_indication: flag(fo, FO_SRI),
            more_messages_to_send: !flag(fo, FO_MMS),
            originating_address, protocol_identifier, dcs, service_centre_timestamp, user_data
        })
    }
    fn encode(&self, cur: &mut BitCursor) -> GsmResult<()> {
        let mut fo = 0b00;
        set(&mut fo, FO_MMS, !self.more_messages_to_send);
        set(&mut fo, FO_SRI, self.status_report_indication);
        set(&mut fo, FO_UDHI, self.user_data.header.is_some());
        set(&mut fo, FO_RP, self.reply_path);
        cur.write_octet(fo);
        self.originating_address.write(cur)?;
        cur.write_octet(self.protocol_identifier);
        cur.write_octet(self.dcs.into());
        self.service_centre_timestamp.write(cur);
        write_user_data(cur, self.dcs, &self.user_data)
    }
}

/// SMS-SUBMIT: a message from the phone to the service centre.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitMessage {
    pub reject_duplicates: bool,
    pub reply_path: bool,
    pub status_report_request: bool,
    pub message_reference: u8,
    pub destination_address: Address,
    pub protocol_identifier: u8,
    pub dcs: DataCodingScheme,
    pub validity_period: ValidityPeriod,
    pub user_data: UserData
}
impl SubmitMessage {
    /// A plain message to `destination`, in the default alphabet if the text allows it and in
    /// UCS-2 otherwise.
    pub fn new(destination: Address, text: &str) -> Self {
        let alphabet = if gsm_encoding::try_gsm_encode_string(text).is_some() {
            Alphabet::Default7Bit
        }
        else {
            Alphabet::SixteenBit
        };
        SubmitMessage {
            destination_address: destination,
            dcs: DataCodingScheme::new(alphabet, None),
            user_data: UserData::text(text),
            ..Default::default()
        }
    }
    /// Make however many messages it takes to send `text` to `destination`. Parts of a
    /// concatenated message share `reference` (a random one if `None`).
    pub fn split(destination: Address, text: &str, reference: Option<u8>) -> GsmResult<Vec<Self>> {
        Ok(gsm_encoding::encode_message(text, reference)?
            .into_iter()
            .map(|seg| SubmitMessage {
                destination_address: destination.clone(),
                dcs: DataCodingScheme::new(seg.alphabet, None),
                user_data: seg.user_data,
                ..Default::default()
            })
            .collect())
    }
    fn decode(fo: u8, cur: &mut BitCursor) -> GsmResult<Self> {
        let message_reference = cur.read_octet()?;
        let destination_address = Address::read(cur)?;
        let protocol_identifier = cur.read_octet()?;
        let dcs = DataCodingScheme(cur.read_octet()?);
        let validity_period = ValidityPeriod::read(cur, VpFieldValidity::from_first_octet(fo))?;
        let user_data = read_user_data(cur, dcs, flag(fo, FO_UDHI))?;
        Ok(SubmitMessage {
            reject_duplicates: flag(fo, FO_RD),
            reply_path: flag(fo, FO_RP),
            status_report_request: flag(fo, FO_SRR),
            message_reference, destination_address, protocol_identifier, dcs,
            validity_period, user_data
        })
    }
    fn encode(&self, cur: &mut BitCursor) -> GsmResult<()> {
        let mut fo = 0b01 | self.validity_period.format() as u8;
        set(&mut fo, FO_RD, self.reject_duplicates);
        set(&mut fo, FO_SRR, self.status_report_request);
        set(&mut fo, FO_UDHI, self.user_data.header.is_some());
        set(&mut fo, FO_RP, self.reply_path);
        cur.write_octet(fo);
        cur.write_octet(self.message_reference);
        self.destination_address.write(cur)?;
        cur.write_octet(self.protocol_identifier);
        cur.write_octet(self.dcs.into());
        self.validity_period.write(cur);
        write_user_data(cur, self.dcs, &self.user_data)
    }
}

/// The optional trailer shared by both report types: a parameter indicator octet, then whichever
/// of PID, DCS and user data it says are present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportParameters {
    pub protocol_identifier: Option<u8>,
    pub dcs: Option<DataCodingScheme>,
    pub user_data: Option<UserData>
}
impl ReportParameters {
    fn decode(fo: u8, cur: &mut BitCursor) -> GsmResult<Self> {
        if cur.remaining_octets() == 0 {
            return Ok(Self::default());
        }
        let pi = cur.read_octet()?;
        let protocol_identifier = if flag(pi, PI_PID) {
            Some(cur.read_octet()?)
        }
        else {
            None
        };
        let dcs = if flag(pi, PI_DCS) {
            Some(DataCodingScheme(cur.read_octet()?))
        }
        else {
            None
        };
        let user_data = if flag(pi, PI_UDL) {
            Some(read_user_data(cur, dcs.unwrap_or_default(), flag(fo, FO_UDHI))?)
        }
        else {
            None
        };
        Ok(ReportParameters { protocol_identifier, dcs, user_data })
    }
    fn has_header(&self) -> bool {
        self.user_data.as_ref().map(|u| u.header.is_some()).unwrap_or(false)
    }
    fn encode(&self, cur: &mut BitCursor) -> GsmResult<()> {
        let mut pi = 0;
        set(&mut pi, PI_PID, self.protocol_identifier.is_some());
        set(&mut pi, PI_DCS, self.dcs.is_some());
        set(&mut pi, PI_UDL, self.user_data.is_some());
        cur.write_octet(pi);
        if let Some(pid) = self.protocol_identifier {
            cur.write_octet(pid);
        }
        if let Some(dcs) = self.dcs {
            cur.write_octet(dcs.into());
        }
        if let Some(ref ud) = self.user_data {
            write_user_data(cur, self.dcs.unwrap_or_default(), ud)?;
        }
        Ok(())
    }
}

/// SMS-DELIVER-REPORT: the phone's acknowledgement of a DELIVER.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeliverReportMessage {
    pub parameters: ReportParameters
}
impl DeliverReportMessage {
    fn decode(fo: u8, cur: &mut BitCursor) -> GsmResult<Self> {
        Ok(DeliverReportMessage {
            parameters: ReportParameters::decode(fo, cur)?
        })
    }
    fn encode(&self, cur: &mut BitCursor) -> GsmResult<()> {
        let mut fo = 0b00;
        set(&mut fo, FO_UDHI, self.parameters.has_header());
        cur.write_octet(fo);
        self.parameters.encode(cur)
    }
}

/// SMS-SUBMIT-REPORT: the service centre's acknowledgement of a SUBMIT.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitReportMessage {
    pub service_centre_timestamp: Timestamp,
    pub parameters: ReportParameters
}
impl SubmitReportMessage {
    fn decode(fo: u8, cur: &mut BitCursor) -> GsmResult<Self> {
        // the parameter indicator comes before the timestamp here
        let pi = cur.read_octet()?;
        let service_centre_timestamp = Timestamp::read(cur)?;
        let mut rest = BitCursor::from_octets(
            Some(pi).into_iter().chain(cur.read_remaining_octets()?).collect()
        );
        Ok(SubmitReportMessage {
            service_centre_timestamp,
            parameters: ReportParameters::decode(fo, &mut rest)?
        })
    }
    fn encode(&self, cur: &mut BitCursor) -> GsmResult<()> {
        let mut fo = 0b01;
        set(&mut fo, FO_UDHI, self.parameters.has_header());
        cur.write_octet(fo);
        let mut rest = BitCursor::new();
        self.parameters.encode(&mut rest)?;
        let rest = rest.into_octets();
        cur.write_octet(rest[0]);
        self.service_centre_timestamp.write(cur);
        cur.write_octets(&rest[1..]);
        Ok(())
    }
}

/// SMS-STATUS-REPORT: tells the phone what became of a message it submitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusReportMessage {
    pub more_messages_to_send: bool,
    /// Set if this reports on an SMS-COMMAND rather than an SMS-SUBMIT.
    pub status_report_qualifier: bool,
    pub message_reference: u8,
    pub recipient_address: Address,
    pub service_centre_timestamp: Timestamp,
    pub discharge_time: Timestamp,
    pub status: u8
}
impl StatusReportMessage {
    fn decode(fo: u8, cur: &mut BitCursor) -> GsmResult<Self> {
        Ok(StatusReportMessage {
            more_messages_to_send: !flag(fo, FO_MMS),
            status_report_qualifier: flag(fo, FO_SRR),
            message_reference: cur.read_octet()?,
            recipient_address: Address::read(cur)?,
            service_centre_timestamp: Timestamp::read(cur)?,
            discharge_time: Timestamp::read(cur)?,
            status: cur.read_octet()?
        })
    }
    fn encode(&self, cur: &mut BitCursor) -> GsmResult<()> {
        let mut fo = 0b10;
        set(&mut fo, FO_MMS, !self.more_messages_to_send);
        set(&mut fo, FO_SRR, self.status_report_qualifier);
        cur.write_octet(fo);
        cur.write_octet(self.message_reference);
        self.recipient_address.write(cur)?;
        self.service_centre_timestamp.write(cur);
        self.discharge_time.write(cur);
        cur.write_octet(self.status);
        Ok(())
    }
    /// Whether the status says the message got where it was going.
    pub fn delivered(&self) -> bool {
        self.status <= 0x1F
    }
}

/// SMS-COMMAND: asks the service centre to do something to a message submitted earlier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandMessage {
    pub status_report_request: bool,
    pub message_reference: u8,
    pub protocol_identifier: u8,
    pub command_type: u8,
    pub message_number: u8,
    pub destination_address: Address,
    pub command_data: Vec<u8>
}
impl CommandMessage {
    fn decode(fo: u8, cur: &mut BitCursor) -> GsmResult<Self> {
        let message_reference = cur.read_octet()?;
        let protocol_identifier = cur.read_octet()?;
        let command_type = cur.read_octet()?;
        let message_number = cur.read_octet()?;
        let destination_address = Address::read(cur)?;
        let cdl = cur.read_octet()? as usize;
        let command_data = cur.read_octets(cdl)?;
        Ok(CommandMessage {
            status_report_request: flag(fo, FO_SRR),
            message_reference, protocol_identifier, command_type, message_number,
            destination_address, command_data
        })
    }
    fn encode(&self, cur: &mut BitCursor) -> GsmResult<()> {
        if self.command_data.len() > 157 {
            Err(GsmError::parameter(format!("{} octets of command data is too many", self.command_data.len())))?
        }
        let mut fo = 0b10;
        set(&mut fo, FO_SRR, self.status_report_request);
        cur.write_octet(fo);
        cur.write_octet(self.message_reference);
        cur.write_octet(self.protocol_identifier);
        cur.write_octet(self.command_type);
        cur.write_octet(self.message_number);
        self.destination_address.write(cur)?;
        cur.write_octet(self.command_data.len() as u8);
        cur.write_octets(&self.command_data);
        Ok(())
    }
}

/// Any SMS TPDU.
#[derive(Debug, Clone, PartialEq, Eq, is_enum_variant)]
pub enum SmsMessage {
    Deliver(DeliverMessage),
    DeliverReport(DeliverReportMessage),
    Submit(SubmitMessage),
    SubmitReport(SubmitReportMessage),
    StatusReport(StatusReportMessage),
    Command(CommandMessage)
}
impl SmsMessage {
    /// Decode a TPDU (no service centre address in front), travelling in `direction`.
    pub fn decode_tpdu(cur: &mut BitCursor, direction: Direction) -> GsmResult<Self> {
        use self::Direction::*;
        let fo = cur.read_octet()?;
        let ret = match (direction, fo & MTI_MASK) {
            (ScToMs, 0b00) => SmsMessage::Deliver(DeliverMessage::decode(fo, cur)?),
            (ScToMs, 0b01) => SmsMessage::SubmitReport(SubmitReportMessage::decode(fo, cur)?),
            (ScToMs, 0b10) => SmsMessage::StatusReport(StatusReportMessage::decode(fo, cur)?),
            (MsToSc, 0b00) => SmsMessage::DeliverReport(DeliverReportMessage::decode(fo, cur)?),
            (MsToSc, 0b01) => SmsMessage::Submit(SubmitMessage::decode(fo, cur)?),
            (MsToSc, 0b10) => SmsMessage::Command(CommandMessage::decode(fo, cur)?),
            _ => Err(GsmError::UnknownMessageType(fo))?
        };
        trace!("decoded {} ({} bits left over)", ret.type_name(), cur.remaining_bits());
        Ok(ret)
    }
    pub fn encode_tpdu(&self, cur: &mut BitCursor) -> GsmResult<()> {
        use self::SmsMessage::*;
        match *self {
            Deliver(ref m) => m.encode(cur),
            DeliverReport(ref m) => m.encode(cur),
            Submit(ref m) => m.encode(cur),
            SubmitReport(ref m) => m.encode(cur),
            StatusReport(ref m) => m.encode(cur),
            Command(ref m) => m.encode(cur)
        }
    }
    /// The direction this kind of message travels in.
    pub fn direction(&self) -> Direction {
        use self::SmsMessage::*;
        match *self {
            Deliver(_) | SubmitReport(_) | StatusReport(_) => Direction::ScToMs,
            DeliverReport(_) | Submit(_) | Command(_) => Direction::MsToSc
        }
    }
    pub fn type_name(&self) -> &'static str {
        use self::SmsMessage::*;
        match *self {
            Deliver(_) => "SMS-DELIVER",
            DeliverReport(_) => "SMS-DELIVER-REPORT",
            Submit(_) => "SMS-SUBMIT",
            SubmitReport(_) => "SMS-SUBMIT-REPORT",
            StatusReport(_) => "SMS-STATUS-REPORT",
            Command(_) => "SMS-COMMAND"
        }
    }
    /// The other party: originator of a DELIVER, destination of a SUBMIT or COMMAND, recipient
    /// of a STATUS-REPORT.
    pub fn address(&self) -> Option<&Address> {
        use self::SmsMessage::*;
        match *self {
            Deliver(ref m) => Some(&m.originating_address),
            Submit(ref m) => Some(&m.destination_address),
            StatusReport(ref m) => Some(&m.recipient_address),
            Command(ref m) => Some(&m.destination_address),
            DeliverReport(_) | SubmitReport(_) => None
        }
    }
    pub fn service_centre_timestamp(&self) -> Option<&Timestamp> {
        use self::SmsMessage::*;
        match *self {
            Deliver(ref m) => Some(&m.service_centre_timestamp),
            SubmitReport(ref m) => Some(&m.service_centre_timestamp),
            StatusReport(ref m) => Some(&m.service_centre_timestamp),
            _ => None
        }
    }
    pub fn user_data(&self) -> Option<&UserData> {
        use self::SmsMessage::*;
        match *self {
            Deliver(ref m) => Some(&m.user_data),
            Submit(ref m) => Some(&m.user_data),
            DeliverReport(ref m) => m.parameters.user_data.as_ref(),
            SubmitReport(ref m) => m.parameters.user_data.as_ref(),
            StatusReport(_) | Command(_) => None
        }
    }
    /// The message text, if it has any.
    pub fn text(&self) -> Option<&str> {
        self.user_data().and_then(|u| u.as_text())
    }
}

/// A whole PDU, as exchanged with a modem: an optional service centre address, then the TPDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsPdu {
    pub sca: Option<Address>,
    pub message: SmsMessage
}
impl SmsPdu {
    pub fn new(message: SmsMessage) -> Self {
        SmsPdu { sca: None, message }
    }
    pub fn set_sca(&mut self, sca: Address) {
        self.sca = Some(sca);
    }
    /// Decode a PDU from hex. Nothing is returned unless the whole PDU decodes.
    pub fn decode(data: &str, direction: Direction) -> GsmResult<Self> {
        let mut cur = BitCursor::from_hex(data)?;
        let sca = Address::read_sc(&mut cur)?;
        let message = SmsMessage::decode_tpdu(&mut cur, direction)?;
        Ok(SmsPdu { sca, message })
    }
    /// Serialize to octets, returning them along with the TPDU length (the length `AT+CMGS`
    /// wants).
    pub fn as_bytes(&self) -> GsmResult<(Vec<u8>, usize)> {
        let mut cur = BitCursor::new();
        Address::write_sc(self.sca.as_ref(), &mut cur)?;
        let sca_len = cur.as_octets().len();
        self.message.encode_tpdu(&mut cur)?;
        let ret = cur.into_octets();
        let tpdu_len = ret.len() - sca_len;
        Ok((ret, tpdu_len))
    }
    pub fn encode(&self) -> GsmResult<String> {
        let (bytes, _) = self.as_bytes()?;
        Ok(HexData(&bytes).to_string())
    }
}
impl fmt::Display for SmsPdu {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message.type_name())?;
        if let Some(ref sca) = self.sca {
            write!(f, " via {}", sca)?;
        }
        if let Some(a) = self.message.address() {
            write!(f, ", address {}", a)?;
        }
        if let Some(ts) = self.message.service_centre_timestamp() {
            write!(f, ", sent {}", ts)?;
        }
        if let Some(t) = self.message.text() {
            write!(f, ": {}", t)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::address::TypeOfNumber;

    const ALNUM_DELIVER: &str = "07911497941902F00414D0E474989D769F5DE4320839001040122151820000";

    #[test]
    fn decode_alphanumeric_deliver() {
        let pdu = SmsPdu::decode(ALNUM_DELIVER, Direction::ScToMs).unwrap();
        assert_eq!(pdu.sca.as_ref().unwrap().to_string(), "+41794991200");
        let m = match pdu.message {
            SmsMessage::Deliver(ref m) => m,
            ref x => panic!("expected DELIVER, got {:?}", x)
        };
        assert_eq!(m.originating_address.type_addr.type_of_number, TypeOfNumber::Alphanumeric);
        assert_eq!(m.originating_address.number, "dialing.de ");
        assert_eq!(m.protocol_identifier, 0x39);
        assert_eq!(m.service_centre_timestamp.day, 21);
        assert!(!m.more_messages_to_send);
        assert_eq!(pdu.message.text(), Some(""));
        assert_eq!(pdu.encode().unwrap(), ALNUM_DELIVER);
    }
    #[test]
    fn submit_with_validity_and_header() {
        let mut m = SubmitMessage::new("+491710000".parse().unwrap(), "hi there");
        m.validity_period = ValidityPeriod::Relative(0xA7);
        m.status_report_request = true;
        m.message_reference = 12;
        m.user_data.header = Some(UserDataHeader::concatenated(7, 2, 1));
        let pdu = SmsPdu::new(SmsMessage::Submit(m));
        let hex = pdu.encode().unwrap();
        // first octet: SUBMIT, relative VP, SRR, UDHI
        assert_eq!(&hex[2..4], "71");
        let back = SmsPdu::decode(&hex, Direction::MsToSc).unwrap();
        assert_eq!(back, pdu);
    }
    #[test]
    fn submit_ucs2() {
        let m = SubmitMessage::new("12345".parse().unwrap(), "Привет");
        assert_eq!(m.dcs.alphabet(), Alphabet::SixteenBit);
        let pdu = SmsPdu::new(SmsMessage::Submit(m));
        let (bytes, tpdu_len) = pdu.as_bytes().unwrap();
        assert_eq!(bytes.len(), tpdu_len + 1);
        assert_eq!(SmsPdu::decode(&pdu.encode().unwrap(), Direction::MsToSc).unwrap(), pdu);
    }
    #[test]
    fn eight_bit_body_must_be_octets() {
        let mut m = SubmitMessage::new("123".parse().unwrap(), "text");
        m.dcs = DataCodingScheme::new(Alphabet::EightBit, None);
        assert!(SmsPdu::new(SmsMessage::Submit(m.clone())).encode().is_err());
        m.user_data.body = UserDataBody::Octets(vec![0xDE, 0xAD]);
        let pdu = SmsPdu::new(SmsMessage::Submit(m));
        assert_eq!(SmsPdu::decode(&pdu.encode().unwrap(), Direction::MsToSc).unwrap(), pdu);
    }
    #[test]
    fn unknown_type_indicator() {
        match SmsPdu::decode("0003", Direction::ScToMs) {
            Err(GsmError::UnknownMessageType(0x03)) => {},
            x => panic!("expected unknown type, got {:?}", x)
        }
    }
    #[test]
    fn direction_selects_variant() {
        let pdu = SmsPdu::new(SmsMessage::Command(CommandMessage::default()));
        let hex = pdu.encode().unwrap();
        assert!(SmsPdu::decode(&hex, Direction::MsToSc).unwrap().message.is_command());
        // the same first octet read the other way is a STATUS-REPORT, which needs more fields
        assert!(SmsPdu::decode(&hex, Direction::ScToMs).is_err());
    }
    #[test]
    fn truncated_deliver_yields_nothing() {
        let short = &ALNUM_DELIVER[..ALNUM_DELIVER.len() - 6];
        match SmsPdu::decode(short, Direction::ScToMs) {
            Err(e) => assert_eq!(e.kind(), ErrorKind::Decode),
            Ok(m) => panic!("decoded a truncated PDU: {:?}", m)
        }
    }
    #[test]
    fn too_long_for_one_message() {
        let text = "a".repeat(161);
        let m = SubmitMessage::new("1".parse().unwrap(), &text);
        assert!(SmsPdu::new(SmsMessage::Submit(m)).encode().is_err());
        let parts = SubmitMessage::split("1".parse().unwrap(), &text, Some(3)).unwrap();
        assert_eq!(parts.len(), 2);
        for p in parts {
            SmsPdu::new(SmsMessage::Submit(p)).encode().unwrap();
        }
    }
    #[test]
    fn emoji_parts_each_fit() {
        let text = "\u{1F600}".repeat(71);
        let parts = SubmitMessage::split("1".parse().unwrap(), &text, Some(1)).unwrap();
        assert_eq!(parts.len(), 3);
        let mut joined = String::new();
        for p in parts {
            let hex = SmsPdu::new(SmsMessage::Submit(p)).encode().unwrap();
            let back = SmsPdu::decode(&hex, Direction::MsToSc).unwrap();
            joined.push_str(back.message.text().unwrap());
        }
        assert_eq!(joined, text);
    }
}
