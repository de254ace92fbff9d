use gsmkit::gsm_encoding::{self, UserData, UserDataBody};
use gsmkit::gsm_encoding::udh::{Reassembler, UserDataHeader};
use gsmkit::pdu::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}
fn round_trip(pdu: SmsPdu) {
    let hex = pdu.encode().unwrap();
    let back = SmsPdu::decode(&hex, pdu.message.direction()).unwrap();
    assert_eq!(back, pdu, "round trip through {}", hex);
}
fn ts(day: u8, timezone: i8) -> Timestamp {
    Timestamp { year: 24, month: 2, day, hour: 9, minute: 30, second: 5, timezone }
}

const T_D1_NEWS: &str = "079194710167120004038571F1390099406180904480A0D41631067296EF7390383D07CD622E58CD95CB81D6EF39BDEC66BFE7207A794E2FBB4320AFB82C07E56020A8FC7D9687DBED32285C9F83A06F769A9E5EB340D7B49C3E1FA3C3663A0B24E4CBE76516680A7FCBE920725A5E5ED341F0B21C346D4E41E1BA790E4286DDE4BC0BD42CA3E5207258EE1797E5A0BA9B5E9683C86539685997EBEF61341B249BC966";
const CB_CITY: &str = "001000320111C3343D0F82C51A8D46A3D168341A8D46A3D168341A8D46A3D168341A8D46A3D168341A8D46A3D168341A8D46A3D168341A8D46A3D168341A8D46A3D168341A8D46A3D168341A8D46A3D168341A8D46A3D100";

#[test]
fn received_deliver() {
    init();
    let pdu = SmsPdu::decode(T_D1_NEWS, Direction::ScToMs).unwrap();
    assert_eq!(pdu.sca.as_ref().unwrap().to_string(), "+491710762100");
    assert!(pdu.message.is_deliver());
    let m = match pdu.message {
        SmsMessage::Deliver(ref m) => m,
        ref x => panic!("expected DELIVER, got {:?}", x)
    };
    assert_eq!(m.originating_address.number, "171");
    assert_eq!(m.originating_address.type_addr.numbering_plan_identification,
               NumberingPlanIdentification::ServiceCentreSpecific);
    assert_eq!(m.service_centre_timestamp.full_year(), 1999);
    assert_eq!(m.service_centre_timestamp.timezone, 8);
    let text = pdu.message.text().unwrap();
    assert_eq!(text.chars().count(), 160);
    assert!(text.starts_with("T-D1 News bis 31.05.99 kostenlos testen!"));
    assert!(text.contains("Börse"));
    assert_eq!(pdu.encode().unwrap(), T_D1_NEWS);
}
#[test]
fn every_variant_round_trips() {
    init();
    let sca: Address = "+447785016005".parse().unwrap();
    let deliver = DeliverMessage {
        reply_path: true,
        status_report_indication: true,
        more_messages_to_send: false,
        originating_address: "+441234567890".parse().unwrap(),
        protocol_identifier: 0,
        dcs: DataCodingScheme::new(Alphabet::Default7Bit, Some(MessageClass::StoreToSim)),
        service_centre_timestamp: ts(29, -20),
        user_data: UserData::text("{curly} [square] \u{20AC}5")
    };
    let submit = SubmitMessage {
        reject_duplicates: true,
        validity_period: ValidityPeriod::Absolute(ts(1, 4)),
        message_reference: 0xFE,
        ..SubmitMessage::new("0800123".parse().unwrap(), "ümlauts ünd àccents")
    };
    let enhanced = SubmitMessage {
        validity_period: ValidityPeriod::Enhanced([0x01, 0x02, 0x03, 0x00, 0x00, 0x00, 0x00]),
        ..SubmitMessage::new("Sender".parse().unwrap(), "\u{1F600} emoji")
    };
    let deliver_report = DeliverReportMessage {
        parameters: ReportParameters {
            protocol_identifier: Some(0x3F),
            dcs: Some(DataCodingScheme::new(Alphabet::EightBit, None)),
            user_data: Some(UserData {
                header: Some(UserDataHeader::concatenated(1, 1, 1)),
                body: UserDataBody::Octets(vec![1, 2, 3])
            })
        }
    };
    let submit_report = SubmitReportMessage {
        service_centre_timestamp: ts(3, 0),
        parameters: ReportParameters {
            protocol_identifier: None,
            dcs: None,
            user_data: Some(UserData::text("ok"))
        }
    };
    let status_report = StatusReportMessage {
        more_messages_to_send: true,
        status_report_qualifier: false,
        message_reference: 42,
        recipient_address: "+15551234".parse().unwrap(),
        service_centre_timestamp: ts(4, -4),
        discharge_time: ts(5, -4),
        status: 0
    };
    let command = CommandMessage {
        status_report_request: true,
        message_reference: 7,
        protocol_identifier: 0,
        command_type: 2,
        message_number: 42,
        destination_address: "+15551234".parse().unwrap(),
        command_data: b"delete".to_vec()
    };
    let messages = vec![
        SmsMessage::Deliver(deliver),
        SmsMessage::Submit(submit),
        SmsMessage::Submit(enhanced),
        SmsMessage::DeliverReport(deliver_report),
        SmsMessage::SubmitReport(submit_report),
        SmsMessage::StatusReport(status_report),
        SmsMessage::Command(command)
    ];
    for m in messages {
        round_trip(SmsPdu { sca: Some(sca.clone()), message: m.clone() });
        round_trip(SmsPdu::new(m));
    }
}
#[test]
fn default_messages_round_trip() {
    init();
    round_trip(SmsPdu::new(SmsMessage::Deliver(Default::default())));
    round_trip(SmsPdu::new(SmsMessage::DeliverReport(Default::default())));
    round_trip(SmsPdu::new(SmsMessage::Submit(Default::default())));
    round_trip(SmsPdu::new(SmsMessage::SubmitReport(Default::default())));
    round_trip(SmsPdu::new(SmsMessage::StatusReport(Default::default())));
    round_trip(SmsPdu::new(SmsMessage::Command(Default::default())));
}
#[test]
fn concatenated_submit_reassembles() {
    init();
    let text = "This message is long enough that it has to be split into more than one part, \
                so each part carries a user data header with the same reference number and its \
                own sequence number, and the receiving end puts them back together again.";
    let parts = SubmitMessage::split("+4917".parse().unwrap(), text, Some(0x42)).unwrap();
    assert_eq!(parts.len(), 2);
    let mut r = Reassembler::new();
    let mut whole = None;
    for p in parts.into_iter().rev() {
        let hex = SmsPdu::new(SmsMessage::Submit(p)).encode().unwrap();
        let back = SmsPdu::decode(&hex, Direction::MsToSc).unwrap();
        let ud = back.message.user_data().unwrap();
        let concat = ud.header.as_ref()
            .and_then(|h| h.get_concatenated_sms_data())
            .unwrap();
        assert_eq!(concat.reference, 0x42);
        whole = r.push("+4917", concat, ud.as_text().unwrap()).unwrap();
    }
    assert_eq!(whole.as_ref().map(|s| s.as_str()), Some(text));
}
#[test]
fn cell_broadcast_literal() {
    init();
    let cb = CbMessage::decode(CB_CITY).unwrap();
    assert_eq!(cb.geographical_scope, GeographicalScope::CellWide);
    assert_eq!(cb.update_number, 1);
    assert_eq!(cb.message_code, 0);
    assert_eq!(cb.message_identifier, 50);
    assert_eq!(cb.dcs.language(), Language::English);
    assert_eq!(cb.dcs.alphabet(), Alphabet::Default7Bit);
    assert_eq!(cb.total_pages, 1);
    assert_eq!(cb.current_page, 1);
    assert_eq!(cb.encode().unwrap(), CB_CITY);
}
#[test]
fn alphabet_round_trip() {
    init();
    let alphabet = "@£$¥èéùìòÇ\nØø\rÅåΔ_ΦΓΛΩΠΨΣΘΞÆæßÉ !\"#¤%&'()*+,-./0123456789:;<=>?\
                    ¡ABCDEFGHIJKLMNOPQRSTUVWXYZÄÖÑÜ§¿abcdefghijklmnopqrstuvwxyzäöñüà";
    let chars = alphabet.chars().collect::<Vec<_>>();
    assert_eq!(chars.len(), 127);
    for len in 0..=160 {
        let s = (0..len).map(|i| chars[(i * 7 + len) % chars.len()]).collect::<String>();
        let packed = gsm_encoding::pack_septets(&s);
        assert_eq!(gsm_encoding::unpack_septets(&packed, len).unwrap(), s);
    }
}
#[test]
fn decode_errors_name_the_problem() {
    init();
    match SmsPdu::decode("00C3", Direction::MsToSc) {
        Err(e) => assert!(e.to_string().contains("0xC3"), "{}", e),
        Ok(m) => panic!("decoded {:?}", m)
    }
    match SmsPdu::decode("00040B91214365870AF9", Direction::ScToMs) {
        Err(gsmkit::GsmError::InvalidDigit(0xA)) => {},
        x => panic!("expected an invalid digit, got {:?}", x)
    }
    assert!(SmsPdu::decode("0004", Direction::ScToMs).is_err());
}
