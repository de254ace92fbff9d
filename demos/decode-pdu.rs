use gsmkit::pdu::{CbMessage, Direction, SmsPdu};
use std::io::prelude::*;

fn main() {
    env_logger::init();
    println!("Input PDUs (prefix with 'cb ' for cell broadcast, 'out ' for outgoing SMS)");
    let stdin = ::std::io::stdin();
    let lock = stdin.lock();
    for ln in lock.lines() {
        let ln = match ln {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Failed to read input: {}", e);
                break;
            }
        };
        let ln = ln.trim();
        if ln.is_empty() {
            continue;
        }
        if let Some(hex) = ln.strip_prefix("cb ") {
            match CbMessage::decode(hex) {
                Ok(cb) => print!("{}", cb),
                Err(e) => println!("Decode failed: {}", e)
            }
            continue;
        }
        let (direction, hex) = match ln.strip_prefix("out ") {
            Some(hex) => (Direction::MsToSc, hex),
            None => (Direction::ScToMs, ln)
        };
        match SmsPdu::decode(hex, direction) {
            Ok(pdu) => {
                println!("PDU: {:?}", pdu);
                println!("{}", pdu);
                if let Some(udh) = pdu.message.user_data().and_then(|u| u.header.as_ref()) {
                    println!("User data header: {:?}", udh);
                }
            },
            Err(e) => println!("Decode failed: {}", e)
        }
    }
}
