//! The `gsmkit` library provides the two halves of talking SMS with a GSM modem that don't depend
//! on how you talk to the modem: a codec for SMS and cell broadcast PDUs (the hex strings you
//! send with `AT+CMGS` and get back from `AT+CMGL`), and a reconciliation engine that keeps two
//! phonebooks or SMS stores consistent with each other.
//!
//! Getting PDUs to and from an actual device is up to you; the `demos/` directory has a couple of
//! small programs showing how the pieces fit together.

#[macro_use] extern crate log;
#[macro_use] extern crate failure_derive;
#[macro_use] extern crate derive_is_enum_variant;
#[macro_use] extern crate num_derive;

pub mod errors;
pub mod gsm_encoding;
pub mod pdu;
pub mod store;
pub mod sync;
mod util;

pub use crate::errors::{GsmError, GsmResult};
