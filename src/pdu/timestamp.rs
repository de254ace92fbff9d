//! Service centre timestamps and validity periods.
use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;
use num_traits::FromPrimitive;
use crate::errors::*;
use super::cursor::BitCursor;

/// Decode a "swapped" BCD octet (units in the high nibble, tens in the low one).
fn reverse_byte(b: u8) -> GsmResult<u8> {
    let units = b >> 4;
    let tens = b & 0b0000_1111;
    if units > 9 {
        Err(GsmError::InvalidDigit(units))?
    }
    if tens > 9 {
        Err(GsmError::InvalidDigit(tens))?
    }
    Ok((tens * 10) + units)
}
fn swap_byte(v: u8) -> u8 {
    ((v % 10) << 4) | (v / 10 % 10)
}
/// Days since 1970-01-01 in the proleptic Gregorian calendar.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = y - era * 400;
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe - 719468
}

/// A service centre timestamp (TP-SCTS), or any other absolute time in a PDU.
///
/// Fields are kept as they appear on the wire; `timezone` is the offset from UTC in quarter
/// hours.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Timestamp {
    /// Two-digit year.
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub timezone: i8
}
impl Timestamp {
    /// Four-digit year; two-digit years below 80 are taken to be in the 2000s.
    pub fn full_year(&self) -> u16 {
        if self.year < 80 {
            2000 + self.year as u16
        }
        else {
            1900 + self.year as u16
        }
    }
    /// Seconds since the Unix epoch, UTC.
    pub fn utc_seconds(&self) -> i64 {
        let days = days_from_civil(self.full_year() as i64, self.month as i64, self.day as i64);
        let local = days * 86400
            + self.hour as i64 * 3600
            + self.minute as i64 * 60
            + self.second as i64;
        local - self.timezone as i64 * 15 * 60
    }
    pub fn read(cur: &mut BitCursor) -> GsmResult<Self> {
        let b = cur.read_octets(7)?;
        let tz = reverse_byte(b[6] & 0b1111_0111)? as i8;
        let timezone = if b[6] & 0b0000_1000 > 0 {
            -tz
        }
        else {
            tz
        };
        Ok(Timestamp {
            year: reverse_byte(b[0])?,
            month: reverse_byte(b[1])?,
            day: reverse_byte(b[2])?,
            hour: reverse_byte(b[3])?,
            minute: reverse_byte(b[4])?,
            second: reverse_byte(b[5])?,
            timezone
        })
    }
    pub fn write(&self, cur: &mut BitCursor) {
        let mut tz = swap_byte(self.timezone.unsigned_abs());
        if self.timezone < 0 {
            tz |= 0b0000_1000;
        }
        cur.write_octets(&[
            swap_byte(self.year),
            swap_byte(self.month),
            swap_byte(self.day),
            swap_byte(self.hour),
            swap_byte(self.minute),
            swap_byte(self.second),
            tz
        ]);
    }
}
impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.utc_seconds().cmp(&other.utc_seconds())
            .then_with(|| {
                let a = (self.year, self.month, self.day, self.hour, self.minute, self.second, self.timezone);
                let b = (other.year, other.month, other.day, other.hour, other.minute, other.second, other.timezone);
                a.cmp(&b)
            })
    }
}
impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign = if self.timezone < 0 { '-' } else { '+' };
        let q = self.timezone.unsigned_abs();
        write!(f, "{:02}.{:02}.{:02} {:02}:{:02}:{:02} {}{:02}:{:02}",
               self.day, self.month, self.year,
               self.hour, self.minute, self.second,
               sign, q / 4, (q % 4) * 15)
    }
}

/// Validity period format, as indicated by bits 3 and 4 of a SUBMIT's first octet.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum VpFieldValidity {
    NotPresent = 0b000_00_000,
    Enhanced = 0b000_01_000,
    Relative = 0b000_10_000,
    Absolute = 0b000_11_000
}
impl VpFieldValidity {
    pub const MASK: u8 = 0b000_11_000;

    pub fn from_first_octet(b: u8) -> Self {
        VpFieldValidity::from_u8(b & Self::MASK)
            .unwrap_or(VpFieldValidity::NotPresent)
    }
}
/// How long the service centre should keep trying to deliver a message.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValidityPeriod {
    NotPresent,
    /// Relative validity, in the coded form of GSM 03.40 section 9.2.3.12.1.
    Relative(u8),
    Absolute(Timestamp),
    /// Enhanced format; kept as raw octets.
    Enhanced([u8; 7])
}
impl Default for ValidityPeriod {
    fn default() -> Self {
        ValidityPeriod::NotPresent
    }
}
impl ValidityPeriod {
    pub fn format(&self) -> VpFieldValidity {
        use self::ValidityPeriod::*;
        match *self {
            NotPresent => VpFieldValidity::NotPresent,
            Relative(_) => VpFieldValidity::Relative,
            Absolute(_) => VpFieldValidity::Absolute,
            Enhanced(_) => VpFieldValidity::Enhanced
        }
    }
    /// For relative validity periods, the period as a `Duration`.
    pub fn relative_duration(&self) -> Option<Duration> {
        const MINUTE: u64 = 60;
        const HOUR: u64 = 60 * MINUTE;
        const DAY: u64 = 24 * HOUR;
        let v = match *self {
            ValidityPeriod::Relative(v) => v as u64,
            _ => return None
        };
        let secs = match v {
            0 ..= 143 => (v + 1) * 5 * MINUTE,
            144 ..= 167 => 12 * HOUR + (v - 143) * 30 * MINUTE,
            168 ..= 196 => (v - 166) * DAY,
            _ => (v - 192) * 7 * DAY
        };
        Some(Duration::from_secs(secs))
    }
    pub fn read(cur: &mut BitCursor, format: VpFieldValidity) -> GsmResult<Self> {
        Ok(match format {
            VpFieldValidity::NotPresent => ValidityPeriod::NotPresent,
            VpFieldValidity::Relative => ValidityPeriod::Relative(cur.read_octet()?),
            VpFieldValidity::Absolute => ValidityPeriod::Absolute(Timestamp::read(cur)?),
            VpFieldValidity::Enhanced => {
                let mut raw = [0; 7];
                raw.copy_from_slice(&cur.read_octets(7)?);
                ValidityPeriod::Enhanced(raw)
            }
        })
    }
    pub fn write(&self, cur: &mut BitCursor) {
        match *self {
            ValidityPeriod::NotPresent => {},
            ValidityPeriod::Relative(v) => cur.write_octet(v),
            ValidityPeriod::Absolute(ref ts) => ts.write(cur),
            ValidityPeriod::Enhanced(ref raw) => cur.write_octets(raw)
        }
    }
}
