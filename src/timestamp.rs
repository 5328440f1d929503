//! Timestamp decoding (Ion 1.0 binary, timestamp).
//!
//! Die Felder stehen in strikt aufsteigender Präzision im Payload: Offset
//! (VarInt-Minuten, negatives Null = "Offset unbekannt"), Jahr, Monat, Tag,
//! Stunde+Minute (immer paarweise), Sekunde, Sekundenbruchteil als Decimal.
//! Jedes Feld wird nur gelesen, solange nach dem vorigen noch Payload übrig
//! ist; die Präzision ist das letzte tatsächlich vorhandene Feld.
//!
//! Dieses Partial-Precision-Modell ist Teil der Semantik: ein Timestamp mit
//! Präzision `Month` ist ein anderer Wert als derselbe Zeitpunkt mit Präzision
//! `Day`. Fehlende Felder bekommen ihre Defaults erst bei der Normalisierung
//! ([`Timestamp::to_datetime`]).

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::decimal::Decimal;
use crate::source::{ByteSource, SliceSource};
use crate::varint::{read_var_int_or_negative_zero, read_var_uint};
use crate::{Error, Result};

/// The last field actually present in the encoding, in increasing order.
///
/// Hour and minute are always encoded as a pair, so there is no hour-only
/// precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precision {
    Year,
    Month,
    Day,
    Minute,
    Second,
    Fraction,
}

/// A partial-precision point in time. Components are in UTC; `offset_minutes`
/// is the local-time display offset, `None` when the offset is unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct Timestamp {
    precision: Precision,
    offset_minutes: Option<i32>,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    fraction: Option<Decimal>,
}

impl Timestamp {
    /// Decodes a timestamp payload. A zero-length payload means "no
    /// timestamp" and maps to a null value at the caller.
    pub fn decode(payload: &[u8], position: u64) -> Result<Option<Self>> {
        if payload.is_empty() {
            return Ok(None);
        }
        let mut scan = SliceSource::with_base(payload, position);
        let offset_minutes = match read_var_int_or_negative_zero(&mut scan)? {
            None => None,
            Some(v) => Some(
                i32::try_from(v)
                    .map_err(|_| Error::VarIntOverflow { position: scan.position() })?,
            ),
        };

        let mut ts = Self {
            precision: Precision::Year,
            offset_minutes,
            year: 0,
            month: 0,
            day: 0,
            hour: 0,
            minute: 0,
            second: 0,
            fraction: None,
        };

        let remaining =
            |scan: &SliceSource<'_>| payload.len() - (scan.position() - position) as usize;

        ts.year = component(&mut scan, "year", 1..=9999)? as u16;

        if remaining(&scan) > 0 {
            ts.month = component(&mut scan, "month", 1..=12)? as u8;
            ts.precision = Precision::Month;
            if remaining(&scan) > 0 {
                ts.day = component(&mut scan, "day", 1..=31)? as u8;
                ts.precision = Precision::Day;
                if remaining(&scan) > 0 {
                    // hour and minute only ever appear together
                    ts.hour = component(&mut scan, "hour", 0..=23)? as u8;
                    ts.minute = component(&mut scan, "minute", 0..=59)? as u8;
                    ts.precision = Precision::Minute;
                    if remaining(&scan) > 0 {
                        ts.second = component(&mut scan, "second", 0..=59)? as u8;
                        ts.precision = Precision::Second;
                        if remaining(&scan) > 0 {
                            let rest = &payload[payload.len() - remaining(&scan)..];
                            let frac_pos = scan.position();
                            ts.fraction = Some(Decimal::decode(rest, frac_pos)?);
                            ts.precision = Precision::Fraction;
                        }
                    }
                }
            }
        }
        Ok(Some(ts))
    }

    /// The precision this value was encoded with.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Local-time offset in minutes, `None` when unknown. An explicit
    /// `Some(0)` means UTC.
    pub fn offset_minutes(&self) -> Option<i32> {
        self.offset_minutes
    }

    /// The year component (always present).
    pub fn year(&self) -> u16 {
        self.year
    }

    /// The month component, when precision reaches it.
    pub fn month(&self) -> Option<u8> {
        (self.precision >= Precision::Month).then_some(self.month)
    }

    /// The day component, when precision reaches it.
    pub fn day(&self) -> Option<u8> {
        (self.precision >= Precision::Day).then_some(self.day)
    }

    /// The hour component, when precision reaches it.
    pub fn hour(&self) -> Option<u8> {
        (self.precision >= Precision::Minute).then_some(self.hour)
    }

    /// The minute component, when precision reaches it.
    pub fn minute(&self) -> Option<u8> {
        (self.precision >= Precision::Minute).then_some(self.minute)
    }

    /// The second component, when precision reaches it.
    pub fn second(&self) -> Option<u8> {
        (self.precision >= Precision::Second).then_some(self.second)
    }

    /// The fractional second, when precision reaches it.
    pub fn fraction(&self) -> Option<&Decimal> {
        self.fraction.as_ref()
    }

    /// Normalizes to a calendar date-time: absent trailing fields take their
    /// defaults (month/day 1, time components 0), an unknown offset is
    /// treated as UTC, and the fraction is truncated to nanoseconds.
    ///
    /// Returns `None` for component combinations the calendar rejects
    /// (e.g. February 30).
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        let month = u32::from(self.month().unwrap_or(1));
        let day = u32::from(self.day().unwrap_or(1));
        let nanos = self.fraction.as_ref().map_or(Some(0), fraction_nanos)?;
        let naive = NaiveDate::from_ymd_opt(i32::from(self.year), month, day)?
            .and_hms_nano_opt(
                u32::from(self.hour().unwrap_or(0)),
                u32::from(self.minute().unwrap_or(0)),
                u32::from(self.second().unwrap_or(0)),
                nanos,
            )?;
        let offset = FixedOffset::east_opt(self.offset_minutes.unwrap_or(0) * 60)?;
        Some(offset.from_utc_datetime(&naive))
    }
}

/// Reads one VarUInt component and range-checks it.
fn component(
    scan: &mut SliceSource<'_>,
    field: &'static str,
    range: core::ops::RangeInclusive<u64>,
) -> Result<u64> {
    let position = scan.position();
    let v = read_var_uint(scan)?;
    if !range.contains(&v) {
        return Err(Error::InvalidTimestamp { field, value: v, position });
    }
    Ok(v)
}

/// Truncates a fractional second to nanoseconds. Fractions at or above one
/// second are malformed and yield `None`.
fn fraction_nanos(frac: &Decimal) -> Option<u32> {
    let shift = frac.exponent() + 9;
    let ten = BigUint::from(10u32);
    let scaled = if shift >= 0 {
        frac.coefficient() * ten.pow(shift as u32)
    } else {
        frac.coefficient() / ten.pow(shift.unsigned_abs())
    };
    scaled.to_u32().filter(|&n| n < 1_000_000_000)
}
