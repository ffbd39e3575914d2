/// SQL-style date/time values for the path executor.
///
/// Five variants mirroring the SQL type lattice: `date`, `time`, `time
/// with time zone`, `timestamp`, `timestamp with time zone`. Built on
/// jiff's civil types; zoned variants carry a fixed offset so values
/// format back exactly as they were written. Parsing is a hand-rolled
/// ISO 8601 subset so the accepted grammar stays fixed:
///
///   YYYY-MM-DD
///   HH:MM:SS[.frac][±HH[:MM]|Z]
///   YYYY-MM-DD[T| ]HH:MM:SS[.frac][±HH[:MM]|Z]
use std::cmp::Ordering;
use std::fmt;

use jiff::civil;
use jiff::tz::Offset;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Datetime {
    Date(civil::Date),
    Time(civil::Time),
    TimeTz(civil::Time, Offset),
    /// Wall-clock date and time, no zone.
    Timestamp(civil::DateTime),
    /// Wall-clock date and time plus the offset it was written with.
    TimestampTz(civil::DateTime, Offset),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Date,
    Time,
    TimeTz,
    Timestamp,
    TimestampTz,
}

impl Kind {
    /// Spelling used in "cannot convert value from X to Y" messages.
    pub fn cast_name(self) -> &'static str {
        match self {
            Kind::Date => "date",
            Kind::Time => "time",
            Kind::TimeTz => "timetz",
            Kind::Timestamp => "timestamp",
            Kind::TimestampTz => "timestamptz",
        }
    }

    /// Spelling used in ".X() format is not recognized" messages, matching
    /// the item method names.
    pub fn method_name(self) -> &'static str {
        match self {
            Kind::Date => "date",
            Kind::Time => "time",
            Kind::TimeTz => "time_tz",
            Kind::Timestamp => "timestamp",
            Kind::TimestampTz => "timestamp_tz",
        }
    }

    /// How specific the kind is; conversions run from less to more
    /// specific, which fixes the name order in TZ-usage errors.
    fn rank(self) -> u8 {
        match self {
            Kind::Time => 0,
            Kind::TimeTz => 1,
            Kind::Date => 2,
            Kind::Timestamp => 3,
            Kind::TimestampTz => 4,
        }
    }
}

/// Conversion failures, mapped to executor errors by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatetimeError {
    /// A conversion that depends on a time zone was attempted while TZ
    /// usage is disabled.
    NoTz {
        from: &'static str,
        to: &'static str,
    },
    /// The value cannot be expressed in the target type at all.
    Format {
        target: &'static str,
        input: String,
    },
}

impl Datetime {
    pub fn kind(&self) -> Kind {
        match self {
            Datetime::Date(_) => Kind::Date,
            Datetime::Time(_) => Kind::Time,
            Datetime::TimeTz(..) => Kind::TimeTz,
            Datetime::Timestamp(_) => Kind::Timestamp,
            Datetime::TimestampTz(..) => Kind::TimestampTz,
        }
    }

    /// The `.type()` name for this variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Datetime::Date(_) => "date",
            Datetime::Time(_) => "time without time zone",
            Datetime::TimeTz(..) => "time with time zone",
            Datetime::Timestamp(_) => "timestamp without time zone",
            Datetime::TimestampTz(..) => "timestamp with time zone",
        }
    }

    /// Convert to the target kind following the SQL cast lattice. TZ-
    /// dependent conversions are gated on `use_tz` and interpret civil
    /// values in UTC (the executor's session zone).
    pub fn cast(&self, target: Kind, use_tz: bool) -> Result<Datetime, DatetimeError> {
        let need_tz = |from: Kind, to: Kind| -> Result<(), DatetimeError> {
            if use_tz {
                Ok(())
            } else {
                Err(DatetimeError::NoTz {
                    from: from.cast_name(),
                    to: to.cast_name(),
                })
            }
        };
        let unrepresentable = || DatetimeError::Format {
            target: target.method_name(),
            input: self.to_string(),
        };

        match (*self, target) {
            (dt, t) if dt.kind() == t => Ok(dt),

            (Datetime::Date(d), Kind::Timestamp) => {
                Ok(Datetime::Timestamp(d.to_datetime(civil::Time::midnight())))
            }
            (Datetime::Date(d), Kind::TimestampTz) => {
                need_tz(Kind::Date, Kind::TimestampTz)?;
                Ok(Datetime::TimestampTz(
                    d.to_datetime(civil::Time::midnight()),
                    Offset::UTC,
                ))
            }
            (Datetime::Date(_), _) => Err(unrepresentable()),

            (Datetime::Time(t), Kind::TimeTz) => {
                need_tz(Kind::Time, Kind::TimeTz)?;
                Ok(Datetime::TimeTz(t, Offset::UTC))
            }
            (Datetime::Time(_), _) => Err(unrepresentable()),

            (Datetime::TimeTz(t, _), Kind::Time) => {
                need_tz(Kind::TimeTz, Kind::Time)?;
                Ok(Datetime::Time(t))
            }
            (Datetime::TimeTz(..), _) => Err(unrepresentable()),

            (Datetime::Timestamp(dt), Kind::Date) => Ok(Datetime::Date(dt.date())),
            (Datetime::Timestamp(dt), Kind::Time) => Ok(Datetime::Time(dt.time())),
            (Datetime::Timestamp(dt), Kind::TimestampTz) => {
                need_tz(Kind::Timestamp, Kind::TimestampTz)?;
                Ok(Datetime::TimestampTz(dt, Offset::UTC))
            }
            (Datetime::Timestamp(_), _) => Err(unrepresentable()),

            (Datetime::TimestampTz(dt, off), Kind::TimeTz) => {
                Ok(Datetime::TimeTz(dt.time(), off))
            }
            (Datetime::TimestampTz(dt, off), Kind::Date) => {
                need_tz(Kind::TimestampTz, Kind::Date)?;
                Ok(Datetime::Date(utc_wall(dt, off).date()))
            }
            (Datetime::TimestampTz(dt, off), Kind::Time) => {
                need_tz(Kind::TimestampTz, Kind::Time)?;
                Ok(Datetime::Time(utc_wall(dt, off).time()))
            }
            // The identity arm above already caught TimestampTz targets.
            (Datetime::TimestampTz(dt, off), _) => {
                need_tz(Kind::TimestampTz, Kind::Timestamp)?;
                Ok(Datetime::Timestamp(utc_wall(dt, off)))
            }
        }
    }

    /// Compare two datetime values, upcasting the less specific side.
    /// `Ok(None)` means the pair has no defined ordering (e.g. date vs
    /// time). Pairs that need a zone to line up are gated on `use_tz`.
    pub fn compare(&self, other: &Datetime, use_tz: bool) -> Result<Option<Ordering>, DatetimeError> {
        use Datetime::*;

        let need_tz = |a: Kind, b: Kind| -> Result<(), DatetimeError> {
            if use_tz {
                Ok(())
            } else {
                let (from, to) = if a.rank() <= b.rank() { (a, b) } else { (b, a) };
                Err(DatetimeError::NoTz {
                    from: from.cast_name(),
                    to: to.cast_name(),
                })
            }
        };

        let ord = match (*self, *other) {
            (Date(a), Date(b)) => a.cmp(&b),
            (Date(a), Timestamp(b)) => a.to_datetime(civil::Time::midnight()).cmp(&b),
            (Timestamp(a), Date(b)) => a.cmp(&b.to_datetime(civil::Time::midnight())),
            (Date(a), TimestampTz(bd, bo)) => {
                need_tz(Kind::Date, Kind::TimestampTz)?;
                instant(a.to_datetime(civil::Time::midnight()), Offset::UTC)
                    .cmp(&instant(bd, bo))
            }
            (TimestampTz(ad, ao), Date(b)) => {
                need_tz(Kind::Date, Kind::TimestampTz)?;
                instant(ad, ao).cmp(&instant(b.to_datetime(civil::Time::midnight()), Offset::UTC))
            }

            (Time(a), Time(b)) => a.cmp(&b),
            (Time(a), TimeTz(bt, bo)) => {
                need_tz(Kind::Time, Kind::TimeTz)?;
                time_nanos(a).cmp(&timetz_nanos(bt, bo))
            }
            (TimeTz(at, ao), Time(b)) => {
                need_tz(Kind::Time, Kind::TimeTz)?;
                timetz_nanos(at, ao).cmp(&time_nanos(b))
            }
            (TimeTz(at, ao), TimeTz(bt, bo)) => timetz_nanos(at, ao).cmp(&timetz_nanos(bt, bo)),

            (Timestamp(a), Timestamp(b)) => a.cmp(&b),
            (Timestamp(a), TimestampTz(bd, bo)) => {
                need_tz(Kind::Timestamp, Kind::TimestampTz)?;
                instant(a, Offset::UTC).cmp(&instant(bd, bo))
            }
            (TimestampTz(ad, ao), Timestamp(b)) => {
                need_tz(Kind::Timestamp, Kind::TimestampTz)?;
                instant(ad, ao).cmp(&instant(b, Offset::UTC))
            }
            (TimestampTz(ad, ao), TimestampTz(bd, bo)) => instant(ad, ao).cmp(&instant(bd, bo)),

            _ => return Ok(None),
        };
        Ok(Some(ord))
    }

    /// Truncate fractional seconds to `precision` digits (0–6), rounding
    /// half away from zero on the following digit.
    pub fn round_precision(self, precision: u32) -> Datetime {
        let precision = precision.min(6);
        match self {
            Datetime::Date(_) => self,
            Datetime::Time(t) => Datetime::Time(round_time(t, precision)),
            Datetime::TimeTz(t, off) => Datetime::TimeTz(round_time(t, precision), off),
            Datetime::Timestamp(dt) => Datetime::Timestamp(round_datetime(dt, precision)),
            Datetime::TimestampTz(dt, off) => {
                Datetime::TimestampTz(round_datetime(dt, precision), off)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Instant helpers
// ---------------------------------------------------------------------------

fn instant(dt: civil::DateTime, off: Offset) -> jiff::Timestamp {
    // Fixed-offset conversion only fails at the extreme ends of the
    // representable range, which the parser grammar cannot reach.
    off.to_timestamp(dt).unwrap_or(jiff::Timestamp::UNIX_EPOCH)
}

/// Wall-clock reading of an instant in UTC, the executor's session zone.
fn utc_wall(dt: civil::DateTime, off: Offset) -> civil::DateTime {
    Offset::UTC.to_datetime(instant(dt, off))
}

fn time_nanos(t: civil::Time) -> i64 {
    let secs = t.hour() as i64 * 3600 + t.minute() as i64 * 60 + t.second() as i64;
    secs * 1_000_000_000 + t.subsec_nanosecond() as i64
}

fn timetz_nanos(t: civil::Time, off: Offset) -> i64 {
    time_nanos(t) - off.seconds() as i64 * 1_000_000_000
}

// ---------------------------------------------------------------------------
// Precision rounding
// ---------------------------------------------------------------------------

/// Round nanoseconds to `precision` fractional-second digits. The second
/// return value is a carry into the next whole second.
fn round_subsec(nanos: i32, precision: u32) -> (i32, bool) {
    let unit = 10i64.pow(9 - precision);
    let rounded = (nanos as i64 + unit / 2) / unit * unit;
    if rounded >= 1_000_000_000 {
        ((rounded - 1_000_000_000) as i32, true)
    } else {
        (rounded as i32, false)
    }
}

fn round_time(t: civil::Time, precision: u32) -> civil::Time {
    let (nanos, carry) = round_subsec(t.subsec_nanosecond(), precision);
    let rounded = civil::Time::new(t.hour(), t.minute(), t.second(), nanos).unwrap_or(t);
    if carry {
        rounded.wrapping_add(jiff::Span::new().seconds(1))
    } else {
        rounded
    }
}

fn round_datetime(dt: civil::DateTime, precision: u32) -> civil::DateTime {
    let (nanos, carry) = round_subsec(dt.time().subsec_nanosecond(), precision);
    let t = civil::Time::new(dt.hour(), dt.minute(), dt.second(), nanos).unwrap_or(dt.time());
    let rounded = dt.date().to_datetime(t);
    if carry {
        rounded
            .checked_add(jiff::Span::new().seconds(1))
            .unwrap_or(rounded)
    } else {
        rounded
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a string as the given kind; the full input must be consumed.
pub fn parse_kind(s: &str, kind: Kind) -> Option<Datetime> {
    match kind {
        Kind::Date => {
            let (d, rest) = parse_date_prefix(s)?;
            rest.is_empty().then_some(Datetime::Date(d))
        }
        Kind::Time => {
            let (t, rest) = parse_time_prefix(s)?;
            rest.is_empty().then_some(Datetime::Time(t))
        }
        Kind::TimeTz => {
            let (t, rest) = parse_time_prefix(s)?;
            let off = parse_offset(rest)?;
            Some(Datetime::TimeTz(t, off))
        }
        Kind::Timestamp => {
            let (dt, rest) = parse_datetime_prefix(s)?;
            rest.is_empty().then_some(Datetime::Timestamp(dt))
        }
        Kind::TimestampTz => {
            let (dt, rest) = parse_datetime_prefix(s)?;
            let off = parse_offset(rest)?;
            Some(Datetime::TimestampTz(dt, off))
        }
    }
}

/// Parse a string as whichever datetime kind it spells, most specific
/// first, used by the argument-less `.datetime()` method.
pub fn parse_any(s: &str) -> Option<Datetime> {
    for kind in [
        Kind::TimestampTz,
        Kind::Timestamp,
        Kind::Date,
        Kind::TimeTz,
        Kind::Time,
    ] {
        if let Some(dt) = parse_kind(s, kind) {
            return Some(dt);
        }
    }
    None
}

fn digits(s: &str, n: usize) -> Option<i32> {
    let b = s.as_bytes();
    if b.len() < n || !b[..n].iter().all(u8::is_ascii_digit) {
        return None;
    }
    s[..n].parse().ok()
}

/// `YYYY-MM-DD` at the start of the input; returns the rest.
fn parse_date_prefix(s: &str) -> Option<(civil::Date, &str)> {
    let year = digits(s, 4)?;
    let s = s[4..].strip_prefix('-')?;
    let month = digits(s, 2)?;
    let s = s[2..].strip_prefix('-')?;
    let day = digits(s, 2)?;
    let date = civil::Date::new(year as i16, month as i8, day as i8).ok()?;
    Some((date, &s[2..]))
}

/// `HH:MM:SS[.frac]` at the start of the input; returns the rest.
fn parse_time_prefix(s: &str) -> Option<(civil::Time, &str)> {
    let hour = digits(s, 2)?;
    let s = s[2..].strip_prefix(':')?;
    let minute = digits(s, 2)?;
    let s = s[2..].strip_prefix(':')?;
    let second = digits(s, 2)?;
    let mut rest = &s[2..];

    let mut nanos = 0i32;
    if let Some(frac) = rest.strip_prefix('.') {
        let len = frac.bytes().take_while(u8::is_ascii_digit).count();
        if len == 0 {
            return None;
        }
        // Pad or truncate to nanosecond resolution.
        for (i, b) in frac[..len].bytes().take(9).enumerate() {
            nanos += (b - b'0') as i32 * 10i32.pow(8 - i as u32);
        }
        rest = &frac[len..];
    }

    let time = civil::Time::new(hour as i8, minute as i8, second as i8, nanos).ok()?;
    Some((time, rest))
}

/// `YYYY-MM-DD[T| ]HH:MM:SS[.frac]` at the start of the input.
fn parse_datetime_prefix(s: &str) -> Option<(civil::DateTime, &str)> {
    let (date, rest) = parse_date_prefix(s)?;
    let mut chars = rest.chars();
    match chars.next() {
        Some('T' | 't' | ' ') => {}
        _ => return None,
    }
    let (time, rest) = parse_time_prefix(chars.as_str())?;
    Some((date.to_datetime(time), rest))
}

/// Whole-string zone offset: `Z`, `±HH`, `±HH:MM`, or `±HHMM`.
fn parse_offset(s: &str) -> Option<Offset> {
    if s == "Z" || s == "z" {
        return Some(Offset::UTC);
    }
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let hours = digits(rest, 2)?;
    let rest = &rest[2..];
    let minutes = match rest.strip_prefix(':').unwrap_or(rest) {
        "" => 0,
        m => {
            let v = digits(m, 2)?;
            if m.len() != 2 {
                return None;
            }
            v
        }
    };
    if hours > 15 || minutes > 59 {
        return None;
    }
    Offset::from_seconds(sign * (hours * 3600 + minutes * 60)).ok()
}

// ---------------------------------------------------------------------------
// Canonical formatting
// ---------------------------------------------------------------------------

impl fmt::Display for Datetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datetime::Date(d) => write_date(f, *d),
            Datetime::Time(t) => write_time(f, *t),
            Datetime::TimeTz(t, off) => {
                write_time(f, *t)?;
                write_offset(f, *off)
            }
            Datetime::Timestamp(dt) => {
                write_date(f, dt.date())?;
                f.write_str("T")?;
                write_time(f, dt.time())
            }
            Datetime::TimestampTz(dt, off) => {
                write_date(f, dt.date())?;
                f.write_str("T")?;
                write_time(f, dt.time())?;
                write_offset(f, *off)
            }
        }
    }
}

fn write_date(f: &mut fmt::Formatter<'_>, d: civil::Date) -> fmt::Result {
    write!(f, "{:04}-{:02}-{:02}", d.year(), d.month(), d.day())
}

fn write_time(f: &mut fmt::Formatter<'_>, t: civil::Time) -> fmt::Result {
    write!(f, "{:02}:{:02}:{:02}", t.hour(), t.minute(), t.second())?;
    let nanos = t.subsec_nanosecond();
    if nanos != 0 {
        let frac = format!("{nanos:09}");
        write!(f, ".{}", frac.trim_end_matches('0'))?;
    }
    Ok(())
}

fn write_offset(f: &mut fmt::Formatter<'_>, off: Offset) -> fmt::Result {
    let secs = off.seconds();
    let sign = if secs < 0 { '-' } else { '+' };
    let abs = secs.abs();
    write!(f, "{}{:02}:{:02}", sign, abs / 3600, abs % 3600 / 60)
}
