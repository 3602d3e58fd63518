//! Deadline parsing and Jalali calendar support.
//!
//! Deadlines are entered as Jalali (Solar Hijri) dates by default, with
//! Gregorian fallback layouts. Acceptance picks the first layout that
//! parses; "unparseable" and "valid but not in the future" are distinct
//! failures so the caller can render distinct messages.
//!
//! The Jalali arithmetic follows the Khayyam/Borkowski 33-year cycle
//! calculation over Julian day numbers. Integer division here truncates
//! toward zero, which the constants below are calibrated for.

use chrono::{Datelike, NaiveDate};

/// Why a deadline string was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInputError {
    /// None of the accepted layouts parsed.
    BadFormat,
    /// The date parsed but is not strictly after today.
    NotFuture,
}

/// Years in this range are interpreted as Jalali; anything else is Gregorian.
const JALALI_YEAR_RANGE: std::ops::RangeInclusive<i32> = 1200..=1599;

/// Parse a date string trying the accepted layouts in order.
///
/// Layouts, first match wins:
/// 1. `YYYY-MM-DD` / `YYYY/MM/DD` — Jalali when the year falls in the
///    Jalali range, Gregorian otherwise.
/// 2. `DD.MM.YYYY` / `DD/MM/YYYY` — Gregorian.
#[must_use]
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();

    for sep in ['-', '/'] {
        if let Some((y, m, d)) = split_ymd(trimmed, sep) {
            if JALALI_YEAR_RANGE.contains(&y) {
                return jalali_to_gregorian(y, m, d);
            }
            return NaiveDate::from_ymd_opt(y, m, d);
        }
    }

    for fmt in ["%d.%m.%Y", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            // Two-digit years slip through chrono's %Y; reject them here
            // the same way the year-first layouts do.
            if date.year() >= 1000 {
                return Some(date);
            }
        }
    }

    None
}

/// Parse a deadline and require it to be strictly after `today`.
///
/// # Errors
///
/// Returns [`DateInputError::BadFormat`] when no layout parses and
/// [`DateInputError::NotFuture`] when the date is today or earlier.
pub fn parse_deadline(input: &str, today: NaiveDate) -> Result<NaiveDate, DateInputError> {
    let date = parse_date(input).ok_or(DateInputError::BadFormat)?;
    if date <= today {
        return Err(DateInputError::NotFuture);
    }
    Ok(date)
}

/// Render a Gregorian date as a Jalali `YYYY-MM-DD` string for display.
#[must_use]
pub fn format_jalali(date: NaiveDate) -> String {
    let (jy, jm, jd) = gregorian_to_jalali(date);
    format!("{jy:04}-{jm:02}-{jd:02}")
}

fn split_ymd(input: &str, sep: char) -> Option<(i32, u32, u32)> {
    let mut parts = input.split(sep);
    let y: i32 = parts.next()?.parse().ok()?;
    let m: u32 = parts.next()?.parse().ok()?;
    let d: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    // Reject two-digit years so "12/05/26" is not read as year 12.
    if !(1000..=9999).contains(&y) {
        return None;
    }
    Some((y, m, d))
}

/// Convert a Jalali date to a Gregorian [`NaiveDate`].
///
/// Returns `None` for out-of-range months/days (including day 30 of Esfand
/// in a non-leap year).
#[must_use]
pub fn jalali_to_gregorian(jy: i32, jm: u32, jd: u32) -> Option<NaiveDate> {
    if !(1..=12).contains(&jm) {
        return None;
    }
    let month_len = jalali_month_length(jy, jm);
    if jd == 0 || jd > month_len {
        return None;
    }
    let jdn = jalali_to_jdn(i64::from(jy), i64::from(jm), i64::from(jd));
    let (gy, gm, gd) = jdn_to_gregorian(jdn);
    NaiveDate::from_ymd_opt(
        i32::try_from(gy).ok()?,
        u32::try_from(gm).ok()?,
        u32::try_from(gd).ok()?,
    )
}

/// Convert a Gregorian [`NaiveDate`] to Jalali `(year, month, day)`.
#[must_use]
pub fn gregorian_to_jalali(date: NaiveDate) -> (i32, u32, u32) {
    let jdn = gregorian_to_jdn(
        i64::from(date.year()),
        i64::from(date.month()),
        i64::from(date.day()),
    );
    let (jy, jm, jd) = jdn_to_jalali(jdn);
    // The JDN round-trip stays well inside i32/u32 bounds for chrono dates.
    (jy as i32, jm as u32, jd as u32)
}

/// Number of days in the given Jalali month.
#[must_use]
pub fn jalali_month_length(jy: i32, jm: u32) -> u32 {
    match jm {
        1..=6 => 31,
        7..=11 => 30,
        12 => {
            if is_jalali_leap_year(jy) {
                30
            } else {
                29
            }
        }
        _ => 0,
    }
}

/// Whether the given Jalali year is a leap year.
#[must_use]
pub fn is_jalali_leap_year(jy: i32) -> bool {
    jal_cal(i64::from(jy)).leap == 0
}

/// Breaks of the 2820-year Jalali leap cycle grouping.
const BREAKS: [i64; 20] = [
    -61, 9, 38, 199, 426, 686, 756, 818, 1111, 1181, 1210, 1635, 2060, 2097, 2192, 2262, 2324,
    2394, 2456, 3178,
];

struct JalCal {
    /// Number of years since the last leap year (0 means leap).
    leap: i64,
    /// Gregorian year of the first day of this Jalali year.
    gy: i64,
    /// Gregorian March day of Farvardin 1st.
    march: i64,
}

fn jal_cal(jy: i64) -> JalCal {
    let gy = jy + 621;
    let mut leap_j = -14i64;
    let mut jp = BREAKS[0];
    let mut jump = 0i64;

    for &jm in &BREAKS[1..] {
        jump = jm - jp;
        if jy < jm {
            break;
        }
        leap_j += jump / 33 * 8 + (jump % 33) / 4;
        jp = jm;
    }
    let mut n = jy - jp;

    leap_j += n / 33 * 8 + (n % 33 + 3) / 4;
    if jump % 33 == 4 && jump - n == 4 {
        leap_j += 1;
    }

    let leap_g = gy / 4 - (gy / 100 + 1) * 3 / 4 - 150;
    let march = 20 + leap_j - leap_g;

    if jump - n < 6 {
        n = n - jump + (jump + 4) / 33 * 33;
    }
    let mut leap = ((n + 1) % 33 - 1) % 4;
    if leap == -1 {
        leap = 4;
    }

    JalCal { leap, gy, march }
}

fn jalali_to_jdn(jy: i64, jm: i64, jd: i64) -> i64 {
    let r = jal_cal(jy);
    gregorian_to_jdn(r.gy, 3, r.march) + (jm - 1) * 31 - jm / 7 * (jm - 7) + jd - 1
}

fn jdn_to_jalali(jdn: i64) -> (i64, i64, i64) {
    let (gy, _, _) = jdn_to_gregorian(jdn);
    let mut jy = gy - 621;
    let r = jal_cal(jy);
    let jdn1f = gregorian_to_jdn(gy, 3, r.march);
    let mut k = jdn - jdn1f;
    if k >= 0 {
        if k <= 185 {
            return (jy, 1 + k / 31, k % 31 + 1);
        }
        k -= 186;
    } else {
        jy -= 1;
        k += 179;
        if r.leap == 1 {
            k += 1;
        }
    }
    (jy, 7 + k / 30, k % 30 + 1)
}

fn gregorian_to_jdn(gy: i64, gm: i64, gd: i64) -> i64 {
    let mut d =
        (gy + (gm - 8) / 6 + 100_100) * 1461 / 4 + (153 * ((gm + 9) % 12) + 2) / 5 + gd - 34_840_408;
    d -= (gy + 100_100 + (gm - 8) / 6) / 100 * 3 / 4 - 752;
    d
}

fn jdn_to_gregorian(jdn: i64) -> (i64, i64, i64) {
    let mut j = 4 * jdn + 139_361_631;
    j += (4 * jdn + 183_187_720) / 146_097 * 3 / 4 * 4 - 3908;
    let i = (j % 1461) / 4 * 5 + 308;
    let gd = (i % 153) / 5 + 1;
    let gm = (i / 153) % 12 + 1;
    let gy = j / 1461 - 100_100 + (8 - gm) / 6;
    (gy, gm, gd)
}
