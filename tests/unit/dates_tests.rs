//! Unit tests for deadline parsing and Jalali calendar arithmetic.

use chrono::NaiveDate;
use teledo::dates::{
    self, format_jalali, gregorian_to_jalali, is_jalali_leap_year, jalali_month_length,
    jalali_to_gregorian, parse_date, parse_deadline, DateInputError,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn jalali_new_year_1400_is_march_21_2021() {
    assert_eq!(jalali_to_gregorian(1400, 1, 1), Some(date(2021, 3, 21)));
}

#[test]
fn jalali_1367_11_08_is_january_28_1989() {
    assert_eq!(jalali_to_gregorian(1367, 11, 8), Some(date(1989, 1, 28)));
}

#[test]
fn jalali_new_year_1403_is_march_20_2024() {
    assert_eq!(jalali_to_gregorian(1403, 1, 1), Some(date(2024, 3, 20)));
}

#[test]
fn gregorian_round_trip() {
    for greg in [
        date(2021, 3, 21),
        date(1989, 1, 28),
        date(2026, 8, 6),
        date(2025, 3, 20),
    ] {
        let (jy, jm, jd) = gregorian_to_jalali(greg);
        assert_eq!(jalali_to_gregorian(jy, jm, jd), Some(greg), "round trip {greg}");
    }
}

#[test]
fn leap_years_follow_the_33_year_cycle() {
    assert!(is_jalali_leap_year(1403));
    assert!(is_jalali_leap_year(1399));
    assert!(!is_jalali_leap_year(1400));
    assert!(!is_jalali_leap_year(1404));
}

#[test]
fn esfand_length_depends_on_leap_year() {
    assert_eq!(jalali_month_length(1403, 12), 30);
    assert_eq!(jalali_month_length(1404, 12), 29);
    assert_eq!(jalali_month_length(1404, 1), 31);
    assert_eq!(jalali_month_length(1404, 7), 30);
}

#[test]
fn esfand_30_rejected_outside_leap_years() {
    assert!(jalali_to_gregorian(1403, 12, 30).is_some());
    assert!(jalali_to_gregorian(1404, 12, 30).is_none());
}

#[test]
fn out_of_range_components_rejected() {
    assert!(jalali_to_gregorian(1400, 13, 1).is_none());
    assert!(jalali_to_gregorian(1400, 0, 1).is_none());
    assert!(jalali_to_gregorian(1400, 1, 0).is_none());
    assert!(jalali_to_gregorian(1400, 1, 32).is_none());
}

#[test]
fn format_jalali_renders_zero_padded() {
    assert_eq!(format_jalali(date(2021, 3, 21)), "1400-01-01");
}

#[test]
fn parse_date_accepts_gregorian_layouts() {
    let expected = Some(date(2030, 1, 15));
    assert_eq!(parse_date("2030-01-15"), expected);
    assert_eq!(parse_date("2030/01/15"), expected);
    assert_eq!(parse_date("15.01.2030"), expected);
    assert_eq!(parse_date("15/01/2030"), expected);
}

#[test]
fn parse_date_reads_jalali_years_as_jalali() {
    // 1405-01-15 is the 15th day of the Jalali year starting 2026-03-21.
    assert_eq!(parse_date("1405-01-15"), Some(date(2026, 4, 4)));
    assert_eq!(parse_date("1405/01/15"), Some(date(2026, 4, 4)));
}

#[test]
fn parse_date_rejects_garbage() {
    assert_eq!(parse_date("tomorrow"), None);
    assert_eq!(parse_date("2030-01"), None);
    assert_eq!(parse_date("2030-01-15-99"), None);
    assert_eq!(parse_date(""), None);
    assert_eq!(parse_date("12/05/26"), None);
}

#[test]
fn deadline_must_be_strictly_future() {
    let today = date(2026, 8, 6);
    assert_eq!(
        parse_deadline("2026-08-06", today),
        Err(DateInputError::NotFuture)
    );
    assert_eq!(
        parse_deadline("2020-01-01", today),
        Err(DateInputError::NotFuture)
    );
    assert_eq!(parse_deadline("2026-08-07", today), Ok(date(2026, 8, 7)));
}

#[test]
fn deadline_bad_format_is_distinct_from_past() {
    let today = date(2026, 8, 6);
    assert_eq!(
        parse_deadline("next week", today),
        Err(DateInputError::BadFormat)
    );
    assert_ne!(
        parse_deadline("next week", today),
        parse_deadline("2020-01-01", today)
    );
}

#[test]
fn deadline_accepts_jalali_input() {
    let today = date(2026, 8, 6);
    // 1405-12-01 lands in February 2027.
    let parsed = parse_deadline("1405-12-01", today).expect("future jalali date");
    assert!(parsed > today);
    assert_eq!(dates::gregorian_to_jalali(parsed), (1405, 12, 1));
}
