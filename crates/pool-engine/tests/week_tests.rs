//! Tests for ISO year-week labels.

use chrono::NaiveDate;
use pool_engine::IsoWeek;

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[test]
fn parses_padded_and_unpadded_labels() {
    let padded: IsoWeek = "2024-W07".parse().unwrap();
    let unpadded: IsoWeek = "2024-W7".parse().unwrap();
    assert_eq!(padded, unpadded);
    assert_eq!(padded.to_string(), "2024-W07");
}

#[test]
fn orders_numerically_not_lexically() {
    let w9: IsoWeek = "2024-W9".parse().unwrap();
    let w10: IsoWeek = "2024-W10".parse().unwrap();
    assert!(w9 < w10);
    assert!("2024-W52".parse::<IsoWeek>().unwrap() < "2025-W01".parse::<IsoWeek>().unwrap());
}

#[test]
fn rejects_week_53_in_a_52_week_year() {
    assert!("2023-W53".parse::<IsoWeek>().is_err());
    assert!("2020-W53".parse::<IsoWeek>().is_ok());
}

#[test]
fn rejects_garbage() {
    assert!("2024".parse::<IsoWeek>().is_err());
    assert!("2024-Wxx".parse::<IsoWeek>().is_err());
    assert!("".parse::<IsoWeek>().is_err());
}

#[test]
fn week_of_date_uses_iso_year() {
    assert_eq!(IsoWeek::of(d("2024-12-30")).to_string(), "2025-W01");
    assert_eq!(IsoWeek::of(d("2021-01-03")).to_string(), "2020-W53");
    assert_eq!(IsoWeek::of(d("2024-09-19")).to_string(), "2024-W38");
}

#[test]
fn monday_roundtrips_through_week_of() {
    let week: IsoWeek = "2024-W25".parse().unwrap();
    assert_eq!(week.monday(), d("2024-06-17"));
    assert_eq!(IsoWeek::of(week.monday()), week);
}
