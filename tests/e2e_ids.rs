//! Identifier encoding: serial digits, dates, and the id text form.

use proptest::prelude::*;
use sln::model::{decode_serial, encode_serial};
use sln::{Date, Id, IdSet, Type};

fn type_name() -> impl Strategy<Value = String> {
    "[A-RT-Z][A-Za-z0-9_]{0,12}"
}

proptest! {
    #[test]
    fn test_serial_round_trip(serial in 0i64..=i64::MAX) {
        let digits = encode_serial(serial);
        prop_assert_eq!(decode_serial(&digits), Some(serial));
    }

    #[test]
    fn test_serial_injective(a in 0i64..=i64::MAX, b in 0i64..=i64::MAX) {
        prop_assume!(a != b);
        prop_assert_ne!(encode_serial(a), encode_serial(b));
    }

    #[test]
    fn test_id_round_trip(
        name in type_name(),
        year in -9999i32..=9999,
        day in 1i32..=365,
        serial in 0i64..=i64::MAX,
    ) {
        let typ = Type::new(name).unwrap();
        let date = Date::from_ymd(year, 1, day);
        let id = Id::new(&typ, date, serial);
        let parsed = Id::parse(&id.to_string()).unwrap();
        prop_assert_eq!(&parsed, &id);
        prop_assert_eq!(parsed.typ(), &typ);
        prop_assert_eq!(parsed.date(), Some(date));
        prop_assert_eq!(parsed.serial(), Some(serial));
    }

    #[test]
    fn test_date_display_parse(year in -9999i32..=9999, day in 1i32..=366) {
        let date = Date::from_ymd(year, 1, day);
        let text = date.to_string();
        prop_assert_eq!(text.parse::<Date>().unwrap(), date);
    }
}

#[test]
fn test_serial_digits() {
    assert_eq!(encode_serial(0), "0");
    assert_eq!(encode_serial(63), "_");
    assert_eq!(encode_serial(64), "00");
    assert_eq!(encode_serial(65), "10");
    assert_eq!(decode_serial(""), None);
    assert_eq!(decode_serial("!"), None);
}

#[test]
fn test_ids_group_by_type() {
    let person = Type::new("Person").unwrap();
    let place = Type::new("Place").unwrap();
    let date = Date::from_ymd(2023, 3, 12);
    let ids: Vec<Id> = (0..3)
        .map(|s| Id::new(&person, date, s))
        .chain([Id::new(&place, date, 0)])
        .collect();

    let mut set: IdSet = ids.iter().collect();
    assert_eq!(set.len(), 4);
    assert_eq!(set.num_type(), 2);
    assert_eq!(set.len_type(&person), 3);

    set.remove([&ids[3]]);
    assert!(!set.contains_type(&place));
    assert!(set.contains(&ids[0]));
}

#[test]
fn test_id_serde_as_string() {
    let id = Id::new(&Type::new("Person").unwrap(), Date::from_ymd(2023, 3, 12), 70);
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{id}\""));
    let back: Id = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
    assert!(serde_json::from_str::<Id>("\"person#2023-071-0\"").is_err());
}
