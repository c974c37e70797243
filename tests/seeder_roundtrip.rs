//! Seeder output parsed back into typed values must match the bound parameters
//! the database path would send for the same records.

use std::fs;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use excel_seeder::models::{ItemRecord, COLUMN_COUNT};
use excel_seeder::seeder::write_seeder_at;
use excel_seeder::sql::{InsertStatement, SqlValue, TIMESTAMP_FORMAT};

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 11, 3)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

fn sample_items() -> Vec<ItemRecord> {
    let mut plain = ItemRecord::new("Beras Pandan Wangi 5kg", Decimal::new(6850000, 2), at(9, 15, 42));
    plain.barcode = Some("8992761111111".to_string());
    plain.default_price_sale = Some(Decimal::new(72000, 0));

    let mut quoted = ItemRecord::new("O'Brien's \"Best\" Tea, 25 bags", Decimal::ZERO, at(9, 15, 42));
    quoted.manufacturer = Some("O'Brien & Sons".to_string());
    quoted.spec = Some("it''s; -- not a comment".to_string());
    quoted.unit = Some("PCS".to_string());

    let mut full = ItemRecord::new("Timbangan Gula", Decimal::from_str("0.000001").unwrap(), at(23, 59, 59));
    full.bu_id = Some(1);
    full.code = Some("GL-01".to_string());
    full.item_type_id = Some(2);
    full.cat1_id = Some(10);
    full.cat2_id = Some(11);
    full.cat3_id = Some(12);
    full.cat4_id = Some(13);
    full.name_long = Some("Gula Pasir Curah (per kg)".to_string());
    full.unit_id = Some(3);
    full.photo = Some("items/gula.jpg".to_string());
    full.weight = Some(Decimal::new(1000, 3));
    full.weight_unit_id = Some(4);
    full.dim_width = Some(Decimal::new(125, 1));
    full.dim_width_unit_id = Some(5);
    full.dim_length = Some(Decimal::new(-3, 0));
    full.dim_length_unit_id = Some(5);
    full.dim_height = Some(Decimal::from_str("123456789.123456789").unwrap());
    full.dim_height_unit_id = Some(5);
    full.is_active = false;
    full.creator_id = Some(i64::MAX);
    full.editor_id = Some(-1);
    full.updated_at = None;
    full.is_scale_item = Some(true);
    full.round = Some(Decimal::new(50, 0));
    full.vat_applicable = Some(false);
    full.supplier_id = Some(99);
    full.default_price_sale = None;

    let stamped = NaiveDate::from_ymd_opt(2024, 11, 3)
        .unwrap()
        .and_hms_milli_opt(9, 15, 42, 678)
        .unwrap();
    let mut precise = ItemRecord::new("Minyak Goreng 1L", Decimal::new(1000, 3), stamped);
    precise.default_price_sale = Some(Decimal::new(1850000, 2));
    precise.updated_at = Some(stamped + chrono::Duration::microseconds(999_999));

    vec![plain, quoted, full, precise]
}

/// A value read back from a SQL literal.
#[derive(Debug, PartialEq)]
enum Parsed {
    Null,
    Quoted(String),
    Bare(String),
}

/// Splits one `(v1, v2, ...)` tuple body into literals, undoing quote doubling.
fn split_tuple(body: &str) -> Vec<Parsed> {
    let mut values = Vec::new();
    let mut chars = body.chars().peekable();

    loop {
        match chars.peek() {
            None => break,
            Some('\'') => {
                chars.next();
                let mut text = String::new();
                while let Some(c) = chars.next() {
                    if c == '\'' {
                        if chars.peek() == Some(&'\'') {
                            chars.next();
                            text.push('\'');
                        } else {
                            break;
                        }
                    } else {
                        text.push(c);
                    }
                }
                values.push(Parsed::Quoted(text));
            }
            Some(_) => {
                let mut raw = String::new();
                while let Some(&c) = chars.peek() {
                    if c == ',' {
                        break;
                    }
                    raw.push(c);
                    chars.next();
                }
                values.push(if raw == "NULL" { Parsed::Null } else { Parsed::Bare(raw) });
            }
        }
        // separator ", "
        if chars.peek() == Some(&',') {
            chars.next();
            assert_eq!(chars.next(), Some(' '));
        }
    }
    values
}

fn tuples(text: &str) -> Vec<Vec<Parsed>> {
    text.lines()
        .filter_map(|line| line.strip_prefix("\t("))
        .map(|line| {
            let body = line
                .strip_suffix("),")
                .or_else(|| line.strip_suffix(");"))
                .or_else(|| line.strip_suffix(')'))
                .expect("tuple terminator");
            split_tuple(body)
        })
        .collect()
}

fn assert_same_value(parsed: &Parsed, bound: SqlValue<'_>) {
    match (parsed, bound) {
        (Parsed::Null, value) => assert!(value.is_null(), "NULL literal for {value:?}"),
        (Parsed::Quoted(text), SqlValue::Text(Some(s))) => assert_eq!(text, s),
        (Parsed::Quoted(text), SqlValue::Timestamp(Some(ts))) => {
            assert_eq!(NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).unwrap(), ts)
        }
        (Parsed::Bare(raw), SqlValue::Integer(Some(i))) => assert_eq!(raw.parse::<i64>().unwrap(), i),
        (Parsed::Bare(raw), SqlValue::Decimal(Some(d))) => {
            let back = Decimal::from_str(raw).unwrap();
            assert_eq!(back, d);
            assert_eq!(back.scale(), d.scale());
        }
        (Parsed::Bare(raw), SqlValue::Boolean(Some(b))) => assert_eq!(raw.parse::<bool>().unwrap(), b),
        (parsed, bound) => panic!("literal {parsed:?} does not match bound value {bound:?}"),
    }
}

#[test]
fn seeder_literals_match_bound_parameters() {
    let items = sample_items();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seeder.sql");

    write_seeder_at(&items, &path, 32767, at(12, 0, 0)).unwrap();
    let text = fs::read_to_string(&path).unwrap();

    let parsed = tuples(&text);
    assert_eq!(parsed.len(), items.len());

    let statement = InsertStatement::for_batch(&items);
    for (row, literals) in parsed.iter().enumerate() {
        assert_eq!(literals.len(), COLUMN_COUNT);
        let bound = &statement.params[row * COLUMN_COUNT..(row + 1) * COLUMN_COUNT];
        for (literal, value) in literals.iter().zip(bound) {
            assert_same_value(literal, *value);
        }
    }
}

#[test]
fn subsecond_timestamps_and_decimal_scale_survive_round_trip() {
    let items = sample_items();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seeder.sql");
    write_seeder_at(&items, &path, 32767, at(12, 0, 0)).unwrap();
    let text = fs::read_to_string(&path).unwrap();

    let last = tuples(&text).pop().unwrap();
    assert_eq!(last[12], Parsed::Bare("1.000".to_string()));
    assert_eq!(last[26], Parsed::Quoted("2024-11-03 09:15:42".to_string()));
    assert_eq!(last[27], Parsed::Quoted("2024-11-03 09:15:43".to_string()));

    let statement = InsertStatement::for_batch(&items);
    let row = (items.len() - 1) * COLUMN_COUNT;
    assert_eq!(statement.params[row + 26], SqlValue::Timestamp(Some(at(9, 15, 42))));
    assert_eq!(statement.params[row + 27], SqlValue::Timestamp(Some(at(9, 15, 43))));
}

#[test]
fn quotes_are_doubled_in_file_and_raw_in_parameters() {
    let items = sample_items();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seeder.sql");
    write_seeder_at(&items, &path, 32767, at(12, 0, 0)).unwrap();
    let text = fs::read_to_string(&path).unwrap();

    assert!(text.contains("'O''Brien''s \"Best\" Tea, 25 bags'"));
    assert!(text.contains("'it''''s; -- not a comment'"));

    let statement = InsertStatement::for_batch(&items);
    assert_eq!(
        statement.params[COLUMN_COUNT + 7],
        SqlValue::Text(Some("O'Brien's \"Best\" Tea, 25 bags"))
    );
}

#[test]
fn seeder_is_byte_identical_across_runs() {
    let items = sample_items();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("seeder.sql");

    write_seeder_at(&items, &path, 100, at(12, 0, 0)).unwrap();
    let first = fs::read(&path).unwrap();
    write_seeder_at(&items, &path, 100, at(12, 0, 0)).unwrap();
    let second = fs::read(&path).unwrap();
    assert_eq!(first, second);

    // only the timestamp line differs with another clock
    write_seeder_at(&items, &path, 100, at(13, 0, 0)).unwrap();
    let third = fs::read_to_string(&path).unwrap();
    let first = String::from_utf8(first).unwrap();
    let differing: Vec<_> = first
        .lines()
        .zip(third.lines())
        .filter(|(a, b)| a != b)
        .collect();
    assert_eq!(differing.len(), 1);
    assert!(differing[0].0.starts_with("-- Generated at:"));
}

#[test]
fn overwrites_longer_previous_file() {
    let items = sample_items();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seeder.sql");
    fs::write(&path, "x".repeat(100_000)).unwrap();

    write_seeder_at(&items[..1], &path, 32767, at(12, 0, 0)).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("-- Generated seeder file for m_item table"));
    assert!(!text.contains('x'));
}
