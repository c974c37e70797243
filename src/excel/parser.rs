use std::path::Path;
use std::str::FromStr;

use calamine::{open_workbook, Reader, Xlsx};
use chrono::{Local, NaiveDateTime, SubsecRound};
use rust_decimal::Decimal;

use crate::error::{AppError, AppResult};
use crate::models::ItemRecord;

use super::mapping::{ColumnIndex, HeaderMapping, ItemField};

/// Records parsed from one sheet.
#[derive(Debug, Clone, Default)]
pub struct ParsedItems {
    pub items: Vec<ItemRecord>,
    /// Data rows rejected (missing name, bad base price).
    pub skipped: usize,
}

/// Reads the first sheet of an `.xlsx` workbook as trimmed text rows.
pub fn read_sheet_rows(path: &Path) -> AppResult<Vec<Vec<String>>> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| {
        AppError::Spreadsheet(format!("error opening Excel file {}: {}", path.display(), e))
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::Spreadsheet("Excel file has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| AppError::Spreadsheet(format!("error reading sheet {}: {}", sheet_name, e)))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect())
        .collect())
}

/// Reads and parses a workbook, stamping records with the current time.
pub fn parse_workbook(path: &Path, mapping: &HeaderMapping) -> AppResult<ParsedItems> {
    let rows = read_sheet_rows(path)?;
    let now = Local::now().naive_local().trunc_subsecs(0);
    parse_rows(&rows, mapping, now)
}

/// Converts sheet rows into item records. The first row is the header.
pub fn parse_rows(
    rows: &[Vec<String>],
    mapping: &HeaderMapping,
    now: NaiveDateTime,
) -> AppResult<ParsedItems> {
    let (headers, data) = rows
        .split_first()
        .ok_or_else(|| AppError::Spreadsheet("Excel file is empty".to_string()))?;

    let columns = mapping.resolve(headers);
    if !columns.contains(ItemField::ItemName) {
        return Err(AppError::Spreadsheet(
            "no header maps to item_name, check the mapping profile".to_string(),
        ));
    }
    if !columns.contains(ItemField::PriceBase) {
        tracing::warn!("No header maps to price_base, every item gets base price 0");
    }

    let mut parsed = ParsedItems::default();
    for (index, row) in data.iter().enumerate() {
        // 1-based sheet row, header is row 1
        let row_num = index + 2;

        if row.iter().all(|cell| cell.trim().is_empty()) {
            tracing::debug!("Row {}: empty, skipping", row_num);
            continue;
        }

        match parse_row(row, &columns, now) {
            Ok(item) => parsed.items.push(item),
            Err(reason) => {
                tracing::warn!("Row {}: {}, skipping", row_num, reason);
                parsed.skipped += 1;
            }
        }
    }

    Ok(parsed)
}

fn parse_row(row: &[String], columns: &ColumnIndex, now: NaiveDateTime) -> Result<ItemRecord, String> {
    let cell = |field| columns.cell(row, field);

    let name = cell(ItemField::ItemName);
    if name.is_empty() {
        return Err("item name is required".to_string());
    }

    let price_text = cell(ItemField::PriceBase);
    let price_base = if price_text.is_empty() {
        Decimal::ZERO
    } else {
        parse_decimal(price_text).ok_or_else(|| format!("invalid base price '{}'", price_text))?
    };
    if price_base.is_sign_negative() && !price_base.is_zero() {
        return Err(format!("negative base price '{}'", price_text));
    }

    let mut item = ItemRecord::new(name, price_base, now);
    item.barcode = optional_text(cell(ItemField::Barcode));
    item.code = optional_text(cell(ItemField::Code));
    item.name_long = optional_text(cell(ItemField::ItemNameLong));
    item.unit = optional_text(cell(ItemField::Unit));
    item.manufacturer = optional_text(cell(ItemField::Manufacturer));
    item.spec = optional_text(cell(ItemField::Spec));

    item.default_price_sale = optional_decimal(cell(ItemField::DefaultPriceSale), "default sale price");
    item.weight = optional_decimal(cell(ItemField::Weight), "weight");
    item.wholesale_min_qty = optional_decimal(cell(ItemField::WholesaleMinQty), "wholesale min qty");
    item.wholesale_unit_price = optional_decimal(cell(ItemField::WholesaleUnitPrice), "wholesale unit price");
    item.wholesale2_min_qty = optional_decimal(cell(ItemField::Wholesale2MinQty), "wholesale 2 min qty");
    item.wholesale2_unit_price =
        optional_decimal(cell(ItemField::Wholesale2UnitPrice), "wholesale 2 unit price");

    Ok(item)
}

/// Plain (`12500.50`) or scientific (`1.25E4`) notation.
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(&s.to_ascii_lowercase()))
        .ok()
}

fn optional_text(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn optional_decimal(s: &str, label: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    let value = parse_decimal(s);
    if value.is_none() {
        tracing::warn!("Invalid {} '{}', skipping", label, s);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    const HEADER: &[&str] = &[
        "Kode Barang",
        "Nama Barang",
        "Harga Beli",
        "Harga Jual",
        "Jumlah Partai1",
        "Harga Partai1",
        "Jumlah Partai2",
        "Harga Partai2",
    ];

    #[test]
    fn test_parse_full_row() {
        let sheet = rows(&[
            HEADER,
            &["8991", "Kopi Bubuk", "12500.50", "15000", "10", "14000", "50", "13500"],
        ]);
        let parsed = parse_rows(&sheet, &HeaderMapping::default(), now()).unwrap();

        assert_eq!(parsed.skipped, 0);
        let item = &parsed.items[0];
        assert_eq!(item.name, "Kopi Bubuk");
        assert_eq!(item.barcode.as_deref(), Some("8991"));
        assert_eq!(item.price_base, Decimal::new(1250050, 2));
        assert_eq!(item.default_price_sale, Some(Decimal::new(15000, 0)));
        assert_eq!(item.wholesale_min_qty, Some(Decimal::new(10, 0)));
        assert_eq!(item.wholesale2_unit_price, Some(Decimal::new(13500, 0)));
        assert!(item.is_active);
        assert_eq!(item.created_at, Some(now()));
    }

    #[test]
    fn test_missing_name_skips_row() {
        let sheet = rows(&[HEADER, &["1", "", "100"], &["2", "Teh", "200"]]);
        let parsed = parse_rows(&sheet, &HeaderMapping::default(), now()).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.skipped, 1);
        assert_eq!(parsed.items[0].name, "Teh");
    }

    #[test]
    fn test_empty_price_defaults_to_zero() {
        let sheet = rows(&[HEADER, &["", "Garam"]]);
        let parsed = parse_rows(&sheet, &HeaderMapping::default(), now()).unwrap();
        assert_eq!(parsed.items[0].price_base, Decimal::ZERO);
        assert!(parsed.items[0].barcode.is_none());
    }

    #[test]
    fn test_invalid_or_negative_price_skips_row() {
        let sheet = rows(&[HEADER, &["", "A", "abc"], &["", "B", "-5"], &["", "C", "1.5E3"]]);
        let parsed = parse_rows(&sheet, &HeaderMapping::default(), now()).unwrap();
        assert_eq!(parsed.skipped, 2);
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].price_base, Decimal::new(1500, 0));
    }

    #[test]
    fn test_invalid_optional_decimal_is_dropped() {
        let sheet = rows(&[HEADER, &["", "Minyak", "100", "n/a"]]);
        let parsed = parse_rows(&sheet, &HeaderMapping::default(), now()).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert!(parsed.items[0].default_price_sale.is_none());
    }

    #[test]
    fn test_blank_rows_are_ignored() {
        let sheet = rows(&[HEADER, &["", "", ""], &["", "Susu", "9000"]]);
        let parsed = parse_rows(&sheet, &HeaderMapping::default(), now()).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn test_empty_sheet_fails() {
        let err = parse_rows(&[], &HeaderMapping::default(), now()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_missing_name_header_fails() {
        let sheet = rows(&[&["Barcode", "Price"], &["1", "2"]]);
        assert!(parse_rows(&sheet, &HeaderMapping::default(), now()).is_err());
    }

    #[test]
    fn test_custom_profile_maps_extra_fields() {
        let mapping = HeaderMapping::from_entries([
            ("product", ItemField::ItemName),
            ("cost", ItemField::PriceBase),
            ("brand", ItemField::Manufacturer),
            ("weight (kg)", ItemField::Weight),
        ]);
        let sheet = rows(&[&["Product", "Cost", "Brand", "Weight (kg)"], &["Sabun", "3000", "Lux", "0.085"]]);
        let parsed = parse_rows(&sheet, &mapping, now()).unwrap();
        let item = &parsed.items[0];
        assert_eq!(item.manufacturer.as_deref(), Some("Lux"));
        assert_eq!(item.weight, Some(Decimal::new(85, 3)));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("12.50"), Some(Decimal::new(1250, 2)));
        assert_eq!(parse_decimal(" 2e2 "), Some(Decimal::new(200, 0)));
        assert_eq!(parse_decimal("1,000"), None);
    }
}
