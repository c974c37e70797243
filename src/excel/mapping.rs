use std::collections::HashMap;

use serde::Deserialize;

/// Name of the built-in mapping profile.
pub const DEFAULT_PROFILE: &str = "default";

/// Record fields a spreadsheet column can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemField {
    Barcode,
    ItemName,
    PriceBase,
    DefaultPriceSale,
    WholesaleMinQty,
    WholesaleUnitPrice,
    Wholesale2MinQty,
    Wholesale2UnitPrice,
    Code,
    ItemNameLong,
    Unit,
    Manufacturer,
    Spec,
    Weight,
}

/// Header text to record field, matched case-insensitively after trimming.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderMapping {
    entries: HashMap<String, ItemField>,
}

impl Default for HeaderMapping {
    /// The MasterBarang export layout.
    fn default() -> Self {
        Self::from_entries([
            ("kode barang", ItemField::Barcode),
            ("nama barang", ItemField::ItemName),
            ("harga beli", ItemField::PriceBase),
            ("harga jual", ItemField::DefaultPriceSale),
            ("jumlah partai1", ItemField::WholesaleMinQty),
            ("harga partai1", ItemField::WholesaleUnitPrice),
            ("jumlah partai2", ItemField::Wholesale2MinQty),
            ("harga partai2", ItemField::Wholesale2UnitPrice),
        ])
    }
}

impl HeaderMapping {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, ItemField)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(header, field)| (normalize(header), field))
                .collect(),
        }
    }

    pub fn field_for(&self, header: &str) -> Option<ItemField> {
        self.entries.get(&normalize(header)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Locates mapped columns in a header row.
    ///
    /// When two headers map to the same field, the leftmost one wins.
    pub fn resolve(&self, headers: &[String]) -> ColumnIndex {
        let mut columns = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            if let Some(field) = self.field_for(header) {
                if columns.contains_key(&field) {
                    tracing::warn!(
                        "Duplicate header '{}' for {:?} (column {}), keeping first",
                        header.trim(),
                        field,
                        index
                    );
                    continue;
                }
                tracing::debug!("Mapped '{}' -> {:?} (column {})", header.trim(), field, index);
                columns.insert(field, index);
            }
        }
        ColumnIndex { columns }
    }
}

fn normalize(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Column positions of mapped fields in one sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnIndex {
    columns: HashMap<ItemField, usize>,
}

impl ColumnIndex {
    pub fn get(&self, field: ItemField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn contains(&self, field: ItemField) -> bool {
        self.columns.contains_key(&field)
    }

    /// Trimmed cell for `field`, empty when unmapped or past the row end.
    pub fn cell<'r>(&self, row: &'r [String], field: ItemField) -> &'r str {
        self.get(field)
            .and_then(|index| row.get(index))
            .map(|cell| cell.trim())
            .unwrap_or("")
    }
}
