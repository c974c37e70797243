use chrono::{NaiveDateTime, SubsecRound};
use rust_decimal::Decimal;

use crate::sql::SqlValue;

/// Target table for both the database insert and the seeder file.
pub const TABLE_NAME: &str = "m_item";

/// m_item モデル (id is assigned by the database)
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub bu_id: Option<i64>,
    pub code: Option<String>,
    pub item_type_id: Option<i64>,
    pub cat1_id: Option<i64>,
    pub cat2_id: Option<i64>,
    pub cat3_id: Option<i64>,
    pub cat4_id: Option<i64>,
    pub name: String,
    pub name_long: Option<String>,
    pub unit_id: Option<i64>,
    pub unit: Option<String>,
    pub manufacturer: Option<String>,
    pub price_base: Decimal,
    pub photo: Option<String>,
    pub spec: Option<String>,
    pub weight: Option<Decimal>,
    pub weight_unit_id: Option<i64>,
    pub dim_width: Option<Decimal>,
    pub dim_width_unit_id: Option<i64>,
    pub dim_length: Option<Decimal>,
    pub dim_length_unit_id: Option<i64>,
    pub dim_height: Option<Decimal>,
    pub dim_height_unit_id: Option<i64>,
    pub is_active: bool,
    pub creator_id: Option<i64>,
    pub editor_id: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub is_scale_item: Option<bool>,
    pub round: Option<Decimal>,
    pub vat_applicable: Option<bool>,
    pub supplier_id: Option<i64>,
    pub default_price_sale: Option<Decimal>,
    pub barcode: Option<String>,

    // 卸売価格 (not stored in m_item)
    pub wholesale_min_qty: Option<Decimal>,
    pub wholesale_unit_price: Option<Decimal>,
    pub wholesale2_min_qty: Option<Decimal>,
    pub wholesale2_unit_price: Option<Decimal>,
}

impl ItemRecord {
    /// Creates an active record with both timestamps set to `now`.
    pub fn new(name: impl Into<String>, price_base: Decimal, now: NaiveDateTime) -> Self {
        Self {
            bu_id: None,
            code: None,
            item_type_id: None,
            cat1_id: None,
            cat2_id: None,
            cat3_id: None,
            cat4_id: None,
            name: name.into(),
            name_long: None,
            unit_id: None,
            unit: None,
            manufacturer: None,
            price_base,
            photo: None,
            spec: None,
            weight: None,
            weight_unit_id: None,
            dim_width: None,
            dim_width_unit_id: None,
            dim_length: None,
            dim_length_unit_id: None,
            dim_height: None,
            dim_height_unit_id: None,
            is_active: true,
            creator_id: None,
            editor_id: None,
            created_at: Some(now),
            updated_at: Some(now),
            is_scale_item: None,
            round: None,
            vat_applicable: None,
            supplier_id: None,
            default_price_sale: None,
            barcode: None,
            wholesale_min_qty: None,
            wholesale_unit_price: None,
            wholesale2_min_qty: None,
            wholesale2_unit_price: None,
        }
    }

    /// Values in `COLUMNS` order.
    pub fn values(&self) -> impl Iterator<Item = SqlValue<'_>> + '_ {
        COLUMNS.iter().map(move |column| (column.value)(self))
    }
}

/// One m_item column and how to read it from a record.
#[derive(Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub value: fn(&ItemRecord) -> SqlValue<'_>,
}

/// Column order shared by the placeholder and literal renderers.
pub const COLUMNS: [Column; 34] = [
    Column { name: "m_bu_id", value: |r| SqlValue::Integer(r.bu_id) },
    Column { name: "code", value: |r| SqlValue::Text(r.code.as_deref()) },
    Column { name: "m_item_type_id", value: |r| SqlValue::Integer(r.item_type_id) },
    Column { name: "m_cat1_id", value: |r| SqlValue::Integer(r.cat1_id) },
    Column { name: "m_cat2_id", value: |r| SqlValue::Integer(r.cat2_id) },
    Column { name: "m_cat3_id", value: |r| SqlValue::Integer(r.cat3_id) },
    Column { name: "m_cat4_id", value: |r| SqlValue::Integer(r.cat4_id) },
    Column { name: "item_name", value: |r| SqlValue::Text(Some(r.name.as_str())) },
    Column { name: "item_name_long", value: |r| SqlValue::Text(r.name_long.as_deref()) },
    Column { name: "unit_id", value: |r| SqlValue::Integer(r.unit_id) },
    Column { name: "unit", value: |r| SqlValue::Text(r.unit.as_deref()) },
    Column { name: "mnfct", value: |r| SqlValue::Text(r.manufacturer.as_deref()) },
    Column { name: "price_base", value: |r| SqlValue::Decimal(Some(r.price_base)) },
    Column { name: "item_photo", value: |r| SqlValue::Text(r.photo.as_deref()) },
    Column { name: "spec", value: |r| SqlValue::Text(r.spec.as_deref()) },
    Column { name: "weight", value: |r| SqlValue::Decimal(r.weight) },
    Column { name: "weight_unit_id", value: |r| SqlValue::Integer(r.weight_unit_id) },
    Column { name: "dim_l", value: |r| SqlValue::Decimal(r.dim_width) },
    Column { name: "dim_l_unit_id", value: |r| SqlValue::Integer(r.dim_width_unit_id) },
    Column { name: "dim_p", value: |r| SqlValue::Decimal(r.dim_length) },
    Column { name: "dim_p_unit_id", value: |r| SqlValue::Integer(r.dim_length_unit_id) },
    Column { name: "dim_t", value: |r| SqlValue::Decimal(r.dim_height) },
    Column { name: "dim_t_unit_id", value: |r| SqlValue::Integer(r.dim_height_unit_id) },
    Column { name: "is_active", value: |r| SqlValue::Boolean(Some(r.is_active)) },
    Column { name: "creator_id", value: |r| SqlValue::Integer(r.creator_id) },
    Column { name: "editor_id", value: |r| SqlValue::Integer(r.editor_id) },
    Column { name: "created_at", value: |r| whole_seconds(r.created_at) },
    Column { name: "updated_at", value: |r| whole_seconds(r.updated_at) },
    Column { name: "is_timbangan", value: |r| SqlValue::Boolean(r.is_scale_item) },
    Column { name: "round", value: |r| SqlValue::Decimal(r.round) },
    Column { name: "flag_ppn", value: |r| SqlValue::Boolean(r.vat_applicable) },
    Column { name: "m_supp_id", value: |r| SqlValue::Integer(r.supplier_id) },
    Column { name: "default_price_sale", value: |r| SqlValue::Decimal(r.default_price_sale) },
    Column { name: "barcode", value: |r| SqlValue::Text(r.barcode.as_deref()) },
];

pub const COLUMN_COUNT: usize = COLUMNS.len();

// Literals carry whole seconds, so the bound value must too.
fn whole_seconds(ts: Option<NaiveDateTime>) -> SqlValue<'static> {
    SqlValue::Timestamp(ts.map(|t| t.trunc_subsecs(0)))
}
