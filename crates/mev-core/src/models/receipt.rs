//! Receipt data model for the Moldovan fiscal verification portal.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Country code constant for this source format (single jurisdiction).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountryCode {
    #[default]
    #[serde(rename = "md")]
    Moldova,
}

impl CountryCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountryCode::Moldova => "md",
        }
    }
}

/// Currency code constant for this source format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurrencyCode {
    #[default]
    #[serde(rename = "mdl")]
    MoldovanLeu,
}

impl CurrencyCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyCode::MoldovanLeu => "mdl",
        }
    }
}

/// Physical unit inferred from a line item's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "l")]
    Liter,
    #[serde(rename = "ml")]
    Milliliter,
}

impl Unit {
    /// Parse a unit token as it appears in item names (case-insensitive).
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "kg" => Some(Unit::Kilogram),
            "g" => Some(Unit::Gram),
            "l" => Some(Unit::Liter),
            "ml" => Some(Unit::Milliliter),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kilogram => "kg",
            Unit::Gram => "g",
            Unit::Liter => "l",
            Unit::Milliliter => "ml",
        }
    }
}

/// Barcode-linkage state of a purchased item.
///
/// The parser never advances this past `Pending`; linkage is assigned by
/// a later catalog-matching step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarcodeStatus {
    #[default]
    Pending,
    Linked,
    Unmatched,
}

/// One purchased line on a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasedItem {
    /// Item name, raw from source (may contain hidden unit tokens).
    pub name: String,

    /// Purchased count; fractional for weighed produce.
    pub quantity: Decimal,

    /// Inferred physical unit, when the name carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,

    /// Magnitude paired with `unit`; set if and only if `unit` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_quantity: Option<Decimal>,

    /// Line total in the receipt's currency.
    pub price: Decimal,

    /// Reference to a matched catalog item (assigned later, not here).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<Uuid>,

    /// Barcode-linkage state.
    #[serde(default)]
    pub status: BarcodeStatus,
}

impl PurchasedItem {
    /// Create an item with no unit annotation.
    pub fn new(name: impl Into<String>, quantity: Decimal, price: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: None,
            unit_quantity: None,
            price,
            item_id: None,
            status: BarcodeStatus::Pending,
        }
    }

    /// Attach an inferred unit and its magnitude.
    pub fn with_unit(mut self, unit: Unit, unit_quantity: Decimal) -> Self {
        self.unit = Some(unit);
        self.unit_quantity = Some(unit_quantity);
        self
    }
}

/// One parsed receipt document. Immutable after assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// Deterministic identifier; stable across reparses of the same input.
    pub id: String,

    /// Issue timestamp, combined from the date and time header tokens.
    pub date: NaiveDateTime,

    /// Requesting user; supplied by the caller, never derived from content.
    pub user_id: Uuid,

    /// Merchant fiscal code.
    pub company_id: String,

    /// Merchant legal name.
    pub company_name: String,

    #[serde(default)]
    pub country_code: CountryCode,

    #[serde(default)]
    pub currency_code: CurrencyCode,

    /// Shop address, free text.
    pub shop_address: String,

    /// Cash register identifier within the source system.
    pub cash_register_id: String,

    /// Receipt number within the source system, from the trailer row.
    pub key: u64,

    /// Receipt total.
    pub total_amount: Decimal,

    /// Line items in source order; duplicate rows are legitimate.
    pub purchases: Vec<PurchasedItem>,

    /// Originating URL, used as the external lookup key.
    pub receipt_url: String,

    /// Normalized alternate URL for the same logical receipt.
    pub receipt_canonical_url: String,
}

impl Receipt {
    /// Derive the stable receipt identifier.
    ///
    /// Register id + key is the source system's own unique pair; prefixing
    /// the country code keeps ids from different source adapters disjoint.
    pub fn derive_id(cash_register_id: &str, key: u64) -> String {
        format!("{}-{}-{}", CountryCode::Moldova.as_str(), cash_register_id, key)
    }

    /// Derive the canonical verification URL for a receipt.
    ///
    /// Mirrors the portal's own URL scheme; the total is rendered without
    /// trailing zeros, as the portal does.
    pub fn derive_canonical_url(
        cash_register_id: &str,
        total_amount: Decimal,
        key: u64,
        date: NaiveDateTime,
    ) -> String {
        format!(
            "https://mev.sfs.md/receipt-verifier/{}/{}/{}/{}",
            cash_register_id,
            total_amount.normalize(),
            key,
            date.format("%Y-%m-%d"),
        )
    }
}
