//! Receipt assembler: combines header rows and line items into one
//! immutable [`Receipt`].

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::error::ParseError;
use crate::models::receipt::{CountryCode, CurrencyCode, Receipt};

use super::blob::{BlobRow, ReceiptBlob, SECTION_DELIMITER};
use super::fields::{parse_decimal, split_sections, strip_label};
use super::items::build_items;

/// Label-prefix lengths for the fixed-offset header fields of one source
/// format. Format changes touch this table, not scattered literals.
#[derive(Debug, Clone, Copy)]
pub struct HeaderLayout {
    /// Label before the company fiscal code (header field 1).
    pub company_id_label: usize,
    /// Label before the cash register id (header field 3).
    pub cash_register_label: usize,
    /// Label before the date token (date-section field 0).
    pub date_label: usize,
    /// Label before the time token (date-section field 1).
    pub time_label: usize,
}

/// Offsets for the SFS MD verification page.
pub const SFS_MD_LAYOUT: HeaderLayout = HeaderLayout {
    company_id_label: 12,
    cash_register_label: 25,
    date_label: 5,
    time_label: 3,
};

const DATE_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// A receipt's rows partitioned into positionally meaningful sections:
/// header, purchases, totals, ..., date, trailer.
#[derive(Debug, Clone)]
pub struct ReceiptSections {
    sections: Vec<Vec<Vec<String>>>,
}

impl ReceiptSections {
    /// Partition a located blob on the sentinel row.
    pub fn from_blob(blob: ReceiptBlob) -> Self {
        let delimiter = BlobRow::Marker(SECTION_DELIMITER.to_string());
        let sections = split_sections(&blob.rows, &delimiter)
            .into_iter()
            .map(|section| section.into_iter().map(BlobRow::into_fields).collect())
            .collect();
        Self { sections }
    }

    /// Number of partition sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    fn field(&self, section: usize, row: usize, col: usize) -> Result<&str, ParseError> {
        self.sections
            .get(section)
            .and_then(|s| s.get(row))
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .ok_or_else(|| {
                ParseError::Layout(format!(
                    "missing field {col} of row {row} in section {section}"
                ))
            })
    }

    /// Assemble the sections into a receipt for `user_id`, originating
    /// from `url`.
    ///
    /// Cross-field consistency (sum of line totals vs the receipt total)
    /// is deliberately not enforced here; discounts make small
    /// discrepancies legitimate.
    pub fn assemble(&self, user_id: Uuid, url: &str) -> Result<Receipt, ParseError> {
        let layout = SFS_MD_LAYOUT;

        // Header / purchases / totals up front, date and trailer at the
        // back; middle sections vary by merchant.
        if self.len() < 5 {
            return Err(ParseError::Layout(format!(
                "expected at least 5 sections, found {}",
                self.len()
            )));
        }
        let last = self.len() - 1;

        let company_name = self.field(0, 0, 0)?.to_string();
        if company_name.is_empty() {
            return Err(ParseError::Layout("empty company name".to_string()));
        }
        let company_id = strip_label("company id", self.field(0, 0, 1)?, layout.company_id_label)?;
        let shop_address = self.field(0, 0, 2)?.to_string();
        if shop_address.is_empty() {
            return Err(ParseError::Layout("empty shop address".to_string()));
        }
        let cash_register_id = strip_label(
            "cash register id",
            self.field(0, 0, 3)?,
            layout.cash_register_label,
        )?;

        let date_token = strip_label("date", self.field(last - 1, 0, 0)?, layout.date_label)?;
        let time_token = strip_label("time", self.field(last - 1, 0, 1)?, layout.time_label)?;
        let combined = format!("{date_token}{time_token}");
        let date = NaiveDateTime::parse_from_str(&combined, DATE_FORMAT).map_err(|_| {
            ParseError::Field {
                field: "date",
                value: combined.clone(),
            }
        })?;

        let key_token = self.field(last, 0, 1)?;
        let key: u64 = key_token.trim().parse().map_err(|_| ParseError::Field {
            field: "receipt key",
            value: key_token.to_string(),
        })?;
        if key == 0 {
            return Err(ParseError::Field {
                field: "receipt key",
                value: key_token.to_string(),
            });
        }

        let total_amount = parse_decimal("total amount", self.field(2, 0, 1)?)?;
        if total_amount <= Decimal::ZERO {
            return Err(ParseError::Field {
                field: "total amount",
                value: total_amount.to_string(),
            });
        }

        let purchases = build_items(&self.sections[1])?;
        if purchases.is_empty() {
            return Err(ParseError::Layout("receipt has no purchases".to_string()));
        }

        debug!(
            "assembled receipt key={key} register={cash_register_id} with {} purchases",
            purchases.len()
        );

        Ok(Receipt {
            id: Receipt::derive_id(&cash_register_id, key),
            date,
            user_id,
            company_id,
            company_name,
            country_code: CountryCode::Moldova,
            currency_code: CurrencyCode::MoldovanLeu,
            shop_address,
            cash_register_id: cash_register_id.clone(),
            key,
            total_amount,
            purchases,
            receipt_url: url.to_string(),
            receipt_canonical_url: Receipt::derive_canonical_url(
                &cash_register_id,
                total_amount,
                key,
                date,
            ),
        })
    }
}
