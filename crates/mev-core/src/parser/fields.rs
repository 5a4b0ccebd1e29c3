//! Field recovery utilities: list partitioning, unit inference and
//! tolerant numeric coercion.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ParseError;
use crate::models::receipt::Unit;

use super::patterns::QUANTITY_UNIT;

/// Partition `rows` into maximal runs of non-delimiter elements.
///
/// The delimiter itself is dropped and empty runs from consecutive
/// delimiters are discarded. An empty or all-delimiter input yields an
/// empty result; this never fails.
pub fn split_sections<T: PartialEq + Clone>(rows: &[T], delimiter: &T) -> Vec<Vec<T>> {
    let mut sections = Vec::new();
    let mut current = Vec::new();

    for row in rows {
        if row == delimiter {
            if !current.is_empty() {
                sections.push(std::mem::take(&mut current));
            }
        } else {
            current.push(row.clone());
        }
    }
    if !current.is_empty() {
        sections.push(current);
    }
    sections
}

/// Scan free text for a `<number><unit>` token and return the magnitude
/// and unit, or `None` when nothing qualifies.
///
/// Case-insensitive; a unit token immediately followed by another letter
/// ("12gb") is skipped and the scan continues. Any parse failure degrades
/// to `None` rather than erroring: unit inference is best-effort.
pub fn extract_quantity_and_unit(text: &str) -> Option<(Decimal, Unit)> {
    for caps in QUANTITY_UNIT.captures_iter(text) {
        if !caps[3].is_empty() {
            continue;
        }
        let magnitude = match Decimal::from_str(&caps[1]) {
            Ok(m) => m,
            Err(_) => continue,
        };
        if let Some(unit) = Unit::from_token(&caps[2]) {
            return Some((magnitude, unit));
        }
    }
    None
}

/// Parse a source-formatted decimal (`.` separator, no grouping).
///
/// Unlike unit inference, callers decide whether a failure here is fatal;
/// quantity and price parse failures abort the whole receipt build.
pub fn parse_decimal(field: &'static str, token: &str) -> Result<Decimal, ParseError> {
    Decimal::from_str(token.trim()).map_err(|_| ParseError::Field {
        field,
        value: token.to_string(),
    })
}

/// Strip a fixed-length label prefix from a header field.
///
/// Offsets are source-format constants; a field too short for its label,
/// or one that is nothing but the label, is a layout defect.
pub fn strip_label(field: &'static str, text: &str, label_len: usize) -> Result<String, ParseError> {
    let suffix: String = text.chars().skip(label_len).collect();
    if suffix.is_empty() {
        return Err(ParseError::Field {
            field,
            value: text.to_string(),
        });
    }
    Ok(suffix)
}
