//! Line-item builder: converts the purchases section into
//! [`PurchasedItem`] records.

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::ParseError;
use crate::models::receipt::PurchasedItem;

use super::fields::{extract_quantity_and_unit, parse_decimal};

/// Token separating quantity from price in a purchase row.
const QUANTITY_PRICE_SEPARATOR: &str = " x ";

/// Build purchased items from the purchases section, in source order.
///
/// Rows with a blank name are separator artifacts and are dropped
/// silently. Quantity/price parse failures are fatal to the whole build;
/// unit inference failures are row-local and only cost the row its unit
/// annotation.
pub fn build_items(section: &[Vec<String>]) -> Result<Vec<PurchasedItem>, ParseError> {
    let mut items = Vec::new();

    for row in section {
        let name = row
            .first()
            .ok_or_else(|| ParseError::Layout("empty purchase row".to_string()))?;
        if name.is_empty() {
            continue;
        }

        let amounts = row.get(1).ok_or_else(|| {
            ParseError::Layout(format!("purchase row {name:?} has no amount field"))
        })?;
        let (quantity_str, price_str) =
            amounts
                .split_once(QUANTITY_PRICE_SEPARATOR)
                .ok_or(ParseError::Field {
                    field: "purchase amounts",
                    value: amounts.clone(),
                })?;

        let quantity = parse_decimal("purchase quantity", quantity_str)?;
        let price = parse_decimal("purchase price", price_str)?;
        if quantity <= Decimal::ZERO || price <= Decimal::ZERO {
            return Err(ParseError::Field {
                field: "purchase amounts",
                value: amounts.clone(),
            });
        }

        let mut item = PurchasedItem::new(name.as_str(), quantity, price);
        match extract_quantity_and_unit(name) {
            Some((unit_quantity, unit)) => {
                item = item.with_unit(unit, unit_quantity);
            }
            None => {
                debug!("no unit inferred for {name:?}");
            }
        }
        items.push(item);
    }

    Ok(items)
}
