//! Receipt extraction pipeline.
//!
//! A typed, pure pipeline: [`ReceiptBlob::locate`] finds the payload in
//! page markup, [`ReceiptSections::from_blob`] partitions it, and
//! [`ReceiptSections::assemble`] builds the receipt. Each stage consumes
//! the previous stage's output type, so no stage can be invoked out of
//! order.

pub mod assemble;
pub mod blob;
pub mod fields;
pub mod items;
pub mod patterns;

pub use assemble::{HeaderLayout, ReceiptSections, SFS_MD_LAYOUT};
pub use blob::{BlobRow, ReceiptBlob, SECTION_DELIMITER};
pub use fields::{extract_quantity_and_unit, parse_decimal, split_sections};
pub use items::build_items;

use uuid::Uuid;

use crate::error::ParseError;
use crate::models::receipt::Receipt;

/// Run the whole pipeline over a fetched page.
pub fn parse_page(page: &str, user_id: Uuid, url: &str) -> Result<Receipt, ParseError> {
    let blob = ReceiptBlob::locate(page)?;
    ReceiptSections::from_blob(blob).assemble(user_id, url)
}


#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_parse_page_end_to_end() {
        let user = Uuid::from_str(testutil::USER_ID).unwrap();
        let receipt = parse_page(&testutil::kaufland_page(), user, testutil::KAUFLAND_URL).unwrap();

        assert_eq!(receipt.id, "md-J702003194-25312");
        assert_eq!(receipt.purchases.len(), 10);
        assert_eq!(receipt.key, 25312);
    }

    #[test]
    fn test_parse_page_propagates_blob_errors() {
        let user = Uuid::from_str(testutil::USER_ID).unwrap();
        assert!(matches!(
            parse_page("<html></html>", user, testutil::KAUFLAND_URL),
            Err(ParseError::BlobNotFound { .. })
        ));
    }
}
