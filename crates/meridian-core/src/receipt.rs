//! # Receipt Number Conventions
//!
//! Parsing for the reversal receipt-number format:
//!
//! ```text
//! REV-<originalSaleId>-<epochMillis>-<random 0..999>
//! ```
//!
//! Historically the receipt number was the ONLY link from a reversal to
//! its original sale. The schema now carries an explicit
//! `reverses_sale_id` reference, but legacy rows still encode the link
//! this way, so the parser must keep accepting the convention, and
//! whatever the database layer generates must round-trip through it.
//!
//! Sale ids are UUIDs and contain hyphens, so the id cannot be recovered
//! by splitting from the left; the two trailing numeric segments are
//! peeled off the right instead.

/// Marker prefix on every reversal receipt number.
pub const REVERSAL_PREFIX: &str = "REV-";

/// Extracts the original sale id from a reversal receipt number.
///
/// Returns `None` for anything that does not match the convention,
/// including ordinary receipt numbers.
///
/// ## Example
/// ```rust
/// use meridian_core::receipt::parse_reversal_receipt;
///
/// let receipt = "REV-550e8400-e29b-41d4-a716-446655440000-1738310400000-7";
/// assert_eq!(
///     parse_reversal_receipt(receipt),
///     Some("550e8400-e29b-41d4-a716-446655440000")
/// );
/// assert_eq!(parse_reversal_receipt("20260131-01-0001"), None);
/// ```
pub fn parse_reversal_receipt(receipt_number: &str) -> Option<&str> {
    let rest = receipt_number.strip_prefix(REVERSAL_PREFIX)?;

    // rest = "<id>-<millis>-<random>"; the id itself may contain hyphens
    let (rest, random) = rest.rsplit_once('-')?;
    let (id, millis) = rest.rsplit_once('-')?;

    if id.is_empty() {
        return None;
    }
    if millis.is_empty() || !millis.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if random.is_empty() || !random.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(id)
}

/// Whether a receipt number marks a reversal sale.
#[inline]
pub fn is_reversal_receipt(receipt_number: &str) -> bool {
    parse_reversal_receipt(receipt_number).is_some()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uuid_sale_id() {
        let receipt = "REV-550e8400-e29b-41d4-a716-446655440000-1738310400000-999";
        assert_eq!(
            parse_reversal_receipt(receipt),
            Some("550e8400-e29b-41d4-a716-446655440000")
        );
    }

    #[test]
    fn test_parse_simple_sale_id() {
        assert_eq!(parse_reversal_receipt("REV-abc123-1700000000000-0"), Some("abc123"));
    }

    #[test]
    fn test_rejects_ordinary_receipts() {
        assert_eq!(parse_reversal_receipt("20260131-01-0001"), None);
        assert_eq!(parse_reversal_receipt(""), None);
        assert_eq!(parse_reversal_receipt("REVERSED-abc-1-2"), None);
    }

    #[test]
    fn test_rejects_malformed_suffixes() {
        // Too few segments after the prefix
        assert_eq!(parse_reversal_receipt("REV-abc123"), None);
        assert_eq!(parse_reversal_receipt("REV-abc123-170000"), None);
        // Non-numeric trailing segments
        assert_eq!(parse_reversal_receipt("REV-abc-notmillis-7"), None);
        assert_eq!(parse_reversal_receipt("REV-abc-1700000000000-xyz"), None);
        // Empty id
        assert_eq!(parse_reversal_receipt("REV--1700000000000-7"), None);
    }

    #[test]
    fn test_is_reversal_receipt() {
        assert!(is_reversal_receipt("REV-abc-1700000000000-7"));
        assert!(!is_reversal_receipt("240131-142530-0042"));
    }
}
