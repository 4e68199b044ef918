//! Static PIX "copia e cola" payload assembly.
//!
//! Builds the BR Code payload a payment app can parse: a sequence of EMV
//! fields, each serialized as a two-digit ID, a two-digit length and the
//! value, terminated by a CRC-16/CCITT-FALSE trailer. Field ordering and
//! length prefixes are the one place in this system where bit-exactness
//! matters; everything here is deterministic for a given input.
//!
//! Also home of [`generate_transaction_id`], the client-side correlation ID
//! embedded in the payload reference field and the order record. It is not
//! cryptographically secure - collision odds are accepted as negligible for
//! a single food court with a human-verified handoff.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

/// Globally unique identifier of the PIX arrangement (field 26-00).
const PIX_GUI: &str = "br.gov.bcb.pix";

/// Maximum PIX key length accepted by the arrangement.
const MAX_KEY_LEN: usize = 77;
/// EMV fields carry a two-digit length, so values cap at 99 characters.
const MAX_FIELD_LEN: usize = 99;
/// Merchant name field (59) limit.
const MAX_MERCHANT_NAME_LEN: usize = 25;
/// Merchant city field (60) limit.
const MAX_MERCHANT_CITY_LEN: usize = 15;
/// Transaction reference (62-05) limit.
const MAX_TXID_LEN: usize = 25;

/// Namespace prefix for generated transaction IDs.
const TXID_PREFIX: &str = "ifacens";

const BASE36_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Payload assembly failures.
#[derive(Debug, Error)]
pub enum PixError {
    /// The PIX key is empty.
    #[error("PIX key must not be empty")]
    EmptyKey,

    /// The PIX key exceeds the arrangement's length limit.
    #[error("PIX key exceeds {MAX_KEY_LEN} characters (got {0})")]
    KeyTooLong(usize),

    /// The amount is not a positive dot-decimal number.
    #[error("invalid PIX amount: {0:?}")]
    InvalidAmount(String),

    /// A field value exceeds the two-digit length prefix.
    #[error("value for field {id} exceeds {MAX_FIELD_LEN} characters")]
    FieldTooLong {
        /// The EMV field ID.
        id: &'static str,
    },
}

/// Assemble a static PIX payload.
///
/// Merchant name and city are truncated to their field limits; the optional
/// transaction reference is included only when a transaction ID is supplied
/// (truncated to 25 characters, the EMV reference limit).
///
/// # Errors
///
/// Returns [`PixError`] when the key is empty or oversized, when the amount
/// is not a positive dot-decimal string, or when a field value overflows its
/// length prefix.
pub fn build_payment_code(
    key: &str,
    merchant_name: &str,
    merchant_city: &str,
    amount: &str,
    transaction_id: Option<&str>,
) -> Result<String, PixError> {
    if key.is_empty() {
        return Err(PixError::EmptyKey);
    }
    let key_len = key.chars().count();
    if key_len > MAX_KEY_LEN {
        return Err(PixError::KeyTooLong(key_len));
    }

    let parsed =
        Decimal::from_str(amount).map_err(|_| PixError::InvalidAmount(amount.to_string()))?;
    if parsed <= Decimal::ZERO {
        return Err(PixError::InvalidAmount(amount.to_string()));
    }

    // Merchant account information: GUI plus the receiving key.
    let account = format!("{}{}", emv_field("00", PIX_GUI)?, emv_field("01", key)?);

    let mut payload = String::new();
    payload.push_str(&emv_field("00", "01")?); // payload format indicator
    payload.push_str(&emv_field("26", &account)?);
    payload.push_str(&emv_field("52", "0000")?); // merchant category code
    payload.push_str(&emv_field("53", "986")?); // currency: BRL
    payload.push_str(&emv_field("54", amount)?);
    payload.push_str(&emv_field("58", "BR")?);
    payload.push_str(&emv_field("59", &truncate(merchant_name, MAX_MERCHANT_NAME_LEN))?);
    payload.push_str(&emv_field("60", &truncate(merchant_city, MAX_MERCHANT_CITY_LEN))?);

    if let Some(txid) = transaction_id {
        let reference = emv_field("05", &truncate(txid, MAX_TXID_LEN))?;
        payload.push_str(&emv_field("62", &reference)?);
    }

    // The CRC covers everything up to and including its own "6304" tag.
    payload.push_str("6304");
    let crc = crc16_ccitt(payload.as_bytes());
    payload.push_str(&format!("{crc:04X}"));

    Ok(payload)
}

/// Generate a display-grade transaction ID.
///
/// Format: `ifacens-<8 random base36 chars>-<millis since epoch, base36>`.
#[must_use]
#[allow(clippy::indexing_slicing)] // indices are bounded by the alphabet length
pub fn generate_transaction_id() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let random: String = (0..8)
        .map(|_| char::from(BASE36_ALPHABET[rng.random_range(0..BASE36_ALPHABET.len())]))
        .collect();
    let millis = chrono::Utc::now().timestamp_millis().unsigned_abs();

    format!("{TXID_PREFIX}-{random}-{}", to_base36(millis))
}

/// Serialize one EMV field: two-digit ID, two-digit length, value.
fn emv_field(id: &'static str, value: &str) -> Result<String, PixError> {
    let len = value.chars().count();
    if len > MAX_FIELD_LEN {
        return Err(PixError::FieldTooLong { id });
    }
    Ok(format!("{id}{len:02}{value}"))
}

/// Truncate to at most `max` characters, respecting char boundaries.
fn truncate(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// CRC-16/CCITT-FALSE: polynomial 0x1021, initial value 0xFFFF.
fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 == 0 {
                crc << 1
            } else {
                (crc << 1) ^ 0x1021
            };
        }
    }
    crc
}

#[allow(clippy::indexing_slicing)] // indices are value % 36
fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const KEY: &str = "b1936613-2fa8-4307-a08d-8ddfd05b3c75";

    #[test]
    fn test_crc16_known_vector() {
        // CRC-16/CCITT-FALSE check value
        assert_eq!(crc16_ccitt(b"123456789"), 0x29B1);
    }

    #[test]
    fn test_emv_field_zero_pads_length() {
        assert_eq!(emv_field("00", "01").unwrap(), "000201");
        assert_eq!(emv_field("58", "BR").unwrap(), "5802BR");
    }

    #[test]
    fn test_payload_contains_merchant_and_amount_fields() {
        let code = build_payment_code(KEY, "iFacens", "Sorocaba", "10.00", None).unwrap();

        assert!(code.starts_with("000201"));
        assert!(code.contains("iFacens"));
        assert!(code.contains("Sorocaba"));
        assert!(code.contains("540510.00"));
        assert!(code.contains(KEY));
        assert!(code.contains("br.gov.bcb.pix"));
        assert!(code.contains("5303986"));
    }

    #[test]
    fn test_payload_crc_trailer_is_consistent() {
        let code = build_payment_code(KEY, "iFacens", "Sorocaba", "10.00", Some("tx-1")).unwrap();

        let (body, trailer) = code.split_at(code.len() - 4);
        assert!(body.ends_with("6304"));
        assert_eq!(trailer, format!("{:04X}", crc16_ccitt(body.as_bytes())));
    }

    #[test]
    fn test_reference_field_only_when_txid_supplied() {
        let without = build_payment_code(KEY, "iFacens", "Sorocaba", "10.00", None).unwrap();
        let with =
            build_payment_code(KEY, "iFacens", "Sorocaba", "10.00", Some("ifacens-abc")).unwrap();

        // without a txid the city field is followed directly by the CRC tag
        assert!(without.contains("6008Sorocaba6304"));
        assert!(with.contains("62150511ifacens-abc"));
    }

    #[test]
    fn test_long_txid_is_truncated_to_reference_limit() {
        let txid = "ifacens-aaaaaaaa-bbbbbbbbbb"; // 27 chars
        let code = build_payment_code(KEY, "iFacens", "Sorocaba", "10.00", Some(txid)).unwrap();

        assert!(code.contains("ifacens-aaaaaaaa-bbbbbbbb"));
        assert!(!code.contains(txid));
    }

    #[test]
    fn test_merchant_fields_are_truncated() {
        let code = build_payment_code(
            KEY,
            "Um Nome De Comerciante Excessivamente Longo",
            "Uma Cidade Muito Longa",
            "10.00",
            None,
        )
        .unwrap();

        assert!(code.contains("5925Um Nome De Comerciante Ex"));
        assert!(code.contains("6015Uma Cidade Muit"));
    }

    #[test]
    fn test_rejects_zero_and_negative_amounts() {
        assert!(matches!(
            build_payment_code(KEY, "iFacens", "Sorocaba", "0.00", None),
            Err(PixError::InvalidAmount(_))
        ));
        assert!(matches!(
            build_payment_code(KEY, "iFacens", "Sorocaba", "-5.00", None),
            Err(PixError::InvalidAmount(_))
        ));
        assert!(matches!(
            build_payment_code(KEY, "iFacens", "Sorocaba", "abc", None),
            Err(PixError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_rejects_bad_keys() {
        assert!(matches!(
            build_payment_code("", "iFacens", "Sorocaba", "10.00", None),
            Err(PixError::EmptyKey)
        ));
        let oversized = "k".repeat(MAX_KEY_LEN + 1);
        assert!(matches!(
            build_payment_code(&oversized, "iFacens", "Sorocaba", "10.00", None),
            Err(PixError::KeyTooLong(78))
        ));
    }

    #[test]
    fn test_transaction_id_shape() {
        let txid = generate_transaction_id();
        let parts: Vec<&str> = txid.splitn(3, '-').collect();

        assert_eq!(parts[0], "ifacens");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert!(!parts[2].is_empty());
    }

    #[test]
    fn test_transaction_ids_differ() {
        assert_ne!(generate_transaction_id(), generate_transaction_id());
    }
}
