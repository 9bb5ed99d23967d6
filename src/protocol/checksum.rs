//! # Field Checksum
//!
//! The `:Z64:` framing ends with a CRC over the base64 text, so the printer
//! can reject a field that was mangled in transit.
//!
//! ## Algorithm
//!
//! | Property | Value |
//! |----------|-------|
//! | Width | 16 bits |
//! | Polynomial | 0x1021 |
//! | Initial value | 0x0000 |
//! | Reflected | no (MSB first) |
//! | Final XOR | none |
//!
//! This is the CRC-16/CCITT variant usually called XMODEM. The check value
//! for the ASCII string `123456789` is `0x31C3`.

const POLY: u16 = 0x1021;

/// CRC-16/XMODEM of `data`, computed bit by bit.
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(0u16, |mut crc, &byte| {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
        }
        crc
    })
}

/// Checksum text for a `:Z64:` payload: four uppercase hex digits,
/// zero-padded.
///
/// ```
/// use zpl_image::protocol::checksum::checksum;
///
/// assert_eq!(checksum("123456789"), "31C3");
/// assert_eq!(checksum(""), "0000");
/// ```
pub fn checksum(text: &str) -> String {
    format!("{:04X}", crc16(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        assert_eq!(crc16(b"123456789"), 0x31C3);
    }

    #[test]
    fn test_empty() {
        assert_eq!(crc16(b""), 0);
        assert_eq!(checksum(""), "0000");
    }

    #[test]
    fn test_single_bytes() {
        // One byte: the table entry for that byte
        assert_eq!(crc16(&[0x01]), 0x1021);
        assert_eq!(crc16(&[0x80]), 0x9188);
        assert_eq!(crc16(b"A"), 0x58E5);
    }

    #[test]
    fn test_format_is_four_uppercase_digits() {
        for text in ["", "A", "eJwDAAAAAAE=", "123456789", "zpl"] {
            let c = checksum(text);
            assert_eq!(c.len(), 4, "{:?} -> {}", text, c);
            assert!(
                c.chars().all(|ch| ch.is_ascii_digit() || ('A'..='F').contains(&ch)),
                "{:?} -> {}",
                text,
                c
            );
        }
    }

    #[test]
    fn test_zero_padding() {
        assert_eq!(crc16(b"ae"), 0x0418);
        assert_eq!(checksum("ae"), "0418");
        assert_eq!(checksum("\0"), "0000");
    }

    #[test]
    fn test_sensitive_to_every_byte() {
        assert_ne!(checksum("eJwDAAAAAAE="), checksum("eJwDAAAAAAF="));
    }
}
