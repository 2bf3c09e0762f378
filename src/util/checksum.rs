//! Header checksum and padding checks.

use std::fmt::Write as _;

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use tracing::warn;

use super::{ByteOrder, Error, Result};

const ROLLOVER: i64 = 1 << 31;

/// Compute the IGOR header checksum over the first `num_bytes` of `buf`.
///
/// The region is summed as signed 16-bit integers in `order` (a trailing
/// odd byte is ignored) and added to `old`. The accumulator then follows
/// the C reader's 32-bit rollover before being masked to 16 bits. A valid
/// header region sums to zero.
pub fn checksum(buf: &[u8], order: ByteOrder, old: i64, num_bytes: usize) -> i32 {
    let region = &buf[..num_bytes.min(buf.len())];
    let little = order.is_little();
    let mut sum = old;
    for pair in region.chunks_exact(2) {
        let v = if little {
            LittleEndian::read_i16(pair)
        } else {
            BigEndian::read_i16(pair)
        };
        sum += i64::from(v);
    }
    if sum > ROLLOVER {
        sum %= 1 << 32;
        if sum > ROLLOVER {
            sum -= ROLLOVER;
        }
    }
    (sum & 0xFFFF) as i32
}

/// Pretty-print a byte buffer as hex.
///
/// `spaces` groups that many bytes between separators; `None` prints
/// the bytes without separators.
pub fn hex_bytes(buf: &[u8], spaces: Option<usize>) -> String {
    let mut out = String::with_capacity(buf.len() * 3);
    for (i, b) in buf.iter().enumerate() {
        if let Some(group) = spaces {
            if i > 0 && group > 0 && i % group == 0 {
                out.push(' ');
            }
        }
        let _ = write!(out, "{:02x}", b);
    }
    out
}

/// Ensure a buffer is entirely zero.
///
/// In strict mode a non-zero byte is an error; otherwise it is logged as a
/// warning and decoding continues.
pub fn assert_null(buf: &[u8], strict: bool) -> Result<()> {
    if buf.iter().all(|&b| b == 0) {
        return Ok(());
    }
    let hex = hex_bytes(buf, Some(1));
    if strict {
        Err(Error::PaddingNotZero(hex))
    } else {
        warn!("post-data padding not zero: {}", hex);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_bytes() {
        let b = [0x00, 0x01, 0x02, 0x03, 0x04];
        assert_eq!(hex_bytes(&b, None), "0001020304");
        assert_eq!(hex_bytes(&b, Some(1)), "00 01 02 03 04");
        assert_eq!(hex_bytes(&b, Some(2)), "0001 0203 04");
        let b = [0, 1, 2, 3, 4, 5, 6];
        assert_eq!(hex_bytes(&b, Some(2)), "0001 0203 0405 06");
        assert_eq!(hex_bytes(&b, Some(3)), "000102 030405 06");
    }

    #[test]
    fn test_assert_null() {
        assert!(assert_null(&[], true).is_ok());
        assert!(assert_null(&[0, 0], true).is_ok());
        let err = assert_null(&[0, 1, 2, 3], true).unwrap_err();
        match err {
            Error::PaddingNotZero(hex) => assert_eq!(hex, "00 01 02 03"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(assert_null(&[0, 1, 2, 3], false).is_ok());
    }

    #[test]
    fn test_checksum_zero_sum() {
        // 0x0102 + 0xFEFE == 0x10000
        let buf = [0x01, 0x02, 0xFE, 0xFE];
        assert_eq!(checksum(&buf, ByteOrder::Big, 0, buf.len()), 0);
        assert_ne!(checksum(&buf, ByteOrder::Little, 0, buf.len()), 0);
    }

    #[test]
    fn test_checksum_ignores_odd_byte() {
        let buf = [0x00, 0x07, 0xFF];
        assert_eq!(checksum(&buf, ByteOrder::Big, 0, 3), 7);
        assert_eq!(checksum(&buf, ByteOrder::Big, 0, 2), 7);
    }

    #[test]
    fn test_checksum_negative_values() {
        // -1 as i16 masks to 0xFFFF
        let buf = [0xFF, 0xFF];
        assert_eq!(checksum(&buf, ByteOrder::Little, 0, 2), 0xFFFF);
        assert_eq!(checksum(&buf, ByteOrder::Little, 1, 2), 0);
    }

    #[test]
    fn test_checksum_rollover() {
        let old = (1i64 << 31) + 5;
        // Above 2^31 but below 2^32: modulo leaves it, then 2^31 is removed.
        assert_eq!(checksum(&[], ByteOrder::Big, old, 0), 5);
        let old = (1i64 << 32) + 9;
        assert_eq!(checksum(&[], ByteOrder::Big, old, 0), 9);
    }
}
