//! Byte order handling.
//!
//! IGOR files do not declare their byte order. Instead the writer's order
//! is detected from the `version` field of the first header: versions are
//! small positive numbers, so if the low-order byte reads as zero the
//! file was written on a platform with the opposite byte order.

use std::fmt;

/// Byte order used to pack or unpack a structure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Byte order of the running platform
    #[default]
    Native,
    /// Least significant byte first
    Little,
    /// Most significant byte first
    Big,
}

impl ByteOrder {
    /// Concrete order of the running platform.
    #[inline]
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            Self::Little
        } else {
            Self::Big
        }
    }

    /// Resolve `Native` to the platform order; `Little`/`Big` pass through.
    #[inline]
    pub const fn resolve(self) -> Self {
        match self {
            Self::Native => Self::native(),
            other => other,
        }
    }

    /// The opposite concrete order.
    #[inline]
    pub const fn swapped(self) -> Self {
        match self.resolve() {
            Self::Big => Self::Little,
            _ => Self::Big,
        }
    }

    /// Returns true if this resolves to little-endian.
    #[inline]
    pub const fn is_little(self) -> bool {
        matches!(self.resolve(), Self::Little)
    }

    /// Prefix character of the classic struct format strings.
    pub const fn prefix(self) -> char {
        match self {
            Self::Native => '=',
            Self::Little => '<',
            Self::Big => '>',
        }
    }

    /// Read an `i16` from the first two bytes of `buf`.
    pub fn read_i16(self, buf: &[u8]) -> i16 {
        use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
        if self.is_little() {
            LittleEndian::read_i16(buf)
        } else {
            BigEndian::read_i16(buf)
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Little => write!(f, "little-endian"),
            Self::Big => write!(f, "big-endian"),
        }
    }
}

/// Check whether a file's version field was written in the opposite order.
///
/// If the low order byte of the version field is zero, the file comes from
/// a platform with different byte ordering and all data needs reordering.
#[inline]
pub const fn need_to_reorder_bytes(version: i16) -> bool {
    version & 0xFF == 0
}

/// Effective file byte order given the result of [`need_to_reorder_bytes`].
#[inline]
pub const fn byte_order(need_to_reorder: bool) -> ByteOrder {
    if need_to_reorder {
        ByteOrder::native().swapped()
    } else {
        ByteOrder::native()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_need_to_reorder() {
        for v in [1i16, 2, 3, 5] {
            assert!(!need_to_reorder_bytes(v));
            assert!(need_to_reorder_bytes(v.swap_bytes()));
        }
        assert!(need_to_reorder_bytes(0));
        assert!(need_to_reorder_bytes(0x0100));
        assert!(!need_to_reorder_bytes(0x0101));
    }

    #[test]
    fn test_byte_order() {
        assert_eq!(byte_order(false), ByteOrder::native());
        assert_ne!(byte_order(true), ByteOrder::native());
        assert_ne!(byte_order(true), ByteOrder::Native);
    }

    #[test]
    fn test_read_i16() {
        let bytes = [0x00, 0x05];
        assert_eq!(ByteOrder::Big.read_i16(&bytes), 5);
        assert_eq!(ByteOrder::Little.read_i16(&bytes), 0x0500);
    }

    #[test]
    fn test_resolve() {
        assert_eq!(ByteOrder::Little.resolve(), ByteOrder::Little);
        assert_eq!(ByteOrder::Big.swapped(), ByteOrder::Little);
        assert_ne!(ByteOrder::Native.resolve(), ByteOrder::Native);
        assert_eq!(ByteOrder::Big.prefix(), '>');
    }
}
