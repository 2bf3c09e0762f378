//! Utility types and functions shared by the readers.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Error`] / [`Result`] - Error handling
//! - [`ByteOrder`] - Byte order detection
//! - [`checksum`] / [`assert_null`] - Header integrity checks
//! - [`Dimensions`] - Array shapes
//! - [`open_file`] / [`read_up_to`] - Stream helpers
//! - [`NumericType`] - IGOR numeric type codes

mod byte_order;
mod checksum;
mod dimensions;
mod error;
mod io;
mod numeric;

pub use byte_order::*;
pub use checksum::*;
pub use dimensions::*;
pub use error::*;
pub use io::*;
pub use numeric::*;
