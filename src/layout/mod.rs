//! Declarative binary structure layouts.
//!
//! A [`Structure`] is an ordered list of [`Field`]s: scalars, fixed-size
//! arrays, multi-dimensional arrays, nested structures and repeated nested
//! structures. Packing linearizes a [`StructValue`] tree into a flat list
//! of scalars and encodes them; unpacking decodes the flat list and
//! rebuilds the tree, reshaping arrays to their declared dimensions.
//!
//! ```
//! use igor::layout::{Field, ScalarKind, Structure, StructValue};
//! use igor::util::ByteOrder;
//!
//! let header = Structure::new("Header", vec![
//!     Field::scalar(ScalarKind::Int16, "version"),
//!     Field::scalar(ScalarKind::Int32, "size").default(0i32),
//! ]);
//! assert_eq!(header.size(), 6);
//!
//! let value = StructValue::new().with("version", 2i16);
//! let bytes = header.pack(&value, ByteOrder::Little).unwrap();
//! assert_eq!(bytes, [2, 0, 0, 0, 0, 0]);
//! assert_eq!(header.unpack(&bytes, ByteOrder::Little).unwrap().int("size").unwrap(), 0);
//! ```

mod field;
mod structure;
mod value;

pub use field::*;
pub use structure::*;
pub use value::*;
