//! Schema definitions
//!
//! A [`Schema`] declares, per field, whether it is indexed, stored and which
//! analyzer applies. It is built once by a [`SchemaBuilder`] and never
//! mutated afterwards.

mod field;
mod mapping;

pub use field::FieldOptions;
pub use mapping::{Schema, SchemaBuilder, RAW_FIELD};
