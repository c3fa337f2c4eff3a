//! Foundation value types shared across the translator: source spans and
//! type descriptors.

pub mod span;
pub mod types;

pub use span::Span;
pub use types::{BasicType, Precision, Qualifier, StructDef, Type};
