//! Request extractors.

pub mod scope;
pub use scope::{ReaderAccess, WriterAccess};
