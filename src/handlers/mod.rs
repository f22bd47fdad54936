//! HTTP handlers for pets and tokens.

pub mod pet;
pub mod token;
pub use pet::*;
pub use token::*;
