//! Storage primitives shared by the lexer and parser
//!
//! - [`buffer`]: [`Buffer`], a generic growable array with doubling growth
//! - [`intern`]: [`StringInterner`] and [`SharedInterner`], which map equal
//!   byte sequences to one [`Symbol`]

pub mod buffer;
pub mod intern;

pub use buffer::Buffer;
pub use intern::{Interner, SharedInterner, StringInterner, Symbol};
