// Limits and defaults for the lexer and parser

/// Byte that ends the input even before the end of the slice.
pub const SENTINEL: u8 = 0;

/// Maximum nesting of `(` and unary `-` before the parser gives up.
/// Each level costs several stack frames of recursive descent.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Largest source accepted by a session (1 MiB)
pub const DEFAULT_MAX_SOURCE_LEN: usize = 1 << 20;
