//! TUI pane rendering modules
//!
//! - [`source`]: Source text with the current token's span highlighted
//! - [`tokens`]: The token trace with a cursor
//! - [`status`]: Status bar with step counter, evaluation outcome and keybindings
//!
//! Each module exports a stateless `render_*` function; scroll state is owned
//! by [`App`](crate::ui::App) and passed in.

pub mod source;
pub mod status;
pub mod tokens;

pub use source::{render_source_pane, SourceScrollState};
pub use status::render_status_bar;
pub use tokens::render_tokens_pane;
