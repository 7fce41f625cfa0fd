/// Glyph shaping with parley.
pub mod layout;
/// Fixed words-per-line caption wrapping.
pub mod wrap;
