/// Content-addressed, single-flight asset cache.
pub mod cache;
/// Color parsing for template fields.
pub mod color;
pub(crate) mod data_url;
/// Image decoding into premultiplied pixels.
pub mod decode;
/// Async asset acquisition.
pub mod loader;
/// Asset reference parsing.
pub mod reference;
/// Fallback text face from the host system.
pub mod system_font;
