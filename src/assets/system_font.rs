use std::path::Path;

use crate::assets::loader::LoadError;

/// Environment variable naming a font file to use instead of the system sans-serif face.
pub const FONT_ENV: &str = "ADFRAME_FONT";

/// Bytes of the fallback text face used when a template names no font.
///
/// `ADFRAME_FONT` wins when it points at a readable file. Otherwise the system font database is
/// queried for a regular sans-serif face that is the first face of its file.
pub fn find_system_font() -> Result<Vec<u8>, LoadError> {
    if let Some(path) = std::env::var_os(FONT_ENV) {
        let path = Path::new(&path);
        match std::fs::read(path) {
            Ok(bytes) if !bytes.is_empty() => return Ok(bytes),
            Ok(_) => tracing::warn!(path = %path.display(), "{FONT_ENV} is empty, ignoring"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "{FONT_ENV} unreadable"),
        }
    }

    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    let families = [fontdb::Family::SansSerif];
    let query = fontdb::Query {
        families: &families,
        weight: fontdb::Weight::NORMAL,
        stretch: fontdb::Stretch::Normal,
        style: fontdb::Style::Normal,
    };
    // Glyph rendering addresses face 0 of the file.
    let id = db
        .query(&query)
        .filter(|id| db.face(*id).is_some_and(|f| f.index == 0))
        .or_else(|| db.faces().find(|f| f.index == 0).map(|f| f.id))
        .ok_or(LoadError::NoSystemFont)?;

    if let Some(face) = db.face(id) {
        tracing::debug!(
            family = face.families.first().map(|(name, _)| name.as_str()).unwrap_or("?"),
            "using system font"
        );
    }
    db.with_face_data(id, |data, _| data.to_vec())
        .filter(|bytes| !bytes.is_empty())
        .ok_or(LoadError::NoSystemFont)
}
