use base64::Engine;

use crate::assets::loader::LoadError;

const DATA_URL_PREFIX: &str = "data:";
const DEFAULT_MEDIA_TYPE: &str = "text/plain";

/// Decoded `data:` URL payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct DataUrlPayload {
    pub(crate) media_type: String,
    pub(crate) bytes: Vec<u8>,
}

/// Decode a `data:` URL into bytes following RFC 2397.
pub(crate) fn decode_data_url(url: &str) -> Result<DataUrlPayload, LoadError> {
    let rest = url
        .get(..DATA_URL_PREFIX.len())
        .filter(|p| p.eq_ignore_ascii_case(DATA_URL_PREFIX))
        .map(|_| &url[DATA_URL_PREFIX.len()..])
        .ok_or_else(|| LoadError::InvalidReference("URL does not start with 'data:'".to_owned()))?;

    let (metadata, data) = rest
        .split_once(',')
        .ok_or_else(|| LoadError::InvalidReference("missing ',' in data URL".to_owned()))?;

    let mut parts = metadata.split(';');
    let media_type = match parts.next().map(str::trim) {
        Some(m) if !m.is_empty() => m.to_ascii_lowercase(),
        _ => DEFAULT_MEDIA_TYPE.to_owned(),
    };
    let is_base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        decode_base64(data)?
    } else {
        percent_decode(data)?
    };

    Ok(DataUrlPayload { media_type, bytes })
}

/// Base64 payloads from form uploads may be line-wrapped; ASCII whitespace is ignored.
fn decode_base64(data: &str) -> Result<Vec<u8>, LoadError> {
    let cleaned: Vec<u8> = data
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    base64::engine::general_purpose::STANDARD
        .decode(&cleaned)
        .map_err(|e| LoadError::InvalidReference(format!("invalid base64 payload: {e}")))
}

fn percent_decode(input: &str) -> Result<Vec<u8>, LoadError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let hex = bytes
            .get(i + 1..i + 3)
            .and_then(|h| std::str::from_utf8(h).ok())
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(|| LoadError::InvalidReference("invalid percent-escape".to_owned()))?;
        out.push(hex);
        i += 3;
    }
    Ok(out)
}
