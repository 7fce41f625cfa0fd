use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::foundation::error::{AdframeError, AdframeResult};

/// Where an asset's bytes come from.
///
/// Every variant gets the same treatment from [`crate::AssetLoader`]: fetch bytes, decode, cache by
/// reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AssetRef {
    /// Remote `http`/`https` locator.
    Remote(Url),
    /// Embedded `data:` URL (RFC 2397), kept verbatim.
    Inline(String),
    /// Path relative to the loader's assets root, normalized with `/` separators.
    File(String),
}

impl AssetRef {
    /// Parse a reference string.
    ///
    /// `data:` prefixes become [`AssetRef::Inline`], `scheme://` strings must be `http` or
    /// `https` and become [`AssetRef::Remote`], anything else is a relative file path.
    pub fn parse(source: &str) -> AdframeResult<Self> {
        let s = source.trim();
        if s.is_empty() {
            return Err(AdframeError::validation("asset reference must be non-empty"));
        }
        if s.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("data:")) {
            if !s.contains(',') {
                return Err(AdframeError::validation(
                    "data URL reference is missing its ',' payload separator",
                ));
            }
            return Ok(Self::Inline(s.to_owned()));
        }
        if s.contains("://") {
            let url = Url::parse(s)
                .map_err(|e| AdframeError::validation(format!("invalid asset URL '{s}': {e}")))?;
            return match url.scheme() {
                "http" | "https" => Ok(Self::Remote(url)),
                other => Err(AdframeError::validation(format!(
                    "unsupported asset URL scheme '{other}'"
                ))),
            };
        }
        Ok(Self::File(normalize_rel_path(s)?))
    }

    /// The canonical reference string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Remote(url) => url.as_str(),
            Self::Inline(s) | Self::File(s) => s,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Remote(_) => "remote",
            Self::Inline(_) => "inline",
            Self::File(_) => "file",
        }
    }

    /// Log-friendly form that does not dump inline payloads.
    pub fn display_short(&self) -> String {
        match self {
            Self::Inline(s) => {
                let head = s.split(',').next().unwrap_or_default();
                format!("{head},<{} bytes>", s.len())
            }
            other => other.as_str().to_owned(),
        }
    }
}

impl FromStr for AssetRef {
    type Err = AdframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AssetRef {
    type Error = AdframeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AssetRef> for String {
    fn from(value: AssetRef) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_short())
    }
}

/// Normalize and validate asset paths relative to the assets root.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> AdframeResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(AdframeError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(AdframeError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(AdframeError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(AdframeError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/reference.rs"]
mod tests;
