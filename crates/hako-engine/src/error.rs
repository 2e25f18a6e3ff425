use std::fmt;

use crate::text::FontLoadError;

/// Registry an asset lookup was made against.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AssetKind {
    Image,
    Sound,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Image => f.write_str("image"),
            AssetKind::Sound => f.write_str("sound"),
        }
    }
}

/// Errors reported by the engine library.
///
/// Host-side failures (window, GPU, event loop) are reported through
/// `anyhow::Result` by the runtime instead.
#[derive(Debug, Clone)]
pub enum EngineError {
    /// A named asset was requested before it was registered or loaded.
    MissingAsset { kind: AssetKind, name: String },
    /// A trait was attached to an actor whose variant it cannot drive.
    IncompatibleOwner { tag: &'static str, required: &'static str },
    /// Reading or decoding an asset failed.
    AssetLoad { name: String, reason: String },
    Font(FontLoadError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::MissingAsset { kind, name } => {
                write!(f, "{kind} asset '{name}' is not loaded")
            }
            EngineError::IncompatibleOwner { tag, required } => {
                write!(f, "trait '{tag}' requires a {required} owner")
            }
            EngineError::AssetLoad { name, reason } => {
                write!(f, "failed to load asset '{name}': {reason}")
            }
            EngineError::Font(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Font(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FontLoadError> for EngineError {
    fn from(e: FontLoadError) -> Self {
        EngineError::Font(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_asset_names_kind_and_name() {
        let e = EngineError::MissingAsset { kind: AssetKind::Image, name: "hero".into() };
        assert_eq!(e.to_string(), "image asset 'hero' is not loaded");
    }

    #[test]
    fn font_error_is_the_source() {
        use std::error::Error;
        let e = EngineError::from(FontLoadError("bad table".into()));
        assert!(e.source().is_some());
        assert_eq!(e.to_string(), "font load error: bad table");
    }
}
