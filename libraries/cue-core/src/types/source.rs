//! Where a cue's audio comes from

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const REMOTE_URI_PREFIX: &str = "spotify:track:";
const REMOTE_URL_HOST: &str = "open.spotify.com/track";

/// Source descriptor of a cue
///
/// Decided once when the cue is created. A cue is either decoded locally
/// from a file or played by an external provider; it never switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CueSource {
    /// Local audio file, decoded and mixed by this process
    Local { path: PathBuf },

    /// Remote track played by an external provider
    Remote { uri: String },
}

impl CueSource {
    /// Classify a raw user string (file path, track URI or share URL)
    pub fn from_user_input(input: &str) -> Self {
        if is_remote_reference(input) {
            CueSource::Remote {
                uri: normalize_remote_uri(input),
            }
        } else {
            CueSource::Local {
                path: PathBuf::from(input.trim()),
            }
        }
    }

    /// Local file path, if this is a local source
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            CueSource::Local { path } => Some(path),
            CueSource::Remote { .. } => None,
        }
    }

    /// Remote track URI, if this is a remote source
    pub fn remote_uri(&self) -> Option<&str> {
        match self {
            CueSource::Local { .. } => None,
            CueSource::Remote { uri } => Some(uri),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, CueSource::Remote { .. })
    }
}

/// Whether a string refers to a remote track rather than a file
pub fn is_remote_reference(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.starts_with("spotify:track") || trimmed.contains(REMOTE_URL_HOST)
}

/// Normalize a remote track reference to `spotify:track:<id>`
///
/// Share URLs (`https://open.spotify.com/track/<id>?si=..`) are reduced to the
/// URI form; anything unrecognised is returned trimmed.
pub fn normalize_remote_uri(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with(REMOTE_URI_PREFIX) {
        return trimmed.to_string();
    }

    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));

    if let Some(rest) = without_scheme {
        // Drop query and fragment before splitting the path
        let rest = rest.split(['?', '#']).next().unwrap_or(rest);
        let mut segments = rest.split('/').filter(|s| !s.is_empty()).skip(1);
        if let (Some("track"), Some(id)) = (segments.next(), segments.next()) {
            return format!("{}{}", REMOTE_URI_PREFIX, id);
        }
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_is_kept() {
        assert_eq!(
            normalize_remote_uri("  spotify:track:abc123 "),
            "spotify:track:abc123"
        );
    }

    #[test]
    fn share_url_is_normalized() {
        assert_eq!(
            normalize_remote_uri("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC?si=xyz"),
            "spotify:track:4uLU6hMCjMI75M1A2tKUQC"
        );
    }

    #[test]
    fn unknown_url_is_trimmed_only() {
        assert_eq!(
            normalize_remote_uri(" https://example.com/album/1 "),
            "https://example.com/album/1"
        );
    }

    #[test]
    fn user_input_classification() {
        assert!(CueSource::from_user_input("spotify:track:abc").is_remote());
        assert!(CueSource::from_user_input("https://open.spotify.com/track/abc").is_remote());

        let local = CueSource::from_user_input("/show/thunder.wav");
        assert_eq!(local.local_path(), Some(Path::new("/show/thunder.wav")));
        assert_eq!(local.remote_uri(), None);
    }
}
