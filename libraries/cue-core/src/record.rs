//! Persisted cue records
//!
//! The JSON shape written by the show persistence layer. Field names are the
//! established camelCase keys (`fadeIn`, `loopMode`, `durationMs`, ...), so
//! existing show files keep loading.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{CueError, Result};
use crate::types::{normalize_remote_uri, Cue, CueSource, LoopMode};

/// One cue as stored in a show file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CueRecord {
    /// Local file name, relative to the show's audio folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Remote track reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Legacy marker for remote records
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub spotify: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotkey: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Start marker (seconds)
    #[serde(default)]
    pub start: f64,

    /// End marker (seconds); zero means "until the end of the media"
    #[serde(default)]
    pub end: f64,

    #[serde(default)]
    pub fade_in: f64,

    #[serde(default)]
    pub fade_out: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_count: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,

    /// Color tag (hex ARGB)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Cached duration of a remote track. Older files wrote it as a float.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,

    /// Legacy remote duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl CueRecord {
    /// Snapshot a cue into its persisted shape
    pub fn from_cue(cue: &Cue) -> Self {
        let mut record = CueRecord {
            altname: Some(cue.name.clone()),
            hotkey: cue.hotkey.map(String::from),
            notes: Some(cue.notes.clone()),
            start: cue.start_secs(),
            end: cue.end_secs().unwrap_or(0.0),
            fade_in: cue.fade_in_secs(),
            fade_out: cue.fade_out_secs(),
            loop_mode: Some(cue.loop_mode().as_str().to_string()),
            loop_count: Some(i64::from(cue.loop_count())),
            gain: Some(cue.gain()),
            effect: cue.effect.clone(),
            color: cue.color.clone(),
            ..Default::default()
        };

        match cue.source() {
            CueSource::Local { path } => {
                record.filename = Some(
                    path.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string()),
                );
                record.speed = Some(cue.speed());
                record.pitch = Some(cue.pitch_semitones());
            }
            CueSource::Remote { uri } => {
                record.url = Some(uri.clone());
                record.spotify = true;
                record.duration_ms = cue.remote_duration_ms().map(|d| d as f64);
            }
        }

        record
    }

    /// Build a cue from this record
    ///
    /// Local file names are resolved against `audio_folder`. Exactly one of
    /// `filename` / `url` must be present.
    pub fn into_cue(self, audio_folder: &Path) -> Result<Cue> {
        let source = self.source(audio_folder)?;
        let mut cue = Cue::new(source);

        cue.name = self.altname.unwrap_or_default();
        cue.notes = self.notes.unwrap_or_default();
        cue.hotkey = self.hotkey.and_then(|k| k.chars().next());
        cue.color = self.color.filter(|c| !c.is_empty());
        cue.effect = self.effect.filter(|e| !e.is_empty());

        cue.set_start_secs(self.start);
        cue.set_end_secs(Some(self.end));
        cue.set_fade_in_secs(self.fade_in);
        cue.set_fade_out_secs(self.fade_out);
        cue.set_loop_mode(
            self.loop_mode
                .as_deref()
                .map(LoopMode::parse_lenient)
                .unwrap_or_default(),
        );
        cue.set_loop_count(
            self.loop_count
                .map(|c| c.clamp(0, i64::from(u32::MAX)) as u32)
                .unwrap_or(1),
        );
        cue.set_gain(self.gain.unwrap_or(1.0));
        cue.set_speed(self.speed.unwrap_or(1.0));
        cue.set_pitch_semitones(self.pitch.unwrap_or(0.0));

        let remote_duration = self
            .duration_ms
            .or_else(|| self.duration.map(|secs| secs * 1000.0))
            .filter(|ms| ms.is_finite() && *ms > 0.0)
            .map(|ms| ms.round() as u64);
        if cue.is_remote() {
            cue.set_remote_duration_ms(remote_duration);
        }

        Ok(cue)
    }

    fn source(&self, audio_folder: &Path) -> Result<CueSource> {
        let filename = self.filename.as_deref().filter(|f| !f.trim().is_empty());
        let url = self.url.as_deref().filter(|u| !u.trim().is_empty());

        match (filename, url) {
            (Some(_), Some(_)) => Err(CueError::invalid_record(
                "record has both a filename and a url",
            )),
            (None, Some(url)) => Ok(CueSource::Remote {
                uri: normalize_remote_uri(url),
            }),
            (Some(_), None) if self.spotify => Err(CueError::invalid_record(
                "remote record is missing its url",
            )),
            (Some(filename), None) => Ok(CueSource::Local {
                path: audio_folder.join(filename),
            }),
            (None, None) => Err(CueError::invalid_record(
                "record has neither a filename nor a url",
            )),
        }
    }
}

/// A whole show file: `{ "cues": [ ... ] }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowFile {
    #[serde(default)]
    pub cues: Vec<CueRecord>,
}

impl ShowFile {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Snapshot cues into a show file
    pub fn from_cues<'a>(cues: impl IntoIterator<Item = &'a Cue>) -> Self {
        Self {
            cues: cues.into_iter().map(CueRecord::from_cue).collect(),
        }
    }

    /// Turn every record into a cue, skipping (and logging) broken records
    pub fn into_cues(self, audio_folder: &Path) -> Vec<Cue> {
        self.cues
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match record.into_cue(audio_folder) {
                Ok(cue) => Some(cue),
                Err(e) => {
                    warn!("Skipping cue record {}: {}", index, e);
                    None
                }
            })
            .collect()
    }
}

/// Default audio folder for a show file: the directory it lives in
pub fn audio_folder_for(show_path: &Path) -> PathBuf {
    show_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_record_resolves_against_audio_folder() {
        let json = r##"{
            "filename": "rain.wav",
            "start": 1.5,
            "end": 12.0,
            "fadeIn": 2.0,
            "fadeOut": 3.0,
            "loopMode": "count",
            "loopCount": 3,
            "gain": 0.8,
            "speed": 1.25,
            "pitch": -2.0,
            "color": "#ff3366cc",
            "hotkey": "r"
        }"##;
        let record: CueRecord = serde_json::from_str(json).unwrap();
        let cue = record.into_cue(Path::new("/shows/act1")).unwrap();

        assert_eq!(
            cue.source().local_path(),
            Some(Path::new("/shows/act1/rain.wav"))
        );
        assert_eq!(cue.start_ms(), 1500);
        assert_eq!(cue.end_ms(), Some(12_000));
        assert_eq!(cue.loop_mode(), LoopMode::Count);
        assert_eq!(cue.loop_count(), 3);
        assert_eq!(cue.hotkey, Some('r'));
        assert_eq!(cue.color.as_deref(), Some("#ff3366cc"));
        assert_eq!(cue.speed(), 1.25);
    }

    #[test]
    fn remote_record_reads_float_duration() {
        let json = r#"{
            "spotify": true,
            "url": "https://open.spotify.com/track/abc?si=1",
            "start": 0.0,
            "end": 0.0,
            "durationMs": 215000.0
        }"#;
        let record: CueRecord = serde_json::from_str(json).unwrap();
        let cue = record.into_cue(Path::new("/")).unwrap();

        assert_eq!(cue.source().remote_uri(), Some("spotify:track:abc"));
        assert_eq!(cue.remote_duration_ms(), Some(215_000));
        assert_eq!(cue.end_secs(), None);
    }

    #[test]
    fn legacy_duration_in_seconds() {
        let record = CueRecord {
            url: Some("spotify:track:x".into()),
            duration: Some(61.5),
            ..Default::default()
        };
        let cue = record.into_cue(Path::new("/")).unwrap();
        assert_eq!(cue.remote_duration_ms(), Some(61_500));
    }

    #[test]
    fn both_sources_is_rejected() {
        let record = CueRecord {
            filename: Some("a.wav".into()),
            url: Some("spotify:track:x".into()),
            ..Default::default()
        };
        assert!(matches!(
            record.into_cue(Path::new("/")),
            Err(CueError::InvalidRecord(_))
        ));
    }

    #[test]
    fn neither_source_is_rejected() {
        assert!(CueRecord::default().into_cue(Path::new("/")).is_err());
    }

    #[test]
    fn round_trip_preserves_playback_fields() {
        let mut cue = Cue::from_user_input("/shows/act1/wind.flac");
        cue.name = "Wind".into();
        cue.set_start_secs(2.0);
        cue.set_end_secs(Some(20.0));
        cue.set_fade_out_secs(4.0);
        cue.set_loop_mode(LoopMode::Infinite);
        cue.set_gain(1.5);

        let json = serde_json::to_string(&CueRecord::from_cue(&cue)).unwrap();
        assert!(json.contains("\"fadeOut\":4.0"));
        assert!(json.contains("\"loopMode\":\"infinite\""));

        let back: CueRecord = serde_json::from_str(&json).unwrap();
        let restored = back.into_cue(Path::new("/shows/act1")).unwrap();
        assert_eq!(restored, cue);
    }

    #[test]
    fn markers_round_trip_bit_exact() {
        let mut cue = Cue::from_user_input("/shows/act1/wind.flac");
        cue.set_start_secs(121.229_398_441_126_07);
        cue.set_end_secs(Some(121.729_398_441_126_07));

        let json = serde_json::to_string(&CueRecord::from_cue(&cue)).unwrap();
        let back: CueRecord = serde_json::from_str(&json).unwrap();
        let restored = back.into_cue(Path::new("/shows/act1")).unwrap();

        assert_eq!(
            restored.start_secs().to_bits(),
            cue.start_secs().to_bits()
        );
        assert_eq!(restored, cue);
    }

    #[test]
    fn show_file_skips_broken_records() {
        let json = r#"{ "cues": [ { "filename": "a.wav" }, { "start": 1.0 } ] }"#;
        let show = ShowFile::from_json_str(json).unwrap();
        let cues = show.into_cues(Path::new("/show"));
        assert_eq!(cues.len(), 1);
    }
}
