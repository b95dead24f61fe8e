use serde::{Deserialize, Serialize};

/// A video found on a channel or playlist page. Produced by discovery,
/// consumed once by the transcript pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    pub id: String,
    pub title: Option<String>,
}

impl VideoRef {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

/// A playlist found on a channel page. The title is only used to name the
/// output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRef {
    pub id: String,
    pub title: Option<String>,
}

impl PlaylistRef {
    pub fn url(&self) -> String {
        format!("https://www.youtube.com/playlist?list={}", self.id)
    }
}

/// One caption stream advertised by a watch page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub base_url: String,
    /// Human-readable language name, e.g. "English (auto-generated)".
    pub language: String,
    pub language_code: String,
    /// Auto-generated (ASR) rather than manually authored.
    pub generated: bool,
    /// YouTube offers server-side translation for this track.
    pub translatable: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: String,
    pub language: String,
    pub generated: bool,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub duration: f64,
    pub text: String,
}
