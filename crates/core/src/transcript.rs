//! Caption track listing, selection and fetching.
//!
//! Selection walks a fixed preference chain: manual English, auto-generated
//! English, first manual track in any language (translated to English when
//! the track supports it, raw otherwise), then the first track of any kind.
//! A failed fetch falls through to the next candidate; exhausting the chain
//! is none-found, not an error.

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;
use serde_json::Value;

use crate::client::PageClient;
use crate::discovery::{extract_json_blob, renderer_title};
use crate::error::{Result, YtscribeError};
use crate::types::{CaptionTrack, Segment, Transcript};

const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse = ";

#[derive(Deserialize)]
struct PlayerResponse {
    captions: Option<Captions>,
}

#[derive(Deserialize)]
struct Captions {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    tracklist: Option<Tracklist>,
}

#[derive(Deserialize)]
struct Tracklist {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<RawTrack>>,
}

#[derive(Deserialize)]
struct RawTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    /// "asr" marks auto-generated tracks.
    kind: Option<String>,
    #[serde(rename = "isTranslatable")]
    is_translatable: Option<bool>,
    name: Option<Value>,
}

/// One attempt in the selection chain: a track plus the translation target
/// to request, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackChoice {
    pub track: CaptionTrack,
    pub translate_to: Option<String>,
}

impl TrackChoice {
    /// Caption URL with the translation parameter applied.
    pub fn caption_url(&self) -> String {
        match &self.translate_to {
            Some(lang) if self.track.base_url.contains('?') => {
                format!("{}&tlang={lang}", self.track.base_url)
            }
            Some(lang) => format!("{}?tlang={lang}", self.track.base_url),
            None => self.track.base_url.clone(),
        }
    }

    /// Language code the fetched captions will be in.
    pub fn language_code(&self) -> &str {
        self.translate_to
            .as_deref()
            .unwrap_or(&self.track.language_code)
    }
}

/// Caption tracks advertised by a watch page's `ytInitialPlayerResponse`.
pub fn caption_tracks_from_html(html: &str) -> Vec<CaptionTrack> {
    let Some(blob) = extract_json_blob(html, PLAYER_RESPONSE_MARKER) else {
        return Vec::new();
    };
    let Ok(player) = serde_json::from_value::<PlayerResponse>(blob) else {
        return Vec::new();
    };

    player
        .captions
        .and_then(|c| c.tracklist)
        .and_then(|t| t.caption_tracks)
        .unwrap_or_default()
        .into_iter()
        .map(|raw| CaptionTrack {
            language: raw
                .name
                .as_ref()
                .and_then(renderer_title)
                .unwrap_or_else(|| raw.language_code.clone()),
            generated: raw.kind.as_deref() == Some("asr"),
            translatable: raw.is_translatable.unwrap_or(false),
            base_url: raw.base_url,
            language_code: raw.language_code,
        })
        .collect()
}

fn is_english(code: &str) -> bool {
    code == "en" || code.starts_with("en-")
}

/// The candidates to try, in preference order, de-duplicated.
pub fn selection_order(tracks: &[CaptionTrack]) -> Vec<TrackChoice> {
    let mut order = Vec::new();

    if let Some(track) = tracks.iter().find(|t| !t.generated && is_english(&t.language_code)) {
        order.push(TrackChoice {
            track: track.clone(),
            translate_to: None,
        });
    }

    if let Some(track) = tracks.iter().find(|t| t.generated && is_english(&t.language_code)) {
        order.push(TrackChoice {
            track: track.clone(),
            translate_to: None,
        });
    }

    if let Some(track) = tracks.iter().find(|t| !t.generated && !is_english(&t.language_code)) {
        if track.translatable {
            order.push(TrackChoice {
                track: track.clone(),
                translate_to: Some("en".to_string()),
            });
        }
        order.push(TrackChoice {
            track: track.clone(),
            translate_to: None,
        });
    }

    if let Some(track) = tracks.first() {
        order.push(TrackChoice {
            track: track.clone(),
            translate_to: None,
        });
    }

    dedupe_choices(order)
}

fn dedupe_choices(choices: Vec<TrackChoice>) -> Vec<TrackChoice> {
    let mut out: Vec<TrackChoice> = Vec::new();
    for choice in choices {
        let dup = out.iter().any(|c| {
            c.track.base_url == choice.track.base_url && c.translate_to == choice.translate_to
        });
        if !dup {
            out.push(choice);
        }
    }
    out
}

/// Caption tracks available for a video.
pub async fn list_tracks(client: &PageClient, video_id: &str) -> Result<Vec<CaptionTrack>> {
    let url = format!("https://www.youtube.com/watch?v={video_id}");
    let html = client.fetch_page(&url).await?;
    Ok(caption_tracks_from_html(&html))
}

/// Fetch the transcript for a video, walking the preference chain.
/// `Ok(None)` means no usable captions.
pub async fn fetch_transcript(client: &PageClient, video_id: &str) -> Result<Option<Transcript>> {
    let tracks = list_tracks(client, video_id).await?;

    for choice in selection_order(&tracks) {
        let Ok(xml) = client.fetch_text(&choice.caption_url()).await else {
            continue;
        };
        let Ok(segments) = parse_caption_xml(&xml) else {
            continue;
        };
        if segments.is_empty() {
            continue;
        }
        return Ok(Some(Transcript {
            video_id: video_id.to_string(),
            language: choice.language_code().to_string(),
            generated: choice.track.generated,
            segments,
        }));
    }

    Ok(None)
}

/// Parse YouTube's timedtext XML (`<text start="…" dur="…">…</text>`).
pub fn parse_caption_xml(xml: &str) -> Result<Vec<Segment>> {
    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut current_dur: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => {
                            start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        b"dur" => {
                            dur = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        _ => {}
                    }
                }
                current_start = start;
                current_dur = dur;
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(start), Some(dur)) = (current_start.take(), current_dur.take()) {
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    let text = html_escape::decode_html_entities(&raw_text).to_string();
                    if !text.trim().is_empty() {
                        segments.push(Segment {
                            start,
                            duration: dur,
                            text,
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(YtscribeError::CaptionParseFailed {
                    reason: e.to_string(),
                });
            }
            _ => {}
        }
    }

    Ok(segments)
}
