//! Playlist and video discovery from channel/playlist pages.
//!
//! Extraction runs in tiers: the embedded `ytInitialData` blob first, then
//! anchor hrefs, then a regex scan over the raw text. Every tier is
//! best-effort and an empty result falls through to the next one. An empty
//! final result is a valid outcome, never an error.

use std::collections::HashSet;
use std::time::Duration;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::client::PageClient;
use crate::error::Result;
use crate::render;
use crate::types::{PlaylistRef, VideoRef};
use crate::urls::is_video_id;

const RENDER_TIMEOUT: Duration = Duration::from_secs(45);

const VIDEO_RENDERER_KEYS: &[&str] = &[
    "videoRenderer",
    "gridVideoRenderer",
    "compactVideoRenderer",
    "playlistVideoRenderer",
    "playlistPanelVideoRenderer",
];

const PLAYLIST_RENDERER_KEYS: &[&str] = &["playlistRenderer", "gridPlaylistRenderer"];

/// Options shared by the discovery entry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscoverOptions {
    /// Re-fetch through a headless browser when static scraping finds nothing.
    pub render: bool,
}

/// Videos of a playlist. When the run started from a `watch?v=…&list=…` URL
/// the watch page is tried first; its sidebar already lists the playlist.
pub async fn playlist_videos(
    client: &PageClient,
    playlist: &PlaylistRef,
    watch_url: Option<&str>,
    opts: DiscoverOptions,
) -> Result<Vec<VideoRef>> {
    if let Some(url) = watch_url {
        if let Ok(found) = fetch_and_extract(client, url, DiscoverOptions::default(), videos_from_html).await {
            if !found.is_empty() {
                return Ok(found);
            }
        }
    }
    fetch_and_extract(client, &playlist.url(), opts, videos_from_html).await
}

/// Videos listed on a channel's Videos tab.
pub async fn channel_videos(
    client: &PageClient,
    channel_base: &str,
    opts: DiscoverOptions,
) -> Result<Vec<VideoRef>> {
    fetch_and_extract(client, &format!("{channel_base}/videos"), opts, videos_from_html).await
}

/// Playlists listed on a channel's Playlists tab.
pub async fn channel_playlists(
    client: &PageClient,
    channel_base: &str,
    opts: DiscoverOptions,
) -> Result<Vec<PlaylistRef>> {
    fetch_and_extract(client, &format!("{channel_base}/playlists"), opts, playlists_from_html).await
}

/// Display name of a channel or playlist page. Best-effort.
pub async fn display_name(client: &PageClient, url: &str) -> Option<String> {
    let html = client.fetch_page(url).await.ok()?;
    page_display_name(&html)
}

async fn fetch_and_extract<T, F>(
    client: &PageClient,
    url: &str,
    opts: DiscoverOptions,
    extract: F,
) -> Result<Vec<T>>
where
    F: Fn(&str) -> Vec<T>,
{
    let html = client.fetch_page(url).await?;
    let found = extract(&html);
    if !found.is_empty() || !opts.render {
        return Ok(found);
    }

    // Static HTML gave us nothing; take a rendered DOM snapshot and retry.
    let rendered = render::render_page(url, RENDER_TIMEOUT).await?;
    Ok(extract(&rendered))
}

/// Run the extraction tiers for videos over one page of HTML.
pub fn videos_from_html(html: &str) -> Vec<VideoRef> {
    if let Some(data) = extract_initial_data(html) {
        let mut found = Vec::new();
        walk_videos(&data, &mut found);
        let found = dedupe_videos(found);
        if !found.is_empty() {
            return found;
        }
    }

    let found = dedupe_videos(videos_from_anchors(html));
    if !found.is_empty() {
        return found;
    }

    dedupe_videos(videos_from_raw(html))
}

/// Run the extraction tiers for playlists over one page of HTML.
pub fn playlists_from_html(html: &str) -> Vec<PlaylistRef> {
    if let Some(data) = extract_initial_data(html) {
        let mut found = Vec::new();
        walk_playlists(&data, &mut found);
        let found = dedupe_playlists(found);
        if !found.is_empty() {
            return found;
        }
    }

    let found = dedupe_playlists(playlists_from_anchors(html));
    if !found.is_empty() {
        return found;
    }

    dedupe_playlists(playlists_from_raw(html))
}

/// The `var ytInitialData = {…};` blob inlined in page scripts.
pub fn extract_initial_data(html: &str) -> Option<Value> {
    extract_json_blob(html, "var ytInitialData = ")
}

/// Find `marker` and parse the JSON value that follows it. The blob is
/// followed by `;` and more script text, so the deserializer must stop at
/// the end of the first complete value.
pub(crate) fn extract_json_blob(html: &str, marker: &str) -> Option<Value> {
    let start = html.find(marker)? + marker.len();
    serde_json::Deserializer::from_str(&html[start..])
        .into_iter::<Value>()
        .next()?
        .ok()
}

/// Title text of a renderer: `simpleText` or joined `runs`.
pub(crate) fn renderer_title(title: &Value) -> Option<String> {
    if let Some(simple) = title.get("simpleText").and_then(Value::as_str) {
        let simple = simple.trim();
        if !simple.is_empty() {
            return Some(simple.to_string());
        }
    }
    let runs = title.get("runs")?.as_array()?;
    let text = runs
        .iter()
        .filter_map(|r| r.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    if text.trim().is_empty() {
        None
    } else {
        Some(text.trim().to_string())
    }
}

fn walk_videos(value: &Value, out: &mut Vec<VideoRef>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if VIDEO_RENDERER_KEYS.contains(&key.as_str()) {
                    if let Some(id) = child.get("videoId").and_then(Value::as_str) {
                        out.push(VideoRef {
                            id: id.to_string(),
                            title: child.get("title").and_then(renderer_title),
                        });
                    }
                }
                walk_videos(child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk_videos(item, out);
            }
        }
        _ => {}
    }
}

fn walk_playlists(value: &Value, out: &mut Vec<PlaylistRef>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if PLAYLIST_RENDERER_KEYS.contains(&key.as_str()) {
                    if let Some(id) = child.get("playlistId").and_then(Value::as_str) {
                        out.push(PlaylistRef {
                            id: id.to_string(),
                            title: child.get("title").and_then(renderer_title),
                        });
                    }
                }
                walk_playlists(child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk_playlists(item, out);
            }
        }
        _ => {}
    }
}

fn videos_from_anchors(html: &str) -> Vec<VideoRef> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let doc = Html::parse_document(html);
    let mut out = Vec::new();
    for anchor in doc.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if let Some(rest) = href.split("/watch?v=").nth(1) {
            let id = rest.split('&').next().unwrap_or(rest);
            if is_video_id(id) {
                out.push(VideoRef {
                    id: id.to_string(),
                    title: None,
                });
            }
        }
    }
    out
}

fn playlists_from_anchors(html: &str) -> Vec<PlaylistRef> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let Ok(re) = Regex::new(r"list=([A-Za-z0-9_-]+)") else {
        return Vec::new();
    };
    let doc = Html::parse_document(html);
    let mut out = Vec::new();
    for anchor in doc.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if let Some(caps) = re.captures(href) {
            out.push(PlaylistRef {
                id: caps[1].to_string(),
                title: None,
            });
        }
    }
    out
}

fn videos_from_raw(html: &str) -> Vec<VideoRef> {
    let Ok(re) = Regex::new(r#""videoId"\s*:\s*"([A-Za-z0-9_-]{11})""#) else {
        return Vec::new();
    };
    re.captures_iter(html)
        .map(|caps| VideoRef {
            id: caps[1].to_string(),
            title: None,
        })
        .collect()
}

fn playlists_from_raw(html: &str) -> Vec<PlaylistRef> {
    let Ok(re) = Regex::new(r#""playlistId"\s*:\s*"([A-Za-z0-9_-]+)""#) else {
        return Vec::new();
    };
    re.captures_iter(html)
        .map(|caps| PlaylistRef {
            id: caps[1].to_string(),
            title: None,
        })
        .collect()
}

fn dedupe_videos(items: Vec<VideoRef>) -> Vec<VideoRef> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect()
}

fn dedupe_playlists(items: Vec<PlaylistRef>) -> Vec<PlaylistRef> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect()
}

/// Display name from `og:title`, falling back to `<title>` without the
/// " - YouTube" suffix.
pub fn page_display_name(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    if let Ok(selector) = Selector::parse(r#"meta[property="og:title"]"#) {
        if let Some(meta) = doc.select(&selector).next() {
            if let Some(content) = meta.value().attr("content") {
                let content = content.trim();
                if !content.is_empty() {
                    return Some(content.to_string());
                }
            }
        }
    }

    let selector = Selector::parse("title").ok()?;
    let title = doc.select(&selector).next()?.text().collect::<String>();
    let title = title.trim().trim_end_matches(" - YouTube").trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHANNEL_VIDEOS_HTML: &str = r#"<html><head></head><body>
<script>var ytInitialData = {"contents":{"twoColumnBrowseResultsRenderer":{"tabs":[{"tabRenderer":{"title":"Videos","content":{"richGridRenderer":{"contents":[
{"richItemRenderer":{"content":{"videoRenderer":{"videoId":"dQw4w9WgXcQ","title":{"runs":[{"text":"First video"}]}}}}},
{"richItemRenderer":{"content":{"videoRenderer":{"videoId":"abcdefghijk","title":{"simpleText":"Second video"}}}}},
{"richItemRenderer":{"content":{"videoRenderer":{"videoId":"dQw4w9WgXcQ"}}}}
]}}}}]}}};</script>
<a href="/watch?v=zzzzzzzzzzz">should be ignored while tier one succeeds</a>
</body></html>"#;

    const PLAYLISTS_HTML: &str = r#"<html><body>
<script>var ytInitialData = {"contents":[
{"playlistRenderer":{"playlistId":"PLfirst","title":{"simpleText":"Rust Talks"}}},
{"gridPlaylistRenderer":{"playlistId":"PLsecond","title":{"runs":[{"text":"Live"},{"text":"Coding"}]}}},
{"playlistRenderer":{"playlistId":"PLfirst","title":{"simpleText":"Rust Talks"}}}
]};</script>
</body></html>"#;

    #[test]
    fn embedded_json_tier_collects_and_dedupes() {
        let videos = videos_from_html(CHANNEL_VIDEOS_HTML);
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].id, "dQw4w9WgXcQ");
        assert_eq!(videos[0].title.as_deref(), Some("First video"));
        assert_eq!(videos[1].id, "abcdefghijk");
        assert_eq!(videos[1].title.as_deref(), Some("Second video"));
    }

    #[test]
    fn embedded_json_tier_wins_over_anchor_tier() {
        let videos = videos_from_html(CHANNEL_VIDEOS_HTML);
        assert!(videos.iter().all(|v| v.id != "zzzzzzzzzzz"));
    }

    #[test]
    fn anchor_tier_used_when_no_embedded_json() {
        let html = r#"<html><body>
<a id="thumbnail" href="/watch?v=dQw4w9WgXcQ&list=PL123">one</a>
<a href="/watch?v=dQw4w9WgXcQ">duplicate</a>
<a href="/watch?v=abcdefghijk">two</a>
<a href="/playlist?list=PL123">not a video</a>
</body></html>"#;
        let videos = videos_from_html(html);
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].id, "dQw4w9WgXcQ");
        assert_eq!(videos[1].id, "abcdefghijk");
    }

    #[test]
    fn regex_tier_used_as_last_resort() {
        let html = r#"<html><body><script>
stuff "videoId":"dQw4w9WgXcQ" more "videoId":"abcdefghijk" dup "videoId":"dQw4w9WgXcQ"
</script></body></html>"#;
        let videos = videos_from_html(html);
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].id, "dQw4w9WgXcQ");
    }

    #[test]
    fn malformed_embedded_json_falls_through() {
        let html = r#"<html><body>
<script>var ytInitialData = {broken json;</script>
<a href="/watch?v=abcdefghijk">fallback</a>
</body></html>"#;
        let videos = videos_from_html(html);
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].id, "abcdefghijk");
    }

    #[test]
    fn playlists_from_embedded_json() {
        let playlists = playlists_from_html(PLAYLISTS_HTML);
        assert_eq!(playlists.len(), 2);
        assert_eq!(playlists[0].id, "PLfirst");
        assert_eq!(playlists[0].title.as_deref(), Some("Rust Talks"));
        assert_eq!(playlists[1].id, "PLsecond");
        assert_eq!(playlists[1].title.as_deref(), Some("Live Coding"));
    }

    #[test]
    fn playlists_from_anchor_tier() {
        let html = r#"<html><body>
<a href="/playlist?list=PLabc">a</a>
<a href="/watch?v=dQw4w9WgXcQ&list=PLabc">same list</a>
<a href="/playlist?list=PLdef">b</a>
</body></html>"#;
        let playlists = playlists_from_html(html);
        assert_eq!(playlists.len(), 2);
        assert_eq!(playlists[0].id, "PLabc");
        assert_eq!(playlists[1].id, "PLdef");
    }

    #[test]
    fn empty_page_yields_empty_list() {
        assert!(videos_from_html("<html><body>nothing here</body></html>").is_empty());
        assert!(playlists_from_html("<html></html>").is_empty());
    }

    #[test]
    fn display_name_prefers_og_title() {
        let html = r#"<html><head>
<meta property="og:title" content="Some Channel">
<title>Some Channel - More - YouTube</title>
</head></html>"#;
        assert_eq!(page_display_name(html).as_deref(), Some("Some Channel"));
    }

    #[test]
    fn display_name_strips_youtube_suffix_from_title() {
        let html = "<html><head><title>My Playlist - YouTube</title></head></html>";
        assert_eq!(page_display_name(html).as_deref(), Some("My Playlist"));
    }

    #[test]
    fn json_blob_stops_at_end_of_value() {
        let html = r#"<script>var ytInitialData = {"a":1};var other = 2;</script>"#;
        let data = extract_initial_data(html).unwrap();
        assert_eq!(data.get("a").and_then(Value::as_i64), Some(1));
    }
}
