use url::Url;

pub(crate) fn is_video_id(s: &str) -> bool {
    s.len() == 11
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn clean_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    Some(
        host.trim_start_matches("www.")
            .trim_start_matches("m.")
            .trim_start_matches("music.")
            .to_string(),
    )
}

/// Extract a video id from a watch/short/embed URL, a youtu.be link, or a
/// bare 11-character id.
pub fn video_id_from_input(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if is_video_id(trimmed) {
        return Some(trimmed.to_string());
    }

    let url = Url::parse(trimmed).ok()?;
    let host = clean_host(&url)?;

    if host == "youtu.be" {
        let seg = url.path_segments()?.next()?;
        if is_video_id(seg) {
            return Some(seg.to_string());
        }
    }

    if host == "youtube.com" || host.ends_with(".youtube.com") {
        if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
            if is_video_id(&v) {
                return Some(v.to_string());
            }
        }

        let segments: Vec<&str> = url.path().split('/').filter(|s| !s.is_empty()).collect();
        for i in 0..segments.len() {
            if matches!(segments[i], "embed" | "shorts" | "live" | "v") {
                if let Some(id) = segments.get(i + 1) {
                    if is_video_id(id) {
                        return Some((*id).to_string());
                    }
                }
            }
        }
    }

    None
}

/// Extract the playlist id from the `list` query parameter.
pub fn playlist_id_from_url(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "list")
        .map(|(_, v)| v.to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize a channel URL to its base form, without a trailing tab path.
/// Accepts `/@handle`, `/channel/<id>`, `/c/<name>` and `/user/<name>`.
pub fn channel_base_url(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;
    let host = clean_host(&url)?;
    if host != "youtube.com" && !host.ends_with(".youtube.com") {
        return None;
    }

    let segments: Vec<&str> = url.path().split('/').filter(|s| !s.is_empty()).collect();
    let first = segments.first()?;
    let base = if first.starts_with('@') {
        (*first).to_string()
    } else if matches!(*first, "channel" | "c" | "user") {
        format!("{}/{}", first, segments.get(1)?)
    } else {
        return None;
    };

    Some(format!("https://www.youtube.com/{base}"))
}

/// Channel name taken straight from a `/@handle` URL, when present.
pub fn channel_handle(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;
    let first = url.path().split('/').find(|s| !s.is_empty())?;
    first.strip_prefix('@').map(|h| h.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_id_from_url_variants() {
        for input in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ&list=PL123",
            "dQw4w9WgXcQ",
        ] {
            assert_eq!(
                video_id_from_input(input).as_deref(),
                Some("dQw4w9WgXcQ"),
                "failed for {input}"
            );
        }
    }

    #[test]
    fn video_id_rejects_garbage() {
        assert_eq!(video_id_from_input("https://example.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(video_id_from_input("not a url"), None);
        assert_eq!(video_id_from_input("tooshort"), None);
    }

    #[test]
    fn playlist_id_from_watch_and_playlist_urls() {
        assert_eq!(
            playlist_id_from_url("https://www.youtube.com/playlist?list=PLabc_-123").as_deref(),
            Some("PLabc_-123")
        );
        assert_eq!(
            playlist_id_from_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PLxyz").as_deref(),
            Some("PLxyz")
        );
        assert_eq!(playlist_id_from_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), None);
    }

    #[test]
    fn channel_base_url_variants() {
        assert_eq!(
            channel_base_url("https://www.youtube.com/@somecreator/videos").as_deref(),
            Some("https://www.youtube.com/@somecreator")
        );
        assert_eq!(
            channel_base_url("https://youtube.com/channel/UCabcdef/playlists").as_deref(),
            Some("https://www.youtube.com/channel/UCabcdef")
        );
        assert_eq!(
            channel_base_url("https://www.youtube.com/c/SomeName").as_deref(),
            Some("https://www.youtube.com/c/SomeName")
        );
        assert_eq!(channel_base_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(channel_base_url("https://example.com/@someone"), None);
    }

    #[test]
    fn channel_handle_from_url() {
        assert_eq!(
            channel_handle("https://www.youtube.com/@somecreator/playlists").as_deref(),
            Some("somecreator")
        );
        assert_eq!(channel_handle("https://www.youtube.com/channel/UCabcdef"), None);
    }
}
