//! HTTP plumbing shared by discovery and transcript fetching.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Result, YtscribeError};
use crate::output::safe_filename;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub struct PageClient {
    http: reqwest::Client,
    dump_dir: Option<PathBuf>,
}

#[derive(Deserialize)]
struct OembedResponse {
    title: String,
}

impl PageClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            dump_dir: None,
        })
    }

    /// Keep a copy of every fetched page under `dir` for debugging.
    pub fn with_dump_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.dump_dir = dir;
        self
    }

    /// GET a YouTube page with browser-like headers.
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Cookie", "CONSENT=YES+1")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(YtscribeError::FetchFailed {
                url: url.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        let html = response.text().await?;
        self.dump(url, &html).await;
        Ok(html)
    }

    /// GET a raw text resource (caption XML).
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(YtscribeError::FetchFailed {
                url: url.to_string(),
                reason: format!("HTTP {status}"),
            });
        }
        Ok(response.text().await?)
    }

    /// Video title via the oEmbed endpoint. Best-effort; callers fall back
    /// to the video id.
    pub async fn video_title(&self, video_id: &str) -> Option<String> {
        let url = format!(
            "https://www.youtube.com/oembed?url=https://www.youtube.com/watch?v={video_id}&format=json"
        );
        let response = self.http.get(&url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body: OembedResponse = response.json().await.ok()?;
        Some(body.title)
    }

    async fn dump(&self, url: &str, html: &str) {
        let Some(dir) = &self.dump_dir else {
            return;
        };
        let name = safe_filename(
            url.trim_start_matches("https://")
                .trim_start_matches("http://"),
        );
        if tokio::fs::create_dir_all(dir).await.is_ok() {
            let _ = tokio::fs::write(dir.join(format!("{name}.html")), html).await;
        }
    }
}
