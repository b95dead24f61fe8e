//! Headless-browser page rendering, used when static scraping finds nothing.
//!
//! Shells out to a headless Chromium for a single DOM snapshot; no scroll
//! polling.

use std::time::Duration;

use tokio::process::Command;

use crate::error::{Result, YtscribeError};

const BROWSER_CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
];

/// Render `url` and return the resulting DOM as HTML. Tries each known
/// browser binary in turn.
pub async fn render_page(url: &str, timeout: Duration) -> Result<String> {
    let mut last_reason = "no headless browser found".to_string();
    for bin in BROWSER_CANDIDATES {
        match try_render(bin, url, timeout).await {
            Ok(html) => return Ok(html),
            Err(reason) => last_reason = reason,
        }
    }
    Err(YtscribeError::RenderFailed {
        url: url.to_string(),
        reason: last_reason,
    })
}

async fn try_render(bin: &str, url: &str, timeout: Duration) -> std::result::Result<String, String> {
    let mut cmd = Command::new(bin);
    cmd.arg("--headless=new")
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--dump-dom")
        .arg(url)
        .kill_on_drop(true);

    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .map_err(|_| format!("{bin} timed out"))?
        .map_err(|e| format!("{bin}: {e}"))?;

    if !output.status.success() {
        return Err(format!("{bin} exited with {}", output.status));
    }

    let html = String::from_utf8_lossy(&output.stdout).to_string();
    if html.trim().is_empty() {
        return Err(format!("{bin} produced no output"));
    }
    Ok(html)
}
