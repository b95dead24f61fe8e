use std::path::{Path, PathBuf};

use crate::error::Result;

/// Strip filesystem-reserved characters from a title and replace spaces
/// with underscores. Applying it twice yields the same name.
pub fn safe_filename(title: &str) -> String {
    title
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// Path of the transcript file for a video title inside `dir`.
pub fn transcript_path(dir: &Path, title: &str) -> PathBuf {
    dir.join(format!("{}_transcript.txt", safe_filename(title)))
}

/// Write a transcript body, creating the directory if needed.
pub async fn write_transcript(dir: &Path, title: &str, body: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = transcript_path(dir, title);
    tokio::fs::write(&path, body).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_filename_strips_reserved_characters() {
        assert_eq!(safe_filename(r#"a<b>c:d"e/f\g|h?i*j"#), "abcdefghij");
    }

    #[test]
    fn safe_filename_replaces_spaces() {
        assert_eq!(safe_filename("My Video Title"), "My_Video_Title");
    }

    #[test]
    fn safe_filename_is_idempotent() {
        let once = safe_filename("What? A *weird* / title");
        assert_eq!(safe_filename(&once), once);
    }

    #[test]
    fn transcript_path_uses_sanitized_title() {
        let path = transcript_path(Path::new("out"), "My Video?");
        assert_eq!(path, PathBuf::from("out/My_Video_transcript.txt"));
    }
}
