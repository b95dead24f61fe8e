use crate::types::Transcript;

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Render a transcript as a text file body, one caption per line.
pub fn format_transcript(transcript: &Transcript, timestamps: bool) -> String {
    transcript
        .segments
        .iter()
        .map(|seg| {
            if timestamps {
                format!("[{}] {}", format_timestamp(seg.start), seg.text.trim())
            } else {
                seg.text.trim().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Segment;

    fn transcript() -> Transcript {
        Transcript {
            video_id: "dQw4w9WgXcQ".to_string(),
            language: "en".to_string(),
            generated: false,
            segments: vec![
                Segment {
                    start: 0.5,
                    duration: 2.0,
                    text: "Hello world ".to_string(),
                },
                Segment {
                    start: 65.0,
                    duration: 1.5,
                    text: "Second line".to_string(),
                },
            ],
        }
    }

    #[test]
    fn timestamp_formats_minutes_and_seconds() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(65.4), "01:05");
        assert_eq!(format_timestamp(600.0), "10:00");
    }

    #[test]
    fn plain_body_has_one_line_per_segment() {
        assert_eq!(format_transcript(&transcript(), false), "Hello world\nSecond line");
    }

    #[test]
    fn timestamped_body_prefixes_each_line() {
        assert_eq!(
            format_transcript(&transcript(), true),
            "[00:00] Hello world\n[01:05] Second line"
        );
    }
}
