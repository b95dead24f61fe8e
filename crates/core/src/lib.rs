pub mod client;
pub mod discovery;
pub mod error;
pub mod format;
pub mod output;
pub mod render;
pub mod transcript;
pub mod types;
pub mod urls;

pub use client::PageClient;
pub use error::{Result, YtscribeError};
pub use format::{format_timestamp, format_transcript};
pub use types::{CaptionTrack, PlaylistRef, Segment, Transcript, VideoRef};
