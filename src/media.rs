//! Media classification and the attachment list of a post being composed.

use serde::{Deserialize, Serialize};

use crate::model::NewMedia;

/// Broad media category, sent to the upload endpoint as `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Other,
}

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "svg", "tiff", "tif", "ico", "heic", "heif",
    "raw", "cr2", "nef", "arw", "dng", "orf", "rw2",
];
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "avi", "mkv", "webm", "flv", "wmv", "mpeg", "mpg", "3gp", "m4v", "ogv", "ts",
    "mts", "m2ts", "hevc",
];
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "ogg", "flac", "aac", "m4a", "wma", "opus", "aiff", "alac", "amr", "oga",
    "mka", "m4b",
];

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Other => "other",
        }
    }

    /// Classify by MIME type prefix (`image/png` → `Image`).
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            MediaKind::Image
        } else if mime.starts_with("video/") {
            MediaKind::Video
        } else if mime.starts_with("audio/") {
            MediaKind::Audio
        } else {
            MediaKind::Other
        }
    }

    /// Classify by the URL's file extension. Query strings and fragments
    /// are ignored; ambiguous extensions (`webm`) count as video.
    pub fn from_url(url: &str) -> Self {
        let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or(url);
        let file = path.rsplit('/').next().unwrap_or(path);
        let Some((_, extension)) = file.rsplit_once('.') else {
            return MediaKind::Other;
        };
        let extension = extension.to_ascii_lowercase();
        let extension = extension.as_str();

        if IMAGE_EXTENSIONS.contains(&extension) {
            MediaKind::Image
        } else if VIDEO_EXTENSIONS.contains(&extension) {
            MediaKind::Video
        } else if AUDIO_EXTENSIONS.contains(&extension) {
            MediaKind::Audio
        } else {
            MediaKind::Other
        }
    }
}

/// Uploaded media attached to a post that has not been submitted yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaDraft {
    items: Vec<NewMedia>,
}

impl MediaDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an uploaded file by its public URL.
    pub fn add(&mut self, name: impl Into<String>, url: impl Into<String>, kind: MediaKind) {
        self.items.push(NewMedia {
            post_id: String::new(),
            name: name.into(),
            kind: kind.as_str().to_string(),
            url: url.into(),
            thumbnail_url: String::new(),
        });
    }

    /// Remove the attachment at `index`; out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<NewMedia> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn items(&self) -> &[NewMedia] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn into_items(self) -> Vec<NewMedia> {
        self.items
    }
}
