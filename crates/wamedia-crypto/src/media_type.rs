//! Media categories and their HKDF domain-separation strings

use std::{fmt, str::FromStr};

use crate::error::MediaError;

/// Category of an encrypted media blob.
///
/// Each category selects the HKDF `info` string, so one media key never
/// yields the same subkeys for two different categories (stickers excepted,
/// which share the image string by protocol).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    /// Photos
    Image,
    /// Voice notes and audio files
    Audio,
    /// Videos and GIFs
    Video,
    /// Arbitrary documents
    Document,
    /// Stickers (derived with the image string)
    Sticker,
}

impl MediaType {
    /// Every supported category.
    pub const ALL: [Self; 5] = [Self::Image, Self::Audio, Self::Video, Self::Document, Self::Sticker];

    /// HKDF `info` string for this category.
    pub fn info(self) -> &'static [u8] {
        match self {
            Self::Image | Self::Sticker => b"WhatsApp Image Keys",
            Self::Audio => b"WhatsApp Audio Keys",
            Self::Video => b"WhatsApp Video Keys",
            Self::Document => b"WhatsApp Document Keys",
        }
    }

    /// Lowercase tag as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Document => "document",
            Self::Sticker => "sticker",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a media type tag, ignoring case and surrounding whitespace.
///
/// Unknown tags are rejected. There is no fallback category.
impl FromStr for MediaType {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|media_type| media_type.as_str() == normalized)
            .ok_or_else(|| MediaError::UnsupportedMediaType { value: s.to_string() })
    }
}
