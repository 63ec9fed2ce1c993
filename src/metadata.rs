// Standard metadata fields collected from a decoded tag
//
// ID3v2 keeps each field in its own frame (TIT2, TPE1, ...), ID3v1 in fixed
// slots of the trailer. Both are flattened into one `Metadata` record here.

use std::fmt;

use serde::Serialize;

use crate::id3::frames::frame_ids;
use crate::id3::{Id3v1Tag, Id3v2Tag};
use crate::utils::encoding::{bytes_to_string, utf16_to_utf8, TextEncoding};

/// Flattened view of the common tag fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub file_type: String,
    pub version: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<String>,
    pub track: Option<String>,
    pub genre: Option<String>,
    pub comment: Option<String>,
    pub has_cover: bool,
}

impl Metadata {
    pub fn from_v2(tag: &Id3v2Tag) -> Self {
        let text = |id: &str| tag.frame_text(id).ok().filter(|s| !s.is_empty());

        Metadata {
            file_type: "ID3v2".to_string(),
            version: tag.header.version_string(),
            title: text(frame_ids::TITLE),
            artist: text(frame_ids::ARTIST),
            album: text(frame_ids::ALBUM),
            year: text(frame_ids::YEAR),
            track: text(frame_ids::TRACK),
            genre: text(frame_ids::GENRE),
            comment: tag
                .frame(frame_ids::COMMENT)
                .and_then(|frame| comment_text(&frame.data)),
            has_cover: tag.frame(frame_ids::PICTURE).is_some(),
        }
    }

    pub fn from_v1(tag: &Id3v1Tag) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        Metadata {
            file_type: "ID3v1".to_string(),
            version: if tag.track.is_some() { "1.1" } else { "1.0" }.to_string(),
            title: non_empty(&tag.title),
            artist: non_empty(&tag.artist),
            album: non_empty(&tag.album),
            year: non_empty(&tag.year),
            track: tag.track.map(|t| t.to_string()),
            genre: Some(tag.genre.to_string()),
            comment: non_empty(&tag.comment),
            has_cover: false,
        }
    }
}

/// Text of a COMM frame: `encoding, language[3], description<term>, text`
fn comment_text(data: &[u8]) -> Option<String> {
    let (&flag, rest) = data.split_first()?;
    let body = rest.get(3..)?;

    let text = match TextEncoding::from_byte(flag) {
        TextEncoding::Utf16 => {
            let end = body
                .chunks_exact(2)
                .position(|pair| pair == [0, 0])
                .map_or(body.len(), |i| i * 2 + 2);
            String::from_utf8_lossy(&utf16_to_utf8(body.get(end..).unwrap_or_default()))
                .into_owned()
        }
        _ => {
            let end = body.iter().position(|&b| b == 0).map_or(body.len(), |i| i + 1);
            bytes_to_string(&body[end..])
        }
    };

    let text = text.trim_end_matches('\0').to_string();
    (!text.is_empty()).then_some(text)
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Format:  {} {}", self.file_type, self.version)?;
        let fields = [
            ("Title", &self.title),
            ("Artist", &self.artist),
            ("Album", &self.album),
            ("Year", &self.year),
            ("Track", &self.track),
            ("Genre", &self.genre),
            ("Comment", &self.comment),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                writeln!(f, "{:<8} {}", format!("{name}:"), value)?;
            }
        }
        write!(f, "Cover:   {}", if self.has_cover { "yes" } else { "no" })
    }
}
