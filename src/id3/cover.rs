// APIC cover art extraction

use std::fmt;

use tracing::trace;

use crate::utils::encoding::{bytes_to_string, utf16_to_utf8, TextEncoding};

/// Separator between the MIME field and the picture bytes
const TYPE_DELIMITER: [u8; 2] = [0x06, 0x00];

const JPEG_START: &[u8] = &[0xFF, 0xD8];
const JPEG_END: &[u8] = &[0xFF, 0xD9];
const PNG_START: &[u8] = &[0x89, 0x50, 0x4E, 0x47];
// Last six bytes of the IEND chunk ("ND" + CRC)
const PNG_END: &[u8] = &[0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82];

/// Image format recognised by its leading signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(JPEG_START) {
            Some(ImageKind::Jpeg)
        } else if bytes.starts_with(PNG_START) {
            Some(ImageKind::Png)
        } else {
            None
        }
    }

    fn end_marker(self) -> &'static [u8] {
        match self {
            ImageKind::Jpeg => JPEG_END,
            ImageKind::Png => PNG_END,
        }
    }

    /// File extension for saving the image
    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
        }
    }
}

/// Cover image isolated from an APIC frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cover {
    /// Image bytes from start signature through end marker; empty if no signature matched
    pub image: Vec<u8>,
    /// Bytes of the type field preceding the image, UTF-8 after transcoding
    pub mime_type: Vec<u8>,
    /// Signature the image scan locked onto
    pub kind: Option<ImageKind>,
}

impl Cover {
    pub fn mime_type_lossy(&self) -> String {
        String::from_utf8_lossy(&self.mime_type).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }
}

/// Split raw APIC content into its type field and the embedded image.
///
/// The type field runs from after the encoding flag up to the `06 00` delimiter.
/// The image is located by its JPEG or PNG start signature and copied through the
/// matching end marker, or to the end of content if the marker never appears.
pub fn extract_cover(content: &[u8]) -> Cover {
    let Some((&flag, _)) = content.split_first() else {
        return Cover::default();
    };
    let encoding = TextEncoding::from_byte(flag);

    // An unknown flag byte is part of the type field and may open the delimiter itself
    let (mut mime_type, mut pos) = match encoding {
        TextEncoding::Unknown(byte) if content.starts_with(&TYPE_DELIMITER) => (vec![byte], 0),
        TextEncoding::Unknown(byte) => (vec![byte], 1),
        _ => (Vec::new(), 1),
    };
    while pos < content.len() && !content[pos..].starts_with(&TYPE_DELIMITER) {
        mime_type.push(content[pos]);
        pos += 1;
    }
    if encoding == TextEncoding::Utf16 {
        mime_type = utf16_to_utf8(&mime_type);
    }

    let mut image = Vec::new();
    let mut kind = None;
    while pos < content.len() {
        let rest = &content[pos..];
        match kind {
            None => {
                kind = ImageKind::detect(rest);
                if let Some(found) = kind {
                    trace!(?found, offset = pos, "image start signature");
                    image.push(rest[0]);
                }
            }
            Some(locked) => {
                let end = ImageKind::end_marker(locked);
                if rest.starts_with(end) {
                    image.extend_from_slice(end);
                    trace!(?locked, len = image.len(), "image end marker");
                    break;
                }
                image.push(rest[0]);
            }
        }
        pos += 1;
    }

    Cover {
        image,
        mime_type,
        kind,
    }
}

/// Picture types defined for APIC frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum PictureType {
    Other,
    FileIcon,
    OtherFileIcon,
    CoverFront,
    CoverBack,
    LeafletPage,
    Media,
    LeadArtist,
    Artist,
    Conductor,
    Band,
    Composer,
    Lyricist,
    RecordingLocation,
    DuringRecording,
    DuringPerformance,
    VideoScreenCapture,
    BrightColouredFish,
    Illustration,
    BandLogo,
    PublisherLogo,
    Unknown(u8),
}

impl PictureType {
    pub fn from_byte(value: u8) -> Self {
        match value {
            0 => PictureType::Other,
            1 => PictureType::FileIcon,
            2 => PictureType::OtherFileIcon,
            3 => PictureType::CoverFront,
            4 => PictureType::CoverBack,
            5 => PictureType::LeafletPage,
            6 => PictureType::Media,
            7 => PictureType::LeadArtist,
            8 => PictureType::Artist,
            9 => PictureType::Conductor,
            10 => PictureType::Band,
            11 => PictureType::Composer,
            12 => PictureType::Lyricist,
            13 => PictureType::RecordingLocation,
            14 => PictureType::DuringRecording,
            15 => PictureType::DuringPerformance,
            16 => PictureType::VideoScreenCapture,
            17 => PictureType::BrightColouredFish,
            18 => PictureType::Illustration,
            19 => PictureType::BandLogo,
            20 => PictureType::PublisherLogo,
            other => PictureType::Unknown(other),
        }
    }
}

impl fmt::Display for PictureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PictureType::Other => "Other",
            PictureType::FileIcon => "File icon",
            PictureType::OtherFileIcon => "Other file icon",
            PictureType::CoverFront => "Cover (front)",
            PictureType::CoverBack => "Cover (back)",
            PictureType::LeafletPage => "Leaflet page",
            PictureType::Media => "Media",
            PictureType::LeadArtist => "Lead artist",
            PictureType::Artist => "Artist",
            PictureType::Conductor => "Conductor",
            PictureType::Band => "Band",
            PictureType::Composer => "Composer",
            PictureType::Lyricist => "Lyricist",
            PictureType::RecordingLocation => "Recording location",
            PictureType::DuringRecording => "During recording",
            PictureType::DuringPerformance => "During performance",
            PictureType::VideoScreenCapture => "Video screen capture",
            PictureType::BrightColouredFish => "Bright coloured fish",
            PictureType::Illustration => "Illustration",
            PictureType::BandLogo => "Band logo",
            PictureType::PublisherLogo => "Publisher logo",
            PictureType::Unknown(value) => return write!(f, "Unknown ({value})"),
        };
        f.write_str(label)
    }
}

/// APIC frame decoded by its field layout rather than by image signatures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedPicture {
    pub mime_type: String,
    pub picture_type: PictureType,
    pub description: String,
    pub data: Vec<u8>,
}

impl AttachedPicture {
    /// Parse `encoding, MIME\0, picture type, description<terminator>, data`.
    ///
    /// Returns `None` when a terminator is missing.
    pub fn parse(content: &[u8]) -> Option<Self> {
        let (&flag, rest) = content.split_first()?;
        let encoding = TextEncoding::from_byte(flag);

        let mime_end = rest.iter().position(|&b| b == 0)?;
        let mime_type = bytes_to_string(&rest[..mime_end]);
        let rest = &rest[mime_end + 1..];

        let (&type_byte, rest) = rest.split_first()?;
        let picture_type = PictureType::from_byte(type_byte);

        let (description, data) = match encoding {
            TextEncoding::Utf16 => {
                let end = rest
                    .chunks_exact(2)
                    .position(|pair| pair == [0, 0])?
                    * 2;
                let text = utf16_to_utf8(&rest[..end]);
                (String::from_utf8_lossy(&text).into_owned(), &rest[end + 2..])
            }
            _ => {
                let end = rest.iter().position(|&b| b == 0)?;
                (bytes_to_string(&rest[..end]), &rest[end + 1..])
            }
        };

        Some(AttachedPicture {
            mime_type,
            picture_type,
            description,
            data: data.to_vec(),
        })
    }

    /// Image kind from the data's leading signature
    pub fn kind(&self) -> Option<ImageKind> {
        ImageKind::detect(&self.data)
    }
}
