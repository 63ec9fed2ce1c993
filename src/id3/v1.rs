// ID3v1 tag implementation

use crate::utils::io::{read_array_at, ByteSource};

/// ID3v1 tag structure
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Id3v1Tag {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub comment: String,
    pub track: Option<u8>,
    pub genre: u8,
}

impl Id3v1Tag {
    const TAG_SIZE: u64 = 128;
    const TAG_ID: [u8; 3] = *b"TAG";

    /// Read the 128-byte trailer at the end of the source, if present
    pub fn read<S: ByteSource + ?Sized>(source: &mut S) -> std::io::Result<Option<Self>> {
        let len = source.byte_len()?;
        if len < Self::TAG_SIZE {
            return Ok(None);
        }

        let Some(buffer) = read_array_at::<_, 128>(source, len - Self::TAG_SIZE)? else {
            return Ok(None);
        };
        if buffer[0..3] != Self::TAG_ID {
            return Ok(None);
        }

        Ok(Some(Self::parse(&buffer)))
    }

    fn parse(buffer: &[u8; 128]) -> Self {
        // ID3v1.1 stores the track in the last comment byte after a zero
        let (comment, track) = if buffer[125] == 0 && buffer[126] != 0 {
            (Self::parse_string(&buffer[97..125]), Some(buffer[126]))
        } else {
            (Self::parse_string(&buffer[97..127]), None)
        };

        Id3v1Tag {
            title: Self::parse_string(&buffer[3..33]),
            artist: Self::parse_string(&buffer[33..63]),
            album: Self::parse_string(&buffer[63..93]),
            year: Self::parse_string(&buffer[93..97]),
            comment,
            track,
            genre: buffer[127],
        }
    }

    /// Null-terminated, space-padded field
    fn parse_string(bytes: &[u8]) -> String {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        String::from_utf8_lossy(&bytes[..end]).trim().to_string()
    }
}
