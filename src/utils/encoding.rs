// Encoding utilities

use encoding_rs::{UTF_16BE, UTF_16LE, WINDOWS_1252};

/// Text encoding flag leading an ID3v2 text payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// 0x00: bytes are already UTF-8/Latin-1 compatible
    Latin1,
    /// 0x01: UTF-16, BOM optional
    Utf16,
    /// Any other flag value, passed through untouched
    Unknown(u8),
}

impl TextEncoding {
    pub const LATIN1_FLAG: u8 = 0x00;
    pub const UTF16_FLAG: u8 = 0x01;

    pub fn from_byte(byte: u8) -> Self {
        match byte {
            Self::LATIN1_FLAG => TextEncoding::Latin1,
            Self::UTF16_FLAG => TextEncoding::Utf16,
            other => TextEncoding::Unknown(other),
        }
    }
}

/// Transcode UTF-16 bytes to UTF-8.
///
/// A leading BOM selects the byte order (`FF FE` little-endian, `FE FF` big-endian);
/// without one the data is taken as little-endian. Unpaired surrogates and a dangling
/// odd byte become U+FFFD.
pub fn utf16_to_utf8(data: &[u8]) -> Vec<u8> {
    let text = match data {
        [0xFF, 0xFE, rest @ ..] => UTF_16LE.decode_without_bom_handling(rest).0,
        [0xFE, 0xFF, rest @ ..] => UTF_16BE.decode_without_bom_handling(rest).0,
        _ => UTF_16LE.decode_without_bom_handling(data).0,
    };
    text.into_owned().into_bytes()
}

/// Render frame bytes as a string: UTF-8 when valid, otherwise Windows-1252
pub fn bytes_to_string(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(text) => text.to_string(),
        Err(_) => WINDOWS_1252.decode(data).0.into_owned(),
    }
}
