// ID3v2.3 frame registry and frame content decoding

use crate::utils::encoding::{utf16_to_utf8, TextEncoding};

/// Common ID3v2.3 frame identifiers
pub mod frame_ids {
    pub const TITLE: &str = "TIT2";  // Title/songname/content description
    pub const ARTIST: &str = "TPE1"; // Lead performer(s)/Soloist(s)
    pub const ALBUM: &str = "TALB";  // Album/Movie/Show title
    pub const YEAR: &str = "TYER";   // Year
    pub const TRACK: &str = "TRCK";  // Track number/Position in set
    pub const GENRE: &str = "TCON";  // Content type
    pub const COMMENT: &str = "COMM"; // Comments
    pub const PICTURE: &str = "APIC"; // Attached picture
}

/// A registered frame id and its human-readable label
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct FrameInfo {
    pub id: &'static str,
    pub label: &'static str,
}

const fn info(id: &'static str, label: &'static str) -> FrameInfo {
    FrameInfo { id, label }
}

/// Every frame id the decoder accepts, sorted by id
static FRAME_REGISTRY: &[FrameInfo] = &[
    info("AENC", "Audio encryption"),
    info("APIC", "Attached picture"),
    info("COMM", "Comments"),
    info("COMR", "Commercial frame"),
    info("ENCR", "Encryption method registration"),
    info("ETCO", "Event timing codes"),
    info("GEOB", "General encapsulated object"),
    info("GRID", "Group identification registration"),
    info("IPLS", "Involved people list"),
    info("MCDI", "Music CD identifier"),
    info("MLLT", "MPEG location lookup table"),
    info("OWNE", "Ownership frame"),
    info("PCNT", "Play counter"),
    info("POPM", "Popularimeter"),
    info("POSS", "Position synchronisation frame"),
    info("PRIV", "Private frame"),
    info("RBUF", "Recommended buffer size"),
    info("RVAD", "Relative volume adjustment"),
    info("RVRB", "Reverb"),
    info("SYLT", "Synchronized lyric/text"),
    info("SYTC", "Synchronized tempo codes"),
    info("TALB", "Album/Movie/Show title"),
    info("TBPM", "BPM (beats per minute)"),
    info("TCOM", "Composer"),
    info("TCON", "Content type"),
    info("TCOP", "Copyright message"),
    info("TDAT", "Date"),
    info("TDLY", "Playlist delay"),
    info("TENC", "Encoded by"),
    info("TEXT", "Lyricist/Text writer"),
    info("TFLT", "File type"),
    info("TIME", "Time"),
    info("TIT1", "Content group description"),
    info("TIT2", "Title/songname/content description"),
    info("TIT3", "Subtitle/Description refinement"),
    info("TKEY", "Initial key"),
    info("TLAN", "Language(s)"),
    info("TLEN", "Length"),
    info("TMED", "Media type"),
    info("TOAL", "Original album/movie/show title"),
    info("TOFN", "Original filename"),
    info("TOLY", "Original lyricist(s)/text writer(s)"),
    info("TOPE", "Original artist(s)/performer(s)"),
    info("TORY", "Original release year"),
    info("TOWN", "File owner/licensee"),
    info("TPE1", "Lead performer(s)/Soloist(s)"),
    info("TPE2", "Band/orchestra/accompaniment"),
    info("TPE3", "Conductor/performer refinement"),
    info("TPE4", "Interpreted, remixed, or otherwise modified by"),
    info("TPOS", "Part of a set"),
    info("TPUB", "Publisher"),
    info("TRCK", "Track number/Position in set"),
    info("TRDA", "Recording dates"),
    info("TRSN", "Internet radio station name"),
    info("TRSO", "Internet radio station owner"),
    info("TSIZ", "Size"),
    info("TSRC", "ISRC (international standard recording code)"),
    info("TSSE", "Software/Hardware and settings used for encoding"),
    info("TXXX", "User defined text information frame"),
    info("TYER", "Year"),
    info("UFID", "Unique file identifier"),
    info("USER", "Terms of use"),
    info("USLT", "Unsynchronized lyric/text transcription"),
    info("WCOM", "Commercial information"),
    info("WCOP", "Copyright/Legal information"),
    info("WOAF", "Official audio file webpage"),
    info("WOAR", "Official artist/performer webpage"),
    info("WOAS", "Official audio source webpage"),
    info("WORS", "Official internet radio station homepage"),
    info("WPAY", "Payment"),
    info("WPUB", "Publishers official webpage"),
    info("WXXX", "User defined URL link frame"),
];

/// Look up the label of a registered frame id
pub fn lookup(id: &str) -> Option<&'static str> {
    FRAME_REGISTRY
        .binary_search_by(|entry| entry.id.cmp(id))
        .ok()
        .map(|index| FRAME_REGISTRY[index].label)
}

/// Whether `id` is a registered frame id
pub fn is_known(id: &str) -> bool {
    lookup(id).is_some()
}

/// All registered frame ids with their labels, ordered by id
pub fn list_known_frame_ids() -> &'static [FrameInfo] {
    FRAME_REGISTRY
}

/// Decode a frame's content according to its leading encoding flag.
///
/// 0x00 drops the flag and returns the rest as-is, 0x01 transcodes the rest from
/// UTF-16 to UTF-8, anything else returns the content unchanged with its flag byte.
pub fn decode_frame_content(content: &[u8]) -> Vec<u8> {
    let Some((&flag, rest)) = content.split_first() else {
        return Vec::new();
    };

    match TextEncoding::from_byte(flag) {
        TextEncoding::Latin1 => rest.to_vec(),
        TextEncoding::Utf16 => utf16_to_utf8(rest),
        TextEncoding::Unknown(_) => content.to_vec(),
    }
}
