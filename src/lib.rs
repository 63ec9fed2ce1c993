//! id3lens - ID3v2 tag reader
//!
//! Decodes the ID3v2 tag at the start of an MP3 stream: header validation,
//! frame table construction, encoding-aware text access and embedded cover
//! extraction.
//!
//! ```no_run
//! use std::fs::File;
//!
//! let mut file = File::open("song.mp3")?;
//! let tag = id3lens::parse_tag(&mut file)?;
//! println!("{}", tag.frame_text("TIT2")?);
//! if let Some(cover) = tag.cover() {
//!     std::fs::write("cover.jpg", &cover.image)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod id3;
pub mod metadata;
pub mod utils;

pub use error::{Error, Result};
pub use id3::{
    frame_ids, AttachedPicture, Cover, FrameInfo, Id3Frame, Id3v1Tag, Id3v2Header, Id3v2Tag,
    ImageKind, PictureType, ScanStop,
};
pub use metadata::Metadata;
pub use utils::io::ByteSource;

/// Decode the ID3v2 tag at the start of `source`
pub fn parse_tag<S: ByteSource + ?Sized>(source: &mut S) -> Result<Id3v2Tag> {
    Id3v2Tag::read(source)
}

/// Every frame id the decoder recognises, with its label
pub fn list_known_frame_ids() -> &'static [FrameInfo] {
    id3::frames::list_known_frame_ids()
}
