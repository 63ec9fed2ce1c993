// ID3 metadata handling module
pub mod cover;
pub mod frames;
pub mod v1;
pub mod v2;

pub use cover::{AttachedPicture, Cover, ImageKind, PictureType};
pub use frames::{frame_ids, FrameInfo};
pub use v1::Id3v1Tag;
pub use v2::{Id3Frame, Id3v2Header, Id3v2Tag, ScanStop};
