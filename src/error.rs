//! Error types for tag decoding

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the tag decoder and its accessors
#[derive(Error, Debug)]
pub enum Error {
    /// The stream does not start with the `ID3` magic
    #[error("ID3v2 tag not found")]
    TagNotFound,

    /// Requested frame id is not in the frame registry
    #[error("unknown frame id: {0}")]
    UnknownFrameId(String),

    /// Cover art was requested through the text accessor
    #[error("frame {0} holds cover art, use Tag::cover instead")]
    WrongAccessor(String),

    /// Frame id is valid but this tag does not carry it
    #[error("frame not present in tag: {0}")]
    FrameNotPresent(String),

    /// Failure from the underlying byte source
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
