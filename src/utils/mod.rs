// Shared helpers: byte access and text transcoding
pub mod encoding;
pub mod io;
