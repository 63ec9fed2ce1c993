// Absolute-offset byte access for tag-bearing streams

use std::io::{Read, Seek, SeekFrom};

/// Random-access byte reader the tag decoders consume.
///
/// Offsets are absolute from the start of the stream. A read that runs past the
/// end yields whatever bytes exist, so callers must check the returned length.
pub trait ByteSource {
    /// Read up to `length` bytes starting at `offset`
    fn read_at(&mut self, offset: u64, length: u64) -> std::io::Result<Vec<u8>>;

    /// Total length of the stream in bytes
    fn byte_len(&mut self) -> std::io::Result<u64>;
}

impl<R: Read + Seek> ByteSource for R {
    fn read_at(&mut self, offset: u64, length: u64) -> std::io::Result<Vec<u8>> {
        self.seek(SeekFrom::Start(offset))?;
        let mut buffer = Vec::new();
        self.by_ref().take(length).read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    fn byte_len(&mut self) -> std::io::Result<u64> {
        let pos = self.stream_position()?;
        let len = self.seek(SeekFrom::End(0))?;
        self.seek(SeekFrom::Start(pos))?;
        Ok(len)
    }
}

/// Read exactly `N` bytes at `offset`, or `None` if the stream ends first
pub fn read_array_at<S: ByteSource + ?Sized, const N: usize>(
    source: &mut S,
    offset: u64,
) -> std::io::Result<Option<[u8; N]>> {
    let bytes = source.read_at(offset, N as u64)?;
    Ok(bytes.try_into().ok())
}
