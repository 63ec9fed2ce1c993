// ID3v2 tag implementation

use std::collections::BTreeMap;

use tracing::debug;

use super::cover::{extract_cover, Cover};
use super::frames::{self, frame_ids};
use crate::error::{Error, Result};
use crate::utils::encoding::bytes_to_string;
use crate::utils::io::{read_array_at, ByteSource};

/// ID3v2 header structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id3v2Header {
    pub version: (u8, u8),
    pub flags: u8,
    /// Size field exactly as stored
    pub raw_size: [u8; 4],
}

impl Id3v2Header {
    pub const HEADER_SIZE: u64 = 10;
    const ID: [u8; 3] = *b"ID3";

    /// Read and validate the 10-byte header at offset 0
    pub fn read<S: ByteSource + ?Sized>(source: &mut S) -> Result<Self> {
        let magic = source.read_at(0, 3)?;
        if magic != Self::ID {
            return Err(Error::TagNotFound);
        }

        let rest: [u8; 7] = read_array_at(source, 3)?.ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated ID3v2 header")
        })?;

        let header = Id3v2Header {
            version: (rest[0], rest[1]),
            flags: rest[2],
            raw_size: [rest[3], rest[4], rest[5], rest[6]],
        };
        debug!(
            version = %header.version_string(),
            flags = header.flags,
            body_size = header.body_size(),
            "decoded ID3v2 header"
        );
        Ok(header)
    }

    /// Declared body length, excluding the header itself
    pub fn body_size(&self) -> u32 {
        decode_synchsafe(self.raw_size)
    }

    /// Version as `2.<major>.<revision>`
    pub fn version_string(&self) -> String {
        format!("2.{}.{}", self.version.0, self.version.1)
    }
}

/// Decode a synchsafe integer: 7 significant bits per byte, big-endian
pub fn decode_synchsafe(bytes: [u8; 4]) -> u32 {
    ((bytes[0] & 0x7F) as u32) << 21
        | ((bytes[1] & 0x7F) as u32) << 14
        | ((bytes[2] & 0x7F) as u32) << 7
        | (bytes[3] & 0x7F) as u32
}

/// Decode a frame size field: plain big-endian, all 8 bits significant
pub fn decode_frame_size(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// ID3v2 frame structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id3Frame {
    pub frame_id: String,
    pub raw_size: [u8; 4],
    pub flags: u16,
    pub data: Vec<u8>,
}

impl Id3Frame {
    pub const HEADER_SIZE: u64 = 10;

    /// Declared content length
    pub fn size(&self) -> u32 {
        decode_frame_size(self.raw_size)
    }

    /// Registry label for this frame's id
    pub fn label(&self) -> Option<&'static str> {
        frames::lookup(&self.frame_id)
    }
}

/// Why the frame scan ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStop {
    /// A frame header carried an id outside the registry (padding lands here)
    UnregisteredId { offset: u64, id: Vec<u8> },
    /// The source ended before a full frame header
    EndOfSource { offset: u64 },
    /// A registered frame declared more content than the source holds
    Truncated { offset: u64, id: String },
}

impl ScanStop {
    /// Offset of the frame header that stopped the scan
    pub fn offset(&self) -> u64 {
        match self {
            ScanStop::UnregisteredId { offset, .. }
            | ScanStop::EndOfSource { offset }
            | ScanStop::Truncated { offset, .. } => *offset,
        }
    }
}

/// Result of walking the tag body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameScan {
    pub frames: BTreeMap<String, Id3Frame>,
    pub stop: ScanStop,
}

enum Step {
    Frame(Id3Frame, u64),
    Stop(ScanStop),
}

fn read_frame<S: ByteSource + ?Sized>(source: &mut S, offset: u64) -> std::io::Result<Step> {
    let Some(header) = read_array_at::<_, 10>(source, offset)? else {
        return Ok(Step::Stop(ScanStop::EndOfSource { offset }));
    };

    let id_bytes = &header[0..4];
    let raw_size = [header[4], header[5], header[6], header[7]];
    let flags = u16::from_be_bytes([header[8], header[9]]);
    let size = decode_frame_size(raw_size) as u64;

    let frame_id = match std::str::from_utf8(id_bytes) {
        Ok(id) if frames::is_known(id) => id.to_string(),
        _ => {
            return Ok(Step::Stop(ScanStop::UnregisteredId {
                offset,
                id: id_bytes.to_vec(),
            }))
        }
    };

    let content_offset = offset + Id3Frame::HEADER_SIZE;
    let data = source.read_at(content_offset, size)?;
    if (data.len() as u64) < size {
        return Ok(Step::Stop(ScanStop::Truncated { offset, id: frame_id }));
    }

    let frame = Id3Frame {
        frame_id,
        raw_size,
        flags,
        data,
    };
    Ok(Step::Frame(frame, content_offset + size))
}

/// Walk frames from `start` until an unregistered id or the end of usable data.
///
/// Only I/O failures are errors; every other anomaly ends the scan and keeps
/// the frames collected so far. A repeated id replaces the earlier frame.
pub fn scan_frames<S: ByteSource + ?Sized>(source: &mut S, start: u64) -> std::io::Result<FrameScan> {
    let mut frames = BTreeMap::new();
    let mut offset = start;

    loop {
        match read_frame(source, offset)? {
            Step::Frame(frame, next) => {
                debug!(id = %frame.frame_id, size = frame.size(), offset, "read frame");
                frames.insert(frame.frame_id.clone(), frame);
                offset = next;
            }
            Step::Stop(stop) => {
                debug!(?stop, frames = frames.len(), "frame scan stopped");
                return Ok(FrameScan { frames, stop });
            }
        }
    }
}

/// ID3v2 tag structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id3v2Tag {
    pub header: Id3v2Header,
    pub frames: BTreeMap<String, Id3Frame>,
    pub stop: ScanStop,
}

impl Id3v2Tag {
    /// Decode the header and frame table from the start of `source`
    pub fn read<S: ByteSource + ?Sized>(source: &mut S) -> Result<Self> {
        let header = Id3v2Header::read(source)?;
        let FrameScan { frames, stop } = scan_frames(source, Id3v2Header::HEADER_SIZE)?;
        Ok(Id3v2Tag {
            header,
            frames,
            stop,
        })
    }

    pub fn frame(&self, frame_id: &str) -> Option<&Id3Frame> {
        self.frames.get(frame_id)
    }

    /// Decoded content of a text-bearing frame.
    ///
    /// Fails for ids outside the registry, for the cover-art id, and for ids this
    /// tag does not carry.
    pub fn frame_content(&self, frame_id: &str) -> Result<Vec<u8>> {
        if !frames::is_known(frame_id) {
            return Err(Error::UnknownFrameId(frame_id.to_string()));
        }
        if frame_id == frame_ids::PICTURE {
            return Err(Error::WrongAccessor(frame_id.to_string()));
        }
        let frame = self
            .frames
            .get(frame_id)
            .ok_or_else(|| Error::FrameNotPresent(frame_id.to_string()))?;
        Ok(frames::decode_frame_content(&frame.data))
    }

    /// Frame content as a string with trailing NULs removed
    pub fn frame_text(&self, frame_id: &str) -> Result<String> {
        let content = self.frame_content(frame_id)?;
        Ok(bytes_to_string(&content).trim_end_matches('\0').to_string())
    }

    /// Embedded cover art, or `None` when the tag has no APIC frame
    pub fn cover(&self) -> Option<Cover> {
        self.frames
            .get(frame_ids::PICTURE)
            .map(|frame| extract_cover(&frame.data))
    }

    /// Bytes after the header that the frame table did not cover, padding included
    pub fn unparsed_body_bytes(&self) -> u64 {
        let body_end = Id3v2Header::HEADER_SIZE + self.header.body_size() as u64;
        body_end.saturating_sub(self.stop.offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn header(size: [u8; 4]) -> Vec<u8> {
        let mut bytes = b"ID3".to_vec();
        bytes.extend_from_slice(&[0x03, 0x00, 0x00]);
        bytes.extend_from_slice(&size);
        bytes
    }

    fn frame(id: &[u8; 4], content: &[u8]) -> Vec<u8> {
        let mut bytes = id.to_vec();
        bytes.extend_from_slice(&(content.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&[0x00, 0x00]);
        bytes.extend_from_slice(content);
        bytes
    }

    #[test]
    fn synchsafe_boundaries() {
        assert_eq!(decode_synchsafe([0, 0, 0, 0]), 0);
        assert_eq!(decode_synchsafe([0x7F, 0x7F, 0x7F, 0x7F]), 0x0FFF_FFFF);
        assert_eq!(decode_synchsafe([0x00, 0x00, 0x02, 0x01]), 257);
    }

    #[test]
    fn synchsafe_ignores_top_bit() {
        assert_eq!(decode_synchsafe([0xFF, 0xFF, 0xFF, 0xFF]), 0x0FFF_FFFF);
        assert_eq!(decode_synchsafe([0x80, 0x80, 0x81, 0x80]), 0x80);
    }

    #[test]
    fn frame_size_uses_all_bits() {
        assert_eq!(decode_frame_size([0x00, 0x00, 0x02, 0x01]), 0x201);
        assert_eq!(decode_frame_size([0x00, 0x00, 0x00, 0x80]), 0x80);
        assert_eq!(decode_frame_size([0xFF, 0xFF, 0xFF, 0xFF]), u32::MAX);
    }

    #[test]
    fn header_decodes_fields() {
        let mut source = Cursor::new(header([0x00, 0x00, 0x02, 0x01]));
        let header = Id3v2Header::read(&mut source).unwrap();
        assert_eq!(header.version, (3, 0));
        assert_eq!(header.flags, 0);
        assert_eq!(header.body_size(), 257);
        assert_eq!(header.version_string(), "2.3.0");
    }

    #[test]
    fn header_rejects_wrong_magic() {
        let mut bytes = header([0, 0, 0, 0]);
        bytes[..3].copy_from_slice(b"XYZ");
        let err = Id3v2Header::read(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, Error::TagNotFound));
    }

    #[test]
    fn short_stream_without_magic_is_not_found() {
        let err = Id3v2Tag::read(&mut Cursor::new(b"ID".to_vec())).unwrap_err();
        assert!(matches!(err, Error::TagNotFound));
    }

    #[test]
    fn truncated_header_is_io_error() {
        let err = Id3v2Header::read(&mut Cursor::new(b"ID3\x03\x00".to_vec())).unwrap_err();
        match err {
            Error::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn scan_stops_at_unregistered_id() {
        let mut bytes = header([0, 0, 0, 0x7F]);
        bytes.extend(frame(b"TIT2", b"\x00Song"));
        bytes.extend(frame(b"TPE1", b"\x00Band"));
        bytes.extend(frame(b"ZZZZ", b"\x00junk"));
        bytes.extend(frame(b"TALB", b"\x00Never read"));

        let tag = Id3v2Tag::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(tag.frames.len(), 2);
        assert!(tag.frame("TIT2").is_some());
        assert!(tag.frame("TPE1").is_some());
        assert!(tag.frame("TALB").is_none());
        assert_eq!(
            tag.stop,
            ScanStop::UnregisteredId {
                offset: 10 + 15 + 15,
                id: b"ZZZZ".to_vec()
            }
        );
    }

    #[test]
    fn padding_stops_scan() {
        let mut bytes = header([0, 0, 0, 0x30]);
        bytes.extend(frame(b"TIT2", b"\x00Hi"));
        bytes.extend(vec![0u8; 32]);

        let tag = Id3v2Tag::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(tag.frames.len(), 1);
        assert!(matches!(tag.stop, ScanStop::UnregisteredId { offset: 23, .. }));
        assert_eq!(tag.unparsed_body_bytes(), 10 + 0x30 - 23);
    }

    #[test]
    fn end_of_source_stops_scan() {
        let mut bytes = header([0, 0, 0, 0x0D]);
        bytes.extend(frame(b"TIT2", b"\x00Hi"));

        let tag = Id3v2Tag::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(tag.frames.len(), 1);
        assert_eq!(tag.stop, ScanStop::EndOfSource { offset: 23 });
    }

    #[test]
    fn truncated_frame_is_dropped() {
        let mut bytes = header([0, 0, 0, 0x7F]);
        bytes.extend(frame(b"TIT2", b"\x00Hi"));
        let mut cut = frame(b"TALB", b"\x00Long album name");
        cut.truncate(14);
        bytes.extend(cut);

        let tag = Id3v2Tag::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(tag.frames.len(), 1);
        assert_eq!(
            tag.stop,
            ScanStop::Truncated {
                offset: 23,
                id: "TALB".to_string()
            }
        );
    }

    #[test]
    fn repeated_id_keeps_last() {
        let mut bytes = header([0, 0, 0, 0x7F]);
        bytes.extend(frame(b"TIT2", b"\x00First"));
        bytes.extend(frame(b"TIT2", b"\x00Second"));

        let tag = Id3v2Tag::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(tag.frames.len(), 1);
        assert_eq!(tag.frame_text("TIT2").unwrap(), "Second");
    }

    #[test]
    fn frame_fields_are_kept() {
        let mut bytes = header([0, 0, 0, 0x7F]);
        let mut raw = frame(b"TRCK", b"\x003/12");
        raw[8] = 0x40;
        bytes.extend(raw);

        let tag = Id3v2Tag::read(&mut Cursor::new(bytes)).unwrap();
        let trck = tag.frame("TRCK").unwrap();
        assert_eq!(trck.flags, 0x4000);
        assert_eq!(trck.size(), 5);
        assert_eq!(trck.raw_size, [0, 0, 0, 5]);
        assert_eq!(trck.label(), Some("Track number/Position in set"));
    }

    #[test]
    fn content_accessor_errors() {
        let mut bytes = header([0, 0, 0, 0x7F]);
        bytes.extend(frame(b"TIT2", b"\x00Hi"));
        bytes.extend(frame(b"APIC", b"\x00image/jpeg\x00\x03\x00\xFF\xD8\xFF\xD9"));
        let tag = Id3v2Tag::read(&mut Cursor::new(bytes)).unwrap();

        assert_eq!(tag.frame_content("TIT2").unwrap(), b"Hi");
        assert!(matches!(tag.frame_content("NOPE"), Err(Error::UnknownFrameId(id)) if id == "NOPE"));
        assert!(matches!(tag.frame_content("APIC"), Err(Error::WrongAccessor(_))));
        assert!(matches!(tag.frame_content("TALB"), Err(Error::FrameNotPresent(id)) if id == "TALB"));
    }

    #[test]
    fn frame_text_trims_terminator() {
        let mut bytes = header([0, 0, 0, 0x7F]);
        bytes.extend(frame(b"TPE1", b"\x01\xFF\xFEH\x00i\x00\x00\x00"));
        let tag = Id3v2Tag::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(tag.frame_text("TPE1").unwrap(), "Hi");
    }

    #[test]
    fn cover_absent_without_apic() {
        let mut bytes = header([0, 0, 0, 0x7F]);
        bytes.extend(frame(b"TIT2", b"\x00Hi"));
        let tag = Id3v2Tag::read(&mut Cursor::new(bytes)).unwrap();
        assert!(tag.cover().is_none());
    }

    #[test]
    fn reading_twice_is_equal() {
        let mut bytes = header([0, 0, 0, 0x7F]);
        bytes.extend(frame(b"TIT2", b"\x00Hi"));
        bytes.extend(frame(b"COMM", b"\x00engnote"));
        let mut source = Cursor::new(bytes);
        let first = Id3v2Tag::read(&mut source).unwrap();
        let second = Id3v2Tag::read(&mut source).unwrap();
        assert_eq!(first, second);
    }
}
