// CLI command implementations
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tracing::{debug, warn};

use id3lens::{frame_ids, AttachedPicture, Error, Id3v1Tag, Id3v2Tag, ImageKind, Metadata};

use super::config::{Commands, OutputFormat};
use super::output::{FileReport, OutputFormatter};

pub fn run(command: Commands, formatter: &OutputFormatter) -> anyhow::Result<()> {
    match command {
        Commands::Frames => command_frames(formatter),
        Commands::Read { files, output } => command_read(files, output, formatter),
        Commands::Cover { file, output } => command_cover(&file, output, formatter),
        Commands::Detect { files } => command_detect(files, formatter),
    }
}

/// Expand glob patterns; plain paths pass through untouched
pub fn expand_paths(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(pattern));
            continue;
        }

        let mut matched = 0;
        for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
            match entry {
                Ok(path) if path.is_file() => {
                    paths.push(path);
                    matched += 1;
                }
                Ok(_) => {}
                Err(e) => warn!("skipping unreadable path: {e}"),
            }
        }
        if matched == 0 {
            warn!("no files match {pattern}");
        }
    }
    Ok(paths)
}

fn open(path: &Path) -> anyhow::Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// List the frame registry
fn command_frames(formatter: &OutputFormatter) -> anyhow::Result<()> {
    let known = id3lens::list_known_frame_ids();
    match formatter.format() {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(known)?),
        OutputFormat::Pretty => {
            for info in known {
                println!("{} - {}", info.id, info.label);
            }
        }
    }
    Ok(())
}

/// Build the report for one file, falling back to ID3v1 when there is no ID3v2 tag
fn read_report(path: &Path) -> anyhow::Result<FileReport> {
    let shown = path.display().to_string();
    let mut reader = open(path)?;

    match id3lens::parse_tag(&mut reader) {
        Ok(tag) => Ok(FileReport::from_v2(&shown, &tag)),
        Err(Error::TagNotFound) => {
            debug!(path = %shown, "no ID3v2 tag, trying ID3v1");
            match Id3v1Tag::read(&mut reader)? {
                Some(v1) => Ok(FileReport::from_metadata(&shown, Metadata::from_v1(&v1))),
                None => bail!("{shown}: no ID3 tag found"),
            }
        }
        Err(e) => Err(e).with_context(|| format!("failed to read tag from {shown}")),
    }
}

/// Read tags from files
fn command_read(
    files: Vec<String>,
    output: Option<PathBuf>,
    formatter: &OutputFormatter,
) -> anyhow::Result<()> {
    let paths = expand_paths(&files)?;
    if paths.is_empty() {
        bail!("no files to read");
    }

    let mut writer: Box<dyn Write> = match &output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(std::io::stdout().lock()),
    };

    let mut failures = 0;
    for path in &paths {
        match read_report(path) {
            Ok(report) => {
                formatter.output_report(&report, &mut *writer)?;
                writeln!(writer)?;
            }
            Err(e) => {
                formatter.print_error(&format!("{e:#}"));
                failures += 1;
            }
        }
    }
    writer.flush()?;

    if let Some(path) = output {
        formatter.print_success(&format!(
            "Wrote {} report(s) to {}",
            paths.len() - failures,
            path.display()
        ));
    }
    Ok(())
}

/// Pick the destination file for an exported cover
fn cover_destination(audio: &Path, output: Option<PathBuf>, extension: &str) -> PathBuf {
    let stem = audio
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cover".to_string());
    let default_name = format!("{stem}.{extension}");

    match output {
        Some(dir) if dir.is_dir() => dir.join(default_name),
        Some(path) => path,
        None => PathBuf::from(default_name),
    }
}

/// Extension for a MIME string
fn extension_for_mime(mime: &str) -> &'static str {
    match mime.trim_end_matches('\0') {
        "image/png" | "PNG" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        _ => "jpg",
    }
}

/// Cover image written by `export_cover`
#[derive(Debug)]
struct ExportedCover {
    destination: PathBuf,
    mime_type: String,
    len: usize,
}

/// Write the embedded cover of `file` to `output` (or the default name)
fn export_cover(file: &Path, output: Option<PathBuf>) -> anyhow::Result<ExportedCover> {
    let mut reader = open(file)?;
    let tag: Id3v2Tag = id3lens::parse_tag(&mut reader)
        .with_context(|| format!("failed to read tag from {}", file.display()))?;

    let Some(cover) = tag.cover() else {
        bail!("{}: no cover art", file.display());
    };

    let (image, extension, mime_type) = if !cover.is_empty() {
        let extension = cover.kind.map(ImageKind::extension).unwrap_or("jpg");
        let mime_type = match (cover.mime_type.is_empty(), cover.kind) {
            (true, Some(kind)) => kind.mime_type().to_string(),
            _ => cover.mime_type_lossy(),
        };
        (cover.image, extension, mime_type)
    } else {
        // No 06 00 separator before the image: fall back to the field layout
        debug!("signature scan found no image, parsing APIC fields");
        let frame = tag
            .frame(frame_ids::PICTURE)
            .context("cover frame disappeared")?;
        let picture = AttachedPicture::parse(&frame.data)
            .with_context(|| format!("{}: malformed cover frame", file.display()))?;
        let extension = picture
            .kind()
            .map(ImageKind::extension)
            .unwrap_or_else(|| extension_for_mime(&picture.mime_type));
        (picture.data, extension, picture.mime_type)
    };

    if image.is_empty() {
        bail!("{}: cover frame holds no image data", file.display());
    }

    let destination = cover_destination(file, output, extension);
    std::fs::write(&destination, &image)
        .with_context(|| format!("failed to write {}", destination.display()))?;
    Ok(ExportedCover {
        destination,
        mime_type,
        len: image.len(),
    })
}

/// Export the embedded cover image
fn command_cover(file: &Path, output: Option<PathBuf>, formatter: &OutputFormatter) -> anyhow::Result<()> {
    let exported = export_cover(file, output)?;
    formatter.print_success(&format!(
        "Exported {} ({}, {} bytes) to {}",
        file.display(),
        exported.mime_type,
        exported.len,
        exported.destination.display()
    ));
    Ok(())
}

/// Report which tags each file carries
fn command_detect(files: Vec<String>, formatter: &OutputFormatter) -> anyhow::Result<()> {
    for path in expand_paths(&files)? {
        let result = open(&path).and_then(|mut reader| {
            let v2 = match Id3v2Tag::read(&mut reader) {
                Ok(tag) => Some(format!("ID3v{} ({} frames)", tag.header.version_string(), tag.frames.len())),
                Err(Error::TagNotFound) => None,
                Err(e) => return Err(e.into()),
            };
            let v1 = Id3v1Tag::read(&mut reader)?.map(|_| "ID3v1".to_string());
            Ok([v2, v1].into_iter().flatten().collect::<Vec<_>>())
        });

        match result {
            Ok(found) if found.is_empty() => {
                formatter.print_info(&format!("{}: no ID3 tag", path.display()))
            }
            Ok(found) => formatter.print_info(&format!("{}: {}", path.display(), found.join(", "))),
            Err(e) => formatter.print_error(&format!("{}: {e:#}", path.display())),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_not_globbed() {
        let paths = expand_paths(&["does/not/exist.mp3".to_string()]).unwrap();
        assert_eq!(paths, [PathBuf::from("does/not/exist.mp3")]);
    }

    #[test]
    fn glob_patterns_expand_to_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"").unwrap();
        std::fs::write(dir.path().join("b.mp3"), b"").unwrap();
        std::fs::write(dir.path().join("c.txt"), b"").unwrap();

        let pattern = format!("{}/*.mp3", dir.path().display());
        let mut paths = expand_paths(&[pattern]).unwrap();
        paths.sort();
        assert_eq!(paths, [dir.path().join("a.mp3"), dir.path().join("b.mp3")]);
    }

    #[test]
    fn cover_destination_rules() {
        let dir = tempfile::tempdir().unwrap();
        let audio = Path::new("music/song.mp3");
        assert_eq!(cover_destination(audio, None, "png"), PathBuf::from("song.png"));
        assert_eq!(
            cover_destination(audio, Some(dir.path().to_path_buf()), "jpg"),
            dir.path().join("song.jpg")
        );
        assert_eq!(
            cover_destination(audio, Some(PathBuf::from("art.jpeg")), "jpg"),
            PathBuf::from("art.jpeg")
        );
    }

    #[test]
    fn mime_extensions() {
        assert_eq!(extension_for_mime("image/png"), "png");
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(extension_for_mime("unknown"), "jpg");
    }

    #[test]
    fn read_report_falls_back_to_v1() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.mp3");
        let mut bytes = vec![0xFFu8, 0xFB, 0x90, 0x00];
        let mut trailer = vec![0u8; 128];
        trailer[..3].copy_from_slice(b"TAG");
        trailer[3..8].copy_from_slice(b"Title");
        bytes.extend(trailer);
        std::fs::write(&path, bytes).unwrap();

        let report = read_report(&path).unwrap();
        assert_eq!(report.metadata.file_type, "ID3v1");
        assert_eq!(report.metadata.title.as_deref(), Some("Title"));
        assert!(report.frames.is_empty());
    }

    #[test]
    fn read_report_without_any_tag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.mp3");
        std::fs::write(&path, [0xFFu8, 0xFB, 0x90, 0x00]).unwrap();
        assert!(read_report(&path).is_err());
    }

    fn write_tagged(dir: &Path, name: &str, apic: &[u8]) -> PathBuf {
        let mut bytes = b"ID3\x03\x00\x00\x00\x00\x01\x00".to_vec();
        bytes.extend_from_slice(b"APIC");
        bytes.extend_from_slice(&(apic.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&[0, 0]);
        bytes.extend_from_slice(apic);
        bytes.extend_from_slice(&[0u8; 16]);
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0xD9];

    #[test]
    fn export_cover_from_signature_scan() {
        let dir = tempfile::tempdir().unwrap();
        let mut apic = b"\x00image/jpeg".to_vec();
        apic.extend_from_slice(&[0x06, 0x00]);
        apic.extend_from_slice(JPEG);
        let audio = write_tagged(dir.path(), "media.mp3", &apic);

        let out_dir = dir.path().join("covers");
        std::fs::create_dir(&out_dir).unwrap();
        let exported = export_cover(&audio, Some(out_dir.clone())).unwrap();

        assert_eq!(exported.destination, out_dir.join("media.jpg"));
        assert_eq!(exported.mime_type, "image/jpeg");
        assert_eq!(exported.len, JPEG.len());
        assert_eq!(std::fs::read(&exported.destination).unwrap(), JPEG);
    }

    #[test]
    fn export_cover_falls_back_to_field_layout() {
        let dir = tempfile::tempdir().unwrap();
        let png: Vec<u8> = [
            &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A][..],
            &[0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82],
        ]
        .concat();
        let mut apic = b"\x00image/png\x00\x03front\x00".to_vec();
        apic.extend_from_slice(&png);
        let audio = write_tagged(dir.path(), "front.mp3", &apic);

        let target = dir.path().join("art.png");
        let exported = export_cover(&audio, Some(target.clone())).unwrap();

        assert_eq!(exported.destination, target);
        assert_eq!(exported.mime_type, "image/png");
        assert_eq!(std::fs::read(&target).unwrap(), png);
    }

    #[test]
    fn export_cover_uses_signature_mime_when_type_field_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut apic = vec![0x00, 0x06, 0x00];
        apic.extend_from_slice(JPEG);
        let audio = write_tagged(dir.path(), "bare.mp3", &apic);

        let exported = export_cover(&audio, Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(exported.mime_type, "image/jpeg");
        assert_eq!(exported.destination, dir.path().join("bare.jpg"));
    }

    #[test]
    fn export_cover_without_apic_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.mp3");
        let mut bytes = b"ID3\x03\x00\x00\x00\x00\x00\x20".to_vec();
        bytes.extend_from_slice(b"TIT2\x00\x00\x00\x03\x00\x00\x00Hi");
        bytes.extend_from_slice(&[0u8; 16]);
        std::fs::write(&path, bytes).unwrap();

        let err = export_cover(&path, Some(dir.path().to_path_buf())).unwrap_err();
        assert!(err.to_string().ends_with("no cover art"));
    }
}
