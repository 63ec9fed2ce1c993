// Output formatting for CLI

use std::io::Write;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;

use id3lens::{frame_ids, Id3Frame, Id3v2Tag, Metadata, ScanStop};

use super::config::OutputFormat;

/// One frame as shown in a read report
#[derive(Debug, Serialize)]
pub struct FrameReport {
    pub id: String,
    pub label: &'static str,
    pub size: u32,
    pub flags: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_base64: Option<String>,
}

impl FrameReport {
    pub fn new(tag: &Id3v2Tag, frame: &Id3Frame) -> Self {
        let is_text = frame.frame_id.starts_with('T') || frame.frame_id.starts_with('W');
        let text = if is_text {
            tag.frame_text(&frame.frame_id).ok()
        } else {
            None
        };
        let data_base64 = match text {
            Some(_) => None,
            None => Some(BASE64.encode(&frame.data)),
        };

        FrameReport {
            id: frame.frame_id.clone(),
            label: frame.label().unwrap_or_default(),
            size: frame.size(),
            flags: frame.flags,
            text,
            data_base64,
        }
    }
}

/// Everything `read` reports for one file
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<FrameReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_stop: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unparsed_body_bytes: Option<u64>,
}

impl FileReport {
    pub fn from_v2(path: &str, tag: &Id3v2Tag) -> Self {
        FileReport {
            path: path.to_string(),
            metadata: Metadata::from_v2(tag),
            frames: tag
                .frames
                .values()
                .map(|frame| FrameReport::new(tag, frame))
                .collect(),
            scan_stop: Some(describe_stop(&tag.stop)),
            unparsed_body_bytes: Some(tag.unparsed_body_bytes()),
        }
    }

    pub fn from_metadata(path: &str, metadata: Metadata) -> Self {
        FileReport {
            path: path.to_string(),
            metadata,
            frames: Vec::new(),
            scan_stop: None,
            unparsed_body_bytes: None,
        }
    }
}

fn describe_stop(stop: &ScanStop) -> String {
    match stop {
        ScanStop::UnregisteredId { offset, id } if id.iter().all(|&b| b == 0) => {
            format!("padding at offset {offset}")
        }
        ScanStop::UnregisteredId { offset, id } => {
            format!("unregistered frame id {:?} at offset {offset}", String::from_utf8_lossy(id))
        }
        ScanStop::EndOfSource { offset } => format!("end of file at offset {offset}"),
        ScanStop::Truncated { offset, id } => format!("truncated {id} frame at offset {offset}"),
    }
}

/// Format and output data
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Output a file report
    pub fn output_report(&self, report: &FileReport, writer: &mut dyn Write) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                writeln!(writer, "{}", serde_json::to_string_pretty(report)?)?;
            }
            OutputFormat::Pretty => {
                writeln!(writer, "{}", report.path)?;
                writeln!(writer, "{}", "─".repeat(60))?;
                writeln!(writer, "{}", report.metadata)?;
                if !report.frames.is_empty() {
                    writeln!(writer)?;
                    for frame in &report.frames {
                        writeln!(writer, "{}", self.format_frame(frame))?;
                    }
                }
                if let Some(stop) = &report.scan_stop {
                    writeln!(writer, "\nScan ended: {stop}")?;
                }
                if let Some(bytes) = report.unparsed_body_bytes.filter(|&n| n > 0) {
                    writeln!(writer, "Unparsed body bytes: {bytes}")?;
                }
            }
        }
        Ok(())
    }

    fn format_frame(&self, frame: &FrameReport) -> String {
        let value = match &frame.text {
            Some(text) => text.clone(),
            None if frame.id == frame_ids::PICTURE => format!("<picture, {} bytes>", frame.size),
            None => format!("<binary, {} bytes>", frame.size),
        };
        format!("{} - {:<36} {}", frame.id, frame.label, value)
    }

    /// Print success message
    pub fn print_success(&self, message: &str) {
        if !self.quiet {
            println!("✓ {}", message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }
}
