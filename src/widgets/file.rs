//! PDF upload as a data URI
//!
//! Files are stored inline in the answers as
//! `data:<mime>;name=<file name>;base64,<payload>`. Only PDFs are accepted.

use super::{WidgetError, WidgetProps};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use regex::Regex;
use serde_json::Value;
use std::path::Path;

pub const PDF_MIME: &str = "application/pdf";
pub const NOT_PDF_ALERT: &str = "Uploaded file must be a PDF";
pub const NO_FILE: &str = "No file uploaded.";

static MIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"data:([a-zA-Z0-9]+/[a-zA-Z0-9.+-]+).*,.*").unwrap());

/// MIME type declared by a data URI, if it has one
pub fn mime_type_of(encoded: &str) -> Option<&str> {
    MIME_RE
        .captures(encoded)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Store `encoded` if it is a PDF. Anything else is rejected with
/// [`WidgetError::NotPdf`] and the stored answer is left alone.
pub fn accept_upload(
    encoded: String,
    on_change: &mut dyn FnMut(Option<Value>),
) -> Result<(), WidgetError> {
    if mime_type_of(&encoded) != Some(PDF_MIME) {
        tracing::debug!("Rejected upload with MIME {:?}", mime_type_of(&encoded));
        return Err(WidgetError::NotPdf);
    }
    on_change(Some(Value::String(encoded)));
    Ok(())
}

/// Read a file from disk and encode it as a data URI
pub fn encode_file(path: &Path) -> Result<String, WidgetError> {
    let bytes = std::fs::read(path).map_err(|source| WidgetError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(format!(
        "data:{};name={};base64,{}",
        mime_for_extension(path),
        encode_component(&name),
        STANDARD.encode(bytes)
    ))
}

fn mime_for_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => PDF_MIME,
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "txt" => "text/plain",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

fn encode_component(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || b"-_.!~*'()".contains(&byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn decode_component(encoded: &str) -> String {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// What the preview shows about a stored file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub name: Option<String>,
    pub mime: Option<String>,
    pub size_bytes: usize,
}

pub fn describe_data_uri(encoded: &str) -> Option<FileSummary> {
    let rest = encoded.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;

    let mut params = header.split(';');
    let mime = params
        .next()
        .filter(|m| !m.is_empty())
        .map(str::to_string);
    let mut name = None;
    let mut is_base64 = false;
    for param in params {
        if let Some(value) = param.strip_prefix("name=") {
            name = Some(decode_component(value));
        } else if param == "base64" {
            is_base64 = true;
        }
    }

    let size_bytes = if is_base64 {
        STANDARD
            .decode(payload)
            .map(|b| b.len())
            .unwrap_or(payload.len() / 4 * 3)
    } else {
        payload.len()
    };

    Some(FileSummary {
        name,
        mime,
        size_bytes,
    })
}

fn human_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Preview of the stored file, or a placeholder when there is none
pub fn render_preview(props: &WidgetProps<'_>) -> Vec<Line<'static>> {
    let summary = props.value.and_then(Value::as_str).and_then(describe_data_uri);
    let Some(summary) = summary else {
        return vec![Line::from(Span::styled(
            NO_FILE,
            Style::default().fg(Color::DarkGray),
        ))];
    };

    let name = summary.name.unwrap_or_else(|| "document".to_string());
    vec![Line::from(vec![
        Span::styled(
            name,
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
        ),
        Span::styled(
            format!(
                "  ({}, {})",
                summary.mime.as_deref().unwrap_or("unknown"),
                human_size(summary.size_bytes)
            ),
            Style::default().fg(Color::Gray),
        ),
    ])]
}

/// Preview of the current upload (if any) above a path input
pub fn render_input_and_preview(props: &WidgetProps<'_>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if props.value.is_some_and(|v| !v.is_null()) {
        lines.extend(render_preview(props));
    }

    let mut input = vec![
        Span::styled("PDF path: ", Style::default().fg(Color::Gray)),
        Span::raw(props.pending.to_string()),
    ];
    if props.focused {
        input.push(Span::styled("▌", Style::default().fg(Color::Cyan)));
    }
    lines.push(Line::from(input));

    if props.focused {
        lines.push(Line::from(Span::styled(
            "Enter to upload",
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}
