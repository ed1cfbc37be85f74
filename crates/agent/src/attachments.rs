//! Trailing file summaries for replies to messages with attachments.

use parley_core::Attachment;

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable size in 1024-based units, at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}

/// Content recorded for a user message that carried only files.
pub fn upload_notice(count: usize) -> String {
    format!("Uploaded {count} file(s)")
}

/// The section appended to a reply, or `None` without attachments.
pub fn summary(attachments: &[Attachment]) -> Option<String> {
    if attachments.is_empty() {
        return None;
    }
    let mut section = String::from("\n\n**📁 Attached Files:**\n");
    for file in attachments {
        section.push_str(&format!(
            "📄 {} ({}) - Type: {}\n",
            file.name,
            format_file_size(file.size),
            file.mime_type
        ));
    }
    Some(section)
}
