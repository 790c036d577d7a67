/// Human-readable size using 1024-based units, e.g. `1.5 KB`.
pub fn format_file_size(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes <= 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Image,
    Video,
    Audio,
    Document,
    Archive,
    Other,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Image => "image",
            FileCategory::Video => "video",
            FileCategory::Audio => "audio",
            FileCategory::Document => "document",
            FileCategory::Archive => "archive",
            FileCategory::Other => "other",
        }
    }
}

pub fn file_category(mime_type: &str) -> FileCategory {
    if mime_type.starts_with("image/") {
        FileCategory::Image
    } else if mime_type.starts_with("video/") {
        FileCategory::Video
    } else if mime_type.starts_with("audio/") {
        FileCategory::Audio
    } else if mime_type.starts_with("text/") || mime_type == "application/pdf" {
        FileCategory::Document
    } else if ["zip", "rar", "tar"].iter().any(|k| mime_type.contains(k)) {
        FileCategory::Archive
    } else {
        FileCategory::Other
    }
}
