// Bookbinder - Audiobook binder for chapter files
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Output file naming
//!
//! # Naming Rule
//! - `{title} - {author}.m4b` when an author is known
//! - `{title}.m4b` otherwise
//!
//! Characters that are invalid in file names on common filesystems are
//! replaced by look-alike characters so the name stays readable, and the
//! result is trimmed to the filesystem component limit.

/// Maximum file name length in bytes (ext4, APFS, NTFS)
const MAX_COMPONENT_LENGTH: usize = 255;

/// Build the output file name for a book
///
/// `title` must be non-empty; the composer guarantees that before calling.
pub fn output_file_name(title: &str, author: &str, extension: &str) -> String {
    let stem = if author.trim().is_empty() {
        title.trim().to_string()
    } else {
        format!("{} - {}", title.trim(), author.trim())
    };

    let ext = extension.trim_start_matches('.');
    let sanitized = sanitize_filename(&stem);
    // Leave room for ".{ext}"
    let max_stem_len = MAX_COMPONENT_LENGTH.saturating_sub(ext.len() + 1);
    let truncated = truncate_component(&sanitized, max_stem_len);

    format!("{}.{}", truncated, ext)
}

/// Sanitize filename (removes/replaces invalid characters for filenames)
pub fn sanitize_filename(name: &str) -> String {
    let mut result: String = name.chars().map(replace_char).collect();

    // Trim leading/trailing whitespace and dots
    result = result.trim().trim_matches('.').trim().to_string();

    // Handle reserved names on Windows
    if cfg!(target_os = "windows") {
        result = handle_windows_reserved_names(&result);
    }

    // Ensure not empty
    if result.is_empty() {
        result = "audiobook".to_string();
    }

    result
}

/// Replace invalid character with safe alternative
fn replace_char(c: char) -> char {
    match c {
        '<' => '＜', // U+FF1C fullwidth less-than sign
        '>' => '＞', // U+FF1E fullwidth greater-than sign
        ':' => '_',  // Colon is problematic on many systems
        '"' => '＂', // U+FF02 fullwidth quotation mark
        '|' => '⏐', // U+23D0 vertical line extension
        '?' => '？', // U+FF1F fullwidth question mark
        '*' => '✱', // U+2731 heavy asterisk
        '/' => '∕',  // U+2215 division slash
        '\\' => '_', // Backslash
        c if c.is_control() => '_', // Control characters and NUL
        c => c,
    }
}

/// Handle Windows reserved filenames
fn handle_windows_reserved_names(name: &str) -> String {
    let upper = name.to_uppercase();
    let reserved = [
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
        "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];

    for reserved_name in &reserved {
        if upper == *reserved_name || upper.starts_with(&format!("{}.", reserved_name)) {
            return format!("_{}", name);
        }
    }

    name.to_string()
}

/// Truncate path component to fit within byte limit
fn truncate_component(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }

    // Find valid UTF-8 boundary, keeping room for "..."
    let mut index = max_bytes.saturating_sub(3);
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }

    format!("{}...", text[..index].trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name_with_author() {
        assert_eq!(
            output_file_name("Tom Sawyer", "Mark Twain", "m4b"),
            "Tom Sawyer - Mark Twain.m4b"
        );
    }

    #[test]
    fn test_output_file_name_without_author() {
        assert_eq!(output_file_name("Moby Dick", "", "m4b"), "Moby Dick.m4b");
        assert_eq!(output_file_name("Moby Dick", "  ", ".m4b"), "Moby Dick.m4b");
    }

    #[test]
    fn test_output_file_name_replaces_unsafe_characters() {
        assert_eq!(
            output_file_name("Who/What: Why?", "A*B", "m4b"),
            "Who∕What_ Why？ - A✱B.m4b"
        );
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("test<>file"), "test＜＞file");
        assert_eq!(sanitize_filename("test:file"), "test_file");
        assert_eq!(sanitize_filename("test|file"), "test⏐file");
        assert_eq!(sanitize_filename("test?file"), "test？file");
        assert_eq!(sanitize_filename("test*file"), "test✱file");
        assert_eq!(sanitize_filename("test/file"), "test∕file");
        assert_eq!(sanitize_filename("tab\there"), "tab_here");
    }

    #[test]
    fn test_trim_whitespace_and_dots() {
        assert_eq!(sanitize_filename("  name.  "), "name");
        assert_eq!(sanitize_filename("..."), "audiobook");
    }

    #[test]
    fn test_long_names_are_truncated() {
        let title = "é".repeat(300);
        let name = output_file_name(&title, "", "m4b");
        assert!(name.len() <= MAX_COMPONENT_LENGTH);
        assert!(name.ends_with("....m4b"));
    }

    #[test]
    fn test_windows_reserved_names() {
        assert_eq!(handle_windows_reserved_names("CON"), "_CON");
        assert_eq!(handle_windows_reserved_names("nul.txt"), "_nul.txt");
        assert_eq!(handle_windows_reserved_names("Console"), "Console");
    }
}
