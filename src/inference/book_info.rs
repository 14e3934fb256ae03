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


//! Title and author inference from the book directory name
//!
//! # Directory Naming Convention
//! `{TitleOfBook}_{AuthorName}`, each word capitalized and written without
//! spaces, e.g. `TomSawyer_MarkTwain` → title `Tom Sawyer`, author
//! `Mark Twain`.
//!
//! # Normalization
//! - A space is inserted at every lowercase→uppercase boundary
//!   (`TomSawyer` → `Tom Sawyer`)
//! - A single capital starting a new word is split off
//!   (`ASeaOfStars` → `A Sea Of Stars`, `JRRTolkien` → `JRR Tolkien`)
//! - A space is inserted between a digit run and a following uppercase
//!   letter (`2001ASpaceOdyssey` → `2001 A Space Odyssey`)
//! - Any further separator inside a part becomes a space
//! - Runs of whitespace collapse to one space
//!
//! A name without the separator becomes the title and the author stays
//! empty. That is a normal outcome, not an error.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Separator between title and author in directory names
pub const DEFAULT_DIRECTORY_SEPARATOR: &str = "_";

lazy_static! {
    static ref CAMEL_BOUNDARY: Regex = Regex::new(r"([a-z])([A-Z])").unwrap();
    static ref ACRONYM_BOUNDARY: Regex = Regex::new(r"([A-Z])([A-Z][a-z])").unwrap();
    static ref DIGIT_BOUNDARY: Regex = Regex::new(r"([0-9])([A-Z])").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Resolved book title and author
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BookInfo {
    pub title: String,
    /// Empty when unknown
    pub author: String,
}

/// Infers [`BookInfo`] from a directory name
#[derive(Debug, Clone)]
pub struct MetadataInferencer {
    separator: String,
}

impl MetadataInferencer {
    /// Split names on `separator`; an empty separator falls back to `_`
    pub fn new<S: Into<String>>(separator: S) -> Self {
        let separator = separator.into();
        Self {
            separator: if separator.is_empty() {
                DEFAULT_DIRECTORY_SEPARATOR.to_string()
            } else {
                separator
            },
        }
    }

    /// Resolve title and author
    ///
    /// Overrides win field by field; blank overrides count as absent. Only
    /// the fields without an override are inferred from `directory_name`.
    pub fn infer(
        &self,
        directory_name: &str,
        title_override: Option<&str>,
        author_override: Option<&str>,
    ) -> BookInfo {
        let title_override = non_blank(title_override);
        let author_override = non_blank(author_override);

        if let (Some(title), Some(author)) = (title_override, author_override) {
            return BookInfo {
                title: title.to_string(),
                author: author.to_string(),
            };
        }

        let inferred = self.parse_directory_name(directory_name);
        BookInfo {
            title: title_override.map(str::to_string).unwrap_or(inferred.title),
            author: author_override.map(str::to_string).unwrap_or(inferred.author),
        }
    }

    /// Split and normalize a directory name without any overrides
    pub fn parse_directory_name(&self, directory_name: &str) -> BookInfo {
        match directory_name.split_once(self.separator.as_str()) {
            Some((title, author)) => BookInfo {
                title: self.humanize(title),
                author: self.humanize(author),
            },
            None => BookInfo {
                title: self.humanize(directory_name),
                author: String::new(),
            },
        }
    }

    /// Turn `TomSawyer` into `Tom Sawyer`
    fn humanize(&self, part: &str) -> String {
        let spaced = part.replace(self.separator.as_str(), " ");
        let spaced = CAMEL_BOUNDARY.replace_all(&spaced, "$1 $2");
        let spaced = ACRONYM_BOUNDARY.replace_all(&spaced, "$1 $2");
        let spaced = DIGIT_BOUNDARY.replace_all(&spaced, "$1 $2");
        WHITESPACE.replace_all(spaced.trim(), " ").into_owned()
    }
}

impl Default for MetadataInferencer {
    fn default() -> Self {
        Self::new(DEFAULT_DIRECTORY_SEPARATOR)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(name: &str) -> BookInfo {
        MetadataInferencer::default().infer(name, None, None)
    }

    #[test]
    fn test_title_and_author_from_camel_case() {
        let info = infer("TomSawyer_MarkTwain");
        assert_eq!(info.title, "Tom Sawyer");
        assert_eq!(info.author, "Mark Twain");
    }

    #[test]
    fn test_name_without_separator_is_title_only() {
        let info = infer("Moby Dick");
        assert_eq!(info.title, "Moby Dick");
        assert_eq!(info.author, "");
    }

    #[test]
    fn test_digit_boundary_in_title() {
        let info = infer("2001ASpaceOdyssey_ArthurCClarke");
        assert_eq!(info.title, "2001 A Space Odyssey");
        assert_eq!(info.author, "Arthur C Clarke");
    }

    #[test]
    fn test_extra_separators_become_spaces() {
        let info = infer("ToSleepInASeaOfStars_Christopher_Paolini");
        assert_eq!(info.title, "To Sleep In A Sea Of Stars");
        assert_eq!(info.author, "Christopher Paolini");
    }

    #[test]
    fn test_acronyms_stay_together() {
        assert_eq!(infer("JRRTolkien").title, "JRR Tolkien");
        assert_eq!(infer("NASA").title, "NASA");
    }

    #[test]
    fn test_already_spaced_names_are_kept() {
        let info = infer("The Hobbit_J. R. R. Tolkien");
        assert_eq!(info.title, "The Hobbit");
        assert_eq!(info.author, "J. R. R. Tolkien");
    }

    #[test]
    fn test_empty_title_part() {
        let info = infer("_MarkTwain");
        assert_eq!(info.title, "");
        assert_eq!(info.author, "Mark Twain");
    }

    #[test]
    fn test_overrides_win_field_by_field() {
        let inferencer = MetadataInferencer::default();

        let info = inferencer.infer("TomSawyer_MarkTwain", Some("Huckleberry Finn"), None);
        assert_eq!(info.title, "Huckleberry Finn");
        assert_eq!(info.author, "Mark Twain");

        let info = inferencer.infer("TomSawyer_MarkTwain", None, Some("Samuel Clemens"));
        assert_eq!(info.title, "Tom Sawyer");
        assert_eq!(info.author, "Samuel Clemens");

        let info = inferencer.infer("whatever", Some("Title"), Some("Author"));
        assert_eq!(
            info,
            BookInfo {
                title: "Title".to_string(),
                author: "Author".to_string()
            }
        );
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let info = MetadataInferencer::default().infer("TomSawyer_MarkTwain", Some("  "), Some(""));
        assert_eq!(info.title, "Tom Sawyer");
        assert_eq!(info.author, "Mark Twain");
    }

    #[test]
    fn test_custom_separator() {
        let info = MetadataInferencer::new(" by ").infer("Moby Dick by Herman Melville", None, None);
        assert_eq!(info.title, "Moby Dick");
        assert_eq!(info.author, "Herman Melville");
    }
}
