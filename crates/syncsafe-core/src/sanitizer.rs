use std::fs;
use std::path::Path;
use tracing::debug;

use crate::RenamerError;

// File extensions recognized when separating a name into stem and extension.
const DEFAULT_EXTENSIONS: &[&str] = &[
    ".doc", ".docx", ".pdf", ".rtf", ".odt", ".ppt", ".pptx", ".ods",
    ".xlr", ".xls", ".xlsx", ".txt", ".jpg", ".jpeg", ".png", ".gif",
    ".tiff", ".svg", ".bmp", ".mp3", ".mpa", ".wav", ".ogg", ".mid", ".7z",
    ".rar", ".zip", ".exe", ".mov", ".mp4", ".mkv", ".mpg", ".h264", ".avi",
];

// Base names the sync service refuses outright (legacy DOS device names).
const DEFAULT_RESERVED: &[&str] = &[
    "AUX", "PRN", "NUL", "CON", "COM0", "COM1", "COM2", "COM3", "COM4",
    "COM5", "COM6", "COM7", "COM8", "COM9", "LPT0", "LPT1", "LPT2", "LPT3",
    "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

// Substrings that mark sync-service artifacts; their presence also forces a rename.
const ARTIFACT_SUBSTRINGS: &[&str] = &["_vti_"];

const RESERVED_MARKER: &str = "-renamed";

// Ordered find/replace rules for characters the sync service rejects.
// Applied to the stem only, never the extension.
const SUBSTITUTIONS: &[(&str, &str)] = &[
    ("?", ""),
    ("*", ""),
    ("<", ""),
    (">", ""),
    ("|", ""),
    (":", "-"),
    ("\"", "'"),
    ("\\", "."),
    ("/", "."),
];

pub struct Sanitizer {
    extensions: Vec<String>,
    reserved: Vec<String>,
    artifacts: Vec<String>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer {
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            reserved: DEFAULT_RESERVED.iter().map(|s| s.to_string()).collect(),
            artifacts: ARTIFACT_SUBSTRINGS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_reserved_names(mut self, reserved: Vec<String>) -> Self {
        self.reserved = reserved;
        self
    }

    /// Maps a file or folder name to a name the sync service accepts. Returns
    /// the input byte-for-byte when it is already valid, which callers use to
    /// detect that no rename is needed. `unnamed_counter` disambiguates names
    /// that sanitize down to nothing and is incremented each time it is used.
    pub fn sanitize(&self, name: &str, unnamed_counter: &mut u32) -> String {
        let (stem, ext) = self.split_extension(name);
        let mut stem = stem.to_string();

        if self.is_reserved(&stem) {
            stem.push_str(RESERVED_MARKER);
        }

        for (from, to) in SUBSTITUTIONS {
            stem = stem.replace(from, to);
        }

        // Trailing whitespace and periods are both rejected, and stripping one
        // can expose the other, so trim to a fixed point.
        loop {
            let trimmed = stem.trim().trim_end_matches('.');
            if trimmed == stem {
                break;
            }
            stem = trimmed.to_string();
        }

        if stem.is_empty() {
            stem = format!("unnamed{}", unnamed_counter);
            *unnamed_counter += 1;
        }

        let result = format!("{}{}", stem, ext);
        if result != name {
            debug!("Sanitized name: '{}' -> '{}'", name, result);
        }
        result
    }

    // Longest case-sensitive match against the literal suffix table, not a
    // generic dot-split. Unlisted extensions stay part of the stem.
    fn split_extension<'a>(&self, name: &'a str) -> (&'a str, &'a str) {
        let mut best: Option<&str> = None;
        for ext in &self.extensions {
            if name.ends_with(ext.as_str()) && best.map_or(true, |b| ext.len() > b.len()) {
                best = Some(ext);
            }
        }
        match best {
            Some(ext) => name.split_at(name.len() - ext.len()),
            None => (name, ""),
        }
    }

    fn is_reserved(&self, stem: &str) -> bool {
        if self.reserved.iter().any(|r| r == stem) {
            return true;
        }
        // A name already carrying the marker is left alone, otherwise every
        // pass over an artifact name would append another marker.
        !stem.ends_with(RESERVED_MARKER)
            && self.artifacts.iter().any(|a| stem.contains(a.as_str()))
    }
}

/// Reads a table file with one entry per line, skipping blank lines. A missing
/// or unreadable file is an error; the caller treats that as fatal at startup.
pub fn load_list(path: &Path) -> Result<Vec<String>, RenamerError> {
    let contents = fs::read_to_string(path).map_err(|e| RenamerError::ListFile {
        message: format!("cannot read list file {}: {}", path.display(), e),
    })?;
    let entries: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if entries.is_empty() {
        return Err(RenamerError::ListFile {
            message: format!("list file {} contains no entries", path.display()),
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sanitize(name: &str) -> String {
        let mut counter = 1;
        Sanitizer::new().sanitize(name, &mut counter)
    }

    #[test]
    fn test_unchanged_name_passes_through() {
        let sanitizer = Sanitizer::new();
        let mut counter = 1;
        assert_eq!(sanitizer.sanitize("normal_file.txt", &mut counter), "normal_file.txt");
        assert_eq!(counter, 1);
    }

    #[test]
    fn test_reserved_name_is_marked() {
        assert_eq!(sanitize("CON"), "CON-renamed");
        assert_eq!(sanitize("LPT4"), "LPT4-renamed");
    }

    #[test]
    fn test_reserved_match_is_case_sensitive() {
        assert_eq!(sanitize("con"), "con");
        assert_eq!(sanitize("Con"), "Con");
    }

    #[test]
    fn test_reserved_stem_keeps_extension() {
        assert_eq!(sanitize("CON.txt"), "CON-renamed.txt");
    }

    #[test]
    fn test_artifact_substring_is_marked() {
        assert_eq!(sanitize("backup_vti_cnf"), "backup_vti_cnf-renamed");
    }

    #[test]
    fn test_forbidden_characters_removed() {
        assert_eq!(sanitize("a?b*c"), "abc");
        assert_eq!(sanitize("a<b>c|d"), "abcd");
    }

    #[test]
    fn test_forbidden_characters_replaced() {
        assert_eq!(sanitize("a:b"), "a-b");
        assert_eq!(sanitize("say \"hi\""), "say 'hi'");
        assert_eq!(sanitize("a/b\\c"), "a.b.c");
    }

    #[test]
    fn test_substitution_applies_to_stem_not_extension() {
        assert_eq!(sanitize("report:final.pdf"), "report-final.pdf");
    }

    #[test]
    fn test_longest_extension_wins() {
        // ".pptx" must win over any shorter candidate, leaving the stem intact.
        assert_eq!(sanitize("deck?.pptx"), "deck.pptx");
        assert_eq!(sanitize("photo:.jpeg"), "photo-.jpeg");
    }

    #[test]
    fn test_unlisted_extension_is_part_of_stem() {
        // ".tar" is not in the table, so the colon before it is still fixed
        // and the trailing text is treated as stem.
        assert_eq!(sanitize("archive:v2.tar"), "archive-v2.tar");
    }

    #[test]
    fn test_trailing_whitespace_and_periods_stripped() {
        assert_eq!(sanitize("notes. "), "notes");
        assert_eq!(sanitize("  draft  "), "draft");
        assert_eq!(sanitize("report..."), "report");
        assert_eq!(sanitize("memo .."), "memo");
    }

    #[test]
    fn test_blank_name_guard() {
        let sanitizer = Sanitizer::new();
        let mut counter = 1;
        assert_eq!(sanitizer.sanitize("...", &mut counter), "unnamed1");
        assert_eq!(counter, 2);

        let mut counter = 5;
        assert_eq!(sanitizer.sanitize("???", &mut counter), "unnamed5");
        assert_eq!(counter, 6);
    }

    #[test]
    fn test_blank_stem_keeps_extension() {
        let sanitizer = Sanitizer::new();
        let mut counter = 3;
        assert_eq!(sanitizer.sanitize("???.pdf", &mut counter), "unnamed3.pdf");
        assert_eq!(counter, 4);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let names = [
            "CON", "con", "a:b", "a?b*c", "a/b\\c", "report:final.pdf",
            "...", "notes. ", "memo ..", "normal_file.txt", "say \"hi\"",
            "backup_vti_cnf", "archive:v2.tar", "deck?.pptx",
        ];
        let sanitizer = Sanitizer::new();
        for name in names {
            let mut counter = 1;
            let once = sanitizer.sanitize(name, &mut counter);
            let mut counter = 1;
            let twice = sanitizer.sanitize(&once, &mut counter);
            assert_eq!(once, twice, "second pass changed '{}'", name);
        }
    }

    #[test]
    fn test_custom_tables() {
        let sanitizer = Sanitizer::new()
            .with_extensions(vec![".tar.gz".to_string()])
            .with_reserved_names(vec!["SECRET".to_string()]);
        let mut counter = 1;
        assert_eq!(sanitizer.sanitize("SECRET", &mut counter), "SECRET-renamed");
        assert_eq!(sanitizer.sanitize("CON", &mut counter), "CON");
        assert_eq!(sanitizer.sanitize("dump:.tar.gz", &mut counter), "dump-.tar.gz");
    }

    #[test]
    fn test_load_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ".doc\n\n  .pdf  \n.txt").unwrap();
        let entries = load_list(file.path()).unwrap();
        assert_eq!(entries, vec![".doc", ".pdf", ".txt"]);
    }

    #[test]
    fn test_load_list_missing_file() {
        let result = load_list(Path::new("/nonexistent/list.txt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_list_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(load_list(file.path()).is_err());
    }
}
