//! Key file selection
//!
//! Flags files worth excerpting for technology detection. Any single heuristic
//! is enough; the excerpt accumulator caps how many are kept.

use std::collections::HashSet;
use std::path::Path;

use repodoc_core::ScanProfile;

use crate::budget::char_prefix;

/// Content at or below this many characters is never checked for imports
pub const MIN_IMPORT_SCAN_CHARS: usize = 100;
/// How much of the head of a file is searched for import keywords
pub const IMPORT_SCAN_PREFIX_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct KeyFileSelector {
    key_file_names: HashSet<String>,
    entry_point_markers: Vec<String>,
    import_keywords: Vec<String>,
}

impl KeyFileSelector {
    pub fn new(profile: &ScanProfile) -> Self {
        Self {
            key_file_names: profile
                .key_file_names
                .iter()
                .map(|name| name.to_lowercase())
                .collect(),
            entry_point_markers: profile
                .entry_point_markers
                .iter()
                .map(|marker| marker.to_lowercase())
                .collect(),
            import_keywords: profile
                .import_keywords
                .iter()
                .map(|keyword| keyword.to_lowercase())
                .collect(),
        }
    }

    /// Any one of manifest name, entry-point name or import-bearing head is enough
    pub fn is_key_file<P: AsRef<Path>>(&self, file_path: P, content: &str) -> bool {
        let file_name = file_path
            .as_ref()
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        self.is_manifest(&file_name)
            || self.is_entry_point(&file_name)
            || self.has_import_head(content)
    }

    fn is_manifest(&self, file_name: &str) -> bool {
        self.key_file_names.contains(file_name)
    }

    fn is_entry_point(&self, file_name: &str) -> bool {
        self.entry_point_markers
            .iter()
            .any(|marker| file_name.contains(marker.as_str()))
    }

    fn has_import_head(&self, content: &str) -> bool {
        if content.chars().count() <= MIN_IMPORT_SCAN_CHARS {
            return false;
        }

        let head = char_prefix(content, IMPORT_SCAN_PREFIX_CHARS).to_lowercase();
        self.import_keywords
            .iter()
            .any(|keyword| head.contains(keyword.as_str()))
    }
}

impl Default for KeyFileSelector {
    fn default() -> Self {
        Self::new(&ScanProfile::default())
    }
}
