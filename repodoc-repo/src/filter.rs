//! Path filtering for repository traversal
//!
//! Decides which directories are descended into and which files are read as text.

use std::collections::HashSet;
use std::path::Path;

use repodoc_core::ScanProfile;

/// Directory pruning and text classification built from a [`ScanProfile`]
#[derive(Debug, Clone)]
pub struct PathFilter {
    skip_dirs: HashSet<String>,
    text_extensions: HashSet<String>,
    extensionless_text_names: HashSet<String>,
}

impl PathFilter {
    pub fn new(profile: &ScanProfile) -> Self {
        Self {
            skip_dirs: lowercase_set(&profile.skip_dirs),
            text_extensions: lowercase_set(&profile.text_extensions),
            extensionless_text_names: lowercase_set(&profile.extensionless_text_names),
        }
    }

    /// Check if a directory should be pruned, together with everything below it.
    ///
    /// Any name with a leading dot is pruned, listed or not.
    pub fn should_skip_directory(&self, name: &str) -> bool {
        name.starts_with('.') || self.skip_dirs.contains(&name.to_lowercase())
    }

    /// Check if a file should be read as text.
    ///
    /// Tried in order: the extension allow-set, a MIME guess of `text/*`, then
    /// the conventional extensionless names. Dotfiles such as `.gitignore`
    /// have no extension, so their full name is looked up in the allow-set.
    pub fn is_text_file<P: AsRef<Path>>(&self, file_path: P) -> bool {
        let path = file_path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if let Some(extension) = lowercase_extension(path) {
            if self.text_extensions.contains(&extension) {
                return true;
            }
        } else if file_name.starts_with('.') && self.text_extensions.contains(&file_name) {
            return true;
        }

        if mime_guess::from_path(path)
            .first_raw()
            .is_some_and(|mime| mime.starts_with("text/"))
        {
            return true;
        }

        self.extensionless_text_names.contains(&file_name)
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::new(&ScanProfile::default())
    }
}

/// Extension with its leading dot, lowercased; `None` when the name has none
pub fn lowercase_extension(path: &Path) -> Option<String> {
    file_extension(path).map(|ext| ext.to_lowercase())
}

/// Extension with its leading dot, in its original case
pub fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext))
}

fn lowercase_set(items: &[String]) -> HashSet<String> {
    items.iter().map(|item| item.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_directory_deny_set() {
        let filter = PathFilter::default();
        for name in ["node_modules", "target", "__pycache__", "venv", "dist", "logs", "bin"] {
            assert!(filter.should_skip_directory(name), "{} should be skipped", name);
        }
        assert!(filter.should_skip_directory("Node_Modules"));
        assert!(filter.should_skip_directory("BUILD"));
        assert!(!filter.should_skip_directory("src"));
        assert!(!filter.should_skip_directory("docs"));
    }

    #[test]
    fn test_skip_directory_any_dot_prefix() {
        let filter = PathFilter::default();
        assert!(filter.should_skip_directory(".git"));
        assert!(filter.should_skip_directory(".github"));
        assert!(filter.should_skip_directory(".anything"));
    }

    #[test]
    fn test_text_by_extension() {
        let filter = PathFilter::default();
        assert!(filter.is_text_file("src/main.rs"));
        assert!(filter.is_text_file("app/Views/Home.CSHTML.cs"));
        assert!(filter.is_text_file("README.MD"));
        assert!(filter.is_text_file("config/settings.yaml"));
        assert!(filter.is_text_file("lib/parser.S"));
    }

    #[test]
    fn test_binary_assets_rejected() {
        let filter = PathFilter::default();
        assert!(!filter.is_text_file("assets/logo.png"));
        assert!(!filter.is_text_file("dist.zip"));
        assert!(!filter.is_text_file("lib/native.so"));
        assert!(!filter.is_text_file("image.jpeg"));
        assert!(!filter.is_text_file("a.out.o"));
    }

    #[test]
    fn test_extensionless_conventional_names() {
        let filter = PathFilter::default();
        assert!(filter.is_text_file("Makefile"));
        assert!(filter.is_text_file("docker/Dockerfile"));
        assert!(filter.is_text_file("LICENSE"));
        assert!(filter.is_text_file("CHANGELOG"));
        assert!(!filter.is_text_file("some_binary_blob"));
    }

    #[test]
    fn test_dotfiles_eligible_by_full_name() {
        let filter = PathFilter::default();
        assert!(filter.is_text_file(".gitignore"));
        assert!(filter.is_text_file("web/.eslintrc"));
        assert!(!filter.is_text_file(".DS_Store"));
    }

    #[test]
    fn test_mime_fallback_accepts_text_types() {
        let profile = ScanProfile {
            text_extensions: vec![],
            ..ScanProfile::default()
        };
        let filter = PathFilter::new(&profile);
        assert!(filter.is_text_file("notes.txt"));
        assert!(filter.is_text_file("page.html"));
        assert!(!filter.is_text_file("photo.png"));
    }

    #[test]
    fn test_extension_helpers() {
        assert_eq!(file_extension(Path::new("src/Main.PY")), Some(".PY".to_string()));
        assert_eq!(lowercase_extension(Path::new("src/Main.PY")), Some(".py".to_string()));
        assert_eq!(file_extension(Path::new("Makefile")), None);
        assert_eq!(file_extension(Path::new(".gitignore")), None);
    }
}
