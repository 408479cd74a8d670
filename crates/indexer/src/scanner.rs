use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Walks a repository checkout, honoring gitignore rules and the configured
/// directory exclusions.
pub struct RepoScanner {
    ignore_directories: Vec<String>,
}

impl RepoScanner {
    pub fn new(ignore_directories: Vec<String>) -> Self {
        Self { ignore_directories }
    }

    /// All regular files under `root`, sorted for deterministic processing
    pub fn scan(&self, root: &Path) -> Vec<PathBuf> {
        let ignored = self.ignore_directories.clone();
        let mut files: Vec<PathBuf> = WalkBuilder::new(root)
            .hidden(false)
            .filter_entry(move |entry| {
                let name = entry.file_name().to_string_lossy();
                !ignored.iter().any(|dir| dir == name.as_ref())
            })
            .build()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(ignore::DirEntry::into_path)
            .collect();
        files.sort();
        files
    }
}

/// Read a file as UTF-8, skipping it (with a debug log) when decoding fails.
///
/// An absent text value means "no AST or semantic analysis for this file";
/// callers fall back to byte/line chunking of nothing, i.e. skip the file.
pub fn read_utf8(path: &Path) -> Option<String> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::debug!("skipping unreadable file {}: {err}", path.display());
            return None;
        }
    };
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(_) => {
            log::debug!("skipping non-utf8 file {}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn scans_files_and_skips_ignored_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}\n").unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.js"), "x\n").unwrap();
        fs::write(dir.path().join("README.md"), "# readme\n").unwrap();

        let scanner = RepoScanner::new(vec!["node_modules".to_string()]);
        let files = scanner.scan(dir.path());
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(names.contains(&"main.rs".to_string()));
        assert!(names.contains(&"README.md".to_string()));
        assert!(!names.contains(&"index.js".to_string()));
    }

    #[test]
    fn non_utf8_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        assert!(read_utf8(&path).is_none());

        let text_path = dir.path().join("ok.txt");
        fs::write(&text_path, "hello").unwrap();
        assert_eq!(read_utf8(&text_path).as_deref(), Some("hello"));
    }
}
