use std::path::Path;

/// Detect a language tag from a file extension.
///
/// Tags follow the lowercase names used throughout configuration
/// (`language_bonus`, AST language lists, semantic support set).
pub fn detect_language(path: impl AsRef<Path>) -> Option<String> {
    let extension = path.as_ref().extension()?.to_str()?.to_lowercase();
    let tag = match extension.as_str() {
        "rs" => "rust",
        "py" | "pyw" => "python",
        "js" | "mjs" | "cjs" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "rb" => "ruby",
        "php" => "php",
        "cs" => "csharp",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => "cpp",
        "swift" => "swift",
        "scala" => "scala",
        _ => return None,
    };
    Some(tag.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_common_extensions() {
        assert_eq!(detect_language("src/main.rs").as_deref(), Some("rust"));
        assert_eq!(detect_language("app/Main.java").as_deref(), Some("java"));
        assert_eq!(detect_language("web/app.tsx").as_deref(), Some("typescript"));
        assert_eq!(detect_language("tool.py").as_deref(), Some("python"));
    }

    #[test]
    fn unknown_extension_is_absent() {
        assert_eq!(detect_language("README"), None);
        assert_eq!(detect_language("data.bin"), None);
    }
}
