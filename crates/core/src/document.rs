use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Unique identifier of a record handed to the knowledge store.
pub type DocId = Uuid;

// ── Supported formats ─────────────────────────────────────────

pub const DOCUMENT_EXTENSIONS: &[&str] = &[".pdf", ".docx"];

pub const TEXT_EXTENSIONS: &[&str] = &[".txt", ".md"];

pub const CODE_EXTENSIONS: &[&str] = &[
    ".py", ".js", ".ts", ".tsx", ".jsx", ".c", ".cpp", ".h", ".hpp", ".rs", ".go", ".java",
    ".html", ".css", ".scss", ".json", ".yaml", ".yml", ".sql", ".sh", ".bash", ".zsh", ".xml",
    ".toml", ".ini", ".env",
];

/// Broad family a file belongs to, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Document,
    Text,
    Code,
    Unknown,
}

impl FileCategory {
    /// Classify a dotted, case-insensitive extension such as `".PDF"`.
    pub fn from_extension(extension: &str) -> Self {
        let ext = extension.to_lowercase();
        let ext = ext.as_str();
        if DOCUMENT_EXTENSIONS.contains(&ext) {
            FileCategory::Document
        } else if TEXT_EXTENSIONS.contains(&ext) {
            FileCategory::Text
        } else if CODE_EXTENSIONS.contains(&ext) {
            FileCategory::Code
        } else {
            FileCategory::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Document => "document",
            FileCategory::Text => "text",
            FileCategory::Code => "code",
            FileCategory::Unknown => "unknown",
        }
    }
}

/// Language label for text and code extensions. Unlisted extensions map to `None`.
pub fn language_for_extension(extension: &str) -> Option<&'static str> {
    let lang = match extension.to_lowercase().as_str() {
        ".py" => "python",
        ".js" => "javascript",
        ".ts" => "typescript",
        ".tsx" => "typescript-react",
        ".jsx" => "javascript-react",
        ".c" => "c",
        ".cpp" => "cpp",
        ".h" => "c-header",
        ".hpp" => "cpp-header",
        ".rs" => "rust",
        ".go" => "go",
        ".java" => "java",
        ".html" => "html",
        ".css" => "css",
        ".scss" => "scss",
        ".json" => "json",
        ".yaml" | ".yml" => "yaml",
        ".sql" => "sql",
        ".sh" => "shell",
        ".bash" => "bash",
        ".zsh" => "zsh",
        ".xml" => "xml",
        ".toml" => "toml",
        ".ini" => "ini",
        ".md" => "markdown",
        ".txt" => "text",
        _ => return None,
    };
    Some(lang)
}

/// Dotted, lowercased extension of a filename (`"notes.MD"` → `".md"`).
/// Returns an empty string when the name has no extension.
pub fn extension_of(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match base.rfind('.') {
        Some(0) | None => String::new(),
        Some(idx) => base[idx..].to_lowercase(),
    }
}

// ── Metadata ──────────────────────────────────────────────────

/// Descriptive metadata attached to every extracted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub filename: String,
    pub extension: String,
    pub category: FileCategory,
    /// Only set for code files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub char_count: usize,
    /// Markdown section titles, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headings: Vec<String>,
}

impl DocumentMetadata {
    /// Flatten into a JSON object so callers can merge extra keys into it.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}
