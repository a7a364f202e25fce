use serde::{Deserialize, Deserializer, Serialize};

/// One entry of the server's project history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub name: String,
    /// Unique, filesystem-safe identifier; addresses the project everywhere.
    pub folder: String,
    /// Unix seconds. The backend reports fractional mtimes; truncated here.
    #[serde(deserialize_with = "de_unix_seconds")]
    pub created: i64,
}

/// Classification the viewer sorts file tabs by. Declaration order is the
/// tab priority: Html < Css < Js < Other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileLanguage {
    Html,
    Css,
    Js,
    Other,
}

impl FileLanguage {
    /// The backend reports the raw file extension.
    pub fn from_ext(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" => FileLanguage::Html,
            "css" => FileLanguage::Css,
            "js" => FileLanguage::Js,
            _ => FileLanguage::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileLanguage::Html => "html",
            FileLanguage::Css => "css",
            FileLanguage::Js => "js",
            FileLanguage::Other => "other",
        }
    }
}

impl From<String> for FileLanguage {
    fn from(raw: String) -> Self {
        FileLanguage::from_ext(&raw)
    }
}

impl From<FileLanguage> for String {
    fn from(language: FileLanguage) -> Self {
        language.as_str().to_string()
    }
}

/// One file of an activated project. Fetched fresh on every activation so
/// server-side edits are always reflected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFile {
    pub name: String,
    /// Path relative to the project root, when the backend provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub language: FileLanguage,
    pub content: String,
}

fn de_unix_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = f64::deserialize(deserializer)?;
    Ok(seconds as i64)
}
