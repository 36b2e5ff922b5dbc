//! Mime-type constants and the [`MimeBundle`] rich-output container.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

/// Mime-type reported for plain text content and used as the universal
/// fallback when nothing richer is available.
pub const PLAIN_TEXT: &str = "text/plain";

/// Mime-type reported by markdown cells.
pub const MARKDOWN_TEXT: &str = "text/markdown";

/// Synthetic mime-type for stream output to stdout.
pub const STDOUT: &str = "application/vnd.jupyter.stdout";

/// Synthetic mime-type for stream output to stderr; error outputs report it
/// as well.
pub const STDERR: &str = "application/vnd.jupyter.stderr";

/// Mime-type reported by code cells.
///
/// This mapping is deliberately simple: every code cell reports the Python
/// mime-type regardless of the notebook's declared language. The language
/// name itself is preserved verbatim through [`crate::schema::Cell::language`].
pub const CODE: &str = "application/x-python";

/// Recognized rich mime-types, richest first. [`MimeBundle`] resolution walks
/// this list and falls back to [`PLAIN_TEXT`].
const RICHNESS: [&str; 8] = [
    "image/png",
    "image/jpeg",
    "text/html",
    "image/svg+xml",
    "text/javascript",
    "application/json",
    "application/pdf",
    "application/x-latex",
];

/// A set of alternative encodings of one logical payload, keyed by mime-type.
///
/// Display-data and execute-result outputs, as well as cell attachments,
/// carry their content as a bundle; the notebook publisher decides which
/// encodings to include and the consumer picks the richest one it can use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimeBundle {
    data: BTreeMap<String, String>,
}

impl MimeBundle {
    /// Create an empty bundle.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an encoding to the bundle, replacing any previous data under the
    /// same mime-type.
    pub fn insert(&mut self, mime_type: impl Into<String>, data: impl Into<String>) {
        self.data.insert(mime_type.into(), data.into());
    }

    /// The richest mime-type present in the bundle, falling back to
    /// [`PLAIN_TEXT`] when none of the recognized rich encodings is there.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        RICHNESS
            .into_iter()
            .find(|mime| self.data.contains_key(*mime))
            .unwrap_or(PLAIN_TEXT)
    }

    /// Content under the richest available mime-type, empty if the bundle
    /// holds no usable encoding at all.
    #[must_use]
    pub fn text(&self) -> &str {
        self.data(self.mime_type()).unwrap_or_default()
    }

    /// Content under a specific mime-type, if present.
    #[must_use]
    pub fn data(&self, mime_type: &str) -> Option<&str> {
        self.data.get(mime_type).map(String::as_str)
    }

    /// The plain-text alternative specifically, if the publisher included one.
    #[must_use]
    pub fn plain_text(&self) -> Option<&str> {
        self.data(PLAIN_TEXT)
    }

    /// Whether the bundle carries no encodings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<'de> Deserialize<'de> for MimeBundle {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Bundle values come in three shapes in the wild: a single string, a
        // list of line fragments, or (for application/json payloads) an
        // arbitrary JSON value that is re-serialized compactly.
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut data = BTreeMap::new();
        for (mime, value) in raw {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Array(fragments)
                    if fragments.iter().all(serde_json::Value::is_string) =>
                {
                    fragments
                        .into_iter()
                        .filter_map(|v| match v {
                            serde_json::Value::String(s) => Some(s),
                            _ => None,
                        })
                        .collect()
                }
                other => other.to_string(),
            };
            data.insert(mime, text);
        }
        Ok(Self { data })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MimeBundle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bundle = Self::new();
        for (mime, data) in iter {
            bundle.insert(mime, data);
        }
        bundle
    }
}
