/// Path segment the web view serves local files under
const FILE_SRC_PREFIX: &str = "_capacitor_file_";

/// Rewrites native file references into URIs the web view can load.
///
/// Only the scheme and host change; the file itself is not copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSrcConverter {
    pub scheme: String,
    pub hostname: String,
}

impl FileSrcConverter {
    pub fn new(scheme: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            hostname: hostname.into(),
        }
    }

    fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.hostname)
    }

    /// `file:///a/b.jpeg` and `/a/b.jpeg` map to
    /// `{scheme}://{hostname}/_capacitor_file_/a/b.jpeg`; anything else is
    /// returned as is.
    pub fn convert(&self, uri: &str) -> String {
        let path = if let Some(rest) = uri.strip_prefix("file://") {
            rest
        } else if uri.starts_with('/') {
            uri
        } else {
            return uri.to_string();
        };

        format!("{}/{}{}", self.origin(), FILE_SRC_PREFIX, path)
    }
}

impl Default for FileSrcConverter {
    fn default() -> Self {
        Self::new("https", "localhost")
    }
}
