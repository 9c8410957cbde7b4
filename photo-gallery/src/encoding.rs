use base64::{engine::general_purpose, Engine as _};

/// Error type for image encoding
#[derive(Debug)]
pub enum EncodingError {
    InvalidDataUrl(String),
    InvalidBase64(String),
    /// The asynchronous reader failed before producing a result
    Reader(String),
}

impl std::fmt::Display for EncodingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodingError::InvalidDataUrl(msg) => write!(f, "Invalid data URL: {}", msg),
            EncodingError::InvalidBase64(msg) => write!(f, "Invalid base64: {}", msg),
            EncodingError::Reader(msg) => write!(f, "Reader error: {}", msg),
        }
    }
}

impl std::error::Error for EncodingError {}

/// Image bytes in the serializable base64 encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    mime: String,
    base64: String,
}

impl EncodedImage {
    pub fn from_base64(mime: impl Into<String>, base64: impl Into<String>) -> Self {
        Self {
            mime: mime.into(),
            base64: base64.into(),
        }
    }

    pub fn from_bytes(mime: impl Into<String>, bytes: &[u8]) -> Self {
        Self::from_base64(mime, general_purpose::STANDARD.encode(bytes))
    }

    /// Parses `data:<mime>;base64,<payload>`
    pub fn from_data_url(url: &str) -> Result<Self, EncodingError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| EncodingError::InvalidDataUrl("missing data: scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| EncodingError::InvalidDataUrl("missing payload".to_string()))?;
        let mime = header.strip_suffix(";base64").ok_or_else(|| {
            EncodingError::InvalidDataUrl(format!("not base64 encoded: {}", header))
        })?;
        let mime = if mime.is_empty() {
            "application/octet-stream"
        } else {
            mime
        };
        Ok(Self::from_base64(mime, payload))
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// The bare base64 payload, as written to the blob store
    pub fn payload(&self) -> &str {
        &self.base64
    }

    pub fn data_url(&self) -> String {
        data_url(&self.mime, &self.base64)
    }
}

pub fn data_url(mime: &str, base64: &str) -> String {
    format!("data:{};base64,{}", mime, base64)
}

pub fn decode_base64(data: &str) -> Result<Vec<u8>, EncodingError> {
    general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| EncodingError::InvalidBase64(e.to_string()))
}

/// Converts a binary blob into a data URL on the blocking pool.
///
/// Resolves with the encoded string, or rejects with `EncodingError::Reader`
/// when the reader task does not complete.
pub async fn read_as_data_url(bytes: Vec<u8>, mime: String) -> Result<String, EncodingError> {
    tokio::task::spawn_blocking(move || {
        log::debug!("Encoding {} bytes of {} as data URL", bytes.len(), mime);
        EncodedImage::from_bytes(mime, &bytes).data_url()
    })
    .await
    .map_err(|e| EncodingError::Reader(format!("Task join error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_parsing() {
        let image = EncodedImage::from_data_url("data:image/jpeg;base64,AQID").unwrap();
        assert_eq!(image.mime(), "image/jpeg");
        assert_eq!(image.payload(), "AQID");
        assert_eq!(image.data_url(), "data:image/jpeg;base64,AQID");
    }

    #[test]
    fn test_data_url_rejects_plain_text() {
        assert!(matches!(
            EncodedImage::from_data_url("AQID"),
            Err(EncodingError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            EncodedImage::from_data_url("data:text/plain,hello"),
            Err(EncodingError::InvalidDataUrl(_))
        ));
    }

    #[test]
    fn test_data_url_without_mime() {
        let image = EncodedImage::from_data_url("data:;base64,AQID").unwrap();
        assert_eq!(image.mime(), "application/octet-stream");
    }

    #[test]
    fn test_invalid_base64() {
        assert!(matches!(
            decode_base64("not base64!"),
            Err(EncodingError::InvalidBase64(_))
        ));
    }

    #[tokio::test]
    async fn test_read_as_data_url() {
        let url = read_as_data_url(vec![0xff, 0xd8, 0xff], "image/jpeg".to_string())
            .await
            .unwrap();
        assert_eq!(url, "data:image/jpeg;base64,/9j/");
    }
}
