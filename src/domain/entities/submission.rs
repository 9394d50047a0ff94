use crate::{
    entities::critique::CritiqueRequest,
    errors::AppError,
    utils::data_url::{decode_base64_payload, mime_from_data_url, to_data_url},
};

/// A photo picked for analysis. Discarded on reset.
#[derive(Debug, Clone)]
pub struct ImageSubmission {
    pub bytes: Vec<u8>,
    /// `data:` URL suitable for previews and uploads
    pub preview: String,
    /// Base64 payload without the data-URL prefix
    pub base64_data: String,
    pub mime_type: String,
    pub file_name: Option<String>,
}

impl ImageSubmission {
    /// Builds a submission from raw file bytes.
    ///
    /// The declared MIME type wins when it names an image; otherwise the type is sniffed
    /// from the content. Anything that is not an image is rejected.
    pub fn from_bytes(
        bytes: Vec<u8>,
        declared_mime: Option<&str>,
        file_name: Option<String>,
    ) -> Result<Self, AppError> {
        if bytes.is_empty() {
            return Err(AppError::InvalidInput("Image file is empty".to_string()));
        }

        let mime_type = resolve_image_mime(&bytes, declared_mime)?;
        let preview = to_data_url(&mime_type, &bytes);
        let base64_data = preview
            .split_once(',')
            .map(|(_, data)| data.to_string())
            .unwrap_or_default();

        Ok(ImageSubmission {
            bytes,
            preview,
            base64_data,
            mime_type,
            file_name,
        })
    }

    /// Builds a submission from a `data:` URL or a bare base64 string.
    pub fn from_data_url(value: &str, declared_mime: Option<&str>) -> Result<Self, AppError> {
        let bytes = decode_base64_payload(value)
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
        let mime = declared_mime.or_else(|| mime_from_data_url(value));
        Self::from_bytes(bytes, mime, None)
    }

    pub fn critique_request(&self) -> CritiqueRequest {
        CritiqueRequest {
            image_base64: self.base64_data.clone(),
            mime_type: self.mime_type.clone(),
        }
    }
}

fn resolve_image_mime(bytes: &[u8], declared: Option<&str>) -> Result<String, AppError> {
    if let Some(mime) = declared.map(str::trim).filter(|m| m.starts_with("image/")) {
        return Ok(mime.to_string());
    }

    match infer::get(bytes) {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => Ok(kind.mime_type().to_string()),
        Some(kind) => Err(AppError::InvalidInput(format!(
            "Unsupported file type: {}",
            kind.mime_type()
        ))),
        None => Err(AppError::InvalidInput("Could not detect the image type".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 16] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    ];

    #[test]
    fn sniffs_mime_when_none_declared() {
        let submission = ImageSubmission::from_bytes(PNG_SIGNATURE.to_vec(), None, None).unwrap();
        assert_eq!(submission.mime_type, "image/png");
        assert!(submission.preview.starts_with("data:image/png;base64,"));
        assert!(!submission.base64_data.contains(','));
    }

    #[test]
    fn declared_image_mime_is_kept() {
        let submission = ImageSubmission::from_bytes(PNG_SIGNATURE.to_vec(), Some("image/webp"), None).unwrap();
        assert_eq!(submission.mime_type, "image/webp");
    }

    #[test]
    fn rejects_empty_and_unknown_payloads() {
        assert!(ImageSubmission::from_bytes(vec![], None, None).is_err());
        assert!(ImageSubmission::from_bytes(b"plain text".to_vec(), None, None).is_err());
    }

    #[test]
    fn data_url_round_trips_bytes() {
        let original = ImageSubmission::from_bytes(PNG_SIGNATURE.to_vec(), None, None).unwrap();
        let parsed = ImageSubmission::from_data_url(&original.preview, None).unwrap();
        assert_eq!(parsed.bytes, PNG_SIGNATURE.to_vec());
        assert_eq!(parsed.mime_type, "image/png");
    }
}
